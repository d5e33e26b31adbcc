//! Incremental ZMTP v1 wire framing.
//!
//! Every frame opens with a self-describing length prefix, followed by a
//! flags byte and the payload:
//! - declared lengths below 0xFF fit in a single prefix byte (short form)
//! - a 0xFF marker introduces an 8-byte big-endian length (long form)
//! - flags bit 0 marks a continuation frame of a multi-part message
//!
//! The decoder is incremental: feed it byte chunks as they arrive off a
//! stream and it hands back complete messages, suspending cleanly at any
//! split point. Payload bytes land directly in message-owned storage. No
//! partial reads, no buffer management in user code.

pub mod codec;
pub mod decoder;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod msg;
pub mod multipart;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_frame, encode_msg, encoded_len, FrameConfig, DEFAULT_MAX_MSG_SIZE, FLAG_MORE,
    LONG_FORM_MARKER, MAX_SHORT_PAYLOAD,
};
pub use decoder::FrameDecoder;
pub use error::{FrameError, Result};
#[cfg(feature = "async")]
pub use framed::MsgCodec;
pub use msg::Msg;
pub use multipart::MultipartBuffer;
pub use reader::MsgReader;
pub use writer::MsgWriter;
