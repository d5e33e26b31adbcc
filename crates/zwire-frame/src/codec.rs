use bytes::{BufMut, BytesMut};

use crate::msg::Msg;

/// Marker byte introducing the 8-byte long-form length prefix.
pub const LONG_FORM_MARKER: u8 = 0xFF;

/// Continuation bit in the flags byte. Bits 1..7 are reserved and carry no
/// meaning; the decoder accepts them without interpretation.
pub const FLAG_MORE: u8 = 0x01;

/// Largest payload encodable with the single-byte length prefix.
pub const MAX_SHORT_PAYLOAD: usize = 253;

/// Wire overhead of a short-form frame: length byte + flags byte.
pub const SHORT_HEADER_SIZE: usize = 2;

/// Wire overhead of a long-form frame: marker + 8-byte length + flags byte.
pub const LONG_HEADER_SIZE: usize = 10;

/// Default maximum message size for stream-facing surfaces: 16 MiB.
pub const DEFAULT_MAX_MSG_SIZE: usize = 16 * 1024 * 1024;

/// Encode one frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬────────────────────┬─────────────┬─────────────────┐
/// │ Indicator (1B)   │ Long length (8B)   │ Flags (1B)  │ Payload          │
/// │ 0x01..0xFE short │ big-endian, only   │ bit0 = more │ declared − 1     │
/// │ 0xFF long form   │ after 0xFF         │             │ bytes            │
/// └──────────────────┴────────────────────┴─────────────┴─────────────────┘
/// ```
///
/// The declared length counts the flags byte, so it is always payload
/// length + 1. Short form is used whenever the declared length stays below
/// the long-form marker.
pub fn encode_frame(payload: &[u8], more: bool, dst: &mut BytesMut) {
    dst.reserve(encoded_len(payload.len()));

    let declared = payload.len() as u64 + 1;
    if declared < u64::from(LONG_FORM_MARKER) {
        dst.put_u8(declared as u8);
    } else {
        dst.put_u8(LONG_FORM_MARKER);
        dst.put_u64(declared);
    }
    dst.put_u8(if more { FLAG_MORE } else { 0 });
    dst.put_slice(payload);
}

/// Encode a [`Msg`] into the wire format.
pub fn encode_msg(msg: &Msg, dst: &mut BytesMut) {
    encode_frame(msg.payload(), msg.more(), dst);
}

/// Encoded size of a frame carrying `payload_len` payload bytes.
pub fn encoded_len(payload_len: usize) -> usize {
    if payload_len <= MAX_SHORT_PAYLOAD {
        SHORT_HEADER_SIZE + payload_len
    } else {
        LONG_HEADER_SIZE + payload_len
    }
}

/// Configuration for stream-facing frame surfaces.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes; `None` lifts the bound entirely.
    /// Default: 16 MiB.
    pub max_msg_size: Option<usize>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_msg_size: Some(DEFAULT_MAX_MSG_SIZE),
        }
    }
}
