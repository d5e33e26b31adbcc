use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_msg, FrameConfig};
use crate::decoder::FrameDecoder;
use crate::error::FrameError;
use crate::msg::Msg;

/// tokio codec adapter: drives the incremental decoder and the encoder
/// under `FramedRead` / `FramedWrite`.
pub struct MsgCodec {
    decoder: FrameDecoder,
    config: FrameConfig,
}

impl MsgCodec {
    /// Codec with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        let decoder = match config.max_msg_size {
            Some(max) => FrameDecoder::with_max_msg_size(max),
            None => FrameDecoder::new(),
        };
        Self { decoder, config }
    }
}

impl Default for MsgCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MsgCodec {
    type Item = Msg;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Msg>, FrameError> {
        let (consumed, msg) = self.decoder.decode(&src[..])?;
        src.advance(consumed);
        Ok(msg)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Msg>, FrameError> {
        match self.decode(src)? {
            Some(msg) => Ok(Some(msg)),
            None if self.decoder.is_idle() && src.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl Encoder<Msg> for MsgCodec {
    type Error = FrameError;

    fn encode(&mut self, msg: Msg, dst: &mut BytesMut) -> Result<(), FrameError> {
        if let Some(max) = self.config.max_msg_size {
            if msg.size() > max {
                return Err(FrameError::MsgTooLarge {
                    payload: msg.size() as u64,
                    max: max as u64,
                });
            }
        }
        encode_msg(&msg, dst);
        Ok(())
    }
}
