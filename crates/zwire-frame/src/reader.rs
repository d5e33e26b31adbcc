use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::codec::FrameConfig;
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};
use crate::msg::Msg;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete messages from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete messages.
/// Bytes received past a completed message are kept for the next call.
pub struct MsgReader<T> {
    inner: T,
    decoder: FrameDecoder,
    buf: BytesMut,
}

impl<T: Read> MsgReader<T> {
    /// Create a message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a message reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        let decoder = match config.max_msg_size {
            Some(max) => FrameDecoder::with_max_msg_size(max),
            None => FrameDecoder::new(),
        };
        Self {
            inner,
            decoder,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached, even
    /// at a clean frame boundary; [`MsgReader::is_idle`] tells the two
    /// apart.
    pub fn read_msg(&mut self) -> Result<Msg> {
        loop {
            if !self.buf.is_empty() {
                let (consumed, msg) = self.decoder.decode(&self.buf)?;
                self.buf.advance(consumed);
                if let Some(msg) = msg {
                    return Ok(msg);
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if !self.decoder.is_idle() {
                    debug!(buffered = self.buf.len(), "stream ended mid-frame");
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// True when the last frame ended cleanly and no bytes are pending.
    pub fn is_idle(&self) -> bool {
        self.decoder.is_idle() && self.buf.is_empty()
    }

    /// The payload bound applied to incoming frames, if any.
    pub fn max_msg_size(&self) -> Option<usize> {
        self.decoder.max_msg_size()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
