use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::msg::Msg;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
pub struct MsgWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> MsgWriter<T> {
    /// Create a message writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a message writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one frame (blocking).
    pub fn send(&mut self, payload: &[u8], more: bool) -> Result<()> {
        if let Some(max) = self.config.max_msg_size {
            if payload.len() > max {
                debug!(size = payload.len(), max, "rejecting oversized send");
                return Err(FrameError::MsgTooLarge {
                    payload: payload.len() as u64,
                    max: max as u64,
                });
            }
        }

        self.buf.clear();
        encode_frame(payload, more, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Send a [`Msg`] as one frame.
    pub fn write_msg(&mut self, msg: &Msg) -> Result<()> {
        self.send(msg.payload(), msg.more())
    }

    /// Send a logical message as consecutive frames: every part carries the
    /// continuation flag except the last. An empty iterator writes nothing.
    pub fn send_multipart<I>(&mut self, parts: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut parts = parts.into_iter().peekable();
        while let Some(part) = parts.next() {
            self.send(part.as_ref(), parts.peek().is_some())?;
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
