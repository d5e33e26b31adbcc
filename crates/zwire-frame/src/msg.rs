use bytes::Bytes;

use crate::error::{FrameError, Result};

/// One decoded frame: an owned payload plus the continuation flag.
///
/// A `Msg` is produced by the decoder when a frame completes, or built by
/// hand for the encode path. Completion hands the whole object to the caller
/// by move, so a message never has more than one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Msg {
    data: Vec<u8>,
    more: bool,
}

impl Msg {
    /// Create an empty, final message with no storage committed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a final message holding `payload`.
    pub fn from_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            data: payload.into(),
            more: false,
        }
    }

    /// Commit storage for exactly `size` payload bytes, leaving the message
    /// empty until the body arrives.
    ///
    /// Surfaces allocator refusal as [`FrameError::OutOfMemory`] rather than
    /// aborting the process.
    pub(crate) fn with_size(size: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| FrameError::OutOfMemory { size })?;
        Ok(Self { data, more: false })
    }

    /// Append body bytes; must stay within the committed capacity.
    pub(crate) fn fill(&mut self, chunk: &[u8]) {
        debug_assert!(self.data.len() + chunk.len() <= self.data.capacity());
        self.data.extend_from_slice(chunk);
    }

    /// Payload length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Consume the message, keeping only the payload.
    pub fn into_payload(self) -> Bytes {
        Bytes::from(self.data)
    }

    /// True when this frame is one part of a multi-frame logical message.
    pub fn more(&self) -> bool {
        self.more
    }

    /// Set the continuation flag.
    pub fn set_more(&mut self, more: bool) {
        self.more = more;
    }

    /// The total wire size of this frame (length prefix + flags + payload).
    pub fn wire_size(&self) -> usize {
        crate::codec::encoded_len(self.data.len())
    }
}
