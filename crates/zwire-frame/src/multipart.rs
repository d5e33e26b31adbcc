use crate::msg::Msg;

/// Groups decoded frames into logical messages.
///
/// A logical message is a run of continuation-flagged frames closed by one
/// final frame with the flag clear. Push frames in stream order; the buffer
/// hands back the whole group when the final part arrives.
#[derive(Debug, Default)]
pub struct MultipartBuffer {
    parts: Vec<Msg>,
}

impl MultipartBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next frame in stream order.
    ///
    /// Returns the completed logical message when `msg` is a final part,
    /// `None` while parts are still accumulating.
    pub fn push(&mut self, msg: Msg) -> Option<Vec<Msg>> {
        let finishes = !msg.more();
        self.parts.push(msg);
        if finishes {
            Some(std::mem::take(&mut self.parts))
        } else {
            None
        }
    }

    /// Number of parts accumulated so far.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True when no partial message is pending.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Discard a partially accumulated message, e.g. on stream teardown.
    pub fn clear(&mut self) {
        self.parts.clear();
    }
}
