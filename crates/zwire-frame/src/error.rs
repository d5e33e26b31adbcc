/// Errors that can occur while decoding, encoding, or transporting frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The wire declared a frame length of zero. Every frame carries at
    /// least the flags byte, so the minimum legal declared length is 1.
    #[error("malformed frame: declared length of zero")]
    ZeroLength,

    /// The declared payload exceeds the configured maximum, or cannot be
    /// represented as a byte count on this platform.
    #[error("message too large ({payload} bytes, max {max})")]
    MsgTooLarge { payload: u64, max: u64 },

    /// Storage for the in-progress message could not be committed. The
    /// decoder discards the frame and stays usable.
    #[error("message allocation failed ({size} bytes)")]
    OutOfMemory { size: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
