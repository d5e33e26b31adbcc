//! ZMTP v1 wire framing.
//!
//! zwire turns arbitrarily-fragmented byte streams into discrete,
//! length-framed messages and back: an incremental decoder, the symmetric
//! encoder, blocking stream drivers, multipart assembly, and an optional
//! tokio codec adapter.
//!
//! # Crate Structure
//!
//! - [`frame`] — The wire codec: decoder, encoder, drivers, multipart
//!   grouping, and the async adapter (behind the `async` feature)

/// Re-export frame types.
pub mod frame {
    pub use zwire_frame::*;
}
