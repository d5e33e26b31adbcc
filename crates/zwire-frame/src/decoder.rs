use std::mem;

use crate::codec::{FLAG_MORE, LONG_FORM_MARKER};
use crate::error::{FrameError, Result};
use crate::msg::Msg;

const SHORT_SIZE_LEN: usize = 1;
const LONG_SIZE_LEN: usize = 8;
const FLAGS_LEN: usize = 1;

/// Which wire field the decoder is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// The single-byte length indicator that opens every frame.
    ShortSize,
    /// The 8-byte big-endian length following a long-form marker.
    LongSize,
    /// The flags byte.
    Flags,
    /// The payload, delivered straight into the message buffer.
    Body,
}

/// Incremental frame decoder.
///
/// Reconstructs discrete messages from an arbitrarily fragmented byte
/// stream. Feed it chunks as they arrive: it consumes exactly what the
/// current frame needs, suspends mid-field when input runs out, and resumes
/// on the next call. Fixed-size fields accumulate in a private scratch
/// buffer; payload bytes land directly in the in-progress message's own
/// storage, so a body is never staged anywhere else.
///
/// One decoder serves one stream. Exactly one message is in progress at a
/// time, and a completed message moves out to the caller before the next
/// frame begins.
pub struct FrameDecoder {
    stage: Stage,
    scratch: [u8; LONG_SIZE_LEN],
    filled: usize,
    body_len: usize,
    in_progress: Msg,
    max_msg_size: Option<usize>,
}

impl FrameDecoder {
    /// Create a decoder with no message size bound.
    pub fn new() -> Self {
        Self {
            stage: Stage::ShortSize,
            scratch: [0; LONG_SIZE_LEN],
            filled: 0,
            body_len: 0,
            in_progress: Msg::new(),
            max_msg_size: None,
        }
    }

    /// Create a decoder that rejects payloads longer than `max` bytes.
    ///
    /// The bound applies to payload length (the flags byte is not counted)
    /// and is checked before any buffer is committed.
    pub fn with_max_msg_size(max: usize) -> Self {
        Self {
            max_msg_size: Some(max),
            ..Self::new()
        }
    }

    /// The configured payload bound, if any.
    pub fn max_msg_size(&self) -> Option<usize> {
        self.max_msg_size
    }

    /// True at a frame boundary: waiting for the first byte of the next
    /// frame with no partial state held.
    pub fn is_idle(&self) -> bool {
        self.stage == Stage::ShortSize && self.filled == 0
    }

    /// Feed a chunk of stream bytes.
    ///
    /// Consumes input until one message completes or the chunk is
    /// exhausted, whichever comes first, and returns the number of bytes
    /// consumed together with the completed message if this call finished
    /// one. Stopping at each completion keeps messages in stream order; the
    /// caller re-offers the unconsumed tail on its next call.
    ///
    /// On error the decoder resets to the frame boundary. A length-prefixed
    /// stream has no resynchronization point after a framing violation, so
    /// callers normally tear the stream down; that remains their policy,
    /// not the decoder's.
    pub fn decode(&mut self, input: &[u8]) -> Result<(usize, Option<Msg>)> {
        let mut consumed = 0;

        loop {
            let missing = self.missing();
            if missing > 0 {
                let available = input.len() - consumed;
                if available == 0 {
                    return Ok((consumed, None));
                }

                let take = missing.min(available);
                let chunk = &input[consumed..consumed + take];
                match self.stage {
                    Stage::Body => self.in_progress.fill(chunk),
                    _ => {
                        self.scratch[self.filled..self.filled + take].copy_from_slice(chunk);
                        self.filled += take;
                    }
                }
                consumed += take;

                if take < missing {
                    return Ok((consumed, None));
                }
            }

            if let Some(msg) = self.step()? {
                return Ok((consumed, Some(msg)));
            }
        }
    }

    /// Bytes still needed before the active stage can run.
    fn missing(&self) -> usize {
        match self.stage {
            Stage::ShortSize => SHORT_SIZE_LEN - self.filled,
            Stage::LongSize => LONG_SIZE_LEN - self.filled,
            Stage::Flags => FLAGS_LEN - self.filled,
            Stage::Body => self.body_len - self.in_progress.size(),
        }
    }

    /// Run the stage whose field is fully delivered. The machine's single
    /// dispatch point; only `Body` yields a message.
    fn step(&mut self) -> Result<Option<Msg>> {
        match self.stage {
            Stage::ShortSize => {
                let indicator = self.scratch[0];
                if indicator == LONG_FORM_MARKER {
                    self.advance(Stage::LongSize);
                } else {
                    self.begin_frame(u64::from(indicator))?;
                }
                Ok(None)
            }
            Stage::LongSize => {
                self.begin_frame(u64::from_be_bytes(self.scratch))?;
                Ok(None)
            }
            Stage::Flags => {
                // Bit 0 is the continuation marker; reserved bits pass
                // through undecoded.
                self.in_progress.set_more(self.scratch[0] & FLAG_MORE != 0);
                self.advance(Stage::Body);
                Ok(None)
            }
            Stage::Body => {
                debug_assert_eq!(self.in_progress.size(), self.body_len);
                let msg = mem::replace(&mut self.in_progress, Msg::new());
                self.body_len = 0;
                self.advance(Stage::ShortSize);
                Ok(Some(msg))
            }
        }
    }

    /// Validate a declared frame length and commit the message buffer.
    ///
    /// The declared length counts the flags byte; payload length is one
    /// less. All checks run before the allocation: zero length, configured
    /// bound, platform representability.
    fn begin_frame(&mut self, declared: u64) -> Result<()> {
        if declared == 0 {
            return Err(self.fail(FrameError::ZeroLength));
        }
        let payload = declared - 1;

        if let Some(max) = self.max_msg_size {
            if payload > max as u64 {
                return Err(self.fail(FrameError::MsgTooLarge {
                    payload,
                    max: max as u64,
                }));
            }
        }

        let payload_len = match usize::try_from(payload) {
            Ok(len) => len,
            Err(_) => {
                return Err(self.fail(FrameError::MsgTooLarge {
                    payload,
                    max: usize::MAX as u64,
                }));
            }
        };

        // The previous frame's message moved out at completion (or was
        // dropped by `fail`), so the slot is empty; replace it wholesale.
        match Msg::with_size(payload_len) {
            Ok(msg) => self.in_progress = msg,
            Err(err) => return Err(self.fail(err)),
        }
        self.body_len = payload_len;
        self.advance(Stage::Flags);
        Ok(())
    }

    /// Arm the next stage and reset the scratch fill cursor.
    fn advance(&mut self, stage: Stage) {
        self.stage = stage;
        self.filled = 0;
    }

    /// Drop any partial frame, return to the frame boundary, and hand the
    /// error back for propagation.
    fn fail(&mut self, err: FrameError) -> FrameError {
        self.in_progress = Msg::new();
        self.body_len = 0;
        self.advance(Stage::ShortSize);
        err
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;

    /// Feed the whole input, collecting every completed message.
    fn collect(decoder: &mut FrameDecoder, mut input: &[u8]) -> Result<Vec<Msg>> {
        let mut out = Vec::new();
        while !input.is_empty() {
            let (consumed, msg) = decoder.decode(input)?;
            input = &input[consumed..];
            if let Some(msg) = msg {
                out.push(msg);
            }
        }
        Ok(out)
    }

    #[test]
    fn decodes_short_frame() {
        let mut decoder = FrameDecoder::new();
        let (consumed, msg) = decoder.decode(&[0x04, 0x00, 0x41, 0x42, 0x43]).unwrap();
        let msg = msg.expect("frame should complete");

        assert_eq!(consumed, 5);
        assert_eq!(msg.size(), 3);
        assert_eq!(msg.payload(), b"ABC");
        assert!(!msg.more());
        assert!(decoder.is_idle());
    }

    #[test]
    fn decodes_long_frame() {
        let wire = [0xFF, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x01, 0x58];
        let mut decoder = FrameDecoder::new();
        let (consumed, msg) = decoder.decode(&wire).unwrap();
        let msg = msg.expect("frame should complete");

        assert_eq!(consumed, 11);
        assert_eq!(msg.size(), 1);
        assert_eq!(msg.payload(), b"X");
        assert!(msg.more());
        assert!(decoder.is_idle());
    }

    #[test]
    fn decodes_every_short_form_length() {
        for payload_len in 0..=253usize {
            let more = payload_len % 2 == 1;
            let mut wire = vec![payload_len as u8 + 1, if more { 0x01 } else { 0x00 }];
            wire.extend(std::iter::repeat(payload_len as u8).take(payload_len));

            let mut decoder = FrameDecoder::new();
            let msgs = collect(&mut decoder, &wire).unwrap();

            assert_eq!(msgs.len(), 1, "payload_len {payload_len}");
            assert_eq!(msgs[0].size(), payload_len);
            assert_eq!(msgs[0].more(), more);
            assert!(msgs[0].payload().iter().all(|&b| b == payload_len as u8));
            assert!(decoder.is_idle());
        }
    }

    #[test]
    fn empty_payload_completes_with_flags_byte() {
        let mut decoder = FrameDecoder::new();
        let (consumed, msg) = decoder.decode(&[0x01, 0x00]).unwrap();
        let msg = msg.expect("empty frame should complete");

        assert_eq!(consumed, 2);
        assert_eq!(msg.size(), 0);
        assert!(!msg.more());

        let (consumed, msg) = decoder.decode(&[0x01, 0x01]).unwrap();
        assert_eq!(consumed, 2);
        assert!(msg.expect("empty frame should complete").more());
    }

    #[test]
    fn zero_short_indicator_rejected() {
        let mut decoder = FrameDecoder::new();
        let err = decoder.decode(&[0x00]).unwrap_err();
        assert!(matches!(err, FrameError::ZeroLength));

        // The decoder is back at the frame boundary and keeps working.
        assert!(decoder.is_idle());
        let msgs = collect(&mut decoder, &[0x04, 0x00, 0x41, 0x42, 0x43]).unwrap();
        assert_eq!(msgs[0].payload(), b"ABC");
    }

    #[test]
    fn zero_long_length_rejected() {
        let mut decoder = FrameDecoder::new();
        let err = decoder
            .decode(&[0xFF, 0, 0, 0, 0, 0, 0, 0, 0])
            .unwrap_err();
        assert!(matches!(err, FrameError::ZeroLength));
        assert!(decoder.is_idle());
    }

    #[test]
    fn short_frame_over_bound_rejected() {
        let mut decoder = FrameDecoder::with_max_msg_size(2);
        let err = decoder.decode(&[0x04]).unwrap_err();

        assert!(matches!(
            err,
            FrameError::MsgTooLarge { payload: 3, max: 2 }
        ));
        assert!(decoder.is_idle());
    }

    #[test]
    fn long_frame_over_bound_rejected() {
        let mut wire = vec![0xFF];
        wire.extend_from_slice(&18u64.to_be_bytes());

        let mut decoder = FrameDecoder::with_max_msg_size(16);
        let err = decoder.decode(&wire).unwrap_err();

        assert!(matches!(
            err,
            FrameError::MsgTooLarge {
                payload: 17,
                max: 16
            }
        ));
    }

    #[test]
    fn bound_is_inclusive() {
        let mut decoder = FrameDecoder::with_max_msg_size(3);
        let msgs = collect(&mut decoder, &[0x04, 0x00, 0x41, 0x42, 0x43]).unwrap();
        assert_eq!(msgs[0].size(), 3);
    }

    #[test]
    fn byte_at_a_time_matches_single_chunk() {
        let mut wire = BytesMut::new();
        encode_frame(b"fragmented delivery", true, &mut wire);

        let mut whole = FrameDecoder::new();
        let (_, expected) = whole.decode(&wire).unwrap();
        let expected = expected.unwrap();

        let mut decoder = FrameDecoder::new();
        let mut got = None;
        for (i, &byte) in wire.iter().enumerate() {
            let (consumed, msg) = decoder.decode(&[byte]).unwrap();
            assert_eq!(consumed, 1);
            if let Some(msg) = msg {
                assert_eq!(i, wire.len() - 1, "must complete on the final byte");
                got = Some(msg);
            }
        }

        assert_eq!(got.expect("frame should complete"), expected);
    }

    #[test]
    fn arbitrary_split_points_match_single_chunk() {
        let payload = (0..=255u8).cycle().take(700).collect::<Vec<_>>();
        let mut wire = BytesMut::new();
        encode_frame(&payload, false, &mut wire);

        let mut whole = FrameDecoder::new();
        let (_, expected) = whole.decode(&wire).unwrap();
        let expected = expected.unwrap();

        for chunk_len in [1, 2, 3, 7, 9, 64] {
            let mut decoder = FrameDecoder::new();
            let mut msgs = Vec::new();
            for chunk in wire.chunks(chunk_len) {
                msgs.extend(collect(&mut decoder, chunk).unwrap());
            }
            assert_eq!(msgs.len(), 1, "chunk_len {chunk_len}");
            assert_eq!(msgs[0], expected);
        }
    }

    #[test]
    fn consecutive_frames_decode_in_order() {
        let mut wire = BytesMut::new();
        encode_frame(b"first", true, &mut wire);
        encode_frame(b"", false, &mut wire);
        encode_frame(&vec![0x7A; 300], false, &mut wire);

        let mut decoder = FrameDecoder::new();
        let msgs = collect(&mut decoder, &wire).unwrap();

        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0].payload(), b"first");
        assert!(msgs[0].more());
        assert!(msgs[1].is_empty());
        assert_eq!(msgs[2].size(), 300);
        assert!(decoder.is_idle());
    }

    #[test]
    fn stops_at_completion_leaving_surplus() {
        let mut wire = BytesMut::new();
        encode_frame(b"one", false, &mut wire);
        encode_frame(b"two", false, &mut wire);

        let mut decoder = FrameDecoder::new();
        let (consumed, msg) = decoder.decode(&wire).unwrap();

        assert_eq!(consumed, 5);
        assert_eq!(msg.unwrap().payload(), b"one");

        let (consumed, msg) = decoder.decode(&wire[5..]).unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(msg.unwrap().payload(), b"two");
    }

    #[test]
    fn reserved_flag_bits_are_ignored() {
        for (flags, more) in [(0x00u8, false), (0xFE, false), (0x01, true), (0xFF, true)] {
            let mut decoder = FrameDecoder::new();
            let (_, msg) = decoder.decode(&[0x03, flags, 0x68, 0x69]).unwrap();
            let msg = msg.expect("frame should complete");

            assert_eq!(msg.more(), more, "flags {flags:#04x}");
            assert_eq!(msg.payload(), b"hi");
        }
    }

    #[test]
    fn partial_frame_is_not_idle() {
        let mut decoder = FrameDecoder::new();

        let (consumed, msg) = decoder.decode(&[0x04, 0x00, 0x41]).unwrap();
        assert_eq!(consumed, 3);
        assert!(msg.is_none());
        assert!(!decoder.is_idle());

        let (consumed, msg) = decoder.decode(&[0x42, 0x43]).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(msg.unwrap().payload(), b"ABC");
        assert!(decoder.is_idle());
    }

    #[test]
    fn allocation_failure_is_recoverable() {
        // A declared length near the platform maximum cannot be committed;
        // try_reserve refuses it without aborting.
        let mut wire = vec![0xFF];
        wire.extend_from_slice(&(usize::MAX as u64).to_be_bytes());

        let mut decoder = FrameDecoder::new();
        let err = decoder.decode(&wire).unwrap_err();
        assert!(matches!(err, FrameError::OutOfMemory { .. }));

        // The frame is abandoned, the decoder is idle and keeps decoding.
        assert!(decoder.is_idle());
        let msgs = collect(&mut decoder, &[0x04, 0x00, 0x41, 0x42, 0x43]).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].payload(), b"ABC");
    }

    #[test]
    fn encoded_frames_decode_back() {
        for payload_len in [0usize, 1, 253, 254, 1000] {
            let payload = vec![0x55; payload_len];
            let mut wire = BytesMut::new();
            encode_frame(&payload, payload_len % 2 == 0, &mut wire);

            let mut decoder = FrameDecoder::new();
            let msgs = collect(&mut decoder, &wire).unwrap();

            assert_eq!(msgs.len(), 1, "payload_len {payload_len}");
            assert_eq!(msgs[0].payload(), payload.as_slice());
            assert_eq!(msgs[0].more(), payload_len % 2 == 0);
        }
    }

    #[test]
    fn long_form_split_inside_length_field() {
        let mut wire = BytesMut::new();
        encode_frame(&vec![0x11; 300], false, &mut wire);

        let mut decoder = FrameDecoder::new();

        // Stop partway through the 8-byte length field.
        let (consumed, msg) = decoder.decode(&wire[..5]).unwrap();
        assert_eq!(consumed, 5);
        assert!(msg.is_none());

        let msgs = collect(&mut decoder, &wire[5..]).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].size(), 300);
    }
}
