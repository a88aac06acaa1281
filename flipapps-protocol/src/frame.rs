//! Byte framing shared by both links.
//!
//! ```text
//! 0xAA | len lo | len hi | type | payload[len] | xor
//! ```
//!
//! `xor` covers both length bytes, the type byte and the payload. Lengths
//! above [`MAX_PAYLOAD_SIZE`] are rejected while the header is still being
//! read, so a corrupt length never makes the parser wait for 64 KiB.

use core::fmt;

use heapless::Vec;

/// Marks the first byte of every frame
pub const FRAME_START: u8 = 0xAA;

/// Largest payload a frame may carry
pub const MAX_PAYLOAD_SIZE: usize = 4096;

/// Start byte, two length bytes, type byte and checksum
const OVERHEAD: usize = 5;

/// Largest frame on the wire
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + OVERHEAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Payload longer than [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    InvalidChecksum,
    /// Bad header, or a frame whose type or contents do not fit the message
    InvalidFrame,
    BufferTooSmall,
    /// A message could not be serialized into a payload
    Encode,
    /// A payload did not deserialize as the expected message
    Decode,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FrameError::PayloadTooLarge => "payload exceeds maximum frame size",
            FrameError::InvalidChecksum => "frame checksum mismatch",
            FrameError::InvalidFrame => "invalid frame",
            FrameError::BufferTooSmall => "buffer too small for frame",
            FrameError::Encode => "message could not be encoded",
            FrameError::Decode => "message could not be decoded",
        };
        f.write_str(text)
    }
}

impl core::error::Error for FrameError {}

fn xor_all(seed: u8, bytes: &[u8]) -> u8 {
    bytes.iter().fold(seed, |acc, &byte| acc ^ byte)
}

/// One typed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Bytes needed by [`Frame::encode`]
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + OVERHEAD
    }

    fn header(&self) -> [u8; 4] {
        let [lo, hi] = (self.payload.len() as u16).to_le_bytes();
        [FRAME_START, lo, hi, self.msg_type]
    }

    /// Write the frame to the front of `out`, returning the bytes used
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let total = self.encoded_len();
        let Some(out) = out.get_mut(..total) else {
            return Err(FrameError::BufferTooSmall);
        };

        let header = self.header();
        let (head, rest) = out.split_at_mut(header.len());
        let (body, tail) = rest.split_at_mut(self.payload.len());
        head.copy_from_slice(&header);
        body.copy_from_slice(&self.payload);
        tail[0] = xor_all(xor_all(0, &header[1..]), &self.payload);
        Ok(total)
    }

    pub fn encode_to_vec(&self) -> alloc::vec::Vec<u8> {
        let header = self.header();
        let mut out = alloc::vec::Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.payload);
        out.push(xor_all(xor_all(0, &header[1..]), &self.payload));
        out
    }
}

/// Where the parser is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Skipping bytes until [`FRAME_START`]
    Hunting,
    LengthLow,
    LengthHigh { lo: u8 },
    Kind { length: u16 },
    Payload { length: u16 },
    Checksum,
}

/// Incremental frame decoder
///
/// Bytes may arrive in any split. After an error the parser is back to
/// hunting for the next start byte, so a stream recovers on its own.
#[derive(Debug, Clone)]
pub struct FrameParser {
    phase: Phase,
    msg_type: u8,
    running: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            phase: Phase::Hunting,
            msg_type: 0,
            running: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn fail(&mut self, error: FrameError) -> Result<Option<Frame>, FrameError> {
        self.reset();
        Err(error)
    }

    /// Advance by one byte; yields a frame once its checksum verifies
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        if !matches!(self.phase, Phase::Hunting | Phase::Checksum) {
            self.running ^= byte;
        }

        match self.phase {
            Phase::Hunting => {
                if byte == FRAME_START {
                    self.running = 0;
                    self.phase = Phase::LengthLow;
                }
            }
            Phase::LengthLow => self.phase = Phase::LengthHigh { lo: byte },
            Phase::LengthHigh { lo } => {
                let length = u16::from_le_bytes([lo, byte]);
                if usize::from(length) > MAX_PAYLOAD_SIZE {
                    return self.fail(FrameError::InvalidFrame);
                }
                self.phase = Phase::Kind { length };
            }
            Phase::Kind { length } => {
                self.msg_type = byte;
                self.payload.clear();
                self.phase = match length {
                    0 => Phase::Checksum,
                    length => Phase::Payload { length },
                };
            }
            Phase::Payload { length } => {
                if self.payload.push(byte).is_err() {
                    return self.fail(FrameError::PayloadTooLarge);
                }
                if self.payload.len() == usize::from(length) {
                    self.phase = Phase::Checksum;
                }
            }
            Phase::Checksum => {
                if byte != self.running {
                    return self.fail(FrameError::InvalidChecksum);
                }
                let frame = Frame {
                    msg_type: self.msg_type,
                    payload: core::mem::take(&mut self.payload),
                };
                self.reset();
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Feed `bytes` until one frame completes or an error is hit
    ///
    /// Returns how many bytes were consumed alongside the outcome, on the
    /// error path too. The remainder belongs to the next frame.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, Result<Option<Frame>, FrameError>) {
        for (index, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                outcome => return (index + 1, outcome),
            }
        }
        (bytes.len(), Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use proptest::prelude::*;

    fn parse_all(bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        FrameParser::new().feed_bytes(bytes).1
    }

    #[test]
    fn test_empty_frame_layout() {
        let mut out = [0u8; 8];
        let used = Frame::empty(0x02).encode(&mut out).unwrap();

        assert_eq!(&out[..used], &[FRAME_START, 0, 0, 0x02, 0x02]);
    }

    #[test]
    fn test_encode_matches_encode_to_vec() {
        let frame = Frame::new(0x21, &[7, 0, 255, 16]).unwrap();
        let mut out = [0u8; 16];
        let used = frame.encode(&mut out).unwrap();

        assert_eq!(&out[..used], frame.encode_to_vec().as_slice());
    }

    #[test]
    fn test_encode_into_short_buffer() {
        let frame = Frame::new(0x01, &[1, 2, 3]).unwrap();
        let mut out = [0u8; 7];
        assert_eq!(frame.encode(&mut out), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_length_spans_two_bytes() {
        let frame = Frame::new(0x01, &[0x55; 300]).unwrap();
        let wire = frame.encode_to_vec();

        assert_eq!(wire.len(), 305);
        assert_eq!(u16::from_le_bytes([wire[1], wire[2]]), 300);
        assert_eq!(parse_all(&wire), Ok(Some(frame)));
    }

    #[test]
    fn test_bitmap_sized_payload_survives_split_delivery() {
        let payload: vec::Vec<u8> = (0..=255u8).cycle().take(MAX_PAYLOAD_SIZE).collect();
        let frame = Frame::new(0x40, &payload).unwrap();
        let wire = frame.encode_to_vec();

        let mut parser = FrameParser::new();
        let mut parsed = None;
        for chunk in wire.chunks(97) {
            let (used, frame) = parser.feed_bytes(chunk);
            assert_eq!(used, chunk.len());
            parsed = parsed.or(frame.unwrap());
        }
        assert_eq!(parsed, Some(frame));
    }

    #[test]
    fn test_corrupt_payload_fails_checksum() {
        let mut wire = Frame::new(0x03, &[10, 20, 30]).unwrap().encode_to_vec();
        wire[5] ^= 0x01;
        assert_eq!(parse_all(&wire), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_oversized_length_rejected_before_payload() {
        let [lo, hi] = (MAX_PAYLOAD_SIZE as u16 + 1).to_le_bytes();
        let mut parser = FrameParser::new();

        assert_eq!(parser.feed(FRAME_START), Ok(None));
        assert_eq!(parser.feed(lo), Ok(None));
        assert_eq!(parser.feed(hi), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_skips_noise_before_start() {
        let mut wire = vec![0x00, 0x13, 0x37, 0xFF];
        wire.extend(Frame::empty(0x11).encode_to_vec());

        assert_eq!(parse_all(&wire).unwrap().unwrap().msg_type, 0x11);
    }

    #[test]
    fn test_recovers_after_bad_frame() {
        let mut bad = Frame::empty(0x05).encode_to_vec();
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        let good = Frame::new(0x06, &[1]).unwrap().encode_to_vec();

        let mut wire = bad.clone();
        wire.extend_from_slice(&good);

        let mut parser = FrameParser::new();
        let (used, outcome) = parser.feed_bytes(&wire);
        assert_eq!((used, outcome), (bad.len(), Err(FrameError::InvalidChecksum)));

        let (used, outcome) = parser.feed_bytes(&wire[used..]);
        assert_eq!(used, good.len());
        assert_eq!(outcome.unwrap().unwrap().payload.as_slice(), &[1]);
    }

    #[test]
    fn test_stops_after_first_frame() {
        let first = Frame::new(0x01, &[9]).unwrap().encode_to_vec();
        let mut wire = first.clone();
        wire.extend(Frame::new(0x02, &[8]).unwrap().encode_to_vec());

        let mut parser = FrameParser::new();
        let (used, frame) = parser.feed_bytes(&wire);
        assert_eq!((frame.unwrap().unwrap().msg_type, used), (0x01, first.len()));

        let (_, frame) = parser.feed_bytes(&wire[used..]);
        assert_eq!(frame.unwrap().unwrap().msg_type, 0x02);
    }

    #[test]
    fn test_new_rejects_oversized_payload() {
        assert_eq!(
            Frame::new(0x01, &[0u8; MAX_PAYLOAD_SIZE + 1]),
            Err(FrameError::PayloadTooLarge)
        );
    }

    proptest! {
        #[test]
        fn parser_never_panics_on_noise(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut parser = FrameParser::new();
            for byte in bytes {
                let _ = parser.feed(byte);
            }
        }

        #[test]
        fn any_payload_parses_back(kind in any::<u8>(), payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            let frame = Frame::new(kind, &payload).unwrap();
            prop_assert_eq!(parse_all(&frame.encode_to_vec()), Ok(Some(frame)));
        }
    }
}
