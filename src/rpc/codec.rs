//! Length-prefix frame codec.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────┬──────────────────────────┐
//! │ Length (msgpack uint)│ msgpack message (N B)    │
//! │ 1, 2, 3, 5 or 9 B    │                          │
//! └──────────────────────┴──────────────────────────┘
//! ```
//!
//! The codec accumulates incoming bytes into a buffer and yields
//! complete frames. This handles partial reads gracefully: a
//! single `Transport::read` call may return part of the header,
//! part of the payload, or multiple frames concatenated.

/// Default maximum frame payload size (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Framing and message-shape failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("bad frame length prefix marker 0x{0:02x}")]
    BadLengthPrefix(u8),

    #[error("frame of {size} bytes exceeds limit of {max}")]
    FrameTooLarge { size: u64, max: usize },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("encode: {0}")]
    Encode(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        CodecError::Encode(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        CodecError::Decode(e.to_string())
    }
}

/// Parse a msgpack integer length prefix.
///
/// Returns `Ok(None)` when more bytes are needed, otherwise
/// `(header_len, payload_len)`. Peers emit either the unsigned or the
/// signed integer family, so both are accepted; negative lengths are not.
fn parse_length_prefix(buf: &[u8]) -> Result<Option<(usize, u64)>, CodecError> {
    let Some(&marker) = buf.first() else {
        return Ok(None);
    };

    let width = match marker {
        0x00..=0x7f => return Ok(Some((1, u64::from(marker)))),
        0xcc | 0xd0 => 1,
        0xcd | 0xd1 => 2,
        0xce | 0xd2 => 4,
        0xcf | 0xd3 => 8,
        other => return Err(CodecError::BadLengthPrefix(other)),
    };

    if buf.len() < 1 + width {
        return Ok(None);
    }

    let mut be = [0u8; 8];
    be[8 - width..].copy_from_slice(&buf[1..=width]);
    let raw = u64::from_be_bytes(be);

    let signed = (0xd0..=0xd3).contains(&marker);
    if signed && (raw >> (width * 8 - 1)) & 1 == 1 {
        return Err(CodecError::BadLengthPrefix(marker));
    }

    Ok(Some((1 + width, raw)))
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_frame_size: usize,
}

impl FrameDecoder {
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_size,
        }
    }

    /// Append bytes read from the transport.
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Pop the next complete frame payload, if one is buffered.
    ///
    /// On error the buffer is discarded: the stream can no longer be
    /// trusted to be aligned on a frame boundary.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, CodecError> {
        let (header_len, size) = match parse_length_prefix(&self.buf) {
            Ok(Some(h)) => h,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        let total = usize::try_from(size)
            .ok()
            .filter(|&n| n <= self.max_frame_size)
            .and_then(|n| n.checked_add(header_len));
        let Some(total) = total else {
            self.reset();
            return Err(CodecError::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        };

        if self.buf.len() < total {
            return Ok(None);
        }

        let frame = self.buf[header_len..total].to_vec();
        self.buf.drain(..total);
        Ok(Some(frame))
    }

    /// Bytes held waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Reset decoder state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

/// Prefix `payload` with its length as the smallest msgpack uint.
pub fn encode_frame(payload: &[u8], max_frame_size: usize) -> Result<Vec<u8>, CodecError> {
    let len = payload.len();
    if len > max_frame_size {
        return Err(CodecError::FrameTooLarge {
            size: len as u64,
            max: max_frame_size,
        });
    }

    let mut out = Vec::with_capacity(len + 9);
    if len < 0x80 {
        out.push(len as u8);
    } else if let Ok(n) = u8::try_from(len) {
        out.push(0xcc);
        out.push(n);
    } else if let Ok(n) = u16::try_from(len) {
        out.push(0xcd);
        out.extend_from_slice(&n.to_be_bytes());
    } else if let Ok(n) = u32::try_from(len) {
        out.push(0xce);
        out.extend_from_slice(&n.to_be_bytes());
    } else {
        out.push(0xcf);
        out.extend_from_slice(&(len as u64).to_be_bytes());
    }
    out.extend_from_slice(payload);
    Ok(out)
}

// ── Tests ────────────────────────────────────────────────────
