//! Decodes a length-prefixed protobuf stream arriving as arbitrary byte
//! chunks into an ordered sequence of whole message payloads.
//!
//! Ported from the upstream Python client's `ProtobufStreamReader`
//! (`__readVarInt` / `unshiftChunk`), which in turn mirrors
//! `rinsuki-lab/ndgr-reader`'s `protobuf-stream-reader.ts`. Framing is a bare
//! base-128 varint length prefix followed by that many payload bytes — no
//! envelope, no key, no terminator.

use thiserror::Error;

/// Maximum varint width in bytes (enough for a 64-bit value).
const MAX_VARINT_BYTES: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("varint prefix exceeds {MAX_VARINT_BYTES} bytes without terminating")]
    VarintOverflow,
}

/// Buffers arbitrary byte chunks and extracts whole length-prefixed frames.
#[derive(Debug, Default)]
pub struct FramedStreamReader {
    buffer: Vec<u8>,
}

impl FramedStreamReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly-received bytes to the internal buffer.
    pub fn append(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Extract the next whole frame payload, if the buffer currently holds one.
    ///
    /// Returns `Ok(None)` when the buffer holds only a partial varint prefix or
    /// a varint-complete prefix whose declared length exceeds the buffered
    /// bytes — both are partial-frame conditions, not errors. Returns
    /// `Err` only on a corrupt (non-terminating) varint.
    pub fn extract(&mut self) -> Result<Option<Vec<u8>>, FramingError> {
        let Some((offset, len)) = read_varint(&self.buffer)? else {
            return Ok(None);
        };

        if offset + len > self.buffer.len() {
            return Ok(None);
        }

        let message = self.buffer[offset..offset + len].to_vec();
        self.buffer.drain(..offset + len);
        Ok(Some(message))
    }
}

/// Reads one base-128 varint from the front of `buffer`.
///
/// Returns `Ok(None)` if `buffer` doesn't yet contain a complete varint.
/// Returns `Err` if the varint doesn't terminate within [`MAX_VARINT_BYTES`].
fn read_varint(buffer: &[u8]) -> Result<Option<(usize, usize)>, FramingError> {
    let mut offset = 0usize;
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        if offset >= buffer.len() {
            return Ok(None);
        }
        if offset >= MAX_VARINT_BYTES {
            return Err(FramingError::VarintOverflow);
        }

        let current = buffer[offset];
        result |= u64::from(current & 0x7F) << shift;
        offset += 1;
        shift += 7;

        if current & 0x80 == 0 {
            break;
        }
    }

    Ok(Some((offset, result as usize)))
}
