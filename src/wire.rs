//! Primitive wire codec
//!
//! Every structure in the ledger is built from four primitives:
//! - varint: unsigned LEB128, canonical (no trailing zero groups), at most 10 bytes
//! - blob: varint length followed by that many raw bytes
//! - hash: exactly 32 raw bytes
//! - frame: a blob parsed by a nested [`Reader`]; bytes left over after the known
//!   fields are kept as an [`Extension`] so newer encodings survive a round trip
//!
//! Readers never allocate from a declared length before checking that the bytes
//! are actually there.

use crate::error::{DecodeError, Result};
use crate::hash::Hash;
use serde::{Deserialize, Serialize};

/// Longest canonical varint encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Largest element count accepted for any sequence.
pub const MAX_COUNT: u64 = u32::MAX as u64;

/// Opaque trailing bytes of a frame, carried through re-encoding unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extension(#[serde(with = "hex")] pub Vec<u8>);

impl Extension {
    pub fn new(bytes: Vec<u8>) -> Self {
        Extension(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Bounds-checked cursor over a byte buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Absolute offset of `buf[0]` in the outermost input, for error reporting.
    base: usize,
    /// Set for frame readers: the frame declared its own length, so running
    /// short inside it is a malformed encoding rather than missing input.
    framed: bool,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader {
            buf,
            pos: 0,
            base: 0,
            framed: false,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn short(&self, needed: usize) -> DecodeError {
        if self.framed {
            DecodeError::malformed(
                self.position(),
                format!("frame ends {} byte(s) before its contents", needed),
            )
        } else {
            DecodeError::TruncatedInput {
                offset: self.position(),
                needed,
            }
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.buf.get(self.pos).ok_or_else(|| self.short(1))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = match self.buf.get(self.pos + i) {
                Some(byte) => *byte,
                None => return Err(self.short(1)),
            };
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(DecodeError::malformed(
                    self.position(),
                    "varint overflows 64 bits",
                ));
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                if byte == 0 && i > 0 {
                    return Err(DecodeError::malformed(
                        self.position(),
                        "non-canonical varint encoding",
                    ));
                }
                self.pos += i + 1;
                return Ok(value);
            }
        }
        // Unreachable in practice: the 10th byte either ends the varint or overflows.
        Err(DecodeError::malformed(self.position(), "varint too long"))
    }

    pub fn read_fixed(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.short(len - self.remaining()));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = self.read_varint()?;
        let remaining = self.remaining();
        match usize::try_from(len) {
            Ok(len) if len <= remaining => Ok(len),
            Ok(len) => Err(self.short(len - remaining)),
            Err(_) => Err(self.short(usize::MAX)),
        }
    }

    /// Reads a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        Ok(self.read_fixed(len)?.to_vec())
    }

    pub fn read_hash(&mut self) -> Result<Hash> {
        let bytes = self.read_fixed(32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(Hash::new(out))
    }

    /// Reads an element count, rejecting counts the remaining bytes cannot hold.
    ///
    /// The count is an upper bound only. Callers grow their lists as elements
    /// decode and never reserve from it.
    pub fn read_count(&mut self) -> Result<usize> {
        let start = self.position();
        let count = self.read_varint()?;
        if count > MAX_COUNT {
            return Err(DecodeError::malformed(
                start,
                format!("count {} exceeds maximum {}", count, MAX_COUNT),
            ));
        }
        // Every element takes at least one byte.
        let count = count as usize;
        if count > self.remaining() {
            return Err(self.short(count - self.remaining()));
        }
        Ok(count)
    }

    /// Reads a counted list of byte strings.
    pub fn read_bytes_list(&mut self) -> Result<Vec<Vec<u8>>> {
        let count = self.read_count()?;
        let mut items = Vec::new();
        for index in 0..count {
            items.push(self.read_bytes().map_err(|e| e.at("item", index))?);
        }
        Ok(items)
    }

    /// Reads a blob and returns a reader over its contents.
    pub fn read_frame(&mut self) -> Result<Reader<'a>> {
        let len = self.read_len()?;
        let base = self.position();
        let contents = self.read_fixed(len)?;
        Ok(Reader {
            buf: contents,
            pos: 0,
            base,
            framed: true,
        })
    }

    /// Consumes everything left as an extension.
    pub fn read_extension(&mut self) -> Extension {
        let rest = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        if !rest.is_empty() {
            tracing::debug!(
                offset = self.position() - rest.len(),
                len = rest.len(),
                "preserving unknown extension bytes"
            );
        }
        Extension(rest)
    }
}

/// Decodes one varint from the front of `data`, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut reader = Reader::new(data);
    let value = reader.read_varint()?;
    Ok((value, reader.position()))
}

pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    write_varint(&mut out, value);
    out
}

pub fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

pub fn write_hash(out: &mut Vec<u8>, hash: &Hash) {
    out.extend_from_slice(hash.as_bytes());
}

pub fn write_bytes_list(out: &mut Vec<u8>, items: &[Vec<u8>]) {
    write_varint(out, items.len() as u64);
    for item in items {
        write_bytes(out, item);
    }
}

/// Writes the output of `body` as a length-prefixed frame.
pub fn write_frame(out: &mut Vec<u8>, body: impl FnOnce(&mut Vec<u8>)) {
    let mut contents = Vec::new();
    body(&mut contents);
    write_bytes(out, &contents);
}

/// Canonical binary encoding.
pub trait Encode {
    fn write_to(&self, out: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

/// Structural decoding from the canonical binary encoding.
pub trait Decode: Sized {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self>;

    /// The declared version, if it is newer than this decoder understands.
    fn unsupported_version(&self) -> Option<u64> {
        None
    }

    /// Decodes a value that must span the whole buffer.
    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let value = Self::read_from(&mut reader)?;
        if !reader.is_empty() {
            return Err(match value.unsupported_version() {
                Some(version) => DecodeError::UnsupportedVersion { version },
                None => DecodeError::malformed(
                    reader.position(),
                    format!("{} trailing byte(s)", reader.remaining()),
                ),
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_encode_varint() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(1), vec![0x01]);
        assert_eq!(encode_varint(0x7f), vec![0x7f]);
        assert_eq!(encode_varint(0x80), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xac, 0x02]);
        assert_eq!(encode_varint(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encode_varint(0x4000), vec![0x80, 0x80, 0x01]);
        assert_eq!(
            encode_varint(u64::MAX),
            vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_decode_varint() {
        assert_eq!(decode_varint(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode_varint(&[0x7f]).unwrap(), (0x7f, 1));
        assert_eq!(decode_varint(&[0x80, 0x01]).unwrap(), (0x80, 2));
        assert_eq!(decode_varint(&[0xac, 0x02, 0xff]).unwrap(), (300, 2));
        assert_eq!(
            decode_varint(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]).unwrap(),
            (u64::MAX, 10)
        );
    }

    #[test]
    fn test_varint_boundaries_roundtrip() {
        for value in [0u64, 0x7f, 0x80, 0x3fff, 0x4000, u32::MAX as u64, u64::MAX - 1, u64::MAX] {
            let encoded = encode_varint(value);
            let (decoded, consumed) = decode_varint(&encoded).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn test_decode_varint_truncated() {
        for data in [&[][..], &[0x80][..], &[0xff, 0xff][..], &[0x80, 0x80, 0x80][..]] {
            let err = decode_varint(data).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedInput, "input {:?}", data);
        }
    }

    #[test]
    fn test_decode_varint_rejects_overlong() {
        // 0 and 1 padded with zero continuation groups
        for data in [&[0x80, 0x00][..], &[0x81, 0x00][..], &[0x81, 0x80, 0x00][..]] {
            let err = decode_varint(data).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Malformed, "input {:?}", data);
        }
    }

    #[test]
    fn test_decode_varint_rejects_overflow() {
        let too_big = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert_eq!(decode_varint(&too_big).unwrap_err().kind(), ErrorKind::Malformed);

        let eleven = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert_eq!(decode_varint(&eleven).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_read_bytes_checks_length_before_allocating() {
        // Declares u32::MAX bytes but carries two.
        let mut data = encode_varint(u32::MAX as u64);
        data.extend_from_slice(&[1, 2]);
        let err = Reader::new(&data).read_bytes().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);

        let mut data = encode_varint(u64::MAX);
        data.push(0);
        let err = Reader::new(&data).read_bytes().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_read_count_limits() {
        let data = encode_varint(MAX_COUNT + 1);
        let err = Reader::new(&data).read_count().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);

        let data = [0x05, 0x00, 0x00];
        let err = Reader::new(&data).read_count().unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                offset: 1,
                needed: 3
            }
        );
    }

    #[test]
    fn test_frame_shortfall_is_malformed() {
        // Frame of 2 bytes holding a blob that claims 5.
        let data = [0x02, 0x05, 0xaa];
        let mut reader = Reader::new(&data);
        let mut frame = reader.read_frame().unwrap();
        assert!(reader.is_empty());
        let err = frame.read_bytes().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_frame_extension_and_offsets() {
        let mut data = vec![0xee];
        write_frame(&mut data, |out| {
            write_varint(out, 7);
            out.extend_from_slice(&[0xde, 0xad]);
        });

        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 0xee);
        let mut frame = reader.read_frame().unwrap();
        assert_eq!(frame.position(), 2);
        assert_eq!(frame.read_varint().unwrap(), 7);
        assert_eq!(frame.read_extension(), Extension::new(vec![0xde, 0xad]));
        assert!(frame.is_empty());
    }

    #[test]
    fn test_bytes_list_roundtrip_and_error_context() {
        let items = vec![vec![], vec![1], vec![2, 3, 4]];
        let mut out = Vec::new();
        write_bytes_list(&mut out, &items);
        assert_eq!(Reader::new(&out).read_bytes_list().unwrap(), items);

        // Second item truncated.
        let err = Reader::new(&out[..out.len() - 1]).read_bytes_list().unwrap_err();
        assert!(matches!(err, DecodeError::Element { index: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }
}
