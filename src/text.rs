//! Text adapter: hex framing around the binary codecs
//!
//! The textual form of a header, block or transaction is the hex encoding of
//! its canonical binary encoding. Surrounding whitespace is ignored and either
//! letter case is accepted, so the decoded value (and its hash) never depends
//! on how the text was formatted.

use crate::blockchain::{Block, BlockHeader};
use crate::error::{DecodeError, Result};
use crate::transaction::Tx;
use crate::wire::{Decode, Encode};
use std::fmt;
use std::str::FromStr;

/// Decodes hex text, trimming surrounding ASCII whitespace first.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let start = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let trimmed = start.trim_end_matches(|c: char| c.is_ascii_whitespace());
    // Offsets are reported against `text`, not the trimmed slice.
    let leading = text.len() - start.len();
    if trimmed.len() % 2 != 0 {
        return Err(DecodeError::malformed(
            leading,
            format!("hex text has odd length {}", trimmed.len()),
        ));
    }
    hex::decode(trimmed).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => DecodeError::malformed(
            leading + index,
            format!("invalid hex character {:?}", c),
        ),
        other => other.into(),
    })
}

/// Lowercase hex of the canonical encoding.
pub fn to_text<T: Encode>(value: &T) -> String {
    hex::encode(value.encode())
}

/// Hex text to a value that must span the whole decoded buffer.
pub fn decode_text<T: Decode>(text: &str) -> Result<T> {
    T::decode(&decode_hex(text)?)
}

macro_rules! impl_text {
    ($ty:ty) => {
        impl $ty {
            pub fn decode_text(text: &str) -> Result<Self> {
                decode_text(text)
            }

            pub fn to_text(&self) -> String {
                to_text(self)
            }
        }

        impl FromStr for $ty {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self> {
                decode_text(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&to_text(self))
            }
        }
    };
}

impl_text!(Tx);
impl_text!(BlockHeader);
impl_text!(Block);

/// Serde helper for lists of byte strings, written as arrays of hex strings.
pub mod hex_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(items.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        let items = Vec::<String>::deserialize(deserializer)?;
        items
            .iter()
            .map(|item| hex::decode(item).map_err(serde::de::Error::custom))
            .collect()
    }
}
