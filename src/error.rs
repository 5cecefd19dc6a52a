//! Error types for ledgerwire
//!
//! Structural decoding and semantic validation fail with different types. A
//! block whose commitment is wrong still decodes; the mismatch is reported by
//! [`ValidationError`] instead of [`DecodeError`].

use crate::hash::Hash;
use thiserror::Error;

/// The three ways a decode can fail, independent of where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Fewer bytes were available than a field declared.
    TruncatedInput,
    /// The bytes do not form a valid encoding.
    Malformed,
    /// The value declares a version this decoder cannot interpret.
    UnsupportedVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated input at offset {offset}: {needed} more byte(s) required")]
    TruncatedInput { offset: usize, needed: usize },

    #[error("malformed input at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("unsupported version {version}")]
    UnsupportedVersion { version: u64 },

    /// A nested element failed; `index` is its position in the enclosing list.
    #[error("{context} {index}: {source}")]
    Element {
        context: &'static str,
        index: usize,
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// Wraps `self` with the position of the element that failed.
    pub fn at(self, context: &'static str, index: usize) -> Self {
        DecodeError::Element {
            context,
            index,
            source: Box::new(self),
        }
    }

    /// The kind of the innermost failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            DecodeError::Malformed { .. } => ErrorKind::Malformed,
            DecodeError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            DecodeError::Element { source, .. } => source.kind(),
        }
    }
}

impl From<hex::FromHexError> for DecodeError {
    fn from(err: hex::FromHexError) -> Self {
        let offset = match err {
            hex::FromHexError::InvalidHexCharacter { index, .. } => index,
            _ => 0,
        };
        DecodeError::malformed(offset, format!("invalid hex: {}", err))
    }
}

/// Semantic checks that run after a successful decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("genesis block header references previous block {0}")]
    GenesisHasParent(Hash),

    #[error("block header at height {0} has no previous block hash")]
    MissingParent(u64),

    #[error("transactions root mismatch: header commits to {committed}, transactions hash to {computed}")]
    TransactionsRootMismatch { committed: Hash, computed: Hash },

    #[error("transaction {index}: min time {min_time} is after max time {max_time}")]
    InvalidTimeWindow {
        index: usize,
        min_time: u64,
        max_time: u64,
    },
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, DecodeError>;
