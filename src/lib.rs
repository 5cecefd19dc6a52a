//! ledgerwire - binary codec and content-addressed hashing for a permissioned ledger
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Primitives
//! - [`wire`] - Varints, length-prefixed blobs, frames, `Encode`/`Decode`
//! - [`hash`] - Domain-separated SHA-256 and the transaction Merkle tree
//!
//! ## Ledger Structures
//! - [`transaction`] - Transactions, their codec and time-window checks
//! - [`blockchain`] - Block headers, blocks, their codec and validation
//!
//! ## External Encodings
//! - [`text`] - Hex text framing and serde helpers
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! Decoding is purely structural: a block with a wrong transactions root still
//! decodes, and [`blockchain::validate_block`] reports the mismatch.

#![forbid(unsafe_code)]

// ============================================================================
// Primitives
// ============================================================================
pub mod hash;
pub mod wire;

// ============================================================================
// Ledger Structures
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// External Encodings
// ============================================================================
pub mod text;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{Block, BlockHeader};
pub use error::{DecodeError, ErrorKind, ValidationError};
pub use hash::Hash;
pub use transaction::Tx;
pub use wire::{Decode, Encode};
