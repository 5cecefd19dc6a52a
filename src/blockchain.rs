// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// the header and block types, their wire codec, and semantic validation.

pub mod core;
pub use core::*;
