//! Transaction module split into types, codec and validation

pub mod codec;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::validate_tx_time_window;
