// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod codec;
pub mod validation;

pub use chain::*;
pub use validation::*;
