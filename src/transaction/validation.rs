/// Semantic checks for transactions, kept apart from decoding
use crate::error::ValidationError;
use crate::transaction::types::Tx;

impl Tx {
    /// Checks that the validity window is not inverted. A zero bound is open.
    pub fn validate_time_window(&self) -> Result<(), ValidationError> {
        validate_tx_time_window(0, self)
    }
}

/// Like [`Tx::validate_time_window`], reporting `index` as the transaction's
/// position in its block.
pub fn validate_tx_time_window(index: usize, tx: &Tx) -> Result<(), ValidationError> {
    if tx.min_time != 0 && tx.max_time != 0 && tx.min_time > tx.max_time {
        return Err(ValidationError::InvalidTimeWindow {
            index,
            min_time: tx.min_time,
            max_time: tx.max_time,
        });
    }
    Ok(())
}
