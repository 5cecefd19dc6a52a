use crate::error::ValidationError;
use crate::transaction::validate_tx_time_window;

use super::chain::{Block, BlockHeader};

/// Checks the genesis linkage rule: only height 0 may have a zero parent.
pub fn validate_header(header: &BlockHeader) -> Result<(), ValidationError> {
    match (header.is_genesis(), header.previous_block_hash.is_zero()) {
        (true, false) => Err(ValidationError::GenesisHasParent(header.previous_block_hash)),
        (false, true) => Err(ValidationError::MissingParent(header.height)),
        _ => Ok(()),
    }
}

/// Checks a decoded block against its own header: linkage, the transactions
/// commitment, and each transaction's time window.
pub fn validate_block(block: &Block) -> Result<(), ValidationError> {
    validate_header(&block.header)?;

    let computed = block.transactions_root();
    if computed != block.header.transactions_root {
        return Err(ValidationError::TransactionsRootMismatch {
            committed: block.header.transactions_root,
            computed,
        });
    }

    for (index, tx) in block.transactions.iter().enumerate() {
        validate_tx_time_window(index, tx)?;
    }
    Ok(())
}
