use crate::hash::{merkle_root, tagged_hash, Hash, HashKind};
use crate::text::hex_list;
use crate::transaction::Tx;
use crate::wire::Extension;
use chrono::{DateTime, Utc};
use rayon::prelude::*;

/// Highest block header version this crate understands.
pub const BLOCK_VERSION: u64 = 1;

/// Blocks with at least this many transactions hash them on the rayon pool.
pub const PARALLEL_HASH_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockHeader {
    pub version: u64,
    pub height: u64,
    /// All zero for the genesis block.
    pub previous_block_hash: Hash,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Merkle root over the ids of the block's transactions.
    pub transactions_root: Hash,
    /// Commitment to ledger state; opaque to this crate.
    pub assets_root: Hash,
    /// Unknown trailing fields of the commitments frame.
    #[serde(default, skip_serializing_if = "Extension::is_empty")]
    pub extension: Extension,
    /// Program that must be satisfied to extend the chain with the next block.
    #[serde(with = "hex")]
    pub consensus_program: Vec<u8>,
    /// Signatures over the header hash. Not covered by the hash.
    #[serde(with = "hex_list")]
    pub witness: Vec<Vec<u8>>,
}

impl BlockHeader {
    /// Header hash, which is also the block's identifier. The witness is excluded.
    pub fn hash(&self) -> Hash {
        tagged_hash(HashKind::BlockHeader, &self.encode_for_hash())
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp_ms)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Tx>,
}

impl Block {
    /// Assembles an unsigned block, committing the header to `transactions`.
    pub fn new(
        height: u64,
        previous_block_hash: Hash,
        timestamp_ms: u64,
        assets_root: Hash,
        consensus_program: Vec<u8>,
        transactions: Vec<Tx>,
    ) -> Self {
        let transactions_root = Block::calculate_transactions_root(&transactions);

        Block {
            header: BlockHeader {
                version: BLOCK_VERSION,
                height,
                previous_block_hash,
                timestamp_ms,
                transactions_root,
                assets_root,
                extension: Extension::default(),
                consensus_program,
                witness: Vec::new(),
            },
            transactions,
        }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Merkle root over the current transaction list, recomputed on every call.
    pub fn transactions_root(&self) -> Hash {
        Block::calculate_transactions_root(&self.transactions)
    }

    pub fn calculate_transactions_root(transactions: &[Tx]) -> Hash {
        let ids: Vec<Hash> = if transactions.len() >= PARALLEL_HASH_THRESHOLD {
            transactions.par_iter().map(Tx::id).collect()
        } else {
            transactions.iter().map(Tx::id).collect()
        };
        merkle_root(&ids)
    }
}
