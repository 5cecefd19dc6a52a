//! Binary encoding of block headers and blocks
//!
//! ```text
//! header := version, height                          varints
//!           previous_block_hash                      32 bytes
//!           timestamp_ms                             varint
//!           frame(transactions_root, assets_root, extension)
//!           consensus_program                        blob
//!           witness                                  count + blobs
//! block  := header, count + transactions
//! ```

use super::chain::{Block, BlockHeader, BLOCK_VERSION};
use crate::error::Result;
use crate::transaction::Tx;
use crate::wire::{
    write_bytes, write_bytes_list, write_frame, write_hash, write_varint, Decode, Encode, Reader,
};

impl BlockHeader {
    /// Canonical encoding without the witness; this is what the header hash covers.
    pub fn encode_for_hash(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_unsigned(&mut out);
        out
    }

    fn write_unsigned(&self, out: &mut Vec<u8>) {
        write_varint(out, self.version);
        write_varint(out, self.height);
        write_hash(out, &self.previous_block_hash);
        write_varint(out, self.timestamp_ms);
        write_frame(out, |frame| {
            write_hash(frame, &self.transactions_root);
            write_hash(frame, &self.assets_root);
            frame.extend_from_slice(self.extension.as_bytes());
        });
        write_bytes(out, &self.consensus_program);
    }
}

impl Encode for BlockHeader {
    fn write_to(&self, out: &mut Vec<u8>) {
        self.write_unsigned(out);
        write_bytes_list(out, &self.witness);
    }
}

impl Decode for BlockHeader {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        let version = reader.read_varint()?;
        let height = reader.read_varint()?;
        let previous_block_hash = reader.read_hash()?;
        let timestamp_ms = reader.read_varint()?;

        let mut commitments = reader.read_frame()?;
        let transactions_root = commitments.read_hash()?;
        let assets_root = commitments.read_hash()?;
        let extension = commitments.read_extension();

        let consensus_program = reader.read_bytes()?;
        let witness = reader.read_bytes_list()?;

        if version > BLOCK_VERSION {
            tracing::debug!(version, height, "decoded block header with newer version");
        }

        Ok(BlockHeader {
            version,
            height,
            previous_block_hash,
            timestamp_ms,
            transactions_root,
            assets_root,
            extension,
            consensus_program,
            witness,
        })
    }

    fn unsupported_version(&self) -> Option<u64> {
        (self.version > BLOCK_VERSION).then_some(self.version)
    }
}

impl Encode for Block {
    fn write_to(&self, out: &mut Vec<u8>) {
        self.header.write_to(out);
        write_varint(out, self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.write_to(out);
        }
    }
}

impl Decode for Block {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        let start = reader.position();
        let header = BlockHeader::read_from(reader)?;

        let tx_count = reader.read_count()?;
        tracing::trace!(height = header.height, tx_count, "decoding block");

        let mut transactions = Vec::new();
        for index in 0..tx_count {
            let tx = Tx::read_from(reader).map_err(|e| e.at("transaction", index))?;
            transactions.push(tx);
        }

        tracing::trace!(
            height = header.height,
            len = reader.position() - start,
            "decoded block"
        );
        Ok(Block {
            header,
            transactions,
        })
    }

    /// Trailing bytes follow the last transaction, so a newer version there
    /// counts as well as one in the header.
    fn unsupported_version(&self) -> Option<u64> {
        self.header.unsupported_version().or_else(|| {
            self.transactions
                .last()
                .and_then(|tx| tx.unsupported_version())
        })
    }
}
