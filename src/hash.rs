//! Hash engine: domain-separated SHA-256 and the transaction Merkle tree
//!
//! Every digest is taken over `varint(len(tag)) || tag || data`, where the tag is
//! fixed per [`HashKind`]. Two different kinds of structure therefore never hash
//! to the same identifier even if their encodings happen to coincide.

use crate::error::DecodeError;
use crate::wire::encode_varint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Size of every identifier, in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte digest or identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string (either case).
    pub fn from_hex(hex_str: &str) -> Result<Self, DecodeError> {
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str.trim(), &mut bytes)?;
        Ok(Hash(bytes))
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// What a digest identifies. Each kind hashes under its own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    BlockHeader,
    TxId,
    TxSigHash,
    MerkleLeaf,
    MerkleNode,
}

impl HashKind {
    /// Domain separation tag. These values are part of the protocol.
    pub const fn tag(self) -> &'static [u8] {
        match self {
            HashKind::BlockHeader => b"ledgerwire/v1/block-header",
            HashKind::TxId => b"ledgerwire/v1/tx-id",
            HashKind::TxSigHash => b"ledgerwire/v1/tx-sighash",
            HashKind::MerkleLeaf => b"ledgerwire/v1/merkle-leaf",
            HashKind::MerkleNode => b"ledgerwire/v1/merkle-node",
        }
    }
}

fn tagged_hasher(kind: HashKind) -> Sha256 {
    let tag = kind.tag();
    let mut hasher = Sha256::new();
    hasher.update(encode_varint(tag.len() as u64));
    hasher.update(tag);
    hasher
}

/// Hashes `data` under the tag for `kind`.
pub fn tagged_hash(kind: HashKind, data: &[u8]) -> Hash {
    let mut hasher = tagged_hasher(kind);
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// Root of the tree with no leaves.
pub static EMPTY_TREE_ROOT: Lazy<Hash> = Lazy::new(|| tagged_hash(HashKind::MerkleNode, &[]));

fn merkle_node(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = tagged_hasher(HashKind::MerkleNode);
    hasher.update(left.0);
    hasher.update(right.0);
    Hash(hasher.finalize().into())
}

/// Merkle root over an ordered list of leaf hashes.
///
/// A list of `n > 1` leaves is split at the largest power of two below `n`,
/// and the two halves are hashed recursively. Leaves are never duplicated: an
/// odd subtree on the right is carried up as-is. A single leaf is hashed under
/// the leaf tag, and the empty list yields [`EMPTY_TREE_ROOT`].
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    match leaves {
        [] => *EMPTY_TREE_ROOT,
        [leaf] => tagged_hash(HashKind::MerkleLeaf, leaf.as_bytes()),
        _ => {
            let split = largest_power_of_two_below(leaves.len());
            let left = merkle_root(&leaves[..split]);
            let right = merkle_root(&leaves[split..]);
            merkle_node(&left, &right)
        }
    }
}

fn largest_power_of_two_below(n: usize) -> usize {
    debug_assert!(n > 1);
    let mut k = 1;
    while k * 2 < n {
        k *= 2;
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Hash {
        Hash::new([byte; HASH_SIZE])
    }

    #[test]
    fn test_tagged_hash_matches_manual_construction() {
        let tag = HashKind::TxId.tag();
        let mut manual = Sha256::new();
        manual.update([tag.len() as u8]);
        manual.update(tag);
        manual.update(b"payload");
        let expected: [u8; 32] = manual.finalize().into();

        assert_eq!(tagged_hash(HashKind::TxId, b"payload"), Hash::new(expected));
    }

    #[test]
    fn test_domain_separation() {
        let data = b"same bytes";
        let kinds = [
            HashKind::BlockHeader,
            HashKind::TxId,
            HashKind::TxSigHash,
            HashKind::MerkleLeaf,
            HashKind::MerkleNode,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(tagged_hash(*a, data), tagged_hash(*b, data), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_merkle_root_empty_and_single() {
        assert_eq!(merkle_root(&[]), *EMPTY_TREE_ROOT);
        assert_eq!(merkle_root(&[]), tagged_hash(HashKind::MerkleNode, b""));

        let a = leaf(1);
        assert_eq!(merkle_root(&[a]), tagged_hash(HashKind::MerkleLeaf, a.as_bytes()));
        assert_ne!(merkle_root(&[a]), a);
    }

    #[test]
    fn test_merkle_root_three_leaves_carries_odd_leaf() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let ha = merkle_root(&[a]);
        let hb = merkle_root(&[b]);
        let hc = merkle_root(&[c]);

        let expected = merkle_node(&merkle_node(&ha, &hb), &hc);
        assert_eq!(merkle_root(&[a, b, c]), expected);

        // Duplicating the last leaf must not produce the same root.
        assert_ne!(merkle_root(&[a, b, c]), merkle_root(&[a, b, c, c]));
    }

    #[test]
    fn test_merkle_root_five_leaves_split() {
        let leaves: Vec<Hash> = (1..=5).map(leaf).collect();
        let expected = merkle_node(&merkle_root(&leaves[..4]), &merkle_root(&leaves[4..]));
        assert_eq!(merkle_root(&leaves), expected);
    }

    #[test]
    fn test_merkle_root_is_order_sensitive() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        assert_ne!(merkle_root(&[a, b, c]), merkle_root(&[b, a, c]));
        assert_eq!(merkle_root(&[a, b, c]), merkle_root(&[a, b, c]));
    }

    #[test]
    fn test_largest_power_of_two_below() {
        assert_eq!(largest_power_of_two_below(2), 1);
        assert_eq!(largest_power_of_two_below(3), 2);
        assert_eq!(largest_power_of_two_below(4), 2);
        assert_eq!(largest_power_of_two_below(5), 4);
        assert_eq!(largest_power_of_two_below(9), 8);
    }

    #[test]
    fn test_hash_hex_roundtrip_and_case() {
        let h = tagged_hash(HashKind::BlockHeader, b"x");
        let upper = h.to_hex().to_uppercase();
        assert_eq!(upper.parse::<Hash>().unwrap(), h);
        assert_eq!(format!(" {}\n", h).parse::<Hash>().unwrap(), h);
        assert!("abcd".parse::<Hash>().is_err());
        assert!(Hash::ZERO.is_zero());
        assert!(!h.is_zero());
    }

    #[test]
    fn test_hash_serde_as_hex_string() {
        let h = leaf(0xab);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
