/// Transaction types for the ledger
use crate::hash::Hash;
use crate::text::hex_list;
use crate::wire::Extension;
use serde::{Deserialize, Serialize};

/// Highest transaction version this crate understands.
pub const TX_VERSION: u64 = 1;

/// Discriminant byte of an issuance input.
pub const INPUT_TYPE_ISSUANCE: u8 = 0;
/// Discriminant byte of a spend input.
pub const INPUT_TYPE_SPEND: u8 = 1;

pub type AssetId = Hash;

/// A transaction: signed body fields plus per-input/per-output witnesses.
///
/// Values are immutable once built; the identifier and signing hash are
/// derived on demand by [`Tx::id`] and [`Tx::signing_hash`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub version: u64,
    /// Earliest time (ms) the transaction is valid; 0 means unbounded.
    pub min_time: u64,
    /// Latest time (ms) the transaction is valid; 0 means unbounded.
    pub max_time: u64,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(with = "hex")]
    pub reference_data: Vec<u8>,
}

impl Tx {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Tx {
            version: TX_VERSION,
            min_time: 0,
            max_time: 0,
            inputs,
            outputs,
            reference_data: Vec::new(),
        }
    }

    pub fn with_time_window(mut self, min_time: u64, max_time: u64) -> Self {
        self.min_time = min_time;
        self.max_time = max_time;
        self
    }

    pub fn with_reference_data(mut self, reference_data: Vec<u8>) -> Self {
        self.reference_data = reference_data;
        self
    }
}

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    pub tx_id: Hash,
    pub index: u64,
}

/// The signed part of an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputCommitment {
    /// Creates new units of an asset.
    Issuance {
        #[serde(with = "hex")]
        nonce: Vec<u8>,
        asset_id: AssetId,
        amount: u64,
    },
    /// Consumes a previous output.
    Spend {
        outpoint: Outpoint,
        asset_id: AssetId,
        amount: u64,
        #[serde(with = "hex")]
        control_program: Vec<u8>,
    },
}

impl InputCommitment {
    pub fn type_byte(&self) -> u8 {
        match self {
            InputCommitment::Issuance { .. } => INPUT_TYPE_ISSUANCE,
            InputCommitment::Spend { .. } => INPUT_TYPE_SPEND,
        }
    }

    pub fn asset_id(&self) -> &AssetId {
        match self {
            InputCommitment::Issuance { asset_id, .. } | InputCommitment::Spend { asset_id, .. } => {
                asset_id
            }
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            InputCommitment::Issuance { amount, .. } | InputCommitment::Spend { amount, .. } => {
                *amount
            }
        }
    }
}

/// Authorization data for an input; excluded from the signing hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputWitness {
    /// Signatures and other program arguments.
    #[serde(with = "hex_list")]
    pub arguments: Vec<Vec<u8>>,
    /// Program authorizing an issuance; empty for spends.
    #[serde(with = "hex")]
    pub issuance_program: Vec<u8>,
    #[serde(default, skip_serializing_if = "Extension::is_empty")]
    pub extension: Extension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub commitment: InputCommitment,
    #[serde(with = "hex")]
    pub reference_data: Vec<u8>,
    /// Unknown trailing fields of the commitment frame.
    #[serde(default, skip_serializing_if = "Extension::is_empty")]
    pub extension: Extension,
    pub witness: InputWitness,
}

impl TxInput {
    pub fn spend(outpoint: Outpoint, asset_id: AssetId, amount: u64, control_program: Vec<u8>) -> Self {
        TxInput {
            commitment: InputCommitment::Spend {
                outpoint,
                asset_id,
                amount,
                control_program,
            },
            reference_data: Vec::new(),
            extension: Extension::default(),
            witness: InputWitness::default(),
        }
    }

    pub fn issuance(nonce: Vec<u8>, asset_id: AssetId, amount: u64, issuance_program: Vec<u8>) -> Self {
        TxInput {
            commitment: InputCommitment::Issuance {
                nonce,
                asset_id,
                amount,
            },
            reference_data: Vec::new(),
            extension: Extension::default(),
            witness: InputWitness {
                issuance_program,
                ..InputWitness::default()
            },
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<Vec<u8>>) -> Self {
        self.witness.arguments = arguments;
        self
    }

    pub fn is_issuance(&self) -> bool {
        matches!(self.commitment, InputCommitment::Issuance { .. })
    }
}

/// Authorization data for an output. No fields are defined yet; the frame
/// exists so later versions can add some without changing the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputWitness {
    #[serde(default, skip_serializing_if = "Extension::is_empty")]
    pub extension: Extension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub asset_id: AssetId,
    pub amount: u64,
    #[serde(with = "hex")]
    pub control_program: Vec<u8>,
    #[serde(with = "hex")]
    pub reference_data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Extension::is_empty")]
    pub extension: Extension,
    pub witness: OutputWitness,
}

impl TxOutput {
    pub fn new(asset_id: AssetId, amount: u64, control_program: Vec<u8>) -> Self {
        TxOutput {
            asset_id,
            amount,
            control_program,
            reference_data: Vec::new(),
            extension: Extension::default(),
            witness: OutputWitness::default(),
        }
    }
}
