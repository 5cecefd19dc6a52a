//! Binary encoding of transactions
//!
//! Layout:
//!
//! ```text
//! version, min_time, max_time                       varints
//! count + input commitment frames
//! count + output commitment frames
//! reference_data                                    blob     (end of body)
//! one input witness frame per input
//! one output witness frame per output
//! ```
//!
//! The body alone feeds the signing hash; body and witnesses together feed the
//! transaction id.

use super::types::*;
use crate::error::{DecodeError, Result};
use crate::hash::{tagged_hash, Hash, HashKind};
use crate::wire::{
    write_bytes, write_bytes_list, write_frame, write_hash, write_varint, Decode, Encode, Reader,
};

impl Tx {
    /// Identifier over the full canonical encoding, witnesses included.
    pub fn id(&self) -> Hash {
        tagged_hash(HashKind::TxId, &self.encode())
    }

    /// Hash signed by key holders; unaffected by witness data.
    pub fn signing_hash(&self) -> Hash {
        tagged_hash(HashKind::TxSigHash, &self.encode_body())
    }

    pub fn encode_body(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_body(&mut out);
        out
    }

    fn write_body(&self, out: &mut Vec<u8>) {
        write_varint(out, self.version);
        write_varint(out, self.min_time);
        write_varint(out, self.max_time);

        write_varint(out, self.inputs.len() as u64);
        for input in &self.inputs {
            write_frame(out, |frame| input.write_commitment(frame));
        }

        write_varint(out, self.outputs.len() as u64);
        for output in &self.outputs {
            write_frame(out, |frame| output.write_commitment(frame));
        }

        write_bytes(out, &self.reference_data);
    }

    fn write_witnesses(&self, out: &mut Vec<u8>) {
        for input in &self.inputs {
            write_frame(out, |frame| input.witness.write_to(frame));
        }
        for output in &self.outputs {
            write_frame(out, |frame| output.witness.write_to(frame));
        }
    }
}

impl Encode for Tx {
    fn write_to(&self, out: &mut Vec<u8>) {
        self.write_body(out);
        self.write_witnesses(out);
    }
}

impl Decode for Tx {
    fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        let start = reader.position();
        let version = reader.read_varint()?;
        let min_time = reader.read_varint()?;
        let max_time = reader.read_varint()?;
        if version > TX_VERSION {
            tracing::debug!(version, offset = start, "decoding transaction with newer version");
        }

        let input_count = reader.read_count()?;
        let mut inputs = Vec::new();
        for index in 0..input_count {
            let input = reader
                .read_frame()
                .and_then(|mut frame| TxInput::read_commitment(&mut frame))
                .map_err(|e| e.at("input", index))?;
            inputs.push(input);
        }

        let output_count = reader.read_count()?;
        let mut outputs = Vec::new();
        for index in 0..output_count {
            let output = reader
                .read_frame()
                .and_then(|mut frame| TxOutput::read_commitment(&mut frame))
                .map_err(|e| e.at("output", index))?;
            outputs.push(output);
        }

        let reference_data = reader.read_bytes()?;

        for (index, input) in inputs.iter_mut().enumerate() {
            input.witness = reader
                .read_frame()
                .and_then(|mut frame| InputWitness::read_from(&mut frame))
                .map_err(|e| e.at("input witness", index))?;
        }
        for (index, output) in outputs.iter_mut().enumerate() {
            output.witness = reader
                .read_frame()
                .and_then(|mut frame| OutputWitness::read_from(&mut frame))
                .map_err(|e| e.at("output witness", index))?;
        }

        tracing::trace!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            len = reader.position() - start,
            "decoded transaction"
        );

        Ok(Tx {
            version,
            min_time,
            max_time,
            inputs,
            outputs,
            reference_data,
        })
    }

    fn unsupported_version(&self) -> Option<u64> {
        (self.version > TX_VERSION).then_some(self.version)
    }
}

impl TxInput {
    fn write_commitment(&self, out: &mut Vec<u8>) {
        out.push(self.commitment.type_byte());
        match &self.commitment {
            InputCommitment::Issuance {
                nonce,
                asset_id,
                amount,
            } => {
                write_bytes(out, nonce);
                write_hash(out, asset_id);
                write_varint(out, *amount);
            }
            InputCommitment::Spend {
                outpoint,
                asset_id,
                amount,
                control_program,
            } => {
                write_hash(out, &outpoint.tx_id);
                write_varint(out, outpoint.index);
                write_hash(out, asset_id);
                write_varint(out, *amount);
                write_bytes(out, control_program);
            }
        }
        write_bytes(out, &self.reference_data);
        out.extend_from_slice(self.extension.as_bytes());
    }

    /// Reads a commitment frame; the witness is filled in by the second pass.
    fn read_commitment(frame: &mut Reader<'_>) -> Result<Self> {
        let type_offset = frame.position();
        let commitment = match frame.read_u8()? {
            INPUT_TYPE_ISSUANCE => InputCommitment::Issuance {
                nonce: frame.read_bytes()?,
                asset_id: frame.read_hash()?,
                amount: frame.read_varint()?,
            },
            INPUT_TYPE_SPEND => InputCommitment::Spend {
                outpoint: Outpoint {
                    tx_id: frame.read_hash()?,
                    index: frame.read_varint()?,
                },
                asset_id: frame.read_hash()?,
                amount: frame.read_varint()?,
                control_program: frame.read_bytes()?,
            },
            other => {
                return Err(DecodeError::malformed(
                    type_offset,
                    format!("unknown input type {}", other),
                ))
            }
        };
        let reference_data = frame.read_bytes()?;
        let extension = frame.read_extension();

        Ok(TxInput {
            commitment,
            reference_data,
            extension,
            witness: InputWitness::default(),
        })
    }
}

impl Encode for InputWitness {
    fn write_to(&self, out: &mut Vec<u8>) {
        write_bytes_list(out, &self.arguments);
        write_bytes(out, &self.issuance_program);
        out.extend_from_slice(self.extension.as_bytes());
    }
}

impl Decode for InputWitness {
    fn read_from(frame: &mut Reader<'_>) -> Result<Self> {
        Ok(InputWitness {
            arguments: frame.read_bytes_list()?,
            issuance_program: frame.read_bytes()?,
            extension: frame.read_extension(),
        })
    }
}

impl TxOutput {
    fn write_commitment(&self, out: &mut Vec<u8>) {
        write_hash(out, &self.asset_id);
        write_varint(out, self.amount);
        write_bytes(out, &self.control_program);
        write_bytes(out, &self.reference_data);
        out.extend_from_slice(self.extension.as_bytes());
    }

    fn read_commitment(frame: &mut Reader<'_>) -> Result<Self> {
        Ok(TxOutput {
            asset_id: frame.read_hash()?,
            amount: frame.read_varint()?,
            control_program: frame.read_bytes()?,
            reference_data: frame.read_bytes()?,
            extension: frame.read_extension(),
            witness: OutputWitness::default(),
        })
    }
}

impl Encode for OutputWitness {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.extension.as_bytes());
    }
}

impl Decode for OutputWitness {
    fn read_from(frame: &mut Reader<'_>) -> Result<Self> {
        Ok(OutputWitness {
            extension: frame.read_extension(),
        })
    }
}
