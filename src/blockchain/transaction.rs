//! Transaction model and the canonical signing codec.
//!
//! # Responsibilities
//! - Hold the fields of an unsigned transaction
//! - Serialize the signable fields deterministically (`bytes_for_signing`)
//! - Bind a signature to a snapshot of those fields (`SignedTransaction`)
//! - Produce the JSON wire form accepted by the network

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use num_bigint::BigUint;
use serde::Serialize;

use crate::blockchain::address::Address;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Signature length in bytes (Ed25519).
pub const SIGNATURE_LEN: usize = 64;

/// Default transaction version.
pub const TRANSACTION_VERSION: u32 = 2;

/// Unsigned transaction.
///
/// Created by the builder with nonce zero; the pipeline assigns the nonce
/// from the account tracker right before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sender: Address,
    pub receiver: Address,
    /// Native amount in the smallest denomination.
    pub value: BigUint,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub data: Vec<u8>,
    pub chain_id: ChainId,
    pub version: u32,
    pub options: u32,
}

/// Detached Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_slice(bytes: &[u8]) -> BlockchainResult<Self> {
        let bytes: [u8; SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| BlockchainError::decode(format!("signature must be {} bytes", SIGNATURE_LEN)))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// Signable fields in their canonical order. Field order is part of the
/// format; serde_json emits struct fields in declaration order.
#[derive(Serialize)]
struct SigningPayload<'a> {
    nonce: u64,
    value: String,
    receiver: String,
    sender: String,
    #[serde(rename = "gasPrice")]
    gas_price: u64,
    #[serde(rename = "gasLimit")]
    gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "chainID")]
    chain_id: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<u32>,
}

/// JSON body of `POST /transactions`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWire {
    pub nonce: u64,
    pub value: String,
    pub receiver: String,
    pub sender: String,
    #[serde(rename = "gasPrice")]
    pub gas_price: u64,
    #[serde(rename = "gasLimit")]
    pub gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<u32>,
    pub signature: String,
}

impl Transaction {
    /// Deterministic byte sequence covered by the signature.
    ///
    /// The signature itself is never part of the input.
    pub fn bytes_for_signing(&self) -> BlockchainResult<Vec<u8>> {
        let payload = SigningPayload {
            nonce: self.nonce,
            value: self.value.to_string(),
            receiver: self.receiver.to_bech32(),
            sender: self.sender.to_bech32(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: self.encoded_data(),
            chain_id: self.chain_id.as_str(),
            version: self.version,
            options: (self.options != 0).then_some(self.options),
        };
        serde_json::to_vec(&payload).map_err(|e| BlockchainError::decode(e.to_string()))
    }

    /// Attach a signature, freezing the transaction.
    pub fn into_signed(self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            transaction: self,
            signature,
        }
    }

    fn encoded_data(&self) -> Option<String> {
        (!self.data.is_empty()).then(|| BASE64.encode(&self.data))
    }
}

/// A transaction together with the signature over its signing bytes.
///
/// Fields are only reachable by shared reference, so a signed transaction
/// cannot drift from the snapshot its signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    signature: Signature,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn to_wire(&self) -> TransactionWire {
        let tx = &self.transaction;
        TransactionWire {
            nonce: tx.nonce,
            value: tx.value.to_string(),
            receiver: tx.receiver.to_bech32(),
            sender: tx.sender.to_bech32(),
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            data: tx.encoded_data(),
            chain_id: tx.chain_id.to_string(),
            version: tx.version,
            options: (tx.options != 0).then_some(tx.options),
            signature: self.signature.to_hex(),
        }
    }
}
