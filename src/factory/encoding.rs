//! Data payload encoding: `function@arg@arg…` with lowercase hex arguments.

use num_bigint::BigUint;

use crate::blockchain::address::Address;

/// Accumulates a transaction data payload.
#[derive(Debug, Clone)]
pub struct DataBuilder {
    parts: Vec<String>,
}

impl DataBuilder {
    pub fn new(function: &str) -> Self {
        Self {
            parts: vec![function.to_string()],
        }
    }

    /// Append raw bytes.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.parts.push(hex::encode(bytes));
        self
    }

    /// Append a UTF-8 string.
    pub fn text(self, text: &str) -> Self {
        self.bytes(text.as_bytes())
    }

    pub fn address(self, address: &Address) -> Self {
        self.bytes(address.as_bytes())
    }

    /// Append a transfer-standard number (zero is `00`).
    pub fn number(mut self, value: &BigUint) -> Self {
        self.parts.push(padded_hex(value));
        self
    }

    pub fn u64(self, value: u64) -> Self {
        self.number(&BigUint::from(value))
    }

    pub fn boolean_word(self, value: bool) -> Self {
        self.text(if value { "true" } else { "false" })
    }

    /// Append a top-encoded contract argument.
    pub fn argument(self, value: &ArgValue) -> Self {
        self.bytes(&value.top_encode())
    }

    pub fn build(self) -> Vec<u8> {
        self.parts.join("@").into_bytes()
    }
}

/// Minimal big-endian hex with zero rendered as `00`.
pub fn padded_hex(value: &BigUint) -> String {
    hex::encode(value.to_bytes_be())
}

/// Typed contract argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    U64(u64),
    BigUint(BigUint),
    Bool(bool),
    Address(Address),
    Bytes(Vec<u8>),
    Text(String),
}

impl ArgValue {
    /// Top-level encoding: numbers as minimal big-endian bytes (zero is
    /// empty), booleans as `01` or empty, everything else raw.
    pub fn top_encode(&self) -> Vec<u8> {
        match self {
            Self::U64(v) => top_encode_biguint(&BigUint::from(*v)),
            Self::BigUint(v) => top_encode_biguint(v),
            Self::Bool(true) => vec![1],
            Self::Bool(false) => Vec::new(),
            Self::Address(a) => a.as_bytes().to_vec(),
            Self::Bytes(b) => b.clone(),
            Self::Text(s) => s.as_bytes().to_vec(),
        }
    }
}

fn top_encode_biguint(value: &BigUint) -> Vec<u8> {
    if *value == BigUint::ZERO {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}
