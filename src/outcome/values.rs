//! Typed decoding of contract return values.

use std::fmt;

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Declared type of one returned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    BigUint,
    U64,
    Bool,
    Address,
    Bytes,
    Text,
}

/// A decoded return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    BigUint(BigUint),
    U64(u64),
    Bool(bool),
    Address(Address),
    Bytes(Vec<u8>),
    Text(String),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigUint(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Address(a) => write!(f, "{}", a),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Top-decode a single value.
pub fn decode_value(value_type: ValueType, raw: &[u8]) -> BlockchainResult<TypedValue> {
    let value = match value_type {
        ValueType::BigUint => TypedValue::BigUint(BigUint::from_bytes_be(raw)),
        ValueType::U64 => {
            if raw.len() > 8 {
                return Err(BlockchainError::decode(format!(
                    "{} bytes do not fit a u64",
                    raw.len()
                )));
            }
            TypedValue::U64(raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
        }
        ValueType::Bool => match raw {
            [] => TypedValue::Bool(false),
            [1] => TypedValue::Bool(true),
            other => {
                return Err(BlockchainError::decode(format!(
                    "invalid bool encoding 0x{}",
                    hex::encode(other)
                )))
            }
        },
        ValueType::Address => TypedValue::Address(Address::from_slice(raw)?),
        ValueType::Bytes => TypedValue::Bytes(raw.to_vec()),
        ValueType::Text => TypedValue::Text(
            String::from_utf8(raw.to_vec()).map_err(|e| BlockchainError::decode(e.to_string()))?,
        ),
    };
    Ok(value)
}

/// Decode returned values against their declared types, in order.
///
/// Fewer values than declared is an error; extra values are ignored.
pub fn decode_values(types: &[ValueType], raw: &[Vec<u8>]) -> BlockchainResult<Vec<TypedValue>> {
    if raw.len() < types.len() {
        return Err(BlockchainError::decode(format!(
            "expected {} return values, got {}",
            types.len(),
            raw.len()
        )));
    }
    types
        .iter()
        .zip(raw)
        .map(|(value_type, bytes)| decode_value(*value_type, bytes))
        .collect()
}
