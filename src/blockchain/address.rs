//! Account addresses: 32-byte public keys with a bech32 text form.

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Human-readable part of every account address.
pub const ADDRESS_HRP: &str = "erd";

const HRP: Hrp = Hrp::parse_unchecked(ADDRESS_HRP);

/// Length of an address (an Ed25519 public key).
pub const ADDRESS_LEN: usize = 32;

/// Number of leading zero bytes that mark a smart contract address.
const CONTRACT_PREFIX_ZEROS: usize = 8;

/// Built-in ESDT system smart contract, receiver of token management calls.
const ESDT_SYSTEM_CONTRACT: [u8; ADDRESS_LEN] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2,
    0xff, 0xff,
];

/// Account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// The all-zero address. Contract deployments are sent here.
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_LEN])
    }

    pub const fn esdt_system_contract() -> Self {
        Self(ESDT_SYSTEM_CONTRACT)
    }

    pub fn from_slice(bytes: &[u8]) -> BlockchainResult<Self> {
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            BlockchainError::construction(format!(
                "address must be {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Parse a bech32 address, checking HRP, checksum and length.
    ///
    /// Only the original bech32 checksum is accepted, not bech32m.
    pub fn from_bech32(text: &str) -> BlockchainResult<Self> {
        let checked = CheckedHrpstring::new::<Bech32>(text).map_err(|e| {
            BlockchainError::construction(format!("invalid address '{}': {}", text, e))
        })?;
        if checked.hrp() != HRP {
            return Err(BlockchainError::construction(format!(
                "invalid address '{}': unexpected prefix",
                text
            )));
        }
        let data: Vec<u8> = checked.byte_iter().collect();
        Self::from_slice(&data)
    }

    pub fn from_hex(text: &str) -> BlockchainResult<Self> {
        let bytes = hex::decode(text)
            .map_err(|e| BlockchainError::construction(format!("invalid address hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    pub fn to_bech32(&self) -> String {
        // 32 bytes under a three-letter HRP never exceeds the bech32 length limit.
        bech32::encode::<Bech32>(HRP, &self.0).unwrap_or_else(|_| self.to_hex())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_smart_contract(&self) -> bool {
        self.0[..CONTRACT_PREFIX_ZEROS].iter().all(|b| *b == 0)
    }
}

impl FromStr for Address {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_bech32(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    const ALICE_HEX: &str = "0139472eff6886771a982f3083da5d421f24c29181e63888228dc81ca60d69e1";

    #[test]
    fn test_bech32_round_trip() {
        let address = Address::from_bech32(ALICE).unwrap();
        assert_eq!(address.to_hex(), ALICE_HEX);
        assert_eq!(address.to_bech32(), ALICE);
        assert_eq!(Address::from_hex(ALICE_HEX).unwrap(), address);
    }

    #[test]
    fn test_zero_address() {
        assert_eq!(
            Address::zero().to_bech32(),
            "erd1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq6gq4hu"
        );
        assert!(Address::zero().is_smart_contract());
        assert!(Address::esdt_system_contract().is_smart_contract());
    }

    #[test]
    fn test_contract_detection() {
        let contract: Address = "erd1qqqqqqqqqqqqqpgqtrajzw4vq0zxccdt9u66cvgg6vz8c6cwnegqkfqkpq"
            .parse()
            .unwrap();
        assert!(contract.is_smart_contract());
        assert!(!Address::from_bech32(ALICE).unwrap().is_smart_contract());
    }

    #[test]
    fn test_invalid_addresses() {
        // Checksum broken in the last character.
        let broken = format!("{}x", &ALICE[..ALICE.len() - 1]);
        assert!(Address::from_bech32(&broken).is_err());
        assert!(Address::from_bech32("not-an-address").is_err());
        assert!(Address::from_slice(&[1, 2, 3]).is_err());
        let err = Address::from_hex("zz").unwrap_err();
        assert!(matches!(err, BlockchainError::Construction(_)));
    }

    #[test]
    fn test_bech32m_checksum_rejected() {
        let key = [7u8; ADDRESS_LEN];
        let bech32m = bech32::encode::<bech32::Bech32m>(HRP, &key).unwrap();
        assert!(Address::from_bech32(&bech32m).is_err());

        let bech32 = bech32::encode::<Bech32>(HRP, &key).unwrap();
        assert_eq!(Address::from_bech32(&bech32).unwrap(), Address::from_bytes(key));
    }

    #[test]
    fn test_serde_as_bech32() {
        let address = Address::from_bech32(ALICE).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", ALICE));
        let decoded: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, address);
    }
}
