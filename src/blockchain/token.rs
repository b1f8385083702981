//! ESDT token identifiers and transfer descriptors.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

const RANDOM_SUFFIX_LEN: usize = 6;
const MIN_TICKER_LEN: usize = 3;
const MAX_TICKER_LEN: usize = 10;

/// Token identifier: `<TICKER>-<6 hex chars>`, e.g. `DEMFUNGI-3ec13b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenIdentifier(String);

impl TokenIdentifier {
    pub fn new(identifier: &str) -> BlockchainResult<Self> {
        let (ticker, suffix) = identifier.split_once('-').ok_or_else(|| {
            BlockchainError::construction(format!("token identifier '{}' has no suffix", identifier))
        })?;
        validate_ticker(ticker)?;
        let suffix_ok = suffix.len() == RANDOM_SUFFIX_LEN
            && suffix.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !suffix_ok {
            return Err(BlockchainError::construction(format!(
                "token identifier '{}' has an invalid suffix",
                identifier
            )));
        }
        Ok(Self(identifier.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn ticker(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }
}

/// Tickers are 3 to 10 uppercase alphanumeric characters.
pub fn validate_ticker(ticker: &str) -> BlockchainResult<()> {
    let len_ok = (MIN_TICKER_LEN..=MAX_TICKER_LEN).contains(&ticker.len());
    let chars_ok = ticker
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(BlockchainError::construction(format!(
            "invalid token ticker '{}'",
            ticker
        )))
    }
}

impl FromStr for TokenIdentifier {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TokenIdentifier {
    type Error = BlockchainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<TokenIdentifier> for String {
    fn from(id: TokenIdentifier) -> Self {
        id.0
    }
}

impl fmt::Display for TokenIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token class of a transferred unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Fungible,
    SemiFungible { nonce: u64 },
    NonFungible { nonce: u64 },
}

impl TokenClass {
    /// Token nonce; zero for fungible tokens.
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Fungible => 0,
            Self::SemiFungible { nonce } | Self::NonFungible { nonce } => *nonce,
        }
    }
}

/// A single token movement inside a transfer transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token: TokenIdentifier,
    pub class: TokenClass,
    pub amount: BigUint,
}

impl TokenTransfer {
    pub fn fungible(token: TokenIdentifier, amount: BigUint) -> Self {
        Self {
            token,
            class: TokenClass::Fungible,
            amount,
        }
    }

    pub fn semi_fungible(token: TokenIdentifier, nonce: u64, amount: BigUint) -> Self {
        Self {
            token,
            class: TokenClass::SemiFungible { nonce },
            amount,
        }
    }

    /// A non-fungible unit always moves with amount one.
    pub fn non_fungible(token: TokenIdentifier, nonce: u64) -> Self {
        Self {
            token,
            class: TokenClass::NonFungible { nonce },
            amount: BigUint::from(1u8),
        }
    }

    pub fn nonce(&self) -> u64 {
        self.class.nonce()
    }

    pub fn is_fungible(&self) -> bool {
        matches!(self.class, TokenClass::Fungible)
    }

    /// Check the per-class amount and nonce rules.
    pub fn validate(&self) -> BlockchainResult<()> {
        if self.amount == BigUint::ZERO {
            return Err(BlockchainError::construction(format!(
                "transfer of {} has zero amount",
                self.token
            )));
        }
        match self.class {
            TokenClass::Fungible => Ok(()),
            TokenClass::SemiFungible { nonce } | TokenClass::NonFungible { nonce } if nonce == 0 => {
                Err(BlockchainError::construction(format!(
                    "transfer of {} needs a non-zero token nonce",
                    self.token
                )))
            }
            TokenClass::NonFungible { .. } if self.amount != BigUint::from(1u8) => {
                Err(BlockchainError::construction(format!(
                    "non-fungible transfer of {} must move exactly one unit",
                    self.token
                )))
            }
            _ => Ok(()),
        }
    }
}
