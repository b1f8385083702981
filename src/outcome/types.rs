//! Structured results of executed transactions.

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::types::{TransactionStatus, TxHash};

/// Which parser applies to an operation's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeShape {
    Issue,
    SetSpecialRole,
    NftCreate,
    Deploy,
    ContractCall,
}

impl OutcomeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::SetSpecialRole => "set_special_role",
            Self::NftCreate => "nft_create",
            Self::Deploy => "deploy",
            Self::ContractCall => "contract_call",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub user: Option<Address>,
    pub token_identifier: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNft {
    pub token_identifier: String,
    pub nonce: u64,
    pub initial_quantity: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: Address,
    pub owner: Address,
    pub code_hash: Vec<u8>,
}

/// Return code, message and raw values of a contract execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnData {
    pub return_code: String,
    pub return_message: String,
    pub values: Vec<Vec<u8>>,
}

/// Operation-specific part of an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeDetails {
    Issue(Vec<IssuedToken>),
    SetSpecialRole(Vec<RoleAssignment>),
    NftCreate(Vec<CreatedNft>),
    Deploy {
        result: ReturnData,
        contracts: Vec<DeployedContract>,
    },
    ContractCall(ReturnData),
}

/// Decoded terminal state of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOutcome {
    pub hash: TxHash,
    pub status: TransactionStatus,
    /// Message of the first `signalError` event, else a description of any
    /// result data that could not be decoded.
    pub error: Option<String>,
    pub details: OutcomeDetails,
}

impl ParsedOutcome {
    pub fn is_successful(&self) -> bool {
        self.status.is_successful() && self.error.is_none()
    }
}
