//! Operation descriptors: what the caller wants done, before any protocol
//! encoding.

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::token::{TokenIdentifier, TokenTransfer};
use crate::factory::contract::CodeMetadata;
use crate::factory::encoding::ArgValue;
use crate::factory::token_management::{IssueKind, SpecialRole, TokenProperties};
use crate::outcome::values::ValueType;

/// One operation the pipeline can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationDescriptor {
    /// Move native currency, optionally with a free-form data payload.
    NativeTransfer {
        receiver: Address,
        amount: BigUint,
        data: Vec<u8>,
    },
    /// Move one or more ESDT tokens in a single transaction.
    TokenTransfer {
        receiver: Address,
        transfers: Vec<TokenTransfer>,
    },
    /// Issue a new token or collection.
    Issue(IssueRequest),
    /// Grant roles on a token to an account.
    SetSpecialRole {
        token: TokenIdentifier,
        user: Address,
        roles: Vec<SpecialRole>,
    },
    /// Mint a new NFT or SFT instance in an existing collection.
    NftCreate(NftCreateRequest),
    Deploy(DeployRequest),
    Call(CallRequest),
    /// Read-only call. Never signed.
    Query(QueryRequest),
}

impl OperationDescriptor {
    /// Short, stable name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NativeTransfer { .. } => "native_transfer",
            Self::TokenTransfer { .. } => "token_transfer",
            Self::Issue(_) => "issue",
            Self::SetSpecialRole { .. } => "set_special_role",
            Self::NftCreate(_) => "nft_create",
            Self::Deploy(_) => "deploy",
            Self::Call(_) => "call",
            Self::Query(_) => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub kind: IssueKind,
    pub name: String,
    pub ticker: String,
    pub properties: TokenProperties,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftCreateRequest {
    pub token: TokenIdentifier,
    /// Always 1 for non-fungible tokens.
    pub initial_quantity: BigUint,
    pub name: String,
    /// Basis points, 0..=10000.
    pub royalties: u32,
    pub hash: Vec<u8>,
    pub attributes: Vec<u8>,
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub bytecode: Vec<u8>,
    pub metadata: CodeMetadata,
    pub arguments: Vec<ArgValue>,
    pub amount: BigUint,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub contract: Address,
    pub function: String,
    pub arguments: Vec<ArgValue>,
    pub amount: BigUint,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub contract: Address,
    pub function: String,
    pub arguments: Vec<ArgValue>,
    pub caller: Option<Address>,
    pub value: Option<BigUint>,
    /// How to decode each returned value.
    pub returns: Vec<ValueType>,
}
