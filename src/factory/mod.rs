//! Transaction builder.
//!
//! # Data Flow
//! ```text
//! OperationDescriptor
//!     → transfer.rs / token_management.rs / contract.rs (data payload, receiver)
//!     → TransactionBuilder (gas limit, value, chain id, version)
//!     → BuiltOperation (unsigned Transaction + outcome shape, or a ContractQuery)
//! ```
//!
//! # Design Decisions
//! - `build` is pure: no I/O, no clock, no randomness
//! - Invalid descriptors fail here, before any network call
//! - The nonce is left at 0; the account tracker assigns it

pub mod contract;
pub mod encoding;
pub mod operation;
pub mod token_management;
pub mod transfer;

use std::str::FromStr;

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::network::ContractQuery;
use crate::blockchain::transaction::Transaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::GasConfig;
use crate::outcome::types::OutcomeShape;
use crate::outcome::values::ValueType;

pub use contract::CodeMetadata;
pub use encoding::ArgValue;
pub use operation::{CallRequest, DeployRequest, IssueRequest, NftCreateRequest, OperationDescriptor, QueryRequest};
pub use token_management::{IssueKind, SpecialRole, TokenProperties};

/// What `build` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltOperation {
    /// Needs a nonce, a signature and a broadcast. `outcome` tells the
    /// pipeline whether and how to resolve the result.
    Transaction {
        transaction: Transaction,
        outcome: Option<OutcomeShape>,
    },
    /// Read-only; runs directly against the network.
    Query {
        query: ContractQuery,
        returns: Vec<ValueType>,
    },
}

/// Turns operation descriptors into unsigned transactions.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    gas: GasConfig,
    chain_id: ChainId,
    issue_cost: BigUint,
}

impl TransactionBuilder {
    pub fn new(gas: GasConfig, chain_id: ChainId) -> BlockchainResult<Self> {
        let issue_cost = BigUint::from_str(&gas.issue_cost).map_err(|e| {
            BlockchainError::construction(format!("issue cost '{}': {}", gas.issue_cost, e))
        })?;
        Ok(Self {
            gas,
            chain_id,
            issue_cost,
        })
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Build `operation` on behalf of `sender`.
    pub fn build(
        &self,
        sender: &Address,
        operation: &OperationDescriptor,
    ) -> BlockchainResult<BuiltOperation> {
        let (receiver, value, data, gas_limit, outcome) = match operation {
            OperationDescriptor::NativeTransfer {
                receiver,
                amount,
                data,
            } => {
                transfer::check_native_amount(amount, data)?;
                let gas_limit = self.base_gas(data);
                (*receiver, amount.clone(), data.clone(), gas_limit, None)
            }
            OperationDescriptor::TokenTransfer {
                receiver,
                transfers,
            } => {
                let encoded = transfer::encode_token_transfers(&self.gas, sender, receiver, transfers)?;
                let gas_limit = self.base_gas(&encoded.data).saturating_add(encoded.execution_gas);
                (encoded.receiver, BigUint::ZERO, encoded.data, gas_limit, None)
            }
            OperationDescriptor::Issue(request) => {
                let data = token_management::issue_data(request)?;
                let gas_limit = self.base_gas(&data).saturating_add(self.gas.gas_limit_issue);
                (
                    Address::esdt_system_contract(),
                    self.issue_cost.clone(),
                    data,
                    gas_limit,
                    Some(OutcomeShape::Issue),
                )
            }
            OperationDescriptor::SetSpecialRole { token, user, roles } => {
                let data = token_management::set_special_role_data(token, user, roles)?;
                let gas_limit = self.base_gas(&data).saturating_add(self.gas.gas_limit_set_special_role);
                (
                    Address::esdt_system_contract(),
                    BigUint::ZERO,
                    data,
                    gas_limit,
                    Some(OutcomeShape::SetSpecialRole),
                )
            }
            OperationDescriptor::NftCreate(request) => {
                let data = token_management::nft_create_data(request)?;
                let gas_limit = token_management::nft_create_gas_limit(
                    data.len(),
                    request.attributes.len(),
                    request.hash.len(),
                );
                (*sender, BigUint::ZERO, data, gas_limit, Some(OutcomeShape::NftCreate))
            }
            OperationDescriptor::Deploy(request) => {
                let data = contract::deploy_data(request)?;
                (
                    Address::zero(),
                    request.amount.clone(),
                    data,
                    request.gas_limit,
                    Some(OutcomeShape::Deploy),
                )
            }
            OperationDescriptor::Call(request) => {
                let data = contract::call_data(request)?;
                (
                    request.contract,
                    request.amount.clone(),
                    data,
                    request.gas_limit,
                    Some(OutcomeShape::ContractCall),
                )
            }
            OperationDescriptor::Query(request) => {
                contract::check_endpoint(&request.function)?;
                let query = ContractQuery {
                    contract: request.contract,
                    function: request.function.clone(),
                    caller: request.caller,
                    value: request.value.clone(),
                    arguments: request.arguments.iter().map(ArgValue::top_encode).collect(),
                };
                return Ok(BuiltOperation::Query {
                    query,
                    returns: request.returns.clone(),
                });
            }
        };

        tracing::debug!(
            operation = operation.kind(),
            receiver = %receiver,
            gas_limit = gas_limit,
            data_len = data.len(),
            "Transaction built"
        );

        Ok(BuiltOperation::Transaction {
            transaction: Transaction {
                sender: *sender,
                receiver,
                value,
                nonce: 0,
                gas_limit,
                gas_price: self.gas.gas_price,
                data,
                chain_id: self.chain_id.clone(),
                version: self.gas.tx_version,
                options: 0,
            },
            outcome,
        })
    }

    /// Protocol floor plus the per-byte data cost, saturating at `u64::MAX`.
    fn base_gas(&self, data: &[u8]) -> u64 {
        let data_cost = self.gas.gas_per_data_byte.saturating_mul(data.len() as u64);
        self.gas.min_gas_limit.saturating_add(data_cost)
    }
}
