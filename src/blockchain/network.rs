//! Network boundary: the capability the pipeline consumes to read account
//! state, broadcast transactions, poll their execution and run queries.

use async_trait::async_trait;
use num_bigint::BigUint;

use crate::blockchain::account::{AccountOnNetwork, TokenHolding};
use crate::blockchain::address::Address;
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{BlockchainResult, TransactionStatus, TxHash};

/// Log event emitted during execution. Topics and data are raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionEvent {
    pub address: Option<Address>,
    pub identifier: String,
    pub topics: Vec<Vec<u8>>,
    pub data: Vec<u8>,
}

/// Smart contract result produced by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmartContractResult {
    pub data: Vec<u8>,
    pub events: Vec<TransactionEvent>,
}

/// A transaction as reported by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOnNetwork {
    pub hash: TxHash,
    pub status: TransactionStatus,
    pub events: Vec<TransactionEvent>,
    pub smart_contract_results: Vec<SmartContractResult>,
}

impl TransactionOnNetwork {
    /// Events of the transaction and of all its smart contract results.
    pub fn all_events(&self) -> impl Iterator<Item = &TransactionEvent> {
        self.events
            .iter()
            .chain(self.smart_contract_results.iter().flat_map(|r| r.events.iter()))
    }
}

/// Read-only contract query. Never signed, never assigned a nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractQuery {
    pub contract: Address,
    pub function: String,
    pub caller: Option<Address>,
    pub value: Option<BigUint>,
    /// Top-encoded arguments.
    pub arguments: Vec<Vec<u8>>,
}

/// Raw query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub return_code: String,
    pub return_message: String,
    pub return_data: Vec<Vec<u8>>,
}

#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Fetch nonce and balance of an account.
    async fn get_account(&self, address: &Address) -> BlockchainResult<AccountOnNetwork>;

    /// Fetch the fungible token balances of an account.
    async fn get_account_tokens(&self, address: &Address) -> BlockchainResult<Vec<TokenHolding>>;

    /// Broadcast a signed transaction. Rejections surface as
    /// [`BlockchainError::Rejected`](crate::blockchain::BlockchainError::Rejected)
    /// and are never retried. An accepted broadcast whose reply cannot be
    /// read is [`BlockchainError::BroadcastUnconfirmed`](crate::blockchain::BlockchainError::BroadcastUnconfirmed).
    async fn send_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash>;

    /// Fetch a transaction. `None` while the network does not know it yet.
    async fn get_transaction(&self, hash: &TxHash) -> BlockchainResult<Option<TransactionOnNetwork>>;

    /// Run a read-only contract query.
    async fn query_contract(&self, query: &ContractQuery) -> BlockchainResult<QueryResponse>;
}
