//! Transaction lifecycle pipeline.
//!
//! # Data Flow
//! ```text
//! OperationDescriptor
//!     → TransactionBuilder::build (pure, fails fast)
//!     → [query] NetworkProvider::query_contract → typed values
//!     → AccountTracker::next_nonce (account fetched on first use)
//!     → Transaction::bytes_for_signing → TransactionSigner::sign
//!     → NetworkProvider::send_transaction (never retried)
//!     → explorer link logged
//!     → [outcome shape] TransactionWatcher → parse_outcome
//! ```
//!
//! # Design Decisions
//! - Network and signer are injected, so runs are testable without keys or network
//! - An interrupt before broadcast aborts with no network side effect
//! - A failed broadcast drops the tracked account so the next run resyncs
//! - Once execution resolves the run always reports the hash; undecodable
//!   outcome data lands in `ParsedOutcome::error`

pub mod report;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::Instrument;

use crate::blockchain::account::AccountTracker;
use crate::blockchain::address::Address;
use crate::blockchain::network::{ContractQuery, NetworkProvider};
use crate::blockchain::transaction::{SignedTransaction, Transaction};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, TxHash};
use crate::blockchain::wallet::TransactionSigner;
use crate::blockchain::watcher::{Resolution, TransactionWatcher};
use crate::config::PipelineConfig;
use crate::factory::{BuiltOperation, OperationDescriptor, TransactionBuilder};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::outcome::parser::parse_outcome;
use crate::outcome::values::{decode_values, ValueType};

pub use report::{AccountOverview, RunReport};

pub struct Pipeline {
    network: Arc<dyn NetworkProvider>,
    signer: Arc<dyn TransactionSigner>,
    builder: TransactionBuilder,
    watcher: TransactionWatcher,
    explorer_url: String,
    tracker: Mutex<Option<AccountTracker>>,
    shutdown: Shutdown,
}

impl Pipeline {
    pub fn new(
        network: Arc<dyn NetworkProvider>,
        signer: Arc<dyn TransactionSigner>,
        config: &PipelineConfig,
    ) -> BlockchainResult<Self> {
        let builder = TransactionBuilder::new(
            config.gas.clone(),
            ChainId(config.network.chain_id.clone()),
        )?;
        let watcher = TransactionWatcher::new(network.clone(), &config.watcher);
        Ok(Self::from_parts(
            network,
            signer,
            builder,
            watcher,
            &config.network.explorer_url,
        ))
    }

    pub fn from_parts(
        network: Arc<dyn NetworkProvider>,
        signer: Arc<dyn TransactionSigner>,
        builder: TransactionBuilder,
        watcher: TransactionWatcher,
        explorer_url: &str,
    ) -> Self {
        Self {
            network,
            signer,
            builder,
            watcher,
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            tracker: Mutex::new(None),
            shutdown: Shutdown::new(),
        }
    }

    /// Abort runs when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub fn transaction_url(&self, hash: &TxHash) -> String {
        format!("{}/transactions/{}", self.explorer_url, hash)
    }

    /// Run one operation end to end.
    pub async fn run(&self, operation: &OperationDescriptor) -> BlockchainResult<RunReport> {
        let span = tracing::info_span!("pipeline_run", operation = operation.kind());
        self.run_inner(operation).instrument(span).await
    }

    async fn run_inner(&self, operation: &OperationDescriptor) -> BlockchainResult<RunReport> {
        let sender = self.signer.address();
        let (transaction, shape) = match self.builder.build(&sender, operation)? {
            BuiltOperation::Query { query, returns } => return self.run_query(&query, &returns).await,
            BuiltOperation::Transaction {
                transaction,
                outcome,
            } => (transaction, outcome),
        };

        if self.shutdown.is_triggered() {
            return Err(BlockchainError::Interrupted);
        }
        let prepared = tokio::select! {
            biased;
            _ = self.shutdown.triggered() => None,
            signed = self.sign(transaction) => Some(signed),
        };
        let signed = match prepared {
            Some(signed) => signed?,
            None => {
                // A nonce may have been handed out for a transaction that never left.
                self.forget_account().await;
                return Err(BlockchainError::Interrupted);
            }
        };

        let hash = self.broadcast(operation.kind(), &signed).await?;
        let explorer_url = self.transaction_url(&hash);
        tracing::info!(tx_hash = %hash, explorer_url = %explorer_url, "Check in the Explorer");

        let shape = match shape {
            Some(shape) => shape,
            None => return Ok(RunReport::Submitted { hash, explorer_url }),
        };

        tracing::info!(tx_hash = %hash, outcome = shape.as_str(), "Waiting for execution");
        let resolution = tokio::select! {
            biased;
            _ = self.shutdown.triggered() => None,
            resolution = self.watcher.await_completed(&hash) => Some(resolution),
        };

        match resolution {
            None => {
                tracing::warn!(tx_hash = %hash, "Interrupted while waiting; transaction already broadcast");
                Ok(RunReport::Submitted { hash, explorer_url })
            }
            Some(Resolution::Executed(tx)) => {
                let outcome = parse_outcome(&tx, shape);
                if let Some(error) = &outcome.error {
                    tracing::warn!(tx_hash = %hash, error = %error, "Execution reported an error");
                }
                Ok(RunReport::Completed {
                    outcome,
                    explorer_url,
                })
            }
            Some(Resolution::TimedOut {
                hash,
                waited,
                last_error,
            }) => Ok(RunReport::TimedOut {
                hash,
                explorer_url,
                waited,
                last_error,
            }),
        }
    }

    /// Fetch the sender's account and token balances.
    pub async fn account_overview(&self) -> BlockchainResult<AccountOverview> {
        let address = self.signer.address();
        let account = self.network.get_account(&address).await?;
        let tokens = self.network.get_account_tokens(&address).await?;
        Ok(AccountOverview { account, tokens })
    }

    async fn run_query(
        &self,
        query: &ContractQuery,
        returns: &[ValueType],
    ) -> BlockchainResult<RunReport> {
        tracing::info!(contract = %query.contract, function = %query.function, "Running query");
        let response = self.network.query_contract(query).await?;
        let values = decode_values(returns, &response.return_data)?;
        Ok(RunReport::Queried { values, response })
    }

    /// Assign the next nonce and sign.
    async fn sign(&self, mut transaction: Transaction) -> BlockchainResult<SignedTransaction> {
        let mut guard = self.tracker.lock().await;
        let mut tracker = match guard.take() {
            Some(tracker) => tracker,
            None => {
                let account = self.network.get_account(&transaction.sender).await?;
                AccountTracker::from_network(account)
            }
        };
        transaction.nonce = tracker.next_nonce();
        *guard = Some(tracker);
        drop(guard);

        let payload = transaction.bytes_for_signing()?;
        let signature = self.signer.sign(&payload).await?;
        tracing::debug!(nonce = transaction.nonce, "Transaction signed");
        Ok(transaction.into_signed(signature))
    }

    async fn broadcast(&self, kind: &'static str, signed: &SignedTransaction) -> BlockchainResult<TxHash> {
        match self.network.send_transaction(signed).await {
            Ok(hash) => {
                metrics::record_broadcast(kind);
                tracing::info!(
                    tx_hash = %hash,
                    nonce = signed.transaction().nonce,
                    "Transaction broadcast"
                );
                Ok(hash)
            }
            Err(e) => {
                match &e {
                    BlockchainError::Rejected(_) => metrics::record_rejection(kind),
                    BlockchainError::BroadcastUnconfirmed(_) => tracing::warn!(
                        nonce = signed.transaction().nonce,
                        "Transaction may be pending; check the sender's history before resending"
                    ),
                    _ => {}
                }
                tracing::error!(error = %e, nonce = signed.transaction().nonce, "Broadcast failed");
                self.forget_account().await;
                Err(e)
            }
        }
    }

    async fn forget_account(&self) {
        *self.tracker.lock().await = None;
    }
}
