//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Key file + password env var
//!     → keystore.rs (decrypt) → wallet.rs (Ed25519 signing)
//! Operation
//!     → transaction.rs (canonical signing bytes, SignedTransaction)
//!     → client.rs (broadcast over the HTTP API with timeouts)
//!     → watcher.rs (bounded status polling)
//! ```
//!
//! # Security Constraints
//! - Passwords ONLY from environment variables
//! - Never log key material or passwords
//! - All API calls have configurable timeouts
//! - Broadcasts are never retried

pub mod account;
pub mod address;
pub mod client;
pub mod keystore;
pub mod network;
pub mod token;
pub mod transaction;
pub mod types;
pub mod wallet;
pub mod watcher;

pub use account::{AccountOnNetwork, AccountTracker, TokenHolding};
pub use address::Address;
pub use client::ApiNetworkProvider;
pub use network::{
    ContractQuery, NetworkProvider, QueryResponse, SmartContractResult, TransactionEvent,
    TransactionOnNetwork,
};
pub use token::{TokenClass, TokenIdentifier, TokenTransfer};
pub use transaction::{Signature, SignedTransaction, Transaction};
pub use types::{BlockchainError, BlockchainResult, ChainId, TransactionStatus, TxHash};
pub use wallet::{TransactionSigner, Wallet};
pub use watcher::{Resolution, TransactionWatcher};
