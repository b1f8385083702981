//! Account state as seen by one pipeline run.
//!
//! The tracker is seeded from the network the first time a pipeline signs
//! and never persisted. Separate pipelines for the same account race on
//! nonces; serializing them is the caller's job.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::blockchain::address::Address;

/// Account state reported by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOnNetwork {
    pub address: Address,
    pub nonce: u64,
    pub balance: BigUint,
}

/// One token balance held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHolding {
    pub identifier: String,
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

/// Hands out strictly increasing nonces for one account.
#[derive(Debug)]
pub struct AccountTracker {
    address: Address,
    balance: BigUint,
    nonce: u64,
}

impl AccountTracker {
    /// Seed the tracker from freshly fetched network state.
    pub fn from_network(account: AccountOnNetwork) -> Self {
        tracing::debug!(
            address = %account.address,
            nonce = account.nonce,
            "Account state synced"
        );
        Self {
            address: account.address,
            balance: account.balance,
            nonce: account.nonce,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Balance at sync time. Not updated locally.
    pub fn balance(&self) -> &BigUint {
        &self.balance
    }

    pub fn current_nonce(&self) -> u64 {
        self.nonce
    }

    /// Return the current nonce, then advance the counter by one.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}
