//! Chain-specific types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain identifier, e.g. `"D"` for devnet or `"1"` for mainnet.
///
/// Part of the signed payload, so a transaction signed for one network
/// cannot be replayed on another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction hash as reported by the network (lowercase hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while building, signing, broadcasting or resolving
/// a transaction.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Invalid or incomplete operation descriptor. Detected before any I/O.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Key material could not be unlocked (wrong password, MAC mismatch).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Key file missing or malformed.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The network refused the transaction. The message is the network's, verbatim.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// The node accepted the broadcast but its answer could not be read.
    /// The transaction may be in the mempool; its nonce must be treated as spent.
    #[error("Broadcast possibly accepted, response unreadable: {0}")]
    BroadcastUnconfirmed(String),

    /// Transport or API failure on a read request.
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered a read request with a client error status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A single API request exceeded its deadline.
    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    /// Network data could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A read-only contract query returned a non-`ok` code.
    #[error("Query failed with {code}: {message}")]
    QueryFailed { code: String, message: String },

    /// The run was interrupted before the transaction was broadcast.
    #[error("Interrupted before broadcast")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlockchainError {
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether a read request failing with this error may be retried.
    ///
    /// Rejections and local errors are final; only transport-level
    /// failures are transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Execution status of a transaction as reported by the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Not yet executed (received, pending, partially executed).
    Pending,
    /// Executed successfully.
    Success,
    /// Executed and failed.
    Failed,
    /// Rejected by the protocol during processing.
    Invalid,
}

impl TransactionStatus {
    /// Map the API's free-form status string.
    pub fn from_api(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "success" | "successful" | "executed" => Self::Success,
            "fail" | "failed" | "unsuccessful" => Self::Failed,
            "invalid" => Self::Invalid,
            _ => Self::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "fail",
            Self::Invalid => "invalid",
        }
    }

    pub fn is_completed(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
