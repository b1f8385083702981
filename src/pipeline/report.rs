//! What a pipeline run hands back to its caller.

use std::fmt;
use std::time::Duration;

use crate::blockchain::account::{AccountOnNetwork, TokenHolding};
use crate::blockchain::network::QueryResponse;
use crate::blockchain::types::TxHash;
use crate::outcome::types::{OutcomeDetails, ParsedOutcome};
use crate::outcome::values::TypedValue;

#[derive(Debug, Clone)]
pub enum RunReport {
    /// Read-only query answered.
    Queried {
        values: Vec<TypedValue>,
        response: QueryResponse,
    },
    /// Broadcast accepted; no outcome was awaited.
    Submitted { hash: TxHash, explorer_url: String },
    /// Executed and parsed.
    Completed {
        outcome: ParsedOutcome,
        explorer_url: String,
    },
    /// Broadcast accepted but not executed within the watch deadline.
    TimedOut {
        hash: TxHash,
        explorer_url: String,
        waited: Duration,
        last_error: Option<String>,
    },
}

impl RunReport {
    pub fn hash(&self) -> Option<&TxHash> {
        match self {
            Self::Queried { .. } => None,
            Self::Submitted { hash, .. } | Self::TimedOut { hash, .. } => Some(hash),
            Self::Completed { outcome, .. } => Some(&outcome.hash),
        }
    }

    /// Explorer page of the broadcast transaction.
    pub fn explorer_url(&self) -> Option<&str> {
        match self {
            Self::Queried { .. } => None,
            Self::Submitted { explorer_url, .. }
            | Self::Completed { explorer_url, .. }
            | Self::TimedOut { explorer_url, .. } => Some(explorer_url),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queried { values, .. } => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "Query result: {}", rendered.join(", "))
            }
            Self::Submitted { hash, .. } => write!(f, "Transaction {} submitted", hash),
            Self::Completed { outcome, .. } => {
                write!(f, "Transaction {} finished with status {}", outcome.hash, outcome.status)?;
                if let Some(error) = &outcome.error {
                    write!(f, "\nError: {}", error)?;
                }
                write_details(f, &outcome.details)
            }
            Self::TimedOut {
                hash,
                waited,
                last_error,
                ..
            } => {
                write!(
                    f,
                    "Transaction {} not executed after {}s; it may still complete",
                    hash,
                    waited.as_secs()
                )?;
                if let Some(error) = last_error {
                    write!(f, " (last error: {})", error)?;
                }
                Ok(())
            }
        }
    }
}

fn write_details(f: &mut fmt::Formatter<'_>, details: &OutcomeDetails) -> fmt::Result {
    match details {
        OutcomeDetails::Issue(tokens) => {
            for token in tokens {
                write!(f, "\nToken identifier: {}", token.token_identifier)?;
            }
        }
        OutcomeDetails::SetSpecialRole(assignments) => {
            for assignment in assignments {
                write!(
                    f,
                    "\nRoles on {}: {}",
                    assignment.token_identifier,
                    assignment.roles.join(", ")
                )?;
            }
        }
        OutcomeDetails::NftCreate(created) => {
            for nft in created {
                write!(f, "\nToken identifier: {} Nonce: {}", nft.token_identifier, nft.nonce)?;
            }
        }
        OutcomeDetails::Deploy { result, contracts } => {
            write!(f, "\nReturn code: {}", result.return_code)?;
            for contract in contracts {
                write!(f, "\nContract address: {}", contract.address)?;
            }
        }
        OutcomeDetails::ContractCall(result) => {
            write!(f, "\nReturn code: {}", result.return_code)?;
            if !result.return_message.is_empty() {
                write!(f, " ({})", result.return_message)?;
            }
        }
    }
    Ok(())
}

/// Account state as shown by the `account` command.
#[derive(Debug, Clone)]
pub struct AccountOverview {
    pub account: AccountOnNetwork,
    pub tokens: Vec<TokenHolding>,
}

impl fmt::Display for AccountOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Address: {}\nNonce: {}\nBalance: {}",
            self.account.address, self.account.nonce, self.account.balance
        )?;
        for token in &self.tokens {
            write!(f, "\n{}: {}", token.identifier, token.balance)?;
        }
        Ok(())
    }
}
