//! Outcome resolution.
//!
//! # Data Flow
//! ```text
//! TransactionOnNetwork (from the watcher)
//!     → parser.rs (events + smart contract results → ParsedOutcome)
//! QueryResponse
//!     → values.rs (raw return data → TypedValue per declared ValueType)
//! ```

pub mod parser;
pub mod types;
pub mod values;

pub use parser::parse_outcome;
pub use types::{
    CreatedNft, DeployedContract, IssuedToken, OutcomeDetails, OutcomeShape, ParsedOutcome,
    ReturnData, RoleAssignment,
};
pub use values::{decode_values, TypedValue, ValueType};
