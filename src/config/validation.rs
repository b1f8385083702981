//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse every address, token identifier and amount once, up front
//! - Validate value ranges (timeouts > 0, royalties <= 10000)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PipelineConfig → Result<(), Vec<ValidationError>>

use std::str::FromStr;

use thiserror::Error;

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::token::{validate_ticker, TokenIdentifier};
use crate::config::schema::PipelineConfig;
use crate::factory::token_management::MAX_ROYALTIES;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "network.api_url", &config.network.api_url);
    check_url(&mut errors, "network.explorer_url", &config.network.explorer_url);
    if config.network.chain_id.trim().is_empty() {
        errors.push(ValidationError::new("network.chain_id", "must not be empty"));
    }
    if config.network.request_timeout_secs == 0 {
        errors.push(ValidationError::new("network.request_timeout_secs", "must be > 0"));
    }

    check_amount(&mut errors, "gas.issue_cost", &config.gas.issue_cost);
    if config.gas.gas_price == 0 {
        errors.push(ValidationError::new("gas.gas_price", "must be > 0"));
    }

    if config.watcher.poll_interval_ms == 0 {
        errors.push(ValidationError::new("watcher.poll_interval_ms", "must be > 0"));
    }
    if config.watcher.timeout_secs == 0 {
        errors.push(ValidationError::new("watcher.timeout_secs", "must be > 0"));
    } else if config.watcher.poll_interval_ms > config.watcher.timeout_secs.saturating_mul(1_000) {
        errors.push(ValidationError::new(
            "watcher.poll_interval_ms",
            "must not exceed watcher.timeout_secs",
        ));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be >= 1"));
    }

    check_address(&mut errors, "accounts.receiver", &config.accounts.receiver);

    let transfers = &config.transfers;
    check_amount(&mut errors, "transfers.egld_amount", &transfers.egld_amount);
    check_amount(&mut errors, "transfers.demo_value", &transfers.demo_value);
    check_token(&mut errors, "transfers.fungible_token", &transfers.fungible_token);
    check_amount(&mut errors, "transfers.fungible_amount", &transfers.fungible_amount);
    check_token(&mut errors, "transfers.semi_fungible_token", &transfers.semi_fungible_token);
    check_amount(&mut errors, "transfers.semi_fungible_amount", &transfers.semi_fungible_amount);
    check_token(&mut errors, "transfers.non_fungible_token", &transfers.non_fungible_token);

    let nft = &config.nft;
    if validate_ticker(&nft.collection_ticker).is_err() {
        errors.push(ValidationError::new(
            "nft.collection_ticker",
            "must be 3-10 uppercase alphanumeric characters",
        ));
    }
    check_token(&mut errors, "nft.collection_id", &nft.collection_id);
    if nft.royalties > MAX_ROYALTIES {
        errors.push(ValidationError::new("nft.royalties", "must be at most 10000"));
    }
    if nft.uris.is_empty() {
        errors.push(ValidationError::new("nft.uris", "at least one URI is required"));
    }

    check_address(&mut errors, "contract.address", &config.contract.address);
    check_amount(&mut errors, "contract.add_amount", &config.contract.add_amount);
    if config.contract.deploy_gas_limit == 0 || config.contract.call_gas_limit == 0 {
        errors.push(ValidationError::new("contract", "gas limits must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = Address::from_bech32(value) {
        errors.push(ValidationError::new(field, e.to_string()));
    }
}

fn check_token(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if let Err(e) = TokenIdentifier::new(value) {
        errors.push(ValidationError::new(field, e.to_string()));
    }
}

fn check_amount(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if BigUint::from_str(value).is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not an unsigned integer", value)));
    }
}
