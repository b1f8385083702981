//! HTTP API client with timeout and error handling.
//!
//! # Responsibilities
//! - Query account state and token holdings
//! - Broadcast signed transactions (single attempt, rejection surfaced verbatim)
//! - Fetch transaction status, logs and smart contract results
//! - Run read-only contract queries
//! - Retry idempotent reads on transient failures

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use num_bigint::BigUint;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::blockchain::account::{AccountOnNetwork, TokenHolding};
use crate::blockchain::address::Address;
use crate::blockchain::network::{
    ContractQuery, NetworkProvider, QueryResponse, SmartContractResult, TransactionEvent,
    TransactionOnNetwork,
};
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TransactionStatus, TxHash};
use crate::config::{NetworkConfig, RetryConfig};
use crate::resilience::retries::retry_read;
use crate::resilience::timeouts::with_timeout;

/// Return code of a successful query.
const QUERY_OK: &str = "ok";

/// Network provider backed by the public HTTP API.
#[derive(Clone)]
pub struct ApiNetworkProvider {
    http: reqwest::Client,
    base_url: url::Url,
    timeout_duration: Duration,
    retries: RetryConfig,
}

impl ApiNetworkProvider {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `network` - API URL and request timeout
    /// * `retries` - Retry policy for read requests
    pub fn new(network: &NetworkConfig, retries: RetryConfig) -> BlockchainResult<Self> {
        let mut base_url = url::Url::parse(&network.api_url).map_err(|e| {
            BlockchainError::Network(format!("Invalid API URL '{}': {}", network.api_url, e))
        })?;
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        tracing::info!(api_url = %base_url, "API network provider initialized");

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            timeout_duration: Duration::from_secs(network.request_timeout_secs),
            retries,
        })
    }

    fn endpoint(&self, path: &str) -> BlockchainResult<url::Url> {
        self.base_url
            .join(path)
            .map_err(|e| BlockchainError::Network(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BlockchainResult<Option<T>> {
        let url = self.endpoint(path)?;
        with_timeout(self.timeout_duration, async {
            let response = self.http.get(url).send().await.map_err(transport_error)?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            read_json(response).await.map(Some)
        })
        .await
    }
}

#[async_trait]
impl NetworkProvider for ApiNetworkProvider {
    async fn get_account(&self, address: &Address) -> BlockchainResult<AccountOnNetwork> {
        let path = format!("accounts/{}", address);
        let found: Option<ApiAccount> =
            retry_read(&self.retries, "get_account", || self.get_json(&path)).await?;
        let dto = found.ok_or_else(|| BlockchainError::Api {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: format!("account {} not found", address),
        })?;

        let balance = BigUint::from_str(&dto.balance)
            .map_err(|e| BlockchainError::decode(format!("balance '{}': {}", dto.balance, e)))?;
        Ok(AccountOnNetwork {
            address: *address,
            nonce: dto.nonce,
            balance,
        })
    }

    async fn get_account_tokens(&self, address: &Address) -> BlockchainResult<Vec<TokenHolding>> {
        let path = format!("accounts/{}/tokens", address);
        let tokens: Option<Vec<TokenHolding>> =
            retry_read(&self.retries, "get_account_tokens", || self.get_json(&path)).await?;
        Ok(tokens.unwrap_or_default())
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        let url = self.endpoint("transactions")?;
        let wire = tx.to_wire();
        let response = with_timeout(self.timeout_duration, async {
            self.http.post(url).json(&wire).send().await.map_err(transport_error)
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlockchainError::Rejected(rejection_message(status, &body)));
        }

        let sent: ApiSentTransaction = response
            .json()
            .await
            .map_err(|e| BlockchainError::BroadcastUnconfirmed(e.to_string()))?;
        Ok(TxHash(sent.tx_hash))
    }

    async fn get_transaction(&self, hash: &TxHash) -> BlockchainResult<Option<TransactionOnNetwork>> {
        let path = format!("transactions/{}", hash);
        let dto: Option<ApiTransaction> = self.get_json(&path).await?;
        dto.map(|dto| dto.into_domain(hash)).transpose()
    }

    async fn query_contract(&self, query: &ContractQuery) -> BlockchainResult<QueryResponse> {
        let url = self.endpoint("query")?;
        let body = ApiQueryRequest::from(query);

        let dto: ApiQueryResponse = retry_read(&self.retries, "query_contract", || {
            let url = url.clone();
            let body = &body;
            with_timeout(self.timeout_duration, async move {
                let response = self.http.post(url).json(body).send().await.map_err(transport_error)?;
                read_json(response).await
            })
        })
        .await?;

        let return_data = dto
            .return_data
            .iter()
            .map(|item| decode_base64_opt(item.as_deref()))
            .collect::<BlockchainResult<Vec<_>>>()?;

        if dto.return_code != QUERY_OK {
            return Err(BlockchainError::QueryFailed {
                code: dto.return_code,
                message: dto.return_message,
            });
        }

        Ok(QueryResponse {
            return_code: dto.return_code,
            return_message: dto.return_message,
            return_data,
        })
    }
}

impl std::fmt::Debug for ApiNetworkProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiNetworkProvider")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

fn transport_error(e: reqwest::Error) -> BlockchainError {
    BlockchainError::Network(e.to_string())
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> BlockchainResult<T> {
    let status = response.status();
    if status.is_server_error() {
        return Err(BlockchainError::Network(format!("API returned {}", status)));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BlockchainError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| BlockchainError::decode(e.to_string()))
}

/// Prefer the API's `message` field; fall back to the raw body.
fn rejection_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiErrorBody {
        message: String,
    }
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.is_empty() => format!("HTTP {}", status),
        Err(_) => body.to_string(),
    }
}

fn decode_base64_opt(value: Option<&str>) -> BlockchainResult<Vec<u8>> {
    match value {
        None | Some("") => Ok(Vec::new()),
        Some(text) => BASE64
            .decode(text)
            .map_err(|e| BlockchainError::decode(format!("base64 '{}': {}", text, e))),
    }
}

#[derive(Debug, Deserialize)]
struct ApiAccount {
    #[serde(default)]
    nonce: u64,
    #[serde(default = "zero_balance")]
    balance: String,
}

fn zero_balance() -> String {
    "0".to_string()
}

#[derive(Debug, Deserialize)]
struct ApiSentTransaction {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiLogs {
    #[serde(default)]
    events: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(default)]
    address: Option<String>,
    identifier: String,
    #[serde(default)]
    topics: Vec<Option<String>>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    logs: Option<ApiLogs>,
}

#[derive(Debug, Deserialize)]
struct ApiTransaction {
    status: String,
    #[serde(default)]
    logs: Option<ApiLogs>,
    #[serde(default)]
    results: Vec<ApiResult>,
}

impl ApiTransaction {
    fn into_domain(self, hash: &TxHash) -> BlockchainResult<TransactionOnNetwork> {
        let events = convert_events(self.logs)?;
        let smart_contract_results = self
            .results
            .into_iter()
            .map(|result| {
                Ok(SmartContractResult {
                    data: decode_base64_opt(result.data.as_deref())?,
                    events: convert_events(result.logs)?,
                })
            })
            .collect::<BlockchainResult<Vec<_>>>()?;

        Ok(TransactionOnNetwork {
            hash: hash.clone(),
            status: TransactionStatus::from_api(&self.status),
            events,
            smart_contract_results,
        })
    }
}

fn convert_events(logs: Option<ApiLogs>) -> BlockchainResult<Vec<TransactionEvent>> {
    logs.unwrap_or_default()
        .events
        .into_iter()
        .map(|event| {
            let topics = event
                .topics
                .iter()
                .map(|topic| decode_base64_opt(topic.as_deref()))
                .collect::<BlockchainResult<Vec<_>>>()?;
            // Event addresses are informational; a foreign format is dropped, not fatal.
            let address = event
                .address
                .as_deref()
                .and_then(|a| Address::from_bech32(a).ok());
            Ok(TransactionEvent {
                address,
                identifier: event.identifier,
                topics,
                data: decode_base64_opt(event.data.as_deref())?,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct ApiQueryRequest {
    #[serde(rename = "scAddress")]
    sc_address: String,
    #[serde(rename = "funcName")]
    func_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    args: Vec<String>,
}

impl From<&ContractQuery> for ApiQueryRequest {
    fn from(query: &ContractQuery) -> Self {
        Self {
            sc_address: query.contract.to_bech32(),
            func_name: query.function.clone(),
            caller: query.caller.map(|c| c.to_bech32()),
            value: query.value.as_ref().map(|v| v.to_string()),
            args: query.arguments.iter().map(hex::encode).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiQueryResponse {
    #[serde(rename = "returnData", default)]
    return_data: Vec<Option<String>>,
    #[serde(rename = "returnCode", default)]
    return_code: String,
    #[serde(rename = "returnMessage", default)]
    return_message: String,
}
