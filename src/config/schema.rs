//! Configuration schema definitions.
//!
//! Every value that used to be a hardcoded constant (addresses, token
//! identifiers, contract address, amounts) lives here and is passed into
//! the pipeline explicitly. All sections default to devnet values so a
//! missing file still yields a runnable configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the transaction pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// API endpoint, explorer and chain identifier.
    pub network: NetworkConfig,

    /// Gas schedule used by the transaction builder.
    pub gas: GasConfig,

    /// Encrypted key file location.
    pub wallet: WalletConfig,

    /// Outcome polling bounds.
    pub watcher: WatcherConfig,

    /// Retry policy for read-only requests.
    pub retries: RetryConfig,

    /// Counterparty accounts.
    pub accounts: AccountsConfig,

    /// Transfer operation inputs.
    pub transfers: TransfersConfig,

    /// NFT collection and creation inputs.
    pub nft: NftConfig,

    /// Smart contract inputs.
    pub contract: ContractConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP API base URL.
    pub api_url: String,

    /// Explorer base URL, used to print transaction links.
    pub explorer_url: String,

    /// Chain identifier included in every signed payload ("D", "T", "1").
    pub chain_id: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_url: "https://devnet-api.multiversx.com".to_string(),
            explorer_url: "https://devnet-explorer.multiversx.com".to_string(),
            chain_id: "D".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Gas schedule. The NFT creation formula is fixed and not part of it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Protocol floor for any transaction.
    pub min_gas_limit: u64,

    /// Surcharge per byte of data payload.
    pub gas_per_data_byte: u64,

    pub gas_price: u64,

    pub gas_limit_issue: u64,

    pub gas_limit_set_special_role: u64,

    pub gas_limit_esdt_transfer: u64,

    pub gas_limit_esdt_nft_transfer: u64,

    /// Charged once per transfer in a multi-transfer.
    pub gas_limit_multi_esdt_nft_transfer: u64,

    /// Native amount paid to issue a token (decimal string, smallest unit).
    pub issue_cost: String,

    pub tx_version: u32,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
            gas_price: 1_000_000_000,
            gas_limit_issue: 60_000_000,
            gas_limit_set_special_role: 60_000_000,
            gas_limit_esdt_transfer: 200_000,
            gas_limit_esdt_nft_transfer: 200_000,
            gas_limit_multi_esdt_nft_transfer: 200_000,
            issue_cost: "50000000000000000".to_string(), // 0.05 EGLD
            tx_version: 2,
        }
    }
}

/// Key file configuration. The password is never stored here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Path to the encrypted JSON key file.
    pub key_file: String,

    /// Environment variable holding the key file password.
    pub password_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            key_file: "./wallet.json".to_string(),
            password_env: crate::blockchain::wallet::PASSWORD_ENV_VAR.to_string(),
        }
    }
}

/// Polling bounds for awaiting a terminal transaction state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub poll_interval_ms: u64,

    /// Maximum time to wait before reporting a timeout.
    pub timeout_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 6_000,
            timeout_secs: 90,
        }
    }
}

/// Retry configuration for idempotent reads. Broadcasts never retry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Receiver of transfer operations.
    pub receiver: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            receiver: "erd176ddeqqde20rhgej35taa5jl828n9z4pur52x3lnfnj75w4v2qyqa230vx".to_string(),
        }
    }
}

/// Inputs of the transfer operations. Amounts are decimal strings in the
/// token's smallest unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransfersConfig {
    pub egld_amount: String,

    pub demo_value: String,

    pub demo_data: String,

    pub fungible_token: String,

    pub fungible_amount: String,

    pub semi_fungible_token: String,

    pub semi_fungible_nonce: u64,

    pub semi_fungible_amount: String,

    pub non_fungible_token: String,

    pub non_fungible_nonce: u64,

    /// NFT nonce moved by the multi-transfer operation.
    pub multi_transfer_nft_nonce: u64,
}

impl Default for TransfersConfig {
    fn default() -> Self {
        Self {
            egld_amount: "10000000000000000".to_string(), // 0.01 EGLD
            demo_value: "1000000000000000".to_string(),   // 0.001 EGLD
            demo_data: "This is the demo transaction!".to_string(),
            fungible_token: "DEMFUNGI-3ec13b".to_string(),
            fungible_amount: "10000000000000000000".to_string(), // 10 with 18 decimals
            semi_fungible_token: "DEMSFT-00eac9".to_string(),
            semi_fungible_nonce: 1,
            semi_fungible_amount: "10".to_string(),
            non_fungible_token: "ELVNFACE-762e9d".to_string(),
            non_fungible_nonce: 86,
            multi_transfer_nft_nonce: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NftConfig {
    pub collection_name: String,

    pub collection_ticker: String,

    /// Identifier assigned at issuance (ticker plus random suffix).
    pub collection_id: String,

    pub name: String,

    /// Basis points, 10000 = 100%.
    pub royalties: u32,

    /// UTF-8 attributes stored on chain.
    pub attributes: String,

    /// Optional content hash.
    pub hash: String,

    pub uris: Vec<String>,
}

impl Default for NftConfig {
    fn default() -> Self {
        Self {
            collection_name: "NFTCollection".to_string(),
            collection_ticker: "TTTTT".to_string(),
            collection_id: "TTTTT-adfc1e".to_string(),
            name: "Some NFT name for the token".to_string(),
            royalties: 500,
            attributes:
                "metadata:bafybeihof6n2b4gkahn2nwfhcxe72kvms4o5uevcok5chvg6f2zpfsi6hq/33.json"
                    .to_string(),
            hash: String::new(),
            uris: vec![
                "https://ipfs.io/ipfs/bafybeibimqon4pjm54x27n6we5qohx57gd6n2mnbkxu2r6nejp3nbenk7u/33.png".to_string(),
                "https://ipfs.io/ipfs/bafybeihof6n2b4gkahn2nwfhcxe72kvms4o5uevcok5chvg6f2zpfsi6hq/33.json".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed piggy bank contract.
    pub address: String,

    /// Compiled contract code used by deployment.
    pub wasm_path: String,

    pub deploy_gas_limit: u64,

    pub call_gas_limit: u64,

    pub upgradeable: bool,

    pub readable: bool,

    pub payable: bool,

    pub payable_by_contract: bool,

    /// Unix timestamp passed to `createPiggy`.
    pub lock_until: u64,

    /// Native amount sent with `addAmount`.
    pub add_amount: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "erd1qqqqqqqqqqqqqpgqtrajzw4vq0zxccdt9u66cvgg6vz8c6cwnegqkfqkpq".to_string(),
            wasm_path: "./piggybank.wasm".to_string(),
            deploy_gas_limit: 10_000_000,
            call_gas_limit: 5_000_000,
            upgradeable: true,
            readable: false,
            payable: false,
            payable_by_contract: false,
            lock_until: 1_750_686_756,
            add_amount: "1000000000000000".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
