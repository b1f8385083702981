//! Command-line surface: one positional operation name.

use std::path::Path;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::token::{TokenIdentifier, TokenTransfer};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::PipelineConfig;
use crate::factory::{
    ArgValue, CallRequest, CodeMetadata, DeployRequest, IssueKind, IssueRequest, NftCreateRequest,
    OperationDescriptor, QueryRequest, SpecialRole, TokenProperties,
};
use crate::outcome::values::ValueType;

#[derive(Debug, Parser)]
#[command(name = "mvx-pipeline")]
#[command(about = "Build, sign, broadcast and track MultiversX transactions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Send native currency with a demo data payload
    SendDemo,
    /// Transfer native currency
    TransferEgld,
    /// Transfer a fungible ESDT
    TransferFungible,
    /// Transfer one NFT
    TransferNft,
    /// Transfer semi-fungible units
    TransferSft,
    /// Transfer an NFT, SFT units and a fungible amount in one transaction
    MultiTransfer,
    /// Issue a non-fungible collection
    IssueNftCollection,
    /// Grant NFT creation roles on the collection to the sender
    SetSpecialRolesForNft,
    /// Create an NFT in the collection
    CreateNft,
    /// Deploy the piggy bank contract
    DeployContract,
    /// Call `createPiggy` on the piggy bank contract
    CreatePiggy,
    /// Call `addAmount` on the piggy bank contract
    AddAmount,
    /// Query `getLockedAmount` on the piggy bank contract
    GetLockedAmount,
    /// Show the sender's nonce, balance and tokens
    Account,
}

impl Command {
    /// Map the command to an operation, taking every parameter from `config`.
    ///
    /// `None` for commands that only read account state.
    pub fn descriptor(
        &self,
        config: &PipelineConfig,
        sender: &Address,
    ) -> BlockchainResult<Option<OperationDescriptor>> {
        let transfers = &config.transfers;
        let descriptor = match self {
            Command::Account => return Ok(None),
            Command::SendDemo => OperationDescriptor::NativeTransfer {
                receiver: receiver(config)?,
                amount: amount(&transfers.demo_value)?,
                data: transfers.demo_data.as_bytes().to_vec(),
            },
            Command::TransferEgld => OperationDescriptor::NativeTransfer {
                receiver: receiver(config)?,
                amount: amount(&transfers.egld_amount)?,
                data: Vec::new(),
            },
            Command::TransferFungible => OperationDescriptor::TokenTransfer {
                receiver: receiver(config)?,
                transfers: vec![fungible(config)?],
            },
            Command::TransferNft => OperationDescriptor::TokenTransfer {
                receiver: receiver(config)?,
                transfers: vec![TokenTransfer::non_fungible(
                    token(&transfers.non_fungible_token)?,
                    transfers.non_fungible_nonce,
                )],
            },
            Command::TransferSft => OperationDescriptor::TokenTransfer {
                receiver: receiver(config)?,
                transfers: vec![semi_fungible(config)?],
            },
            Command::MultiTransfer => OperationDescriptor::TokenTransfer {
                receiver: receiver(config)?,
                transfers: vec![
                    TokenTransfer::non_fungible(
                        token(&transfers.non_fungible_token)?,
                        transfers.multi_transfer_nft_nonce,
                    ),
                    semi_fungible(config)?,
                    fungible(config)?,
                ],
            },
            Command::IssueNftCollection => OperationDescriptor::Issue(IssueRequest {
                kind: IssueKind::NonFungible,
                name: config.nft.collection_name.clone(),
                ticker: config.nft.collection_ticker.clone(),
                properties: TokenProperties::all(),
            }),
            Command::SetSpecialRolesForNft => OperationDescriptor::SetSpecialRole {
                token: token(&config.nft.collection_id)?,
                user: *sender,
                roles: vec![
                    SpecialRole::NftCreate,
                    SpecialRole::NftBurn,
                    SpecialRole::NftAddUri,
                    SpecialRole::NftUpdateAttributes,
                ],
            },
            Command::CreateNft => OperationDescriptor::NftCreate(NftCreateRequest {
                token: token(&config.nft.collection_id)?,
                initial_quantity: BigUint::from(1u8),
                name: config.nft.name.clone(),
                royalties: config.nft.royalties,
                hash: config.nft.hash.as_bytes().to_vec(),
                attributes: config.nft.attributes.as_bytes().to_vec(),
                uris: config.nft.uris.clone(),
            }),
            Command::DeployContract => {
                let contract = &config.contract;
                OperationDescriptor::Deploy(DeployRequest {
                    bytecode: read_bytecode(Path::new(&contract.wasm_path))?,
                    metadata: CodeMetadata {
                        upgradeable: contract.upgradeable,
                        readable: contract.readable,
                        payable: contract.payable,
                        payable_by_contract: contract.payable_by_contract,
                    },
                    arguments: Vec::new(),
                    amount: BigUint::ZERO,
                    gas_limit: contract.deploy_gas_limit,
                })
            }
            Command::CreatePiggy => OperationDescriptor::Call(CallRequest {
                contract: contract_address(config)?,
                function: "createPiggy".to_string(),
                arguments: vec![ArgValue::U64(config.contract.lock_until)],
                amount: BigUint::ZERO,
                gas_limit: config.contract.call_gas_limit,
            }),
            Command::AddAmount => OperationDescriptor::Call(CallRequest {
                contract: contract_address(config)?,
                function: "addAmount".to_string(),
                arguments: Vec::new(),
                amount: amount(&config.contract.add_amount)?,
                gas_limit: config.contract.call_gas_limit,
            }),
            Command::GetLockedAmount => OperationDescriptor::Query(QueryRequest {
                contract: contract_address(config)?,
                function: "getLockedAmount".to_string(),
                arguments: vec![ArgValue::Address(*sender)],
                caller: None,
                value: None,
                returns: vec![ValueType::BigUint],
            }),
        };
        Ok(Some(descriptor))
    }
}

fn receiver(config: &PipelineConfig) -> BlockchainResult<Address> {
    Address::from_bech32(&config.accounts.receiver)
}

fn contract_address(config: &PipelineConfig) -> BlockchainResult<Address> {
    Address::from_bech32(&config.contract.address)
}

fn token(identifier: &str) -> BlockchainResult<TokenIdentifier> {
    TokenIdentifier::new(identifier)
}

fn amount(value: &str) -> BlockchainResult<BigUint> {
    BigUint::from_str(value)
        .map_err(|e| BlockchainError::construction(format!("amount '{}': {}", value, e)))
}

fn fungible(config: &PipelineConfig) -> BlockchainResult<TokenTransfer> {
    Ok(TokenTransfer::fungible(
        token(&config.transfers.fungible_token)?,
        amount(&config.transfers.fungible_amount)?,
    ))
}

fn semi_fungible(config: &PipelineConfig) -> BlockchainResult<TokenTransfer> {
    Ok(TokenTransfer::semi_fungible(
        token(&config.transfers.semi_fungible_token)?,
        config.transfers.semi_fungible_nonce,
        amount(&config.transfers.semi_fungible_amount)?,
    ))
}

fn read_bytecode(path: &Path) -> BlockchainResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        BlockchainError::construction(format!("cannot read contract code {}: {}", path.display(), e))
    })
}
