//! Token management operations: issuance, role assignment and NFT creation.
//!
//! All three are plain transactions whose data payload calls a built-in
//! function. Issuance and role assignment go to the ESDT system contract;
//! NFT creation is sent to self.

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::token::{validate_ticker, TokenIdentifier};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::factory::encoding::DataBuilder;
use crate::factory::operation::{IssueRequest, NftCreateRequest};

/// Royalties are basis points; 10000 is 100%.
pub const MAX_ROYALTIES: u32 = 10_000;

/// Gas per byte of NFT creation data.
const NFT_CREATE_GAS_PER_DATA_BYTE: u64 = 1_500;

/// Gas per byte of stored attributes and hash.
const NFT_CREATE_GAS_PER_STORED_BYTE: u64 = 50_000;

/// Gas limit for `ESDTNFTCreate`.
///
/// Replaces the usual floor-plus-per-byte rule for this one operation; no
/// other operation uses it.
pub fn nft_create_gas_limit(data_len: usize, attributes_len: usize, hash_len: usize) -> u64 {
    let stored = attributes_len.saturating_add(hash_len) as u64;
    (data_len as u64)
        .saturating_mul(NFT_CREATE_GAS_PER_DATA_BYTE)
        .saturating_add(stored.saturating_mul(NFT_CREATE_GAS_PER_STORED_BYTE))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Fungible {
        initial_supply: BigUint,
        decimals: u32,
    },
    SemiFungible,
    NonFungible,
}

impl IssueKind {
    fn function(&self) -> &'static str {
        match self {
            Self::Fungible { .. } => "issue",
            Self::SemiFungible => "issueSemiFungible",
            Self::NonFungible => "issueNonFungible",
        }
    }
}

/// Capability flags fixed at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenProperties {
    pub can_freeze: bool,
    pub can_wipe: bool,
    pub can_pause: bool,
    /// Ignored for fungible tokens.
    pub can_transfer_nft_create_role: bool,
    pub can_change_owner: bool,
    pub can_upgrade: bool,
    pub can_add_special_roles: bool,
}

impl TokenProperties {
    /// Every capability enabled.
    pub fn all() -> Self {
        Self {
            can_freeze: true,
            can_wipe: true,
            can_pause: true,
            can_transfer_nft_create_role: true,
            can_change_owner: true,
            can_upgrade: true,
            can_add_special_roles: true,
        }
    }

    fn flags(&self, kind: &IssueKind) -> Vec<(&'static str, bool)> {
        let mut flags = vec![
            ("canFreeze", self.can_freeze),
            ("canWipe", self.can_wipe),
            ("canPause", self.can_pause),
        ];
        if !matches!(kind, IssueKind::Fungible { .. }) {
            flags.push(("canTransferNFTCreateRole", self.can_transfer_nft_create_role));
        }
        flags.extend([
            ("canChangeOwner", self.can_change_owner),
            ("canUpgrade", self.can_upgrade),
            ("canAddSpecialRoles", self.can_add_special_roles),
        ]);
        flags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialRole {
    LocalMint,
    LocalBurn,
    NftCreate,
    NftBurn,
    NftAddQuantity,
    NftUpdateAttributes,
    NftAddUri,
    Transfer,
}

impl SpecialRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalMint => "ESDTRoleLocalMint",
            Self::LocalBurn => "ESDTRoleLocalBurn",
            Self::NftCreate => "ESDTRoleNFTCreate",
            Self::NftBurn => "ESDTRoleNFTBurn",
            Self::NftAddQuantity => "ESDTRoleNFTAddQuantity",
            Self::NftUpdateAttributes => "ESDTRoleNFTUpdateAttributes",
            Self::NftAddUri => "ESDTRoleNFTAddURI",
            Self::Transfer => "ESDTTransferRole",
        }
    }
}

impl std::fmt::Display for SpecialRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_collection_name(name: &str) -> BlockchainResult<()> {
    let valid_len = (3..=20).contains(&name.len());
    if !valid_len || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(BlockchainError::construction(format!(
            "token name '{}' must be 3-20 alphanumeric characters",
            name
        )));
    }
    Ok(())
}

pub(crate) fn issue_data(request: &IssueRequest) -> BlockchainResult<Vec<u8>> {
    validate_collection_name(&request.name)?;
    validate_ticker(&request.ticker)?;

    let mut data = DataBuilder::new(request.kind.function())
        .text(&request.name)
        .text(&request.ticker);
    if let IssueKind::Fungible {
        initial_supply,
        decimals,
    } = &request.kind
    {
        data = data.number(initial_supply).u64(u64::from(*decimals));
    }
    for (name, value) in request.properties.flags(&request.kind) {
        data = data.text(name).boolean_word(value);
    }
    Ok(data.build())
}

pub(crate) fn set_special_role_data(
    token: &TokenIdentifier,
    user: &Address,
    roles: &[SpecialRole],
) -> BlockchainResult<Vec<u8>> {
    if roles.is_empty() {
        return Err(BlockchainError::construction("at least one role is required"));
    }
    let mut data = DataBuilder::new("setSpecialRole")
        .text(token.as_str())
        .address(user);
    for role in roles {
        data = data.text(role.as_str());
    }
    Ok(data.build())
}

pub(crate) fn nft_create_data(request: &NftCreateRequest) -> BlockchainResult<Vec<u8>> {
    if request.name.trim().is_empty() {
        return Err(BlockchainError::construction("NFT name must not be empty"));
    }
    if request.royalties > MAX_ROYALTIES {
        return Err(BlockchainError::construction(format!(
            "royalties {} exceed {}",
            request.royalties, MAX_ROYALTIES
        )));
    }
    if request.uris.is_empty() {
        return Err(BlockchainError::construction("at least one URI is required"));
    }
    if request.initial_quantity == BigUint::ZERO {
        return Err(BlockchainError::construction("initial quantity must be non-zero"));
    }

    let mut data = DataBuilder::new("ESDTNFTCreate")
        .text(request.token.as_str())
        .number(&request.initial_quantity)
        .text(&request.name)
        .u64(u64::from(request.royalties))
        .bytes(&request.hash)
        .bytes(&request.attributes);
    for uri in &request.uris {
        data = data.text(uri);
    }
    Ok(data.build())
}
