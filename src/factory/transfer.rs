//! Native and ESDT transfer encoding.

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::token::TokenTransfer;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::GasConfig;
use crate::factory::encoding::DataBuilder;

/// Extra gas for a fungible `ESDTTransfer` on top of the configured base.
const ESDT_TRANSFER_EXTRA_GAS: u64 = 100_000;

/// Extra gas for NFT/SFT and multi transfers.
const ESDT_NFT_TRANSFER_EXTRA_GAS: u64 = 800_000;

/// Receiver, data payload and execution gas of a token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedTransfer {
    pub receiver: Address,
    pub data: Vec<u8>,
    pub execution_gas: u64,
}

/// Encode one or more token transfers.
///
/// A single fungible transfer goes straight to the receiver. Anything
/// carrying a nonce, or more than one transfer, is sent to self and names
/// the real receiver inside the payload.
pub(crate) fn encode_token_transfers(
    gas: &GasConfig,
    sender: &Address,
    receiver: &Address,
    transfers: &[TokenTransfer],
) -> BlockchainResult<EncodedTransfer> {
    if transfers.is_empty() {
        return Err(BlockchainError::construction("no token transfers given"));
    }
    for transfer in transfers {
        transfer.validate()?;
    }

    let encoded = match transfers {
        [single] if single.is_fungible() => EncodedTransfer {
            receiver: *receiver,
            data: DataBuilder::new("ESDTTransfer")
                .text(single.token.as_str())
                .number(&single.amount)
                .build(),
            execution_gas: gas.gas_limit_esdt_transfer.saturating_add(ESDT_TRANSFER_EXTRA_GAS),
        },
        [single] => EncodedTransfer {
            receiver: *sender,
            data: DataBuilder::new("ESDTNFTTransfer")
                .text(single.token.as_str())
                .u64(single.nonce())
                .number(&single.amount)
                .address(receiver)
                .build(),
            execution_gas: gas.gas_limit_esdt_nft_transfer.saturating_add(ESDT_NFT_TRANSFER_EXTRA_GAS),
        },
        many => {
            let mut data = DataBuilder::new("MultiESDTNFTTransfer")
                .address(receiver)
                .u64(many.len() as u64);
            for transfer in many {
                data = data
                    .text(transfer.token.as_str())
                    .u64(transfer.nonce())
                    .number(&transfer.amount);
            }
            EncodedTransfer {
                receiver: *sender,
                data: data.build(),
                execution_gas: gas
                    .gas_limit_multi_esdt_nft_transfer
                    .saturating_mul(many.len() as u64)
                    .saturating_add(ESDT_NFT_TRANSFER_EXTRA_GAS),
            }
        }
    };
    Ok(encoded)
}

/// Native transfers carry the data verbatim.
pub(crate) fn check_native_amount(amount: &BigUint, data: &[u8]) -> BlockchainResult<()> {
    if *amount == BigUint::ZERO && data.is_empty() {
        return Err(BlockchainError::construction(
            "native transfer needs an amount or a data payload",
        ));
    }
    Ok(())
}
