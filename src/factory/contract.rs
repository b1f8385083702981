//! Smart contract deployment and calls.

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::factory::encoding::DataBuilder;
use crate::factory::operation::{CallRequest, DeployRequest};

/// VM type for WASM contracts.
const WASM_VM_TYPE: [u8; 2] = [0x05, 0x00];

/// Capability flags of deployed code, encoded as two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMetadata {
    pub upgradeable: bool,
    pub readable: bool,
    pub payable: bool,
    pub payable_by_contract: bool,
}

impl Default for CodeMetadata {
    fn default() -> Self {
        Self {
            upgradeable: true,
            readable: false,
            payable: false,
            payable_by_contract: false,
        }
    }
}

impl CodeMetadata {
    const UPGRADEABLE: u8 = 0x01;
    const READABLE: u8 = 0x04;
    const PAYABLE: u8 = 0x02;
    const PAYABLE_BY_CONTRACT: u8 = 0x04;

    pub fn to_bytes(&self) -> [u8; 2] {
        let mut first = 0;
        let mut second = 0;
        if self.upgradeable {
            first |= Self::UPGRADEABLE;
        }
        if self.readable {
            first |= Self::READABLE;
        }
        if self.payable {
            second |= Self::PAYABLE;
        }
        if self.payable_by_contract {
            second |= Self::PAYABLE_BY_CONTRACT;
        }
        [first, second]
    }
}

pub(crate) fn deploy_data(request: &DeployRequest) -> BlockchainResult<Vec<u8>> {
    if request.bytecode.is_empty() {
        return Err(BlockchainError::construction("contract bytecode is empty"));
    }
    check_gas_limit(request.gas_limit)?;

    // The bytecode is the "function" slot of the payload.
    let mut data = DataBuilder::new(&hex::encode(&request.bytecode))
        .bytes(&WASM_VM_TYPE)
        .bytes(&request.metadata.to_bytes());
    for argument in &request.arguments {
        data = data.argument(argument);
    }
    Ok(data.build())
}

pub(crate) fn call_data(request: &CallRequest) -> BlockchainResult<Vec<u8>> {
    check_endpoint(&request.function)?;
    check_gas_limit(request.gas_limit)?;

    let mut data = DataBuilder::new(&request.function);
    for argument in &request.arguments {
        data = data.argument(argument);
    }
    Ok(data.build())
}

pub(crate) fn check_endpoint(function: &str) -> BlockchainResult<()> {
    if function.trim().is_empty() {
        return Err(BlockchainError::construction("endpoint name is empty"));
    }
    Ok(())
}

fn check_gas_limit(gas_limit: u64) -> BlockchainResult<()> {
    if gas_limit == 0 {
        return Err(BlockchainError::construction("gas limit must be > 0"));
    }
    Ok(())
}
