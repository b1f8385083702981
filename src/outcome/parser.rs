//! Outcome parsers.
//!
//! # Design Decisions
//! - Pure functions of the network-reported state: parsing the same
//!   transaction twice gives the same outcome
//! - A failed transaction still parses; its details are usually empty and
//!   `error` carries the reason
//! - Parsing never fails once the transaction has executed: malformed
//!   events of the expected kind are skipped and reported in `error`,
//!   unrelated events are ignored

use num_bigint::BigUint;

use crate::blockchain::address::Address;
use crate::blockchain::network::{TransactionEvent, TransactionOnNetwork};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::outcome::types::{
    CreatedNft, DeployedContract, IssuedToken, OutcomeDetails, OutcomeShape, ParsedOutcome,
    ReturnData, RoleAssignment,
};

const SIGNAL_ERROR: &str = "signalError";
const WRITE_LOG: &str = "writeLog";
const ISSUE_EVENTS: [&str; 4] = ["issue", "issueSemiFungible", "issueNonFungible", "registerMetaESDT"];
const SET_ROLE_EVENT: &str = "ESDTSetRole";
const NFT_CREATE_EVENT: &str = "ESDTNFTCreate";
const DEPLOY_EVENT: &str = "SCDeploy";

/// Return code of a successful execution.
const RETURN_CODE_OK: &str = "ok";

/// Decode `tx` according to `shape`.
///
/// Whatever could not be decoded is left out of `details` and described in
/// `error`, unless a `signalError` message already occupies it.
pub fn parse_outcome(tx: &TransactionOnNetwork, shape: OutcomeShape) -> ParsedOutcome {
    let mut problems = Vec::new();
    let details = match shape {
        OutcomeShape::Issue => OutcomeDetails::Issue(keep_decoded(
            events_named(tx, &ISSUE_EVENTS).map(issued_token),
            &mut problems,
        )),
        OutcomeShape::SetSpecialRole => OutcomeDetails::SetSpecialRole(keep_decoded(
            events_named(tx, &[SET_ROLE_EVENT]).map(role_assignment),
            &mut problems,
        )),
        OutcomeShape::NftCreate => OutcomeDetails::NftCreate(keep_decoded(
            events_named(tx, &[NFT_CREATE_EVENT]).map(created_nft),
            &mut problems,
        )),
        OutcomeShape::Deploy => OutcomeDetails::Deploy {
            result: or_default(parse_return_data(tx), &mut problems),
            contracts: keep_decoded(
                events_named(tx, &[DEPLOY_EVENT]).map(deployed_contract),
                &mut problems,
            ),
        },
        OutcomeShape::ContractCall => {
            OutcomeDetails::ContractCall(or_default(parse_return_data(tx), &mut problems))
        }
    };

    if !problems.is_empty() {
        tracing::warn!(tx_hash = %tx.hash, problems = ?problems, "Skipped undecodable outcome data");
    }
    let error = find_error(tx).or_else(|| {
        (!problems.is_empty()).then(|| format!("undecodable outcome: {}", problems.join("; ")))
    });

    ParsedOutcome {
        hash: tx.hash.clone(),
        status: tx.status.clone(),
        error,
        details,
    }
}

fn keep_decoded<T>(
    results: impl Iterator<Item = BlockchainResult<T>>,
    problems: &mut Vec<String>,
) -> Vec<T> {
    results
        .filter_map(|result| match result {
            Ok(value) => Some(value),
            Err(e) => {
                problems.push(e.to_string());
                None
            }
        })
        .collect()
}

fn or_default<T: Default>(result: BlockchainResult<T>, problems: &mut Vec<String>) -> T {
    result.unwrap_or_else(|e| {
        problems.push(e.to_string());
        T::default()
    })
}

fn find_error(tx: &TransactionOnNetwork) -> Option<String> {
    tx.all_events()
        .find(|e| e.identifier == SIGNAL_ERROR)
        .map(signal_error_message)
}

fn signal_error_message(event: &TransactionEvent) -> String {
    match event.topics.get(1) {
        Some(message) if !message.is_empty() => String::from_utf8_lossy(message).into_owned(),
        _ => String::from_utf8_lossy(&event.data).into_owned(),
    }
}

fn events_named<'a>(
    tx: &'a TransactionOnNetwork,
    names: &'a [&'a str],
) -> impl Iterator<Item = &'a TransactionEvent> {
    tx.all_events().filter(move |e| names.contains(&e.identifier.as_str()))
}

fn topic<'a>(event: &'a TransactionEvent, index: usize) -> BlockchainResult<&'a [u8]> {
    event.topics.get(index).map(Vec::as_slice).ok_or_else(|| {
        BlockchainError::decode(format!(
            "event {} has no topic {}",
            event.identifier, index
        ))
    })
}

fn text_topic(event: &TransactionEvent, index: usize) -> BlockchainResult<String> {
    let raw = topic(event, index)?;
    String::from_utf8(raw.to_vec()).map_err(|_| {
        BlockchainError::decode(format!(
            "event {} topic {} is not UTF-8",
            event.identifier, index
        ))
    })
}

fn u64_topic(event: &TransactionEvent, index: usize) -> BlockchainResult<u64> {
    let raw = topic(event, index)?;
    if raw.len() > 8 {
        return Err(BlockchainError::decode(format!(
            "event {} topic {} does not fit a u64",
            event.identifier, index
        )));
    }
    Ok(raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn issued_token(event: &TransactionEvent) -> BlockchainResult<IssuedToken> {
    Ok(IssuedToken {
        token_identifier: text_topic(event, 0)?,
    })
}

fn role_assignment(event: &TransactionEvent) -> BlockchainResult<RoleAssignment> {
    let roles = event
        .topics
        .iter()
        .skip(3)
        .map(|role| String::from_utf8_lossy(role).into_owned())
        .collect();
    Ok(RoleAssignment {
        user: event.address,
        token_identifier: text_topic(event, 0)?,
        roles,
    })
}

fn created_nft(event: &TransactionEvent) -> BlockchainResult<CreatedNft> {
    Ok(CreatedNft {
        token_identifier: text_topic(event, 0)?,
        nonce: u64_topic(event, 1)?,
        // Absent amount topic means a single unit.
        initial_quantity: event
            .topics
            .get(2)
            .map(|raw| BigUint::from_bytes_be(raw))
            .unwrap_or_else(|| BigUint::from(1u8)),
    })
}

fn deployed_contract(event: &TransactionEvent) -> BlockchainResult<DeployedContract> {
    Ok(DeployedContract {
        address: Address::from_slice(topic(event, 0)?)?,
        owner: Address::from_slice(topic(event, 1)?)?,
        code_hash: event.topics.get(2).cloned().unwrap_or_default(),
    })
}

/// Return data comes from, in order: a `signalError` event, the first
/// `@`-prefixed smart contract result, or a `writeLog` event.
fn parse_return_data(tx: &TransactionOnNetwork) -> BlockchainResult<ReturnData> {
    if let Some(event) = tx.all_events().find(|e| e.identifier == SIGNAL_ERROR) {
        let (code, _) = split_return_payload(&event.data)?.unwrap_or_default();
        return Ok(ReturnData {
            return_code: code,
            return_message: signal_error_message(event),
            values: Vec::new(),
        });
    }

    let from_results = tx
        .smart_contract_results
        .iter()
        .find(|r| r.data.starts_with(b"@"))
        .map(|r| r.data.as_slice());
    let from_log = || {
        tx.all_events()
            .find(|e| e.identifier == WRITE_LOG && e.data.starts_with(b"@"))
            .map(|e| e.data.as_slice())
    };

    let payload = match from_results.or_else(from_log) {
        Some(payload) => payload,
        None => return Ok(ReturnData::default()),
    };

    let (return_code, values) = split_return_payload(payload)?.unwrap_or_default();
    let return_message = if return_code == RETURN_CODE_OK {
        String::new()
    } else {
        return_code.clone()
    };
    Ok(ReturnData {
        return_code,
        return_message,
        values,
    })
}

/// Split `@<code hex>@<value hex>…` into the decoded code and raw values.
fn split_return_payload(payload: &[u8]) -> BlockchainResult<Option<(String, Vec<Vec<u8>>)>> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| BlockchainError::decode("return data is not UTF-8"))?;
    let mut parts = match text.strip_prefix('@') {
        Some(rest) => rest.split('@'),
        None => return Ok(None),
    };

    let code_hex = parts.next().unwrap_or_default();
    let code = decode_hex_part(code_hex)?;
    let values = parts.map(decode_hex_part).collect::<BlockchainResult<Vec<_>>>()?;
    Ok(Some((String::from_utf8_lossy(&code).into_owned(), values)))
}

fn decode_hex_part(part: &str) -> BlockchainResult<Vec<u8>> {
    hex::decode(part).map_err(|e| BlockchainError::decode(format!("return data '{}': {}", part, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::network::SmartContractResult;
    use crate::blockchain::types::{TransactionStatus, TxHash};

    fn event(identifier: &str, topics: Vec<Vec<u8>>, data: &[u8]) -> TransactionEvent {
        TransactionEvent {
            address: None,
            identifier: identifier.to_string(),
            topics,
            data: data.to_vec(),
        }
    }

    fn tx(events: Vec<TransactionEvent>, results: Vec<SmartContractResult>) -> TransactionOnNetwork {
        TransactionOnNetwork {
            hash: TxHash("feed".into()),
            status: TransactionStatus::Success,
            events,
            smart_contract_results: results,
        }
    }

    #[test]
    fn test_issue_from_result_logs() {
        let network_tx = tx(
            Vec::new(),
            vec![SmartContractResult {
                data: b"@6f6b".to_vec(),
                events: vec![event(
                    "issueNonFungible",
                    vec![b"TTTTT-adfc1e".to_vec(), b"NFTCollection".to_vec()],
                    b"",
                )],
            }],
        );
        let outcome = parse_outcome(&network_tx, OutcomeShape::Issue);
        assert!(outcome.is_successful());
        assert_eq!(
            outcome.details,
            OutcomeDetails::Issue(vec![IssuedToken {
                token_identifier: "TTTTT-adfc1e".into()
            }])
        );
    }

    #[test]
    fn test_nft_create() {
        let network_tx = tx(
            vec![event(
                NFT_CREATE_EVENT,
                vec![b"TTTTT-adfc1e".to_vec(), vec![0x01, 0x0b], vec![0x01]],
                b"",
            )],
            Vec::new(),
        );
        let outcome = parse_outcome(&network_tx, OutcomeShape::NftCreate);
        assert_eq!(
            outcome.details,
            OutcomeDetails::NftCreate(vec![CreatedNft {
                token_identifier: "TTTTT-adfc1e".into(),
                nonce: 267,
                initial_quantity: BigUint::from(1u8),
            }])
        );
    }

    #[test]
    fn test_set_special_role() {
        let user = Address::from_bytes([9u8; 32]);
        let mut set_role = event(
            SET_ROLE_EVENT,
            vec![
                b"TTTTT-adfc1e".to_vec(),
                Vec::new(),
                Vec::new(),
                b"ESDTRoleNFTCreate".to_vec(),
                b"ESDTRoleNFTBurn".to_vec(),
            ],
            b"",
        );
        set_role.address = Some(user);
        let outcome = parse_outcome(&tx(vec![set_role], Vec::new()), OutcomeShape::SetSpecialRole);
        assert_eq!(
            outcome.details,
            OutcomeDetails::SetSpecialRole(vec![RoleAssignment {
                user: Some(user),
                token_identifier: "TTTTT-adfc1e".into(),
                roles: vec!["ESDTRoleNFTCreate".into(), "ESDTRoleNFTBurn".into()],
            }])
        );
    }

    #[test]
    fn test_deploy() {
        let contract = Address::from_bytes([0u8; 32]);
        let owner = Address::from_bytes([3u8; 32]);
        let network_tx = tx(
            vec![event(
                DEPLOY_EVENT,
                vec![contract.as_bytes().to_vec(), owner.as_bytes().to_vec(), vec![0xaa; 32]],
                b"",
            )],
            vec![SmartContractResult {
                data: b"@6f6b".to_vec(),
                events: Vec::new(),
            }],
        );
        let outcome = parse_outcome(&network_tx, OutcomeShape::Deploy);
        match outcome.details {
            OutcomeDetails::Deploy { result, contracts } => {
                assert_eq!(result.return_code, "ok");
                assert_eq!(contracts[0].owner, owner);
                assert_eq!(contracts[0].code_hash, vec![0xaa; 32]);
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_call_values_from_write_log() {
        let network_tx = tx(vec![event(WRITE_LOG, Vec::new(), b"@6f6b@0a@")], Vec::new());
        let outcome = parse_outcome(&network_tx, OutcomeShape::ContractCall);
        assert_eq!(
            outcome.details,
            OutcomeDetails::ContractCall(ReturnData {
                return_code: "ok".into(),
                return_message: String::new(),
                values: vec![vec![0x0a], Vec::new()],
            })
        );
    }

    #[test]
    fn test_signal_error() {
        let mut network_tx = tx(
            vec![event(
                SIGNAL_ERROR,
                vec![vec![1u8; 32], b"cannot add amount to expired piggy".to_vec()],
                b"@75736572206572726f72",
            )],
            Vec::new(),
        );
        network_tx.status = TransactionStatus::Failed;

        let outcome = parse_outcome(&network_tx, OutcomeShape::ContractCall);
        assert!(!outcome.is_successful());
        assert_eq!(outcome.error.as_deref(), Some("cannot add amount to expired piggy"));
        match outcome.details {
            OutcomeDetails::ContractCall(result) => assert_eq!(result.return_code, "user error"),
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_malformed_event_is_skipped_and_reported() {
        let network_tx = tx(
            vec![
                event(NFT_CREATE_EVENT, vec![b"TTTTT-adfc1e".to_vec()], b""),
                event(NFT_CREATE_EVENT, vec![b"TTTTT-adfc1e".to_vec(), vec![0x02]], b""),
            ],
            Vec::new(),
        );
        let outcome = parse_outcome(&network_tx, OutcomeShape::NftCreate);
        assert_eq!(
            outcome.details,
            OutcomeDetails::NftCreate(vec![CreatedNft {
                token_identifier: "TTTTT-adfc1e".into(),
                nonce: 2,
                initial_quantity: BigUint::from(1u8),
            }])
        );
        let error = outcome.error.unwrap();
        assert!(error.contains("has no topic 1"), "{}", error);
    }

    #[test]
    fn test_issue_event_without_topics() {
        let network_tx = tx(vec![event("issueNonFungible", Vec::new(), b"")], Vec::new());
        let outcome = parse_outcome(&network_tx, OutcomeShape::Issue);
        assert_eq!(outcome.details, OutcomeDetails::Issue(Vec::new()));
        assert!(outcome.error.is_some());
        assert!(!outcome.is_successful());
    }

    #[test]
    fn test_malformed_return_data_keeps_signal_error() {
        let mut network_tx = tx(
            vec![event(SIGNAL_ERROR, vec![Vec::new(), b"out of funds".to_vec()], b"@zz")],
            Vec::new(),
        );
        network_tx.status = TransactionStatus::Failed;
        let outcome = parse_outcome(&network_tx, OutcomeShape::ContractCall);
        assert_eq!(outcome.error.as_deref(), Some("out of funds"));
        assert_eq!(outcome.details, OutcomeDetails::ContractCall(ReturnData::default()));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let network_tx = tx(
            vec![event("issueNonFungible", vec![b"TTTTT-adfc1e".to_vec()], b"")],
            Vec::new(),
        );
        let first = parse_outcome(&network_tx, OutcomeShape::Issue);
        let second = parse_outcome(&network_tx, OutcomeShape::Issue);
        assert_eq!(first, second);
    }
}
