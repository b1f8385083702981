//! End-to-end pipeline runs against an in-memory network.

use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;

use mvx_pipeline::blockchain::wallet::verify_signature;
use mvx_pipeline::blockchain::{
    Address, BlockchainError, ChainId, NetworkProvider, QueryResponse, TokenIdentifier,
    TokenTransfer, TransactionEvent, TransactionSigner, TransactionStatus, TransactionWatcher, TxHash,
};
use mvx_pipeline::config::GasConfig;
use mvx_pipeline::factory::token_management::nft_create_gas_limit;
use mvx_pipeline::factory::{
    ArgValue, CallRequest, CodeMetadata, DeployRequest, IssueKind, IssueRequest, NftCreateRequest,
    OperationDescriptor, QueryRequest, TokenProperties, TransactionBuilder,
};
use mvx_pipeline::outcome::{OutcomeDetails, ParsedOutcome, TypedValue, ValueType};
use mvx_pipeline::{Pipeline, RunReport, Shutdown};

mod common;

use common::FakeNetwork;

fn pipeline(network: Arc<FakeNetwork>, signer: Arc<dyn TransactionSigner>, timeout_ms: u64) -> Pipeline {
    let builder = TransactionBuilder::new(GasConfig::default(), ChainId::from("D")).unwrap();
    let watcher = TransactionWatcher::with_durations(
        network.clone() as Arc<dyn NetworkProvider>,
        Duration::from_millis(5),
        Duration::from_millis(timeout_ms),
    );
    Pipeline::from_parts(
        network,
        signer,
        builder,
        watcher,
        "https://devnet-explorer.multiversx.com/",
    )
}

fn receiver() -> Address {
    Address::from_bech32("erd176ddeqqde20rhgej35taa5jl828n9z4pur52x3lnfnj75w4v2qyqa230vx").unwrap()
}

fn id(s: &str) -> TokenIdentifier {
    TokenIdentifier::new(s).unwrap()
}

fn demo_transfer() -> OperationDescriptor {
    OperationDescriptor::NativeTransfer {
        receiver: receiver(),
        amount: BigUint::from(1_000_000_000_000_000u64),
        data: b"This is the demo transaction!".to_vec(),
    }
}

fn issue_collection() -> OperationDescriptor {
    OperationDescriptor::Issue(IssueRequest {
        kind: IssueKind::NonFungible,
        name: "NFTCollection".into(),
        ticker: "TTTTT".into(),
        properties: TokenProperties::all(),
    })
}

#[tokio::test]
async fn test_signature_round_trip_and_nonces() {
    let network = FakeNetwork::new(5);
    let wallet = Arc::new(common::random_wallet());
    let sender = wallet.address();
    let pipeline = pipeline(network.clone(), wallet, 100);

    let first = pipeline.run(&demo_transfer()).await.unwrap();
    let second = pipeline.run(&demo_transfer()).await.unwrap();
    assert!(matches!(first, RunReport::Submitted { .. }));
    match second {
        RunReport::Submitted { explorer_url, hash } => {
            assert_eq!(
                explorer_url,
                format!("https://devnet-explorer.multiversx.com/transactions/{}", hash)
            );
        }
        other => panic!("expected submission, got {:?}", other),
    }

    let sent = network.sent();
    let nonces: Vec<u64> = sent.iter().map(|tx| tx.transaction().nonce).collect();
    assert_eq!(nonces, vec![5, 6]);
    assert_eq!(*network.account_fetches.lock().unwrap(), 1);

    for signed in &sent {
        let payload = signed.transaction().bytes_for_signing().unwrap();
        assert_eq!(signed.transaction().sender, sender);
        assert!(verify_signature(&sender, &payload, signed.signature()));
    }

    // A different key must not verify.
    let other = common::random_wallet();
    let payload = sent[0].transaction().bytes_for_signing().unwrap();
    assert!(!verify_signature(&other.address(), &payload, sent[0].signature()));
}

#[tokio::test]
async fn test_multi_transfer_payload() {
    let network = FakeNetwork::new(0);
    let wallet = Arc::new(common::random_wallet());
    let sender = wallet.address();
    let pipeline = pipeline(network.clone(), wallet, 100);

    let operation = OperationDescriptor::TokenTransfer {
        receiver: receiver(),
        transfers: vec![
            TokenTransfer::non_fungible(id("ELVNFACE-762e9d"), 90),
            TokenTransfer::semi_fungible(id("DEMSFT-00eac9"), 1, BigUint::from(10u8)),
            TokenTransfer::fungible(id("DEMFUNGI-3ec13b"), BigUint::from(10u64.pow(19))),
        ],
    };
    pipeline.run(&operation).await.unwrap();

    let sent = network.sent();
    let tx = sent[0].transaction();
    let expected = format!(
        "MultiESDTNFTTransfer@{}@03@{}@5a@01@{}@01@0a@{}@00@8ac7230489e80000",
        receiver().to_hex(),
        hex::encode("ELVNFACE-762e9d"),
        hex::encode("DEMSFT-00eac9"),
        hex::encode("DEMFUNGI-3ec13b"),
    );
    assert_eq!(String::from_utf8(tx.data.clone()).unwrap(), expected);
    assert_eq!(tx.receiver, sender);
    assert_eq!(tx.value, BigUint::ZERO);
    assert_eq!(
        tx.gas_limit,
        50_000 + 1_500 * expected.len() as u64 + 200_000 * 3 + 800_000
    );
}

#[tokio::test]
async fn test_issue_completes_with_token_identifier() {
    let network = FakeNetwork::new(0);
    *network.executed.lock().unwrap() = Some(common::executed(
        TransactionStatus::Success,
        vec![TransactionEvent {
            address: None,
            identifier: "issueNonFungible".into(),
            topics: vec![b"TTTTT-adfc1e".to_vec(), b"NFTCollection".to_vec()],
            data: Vec::new(),
        }],
    ));
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 1_000);

    match pipeline.run(&issue_collection()).await.unwrap() {
        RunReport::Completed { outcome, .. } => {
            assert!(outcome.is_successful());
            match outcome.details {
                OutcomeDetails::Issue(tokens) => assert_eq!(tokens[0].token_identifier, "TTTTT-adfc1e"),
                other => panic!("unexpected details {:?}", other),
            }
        }
        other => panic!("expected completion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_never_executed_times_out() {
    let network = FakeNetwork::new(0);
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 50);

    let report = pipeline.run(&issue_collection()).await.unwrap();
    match report {
        RunReport::TimedOut { last_error, .. } => {
            assert_eq!(network.sent().len(), 1);
            assert!(last_error.is_none());
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejection_resyncs_account() {
    let network = FakeNetwork::new(9);
    *network.reject_with.lock().unwrap() = Some("insufficient funds".into());
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 100);

    let err = pipeline.run(&demo_transfer()).await.unwrap_err();
    assert!(matches!(err, BlockchainError::Rejected(ref m) if m == "insufficient funds"));

    *network.reject_with.lock().unwrap() = None;
    pipeline.run(&demo_transfer()).await.unwrap();
    assert_eq!(*network.account_fetches.lock().unwrap(), 2);
    assert_eq!(network.sent()[0].transaction().nonce, 9);
}

#[tokio::test]
async fn test_construction_error_has_no_side_effects() {
    let network = FakeNetwork::new(0);
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 100);

    let operation = OperationDescriptor::TokenTransfer {
        receiver: receiver(),
        transfers: Vec::new(),
    };
    let err = pipeline.run(&operation).await.unwrap_err();
    assert!(matches!(err, BlockchainError::Construction(_)));
    assert!(network.sent().is_empty());
    assert_eq!(*network.account_fetches.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_interrupt_before_broadcast() {
    let network = FakeNetwork::new(0);
    let shutdown = Shutdown::new();
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 100)
        .with_shutdown(shutdown.clone());

    shutdown.trigger();
    let err = pipeline.run(&demo_transfer()).await.unwrap_err();
    assert!(matches!(err, BlockchainError::Interrupted));
    assert!(network.sent().is_empty());
}

#[tokio::test]
async fn test_query_skips_signing() {
    let network = FakeNetwork::new(0);
    *network.query_response.lock().unwrap() = Some(QueryResponse {
        return_code: "ok".into(),
        return_message: String::new(),
        return_data: vec![vec![0x03, 0x8d, 0x7e, 0xa4, 0xc6, 0x80, 0x00]],
    });
    let wallet = Arc::new(common::random_wallet());
    let sender = wallet.address();
    let pipeline = pipeline(network.clone(), wallet, 100);

    let operation = OperationDescriptor::Query(QueryRequest {
        contract: Address::from_bech32("erd1qqqqqqqqqqqqqpgqtrajzw4vq0zxccdt9u66cvgg6vz8c6cwnegqkfqkpq").unwrap(),
        function: "getLockedAmount".into(),
        arguments: vec![ArgValue::Address(sender)],
        caller: None,
        value: None,
        returns: vec![ValueType::BigUint],
    });

    match pipeline.run(&operation).await.unwrap() {
        RunReport::Queried { values, .. } => {
            assert_eq!(values, vec![TypedValue::BigUint(BigUint::from(10u64.pow(15)))]);
        }
        other => panic!("expected query result, got {:?}", other),
    }
    assert!(network.sent().is_empty());
    assert_eq!(*network.account_fetches.lock().unwrap(), 0);
    assert_eq!(network.queries.lock().unwrap()[0].arguments[0], sender.as_bytes().to_vec());
}

#[test]
fn test_nft_gas_example() {
    assert_eq!(nft_create_gas_limit(120, 68, 0), 3_580_000);
}

fn piggy_bank() -> Address {
    Address::from_bech32("erd1qqqqqqqqqqqqqpgqtrajzw4vq0zxccdt9u66cvgg6vz8c6cwnegqkfqkpq").unwrap()
}

fn event(identifier: &str, topics: Vec<Vec<u8>>) -> TransactionEvent {
    TransactionEvent {
        address: None,
        identifier: identifier.into(),
        topics,
        data: Vec::new(),
    }
}

fn completed(report: RunReport) -> ParsedOutcome {
    match report {
        RunReport::Completed { outcome, .. } => outcome,
        other => panic!("expected completion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_event_still_completes() {
    let network = FakeNetwork::new(0);
    *network.executed.lock().unwrap() = Some(common::executed(
        TransactionStatus::Success,
        vec![event("issueNonFungible", Vec::new())],
    ));
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 1_000);

    let report = pipeline.run(&issue_collection()).await.unwrap();
    let hash = report.hash().cloned().unwrap();
    assert_eq!(hash, TxHash(format!("{:064x}", 1)));
    assert!(report.explorer_url().unwrap().ends_with(hash.as_str()));

    let outcome = completed(report);
    assert_eq!(outcome.details, OutcomeDetails::Issue(Vec::new()));
    assert!(outcome.error.unwrap().contains("no topic 0"));
}

#[tokio::test]
async fn test_interrupt_while_watching_keeps_hash() {
    let network = FakeNetwork::new(0);
    let shutdown = Shutdown::new();
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 10_000)
        .with_shutdown(shutdown.clone());

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    match pipeline.run(&issue_collection()).await.unwrap() {
        RunReport::Submitted { hash, explorer_url } => {
            assert_eq!(network.sent().len(), 1);
            assert!(explorer_url.ends_with(hash.as_str()));
        }
        other => panic!("expected submission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_call_reports_error() {
    let network = FakeNetwork::new(0);
    *network.executed.lock().unwrap() = Some(common::executed(
        TransactionStatus::Failed,
        vec![TransactionEvent {
            address: Some(piggy_bank()),
            identifier: "signalError".into(),
            topics: vec![vec![1u8; 32], b"piggy bank is locked".to_vec()],
            data: b"@75736572206572726f72".to_vec(),
        }],
    ));
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 1_000);

    let operation = OperationDescriptor::Call(CallRequest {
        contract: piggy_bank(),
        function: "addAmount".into(),
        arguments: Vec::new(),
        amount: BigUint::from(10u64.pow(15)),
        gas_limit: 5_000_000,
    });
    let outcome = completed(pipeline.run(&operation).await.unwrap());
    assert!(!outcome.is_successful());
    assert_eq!(outcome.status, TransactionStatus::Failed);
    assert_eq!(outcome.error.as_deref(), Some("piggy bank is locked"));
    match outcome.details {
        OutcomeDetails::ContractCall(result) => assert_eq!(result.return_code, "user error"),
        other => panic!("unexpected details {:?}", other),
    }
}

#[tokio::test]
async fn test_call_returns_values() {
    let network = FakeNetwork::new(0);
    *network.executed.lock().unwrap() = Some(common::executed_with_results(
        TransactionStatus::Success,
        Vec::new(),
        vec!["@6f6b@038d7ea4c68000"],
    ));
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 1_000);

    let operation = OperationDescriptor::Call(CallRequest {
        contract: piggy_bank(),
        function: "createPiggy".into(),
        arguments: vec![ArgValue::U64(1_750_686_756)],
        amount: BigUint::ZERO,
        gas_limit: 5_000_000,
    });
    let outcome = completed(pipeline.run(&operation).await.unwrap());
    assert!(outcome.is_successful());
    match outcome.details {
        OutcomeDetails::ContractCall(result) => {
            assert_eq!(result.return_code, "ok");
            assert_eq!(
                BigUint::from_bytes_be(&result.values[0]),
                BigUint::from(10u64.pow(15))
            );
        }
        other => panic!("unexpected details {:?}", other),
    }
    let tx = network.sent()[0].transaction().clone();
    assert_eq!(tx.receiver, piggy_bank());
    assert_eq!(String::from_utf8(tx.data).unwrap(), "createPiggy@68595c24");
}

#[tokio::test]
async fn test_nft_create_reports_nonce() {
    let network = FakeNetwork::new(0);
    *network.executed.lock().unwrap() = Some(common::executed(
        TransactionStatus::Success,
        vec![event(
            "ESDTNFTCreate",
            vec![b"TTTTT-adfc1e".to_vec(), vec![0x01, 0x0b], vec![0x01]],
        )],
    ));
    let wallet = Arc::new(common::random_wallet());
    let sender = wallet.address();
    let pipeline = pipeline(network.clone(), wallet, 1_000);

    let operation = OperationDescriptor::NftCreate(NftCreateRequest {
        token: id("TTTTT-adfc1e"),
        initial_quantity: BigUint::from(1u8),
        name: "Test NFT".into(),
        royalties: 500,
        hash: Vec::new(),
        attributes: b"metadata:test".to_vec(),
        uris: vec!["https://example.org/nft.png".into()],
    });
    let outcome = completed(pipeline.run(&operation).await.unwrap());
    match outcome.details {
        OutcomeDetails::NftCreate(created) => {
            assert_eq!(created[0].token_identifier, "TTTTT-adfc1e");
            assert_eq!(created[0].nonce, 267);
            assert_eq!(created[0].initial_quantity, BigUint::from(1u8));
        }
        other => panic!("unexpected details {:?}", other),
    }

    let tx = network.sent()[0].transaction().clone();
    assert_eq!(tx.receiver, sender);
    assert_eq!(tx.gas_limit, nft_create_gas_limit(tx.data.len(), 13, 0));
}

#[tokio::test]
async fn test_deploy_reports_contract_address() {
    let network = FakeNetwork::new(0);
    let wallet = Arc::new(common::random_wallet());
    let sender = wallet.address();
    *network.executed.lock().unwrap() = Some(common::executed_with_results(
        TransactionStatus::Success,
        vec![event(
            "SCDeploy",
            vec![
                piggy_bank().as_bytes().to_vec(),
                sender.as_bytes().to_vec(),
                vec![0xab; 32],
            ],
        )],
        vec!["@6f6b"],
    ));
    let pipeline = pipeline(network.clone(), wallet, 1_000);

    let operation = OperationDescriptor::Deploy(DeployRequest {
        bytecode: vec![0x00, 0x61, 0x73, 0x6d],
        metadata: CodeMetadata {
            upgradeable: true,
            readable: true,
            payable: false,
            payable_by_contract: false,
        },
        arguments: Vec::new(),
        amount: BigUint::ZERO,
        gas_limit: 60_000_000,
    });
    let outcome = completed(pipeline.run(&operation).await.unwrap());
    match outcome.details {
        OutcomeDetails::Deploy { result, contracts } => {
            assert_eq!(result.return_code, "ok");
            assert_eq!(contracts[0].address, piggy_bank());
            assert_eq!(contracts[0].owner, sender);
        }
        other => panic!("unexpected details {:?}", other),
    }
    assert_eq!(network.sent()[0].transaction().receiver, Address::zero());
}

#[tokio::test]
async fn test_unreadable_broadcast_reply_resyncs_account() {
    let network = FakeNetwork::new(4);
    *network.garble_broadcast_reply.lock().unwrap() = true;
    let pipeline = pipeline(network.clone(), Arc::new(common::random_wallet()), 100);

    let err = pipeline.run(&demo_transfer()).await.unwrap_err();
    assert!(matches!(err, BlockchainError::BroadcastUnconfirmed(_)));

    *network.garble_broadcast_reply.lock().unwrap() = false;
    pipeline.run(&demo_transfer()).await.unwrap();
    assert_eq!(*network.account_fetches.lock().unwrap(), 2);
}
