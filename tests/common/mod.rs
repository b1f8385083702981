//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use num_bigint::BigUint;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use mvx_pipeline::blockchain::{
    AccountOnNetwork, Address, BlockchainError, BlockchainResult, ContractQuery, NetworkProvider,
    QueryResponse, SignedTransaction, SmartContractResult, TokenHolding, TransactionOnNetwork, TransactionStatus,
    TxHash, Wallet,
};

/// A request as seen by the mock API.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Start a programmable mock API on an ephemeral port.
///
/// The handler returns `(status, body)`; bodies are served as JSON.
pub async fn start_mock_api<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let request = match read_request(&mut socket).await {
                            Some(request) => request,
                            None => return,
                        };
                        let (status, body) = handler(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(MockRequest {
        method,
        path,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}

/// A wallet over a freshly generated key.
pub fn random_wallet() -> Wallet {
    let secret: [u8; 32] = rand::random();
    Wallet::from_secret_key(&secret)
}

/// In-memory network: fixed account state, recorded broadcasts and a
/// scripted status for every broadcast transaction.
pub struct FakeNetwork {
    pub nonce: u64,
    pub executed: Mutex<Option<TransactionOnNetwork>>,
    pub reject_with: Mutex<Option<String>>,
    /// Record the broadcast but fail as if the answer were garbled.
    pub garble_broadcast_reply: Mutex<bool>,
    pub sent: Mutex<Vec<SignedTransaction>>,
    pub queries: Mutex<Vec<ContractQuery>>,
    pub query_response: Mutex<Option<QueryResponse>>,
    pub account_fetches: Mutex<u32>,
}

impl FakeNetwork {
    pub fn new(nonce: u64) -> Arc<Self> {
        Arc::new(Self {
            nonce,
            executed: Mutex::new(None),
            reject_with: Mutex::new(None),
            garble_broadcast_reply: Mutex::new(false),
            sent: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            query_response: Mutex::new(None),
            account_fetches: Mutex::new(0),
        })
    }

    pub fn sent(&self) -> Vec<SignedTransaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkProvider for FakeNetwork {
    async fn get_account(&self, address: &Address) -> BlockchainResult<AccountOnNetwork> {
        *self.account_fetches.lock().unwrap() += 1;
        Ok(AccountOnNetwork {
            address: *address,
            nonce: self.nonce,
            balance: BigUint::from(10u64.pow(18)),
        })
    }

    async fn get_account_tokens(&self, _address: &Address) -> BlockchainResult<Vec<TokenHolding>> {
        Ok(vec![TokenHolding {
            identifier: "DEMFUNGI-3ec13b".into(),
            balance: "1000".into(),
            nonce: None,
        }])
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        if let Some(reason) = self.reject_with.lock().unwrap().clone() {
            return Err(BlockchainError::Rejected(reason));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx.clone());
        if *self.garble_broadcast_reply.lock().unwrap() {
            return Err(BlockchainError::BroadcastUnconfirmed("expected value at line 1 column 1".into()));
        }
        Ok(TxHash(format!("{:064x}", sent.len())))
    }

    async fn get_transaction(&self, hash: &TxHash) -> BlockchainResult<Option<TransactionOnNetwork>> {
        Ok(self.executed.lock().unwrap().clone().map(|mut tx| {
            tx.hash = hash.clone();
            tx
        }))
    }

    async fn query_contract(&self, query: &ContractQuery) -> BlockchainResult<QueryResponse> {
        self.queries.lock().unwrap().push(query.clone());
        self.query_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BlockchainError::Network("no query response scripted".into()))
    }
}

/// An executed transaction whose contract results carry `results` as data.
pub fn executed_with_results(
    status: TransactionStatus,
    events: Vec<mvx_pipeline::blockchain::TransactionEvent>,
    results: Vec<&str>,
) -> TransactionOnNetwork {
    TransactionOnNetwork {
        smart_contract_results: results
            .into_iter()
            .map(|data| SmartContractResult {
                data: data.as_bytes().to_vec(),
                events: Vec::new(),
            })
            .collect(),
        ..executed(status, events)
    }
}

/// An executed transaction with the given status and events.
pub fn executed(status: TransactionStatus, events: Vec<mvx_pipeline::blockchain::TransactionEvent>) -> TransactionOnNetwork {
    TransactionOnNetwork {
        hash: TxHash(String::new()),
        status,
        events,
        smart_contract_results: Vec::new(),
    }
}
