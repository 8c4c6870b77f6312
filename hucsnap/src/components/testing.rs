//! In-memory wallets and a stub JSON-RPC node for testing the claim process.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use super::{
    claim::ClaimError,
    wallet::{OwnershipOracle, WalletInfo, WalletMutator, WalletRole},
};

/// A legacy wallet owning a fixed set of addresses.
#[derive(Debug, Default)]
pub(crate) struct MockLegacyWallet {
    keys: HashMap<String, String>,
    unlocked_until: Option<u64>,
    failing_address: Option<String>,
    is_mine_calls: Mutex<usize>,
    dumped: Mutex<Vec<String>>,
}

impl MockLegacyWallet {
    pub(crate) fn with_key(mut self, address: &str, wif: &str) -> Self {
        self.keys.insert(address.into(), wif.into());
        self
    }

    pub(crate) fn with_unlocked_until(mut self, unlocked_until: Option<u64>) -> Self {
        self.unlocked_until = unlocked_until;
        self
    }

    /// Makes any request about `address` fail like a dropped connection would.
    pub(crate) fn failing_on(mut self, address: &str) -> Self {
        self.failing_address = Some(address.into());
        self
    }

    pub(crate) fn is_mine_calls(&self) -> usize {
        *self.is_mine_calls.lock().unwrap()
    }

    pub(crate) fn dumped(&self) -> Vec<String> {
        self.dumped.lock().unwrap().clone()
    }

    fn check_transport(&self, address: &str) -> Result<(), ClaimError> {
        if self.failing_address.as_deref() == Some(address) {
            Err(ClaimError::Transport {
                wallet: WalletRole::Legacy,
                err: "connection reset by peer".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl OwnershipOracle for MockLegacyWallet {
    async fn wallet_info(&self) -> Result<WalletInfo, ClaimError> {
        Ok(WalletInfo {
            unlocked_until: self.unlocked_until,
        })
    }

    async fn is_mine(&self, address: &str) -> Result<bool, ClaimError> {
        *self.is_mine_calls.lock().unwrap() += 1;
        self.check_transport(address)?;
        Ok(self.keys.contains_key(address))
    }

    async fn dump_priv_key(&self, address: &str) -> Result<SecretString, ClaimError> {
        self.check_transport(address)?;
        let key = self
            .keys
            .get(address)
            .ok_or_else(|| ClaimError::Transport {
                wallet: WalletRole::Legacy,
                err: format!("Private key for address {address} is not known"),
            })?;
        self.dumped.lock().unwrap().push(address.into());
        Ok(SecretString::new(key.clone()))
    }
}

/// A successor wallet that records imported keys.
#[derive(Debug, Default)]
pub(crate) struct MockSuccessorWallet {
    unlocked_until: Option<u64>,
    keys: Mutex<BTreeSet<String>>,
    imports: Mutex<Vec<(String, String, bool)>>,
}

impl MockSuccessorWallet {
    pub(crate) fn with_unlocked_until(mut self, unlocked_until: Option<u64>) -> Self {
        self.unlocked_until = unlocked_until;
        self
    }

    /// The distinct keys held by the wallet.
    pub(crate) fn keys(&self) -> BTreeSet<String> {
        self.keys.lock().unwrap().clone()
    }

    /// Every `importprivkey` call as `(key, label, rescan)`.
    pub(crate) fn imports(&self) -> Vec<(String, String, bool)> {
        self.imports.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletMutator for MockSuccessorWallet {
    async fn wallet_info(&self) -> Result<WalletInfo, ClaimError> {
        Ok(WalletInfo {
            unlocked_until: self.unlocked_until,
        })
    }

    async fn import_priv_key(
        &self,
        key: &SecretString,
        label: &str,
        rescan: bool,
    ) -> Result<(), ClaimError> {
        let key = key.expose_secret().clone();
        self.keys.lock().unwrap().insert(key.clone());
        self.imports
            .lock()
            .unwrap()
            .push((key, label.into(), rescan));
        Ok(())
    }
}

/// A canned reply of a [`StubNode`]. The request's `id` is filled in when sending it.
#[derive(Clone, Debug)]
pub(crate) enum StubReply {
    /// A successful reply in bitcoind's JSON-RPC 1.0 dialect.
    Bitcoind(Value),
    /// A successful strict JSON-RPC 2.0 reply.
    TwoPointZero(Value),
    /// An RPC error as bitcoind sends it: with HTTP status 500 and a `null` result.
    BitcoindError { code: i64, message: &'static str },
}

impl StubReply {
    fn render(&self, id: Value) -> (&'static str, String) {
        match self {
            StubReply::Bitcoind(result) => (
                "200 OK",
                json!({"result": result, "error": null, "id": id}).to_string(),
            ),
            StubReply::TwoPointZero(result) => (
                "200 OK",
                json!({"jsonrpc": "2.0", "result": result, "id": id}).to_string(),
            ),
            StubReply::BitcoindError { code, message } => (
                "500 Internal Server Error",
                json!({
                    "result": null,
                    "error": {"code": code, "message": message},
                    "id": id,
                })
                .to_string(),
            ),
        }
    }
}

/// A request received by a [`StubNode`].
#[derive(Clone, Debug)]
pub(crate) struct StubRequest {
    pub(crate) authorization: Option<String>,
    pub(crate) method: String,
    pub(crate) params: Value,
}

/// A local HTTP server answering JSON-RPC requests from a fixed queue of replies.
pub(crate) struct StubNode {
    endpoint: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubNode {
    /// Starts serving `replies`, one per connection, in order.
    pub(crate) async fn start(replies: impl IntoIterator<Item = StubReply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://huc:pw@{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(vec![]));

        let mut replies = replies.into_iter().collect::<VecDeque<_>>();
        let received = requests.clone();
        tokio::spawn(async move {
            while let Some(reply) = replies.pop_front() {
                let (mut stream, _) = listener.accept().await.unwrap();
                let (request, id) = read_request(&mut stream).await;
                received.lock().unwrap().push(request);

                let (status, body) = reply.render(id);
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len(),
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
        });

        Self { endpoint, requests }
    }

    /// The endpoint URL, including the credentials `huc:pw`.
    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> (StubRequest, Value) {
    let mut buf = vec![];
    let mut chunk = [0; 4096];
    let head_len = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-request");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_len]).into_owned();
    let header = |name: &str| {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_owned())
        })
    };
    let body_len = header("content-length").map_or(0, |len| len.parse::<usize>().unwrap());

    while buf.len() < head_len + body_len {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-request");
        buf.extend_from_slice(&chunk[..n]);
    }

    let body: Value = serde_json::from_slice(&buf[head_len..head_len + body_len]).unwrap();
    let request = StubRequest {
        authorization: header("authorization"),
        method: body["method"].as_str().unwrap().to_owned(),
        params: body["params"].clone(),
    };
    (request, body["id"].clone())
}
