use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::{Mutex, MutexGuard};

use sentinel_dashd::{Daemon, DaemonError};
use sentinel_utils::amount::{format_amount, COIN};
use sentinel_utils::hashing::sha256_hex;
use sentinel_utils::Network;

use crate::fixtures::gobject_item;
use crate::MASTERNODES;

/// A vote that reached the mock through `gobject vote-conf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastVote {
    pub object_hash: String,
    pub signal: String,
    pub outcome: String,
}

/// Everything the mock answers from. Tests adjust it through
/// [`MockDaemon::update`].
#[derive(Debug, Clone)]
pub struct MockState {
    pub reachable: bool,
    pub synced: bool,
    /// Collateral outpoint when running as a masternode.
    pub outpoint: Option<String>,
    pub block_count: u64,
    pub budget: u64,
    pub min_quorum: i64,
    pub refuse_votes: bool,
    pub gobjects: Map<String, Value>,
    pub commands: Vec<String>,
    pub votes: Vec<CastVote>,
    pub submissions: Vec<Value>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            reachable: true,
            synced: true,
            outpoint: None,
            block_count: 100,
            budget: 1_000 * COIN,
            min_quorum: 1,
            refuse_votes: false,
            gobjects: Map::new(),
            commands: Vec::new(),
            votes: Vec::new(),
            submissions: Vec::new(),
        }
    }
}

/// In-process dashd that answers the RPC commands Sentinel issues and
/// remembers every vote and submission.
pub struct MockDaemon {
    network: Network,
    state: Mutex<MockState>,
}

/// Deterministic block hash used by every mock at a given height.
pub fn block_hash_at(height: u64) -> String {
    sha256_hex(format!("devnet block {}", height).as_bytes())
}

impl MockDaemon {
    pub fn new(network: Network, state: MockState) -> Self {
        MockDaemon {
            network,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // a panicking test already failed; keep answering for the rest
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn update<F: FnOnce(&mut MockState)>(&self, f: F) {
        f(&mut self.lock());
    }

    pub fn state(&self) -> MockState {
        self.lock().clone()
    }

    pub fn add_gobject(&self, item: Value) {
        let mut state = self.lock();
        let key = item
            .get("Hash")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("unhashed-{}", state.gobjects.len()));
        state.gobjects.insert(key, item);
    }

    pub fn votes(&self) -> Vec<CastVote> {
        self.lock().votes.clone()
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.lock().submissions.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn clear_history(&self) {
        let mut state = self.lock();
        state.commands.clear();
        state.votes.clear();
        state.submissions.clear();
    }
}

fn command_line(method: &str, params: &[Value]) -> String {
    let mut line = method.to_string();
    for param in params {
        line.push(' ');
        match param {
            Value::String(s) => line.push_str(s),
            other => line.push_str(&other.to_string()),
        }
    }
    line
}

fn rpc_error(code: i64, message: &str) -> DaemonError {
    DaemonError::Rpc {
        code,
        message: message.to_string(),
    }
}

#[async_trait]
impl Daemon for MockDaemon {
    fn network(&self) -> Network {
        self.network
    }

    async fn rpc_command(&self, method: &str, params: &[Value]) -> Result<Value, DaemonError> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(DaemonError::Connectivity("connection refused".to_string()));
        }
        state.commands.push(command_line(method, params));

        let arg = |i: usize| params.get(i).and_then(Value::as_str);
        match (method, arg(0)) {
            ("getblockcount", _) => Ok(json!(state.block_count)),
            ("getblockhash", _) => {
                let height = params
                    .first()
                    .and_then(Value::as_u64)
                    .ok_or_else(|| rpc_error(-1, "getblockhash height"))?;
                Ok(json!(block_hash_at(height)))
            }
            ("getgovernanceinfo", _) => Ok(json!({
                "governanceminquorum": state.min_quorum,
                "superblockcycle": self.network.superblock_cycle(),
            })),
            ("getsuperblockbudget", _) => Ok(json!(format_amount(state.budget))),
            ("mnsync", Some("status")) => Ok(json!({ "IsSynced": state.synced })),
            ("masternode", Some("status")) => match &state.outpoint {
                Some(outpoint) => Ok(json!({ "outpoint": outpoint, "status": "Ready" })),
                None => Err(rpc_error(-32603, "This is not a masternode")),
            },
            ("masternode", Some("count")) => Ok(json!({
                "total": MASTERNODES.len(),
                "enabled": MASTERNODES.len(),
            })),
            ("masternodelist", Some("json")) => Ok(Value::Object(
                MASTERNODES.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            ("gobject", Some("list")) => Ok(Value::Object(state.gobjects.clone())),
            ("gobject", Some("vote-conf")) => {
                if state.refuse_votes || state.outpoint.is_none() {
                    return Ok(json!({
                        "overall": "Voted successfully 0 time(s) and failed 1 time(s).",
                        "detail": { "dash.conf": { "result": "failed", "errorMessage": "Can't find masternode by collateral" } }
                    }));
                }
                let (Some(object_hash), Some(signal), Some(outcome)) = (arg(1), arg(2), arg(3)) else {
                    return Err(rpc_error(-8, "gobject vote-conf <governance-hash> <vote> <outcome>"));
                };
                state.votes.push(CastVote {
                    object_hash: object_hash.to_string(),
                    signal: signal.to_string(),
                    outcome: outcome.to_string(),
                });
                Ok(json!({
                    "overall": "Voted successfully 1 time(s) and failed 0 time(s).",
                    "detail": { "dash.conf": { "result": "success" } }
                }))
            }
            ("gobject", Some("submit")) => {
                let data_hex = arg(4).ok_or_else(|| rpc_error(-8, "gobject submit <parent> <revision> <time> <data-hex>"))?;
                let object_hash = sha256_hex(
                    format!("{}:{}:{}", data_hex, state.outpoint.as_deref().unwrap_or_default(), state.submissions.len())
                        .as_bytes(),
                );
                let created = params.get(3).and_then(Value::as_i64).unwrap_or_default();
                let item = gobject_item(&object_hash, data_hex, 0, created);
                state.submissions.push(item);
                Ok(json!(object_hash))
            }
            _ => Err(rpc_error(-32601, "Method not found")),
        }
    }
}
