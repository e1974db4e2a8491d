use chrono::Utc;
use lazy_static::lazy_static;
use serde_json::{self, Value};
use std::collections::BTreeMap;

use sentinel_dashd::election::elect_mn;
use sentinel_dashd::MasternodeEntry;
use sentinel_datastore::models::Proposal;
use sentinel_utils::address::encode_address;
use sentinel_utils::hashing::double_sha256;
use sentinel_utils::Network;

pub mod fixtures;
pub mod mock_daemon;

pub use mock_daemon::{block_hash_at, CastVote, MockDaemon, MockState};

pub const MASTERNODES_JSON: &str = include_str!("../masternodes.json");

lazy_static! {
    /// Devnet masternode list keyed by collateral outpoint.
    pub static ref MASTERNODES: BTreeMap<String, Value> = {
        serde_json::from_str(MASTERNODES_JSON).expect("Failed to parse static masternodes.json")
    };
}

/// A small testnet of masternodes, each backed by its own [`MockDaemon`].
pub struct Devnet {
    pub network: Network,
}

impl Default for Devnet {
    fn default() -> Self {
        Self::new()
    }
}

impl Devnet {
    pub fn new() -> Self {
        Devnet {
            network: Network::Testnet,
        }
    }

    pub fn outpoints(&self) -> Vec<String> {
        MASTERNODES.keys().cloned().collect()
    }

    pub fn outpoint_of(&self, index: usize) -> Option<String> {
        MASTERNODES.keys().nth(index).cloned()
    }

    pub fn index_of(&self, outpoint: &str) -> Option<usize> {
        MASTERNODES.keys().position(|o| o == outpoint)
    }

    pub fn payee_of(&self, index: usize) -> Option<String> {
        MASTERNODES
            .values()
            .nth(index)
            .and_then(|mn| mn.get("payee"))
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// The outpoint elected to submit when the chain tip is `block_count`.
    pub fn elected_outpoint(&self, block_count: u64) -> Option<String> {
        let entries: Vec<MasternodeEntry> = MASTERNODES
            .iter()
            .map(|(outpoint, mn)| MasternodeEntry {
                outpoint: outpoint.clone(),
                status: mn
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();
        elect_mn(&block_hash_at(block_count), &entries)
    }

    /// Daemon for the masternode at `index`, or a plain node for `None`.
    pub fn daemon(&self, index: Option<usize>) -> MockDaemon {
        let outpoint = index.and_then(|i| self.outpoint_of(i));
        MockDaemon::new(
            self.network,
            MockState {
                outpoint,
                ..Default::default()
            },
        )
    }

    pub fn elected_daemon(&self, block_count: u64) -> MockDaemon {
        let daemon = self.daemon(None);
        let outpoint = self.elected_outpoint(block_count);
        daemon.update(|state| {
            state.block_count = block_count;
            state.outpoint = outpoint;
        });
        daemon
    }

    /// A payout address on this network derived from `seed`.
    pub fn payment_address(&self, seed: &str) -> String {
        let digest = double_sha256(seed.as_bytes());
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(&digest[..20]);
        encode_address(self.network.p2pkh_version(), &hash160)
    }

    /// A valid proposal paying `amount` duffs, currently inside its window.
    pub fn proposal(&self, name: &str, amount: u64) -> Proposal {
        let now = Utc::now().timestamp();
        Proposal {
            object_hash: fixtures::object_hash(name),
            name: name.to_string(),
            url: format!("https://www.dashcentral.org/p/{}", name),
            start_epoch: now - 86_400,
            end_epoch: now + 30 * 86_400,
            payment_address: self.payment_address(name),
            payment_amount: amount,
        }
    }
}

// Public interface
pub fn new() -> Devnet {
    Devnet::new()
}
