use crate::NetworkDatastore;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use sentinel_utils::address::is_valid_address;
use sentinel_utils::amount::{format_amount, parse_amount};
use sentinel_utils::hashing::{is_hash, sha256_hex};
use sentinel_utils::json_stringify_deterministic::stringify_deterministic;
use sentinel_utils::Network;

use crate::models::governance_object::encode_data_hex;
use crate::models::vote::{Vote, VoteOutcome, VoteSignal};
use crate::Model;

/// One payout line of a superblock.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Payment {
    pub address: String,
    pub amount: u64,
    pub proposal_hash: String,
}

/// The payment set of a superblock. Two superblocks with equal payloads have
/// equal `sb_hash` no matter which node broadcast them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SuperblockPayload {
    pub event_block_height: u64,
    pub payment_addresses: String,
    pub payment_amounts: String,
    pub proposal_hashes: String,
}

impl SuperblockPayload {
    /// Lines are ordered by proposal hash descending so every node produces
    /// the same payload from the same selection.
    pub fn from_payments(event_block_height: u64, payments: &[Payment]) -> Self {
        let mut payments = payments.to_vec();
        payments.sort_by(|a, b| b.proposal_hash.cmp(&a.proposal_hash));
        let addresses: Vec<&str> = payments.iter().map(|p| p.address.as_str()).collect();
        let amounts: Vec<String> = payments.iter().map(|p| format_amount(p.amount)).collect();
        let hashes: Vec<&str> = payments.iter().map(|p| p.proposal_hash.as_str()).collect();
        SuperblockPayload {
            event_block_height,
            payment_addresses: addresses.join("|"),
            payment_amounts: amounts.join("|"),
            proposal_hashes: hashes.join("|"),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        let event_block_height = fields
            .get("event_block_height")
            .and_then(Value::as_u64)
            .ok_or_else(|| anyhow!("superblock is missing event_block_height"))?;
        let text = |name: &str| {
            fields
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(SuperblockPayload {
            event_block_height,
            payment_addresses: text("payment_addresses"),
            payment_amounts: text("payment_amounts"),
            proposal_hashes: text("proposal_hashes"),
        })
    }

    pub fn serialise(&self) -> String {
        stringify_deterministic(&serde_json::json!({
            "event_block_height": self.event_block_height,
            "payment_addresses": self.payment_addresses,
            "payment_amounts": self.payment_amounts,
            "proposal_hashes": self.proposal_hashes,
            "type": 2,
        }))
    }

    pub fn sb_hash(&self) -> String {
        sha256_hex(self.serialise().as_bytes())
    }

    pub fn data_hex(&self) -> String {
        encode_data_hex(&self.serialise())
    }

    fn split(list: &str) -> Vec<&str> {
        if list.is_empty() {
            Vec::new()
        } else {
            list.split('|').collect()
        }
    }

    pub fn is_valid(&self, network: Network) -> bool {
        let addresses = Self::split(&self.payment_addresses);
        let amounts = Self::split(&self.payment_amounts);
        let hashes = Self::split(&self.proposal_hashes);
        if addresses.is_empty() || addresses.len() != amounts.len() || addresses.len() != hashes.len() {
            return false;
        }
        if !addresses.iter().all(|a| is_valid_address(a, network)) {
            return false;
        }
        if !amounts.iter().all(|a| matches!(parse_amount(a), Ok(duffs) if duffs > 0)) {
            return false;
        }
        hashes.iter().all(|h| is_hash(h))
    }
}

/// A candidate payment event synced from the network.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Superblock {
    pub object_hash: String,
    #[serde(flatten)]
    pub payload: SuperblockPayload,
    pub sb_hash: String,
}

impl Model for Superblock {
    const ID_PATH: &'static str = "/superblocks/hash/${object_hash}";
    const FIELDS: &'static [&'static str] = &[
        "object_hash",
        "event_block_height",
        "payment_addresses",
        "payment_amounts",
        "proposal_hashes",
        "sb_hash",
    ];
    const FIELD_DEFAULTS: &'static [(&'static str, serde_json::Value)] = &[
        ("proposal_hashes", Value::String(String::new())),
    ];

    fn get_id_keys(&self) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), self.object_hash.clone());
        keys
    }
}

impl Superblock {
    pub fn new(object_hash: &str, payload: SuperblockPayload) -> Self {
        let sb_hash = payload.sb_hash();
        Superblock {
            object_hash: object_hash.to_string(),
            payload,
            sb_hash,
        }
    }

    pub fn from_payload(object_hash: &str, fields: &Map<String, Value>) -> Result<Self> {
        Ok(Self::new(object_hash, SuperblockPayload::from_fields(fields)?))
    }

    pub fn event_block_height(&self) -> u64 {
        self.payload.event_block_height
    }

    pub fn is_valid(&self, network: Network) -> bool {
        self.payload.is_valid(network)
    }

    pub async fn find_by_hash(datastore: &NetworkDatastore, object_hash: &str) -> Result<Option<Self>> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), object_hash.to_string());
        Self::find_one(datastore, keys).await
    }

    pub async fn at_height(datastore: &NetworkDatastore, event_block_height: u64) -> Result<Vec<Self>> {
        Ok(Self::find_all(datastore)
            .await?
            .into_iter()
            .filter(|sb| sb.event_block_height() == event_block_height)
            .collect())
    }

    pub async fn with_sb_hash(datastore: &NetworkDatastore, sb_hash: &str) -> Result<Vec<Self>> {
        Ok(Self::find_all(datastore)
            .await?
            .into_iter()
            .filter(|sb| sb.sb_hash == sb_hash)
            .collect())
    }

    /// Among records sharing `sb_hash`, the one with the highest object hash.
    /// Every node picks the same record from the same set.
    pub async fn find_highest_deterministic(datastore: &NetworkDatastore, sb_hash: &str) -> Result<Option<Self>> {
        Ok(Self::with_sb_hash(datastore, sb_hash)
            .await?
            .into_iter()
            .max_by(|a, b| a.object_hash.cmp(&b.object_hash)))
    }

    /// Whether this node has voted funding=yes on any superblock at the height.
    pub async fn is_voted_funding(datastore: &NetworkDatastore, event_block_height: u64) -> Result<bool> {
        for sb in Self::at_height(datastore, event_block_height).await? {
            if let Some(vote) = Vote::find_for(datastore, &sb.object_hash, VoteSignal::Funding).await? {
                if vote.outcome == VoteOutcome::Yes {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

pub mod prelude {
    pub use super::{Payment, Superblock, SuperblockPayload};
    pub use crate::Model;
    pub use crate::NetworkDatastore;
}
