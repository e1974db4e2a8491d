use crate::NetworkDatastore;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use sentinel_utils::address::is_valid_address;
use sentinel_utils::amount::{amount_from_json, format_amount};
use sentinel_utils::json_stringify_deterministic::stringify_deterministic;
use sentinel_utils::Network;

use crate::models::governance_object::GovernanceObject;
use crate::Model;

/// Dash Core rejects governance payloads larger than this.
pub const MAX_DATA_SIZE: usize = 512;

lazy_static::lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[-_a-zA-Z0-9]+$").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s").unwrap();
}

/// A funding request. Amounts are held in duffs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Proposal {
    pub object_hash: String,
    pub name: String,
    pub url: String,
    pub start_epoch: i64,
    pub end_epoch: i64,
    pub payment_address: String,
    pub payment_amount: u64,
}

impl Model for Proposal {
    const ID_PATH: &'static str = "/proposals/hash/${object_hash}";
    const FIELDS: &'static [&'static str] = &[
        "object_hash",
        "name",
        "url",
        "start_epoch",
        "end_epoch",
        "payment_address",
        "payment_amount",
    ];
    const FIELD_DEFAULTS: &'static [(&'static str, serde_json::Value)] = &[
        ("name", Value::String(String::new())),
        ("url", Value::String(String::new())),
        ("payment_address", Value::String(String::new())),
    ];

    fn get_id_keys(&self) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), self.object_hash.clone());
        keys
    }
}

impl Proposal {
    /// Builds a proposal from the decoded fields of its governance payload.
    pub fn from_payload(object_hash: &str, fields: &Map<String, Value>) -> Result<Self> {
        let text = |name: &str| {
            fields
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let epoch = |name: &str| {
            fields
                .get(name)
                .and_then(Value::as_i64)
                .ok_or_else(|| anyhow!("proposal {} is missing {}", object_hash, name))
        };
        let payment_amount = fields
            .get("payment_amount")
            .ok_or_else(|| anyhow!("proposal {} is missing payment_amount", object_hash))
            .and_then(amount_from_json)
            .with_context(|| format!("proposal {} has an unreadable payment_amount", object_hash))?;

        Ok(Proposal {
            object_hash: object_hash.to_string(),
            name: text("name"),
            url: text("url"),
            start_epoch: epoch("start_epoch")?,
            end_epoch: epoch("end_epoch")?,
            payment_address: text("payment_address"),
            payment_amount,
        })
    }

    pub async fn find_by_hash(datastore: &NetworkDatastore, object_hash: &str) -> Result<Option<Self>> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), object_hash.to_string());
        Self::find_one(datastore, keys).await
    }

    pub fn serialise(&self) -> String {
        stringify_deterministic(&serde_json::json!({
            "end_epoch": self.end_epoch,
            "name": self.name,
            "payment_address": self.payment_address,
            "payment_amount": format_amount(self.payment_amount),
            "start_epoch": self.start_epoch,
            "type": 1,
            "url": self.url,
        }))
    }

    pub fn is_valid(&self, network: Network) -> bool {
        if self.name.trim().is_empty() || !NAME_RE.is_match(&self.name) {
            log::debug!("proposal {} has an invalid name", self.object_hash);
            return false;
        }
        if self.end_epoch <= self.start_epoch {
            log::debug!("proposal {} ends before it starts", self.object_hash);
            return false;
        }
        if self.payment_amount == 0 {
            log::debug!("proposal {} requests nothing", self.object_hash);
            return false;
        }
        if !is_valid_address(&self.payment_address, network) {
            log::debug!("proposal {} has an invalid payment address", self.object_hash);
            return false;
        }
        if self.url.trim().len() < 4 || WHITESPACE_RE.is_match(&self.url) {
            log::debug!("proposal {} has an invalid url", self.object_hash);
            return false;
        }
        if self.serialise().len() > MAX_DATA_SIZE {
            log::debug!("proposal {} exceeds the payload size limit", self.object_hash);
            return false;
        }
        true
    }

    /// Valid proposals with more absolute yes votes than `quorum`, highest
    /// vote count first and object hash descending on ties.
    pub async fn approved_and_ranked(
        datastore: &NetworkDatastore,
        quorum: i64,
        network: Network,
    ) -> Result<Vec<Self>> {
        let mut ranked: Vec<(i64, Proposal)> = Vec::new();
        for proposal in Self::find_all(datastore).await? {
            let Some(gobject) = GovernanceObject::find_by_hash(datastore, &proposal.object_hash).await? else {
                continue;
            };
            if gobject.absolute_yes_count <= quorum || !proposal.is_valid(network) {
                continue;
            }
            ranked.push((gobject.absolute_yes_count, proposal));
        }
        ranked.sort_by(|(a_votes, a), (b_votes, b)| {
            b_votes
                .cmp(a_votes)
                .then_with(|| b.object_hash.cmp(&a.object_hash))
        });
        Ok(ranked.into_iter().map(|(_, proposal)| proposal).collect())
    }
}

pub mod prelude {
    pub use super::Proposal;
    pub use crate::Model;
    pub use crate::NetworkDatastore;
}
