use crate::NetworkDatastore;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::Model;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteSignal {
    Valid,
    Funding,
    Delete,
}

impl VoteSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteSignal::Valid => "valid",
            VoteSignal::Funding => "funding",
            VoteSignal::Delete => "delete",
        }
    }
}

impl fmt::Display for VoteSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    Yes,
    No,
    Abstain,
}

impl VoteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOutcome::Yes => "yes",
            VoteOutcome::No => "no",
            VoteOutcome::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vote this node has broadcast. One per (object, signal); never updated
/// or removed once written.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Vote {
    pub object_hash: String,
    pub signal: VoteSignal,
    pub outcome: VoteOutcome,
    pub voted_at: i64,
}

impl Model for Vote {
    const ID_PATH: &'static str = "/votes/object/${object_hash}/signal/${signal}";
    const FIELDS: &'static [&'static str] = &["object_hash", "signal", "outcome", "voted_at"];
    const FIELD_DEFAULTS: &'static [(&'static str, serde_json::Value)] = &[];

    fn get_id_keys(&self) -> HashMap<String, String> {
        Self::keys_for(&self.object_hash, self.signal)
    }
}

impl Vote {
    fn keys_for(object_hash: &str, signal: VoteSignal) -> HashMap<String, String> {
        let mut keys = HashMap::new();
        keys.insert("object_hash".to_string(), object_hash.to_string());
        keys.insert("signal".to_string(), signal.as_str().to_string());
        keys
    }

    pub async fn find_for(
        datastore: &NetworkDatastore,
        object_hash: &str,
        signal: VoteSignal,
    ) -> Result<Option<Self>> {
        Self::find_one(datastore, Self::keys_for(object_hash, signal)).await
    }

    pub async fn exists(datastore: &NetworkDatastore, object_hash: &str, signal: VoteSignal) -> Result<bool> {
        Ok(Self::find_for(datastore, object_hash, signal).await?.is_some())
    }

    pub async fn find_all_for_object(datastore: &NetworkDatastore, object_hash: &str) -> Result<Vec<Self>> {
        let mut votes = Vec::new();
        for signal in [VoteSignal::Valid, VoteSignal::Funding, VoteSignal::Delete] {
            if let Some(vote) = Self::find_for(datastore, object_hash, signal).await? {
                votes.push(vote);
            }
        }
        Ok(votes)
    }

    /// Appends a vote to the ledger. Refuses to overwrite an existing vote for
    /// the same object and signal.
    pub async fn record(
        datastore: &NetworkDatastore,
        object_hash: &str,
        signal: VoteSignal,
        outcome: VoteOutcome,
    ) -> Result<Self> {
        if Self::exists(datastore, object_hash, signal).await? {
            return Err(anyhow!("already voted {} on {}", signal, object_hash));
        }
        let vote = Vote {
            object_hash: object_hash.to_string(),
            signal,
            outcome,
            voted_at: chrono::Utc::now().timestamp(),
        };
        vote.save(datastore).await?;
        Ok(vote)
    }
}
