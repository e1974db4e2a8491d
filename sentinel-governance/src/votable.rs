use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use sentinel_dashd::{Daemon, DaemonError};
use sentinel_datastore::models::{Proposal, Superblock, Vote, VoteOutcome, VoteSignal};
use sentinel_datastore::NetworkDatastore;
use sentinel_utils::hashing::is_hash;
use sentinel_utils::Network;

/// A governance object this node can vote on.
#[async_trait]
pub trait Votable: Send + Sync {
    fn object_hash(&self) -> &str;
    fn kind(&self) -> &'static str;
    fn is_valid(&self, network: Network) -> bool;

    async fn voted_on(&self, datastore: &NetworkDatastore, signal: VoteSignal) -> Result<bool> {
        Vote::exists(datastore, self.object_hash(), signal).await
    }

    /// Casts a vote unless one already exists for this signal. Returns whether
    /// a vote was broadcast and recorded. A vote rejected by dashd is logged
    /// and leaves no record; only an unreachable daemon is an error.
    async fn vote(
        &self,
        datastore: &NetworkDatastore,
        daemon: &dyn Daemon,
        signal: VoteSignal,
        outcome: VoteOutcome,
    ) -> Result<bool> {
        let object_hash = self.object_hash();
        if !is_hash(object_hash) {
            log::debug!("no governance object hash, nothing to vote on");
            return Ok(false);
        }
        if self.voted_on(datastore, signal).await? {
            log::debug!("already voted {} on {} {}", signal, self.kind(), object_hash);
            return Ok(false);
        }

        let params = [
            json!("vote-conf"),
            json!(object_hash),
            json!(signal.as_str()),
            json!(outcome.as_str()),
        ];
        let output = match daemon.rpc_command("gobject", &params).await {
            Ok(output) => output,
            Err(DaemonError::Connectivity(e)) => return Err(DaemonError::Connectivity(e).into()),
            Err(e) => {
                log::warn!("vote {}={} on {} failed: {}", signal, outcome, object_hash, e);
                return Ok(false);
            }
        };
        if !did_we_vote(&output) {
            log::warn!("dashd rejected vote {}={} on {}: {}", signal, outcome, object_hash, output);
            return Ok(false);
        }

        Vote::record(datastore, object_hash, signal, outcome).await?;
        log::info!("voted {}={} on {} {}", signal, outcome, self.kind(), object_hash);
        Ok(true)
    }

    /// Casts the validity vote if none exists yet.
    async fn vote_validity(&self, datastore: &NetworkDatastore, daemon: &dyn Daemon) -> Result<Option<VoteOutcome>> {
        if self.voted_on(datastore, VoteSignal::Valid).await? {
            return Ok(None);
        }
        let outcome = if self.is_valid(daemon.network()) {
            VoteOutcome::Yes
        } else {
            VoteOutcome::No
        };
        if self.vote(datastore, daemon, VoteSignal::Valid, outcome).await? {
            Ok(Some(outcome))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl Votable for Proposal {
    fn object_hash(&self) -> &str {
        &self.object_hash
    }

    fn kind(&self) -> &'static str {
        "proposal"
    }

    fn is_valid(&self, network: Network) -> bool {
        Proposal::is_valid(self, network)
    }
}

#[async_trait]
impl Votable for Superblock {
    fn object_hash(&self) -> &str {
        &self.object_hash
    }

    fn kind(&self) -> &'static str {
        "superblock"
    }

    fn is_valid(&self, network: Network) -> bool {
        Superblock::is_valid(self, network)
    }
}

/// Reads the reply to `gobject vote-conf`; any detail entry reporting
/// `"result": "success"` means the vote went out.
pub fn did_we_vote(output: &Value) -> bool {
    output
        .get("detail")
        .and_then(Value::as_object)
        .map(|detail| {
            detail
                .values()
                .any(|entry| entry.get("result").and_then(Value::as_str) == Some("success"))
        })
        .unwrap_or(false)
}
