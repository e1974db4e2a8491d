use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use sentinel_dashd::Daemon;
use sentinel_datastore::models::{Proposal, Superblock, SuperblockPayload, VoteOutcome, VoteSignal};
use sentinel_datastore::NetworkDatastore;

use crate::submission::submit_superblock;
use crate::superblock_maker::create_superblock;
use crate::votable::Votable;

/// Where one pass of the engine stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SuperblockDecision {
    NotMasternode,
    /// A funding vote for this height already exists; competitors were voted down.
    AlreadyDecided { event_block_height: u64, rejected: Vec<String> },
    PreMaturity { event_block_height: u64 },
    NoCandidate { event_block_height: u64 },
    MatchFound {
        event_block_height: u64,
        sb_hash: String,
        object_hash: String,
        funded: bool,
        pruned: Vec<String>,
    },
    NotElected { event_block_height: u64, sb_hash: String },
    Submitted {
        event_block_height: u64,
        sb_hash: String,
        object_hash: Option<String>,
    },
}

/// Decides how this masternode votes on the next superblock, or whether it
/// should broadcast one itself.
#[derive(Clone)]
pub struct SuperblockDecisionEngine {
    pub datastore: Arc<NetworkDatastore>,
    pub daemon: Arc<dyn Daemon>,
}

impl SuperblockDecisionEngine {
    pub fn new(datastore: Arc<NetworkDatastore>, daemon: Arc<dyn Daemon>) -> Self {
        Self { datastore, daemon }
    }

    pub async fn attempt_superblock_creation(&self) -> Result<SuperblockDecision> {
        let datastore = self.datastore.as_ref();
        let daemon = self.daemon.as_ref();

        if !daemon.is_masternode().await? {
            log::debug!("we are not a masternode, nothing to decide");
            return Ok(SuperblockDecision::NotMasternode);
        }

        let event_block_height = daemon.next_superblock_height().await?;

        if Superblock::is_voted_funding(datastore, event_block_height).await? {
            let rejected = self.reject_competitors(event_block_height).await?;
            return Ok(SuperblockDecision::AlreadyDecided { event_block_height, rejected });
        }

        if !daemon.is_govobj_maturity_phase(event_block_height).await? {
            log::debug!("not in maturity phase for superblock {}", event_block_height);
            return Ok(SuperblockDecision::PreMaturity { event_block_height });
        }

        let Some(candidate) = self.build_candidate(event_block_height).await? else {
            log::debug!("no superblock created for height {}", event_block_height);
            return Ok(SuperblockDecision::NoCandidate { event_block_height });
        };
        let sb_hash = candidate.sb_hash();
        log::debug!("expecting superblock {} at height {}", sb_hash, event_block_height);

        if let Some(canonical) = Superblock::find_highest_deterministic(datastore, &sb_hash).await? {
            let funded = canonical
                .vote(datastore, daemon, VoteSignal::Funding, VoteOutcome::Yes)
                .await?;
            let pruned = self.prune_duplicates(&canonical).await?;
            return Ok(SuperblockDecision::MatchFound {
                event_block_height,
                sb_hash,
                object_hash: canonical.object_hash,
                funded,
                pruned,
            });
        }
        log::debug!("superblock {} not yet on the network", sb_hash);

        if !daemon.we_are_the_winner().await? {
            log::debug!("not elected to submit superblock {}", event_block_height);
            return Ok(SuperblockDecision::NotElected { event_block_height, sb_hash });
        }

        log::info!("elected to submit superblock {}", event_block_height);
        let object_hash = submit_superblock(daemon, &candidate).await?;
        Ok(SuperblockDecision::Submitted {
            event_block_height,
            sb_hash,
            object_hash,
        })
    }

    async fn build_candidate(&self, event_block_height: u64) -> Result<Option<SuperblockPayload>> {
        let daemon = self.daemon.as_ref();
        let quorum = daemon.governance_quorum().await?;
        let proposals = Proposal::approved_and_ranked(&self.datastore, quorum, daemon.network()).await?;
        let budget_max = daemon.superblock_budget(event_block_height).await?;
        let sb_epoch_time = daemon.block_height_to_epoch(event_block_height).await?;
        Ok(create_superblock(&proposals, event_block_height, budget_max, sb_epoch_time))
    }

    /// Votes `funding=no` on every superblock at the height we have not voted on.
    async fn reject_competitors(&self, event_block_height: u64) -> Result<Vec<String>> {
        let datastore = self.datastore.as_ref();
        let mut rejected = Vec::new();
        for superblock in Superblock::at_height(datastore, event_block_height).await? {
            if superblock.voted_on(datastore, VoteSignal::Funding).await? {
                continue;
            }
            if superblock
                .vote(datastore, self.daemon.as_ref(), VoteSignal::Funding, VoteOutcome::No)
                .await?
            {
                rejected.push(superblock.object_hash);
            }
        }
        Ok(rejected)
    }

    /// Votes `delete=yes` on every other row carrying the canonical payload.
    async fn prune_duplicates(&self, canonical: &Superblock) -> Result<Vec<String>> {
        let datastore = self.datastore.as_ref();
        let mut pruned = Vec::new();
        for duplicate in Superblock::with_sb_hash(datastore, &canonical.sb_hash).await? {
            if duplicate.object_hash == canonical.object_hash {
                continue;
            }
            if duplicate.voted_on(datastore, VoteSignal::Funding).await?
                || duplicate.voted_on(datastore, VoteSignal::Delete).await?
            {
                continue;
            }
            if duplicate
                .vote(datastore, self.daemon.as_ref(), VoteSignal::Delete, VoteOutcome::Yes)
                .await?
            {
                pruned.push(duplicate.object_hash);
            }
        }
        Ok(pruned)
    }
}
