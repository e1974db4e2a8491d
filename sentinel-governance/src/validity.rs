use anyhow::Result;
use serde::Serialize;

use sentinel_dashd::Daemon;
use sentinel_datastore::models::{Proposal, Superblock, VoteOutcome};
use sentinel_datastore::{Model, NetworkDatastore};

use crate::votable::Votable;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValidityReport {
    pub voted_valid: usize,
    pub voted_invalid: usize,
    /// Objects already voted on, or whose vote dashd refused.
    pub untouched: usize,
}

impl ValidityReport {
    fn tally(&mut self, cast: Option<VoteOutcome>) {
        match cast {
            Some(VoteOutcome::Yes) => self.voted_valid += 1,
            Some(_) => self.voted_invalid += 1,
            None => self.untouched += 1,
        }
    }
}

/// Casts `valid=yes|no` once on every synced proposal and superblock.
/// Plain nodes have no vote and skip the stage.
pub async fn check_object_validity(datastore: &NetworkDatastore, daemon: &dyn Daemon) -> Result<ValidityReport> {
    let mut report = ValidityReport::default();
    if !daemon.is_masternode().await? {
        log::debug!("not a masternode, skipping validity votes");
        return Ok(report);
    }

    for proposal in Proposal::find_all(datastore).await? {
        report.tally(proposal.vote_validity(datastore, daemon).await?);
    }
    for superblock in Superblock::find_all(datastore).await? {
        report.tally(superblock.vote_validity(datastore, daemon).await?);
    }

    log::debug!(
        "validity votes: {} valid, {} invalid, {} untouched",
        report.voted_valid,
        report.voted_invalid,
        report.untouched
    );
    Ok(report)
}
