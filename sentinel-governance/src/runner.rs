use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use sentinel_dashd::Daemon;
use sentinel_datastore::NetworkDatastore;

use crate::decision::{SuperblockDecision, SuperblockDecisionEngine};
use crate::error::PreconditionFailure;
use crate::sync::{perform_dashd_object_sync, SyncReport};
use crate::validity::{check_object_validity, ValidityReport};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub sync: SyncReport,
    pub validity: ValidityReport,
    pub decision: SuperblockDecision,
}

/// One invocation of the sentinel loop: sync, validity votes, then the
/// superblock decision.
#[derive(Clone)]
pub struct Runner {
    pub datastore: Arc<NetworkDatastore>,
    daemon: Arc<dyn Daemon>,
    engine: SuperblockDecisionEngine,
}

pub struct RunnerProps {
    pub datastore: Arc<NetworkDatastore>,
    pub daemon: Arc<dyn Daemon>,
}

impl Runner {
    pub fn new(datastore: Arc<NetworkDatastore>, daemon: Arc<dyn Daemon>) -> Self {
        let engine = SuperblockDecisionEngine::new(datastore.clone(), daemon.clone());
        Runner {
            datastore,
            daemon,
            engine,
        }
    }

    pub fn create(props: RunnerProps) -> Self {
        Self::new(props.datastore, props.daemon)
    }

    pub fn daemon(&self) -> &dyn Daemon {
        self.daemon.as_ref()
    }

    /// dashd must answer and be fully synced before any stage runs.
    pub async fn check_preconditions(&self) -> Result<(), PreconditionFailure> {
        self.daemon
            .check_connectivity()
            .await
            .map_err(PreconditionFailure::DaemonUnreachable)?;

        match self.daemon.is_synced().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(PreconditionFailure::NotSynced),
            Err(e) if e.is_connectivity() => Err(PreconditionFailure::DaemonUnreachable(e)),
            Err(e) => {
                log::warn!("cannot read mnsync status: {}", e);
                Err(PreconditionFailure::NotSynced)
            }
        }
    }

    pub async fn sync(&self) -> Result<SyncReport> {
        self.check_preconditions().await?;
        perform_dashd_object_sync(&self.datastore, self.daemon()).await
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.check_preconditions().await?;

        let sync = perform_dashd_object_sync(&self.datastore, self.daemon()).await?;
        let validity = check_object_validity(&self.datastore, self.daemon()).await?;
        let decision = self.engine.attempt_superblock_creation().await?;
        log::info!("superblock decision: {:?}", decision);

        Ok(RunReport {
            sync,
            validity,
            decision,
        })
    }
}
