use thiserror::Error;

use sentinel_dashd::DaemonError;

/// Reasons a run stops before any stage executes.
#[derive(Error, Debug)]
pub enum PreconditionFailure {
    #[error("Cannot connect to dashd. Please ensure dashd is running and the JSONRPC port is open to Sentinel.")]
    DaemonUnreachable(#[source] DaemonError),

    #[error("dashd not synced with network! Awaiting full sync before running Sentinel.")]
    NotSynced,
}

impl PreconditionFailure {
    /// Process exit status reported for this failure.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
