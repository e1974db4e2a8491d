//! Access to a running dashd.
//!
//! [`Daemon`] is the capability set the governance stages consume. Everything
//! beyond raw `rpc_command` has a default derived from the daemon's own RPC
//! methods, so alternative backends only need to answer commands.

mod error;

pub mod daemon;
pub mod dash_conf;
pub mod dash_daemon;
pub mod election;

pub use daemon::{Daemon, MasternodeEntry};
pub use dash_conf::DashConf;
pub use dash_daemon::DashDaemon;
pub use error::DaemonError;

/// Seconds between blocks the network targets.
pub const TARGET_BLOCK_SPACING: i64 = 150;
