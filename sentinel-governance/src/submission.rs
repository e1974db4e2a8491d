use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};

use sentinel_dashd::{Daemon, DaemonError};
use sentinel_datastore::models::SuperblockPayload;

/// Broadcasts a superblock with `gobject submit`. Returns the new object hash,
/// or `None` if dashd refused it.
pub async fn submit_superblock(daemon: &dyn Daemon, payload: &SuperblockPayload) -> Result<Option<String>> {
    if !daemon.is_masternode().await? {
        log::debug!("only masternodes can submit superblocks");
        return Ok(None);
    }

    let params = [
        json!("submit"),
        json!("0"),
        json!(1),
        json!(Utc::now().timestamp()),
        json!(payload.data_hex()),
    ];
    match daemon.rpc_command("gobject", &params).await {
        Ok(Value::String(object_hash)) => {
            log::info!(
                "submitted superblock {} for height {} as {}",
                payload.sb_hash(),
                payload.event_block_height,
                object_hash
            );
            Ok(Some(object_hash))
        }
        Ok(other) => {
            log::warn!("unexpected reply to gobject submit: {}", other);
            Ok(None)
        }
        Err(DaemonError::Connectivity(e)) => Err(DaemonError::Connectivity(e).into()),
        Err(e) => {
            log::warn!("superblock submission failed: {}", e);
            Ok(None)
        }
    }
}
