use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use sentinel_dashd::Daemon;
use sentinel_datastore::models::{GovernanceObject, ObjectType, Proposal, Superblock};
use sentinel_datastore::{Model, NetworkDatastore};

/// Counts from one pass over `gobject list`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

enum Imported {
    Inserted,
    Updated,
    Unchanged,
}

/// Mirrors every governance object dashd knows about into the datastore.
/// A malformed object is logged and skipped; the rest of the list still syncs.
pub async fn perform_dashd_object_sync(datastore: &NetworkDatastore, daemon: &dyn Daemon) -> Result<SyncReport> {
    let list = daemon.gobject_list().await?;
    let items = list
        .as_object()
        .ok_or_else(|| anyhow!("gobject list returned {}", list))?;

    let now = Utc::now().timestamp();
    let mut report = SyncReport::default();
    for (key, item) in items {
        match import_gobject(datastore, item, now).await {
            Ok(Imported::Inserted) => report.inserted += 1,
            Ok(Imported::Updated) => report.updated += 1,
            Ok(Imported::Unchanged) => report.unchanged += 1,
            Err(e) => {
                log::warn!("skipping governance object {}: {:#}", key, e);
                report.skipped += 1;
            }
        }
    }
    log::info!(
        "synced governance objects: {} new, {} updated, {} unchanged, {} skipped",
        report.inserted,
        report.updated,
        report.unchanged,
        report.skipped
    );
    Ok(report)
}

async fn import_gobject(datastore: &NetworkDatastore, item: &Value, now: i64) -> Result<Imported> {
    let mut gobject = GovernanceObject::from_gobject_list_item(item, now)?;
    let known = GovernanceObject::find_by_hash(datastore, &gobject.object_hash).await?;

    let imported = match &known {
        None => Imported::Inserted,
        Some(known) if known.data_hex != gobject.data_hex => {
            gobject.created_at = known.created_at;
            Imported::Updated
        }
        Some(known) => {
            if known.has_same_counts(&gobject) {
                return Ok(Imported::Unchanged);
            }
            // only the vote tallies moved
            gobject.created_at = known.created_at;
            gobject.updated_at = known.updated_at;
            gobject.save(datastore).await?;
            return Ok(Imported::Unchanged);
        }
    };

    let mut entries = vec![(gobject.get_id(), gobject.to_json_string()?.into_bytes())];
    let fields = gobject.payload()?;
    match gobject.object_type {
        ObjectType::Proposal => {
            let proposal = Proposal::from_payload(&gobject.object_hash, &fields)?;
            entries.push((proposal.get_id(), proposal.to_json_string()?.into_bytes()));
        }
        ObjectType::Superblock => {
            let superblock = Superblock::from_payload(&gobject.object_hash, &fields)?;
            entries.push((superblock.get_id(), superblock.to_json_string()?.into_bytes()));
        }
        ObjectType::Unknown => {
            log::debug!("governance object {} has an unknown type", gobject.object_hash);
        }
    }
    datastore.put_many(&entries).await?;
    Ok(imported)
}
