use serde_json::{json, Value};

use sentinel_datastore::models::governance_object::encode_data_hex;
use sentinel_datastore::models::{Proposal, SuperblockPayload};
use sentinel_utils::hashing::sha256_hex;

/// Object hash derived from a readable seed.
pub fn object_hash(seed: &str) -> String {
    sha256_hex(seed.as_bytes())
}

/// One entry of `gobject list`, shaped the way dashd reports it.
pub fn gobject_item(object_hash: &str, data_hex: &str, absolute_yes_count: i64, creation_time: i64) -> Value {
    json!({
        "Hash": object_hash,
        "CollateralHash": sha256_hex(format!("collateral {}", object_hash).as_bytes()),
        "DataHex": data_hex,
        "CreationTime": creation_time,
        "AbsoluteYesCount": absolute_yes_count,
        "YesCount": absolute_yes_count.max(0),
        "NoCount": 0,
        "AbstainCount": 0,
    })
}

pub fn proposal_item(proposal: &Proposal, absolute_yes_count: i64) -> Value {
    gobject_item(
        &proposal.object_hash,
        &encode_data_hex(&proposal.serialise()),
        absolute_yes_count,
        proposal.start_epoch,
    )
}

pub fn superblock_item(object_hash: &str, payload: &SuperblockPayload) -> Value {
    gobject_item(object_hash, &payload.data_hex(), 0, 0)
}
