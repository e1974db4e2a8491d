use num_bigint::BigUint;

use sentinel_utils::hashing::hashit;

use crate::daemon::MasternodeEntry;

/// Picks the enabled masternode whose hashed outpoint is closest to the hash
/// of `block_hash`. Ties go to the lower outpoint.
pub fn elect_mn(block_hash: &str, masternodes: &[MasternodeEntry]) -> Option<String> {
    let target = hashit(block_hash);
    masternodes
        .iter()
        .filter(|mn| mn.is_enabled())
        .map(|mn| {
            let candidate = hashit(&mn.outpoint);
            (distance(&candidate, &target), mn.outpoint.as_str())
        })
        .min()
        .map(|(_, outpoint)| outpoint.to_string())
}

fn distance(a: &BigUint, b: &BigUint) -> BigUint {
    if a > b {
        a - b
    } else {
        b - a
    }
}
