use base58::{FromBase58, ToBase58};

use crate::hashing::double_sha256;
use crate::network::Network;

/// Checks a base58check encoded P2PKH or P2SH address for the given network.
pub fn is_valid_address(address: &str, network: Network) -> bool {
    let decoded = match address.from_base58() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if decoded.len() != 25 {
        return false;
    }
    let (payload, checksum) = decoded.split_at(21);
    if double_sha256(payload)[..4] != *checksum {
        return false;
    }
    network.address_versions().contains(&payload[0])
}

pub fn encode_address(version: u8, hash160: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(25);
    payload.push(version);
    payload.extend_from_slice(hash160);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..4]);
    payload.to_base58()
}
