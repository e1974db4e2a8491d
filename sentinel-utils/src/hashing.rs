use num_bigint::BigUint;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref HASH_RE: Regex = Regex::new(r"^[0-9a-fA-F]{64}$").unwrap();
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// sha256 of a string read as a 256-bit unsigned integer.
pub fn hashit(data: &str) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(data.as_bytes()))
}

pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// True for a 64 character hex string (an object or block hash).
pub fn is_hash(s: &str) -> bool {
    HASH_RE.is_match(s)
}
