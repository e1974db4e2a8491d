#[allow(unused_imports)]
#[macro_use]
extern crate lazy_static;

pub mod address;
pub mod amount;
pub mod hashing;
pub mod json_stringify_deterministic;
pub mod network;

pub use network::Network;
