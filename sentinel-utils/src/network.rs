use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dash network a sentinel instance is pointed at.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Blocks between superblocks, used when the daemon does not report one.
    pub fn superblock_cycle(&self) -> u64 {
        match self {
            Network::Mainnet => 16616,
            Network::Testnet => 24,
        }
    }

    /// Governance objects for an event height are considered settled this many
    /// blocks ahead of it (~3 days on mainnet).
    pub fn maturity_phase_delta(&self) -> u64 {
        match self {
            Network::Mainnet => 1662,
            Network::Testnet => 24,
        }
    }

    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Mainnet => 76,
            Network::Testnet => 140,
        }
    }

    pub fn p2sh_version(&self) -> u8 {
        match self {
            Network::Mainnet => 16,
            Network::Testnet => 19,
        }
    }

    pub fn address_versions(&self) -> [u8; 2] {
        [self.p2pkh_version(), self.p2sh_version()]
    }

    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Network::Mainnet => 9998,
            Network::Testnet => 19998,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(anyhow!("unknown network: {}", other)),
        }
    }
}
