use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sentinel_utils::Network;

use crate::error::DaemonError;

/// RPC settings read from a `dash.conf`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashConf {
    pub rpcuser: Option<String>,
    pub rpcpassword: Option<String>,
    pub rpcport: Option<u16>,
    pub rpchost: Option<String>,
    pub testnet: bool,
}

impl DashConf {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".dashcore").join("dash.conf"))
    }

    pub fn from_file(path: &Path) -> Result<Self, DaemonError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parses `key=value` lines. Later keys win; `#` starts a comment;
    /// section headers such as `[test]` are skipped.
    pub fn parse(contents: &str) -> Result<Self, DaemonError> {
        let mut values: HashMap<String, String> = HashMap::new();
        for line in contents.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() || line.starts_with('[') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        let rpcport = match values.get("rpcport") {
            Some(port) => Some(
                port.parse::<u16>()
                    .map_err(|_| DaemonError::Config(format!("invalid rpcport: {}", port)))?,
            ),
            None => None,
        };
        let rpchost = values
            .get("rpcconnect")
            .or_else(|| values.get("rpcbind"))
            .cloned();

        Ok(DashConf {
            rpcuser: values.get("rpcuser").cloned(),
            rpcpassword: values.get("rpcpassword").cloned(),
            rpcport,
            rpchost,
            testnet: values.get("testnet").map(|v| v == "1").unwrap_or(false),
        })
    }

    pub fn network(&self) -> Network {
        if self.testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }
}
