use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sentinel_dashd::{DashConf, DashDaemon};
use sentinel_utils::Network;

const RPC_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    pub dash_conf: Option<PathBuf>,
    pub network: Option<Network>,
    pub datastore: Option<PathBuf>,
    pub rpc_host: Option<String>,
    pub rpc_port: Option<u16>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    pub log_level: Option<String>,
}

pub fn read_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let file = fs::File::open(path).context("Failed to open config file")?;
        let config: Config = serde_json::from_reader(file).context("Failed to parse config file")?;
        Ok(config)
    } else {
        let config = Config::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let file = fs::File::create(path).context("Failed to create config file")?;
        serde_json::to_writer_pretty(file, &config).context("Failed to write default config file")?;
        Ok(config)
    }
}

impl Config {
    /// RPC settings from `dash.conf` with this file's overrides applied.
    pub fn dash_conf(&self) -> Result<DashConf> {
        let mut conf = match &self.dash_conf {
            Some(path) => DashConf::from_file(path)?,
            None => match DashConf::default_path().filter(|p| p.exists()) {
                Some(path) => DashConf::from_file(&path)?,
                None => DashConf::default(),
            },
        };

        if let Some(network) = self.network {
            conf.testnet = network == Network::Testnet;
        }
        if let Some(host) = &self.rpc_host {
            conf.rpchost = Some(host.clone());
        }
        if let Some(port) = self.rpc_port {
            conf.rpcport = Some(port);
        }
        if let Some(user) = &self.rpc_user {
            conf.rpcuser = Some(user.clone());
        }
        if let Some(password) = &self.rpc_password {
            conf.rpcpassword = Some(password.clone());
        }
        Ok(conf)
    }

    pub fn daemon(&self) -> Result<DashDaemon> {
        let conf = self.dash_conf()?;
        let daemon = DashDaemon::from_dash_conf(&conf, Duration::from_secs(RPC_TIMEOUT_SECS))
            .context("Failed to configure dashd RPC client")?;
        Ok(daemon)
    }

    pub fn datastore_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.datastore.clone())
            .or_else(|| dirs::home_dir().map(|home| home.join(".sentinel").join("datastore")))
            .unwrap_or_else(|| PathBuf::from("./sentinel-datastore"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_default_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("conf").join("sentinel.json");
        let config = read_or_create_config(&path)?;
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(read_or_create_config(&path)?, Config::default());
        Ok(())
    }

    #[test]
    fn test_overrides_dash_conf() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dash_conf = dir.path().join("dash.conf");
        fs::write(&dash_conf, "rpcuser=dash\nrpcpassword=secret\nrpcport=9998\n")?;

        let path = dir.path().join("sentinel.json");
        fs::write(
            &path,
            serde_json::json!({
                "dash_conf": dash_conf,
                "network": "testnet",
                "rpc_port": 29998,
                "datastore": "/var/lib/sentinel",
            })
            .to_string(),
        )?;

        let config = read_or_create_config(&path)?;
        let conf = config.dash_conf()?;
        assert_eq!(conf.rpcuser.as_deref(), Some("dash"));
        assert_eq!(conf.rpcport, Some(29998));
        assert_eq!(conf.network(), Network::Testnet);
        assert_eq!(config.daemon()?.url(), "http://127.0.0.1:29998/");

        assert_eq!(config.datastore_path(None), PathBuf::from("/var/lib/sentinel"));
        assert_eq!(config.datastore_path(Some(Path::new("/tmp/sb"))), PathBuf::from("/tmp/sb"));
        Ok(())
    }

    #[test]
    fn test_missing_dash_conf_is_an_error() {
        let config = Config {
            dash_conf: Some(PathBuf::from("/nonexistent/dash.conf")),
            ..Default::default()
        };
        assert!(config.dash_conf().is_err());
    }
}
