pub mod run;
pub mod status;
pub mod sync;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use sentinel_dashd::Daemon;
use sentinel_datastore::NetworkDatastore;
use sentinel_governance::Runner;

use crate::config_file::{self, Config};
use crate::logging;

#[derive(Debug, Args)]
pub struct CommonOpts {
    #[clap(long, env = "SENTINEL_CONFIG", default_value = "./sentinel.json")]
    config: PathBuf,

    #[clap(long)]
    datastore: Option<PathBuf>,

    #[clap(long)]
    log_level: Option<String>,
}

impl CommonOpts {
    /// Reads the config file and starts logging.
    pub fn load(&self) -> Result<Config> {
        let config = config_file::read_or_create_config(&self.config).context("Failed to read config")?;
        logging::init_logging(self.log_level.as_deref(), config.log_level.as_deref());
        log::debug!("using config {}", self.config.display());
        Ok(config)
    }

    pub fn runner(&self) -> Result<Runner> {
        let config = self.load()?;
        let daemon: Arc<dyn Daemon> = Arc::new(config.daemon()?);
        let path = config.datastore_path(self.datastore.as_deref());
        let datastore = NetworkDatastore::create_in_directory(&path)
            .with_context(|| format!("Failed to open datastore at {}", path.display()))?;
        Ok(Runner::new(Arc::new(datastore), daemon))
    }
}
