use anyhow::Result;
use clap::Parser;

use super::CommonOpts;

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(flatten)]
    common: CommonOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let runner = opts.common.runner()?;
    let report = runner.run().await?;
    log::debug!("run report: {}", serde_json::to_string(&report)?);
    Ok(())
}
