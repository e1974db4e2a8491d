use anyhow::Result;
use clap::Parser;

use sentinel_governance::PreconditionFailure;

use super::CommonOpts;

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(flatten)]
    common: CommonOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let runner = opts.common.runner()?;
    let daemon = runner.daemon();
    daemon
        .check_connectivity()
        .await
        .map_err(PreconditionFailure::DaemonUnreachable)?;

    let block_count = daemon.block_count().await?;
    let next_superblock = daemon.next_superblock_height().await?;
    let outpoint = daemon.current_masternode_outpoint().await?;
    let synced = daemon.is_synced().await?;

    println!("network:          {}", daemon.network());
    println!("block height:     {}", block_count);
    println!("next superblock:  {}", next_superblock);
    println!("masternode:       {}", outpoint.as_deref().unwrap_or("no"));
    println!("synced:           {}", if synced { "yes" } else { "no" });
    Ok(())
}
