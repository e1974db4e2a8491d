mod cmds;
mod config_file;
mod logging;

use clap::{Parser, Subcommand};
use std::process;

use sentinel_governance::PreconditionFailure;

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(version = "0.1.0")]
#[command(about = "Governance agent for Dash masternodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync governance objects, cast validity votes and decide on the next superblock
    Run(cmds::run::Opts),

    /// Sync governance objects only
    Sync(cmds::sync::Opts),

    /// Show what dashd reports about the chain and this node
    Status(cmds::status::Opts),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(opts) => cmds::run::run(opts).await,
        Commands::Sync(opts) => cmds::sync::run(opts).await,
        Commands::Status(opts) => cmds::status::run(opts).await,
    };

    if let Err(err) = result {
        if let Some(failure) = err.downcast_ref::<PreconditionFailure>() {
            println!("{}", failure);
            log::debug!("{:?}", failure);
            process::exit(failure.exit_code());
        }
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
