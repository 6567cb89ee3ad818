//! Close the owner's wrapped-SOL account and reclaim its lamports.

use clap::Parser;
use wsol_cli::{init_logging, ConnectionArgs, SubmitArgs};

/// Unwrap wrapped SOL by closing its token account
#[derive(Debug, Parser)]
#[command(name = "unwrap-sol", version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    submit: SubmitArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let mut cli = Cli::parse();

    let keypair = cli.connection.take_keypair()?;
    let rpc = cli.connection.client();

    wsol_core::unwrap(&rpc, &keypair, &cli.submit.config()).await?;
    Ok(())
}
