//! Wrap native SOL into the owner's wrapped-SOL token account.

use clap::Parser;
use wsol_cli::{init_logging, BudgetArgs, ConnectionArgs, SubmitArgs};
use wsol_core::{parse_sol_amount, WrapConfig};

/// Wrap native SOL into wrapped SOL
#[derive(Debug, Parser)]
#[command(name = "wrap-sol", version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Amount of SOL to wrap, e.g. 0.5
    #[arg(long, env = "AMOUNT_TO_WRAP", value_parser = parse_sol_amount)]
    amount: u64,

    #[command(flatten)]
    budget: BudgetArgs,

    #[command(flatten)]
    submit: SubmitArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let mut cli = Cli::parse();

    let keypair = cli.connection.take_keypair()?;
    let rpc = cli.connection.client();
    let config = WrapConfig {
        lamports: cli.amount,
        budget: cli.budget.budget(),
        submit: cli.submit.config(),
    };

    wsol_core::wrap(&rpc, &keypair, &config).await?;
    Ok(())
}
