//! Shared command-line plumbing for `wrap-sol` and `unwrap-sol`.

use std::time::Duration;

use chain_sol::Keypair;
use clap::Args;
use tracing_subscriber::EnvFilter;
use wsol_core::config::DEFAULT_EXPLORER_URL;
use wsol_core::{ComputeBudget, ConfigError, HttpRpcClient, SubmitConfig, DEFAULT_RPC_URL};
use zeroize::Zeroizing;

/// Endpoint and signing key, shared by both binaries.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Solana JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Base58-encoded 64-byte keypair of the owner and fee payer
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

impl ConnectionArgs {
    /// Decode the keypair and wipe the encoded secret from the arguments.
    pub fn take_keypair(&mut self) -> Result<Keypair, ConfigError> {
        let secret = Zeroizing::new(std::mem::take(&mut self.private_key));
        Keypair::from_base58(&secret).map_err(ConfigError::InvalidKey)
    }

    pub fn client(&self) -> HttpRpcClient {
        HttpRpcClient::new(self.rpc_url.clone())
    }
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Seconds to wait for the transaction to reach `confirmed`
    #[arg(long, default_value_t = 90)]
    pub confirm_timeout_secs: u64,

    /// Milliseconds between signature status polls
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Prefix of the explorer link printed on confirmation
    #[arg(long, default_value = DEFAULT_EXPLORER_URL)]
    pub explorer_url: String,
}

impl SubmitArgs {
    pub fn config(&self) -> SubmitConfig {
        SubmitConfig {
            confirm_timeout: Duration::from_secs(self.confirm_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            explorer_url: self.explorer_url.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct BudgetArgs {
    /// Priority fee in micro-lamports per compute unit
    #[arg(long, default_value_t = 1_000_000)]
    pub compute_unit_price: u64,

    /// Compute unit ceiling for the transaction
    #[arg(long, default_value_t = 200_000)]
    pub compute_unit_limit: u32,
}

impl BudgetArgs {
    pub fn budget(&self) -> ComputeBudget {
        ComputeBudget {
            unit_price_micro_lamports: self.compute_unit_price,
            unit_limit: self.compute_unit_limit,
        }
    }
}

/// Install the `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
