//! The two runs: wrap SOL into its token account, or close that account.

use chain_sol::{bytes_to_address, Keypair, NATIVE_MINT};
use tracing::info;

use crate::composer::{compose_unwrap, compose_wrap};
use crate::config::{SubmitConfig, WrapConfig};
use crate::error::Result;
use crate::resolver::resolve_token_account;
use crate::rpc::LedgerRpc;
use crate::submitter::{SubmissionReport, Submitter};

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    /// Unwrap found no wrapped-SOL account; nothing was sent.
    NothingToUnwrap,
    Submitted(SubmissionReport),
}

/// Move `config.lamports` into the owner's wrapped-SOL account, creating the
/// account when it does not exist yet.
pub async fn wrap<R>(rpc: &R, keypair: &Keypair, config: &WrapConfig) -> Result<RunReport>
where
    R: LedgerRpc + ?Sized,
{
    let owner = keypair.pubkey();
    info!(payer = %keypair.address(), "payer public key");

    let submitter = Submitter::new(rpc, keypair, &config.submit);
    let anchor = submitter.fetch_anchor().await?;

    let existing = resolve_token_account(rpc, &owner, &NATIVE_MINT).await?;
    let plan = compose_wrap(&owner, existing, config.lamports, &config.budget)?;
    let account = bytes_to_address(&plan.token_account);
    if plan.created {
        info!(%account, "WSOL account not found, creating it");
    } else {
        info!(%account, "WSOL account already exists");
    }
    info!(lamports = config.lamports, "wrapping");

    let report = submitter.execute(&plan.instructions, &anchor).await?;
    Ok(RunReport::Submitted(report))
}

/// Close the owner's wrapped-SOL account, returning its lamports to the owner.
pub async fn unwrap<R>(rpc: &R, keypair: &Keypair, config: &SubmitConfig) -> Result<RunReport>
where
    R: LedgerRpc + ?Sized,
{
    let owner = keypair.pubkey();
    info!(payer = %keypair.address(), "payer public key");

    let submitter = Submitter::new(rpc, keypair, config);
    let anchor = submitter.fetch_anchor().await?;

    let existing = resolve_token_account(rpc, &owner, &NATIVE_MINT).await?;
    let Some(plan) = compose_unwrap(&owner, existing) else {
        info!("WSOL account not found, nothing to unwrap");
        return Ok(RunReport::NothingToUnwrap);
    };
    info!(account = %bytes_to_address(&plan.token_account), "WSOL account");

    let report = submitter.execute(&plan.instructions, &anchor).await?;
    Ok(RunReport::Submitted(report))
}
