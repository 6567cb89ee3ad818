//! Compile, sign, broadcast and confirm one transaction.
//!
//! Each stage has its own type: `SolTransaction` (built),
//! `SignedTransaction` (signed), the returned signature (submitted), and a
//! final [`ConfirmationOutcome`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chain_sol::{
    bytes_to_address, compile_transaction, sign_transaction, Keypair, MessageVersion,
    SignedTransaction, SolInstruction, SolTransaction,
};
use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::config::SubmitConfig;
use crate::error::{Result, WsolError};
use crate::rpc::{Commitment, LatestBlockhash, LedgerRpc, SendOptions, StatusResponse};

/// Commitment a transaction must reach to count as confirmed.
pub const CONFIRM_COMMITMENT: Commitment = Commitment::Confirmed;

/// Terminal result of the confirmation check.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    Confirmed,
    /// The ledger recorded the transaction with this error.
    Failed(Value),
    /// No usable status came back; neither success nor failure is known.
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub signature: String,
    pub outcome: ConfirmationOutcome,
}

/// Decide the outcome from one status reply.
///
/// The first present status wins: no error means confirmed, an embedded error
/// means failed. Empty, null, or all-unknown replies are inconclusive.
pub fn evaluate_statuses(response: Option<StatusResponse>) -> ConfirmationOutcome {
    response
        .into_iter()
        .flat_map(StatusResponse::into_statuses)
        .flatten()
        .next()
        .map_or(ConfirmationOutcome::Inconclusive, |status| match status.err {
            None => ConfirmationOutcome::Confirmed,
            Some(err) => ConfirmationOutcome::Failed(err),
        })
}

/// Whether another poll could still change the answer.
fn is_pending(response: &Option<StatusResponse>) -> bool {
    let Some(response) = response else {
        return false;
    };
    let statuses = match response {
        StatusResponse::Many(statuses) => statuses.as_slice(),
        StatusResponse::Single(status) => std::slice::from_ref(status),
    };
    !statuses.is_empty()
        && statuses
            .iter()
            .all(|s| s.as_ref().map_or(true, |s| !s.is_settled(CONFIRM_COMMITMENT)))
}

pub struct Submitter<'a, R: ?Sized> {
    rpc: &'a R,
    keypair: &'a Keypair,
    config: &'a SubmitConfig,
    send_options: SendOptions,
    version: MessageVersion,
}

impl<'a, R> Submitter<'a, R>
where
    R: LedgerRpc + ?Sized,
{
    pub fn new(rpc: &'a R, keypair: &'a Keypair, config: &'a SubmitConfig) -> Self {
        Self {
            rpc,
            keypair,
            config,
            send_options: SendOptions::default(),
            version: MessageVersion::V0,
        }
    }

    /// Fetch the recent blockhash. Any failure is fatal to the run.
    pub async fn fetch_anchor(&self) -> Result<LatestBlockhash> {
        let anchor = self.rpc.get_latest_blockhash().await?;
        info!(
            blockhash = %bytes_to_address(&anchor.blockhash),
            last_valid_block_height = anchor.last_valid_block_height,
            "latest blockhash"
        );
        Ok(anchor)
    }

    /// Compile with the owner as fee payer and no address lookup tables.
    pub fn build(
        &self,
        instructions: &[SolInstruction],
        anchor: &LatestBlockhash,
    ) -> Result<SolTransaction> {
        Ok(compile_transaction(
            instructions,
            &self.keypair.pubkey(),
            &anchor.blockhash,
        )?)
    }

    pub fn sign(&self, tx: &SolTransaction) -> Result<SignedTransaction> {
        let signed = sign_transaction(tx, self.keypair, self.version)?;
        debug!(
            signature = %signed.signature_base58(),
            transaction = %BASE64.encode(&signed.wire),
            "signed transaction"
        );
        Ok(signed)
    }

    /// Broadcast with preflight simulation at `processed`.
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<String> {
        let signature = self
            .rpc
            .send_transaction(&signed.wire, &self.send_options)
            .await?;
        if signature != signed.signature_base58() {
            warn!(
                returned = %signature,
                local = %signed.signature_base58(),
                "node returned a different transaction id"
            );
        }
        info!(%signature, "transaction sent, waiting for confirmation");
        Ok(signature)
    }

    /// Poll statuses until one fails or reaches `confirmed`, then evaluate
    /// that reply. A null or empty reply ends polling as inconclusive. Running
    /// out of time while the transaction is unseen or below `confirmed` is
    /// [`WsolError::Unconfirmed`].
    pub async fn confirm(&self, signature: &str) -> Result<ConfirmationOutcome> {
        let deadline = Instant::now() + self.config.confirm_timeout;
        let signatures = [signature.to_string()];

        loop {
            let response = self.rpc.get_signature_statuses(&signatures).await?;
            if !is_pending(&response) {
                return Ok(evaluate_statuses(response));
            }
            if Instant::now() >= deadline {
                return Err(WsolError::Unconfirmed {
                    signature: signature.to_string(),
                    timeout: self.config.confirm_timeout,
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Build, sign, submit and confirm. Submission and confirmation errors are
    /// logged before being returned.
    pub async fn execute(
        &self,
        instructions: &[SolInstruction],
        anchor: &LatestBlockhash,
    ) -> Result<SubmissionReport> {
        let tx = self.build(instructions, anchor)?;
        let signed = self.sign(&tx)?;

        let signature = self
            .submit(&signed)
            .await
            .inspect_err(|e| error!(error = %e, "error sending transaction"))?;
        let outcome = self
            .confirm(&signature)
            .await
            .inspect_err(|e| error!(error = %e, %signature, "error confirming transaction"))?;

        self.report(&signature, &outcome);
        Ok(SubmissionReport { signature, outcome })
    }

    fn report(&self, signature: &str, outcome: &ConfirmationOutcome) {
        match outcome {
            ConfirmationOutcome::Confirmed => {
                info!(link = %self.config.explorer_link(signature), "transaction confirmed")
            }
            ConfirmationOutcome::Failed(err) => {
                warn!(%signature, error = %err, "transaction failed")
            }
            ConfirmationOutcome::Inconclusive => {
                warn!(%signature, "transaction confirmation response is empty or invalid")
            }
        }
    }
}
