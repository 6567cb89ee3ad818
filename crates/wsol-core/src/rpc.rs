//! The remote ledger surface the submitter depends on.
//!
//! `HttpRpcClient` in [`crate::http`] talks JSON-RPC to a real node; tests
//! substitute an in-memory implementation.

use async_trait::async_trait;
use chain_sol::Pubkey;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RpcError;

/// Ledger finality levels, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

/// A recent blockhash bounding a transaction's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

/// Options for `sendTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: Commitment::Processed,
        }
    }
}

/// One entry of a `getSignatureStatuses` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default)]
    pub slot: u64,
    /// `None` while the node still counts confirmations, or once rooted.
    #[serde(default)]
    pub confirmations: Option<u64>,
    /// The transaction error; the field itself must be present.
    #[serde(deserialize_with = "required_nullable")]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Whether polling can stop: the transaction failed or reached `commitment`.
    pub fn is_settled(&self, commitment: Commitment) -> bool {
        if self.err.is_some() {
            return true;
        }
        match self.confirmation_status {
            Some(status) => status >= commitment,
            // Older nodes omit the status; no confirmation count means rooted.
            None => self.confirmations.is_none(),
        }
    }
}

fn required_nullable<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_json::Value>::deserialize(deserializer)
}

/// A status reply is either one entry or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Many(Vec<Option<SignatureStatus>>),
    Single(Option<SignatureStatus>),
}

impl StatusResponse {
    /// Normalize to a list. Entries are `None` for unknown signatures.
    pub fn into_statuses(self) -> Vec<Option<SignatureStatus>> {
        match self {
            StatusResponse::Many(statuses) => statuses,
            StatusResponse::Single(status) => vec![status],
        }
    }
}

#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Most recent blockhash usable for compiling a transaction.
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError>;

    /// Token accounts held by `owner` for `mint`, in the node's order.
    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>, RpcError>;

    /// Broadcast a signed wire transaction. Returns the transaction id.
    async fn send_transaction(&self, wire: &[u8], options: &SendOptions) -> Result<String, RpcError>;

    /// Statuses for `signatures`. `None` when the node returned no usable value.
    async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> Result<Option<StatusResponse>, RpcError>;
}
