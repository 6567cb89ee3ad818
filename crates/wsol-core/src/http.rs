//! JSON-RPC 2.0 client for a Solana node over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chain_sol::{address_to_bytes, bytes_to_address, Pubkey};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::RpcError;
use crate::rpc::{Commitment, LatestBlockhash, LedgerRpc, SendOptions, StatusResponse};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// HTTP JSON-RPC client.
///
/// Reads (`getLatestBlockhash`, `getTokenAccountsByOwner`) use the client's
/// commitment, `finalized` unless overridden.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    commitment: Commitment,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// `{ context, value }` wrapper most methods reply with.
#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

#[derive(Deserialize)]
struct KeyedAccount {
    pubkey: String,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest` client (proxy, timeouts, TLS roots).
    pub fn with_client(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
            commitment: Commitment::Finalized,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(method, id, "rpc request");

        let response = self.http.post(&self.url).json(&body).send().await?;
        // Providers answer some rejections with 4xx/5xx and a JSON-RPC error body.
        let status_error = response.error_for_status_ref().err();
        let bytes = response.bytes().await?;

        match (decode_response(method, &bytes), status_error) {
            (decoded @ Err(RpcError::Rpc { .. }), _) => decoded,
            (_, Some(status_error)) => Err(status_error.into()),
            (decoded, None) => decoded,
        }
    }
}

/// Decode a JSON-RPC reply body. An error object wins over any result.
fn decode_response<T: DeserializeOwned>(method: &str, bytes: &[u8]) -> Result<T, RpcError> {
    let response: JsonRpcResponse<T> = serde_json::from_slice(bytes)
        .map_err(|e| RpcError::InvalidResponse(format!("{method}: {e}")))?;

    if let Some(error) = response.error {
        log_error_data(method, error.data.as_ref());
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse(format!("{method}: missing result")))
}

fn blockhash_params(commitment: Commitment) -> Value {
    json!([{ "commitment": commitment.as_str() }])
}

fn token_accounts_params(owner: &Pubkey, mint: &Pubkey, commitment: Commitment) -> Value {
    json!([
        bytes_to_address(owner),
        { "mint": bytes_to_address(mint) },
        { "encoding": "base64", "commitment": commitment.as_str() },
    ])
}

fn send_params(wire: &[u8], options: &SendOptions) -> Value {
    json!([
        BASE64.encode(wire),
        {
            "encoding": "base64",
            "skipPreflight": options.skip_preflight,
            "preflightCommitment": options.preflight_commitment.as_str(),
        },
    ])
}

fn status_params(signatures: &[String]) -> Value {
    json!([signatures, { "searchTransactionHistory": false }])
}

#[async_trait]
impl LedgerRpc for HttpRpcClient {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        let response: WithContext<Option<BlockhashValue>> = self
            .call("getLatestBlockhash", blockhash_params(self.commitment))
            .await?;

        let value = response
            .value
            .ok_or_else(|| RpcError::InvalidResponse("empty blockhash response".into()))?;
        let blockhash = address_to_bytes(&value.blockhash)
            .map_err(|e| RpcError::InvalidResponse(format!("blockhash: {e}")))?;

        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height: value.last_valid_block_height,
        })
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>, RpcError> {
        let response: WithContext<Vec<KeyedAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                token_accounts_params(owner, mint, self.commitment),
            )
            .await?;

        response
            .value
            .iter()
            .map(|account| {
                address_to_bytes(&account.pubkey)
                    .map_err(|e| RpcError::InvalidResponse(format!("token account: {e}")))
            })
            .collect()
    }

    async fn send_transaction(&self, wire: &[u8], options: &SendOptions) -> Result<String, RpcError> {
        self.call("sendTransaction", send_params(wire, options)).await
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> Result<Option<StatusResponse>, RpcError> {
        let response: WithContext<Value> = self
            .call("getSignatureStatuses", status_params(signatures))
            .await?;

        Ok(parse_status_value(response.value))
    }
}

/// A null or unrecognizable status value is reported as absent.
fn parse_status_value(value: Value) -> Option<StatusResponse> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value)
        .map_err(|e| warn!(error = %e, "unrecognized signature status payload"))
        .ok()
}

/// Preflight failures carry simulation logs in `error.data.logs`.
fn log_error_data(method: &str, data: Option<&Value>) {
    let Some(logs) = data.and_then(|d| d.get("logs")).and_then(Value::as_array) else {
        return;
    };
    for line in logs.iter().filter_map(Value::as_str) {
        warn!(method, "{line}");
    }
}
