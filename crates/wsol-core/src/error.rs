use std::time::Duration;

use chain_sol::SolError;
use thiserror::Error;

/// Failures talking to the remote ledger.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON-RPC error object returned by the node, e.g. a failed preflight.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

/// Invalid startup parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid amount {0:?}: {1}")]
    InvalidAmount(String, &'static str),

    #[error("invalid private key: {0}")]
    InvalidKey(#[source] SolError),
}

#[derive(Debug, Error)]
pub enum WsolError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Chain(#[from] SolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No status for the transaction reached `confirmed` before the timeout.
    #[error("transaction {signature} not confirmed within {timeout:?}")]
    Unconfirmed { signature: String, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, WsolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rpc_error() {
        let err = RpcError::Rpc {
            code: -32002,
            message: "Transaction simulation failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "rpc error -32002: Transaction simulation failed"
        );
    }

    #[test]
    fn display_invalid_amount() {
        let err = ConfigError::InvalidAmount("abc".into(), "not a decimal number");
        assert_eq!(err.to_string(), "invalid amount \"abc\": not a decimal number");
    }

    #[test]
    fn wsol_error_is_transparent() {
        let err: WsolError = RpcError::InvalidResponse("empty blockhash".into()).into();
        assert_eq!(err.to_string(), "invalid rpc response: empty blockhash");

        let err: WsolError = SolError::KeypairMismatch.into();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn display_unconfirmed() {
        let err = WsolError::Unconfirmed {
            signature: "5sig".into(),
            timeout: Duration::from_secs(90),
        };
        assert_eq!(err.to_string(), "transaction 5sig not confirmed within 90s");
    }
}
