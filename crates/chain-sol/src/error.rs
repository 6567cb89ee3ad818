use thiserror::Error;

/// Errors from building, signing, or encoding Solana transactions offline.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("keypair public key does not match its secret seed")]
    KeypairMismatch,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("message references {0} accounts, at most 256 fit in one message")]
    TooManyAccounts(usize),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
