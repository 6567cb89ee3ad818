//! Wrap and unwrap native SOL.
//!
//! A run is strictly sequential: resolve the owner's wrapped-SOL account,
//! compose the instructions, then compile, sign, submit and confirm a single
//! transaction. The remote node is reached through the [`LedgerRpc`] trait so
//! the whole flow runs against an in-memory double in tests.

pub mod composer;
pub mod config;
pub mod error;
pub mod http;
pub mod ops;
pub mod resolver;
pub mod rpc;
pub mod submitter;

pub use composer::{compose_unwrap, compose_wrap, UnwrapPlan, WrapPlan};
pub use config::{parse_sol_amount, ComputeBudget, SubmitConfig, WrapConfig};
pub use error::{ConfigError, RpcError, WsolError};
pub use http::{HttpRpcClient, DEFAULT_RPC_URL};
pub use ops::{unwrap, wrap, RunReport};
pub use resolver::resolve_token_account;
pub use rpc::{Commitment, LatestBlockhash, LedgerRpc, SendOptions, SignatureStatus, StatusResponse};
pub use submitter::{evaluate_statuses, ConfirmationOutcome, SubmissionReport, Submitter};
