//! Offline Solana primitives for the wrapped-SOL tools.
//!
//! Address encoding, keypair loading, the handful of program instructions
//! needed to wrap and unwrap native SOL, and the v0 message wire format.
//! Nothing here touches the network; `wsol-core` drives the RPC side.
//!
//! Like the rest of the workspace this avoids `solana-sdk` and encodes the
//! compact binary layout by hand, using `ed25519-dalek` for signing and `bs58`
//! for Base58.

pub mod address;
pub mod compute_budget;
pub mod error;
pub mod keypair;
pub mod spl_token;
pub mod system;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, validate_address, Pubkey};
pub use compute_budget::{set_compute_unit_limit, set_compute_unit_price, COMPUTE_BUDGET_PROGRAM_ID};
pub use error::SolError;
pub use keypair::Keypair;
pub use spl_token::{
    build_close_account, build_create_associated_token_account, build_sync_native,
    derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT, TOKEN_PROGRAM_ID,
};
pub use system::{build_system_transfer, LAMPORTS_PER_SOL, SYSTEM_PROGRAM_ID};
pub use transaction::{
    compile_transaction, decode_compact_u16, encode_compact_u16, serialize_message,
    sign_transaction, CompiledInstruction, MessageVersion, SignedTransaction, SolAccountMeta,
    SolInstruction, SolTransaction,
};
