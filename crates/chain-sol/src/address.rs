//! Solana addresses.
//!
//! An address is the Base58 form of a raw 32-byte key. Program IDs, mints,
//! token accounts and wallets all share the same representation.

use crate::error::SolError;

/// Raw 32-byte account identity.
pub type Pubkey = [u8; 32];

/// Encode 32 bytes as a Solana address.
pub fn bytes_to_address(bytes: &Pubkey) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Solana address into its 32 raw bytes.
///
/// Fails on invalid Base58 or when the payload is not exactly 32 bytes.
pub fn address_to_bytes(address: &str) -> Result<Pubkey, SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Check that `address` decodes to a 32-byte key.
pub fn validate_address(address: &str) -> Result<(), SolError> {
    address_to_bytes(address).map(|_| ())
}
