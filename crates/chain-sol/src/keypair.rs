//! Ed25519 signing identity.
//!
//! Solana tooling exports a keypair as 64 bytes: the 32-byte Ed25519 seed
//! followed by the 32-byte public key, usually Base58 encoded. The seed is
//! copied into an `ed25519_dalek::SigningKey` (zeroized on drop) and every
//! intermediate buffer is wiped.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use zeroize::{Zeroize, Zeroizing};

use crate::address::{bytes_to_address, Pubkey};
use crate::error::SolError;

/// Length of an exported Solana keypair.
pub const KEYPAIR_LENGTH: usize = 64;

/// An owner credential, passed explicitly to whatever needs to sign.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Build a keypair from a raw 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse the 64-byte `seed || pubkey` layout.
    ///
    /// The trailing public key must match the one derived from the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(SolError::InvalidKeypair(format!(
                "expected {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let keypair = Self::from_seed(&seed);
        seed.zeroize();

        if keypair.pubkey()[..] != bytes[32..] {
            return Err(SolError::KeypairMismatch);
        }

        Ok(keypair)
    }

    /// Parse a Base58-encoded 64-byte keypair.
    pub fn from_base58(encoded: &str) -> Result<Self, SolError> {
        let bytes = Zeroizing::new(
            bs58::decode(encoded.trim())
                .into_vec()
                .map_err(|e| SolError::InvalidKeypair(format!("base58 decode failed: {e}")))?,
        );
        Self::from_bytes(&bytes)
    }

    pub fn pubkey(&self) -> Pubkey {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.pubkey())
    }

    /// Detached Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.address())
            .finish_non_exhaustive()
    }
}
