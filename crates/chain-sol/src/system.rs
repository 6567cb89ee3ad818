//! System Program instructions.

use crate::address::Pubkey;
use crate::transaction::{SolAccountMeta, SolInstruction};

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Pubkey = [0u8; 32];

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

/// Build a System Program `Transfer` moving `lamports` from `from` to `to`.
///
/// Data layout: u32 LE instruction index (2) followed by u64 LE lamports.
pub fn build_system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> SolInstruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from, true),
            SolAccountMeta::writable(*to, false),
        ],
        data,
    }
}
