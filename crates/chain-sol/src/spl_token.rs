//! SPL Token and Associated Token Account instructions.
//!
//! Covers the subset needed for wrapped SOL: creating the owner's associated
//! token account, syncing its native balance, and closing it. The program
//! encodings are implemented directly instead of pulling in `spl-token`.

use sha2::{Digest, Sha256};

use crate::address::Pubkey;
use crate::error::SolError;
use crate::system::SYSTEM_PROGRAM_ID;
use crate::transaction::{SolAccountMeta, SolInstruction};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// Wrapped SOL mint: `So11111111111111111111111111111111111111112`
pub const NATIVE_MINT: Pubkey = [
    0x06, 0x9b, 0x88, 0x57, 0xfe, 0xab, 0x81, 0x84, 0xfb, 0x68, 0x7f, 0x63, 0x46, 0x18, 0xc0,
    0x35, 0xda, 0xc4, 0x39, 0xdc, 0x1a, 0xeb, 0x3b, 0x55, 0x98, 0xa0, 0xf0, 0x00, 0x00, 0x00,
    0x00, 0x01,
];

/// SPL Token instruction tags.
const CLOSE_ACCOUNT_TAG: u8 = 9;
const SYNC_NATIVE_TAG: u8 = 17;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Build an Associated Token Account `Create` instruction.
///
/// Returns the derived token account alongside the instruction, since the
/// caller needs it as the target of later instructions.
///
/// Accounts: payer (signer, writable), associated account (writable),
/// owner, mint, System Program, Token Program. Data is empty.
pub fn build_create_associated_token_account(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, SolInstruction), SolError> {
    let associated = derive_associated_token_address(owner, mint)?;

    let instruction = SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(associated, false),
            SolAccountMeta::readonly(*owner, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: Vec::new(),
    };

    Ok((associated, instruction))
}

/// Build an SPL Token `SyncNative` instruction.
///
/// Brings the token balance of a native-mint account in line with the
/// lamports it holds above rent exemption.
pub fn build_sync_native(account: &Pubkey) -> SolInstruction {
    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*account, false)],
        data: vec![SYNC_NATIVE_TAG],
    }
}

/// Build an SPL Token `CloseAccount` instruction.
///
/// All lamports in `account` go to `destination`; `owner` must sign.
pub fn build_close_account(
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
) -> SolInstruction {
    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*account, false),
            SolAccountMeta::writable(*destination, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data: vec![CLOSE_ACCOUNT_TAG],
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// Seeds are `[wallet, token_program_id, mint]` under the Associated Token
/// Account program.
pub fn derive_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Search bump seeds from 255 down to 0 for the first off-curve hash of
/// `seeds || bump || program_id || "ProgramDerivedAddress"`.
fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), SolError> {
    (0u8..=255)
        .rev()
        .find_map(|bump| {
            let mut hasher = Sha256::new();
            for seed in seeds {
                hasher.update(seed);
            }
            hasher.update([bump]);
            hasher.update(program_id);
            hasher.update(PDA_MARKER);

            let hash: Pubkey = hasher.finalize().into();
            (!is_on_curve(&hash)).then_some((hash, bump))
        })
        .ok_or_else(|| SolError::InvalidAddress("could not find valid PDA bump seed".into()))
}

fn is_on_curve(bytes: &Pubkey) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
