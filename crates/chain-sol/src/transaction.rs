//! Solana message compilation, signing and wire format.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     [version prefix]      u8, 0x80 for v0 (absent for legacy)
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!     [num_lookups]         compact-u16, v0 only (always 0 here)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use crate::address::{bytes_to_address, Pubkey};
use crate::error::SolError;
use crate::keypair::Keypair;

/// High bit set on the first message byte marks a versioned message.
const VERSION_PREFIX_MASK: u8 = 0x80;

/// A message can address at most 256 accounts (u8 indices).
const MAX_ACCOUNTS: usize = 256;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from the start of `data`.
///
/// Returns `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;

    for (consumed, byte) in data.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as u32) << (7 * consumed);
        if byte & 0x80 == 0 || consumed == 2 {
            return u16::try_from(value)
                .map(|v| (v, consumed + 1))
                .map_err(|_| SolError::SerializationError("compact-u16 value overflow".into()));
        }
    }

    Err(SolError::SerializationError(
        "unexpected end of data while decoding compact-u16".into(),
    ))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// Message encoding to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageVersion {
    Legacy,
    /// Version 0 with no address lookup tables.
    #[default]
    V0,
}

/// A compiled, unsigned Solana transaction.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Pubkey>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: [u8; 32],

    /// Compiled instructions, in the order they were supplied.
    pub compiled_instructions: Vec<CompiledInstruction>,
}

impl SolTransaction {
    pub fn fee_payer(&self) -> &Pubkey {
        &self.account_keys[0]
    }
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the transaction's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A transaction carrying its single fee-payer signature.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub signature: [u8; 64],
    /// Full wire encoding, ready for `sendTransaction`.
    pub wire: Vec<u8>,
}

impl SignedTransaction {
    /// The transaction id: Base58 of the first signature.
    pub fn signature_base58(&self) -> String {
        bs58::encode(self.signature).into_string()
    }

    /// Number of signatures encoded on the wire.
    pub fn num_signatures(&self) -> Result<u16, SolError> {
        decode_compact_u16(&self.wire).map(|(n, _)| n)
    }

    /// The signed message bytes, after the signature section.
    pub fn message_bytes(&self) -> Result<&[u8], SolError> {
        let (count, prefix) = decode_compact_u16(&self.wire)?;
        let start = prefix + count as usize * 64;
        self.wire.get(start..).ok_or_else(|| {
            SolError::SerializationError("transaction too short for its signatures".into())
        })
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Compile instructions into a single-fee-payer transaction.
///
/// Accounts are deduplicated with their signer/writable bits merged. The fee
/// payer is always a writable signer at index 0. Instruction order is kept
/// exactly as given.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &Pubkey,
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    let mut entries: Vec<SolAccountMeta> = Vec::new();

    let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(SolAccountMeta {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);
    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    if entries.len() > MAX_ACCOUNTS {
        return Err(SolError::TooManyAccounts(entries.len()));
    }

    // Stable sort: the fee payer was inserted first and is a writable signer,
    // so it stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    let count = |pred: fn(&SolAccountMeta) -> bool| entries.iter().filter(|e| pred(e)).count() as u8;
    let num_required_signatures = count(|e| e.is_signer);
    let num_readonly_signed = count(|e| e.is_signer && !e.is_writable);
    let num_readonly_unsigned = count(|e| !e.is_signer && !e.is_writable);

    let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
    let index_of = |key: &Pubkey| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| {
                SolError::TransactionBuildError(format!(
                    "{} missing from account keys",
                    bytes_to_address(key)
                ))
            })
    };

    let compiled_instructions = instructions
        .iter()
        .map(|ix| -> Result<CompiledInstruction, SolError> {
            Ok(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                account_indices: ix
                    .accounts
                    .iter()
                    .map(|meta| index_of(&meta.pubkey))
                    .collect::<Result<_, _>>()?,
                data: ix.data.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SolTransaction {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions,
    })
}

/// Serialize the transaction message (the bytes that get signed).
pub fn serialize_message(tx: &SolTransaction, version: MessageVersion) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(256);

    if version == MessageVersion::V0 {
        buf.push(VERSION_PREFIX_MASK);
    }

    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(checked_len(tx.account_keys.len())?));
    for key in &tx.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&tx.recent_blockhash);

    buf.extend_from_slice(&encode_compact_u16(checked_len(tx.compiled_instructions.len())?));
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);
        buf.extend_from_slice(&encode_compact_u16(checked_len(ix.account_indices.len())?));
        buf.extend_from_slice(&ix.account_indices);
        buf.extend_from_slice(&encode_compact_u16(checked_len(ix.data.len())?));
        buf.extend_from_slice(&ix.data);
    }

    if version == MessageVersion::V0 {
        // No address lookup tables.
        buf.extend_from_slice(&encode_compact_u16(0));
    }

    Ok(buf)
}

/// Sign a compiled transaction with the fee payer's keypair.
///
/// The keypair must be the fee payer and the only required signer; the
/// result always carries exactly one signature.
pub fn sign_transaction(
    tx: &SolTransaction,
    keypair: &Keypair,
    version: MessageVersion,
) -> Result<SignedTransaction, SolError> {
    if tx.num_required_signatures != 1 {
        return Err(SolError::SigningError(format!(
            "transaction requires {} signatures, only the fee payer can sign",
            tx.num_required_signatures
        )));
    }
    if *tx.fee_payer() != keypair.pubkey() {
        return Err(SolError::SigningError(format!(
            "fee payer {} is not the signing key {}",
            bytes_to_address(tx.fee_payer()),
            keypair.address()
        )));
    }

    let message_bytes = serialize_message(tx, version)?;
    let signature = keypair.sign(&message_bytes);

    let mut wire = Vec::with_capacity(1 + 64 + message_bytes.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature);
    wire.extend_from_slice(&message_bytes);

    Ok(SignedTransaction { signature, wire })
}

fn checked_len(len: usize) -> Result<u16, SolError> {
    u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("length {len} exceeds compact-u16")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{build_system_transfer, SYSTEM_PROGRAM_ID};
    use ed25519_dalek::{Signature, VerifyingKey};

    fn transfer_tx(from: &Pubkey, to: &Pubkey, blockhash: &[u8; 32]) -> SolTransaction {
        let ix = build_system_transfer(from, to, 1_000);
        compile_transaction(&[ix], from, blockhash).unwrap()
    }

    // -- compact-u16 --------------------------------------------------------

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(128), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(16383), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn decode_compact_u16_consumed_lengths() {
        assert_eq!(decode_compact_u16(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode_compact_u16(&[0x80, 0x01, 0xAA]).unwrap(), (128, 2));
        assert_eq!(decode_compact_u16(&[0x80, 0x80, 0x01]).unwrap(), (16384, 3));
    }

    #[test]
    fn decode_compact_u16_errors() {
        assert!(decode_compact_u16(&[]).is_err());
        assert!(decode_compact_u16(&[0x80]).is_err());
        assert!(decode_compact_u16(&[0xff, 0xff, 0x7f]).is_err());
    }

    // -- Compilation --------------------------------------------------------

    #[test]
    fn fee_payer_first_and_header_counts() {
        let from = [1u8; 32];
        let to = [2u8; 32];
        let tx = transfer_tx(&from, &to, &[0xAA; 32]);

        assert_eq!(tx.account_keys, vec![from, to, SYSTEM_PROGRAM_ID]);
        assert_eq!(tx.num_required_signatures, 1);
        assert_eq!(tx.num_readonly_signed, 0);
        assert_eq!(tx.num_readonly_unsigned, 1);
        assert_eq!(tx.recent_blockhash, [0xAA; 32]);
    }

    #[test]
    fn instruction_order_is_preserved() {
        let payer = [1u8; 32];
        let ixs = vec![
            SolInstruction {
                program_id: [9; 32],
                accounts: vec![],
                data: vec![1],
            },
            build_system_transfer(&payer, &[2; 32], 5),
            SolInstruction {
                program_id: [8; 32],
                accounts: vec![SolAccountMeta::writable([2; 32], false)],
                data: vec![3],
            },
        ];
        let tx = compile_transaction(&ixs, &payer, &[0; 32]).unwrap();

        let programs: Vec<Pubkey> = tx
            .compiled_instructions
            .iter()
            .map(|c| tx.account_keys[c.program_id_index as usize])
            .collect();
        assert_eq!(programs, vec![[9; 32], SYSTEM_PROGRAM_ID, [8; 32]]);
        let data: Vec<u8> = tx.compiled_instructions.iter().map(|c| c.data[0]).collect();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_accounts_merge_permissions() {
        let key = [0xAA; 32];
        let tx = compile_transaction(
            &[build_system_transfer(&key, &key, 100)],
            &key,
            &[0; 32],
        )
        .unwrap();
        assert_eq!(tx.account_keys.len(), 2);
        assert_eq!(tx.num_required_signatures, 1);
    }

    #[test]
    fn too_many_accounts_is_rejected() {
        let accounts = (0..300u16)
            .map(|i| {
                let mut key = [0u8; 32];
                key[..2].copy_from_slice(&i.to_le_bytes());
                key[31] = 1;
                SolAccountMeta::readonly(key, false)
            })
            .collect();
        let ix = SolInstruction {
            program_id: [7; 32],
            accounts,
            data: vec![],
        };
        let err = compile_transaction(&[ix], &[0xEE; 32], &[0; 32]).unwrap_err();
        assert!(matches!(err, SolError::TooManyAccounts(302)));
    }

    // -- Serialization ------------------------------------------------------

    #[test]
    fn legacy_and_v0_layouts() {
        let tx = transfer_tx(&[1; 32], &[2; 32], &[0xCC; 32]);
        let legacy = serialize_message(&tx, MessageVersion::Legacy).unwrap();
        let v0 = serialize_message(&tx, MessageVersion::V0).unwrap();

        assert_eq!(legacy[0], tx.num_required_signatures);
        assert_eq!(v0[0], 0x80);
        assert_eq!(&v0[1..v0.len() - 1], &legacy[..]);
        assert_eq!(*v0.last().unwrap(), 0, "empty lookup table section");
    }

    #[test]
    fn message_contains_blockhash() {
        let blockhash = [0xCC; 32];
        let tx = transfer_tx(&[1; 32], &[2; 32], &blockhash);
        let msg = serialize_message(&tx, MessageVersion::Legacy).unwrap();

        let offset = 3 + 1 + 32 * tx.account_keys.len();
        assert_eq!(&msg[offset..offset + 32], &blockhash);
    }

    // -- Signing ------------------------------------------------------------

    #[test]
    fn signed_wire_has_one_valid_signature() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let tx = transfer_tx(&keypair.pubkey(), &[0xBB; 32], &[0xCC; 32]);
        let signed = sign_transaction(&tx, &keypair, MessageVersion::V0).unwrap();

        assert_eq!(signed.num_signatures().unwrap(), 1);
        assert_eq!(&signed.wire[1..65], &signed.signature[..]);

        let message = signed.message_bytes().unwrap();
        assert_eq!(message, &serialize_message(&tx, MessageVersion::V0).unwrap()[..]);

        let vk = VerifyingKey::from_bytes(&keypair.pubkey()).unwrap();
        assert!(vk
            .verify_strict(message, &Signature::from_bytes(&signed.signature))
            .is_ok());
        assert_eq!(
            bs58::decode(signed.signature_base58()).into_vec().unwrap(),
            signed.signature.to_vec()
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let keypair = Keypair::from_seed(&[0x55; 32]);
        let tx = transfer_tx(&keypair.pubkey(), &[0x77; 32], &[0x99; 32]);
        let a = sign_transaction(&tx, &keypair, MessageVersion::V0).unwrap();
        let b = sign_transaction(&tx, &keypair, MessageVersion::V0).unwrap();
        assert_eq!(a.wire, b.wire);
    }

    #[test]
    fn wrong_signer_is_rejected() {
        let payer = Keypair::from_seed(&[0x11; 32]);
        let other = Keypair::from_seed(&[0x22; 32]);
        let tx = transfer_tx(&payer.pubkey(), &[0xBB; 32], &[0; 32]);

        let err = sign_transaction(&tx, &other, MessageVersion::V0).unwrap_err();
        assert!(err.to_string().contains("not the signing key"));
    }

    #[test]
    fn extra_signer_is_rejected() {
        let payer = Keypair::from_seed(&[0x11; 32]);
        let ix = build_system_transfer(&[0x33; 32], &[0x44; 32], 1);
        let tx = compile_transaction(&[ix], &payer.pubkey(), &[0; 32]).unwrap();
        assert_eq!(tx.num_required_signatures, 2);

        let err = sign_transaction(&tx, &payer, MessageVersion::V0).unwrap_err();
        assert!(err.to_string().contains("requires 2 signatures"));
    }
}
