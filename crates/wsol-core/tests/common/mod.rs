//! In-memory `LedgerRpc` that records every call.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chain_sol::{decode_compact_u16, Keypair, Pubkey};
use wsol_core::{
    LatestBlockhash, LedgerRpc, RpcError, SendOptions, StatusResponse, SubmitConfig,
};

pub const BLOCKHASH: [u8; 32] = [0xBB; 32];

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LatestBlockhash,
    TokenAccounts { owner: Pubkey, mint: Pubkey },
    Send { options: SendOptions },
    Statuses { signatures: Vec<String> },
}

#[derive(Default)]
pub struct MockRpc {
    pub blockhash_error: bool,
    pub token_accounts: Vec<Pubkey>,
    /// Error returned by `send_transaction`, if any.
    pub send_error: Option<(i64, String)>,
    /// Replies for successive status polls; the last one repeats.
    pub statuses: Mutex<VecDeque<Option<StatusResponse>>>,
    pub calls: Mutex<Vec<Call>>,
    pub sent: Mutex<Vec<Vec<u8>>>,
}

impl MockRpc {
    pub fn with_accounts(token_accounts: Vec<Pubkey>) -> Self {
        Self {
            token_accounts,
            ..Self::default()
        }
    }

    pub fn status_replies(self, replies: Vec<serde_json::Value>) -> Self {
        let parsed = replies
            .into_iter()
            .map(|v| if v.is_null() { None } else { Some(serde_json::from_value(v).unwrap()) })
            .collect();
        *self.statuses.lock().unwrap() = parsed;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sends(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Send { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LedgerRpc for MockRpc {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        self.record(Call::LatestBlockhash);
        if self.blockhash_error {
            return Err(RpcError::InvalidResponse("empty blockhash response".into()));
        }
        Ok(LatestBlockhash {
            blockhash: BLOCKHASH,
            last_valid_block_height: 100,
        })
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>, RpcError> {
        self.record(Call::TokenAccounts {
            owner: *owner,
            mint: *mint,
        });
        Ok(self.token_accounts.clone())
    }

    async fn send_transaction(&self, wire: &[u8], options: &SendOptions) -> Result<String, RpcError> {
        self.record(Call::Send { options: *options });
        if let Some((code, message)) = &self.send_error {
            return Err(RpcError::Rpc {
                code: *code,
                message: message.clone(),
            });
        }
        self.sent.lock().unwrap().push(wire.to_vec());
        Ok(bs58::encode(&wire[1..65]).into_string())
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> Result<Option<StatusResponse>, RpcError> {
        self.record(Call::Statuses {
            signatures: signatures.to_vec(),
        });
        let mut queue = self.statuses.lock().unwrap();
        let reply = if queue.len() > 1 {
            queue.pop_front().flatten()
        } else {
            queue.front().cloned().flatten()
        };
        Ok(reply)
    }
}

pub fn owner() -> Keypair {
    Keypair::from_seed(&[0x42; 32])
}

pub fn fast_submit_config() -> SubmitConfig {
    SubmitConfig {
        confirm_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(1),
        ..SubmitConfig::default()
    }
}

/// A decoded v0 message, enough to check what was submitted.
pub struct DecodedMessage {
    pub num_required_signatures: u8,
    pub account_keys: Vec<Pubkey>,
    pub blockhash: [u8; 32],
    /// (program id, account keys, data) per instruction.
    pub instructions: Vec<(Pubkey, Vec<Pubkey>, Vec<u8>)>,
}

/// Split a wire transaction into its signatures and message, and decode the
/// message.
pub fn decode_wire(wire: &[u8]) -> (Vec<[u8; 64]>, Vec<u8>, DecodedMessage) {
    let (num_sigs, mut pos) = decode_compact_u16(wire).unwrap();
    let signatures: Vec<[u8; 64]> = (0..num_sigs as usize)
        .map(|i| wire[pos + i * 64..pos + (i + 1) * 64].try_into().unwrap())
        .collect();
    pos += num_sigs as usize * 64;
    let message = wire[pos..].to_vec();

    let mut cursor = 0usize;
    assert_eq!(message[cursor], 0x80, "expected a v0 message");
    cursor += 1;
    let num_required_signatures = message[cursor];
    cursor += 3;

    let compact = |cursor: &mut usize| {
        let (value, len) = decode_compact_u16(&message[*cursor..]).unwrap();
        *cursor += len;
        value as usize
    };

    let num_keys = compact(&mut cursor);
    let account_keys: Vec<Pubkey> = (0..num_keys)
        .map(|i| message[cursor + i * 32..cursor + (i + 1) * 32].try_into().unwrap())
        .collect();
    cursor += num_keys * 32;

    let blockhash: [u8; 32] = message[cursor..cursor + 32].try_into().unwrap();
    cursor += 32;

    let num_ixs = compact(&mut cursor);
    let mut instructions = Vec::with_capacity(num_ixs);
    for _ in 0..num_ixs {
        let program = account_keys[message[cursor] as usize];
        cursor += 1;
        let n = compact(&mut cursor);
        let keys: Vec<Pubkey> = message[cursor..cursor + n]
            .iter()
            .map(|&i| account_keys[i as usize])
            .collect();
        cursor += n;
        let len = compact(&mut cursor);
        let data = message[cursor..cursor + len].to_vec();
        cursor += len;
        instructions.push((program, keys, data));
    }

    assert_eq!(compact(&mut cursor), 0, "no lookup tables");
    assert_eq!(cursor, message.len());

    (
        signatures,
        message.clone(),
        DecodedMessage {
            num_required_signatures,
            account_keys,
            blockhash,
            instructions,
        },
    )
}
