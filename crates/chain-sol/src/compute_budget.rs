//! Compute Budget program directives.
//!
//! Both instructions take no accounts; the payload is a one-byte tag followed
//! by a little-endian integer.

use crate::address::Pubkey;
use crate::transaction::SolInstruction;

/// Compute Budget Program ID: `ComputeBudget111111111111111111111111111111`
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey = [
    0x03, 0x06, 0x46, 0x6f, 0xe5, 0x21, 0x17, 0x32, 0xff, 0xec, 0xad, 0xba, 0x72, 0xc3, 0x9b,
    0xe7, 0xbc, 0x8c, 0xe5, 0xbb, 0xc5, 0xf7, 0x12, 0x6b, 0x2c, 0x43, 0x9b, 0x3a, 0x40, 0x00,
    0x00, 0x00,
];

const SET_COMPUTE_UNIT_LIMIT: u8 = 2;
const SET_COMPUTE_UNIT_PRICE: u8 = 3;

/// Cap the compute units the transaction may consume.
pub fn set_compute_unit_limit(units: u32) -> SolInstruction {
    let mut data = Vec::with_capacity(5);
    data.push(SET_COMPUTE_UNIT_LIMIT);
    data.extend_from_slice(&units.to_le_bytes());

    SolInstruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}

/// Set the priority fee, in micro-lamports per compute unit.
pub fn set_compute_unit_price(micro_lamports: u64) -> SolInstruction {
    let mut data = Vec::with_capacity(9);
    data.push(SET_COMPUTE_UNIT_PRICE);
    data.extend_from_slice(&micro_lamports.to_le_bytes());

    SolInstruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address;

    #[test]
    fn program_id_roundtrip() {
        assert_eq!(
            address::bytes_to_address(&COMPUTE_BUDGET_PROGRAM_ID),
            "ComputeBudget111111111111111111111111111111"
        );
    }

    #[test]
    fn unit_limit_encoding() {
        let ix = set_compute_unit_limit(200_000);
        assert!(ix.accounts.is_empty());
        assert_eq!(ix.data[0], 2);
        assert_eq!(u32::from_le_bytes(ix.data[1..5].try_into().unwrap()), 200_000);
        assert_eq!(ix.data.len(), 5);
    }

    #[test]
    fn unit_price_encoding() {
        let ix = set_compute_unit_price(1_000_000);
        assert!(ix.accounts.is_empty());
        assert_eq!(ix.data[0], 3);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 1_000_000);
        assert_eq!(ix.data.len(), 9);
    }
}
