//! Instruction lists for wrapping and unwrapping native SOL.

use chain_sol::{
    build_close_account, build_create_associated_token_account, build_sync_native,
    build_system_transfer, set_compute_unit_limit, set_compute_unit_price, Pubkey, SolError,
    SolInstruction, NATIVE_MINT,
};

use crate::config::ComputeBudget;

/// Instructions for one wrap.
#[derive(Debug, Clone)]
pub struct WrapPlan {
    /// The account receiving the lamports.
    pub token_account: Pubkey,
    /// Whether the plan creates `token_account` first.
    pub created: bool,
    pub instructions: Vec<SolInstruction>,
}

/// Instructions for one unwrap.
#[derive(Debug, Clone)]
pub struct UnwrapPlan {
    pub token_account: Pubkey,
    pub instructions: Vec<SolInstruction>,
}

/// Compose a wrap of `lamports` into the owner's wrapped-SOL account.
///
/// Order: [create associated account], unit price, unit limit, transfer,
/// sync native. The create step is present only when `existing` is `None`.
pub fn compose_wrap(
    owner: &Pubkey,
    existing: Option<Pubkey>,
    lamports: u64,
    budget: &ComputeBudget,
) -> Result<WrapPlan, SolError> {
    let mut instructions = Vec::with_capacity(5);

    let (token_account, created) = match existing {
        Some(account) => (account, false),
        None => {
            let (account, create) = build_create_associated_token_account(owner, owner, &NATIVE_MINT)?;
            instructions.push(create);
            (account, true)
        }
    };

    instructions.push(set_compute_unit_price(budget.unit_price_micro_lamports));
    instructions.push(set_compute_unit_limit(budget.unit_limit));
    instructions.push(build_system_transfer(owner, &token_account, lamports));
    instructions.push(build_sync_native(&token_account));

    Ok(WrapPlan {
        token_account,
        created,
        instructions,
    })
}

/// Compose closing the owner's wrapped-SOL account.
///
/// `None` when there is no account: nothing to unwrap.
pub fn compose_unwrap(owner: &Pubkey, existing: Option<Pubkey>) -> Option<UnwrapPlan> {
    existing.map(|token_account| UnwrapPlan {
        token_account,
        instructions: vec![build_close_account(&token_account, owner, owner)],
    })
}
