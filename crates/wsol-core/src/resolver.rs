use chain_sol::{bytes_to_address, Pubkey};
use tracing::debug;

use crate::error::RpcError;
use crate::rpc::LedgerRpc;

/// Look up an existing token account for `(owner, mint)`.
///
/// Returns the first account the node reports, or `None`. Remote failures are
/// returned unchanged.
pub async fn resolve_token_account<R>(
    rpc: &R,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Option<Pubkey>, RpcError>
where
    R: LedgerRpc + ?Sized,
{
    let accounts = rpc.get_token_accounts_by_owner(owner, mint).await?;
    debug!(
        owner = %bytes_to_address(owner),
        mint = %bytes_to_address(mint),
        found = accounts.len(),
        "token account lookup"
    );
    Ok(accounts.into_iter().next())
}
