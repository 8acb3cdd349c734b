//! Requires revoked mint and/or freeze authority on the base mint

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::program_pack::Pack;
use spl_token::state::Mint;
use tracing::error;

use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;

pub struct RenouncedFreezeFilter {
    rpc: Arc<RpcClient>,
    check_renounced: bool,
    check_freezable: bool,
}

impl RenouncedFreezeFilter {
    pub fn new(rpc: Arc<RpcClient>, check_renounced: bool, check_freezable: bool) -> Self {
        Self {
            rpc,
            check_renounced,
            check_freezable,
        }
    }

    /// Judge a decoded mint against the enabled checks
    fn check(&self, mint: &Mint) -> FilterVerdict {
        let mut problems = Vec::new();

        if self.check_renounced && mint.mint_authority.is_some() {
            problems.push("mint more");
        }
        if self.check_freezable && mint.freeze_authority.is_some() {
            problems.push("freeze");
        }

        if problems.is_empty() {
            FilterVerdict::pass()
        } else {
            FilterVerdict::fail(format!(
                "RenouncedFreeze -> Creator can {} tokens",
                problems.join(" and ")
            ))
        }
    }
}

#[async_trait]
impl Filter for RenouncedFreezeFilter {
    fn name(&self) -> &'static str {
        "renounced_freeze"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        let mint = pool.base_mint();

        let account = match self.rpc.get_account(&mint).await {
            Ok(account) => account,
            Err(e) => {
                error!("RenouncedFreeze -> Failed to fetch mint {}: {}", mint, e);
                return FilterVerdict::fail("RenouncedFreeze -> Failed to fetch account data");
            }
        };

        match Mint::unpack(&account.data) {
            Ok(decoded) => self.check(&decoded),
            Err(e) => {
                error!("RenouncedFreeze -> Failed to decode mint {}: {}", mint, e);
                FilterVerdict::fail("RenouncedFreeze -> Failed to check mint and freeze authority")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spl_token::solana_program::program_option::COption;
    use solana_sdk::pubkey::Pubkey;

    fn filter(check_renounced: bool, check_freezable: bool) -> RenouncedFreezeFilter {
        let rpc = Arc::new(RpcClient::new("http://127.0.0.1:8899".to_string()));
        RenouncedFreezeFilter::new(rpc, check_renounced, check_freezable)
    }

    fn mint(mint_authority: bool, freeze_authority: bool) -> Mint {
        Mint {
            mint_authority: if mint_authority { COption::Some(Pubkey::new_unique()) } else { COption::None },
            supply: 1_000_000,
            decimals: 6,
            is_initialized: true,
            freeze_authority: if freeze_authority { COption::Some(Pubkey::new_unique()) } else { COption::None },
        }
    }

    #[test]
    fn test_revoked_authorities_pass() {
        assert!(filter(true, true).check(&mint(false, false)).pass);
    }

    #[test]
    fn test_reports_both_authorities() {
        let verdict = filter(true, true).check(&mint(true, true));
        assert!(!verdict.pass);
        assert_eq!(
            verdict.reason_or_default(),
            "RenouncedFreeze -> Creator can mint more and freeze tokens"
        );
    }

    #[test]
    fn test_disabled_check_is_ignored() {
        assert!(filter(false, true).check(&mint(true, false)).pass);
        assert!(!filter(false, true).check(&mint(false, true)).pass);
    }
}
