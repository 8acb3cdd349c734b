//! Requires the pool's LP minter to be on an allowed list

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::UiTransactionEncoding;
use tracing::{error, trace};

use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;
use crate::error::{Error, Result};

pub struct MintersFilter {
    rpc: Arc<RpcClient>,
    allowed: HashSet<Pubkey>,
}

impl MintersFilter {
    pub fn new(rpc: Arc<RpcClient>, minters: &[String]) -> Result<Self> {
        let allowed = minters
            .iter()
            .map(|m| {
                Pubkey::from_str(m).map_err(|e| Error::Config(format!("Invalid minter {}: {}", m, e)))
            })
            .collect::<Result<HashSet<_>>>()?;

        Ok(Self { rpc, allowed })
    }

    /// Owner of the second pre-token balance in the LP mint's latest transaction
    ///
    /// For a freshly initialised pool that is the wallet the LP supply was minted to.
    async fn lookup_minter(&self, lp_mint: &Pubkey) -> Result<Option<Pubkey>> {
        let signatures = self.rpc.get_signatures_for_address(lp_mint).await?;
        let Some(latest) = signatures.first() else {
            return Ok(None);
        };

        let signature = Signature::from_str(&latest.signature)
            .map_err(|e| Error::Rpc(format!("Bad signature {}: {}", latest.signature, e)))?;
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.rpc.commitment()),
            max_supported_transaction_version: Some(0),
        };
        let transaction = self.rpc.get_transaction_with_config(&signature, config).await?;

        let owner = transaction
            .transaction
            .meta
            .and_then(|meta| Option::<Vec<_>>::from(meta.pre_token_balances))
            .and_then(|balances| balances.into_iter().nth(1))
            .and_then(|balance| Option::<String>::from(balance.owner))
            .and_then(|owner| Pubkey::from_str(&owner).ok());

        Ok(owner)
    }

    async fn resolve_minter(&self, pool: &PoolRecord) -> Result<Option<Pubkey>> {
        match pool.minter {
            Some(minter) => Ok(Some(minter)),
            None => self.lookup_minter(&pool.state.lp_mint).await,
        }
    }

    fn check(&self, minter: Option<Pubkey>) -> FilterVerdict {
        match minter {
            None => FilterVerdict::fail("CheckMinters -> Failed get LP token owner"),
            Some(minter) if self.allowed.contains(&minter) => FilterVerdict::pass(),
            Some(_) => FilterVerdict::fail("CheckMinters -> Minter not found"),
        }
    }
}

#[async_trait]
impl Filter for MintersFilter {
    fn name(&self) -> &'static str {
        "minters"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        match self.resolve_minter(pool).await {
            Ok(minter) => {
                trace!("Minter of {}: {:?}", pool.base_mint(), minter);
                self.check(minter)
            }
            Err(e) => {
                error!("CheckMinters -> Failed to check minter for {}: {}", pool.base_mint(), e);
                FilterVerdict::fail("CheckMinters -> Failed to check minters")
            }
        }
    }
}
