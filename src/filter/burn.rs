//! Requires the pool's LP supply to be burned

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::error;

use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;

pub struct BurnFilter {
    rpc: Arc<RpcClient>,
}

impl BurnFilter {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

/// LP supply (raw units, as returned by `getTokenSupply`) counts as burned at zero
fn is_burned(raw_supply: &str) -> bool {
    raw_supply.parse::<u64>().map(|supply| supply == 0).unwrap_or(false)
}

#[async_trait]
impl Filter for BurnFilter {
    fn name(&self) -> &'static str {
        "burn"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        match self.rpc.get_token_supply(&pool.state.lp_mint).await {
            Ok(supply) if is_burned(&supply.amount) => FilterVerdict::pass(),
            Ok(_) => FilterVerdict::fail("Burned -> Creator didn't burn LP"),
            Err(e) => {
                error!("Burned -> Failed to check if LP is burned for {}: {}", pool.base_mint(), e);
                FilterVerdict::fail("Burned -> Failed to check if LP is burned")
            }
        }
    }
}
