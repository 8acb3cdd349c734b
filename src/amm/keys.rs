//! Pool keys: every account a Raydium swap touches

use solana_sdk::pubkey::Pubkey;

use super::accounts::{LiquidityStateV4, MinimalMarketState};
use super::program::{AMM_AUTHORITY_SEED, RAYDIUM_AMM_V4_ID};
use crate::error::{Error, Result};

/// Accounts and parameters for swapping against one pool
#[derive(Debug, Clone, PartialEq)]
pub struct PoolKeys {
    pub id: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    pub program_id: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub target_orders: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub market_program_id: Pubkey,
    pub market_id: Pubkey,
    pub market_authority: Pubkey,
    pub market_base_vault: Pubkey,
    pub market_quote_vault: Pubkey,
    pub market_bids: Pubkey,
    pub market_asks: Pubkey,
    pub market_event_queue: Pubkey,
    /// Swap fee (numerator, denominator)
    pub swap_fee: (u64, u64),
}

impl PoolKeys {
    /// Assemble pool keys from a pool state and its market
    pub fn new(id: Pubkey, state: &LiquidityStateV4, market: &MinimalMarketState) -> Result<Self> {
        let market_authority = market_vault_signer(&state.market_id, &state.market_program_id)?;

        Ok(Self {
            id,
            base_mint: state.base_mint,
            quote_mint: state.quote_mint,
            lp_mint: state.lp_mint,
            base_decimals: state.base_decimals()?,
            quote_decimals: state.quote_decimals()?,
            program_id: *RAYDIUM_AMM_V4_ID,
            authority: amm_authority(),
            open_orders: state.open_orders,
            target_orders: state.target_orders,
            base_vault: state.base_vault,
            quote_vault: state.quote_vault,
            market_program_id: state.market_program_id,
            market_id: state.market_id,
            market_authority,
            // Raydium v4 does not read the market vaults, the pool vaults stand in
            market_base_vault: state.base_vault,
            market_quote_vault: state.quote_vault,
            market_bids: market.bids,
            market_asks: market.asks,
            market_event_queue: market.event_queue,
            swap_fee: state.swap_fee(),
        })
    }
}

/// The PDA that owns every v4 pool vault
pub fn amm_authority() -> Pubkey {
    Pubkey::find_program_address(&[AMM_AUTHORITY_SEED], &RAYDIUM_AMM_V4_ID).0
}

/// OpenBook vault signer: first nonce whose address falls off the curve
pub fn market_vault_signer(market_id: &Pubkey, market_program_id: &Pubkey) -> Result<Pubkey> {
    for nonce in 0u64..100 {
        let nonce_bytes = nonce.to_le_bytes();
        let seeds: [&[u8]; 2] = [market_id.as_ref(), &nonce_bytes];
        if let Ok(address) = Pubkey::create_program_address(&seeds, market_program_id) {
            return Ok(address);
        }
    }

    Err(Error::InvalidProgramAddress(format!(
        "No vault signer nonce found for market {}",
        market_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::program::OPENBOOK_PROGRAM_ID;

    #[test]
    fn test_amm_authority_is_well_known() {
        assert_eq!(
            amm_authority().to_string(),
            "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1"
        );
    }

    #[test]
    fn test_pool_keys_from_state() {
        let market_id = Pubkey::new_unique();
        let state = LiquidityStateV4 {
            base_decimal: 6,
            quote_decimal: 9,
            base_mint: Pubkey::new_unique(),
            quote_mint: Pubkey::new_unique(),
            base_vault: Pubkey::new_unique(),
            quote_vault: Pubkey::new_unique(),
            market_id,
            market_program_id: *OPENBOOK_PROGRAM_ID,
            ..Default::default()
        };
        let market = MinimalMarketState {
            event_queue: Pubkey::new_unique(),
            bids: Pubkey::new_unique(),
            asks: Pubkey::new_unique(),
        };
        let id = Pubkey::new_unique();

        let keys = PoolKeys::new(id, &state, &market).unwrap();
        assert_eq!(keys.id, id);
        assert_eq!(keys.base_decimals, 6);
        assert_eq!(keys.market_bids, market.bids);
        assert_eq!(keys.market_base_vault, state.base_vault);
        assert_eq!(
            keys.market_authority,
            market_vault_signer(&market_id, &OPENBOOK_PROGRAM_ID).unwrap()
        );
    }

    #[test]
    fn test_pool_keys_reject_truncated_decimals() {
        let state = LiquidityStateV4 {
            base_decimal: 262,
            market_id: Pubkey::new_unique(),
            market_program_id: *OPENBOOK_PROGRAM_ID,
            ..Default::default()
        };

        assert!(PoolKeys::new(Pubkey::new_unique(), &state, &MinimalMarketState::default()).is_err());
    }
}
