//! Raydium AMM v4 / OpenBook program constants
//!
//! # WARNING: These constants may change without notice
//! Raydium has shipped new AMM versions before. If subscriptions stop
//! producing pools or swaps start failing, check these ids and offsets.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Raydium liquidity pool v4 program ID
pub const RAYDIUM_AMM_V4_ID_STR: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// OpenBook (Serum v3 fork) market program ID
pub const OPENBOOK_PROGRAM_ID_STR: &str = "srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX";

/// Metaplex token metadata program ID
pub const METADATA_PROGRAM_ID_STR: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

lazy_static::lazy_static! {
    /// Raydium AMM v4 program ID as Pubkey
    pub static ref RAYDIUM_AMM_V4_ID: Pubkey =
        Pubkey::from_str(RAYDIUM_AMM_V4_ID_STR).expect("Invalid Raydium program ID");

    /// OpenBook program ID as Pubkey
    pub static ref OPENBOOK_PROGRAM_ID: Pubkey =
        Pubkey::from_str(OPENBOOK_PROGRAM_ID_STR).expect("Invalid OpenBook program ID");

    /// Metaplex metadata program ID as Pubkey
    pub static ref METADATA_PROGRAM_ID: Pubkey =
        Pubkey::from_str(METADATA_PROGRAM_ID_STR).expect("Invalid metadata program ID");
}

/// Seed of the AMM authority PDA shared by every v4 pool
pub const AMM_AUTHORITY_SEED: &[u8] = b"amm authority";

/// `swap_base_in` instruction tag
pub const SWAP_BASE_IN_TAG: u8 = 9;

/// Raydium charges 25 bps on every swap
pub const DEFAULT_SWAP_FEE_NUMERATOR: u64 = 25;
pub const DEFAULT_SWAP_FEE_DENOMINATOR: u64 = 10_000;

/// Pool status of a tradable AMM (`status` field of the pool state)
pub const POOL_STATUS_SWAP_ONLY: u64 = 6;

/// Byte layout of `LiquidityStateV4` used by subscription filters
#[allow(non_snake_case)]
pub mod POOL_LAYOUT {
    pub const SIZE: usize = 752;
    pub const STATUS: usize = 0;
    pub const POOL_OPEN_TIME: usize = 224;
    pub const BASE_VAULT: usize = 336;
    pub const QUOTE_VAULT: usize = 368;
    pub const BASE_MINT: usize = 400;
    pub const QUOTE_MINT: usize = 432;
    pub const LP_MINT: usize = 464;
    pub const MARKET_ID: usize = 528;
    pub const MARKET_PROGRAM_ID: usize = 560;
    pub const OWNER: usize = 688;
}

/// Byte layout of the OpenBook `MarketStateV3` fields we read
#[allow(non_snake_case)]
pub mod MARKET_LAYOUT {
    pub const SIZE: usize = 388;
    pub const BASE_MINT: usize = 53;
    pub const QUOTE_MINT: usize = 85;
    pub const EVENT_QUEUE: usize = 253;
    pub const BIDS: usize = 285;
    pub const ASKS: usize = 317;
}

/// Byte layout of an SPL token account used by the wallet subscription
#[allow(non_snake_case)]
pub mod TOKEN_ACCOUNT_LAYOUT {
    pub const SIZE: usize = 165;
    pub const OWNER: usize = 32;
}

/// Jito tip accounts - use one of these for bundle tips
/// Tip should be in the LAST transaction of your bundle
/// Do NOT use Address Lookup Tables for tip accounts
pub const JITO_TIP_ACCOUNTS: [&str; 8] = [
    "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5",
    "HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe",
    "Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY",
    "ADaUMid9yfUytqMBgopwjb2DTLSokTSzL1zt6iGPaS49",
    "DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh",
    "ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt",
    "DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL",
    "3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT",
];

/// Get a random Jito tip account
pub fn get_random_tip_account() -> Option<Pubkey> {
    use rand::seq::SliceRandom;
    JITO_TIP_ACCOUNTS
        .choose(&mut rand::thread_rng())
        .and_then(|s| Pubkey::from_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids() {
        assert_eq!(RAYDIUM_AMM_V4_ID.to_string(), RAYDIUM_AMM_V4_ID_STR);
        assert_eq!(OPENBOOK_PROGRAM_ID.to_string(), OPENBOOK_PROGRAM_ID_STR);
        assert_eq!(METADATA_PROGRAM_ID.to_string(), METADATA_PROGRAM_ID_STR);
    }

    #[test]
    fn test_random_tip_account_is_known() {
        let tip = get_random_tip_account().unwrap();
        assert!(JITO_TIP_ACCOUNTS.contains(&tip.to_string().as_str()));
    }

    #[test]
    fn test_pool_layout_offsets_are_consistent() {
        // 12 pubkeys follow the vaults; the record ends with lp_reserve + padding
        assert_eq!(POOL_LAYOUT::QUOTE_VAULT - POOL_LAYOUT::BASE_VAULT, 32);
        assert_eq!(POOL_LAYOUT::OWNER + 32 + 8 + 24, POOL_LAYOUT::SIZE);
    }
}
