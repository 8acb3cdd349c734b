//! Raydium swap instruction building
//!
//! Only the instruction list is built here. Compute budget, tips, blockhash
//! and signing belong to the transaction executor.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use super::keys::PoolKeys;
use super::program::SWAP_BASE_IN_TAG;
use crate::error::{Error, Result};

/// Build a `swap_base_in` instruction (fixed input, minimum output)
pub fn swap_base_in(
    keys: &PoolKeys,
    user_source: &Pubkey,
    user_destination: &Pubkey,
    owner: &Pubkey,
    amount_in: u64,
    min_amount_out: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(17);
    data.push(SWAP_BASE_IN_TAG);
    data.extend_from_slice(&amount_in.to_le_bytes());
    data.extend_from_slice(&min_amount_out.to_le_bytes());

    // Order matters! Must match the v4 program's 18-account swap layout
    let accounts = vec![
        AccountMeta::new_readonly(spl_token::ID, false),          // token_program
        AccountMeta::new(keys.id, false),                         // amm
        AccountMeta::new_readonly(keys.authority, false),         // amm_authority
        AccountMeta::new(keys.open_orders, false),                // amm_open_orders
        AccountMeta::new(keys.target_orders, false),              // amm_target_orders
        AccountMeta::new(keys.base_vault, false),                 // pool_coin_vault
        AccountMeta::new(keys.quote_vault, false),                // pool_pc_vault
        AccountMeta::new_readonly(keys.market_program_id, false), // serum_program
        AccountMeta::new(keys.market_id, false),                  // serum_market
        AccountMeta::new(keys.market_bids, false),                // serum_bids
        AccountMeta::new(keys.market_asks, false),                // serum_asks
        AccountMeta::new(keys.market_event_queue, false),         // serum_event_queue
        AccountMeta::new(keys.market_base_vault, false),          // serum_coin_vault
        AccountMeta::new(keys.market_quote_vault, false),         // serum_pc_vault
        AccountMeta::new_readonly(keys.market_authority, false),  // serum_vault_signer
        AccountMeta::new(*user_source, false),                    // user_source
        AccountMeta::new(*user_destination, false),               // user_destination
        AccountMeta::new_readonly(*owner, true),                  // user_owner (signer)
    ];

    Instruction {
        program_id: keys.program_id,
        accounts,
        data,
    }
}

/// Instructions for buying the base token with the quote token
///
/// Creates the base token account idempotently so a retry after a partial
/// landing does not fail on an existing account.
pub fn buy_instructions(
    keys: &PoolKeys,
    quote_account: &Pubkey,
    owner: &Pubkey,
    amount_in: u64,
    min_amount_out: u64,
) -> Vec<Instruction> {
    let base_account = derive_ata(owner, &keys.base_mint);

    vec![
        spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            owner,
            owner,
            &keys.base_mint,
            &spl_token::ID,
        ),
        swap_base_in(keys, quote_account, &base_account, owner, amount_in, min_amount_out),
    ]
}

/// Instructions for selling a base token account back to the quote token
///
/// The emptied token account is closed to reclaim its rent.
pub fn sell_instructions(
    keys: &PoolKeys,
    token_account: &Pubkey,
    quote_account: &Pubkey,
    owner: &Pubkey,
    amount_in: u64,
    min_amount_out: u64,
) -> Result<Vec<Instruction>> {
    let close = spl_token::instruction::close_account(&spl_token::ID, token_account, owner, owner, &[])
        .map_err(|e| Error::TransactionBuild(format!("close_account: {}", e)))?;

    Ok(vec![
        swap_base_in(keys, token_account, quote_account, owner, amount_in, min_amount_out),
        close,
    ])
}

/// Derive associated token account address
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(wallet, mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::accounts::{LiquidityStateV4, MinimalMarketState};
    use crate::amm::program::OPENBOOK_PROGRAM_ID;

    fn test_keys() -> PoolKeys {
        let state = LiquidityStateV4 {
            base_mint: Pubkey::new_unique(),
            quote_mint: Pubkey::new_unique(),
            market_id: Pubkey::new_unique(),
            market_program_id: *OPENBOOK_PROGRAM_ID,
            ..Default::default()
        };
        PoolKeys::new(Pubkey::new_unique(), &state, &MinimalMarketState::default()).unwrap()
    }

    #[test]
    fn test_swap_base_in_layout() {
        let keys = test_keys();
        let owner = Pubkey::new_unique();
        let ix = swap_base_in(&keys, &Pubkey::new_unique(), &Pubkey::new_unique(), &owner, 1_000, 900);

        assert_eq!(ix.accounts.len(), 18);
        assert_eq!(ix.data[0], SWAP_BASE_IN_TAG);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 1_000);
        assert_eq!(u64::from_le_bytes(ix.data[9..17].try_into().unwrap()), 900);

        let signer = ix.accounts.last().unwrap();
        assert_eq!(signer.pubkey, owner);
        assert!(signer.is_signer);
    }

    #[test]
    fn test_buy_creates_base_account_first() {
        let keys = test_keys();
        let owner = Pubkey::new_unique();
        let ixs = buy_instructions(&keys, &Pubkey::new_unique(), &owner, 10, 5);

        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, spl_associated_token_account::ID);
        assert_eq!(ixs[1].accounts[16].pubkey, derive_ata(&owner, &keys.base_mint));
    }

    #[test]
    fn test_sell_closes_token_account() {
        let keys = test_keys();
        let owner = Pubkey::new_unique();
        let token_account = Pubkey::new_unique();
        let ixs = sell_instructions(&keys, &token_account, &Pubkey::new_unique(), &owner, 10, 5).unwrap();

        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[1].program_id, spl_token::ID);
        assert_eq!(ixs[1].accounts[0].pubkey, token_account);
    }
}
