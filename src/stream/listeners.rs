//! Account subscriptions over the RPC websocket
//!
//! Three program subscriptions feed the runner:
//! - new Raydium v4 pools quoted in the configured token
//! - OpenBook markets quoted in the configured token
//! - token accounts owned by the wallet
//!
//! Each subscription runs in its own task and reconnects until cancelled.

use std::time::Duration;

use futures_util::StreamExt;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Account as TokenAccount;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::amm::program::{
    MARKET_LAYOUT, POOL_LAYOUT, POOL_STATUS_SWAP_ONLY, TOKEN_ACCOUNT_LAYOUT,
};
use crate::amm::{LiquidityStateV4, MinimalMarketState, OPENBOOK_PROGRAM_ID, RAYDIUM_AMM_V4_ID};
use crate::error::{Error, Result};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// An account update from one of the subscriptions
#[derive(Debug, Clone)]
pub enum ListenerEvent {
    Pool { id: Pubkey, state: LiquidityStateV4 },
    Market { id: Pubkey, market: MinimalMarketState },
    Wallet { token_account: Pubkey, account: TokenAccount },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subscription {
    Pools,
    Markets,
    Wallet,
}

impl Subscription {
    fn name(&self) -> &'static str {
        match self {
            Subscription::Pools => "pools",
            Subscription::Markets => "markets",
            Subscription::Wallet => "wallet",
        }
    }
}

/// What to subscribe to
#[derive(Debug, Clone)]
pub struct Listeners {
    ws_url: String,
    commitment: CommitmentConfig,
    quote_mint: Pubkey,
    wallet: Pubkey,
    subscribe_markets: bool,
}

impl Listeners {
    pub fn new(
        ws_url: impl Into<String>,
        commitment: CommitmentConfig,
        quote_mint: Pubkey,
        wallet: Pubkey,
        subscribe_markets: bool,
    ) -> Self {
        Self {
            ws_url: ws_url.into(),
            commitment,
            quote_mint,
            wallet,
            subscribe_markets,
        }
    }

    /// Start every subscription; events arrive on `tx` until `cancel` fires
    pub fn spawn(
        &self,
        tx: mpsc::UnboundedSender<ListenerEvent>,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        let mut kinds = vec![Subscription::Pools, Subscription::Wallet];
        if self.subscribe_markets {
            kinds.push(Subscription::Markets);
        }

        kinds
            .into_iter()
            .map(|kind| {
                let listener = self.clone();
                let tx = tx.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { listener.run(kind, tx, cancel).await })
            })
            .collect()
    }

    async fn run(
        &self,
        kind: Subscription,
        tx: mpsc::UnboundedSender<ListenerEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.stream(kind, &tx) => result,
            };

            match result {
                Ok(()) if tx.is_closed() => break,
                Ok(()) => warn!("{} subscription ended", kind.name()),
                Err(e) => error!("{} subscription error: {}", kind.name(), e),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {
                    warn!("Reconnecting {} subscription in {:?}...", kind.name(), RECONNECT_DELAY);
                }
            }
        }

        info!("{} subscription stopped", kind.name());
    }

    async fn stream(&self, kind: Subscription, tx: &mpsc::UnboundedSender<ListenerEvent>) -> Result<()> {
        let client = PubsubClient::new(&self.ws_url)
            .await
            .map_err(|e| Error::Subscription(format!("connect {}: {}", self.ws_url, e)))?;

        let (program_id, filters) = match kind {
            Subscription::Pools => (*RAYDIUM_AMM_V4_ID, pool_filters(&self.quote_mint)),
            Subscription::Markets => (*OPENBOOK_PROGRAM_ID, market_filters(&self.quote_mint)),
            Subscription::Wallet => (spl_token::id(), wallet_filters(&self.wallet)),
        };

        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let (mut notifications, unsubscribe) = client
            .program_subscribe(&program_id, Some(config))
            .await
            .map_err(|e| Error::Subscription(format!("{} subscribe: {}", kind.name(), e)))?;

        info!("Listening for {} changes", kind.name());

        while let Some(response) = notifications.next().await {
            let keyed = response.value;
            let Ok(id) = keyed.pubkey.parse::<Pubkey>() else {
                warn!("Bad account key in {} update: {}", kind.name(), keyed.pubkey);
                continue;
            };
            let Some(account) = keyed.account.decode::<Account>() else {
                trace!("Undecodable {} update for {}", kind.name(), id);
                continue;
            };

            match decode_event(kind, id, &account.data) {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        debug!("Receiver dropped, closing {} subscription", kind.name());
                        break;
                    }
                }
                Err(e) => trace!("Skipping {} update for {}: {}", kind.name(), id, e),
            }
        }

        unsubscribe().await;
        Ok(())
    }
}

fn decode_event(kind: Subscription, id: Pubkey, data: &[u8]) -> Result<ListenerEvent> {
    Ok(match kind {
        Subscription::Pools => ListenerEvent::Pool {
            id,
            state: LiquidityStateV4::try_from_slice(data)?,
        },
        Subscription::Markets => ListenerEvent::Market {
            id,
            market: MinimalMarketState::try_from_slice(data)?,
        },
        Subscription::Wallet => ListenerEvent::Wallet {
            token_account: id,
            account: TokenAccount::unpack(data)
                .map_err(|e| Error::AccountDecode(format!("token account: {}", e)))?,
        },
    })
}

/// Tradable v4 pools on OpenBook quoted in `quote_mint`
pub fn pool_filters(quote_mint: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::DataSize(POOL_LAYOUT::SIZE as u64),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(POOL_LAYOUT::QUOTE_MINT, quote_mint.as_ref())),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            POOL_LAYOUT::MARKET_PROGRAM_ID,
            OPENBOOK_PROGRAM_ID.as_ref(),
        )),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            POOL_LAYOUT::STATUS,
            &POOL_STATUS_SWAP_ONLY.to_le_bytes(),
        )),
    ]
}

pub fn market_filters(quote_mint: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::DataSize(MARKET_LAYOUT::SIZE as u64),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(MARKET_LAYOUT::QUOTE_MINT, quote_mint.as_ref())),
    ]
}

pub fn wallet_filters(wallet: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::DataSize(TOKEN_ACCOUNT_LAYOUT::SIZE as u64),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(TOKEN_ACCOUNT_LAYOUT::OWNER, wallet.as_ref())),
    ]
}
