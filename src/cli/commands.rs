//! CLI command implementations

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::amm::RpcQuoteEngine;
use crate::bot::{Collaborators, Holding, PoolCandidate, TradeController};
use crate::cache::{
    MarketCache, MarketDirectory, PoolCache, PoolDirectory, PoolRecord, SnipeAllowList, SnipeListCache,
};
use crate::config::Config;
use crate::error::Error;
use crate::filter::PoolFilters;
use crate::interrupt::{spawn_stdin_listener, InterruptFlag};
use crate::notify::{LogNotifier, NotificationSink, TelegramNotifier};
use crate::stream::{ListenerEvent, Listeners};
use crate::trading::build_executor;

/// Start the sniper bot
pub async fn start(config: &Config, dry_run: bool) -> Result<()> {
    let mut config = config.clone();
    if dry_run {
        warn!("Running in DRY-RUN mode - no real trades will be executed");
        config.buy.auto_buy = false;
        config.sell.simulate_sell = true;
    }

    info!("Starting Raydium sniper bot...");

    let wallet = Arc::new(load_keypair()?);
    info!("Loaded keypair: {}", wallet.pubkey());

    let commitment = parse_commitment(&config.rpc.commitment)?;
    let rpc = Arc::new(RpcClient::new_with_timeout_and_commitment(
        config.rpc.endpoint.clone(),
        Duration::from_millis(config.rpc.timeout_ms),
        commitment,
    ));

    let trade_config = config.trade_config(&wallet.pubkey())?;
    info!(
        "Quote: {} {} | auto buy: {} | auto sell: {} | simulate sell: {}",
        config.trading.quote_amount,
        trade_config.quote_token.symbol,
        trade_config.auto_buy,
        trade_config.auto_sell,
        trade_config.simulate_sell
    );

    let cancel = CancellationToken::new();
    let pools = Arc::new(PoolCache::new());
    let markets = Arc::new(MarketCache::new(Some(Arc::clone(&rpc))));

    let snipe_list: Arc<dyn SnipeAllowList> = if config.snipe_list.enabled {
        let list = Arc::new(
            SnipeListCache::load(&config.snipe_list.path)
                .with_context(|| format!("Failed to load snipe list {}", config.snipe_list.path))?,
        );
        info!("Loaded {} snipe list entries", list.len());
        if config.snipe_list.refresh_interval_ms > 0 {
            list.spawn_refresh(Duration::from_millis(config.snipe_list.refresh_interval_ms), cancel.clone());
        }
        list
    } else {
        Arc::new(HashSet::<Pubkey>::new())
    };

    let filters = PoolFilters::from_config(Arc::clone(&rpc), &config.filters, &trade_config.quote_token)?;
    info!("{} admission filters active", filters.len());

    let notifier: Arc<dyn NotificationSink> = if config.telegram.enabled {
        let (telegram, _worker) =
            TelegramNotifier::spawn(config.telegram.bot_token.clone(), config.telegram.chat_id.clone())?;
        info!("Telegram notifications enabled");
        Arc::new(telegram)
    } else {
        Arc::new(LogNotifier)
    };

    let interrupt = InterruptFlag::new();
    spawn_stdin_listener(interrupt.clone());
    info!("Press Enter to sell the current position at market");

    let executor = build_executor(&config.executor, Arc::clone(&rpc))?;
    info!("Using {:?} executor", config.executor.kind);

    let router = EventRouter {
        pools,
        markets,
        quote_mint: trade_config.quote_token.mint,
        started_at: chrono::Utc::now().timestamp().max(0) as u64,
        auto_sell: trade_config.auto_sell,
    };
    let (pool_directory, market_directory) = router.directories();

    let controller = Arc::new(TradeController::new(
        trade_config.clone(),
        Arc::clone(&wallet),
        Collaborators {
            pools: pool_directory,
            markets: market_directory,
            snipe_list,
            filters: Arc::new(filters),
            quotes: Arc::new(RpcQuoteEngine::new(Arc::clone(&rpc))),
            executor,
            notifier,
            interrupt: Arc::new(interrupt),
        },
    ));

    let paper_trade = !trade_config.auto_buy && trade_config.simulate_sell;

    let listeners = Listeners::new(
        config.rpc.ws_endpoint.clone(),
        commitment,
        trade_config.quote_token.mint,
        wallet.pubkey(),
        config.trading.cache_new_markets,
    );
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let handles = listeners.spawn(event_tx, cancel.clone());
    info!("Bot is running! Press CTRL + C to stop it.");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
            event = event_rx.recv() => {
                let Some(event) = event else {
                    warn!("All listeners stopped");
                    break;
                };

                match router.route(event) {
                    Some(RunnerAction::Buy(candidate)) => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            if controller.buy(&candidate).await && paper_trade {
                                if let Err(e) = controller.simulate_sell(&candidate).await {
                                    error!("Simulated sell of {} failed: {}", candidate.base_mint, e);
                                }
                            }
                        });
                    }
                    Some(RunnerAction::Sell(holding)) => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move { controller.sell(&holding).await });
                    }
                    None => {}
                }
            }
        }
    }

    cancel.cancel();
    for handle in handles {
        if let Err(e) = handle.await {
            debug!("Listener task ended abnormally: {}", e);
        }
    }

    info!("Sniper bot stopped");
    Ok(())
}

/// Work the runner hands to the trade controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerAction {
    Buy(PoolCandidate),
    Sell(Holding),
}

/// Feeds listener events into the caches and picks trades to start
pub struct EventRouter {
    pub pools: Arc<PoolCache>,
    pub markets: Arc<MarketCache>,
    pub quote_mint: Pubkey,
    /// Unix seconds; only pools opening after this are bought
    pub started_at: u64,
    pub auto_sell: bool,
}

impl EventRouter {
    /// The caches this router feeds, as the controller reads them
    pub fn directories(&self) -> (Arc<dyn PoolDirectory>, Arc<dyn MarketDirectory>) {
        let pools: Arc<dyn PoolDirectory> = self.pools.clone();
        let markets: Arc<dyn MarketDirectory> = self.markets.clone();
        (pools, markets)
    }

    pub fn route(&self, event: ListenerEvent) -> Option<RunnerAction> {
        match event {
            ListenerEvent::Market { id, market } => {
                self.markets.save(id, market);
                None
            }
            ListenerEvent::Pool { id, state } => {
                if state.pool_open_time <= self.started_at {
                    trace!("Ignoring pool {} opened before start-up", id);
                    return None;
                }

                let record = PoolRecord::new(id, None, state);
                let candidate = match PoolCandidate::from_record(&record) {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        warn!("Ignoring pool {}: {}", id, e);
                        return None;
                    }
                };
                if !self.pools.save(record.id, record.minter, record.state) {
                    return None;
                }

                debug!("New pool {} for {}", id, candidate.base_mint);
                Some(RunnerAction::Buy(candidate))
            }
            ListenerEvent::Wallet { token_account, account } => {
                if account.mint == self.quote_mint || !self.auto_sell {
                    return None;
                }

                Some(RunnerAction::Sell(Holding {
                    mint: account.mint,
                    token_account,
                    raw_amount: account.amount,
                }))
            }
        }
    }
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Check the wallet can trade with this configuration
pub async fn validate(config: &Config) -> Result<()> {
    let wallet = load_keypair()?;
    let trade_config = config.trade_config(&wallet.pubkey())?;
    let symbol = trade_config.quote_token.symbol;

    let rpc = RpcClient::new_with_timeout(config.rpc.endpoint.clone(), Duration::from_millis(config.rpc.timeout_ms));
    let balance = rpc
        .get_token_account_balance(&trade_config.quote_account)
        .await
        .with_context(|| format!("No {} token account found in wallet: {}", symbol, wallet.pubkey()))?;

    println!("Wallet: {}", wallet.pubkey());
    println!("{} account: {} (balance: {})", symbol, trade_config.quote_account, balance.ui_amount_string);

    let raw_balance: u64 = balance.amount.parse().unwrap_or(0);
    if raw_balance < trade_config.quote_amount {
        println!(
            "WARNING: balance is below the configured quote amount ({} {})",
            config.trading.quote_amount, symbol
        );
    }

    println!("Configuration OK");
    Ok(())
}

fn parse_commitment(commitment: &str) -> Result<CommitmentConfig> {
    CommitmentConfig::from_str(commitment)
        .map_err(|_| anyhow::anyhow!("Invalid commitment level: {}", commitment))
}

/// Wallet keypair from `KEYPAIR_PATH` (JSON bytes) or `PRIVATE_KEY` (base58)
pub fn load_keypair() -> crate::error::Result<Keypair> {
    if let Ok(path) = std::env::var("KEYPAIR_PATH") {
        return keypair_from_file(Path::new(&path));
    }

    if let Ok(secret) = std::env::var("PRIVATE_KEY") {
        return keypair_from_base58(&secret);
    }

    Err(Error::MissingEnvVar("KEYPAIR_PATH or PRIVATE_KEY".into()))
}

pub fn keypair_from_file(path: &Path) -> crate::error::Result<Keypair> {
    check_permissions(path)?;

    let data = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidKeypair(format!("Cannot read keypair file {}: {}", path.display(), e)))?;
    let bytes: Vec<u8> = serde_json::from_str(&data)
        .map_err(|e| Error::InvalidKeypair(format!("{}: {}", path.display(), e)))?;

    Keypair::from_bytes(&bytes).map_err(|e| Error::InvalidKeypair(e.to_string()))
}

pub fn keypair_from_base58(secret: &str) -> crate::error::Result<Keypair> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|e| Error::InvalidKeypair(format!("PRIVATE_KEY is not base58: {}", e)))?;

    Keypair::from_bytes(&bytes).map_err(|e| Error::InvalidKeypair(e.to_string()))
}

/// Refuse keypair files readable by group or others
#[cfg(unix)]
fn check_permissions(path: &Path) -> crate::error::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)
        .map_err(|e| Error::InvalidKeypair(format!("Cannot read keypair file {}: {}", path.display(), e)))?
        .permissions()
        .mode();

    if mode & 0o077 != 0 {
        return Err(Error::InsecureKeypair(format!(
            "{} has mode {:o}. Run 'chmod 600 {}' to fix",
            path.display(),
            mode & 0o777,
            path.display()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> crate::error::Result<()> {
    Ok(())
}
