//! Trade controller
//!
//! Sequences one buy or one sell from start to finish: snipe-list and
//! concurrency gating, pool resolution, debounced admission, the price
//! monitor, and bounded retrying submission. Every collaborator is reached
//! through a trait so the whole flow runs against scripted doubles in tests.
//!
//! `buy` and `sell` never fail: every outcome is logged and reported through
//! the notification sink. `try_buy` and `try_sell` expose the typed outcome.

pub mod debounce;
pub mod gate;
pub mod monitor;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use tracing::{debug, error, info, trace, warn};

use crate::amm::instruction::{buy_instructions, derive_ata, sell_instructions};
use crate::amm::{PoolKeys, QuoteEngine, SwapDirection};
use crate::cache::{MarketDirectory, PoolDirectory, PoolRecord, SnipeAllowList};
use crate::config::TradeConfig;
use crate::error::Result;
use crate::filter::AdmissionFilterPipeline;
use crate::interrupt::OperatorInterruptSource;
use crate::notify::{NotificationSink, TradeEvent};
use crate::trading::{SubmissionResult, TransactionExecutor};

use debounce::{debounce_admission, Admission};
use gate::{ConcurrencyGate, GateRefusal};
use monitor::{ExitThresholds, PriceMonitor};
use retry::{submit_with_retry, RetryOutcome};

pub use monitor::ExitTrigger;

/// A newly detected pool, as seen by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCandidate {
    pub pool_id: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub market_id: Pubkey,
    pub lp_mint: Pubkey,
    pub base_decimals: u8,
    /// Pool owner; matched against the snipe list
    pub owner_authority: Pubkey,
}

impl PoolCandidate {
    pub fn from_record(record: &PoolRecord) -> Result<Self> {
        Ok(Self {
            pool_id: record.id,
            base_mint: record.state.base_mint,
            quote_mint: record.state.quote_mint,
            market_id: record.state.market_id,
            lp_mint: record.state.lp_mint,
            base_decimals: record.state.base_decimals()?,
            owner_authority: record.state.owner,
        })
    }
}

/// A token balance the wallet holds and may sell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub mint: Pubkey,
    pub token_account: Pubkey,
    /// Raw token units
    pub raw_amount: u64,
}

/// Why a buy stopped before submitting anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotInSnipeList,
    BuyInProgress,
    SellInProgress,
    PoolNotFound,
    MarketNotFound,
    LookupFailed(String),
    FilterRejected(String),
}

impl From<GateRefusal> for SkipReason {
    fn from(refusal: GateRefusal) -> Self {
        match refusal {
            GateRefusal::BuyInProgress => SkipReason::BuyInProgress,
            GateRefusal::SellInProgress => SkipReason::SellInProgress,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotInSnipeList => write!(f, "owner not in snipe list"),
            SkipReason::BuyInProgress => write!(f, "another buy is in progress"),
            SkipReason::SellInProgress => write!(f, "a sell is in progress"),
            SkipReason::PoolNotFound => write!(f, "pool not found"),
            SkipReason::MarketNotFound => write!(f, "market not found"),
            SkipReason::LookupFailed(e) => write!(f, "lookup failed: {}", e),
            SkipReason::FilterRejected(reason) => write!(f, "filtered: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuyOutcome {
    Skipped(SkipReason),
    /// Admitted, but auto-buy is off
    DryRun,
    Confirmed { signature: Signature, attempts: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellOutcome {
    /// No pool or market known for the mint
    NoPoolContext,
    EmptyBalance,
    /// Sell simulation is on; nothing was submitted
    Simulated { trigger: ExitTrigger },
    Confirmed { signature: Signature, attempts: u32, trigger: ExitTrigger },
    Exhausted { attempts: u32, trigger: ExitTrigger },
}

/// Everything the controller talks to
#[derive(Clone)]
pub struct Collaborators {
    pub pools: Arc<dyn PoolDirectory>,
    pub markets: Arc<dyn MarketDirectory>,
    pub snipe_list: Arc<dyn SnipeAllowList>,
    pub filters: Arc<dyn AdmissionFilterPipeline>,
    pub quotes: Arc<dyn QuoteEngine>,
    pub executor: Arc<dyn TransactionExecutor>,
    pub notifier: Arc<dyn NotificationSink>,
    pub interrupt: Arc<dyn OperatorInterruptSource>,
}

pub struct TradeController {
    config: TradeConfig,
    wallet: Arc<Keypair>,
    gate: ConcurrencyGate,
    collaborators: Collaborators,
}

impl TradeController {
    pub fn new(config: TradeConfig, wallet: Arc<Keypair>, collaborators: Collaborators) -> Self {
        Self {
            config,
            wallet,
            gate: ConcurrencyGate::new(),
            collaborators,
        }
    }

    pub fn config(&self) -> &TradeConfig {
        &self.config
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Buy into a new pool; true when bought (or admitted in dry-run mode)
    pub async fn buy(&self, candidate: &PoolCandidate) -> bool {
        match self.try_buy(candidate).await {
            Ok(BuyOutcome::Confirmed { .. }) | Ok(BuyOutcome::DryRun) => true,
            Ok(BuyOutcome::Skipped(_)) | Ok(BuyOutcome::Exhausted { .. }) => false,
            Err(e) => {
                error!("Failed to buy {}: {}", candidate.base_mint, e);
                false
            }
        }
    }

    pub async fn try_buy(&self, candidate: &PoolCandidate) -> Result<BuyOutcome> {
        let mint = candidate.base_mint;
        trace!("Processing new pool for {}", mint);

        if self.config.use_snipe_list {
            let owner = self.current_owner(candidate).await;
            if !self.collaborators.snipe_list.contains(&owner) {
                debug!("Skipping buy for {}: owner {} is not in snipe list", mint, owner);
                return Ok(BuyOutcome::Skipped(SkipReason::NotInSnipeList));
            }
        }

        if !self.config.auto_buy_delay.is_zero() {
            debug!("Waiting for {:?} before buy of {}", self.config.auto_buy_delay, mint);
            tokio::time::sleep(self.config.auto_buy_delay).await;
        }

        let _permit = if self.config.one_token_at_a_time {
            match self.gate.try_enter_buy() {
                Ok(permit) => Some(permit),
                Err(refusal) => {
                    let reason = SkipReason::from(refusal);
                    debug!("Skipping buy for {}: {}", mint, reason);
                    return Ok(BuyOutcome::Skipped(reason));
                }
            }
        } else {
            None
        };

        let (record, keys) = match self.resolve_pool(&mint).await {
            Ok(context) => context,
            Err(reason) => {
                warn!("Skipping buy for {}: {}", mint, reason);
                return Ok(BuyOutcome::Skipped(reason));
            }
        };

        if !self.config.use_snipe_list {
            let admission = debounce_admission(
                self.collaborators.filters.as_ref(),
                &record,
                self.config.filter_check_interval,
                self.config.filter_check_duration,
                self.config.consecutive_match_count,
            )
            .await;

            if let Admission::Rejected { reason, evaluations } = admission {
                debug!("Skipping buy for {} after {} filter checks: {}", mint, evaluations, reason);
                self.collaborators.notifier.send(TradeEvent::FilterRejected {
                    mint,
                    reason: reason.clone(),
                });
                return Ok(BuyOutcome::Skipped(SkipReason::FilterRejected(reason)));
            }
        }

        if !self.config.auto_buy {
            info!("Dry run: would buy {} with {} raw {}", mint, self.config.quote_amount, self.config.quote_token.symbol);
            return Ok(BuyOutcome::DryRun);
        }

        let keys = &keys;
        let result = submit_with_retry("buy", &mint, self.config.max_buy_retries, move |_| {
            self.buy_attempt(keys)
        })
        .await;

        match result {
            Ok(RetryOutcome::Confirmed { signature, attempts }) => {
                self.collaborators.notifier.send(TradeEvent::BuyConfirmed { mint, signature });
                Ok(BuyOutcome::Confirmed { signature, attempts })
            }
            Ok(RetryOutcome::Exhausted { attempts }) => {
                error!("Failed to buy {} after {} attempts", mint, attempts);
                self.collaborators.notifier.send(TradeEvent::BuyFailed { mint });
                Ok(BuyOutcome::Exhausted { attempts })
            }
            Err(e) => {
                self.collaborators.notifier.send(TradeEvent::BuyFailed { mint });
                Err(e)
            }
        }
    }

    async fn buy_attempt(&self, keys: &PoolKeys) -> Result<SubmissionResult> {
        let quote = self
            .collaborators
            .quotes
            .quote(keys, self.config.quote_amount, SwapDirection::Buy, self.config.buy_slippage_pct)
            .await?;

        let instructions = buy_instructions(
            keys,
            &self.config.quote_account,
            &self.wallet.pubkey(),
            self.config.quote_amount,
            quote.min_amount_out,
        );

        self.collaborators.executor.submit(instructions, &self.wallet).await
    }

    /// Exit a holding; every outcome is logged, nothing is returned
    pub async fn sell(&self, holding: &Holding) {
        match self.try_sell(holding).await {
            Ok(outcome) => debug!("Sell of {} finished: {:?}", holding.mint, outcome),
            Err(e) => error!("Failed to sell {}: {}", holding.mint, e),
        }
    }

    pub async fn try_sell(&self, holding: &Holding) -> Result<SellOutcome> {
        let _permit = self.config.one_token_at_a_time.then(|| self.gate.enter_sell());
        let mint = holding.mint;
        trace!("Processing sell for {}", mint);

        let record = match self.collaborators.pools.get(&mint).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                trace!("Token pool data is not found for {}, can't sell", mint);
                return Ok(SellOutcome::NoPoolContext);
            }
            Err(e) => {
                warn!("Pool lookup for {} failed, can't sell: {}", mint, e);
                return Ok(SellOutcome::NoPoolContext);
            }
        };

        if holding.raw_amount == 0 {
            info!("Empty balance for {}, can't sell", mint);
            return Ok(SellOutcome::EmptyBalance);
        }

        if !self.config.auto_sell_delay.is_zero() {
            debug!("Waiting for {:?} before sell of {}", self.config.auto_sell_delay, mint);
            tokio::time::sleep(self.config.auto_sell_delay).await;
        }

        let keys = match self.pool_keys(&record).await {
            Ok(keys) => keys,
            Err(reason) => {
                warn!("Can't sell {}: {}", mint, reason);
                return Ok(SellOutcome::NoPoolContext);
            }
        };

        let monitor = PriceMonitor {
            quotes: self.collaborators.quotes.as_ref(),
            interrupt: self.collaborators.interrupt.as_ref(),
            thresholds: ExitThresholds::from_quote_amount(
                self.config.quote_amount,
                self.config.take_profit_bps,
                self.config.stop_loss_bps,
            ),
            interval: self.config.price_check_interval,
            duration: self.config.price_check_duration,
            slippage_pct: self.config.sell_slippage_pct,
        };
        let watched = monitor.run(&keys, holding.raw_amount).await;
        let trigger = watched.trigger;

        if self.config.simulate_sell {
            info!(
                "Simulated sell of {} ({}): last quote {:?} after {} checks",
                mint, trigger, watched.last_amount_out, watched.iterations
            );
            return Ok(SellOutcome::Simulated { trigger });
        }

        let keys = &keys;
        let result = submit_with_retry("sell", &mint, self.config.max_sell_retries, move |_| {
            self.sell_attempt(keys, holding)
        })
        .await;

        match result {
            Ok(RetryOutcome::Confirmed { signature, attempts }) => {
                self.collaborators.notifier.send(TradeEvent::SellConfirmed { mint, signature, trigger });
                Ok(SellOutcome::Confirmed { signature, attempts, trigger })
            }
            Ok(RetryOutcome::Exhausted { attempts }) => {
                error!("Failed to sell {} after {} attempts", mint, attempts);
                self.collaborators.notifier.send(TradeEvent::SellFailed { mint });
                Ok(SellOutcome::Exhausted { attempts, trigger })
            }
            Err(e) => {
                self.collaborators.notifier.send(TradeEvent::SellFailed { mint });
                Err(e)
            }
        }
    }

    async fn sell_attempt(&self, keys: &PoolKeys, holding: &Holding) -> Result<SubmissionResult> {
        let quote = self
            .collaborators
            .quotes
            .quote(keys, holding.raw_amount, SwapDirection::Sell, self.config.sell_slippage_pct)
            .await?;

        let instructions = sell_instructions(
            keys,
            &holding.token_account,
            &self.config.quote_account,
            &self.wallet.pubkey(),
            holding.raw_amount,
            quote.min_amount_out,
        )?;

        self.collaborators.executor.submit(instructions, &self.wallet).await
    }

    /// Paper-trade a pool: sell the tokens the configured buy would have received
    pub async fn simulate_sell(&self, candidate: &PoolCandidate) -> Result<SellOutcome> {
        let mint = candidate.base_mint;

        let keys = match self.resolve_pool(&mint).await {
            Ok((_, keys)) => keys,
            Err(reason) => {
                warn!("Can't simulate sell of {}: {}", mint, reason);
                return Ok(SellOutcome::NoPoolContext);
            }
        };

        let quote = self
            .collaborators
            .quotes
            .quote(&keys, self.config.quote_amount, SwapDirection::Buy, self.config.buy_slippage_pct)
            .await?;

        let holding = Holding {
            mint,
            token_account: derive_ata(&self.wallet.pubkey(), &mint),
            raw_amount: quote.amount_out,
        };
        debug!("Simulating holding of {} raw {}", holding.raw_amount, mint);

        self.try_sell(&holding).await
    }

    /// Fresh pool record and swap keys for a base mint
    /// Owner as the pool directory has it now, which a reconciler may have
    /// rewritten since the candidate was built
    async fn current_owner(&self, candidate: &PoolCandidate) -> Pubkey {
        match self.collaborators.pools.get(&candidate.base_mint).await {
            Ok(Some(record)) => record.state.owner,
            Ok(None) => candidate.owner_authority,
            Err(e) => {
                trace!("Owner lookup for {} failed: {}", candidate.base_mint, e);
                candidate.owner_authority
            }
        }
    }

    async fn resolve_pool(&self, mint: &Pubkey) -> std::result::Result<(PoolRecord, PoolKeys), SkipReason> {
        let record = self
            .collaborators
            .pools
            .get(mint)
            .await
            .map_err(|e| SkipReason::LookupFailed(e.to_string()))?
            .ok_or(SkipReason::PoolNotFound)?;

        let keys = self.pool_keys(&record).await?;
        Ok((record, keys))
    }

    async fn pool_keys(&self, record: &PoolRecord) -> std::result::Result<PoolKeys, SkipReason> {
        let market = self
            .collaborators
            .markets
            .get(&record.state.market_id)
            .await
            .map_err(|e| SkipReason::LookupFailed(e.to_string()))?
            .ok_or(SkipReason::MarketNotFound)?;

        PoolKeys::new(record.id, &record.state, &market).map_err(|e| SkipReason::LookupFailed(e.to_string()))
    }
}
