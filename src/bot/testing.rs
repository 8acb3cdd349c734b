//! Scripted collaborators for controller tests

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};

use super::{Collaborators, PoolCandidate, TradeController};
use crate::amm::quote::apply_slippage;
use crate::amm::{
    LiquidityStateV4, MinimalMarketState, PoolKeys, QuoteEngine, QuoteResult, SwapDirection,
    OPENBOOK_PROGRAM_ID,
};
use crate::cache::{MarketCache, PoolCache, PoolDirectory, PoolRecord, SnipeAllowList};
use crate::config::{QuoteToken, TradeConfig};
use crate::error::{Error, Result};
use crate::filter::{AdmissionFilterPipeline, FilterVerdict};
use crate::interrupt::OperatorInterruptSource;
use crate::notify::{NotificationSink, TradeEvent};
use crate::trading::{SubmissionResult, TransactionExecutor};

pub(crate) fn pool_state(mint: Pubkey) -> (LiquidityStateV4, MinimalMarketState) {
    let state = LiquidityStateV4 {
        status: 6,
        base_decimal: 6,
        quote_decimal: 9,
        base_mint: mint,
        quote_mint: Pubkey::new_unique(),
        lp_mint: Pubkey::new_unique(),
        base_vault: Pubkey::new_unique(),
        quote_vault: Pubkey::new_unique(),
        open_orders: Pubkey::new_unique(),
        target_orders: Pubkey::new_unique(),
        market_id: Pubkey::new_unique(),
        market_program_id: *OPENBOOK_PROGRAM_ID,
        owner: Pubkey::new_unique(),
        ..Default::default()
    };
    let market = MinimalMarketState {
        event_queue: Pubkey::new_unique(),
        bids: Pubkey::new_unique(),
        asks: Pubkey::new_unique(),
    };
    (state, market)
}

pub(crate) fn pool_record(mint: Pubkey) -> PoolRecord {
    let (state, _) = pool_state(mint);
    PoolRecord::new(Pubkey::new_unique(), None, state)
}

pub(crate) fn pool_keys() -> PoolKeys {
    let (state, market) = pool_state(Pubkey::new_unique());
    PoolKeys::new(Pubkey::new_unique(), &state, &market).unwrap()
}

/// Pops scripted verdicts; an exhausted script fails
pub(crate) struct ScriptedFilters {
    script: Mutex<VecDeque<FilterVerdict>>,
    fallback: Option<FilterVerdict>,
    calls: AtomicU32,
}

impl ScriptedFilters {
    pub fn new(script: Vec<FilterVerdict>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn repeat(verdict: FilterVerdict) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(verdict),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdmissionFilterPipeline for ScriptedFilters {
    async fn evaluate(&self, _pool: &PoolRecord) -> FilterVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| FilterVerdict::fail("script exhausted"))
    }
}

/// Pops scripted quote outputs; `Err(())` is a quote failure
pub(crate) struct ScriptedQuotes {
    script: Mutex<VecDeque<std::result::Result<u64, ()>>>,
    fallback: Option<std::result::Result<u64, ()>>,
    requests: Mutex<Vec<(SwapDirection, u64)>>,
}

impl ScriptedQuotes {
    pub fn new(script: Vec<std::result::Result<u64, ()>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeat(step: std::result::Result<u64, ()>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(step),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(SwapDirection, u64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteEngine for ScriptedQuotes {
    async fn quote(
        &self,
        _keys: &PoolKeys,
        amount_in: u64,
        direction: SwapDirection,
        slippage_pct: u8,
    ) -> Result<QuoteResult> {
        self.requests.lock().unwrap().push((direction, amount_in));
        let step = self.script.lock().unwrap().pop_front().or(self.fallback);

        match step {
            Some(Ok(amount_out)) => Ok(QuoteResult {
                amount_out,
                min_amount_out: apply_slippage(amount_out, slippage_pct),
            }),
            _ => Err(Error::QuoteUnavailable("scripted".into())),
        }
    }
}

/// Raises the interrupt on the listed (1-based) polls
pub(crate) struct ScriptedInterrupt {
    raise_on: Vec<u32>,
    polls: AtomicU32,
}

impl ScriptedInterrupt {
    pub fn never() -> Self {
        Self::at(&[])
    }

    pub fn at(polls: &[u32]) -> Self {
        Self {
            raise_on: polls.to_vec(),
            polls: AtomicU32::new(0),
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

impl OperatorInterruptSource for ScriptedInterrupt {
    fn poll_interrupt(&self) -> bool {
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        self.raise_on.contains(&n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecStep {
    Confirm,
    Unconfirmed,
    Unrecoverable,
}

/// Executor that answers from a script, optionally after a delay
pub(crate) struct ScriptedExecutor {
    script: Mutex<VecDeque<ExecStep>>,
    fallback: ExecStep,
    delay: Duration,
    submitted: Mutex<Vec<Vec<Instruction>>>,
}

impl ScriptedExecutor {
    pub fn new(script: Vec<ExecStep>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: ExecStep::Unconfirmed,
            delay: Duration::ZERO,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn repeat(step: ExecStep) -> Self {
        Self {
            fallback: step,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<Vec<Instruction>> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionExecutor for ScriptedExecutor {
    async fn submit(&self, instructions: Vec<Instruction>, _payer: &Keypair) -> Result<SubmissionResult> {
        self.submitted.lock().unwrap().push(instructions);
        let step = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match step {
            ExecStep::Confirm => Ok(SubmissionResult::confirmed(Signature::new_unique())),
            ExecStep::Unconfirmed => Ok(SubmissionResult::unconfirmed(
                Some(Signature::new_unique()),
                "block height exceeded",
            )),
            ExecStep::Unrecoverable => Err(Error::Signing("scripted".into())),
        }
    }
}

#[derive(Default)]
pub(crate) struct StaticSnipeList(pub HashSet<Pubkey>);

impl SnipeAllowList for StaticSnipeList {
    fn contains(&self, authority: &Pubkey) -> bool {
        self.0.contains(authority)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<TradeEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<TradeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn send(&self, event: TradeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Pool directory whose lookups always fail
pub(crate) struct FailingPools;

#[async_trait]
impl PoolDirectory for FailingPools {
    async fn get(&self, _mint: &Pubkey) -> Result<Option<PoolRecord>> {
        Err(Error::Rpc("connection reset".into()))
    }

    fn update_owner(&self, _pool_id: &Pubkey, _owner: Pubkey) -> bool {
        false
    }

    fn update_minter(&self, _pool_id: &Pubkey, _minter: Option<Pubkey>) -> bool {
        false
    }
}

pub(crate) fn trade_config() -> TradeConfig {
    TradeConfig {
        quote_token: QuoteToken::from_symbol("WSOL").unwrap(),
        quote_account: Pubkey::new_unique(),
        quote_amount: 1_000_000,
        take_profit_bps: 5_000,
        stop_loss_bps: 2_000,
        max_buy_retries: 3,
        max_sell_retries: 3,
        buy_slippage_pct: 20,
        sell_slippage_pct: 20,
        price_check_interval: Duration::from_millis(100),
        price_check_duration: Duration::from_secs(1),
        filter_check_interval: Duration::from_millis(100),
        filter_check_duration: Duration::from_secs(1),
        consecutive_match_count: 3,
        auto_buy_delay: Duration::ZERO,
        auto_sell_delay: Duration::ZERO,
        one_token_at_a_time: true,
        use_snipe_list: false,
        auto_buy: true,
        auto_sell: true,
        simulate_sell: false,
    }
}

/// A controller wired to scripted collaborators
///
/// Replace any field before calling `controller`.
pub(crate) struct Harness {
    pub config: TradeConfig,
    pub wallet: Arc<Keypair>,
    pub pools: Arc<PoolCache>,
    pub markets: Arc<MarketCache>,
    pub snipe_list: Arc<StaticSnipeList>,
    pub filters: Arc<ScriptedFilters>,
    pub quotes: Arc<ScriptedQuotes>,
    pub executor: Arc<ScriptedExecutor>,
    pub notifier: Arc<RecordingNotifier>,
    pub interrupt: Arc<ScriptedInterrupt>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            config: trade_config(),
            wallet: Arc::new(Keypair::new()),
            pools: Arc::new(PoolCache::new()),
            markets: Arc::new(MarketCache::new(None)),
            snipe_list: Arc::new(StaticSnipeList::default()),
            filters: Arc::new(ScriptedFilters::repeat(FilterVerdict::pass())),
            quotes: Arc::new(ScriptedQuotes::repeat(Ok(1_000_000))),
            executor: Arc::new(ScriptedExecutor::repeat(ExecStep::Confirm)),
            notifier: Arc::new(RecordingNotifier::default()),
            interrupt: Arc::new(ScriptedInterrupt::never()),
        }
    }

    /// Cache a pool and its market; returns the matching candidate
    pub fn add_pool(&self) -> PoolCandidate {
        let (state, market) = pool_state(Pubkey::new_unique());
        let id = Pubkey::new_unique();
        self.markets.save(state.market_id, market);
        self.pools.save(id, None, state.clone());
        PoolCandidate::from_record(&PoolRecord::new(id, None, state)).unwrap()
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            pools: self.pools.clone(),
            markets: self.markets.clone(),
            snipe_list: self.snipe_list.clone(),
            filters: self.filters.clone(),
            quotes: self.quotes.clone(),
            executor: self.executor.clone(),
            notifier: self.notifier.clone(),
            interrupt: self.interrupt.clone(),
        }
    }

    pub fn controller(&self) -> TradeController {
        TradeController::new(self.config.clone(), self.wallet.clone(), self.collaborators())
    }
}
