//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub buy: BuyConfig,
    #[serde(default)]
    pub sell: SellConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub snipe_list: SnipeListConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ws_endpoint")]
    pub ws_endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// processed | confirmed | finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            ws_endpoint: default_ws_endpoint(),
            timeout_ms: default_timeout_ms(),
            commitment: default_commitment(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Quote token symbol: WSOL or USDC
    #[serde(default = "default_quote_mint")]
    pub quote_mint: String,
    /// Amount of quote token spent per buy, in whole tokens
    #[serde(default = "default_quote_amount")]
    pub quote_amount: f64,
    /// Hold at most one position at a time
    #[serde(default = "default_true")]
    pub one_token_at_a_time: bool,
    /// Cache markets as they are created instead of fetching on demand
    #[serde(default = "default_true")]
    pub cache_new_markets: bool,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            quote_mint: default_quote_mint(),
            quote_amount: default_quote_amount(),
            one_token_at_a_time: true,
            cache_new_markets: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuyConfig {
    /// When false, buys stop after admission (dry run)
    #[serde(default = "default_true")]
    pub auto_buy: bool,
    #[serde(default)]
    pub auto_buy_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_buy_retries: u32,
    #[serde(default = "default_slippage_pct")]
    pub buy_slippage_pct: u8,
}

impl Default for BuyConfig {
    fn default() -> Self {
        Self {
            auto_buy: true,
            auto_buy_delay_ms: 0,
            max_buy_retries: default_max_retries(),
            buy_slippage_pct: default_slippage_pct(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellConfig {
    #[serde(default = "default_true")]
    pub auto_sell: bool,
    #[serde(default)]
    pub auto_sell_delay_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_sell_retries: u32,
    #[serde(default = "default_slippage_pct")]
    pub sell_slippage_pct: u8,
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,
    #[serde(default = "default_price_check_interval_ms")]
    pub price_check_interval_ms: u64,
    #[serde(default = "default_price_check_duration_ms")]
    pub price_check_duration_ms: u64,
    /// Run the exit decision but never submit the sell
    #[serde(default)]
    pub simulate_sell: bool,
}

impl Default for SellConfig {
    fn default() -> Self {
        Self {
            auto_sell: true,
            auto_sell_delay_ms: 0,
            max_sell_retries: default_max_retries(),
            sell_slippage_pct: default_slippage_pct(),
            take_profit_pct: default_take_profit_pct(),
            stop_loss_pct: default_stop_loss_pct(),
            price_check_interval_ms: default_price_check_interval_ms(),
            price_check_duration_ms: default_price_check_duration_ms(),
            simulate_sell: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_filter_check_interval_ms")]
    pub filter_check_interval_ms: u64,
    #[serde(default = "default_filter_check_duration_ms")]
    pub filter_check_duration_ms: u64,
    #[serde(default = "default_consecutive_match_count")]
    pub consecutive_match_count: u32,
    /// LP supply must be burned
    #[serde(default)]
    pub check_burned: bool,
    /// Mint authority must be revoked
    #[serde(default = "default_true")]
    pub check_renounced: bool,
    /// Freeze authority must be revoked
    #[serde(default = "default_true")]
    pub check_freezable: bool,
    /// Metadata must be immutable
    #[serde(default)]
    pub check_mutable: bool,
    /// Words that must all appear in the token's metadata JSON
    #[serde(default)]
    pub meta_words: Vec<String>,
    /// Allowed LP minters (base58)
    #[serde(default)]
    pub minters: Vec<String>,
    /// Markets the token must be listed on (only "jupiter" is known)
    #[serde(default)]
    pub markets: Vec<String>,
    /// Quote vault bounds, in whole quote tokens (0 disables a bound)
    #[serde(default)]
    pub min_pool_size: f64,
    #[serde(default)]
    pub max_pool_size: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_check_interval_ms: default_filter_check_interval_ms(),
            filter_check_duration_ms: default_filter_check_duration_ms(),
            consecutive_match_count: default_consecutive_match_count(),
            check_burned: false,
            check_renounced: true,
            check_freezable: true,
            check_mutable: false,
            meta_words: vec![],
            minters: vec![],
            markets: vec![],
            min_pool_size: 0.0,
            max_pool_size: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnipeListConfig {
    /// Buy only pools whose owner authority is listed; skips the admission filters
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_snipe_list_path")]
    pub path: String,
    #[serde(default = "default_snipe_list_refresh_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for SnipeListConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_snipe_list_path(),
            refresh_interval_ms: default_snipe_list_refresh_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Compute-budget priced RPC submission
    Default,
    /// Jito block engine bundle with a tip transfer
    Jito,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_executor_kind")]
    pub kind: ExecutorKind,
    #[serde(default = "default_compute_unit_limit")]
    pub compute_unit_limit: u32,
    #[serde(default = "default_compute_unit_price")]
    pub compute_unit_price: u64,
    #[serde(default = "default_jito_url")]
    pub block_engine_url: String,
    #[serde(default = "default_jito_tip")]
    pub jito_tip_lamports: u64,
    /// How long to poll for a signature status before giving up
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: default_executor_kind(),
            compute_unit_limit: default_compute_unit_limit(),
            compute_unit_price: default_compute_unit_price(),
            block_engine_url: default_jito_url(),
            jito_tip_lamports: default_jito_tip(),
            confirm_timeout_ms: default_confirm_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_telegram_token")]
    pub bot_token: String,
    #[serde(default = "default_telegram_chat_id")]
    pub chat_id: String,
}

// Default value functions
fn default_rpc_endpoint() -> String {
    std::env::var("RPC_ENDPOINT").unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".into())
}

fn default_ws_endpoint() -> String {
    std::env::var("RPC_WS_ENDPOINT").unwrap_or_else(|_| "wss://api.mainnet-beta.solana.com".into())
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_commitment() -> String {
    "confirmed".into()
}

fn default_quote_mint() -> String {
    "WSOL".into()
}

fn default_quote_amount() -> f64 {
    0.01
}

fn default_max_retries() -> u32 {
    10
}

fn default_slippage_pct() -> u8 {
    20
}

fn default_take_profit_pct() -> f64 {
    40.0
}

fn default_stop_loss_pct() -> f64 {
    20.0
}

fn default_price_check_interval_ms() -> u64 {
    2000
}

fn default_price_check_duration_ms() -> u64 {
    600000
}

fn default_filter_check_interval_ms() -> u64 {
    2000
}

fn default_filter_check_duration_ms() -> u64 {
    60000
}

fn default_consecutive_match_count() -> u32 {
    3
}

fn default_snipe_list_path() -> String {
    "snipe-list.txt".into()
}

fn default_snipe_list_refresh_ms() -> u64 {
    30000
}

fn default_executor_kind() -> ExecutorKind {
    ExecutorKind::Default
}

fn default_compute_unit_limit() -> u32 {
    101337
}

fn default_compute_unit_price() -> u64 {
    421197
}

fn default_jito_url() -> String {
    std::env::var("JITO_BLOCK_ENGINE_URL")
        .unwrap_or_else(|_| "https://mainnet.block-engine.jito.wtf".into())
}

fn default_jito_tip() -> u64 {
    1_000_000
}

fn default_confirm_timeout_ms() -> u64 {
    30000
}

fn default_telegram_token() -> String {
    std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default()
}

fn default_telegram_chat_id() -> String {
    std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default()
}

fn default_true() -> bool {
    true
}

/// The token pools are quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteToken {
    pub mint: Pubkey,
    pub decimals: u8,
    pub symbol: &'static str,
}

pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

impl QuoteToken {
    /// Resolve a configured quote symbol (WSOL or USDC)
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        let (mint, decimals, symbol) = match symbol {
            "WSOL" => (WSOL_MINT, 9, "WSOL"),
            "USDC" => (USDC_MINT, 6, "USDC"),
            other => anyhow::bail!(
                "Unsupported quote mint \"{}\". Supported values are USDC and WSOL",
                other
            ),
        };

        Ok(Self {
            mint: Pubkey::from_str(mint).context("Invalid quote mint")?,
            decimals,
            symbol,
        })
    }

    /// Convert whole tokens to raw units
    pub fn to_raw(&self, amount: f64) -> u64 {
        (amount * 10f64.powi(self.decimals as i32)).round() as u64
    }

    /// Convert raw units to whole tokens
    pub fn to_ui(&self, raw: u64) -> f64 {
        raw as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// Immutable strategy parameters the trade controller runs with
#[derive(Debug, Clone)]
pub struct TradeConfig {
    pub quote_token: QuoteToken,
    /// Wallet's token account for the quote token
    pub quote_account: Pubkey,
    /// Raw quote units spent per buy
    pub quote_amount: u64,
    pub take_profit_bps: u64,
    pub stop_loss_bps: u64,
    pub max_buy_retries: u32,
    pub max_sell_retries: u32,
    pub buy_slippage_pct: u8,
    pub sell_slippage_pct: u8,
    pub price_check_interval: Duration,
    pub price_check_duration: Duration,
    pub filter_check_interval: Duration,
    pub filter_check_duration: Duration,
    pub consecutive_match_count: u32,
    pub auto_buy_delay: Duration,
    pub auto_sell_delay: Duration,
    pub one_token_at_a_time: bool,
    pub use_snipe_list: bool,
    pub auto_buy: bool,
    pub auto_sell: bool,
    pub simulate_sell: bool,
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("rpc.endpoint", default_rpc_endpoint())?
            .set_default("rpc.ws_endpoint", default_ws_endpoint())?
            .set_default("rpc.timeout_ms", default_timeout_ms() as i64)?
            .set_default("trading.quote_mint", default_quote_mint())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix SNIPER__)
            .add_source(
                config::Environment::with_prefix("SNIPER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("filters.meta_words")
                    .with_list_parse_key("filters.minters")
                    .with_list_parse_key("filters.markets")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let quote = QuoteToken::from_symbol(&self.trading.quote_mint)?;

        if self.trading.quote_amount <= 0.0 || quote.to_raw(self.trading.quote_amount) == 0 {
            anyhow::bail!("quote_amount must be positive");
        }

        if self.buy.max_buy_retries == 0 {
            anyhow::bail!("max_buy_retries must be at least 1");
        }

        if self.sell.max_sell_retries == 0 {
            anyhow::bail!("max_sell_retries must be at least 1");
        }

        if self.buy.buy_slippage_pct > 100 || self.sell.sell_slippage_pct > 100 {
            anyhow::bail!("slippage cannot exceed 100%");
        }

        if self.sell.take_profit_pct <= 0.0 {
            anyhow::bail!("take_profit_pct must be positive");
        }

        if self.sell.stop_loss_pct <= 0.0 || self.sell.stop_loss_pct >= 100.0 {
            anyhow::bail!("stop_loss_pct must be between 0 and 100");
        }

        if self.filters.consecutive_match_count == 0 {
            anyhow::bail!("consecutive_match_count must be at least 1");
        }

        if self.filters.max_pool_size > 0.0 && self.filters.min_pool_size > self.filters.max_pool_size {
            anyhow::bail!("min_pool_size cannot exceed max_pool_size");
        }

        // Meta words become regexes with optional whitespace between letters
        for word in &self.filters.meta_words {
            crate::filter::meta_words::word_pattern(word)
                .with_context(|| format!("Invalid meta word: {}", word))?;
        }

        for minter in &self.filters.minters {
            Pubkey::from_str(minter).with_context(|| format!("Invalid minter address: {}", minter))?;
        }

        for market in &self.filters.markets {
            if market != crate::filter::market::JUPITER {
                tracing::warn!("Unknown market '{}' in filters.markets will be ignored", market);
            }
        }

        if self.snipe_list.enabled && self.snipe_list.path.is_empty() {
            anyhow::bail!("snipe_list.path is required when the snipe list is enabled");
        }

        if self.executor.kind == ExecutorKind::Jito && self.executor.jito_tip_lamports == 0 {
            anyhow::bail!("jito_tip_lamports must be positive with the jito executor");
        }

        if self.telegram.enabled && (self.telegram.bot_token.is_empty() || self.telegram.chat_id.is_empty()) {
            anyhow::bail!("telegram.bot_token and telegram.chat_id are required when telegram is enabled");
        }

        Ok(())
    }

    /// Resolve the configured quote token
    pub fn quote_token(&self) -> Result<QuoteToken> {
        QuoteToken::from_symbol(&self.trading.quote_mint)
    }

    /// Derive the trade controller's parameters for `wallet`
    pub fn trade_config(&self, wallet: &Pubkey) -> Result<TradeConfig> {
        let quote_token = self.quote_token()?;
        let quote_account = spl_associated_token_account::get_associated_token_address(wallet, &quote_token.mint);

        Ok(TradeConfig {
            quote_token,
            quote_account,
            quote_amount: quote_token.to_raw(self.trading.quote_amount),
            take_profit_bps: pct_to_bps(self.sell.take_profit_pct),
            stop_loss_bps: pct_to_bps(self.sell.stop_loss_pct),
            max_buy_retries: self.buy.max_buy_retries,
            max_sell_retries: self.sell.max_sell_retries,
            buy_slippage_pct: self.buy.buy_slippage_pct,
            sell_slippage_pct: self.sell.sell_slippage_pct,
            price_check_interval: Duration::from_millis(self.sell.price_check_interval_ms),
            price_check_duration: Duration::from_millis(self.sell.price_check_duration_ms),
            filter_check_interval: Duration::from_millis(self.filters.filter_check_interval_ms),
            filter_check_duration: Duration::from_millis(self.filters.filter_check_duration_ms),
            consecutive_match_count: self.filters.consecutive_match_count,
            auto_buy_delay: Duration::from_millis(self.buy.auto_buy_delay_ms),
            auto_sell_delay: Duration::from_millis(self.sell.auto_sell_delay_ms),
            one_token_at_a_time: self.trading.one_token_at_a_time,
            use_snipe_list: self.snipe_list.enabled,
            auto_buy: self.buy.auto_buy,
            auto_sell: self.sell.auto_sell,
            simulate_sell: self.sell.simulate_sell,
        })
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  RPC:
    endpoint: {}
    ws_endpoint: {}
    commitment: {}
  Trading:
    quote: {} {}
    one_token_at_a_time: {}
  Buy:
    auto_buy: {}
    delay: {}ms
    max_retries: {}
    slippage: {}%
  Sell:
    auto_sell: {}
    delay: {}ms
    max_retries: {}
    slippage: {}%
    take_profit: {}%
    stop_loss: {}%
    price_check: every {}ms for {}ms
    simulate: {}
  Filters:
    check: every {}ms for {}ms, {} consecutive matches
    burned: {} renounced: {} freezable: {} mutable: {}
    meta_words: {:?}
    minters: {}
    markets: {:?}
    pool_size: {} - {}
  Snipe list:
    enabled: {}
    path: {}
  Executor:
    kind: {:?}
    compute_units: {} @ {} micro-lamports
    block_engine: {}
    jito_tip: {} lamports
  Telegram:
    enabled: {}
    bot_token: {}
"#,
            mask_url(&self.rpc.endpoint),
            mask_url(&self.rpc.ws_endpoint),
            self.rpc.commitment,
            self.trading.quote_amount,
            self.trading.quote_mint,
            self.trading.one_token_at_a_time,
            self.buy.auto_buy,
            self.buy.auto_buy_delay_ms,
            self.buy.max_buy_retries,
            self.buy.buy_slippage_pct,
            self.sell.auto_sell,
            self.sell.auto_sell_delay_ms,
            self.sell.max_sell_retries,
            self.sell.sell_slippage_pct,
            self.sell.take_profit_pct,
            self.sell.stop_loss_pct,
            self.sell.price_check_interval_ms,
            self.sell.price_check_duration_ms,
            self.sell.simulate_sell,
            self.filters.filter_check_interval_ms,
            self.filters.filter_check_duration_ms,
            self.filters.consecutive_match_count,
            self.filters.check_burned,
            self.filters.check_renounced,
            self.filters.check_freezable,
            self.filters.check_mutable,
            self.filters.meta_words,
            self.filters.minters.len(),
            self.filters.markets,
            self.filters.min_pool_size,
            self.filters.max_pool_size,
            self.snipe_list.enabled,
            self.snipe_list.path,
            self.executor.kind,
            self.executor.compute_unit_limit,
            self.executor.compute_unit_price,
            mask_url(&self.executor.block_engine_url),
            self.executor.jito_tip_lamports,
            self.telegram.enabled,
            if self.telegram.bot_token.is_empty() {
                "(not set)"
            } else {
                "***"
            },
        )
    }
}

fn pct_to_bps(pct: f64) -> u64 {
    (pct * 100.0).round().max(0.0) as u64
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            trading: TradingConfig::default(),
            buy: BuyConfig::default(),
            sell: SellConfig::default(),
            filters: FilterConfig::default(),
            snipe_list: SnipeListConfig::default(),
            executor: ExecutorConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.buy.buy_slippage_pct, 20);
        assert_eq!(config.executor.kind, ExecutorKind::Default);
    }

    #[test]
    fn test_quote_token_from_symbol() {
        let wsol = QuoteToken::from_symbol("WSOL").unwrap();
        assert_eq!(wsol.decimals, 9);
        assert_eq!(wsol.mint.to_string(), WSOL_MINT);
        assert_eq!(wsol.to_raw(0.01), 10_000_000);

        let usdc = QuoteToken::from_symbol("USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(usdc.to_ui(1_500_000), 1.5);

        assert!(QuoteToken::from_symbol("BONK").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.buy.max_buy_retries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sell.stop_loss_pct = 100.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filters.minters = vec!["not-a-key".into()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telegram.enabled = true;
        config.telegram.bot_token = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trade_config_derivation() {
        let mut config = Config::default();
        config.trading.quote_amount = 0.5;
        config.sell.take_profit_pct = 12.5;
        config.sell.price_check_interval_ms = 250;
        config.snipe_list.enabled = true;

        let wallet = Pubkey::new_unique();
        let trade = config.trade_config(&wallet).unwrap();

        assert_eq!(trade.quote_amount, 500_000_000);
        assert_eq!(trade.take_profit_bps, 1250);
        assert_eq!(trade.price_check_interval, Duration::from_millis(250));
        assert!(trade.use_snipe_list);
        assert_eq!(
            trade.quote_account,
            spl_associated_token_account::get_associated_token_address(&wallet, &trade.quote_token.mint)
        );
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[trading]
quote_mint = "USDC"
quote_amount = 5.0

[sell]
take_profit_pct = 25.0

[executor]
kind = "jito"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.trading.quote_mint, "USDC");
        assert_eq!(config.sell.take_profit_pct, 25.0);
        assert_eq!(config.executor.kind, ExecutorKind::Jito);
        // Untouched sections keep their defaults
        assert_eq!(config.buy.max_buy_retries, 10);
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(
            mask_url("https://api.example.com"),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_masked_display_hides_token() {
        let mut config = Config::default();
        config.telegram.bot_token = "123:secret".into();
        let display = config.masked_display();
        assert!(!display.contains("secret"));
    }
}
