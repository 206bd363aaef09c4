//! Configuration management for the order bot.
//!
//! Loads settings from an optional `config` file, `BOT__*` environment
//! variables and `.env`. Built once at startup and passed down explicitly.

use crate::exchange::WorkingType;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Binance API credentials and endpoint
    #[serde(default)]
    pub binance: BinanceConfig,
    /// Strategy defaults
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceConfig {
    /// API key for authentication
    #[serde(default)]
    pub api_key: String,
    /// Secret key for signing requests
    #[serde(default)]
    pub secret_key: String,
    /// Use testnet instead of production
    #[serde(default = "default_testnet")]
    pub testnet: bool,
    /// Overrides the futures REST base URL (testnet/production selection is ignored)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Signed request validity window in milliseconds
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Minimum distance between a bracket stop-loss and the mark price
    #[serde(default = "default_bracket_buffer")]
    pub bracket_buffer: Decimal,
    /// Trigger source for stop-limit orders when none is given
    #[serde(default)]
    pub default_working_type: WorkingType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the audit log
    #[serde(default = "default_log_directory")]
    pub directory: String,
    /// File name prefix of the hourly-rolled audit log
    #[serde(default = "default_log_file")]
    pub file_prefix: String,
}

fn default_testnet() -> bool {
    true
}

fn default_recv_window() -> u64 {
    5_000
}

fn default_timeout() -> u64 {
    30
}

fn default_bracket_buffer() -> Decimal {
    Decimal::new(50, 0) // 50 quote units, e.g. 50 USDT
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_file() -> String {
    "bot.log".to_string()
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("BOT").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Plain credential variables take precedence when set.
        if let Ok(key) = std::env::var("BINANCE_API_KEY") {
            config.binance.api_key = key;
        }
        if let Ok(secret) = std::env::var("BINANCE_API_SECRET") {
            config.binance.secret_key = secret;
        }

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Credentials are only required when orders go to a real venue.
    pub fn validate(&self, paper: bool) -> Result<()> {
        anyhow::ensure!(
            self.strategy.bracket_buffer >= Decimal::ZERO,
            "bracket_buffer must be >= 0"
        );

        anyhow::ensure!(self.binance.timeout_secs > 0, "timeout_secs must be > 0");

        anyhow::ensure!(
            self.binance.recv_window_ms > 0 && self.binance.recv_window_ms <= 60_000,
            "recv_window_ms must be between 1 and 60000"
        );

        if !paper {
            anyhow::ensure!(
                !self.binance.api_key.is_empty() && !self.binance.secret_key.is_empty(),
                "Binance API key and secret are required (set BINANCE_API_KEY and BINANCE_API_SECRET)"
            );
        }

        Ok(())
    }
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            testnet: default_testnet(),
            base_url: None,
            recv_window_ms: default_recv_window(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            bracket_buffer: default_bracket_buffer(),
            default_working_type: WorkingType::MarkPrice,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file_prefix: default_log_file(),
        }
    }
}
