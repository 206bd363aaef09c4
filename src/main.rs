//! Futures Order Bot - Main Entry Point
//!
//! One subcommand per order strategy. Each invocation runs exactly one
//! request and prints a line per order plus a summary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_order_bot::config::{Config, LoggingConfig};
use futures_order_bot::error::{StrategyError, StrategyResult};
use futures_order_bot::exchange::{
    BinanceClient, ChildOrderSpec, OrderSide, PaperVenue, VenueGateway, WorkingType,
};
use futures_order_bot::strategy::{
    BracketParams, CancellationFlag, ConsoleObserver, GridParams, LogObserver, ObserverSet,
    StrategyKind, StrategyReport, StrategyRequest, StrategyRunner, TimeWeightedParams,
    TriggeredLimitParams,
};
use rust_decimal::Decimal;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Futures Order Bot CLI
#[derive(Parser)]
#[command(name = "futures-order-bot")]
#[command(version, about = "Grid, TWAP, bracket and stop-limit orders on Binance Futures")]
struct Cli {
    /// Send orders to the in-memory paper venue instead of Binance
    #[arg(long, global = true)]
    paper: bool,

    /// Mark price served by the paper venue for the command's symbol
    #[arg(long, global = true)]
    mark_price: Option<Decimal>,

    /// Print the final report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a single market order
    #[command(allow_negative_numbers = true)]
    Market {
        /// Trading pair (e.g., BTCUSDT)
        symbol: String,
        /// BUY or SELL
        side: String,
        /// Quantity to trade
        quantity: Decimal,
    },

    /// Place a single limit order (good till cancelled)
    #[command(allow_negative_numbers = true)]
    Limit {
        /// Trading pair (e.g., BTCUSDT)
        symbol: String,
        /// BUY or SELL
        side: String,
        /// Order quantity
        quantity: Decimal,
        /// Limit price
        price: Decimal,
    },

    /// Spread limit orders evenly across a price range
    #[command(allow_negative_numbers = true)]
    Grid {
        /// Trading pair (e.g., BTCUSDT)
        symbol: String,
        /// BUY or SELL
        side: String,
        /// Quantity per order
        quantity: Decimal,
        /// Bottom of price range (first level)
        min_price: Decimal,
        /// Top of price range (never used as a level)
        max_price: Decimal,
        /// Number of grid levels
        grids: u32,
    },

    /// Split a market order into equal chunks sent at a fixed interval
    #[command(allow_negative_numbers = true)]
    Twap {
        /// Trading pair (e.g., BTCUSDT)
        symbol: String,
        /// BUY or SELL
        side: String,
        /// Total quantity to trade
        total_quantity: Decimal,
        /// Number of chunks to split the order into
        chunks: u32,
        /// Seconds between chunks
        interval: u64,
    },

    /// Take-profit and stop-loss exits for an open position
    #[command(alias = "oco", allow_negative_numbers = true)]
    Bracket {
        /// Trading pair (e.g., BTCUSDT)
        symbol: String,
        /// Your position direction: BUY or SELL
        side: String,
        /// Amount to protect
        quantity: Decimal,
        /// Profit target
        take_profit_price: Decimal,
        /// Stop loss trigger
        stop_loss_price: Decimal,
        /// Minimum distance of the stop from the mark price (default from config, 50)
        #[arg(long)]
        buffer: Option<Decimal>,
    },

    /// Place a stop-limit order
    #[command(allow_negative_numbers = true)]
    StopLimit {
        /// Trading pair (e.g., BTCUSDT)
        symbol: String,
        /// BUY or SELL
        side: String,
        /// Order quantity
        quantity: Decimal,
        /// Limit price of the order released by the trigger
        price: Decimal,
        /// Trigger price
        stop_price: Decimal,
        /// Trigger source price: MARK_PRICE or CONTRACT_PRICE
        #[arg(long, alias = "working_type")]
        working_type: Option<WorkingType>,
    },
}

impl Commands {
    fn symbol(&self) -> &str {
        match self {
            Commands::Market { symbol, .. }
            | Commands::Limit { symbol, .. }
            | Commands::Grid { symbol, .. }
            | Commands::Twap { symbol, .. }
            | Commands::Bracket { symbol, .. }
            | Commands::StopLimit { symbol, .. } => symbol,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate(cli.paper)?;

    let _guard = init_logging(&config.logging)?;

    info!(
        "Futures Order Bot v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let gateway: Box<dyn VenueGateway> = if cli.paper {
        let venue = PaperVenue::new();
        if let Some(price) = cli.mark_price {
            venue
                .set_mark_price(&cli.command.symbol().trim().to_ascii_uppercase(), price)
                .await;
        }
        Box::new(venue)
    } else {
        if cli.mark_price.is_some() {
            warn!("--mark-price only applies to --paper runs; ignoring it");
        }
        Box::new(BinanceClient::new(&config.binance)?)
    };
    info!(venue = %gateway.venue(), "Using venue");

    let mut observer = ObserverSet::new().with(LogObserver);
    if !cli.json {
        observer = observer.with(ConsoleObserver);
    }

    // Ctrl-C stops between orders; anything already placed stays live
    let cancellation = CancellationFlag::new();
    let cancel_on_signal = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, stopping after the current order...");
            cancel_on_signal.cancel();
        }
    });

    let runner = StrategyRunner::new(&*gateway, &observer)
        .with_default_buffer(config.strategy.bracket_buffer)
        .with_cancellation(cancellation);

    let report = run_command(cli.command, &runner, config.strategy.default_working_type)
        .await
        .context("Strategy aborted before any order was sent")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Build the request for `command` and run it.
async fn run_command(
    command: Commands,
    runner: &StrategyRunner<'_>,
    default_working_type: WorkingType,
) -> StrategyResult<StrategyReport> {
    let request = match command {
        Commands::Market {
            symbol,
            side,
            quantity,
        } => {
            let side = parse_side(&side)?;
            return runner
                .run_single(ChildOrderSpec::market(normalize(&symbol), side, quantity))
                .await;
        }
        Commands::Limit {
            symbol,
            side,
            quantity,
            price,
        } => {
            let side = parse_side(&side)?;
            return runner
                .run_single(ChildOrderSpec::limit(
                    normalize(&symbol),
                    side,
                    quantity,
                    price,
                ))
                .await;
        }
        Commands::Grid {
            symbol,
            side,
            quantity,
            min_price,
            max_price,
            grids,
        } => StrategyRequest::from_input(
            &symbol,
            &side,
            StrategyKind::Grid(GridParams {
                quantity_per_level: quantity,
                price_low: min_price,
                price_high: max_price,
                levels: grids,
            }),
        )?,
        Commands::Twap {
            symbol,
            side,
            total_quantity,
            chunks,
            interval,
        } => StrategyRequest::from_input(
            &symbol,
            &side,
            StrategyKind::TimeWeighted(TimeWeightedParams {
                total_quantity,
                chunks,
                interval_secs: interval,
            }),
        )?,
        Commands::Bracket {
            symbol,
            side,
            quantity,
            take_profit_price,
            stop_loss_price,
            buffer,
        } => StrategyRequest::from_input(
            &symbol,
            &side,
            StrategyKind::Bracket(BracketParams {
                quantity,
                take_profit: take_profit_price,
                stop_loss: stop_loss_price,
                buffer,
            }),
        )?,
        Commands::StopLimit {
            symbol,
            side,
            quantity,
            price,
            stop_price,
            working_type,
        } => StrategyRequest::from_input(
            &symbol,
            &side,
            StrategyKind::TriggeredLimit(TriggeredLimitParams {
                quantity,
                limit_price: price,
                trigger_price: stop_price,
                working_type: working_type.unwrap_or(default_working_type),
            }),
        )?,
    };

    runner.run(&request).await
}

fn parse_side(side: &str) -> StrategyResult<OrderSide> {
    side.parse().map_err(StrategyError::InvalidParameters)
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// Initialize logging: warnings to stderr, everything to the audit file.
fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("Failed to create log directory {}", config.directory))?;

    // File appender for the audit trail
    let file_appender = tracing_appender::rolling::hourly(&config.directory, &config.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("futures_order_bot=info".parse()?)
                .add_directive(Level::WARN.into()),
        )
        .with_writer(std::io::stderr.with_max_level(Level::WARN).and(file_writer))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .init();

    Ok(guard)
}
