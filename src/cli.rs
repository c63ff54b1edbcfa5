//! Command-line surface.

use crate::models::SignalSource;
use clap::builder::RangedI64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "road-to-billions",
    version,
    about = "Wayne: backtesting experiments on Binance spot klines"
)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file holding `api_key` and `api_secret` (environment variables win)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the analysis on one symbol
    #[command(arg_required_else_help = true)]
    EarnMoney(EarnMoneyArgs),

    /// Download the coin information to update the coin information JSON file
    DownloadCoinInfo {
        /// Output path
        #[arg(long, default_value = "assets/coin_info.json")]
        output_path: PathBuf,
    },

    /// Look for symbols to invest in
    EvaluateSymbolsOffline(EvaluateArgs),

    /// Exchange information helpers
    #[command(subcommand)]
    Test(TestCommand),
}

#[derive(Debug, Args)]
pub struct EarnMoneyArgs {
    /// Spot symbol, e.g. BTCUSDT
    pub symbol: String,

    /// Initial capital
    #[arg(long, default_value_t = 1000.0, value_parser = positive_capital)]
    pub capital: f64,

    /// Number of days
    #[arg(long, default_value_t = 1000, value_parser = day_limit())]
    pub limit: u16,

    /// Buy/sell signal generator
    #[arg(long, value_enum, default_value_t = Signals::EmaRsi)]
    pub signals: Signals,

    /// Display the report
    #[arg(long)]
    pub report: bool,

    /// Write the curves to this CSV file
    #[arg(long, value_name = "FILE", value_parser = output_csv)]
    pub curves: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Saved coin information; downloaded live when omitted
    #[arg(short, long = "input-path", value_parser = input_json)]
    pub input_path: Option<PathBuf>,

    /// Initial capital
    #[arg(short, long, default_value_t = 1000.0, value_parser = positive_capital)]
    pub capital: f64,

    /// Number of days
    #[arg(short, long, default_value_t = 1000, value_parser = day_limit())]
    pub limit: u16,

    /// Symbols evaluated concurrently
    #[arg(short, long, default_value_t = 4, value_parser = job_limit())]
    pub jobs: u16,

    /// Size of the ranking
    #[arg(short = 'n', long, default_value_t = 5)]
    pub top: usize,

    /// Buy/sell signal generator
    #[arg(long, value_enum, default_value_t = Signals::EmaRsi)]
    pub signals: Signals,
}

#[derive(Debug, Subcommand)]
pub enum TestCommand {
    /// Save the exchange information as JSON file
    SaveExchangeInfo {
        #[arg(value_parser = output_json)]
        output_json: PathBuf,
    },

    /// Load existing exchange information
    LoadExchangeInfo {
        #[arg(value_parser = input_json)]
        input_json: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Signals {
    /// EMA trend filter with RSI momentum
    EmaRsi,
    /// MACD histogram
    Macd,
}

impl From<Signals> for SignalSource {
    fn from(signals: Signals) -> Self {
        match signals {
            Signals::EmaRsi => Self::EmaRsi,
            Signals::Macd => Self::Macd,
        }
    }
}

fn positive_capital(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{raw:?} is not a number: {e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not in the range 0<x"))
    }
}

/// Binance serves at most 1000 daily klines per request.
fn day_limit() -> RangedI64ValueParser<u16> {
    clap::value_parser!(u16).range(1..=1000)
}

fn job_limit() -> RangedI64ValueParser<u16> {
    clap::value_parser!(u16).range(1..=32)
}

fn check_suffix(path: PathBuf, suffix: &str) -> Result<PathBuf, String> {
    if path.extension().and_then(|e| e.to_str()) == Some(suffix) {
        Ok(path)
    } else {
        Err(format!("file {} has wrong suffix (.{suffix})", path.display()))
    }
}

/// Output file: not a directory, expected suffix; overwriting is fine.
fn output_file(raw: &str, suffix: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        return Err(format!("{} is a directory", path.display()));
    }
    check_suffix(path, suffix)
}

fn output_json(raw: &str) -> Result<PathBuf, String> {
    output_file(raw, "json")
}

fn output_csv(raw: &str) -> Result<PathBuf, String> {
    output_file(raw, "csv")
}

/// Input file: must exist, expected suffix.
fn input_json(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if !path.is_file() {
        return Err(format!("file {} does not exist", path.display()));
    }
    check_suffix(path, "json")
}
