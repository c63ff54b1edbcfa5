//! Shared data structures used throughout the application.

use crate::errors::{AppError, Result};
use std::cmp::Ordering;

/// One hour in milliseconds, the step between two hourly klines.
pub const HOUR_MS: i64 = 3_600_000;

/// A single candlestick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kline {
    /// Open time, milliseconds since the Unix epoch (UTC).
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Close time, milliseconds since the Unix epoch (UTC).
    pub close_time: i64,
    pub quote_volume: f64,
    pub trades: u64,
    pub taker_buy_base_volume: f64,
    pub taker_buy_quote_volume: f64,
}

impl Kline {
    /// Minimal candle, used where only prices matter.
    pub fn from_ohlc(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume: 0.0,
            close_time: open_time,
            quote_volume: 0.0,
            trades: 0,
            taker_buy_base_volume: 0.0,
            taker_buy_quote_volume: 0.0,
        }
    }
}

/// Kline annotated by an order generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalBar {
    pub kline: Kline,
    /// Exponential moving average of the close, once warmed up.
    pub ema: Option<f64>,
    /// Relative strength index of the close, once warmed up.
    pub rsi: Option<f64>,
    pub buy: bool,
    pub sell: bool,
}

/// Which order generator produces the buy/sell signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalSource {
    #[default]
    EmaRsi,
    Macd,
}

/// Result of an investment strategy over a period.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestResult {
    pub capital_start: f64,
    pub capital_end: f64,
    pub positions_end: f64,
    /// Maximum drawdown as a fraction of the running peak.
    pub drawdown: f64,
    pub platform_fees: f64,
    pub capital_curve: Vec<f64>,
}

impl InvestResult {
    pub fn new(
        capital_start: f64,
        capital_end: f64,
        positions_end: f64,
        drawdown: f64,
        platform_fees: f64,
        capital_curve: Vec<f64>,
    ) -> Result<Self> {
        if capital_start.is_nan() || capital_start <= 0.0 {
            return Err(AppError::Validation(format!(
                "starting capital must be positive, got {capital_start}"
            )));
        }
        if positions_end.is_nan() || positions_end < 0.0 {
            return Err(AppError::Validation(format!(
                "final positions can't be negative, got {positions_end}"
            )));
        }
        if !(0.0..=1.0).contains(&drawdown) {
            return Err(AppError::Validation(format!(
                "drawdown must lie in [0, 1], got {drawdown}"
            )));
        }
        Ok(Self {
            capital_start,
            capital_end,
            positions_end,
            drawdown,
            platform_fees,
            capital_curve,
        })
    }

    /// Profit on the period.
    pub fn profit(&self) -> f64 {
        self.capital_end - self.capital_start
    }

    /// Profit on the period, in percent of the starting capital.
    pub fn profit_percentage(&self) -> f64 {
        self.profit() / self.capital_start * 100.0
    }

    pub fn max(&self) -> Option<f64> {
        self.capital_curve.iter().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.capital_curve.iter().copied().reduce(f64::min)
    }

    /// How the final capital is held: cash, or `quantity x unit value`.
    pub fn capital_structure(&self) -> String {
        if self.positions_end == 0.0 {
            "liquidity".to_owned()
        } else {
            format!(
                "{:.2} x {:.2}",
                self.positions_end,
                self.capital_end / self.positions_end
            )
        }
    }
}

/// Outcome of evaluating one symbol, ordered by profit.
#[derive(Debug, Clone)]
pub struct InvestmentEvaluation {
    pub symbol: String,
    pub result: InvestResult,
}

impl InvestmentEvaluation {
    pub fn profit(&self) -> f64 {
        self.result.profit()
    }
}

impl PartialEq for InvestmentEvaluation {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for InvestmentEvaluation {}

impl PartialOrd for InvestmentEvaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InvestmentEvaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.profit().total_cmp(&other.profit())
    }
}
