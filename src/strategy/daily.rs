//! Strategies evaluated on daily bars only.

use super::{Ledger, Strategy};
use crate::errors::{AppError, Result};
use crate::models::{InvestResult, SignalBar};

/// Buy on the first close, hold, sell on the last close.
#[derive(Debug, Clone, Copy)]
pub struct NoStrategy<'a> {
    days: &'a [SignalBar],
}

impl<'a> NoStrategy<'a> {
    pub fn new(days: &'a [SignalBar]) -> Self {
        Self { days }
    }
}

impl Strategy for NoStrategy<'_> {
    fn name(&self) -> &str {
        "No strat"
    }

    fn apply(&self, capital: f64) -> Result<InvestResult> {
        let (Some(first), Some(last)) = (self.days.first(), self.days.last()) else {
            return Err(AppError::NoData("buy and hold".into()));
        };

        let mut ledger = Ledger::new(capital);
        ledger.buy(first.kline.close);
        for bar in self.days {
            ledger.mark(bar.kline.close);
        }
        ledger.liquidate(last.kline.close)
    }
}

/// Follow the signals: buy when flat and told to buy, sell when holding and told to sell.
#[derive(Debug, Clone, Copy)]
pub struct SimpleStrategy<'a> {
    days: &'a [SignalBar],
}

impl<'a> SimpleStrategy<'a> {
    pub fn new(days: &'a [SignalBar]) -> Self {
        Self { days }
    }
}

impl Strategy for SimpleStrategy<'_> {
    fn name(&self) -> &str {
        "Simple strat"
    }

    fn apply(&self, capital: f64) -> Result<InvestResult> {
        let mut ledger = Ledger::new(capital);
        for bar in self.days {
            if !ledger.holding() {
                if bar.buy && ledger.cash() > 0.0 {
                    ledger.buy(bar.kline.close);
                }
            } else if bar.sell {
                ledger.sell(bar.kline.close);
            }
            ledger.mark(bar.kline.close);
        }
        ledger.finish()
    }
}

/// Stop loss raised whenever the daily high breaks a target above the last reference.
///
/// With `secure`, the target is moved up along with the stop; otherwise it stays
/// at the entry target.
#[derive(Debug, Clone, Copy)]
pub struct RatchetStopStrategy<'a> {
    days: &'a [SignalBar],
    pub stop_loss_pct: f64,
    pub trailing_stop_pct: f64,
    pub secure: bool,
}

impl<'a> RatchetStopStrategy<'a> {
    pub fn new(
        days: &'a [SignalBar],
        stop_loss_pct: f64,
        trailing_stop_pct: f64,
        secure: bool,
    ) -> Self {
        Self {
            days,
            stop_loss_pct,
            trailing_stop_pct,
            secure,
        }
    }
}

impl Strategy for RatchetStopStrategy<'_> {
    fn name(&self) -> &str {
        "Ratchet strat"
    }

    fn apply(&self, capital: f64) -> Result<InvestResult> {
        let mut ledger = Ledger::new(capital);
        let mut stop_loss = 0.0;
        let mut target = 0.0;

        for bar in self.days {
            let k = &bar.kline;
            if !ledger.holding() {
                if bar.buy && ledger.cash() > 0.0 {
                    ledger.buy(k.close);
                    stop_loss = k.close * (1.0 - self.stop_loss_pct);
                    target = k.close * (1.0 + self.trailing_stop_pct);
                }
            } else if k.high > target {
                stop_loss = k.high * (1.0 - self.stop_loss_pct);
                if self.secure {
                    target = k.high * (1.0 + self.trailing_stop_pct);
                }
            } else if k.low < stop_loss {
                ledger.sell(stop_loss);
            }
            ledger.mark(k.close);
        }
        ledger.finish()
    }
}
