//! Capital simulations over generated signals.

pub mod daily;
pub mod trailing;

pub use daily::{NoStrategy, RatchetStopStrategy, SimpleStrategy};
pub use trailing::TrailingStopStrategy;

use crate::errors::Result;
use crate::models::InvestResult;

/// Binance spot fee per fill: 1‰.
pub const PLATFORM_FEE: f64 = 0.001;

/// A way of investing a starting capital over a period.
pub trait Strategy {
    fn name(&self) -> &str;

    fn apply(&self, capital: f64) -> Result<InvestResult>;
}

/// Cash/position bookkeeping shared by every strategy.
#[derive(Debug, Clone)]
pub(crate) struct Ledger {
    capital_start: f64,
    cash: f64,
    positions: f64,
    fees: f64,
    current: f64,
    peak: f64,
    drawdown: f64,
    curve: Vec<f64>,
}

impl Ledger {
    pub(crate) fn new(capital: f64) -> Self {
        Self {
            capital_start: capital,
            cash: capital,
            positions: 0.0,
            fees: 0.0,
            current: capital,
            peak: capital,
            drawdown: 0.0,
            curve: Vec::new(),
        }
    }

    pub(crate) fn holding(&self) -> bool {
        self.positions != 0.0
    }

    pub(crate) fn cash(&self) -> f64 {
        self.cash
    }

    /// Convert all cash into positions at `price`, minus the fee.
    pub(crate) fn buy(&mut self, price: f64) {
        self.positions = self.cash / price;
        self.fees += self.positions * price * PLATFORM_FEE;
        self.positions *= 1.0 - PLATFORM_FEE;
        self.cash = 0.0;
    }

    /// Convert all positions into cash at `price`, minus the fee.
    pub(crate) fn sell(&mut self, price: f64) {
        self.cash = self.positions * price;
        self.fees += self.cash * PLATFORM_FEE;
        self.cash *= 1.0 - PLATFORM_FEE;
        self.positions = 0.0;
    }

    /// Value the book at `close` and record it on the curve.
    pub(crate) fn mark(&mut self, close: f64) {
        self.current = if self.holding() {
            self.positions * close
        } else {
            self.cash
        };
        self.peak = self.peak.max(self.current);
        self.drawdown = self.drawdown.max((self.peak - self.current) / self.peak);
        self.curve.push(self.current);
    }

    /// Final result; the end capital is the last marked value.
    pub(crate) fn finish(self) -> Result<InvestResult> {
        InvestResult::new(
            self.capital_start,
            self.current,
            self.positions,
            self.drawdown,
            self.fees,
            self.curve,
        )
    }

    /// Final result after liquidating at `price`.
    pub(crate) fn liquidate(mut self, price: f64) -> Result<InvestResult> {
        if self.holding() {
            self.sell(price);
        }
        self.current = self.cash;
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_pays_fee_twice() {
        let mut ledger = Ledger::new(1000.0);
        ledger.buy(10.0);
        assert!(ledger.holding());
        assert!((ledger.positions - 99.9).abs() < 1e-9);
        ledger.mark(10.0);
        ledger.sell(10.0);
        assert!(!ledger.holding());
        ledger.mark(10.0);
        let result = ledger.finish().unwrap();
        assert!((result.capital_end - 998.001).abs() < 1e-9);
        assert!((result.platform_fees - (1.0 + 0.999)).abs() < 1e-9);
        assert_eq!(result.capital_structure(), "liquidity");
    }

    #[test]
    fn drawdown_tracks_worst_fall_from_peak() {
        let mut ledger = Ledger::new(100.0);
        ledger.buy(1.0);
        for close in [1.2, 0.6, 1.5, 1.35] {
            ledger.mark(close);
        }
        let result = ledger.finish().unwrap();
        assert!((result.drawdown - 0.5).abs() < 1e-9);
        assert_eq!(result.capital_curve.len(), 4);
        assert_eq!(result.capital_structure(), format!("{:.2} x 1.35", 99.9));
    }
}
