use super::{Ledger, Strategy};
use crate::errors::Result;
use crate::models::{InvestResult, Kline, SignalBar};

/// Enter on daily buy signals, exit on an hourly trailing stop loss.
///
/// While holding, every hourly close raises the stop to `close * (1 - stop_loss_pct)`
/// and the position is sold at the stop as soon as a close falls below it. Day bars
/// are consumed when the hourly walk reaches their open time; the capital curve has
/// one point per consumed day.
#[derive(Debug, Clone, Copy)]
pub struct TrailingStopStrategy<'a> {
    days: &'a [SignalBar],
    hours: &'a [Kline],
    pub stop_loss_pct: f64,
}

impl<'a> TrailingStopStrategy<'a> {
    pub fn new(days: &'a [SignalBar], hours: &'a [Kline], stop_loss_pct: f64) -> Self {
        Self {
            days,
            hours,
            stop_loss_pct,
        }
    }
}

impl Strategy for TrailingStopStrategy<'_> {
    fn name(&self) -> &str {
        "TS strat"
    }

    fn apply(&self, capital: f64) -> Result<InvestResult> {
        let keep = 1.0 - self.stop_loss_pct;
        let mut ledger = Ledger::new(capital);
        let mut stop_loss = 0.0_f64;
        let mut day = 0;

        for hour in self.hours {
            if ledger.holding() {
                stop_loss = stop_loss.max(hour.close * keep);
                if hour.close < stop_loss {
                    ledger.sell(stop_loss);
                }
            }

            // Gaps in the hourly series must not stall the daily walk.
            while let Some(bar) = self
                .days
                .get(day)
                .filter(|b| b.kline.open_time <= hour.open_time)
            {
                if !ledger.holding() && bar.buy && ledger.cash() > 0.0 {
                    ledger.buy(bar.kline.close);
                    stop_loss = bar.kline.close * keep;
                }
                day += 1;
                ledger.mark(bar.kline.close);
            }
        }
        ledger.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HOUR_MS;

    const DAY_MS: i64 = 24 * HOUR_MS;

    fn day(index: i64, close: f64, buy: bool) -> SignalBar {
        SignalBar {
            kline: Kline::from_ohlc(index * DAY_MS, close, close, close, close),
            ema: None,
            rsi: None,
            buy,
            sell: false,
        }
    }

    fn hours(closes: &[(i64, f64)]) -> Vec<Kline> {
        closes
            .iter()
            .map(|&(h, c)| Kline::from_ohlc(h * HOUR_MS, c, c, c, c))
            .collect()
    }

    #[test]
    fn stop_follows_hourly_highs_and_triggers() {
        let days = [day(0, 100.0, true), day(1, 90.0, false)];
        let hours = hours(&[(0, 100.0), (1, 120.0), (2, 130.0), (3, 100.0), (24, 90.0)]);
        let r = TrailingStopStrategy::new(&days, &hours, 0.2).apply(1000.0).unwrap();

        // Bought at 100; stop raised to 104 by the 130 close; 100 < 104 sells at 104.
        let expected = 1000.0 * 0.999 / 100.0 * 104.0 * 0.999;
        assert!((r.capital_end - expected).abs() < 1e-9);
        assert_eq!(r.positions_end, 0.0);
        assert_eq!(r.capital_curve.len(), 2);
    }

    #[test]
    fn holds_when_stop_is_never_hit() {
        let days = [day(0, 100.0, true), day(1, 110.0, false)];
        let hours = hours(&[(0, 100.0), (5, 95.0), (24, 110.0)]);
        let r = TrailingStopStrategy::new(&days, &hours, 0.2).apply(1000.0).unwrap();
        assert!(r.positions_end > 0.0);
        assert!((r.capital_end - 9.99 * 110.0).abs() < 1e-9);
    }

    #[test]
    fn missing_hours_still_consume_days() {
        let days = [day(0, 100.0, false), day(1, 100.0, false), day(2, 100.0, false)];
        // Hour 24 is missing: day 1 is consumed together with day 2.
        let hours = hours(&[(0, 100.0), (23, 100.0), (48, 100.0)]);
        let r = TrailingStopStrategy::new(&days, &hours, 0.2).apply(1000.0).unwrap();
        assert_eq!(r.capital_curve.len(), 3);
        assert_eq!(r.capital_end, 1000.0);
    }
}
