//! Runs every strategy on one symbol.

use crate::cex::BinanceClient;
use crate::errors::Result;
use crate::models::{InvestResult, InvestmentEvaluation, Kline, SignalBar, SignalSource};
use crate::signals;
use crate::strategy::{
    NoStrategy, RatchetStopStrategy, SimpleStrategy, Strategy, TrailingStopStrategy,
};
use tracing::debug;

/// Stop loss distance used by the stop-based strategies.
pub const STOP_LOSS_PCT: f64 = 0.2;
/// Breakout distance that ratchets the daily stop upwards.
pub const TRAILING_STOP_PCT: f64 = 0.001;

/// Everything produced by one evaluation run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Daily bars with indicators and signals.
    pub signals: Vec<SignalBar>,
    /// One result per strategy, in report order.
    pub results: Vec<(String, InvestResult)>,
    /// Headline result (trailing stop), used to rank symbols.
    pub evaluation: InvestmentEvaluation,
}

/// Evaluates the strategies for one symbol over fixed market data.
#[derive(Debug, Clone)]
pub struct Evaluator {
    symbol: String,
    capital: f64,
    days: Vec<Kline>,
    hours: Vec<Kline>,
}

impl Evaluator {
    pub fn new(
        symbol: impl Into<String>,
        capital: f64,
        days: Vec<Kline>,
        hours: Vec<Kline>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            capital,
            days,
            hours,
        }
    }

    /// Download the last `limit` days (and matching hours) of `symbol`.
    pub async fn fetch(
        client: &BinanceClient,
        symbol: &str,
        capital: f64,
        limit: u16,
    ) -> Result<Self> {
        let (days, hours) = client.day_hour_klines(symbol, limit).await?;
        Ok(Self::new(symbol, capital, days, hours))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of daily bars evaluated.
    pub fn duration_days(&self) -> usize {
        self.days.len()
    }

    /// Run the analysis.
    pub fn earn_money(&self, source: SignalSource) -> Result<Evaluation> {
        let signals = signals::generate(source, &self.days);

        let trailing = TrailingStopStrategy::new(&signals, &self.hours, STOP_LOSS_PCT);
        let simple = SimpleStrategy::new(&signals);
        let ratchet = RatchetStopStrategy::new(&signals, STOP_LOSS_PCT, TRAILING_STOP_PCT, true);
        let hold = NoStrategy::new(&signals);
        let strategies: [&dyn Strategy; 4] = [&trailing, &simple, &ratchet, &hold];

        let results = strategies
            .iter()
            .map(|s| -> Result<(String, InvestResult)> {
                Ok((s.name().to_owned(), s.apply(self.capital)?))
            })
            .collect::<Result<Vec<_>>>()?;
        for (name, result) in &results {
            debug!(
                symbol = %self.symbol,
                strategy = %name,
                profit = result.profit(),
                "[EVAL] strategy applied"
            );
        }

        let evaluation = InvestmentEvaluation {
            symbol: self.symbol.clone(),
            result: results[0].1.clone(),
        };
        Ok(Evaluation {
            signals,
            results,
            evaluation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HOUR_MS;

    fn market(days: i64) -> (Vec<Kline>, Vec<Kline>) {
        let price = |i: i64| (i as f64 * 0.3).sin().mul_add(10.0, 100.0 + i as f64);
        let days_k = (0..days)
            .map(|d| {
                let p = price(d);
                Kline::from_ohlc(d * 24 * HOUR_MS, p, p * 1.01, p * 0.99, p)
            })
            .collect();
        let hours_k = (0..days * 24)
            .map(|h| {
                let p = price(h / 24);
                Kline::from_ohlc(h * HOUR_MS, p, p, p, p)
            })
            .collect();
        (days_k, hours_k)
    }

    #[test]
    fn runs_all_strategies_in_report_order() {
        let (days, hours) = market(60);
        let evaluator = Evaluator::new("BTCUSDT", 1000.0, days, hours);
        let out = evaluator.earn_money(SignalSource::EmaRsi).unwrap();

        let names: Vec<_> = out.results.iter().map(|(n, _)| n.as_str()).collect();
        let expected = ["TS strat", "Simple strat", "Ratchet strat", "No strat"];
        assert_eq!(names, expected);
        assert_eq!(out.signals.len(), 60);
        assert_eq!(out.evaluation.symbol, "BTCUSDT");
        assert_eq!(out.evaluation.result, out.results[0].1);
        for (_, r) in &out.results {
            assert_eq!(r.capital_curve.len(), 60);
            assert!((0.0..=1.0).contains(&r.drawdown));
        }
    }

    #[test]
    fn macd_source_is_supported() {
        let (days, hours) = market(40);
        let out = Evaluator::new("ETHUSDT", 250.0, days, hours)
            .earn_money(SignalSource::Macd)
            .unwrap();
        assert!(out.signals.iter().all(|b| b.ema.is_none()));
        assert_eq!(out.results.len(), 4);
    }

    #[test]
    fn empty_market_is_an_error() {
        let evaluator = Evaluator::new("NOPEUSDT", 1000.0, vec![], vec![]);
        assert!(evaluator.earn_money(SignalSource::EmaRsi).is_err());
    }
}
