//! Buy/sell signal generation over daily klines.

use crate::indicators::{ema, macd, rsi};
use crate::models::{Kline, SignalBar, SignalSource};

/// Annotates klines with buy and sell signals.
pub trait OrderGenerator {
    fn generate(&self, klines: &[Kline]) -> Vec<SignalBar>;
}

/// Trend filter (close above its EMA) combined with RSI momentum.
#[derive(Debug, Clone, Copy)]
pub struct EmaRsiGenerator {
    pub ema_window: usize,
    pub rsi_window: usize,
    pub rsi_buy_threshold: f64,
    pub rsi_sell_threshold: f64,
}

impl Default for EmaRsiGenerator {
    fn default() -> Self {
        Self {
            ema_window: 25,
            rsi_window: 3,
            rsi_buy_threshold: 82.0,
            rsi_sell_threshold: 20.0,
        }
    }
}

impl OrderGenerator for EmaRsiGenerator {
    fn generate(&self, klines: &[Kline]) -> Vec<SignalBar> {
        let close: Vec<f64> = klines.iter().map(|k| k.close).collect();
        let ema = ema(&close, self.ema_window);
        let rsi = rsi(&close, self.rsi_window);

        klines
            .iter()
            .zip(ema.into_iter().zip(rsi))
            .map(|(kline, (ema, rsi))| SignalBar {
                kline: *kline,
                ema,
                rsi,
                buy: ema.is_some_and(|e| kline.close > e)
                    && rsi.is_some_and(|r| r > self.rsi_buy_threshold),
                sell: rsi.is_some_and(|r| r < self.rsi_sell_threshold),
            })
            .collect()
    }
}

/// Signals from the MACD histogram (MACD line minus its signal line).
#[derive(Debug, Clone, Copy)]
pub struct MacdGenerator {
    pub slow: usize,
    pub fast: usize,
    pub signal: usize,
    pub macd_buy_threshold: f64,
    pub macd_sell_threshold: f64,
}

impl Default for MacdGenerator {
    fn default() -> Self {
        Self {
            slow: 26,
            fast: 12,
            signal: 9,
            macd_buy_threshold: 0.0,
            macd_sell_threshold: -1.0,
        }
    }
}

impl OrderGenerator for MacdGenerator {
    fn generate(&self, klines: &[Kline]) -> Vec<SignalBar> {
        let close: Vec<f64> = klines.iter().map(|k| k.close).collect();
        let diff = macd(&close, self.slow, self.fast, self.signal).diff;

        klines
            .iter()
            .zip(diff)
            .map(|(kline, diff)| SignalBar {
                kline: *kline,
                ema: None,
                rsi: None,
                buy: diff.is_some_and(|d| d > self.macd_buy_threshold),
                sell: diff.is_some_and(|d| d < self.macd_sell_threshold),
            })
            .collect()
    }
}

/// Generate signals with the default parameters of `source`.
pub fn generate(source: SignalSource, klines: &[Kline]) -> Vec<SignalBar> {
    match source {
        SignalSource::EmaRsi => EmaRsiGenerator::default().generate(klines),
        SignalSource::Macd => MacdGenerator::default().generate(klines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn klines(closes: &[f64]) -> Vec<Kline> {
        (0_i64..)
            .zip(closes)
            .map(|(i, &c)| Kline::from_ohlc(i, c, c, c, c))
            .collect()
    }

    #[test]
    fn ema_rsi_buys_on_strong_rally_and_sells_on_collapse() {
        let generator = EmaRsiGenerator {
            ema_window: 3,
            rsi_window: 2,
            rsi_buy_threshold: 80.0,
            rsi_sell_threshold: 20.0,
        };
        let bars = generator.generate(&klines(&[10.0, 11.0, 12.0, 13.0, 6.0, 3.0]));

        assert!(!bars[0].buy && !bars[1].buy, "no signal during warm-up");
        assert!(bars[2].buy && bars[3].buy);
        assert!(!bars[4].buy && !bars[5].buy);
        assert!(bars[5].sell);
        assert!(bars.iter().take(4).all(|b| !b.sell));
    }

    #[test]
    fn macd_stays_silent_until_warmed_up() {
        let closes: Vec<f64> = (0..34).map(|i| 100.0 + f64::from(i)).collect();
        let bars = MacdGenerator::default().generate(&klines(&closes));
        assert!(bars[..33].iter().all(|b| !b.buy && !b.sell));
        assert_eq!(bars.len(), 34);
    }

    #[test]
    fn macd_buys_above_zero_and_sells_below_minus_one() {
        let generator = MacdGenerator {
            slow: 4,
            fast: 2,
            signal: 3,
            ..MacdGenerator::default()
        };
        let closes = [
            10.0, 10.0, 10.0, 10.0, 14.0, 18.0, 22.0, 22.0, 22.0, 16.0, 10.0, 4.0, 4.0,
        ];
        let bars = generator.generate(&klines(&closes));

        let buys: Vec<_> = (0..bars.len()).filter(|&i| bars[i].buy).collect();
        let sells: Vec<_> = (0..bars.len()).filter(|&i| bars[i].sell).collect();
        // diff: 0.76, 0.74, 0.07 on the rally, then -0.31, -1.22, -1.54, -1.42, -0.33
        assert_eq!(buys, [5, 6, 7]);
        assert_eq!(sells, [9, 10, 11]);
    }

    #[test]
    fn source_selects_generator() {
        let bars = generate(SignalSource::Macd, &klines(&[1.0, 2.0]));
        assert!(bars.iter().all(|b| b.ema.is_none() && b.rsi.is_none()));
        let bars = generate(SignalSource::EmaRsi, &klines(&[1.0; 30]));
        assert!(bars[29].ema.is_some());
    }
}
