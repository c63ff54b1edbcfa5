//! Console tables and curve export.

use crate::errors::Result;
use crate::models::{InvestResult, InvestmentEvaluation, SignalBar};
use crate::utils::format_timestamp_ms;
use colored::Colorize;
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

fn usd(value: f64) -> String {
    format!("{value:.2} USD")
}

fn usd_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), usd)
}

/// Side-by-side comparison of the strategies applied to one symbol.
pub fn render_report(symbol: &str, days: usize, results: &[(String, InvestResult)]) -> String {
    let row = |label: &str, cell: &dyn Fn(&InvestResult) -> String| {
        std::iter::once(label.to_owned())
            .chain(results.iter().map(|(_, r)| cell(r)))
            .collect::<Vec<_>>()
    };

    let mut builder = Builder::default();
    let names = results.iter().map(|(name, _)| name.clone());
    builder.push_record(std::iter::once(String::new()).chain(names));
    builder.push_record(row("Initial capital", &|r| format!("{:.0} USD", r.capital_start)));
    builder.push_record(row("Duration", &|_| format!("{days} x 1d")));
    builder.push_record(row("Final capital", &|r| {
        format!("{}\n ↳ {}", usd(r.capital_end), r.capital_structure())
    }));
    builder.push_record(row("Profit", &|r| usd(r.profit())));
    builder.push_record(row("Return", &|r| format!("{:.2}%", r.profit_percentage())));
    builder.push_record(row("Max drawdown", &|r| format!("{:.2}%", r.drawdown * 100.0)));
    builder.push_record(row("Platform fees", &|r| usd(r.platform_fees)));
    builder.push_record(row("Min capital", &|r| usd_or_na(r.min())));
    builder.push_record(row("Max capital", &|r| usd_or_na(r.max())));

    let mut table = builder.build();
    table.with(Style::rounded());
    let title = format!("Trailing Stop on {symbol}").bold().red();
    format!("{title}\n{table}")
}

/// Ranking of the best symbols out of `total` evaluated.
pub fn render_ranking(total: usize, best: &[InvestmentEvaluation]) -> String {
    let mut builder = Builder::default();
    builder.push_record([String::new(), "Profit".to_owned()]);
    for evaluation in best {
        builder.push_record([evaluation.symbol.clone(), usd(evaluation.profit())]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    let title = format!("Evaluate {total} symbols").bold().red();
    format!("{title}\n{table}")
}

/// Write prices, EMA and each strategy's capital curve as CSV.
pub fn write_curves(
    path: &Path,
    bars: &[SignalBar],
    results: &[(String, InvestResult)],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = ["open_time", "open", "high", "low", "close", "ema"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    header.extend(results.iter().map(|(name, _)| format!("capital ({name})")));
    writer.write_record(&header)?;

    for (i, bar) in bars.iter().enumerate() {
        let k = &bar.kline;
        let mut record = vec![
            format_timestamp_ms(k.open_time),
            k.open.to_string(),
            k.high.to_string(),
            k.low.to_string(),
            k.close.to_string(),
            bar.ema.map_or_else(String::new, |e| e.to_string()),
        ];
        record.extend(results.iter().map(|(_, r)| {
            r.capital_curve
                .get(i)
                .map_or_else(String::new, ToString::to_string)
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Kline;

    fn results() -> Vec<(String, InvestResult)> {
        let ts = InvestResult::new(1000.0, 1250.0, 0.0, 0.1, 2.5, vec![1000.0, 1250.0]);
        let hold = InvestResult::new(1000.0, 900.0, 0.0, 0.2, 2.0, vec![950.0]);
        vec![
            ("TS strat".to_owned(), ts.unwrap()),
            ("No strat".to_owned(), hold.unwrap()),
        ]
    }

    #[test]
    fn report_lists_every_strategy_and_metric() {
        colored::control::set_override(false);
        let out = render_report("BTCUSDT", 2, &results());
        assert!(out.starts_with("Trailing Stop on BTCUSDT"));
        let needles = [
            "TS strat",
            "No strat",
            "250.00 USD",
            "-100.00 USD",
            "25.00%",
            "20.00%",
            "2 x 1d",
            "liquidity",
        ];
        for needle in needles {
            assert!(out.contains(needle), "missing {needle} in\n{out}");
        }
    }

    #[test]
    fn ranking_shows_symbols_and_profit() {
        colored::control::set_override(false);
        let best = vec![InvestmentEvaluation {
            symbol: "SOLUSDT".into(),
            result: results().remove(0).1,
        }];
        let out = render_ranking(42, &best);
        assert!(out.starts_with("Evaluate 42 symbols"));
        assert!(out.contains("SOLUSDT"));
        assert!(out.contains("250.00 USD"));
    }

    #[test]
    fn curves_have_one_row_per_bar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.csv");
        let bars: Vec<SignalBar> = (0..3)
            .map(|i| SignalBar {
                kline: Kline::from_ohlc(i * 86_400_000, 1.0, 2.0, 0.5, 1.5),
                ema: (i > 0).then_some(1.25),
                rsi: None,
                buy: false,
                sell: false,
            })
            .collect();
        write_curves(&path, &bars, &results()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "open_time,open,high,low,close,ema,capital (TS strat),capital (No strat)"
        );
        assert_eq!(lines[1], "1970-01-01T00:00:00Z,1,2,0.5,1.5,,1000,950");
        assert_eq!(lines[3], "1970-01-03T00:00:00Z,1,2,0.5,1.5,1.25,,");
    }
}
