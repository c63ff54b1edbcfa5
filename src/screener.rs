//! Evaluate many symbols and rank them.

use crate::cex::{BinanceClient, CoinInfo};
use crate::errors::{AppError, Result};
use crate::evaluator::Evaluator;
use crate::models::{InvestmentEvaluation, SignalSource};
use futures::{Future, StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let template = "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

/// Run `evaluate` on every symbol with at most `jobs` evaluations in flight.
///
/// A progress bar advances as symbols finish. Failed symbols are logged
/// and left out of the results.
pub async fn screen<F, Fut>(
    symbols: Vec<String>,
    jobs: usize,
    evaluate: F,
) -> Vec<InvestmentEvaluation>
where
    F: Fn(String) -> Fut + Sync,
    Fut: Future<Output = Result<InvestmentEvaluation>> + Send,
{
    let progress = progress_bar(symbols.len());
    let bar = &progress;
    let evaluate = &evaluate;
    let results: Vec<_> = stream::iter(symbols)
        .map(|symbol| async move {
            let outcome = evaluate(symbol.clone()).await;
            (symbol, outcome)
        })
        .buffer_unordered(jobs.max(1))
        .filter_map(|(symbol, outcome)| async move {
            bar.inc(1);
            match outcome {
                Ok(evaluation) => {
                    debug!(
                        symbol = %symbol,
                        profit = evaluation.profit(),
                        "[SCREEN] evaluated"
                    );
                    Some(evaluation)
                }
                Err(e) => {
                    bar.suspend(|| {
                        warn!(%symbol, error = %e, "[SCREEN] evaluation failed, skipping");
                    });
                    None
                }
            }
        })
        .collect()
        .await;
    progress.finish_and_clear();
    results
}

/// Evaluate every coin's USDT symbol on live market data.
pub async fn evaluate_symbols(
    client: &BinanceClient,
    coins: &[CoinInfo],
    capital: f64,
    limit: u16,
    jobs: usize,
    source: SignalSource,
) -> Vec<InvestmentEvaluation> {
    let symbols = coins.iter().map(CoinInfo::symbol).collect();
    info!(symbols = coins.len(), jobs, "[SCREEN] evaluating symbols");
    screen(symbols, jobs, |symbol| async move {
        let evaluator = Evaluator::fetch(client, &symbol, capital, limit).await?;
        Ok::<_, AppError>(evaluator.earn_money(source)?.evaluation)
    })
    .await
}

/// The `n` most profitable evaluations, best first.
pub fn best(mut results: Vec<InvestmentEvaluation>, n: usize) -> Vec<InvestmentEvaluation> {
    results.sort_by(|a, b| b.cmp(a));
    results.truncate(n);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvestResult;

    fn evaluation(symbol: &str, capital_end: f64) -> InvestmentEvaluation {
        InvestmentEvaluation {
            symbol: symbol.to_owned(),
            result: InvestResult::new(1000.0, capital_end, 0.0, 0.0, 0.0, vec![capital_end])
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn failures_are_skipped() {
        let symbols = vec!["AUSDT".to_owned(), "BADUSDT".to_owned(), "CUSDT".to_owned()];
        let results = screen(symbols, 2, |symbol| async move {
            if symbol == "BADUSDT" {
                Err(AppError::NoData(symbol))
            } else {
                Ok(evaluation(&symbol, 1100.0))
            }
        })
        .await;

        let mut names: Vec<_> = results.into_iter().map(|e| e.symbol).collect();
        names.sort();
        assert_eq!(names, ["AUSDT", "CUSDT"]);
    }

    #[tokio::test]
    async fn zero_jobs_still_makes_progress() {
        let results = screen(vec!["AUSDT".to_owned()], 0, |symbol| async move {
            Ok::<_, AppError>(evaluation(&symbol, 900.0))
        })
        .await;
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn best_keeps_top_n_descending() {
        let results = vec![
            evaluation("A", 1010.0),
            evaluation("B", 1500.0),
            evaluation("C", 700.0),
            evaluation("D", 1200.0),
        ];
        let top: Vec<_> = best(results, 2).into_iter().map(|e| e.symbol).collect();
        assert_eq!(top, ["B", "D"]);
    }
}
