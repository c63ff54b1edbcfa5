//! Technical indicators over close prices.
//!
//! All averages are recursive exponential moving averages seeded with the
//! first observation. A value is only reported once `window` observations
//! have been seen; before that the slot is `None`.

/// MACD line, signal line and their difference.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub diff: Vec<Option<f64>>,
}

/// Recursive EWM with smoothing factor `alpha`, skipping leading gaps.
fn ewm(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut state: Option<f64> = None;
    let mut seen = 0usize;
    for value in values {
        if let Some(x) = *value {
            state = Some(state.map_or(x, |prev| (1.0 - alpha).mul_add(prev, alpha * x)));
            seen += 1;
        }
        out.push(state.filter(|_| seen >= min_periods.max(1)));
    }
    out
}

fn span_alpha(window: usize) -> f64 {
    2.0 / (window as f64 + 1.0)
}

/// Exponential moving average with span `window`.
pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let values: Vec<_> = values.iter().copied().map(Some).collect();
    ewm(&values, span_alpha(window), window)
}

/// Relative strength index with Wilder smoothing.
pub fn rsi(close: &[f64], window: usize) -> Vec<Option<f64>> {
    let diffs = std::iter::once(0.0).chain(close.windows(2).map(|w| w[1] - w[0]));
    let (gains, losses): (Vec<_>, Vec<_>) = diffs
        .map(|d| (Some(d.max(0.0)), Some((-d).max(0.0))))
        .unzip();

    let alpha = 1.0 / window as f64;
    let avg_gain = ewm(&gains, alpha, window);
    let avg_loss = ewm(&losses, alpha, window);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(0.0)) => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - 100.0 / (1.0 + gain / loss)),
            _ => None,
        })
        .collect()
}

/// Moving average convergence divergence.
pub fn macd(close: &[f64], slow: usize, fast: usize, signal: usize) -> Macd {
    let ema_fast = ema(close, fast);
    let ema_slow = ema(close, slow);
    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ewm(&line, span_alpha(signal), signal);
    let diff = line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();
    Macd {
        macd: line,
        signal: signal_line,
        diff,
    }
}
