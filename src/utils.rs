//! Miscellaneous helper utilities.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, de};
use std::future::Future;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level (`debug` when verbose).
/// Logs go to stderr; stdout is reserved for reports.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Drive `task` to completion unless `interrupt` resolves with `Ok` first.
///
/// Returns `None` when interrupted. An `interrupt` that fails (for instance a
/// signal handler that can't be installed) is ignored and `task` runs on.
pub async fn until_interrupted<T, F, I>(task: F, interrupt: I) -> Option<T>
where
    T: Send,
    F: Future<Output = T> + Send,
    I: Future<Output = std::io::Result<()>> + Send,
{
    tokio::select! {
        out = task => Some(out),
        Ok(()) = interrupt => None,
    }
}

/// Render a millisecond Unix timestamp as RFC 3339 (UTC).
pub fn format_timestamp_ms(ms: i64) -> String {
    let render = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);
    DateTime::<Utc>::from_timestamp_millis(ms).map_or_else(|| ms.to_string(), render)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(f64),
}

/// Binance sends decimals as strings ("0.01000000"); accept both forms.
pub fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Str(s) => s.trim().parse().map_err(de::Error::custom),
        StrOrNum::Num(n) => Ok(n),
    }
}

pub fn de_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<StrOrNum>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StrOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(StrOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
        Some(StrOrNum::Num(n)) => Ok(Some(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "de_f64")]
        price: f64,
        #[serde(default, deserialize_with = "de_opt_f64")]
        dust: Option<f64>,
    }

    #[test]
    fn decimals_from_strings_and_numbers() {
        let s: Sample = serde_json::from_str(r#"{"price":"0.01000000","dust":"0.0001"}"#).unwrap();
        assert_eq!(s.price, 0.01);
        assert_eq!(s.dust, Some(0.0001));

        let s: Sample = serde_json::from_str(r#"{"price":12.5}"#).unwrap();
        assert_eq!(s.price, 12.5);
        assert_eq!(s.dust, None);

        assert!(serde_json::from_str::<Sample>(r#"{"price":"abc"}"#).is_err());
    }

    #[test]
    fn timestamps_render_as_utc() {
        let rendered = format_timestamp_ms(1_700_000_000_000);
        assert_eq!(rendered, "2023-11-14T22:13:20Z");
    }

    #[tokio::test]
    async fn interrupt_cancels_the_task() {
        let out = until_interrupted(std::future::pending::<u8>(), async { Ok(()) }).await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn failed_interrupt_lets_the_task_finish() {
        let broken = async { Err(std::io::Error::other("no signal handler")) };
        let task = async {
            tokio::task::yield_now().await;
            7
        };
        assert_eq!(until_interrupted(task, broken).await, Some(7));
    }
}
