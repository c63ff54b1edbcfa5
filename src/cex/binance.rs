use crate::cex::types::{ApiErrorBody, CoinInfo, RawKline, tradable_coins};
use crate::config::{AppConfig, Credentials};
use crate::errors::{AppError, Result};
use crate::models::{HOUR_MS, Kline};
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use sha2::Sha256;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

const KLINES_PATH: &str = "/api/v3/uiKlines";
const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
const COIN_INFO_PATH: &str = "/sapi/v1/capital/config/getall";

/// Largest page Binance serves for klines.
pub const MAX_KLINES: u16 = 1000;

/// Kline granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Hour,
    Day,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "1d",
        }
    }
}

/// Thin client over the Binance spot REST API.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: Url,
    config: AppConfig,
}

impl BinanceClient {
    /// Build a client; credentials are only checked when a signed endpoint is used.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(&config.api_url)?,
            config: config.clone(),
        })
    }

    /// Fetch one page of klines.
    pub async fn klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<u16>,
        start_time: Option<i64>,
    ) -> Result<Vec<Kline>> {
        let mut url = self.base_url.join(KLINES_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("symbol", symbol)
                .append_pair("interval", interval.as_str());
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(start) = start_time {
                query.append_pair("startTime", &start.to_string());
            }
        }
        debug!(symbol, interval = interval.as_str(), ?start_time, "[CEX] fetching klines");

        let body = self.get(url, None).await?;
        let raw: Vec<RawKline> = serde_json::from_str(&body)?;
        raw.into_iter().map(Kline::try_from).collect()
    }

    /// Daily klines, most recent `limit` days.
    pub async fn day_klines(&self, symbol: &str, limit: u16) -> Result<Vec<Kline>> {
        self.klines(symbol, Interval::Day, Some(limit), None).await
    }

    /// Daily klines plus the hourly klines covering the same period.
    pub async fn day_hour_klines(
        &self,
        symbol: &str,
        limit: u16,
    ) -> Result<(Vec<Kline>, Vec<Kline>)> {
        let days = self.day_klines(symbol, limit).await?;
        let hours = hours_covering(symbol, &days, move |start| {
            self.klines(symbol, Interval::Hour, Some(MAX_KLINES), Some(start))
        })
        .await?;

        info!(
            symbol,
            days = days.len(),
            hours = hours.len(),
            "[CEX] klines fetched"
        );
        Ok((days, hours))
    }

    /// Raw coin-information JSON, as served by Binance.
    pub async fn raw_coin_info(&self) -> Result<String> {
        let Credentials { api_key, api_secret } = self.config.credentials()?;
        let mut url = self.base_url.join(COIN_INFO_PATH)?;
        url.query_pairs_mut()
            .append_pair("recvWindow", &self.config.recv_window_ms.to_string())
            .append_pair("timestamp", &chrono::Utc::now().timestamp_millis().to_string());
        let signature = sign(&api_secret, url.query().unwrap_or_default())?;
        url.query_pairs_mut().append_pair("signature", &signature);

        self.get(url, Some(&api_key)).await
    }

    /// Tradable coins from the live coin information.
    pub async fn coin_info(&self) -> Result<Vec<CoinInfo>> {
        tradable_coins(&self.raw_coin_info().await?)
    }

    /// Raw exchange-information JSON, as served by Binance.
    pub async fn raw_exchange_info(&self) -> Result<String> {
        let url = self.base_url.join(EXCHANGE_INFO_PATH)?;
        self.get(url, None).await
    }

    async fn get(&self, url: Url, api_key: Option<&str>) -> Result<String> {
        let mut request = self.http.get(url);
        if let Some(key) = api_key {
            request = request.header("X-MBX-APIKEY", key);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(api_error(status, &body))
        }
    }
}

/// Hourly klines from the first day's open until the last day is covered.
///
/// `fetch_page` returns the page starting at the given open time. An empty
/// page ends the pagination even if the last day is not reached yet.
pub async fn hours_covering<F, Fut>(
    symbol: &str,
    days: &[Kline],
    mut fetch_page: F,
) -> Result<Vec<Kline>>
where
    F: FnMut(i64) -> Fut + Send,
    Fut: Future<Output = Result<Vec<Kline>>> + Send,
{
    let first = days
        .first()
        .ok_or_else(|| AppError::NoData(symbol.to_owned()))?;

    let mut hours = fetch_page(first.open_time).await?;
    while let Some(start) = next_hour_page_start(days, &hours) {
        let page = fetch_page(start).await?;
        if page.is_empty() {
            break;
        }
        hours.extend(page);
    }
    Ok(hours)
}

/// Start time of the next hourly page, while the hours lag behind the last day.
pub fn next_hour_page_start(days: &[Kline], hours: &[Kline]) -> Option<i64> {
    let last_day = days.last()?.open_time;
    let last_hour = hours.last()?.open_time;
    (last_day > last_hour).then_some(last_hour + HOUR_MS)
}

/// HMAC-SHA256 signature of a query string, hex encoded.
pub fn sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("invalid API secret: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn api_error(status: StatusCode, body: &str) -> AppError {
    serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| AppError::Api {
            code: i64::from(status.as_u16()),
            message: body.trim().to_owned(),
        },
        Into::into,
    )
}

/// Tradable coins from a coin-information file saved earlier.
pub fn load_coin_info(path: &Path) -> Result<Vec<CoinInfo>> {
    tradable_coins(&std::fs::read_to_string(path)?)
}
