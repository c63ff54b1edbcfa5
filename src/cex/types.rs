//! Binance REST payloads.

use crate::errors::{AppError, Result};
use crate::models::Kline;
use crate::utils::{de_f64, de_opt_f64};
use serde::Deserialize;
use serde::de::IgnoredAny;

/// Quote asset every screened symbol is traded against.
pub const QUOTE_ASSET: &str = "USDT";

/// Error body returned by Binance alongside a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

impl From<ApiErrorBody> for AppError {
    fn from(body: ApiErrorBody) -> Self {
        Self::Api {
            code: body.code,
            message: body.msg,
        }
    }
}

/// Positional kline array as sent by `/api/v3/uiKlines`.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    u64,
    String,
    String,
    IgnoredAny,
);

impl TryFrom<RawKline> for Kline {
    type Error = AppError;

    fn try_from(raw: RawKline) -> Result<Self> {
        Ok(Self {
            open_time: raw.0,
            open: raw.1.parse()?,
            high: raw.2.parse()?,
            low: raw.3.parse()?,
            close: raw.4.parse()?,
            volume: raw.5.parse()?,
            close_time: raw.6,
            quote_volume: raw.7.parse()?,
            trades: raw.8,
            taker_buy_base_volume: raw.9.parse()?,
            taker_buy_quote_volume: raw.10.parse()?,
        })
    }
}

/// Deposit/withdrawal network of a coin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub network: String,
    pub coin: String,
    #[serde(deserialize_with = "de_f64")]
    pub withdraw_integer_multiple: f64,
    pub is_default: bool,
    pub deposit_enable: bool,
    pub withdraw_enable: bool,
    #[serde(default)]
    pub deposit_desc: String,
    #[serde(default)]
    pub withdraw_desc: String,
    #[serde(default)]
    pub special_tips: String,
    #[serde(default)]
    pub special_withdraw_tips: String,
    pub name: String,
    pub reset_address_status: bool,
    #[serde(default)]
    pub address_regex: String,
    #[serde(default)]
    pub memo_regex: String,
    #[serde(deserialize_with = "de_f64")]
    pub withdraw_fee: f64,
    #[serde(deserialize_with = "de_f64")]
    pub withdraw_min: f64,
    #[serde(deserialize_with = "de_f64")]
    pub withdraw_max: f64,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub withdraw_internal_min: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub deposit_dust: Option<f64>,
    pub min_confirm: u32,
    pub un_lock_confirm: u32,
    pub same_address: bool,
    #[serde(default)]
    pub estimated_arrival_time: u64,
    pub busy: bool,
    #[serde(default)]
    pub contract_address_url: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
}

/// Coin information from `/sapi/v1/capital/config/getall`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinInfo {
    pub coin: String,
    pub deposit_all_enable: bool,
    pub withdraw_all_enable: bool,
    pub name: String,
    #[serde(deserialize_with = "de_f64")]
    pub free: f64,
    #[serde(deserialize_with = "de_f64")]
    pub locked: f64,
    #[serde(deserialize_with = "de_f64")]
    pub freeze: f64,
    #[serde(deserialize_with = "de_f64")]
    pub withdrawing: f64,
    #[serde(deserialize_with = "de_f64")]
    pub ipoing: f64,
    #[serde(deserialize_with = "de_f64")]
    pub ipoable: f64,
    #[serde(deserialize_with = "de_f64")]
    pub storage: f64,
    pub is_legal_money: bool,
    pub trading: bool,
    pub network_list: Vec<Network>,
}

impl CoinInfo {
    /// Spot symbol of the coin against USDT.
    pub fn symbol(&self) -> String {
        format!("{}{QUOTE_ASSET}", self.coin)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub rate_limit_type: String,
    pub interval: String,
    #[serde(default)]
    pub interval_num: u32,
    pub limit: u64,
}

/// Trading rule attached to a symbol, discriminated by `filterType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "filterType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolFilter {
    #[serde(rename_all = "camelCase")]
    PriceFilter {
        #[serde(deserialize_with = "de_f64")]
        min_price: f64,
        #[serde(deserialize_with = "de_f64")]
        max_price: f64,
        #[serde(deserialize_with = "de_f64")]
        tick_size: f64,
    },
    #[serde(rename_all = "camelCase")]
    LotSize {
        #[serde(deserialize_with = "de_f64")]
        min_qty: f64,
        #[serde(deserialize_with = "de_f64")]
        max_qty: f64,
        #[serde(deserialize_with = "de_f64")]
        step_size: f64,
    },
    IcebergParts { limit: u32 },
    #[serde(rename_all = "camelCase")]
    MarketLotSize {
        #[serde(deserialize_with = "de_f64")]
        min_qty: f64,
        #[serde(deserialize_with = "de_f64")]
        max_qty: f64,
        #[serde(deserialize_with = "de_f64")]
        step_size: f64,
    },
    #[serde(rename_all = "camelCase")]
    TrailingDelta {
        min_trailing_above_delta: u32,
        max_trailing_above_delta: u32,
        min_trailing_below_delta: u32,
        max_trailing_below_delta: u32,
    },
    #[serde(rename_all = "camelCase")]
    Notional {
        #[serde(deserialize_with = "de_f64")]
        min_notional: f64,
        apply_min_to_market: bool,
        #[serde(deserialize_with = "de_f64")]
        max_notional: f64,
        apply_max_to_market: bool,
        avg_price_mins: u32,
    },
    #[serde(rename_all = "camelCase")]
    PercentPriceBySide {
        #[serde(deserialize_with = "de_f64")]
        bid_multiplier_up: f64,
        #[serde(deserialize_with = "de_f64")]
        bid_multiplier_down: f64,
        #[serde(deserialize_with = "de_f64")]
        ask_multiplier_up: f64,
        #[serde(deserialize_with = "de_f64")]
        ask_multiplier_down: f64,
        avg_price_mins: u32,
    },
    #[serde(rename_all = "camelCase")]
    MaxPosition {
        #[serde(deserialize_with = "de_f64")]
        max_position: f64,
    },
    #[serde(rename_all = "camelCase")]
    MaxNumOrders { max_num_orders: u32 },
    #[serde(rename_all = "camelCase")]
    MaxNumAlgoOrders { max_num_algo_orders: u32 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub base_asset_precision: u32,
    pub quote_asset: String,
    pub quote_precision: u32,
    pub quote_asset_precision: u32,
    pub base_commission_precision: u32,
    pub quote_commission_precision: u32,
    pub order_types: Vec<String>,
    pub iceberg_allowed: bool,
    pub oco_allowed: bool,
    pub quote_order_qty_market_allowed: bool,
    pub allow_trailing_stop: bool,
    pub cancel_replace_allowed: bool,
    pub is_spot_trading_allowed: bool,
    pub is_margin_trading_allowed: bool,
    pub filters: Vec<SymbolFilter>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub default_self_trade_prevention_mode: String,
    pub allowed_self_trade_prevention_modes: Vec<String>,
}

/// Payload of `/api/v3/exchangeInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInformation {
    pub timezone: String,
    pub server_time: i64,
    pub rate_limits: Vec<RateLimit>,
    pub exchange_filters: Vec<serde_json::Value>,
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInformation {
    /// Decode an exchange-information payload. Unknown filter types are rejected.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Crypto coin (not fiat) currently trading, other than the quote asset itself.
fn is_tradable(coin: &serde_json::Value) -> bool {
    coin["isLegalMoney"] == false && coin["trading"] == true && coin["coin"] != QUOTE_ASSET
}

/// Decode a coin-information payload and keep the tradable coins.
///
/// Entries are filtered on their raw fields first, so a sparse fiat or
/// delisted entry never has to match the full `CoinInfo` schema.
pub fn tradable_coins(raw: &str) -> Result<Vec<CoinInfo>> {
    let coins: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    coins
        .into_iter()
        .filter(is_tradable)
        .map(|coin| serde_json::from_value(coin).map_err(AppError::from))
        .collect()
}
