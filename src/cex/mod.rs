//! CEX REST client.
//!
//! Fetches daily and hourly klines for a spot symbol and downloads coin and
//! exchange information, signing the requests Binance requires. Payloads
//! decode into the typed models of [`types`].

pub mod binance;
pub mod types;

pub use binance::{BinanceClient, Interval, load_coin_info};
pub use types::{CoinInfo, ExchangeInformation, SymbolFilter, tradable_coins};
