//! Core library for the road-to-billions project.
//!
//! Market data comes from the Binance spot REST API (`cex`), is annotated with
//! indicator-driven signals (`indicators`, `signals`) and replayed through a set
//! of strategies (`strategy`). `evaluator` ties those together for one symbol,
//! `screener` ranks many symbols and `report` renders the outcome.

pub mod cex;
pub mod cli;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod indicators;
pub mod models;
pub mod report;
pub mod screener;
pub mod signals;
pub mod strategy;
pub mod utils;
