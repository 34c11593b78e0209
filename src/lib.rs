//! # pricewatch
//!
//! Stock price analysis library behind the `analyze` CLI:
//! - Per-symbol CSV cache of historical OHLCV data
//! - Incremental refresh from the Yahoo Finance download endpoint
//! - MACD indicator computation (fast/slow EWMA, signal, histogram)
//! - Plain-text analysis reports
//!
//! ## Quick start
//!
//! ```no_run
//! use pricewatch::analysis::{render, MacdParams, MacdSeries};
//! use pricewatch::services::CsvStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = CsvStore::new("data");
//!     let dataset = store.load("PNG.V")?.expect("cached data");
//!     let params = MacdParams::default();
//!     let macd = MacdSeries::compute(&dataset.closes(), &params)?;
//!     println!("{}", render(&dataset, &macd, &params, 10));
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod models;
pub mod services;
pub mod utils;

pub use utils::init_logger;
