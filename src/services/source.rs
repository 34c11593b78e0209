use crate::models::{DatasetError, Interval, PriceDataset};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} for symbol {symbol}")]
    Status { symbol: String, status: StatusCode },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Source of historical price data. Abstracted so tests and future vendors
/// can stand in for the live Yahoo Finance endpoint.
#[async_trait]
pub trait PriceDataSource: Send + Sync {
    /// Fetch datapoints for `symbol` strictly after `start` (exclusive, one
    /// interval step past it) up to `end`, sampled at `interval`. A `start`
    /// of `None` means the full available history.
    async fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<PriceDataset, FetchError>;
}
