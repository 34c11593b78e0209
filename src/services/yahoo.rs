use crate::models::{Interval, PriceDataset};
use crate::services::source::{FetchError, PriceDataSource};
use crate::utils::{epoch, unix_midnight, Logger, Timer};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

const YAHOO_DOWNLOAD_BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/download";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client for the Yahoo Finance historical-data CSV endpoint.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    logger: Logger,
}

impl YahooFinanceClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: YAHOO_DOWNLOAD_BASE_URL.to_string(),
            logger: Logger::new("YAHOO"),
        })
    }

    /// Same as `new` but pointed at a different endpoint, for tests.
    #[cfg(test)]
    fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let mut client = Self::new()?;
        client.base_url = base_url.to_string();
        Ok(client)
    }

    fn build_url(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval={}&events=history&includeAdjustedClose=true",
            self.base_url,
            symbol,
            unix_midnight(start),
            unix_midnight(end),
            interval.as_str()
        )
    }
}

#[async_trait]
impl PriceDataSource for YahooFinanceClient {
    async fn fetch(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<PriceDataset, FetchError> {
        // One step past the newest known datapoint, so a refresh does not
        // re-download the session already on disk.
        let effective_start = start.unwrap_or_else(epoch) + interval.step();
        if effective_start >= end {
            self.logger.debug(&format!(
                "Window {} .. {} is empty for {}, skipping request",
                effective_start, end, symbol
            ));
            return Ok(PriceDataset::new(symbol));
        }

        let url = self.build_url(symbol, effective_start, end, interval);
        self.logger.info(&format!(
            "Downloading {} history for {} ({} .. {})",
            interval, symbol, effective_start, end
        ));

        let timer = Timer::start(&format!("{} download", symbol));
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status: response.status(),
            });
        }

        let content = response.text().await?;
        let dataset = PriceDataset::from_csv_reader(symbol, content.as_bytes())?;

        self.logger.info(&format!(
            "Downloaded {} datapoints for {}",
            dataset.len(),
            symbol
        ));
        timer.log_elapsed();

        Ok(dataset)
    }
}
