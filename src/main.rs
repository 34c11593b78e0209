use chrono::{NaiveDate, Utc};
use clap::Parser;
use pricewatch::analysis::{render, MacdParams, MacdSeries};
use pricewatch::models::{Interval, PriceDataset};
use pricewatch::services::{CsvStore, PriceDataSource, YahooFinanceClient};
use pricewatch::utils::init_logger;
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "analyze", version, about = "Analyze historical stock price data")]
struct Cli {
    /// Stock symbol whose prices are to be analyzed
    symbol: String,

    /// Greatest lower bound for the date range (YYYY-MM-DD)
    #[arg(short, long)]
    start: Option<NaiveDate>,

    /// Least upper bound for the date range (YYYY-MM-DD)
    #[arg(short, long)]
    end: Option<NaiveDate>,

    /// Interval between successive datapoints
    #[arg(short, long, value_enum, default_value_t = Interval::Daily)]
    interval: Interval,

    /// Update existing stock price data first
    #[arg(short, long)]
    update: bool,

    /// Root directory of the per-symbol CSV cache
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Number of sessions shown in the report table
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Also write DEBUG logs to a timestamped file under .logs/
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let file_tag = format!("Analyze-{}", cli.symbol);
    if let Err(e) = init_logger(cli.log_file.then_some(file_tag.as_str())) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    debug!("Arguments: {:?}", cli);

    let store = CsvStore::new(&cli.data_dir);
    let mut dataset = store
        .load(&cli.symbol)?
        .unwrap_or_else(|| PriceDataset::new(&cli.symbol));

    if cli.update {
        info!("Downloading updated data for symbol '{}'", cli.symbol);
        let client = YahooFinanceClient::new()?;
        let fresh = client
            .fetch(
                &cli.symbol,
                dataset.latest_date(),
                Utc::now().date_naive(),
                cli.interval,
            )
            .await?;
        dataset.merge(fresh);
        info!("Writing updated data for symbol '{}'", cli.symbol);
        store.save(&dataset, true)?;
    }

    let (window, offset) = dataset.clip_with_offset(cli.start, cli.end);
    if window.is_empty() {
        anyhow::bail!(
            "no datapoints for '{}' in the requested window; run with --update to fetch data",
            cli.symbol
        );
    }

    info!(
        "Analyzing {} datapoints for symbol '{}'",
        window.len(),
        cli.symbol
    );
    // The indicator runs over the full history so the averages are warmed up
    // by the sessions preceding the window, then the series is cut down to
    // the reported window.
    let params = MacdParams::default();
    let macd = MacdSeries::compute(&dataset.closes(), &params)?.slice(offset, window.len());
    print!("{}", render(&window, &macd, &params, cli.rows));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["analyze", "PNG.V"]);
        assert_eq!(cli.symbol, "PNG.V");
        assert_eq!(cli.interval, Interval::Daily);
        assert!(cli.start.is_none());
        assert!(cli.end.is_none());
        assert!(!cli.update);
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.rows, 10);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "analyze", "PNG.V", "-s", "2020-01-01", "-e", "2020-12-24", "-i", "1wk", "-u",
        ]);
        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(cli.end, NaiveDate::from_ymd_opt(2020, 12, 24));
        assert_eq!(cli.interval, Interval::Weekly);
        assert!(cli.update);
    }

    #[test]
    fn test_cli_rejects_bad_interval() {
        assert!(Cli::try_parse_from(["analyze", "PNG.V", "-i", "1h"]).is_err());
    }

    #[test]
    fn test_cli_requires_symbol() {
        assert!(Cli::try_parse_from(["analyze"]).is_err());
    }
}
