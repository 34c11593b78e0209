use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};
use thiserror::Error;
use tracing::debug;

/// Columns that must be present in every price history CSV. `Adj Close` is
/// optional because older cache files predate adjusted-close support.
pub const REQUIRED_FIELDS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("missing fields: {0}")]
    MissingFields(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single OHLCV session, keyed by calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Adj Close")]
    pub adj_close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

/// Raw CSV row as Yahoo Finance serves it. Fields stay as strings so that
/// rows carrying `null` placeholders can be skipped instead of failing the
/// whole download.
#[derive(Debug, Deserialize)]
pub struct RawPriceRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: String,
    #[serde(rename = "High")]
    pub high: String,
    #[serde(rename = "Low")]
    pub low: String,
    #[serde(rename = "Close")]
    pub close: String,
    #[serde(rename = "Adj Close", default)]
    pub adj_close: Option<String>,
    #[serde(rename = "Volume")]
    pub volume: String,
}

impl RawPriceRecord {
    /// Convert to a typed point. Returns `None` when any required value is a
    /// `null` placeholder or fails to parse.
    pub fn to_price_point(&self) -> Option<PricePoint> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let open = parse_price(&self.open)?;
        let high = parse_price(&self.high)?;
        let low = parse_price(&self.low)?;
        let close = parse_price(&self.close)?;
        let adj_close = self.adj_close.as_deref().and_then(parse_price);
        let volume = self.volume.trim().parse::<u64>().ok()?;
        Some(PricePoint {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        })
    }
}

fn parse_price(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    value.parse::<f64>().ok()
}

/// Date-sorted price history for one ticker symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDataset {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceDataset {
    /// Empty dataset for the given symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    /// Build a dataset from unordered points, sorting by date.
    pub fn from_points(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Parse CSV content (Yahoo download or cache file). Rows with `null` or
    /// unparseable values are skipped with a debug log; a header missing any
    /// required column is an error.
    pub fn from_csv_reader<R: Read>(
        symbol: impl Into<String>,
        reader: R,
    ) -> Result<Self, DatasetError> {
        let symbol = symbol.into();
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !headers.iter().any(|h| h == **field))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingFields(missing.join(", ")));
        }

        let mut points = Vec::new();
        for result in csv_reader.deserialize() {
            let raw: RawPriceRecord = result?;
            match raw.to_price_point() {
                Some(point) => points.push(point),
                None => {
                    debug!("Skipping unparseable row for {}: {:?}", symbol, raw.date);
                }
            }
        }

        Ok(Self::from_points(symbol, points))
    }

    /// Write the dataset as CSV with the full Yahoo header set.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            csv_writer.serialize(point)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date of the oldest datapoint, or `None` when empty.
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Date of the most recent datapoint, or `None` when empty.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Fold another dataset into this one. On duplicate dates the existing
    /// datapoint wins, so a refresh never rewrites history already on disk.
    pub fn merge(&mut self, other: PriceDataset) {
        let existing: HashSet<NaiveDate> = self.points.iter().map(|p| p.date).collect();
        self.points.extend(
            other
                .points
                .into_iter()
                .filter(|p| !existing.contains(&p.date)),
        );
        self.points.sort_by_key(|p| p.date);
    }

    /// Datapoints dated at or after `start`.
    pub fn more_recent_than(&self, start: NaiveDate) -> Self {
        self.filter(|p| p.date >= start)
    }

    /// Datapoints dated at or before `end`.
    pub fn less_recent_than(&self, end: NaiveDate) -> Self {
        self.filter(|p| p.date <= end)
    }

    /// Restrict to the closed window `[start, end]`; either bound may be
    /// absent.
    pub fn clip(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.filter(|p| {
            start.map_or(true, |s| p.date >= s) && end.map_or(true, |e| p.date <= e)
        })
    }

    /// Like `clip`, additionally returning the index of the window's first
    /// datapoint within this dataset, so indicator series computed over the
    /// full history can be sliced to the same window.
    pub fn clip_with_offset(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> (Self, usize) {
        let offset = self
            .points
            .iter()
            .take_while(|p| start.is_some_and(|s| p.date < s))
            .count();
        (self.clip(start, end), offset)
    }

    /// Datapoint on exactly the given date, if present.
    pub fn on_date(&self, date: NaiveDate) -> Option<&PricePoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &self.points[idx])
    }

    /// Close price series in date order, for indicator computation.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    fn filter<F: Fn(&PricePoint) -> bool>(&self, keep: F) -> Self {
        Self {
            symbol: self.symbol.clone(),
            points: self.points.iter().filter(|p| keep(p)).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2017-01-03,0.40,0.43,0.39,0.42,0.42,125000
2017-01-10,0.42,0.45,0.41,0.44,0.44,98000
2017-01-17,null,null,null,null,null,0
2020-12-24,1.10,1.15,1.08,1.12,1.12,450000
";

    fn sample_dataset() -> PriceDataset {
        PriceDataset::from_csv_reader("PNG.V", SAMPLE_CSV.as_bytes()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_dataset_properties() {
        let dataset = PriceDataset::new("symbol");
        assert!(dataset.is_empty());
        assert_eq!(dataset.len(), 0);
        assert_eq!(dataset.earliest_date(), None);
        assert_eq!(dataset.latest_date(), None);
        assert!(dataset.on_date(date(2019, 12, 24)).is_none());
        assert!(dataset
            .more_recent_than(date(2019, 12, 24))
            .is_empty());
    }

    #[test]
    fn test_null_rows_are_skipped() {
        let dataset = sample_dataset();
        assert_eq!(dataset.len(), 3);
        assert!(dataset.on_date(date(2017, 1, 17)).is_none());
    }

    #[test]
    fn test_earliest_and_latest_date() {
        let dataset = sample_dataset();
        assert_eq!(dataset.earliest_date(), Some(date(2017, 1, 3)));
        assert_eq!(dataset.latest_date(), Some(date(2020, 12, 24)));
    }

    #[test]
    fn test_missing_header_fields_rejected() {
        let csv = "Date,Open,Close\n2020-01-02,1.0,1.1\n";
        let err = PriceDataset::from_csv_reader("X", csv.as_bytes()).unwrap_err();
        match err {
            DatasetError::MissingFields(fields) => {
                assert_eq!(fields, "High, Low, Volume");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_window_filters() {
        let dataset = sample_dataset();
        let recent = dataset.more_recent_than(date(2017, 1, 10));
        assert!(recent.points().iter().all(|p| p.date >= date(2017, 1, 10)));
        assert_eq!(recent.len(), 2);

        let older = dataset.less_recent_than(date(2017, 1, 10));
        assert!(older.points().iter().all(|p| p.date <= date(2017, 1, 10)));
        assert_eq!(older.len(), 2);

        let clipped = dataset.clip(Some(date(2017, 1, 4)), Some(date(2020, 1, 1)));
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped.earliest_date(), Some(date(2017, 1, 10)));
    }

    #[test]
    fn test_clip_with_offset_locates_window() {
        let dataset = sample_dataset();

        let (window, offset) = dataset.clip_with_offset(Some(date(2017, 1, 4)), None);
        assert_eq!(offset, 1);
        assert_eq!(window.earliest_date(), Some(date(2017, 1, 10)));
        assert_eq!(window.points(), &dataset.points()[offset..]);

        // No lower bound means the window starts at the first datapoint.
        let (_, offset) = dataset.clip_with_offset(None, Some(date(2017, 1, 10)));
        assert_eq!(offset, 0);

        // A bound past the newest datapoint leaves an empty window.
        let (window, offset) = dataset.clip_with_offset(Some(date(2021, 1, 1)), None);
        assert!(window.is_empty());
        assert_eq!(offset, dataset.len());
    }

    #[test]
    fn test_on_date_lookup() {
        let dataset = sample_dataset();
        let point = dataset.on_date(date(2017, 1, 10)).unwrap();
        assert_eq!(point.close, 0.44);
        assert_eq!(point.volume, 98_000);
    }

    #[test]
    fn test_merge_keeps_existing_on_duplicate_dates() {
        let mut dataset = sample_dataset();
        let update = PriceDataset::from_points(
            "PNG.V",
            vec![
                PricePoint {
                    date: date(2020, 12, 24),
                    open: 9.0,
                    high: 9.0,
                    low: 9.0,
                    close: 9.0,
                    adj_close: None,
                    volume: 1,
                },
                PricePoint {
                    date: date(2021, 1, 4),
                    open: 1.14,
                    high: 1.20,
                    low: 1.12,
                    close: 1.18,
                    adj_close: Some(1.18),
                    volume: 500_000,
                },
            ],
        );

        dataset.merge(update);
        assert_eq!(dataset.len(), 4);
        // Existing row wins on the duplicate date.
        assert_eq!(dataset.on_date(date(2020, 12, 24)).unwrap().close, 1.12);
        assert_eq!(dataset.latest_date(), Some(date(2021, 1, 4)));
    }

    #[test]
    fn test_csv_round_trip() {
        let dataset = sample_dataset();
        let mut buffer = Vec::new();
        dataset.to_csv_writer(&mut buffer).unwrap();
        let reloaded = PriceDataset::from_csv_reader("PNG.V", buffer.as_slice()).unwrap();
        assert_eq!(reloaded, dataset);
    }
}
