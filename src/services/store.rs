use crate::models::{DatasetError, PriceDataset};
use crate::utils::Logger;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV file already exists: '{0}'")]
    AlreadyExists(PathBuf),
    #[error("path is a directory: '{0}'")]
    IsDirectory(PathBuf),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk CSV cache, one file per symbol at `<data_dir>/<SYMBOL>/<SYMBOL>.csv`.
pub struct CsvStore {
    data_dir: PathBuf,
    logger: Logger,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            logger: Logger::new("STORE"),
        }
    }

    /// Cache file location for a symbol.
    pub fn csv_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(symbol).join(format!("{}.csv", symbol))
    }

    /// Load the cached dataset for a symbol, or `None` when no cache file
    /// exists yet.
    pub fn load(&self, symbol: &str) -> Result<Option<PriceDataset>, StoreError> {
        let path = self.csv_path(symbol);
        self.logger
            .debug(&format!("Checking for CSV file '{}'", path.display()));
        if !path.is_file() {
            return Ok(None);
        }

        self.logger.info(&format!(
            "Reading data for symbol '{}' from '{}'",
            symbol,
            path.display()
        ));
        let reader = BufReader::new(File::open(&path)?);
        let dataset = PriceDataset::from_csv_reader(symbol, reader)?;
        self.logger
            .info(&format!("Loaded {} datapoints for '{}'", dataset.len(), symbol));
        Ok(Some(dataset))
    }

    /// Write a dataset to its cache file, creating parent directories on
    /// demand. Refuses to clobber an existing file unless `overwrite` is set.
    pub fn save(&self, dataset: &PriceDataset, overwrite: bool) -> Result<PathBuf, StoreError> {
        let path = self.csv_path(dataset.symbol());
        self.check_target(&path, overwrite)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        dataset.to_csv_writer(file)?;
        self.logger.info(&format!(
            "Wrote {} datapoints for '{}' to '{}'",
            dataset.len(),
            dataset.symbol(),
            path.display()
        ));
        Ok(path)
    }

    fn check_target(&self, path: &Path, overwrite: bool) -> Result<(), StoreError> {
        if path.is_dir() {
            return Err(StoreError::IsDirectory(path.to_path_buf()));
        }
        if path.exists() && !overwrite {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::NaiveDate;

    fn sample_dataset() -> PriceDataset {
        PriceDataset::from_points(
            "PNG.V",
            vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2020, 12, 24).unwrap(),
                open: 1.10,
                high: 1.15,
                low: 1.08,
                close: 1.12,
                adj_close: Some(1.12),
                volume: 450_000,
            }],
        )
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        assert!(store.load("PNG.V").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let dataset = sample_dataset();

        let path = store.save(&dataset, false).unwrap();
        assert_eq!(path, store.csv_path("PNG.V"));
        assert!(path.ends_with("PNG.V/PNG.V.csv"));

        let reloaded = store.load("PNG.V").unwrap().unwrap();
        assert_eq!(reloaded, dataset);
    }

    #[test]
    fn test_save_without_overwrite_fails_on_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let dataset = sample_dataset();

        store.save(&dataset, false).unwrap();
        match store.save(&dataset, false) {
            Err(StoreError::AlreadyExists(path)) => assert_eq!(path, store.csv_path("PNG.V")),
            other => panic!("unexpected result: {:?}", other.map(|p| p.display().to_string())),
        }
        // Overwrite succeeds.
        store.save(&dataset, true).unwrap();
    }

    #[test]
    fn test_save_onto_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        fs::create_dir_all(store.csv_path("PNG.V")).unwrap();

        assert!(matches!(
            store.save(&sample_dataset(), true),
            Err(StoreError::IsDirectory(_))
        ));
    }
}
