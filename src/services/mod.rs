pub mod source;
pub mod store;
pub mod yahoo;

pub use source::{FetchError, PriceDataSource};
pub use store::{CsvStore, StoreError};
pub use yahoo::YahooFinanceClient;
