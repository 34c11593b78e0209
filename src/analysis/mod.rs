pub mod macd;
pub mod report;

pub use macd::{ewma, AnalysisError, MacdParams, MacdSeries};
pub use report::{find_last_crossover, render, Crossover, CrossoverDirection};
