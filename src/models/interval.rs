use chrono::Duration;
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// Sampling interval between successive datapoints, matching the values the
/// Yahoo Finance download endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Interval {
    /// One datapoint per trading day
    #[value(name = "1d")]
    Daily,
    /// One datapoint per week
    #[value(name = "1wk")]
    Weekly,
    /// One datapoint per month
    #[value(name = "1mo")]
    Monthly,
}

impl Interval {
    /// Wire name used in request URLs and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Expected gap between successive datapoints. A month is approximated
    /// as 30 days since calendar months have no fixed length.
    pub fn step(&self) -> Duration {
        match self {
            Interval::Daily => Duration::days(1),
            Interval::Weekly => Duration::weeks(1),
            Interval::Monthly => Duration::days(30),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            other => Err(format!("invalid interval: {}", other)),
        }
    }
}
