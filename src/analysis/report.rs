use crate::analysis::macd::{MacdParams, MacdSeries};
use crate::models::PriceDataset;
use std::fmt::Write;

/// Direction of a MACD line/signal crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverDirection {
    /// MACD line crossed above the signal line
    Bullish,
    /// MACD line crossed below the signal line
    Bearish,
}

impl CrossoverDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossoverDirection::Bullish => "bullish",
            CrossoverDirection::Bearish => "bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossover {
    pub date: chrono::NaiveDate,
    pub direction: CrossoverDirection,
}

/// Most recent session on which the MACD line crossed its signal line, read
/// off the histogram's sign flips. The startup transient where the histogram
/// first leaves zero does not count as a crossover.
pub fn find_last_crossover(dataset: &PriceDataset, macd: &MacdSeries) -> Option<Crossover> {
    let points = dataset.points();
    let mut last = None;
    let mut prev_sign = 0i8;

    for (i, &value) in macd.histogram.iter().take(points.len()).enumerate() {
        let sign = if value > 0.0 {
            1
        } else if value < 0.0 {
            -1
        } else {
            0
        };
        if sign == 0 {
            continue;
        }
        if prev_sign != 0 && sign != prev_sign {
            last = Some(Crossover {
                date: points[i].date,
                direction: if sign > 0 {
                    CrossoverDirection::Bullish
                } else {
                    CrossoverDirection::Bearish
                },
            });
        }
        prev_sign = sign;
    }
    last
}

/// Render the analysis as a plain-text report: coverage summary, the latest
/// session, a table of the most recent `rows` sessions with their MACD
/// values, and the last crossover seen in the window.
pub fn render(
    dataset: &PriceDataset,
    macd: &MacdSeries,
    params: &MacdParams,
    rows: usize,
) -> String {
    let mut out = String::new();
    let points = dataset.points();

    // Covered span is always present: callers only render non-empty windows.
    let span = match (dataset.earliest_date(), dataset.latest_date()) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "empty".to_string(),
    };
    let _ = writeln!(
        out,
        "# {} - {} sessions, {}",
        dataset.symbol(),
        dataset.len(),
        span
    );
    let _ = writeln!(
        out,
        "MACD spans: fast EWMA {}, slow EWMA {}, signal {}",
        params.fast_span, params.slow_span, params.signal_span
    );

    if let (Some(point), Some(idx)) = (points.last(), points.len().checked_sub(1)) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Latest session {}: Open={:.4}, High={:.4}, Low={:.4}, Close={:.4}, Volume={}",
            point.date, point.open, point.high, point.low, point.close, point.volume
        );
        let _ = writeln!(
            out,
            "Latest MACD: line={:.6}, signal={:.6}, histogram={:.6}",
            macd.line[idx], macd.signal[idx], macd.histogram[idx]
        );
    }

    let shown = rows.min(points.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "## Last {} sessions", shown);
    let start = points.len() - shown;
    for (point, idx) in points[start..].iter().zip(start..) {
        let _ = writeln!(
            out,
            "{}: Date={}, Open={:.4}, High={:.4}, Low={:.4}, Close={:.4}, Volume={}, \
             MACD={:.6}, Signal={:.6}, Hist={:.6}",
            dataset.symbol(),
            point.date,
            point.open,
            point.high,
            point.low,
            point.close,
            point.volume,
            macd.line[idx],
            macd.signal[idx],
            macd.histogram[idx]
        );
    }

    let _ = writeln!(out);
    match find_last_crossover(dataset, macd) {
        Some(crossover) => {
            let _ = writeln!(
                out,
                "Signal: {} crossover on {} (MACD line crossed {} the signal line)",
                crossover.direction.as_str(),
                crossover.date,
                match crossover.direction {
                    CrossoverDirection::Bullish => "above",
                    CrossoverDirection::Bearish => "below",
                }
            );
        }
        None => {
            let _ = writeln!(out, "Signal: no MACD line/signal crossover in the window");
        }
    }

    out
}
