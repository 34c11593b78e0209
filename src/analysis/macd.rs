use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("span {fast} of fast EWMA is greater than or equal to span {slow} of slow EWMA")]
    SpanOrder { fast: usize, slow: usize },
    #[error("cannot compute indicator over an empty series")]
    EmptySeries,
}

/// MACD spans. Defaults are the conventional 12/26/9 configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub signal_span: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_span: 12,
            slow_span: 26,
            signal_span: 9,
        }
    }
}

impl MacdParams {
    pub fn new(fast_span: usize, slow_span: usize, signal_span: usize) -> Result<Self, AnalysisError> {
        if slow_span <= fast_span {
            return Err(AnalysisError::SpanOrder {
                fast: fast_span,
                slow: slow_span,
            });
        }
        Ok(Self {
            fast_span,
            slow_span,
            signal_span,
        })
    }
}

/// Span-parameterized exponentially weighted moving average with
/// `alpha = 2 / (span + 1)`. Early observations are weighted as an
/// expanding window, so the first output equals the first input and the
/// average is unbiased during warm-up.
pub fn ewma(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut result = Vec::with_capacity(values.len());
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for &value in values {
        numerator = value + decay * numerator;
        denominator = 1.0 + decay * denominator;
        result.push(numerator / denominator);
    }
    result
}

/// MACD series computed over one price series. All vectors share the input
/// length and ordering.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub fast_ewma: Vec<f64>,
    pub slow_ewma: Vec<f64>,
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn compute(values: &[f64], params: &MacdParams) -> Result<Self, AnalysisError> {
        if params.slow_span <= params.fast_span {
            return Err(AnalysisError::SpanOrder {
                fast: params.fast_span,
                slow: params.slow_span,
            });
        }
        if values.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }

        let fast_ewma = ewma(values, params.fast_span);
        let slow_ewma = ewma(values, params.slow_span);
        let line: Vec<f64> = fast_ewma
            .iter()
            .zip(&slow_ewma)
            .map(|(fast, slow)| fast - slow)
            .collect();
        let signal = ewma(&line, params.signal_span);
        let histogram: Vec<f64> = line
            .iter()
            .zip(&signal)
            .map(|(line, signal)| line - signal)
            .collect();

        Ok(Self {
            fast_ewma,
            slow_ewma,
            line,
            signal,
            histogram,
        })
    }

    /// Restrict the series to `len` entries starting at `offset`. Used to
    /// report on a date window while keeping the averages warmed up on the
    /// history preceding it; computing directly on the clipped window would
    /// restart every average from its first in-window value.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        let start = offset.min(self.line.len());
        let range = start..offset.saturating_add(len).min(self.line.len());
        Self {
            fast_ewma: self.fast_ewma[range.clone()].to_vec(),
            slow_ewma: self.slow_ewma[range.clone()].to_vec(),
            line: self.line[range.clone()].to_vec(),
            signal: self.signal[range.clone()].to_vec(),
            histogram: self.histogram[range].to_vec(),
        }
    }
}
