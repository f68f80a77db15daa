use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Two-tailed confidence level for interval estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ConfidenceLevel {
    P90,
    #[default]
    P95,
    P99,
}

impl ConfidenceLevel {
    pub fn z_score(self) -> f64 {
        match self {
            Self::P90 => 1.645,
            Self::P95 => 1.96,
            Self::P99 => 2.576,
        }
    }

    pub fn as_fraction(self) -> f64 {
        match self {
            Self::P90 => 0.90,
            Self::P95 => 0.95,
            Self::P99 => 0.99,
        }
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = AnalyticsError;

    fn try_from(level: f64) -> Result<Self, Self::Error> {
        // Accept either 0.95 or 95.
        let pct = if level > 1.0 { level } else { level * 100.0 };
        match pct.round() as i64 {
            90 => Ok(Self::P90),
            95 => Ok(Self::P95),
            99 => Ok(Self::P99),
            _ => Err(AnalyticsError::UnsupportedConfidenceLevel(level)),
        }
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.as_fraction()
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`). Empty input yields 0.
pub fn calculate_standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// `mean ± z * std_dev / sqrt(n)`. With `n == 0` the interval collapses to the mean.
pub fn calculate_confidence_interval(
    mean: f64,
    std_dev: f64,
    n: usize,
    level: ConfidenceLevel,
) -> (f64, f64) {
    if n == 0 {
        return (mean, mean);
    }
    let standard_error = std_dev / (n as f64).sqrt();
    let margin = level.z_score() * standard_error;
    (mean - margin, mean + margin)
}

/// Pearson correlation coefficient.
///
/// Returns 0 for mismatched lengths, empty input, or when either series is
/// constant (zero deviation norm).
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }
    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut cross = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cross += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denom = sum_sq_x.sqrt() * sum_sq_y.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cross / denom
}
