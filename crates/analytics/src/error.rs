use thiserror::Error;

/// Errors raised when parsing analytics vocabulary from user input
/// (query strings, config values). Computations themselves never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("unknown bet result: {0} (expected won, lost, void or pending)")]
    UnknownResult(String),

    #[error("unknown home/away side: {0} (expected home or away)")]
    UnknownSide(String),

    #[error("unknown breakdown dimension: {0}")]
    UnknownDimension(String),

    #[error("unsupported confidence level: {0} (expected 0.90, 0.95 or 0.99)")]
    UnsupportedConfidenceLevel(f64),
}
