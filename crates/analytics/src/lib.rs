//! Betting performance analytics: bet records, composable predicate filters,
//! statistical primitives, per-bet line metrics and tiered summary reports.
//!
//! Everything here is synchronous and free of I/O. The only shared mutable
//! state is [`registry::FilterRegistry`].

pub mod bet;
pub mod breakdown;
pub mod clv;
pub mod error;
pub mod filters;
pub mod registry;
pub mod stats;
pub mod tiers;

pub use bet::{Bet, BetResult, HomeAway, LineMarket, Lines};
pub use breakdown::{
    calculate_breakdown, calculate_clv_summary, calculate_streaks, clv_profit_correlation,
    BreakdownRow, ClvSummary, Dimension, StreakSummary,
};
pub use clv::{calculate_clv, calculate_line_movement};
pub use error::AnalyticsError;
pub use filters::{apply_filters, describe_filters, matches_all, Predicate};
pub use registry::{FilterRegistry, SavedFilter};
pub use stats::{
    calculate_confidence_interval, calculate_correlation, calculate_standard_deviation,
    ConfidenceLevel,
};
pub use tiers::{
    calculate_basic_tier_analytics, calculate_pro_tier_analytics, BasicAnalyticsSummary,
    ProAnalyticsSummary,
};
