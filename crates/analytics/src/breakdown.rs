use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::bet::{Bet, BetResult, LineMarket};
use crate::clv::{calculate_clv, calculate_line_movement};
use crate::error::AnalyticsError;
use crate::stats::{calculate_correlation, mean};
use crate::tiers::{calculate_basic_tier_analytics, BasicAnalyticsSummary};

/// Group key used for breakdown tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Sport,
    League,
    Team,
    BetType,
    PropType,
    HomeAway,
}

pub const UNKNOWN_GROUP: &str = "unknown";

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sport => "sport",
            Self::League => "league",
            Self::Team => "team",
            Self::BetType => "betType",
            Self::PropType => "propType",
            Self::HomeAway => "homeAway",
        }
    }

    fn key(self, bet: &Bet) -> String {
        let key = match self {
            Self::Sport => Some(bet.sport.as_str()),
            Self::League => Some(bet.league.as_str()),
            Self::Team => Some(bet.team.as_str()),
            Self::BetType => bet.bet_type.as_deref(),
            Self::PropType => bet.prop_type.as_deref(),
            Self::HomeAway => bet.home_away.map(crate::bet::HomeAway::as_str),
        };
        key.unwrap_or(UNKNOWN_GROUP).to_string()
    }
}

impl FromStr for Dimension {
    type Err = AnalyticsError;

    /// Accepts both the camelCase wire names and snake_case query values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sport" => Ok(Self::Sport),
            "league" => Ok(Self::League),
            "team" => Ok(Self::Team),
            "betType" | "bet_type" => Ok(Self::BetType),
            "propType" | "prop_type" => Ok(Self::PropType),
            "homeAway" | "home_away" => Ok(Self::HomeAway),
            other => Err(AnalyticsError::UnknownDimension(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub key: String,
    pub summary: BasicAnalyticsSummary,
}

/// Basic-tier summary per group, rows sorted by key. Bets without a value
/// for an optional dimension land in the `"unknown"` group.
pub fn calculate_breakdown(bets: &[Bet], dimension: Dimension) -> Vec<BreakdownRow> {
    let mut groups: BTreeMap<String, Vec<Bet>> = BTreeMap::new();
    for bet in bets {
        groups
            .entry(dimension.key(bet))
            .or_default()
            .push(bet.clone());
    }

    groups
        .into_iter()
        .map(|(key, group)| BreakdownRow {
            key,
            summary: calculate_basic_tier_analytics(&group),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub longest_win: usize,
    pub longest_loss: usize,
    /// Positive for an active winning run, negative for a losing run.
    pub current: i64,
}

/// Win/loss runs over settled bets in date order. Bets on the same date keep
/// their input order; void and pending bets neither extend nor break a run.
pub fn calculate_streaks(bets: &[Bet]) -> StreakSummary {
    let mut settled: Vec<&Bet> = bets.iter().filter(|b| b.is_settled()).collect();
    settled.sort_by_key(|b| b.date);

    let mut summary = StreakSummary::default();
    let mut current: i64 = 0;
    for bet in settled {
        current = match bet.result {
            BetResult::Won if current > 0 => current + 1,
            BetResult::Won => 1,
            BetResult::Lost if current < 0 => current - 1,
            BetResult::Lost => -1,
            BetResult::Void | BetResult::Pending => current,
        };
        let run = current.unsigned_abs() as usize;
        if current > 0 {
            summary.longest_win = summary.longest_win.max(run);
        } else {
            summary.longest_loss = summary.longest_loss.max(run);
        }
    }
    summary.current = current;
    summary
}

/// Pearson correlation between computed CLV and realised profit over settled bets.
pub fn clv_profit_correlation(bets: &[Bet]) -> f64 {
    let (clv, profit): (Vec<f64>, Vec<f64>) = bets
        .iter()
        .filter(|b| b.is_settled())
        .map(|b| (calculate_clv(b), b.profit()))
        .unzip();
    calculate_correlation(&clv, &profit)
}

/// Closing-line report: how often and by how much the book was beaten, and
/// how far lines moved between open and close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClvSummary {
    pub settled_bets: usize,
    #[serde(rename = "averageCLV")]
    pub average_clv: f64,
    /// Share of settled bets with positive CLV.
    pub beat_close_rate: f64,
    pub clv_profit_correlation: f64,
    pub average_spread_movement: f64,
    pub average_total_movement: f64,
    pub average_moneyline_movement: f64,
}

/// Mean movement over bets carrying both an opening and a closing line for
/// `market`; bets missing either snapshot are left out rather than counted as 0.
fn average_movement(bets: &[Bet], market: LineMarket) -> f64 {
    let moves: Vec<f64> = bets
        .iter()
        .filter(|b| b.opening(market).is_some() && b.closing(market).is_some())
        .map(|b| calculate_line_movement(b, market))
        .collect();
    mean(&moves)
}

/// CLV figures cover settled bets; line movement covers every bet.
pub fn calculate_clv_summary(bets: &[Bet]) -> ClvSummary {
    let clvs: Vec<f64> = bets
        .iter()
        .filter(|b| b.is_settled())
        .map(calculate_clv)
        .collect();
    let beat_close_rate = if clvs.is_empty() {
        0.0
    } else {
        clvs.iter().filter(|c| **c > 0.0).count() as f64 / clvs.len() as f64
    };

    ClvSummary {
        settled_bets: clvs.len(),
        average_clv: mean(&clvs),
        beat_close_rate,
        clv_profit_correlation: clv_profit_correlation(bets),
        average_spread_movement: average_movement(bets, LineMarket::Spread),
        average_total_movement: average_movement(bets, LineMarket::Total),
        average_moneyline_movement: average_movement(bets, LineMarket::Moneyline),
    }
}
