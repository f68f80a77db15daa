use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Won,
    Lost,
    Void,
    Pending,
}

impl BetResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Void => "void",
            Self::Pending => "pending",
        }
    }

    /// Only won and lost bets count toward profit and ratio aggregation.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetResult {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            "void" => Ok(Self::Void),
            "pending" => Ok(Self::Pending),
            other => Err(AnalyticsError::UnknownResult(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for HomeAway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeAway {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            other => Err(AnalyticsError::UnknownSide(other.to_string())),
        }
    }
}

/// Market line snapshot (opening or closing). Any sub-market may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Lines {
    pub spread: Option<f64>,
    pub total: Option<f64>,
    pub moneyline: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMarket {
    Spread,
    Total,
    Moneyline,
}

impl Lines {
    pub fn get(&self, market: LineMarket) -> Option<f64> {
        match market {
            LineMarket::Spread => self.spread,
            LineMarket::Total => self.total,
            LineMarket::Moneyline => self.moneyline,
        }
    }
}

/// One wager as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    #[serde(deserialize_with = "deserialize_bet_date")]
    pub date: DateTime<Utc>,
    pub sport: String,
    pub league: String,
    pub team: String,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(default)]
    pub home_away: Option<HomeAway>,
    #[serde(default)]
    pub prop_type: Option<String>,
    #[serde(default)]
    pub bet_type: Option<String>,
    /// American odds. Sign carries no special meaning here.
    pub odds: f64,
    pub result: BetResult,
    pub stake: f64,
    pub payout: f64,
    #[serde(default)]
    pub clv: Option<f64>,
    #[serde(default)]
    pub opening_lines: Option<Lines>,
    #[serde(default)]
    pub closing_lines: Option<Lines>,
}

impl Bet {
    /// Signed profit. Not cross-checked against `result`.
    pub fn profit(&self) -> f64 {
        self.payout - self.stake
    }

    pub fn is_settled(&self) -> bool {
        self.result.is_settled()
    }

    /// Precomputed CLV, with missing treated as zero.
    pub fn clv_or_zero(&self) -> f64 {
        self.clv.unwrap_or(0.0)
    }

    pub fn opening(&self, market: LineMarket) -> Option<f64> {
        self.opening_lines.and_then(|l| l.get(market))
    }

    pub fn closing(&self, market: LineMarket) -> Option<f64> {
        self.closing_lines.and_then(|l| l.get(market))
    }
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (taken as midnight UTC).
pub fn parse_bet_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_bet_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bet_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid bet date: {raw}")))
}
