use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::bet::{parse_bet_date, Bet, BetResult, HomeAway};

/// A single criterion over a bet. Each variant carries its own parameters so
/// filters can be logged, compared and round-tripped through JSON/TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Predicate {
    Sport {
        sport: String,
    },
    League {
        league: String,
    },
    Team {
        team: String,
    },
    Player {
        player: String,
    },
    Opponent {
        opponent: String,
    },
    HomeAway {
        side: HomeAway,
    },
    Result {
        result: BetResult,
    },
    MinStake {
        min_stake: f64,
    },
    OddsRange {
        min: f64,
        max: f64,
    },
    Clv {
        min_clv: f64,
    },
    DateRange {
        #[serde(deserialize_with = "deserialize_boundary")]
        start: DateTime<Utc>,
        #[serde(deserialize_with = "deserialize_boundary")]
        end: DateTime<Utc>,
    },
}

impl Predicate {
    /// Equality tests are exact: no case folding, no trimming.
    pub fn test(&self, bet: &Bet) -> bool {
        match self {
            Self::Sport { sport } => bet.sport == *sport,
            Self::League { league } => bet.league == *league,
            Self::Team { team } => bet.team == *team,
            Self::Player { player } => bet.player.as_deref() == Some(player.as_str()),
            Self::Opponent { opponent } => bet.opponent.as_deref() == Some(opponent.as_str()),
            Self::HomeAway { side } => bet.home_away == Some(*side),
            Self::Result { result } => bet.result == *result,
            Self::MinStake { min_stake } => bet.stake >= *min_stake,
            // Inverted bounds are left as-is and therefore match nothing.
            Self::OddsRange { min, max } => *min <= bet.odds && bet.odds <= *max,
            Self::Clv { min_clv } => bet.clv_or_zero() >= *min_clv,
            Self::DateRange { start, end } => *start <= bet.date && bet.date <= *end,
        }
    }

}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sport { sport } => write!(f, "sport == {sport:?}"),
            Self::League { league } => write!(f, "league == {league:?}"),
            Self::Team { team } => write!(f, "team == {team:?}"),
            Self::Player { player } => write!(f, "player == {player:?}"),
            Self::Opponent { opponent } => write!(f, "opponent == {opponent:?}"),
            Self::HomeAway { side } => write!(f, "homeAway == {side}"),
            Self::Result { result } => write!(f, "result == {result}"),
            Self::MinStake { min_stake } => write!(f, "stake >= {min_stake}"),
            Self::OddsRange { min, max } => write!(f, "odds in [{min}, {max}]"),
            Self::Clv { min_clv } => write!(f, "clv >= {min_clv}"),
            Self::DateRange { start, end } => {
                write!(f, "date in [{}, {}]", start.to_rfc3339(), end.to_rfc3339())
            }
        }
    }
}

fn deserialize_boundary<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_bet_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date boundary: {raw}")))
}

pub fn filter_by_sport(sport: impl Into<String>) -> Predicate {
    Predicate::Sport {
        sport: sport.into(),
    }
}

pub fn filter_by_league(league: impl Into<String>) -> Predicate {
    Predicate::League {
        league: league.into(),
    }
}

pub fn filter_by_team(team: impl Into<String>) -> Predicate {
    Predicate::Team { team: team.into() }
}

pub fn filter_by_player(player: impl Into<String>) -> Predicate {
    Predicate::Player {
        player: player.into(),
    }
}

pub fn filter_by_opponent(opponent: impl Into<String>) -> Predicate {
    Predicate::Opponent {
        opponent: opponent.into(),
    }
}

pub fn filter_by_home_away(side: HomeAway) -> Predicate {
    Predicate::HomeAway { side }
}

pub fn filter_by_result(result: BetResult) -> Predicate {
    Predicate::Result { result }
}

pub fn filter_by_min_stake(min_stake: f64) -> Predicate {
    Predicate::MinStake { min_stake }
}

/// Inclusive on both ends. The caller keeps `min <= max`.
pub fn filter_by_odds_range(min: f64, max: f64) -> Predicate {
    Predicate::OddsRange { min, max }
}

pub fn filter_by_clv(min_clv: f64) -> Predicate {
    Predicate::Clv { min_clv }
}

pub fn filter_by_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Predicate {
    Predicate::DateRange { start, end }
}

/// True when every predicate accepts the bet. Stops at the first rejection.
pub fn matches_all(bet: &Bet, filters: &[Predicate]) -> bool {
    filters.iter().all(|p| p.test(bet))
}

/// Renders a filter chain for log fields, e.g. `sport == "football" && stake >= 50`.
pub fn describe_filters(filters: &[Predicate]) -> String {
    if filters.is_empty() {
        return "*".to_string();
    }
    filters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" && ")
}

/// Keeps the bets accepted by every filter, in input order.
/// An empty filter list keeps everything.
pub fn apply_filters(bets: &[Bet], filters: &[Predicate]) -> Vec<Bet> {
    bets.iter()
        .filter(|bet| matches_all(bet, filters))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::fixtures::bet;

    fn sample_bets() -> Vec<Bet> {
        let mut a = bet(100.0, 190.0, BetResult::Won);
        a.odds = -110.0;
        a.home_away = Some(HomeAway::Home);
        a.clv = Some(0.03);

        let mut b = bet(25.0, 0.0, BetResult::Lost);
        b.sport = "basketball".to_string();
        b.league = "NBA".to_string();
        b.team = "Celtics".to_string();
        b.player = Some("Jayson Tatum".to_string());
        b.odds = 150.0;
        b.home_away = Some(HomeAway::Away);
        b.date = parse_bet_date("2024-11-02").unwrap();

        let mut c = bet(50.0, 0.0, BetResult::Pending);
        c.opponent = Some("Raiders".to_string());
        c.odds = 200.0;
        c.clv = Some(-0.02);
        c.date = parse_bet_date("2024-12-25T18:00:00Z").unwrap();

        vec![a, b, c]
    }

    #[test]
    fn test_equality_filters_are_exact() {
        let bets = sample_bets();
        assert_eq!(apply_filters(&bets, &[filter_by_sport("football")]).len(), 2);
        assert!(apply_filters(&bets, &[filter_by_sport("Football")]).is_empty());
        assert!(apply_filters(&bets, &[filter_by_sport("football ")]).is_empty());
        assert_eq!(apply_filters(&bets, &[filter_by_league("NBA")]).len(), 1);
        assert_eq!(apply_filters(&bets, &[filter_by_team("Chiefs")]).len(), 2);
    }

    #[test]
    fn test_optional_fields_never_match_when_absent() {
        let bets = sample_bets();
        let by_player = apply_filters(&bets, &[filter_by_player("Jayson Tatum")]);
        assert_eq!(by_player.len(), 1);
        assert_eq!(by_player[0].league, "NBA");

        let by_opponent = apply_filters(&bets, &[filter_by_opponent("Raiders")]);
        assert_eq!(by_opponent.len(), 1);
        assert_eq!(by_opponent[0].result, BetResult::Pending);

        let home = apply_filters(&bets, &[filter_by_home_away(HomeAway::Home)]);
        assert_eq!(home.len(), 1);
    }

    #[test]
    fn test_result_and_stake_filters() {
        let bets = sample_bets();
        assert_eq!(apply_filters(&bets, &[filter_by_result(BetResult::Lost)]).len(), 1);
        // min stake is inclusive
        assert_eq!(apply_filters(&bets, &[filter_by_min_stake(50.0)]).len(), 2);
    }

    #[test]
    fn test_odds_range_inclusive() {
        let bets = sample_bets();
        let hits = apply_filters(&bets, &[filter_by_odds_range(-110.0, 150.0)]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_odds_range_inverted_matches_nothing() {
        let bets = sample_bets();
        assert!(apply_filters(&bets, &[filter_by_odds_range(500.0, -500.0)]).is_empty());
    }

    #[test]
    fn test_clv_filter_treats_missing_as_zero() {
        let bets = sample_bets();
        // a: 0.03, b: missing -> 0, c: -0.02
        assert_eq!(apply_filters(&bets, &[filter_by_clv(0.0)]).len(), 2);
        assert_eq!(apply_filters(&bets, &[filter_by_clv(0.01)]).len(), 1);
    }

    #[test]
    fn test_date_range_inclusive_both_ends() {
        let bets = sample_bets();
        let start = parse_bet_date("2024-09-08").unwrap();
        let end = parse_bet_date("2024-11-02").unwrap();
        let hits = apply_filters(&bets, &[filter_by_date_range(start, end)]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_empty_filter_list_is_identity() {
        let bets = sample_bets();
        assert_eq!(apply_filters(&bets, &[]), bets);
        assert!(apply_filters(&[], &[filter_by_sport("football")]).is_empty());
    }

    #[test]
    fn test_composition_is_and_and_preserves_order() {
        let bets = sample_bets();
        let filters = [filter_by_sport("football"), filter_by_min_stake(40.0)];
        let hits = apply_filters(&bets, &filters);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].result, BetResult::Won);
        assert_eq!(hits[1].result, BetResult::Pending);

        let mut reversed = filters.to_vec();
        reversed.reverse();
        assert_eq!(apply_filters(&bets, &reversed), hits);
    }

    #[test]
    fn test_single_filter_result_is_subset_satisfying_filter() {
        let bets = sample_bets();
        let f = filter_by_odds_range(100.0, 300.0);
        let hits = apply_filters(&bets, std::slice::from_ref(&f));
        assert!(hits.iter().all(|b| f.test(b) && bets.contains(b)));
    }

    #[test]
    fn test_predicate_json_shape() {
        let json = serde_json::to_value(filter_by_odds_range(-200.0, 150.0)).unwrap();
        assert_eq!(json["kind"], "oddsRange");
        assert_eq!(json["min"], -200.0);

        let parsed: Predicate =
            serde_json::from_str(r#"{"kind":"minStake","minStake":25}"#).unwrap();
        assert_eq!(parsed, filter_by_min_stake(25.0));

        let range: Predicate = serde_json::from_str(
            r#"{"kind":"dateRange","start":"2024-01-01","end":"2024-12-31T23:59:59Z"}"#,
        )
        .unwrap();
        assert!(matches!(range, Predicate::DateRange { .. }));
    }

    #[test]
    fn test_predicate_display() {
        assert_eq!(filter_by_sport("football").to_string(), "sport == \"football\"");
        assert_eq!(
            filter_by_odds_range(-110.0, 150.0).to_string(),
            "odds in [-110, 150]"
        );
        assert_eq!(filter_by_result(BetResult::Won).to_string(), "result == won");
        assert_eq!(
            describe_filters(&[filter_by_sport("football"), filter_by_min_stake(50.0)]),
            "sport == \"football\" && stake >= 50"
        );
        assert_eq!(describe_filters(&[]), "*");
    }
}
