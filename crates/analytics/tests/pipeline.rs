use analytics::filters::{filter_by_odds_range, filter_by_result, filter_by_sport};
use analytics::{
    apply_filters, calculate_breakdown, calculate_pro_tier_analytics, Bet, BetResult,
    ConfidenceLevel, Dimension, FilterRegistry,
};

// Exercises the public surface the way the API layer does: JSON bets in,
// registry-backed filters, summary out.

const BETS_JSON: &str = r#"[
  {"date":"2024-09-08","sport":"football","league":"NFL","team":"Chiefs","odds":-110,
   "result":"won","stake":110,"payout":210,"closingLines":{"moneyline":-121}},
  {"date":"2024-09-15","sport":"football","league":"NFL","team":"Chiefs","odds":120,
   "result":"lost","stake":100,"payout":0},
  {"date":"2024-10-22T23:30:00Z","sport":"basketball","league":"NBA","team":"Celtics",
   "player":"Jayson Tatum","propType":"points","odds":-115,"result":"won","stake":115,"payout":215},
  {"date":"2024-10-24","sport":"basketball","league":"NBA","team":"Celtics","odds":-105,
   "result":"void","stake":105,"payout":105},
  {"date":"2024-10-30","sport":"football","league":"NFL","team":"Bills","odds":250,
   "result":"pending","stake":40,"payout":0}
]"#;

fn bets() -> Vec<Bet> {
    serde_json::from_str(BETS_JSON).unwrap()
}

#[test]
fn registry_filter_feeds_pro_summary() {
    let registry = FilterRegistry::new();
    registry.save_filter(
        "nfl-favourites",
        "NFL favourites",
        vec![filter_by_sport("football"), filter_by_odds_range(-200.0, 0.0)],
        Some("Chalk only".to_string()),
    );

    let filtered = registry.apply_saved("nfl-favourites", &bets()).unwrap();
    assert_eq!(filtered.len(), 1);

    let summary = calculate_pro_tier_analytics(&filtered, ConfidenceLevel::P95);
    assert_eq!(summary.total_bets, 1);
    assert!((summary.win_rate - 1.0).abs() < 1e-9);
    assert!((summary.net_profit - 100.0).abs() < 1e-9);
    // (-121 - -110) / -110 = 0.1
    assert!((summary.average_clv - 0.1).abs() < 1e-9);
}

#[test]
fn whole_book_summary_ignores_void_and_pending() {
    let all = bets();
    let summary = calculate_pro_tier_analytics(&all, ConfidenceLevel::P95);
    assert_eq!(summary.total_bets, 3);
    // payouts 425 - stakes 325
    assert!((summary.net_profit - 100.0).abs() < 1e-9);
    assert!((summary.roi - 100.0 / 325.0).abs() < 1e-9);
    assert!(summary.confidence_interval.0 <= summary.roi);
    assert!(summary.confidence_interval.1 >= summary.roi);
}

#[test]
fn results_filter_then_breakdown() {
    let winners = apply_filters(&bets(), &[filter_by_result(BetResult::Won)]);
    let rows = calculate_breakdown(&winners, Dimension::Sport);
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["basketball", "football"]);
    assert!(rows.iter().all(|r| r.summary.wins == 1));
}
