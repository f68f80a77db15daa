//! Per-bet derived metrics: closing-line value and line movement.

use crate::bet::{Bet, LineMarket};

/// Relative move from the price taken to the closing price:
/// `(closing - taken) / taken`. Zero when either side is missing or the
/// taken price is zero.
pub fn clv_from_odds(bet_odds: Option<f64>, closing_odds: Option<f64>) -> f64 {
    match (bet_odds, closing_odds) {
        (Some(taken), Some(closing)) if taken != 0.0 => (closing - taken) / taken,
        _ => 0.0,
    }
}

/// CLV of a bet. A stored `clv` wins; otherwise it is derived from the
/// taken odds against the closing moneyline.
pub fn calculate_clv(bet: &Bet) -> f64 {
    bet.clv
        .unwrap_or_else(|| clv_from_odds(Some(bet.odds), bet.closing(LineMarket::Moneyline)))
}

/// `closing - opening`, or 0 when either line is missing.
pub fn line_movement(opening: Option<f64>, closing: Option<f64>) -> f64 {
    match (opening, closing) {
        (Some(open), Some(close)) => close - open,
        _ => 0.0,
    }
}

pub fn calculate_line_movement(bet: &Bet, market: LineMarket) -> f64 {
    line_movement(bet.opening(market), bet.closing(market))
}
