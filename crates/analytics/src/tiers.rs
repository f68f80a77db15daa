use serde::Serialize;

use crate::bet::{Bet, BetResult};
use crate::clv::calculate_clv;
use crate::stats::{
    calculate_confidence_interval, calculate_standard_deviation, mean, ConfidenceLevel,
};

/// Pro-tier performance report over settled bets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProAnalyticsSummary {
    pub total_bets: usize,
    pub win_rate: f64,
    pub roi: f64,
    pub average_stake: f64,
    pub net_profit: f64,
    /// Dispersion of stake sizes, not of outcomes.
    pub standard_deviation: f64,
    pub confidence_interval: (f64, f64),
    #[serde(rename = "averageCLV")]
    pub average_clv: f64,
}

/// Entry-tier report: counts for every result plus the headline ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAnalyticsSummary {
    pub total_bets: usize,
    pub settled_bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    pub pending: usize,
    pub win_rate: f64,
    pub total_staked: f64,
    pub net_profit: f64,
    pub roi: f64,
}

/// Totals shared by every tier, computed over settled bets only.
#[derive(Debug, Clone, Copy, Default)]
struct SettledTotals {
    count: usize,
    wins: usize,
    total_stake: f64,
    total_payout: f64,
}

impl SettledTotals {
    fn from_bets<'a>(bets: impl IntoIterator<Item = &'a Bet>) -> Self {
        bets.into_iter()
            .filter(|b| b.is_settled())
            .fold(Self::default(), |mut acc, b| {
                acc.count += 1;
                if b.result == BetResult::Won {
                    acc.wins += 1;
                }
                acc.total_stake += b.stake;
                acc.total_payout += b.payout;
                acc
            })
    }

    fn net_profit(&self) -> f64 {
        self.total_payout - self.total_stake
    }

    fn win_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.wins as f64 / self.count as f64
    }

    /// Zero-stake samples report 0 rather than NaN.
    fn roi(&self) -> f64 {
        if self.total_stake == 0.0 {
            return 0.0;
        }
        self.net_profit() / self.total_stake
    }
}

/// Pro-tier report. Void and pending bets are ignored entirely.
///
/// The confidence interval is centred on ROI but its width comes from the
/// stake standard deviation, with `n` = settled bet count.
pub fn calculate_pro_tier_analytics(bets: &[Bet], level: ConfidenceLevel) -> ProAnalyticsSummary {
    let completed: Vec<&Bet> = bets.iter().filter(|b| b.is_settled()).collect();
    if completed.is_empty() {
        return ProAnalyticsSummary::default();
    }

    let totals = SettledTotals::from_bets(completed.iter().copied());
    let total_bets = totals.count;
    let roi = totals.roi();

    let stakes: Vec<f64> = completed.iter().map(|b| b.stake).collect();
    let standard_deviation = calculate_standard_deviation(&stakes);
    let confidence_interval =
        calculate_confidence_interval(roi, standard_deviation, total_bets, level);

    let clvs: Vec<f64> = completed.iter().map(|b| calculate_clv(b)).collect();

    ProAnalyticsSummary {
        total_bets,
        win_rate: totals.win_rate(),
        roi,
        average_stake: totals.total_stake / total_bets as f64,
        net_profit: totals.net_profit(),
        standard_deviation,
        confidence_interval,
        average_clv: mean(&clvs),
    }
}

pub fn calculate_basic_tier_analytics(bets: &[Bet]) -> BasicAnalyticsSummary {
    let totals = SettledTotals::from_bets(bets);
    let count = |r: BetResult| bets.iter().filter(|b| b.result == r).count();

    BasicAnalyticsSummary {
        total_bets: bets.len(),
        settled_bets: totals.count,
        wins: totals.wins,
        losses: totals.count - totals.wins,
        pushes: count(BetResult::Void),
        pending: count(BetResult::Pending),
        win_rate: totals.win_rate(),
        total_staked: totals.total_stake,
        net_profit: totals.net_profit(),
        roi: totals.roi(),
    }
}
