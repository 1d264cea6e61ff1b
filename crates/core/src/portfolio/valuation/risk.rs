//! Concentration and diversification risk heuristic.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::HashSet;

use crate::constants::BASELINE_RISK_SCORE;

/// The parts of a position the risk score reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskInput {
    pub current_value: Decimal,
    pub high_risk: bool,
    /// Sector for stocks, category for funds. `None` when the instrument is unknown.
    pub diversification_key: Option<String>,
}

/// `clamp(0, 100, round(maxConcentration*50 + highRiskFraction*30 - min(keys*5, 25) + 20))`
///
/// No positions, or positions worth nothing, score the baseline.
pub fn risk_score(positions: &[RiskInput]) -> u8 {
    let total: Decimal = positions.iter().map(|p| p.current_value).sum();
    if positions.is_empty() || total <= Decimal::ZERO {
        return BASELINE_RISK_SCORE;
    }

    let max_concentration = positions
        .iter()
        .map(|p| p.current_value / total)
        .max()
        .unwrap_or(Decimal::ZERO);
    let high_risk_value: Decimal = positions
        .iter()
        .filter(|p| p.high_risk)
        .map(|p| p.current_value)
        .sum();
    let high_risk_fraction = high_risk_value / total;

    let distinct_keys = positions
        .iter()
        .filter_map(|p| p.diversification_key.as_deref())
        .collect::<HashSet<_>>()
        .len();
    let diversification_bonus = Decimal::from((distinct_keys * 5).min(25));

    let raw = max_concentration * dec!(50) + high_risk_fraction * dec!(30) - diversification_bonus
        + Decimal::from(BASELINE_RISK_SCORE);
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, dec!(100))
        .to_u8()
        .unwrap_or(BASELINE_RISK_SCORE)
}
