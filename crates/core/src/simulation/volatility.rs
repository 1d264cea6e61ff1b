//! Volatility profiles: the configuration table behind the price walk and jitter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::instruments::RiskCategory;

/// Return band and noise level for one risk category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityProfile {
    pub min_annual_return: f64,
    pub max_annual_return: f64,
    /// Average upward drift added on favourable years.
    pub market_bias: f64,
    /// Max fractional tick noise (± this much of the yearly reference).
    pub intraday_amplitude: f64,
}

impl VolatilityProfile {
    pub const fn new(
        min_annual_return: f64,
        max_annual_return: f64,
        market_bias: f64,
        intraday_amplitude: f64,
    ) -> Self {
        Self {
            min_annual_return,
            max_annual_return,
            market_bias,
            intraday_amplitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_annual_return < self.max_annual_return
            && self.intraday_amplitude >= 0.0
            && self.intraday_amplitude < 1.0
    }

    /// Annual return for a roll in `[0, 1)`.
    ///
    /// Rolls above `bias_threshold` earn the full bias, the rest lose half of it.
    pub fn annual_return(&self, roll: f64, bias_threshold: f64) -> f64 {
        let spread = self.max_annual_return - self.min_annual_return;
        let bias_weight = if roll > bias_threshold { 1.0 } else { -0.5 };
        self.min_annual_return + roll * spread + self.market_bias * bias_weight
    }
}

pub const STOCK_LOW: VolatilityProfile = VolatilityProfile::new(-0.10, 0.18, 0.02, 0.01);
pub const STOCK_MEDIUM: VolatilityProfile = VolatilityProfile::new(-0.20, 0.30, 0.02, 0.02);
pub const STOCK_HIGH: VolatilityProfile = VolatilityProfile::new(-0.35, 0.50, 0.03, 0.03);
pub const FUND_LARGE_CAP: VolatilityProfile = VolatilityProfile::new(-0.08, 0.18, 0.015, 0.005);
pub const FUND_MID_CAP: VolatilityProfile = VolatilityProfile::new(-0.15, 0.28, 0.015, 0.008);
pub const FUND_SMALL_CAP: VolatilityProfile = VolatilityProfile::new(-0.25, 0.40, 0.02, 0.012);
pub const FUND_INDEX: VolatilityProfile = VolatilityProfile::new(-0.06, 0.15, 0.01, 0.004);

pub const DEFAULT_BIAS_THRESHOLD: f64 = 0.4;
pub const DEFAULT_FLOOR_FRACTION: f64 = 0.2;

/// Per-category profiles plus the table-wide walk parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityTable {
    profiles: HashMap<RiskCategory, VolatilityProfile>,
    bias_threshold: f64,
    floor_fraction: f64,
}

impl Default for VolatilityTable {
    fn default() -> Self {
        let profiles = HashMap::from([
            (RiskCategory::Low, STOCK_LOW),
            (RiskCategory::Medium, STOCK_MEDIUM),
            (RiskCategory::High, STOCK_HIGH),
            (RiskCategory::LargeCap, FUND_LARGE_CAP),
            (RiskCategory::MidCap, FUND_MID_CAP),
            (RiskCategory::SmallCap, FUND_SMALL_CAP),
            (RiskCategory::Index, FUND_INDEX),
        ]);
        Self {
            profiles,
            bias_threshold: DEFAULT_BIAS_THRESHOLD,
            floor_fraction: DEFAULT_FLOOR_FRACTION,
        }
    }
}

impl VolatilityTable {
    /// Overrides one category. Invalid profiles (min >= max) are ignored.
    pub fn with_profile(mut self, category: RiskCategory, profile: VolatilityProfile) -> Self {
        if profile.is_valid() {
            self.profiles.insert(category, profile);
        } else {
            log::warn!(
                "Ignoring invalid volatility profile for {}: {:?}",
                category.as_str(),
                profile
            );
        }
        self
    }

    /// Floor fraction is clamped to `(0, 1)`.
    pub fn with_floor_fraction(mut self, floor_fraction: f64) -> Self {
        self.floor_fraction = floor_fraction.clamp(0.01, 0.99);
        self
    }

    pub fn with_bias_threshold(mut self, bias_threshold: f64) -> Self {
        self.bias_threshold = bias_threshold.clamp(0.0, 1.0);
        self
    }

    /// Profile for a category. Categories missing from a customised table use `Medium`.
    pub fn profile(&self, category: RiskCategory) -> VolatilityProfile {
        self.profiles
            .get(&category)
            .or_else(|| self.profiles.get(&RiskCategory::Medium))
            .copied()
            .unwrap_or(STOCK_MEDIUM)
    }

    pub fn bias_threshold(&self) -> f64 {
        self.bias_threshold
    }

    pub fn floor_fraction(&self) -> f64 {
        self.floor_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_are_valid() {
        let table = VolatilityTable::default();
        for category in RiskCategory::ALL {
            assert!(table.profile(category).is_valid(), "{:?}", category);
        }
    }

    #[test]
    fn test_bias_is_asymmetric() {
        let profile = STOCK_LOW;
        let low_roll = profile.annual_return(0.2, DEFAULT_BIAS_THRESHOLD);
        let high_roll = profile.annual_return(0.8, DEFAULT_BIAS_THRESHOLD);
        assert!((low_roll - (-0.10 + 0.2 * 0.28 - 0.01)).abs() < 1e-12);
        assert!((high_roll - (-0.10 + 0.8 * 0.28 + 0.02)).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let table = VolatilityTable::default()
            .with_profile(RiskCategory::Low, VolatilityProfile::new(0.3, 0.1, 0.0, 0.0));
        assert_eq!(table.profile(RiskCategory::Low), STOCK_LOW);
    }
}
