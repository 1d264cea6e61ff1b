//! Property-based integration tests for the simulation engine.
//!
//! These check the pricing, clock and risk invariants across generated inputs
//! using the `proptest` crate.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use simvest_core::portfolio::valuation::RiskInput;
use simvest_core::portfolio::risk_score;
use simvest_core::simulation::{
    simulated_year, PriceWalk, VolatilityProfile, VolatilityTable, DEFAULT_FLOOR_FRACTION,
};
use simvest_core::RiskCategory;

// =============================================================================
// Generators
// =============================================================================

fn arb_category() -> impl Strategy<Value = RiskCategory> {
    prop::sample::select(RiskCategory::ALL.to_vec())
}

/// Ids mixing hex prefixes (parsed seeds) and arbitrary text (hashed seeds).
fn arb_instrument_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{12}",
        "[A-Z]{3,6}",
    ]
}

/// Prices in whole cents from 0.01 to 100,000.00.
fn arb_base_price() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_risk_input() -> impl Strategy<Value = RiskInput> {
    (0i64..=10_000_000, any::<bool>(), proptest::option::of(0u8..8)).prop_map(
        |(cents, high_risk, key)| RiskInput {
            current_value: Decimal::new(cents, 2),
            high_risk,
            diversification_key: key.map(|k| format!("sector-{}", k)),
        },
    )
}

// =============================================================================
// Price walk
// =============================================================================

proptest! {
    #[test]
    fn prop_yearly_price_is_deterministic(
        id in arb_instrument_id(),
        base in arb_base_price(),
        category in arb_category(),
        year in 1u32..=50,
    ) {
        let first = PriceWalk::default().yearly_price(&id, base, category, year);
        let fresh = PriceWalk::default().yearly_price(&id, base, category, year);
        prop_assert_eq!(first, fresh);

        let cached = PriceWalk::default();
        let a = cached.yearly_price(&id, base, category, year);
        let b = cached.yearly_price(&id, base, category, year);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, first);
    }

    #[test]
    fn prop_yearly_price_respects_floor(
        id in arb_instrument_id(),
        base in arb_base_price(),
        category in arb_category(),
    ) {
        let fraction = Decimal::try_from(DEFAULT_FLOOR_FRACTION).unwrap();
        let floor = base * fraction;
        let default_walk = PriceWalk::default();
        let harsh_walk = PriceWalk::new(VolatilityTable::default().with_profile(
            category,
            VolatilityProfile::new(-0.9, -0.5, 0.0, 0.01),
        ));
        for year in 1u32..=50 {
            for walk in [&default_walk, &harsh_walk] {
                let price = walk.yearly_price(&id, base, category, year);
                prop_assert!(price >= floor, "year {} price {} below floor {}", year, price, floor);
            }
        }
    }

    #[test]
    fn prop_year_one_is_identity(
        id in arb_instrument_id(),
        base in arb_base_price(),
        category in arb_category(),
    ) {
        prop_assert_eq!(PriceWalk::default().yearly_price(&id, base, category, 1), base);
    }
}

// =============================================================================
// Year clock
// =============================================================================

proptest! {
    #[test]
    fn prop_simulated_year_is_monotonic_and_capped(
        a in -1_000_000i64..100_000_000,
        delta in 0i64..10_000_000,
        duration in 1i64..=172_800,
        max_years in 1u32..=20,
    ) {
        let started = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let earlier = simulated_year(started, started + Duration::seconds(a), duration, max_years);
        let later = simulated_year(started, started + Duration::seconds(a + delta), duration, max_years);
        prop_assert!(earlier <= later);
        prop_assert!(earlier >= 1);
        prop_assert!(later <= max_years);
    }
}

// =============================================================================
// Risk score
// =============================================================================

proptest! {
    #[test]
    fn prop_risk_score_is_bounded(positions in prop::collection::vec(arb_risk_input(), 0..12)) {
        let score = risk_score(&positions);
        prop_assert!(score <= 100);
        if positions.iter().all(|p| p.current_value.is_zero()) {
            prop_assert_eq!(score, 20);
        }
    }
}

#[test]
fn empty_portfolio_scores_baseline() {
    assert_eq!(risk_score(&[]), 20);
}

#[test]
fn low_risk_golden_path() {
    let walk = PriceWalk::default();
    let id = "3f2a9c1e-7b4d-4e8a-9c2f-1a2b3c4d5e6f";
    assert_eq!(walk.yearly_price(id, dec!(100), RiskCategory::Low, 3), dec!(92.94));
}
