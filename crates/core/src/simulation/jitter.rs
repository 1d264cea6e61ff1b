//! Cosmetic intraday noise around the stable yearly reference price.

use num_traits::ToPrimitive;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::price_walk::{price_from_f64, round_price};

/// Multiplicative factor `1 + (u - 0.5) * 2 * amplitude` for a uniform `u` in `[0, 1)`.
pub fn jitter_factor<R: Rng + ?Sized>(amplitude: f64, rng: &mut R) -> f64 {
    let uniform: f64 = rng.gen();
    1.0 + (uniform - 0.5) * 2.0 * amplitude
}

/// One tick of display price, always derived from the yearly reference.
///
/// Callers must pass the committed yearly reference, never a previous display price.
pub fn jittered_price<R: Rng + ?Sized>(
    yearly_reference_price: Decimal,
    amplitude: f64,
    rng: &mut R,
) -> Decimal {
    let reference = yearly_reference_price.to_f64().unwrap_or(0.0);
    price_from_f64(reference * jitter_factor(amplitude, rng))
}

/// `(display - base, (display - base) / base * 100)`, both rounded to 2 dp.
/// The percentage is zero when the base price is zero.
pub fn change_from_base(display_price: Decimal, base_price: Decimal) -> (Decimal, Decimal) {
    let change = display_price - base_price;
    let percent = if base_price.is_zero() {
        Decimal::ZERO
    } else {
        round_price(change / base_price * dec!(100))
    };
    (round_price(change), percent)
}
