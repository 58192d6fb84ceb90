//! # Ray Fixed-Point Arithmetic
//!
//! All interest-rate math in the vault runs at **ray precision**: fixed-point
//! values scaled by `10^27`. A per-second growth factor of exactly 1 is `RAY`;
//! a factor of 1.0000000030222659... (roughly 10% effective yearly yield) is
//! `RAY + 3_022_265_980_097_387_650`.
//!
//! Intermediate products routinely exceed 128 bits -- squaring a ray-scale
//! factor is already on the order of `10^54` -- so every multiply-then-divide
//! goes through `BigUint` and is checked back into `u128` afterwards. There is
//! no floating point anywhere in this module: exponentiation is repeated
//! squaring over the ray base with floor rounding at each step, which makes
//! results deterministic across hosts and reproducible in tests.

use num_bigint::BigUint;
use thiserror::Error;

/// Ray precision scale: `10^27`.
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// One whole unit of an 18-decimal asset: `10^18`.
pub const BASE_18: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from fixed-point arithmetic.
///
/// Every failure aborts the surrounding vault operation -- the math layer
/// never clamps or saturates, because a silently wrong total is worse than
/// a loud failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// A result does not fit in 128 bits.
    #[error("arithmetic overflow: result exceeds 128 bits")]
    Overflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// Multiply-then-divide
// ---------------------------------------------------------------------------

/// Computes `a * b / denominator` with floor rounding.
///
/// The product is taken in arbitrary precision, so `a * b` overflowing
/// `u128` is fine as long as the quotient fits.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let wide = BigUint::from(a) * BigUint::from(b) / BigUint::from(denominator);
    to_u128(wide)
}

/// Computes `a * b / denominator` with ceiling rounding.
///
/// Used where rounding must favor the vault: share prices charged on
/// `mint` and `withdraw` round up so that rounding dust never drains
/// collateral from the remaining holders.
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = BigUint::from(a) * BigUint::from(b);
    let wide = (product + BigUint::from(denominator - 1)) / BigUint::from(denominator);
    to_u128(wide)
}

// ---------------------------------------------------------------------------
// Exponentiation
// ---------------------------------------------------------------------------

/// Raises a ray-scale base to an integer power: `(base / RAY)^exp`, result
/// in ray scale.
///
/// Implemented as exponentiation by squaring, dividing by `RAY` (floor)
/// after every multiplication. Squarings happen in `BigUint`, and both the
/// running result and the running base are checked back into `u128` after
/// each step, so a rate/elapsed combination whose compounded factor cannot
/// be represented fails with [`MathError::Overflow`] instead of producing
/// a truncated total.
///
/// `ray_pow(x, 0) == RAY` for any `x`, including zero.
pub fn ray_pow(base: u128, mut exp: u64) -> Result<u128, MathError> {
    let ray = BigUint::from(RAY);
    let mut result = ray.clone();
    let mut b = BigUint::from(base);

    while exp > 0 {
        if exp & 1 == 1 {
            result = result * &b / &ray;
            // The checked conversion doubles as the overflow guard: the
            // highest remaining bit of `exp` always multiplies `b` into
            // `result`, so an oversized intermediate can never shrink away.
            result = BigUint::from(to_u128(result)?);
        }
        exp >>= 1;
        if exp > 0 {
            b = &b * &b / &ray;
            b = BigUint::from(to_u128(b)?);
        }
    }

    to_u128(result)
}

fn to_u128(value: BigUint) -> Result<u128, MathError> {
    u128::try_from(value).map_err(|_| MathError::Overflow)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Per-second ray rate for a 10% effective yearly yield:
    /// `1.1^(1 / 31_536_000) - 1`, scaled by `10^27`.
    const TEN_PCT_YEARLY: u128 = 3_022_265_980_097_387_650;
    const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

    /// Asserts two values agree within `tolerance_ppm` parts per million
    /// of `expected`.
    fn assert_approx(actual: u128, expected: u128, tolerance_ppm: u128) {
        let diff = actual.abs_diff(expected);
        assert!(
            diff * 1_000_000 <= expected * tolerance_ppm,
            "actual {actual} differs from expected {expected} by more than {tolerance_ppm} ppm"
        );
    }

    #[test]
    fn mul_div_floor_rounds_down() {
        assert_eq!(mul_div_floor(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div_floor(7, 1, 2).unwrap(), 3);
    }

    #[test]
    fn mul_div_ceil_rounds_up() {
        assert_eq!(mul_div_ceil(10, 10, 3).unwrap(), 34);
        assert_eq!(mul_div_ceil(7, 1, 2).unwrap(), 4);
        // Exact division must not round.
        assert_eq!(mul_div_ceil(10, 10, 4).unwrap(), 25);
    }

    #[test]
    fn mul_div_survives_wide_intermediates() {
        // a * b is near 2^252, far beyond u128, but the quotient fits.
        let a = u128::MAX / 2;
        let b = u128::MAX / 2;
        let result = mul_div_floor(a, b, u128::MAX).unwrap();
        assert_eq!(result, u128::MAX / 4);
    }

    #[test]
    fn mul_div_overflowing_quotient_rejected() {
        assert_eq!(
            mul_div_floor(u128::MAX, 2, 1),
            Err(MathError::Overflow)
        );
        assert_eq!(mul_div_ceil(u128::MAX, 2, 1), Err(MathError::Overflow));
    }

    #[test]
    fn mul_div_by_zero_rejected() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(MathError::DivisionByZero));
        assert_eq!(mul_div_ceil(1, 1, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn ray_pow_zero_exponent_is_identity() {
        assert_eq!(ray_pow(0, 0).unwrap(), RAY);
        assert_eq!(ray_pow(RAY, 0).unwrap(), RAY);
        assert_eq!(ray_pow(2 * RAY, 0).unwrap(), RAY);
    }

    #[test]
    fn ray_pow_exponent_one_returns_base() {
        assert_eq!(ray_pow(RAY, 1).unwrap(), RAY);
        assert_eq!(ray_pow(3 * RAY / 2, 1).unwrap(), 3 * RAY / 2);
    }

    #[test]
    fn ray_pow_unit_base_stays_unit() {
        // (1.0)^n == 1.0 for any n -- this is what makes a zero interest
        // rate a true identity regardless of elapsed time.
        assert_eq!(ray_pow(RAY, SECONDS_PER_YEAR).unwrap(), RAY);
        assert_eq!(ray_pow(RAY, u64::MAX).unwrap(), RAY);
    }

    #[test]
    fn ray_pow_small_integer_powers() {
        assert_eq!(ray_pow(2 * RAY, 10).unwrap(), 1024 * RAY);
        assert_eq!(ray_pow(3 * RAY, 4).unwrap(), 81 * RAY);
    }

    #[test]
    fn ray_pow_one_year_of_ten_percent() {
        let factor = ray_pow(RAY + TEN_PCT_YEARLY, SECONDS_PER_YEAR).unwrap();
        // 1.1x within 0.01%.
        assert_approx(factor, RAY + RAY / 10, 100);
    }

    #[test]
    fn ray_pow_ten_years_compounds_not_multiplies() {
        let factor = ray_pow(RAY + TEN_PCT_YEARLY, 10 * SECONDS_PER_YEAR).unwrap();
        // 1.1^10 = 2.5937424601..., decisively more than the 2.0x a
        // simple-interest model would produce.
        assert_approx(factor, 2_593_742_460 * (RAY / 1_000_000_000), 100);
        assert!(factor > 2 * RAY);
    }

    #[test]
    fn ray_pow_shrinking_base_decays() {
        let half = RAY / 2;
        assert_eq!(ray_pow(half, 2).unwrap(), RAY / 4);
        // A sub-unit base decays towards zero instead of overflowing,
        // even for absurd exponents.
        assert_eq!(ray_pow(half, 1_000).unwrap(), 0);
    }

    #[test]
    fn ray_pow_overflow_detected() {
        // 2^200 at ray scale cannot fit in 128 bits.
        assert_eq!(ray_pow(2 * RAY, 200), Err(MathError::Overflow));
    }

    #[test]
    fn ray_pow_rounds_toward_zero() {
        // Each squaring floors, so the computed power can only ever
        // undershoot the exact value -- never credit phantom interest.
        let base = RAY + 1;
        let exact_upper_bound = RAY + 4; // (1 + 1e-27)^4 < 1 + 4e-27 + eps
        assert!(ray_pow(base, 4).unwrap() <= exact_upper_bound);
    }
}
