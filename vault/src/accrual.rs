//! # Interest Accrual
//!
//! Tracks the vault's total assets, the per-second interest rate, and the
//! timestamp interest was last materialized. Between two updates the assets
//! grow by `(1 + rate)^elapsed` -- continuous compounding discretized to
//! whole seconds, computed exactly with [`ray_pow`] rather than any
//! float or logarithm shortcut.
//!
//! Accrual is split into a pure **preview** step and an infallible
//! **apply** step. Every vault operation previews first, performs all of
//! its fallible work, and only then commits; a failure anywhere leaves the
//! accrual state exactly as it was.

use serde::{Deserialize, Serialize};

use crate::math::{self, MathError, RAY};

/// Seconds in a (non-leap) year; the annualization window for APR figures.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Grows `assets` by `(1 + rate)^elapsed`, where `rate` is the per-second
/// ray-scale rate.
///
/// A zero rate or zero elapsed time is an exact identity: the input comes
/// back unchanged, with no rounding loss, no matter how large `elapsed` is.
pub fn compute_updated_assets(assets: u128, rate: u128, elapsed: u64) -> Result<u128, MathError> {
    if assets == 0 || rate == 0 || elapsed == 0 {
        return Ok(assets);
    }
    let base = RAY.checked_add(rate).ok_or(MathError::Overflow)?;
    let growth = math::ray_pow(base, elapsed)?;
    math::mul_div_floor(assets, growth, RAY)
}

// ---------------------------------------------------------------------------
// AccrualState
// ---------------------------------------------------------------------------

/// The result of projecting accrual to a point in time, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// Total assets after growth.
    pub total_assets: u128,
    /// Interest added since the last update (`total_assets - previous`).
    pub interest: u128,
    /// The timestamp the projection was made for.
    pub now: u64,
}

/// Total assets, current rate, and last-update timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualState {
    total_assets: u128,
    rate: u128,
    last_update: u64,
}

impl AccrualState {
    /// Creates a state holding `total_assets` as of `now`, with a zero rate.
    pub fn new(total_assets: u128, now: u64) -> Self {
        Self {
            total_assets,
            rate: 0,
            last_update: now,
        }
    }

    /// Assets as of the last committed update.
    pub fn total_assets(&self) -> u128 {
        self.total_assets
    }

    /// Current per-second rate in ray scale.
    pub fn rate(&self) -> u128 {
        self.rate
    }

    /// Timestamp of the last committed update.
    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    /// Replaces the rate. Callers must commit accrual at the old rate up
    /// to the switch-over instant first, or interest earned under the old
    /// rate would be recomputed under the new one.
    pub fn set_rate(&mut self, rate: u128) {
        self.rate = rate;
    }

    /// Projects the state to `now` without mutating anything.
    ///
    /// Timestamps earlier than `last_update` are treated as zero elapsed
    /// time rather than an error; the host guarantees monotonic calls.
    pub fn preview_at(&self, now: u64) -> Result<AccrualOutcome, MathError> {
        let elapsed = now.saturating_sub(self.last_update);
        let total_assets = compute_updated_assets(self.total_assets, self.rate, elapsed)?;
        Ok(AccrualOutcome {
            total_assets,
            interest: total_assets - self.total_assets,
            now,
        })
    }

    /// Commits a previously computed projection. Infallible by design so
    /// it can sit after the point of no return in a vault operation.
    pub fn apply(&mut self, outcome: AccrualOutcome) {
        self.total_assets = outcome.total_assets;
        self.last_update = outcome.now;
    }

    /// Directly sets the asset total. Used by deposit/withdraw commits,
    /// after the new value has been checked.
    pub fn set_total_assets(&mut self, total_assets: u128) {
        self.total_assets = total_assets;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
