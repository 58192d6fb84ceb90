//! # Accrue CLI
//!
//! Entry point for the `accrue` binary. Parses CLI arguments, initializes
//! logging, and runs the requested calculation against the vault's own
//! accrual engine, so the numbers printed here are exactly the numbers the
//! vault would produce.
//!
//! The binary supports two subcommands:
//!
//! - `rate`    — convert an effective yearly yield into a per-second ray rate
//! - `project` — print a compounded balance trajectory

mod cli;
mod logging;

use anyhow::{bail, Result};
use clap::Parser;

use accrue_vault::accrual::{compute_updated_assets, SECONDS_PER_YEAR};
use accrue_vault::math::{ray_pow, BASE_18, RAY};

use cli::{AccrueCli, Commands, ProjectArgs, RateArgs};
use logging::LogFormat;

const SECONDS_PER_DAY: u64 = 24 * 3_600;

fn main() -> Result<()> {
    let cli = AccrueCli::parse();
    logging::init_logging("accrue=info", LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Rate(args) => run_rate(args),
        Commands::Project(args) => run_project(args),
    }
}

/// `rate`: solve for the per-second ray rate that compounds to the
/// requested yearly yield, then recover the yield from the rate as a
/// round-trip check.
fn run_rate(args: RateArgs) -> Result<()> {
    let rate = solve_rate(args.yearly_percent)?;
    let recovered = effective_yearly_percent(rate)?;

    tracing::info!(
        yearly_percent = args.yearly_percent,
        rate,
        "solved per-second rate"
    );

    if args.json {
        let line = serde_json::json!({
            "yearly_percent": args.yearly_percent,
            "rate_ray_per_second": rate.to_string(),
            "recovered_yearly_percent": recovered,
        });
        println!("{line}");
    } else {
        println!("yearly yield       : {}%", args.yearly_percent);
        println!("per-second rate    : {rate} (ray)");
        println!("recovered yield    : {recovered:.9}%");
    }
    Ok(())
}

/// `project`: compound the principal over the horizon and print
/// evenly-spaced checkpoints.
fn run_project(args: ProjectArgs) -> Result<()> {
    if args.steps == 0 {
        bail!("steps must be at least 1");
    }
    if !args.principal.is_finite() || args.principal < 0.0 {
        bail!("principal must be a non-negative number");
    }

    let rate = solve_rate(args.yearly_percent)?;
    let principal = (args.principal * BASE_18 as f64) as u128;
    let horizon = args
        .days
        .checked_mul(SECONDS_PER_DAY)
        .ok_or_else(|| anyhow::anyhow!("projection horizon overflows"))?;

    tracing::info!(
        yearly_percent = args.yearly_percent,
        rate,
        principal,
        days = args.days,
        "projecting balance"
    );

    if !args.json {
        println!("{:>8}  {:>24}", "day", "balance");
    }
    for i in 1..=args.steps {
        // Integer split of the horizon; the final checkpoint always lands
        // exactly on `days`.
        let elapsed = horizon / args.steps * i;
        let balance = compute_updated_assets(principal, rate, elapsed)?;
        let day = elapsed / SECONDS_PER_DAY;

        if args.json {
            let line = serde_json::json!({
                "day": day,
                "elapsed_seconds": elapsed,
                "balance_units": balance.to_string(),
                "balance_tokens": balance as f64 / BASE_18 as f64,
            });
            println!("{line}");
        } else {
            println!("{:>8}  {:>24.9}", day, balance as f64 / BASE_18 as f64);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Yield <-> rate conversion
// ---------------------------------------------------------------------------

/// Largest per-second rate such that compounding it over one year does not
/// exceed the requested yearly growth.
///
/// The yearly growth factor is monotonic in the rate, so a plain bisection
/// against the vault's own `ray_pow` finds the rate without any floating
/// point in the hot path.
fn solve_rate(yearly_percent: f64) -> Result<u128> {
    if !yearly_percent.is_finite() || yearly_percent < 0.0 {
        bail!("yearly yield must be a non-negative percentage");
    }
    if yearly_percent == 0.0 {
        return Ok(0);
    }

    // Target yearly growth factor in ray. The f64 rounding here is far
    // below the 9 decimal places the output reports.
    let target = RAY + (yearly_percent / 100.0 * RAY as f64) as u128;

    let mut hi: u128 = 1;
    while yearly_growth(hi)? < target {
        hi = hi.checked_mul(2).ok_or_else(|| {
            anyhow::anyhow!("yearly yield {yearly_percent}% is out of range")
        })?;
    }

    let mut lo: u128 = 0;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if yearly_growth(mid)? <= target {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// Compounds `rate` over a full year, returning the growth factor in ray.
fn yearly_growth(rate: u128) -> Result<u128> {
    let base = RAY
        .checked_add(rate)
        .ok_or_else(|| anyhow::anyhow!("rate out of range"))?;
    Ok(ray_pow(base, SECONDS_PER_YEAR)?)
}

/// Effective yearly yield of `rate`, in percent.
fn effective_yearly_percent(rate: u128) -> Result<f64> {
    let grown = compute_updated_assets(BASE_18, rate, SECONDS_PER_YEAR)?;
    Ok((grown - BASE_18) as f64 / BASE_18 as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_yield_maps_to_zero_rate() {
        assert_eq!(solve_rate(0.0).unwrap(), 0);
        assert_eq!(effective_yearly_percent(0).unwrap(), 0.0);
    }

    #[test]
    fn ten_percent_round_trips() {
        let rate = solve_rate(10.0).unwrap();
        let recovered = effective_yearly_percent(rate).unwrap();
        assert!(
            (recovered - 10.0).abs() < 1e-6,
            "recovered {recovered}% from rate {rate}"
        );
    }

    #[test]
    fn higher_yield_means_higher_rate() {
        let five = solve_rate(5.0).unwrap();
        let ten = solve_rate(10.0).unwrap();
        let fifty = solve_rate(50.0).unwrap();
        assert!(five < ten && ten < fifty);
    }

    #[test]
    fn negative_and_nan_yields_rejected() {
        assert!(solve_rate(-1.0).is_err());
        assert!(solve_rate(f64::NAN).is_err());
    }
}
