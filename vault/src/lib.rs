//! # Accrue Vault — Core Library
//!
//! A yield-bearing savings vault: users deposit a single base asset and
//! receive shares whose value grows as interest accrues on the pooled
//! assets, continuously compounded at a governance-set per-second rate.
//!
//! ## Architecture
//!
//! The crate is split along the same lines as the problem:
//!
//! - **math** — Ray-precision (`10^27`) fixed-point arithmetic with wide
//!   intermediates. The one place numeric bugs would be fatal.
//! - **accrual** — Total assets, rate, last-update timestamp, and the
//!   preview/apply split that keeps operations atomic.
//! - **ledger** — Fungible share accounting: balances, allowances, supply.
//! - **vault** — The entry points: deposit/mint/withdraw/redeem, rate and
//!   pause governance, read-only previews.
//! - **access / token / clock** — Trait seams for the external
//!   collaborators (role authority, base asset token, time source), each
//!   with an in-crate mock for tests and simulation.
//! - **event / error** — What the vault tells the world, and how it fails.
//!
//! ## Design Philosophy
//!
//! 1. No floating point anywhere near balances. Exponentiation is repeated
//!    squaring over the ray base, deterministic on every host.
//! 2. Checked arithmetic everywhere money moves; overflow aborts the call
//!    instead of clamping.
//! 3. Every operation is all-or-nothing: a failed call leaves state
//!    byte-for-byte as it was.
//! 4. If it touches money, it has tests. Plural.

pub mod access;
pub mod accrual;
pub mod clock;
pub mod error;
pub mod event;
pub mod ledger;
pub mod math;
pub mod token;
pub mod vault;

pub use access::{AccessControlManager, Address, MockAccessControlManager, ZERO_ADDRESS};
pub use accrual::{compute_updated_assets, AccrualOutcome, AccrualState, SECONDS_PER_YEAR};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::VaultError;
pub use event::VaultEvent;
pub use ledger::{LedgerError, ShareLedger};
pub use math::{MathError, BASE_18, RAY};
pub use token::{AssetToken, MockToken, TokenError};
pub use vault::Vault;
