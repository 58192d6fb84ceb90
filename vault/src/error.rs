//! # Vault Error Taxonomy
//!
//! Every failure is immediate and non-retryable: the operation aborts,
//! state is left untouched, and the error reaches the caller verbatim.
//! Module-level errors (ledger, token, math) bubble up through `#[from]`
//! wrappers so callers can match on the precise cause.

use thiserror::Error;

use crate::access::Address;
use crate::ledger::LedgerError;
use crate::math::MathError;
use crate::token::TokenError;

/// Errors from vault operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// `initialize` was called on an already-initialized vault.
    #[error("vault is already initialized")]
    AlreadyInitialized,

    /// A state-changing or converting operation ran before `initialize`.
    #[error("vault is not initialized")]
    NotInitialized,

    /// The access-control authority lives at the zero address.
    #[error("access control manager is the zero address")]
    ZeroAddress,

    /// The seed divisor was zero or larger than one whole asset unit.
    #[error("invalid seed divisor {divisor}")]
    InvalidDivisor {
        /// The rejected divisor.
        divisor: u128,
    },

    /// Caller lacks the governor role.
    #[error("{caller} is not a governor")]
    NotGovernor {
        /// The rejected caller.
        caller: Address,
    },

    /// Caller holds neither the governor nor the guardian role.
    #[error("{caller} is neither governor nor guardian")]
    NotGovernorOrGuardian {
        /// The rejected caller.
        caller: Address,
    },

    /// The vault is paused; asset-moving operations are refused.
    #[error("vault is paused")]
    Paused,

    /// Share accounting failed (insufficient shares or allowance, overflow).
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The base asset token rejected a transfer; propagated as-is.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Fixed-point arithmetic failed (overflow or division by zero).
    #[error("math error: {0}")]
    Math(#[from] MathError),
}
