//! # Share Ledger
//!
//! Fungible accounting for vault shares: a map of owner to balance plus a
//! running total supply, with the invariant that the sum of all balances
//! always equals `total_supply`. Shares behave like any other fungible
//! claim -- they can be transferred between holders and third parties can
//! spend them under an allowance.
//!
//! The ledger knows nothing about assets or exchange rates; conversion math
//! lives in the vault, which is the only code allowed to mint and burn.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from share accounting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An owner does not hold enough shares for a burn or transfer.
    #[error("insufficient shares: {owner} holds {available}, {requested} requested")]
    InsufficientShares {
        /// Share owner.
        owner: Address,
        /// Current holdings.
        available: u128,
        /// Amount requested.
        requested: u128,
    },

    /// A spender tried to move more of an owner's shares than approved.
    #[error("insufficient share allowance: {spender} may spend {allowance} of {owner}'s shares, {requested} requested")]
    InsufficientAllowance {
        /// Share owner.
        owner: Address,
        /// Spender whose allowance fell short.
        spender: Address,
        /// Current allowance.
        allowance: u128,
        /// Amount requested.
        requested: u128,
    },

    /// A balance or the total supply would exceed `u128::MAX`.
    #[error("share balance overflow")]
    Overflow,
}

// ---------------------------------------------------------------------------
// ShareLedger
// ---------------------------------------------------------------------------

/// Balances, allowances, and total supply for the vault's shares.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ShareLedger {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
}

impl ShareLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares held by `owner`.
    pub fn balance_of(&self, owner: &str) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Total shares in existence.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Remaining amount `spender` may move out of `owner`'s holdings.
    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Creates `amount` new shares owned by `owner`.
    pub fn mint(&mut self, owner: &str, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self.balance_of(owner);
        let balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;

        self.total_supply = supply;
        self.balances.insert(owner.to_string(), balance);
        Ok(())
    }

    /// Destroys `amount` shares held by `owner`.
    pub fn burn(&mut self, owner: &str, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balance_of(owner);
        if balance < amount {
            return Err(LedgerError::InsufficientShares {
                owner: owner.to_string(),
                available: balance,
                requested: amount,
            });
        }

        self.balances.insert(owner.to_string(), balance - amount);
        // Supply can't underflow while the sum-of-balances invariant holds.
        self.total_supply -= amount;
        Ok(())
    }

    /// Moves `amount` shares from `from` to `to`.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientShares {
                owner: from.to_string(),
                available: from_balance,
                requested: amount,
            });
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(from.to_string(), from_balance - amount);
        self.balances.insert(to.to_string(), to_balance);
        Ok(())
    }

    /// Sets `spender`'s allowance over `owner`'s shares to `amount`.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u128) {
        self.allowances
            .insert((owner.to_string(), spender.to_string()), amount);
    }

    /// Consumes `amount` of `spender`'s allowance over `owner`'s shares.
    ///
    /// An allowance of `u128::MAX` is treated as infinite and never burns.
    pub fn spend_allowance(
        &mut self,
        owner: &str,
        spender: &str,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
                allowance,
                requested: amount,
            });
        }
        if allowance != u128::MAX {
            self.allowances
                .insert((owner.to_string(), spender.to_string()), allowance - amount);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0xa11ce";
    const BOB: &str = "0xb0b";
    const CAROL: &str = "0xcaro1";

    fn sum_of_balances(ledger: &ShareLedger) -> u128 {
        [ALICE, BOB, CAROL]
            .iter()
            .map(|a| ledger.balance_of(a))
            .sum()
    }

    #[test]
    fn mint_increases_supply_and_balance() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 1_000).unwrap();
        assert_eq!(ledger.balance_of(ALICE), 1_000);
        assert_eq!(ledger.total_supply(), 1_000);
    }

    #[test]
    fn burn_decreases_supply_and_balance() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 1_000).unwrap();
        ledger.burn(ALICE, 400).unwrap();
        assert_eq!(ledger.balance_of(ALICE), 600);
        assert_eq!(ledger.total_supply(), 600);
    }

    #[test]
    fn burn_more_than_held_rejected() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 100).unwrap();
        let result = ledger.burn(ALICE, 101);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientShares {
                available: 100,
                requested: 101,
                ..
            })
        ));
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn transfer_preserves_supply() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 1_000).unwrap();
        ledger.transfer(ALICE, BOB, 250).unwrap();

        assert_eq!(ledger.balance_of(ALICE), 750);
        assert_eq!(ledger.balance_of(BOB), 250);
        assert_eq!(ledger.total_supply(), 1_000);
        assert_eq!(sum_of_balances(&ledger), ledger.total_supply());
    }

    #[test]
    fn supply_matches_sum_after_mixed_operations() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, 700).unwrap();
        ledger.mint(BOB, 300).unwrap();
        ledger.transfer(ALICE, CAROL, 150).unwrap();
        ledger.burn(BOB, 100).unwrap();

        assert_eq!(ledger.total_supply(), 900);
        assert_eq!(sum_of_balances(&ledger), 900);
    }

    #[test]
    fn mint_overflow_rejected() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, u128::MAX).unwrap();
        assert!(matches!(ledger.mint(BOB, 1), Err(LedgerError::Overflow)));
        // Failed mint leaves supply untouched.
        assert_eq!(ledger.total_supply(), u128::MAX);
        assert_eq!(ledger.balance_of(BOB), 0);
    }

    #[test]
    fn spend_allowance_decrements() {
        let mut ledger = ShareLedger::new();
        ledger.approve(ALICE, BOB, 500);
        ledger.spend_allowance(ALICE, BOB, 200).unwrap();
        assert_eq!(ledger.allowance(ALICE, BOB), 300);

        let result = ledger.spend_allowance(ALICE, BOB, 301);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientAllowance { allowance: 300, .. })
        ));
    }

    #[test]
    fn infinite_allowance_never_burns() {
        let mut ledger = ShareLedger::new();
        ledger.approve(ALICE, BOB, u128::MAX);
        ledger.spend_allowance(ALICE, BOB, 1_000_000).unwrap();
        assert_eq!(ledger.allowance(ALICE, BOB), u128::MAX);
    }

    #[test]
    fn allowance_defaults_to_zero() {
        let mut ledger = ShareLedger::new();
        assert_eq!(ledger.allowance(ALICE, BOB), 0);
        assert!(ledger.spend_allowance(ALICE, BOB, 1).is_err());
    }
}
