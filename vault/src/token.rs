//! # Base Asset Token Seam
//!
//! The vault holds exactly one external fungible token -- the base asset
//! deposits are denominated in. It is consumed through the narrow
//! [`AssetToken`] interface: balance queries, approvals, the two transfer
//! shapes, and mint/burn. The vault is a trusted issuer of its base asset
//! and materializes accrued interest by minting it to itself. Token
//! failures propagate to the vault caller as-is; the vault never retries
//! or papers over them.
//!
//! [`MockToken`] is the in-crate implementation backing the test suite.
//! It keeps balances and allowances behind a `parking_lot::RwLock` so the
//! trait can take `&self`, the way a genuinely external collaborator would.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::access::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the base asset token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The sender does not hold enough tokens.
    #[error("insufficient token balance: {holder} has {available}, transfer of {requested} requested")]
    InsufficientBalance {
        /// Address whose balance fell short.
        holder: Address,
        /// Current balance.
        available: u128,
        /// Amount requested.
        requested: u128,
    },

    /// `transfer_from` requested more than the spender's allowance.
    #[error("insufficient token allowance: {spender} may spend {allowance} of {owner}'s tokens, {requested} requested")]
    InsufficientAllowance {
        /// Token owner.
        owner: Address,
        /// Spender whose allowance fell short.
        spender: Address,
        /// Current allowance.
        allowance: u128,
        /// Amount requested.
        requested: u128,
    },

    /// A balance would exceed `u128::MAX`.
    #[error("token balance overflow for {holder}")]
    Overflow {
        /// Address whose balance would overflow.
        holder: Address,
    },
}

// ---------------------------------------------------------------------------
// AssetToken
// ---------------------------------------------------------------------------

/// External fungible token with standard approve/transfer semantics.
pub trait AssetToken: Send + Sync {
    /// Address the token contract lives at.
    fn address(&self) -> Address;

    /// Number of decimals in the smallest-unit representation.
    fn decimals(&self) -> u8;

    /// Balance of `holder` in smallest units.
    fn balance_of(&self, holder: &str) -> u128;

    /// Sets `spender`'s allowance over `owner`'s tokens to `amount`.
    fn approve(&self, owner: &str, spender: &str, amount: u128);

    /// Creates `amount` new tokens owned by `to`.
    ///
    /// The vault is a trusted minter of its base asset: accrued interest
    /// is materialized by minting it to the vault, so the vault's token
    /// balance always matches its committed asset total.
    fn mint(&self, to: &str, amount: u128) -> Result<(), TokenError>;

    /// Destroys `amount` tokens held by `from`.
    fn burn(&self, from: &str, amount: u128) -> Result<(), TokenError>;

    /// Moves `amount` from `from` to `to`.
    fn transfer(&self, from: &str, to: &str, amount: u128) -> Result<(), TokenError>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    fn transfer_from(
        &self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), TokenError>;
}

// ---------------------------------------------------------------------------
// MockToken
// ---------------------------------------------------------------------------

struct TokenBook {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

/// In-memory fungible token for tests and simulations.
pub struct MockToken {
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    book: RwLock<TokenBook>,
}

impl MockToken {
    /// Creates an empty token ledger.
    pub fn new(address: &str, name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            address: address.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            book: RwLock::new(TokenBook {
                balances: HashMap::new(),
                allowances: HashMap::new(),
            }),
        }
    }

    /// Token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn move_tokens(
        book: &mut TokenBook,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), TokenError> {
        let from_balance = book.balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                holder: from.to_string(),
                available: from_balance,
                requested: amount,
            });
        }
        let to_balance = book.balances.get(to).copied().unwrap_or(0);
        let to_balance = to_balance.checked_add(amount).ok_or(TokenError::Overflow {
            holder: to.to_string(),
        })?;

        book.balances.insert(from.to_string(), from_balance - amount);
        book.balances.insert(to.to_string(), to_balance);
        Ok(())
    }
}

impl AssetToken for MockToken {
    fn address(&self) -> Address {
        self.address.clone()
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, holder: &str) -> u128 {
        self.book.read().balances.get(holder).copied().unwrap_or(0)
    }

    fn approve(&self, owner: &str, spender: &str, amount: u128) {
        self.book
            .write()
            .allowances
            .insert((owner.to_string(), spender.to_string()), amount);
    }

    fn mint(&self, to: &str, amount: u128) -> Result<(), TokenError> {
        let mut book = self.book.write();
        let balance = book.balances.entry(to.to_string()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow {
            holder: to.to_string(),
        })?;
        Ok(())
    }

    fn burn(&self, from: &str, amount: u128) -> Result<(), TokenError> {
        let mut book = self.book.write();
        let balance = book.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                holder: from.to_string(),
                available: balance,
                requested: amount,
            });
        }
        book.balances.insert(from.to_string(), balance - amount);
        Ok(())
    }

    fn transfer(&self, from: &str, to: &str, amount: u128) -> Result<(), TokenError> {
        Self::move_tokens(&mut self.book.write(), from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), TokenError> {
        let mut book = self.book.write();
        let key = (from.to_string(), spender.to_string());
        let allowance = book.allowances.get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                allowance,
                requested: amount,
            });
        }

        Self::move_tokens(&mut book, from, to, amount)?;
        // Allowance burns only after the transfer is known good.
        if allowance != u128::MAX {
            book.allowances.insert(key, allowance - amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0xa11ce";
    const BOB: &str = "0xb0b";
    const VAULT: &str = "0xvau17";

    fn token() -> MockToken {
        MockToken::new("0x70ken", "Test Euro", "tEUR", 18)
    }

    #[test]
    fn mint_credits_balance() {
        let t = token();
        t.mint(ALICE, 1_000).unwrap();
        assert_eq!(t.balance_of(ALICE), 1_000);
        assert_eq!(t.balance_of(BOB), 0);
    }

    #[test]
    fn burn_debits_balance() {
        let t = token();
        t.mint(ALICE, 1_000).unwrap();
        t.burn(ALICE, 300).unwrap();
        assert_eq!(t.balance_of(ALICE), 700);
        assert!(matches!(
            t.burn(ALICE, 701),
            Err(TokenError::InsufficientBalance {
                available: 700,
                requested: 701,
                ..
            })
        ));
    }

    #[test]
    fn transfer_moves_funds() {
        let t = token();
        t.mint(ALICE, 1_000).unwrap();
        t.transfer(ALICE, BOB, 400).unwrap();
        assert_eq!(t.balance_of(ALICE), 600);
        assert_eq!(t.balance_of(BOB), 400);
    }

    #[test]
    fn transfer_insufficient_balance_rejected() {
        let t = token();
        t.mint(ALICE, 100).unwrap();
        let result = t.transfer(ALICE, BOB, 101);
        assert!(matches!(
            result,
            Err(TokenError::InsufficientBalance {
                available: 100,
                requested: 101,
                ..
            })
        ));
        // Failed transfer leaves both balances untouched.
        assert_eq!(t.balance_of(ALICE), 100);
        assert_eq!(t.balance_of(BOB), 0);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let t = token();
        t.mint(ALICE, 1_000).unwrap();
        t.approve(ALICE, VAULT, 500);

        t.transfer_from(VAULT, ALICE, VAULT, 300).unwrap();
        assert_eq!(t.balance_of(VAULT), 300);

        // 200 of allowance remains; 201 must fail.
        let result = t.transfer_from(VAULT, ALICE, VAULT, 201);
        assert!(matches!(
            result,
            Err(TokenError::InsufficientAllowance { allowance: 200, .. })
        ));
    }

    #[test]
    fn max_allowance_is_infinite() {
        let t = token();
        t.mint(ALICE, 1_000).unwrap();
        t.approve(ALICE, VAULT, u128::MAX);

        t.transfer_from(VAULT, ALICE, VAULT, 600).unwrap();
        t.transfer_from(VAULT, ALICE, VAULT, 400).unwrap();
        assert_eq!(t.balance_of(VAULT), 1_000);
    }

    #[test]
    fn transfer_from_without_approval_rejected() {
        let t = token();
        t.mint(ALICE, 1_000).unwrap();
        let result = t.transfer_from(VAULT, ALICE, VAULT, 1);
        assert!(matches!(
            result,
            Err(TokenError::InsufficientAllowance { allowance: 0, .. })
        ));
    }
}
