//! # Event Surface
//!
//! Every state-changing vault operation appends to an in-memory event log,
//! which callers drain and react to (tests assert on it the way an indexer
//! would consume an on-chain receipt). Events are plain data: serializable,
//! comparable, and cheap to clone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::Address;

/// A state change worth telling the outside world about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    /// The per-second interest rate changed.
    RateUpdated {
        /// New rate in ray scale.
        new_rate: u128,
    },

    /// The pause switch flipped.
    ToggledPause {
        /// Pause status after the flip.
        paused: bool,
    },

    /// Accrued interest was materialized into the asset total.
    /// Only emitted when the interest added is non-zero.
    Accrued {
        /// Interest added, in asset units.
        interest: u128,
    },

    /// Assets came in and shares were minted (deposit or mint).
    Deposit {
        /// Account that supplied the assets.
        caller: Address,
        /// Account the shares were minted to.
        owner: Address,
        /// Assets pulled in.
        assets: u128,
        /// Shares minted.
        shares: u128,
    },

    /// Shares were burned and assets paid out (withdraw or redeem).
    Withdraw {
        /// Account that initiated the exit.
        caller: Address,
        /// Account the assets were paid to.
        receiver: Address,
        /// Account whose shares were burned.
        owner: Address,
        /// Assets paid out.
        assets: u128,
        /// Shares burned.
        shares: u128,
    },
}

impl fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultEvent::RateUpdated { new_rate } => write!(f, "RateUpdated(new_rate={new_rate})"),
            VaultEvent::ToggledPause { paused } => write!(f, "ToggledPause(paused={paused})"),
            VaultEvent::Accrued { interest } => write!(f, "Accrued(interest={interest})"),
            VaultEvent::Deposit {
                caller,
                owner,
                assets,
                shares,
            } => write!(
                f,
                "Deposit(caller={caller}, owner={owner}, assets={assets}, shares={shares})"
            ),
            VaultEvent::Withdraw {
                caller,
                receiver,
                owner,
                assets,
                shares,
            } => write!(
                f,
                "Withdraw(caller={caller}, receiver={receiver}, owner={owner}, assets={assets}, shares={shares})"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_compact() {
        let event = VaultEvent::Accrued { interest: 42 };
        assert_eq!(event.to_string(), "Accrued(interest=42)");
    }

    #[test]
    fn serialization_roundtrip() {
        let event = VaultEvent::Deposit {
            caller: "0xa11ce".into(),
            owner: "0xb0b".into(),
            assets: 10,
            shares: 9,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let recovered: VaultEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(event, recovered);
    }
}
