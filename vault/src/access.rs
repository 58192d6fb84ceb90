//! # Access Control Seam
//!
//! The vault does not manage roles itself -- governance membership lives in
//! an external authority that answers two questions: "is this address a
//! governor?" and "is it a governor or a guardian?". Governors set the
//! interest rate; guardians can additionally flip the pause switch in an
//! emergency.
//!
//! [`MockAccessControlManager`] is the in-crate stand-in used by tests and
//! simulations, with roles toggled directly.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Addresses are plain hex strings, matching the wire representation used
/// by every collaborator interface.
pub type Address = String;

/// The null address. Passing an authority located here to `initialize`
/// is rejected outright.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// External authority for governance role checks.
pub trait AccessControlManager: Send + Sync {
    /// Address the authority itself lives at.
    fn address(&self) -> Address;

    /// Whether `addr` holds the governor role.
    fn is_governor(&self, addr: &str) -> bool;

    /// Whether `addr` holds the governor or guardian role.
    fn is_governor_or_guardian(&self, addr: &str) -> bool;
}

/// In-memory role registry for tests and local simulation.
///
/// Role membership is toggled, not granted/revoked -- calling
/// [`toggle_governor`](Self::toggle_governor) twice is a no-op overall.
#[derive(Debug, Default)]
pub struct MockAccessControlManager {
    address: Address,
    governors: RwLock<HashSet<Address>>,
    guardians: RwLock<HashSet<Address>>,
}

impl MockAccessControlManager {
    /// Creates an empty registry at the given address.
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            governors: RwLock::new(HashSet::new()),
            guardians: RwLock::new(HashSet::new()),
        }
    }

    /// Flips governor membership for `addr`.
    pub fn toggle_governor(&self, addr: &str) {
        let mut governors = self.governors.write();
        if !governors.remove(addr) {
            governors.insert(addr.to_string());
        }
    }

    /// Flips guardian membership for `addr`.
    pub fn toggle_guardian(&self, addr: &str) {
        let mut guardians = self.guardians.write();
        if !guardians.remove(addr) {
            guardians.insert(addr.to_string());
        }
    }
}

impl AccessControlManager for MockAccessControlManager {
    fn address(&self) -> Address {
        self.address.clone()
    }

    fn is_governor(&self, addr: &str) -> bool {
        self.governors.read().contains(addr)
    }

    fn is_governor_or_guardian(&self, addr: &str) -> bool {
        self.is_governor(addr) || self.guardians.read().contains(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOV: &str = "0xg0v";
    const GUARD: &str = "0xguard";

    #[test]
    fn roles_default_to_none() {
        let acm = MockAccessControlManager::new("0xacm");
        assert!(!acm.is_governor(GOV));
        assert!(!acm.is_governor_or_guardian(GOV));
    }

    #[test]
    fn toggle_governor_grants_and_revokes() {
        let acm = MockAccessControlManager::new("0xacm");
        acm.toggle_governor(GOV);
        assert!(acm.is_governor(GOV));
        assert!(acm.is_governor_or_guardian(GOV));

        acm.toggle_governor(GOV);
        assert!(!acm.is_governor(GOV));
    }

    #[test]
    fn guardian_is_not_governor() {
        let acm = MockAccessControlManager::new("0xacm");
        acm.toggle_guardian(GUARD);
        assert!(!acm.is_governor(GUARD));
        assert!(acm.is_governor_or_guardian(GUARD));
    }
}
