//! # Savings Vault
//!
//! The vault ties the pieces together: users deposit the base asset and
//! receive shares whose value grows as interest accrues on the pooled
//! assets. Governance sets the per-second rate; a guardian can pause the
//! four asset-moving operations without blocking governance itself.
//!
//! ## Call Shape
//!
//! Every mutating entry point follows the same discipline:
//!
//! 1. **Checks** -- initialization, pause state, role gates.
//! 2. **Accrual preview** -- project `total_assets` to now at the current
//!    rate, without committing anything yet.
//! 3. **Conversion** -- compute shares/assets against the post-accrual
//!    totals, with the rounding direction that favors the vault.
//! 4. **Effects, then interaction** -- internal ledger mutations happen
//!    before the external token calls; if a token call fails, the
//!    mutations are rolled back so a failed call leaves no trace.
//! 5. **Commit and emit** -- accrual is applied (interest minted to the
//!    vault in the base asset, so its token balance tracks
//!    `total_assets`), totals updated, and events appended (`Accrued`
//!    first when interest was added).
//!
//! Calls against a vault instance are serialized by construction: all
//! mutating operations take `&mut self`, so no two can interleave and no
//! separate locking discipline is needed.
//!
//! ## Seed Deposit
//!
//! `initialize` pulls a nominal amount of the asset from the initializing
//! caller and mints matching shares **to the vault itself**. The vault
//! therefore always holds at least one claim against itself: conversions
//! never divide by zero, and no first depositor can set a degenerate
//! exchange rate by donating assets against a dust supply.

use std::sync::Arc;

use tracing::{debug, info};

use crate::access::{AccessControlManager, Address, ZERO_ADDRESS};
use crate::accrual::{self, AccrualOutcome, AccrualState, SECONDS_PER_YEAR};
use crate::clock::Clock;
use crate::error::VaultError;
use crate::event::VaultEvent;
use crate::ledger::ShareLedger;
use crate::math::{self, MathError, BASE_18};
use crate::token::AssetToken;

/// A single-asset, single-rate savings vault.
pub struct Vault {
    address: Address,
    clock: Arc<dyn Clock>,
    name: String,
    symbol: String,
    access_control: Option<Arc<dyn AccessControlManager>>,
    asset: Option<Arc<dyn AssetToken>>,
    accrual: AccrualState,
    ledger: ShareLedger,
    paused: bool,
    initialized: bool,
    events: Vec<VaultEvent>,
}

impl Vault {
    /// Creates an uninitialized vault shell at `address`.
    ///
    /// Nothing works until [`initialize`](Self::initialize) runs; this
    /// mirrors a deployment whose storage starts empty.
    pub fn new(address: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            address: address.to_string(),
            clock,
            name: String::new(),
            symbol: String::new(),
            access_control: None,
            asset: None,
            accrual: AccrualState::default(),
            ledger: ShareLedger::new(),
            paused: false,
            initialized: false,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Wires up the collaborators and seeds the vault.
    ///
    /// Pulls `10^decimals / divisor` of the base asset from `caller` (who
    /// must have approved the vault) and mints the same nominal amount of
    /// shares to the vault's own address, so `total_assets` and
    /// `total_supply` both start non-zero.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AlreadyInitialized`] on any second call.
    /// - [`VaultError::ZeroAddress`] if the authority lives at the zero
    ///   address.
    /// - [`VaultError::InvalidDivisor`] if `divisor` is zero or would
    ///   produce a zero seed.
    /// - Token errors from the seed transfer, propagated as-is.
    pub fn initialize(
        &mut self,
        access_control: Arc<dyn AccessControlManager>,
        asset: Arc<dyn AssetToken>,
        name: &str,
        symbol: &str,
        divisor: u128,
        caller: &str,
    ) -> Result<(), VaultError> {
        if self.initialized {
            return Err(VaultError::AlreadyInitialized);
        }
        if access_control.address() == ZERO_ADDRESS {
            return Err(VaultError::ZeroAddress);
        }

        let unit = 10u128
            .checked_pow(asset.decimals() as u32)
            .ok_or(MathError::Overflow)?;
        let seed = match divisor {
            0 => return Err(VaultError::InvalidDivisor { divisor }),
            d => unit / d,
        };
        if seed == 0 {
            return Err(VaultError::InvalidDivisor { divisor });
        }

        asset.transfer_from(&self.address, caller, &self.address, seed)?;
        if let Err(e) = self.ledger.mint(&self.address, seed) {
            // Return the seed rather than hold unaccounted assets.
            let _ = asset.transfer(&self.address, caller, seed);
            return Err(e.into());
        }

        self.accrual = AccrualState::new(seed, self.clock.now());
        self.name = name.to_string();
        self.symbol = symbol.to_string();
        self.access_control = Some(access_control);
        self.asset = Some(asset);
        self.initialized = true;

        info!(vault = %self.address, %name, %symbol, seed, "vault initialized");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Sets the per-second interest rate (ray scale). Governor only.
    ///
    /// Interest earned under the old rate is accrued up to now first, so a
    /// rate change never rewrites the past.
    pub fn set_rate(&mut self, caller: &str, new_rate: u128) -> Result<(), VaultError> {
        self.ensure_initialized()?;
        self.require_governor(caller)?;
        let asset = self.asset_token()?;

        let outcome = self.accrual.preview_at(self.clock.now())?;
        self.mint_interest(&asset, outcome)?;
        self.commit_accrual(outcome);
        self.accrual.set_rate(new_rate);
        self.events.push(VaultEvent::RateUpdated { new_rate });

        info!(vault = %self.address, new_rate, "interest rate updated");
        Ok(())
    }

    /// Flips the pause switch. Governor or guardian.
    ///
    /// Pausing blocks deposit/mint/withdraw/redeem but deliberately not
    /// `set_rate` or a second `toggle_pause`: governance must stay able to
    /// act while the vault is frozen.
    pub fn toggle_pause(&mut self, caller: &str) -> Result<(), VaultError> {
        self.ensure_initialized()?;
        self.require_governor_or_guardian(caller)?;
        let asset = self.asset_token()?;

        let outcome = self.accrual.preview_at(self.clock.now())?;
        self.mint_interest(&asset, outcome)?;
        self.commit_accrual(outcome);
        self.paused = !self.paused;
        self.events.push(VaultEvent::ToggledPause {
            paused: self.paused,
        });

        info!(vault = %self.address, paused = self.paused, "pause toggled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Asset-moving operations
    // -----------------------------------------------------------------------

    /// Deposits `assets` from `caller`, minting shares to `receiver`.
    ///
    /// Shares are computed against the post-accrual totals with floor
    /// rounding: freshly accrued interest dilutes the incoming deposit,
    /// never the other way around. Returns the shares minted.
    pub fn deposit(
        &mut self,
        caller: &str,
        assets: u128,
        receiver: &str,
    ) -> Result<u128, VaultError> {
        self.ensure_active()?;
        let asset = self.asset_token()?;

        let outcome = self.accrual.preview_at(self.clock.now())?;
        let shares = shares_floor(assets, self.ledger.total_supply(), outcome.total_assets)?;
        self.enter(caller, receiver, assets, shares, outcome, asset)
    }

    /// Mints exactly `shares` to `receiver`, pulling whatever assets that
    /// costs from `caller`. Returns the assets pulled.
    ///
    /// The asset price is rounded **up**, so minting can never leave the
    /// vault under-collateralized by a rounding remainder.
    pub fn mint(
        &mut self,
        caller: &str,
        shares: u128,
        receiver: &str,
    ) -> Result<u128, VaultError> {
        self.ensure_active()?;
        let asset = self.asset_token()?;

        let outcome = self.accrual.preview_at(self.clock.now())?;
        let assets = assets_ceil(shares, self.ledger.total_supply(), outcome.total_assets)?;
        self.enter(caller, receiver, assets, shares, outcome, asset)?;
        Ok(assets)
    }

    /// Withdraws exactly `assets` to `receiver`, burning shares from
    /// `owner`. Returns the shares burned (rounded up).
    ///
    /// When `caller != owner` the burn spends the caller's share
    /// allowance.
    pub fn withdraw(
        &mut self,
        caller: &str,
        assets: u128,
        receiver: &str,
        owner: &str,
    ) -> Result<u128, VaultError> {
        self.ensure_active()?;
        let asset = self.asset_token()?;

        let outcome = self.accrual.preview_at(self.clock.now())?;
        let shares = shares_ceil(assets, self.ledger.total_supply(), outcome.total_assets)?;
        self.exit(caller, receiver, owner, assets, shares, outcome, asset)?;
        Ok(shares)
    }

    /// Redeems exactly `shares` from `owner`, paying assets to `receiver`.
    /// Returns the assets paid out (rounded down).
    pub fn redeem(
        &mut self,
        caller: &str,
        shares: u128,
        receiver: &str,
        owner: &str,
    ) -> Result<u128, VaultError> {
        self.ensure_active()?;
        let asset = self.asset_token()?;

        let outcome = self.accrual.preview_at(self.clock.now())?;
        let assets = assets_floor(shares, self.ledger.total_supply(), outcome.total_assets)?;
        self.exit(caller, receiver, owner, assets, shares, outcome, asset)?;
        Ok(assets)
    }

    /// Shared entry path for `deposit` and `mint`.
    fn enter(
        &mut self,
        caller: &str,
        receiver: &str,
        assets: u128,
        shares: u128,
        outcome: AccrualOutcome,
        asset: Arc<dyn AssetToken>,
    ) -> Result<u128, VaultError> {
        let new_total = outcome
            .total_assets
            .checked_add(assets)
            .ok_or(MathError::Overflow)?;

        self.ledger.mint(receiver, shares)?;
        if let Err(e) = asset.transfer_from(&self.address, caller, &self.address, assets) {
            // Burning the just-minted amount cannot fail.
            let _ = self.ledger.burn(receiver, shares);
            return Err(e.into());
        }
        if let Err(e) = self.mint_interest(&asset, outcome) {
            let _ = asset.transfer(&self.address, caller, assets);
            let _ = self.ledger.burn(receiver, shares);
            return Err(e);
        }

        self.commit_accrual(outcome);
        self.accrual.set_total_assets(new_total);
        self.events.push(VaultEvent::Deposit {
            caller: caller.to_string(),
            owner: receiver.to_string(),
            assets,
            shares,
        });

        debug!(vault = %self.address, caller, receiver, assets, shares, "deposit");
        Ok(shares)
    }

    /// Shared exit path for `withdraw` and `redeem`.
    ///
    /// Internal debits land before the outbound transfer; a transfer
    /// failure unwinds them so the call is all-or-nothing.
    #[allow(clippy::too_many_arguments)]
    fn exit(
        &mut self,
        caller: &str,
        receiver: &str,
        owner: &str,
        assets: u128,
        shares: u128,
        outcome: AccrualOutcome,
        asset: Arc<dyn AssetToken>,
    ) -> Result<(), VaultError> {
        let remaining_total = outcome
            .total_assets
            .checked_sub(assets)
            .ok_or(MathError::Overflow)?;

        let prior_allowance = if caller != owner {
            let allowance = self.ledger.allowance(owner, caller);
            self.ledger.spend_allowance(owner, caller, shares)?;
            Some(allowance)
        } else {
            None
        };

        if let Err(e) = self.ledger.burn(owner, shares) {
            if let Some(allowance) = prior_allowance {
                self.ledger.approve(owner, caller, allowance);
            }
            return Err(e.into());
        }

        // Accrued interest is minted before the payout: redeeming yield
        // may require more of the asset than the vault currently holds.
        if let Err(e) = self.mint_interest(&asset, outcome) {
            let _ = self.ledger.mint(owner, shares);
            if let Some(allowance) = prior_allowance {
                self.ledger.approve(owner, caller, allowance);
            }
            return Err(e);
        }

        if let Err(e) = asset.transfer(&self.address, receiver, assets) {
            // Re-minting what was just burned cannot fail; the interest
            // minted above is burned back so the failed call leaves the
            // token supply untouched too.
            let _ = asset.burn(&self.address, outcome.interest);
            let _ = self.ledger.mint(owner, shares);
            if let Some(allowance) = prior_allowance {
                self.ledger.approve(owner, caller, allowance);
            }
            return Err(e.into());
        }

        self.commit_accrual(outcome);
        self.accrual.set_total_assets(remaining_total);
        self.events.push(VaultEvent::Withdraw {
            caller: caller.to_string(),
            receiver: receiver.to_string(),
            owner: owner.to_string(),
            assets,
            shares,
        });

        debug!(vault = %self.address, caller, receiver, owner, assets, shares, "withdraw");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Share token surface
    // -----------------------------------------------------------------------

    /// Transfers `amount` shares from `caller` to `to`.
    ///
    /// Share transfers stay live while the vault is paused; only
    /// asset-moving operations are gated.
    pub fn transfer_shares(
        &mut self,
        caller: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), VaultError> {
        self.ensure_initialized()?;
        self.ledger.transfer(caller, to, amount)?;
        Ok(())
    }

    /// Sets `spender`'s allowance over `caller`'s shares.
    pub fn approve_shares(
        &mut self,
        caller: &str,
        spender: &str,
        amount: u128,
    ) -> Result<(), VaultError> {
        self.ensure_initialized()?;
        self.ledger.approve(caller, spender, amount);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only views
    // -----------------------------------------------------------------------

    /// Total assets under management, projected to now. Never mutates.
    pub fn total_assets(&self) -> Result<u128, VaultError> {
        self.ensure_initialized()?;
        Ok(self.accrual.preview_at(self.clock.now())?.total_assets)
    }

    /// Effective yearly growth at the current rate, in `10^18` scale
    /// (`0.1 * 10^18` means 10% per year), obtained by compounding the
    /// per-second rate over a full year.
    pub fn estimated_apr(&self) -> Result<u128, VaultError> {
        self.ensure_initialized()?;
        let grown = accrual::compute_updated_assets(BASE_18, self.accrual.rate(), SECONDS_PER_YEAR)?;
        Ok(grown - BASE_18)
    }

    /// Grows `assets` by `elapsed` seconds at the current rate.
    pub fn compute_updated_assets(&self, assets: u128, elapsed: u64) -> Result<u128, VaultError> {
        Ok(accrual::compute_updated_assets(
            assets,
            self.accrual.rate(),
            elapsed,
        )?)
    }

    /// Shares that `assets` are worth at the current (projected) exchange
    /// rate, floor rounded.
    pub fn convert_to_shares(&self, assets: u128) -> Result<u128, VaultError> {
        self.ensure_initialized()?;
        let outcome = self.accrual.preview_at(self.clock.now())?;
        shares_floor(assets, self.ledger.total_supply(), outcome.total_assets)
    }

    /// Assets that `shares` are worth at the current (projected) exchange
    /// rate, floor rounded.
    pub fn convert_to_assets(&self, shares: u128) -> Result<u128, VaultError> {
        self.ensure_initialized()?;
        let outcome = self.accrual.preview_at(self.clock.now())?;
        assets_floor(shares, self.ledger.total_supply(), outcome.total_assets)
    }

    /// Shares a deposit of `assets` would mint right now.
    pub fn preview_deposit(&self, assets: u128) -> Result<u128, VaultError> {
        self.convert_to_shares(assets)
    }

    /// Assets a mint of `shares` would cost right now (rounded up).
    pub fn preview_mint(&self, shares: u128) -> Result<u128, VaultError> {
        self.ensure_initialized()?;
        let outcome = self.accrual.preview_at(self.clock.now())?;
        assets_ceil(shares, self.ledger.total_supply(), outcome.total_assets)
    }

    /// Shares a withdrawal of `assets` would burn right now (rounded up).
    pub fn preview_withdraw(&self, assets: u128) -> Result<u128, VaultError> {
        self.ensure_initialized()?;
        let outcome = self.accrual.preview_at(self.clock.now())?;
        shares_ceil(assets, self.ledger.total_supply(), outcome.total_assets)
    }

    /// Assets a redemption of `shares` would pay right now.
    pub fn preview_redeem(&self, shares: u128) -> Result<u128, VaultError> {
        self.convert_to_assets(shares)
    }

    /// Current per-second rate, ray scale.
    pub fn rate(&self) -> u128 {
        self.accrual.rate()
    }

    /// Timestamp of the last committed accrual.
    pub fn last_update(&self) -> u64 {
        self.accrual.last_update()
    }

    /// Pause status.
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Whether `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total shares in existence.
    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    /// Shares held by `owner`.
    pub fn balance_of(&self, owner: &str) -> u128 {
        self.ledger.balance_of(owner)
    }

    /// Share allowance from `owner` to `spender`.
    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    /// The vault's own address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Share token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Address of the base asset token.
    pub fn asset_address(&self) -> Result<Address, VaultError> {
        Ok(self.asset_token()?.address())
    }

    /// Hands out everything emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events emitted and not yet drained.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Materializes pending interest by minting it to the vault in the
    /// base asset. Keeps the vault's token balance in lockstep with its
    /// committed `total_assets`.
    fn mint_interest(
        &self,
        asset: &Arc<dyn AssetToken>,
        outcome: AccrualOutcome,
    ) -> Result<(), VaultError> {
        if outcome.interest > 0 {
            asset.mint(&self.address, outcome.interest)?;
        }
        Ok(())
    }

    fn commit_accrual(&mut self, outcome: AccrualOutcome) {
        self.accrual.apply(outcome);
        if outcome.interest > 0 {
            self.events.push(VaultEvent::Accrued {
                interest: outcome.interest,
            });
            debug!(vault = %self.address, interest = outcome.interest, "interest accrued");
        }
    }

    fn ensure_initialized(&self) -> Result<(), VaultError> {
        if self.initialized {
            Ok(())
        } else {
            Err(VaultError::NotInitialized)
        }
    }

    fn ensure_active(&self) -> Result<(), VaultError> {
        self.ensure_initialized()?;
        if self.paused {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    fn require_governor(&self, caller: &str) -> Result<(), VaultError> {
        let acm = self
            .access_control
            .as_ref()
            .ok_or(VaultError::NotInitialized)?;
        if acm.is_governor(caller) {
            Ok(())
        } else {
            Err(VaultError::NotGovernor {
                caller: caller.to_string(),
            })
        }
    }

    fn require_governor_or_guardian(&self, caller: &str) -> Result<(), VaultError> {
        let acm = self
            .access_control
            .as_ref()
            .ok_or(VaultError::NotInitialized)?;
        if acm.is_governor_or_guardian(caller) {
            Ok(())
        } else {
            Err(VaultError::NotGovernorOrGuardian {
                caller: caller.to_string(),
            })
        }
    }

    fn asset_token(&self) -> Result<Arc<dyn AssetToken>, VaultError> {
        self.asset.clone().ok_or(VaultError::NotInitialized)
    }
}

// ---------------------------------------------------------------------------
// Conversion math
// ---------------------------------------------------------------------------
//
// All four conversions run against post-accrual totals. With the seed
// deposit in place `total_supply == 0` is unreachable; if it is ever hit,
// conversions fall back to 1:1 rather than dividing by zero.

fn shares_floor(assets: u128, supply: u128, total_assets: u128) -> Result<u128, VaultError> {
    if supply == 0 {
        return Ok(assets);
    }
    Ok(math::mul_div_floor(assets, supply, total_assets)?)
}

fn shares_ceil(assets: u128, supply: u128, total_assets: u128) -> Result<u128, VaultError> {
    if supply == 0 {
        return Ok(assets);
    }
    Ok(math::mul_div_ceil(assets, supply, total_assets)?)
}

fn assets_floor(shares: u128, supply: u128, total_assets: u128) -> Result<u128, VaultError> {
    if supply == 0 {
        return Ok(shares);
    }
    Ok(math::mul_div_floor(shares, total_assets, supply)?)
}

fn assets_ceil(shares: u128, supply: u128, total_assets: u128) -> Result<u128, VaultError> {
    if supply == 0 {
        return Ok(shares);
    }
    Ok(math::mul_div_ceil(shares, total_assets, supply)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
