//! Escrow custody invariant.
//!
//! ```text
//! ∀ asset: ledger.balance(asset, registry) == Σ(locked) - Σ(released)
//! ```
//!
//! Every escrowed amount is locked exactly once at creation and released
//! at most once by a cancel or execute. If the registry's custody ever
//! disagrees with that total, an escrow was released twice or never
//! recorded.

use std::collections::{BTreeSet, HashMap};

use bridgebook_types::{Address, BridgeError, Result, U256};

/// Per-asset totals of escrow locked and released by one registry.
#[derive(Debug, Clone, Default)]
pub struct EscrowAccounting {
    locked: HashMap<Address, U256>,
    released: HashMap<Address, U256>,
}

impl EscrowAccounting {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lock(&mut self, asset: Address, amount: U256) {
        let entry = self.locked.entry(asset).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn record_release(&mut self, asset: Address, amount: U256) {
        let entry = self.released.entry(asset).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Escrow still held for `asset`: locked - released.
    #[must_use]
    pub fn outstanding(&self, asset: Address) -> U256 {
        self.total_locked(asset)
            .saturating_sub(self.total_released(asset))
    }

    /// Check the registry's actual custody of `asset` against the books.
    ///
    /// # Errors
    /// [`BridgeError::CustodyInvariantViolation`] if `custody != outstanding`
    /// or more was released than was ever locked.
    pub fn verify(&self, asset: Address, custody: U256) -> Result<()> {
        let locked = self.total_locked(asset);
        let released = self.total_released(asset);
        if released > locked || custody != locked - released {
            return Err(BridgeError::CustodyInvariantViolation {
                reason: format!(
                    "asset {asset}: custody {custody} != outstanding \
                     (locked={locked}, released={released})"
                ),
            });
        }
        Ok(())
    }

    /// Every asset that was ever locked or released, in address order.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<Address> {
        let assets: BTreeSet<Address> = self
            .locked
            .keys()
            .chain(self.released.keys())
            .copied()
            .collect();
        assets.into_iter().collect()
    }

    #[must_use]
    pub fn total_locked(&self, asset: Address) -> U256 {
        self.locked.get(&asset).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total_released(&self, asset: Address) -> U256 {
        self.released.get(&asset).copied().unwrap_or_default()
    }
}
