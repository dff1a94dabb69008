//! Asset custody the registry moves funds through.
//!
//! Native-asset and token transfers share one capability; the registry
//! never distinguishes the two beyond the attached-value rule. Any refusal
//! surfaces as [`BridgeError::TransferFailed`]. A failed transfer leaves
//! every balance unchanged.

use std::collections::{HashMap, HashSet};

use bridgebook_types::{Address, BridgeError, Result, U256};

/// Transfer capability the registry and facade call into.
pub trait AssetLedger {
    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    /// `TransferFailed` if the transfer is refused.
    fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: U256) -> Result<()>;

    /// Balance of `holder` in `asset`.
    fn balance(&self, asset: Address, holder: Address) -> U256;
}

/// In-memory ledger with per-(holder, asset) balances.
///
/// Accounts can be marked as refusing the native asset, and tokens can be
/// marked as refusing every transfer, to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(Address, Address), U256>,
    native_rejecting: HashSet<Address>,
    failing_tokens: HashSet<Address>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` of `asset` to `holder`.
    pub fn deposit(&mut self, holder: Address, asset: Address, amount: U256) {
        let entry = self.balances.entry((holder, asset)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// `holder` refuses incoming native-asset transfers from now on.
    pub fn reject_native(&mut self, holder: Address) {
        self.native_rejecting.insert(holder);
    }

    /// Every transfer of `asset` fails from now on.
    pub fn fail_token(&mut self, asset: Address) {
        self.failing_tokens.insert(asset);
    }

    /// Sum of every holder's balance in `asset`.
    #[must_use]
    pub fn total_supply(&self, asset: Address) -> U256 {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .fold(U256::zero(), |acc, (_, amount)| acc.saturating_add(*amount))
    }
}

impl AssetLedger for InMemoryLedger {
    fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        if self.failing_tokens.contains(&asset) {
            return Err(BridgeError::transfer_failed(format!(
                "token {asset} refused the transfer"
            )));
        }
        if asset.is_native() && self.native_rejecting.contains(&to) {
            return Err(BridgeError::transfer_failed(format!(
                "{to} rejects the native asset"
            )));
        }

        let available = self.balance(asset, from);
        if available < amount {
            return Err(BridgeError::transfer_failed(format!(
                "{from} holds {available} of {asset}, needs {amount}"
            )));
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }

        let received = self
            .balance(asset, to)
            .checked_add(amount)
            .ok_or_else(|| BridgeError::transfer_failed("balance overflow"))?;
        self.balances.insert((from, asset), available - amount);
        self.balances.insert((to, asset), received);
        Ok(())
    }

    fn balance(&self, asset: Address, holder: Address) -> U256 {
        self.balances
            .get(&(holder, asset))
            .copied()
            .unwrap_or_default()
    }
}
