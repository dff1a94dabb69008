//! Trusted signer set with a signature threshold.
//!
//! Mutations are atomic: either every address in the list is applied or
//! the set is unchanged.

use std::collections::HashSet;

use bridgebook_types::{Address, BridgeError, RegistryConfig, Result};
use tracing::info;

/// Membership map, insertion-ordered list and threshold.
#[derive(Debug, Clone)]
pub struct SignerSet {
    members: HashSet<Address>,
    ordered: Vec<Address>,
    threshold: usize,
}

impl SignerSet {
    /// Build a set from initial signers and a threshold.
    ///
    /// # Errors
    /// Same as [`SignerSet::add`] and [`SignerSet::set_threshold`].
    pub fn new(signers: &[Address], threshold: usize) -> Result<Self> {
        let mut set = Self {
            members: HashSet::new(),
            ordered: Vec::new(),
            threshold: 0,
        };
        set.add(signers)?;
        set.set_threshold(threshold)?;
        Ok(set)
    }

    /// Build the set a registry config describes.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Self::new(&config.signers, config.effective_threshold())
    }

    /// Add signers.
    ///
    /// # Errors
    /// - `ZeroSigner` if the list contains the null address
    /// - `DuplicateSigner` if an address is already a member or repeats in the list
    pub fn add(&mut self, signers: &[Address]) -> Result<()> {
        let mut pending = HashSet::with_capacity(signers.len());
        for signer in signers {
            if signer.is_zero() {
                return Err(BridgeError::ZeroSigner);
            }
            if self.members.contains(signer) || !pending.insert(*signer) {
                return Err(BridgeError::DuplicateSigner(*signer));
            }
        }

        for signer in signers {
            self.members.insert(*signer);
            self.ordered.push(*signer);
        }
        info!(added = signers.len(), total = self.ordered.len(), "Signers added");
        Ok(())
    }

    /// Remove signers. Addresses that are not members are skipped.
    ///
    /// The threshold is left as is, even if it now exceeds the signer count.
    /// Returns how many members were removed.
    pub fn remove(&mut self, signers: &[Address]) -> usize {
        let mut removed = 0;
        for signer in signers {
            if self.members.remove(signer) {
                self.ordered.retain(|s| s != signer);
                removed += 1;
            }
        }
        info!(
            removed,
            total = self.ordered.len(),
            threshold = self.threshold,
            "Signers removed"
        );
        removed
    }

    /// Set the number of distinct signatures a quorum needs.
    ///
    /// # Errors
    /// `InvalidThreshold` if `threshold == 0` or it exceeds the signer count.
    pub fn set_threshold(&mut self, threshold: usize) -> Result<()> {
        if threshold == 0 || threshold > self.ordered.len() {
            return Err(BridgeError::InvalidThreshold {
                threshold,
                signers: self.ordered.len(),
            });
        }
        self.threshold = threshold;
        info!(threshold, "Threshold set");
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, signer: &Address) -> bool {
        self.members.contains(signer)
    }

    /// Signers in insertion order.
    #[must_use]
    pub fn signers(&self) -> &[Address] {
        &self.ordered
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
