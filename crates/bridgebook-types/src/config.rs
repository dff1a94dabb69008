//! Configuration types for registry and facade instances.
//!
//! Both roles (order registry, match registry) use the same
//! [`RegistryConfig`]; which role an instance plays depends only on which
//! entry points callers use against it.

use serde::{Deserialize, Serialize};

use crate::{Address, BridgeError, ChainId, Result};

/// Configuration for a single registry instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Chain this instance is deployed on. Signed messages must name it.
    pub chain_id: ChainId,
    /// This instance's own address. Signed messages must name it.
    pub address: Address,
    /// Privileged account allowed to manage signers.
    pub owner: Address,
    /// Initial trusted signers, in insertion order.
    pub signers: Vec<Address>,
    /// Signature threshold. Defaults to the number of signers.
    #[serde(default)]
    pub threshold: Option<usize>,
}

impl RegistryConfig {
    /// Parse a registry config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The threshold this config resolves to.
    #[must_use]
    pub fn effective_threshold(&self) -> usize {
        self.threshold.unwrap_or(self.signers.len())
    }

    /// Reject configurations no registry could start from.
    pub fn validate(&self) -> Result<()> {
        if self.address.is_zero() {
            return Err(BridgeError::Configuration(
                "registry address must not be zero".into(),
            ));
        }
        if self.signers.is_empty() {
            return Err(BridgeError::Configuration(
                "at least one signer is required".into(),
            ));
        }
        let threshold = self.effective_threshold();
        if threshold == 0 || threshold > self.signers.len() {
            return Err(BridgeError::Configuration(format!(
                "threshold {threshold} out of range for {} signers",
                self.signers.len()
            )));
        }
        Ok(())
    }
}

/// Configuration for a fee-taking facade instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerConfig {
    pub chain_id: ChainId,
    /// The facade's own address; it receives funds before forwarding.
    pub address: Address,
    /// Account allowed to withdraw accumulated commissions.
    pub owner: Address,
}

impl RelayerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.address.is_zero() {
            return Err(BridgeError::Configuration(
                "relayer address must not be zero".into(),
            ));
        }
        Ok(config)
    }
}
