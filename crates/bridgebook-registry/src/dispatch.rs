//! Routing checks for signed messages.
//!
//! A message is accepted only by the entry point its selector names, on the
//! chain and at the address it names. Checks run in that order, before any
//! signature is inspected.

use bridgebook_types::{Address, BridgeError, ChainId, Result, SignedMessage};
use tracing::debug;

/// Where an instance lives: the chain id and address messages must name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub chain_id: ChainId,
    pub address: Address,
}

impl Route {
    #[must_use]
    pub fn new(chain_id: ChainId, address: Address) -> Self {
        Self { chain_id, address }
    }

    /// Check already-decoded routing fields.
    ///
    /// # Errors
    /// `WrongSelector`, `WrongChainId` or `WrongRegistryAddress`, in that order.
    pub fn check_parts(
        &self,
        expected_selector: u8,
        selector: u8,
        chain_id: ChainId,
        target: Address,
    ) -> Result<()> {
        if selector != expected_selector {
            return Err(BridgeError::WrongSelector {
                expected: expected_selector,
                actual: selector,
            });
        }
        if chain_id != self.chain_id {
            return Err(BridgeError::WrongChainId {
                expected: self.chain_id,
                actual: chain_id,
            });
        }
        if target != self.address {
            return Err(BridgeError::WrongRegistryAddress {
                expected: self.address,
                actual: target,
            });
        }
        Ok(())
    }

    pub fn check<M: SignedMessage>(&self, message: &M) -> Result<()> {
        self.check_parts(
            M::SELECTOR.tag(),
            message.selector().tag(),
            message.chain_id(),
            message.target(),
        )
    }

    /// Decode `bytes` with `M`'s tuple shape and check its routing fields.
    pub fn decode<M: SignedMessage>(&self, bytes: &[u8]) -> Result<M> {
        let message = M::decode(bytes)?;
        self.check(&message)?;
        debug!(
            selector = %M::SELECTOR,
            chain = %self.chain_id,
            target = %self.address,
            "Message routed"
        );
        Ok(message)
    }
}
