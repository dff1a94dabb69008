//! Fee-taking facade over a registry.
//!
//! The facade receives a registry payout on behalf of the real receiver,
//! keeps `received * commission / 10^27`, and forwards the rest:
//!
//! 1. Decode the execute message, route checks against this facade
//! 2. Quorum verification through the target registry's signers
//! 3. Commission cap
//! 4. Decode `coreData` and run it against the registry
//! 5. Measure what arrived in `token`, keep the fee, forward the remainder
//!
//! Steps 4 and 5 run against snapshots; any failure restores the registry
//! and the ledger.

use std::collections::HashMap;

use bridgebook_quorum::Authorizer;
use bridgebook_registry::{AssetLedger, CallContext, Registry, Route};
use bridgebook_types::{
    Address, BridgeError, ChainId, RegistryCall, RelayerConfig, Result, U256,
    constants::percentage_100,
};
use primitive_types::U512;
use tracing::{info, warn};

use crate::message::{EXECUTE_SELECTOR, ExecuteMessage};

/// Outcome of one successful [`Relayer::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteReceipt {
    pub token: Address,
    pub received: U256,
    pub fee: U256,
    pub forwarded: U256,
    pub receiver: Address,
}

/// A facade instance.
#[derive(Debug, Clone)]
pub struct Relayer {
    route: Route,
    owner: Address,
    /// Commission kept per asset since deployment.
    collected: HashMap<Address, U256>,
}

impl Relayer {
    #[must_use]
    pub fn new(chain_id: ChainId, address: Address, owner: Address) -> Self {
        Self {
            route: Route::new(chain_id, address),
            owner,
            collected: HashMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &RelayerConfig) -> Self {
        Self::new(config.chain_id, config.address, config.owner)
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.route.address
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Total commission kept in `token`, withdrawn or not.
    #[must_use]
    pub fn collected(&self, token: Address) -> U256 {
        self.collected.get(&token).copied().unwrap_or_default()
    }

    /// Forward a signed registry call and take a commission on the payout.
    ///
    /// # Errors
    /// - Routing errors and `MalformedMessage` for the execute message
    /// - Quorum errors from the registry's signer set
    /// - `CommissionTooHigh` above 100%
    /// - `SilentRevert` if `coreData` names no registry entry point
    /// - The registry's own error, unchanged, if the forwarded call fails
    /// - `TransferFailed` if the remainder cannot be forwarded
    pub fn execute<Q, L>(
        &mut self,
        registry: &mut Registry<Q>,
        ledger: &mut L,
        message: &[u8],
        signatures: &[Vec<u8>],
    ) -> Result<ExecuteReceipt>
    where
        Q: Authorizer + Clone,
        L: AssetLedger + Clone,
    {
        let msg = ExecuteMessage::decode(message)?;
        self.route
            .check_parts(EXECUTE_SELECTOR, msg.selector, msg.chain_id, msg.relayer)?;
        registry
            .check_signatures(message, signatures)
            .inspect_err(|err| warn!(code = err.code(), "Relayer execute rejected"))?;

        let p100 = percentage_100();
        if msg.commission > p100 {
            return Err(BridgeError::CommissionTooHigh(msg.commission));
        }

        let call = RegistryCall::decode(&msg.core_data)?;

        let registry_snapshot = registry.clone();
        let ledger_snapshot = ledger.clone();
        match self.forward(registry, ledger, &msg, &call, p100) {
            Ok(receipt) => {
                let total = self.collected.entry(receipt.token).or_default();
                *total = total.saturating_add(receipt.fee);
                info!(
                    entry = %call.entry,
                    token = %receipt.token,
                    received = %receipt.received,
                    fee = %receipt.fee,
                    forwarded = %receipt.forwarded,
                    receiver = %receipt.receiver,
                    "Relayed call executed"
                );
                Ok(receipt)
            }
            Err(err) => {
                *registry = registry_snapshot;
                *ledger = ledger_snapshot;
                warn!(entry = %call.entry, code = err.code(), "Relayed call rolled back");
                Err(err)
            }
        }
    }

    fn forward<Q, L>(
        &self,
        registry: &mut Registry<Q>,
        ledger: &mut L,
        msg: &ExecuteMessage,
        call: &RegistryCall,
        p100: U256,
    ) -> Result<ExecuteReceipt>
    where
        Q: Authorizer,
        L: AssetLedger,
    {
        let before = ledger.balance(msg.token, self.address());
        registry.call(ledger, CallContext::new(self.address()), call)?;
        let received = ledger
            .balance(msg.token, self.address())
            .saturating_sub(before);

        let fee = commission_of(received, msg.commission, p100)?;
        let forwarded = received - fee;
        ledger.transfer(msg.token, self.address(), msg.receiver, forwarded)?;

        Ok(ExecuteReceipt {
            token: msg.token,
            received,
            fee,
            forwarded,
            receiver: msg.receiver,
        })
    }

    /// Pay the facade's whole balance in each of `tokens` to `to`.
    ///
    /// # Errors
    /// `NotOwner`, or `TransferFailed` if any payout fails; then nothing
    /// is paid.
    pub fn withdraw<L: AssetLedger + Clone>(
        &self,
        ledger: &mut L,
        sender: Address,
        tokens: &[Address],
        to: Address,
    ) -> Result<()> {
        if sender != self.owner {
            warn!(%sender, "Relayer withdraw rejected");
            return Err(BridgeError::NotOwner);
        }

        let snapshot = ledger.clone();
        for token in tokens {
            let amount = ledger.balance(*token, self.address());
            if let Err(err) = ledger.transfer(*token, self.address(), to, amount) {
                *ledger = snapshot;
                warn!(%token, %to, "Relayer withdraw failed");
                return Err(err);
            }
            info!(%token, %amount, %to, "Commission withdrawn");
        }
        Ok(())
    }

    pub fn transfer_ownership(&mut self, sender: Address, new_owner: Address) -> Result<()> {
        if sender != self.owner {
            warn!(%sender, "Relayer ownership transfer rejected");
            return Err(BridgeError::NotOwner);
        }
        if new_owner.is_zero() {
            return Err(BridgeError::Configuration(
                "new owner is the zero address".into(),
            ));
        }
        info!(from = %self.owner, to = %new_owner, "Relayer ownership transferred");
        self.owner = new_owner;
        Ok(())
    }
}

/// `received * commission / p100`, rounded down.
fn commission_of(received: U256, commission: U256, p100: U256) -> Result<U256> {
    let fee = received.full_mul(commission) / U512::from(p100);
    U256::try_from(fee).map_err(|_| BridgeError::CommissionTooHigh(commission))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    #[test]
    fn commission_math() {
        let p100 = percentage_100();
        assert_eq!(commission_of(wei(1), p100 / 2, p100).unwrap(), wei(1) / 2);
        assert_eq!(
            commission_of(wei(3), p100 / 10, p100).unwrap(),
            U256::from(3u64) * U256::exp10(17)
        );
        assert_eq!(commission_of(wei(2), p100, p100).unwrap(), wei(2));
        assert!(commission_of(wei(4), U256::zero(), p100).unwrap().is_zero());
    }

    #[test]
    fn commission_rounds_down() {
        let p100 = percentage_100();
        assert_eq!(commission_of(U256::from(3u64), p100 / 2, p100).unwrap(), U256::one());
    }

    #[test]
    fn commission_of_huge_amount_does_not_overflow() {
        let p100 = percentage_100();
        assert_eq!(commission_of(U256::MAX, p100, p100).unwrap(), U256::MAX);
    }

    #[test]
    fn withdraw_requires_owner() {
        use bridgebook_registry::InMemoryLedger;
        let relayer = Relayer::new(ChainId(1), Address::repeat_byte(0xcc), Address::repeat_byte(1));
        let mut ledger = InMemoryLedger::new();
        assert_eq!(
            relayer
                .withdraw(&mut ledger, Address::repeat_byte(2), &[Address::NATIVE], Address::repeat_byte(2))
                .unwrap_err(),
            BridgeError::NotOwner
        );
    }

    #[test]
    fn ownership_transfer() {
        let mut relayer = Relayer::new(ChainId(1), Address::repeat_byte(0xcc), Address::repeat_byte(1));
        assert!(relayer.transfer_ownership(Address::repeat_byte(2), Address::repeat_byte(2)).is_err());
        relayer
            .transfer_ownership(Address::repeat_byte(1), Address::repeat_byte(2))
            .unwrap();
        assert_eq!(relayer.owner(), Address::repeat_byte(2));
        assert!(matches!(
            relayer
                .transfer_ownership(Address::repeat_byte(2), Address::ZERO)
                .unwrap_err(),
            BridgeError::Configuration(_)
        ));
        assert_eq!(relayer.owner(), Address::repeat_byte(2));
    }
}
