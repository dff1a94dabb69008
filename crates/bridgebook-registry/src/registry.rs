//! The order/match registry state machine.
//!
//! One [`Registry`] plays either role. Sellers open orders here with
//! [`Registry::create_order`]; counter-parties open matches against a
//! remote order with [`Registry::create_match`]. Every signed entry point
//! follows the same pipeline:
//!
//! 1. Decode the message with the entry point's tuple shape
//! 2. Route checks (selector, chain id, registry address)
//! 3. Quorum verification over the raw message bytes
//! 4. State guard
//! 5. Transfer
//! 6. Mutate and emit the event
//!
//! Nothing is written before the transfer succeeds, so every call either
//! commits fully or leaves the registry untouched.

use bridgebook_quorum::{Authorizer, SignatureRecoverer, SignerQuorum};
use bridgebook_types::{
    Address, BridgeError, CancelMatchMessage, ChainId, CreateMatchMessage, CreateOrderRequest,
    EventRecord, ExecuteMatchMessage, ExecuteOrderMessage, Match, MatchId, Order, OrderId,
    OrderStatus, RegistryCall, RegistryConfig, RegistryEvent, Result, Selector, State, U256,
    constants::FIRST_RECORD_ID,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::custody::EscrowAccounting;
use crate::dispatch::Route;
use crate::ledger::AssetLedger;

/// Who is calling and how much native value they attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub value: U256,
}

impl CallContext {
    /// A call with no attached value.
    #[must_use]
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            value: U256::zero(),
        }
    }

    #[must_use]
    pub fn with_value(sender: Address, value: U256) -> Self {
        Self { sender, value }
    }
}

/// An order/match registry instance.
#[derive(Debug, Clone)]
pub struct Registry<Q = SignerQuorum> {
    pub(crate) route: Route,
    pub(crate) owner: Address,
    pub(crate) quorum: Q,
    /// Arena indexed by `order_id - 1`.
    pub(crate) orders: Vec<Order>,
    /// Arena indexed by `match_id - 1`.
    pub(crate) matches: Vec<Match>,
    pub(crate) user_orders: HashMap<Address, Vec<OrderId>>,
    pub(crate) user_matches: HashMap<Address, Vec<MatchId>>,
    next_order_id: OrderId,
    next_match_id: MatchId,
    escrow: EscrowAccounting,
    events: Vec<EventRecord>,
    next_sequence: u64,
}

impl Registry {
    /// Build a registry with a secp256k1 signer quorum from its config.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let quorum = SignerQuorum::from_config(config)?;
        info!(
            chain = %config.chain_id,
            address = %config.address,
            signers = config.signers.len(),
            threshold = config.effective_threshold(),
            "Registry initialized"
        );
        Ok(Self::with_authorizer(
            config.chain_id,
            config.address,
            config.owner,
            quorum,
        ))
    }
}

impl<Q: Authorizer> Registry<Q> {
    /// Build a registry around any [`Authorizer`].
    #[must_use]
    pub fn with_authorizer(chain_id: ChainId, address: Address, owner: Address, quorum: Q) -> Self {
        Self {
            route: Route::new(chain_id, address),
            owner,
            quorum,
            orders: Vec::new(),
            matches: Vec::new(),
            user_orders: HashMap::new(),
            user_matches: HashMap::new(),
            next_order_id: OrderId(FIRST_RECORD_ID),
            next_match_id: MatchId(FIRST_RECORD_ID),
            escrow: EscrowAccounting::new(),
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.route.chain_id
    }

    /// The address that holds this registry's escrow.
    #[must_use]
    pub fn address(&self) -> Address {
        self.route.address
    }

    // ---------------------------------------------------------------
    // Unsigned entry points
    // ---------------------------------------------------------------

    /// Escrow `amount_to_sell` and open an `AWAITING_MATCH` order.
    ///
    /// # Errors
    /// - `WrongAmount` if the attached value breaks the native/token rule
    /// - `TransferFailed` if escrow cannot be collected
    pub fn create_order<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        ctx: CallContext,
        request: &CreateOrderRequest,
    ) -> Result<OrderId> {
        check_attached_value(request.token_to_sell, request.amount_to_sell, ctx.value)?;
        ledger.transfer(
            request.token_to_sell,
            ctx.sender,
            self.address(),
            request.amount_to_sell,
        )?;

        let order_id = self.next_order_id;
        self.next_order_id = order_id.next();
        let order = Order::from_request(order_id, ctx.sender, request);

        self.escrow
            .record_lock(order.token_to_sell, order.amount_to_sell);
        self.orders.push(order.clone());
        self.user_orders
            .entry(ctx.sender)
            .or_default()
            .push(order_id);

        info!(
            %order_id,
            creator = %ctx.sender,
            token = %order.token_to_sell,
            amount = %order.amount_to_sell,
            destination = %order.destination_chain,
            "Order created"
        );
        self.emit(RegistryEvent::OrderCreated(order));
        Ok(order_id)
    }

    /// Refund an `AWAITING_MATCH` order to its creator.
    ///
    /// # Errors
    /// - `NotCreator` if the caller did not create the order
    /// - `WrongOrderStatus` if the order is not awaiting a match
    /// - `TransferFailed` if the refund fails
    pub fn cancel_order<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        ctx: CallContext,
        order_id: OrderId,
    ) -> Result<()> {
        let (creator, state) = self
            .order(order_id)
            .map_or((Address::ZERO, State::None), |o| (o.creator, o.state()));
        if creator != ctx.sender {
            return Err(BridgeError::NotCreator);
        }
        if state != State::AwaitingMatch {
            return Err(BridgeError::WrongOrderStatus { order_id, state });
        }

        let index = self.order_index(order_id)?;
        let (token, amount) = {
            let order = &self.orders[index];
            (order.token_to_sell, order.amount_to_sell)
        };
        ledger.transfer(token, self.address(), creator, amount)?;

        self.escrow.record_release(token, amount);
        let order = &mut self.orders[index];
        order.status.state = State::Canceled;
        let status = order.status;

        info!(%order_id, %creator, %amount, "Order canceled");
        self.emit(RegistryEvent::OrderUpdated { order_id, status });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Signed entry points
    // ---------------------------------------------------------------

    /// Escrow the counter-party asset against a remote order.
    ///
    /// # Errors
    /// Routing and quorum errors, `WrongAmount`, `TransferFailed`.
    pub fn create_match<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        ctx: CallContext,
        message: &[u8],
        signatures: &[Vec<u8>],
    ) -> Result<MatchId> {
        let msg: CreateMatchMessage = self.route.decode(message)?;
        self.authorize(message, signatures, Selector::CreateMatch)?;

        check_attached_value(msg.token_to_sell, msg.amount_to_sell, ctx.value)?;
        ledger.transfer(msg.token_to_sell, ctx.sender, self.address(), msg.amount_to_sell)?;

        let match_id = self.next_match_id;
        self.next_match_id = match_id.next();
        let record = Match {
            match_id,
            creator: ctx.sender,
            token_to_sell: msg.token_to_sell,
            amount_to_sell: msg.amount_to_sell,
            origin_chain_id: msg.origin_chain,
            origin_order_id: msg.order_id,
            state: State::AwaitingFinalization,
        };

        self.escrow
            .record_lock(record.token_to_sell, record.amount_to_sell);
        self.matches.push(record.clone());
        self.user_matches
            .entry(ctx.sender)
            .or_default()
            .push(match_id);

        info!(
            %match_id,
            creator = %ctx.sender,
            token = %record.token_to_sell,
            amount = %record.amount_to_sell,
            origin_chain = %record.origin_chain_id,
            origin_order = %record.origin_order_id,
            "Match created"
        );
        self.emit(RegistryEvent::MatchCreated(record));
        Ok(match_id)
    }

    /// Refund an `AWAITING_FINALIZATION` match to its creator.
    ///
    /// # Errors
    /// Routing and quorum errors, `NotCreator`, `WrongMatchState`,
    /// `TransferFailed`.
    pub fn cancel_match<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        ctx: CallContext,
        message: &[u8],
        signatures: &[Vec<u8>],
    ) -> Result<()> {
        let msg: CancelMatchMessage = self.route.decode(message)?;
        self.authorize(message, signatures, Selector::CancelMatch)?;

        let match_id = msg.match_id;
        let (creator, state) = self
            .match_record(match_id)
            .map_or((Address::ZERO, State::None), |m| (m.creator, m.state));
        if creator != ctx.sender {
            return Err(BridgeError::NotCreator);
        }
        if state != State::AwaitingFinalization {
            return Err(BridgeError::WrongMatchState { match_id, state });
        }

        let index = self.match_index(match_id)?;
        let (token, amount) = {
            let record = &self.matches[index];
            (record.token_to_sell, record.amount_to_sell)
        };
        ledger.transfer(token, self.address(), creator, amount)?;

        self.escrow.record_release(token, amount);
        self.matches[index].state = State::Canceled;

        info!(%match_id, %creator, %amount, "Match canceled");
        self.emit(RegistryEvent::MatchUpdated {
            match_id,
            state: State::Canceled,
        });
        Ok(())
    }

    /// Pay a match's escrow to the receiver named in the message.
    ///
    /// # Errors
    /// Routing and quorum errors, `WrongMatchStatus`, `TransferFailed`.
    pub fn execute_match<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        message: &[u8],
        signatures: &[Vec<u8>],
    ) -> Result<()> {
        let msg: ExecuteMatchMessage = self.route.decode(message)?;
        self.authorize(message, signatures, Selector::ExecuteMatch)?;

        let match_id = msg.match_id;
        let state = self.match_state(match_id);
        if state != State::AwaitingFinalization {
            return Err(BridgeError::WrongMatchStatus { match_id, state });
        }

        let index = self.match_index(match_id)?;
        let (token, amount) = {
            let record = &self.matches[index];
            (record.token_to_sell, record.amount_to_sell)
        };
        ledger.transfer(token, self.address(), msg.receiver, amount)?;

        self.escrow.record_release(token, amount);
        self.matches[index].state = State::Executed;

        info!(%match_id, receiver = %msg.receiver, %token, %amount, "Match executed");
        self.emit(RegistryEvent::MatchUpdated {
            match_id,
            state: State::Executed,
        });
        Ok(())
    }

    /// Pay an order's escrow to the receiver and bind the remote match.
    ///
    /// # Errors
    /// Routing and quorum errors, `WrongOrderStatus`, `TransferFailed`.
    pub fn execute_order<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        message: &[u8],
        signatures: &[Vec<u8>],
    ) -> Result<()> {
        let msg: ExecuteOrderMessage = self.route.decode(message)?;
        self.authorize(message, signatures, Selector::ExecuteOrder)?;

        let order_id = msg.order_id;
        let state = self.order_state(order_id);
        if state != State::AwaitingMatch {
            return Err(BridgeError::WrongOrderStatus { order_id, state });
        }

        let index = self.order_index(order_id)?;
        let (token, amount) = {
            let order = &self.orders[index];
            (order.token_to_sell, order.amount_to_sell)
        };
        ledger.transfer(token, self.address(), msg.receiver, amount)?;

        self.escrow.record_release(token, amount);
        let status = OrderStatus {
            state: State::Executed,
            match_id: msg.match_id,
            match_registry: msg.match_registry,
        };
        self.orders[index].status = status;

        info!(
            %order_id,
            receiver = %msg.receiver,
            %token,
            %amount,
            match_id = %msg.match_id,
            match_registry = %msg.match_registry,
            "Order executed"
        );
        self.emit(RegistryEvent::OrderUpdated { order_id, status });
        Ok(())
    }

    /// Run a decoded registry call.
    pub fn call<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        ctx: CallContext,
        call: &RegistryCall,
    ) -> Result<()> {
        let message = &call.payload.message;
        let signatures = &call.payload.signatures;
        match call.entry {
            Selector::CreateMatch => self
                .create_match(ledger, ctx, message, signatures)
                .map(|_| ()),
            Selector::CancelMatch => self.cancel_match(ledger, ctx, message, signatures),
            Selector::ExecuteMatch => self.execute_match(ledger, message, signatures),
            Selector::ExecuteOrder => self.execute_order(ledger, message, signatures),
        }
    }

    /// Decode and run encoded call data.
    ///
    /// # Errors
    /// `SilentRevert` if the data names no entry point, otherwise whatever
    /// the entry point returns.
    pub fn call_data<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        ctx: CallContext,
        data: &[u8],
    ) -> Result<()> {
        let call = RegistryCall::decode(data)?;
        self.call(ledger, ctx, &call)
    }

    /// Verify `signatures` against this registry's quorum.
    pub fn check_signatures(&self, message: &[u8], signatures: &[Vec<u8>]) -> Result<()> {
        self.quorum.verify(message, signatures)
    }

    fn authorize(&self, message: &[u8], signatures: &[Vec<u8>], entry: Selector) -> Result<()> {
        self.check_signatures(message, signatures).inspect_err(|err| {
            warn!(
                registry = %self.address(),
                %entry,
                code = err.code(),
                "Signed call rejected"
            );
        })
    }

    // ---------------------------------------------------------------
    // Custody
    // ---------------------------------------------------------------

    /// Check this registry's ledger custody against its escrow books for
    /// every asset it has ever held.
    ///
    /// # Errors
    /// `CustodyInvariantViolation` on the first asset out of balance.
    pub fn verify_custody<L: AssetLedger>(&self, ledger: &L) -> Result<()> {
        for asset in self.escrow.tracked_assets() {
            self.escrow
                .verify(asset, ledger.balance(asset, self.address()))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn escrow(&self) -> &EscrowAccounting {
        &self.escrow
    }

    // ---------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------

    fn emit(&mut self, event: RegistryEvent) {
        self.events.push(EventRecord {
            sequence: self.next_sequence,
            emitted_at: Utc::now(),
            event,
        });
        self.next_sequence += 1;
    }

    /// Events not yet taken, oldest first.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Drain the event log. Sequence numbers keep counting.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------
    // Ownership
    // ---------------------------------------------------------------

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn transfer_ownership(&mut self, sender: Address, new_owner: Address) -> Result<()> {
        self.ensure_owner(sender)?;
        if new_owner.is_zero() {
            return Err(BridgeError::Configuration(
                "new owner is the zero address".into(),
            ));
        }
        info!(from = %self.owner, to = %new_owner, "Ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    pub(crate) fn ensure_owner(&self, sender: Address) -> Result<()> {
        if sender != self.owner {
            warn!(%sender, owner = %self.owner, "Owner-only call rejected");
            return Err(BridgeError::NotOwner);
        }
        Ok(())
    }

    pub(crate) fn order_index(&self, order_id: OrderId) -> Result<usize> {
        record_index(order_id.0, self.orders.len()).ok_or(BridgeError::WrongOrderStatus {
            order_id,
            state: State::None,
        })
    }

    pub(crate) fn match_index(&self, match_id: MatchId) -> Result<usize> {
        record_index(match_id.0, self.matches.len()).ok_or(BridgeError::WrongMatchStatus {
            match_id,
            state: State::None,
        })
    }
}

/// Signer administration, available when the registry holds a real quorum.
impl<R: SignatureRecoverer> Registry<SignerQuorum<R>> {
    pub fn add_signers(&mut self, sender: Address, signers: &[Address]) -> Result<()> {
        self.ensure_owner(sender)?;
        self.quorum.add_signers(signers)
    }

    pub fn remove_signers(&mut self, sender: Address, signers: &[Address]) -> Result<()> {
        self.ensure_owner(sender)?;
        self.quorum.remove_signers(signers);
        Ok(())
    }

    pub fn set_threshold(&mut self, sender: Address, threshold: usize) -> Result<()> {
        self.ensure_owner(sender)?;
        self.quorum.set_threshold(threshold)
    }

    /// Signers in insertion order.
    #[must_use]
    pub fn signers(&self) -> &[Address] {
        self.quorum.signer_set().signers()
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.quorum.signer_set().threshold()
    }
}

fn record_index(id: u64, len: usize) -> Option<usize> {
    let index = usize::try_from(id.checked_sub(FIRST_RECORD_ID)?).ok()?;
    (index < len).then_some(index)
}

/// Native escrow must arrive as attached value; token escrow must not.
fn check_attached_value(token: Address, amount: U256, attached: U256) -> Result<()> {
    let expected = if token.is_native() { amount } else { U256::zero() };
    if attached != expected {
        return Err(BridgeError::WrongAmount { expected, attached });
    }
    Ok(())
}
