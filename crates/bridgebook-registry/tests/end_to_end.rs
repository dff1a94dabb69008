//! End-to-end tests across two registries sharing one signer quorum.
//!
//! An order registry on chain 1 and a match registry on chain 2 are driven
//! with real secp256k1 signatures through the full two-sided settlement,
//! plus the replay, quorum, routing and admin failure paths.

use bridgebook_quorum::{TestSigner, sign_all};
use bridgebook_registry::{AssetLedger, CallContext, InMemoryLedger, Registry};
use bridgebook_types::{
    Address, BridgeError, CancelMatchMessage, ChainId, CreateMatchMessage, CreateOrderRequest,
    ExecuteMatchMessage, ExecuteOrderMessage, MatchId, OrderId, RegistryConfig, RegistryEvent,
    SignedMessage, State, U256,
};

const ORDER_CHAIN: ChainId = ChainId(1);
const MATCH_CHAIN: ChainId = ChainId(2);

fn order_registry_addr() -> Address {
    Address::repeat_byte(0xa1)
}

fn match_registry_addr() -> Address {
    Address::repeat_byte(0xb2)
}

fn owner() -> Address {
    Address::repeat_byte(0x0f)
}

fn seller() -> Address {
    Address::repeat_byte(0x11)
}

fn buyer() -> Address {
    Address::repeat_byte(0x22)
}

fn token_a() -> Address {
    Address::repeat_byte(0x0a)
}

fn token_b() -> Address {
    Address::repeat_byte(0x0b)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Both chains, their ledgers, and the shared signer keys.
struct Bridge {
    signers: Vec<TestSigner>,
    orders: Registry,
    matches: Registry,
    chain_a: InMemoryLedger,
    chain_b: InMemoryLedger,
}

impl Bridge {
    fn new(signer_count: usize, threshold: Option<usize>) -> Self {
        init_tracing();
        let signers: Vec<TestSigner> = (0..signer_count).map(|_| TestSigner::random()).collect();
        let addresses: Vec<Address> = signers.iter().map(TestSigner::address).collect();

        let config = |chain_id, address| RegistryConfig {
            chain_id,
            address,
            owner: owner(),
            signers: addresses.clone(),
            threshold,
        };
        let orders = Registry::from_config(&config(ORDER_CHAIN, order_registry_addr())).unwrap();
        let matches = Registry::from_config(&config(MATCH_CHAIN, match_registry_addr())).unwrap();

        let mut chain_a = InMemoryLedger::new();
        chain_a.deposit(seller(), token_a(), U256::from(10u64));
        chain_a.deposit(seller(), Address::NATIVE, U256::from(10u64));
        let mut chain_b = InMemoryLedger::new();
        chain_b.deposit(buyer(), token_b(), U256::from(10u64));

        Self {
            signers,
            orders,
            matches,
            chain_a,
            chain_b,
        }
    }

    fn sign(&self, message: &[u8]) -> Vec<Vec<u8>> {
        sign_all(&self.signers, message)
    }

    /// Seller escrows 1 A on chain 1 wanting 2 B on chain 2.
    fn open_order(&mut self) -> OrderId {
        let request = CreateOrderRequest {
            use_relayer: false,
            token_to_sell: token_a(),
            amount_to_sell: U256::from(1u64),
            token_to_buy: token_b(),
            amount_to_buy: U256::from(2u64),
            destination_chain: MATCH_CHAIN,
        };
        self.orders
            .create_order(&mut self.chain_a, CallContext::new(seller()), &request)
            .unwrap()
    }

    fn create_match_message(&self, order_id: OrderId) -> Vec<u8> {
        CreateMatchMessage::new(
            MATCH_CHAIN,
            match_registry_addr(),
            order_id,
            token_b(),
            U256::from(2u64),
            ORDER_CHAIN,
        )
        .encode()
    }

    /// Buyer escrows 2 B on chain 2 against `order_id`.
    fn open_match(&mut self, order_id: OrderId) -> MatchId {
        let message = self.create_match_message(order_id);
        let signatures = self.sign(&message);
        self.matches
            .create_match(
                &mut self.chain_b,
                CallContext::new(buyer()),
                &message,
                &signatures,
            )
            .unwrap()
    }

    fn execute_order_message(&self, order_id: OrderId, match_id: MatchId) -> Vec<u8> {
        ExecuteOrderMessage::new(
            ORDER_CHAIN,
            order_registry_addr(),
            order_id,
            buyer(),
            match_registry_addr(),
            match_id,
        )
        .encode()
    }

    fn execute_match_message(&self, match_id: MatchId) -> Vec<u8> {
        ExecuteMatchMessage::new(MATCH_CHAIN, match_registry_addr(), match_id, seller()).encode()
    }
}

#[test]
fn two_sided_settlement() {
    let mut bridge = Bridge::new(3, Some(2));

    let order_id = bridge.open_order();
    let match_id = bridge.open_match(order_id);
    assert_eq!(bridge.chain_a.balance(token_a(), order_registry_addr()), U256::from(1u64));
    assert_eq!(bridge.chain_b.balance(token_b(), match_registry_addr()), U256::from(2u64));

    let message = bridge.execute_order_message(order_id, match_id);
    let signatures = bridge.sign(&message);
    bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap();

    let message = bridge.execute_match_message(match_id);
    let signatures = bridge.sign(&message);
    bridge
        .matches
        .execute_match(&mut bridge.chain_b, &message, &signatures)
        .unwrap();

    // Seller: -1 A, +2 B. Buyer: +1 A, -2 B.
    assert_eq!(bridge.chain_a.balance(token_a(), seller()), U256::from(9u64));
    assert_eq!(bridge.chain_b.balance(token_b(), seller()), U256::from(2u64));
    assert_eq!(bridge.chain_a.balance(token_a(), buyer()), U256::from(1u64));
    assert_eq!(bridge.chain_b.balance(token_b(), buyer()), U256::from(8u64));

    let order = bridge.orders.order(order_id).unwrap();
    assert_eq!(order.status.state, State::Executed);
    assert_eq!(order.status.match_id, match_id);
    assert_eq!(order.status.match_registry, match_registry_addr());
    assert_eq!(bridge.matches.match_state(match_id), State::Executed);

    // Value conserved on both chains and nothing left in escrow.
    assert_eq!(bridge.chain_a.total_supply(token_a()), U256::from(10u64));
    assert_eq!(bridge.chain_b.total_supply(token_b()), U256::from(10u64));
    assert!(bridge.chain_a.balance(token_a(), order_registry_addr()).is_zero());
    bridge.orders.verify_custody(&bridge.chain_a).unwrap();
    bridge.matches.verify_custody(&bridge.chain_b).unwrap();
}

#[test]
fn events_follow_the_settlement() {
    let mut bridge = Bridge::new(2, None);
    let order_id = bridge.open_order();
    let match_id = bridge.open_match(order_id);

    let message = bridge.execute_match_message(match_id);
    let signatures = bridge.sign(&message);
    bridge
        .matches
        .execute_match(&mut bridge.chain_b, &message, &signatures)
        .unwrap();

    let order_events = bridge.orders.take_events();
    assert_eq!(order_events.len(), 1);
    assert!(matches!(&order_events[0].event, RegistryEvent::OrderCreated(o) if o.order_id == order_id));

    let kinds: Vec<&str> = bridge
        .matches
        .take_events()
        .iter()
        .map(|r| r.event.kind())
        .collect();
    assert_eq!(kinds, vec!["MATCH_CREATED", "MATCH_UPDATED"]);
}

#[test]
fn execution_happens_at_most_once() {
    let mut bridge = Bridge::new(2, None);
    let order_id = bridge.open_order();
    let match_id = bridge.open_match(order_id);

    let message = bridge.execute_order_message(order_id, match_id);
    let signatures = bridge.sign(&message);
    bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap();
    let err = bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::WrongOrderStatus {
            order_id,
            state: State::Executed,
        }
    );
    assert_eq!(bridge.chain_a.balance(token_a(), buyer()), U256::from(1u64));

    let message = bridge.execute_match_message(match_id);
    let signatures = bridge.sign(&message);
    bridge
        .matches
        .execute_match(&mut bridge.chain_b, &message, &signatures)
        .unwrap();
    let err = bridge
        .matches
        .execute_match(&mut bridge.chain_b, &message, &signatures)
        .unwrap_err();
    assert!(matches!(err, BridgeError::WrongMatchStatus { .. }));

    // A canceled-after-executed match is also refused.
    let cancel = CancelMatchMessage::new(MATCH_CHAIN, match_registry_addr(), match_id).encode();
    let signatures = bridge.sign(&cancel);
    let err = bridge
        .matches
        .cancel_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &cancel,
            &signatures,
        )
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::WrongMatchState {
            match_id,
            state: State::Executed,
        }
    );
}

#[test]
fn cancel_then_recancel_order() {
    let mut bridge = Bridge::new(2, None);
    let order_id = bridge.open_order();

    bridge
        .orders
        .cancel_order(&mut bridge.chain_a, CallContext::new(seller()), order_id)
        .unwrap();
    assert_eq!(bridge.chain_a.balance(token_a(), seller()), U256::from(10u64));
    assert_eq!(bridge.orders.order_state(order_id), State::Canceled);

    let err = bridge
        .orders
        .cancel_order(&mut bridge.chain_a, CallContext::new(seller()), order_id)
        .unwrap_err();
    assert!(matches!(err, BridgeError::WrongOrderStatus { .. }));

    // A canceled order can no longer be executed.
    let message = bridge.execute_order_message(order_id, MatchId(1));
    let signatures = bridge.sign(&message);
    let err = bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::WrongOrderStatus {
            order_id,
            state: State::Canceled,
        }
    );
}

#[test]
fn signed_cancel_match_refunds_creator() {
    let mut bridge = Bridge::new(2, None);
    let match_id = bridge.open_match(OrderId(1));

    let cancel = CancelMatchMessage::new(MATCH_CHAIN, match_registry_addr(), match_id).encode();
    let signatures = bridge.sign(&cancel);
    bridge
        .matches
        .cancel_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &cancel,
            &signatures,
        )
        .unwrap();
    assert_eq!(bridge.chain_b.balance(token_b(), buyer()), U256::from(10u64));
    assert_eq!(bridge.matches.match_state(match_id), State::Canceled);
}

#[test]
fn quorum_rules_on_signed_calls() {
    let mut bridge = Bridge::new(3, Some(2));
    let message = bridge.create_match_message(OrderId(1));
    let all = bridge.sign(&message);

    // One signature is below the threshold.
    let err = bridge
        .matches
        .create_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &all[..1],
        )
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::ThresholdNotMet {
            valid: 1,
            threshold: 2
        }
    );

    // The same signer twice.
    let doubled = vec![all[0].clone(), all[0].clone()];
    let err = bridge
        .matches
        .create_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &doubled,
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::DuplicateSigner(bridge.signers[0].address()));

    // An outsider.
    let outsider = TestSigner::random().sign(&message);
    let mixed = vec![all[0].clone(), outsider];
    let err = bridge
        .matches
        .create_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &mixed,
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::InvalidSigner { index: 1 });

    // None of the failures moved funds or created records.
    assert_eq!(bridge.chain_b.balance(token_b(), buyer()), U256::from(10u64));
    assert_eq!(bridge.matches.match_count(), 0);

    bridge
        .matches
        .create_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &all[1..],
        )
        .unwrap();
}

#[test]
fn removed_signer_invalidates_old_signature_set() {
    let mut bridge = Bridge::new(3, Some(2));
    let message = bridge.create_match_message(OrderId(1));
    let signatures = sign_all(&bridge.signers[..2], &message);

    let removed = bridge.signers[0].address();
    bridge.matches.remove_signers(owner(), &[removed]).unwrap();
    assert_eq!(bridge.matches.signers().len(), 2);
    assert_eq!(bridge.matches.threshold(), 2);

    let err = bridge
        .matches
        .create_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &signatures,
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::InvalidSigner { index: 0 });
}

#[test]
fn chain_id_binding() {
    let mut bridge = Bridge::new(2, None);
    let order_id = bridge.open_order();

    // Signed for chain 2, submitted to the chain-1 order registry at its
    // own address: valid signatures do not help.
    let message = ExecuteOrderMessage::new(
        MATCH_CHAIN,
        order_registry_addr(),
        order_id,
        buyer(),
        match_registry_addr(),
        MatchId(1),
    )
    .encode();
    let signatures = bridge.sign(&message);
    let err = bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::WrongChainId {
            expected: ORDER_CHAIN,
            actual: MATCH_CHAIN,
        }
    );

    // Right chain, other registry's address.
    let message = ExecuteOrderMessage::new(
        ORDER_CHAIN,
        match_registry_addr(),
        order_id,
        buyer(),
        match_registry_addr(),
        MatchId(1),
    )
    .encode();
    let signatures = bridge.sign(&message);
    let err = bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap_err();
    assert!(matches!(err, BridgeError::WrongRegistryAddress { .. }));
    assert_eq!(bridge.orders.order_state(order_id), State::AwaitingMatch);
}

#[test]
fn message_for_other_entry_point_rejected() {
    let mut bridge = Bridge::new(2, None);
    let match_id = bridge.open_match(OrderId(1));

    // executeMatch bytes submitted to cancelMatch: different tuple length.
    let message = bridge.execute_match_message(match_id);
    let signatures = bridge.sign(&message);
    let err = bridge
        .matches
        .cancel_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &signatures,
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::MalformedMessage { .. }));

    // createMatch bytes (same length as executeOrder) submitted to executeOrder.
    let message = bridge.create_match_message(OrderId(1));
    let signatures = bridge.sign(&message);
    let err = bridge
        .matches
        .execute_order(&mut bridge.chain_b, &message, &signatures)
        .unwrap_err();
    assert!(matches!(err, BridgeError::WrongSelector { .. }));
}

#[test]
fn native_escrow_round_trip() {
    let mut bridge = Bridge::new(2, None);
    let request = CreateOrderRequest::dummy(Address::NATIVE, 4, token_b());
    let order_id = bridge
        .orders
        .create_order(
            &mut bridge.chain_a,
            CallContext::with_value(seller(), U256::from(4u64)),
            &request,
        )
        .unwrap();
    assert_eq!(bridge.chain_a.balance(Address::NATIVE, seller()), U256::from(6u64));

    let message = bridge.execute_order_message(order_id, MatchId(1));
    let signatures = bridge.sign(&message);
    bridge
        .orders
        .execute_order(&mut bridge.chain_a, &message, &signatures)
        .unwrap();
    assert_eq!(bridge.chain_a.balance(Address::NATIVE, buyer()), U256::from(4u64));
    bridge.orders.verify_custody(&bridge.chain_a).unwrap();
}

#[test]
fn admin_surface_is_owner_gated() {
    let mut bridge = Bridge::new(2, None);
    let newcomer = TestSigner::random();

    assert_eq!(
        bridge
            .matches
            .add_signers(seller(), &[newcomer.address()])
            .unwrap_err(),
        BridgeError::NotOwner
    );
    assert_eq!(
        bridge.matches.set_threshold(seller(), 1).unwrap_err(),
        BridgeError::NotOwner
    );
    assert_eq!(
        bridge.matches.remove_signers(seller(), &[]).unwrap_err(),
        BridgeError::NotOwner
    );

    bridge
        .matches
        .add_signers(owner(), &[newcomer.address()])
        .unwrap();
    assert_eq!(bridge.matches.signers()[2], newcomer.address());
    assert_eq!(
        bridge
            .matches
            .add_signers(owner(), &[newcomer.address()])
            .unwrap_err(),
        BridgeError::DuplicateSigner(newcomer.address())
    );
    assert_eq!(
        bridge.matches.add_signers(owner(), &[Address::ZERO]).unwrap_err(),
        BridgeError::ZeroSigner
    );
    assert!(matches!(
        bridge.matches.set_threshold(owner(), 4).unwrap_err(),
        BridgeError::InvalidThreshold { .. }
    ));

    // Lower the threshold so one newcomer signature is a quorum.
    bridge.matches.set_threshold(owner(), 1).unwrap();
    let message = bridge.create_match_message(OrderId(1));
    let signatures = vec![newcomer.sign(&message)];
    bridge
        .matches
        .create_match(
            &mut bridge.chain_b,
            CallContext::new(buyer()),
            &message,
            &signatures,
        )
        .unwrap();
}

#[test]
fn pagination_over_user_records() {
    let mut bridge = Bridge::new(2, None);
    for _ in 0..3 {
        bridge.open_order();
    }
    bridge
        .orders
        .cancel_order(&mut bridge.chain_a, CallContext::new(seller()), OrderId(2))
        .unwrap();

    assert_eq!(bridge.orders.user_order_count(seller()), 3);
    assert!(bridge.orders.all_orders(3, 5).is_empty());
    assert_eq!(bridge.orders.all_orders(1, 5).len(), 2);
    assert_eq!(
        bridge
            .orders
            .user_orders(seller(), Some(State::Canceled), 0, 5)
            .len(),
        1
    );
    assert_eq!(
        bridge
            .orders
            .user_orders(seller(), Some(State::AwaitingMatch), 1, 5)[0]
            .order_id,
        OrderId(3)
    );
}

#[test]
fn config_from_json_builds_registry() {
    let signer = TestSigner::random();
    let json = serde_json::json!({
        "chain_id": 5,
        "address": order_registry_addr().to_string(),
        "owner": owner().to_string(),
        "signers": [signer.address().to_string()],
    })
    .to_string();
    let config = RegistryConfig::from_json(&json).unwrap();
    let registry = Registry::from_config(&config).unwrap();
    assert_eq!(registry.chain_id(), ChainId(5));
    assert_eq!(registry.threshold(), 1);
    assert_eq!(registry.signers(), &[signer.address()]);
}
