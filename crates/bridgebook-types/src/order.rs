//! # Order model and the shared record state machine
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐ create_order ┌────────────────┐ execute_order ┌──────────┐
//!   │ NONE ├─────────────▶│ AWAITING_MATCH ├──────────────▶│ EXECUTED │
//!   └──┬───┘              └───────┬────────┘               └──────────┘
//!      │ create_match             │ cancel_order                 ▲
//!      ▼                          ▼                              │
//!   ┌───────────────────────┐  ┌──────────┐   execute_match      │
//!   │ AWAITING_FINALIZATION ├─▶│ CANCELED │                      │
//!   └──────────┬────────────┘  └──────────┘                      │
//!              └─────────────────────────────────────────────────┘
//! ```
//!
//! Orders enter at `AWAITING_MATCH`, matches at `AWAITING_FINALIZATION`.
//! `CANCELED` and `EXECUTED` are terminal. Ids are never reused, so a
//! record never returns to `NONE`.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{Address, ChainId, MatchId, OrderId};

/// Lifecycle state shared by orders and matches.
///
/// Discriminants follow the on-wire ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum State {
    /// No record with this id exists.
    #[default]
    None = 0,
    /// Order escrowed, no remote match bound yet.
    AwaitingMatch = 1,
    /// Match escrowed, awaiting a signed execute or cancel.
    AwaitingFinalization = 2,
    /// Escrow returned to the creator. **Terminal.**
    Canceled = 3,
    /// Escrow paid to the receiver. **Terminal.**
    Executed = 4,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::AwaitingMatch => write!(f, "AWAITING_MATCH"),
            Self::AwaitingFinalization => write!(f, "AWAITING_FINALIZATION"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Executed => write!(f, "EXECUTED"),
        }
    }
}

/// Which remote match (if any) is bound to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub state: State,
    /// Id of the match on the remote registry; `MatchId(0)` while unbound.
    pub match_id: MatchId,
    /// Address of the remote match registry; zero while unbound.
    pub match_registry: Address,
}

impl OrderStatus {
    /// Status of a freshly created order.
    #[must_use]
    pub fn awaiting_match() -> Self {
        Self {
            state: State::AwaitingMatch,
            match_id: MatchId(0),
            match_registry: Address::ZERO,
        }
    }
}

/// Parameters supplied by the seller when opening an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Opt-in flag for off-chain relayers that execute via the fee facade.
    pub use_relayer: bool,
    pub token_to_sell: Address,
    pub amount_to_sell: U256,
    pub token_to_buy: Address,
    pub amount_to_buy: U256,
    pub destination_chain: ChainId,
}

/// An order held by the order registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub creator: Address,
    pub use_relayer: bool,
    /// Escrowed asset.
    pub token_to_sell: Address,
    /// Escrowed quantity.
    pub amount_to_sell: U256,
    /// Asset expected on the remote leg. Informational.
    pub token_to_buy: Address,
    /// Quantity expected on the remote leg. Informational.
    pub amount_to_buy: U256,
    pub destination_chain: ChainId,
    pub status: OrderStatus,
}

impl Order {
    /// Build a new `AWAITING_MATCH` order from a creation request.
    #[must_use]
    pub fn from_request(order_id: OrderId, creator: Address, request: &CreateOrderRequest) -> Self {
        Self {
            order_id,
            creator,
            use_relayer: request.use_relayer,
            token_to_sell: request.token_to_sell,
            amount_to_sell: request.amount_to_sell,
            token_to_buy: request.token_to_buy,
            amount_to_buy: request.amount_to_buy,
            destination_chain: request.destination_chain,
            status: OrderStatus::awaiting_match(),
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.status.state
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl CreateOrderRequest {
    /// Sell `amount` of `token` for twice as much of `token_to_buy` on chain 1.
    pub fn dummy(token: Address, amount: u64, token_to_buy: Address) -> Self {
        Self {
            use_relayer: false,
            token_to_sell: token,
            amount_to_sell: U256::from(amount),
            token_to_buy,
            amount_to_buy: U256::from(amount * 2),
            destination_chain: ChainId(1),
        }
    }
}
