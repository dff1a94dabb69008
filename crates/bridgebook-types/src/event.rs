//! Registry events consumed by off-chain relayers.
//!
//! Every committed transition appends exactly one [`EventRecord`] to the
//! registry's log. Observers on the other chain watch these to know when to
//! collect signatures for the next leg.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Match, MatchId, Order, OrderId, OrderStatus, State};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A new order was escrowed.
    OrderCreated(Order),
    /// An order was canceled or executed.
    OrderUpdated { order_id: OrderId, status: OrderStatus },
    /// A new match was escrowed.
    MatchCreated(Match),
    /// A match was canceled or executed.
    MatchUpdated { match_id: MatchId, state: State },
}

impl RegistryEvent {
    /// Short event name for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderCreated(_) => "ORDER_CREATED",
            Self::OrderUpdated { .. } => "ORDER_UPDATED",
            Self::MatchCreated(_) => "MATCH_CREATED",
            Self::MatchUpdated { .. } => "MATCH_UPDATED",
        }
    }
}

/// An event stamped with its position in the registry log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// When the event was appended.
    pub emitted_at: DateTime<Utc>,
    pub event: RegistryEvent,
}

impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.sequence, self.event.kind())
    }
}
