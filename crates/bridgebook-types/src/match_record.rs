//! Match records: the counter-party leg locked against a remote order.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{Address, ChainId, MatchId, OrderId, State};

/// A match held by the match registry.
///
/// Created directly in `AWAITING_FINALIZATION`; only a quorum-signed
/// execute or cancel releases its escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: MatchId,
    pub creator: Address,
    pub token_to_sell: Address,
    pub amount_to_sell: U256,
    /// Chain hosting the order this match targets.
    pub origin_chain_id: ChainId,
    /// The remote order this match targets.
    pub origin_order_id: OrderId,
    pub state: State,
}
