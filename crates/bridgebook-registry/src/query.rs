//! Read-only projections over registry state.
//!
//! Paginated queries return nothing once `offset` reaches the number of
//! candidates and at most `min(limit, remaining)` entries otherwise. A state
//! filter narrows the candidates before the page is cut.

use bridgebook_types::{Address, Match, MatchId, Order, OrderId, State};

use crate::registry::Registry;

/// Cut one page out of `items`.
pub fn paginate<T>(items: impl IntoIterator<Item = T>, offset: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

impl<Q> Registry<Q> {
    #[must_use]
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let index = usize::try_from(order_id.0.checked_sub(1)?).ok()?;
        self.orders.get(index)
    }

    #[must_use]
    pub fn match_record(&self, match_id: MatchId) -> Option<&Match> {
        let index = usize::try_from(match_id.0.checked_sub(1)?).ok()?;
        self.matches.get(index)
    }

    /// `NONE` for unknown ids.
    #[must_use]
    pub fn order_state(&self, order_id: OrderId) -> State {
        self.order(order_id).map_or(State::None, Order::state)
    }

    /// `NONE` for unknown ids.
    #[must_use]
    pub fn match_state(&self, match_id: MatchId) -> State {
        self.match_record(match_id).map_or(State::None, |m| m.state)
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn user_order_count(&self, user: Address) -> usize {
        self.user_orders.get(&user).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn user_match_count(&self, user: Address) -> usize {
        self.user_matches.get(&user).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn all_orders(&self, offset: usize, limit: usize) -> Vec<Order> {
        paginate(self.orders.iter().cloned(), offset, limit)
    }

    #[must_use]
    pub fn all_matches(&self, offset: usize, limit: usize) -> Vec<Match> {
        paginate(self.matches.iter().cloned(), offset, limit)
    }

    /// A user's orders in creation order, optionally only those in `state`.
    #[must_use]
    pub fn user_orders(
        &self,
        user: Address,
        state: Option<State>,
        offset: usize,
        limit: usize,
    ) -> Vec<Order> {
        let ids = self.user_orders.get(&user).map_or(&[][..], Vec::as_slice);
        let candidates = ids
            .iter()
            .filter_map(|id| self.order(*id))
            .filter(|o| state.is_none_or(|s| o.state() == s))
            .cloned();
        paginate(candidates, offset, limit)
    }

    /// A user's matches in creation order, optionally only those in `state`.
    #[must_use]
    pub fn user_matches(
        &self,
        user: Address,
        state: Option<State>,
        offset: usize,
        limit: usize,
    ) -> Vec<Match> {
        let ids = self.user_matches.get(&user).map_or(&[][..], Vec::as_slice);
        let candidates = ids
            .iter()
            .filter_map(|id| self.match_record(*id))
            .filter(|m| state.is_none_or(|s| m.state == s))
            .cloned();
        paginate(candidates, offset, limit)
    }
}
