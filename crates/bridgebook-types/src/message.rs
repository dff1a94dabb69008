//! The four quorum-signed registry messages.
//!
//! Each message is a static ABI tuple whose first three words are always
//! `(selector, chain_id, target_registry)`. Binding the chain id and the
//! registry address into the signed bytes pins a signature set to exactly
//! one deployed instance.
//!
//! | Message | Tuple |
//! |---|---|
//! | [`CreateMatchMessage`] | `(selector, chainId, matchRegistry, orderId, tokenToSell, amountToSell, originChain)` |
//! | [`CancelMatchMessage`] | `(selector, chainId, matchRegistry, matchId)` |
//! | [`ExecuteMatchMessage`] | `(selector, chainId, matchRegistry, matchId, receiver)` |
//! | [`ExecuteOrderMessage`] | `(selector, chainId, orderRegistry, orderId, receiver, matchRegistry, matchId)` |

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{
    Address, BridgeError, ChainId, MatchId, OrderId, Result,
    abi::{AbiReader, Word, word_from_address, word_from_u64, word_from_u256},
};

/// One-byte tag naming the operation a message encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Selector {
    ExecuteOrder = 0,
    ExecuteMatch = 1,
    CreateMatch = 2,
    CancelMatch = 3,
}

impl Selector {
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::ExecuteOrder),
            1 => Some(Self::ExecuteMatch),
            2 => Some(Self::CreateMatch),
            3 => Some(Self::CancelMatch),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExecuteOrder => write!(f, "EXECUTE_ORDER"),
            Self::ExecuteMatch => write!(f, "EXECUTE_MATCH"),
            Self::CreateMatch => write!(f, "CREATE_MATCH"),
            Self::CancelMatch => write!(f, "CANCEL_MATCH"),
        }
    }
}

/// Common shape of the signed messages.
pub trait SignedMessage: Sized {
    /// The selector the matching entry point accepts.
    const SELECTOR: Selector;
    /// Number of static words in the tuple.
    const WORDS: usize;

    /// Decode using this message's tuple shape.
    ///
    /// Chain ids and record ids are read as `u64` (the EIP-2294 bound).
    /// A word above that bound makes the whole message `MalformedMessage`
    /// before any routing check runs, so it never reports `WrongChainId`
    /// or `WrongSelector`.
    fn decode(data: &[u8]) -> Result<Self>;
    fn encode(&self) -> Vec<u8>;

    /// Selector carried in the payload (may differ from [`Self::SELECTOR`]).
    fn selector(&self) -> Selector;
    fn chain_id(&self) -> ChainId;
    /// Registry the message is addressed to.
    fn target(&self) -> Address;
}

/// Word 0 as a known selector tag. Any other value is malformed, not a
/// wrong selector: routing only ever compares two known tags.
fn read_selector(reader: &AbiReader<'_>) -> Result<Selector> {
    let tag = reader.uint8(0)?;
    Selector::from_tag(tag).ok_or_else(|| BridgeError::malformed(format!("unknown selector {tag}")))
}

fn concat(words: &[Word]) -> Vec<u8> {
    words.concat()
}

// ---------------------------------------------------------------------------
// createMatch
// ---------------------------------------------------------------------------

/// Authorizes a counter-party to escrow against a remote order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMatchMessage {
    pub selector: Selector,
    pub chain_id: ChainId,
    pub match_registry: Address,
    pub order_id: OrderId,
    pub token_to_sell: Address,
    pub amount_to_sell: U256,
    pub origin_chain: ChainId,
}

impl CreateMatchMessage {
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        match_registry: Address,
        order_id: OrderId,
        token_to_sell: Address,
        amount_to_sell: U256,
        origin_chain: ChainId,
    ) -> Self {
        Self {
            selector: Selector::CreateMatch,
            chain_id,
            match_registry,
            order_id,
            token_to_sell,
            amount_to_sell,
            origin_chain,
        }
    }
}

impl SignedMessage for CreateMatchMessage {
    const SELECTOR: Selector = Selector::CreateMatch;
    const WORDS: usize = 7;

    fn decode(data: &[u8]) -> Result<Self> {
        let reader = AbiReader::new(data);
        reader.expect_static(Self::WORDS)?;
        Ok(Self {
            selector: read_selector(&reader)?,
            chain_id: ChainId(reader.uint64(1)?),
            match_registry: reader.address(2)?,
            order_id: OrderId(reader.uint64(3)?),
            token_to_sell: reader.address(4)?,
            amount_to_sell: reader.uint256(5)?,
            origin_chain: ChainId(reader.uint64(6)?),
        })
    }

    fn encode(&self) -> Vec<u8> {
        concat(&[
            word_from_u64(self.selector.tag().into()),
            word_from_u64(self.chain_id.0),
            word_from_address(self.match_registry),
            word_from_u64(self.order_id.0),
            word_from_address(self.token_to_sell),
            word_from_u256(self.amount_to_sell),
            word_from_u64(self.origin_chain.0),
        ])
    }

    fn selector(&self) -> Selector {
        self.selector
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn target(&self) -> Address {
        self.match_registry
    }
}

// ---------------------------------------------------------------------------
// cancelMatch
// ---------------------------------------------------------------------------

/// Authorizes returning a match's escrow to its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelMatchMessage {
    pub selector: Selector,
    pub chain_id: ChainId,
    pub match_registry: Address,
    pub match_id: MatchId,
}

impl CancelMatchMessage {
    #[must_use]
    pub fn new(chain_id: ChainId, match_registry: Address, match_id: MatchId) -> Self {
        Self {
            selector: Selector::CancelMatch,
            chain_id,
            match_registry,
            match_id,
        }
    }
}

impl SignedMessage for CancelMatchMessage {
    const SELECTOR: Selector = Selector::CancelMatch;
    const WORDS: usize = 4;

    fn decode(data: &[u8]) -> Result<Self> {
        let reader = AbiReader::new(data);
        reader.expect_static(Self::WORDS)?;
        Ok(Self {
            selector: read_selector(&reader)?,
            chain_id: ChainId(reader.uint64(1)?),
            match_registry: reader.address(2)?,
            match_id: MatchId(reader.uint64(3)?),
        })
    }

    fn encode(&self) -> Vec<u8> {
        concat(&[
            word_from_u64(self.selector.tag().into()),
            word_from_u64(self.chain_id.0),
            word_from_address(self.match_registry),
            word_from_u64(self.match_id.0),
        ])
    }

    fn selector(&self) -> Selector {
        self.selector
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn target(&self) -> Address {
        self.match_registry
    }
}

// ---------------------------------------------------------------------------
// executeMatch
// ---------------------------------------------------------------------------

/// Authorizes paying a match's escrow to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteMatchMessage {
    pub selector: Selector,
    pub chain_id: ChainId,
    pub match_registry: Address,
    pub match_id: MatchId,
    pub receiver: Address,
}

impl ExecuteMatchMessage {
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        match_registry: Address,
        match_id: MatchId,
        receiver: Address,
    ) -> Self {
        Self {
            selector: Selector::ExecuteMatch,
            chain_id,
            match_registry,
            match_id,
            receiver,
        }
    }
}

impl SignedMessage for ExecuteMatchMessage {
    const SELECTOR: Selector = Selector::ExecuteMatch;
    const WORDS: usize = 5;

    fn decode(data: &[u8]) -> Result<Self> {
        let reader = AbiReader::new(data);
        reader.expect_static(Self::WORDS)?;
        Ok(Self {
            selector: read_selector(&reader)?,
            chain_id: ChainId(reader.uint64(1)?),
            match_registry: reader.address(2)?,
            match_id: MatchId(reader.uint64(3)?),
            receiver: reader.address(4)?,
        })
    }

    fn encode(&self) -> Vec<u8> {
        concat(&[
            word_from_u64(self.selector.tag().into()),
            word_from_u64(self.chain_id.0),
            word_from_address(self.match_registry),
            word_from_u64(self.match_id.0),
            word_from_address(self.receiver),
        ])
    }

    fn selector(&self) -> Selector {
        self.selector
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn target(&self) -> Address {
        self.match_registry
    }
}

// ---------------------------------------------------------------------------
// executeOrder
// ---------------------------------------------------------------------------

/// Authorizes paying an order's escrow to `receiver` and binding the
/// remote match that paid for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOrderMessage {
    pub selector: Selector,
    pub chain_id: ChainId,
    pub order_registry: Address,
    pub order_id: OrderId,
    pub receiver: Address,
    pub match_registry: Address,
    pub match_id: MatchId,
}

impl ExecuteOrderMessage {
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        order_registry: Address,
        order_id: OrderId,
        receiver: Address,
        match_registry: Address,
        match_id: MatchId,
    ) -> Self {
        Self {
            selector: Selector::ExecuteOrder,
            chain_id,
            order_registry,
            order_id,
            receiver,
            match_registry,
            match_id,
        }
    }
}

impl SignedMessage for ExecuteOrderMessage {
    const SELECTOR: Selector = Selector::ExecuteOrder;
    const WORDS: usize = 7;

    fn decode(data: &[u8]) -> Result<Self> {
        let reader = AbiReader::new(data);
        reader.expect_static(Self::WORDS)?;
        Ok(Self {
            selector: read_selector(&reader)?,
            chain_id: ChainId(reader.uint64(1)?),
            order_registry: reader.address(2)?,
            order_id: OrderId(reader.uint64(3)?),
            receiver: reader.address(4)?,
            match_registry: reader.address(5)?,
            match_id: MatchId(reader.uint64(6)?),
        })
    }

    fn encode(&self) -> Vec<u8> {
        concat(&[
            word_from_u64(self.selector.tag().into()),
            word_from_u64(self.chain_id.0),
            word_from_address(self.order_registry),
            word_from_u64(self.order_id.0),
            word_from_address(self.receiver),
            word_from_address(self.match_registry),
            word_from_u64(self.match_id.0),
        ])
    }

    fn selector(&self) -> Selector {
        self.selector
    }

    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn target(&self) -> Address {
        self.order_registry
    }
}
