//! # bridgebook-types
//!
//! Shared types, errors, configuration and the message codec for the
//! **BridgeBook** cross-chain order/match registries.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`ChainId`], [`OrderId`], [`MatchId`], and the [`U256`] amount type
//! - **Record model**: [`Order`], [`OrderStatus`], [`Match`], [`State`], [`CreateOrderRequest`]
//! - **Events**: [`RegistryEvent`], [`EventRecord`]
//! - **Codec**: ABI word codec ([`abi`]), the four signed messages ([`message`]),
//!   and encoded registry calls ([`RegistryCall`])
//! - **Configuration**: [`RegistryConfig`], [`RelayerConfig`]
//! - **Errors**: [`BridgeError`] with `BB_ERR_` prefix codes
//! - **Constants**: protocol-wide values

pub mod abi;
pub mod call;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod match_record;
pub mod message;
pub mod order;

pub use call::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use match_record::*;
pub use message::*;
pub use order::*;

pub use primitive_types::U256;

// Constants and ABI helpers are accessed through their modules
// (`bridgebook_types::constants::FOO`, `bridgebook_types::abi::encode`).
