//! # bridgebook-registry
//!
//! The order/match registry of the **BridgeBook** protocol.
//!
//! The same [`Registry`] is deployed twice: as the order registry on the
//! source chain and as the match registry on the destination chain. Which
//! role an instance plays is only a matter of which entry points callers
//! use against it.
//!
//! - [`Registry`]: escrow state machine, signed entry points, admin surface
//! - [`Route`]: selector / chain id / address checks for signed messages
//! - [`AssetLedger`]: transfer capability; [`InMemoryLedger`] implements it
//! - [`EscrowAccounting`]: per-asset locked/released books behind
//!   [`Registry::verify_custody`]
//!
//! ## Two-sided settlement
//!
//! ```text
//!   chain A (order registry)                chain B (match registry)
//!   ────────────────────────                ────────────────────────
//!   create_order     ── OrderCreated ──▶    create_match   (signed)
//!                    ◀── MatchCreated ──
//!   execute_order    (signed)               execute_match  (signed)
//!     pays match-side receiver                pays order-side receiver
//! ```

pub mod custody;
pub mod dispatch;
pub mod ledger;
pub mod query;
pub mod registry;

pub use custody::EscrowAccounting;
pub use dispatch::Route;
pub use ledger::{AssetLedger, InMemoryLedger};
pub use query::paginate;
pub use registry::{CallContext, Registry};
