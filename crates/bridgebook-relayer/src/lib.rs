//! # bridgebook-relayer
//!
//! Fee-taking facade for the **BridgeBook** registries.
//!
//! Off-chain relayers that execute an order or match on a user's behalf
//! route the call through a [`Relayer`]: the registry pays the facade, the
//! facade keeps a quorum-approved commission and forwards the rest to the
//! real receiver. Commissions accumulate in the facade's ledger account
//! until its owner withdraws them.

pub mod facade;
pub mod message;

pub use facade::{ExecuteReceipt, Relayer};
pub use message::{EXECUTE_SELECTOR, ExecuteMessage};
