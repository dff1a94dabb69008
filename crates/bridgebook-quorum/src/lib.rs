//! # bridgebook-quorum
//!
//! Multi-signer authorization for the **BridgeBook** registries.
//!
//! Every cross-chain transition carries a set of signatures over the exact
//! message bytes. This crate decides whether that set is a valid quorum:
//!
//! - [`SignerSet`]: trusted addresses in insertion order plus a threshold
//! - [`SignatureRecoverer`]: recovers a signer address from a 65-byte
//!   `r || s || v` signature; [`Secp256k1Recoverer`] is the production one
//! - [`SignerQuorum`]: a signer set bound to a recoverer, implementing
//!   [`Authorizer`]
//!
//! ## Verification walk
//!
//! ```text
//! digest = keccak256("\x19Ethereum Signed Message:\n32" || keccak256(message))
//!
//! for sig in signatures:
//!     signer = recover(digest, sig)    ── unrecoverable / non-member ──▶ InvalidSigner
//!     seen before in this call?        ── yes ─────────────────────────▶ DuplicateSigner
//!     distinct members == threshold?   ── yes ─────────────────────────▶ Ok
//! end of list                          ───────────────────────────────▶ ThresholdNotMet
//! ```

pub mod quorum;
pub mod recover;
pub mod signer_set;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_signer;

pub use quorum::{Authorizer, SignerQuorum};
pub use recover::{Secp256k1Recoverer, SignatureRecoverer, keccak256, message_digest};
pub use signer_set::SignerSet;

#[cfg(any(test, feature = "test-helpers"))]
pub use quorum::FixedAuthorizer;
#[cfg(any(test, feature = "test-helpers"))]
pub use test_signer::{TestSigner, sign_all};
