//! Error types for the BridgeBook registries.
//!
//! All errors use the `BB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Routing / codec errors
//! - 3xx: State-guard errors
//! - 4xx: Value errors
//! - 5xx: Transfer errors
//! - 9xx: General / internal errors

use primitive_types::U256;
use thiserror::Error;

use crate::{Address, ChainId, MatchId, OrderId, State};

/// Central error enum for all BridgeBook operations.
///
/// Every variant aborts the whole call; no partial state is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// A signature recovered to a non-member, or could not be recovered.
    #[error("BB_ERR_100: Invalid signer at signature #{index}")]
    InvalidSigner { index: usize },

    /// The same signer appears twice in one call, or is added twice.
    #[error("BB_ERR_101: Duplicate signer: {0}")]
    DuplicateSigner(Address),

    /// Fewer distinct valid signers than the threshold.
    #[error("BB_ERR_102: Threshold not met: {valid} of {threshold} signatures")]
    ThresholdNotMet { valid: usize, threshold: usize },

    /// Caller is not the creator of the order or match.
    #[error("BB_ERR_103: Caller is not the creator")]
    NotCreator,

    /// Caller is not the privileged owner.
    #[error("BB_ERR_104: Caller is not the owner")]
    NotOwner,

    /// The null address cannot be a signer.
    #[error("BB_ERR_105: Zero address cannot be a signer")]
    ZeroSigner,

    /// Threshold is zero or exceeds the signer count.
    #[error("BB_ERR_106: Invalid threshold {threshold} for {signers} signers")]
    InvalidThreshold { threshold: usize, signers: usize },

    // =================================================================
    // Routing Errors (2xx)
    // =================================================================
    /// The byte layout does not match the expected tuple shape.
    #[error("BB_ERR_200: Malformed message: {reason}")]
    MalformedMessage { reason: String },

    /// The message selector does not match the invoked entry point.
    #[error("BB_ERR_201: Wrong selector: expected {expected}, got {actual}")]
    WrongSelector { expected: u8, actual: u8 },

    /// The message targets a different chain.
    #[error("BB_ERR_202: Wrong chain id: expected {expected}, got {actual}")]
    WrongChainId { expected: ChainId, actual: ChainId },

    /// The message targets a different registry instance.
    #[error("BB_ERR_203: Wrong registry address: expected {expected}, got {actual}")]
    WrongRegistryAddress { expected: Address, actual: Address },

    /// Encoded call data names no registry entry point.
    #[error("BB_ERR_204: Transaction reverted silently")]
    SilentRevert,

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// The order is not in the state the operation requires.
    #[error("BB_ERR_300: Order status is wrong: {order_id} is {state}")]
    WrongOrderStatus { order_id: OrderId, state: State },

    /// Cancel attempted on a match that is not awaiting finalization.
    #[error("BB_ERR_301: Match state is wrong: {match_id} is {state}")]
    WrongMatchState { match_id: MatchId, state: State },

    /// Execute attempted on a match that is not awaiting finalization.
    #[error("BB_ERR_302: Match status is wrong: {match_id} is {state}")]
    WrongMatchStatus { match_id: MatchId, state: State },

    // =================================================================
    // Value Errors (4xx)
    // =================================================================
    /// Attached native value does not equal the escrowed amount.
    #[error("BB_ERR_400: Wrong amount: expected {expected}, attached {attached}")]
    WrongAmount { expected: U256, attached: U256 },

    /// Facade commission above 100%.
    #[error("BB_ERR_401: Commission > 100%: {0}")]
    CommissionTooHigh(U256),

    // =================================================================
    // Transfer Errors (5xx)
    // =================================================================
    /// A native or token transfer failed.
    #[error("BB_ERR_500: Transferring failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Registry custody does not cover outstanding escrow.
    #[error("BB_ERR_900: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("BB_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("BB_ERR_902: Serialization error: {0}")]
    Serialization(String),
}

impl BridgeError {
    /// Shorthand for a [`BridgeError::MalformedMessage`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`BridgeError::TransferFailed`].
    pub fn transfer_failed(reason: impl Into<String>) -> Self {
        Self::TransferFailed {
            reason: reason.into(),
        }
    }

    /// The stable `BB_ERR_xxx` code of this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSigner { .. } => "BB_ERR_100",
            Self::DuplicateSigner(_) => "BB_ERR_101",
            Self::ThresholdNotMet { .. } => "BB_ERR_102",
            Self::NotCreator => "BB_ERR_103",
            Self::NotOwner => "BB_ERR_104",
            Self::ZeroSigner => "BB_ERR_105",
            Self::InvalidThreshold { .. } => "BB_ERR_106",
            Self::MalformedMessage { .. } => "BB_ERR_200",
            Self::WrongSelector { .. } => "BB_ERR_201",
            Self::WrongChainId { .. } => "BB_ERR_202",
            Self::WrongRegistryAddress { .. } => "BB_ERR_203",
            Self::SilentRevert => "BB_ERR_204",
            Self::WrongOrderStatus { .. } => "BB_ERR_300",
            Self::WrongMatchState { .. } => "BB_ERR_301",
            Self::WrongMatchStatus { .. } => "BB_ERR_302",
            Self::WrongAmount { .. } => "BB_ERR_400",
            Self::CommissionTooHigh(_) => "BB_ERR_401",
            Self::TransferFailed { .. } => "BB_ERR_500",
            Self::CustodyInvariantViolation { .. } => "BB_ERR_900",
            Self::Configuration(_) => "BB_ERR_901",
            Self::Serialization(_) => "BB_ERR_902",
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
