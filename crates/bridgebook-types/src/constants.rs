//! Protocol-wide constants for BridgeBook.

use primitive_types::U256;

/// Raw bytes of the native-asset sentinel address (`0xEeee…EEeE`).
pub const NATIVE_ASSET_BYTES: [u8; 20] = [0xEE; 20];

/// Width of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// Length of a recoverable secp256k1 signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LEN: usize = 65;

/// Prefix applied before hashing a 32-byte digest as a personal message.
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// First id handed out by a registry for orders and matches.
pub const FIRST_RECORD_ID: u64 = 1;

/// Decimal exponent of [`percentage_100`].
pub const PERCENTAGE_100_EXPONENT: usize = 27;

/// Fixed-point representation of 100% used for facade commissions (10^27).
#[must_use]
pub fn percentage_100() -> U256 {
    U256::exp10(PERCENTAGE_100_EXPONENT)
}
