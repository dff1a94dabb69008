//! Signer recovery over personal-message digests.

use bridgebook_types::{Address, constants::ETH_SIGNED_MESSAGE_PREFIX, constants::SIGNATURE_LEN};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The digest signers sign for `message`:
/// `keccak256(prefix || keccak256(message))`.
#[must_use]
pub fn message_digest(message: &[u8]) -> [u8; 32] {
    let inner = keccak256(message);
    let mut hasher = Keccak256::new();
    hasher.update(ETH_SIGNED_MESSAGE_PREFIX);
    hasher.update(inner);
    hasher.finalize().into()
}

/// Address of a public key: last 20 bytes of the Keccak-256 of the
/// uncompressed point without its `0x04` tag.
#[must_use]
pub fn address_from_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address(bytes)
}

/// Recovers the address that produced a signature over a digest.
pub trait SignatureRecoverer {
    /// `None` if the signature is malformed or does not recover.
    fn recover(&self, digest: &[u8; 32], signature: &[u8]) -> Option<Address>;
}

/// secp256k1 recovery of 65-byte `r || s || v` signatures, `v` in
/// `{0, 1, 27, 28}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recoverer;

impl Secp256k1Recoverer {
    fn recovery_id(v: u8) -> Option<RecoveryId> {
        let id = match v {
            0 | 27 => 0,
            1 | 28 => 1,
            _ => return None,
        };
        RecoveryId::try_from(id).ok()
    }
}

impl SignatureRecoverer for Secp256k1Recoverer {
    fn recover(&self, digest: &[u8; 32], signature: &[u8]) -> Option<Address> {
        if signature.len() != SIGNATURE_LEN {
            return None;
        }
        let recovery_id = Self::recovery_id(signature[64])?;
        let sig = Signature::from_slice(&signature[..64]).ok()?;
        let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id).ok()?;
        Some(address_from_key(&key))
    }
}
