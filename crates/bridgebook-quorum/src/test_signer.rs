//! Local secp256k1 signer for tests.

use bridgebook_types::Address;
use k256::ecdsa::SigningKey;

use crate::{message_digest, recover::address_from_key};

/// A throwaway signing key and its address.
#[derive(Clone)]
pub struct TestSigner {
    key: SigningKey,
    address: Address,
}

impl TestSigner {
    #[must_use]
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_key(key.verifying_key());
        Self { key, address }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign `message` as a personal message: 65 bytes, `v` in `{27, 28}`.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let digest = message_digest(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .expect("signing a 32-byte digest");
        let mut out = signature.to_bytes().to_vec();
        out.push(recovery_id.to_byte() + 27);
        out
    }
}

impl std::fmt::Debug for TestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Every signer's signature over `message`, in order.
#[must_use]
pub fn sign_all(signers: &[TestSigner], message: &[u8]) -> Vec<Vec<u8>> {
    signers.iter().map(|s| s.sign(message)).collect()
}
