//! Quorum verification.

use std::collections::HashSet;

use bridgebook_types::{Address, BridgeError, RegistryConfig, Result};
use tracing::{debug, warn};

use crate::{Secp256k1Recoverer, SignatureRecoverer, SignerSet, message_digest};

/// Decides whether a signature set authorizes a message.
pub trait Authorizer {
    /// # Errors
    /// `InvalidSigner`, `DuplicateSigner` or `ThresholdNotMet`.
    fn verify(&self, message: &[u8], signatures: &[Vec<u8>]) -> Result<()>;
}

/// A [`SignerSet`] bound to a [`SignatureRecoverer`].
#[derive(Debug, Clone)]
pub struct SignerQuorum<R = Secp256k1Recoverer> {
    signers: SignerSet,
    recoverer: R,
}

impl SignerQuorum {
    #[must_use]
    pub fn new(signers: SignerSet) -> Self {
        Self::with_recoverer(signers, Secp256k1Recoverer)
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Ok(Self::new(SignerSet::from_config(config)?))
    }
}

impl<R> SignerQuorum<R> {
    #[must_use]
    pub fn with_recoverer(signers: SignerSet, recoverer: R) -> Self {
        Self { signers, recoverer }
    }

    #[must_use]
    pub fn signer_set(&self) -> &SignerSet {
        &self.signers
    }

    pub fn add_signers(&mut self, signers: &[Address]) -> Result<()> {
        self.signers.add(signers)
    }

    pub fn remove_signers(&mut self, signers: &[Address]) -> usize {
        self.signers.remove(signers)
    }

    pub fn set_threshold(&mut self, threshold: usize) -> Result<()> {
        self.signers.set_threshold(threshold)
    }
}

fn signature_prefix(signature: &[u8]) -> String {
    hex::encode(&signature[..signature.len().min(8)])
}

impl<R: SignatureRecoverer> Authorizer for SignerQuorum<R> {
    fn verify(&self, message: &[u8], signatures: &[Vec<u8>]) -> Result<()> {
        let digest = message_digest(message);
        let threshold = self.signers.threshold();
        let mut seen: HashSet<Address> = HashSet::with_capacity(threshold);

        for (index, signature) in signatures.iter().enumerate() {
            let Some(signer) = self
                .recoverer
                .recover(&digest, signature)
                .filter(|s| self.signers.contains(s))
            else {
                warn!(
                    index,
                    signature = %signature_prefix(signature),
                    "Rejected signature from unknown signer"
                );
                return Err(BridgeError::InvalidSigner { index });
            };

            if !seen.insert(signer) {
                warn!(index, %signer, "Rejected duplicate signer");
                return Err(BridgeError::DuplicateSigner(signer));
            }

            if seen.len() >= threshold {
                debug!(valid = seen.len(), threshold, inspected = index + 1, "Quorum reached");
                return Ok(());
            }
        }

        warn!(valid = seen.len(), threshold, "Quorum not reached");
        Err(BridgeError::ThresholdNotMet {
            valid: seen.len(),
            threshold,
        })
    }
}

/// Authorizer with a fixed verdict, for exercising registries without keys.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone)]
pub enum FixedAuthorizer {
    Accept,
    Reject(BridgeError),
}

#[cfg(any(test, feature = "test-helpers"))]
impl Authorizer for FixedAuthorizer {
    fn verify(&self, _message: &[u8], _signatures: &[Vec<u8>]) -> Result<()> {
        match self {
            Self::Accept => Ok(()),
            Self::Reject(err) => Err(err.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TestSigner, sign_all};

    fn quorum_of(signers: &[TestSigner], threshold: usize) -> SignerQuorum {
        let addresses: Vec<Address> = signers.iter().map(TestSigner::address).collect();
        SignerQuorum::new(SignerSet::new(&addresses, threshold).unwrap())
    }

    fn signers(n: usize) -> Vec<TestSigner> {
        (0..n).map(|_| TestSigner::random()).collect()
    }

    #[test]
    fn full_quorum_accepted() {
        let keys = signers(3);
        let quorum = quorum_of(&keys, 3);
        let sigs = sign_all(&keys, b"msg");
        quorum.verify(b"msg", &sigs).unwrap();
    }

    #[test]
    fn below_threshold_rejected() {
        let keys = signers(3);
        let quorum = quorum_of(&keys, 3);
        let sigs = sign_all(&keys[..2], b"msg");
        assert_eq!(
            quorum.verify(b"msg", &sigs).unwrap_err(),
            BridgeError::ThresholdNotMet {
                valid: 2,
                threshold: 3
            }
        );
    }

    #[test]
    fn empty_signature_list_rejected() {
        let keys = signers(1);
        let quorum = quorum_of(&keys, 1);
        assert!(matches!(
            quorum.verify(b"msg", &[]).unwrap_err(),
            BridgeError::ThresholdNotMet { valid: 0, .. }
        ));
    }

    #[test]
    fn duplicate_signature_rejected() {
        let keys = signers(3);
        let quorum = quorum_of(&keys, 3);
        let mut sigs = sign_all(&keys[..2], b"msg");
        sigs.push(sigs[0].clone());
        assert_eq!(
            quorum.verify(b"msg", &sigs).unwrap_err(),
            BridgeError::DuplicateSigner(keys[0].address())
        );
    }

    #[test]
    fn non_member_rejected_at_its_index() {
        let keys = signers(2);
        let quorum = quorum_of(&keys, 2);
        let outsider = TestSigner::random();
        let sigs = vec![keys[0].sign(b"msg"), outsider.sign(b"msg")];
        assert_eq!(
            quorum.verify(b"msg", &sigs).unwrap_err(),
            BridgeError::InvalidSigner { index: 1 }
        );
    }

    #[test]
    fn signature_over_other_message_rejected() {
        let keys = signers(1);
        let quorum = quorum_of(&keys, 1);
        let sigs = sign_all(&keys, b"other");
        assert_eq!(
            quorum.verify(b"msg", &sigs).unwrap_err(),
            BridgeError::InvalidSigner { index: 0 }
        );
    }

    #[test]
    fn trailing_signatures_not_inspected() {
        let keys = signers(3);
        let quorum = quorum_of(&keys, 2);
        let mut sigs = sign_all(&keys[..2], b"msg");
        sigs.push(vec![0u8; 3]);
        quorum.verify(b"msg", &sigs).unwrap();
    }

    #[test]
    fn removed_signer_invalidates_old_signatures() {
        let keys = signers(3);
        let mut quorum = quorum_of(&keys, 2);
        let sigs = sign_all(&keys[..2], b"msg");
        quorum.verify(b"msg", &sigs).unwrap();

        quorum.remove_signers(&[keys[0].address()]);
        assert_eq!(
            quorum.verify(b"msg", &sigs).unwrap_err(),
            BridgeError::InvalidSigner { index: 0 }
        );
    }

    #[test]
    fn removal_can_make_quorum_unreachable() {
        let keys = signers(2);
        let mut quorum = quorum_of(&keys, 2);
        quorum.remove_signers(&[keys[1].address()]);
        assert_eq!(quorum.signer_set().threshold(), 2);
        let sigs = sign_all(&keys[..1], b"msg");
        assert!(matches!(
            quorum.verify(b"msg", &sigs).unwrap_err(),
            BridgeError::ThresholdNotMet { .. }
        ));
    }

    #[test]
    fn fixed_authorizer_verdicts() {
        FixedAuthorizer::Accept.verify(b"", &[]).unwrap();
        let reject = FixedAuthorizer::Reject(BridgeError::InvalidSigner { index: 0 });
        assert!(reject.verify(b"", &[]).is_err());
    }
}
