//! Encoded registry calls.
//!
//! The fee facade forwards opaque call data to a registry. Call data is
//! `function_id (4 bytes) || abi.encode(bytes message, bytes[] signatures)`,
//! where `function_id` is the first four bytes of the Keccak-256 hash of the
//! entry point's signature, e.g. `executeOrder(bytes,bytes[])`.

use sha3::{Digest, Keccak256};

use crate::{
    BridgeError, Result, Selector,
    abi::{self, AbiReader, Token},
};

const CREATE_MATCH_SIGNATURE: &str = "createMatch(bytes,bytes[])";
const CANCEL_MATCH_SIGNATURE: &str = "cancelMatch(bytes,bytes[])";
const EXECUTE_MATCH_SIGNATURE: &str = "executeMatch(bytes,bytes[])";
const EXECUTE_ORDER_SIGNATURE: &str = "executeOrder(bytes,bytes[])";

/// First four bytes of `keccak256(signature)`.
#[must_use]
pub fn function_id(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// A signed message plus its quorum signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub message: Vec<u8>,
    pub signatures: Vec<Vec<u8>>,
}

/// A call against one of the quorum-signed registry entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCall {
    pub entry: Selector,
    pub payload: SignedPayload,
}

impl RegistryCall {
    #[must_use]
    pub fn new(entry: Selector, message: Vec<u8>, signatures: Vec<Vec<u8>>) -> Self {
        Self {
            entry,
            payload: SignedPayload {
                message,
                signatures,
            },
        }
    }

    fn entry_signature(entry: Selector) -> &'static str {
        match entry {
            Selector::CreateMatch => CREATE_MATCH_SIGNATURE,
            Selector::CancelMatch => CANCEL_MATCH_SIGNATURE,
            Selector::ExecuteMatch => EXECUTE_MATCH_SIGNATURE,
            Selector::ExecuteOrder => EXECUTE_ORDER_SIGNATURE,
        }
    }

    fn entry_for(id: [u8; 4]) -> Option<Selector> {
        [
            Selector::CreateMatch,
            Selector::CancelMatch,
            Selector::ExecuteMatch,
            Selector::ExecuteOrder,
        ]
        .into_iter()
        .find(|entry| function_id(Self::entry_signature(*entry)) == id)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = function_id(Self::entry_signature(self.entry)).to_vec();
        data.extend_from_slice(&abi::encode(&[
            Token::Bytes(self.payload.message.clone()),
            Token::BytesArray(self.payload.signatures.clone()),
        ]));
        data
    }

    /// Decode call data.
    ///
    /// # Errors
    /// - `SilentRevert` if the data names no registry entry point
    /// - `MalformedMessage` if the arguments do not decode
    pub fn decode(data: &[u8]) -> Result<Self> {
        let Some((id, args)) = data.split_first_chunk::<4>() else {
            return Err(BridgeError::SilentRevert);
        };
        let entry = Self::entry_for(*id).ok_or(BridgeError::SilentRevert)?;

        let reader = AbiReader::new(args);
        reader.expect_head(2)?;
        Ok(Self::new(entry, reader.bytes(0)?, reader.bytes_array(1)?))
    }
}
