//! The facade's signed execute message.
//!
//! `(selector, chainId, relayer, token, commission, receiver, coreData)`,
//! ABI-encoded with `coreData` as dynamic `bytes`. `coreData` is the encoded
//! registry call to forward.

use bridgebook_types::{
    Address, BridgeError, ChainId, Result, U256,
    abi::{self, AbiReader, Token, word_from_address, word_from_u64, word_from_u256},
};

/// The only selector the facade accepts.
pub const EXECUTE_SELECTOR: u8 = 0;

const HEAD_WORDS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteMessage {
    pub selector: u8,
    pub chain_id: ChainId,
    /// Facade instance the message is addressed to.
    pub relayer: Address,
    /// Asset whose received amount the commission is taken from.
    pub token: Address,
    /// Fixed-point share kept by the facade; 10^27 is 100%.
    pub commission: U256,
    pub receiver: Address,
    pub core_data: Vec<u8>,
}

impl ExecuteMessage {
    #[must_use]
    pub fn new(
        chain_id: ChainId,
        relayer: Address,
        token: Address,
        commission: U256,
        receiver: Address,
        core_data: Vec<u8>,
    ) -> Self {
        Self {
            selector: EXECUTE_SELECTOR,
            chain_id,
            relayer,
            token,
            commission,
            receiver,
            core_data,
        }
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        abi::encode(&[
            Token::Word(word_from_u64(self.selector.into())),
            Token::Word(word_from_u64(self.chain_id.0)),
            Token::Word(word_from_address(self.relayer)),
            Token::Word(word_from_address(self.token)),
            Token::Word(word_from_u256(self.commission)),
            Token::Word(word_from_address(self.receiver)),
            Token::Bytes(self.core_data.clone()),
        ])
    }

    /// Decode a canonically encoded message.
    ///
    /// # Errors
    /// `MalformedMessage` if any field fails to decode or the bytes are not
    /// the canonical encoding of what they decode to.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let reader = AbiReader::new(data);
        reader.expect_head(HEAD_WORDS)?;
        let message = Self {
            selector: reader.uint8(0)?,
            chain_id: ChainId(reader.uint64(1)?),
            relayer: reader.address(2)?,
            token: reader.address(3)?,
            commission: reader.uint256(4)?,
            receiver: reader.address(5)?,
            core_data: reader.bytes(6)?,
        };
        if message.encode() != data {
            return Err(BridgeError::malformed("non-canonical execute message"));
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExecuteMessage {
        ExecuteMessage::new(
            ChainId(31337),
            Address::repeat_byte(0xcc),
            Address::NATIVE,
            U256::exp10(26),
            Address::repeat_byte(1),
            vec![0xde, 0xad, 0xbe, 0xef, 1, 2, 3],
        )
    }

    #[test]
    fn layout_has_seven_head_words() {
        let bytes = sample().encode();
        // head + length word + one padded data word
        assert_eq!(bytes.len(), 32 * (7 + 1 + 1));
        assert_eq!(bytes[32 * 6 + 31], 7 * 32, "core data offset");
        assert_eq!(ExecuteMessage::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn empty_core_data() {
        let mut msg = sample();
        msg.core_data.clear();
        let back = ExecuteMessage::decode(&msg.encode()).unwrap();
        assert!(back.core_data.is_empty());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = sample().encode();
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(matches!(
            ExecuteMessage::decode(&bytes).unwrap_err(),
            BridgeError::MalformedMessage { .. }
        ));
    }

    #[test]
    fn short_head_rejected() {
        assert!(ExecuteMessage::decode(&[0u8; 200]).is_err());
    }
}
