//! ABI word codec.
//!
//! Signed messages are ABI-encoded tuples: every value occupies one 32-byte
//! big-endian word, addresses are left-padded, and dynamic `bytes` /
//! `bytes[]` values live in a tail addressed by offsets in the head.
//! The decoder is strict: any layout it cannot account for is a
//! [`BridgeError::MalformedMessage`].

use primitive_types::U256;

use crate::{Address, BridgeError, Result, constants::WORD_SIZE};

/// One ABI word.
pub type Word = [u8; WORD_SIZE];

#[must_use]
pub fn word_from_u64(value: u64) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

#[must_use]
pub fn word_from_u256(value: U256) -> Word {
    let mut word = [0u8; WORD_SIZE];
    value.to_big_endian(&mut word);
    word
}

#[must_use]
pub fn word_from_address(address: Address) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// A value to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any static value already rendered as a word.
    Word(Word),
    /// Dynamic `bytes`.
    Bytes(Vec<u8>),
    /// Dynamic `bytes[]`.
    BytesArray(Vec<Vec<u8>>),
}

/// Encode a tuple of tokens (`abi.encode(a, b, ...)`).
#[must_use]
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD_SIZE;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Word(word) => head.extend_from_slice(word),
            Token::Bytes(data) => {
                head.extend_from_slice(&word_from_u64((head_len + tail.len()) as u64));
                tail.extend_from_slice(&encode_bytes_tail(data));
            }
            Token::BytesArray(items) => {
                head.extend_from_slice(&word_from_u64((head_len + tail.len()) as u64));
                tail.extend_from_slice(&encode_bytes_array_tail(items));
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}

fn encode_bytes_tail(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD_SIZE + padded_len(data.len()));
    out.extend_from_slice(&word_from_u64(data.len() as u64));
    out.extend_from_slice(data);
    out.resize(WORD_SIZE + padded_len(data.len()), 0);
    out
}

fn encode_bytes_array_tail(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&word_from_u64(items.len() as u64));

    // Offsets are relative to the first word after the length.
    let heads_len = items.len() * WORD_SIZE;
    let mut bodies = Vec::new();
    for item in items {
        out.extend_from_slice(&word_from_u64((heads_len + bodies.len()) as u64));
        bodies.extend_from_slice(&encode_bytes_tail(item));
    }
    out.extend_from_slice(&bodies);
    out
}

/// Strict reader over an encoded tuple.
#[derive(Debug, Clone, Copy)]
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Require the payload to be exactly `words` static words.
    pub fn expect_static(&self, words: usize) -> Result<()> {
        let expected = words * WORD_SIZE;
        if self.data.len() != expected {
            return Err(BridgeError::malformed(format!(
                "expected {expected} bytes, got {}",
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Require at least `words` head words (dynamic tuples).
    pub fn expect_head(&self, words: usize) -> Result<()> {
        if self.data.len() < words * WORD_SIZE {
            return Err(BridgeError::malformed(format!(
                "expected at least {} bytes, got {}",
                words * WORD_SIZE,
                self.data.len()
            )));
        }
        Ok(())
    }

    fn word_at(&self, byte_offset: usize) -> Result<Word> {
        let end = byte_offset
            .checked_add(WORD_SIZE)
            .ok_or_else(|| BridgeError::malformed("offset overflow"))?;
        let slice = self
            .data
            .get(byte_offset..end)
            .ok_or_else(|| BridgeError::malformed(format!("no word at byte {byte_offset}")))?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(slice);
        Ok(word)
    }

    /// Head word at `index`.
    pub fn word(&self, index: usize) -> Result<Word> {
        self.word_at(index * WORD_SIZE)
    }

    pub fn uint256(&self, index: usize) -> Result<U256> {
        Ok(U256::from_big_endian(&self.word(index)?))
    }

    pub fn uint64(&self, index: usize) -> Result<u64> {
        word_to_u64(&self.word(index)?)
            .ok_or_else(|| BridgeError::malformed(format!("word {index} overflows u64")))
    }

    pub fn uint8(&self, index: usize) -> Result<u8> {
        let word = self.word(index)?;
        if word[..31].iter().any(|b| *b != 0) {
            return Err(BridgeError::malformed(format!("word {index} overflows u8")));
        }
        Ok(word[31])
    }

    pub fn address(&self, index: usize) -> Result<Address> {
        let word = self.word(index)?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(BridgeError::malformed(format!(
                "word {index} is not a left-padded address"
            )));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address(bytes))
    }

    fn usize_at(&self, byte_offset: usize) -> Result<usize> {
        word_to_u64(&self.word_at(byte_offset)?)
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| BridgeError::malformed(format!("length at byte {byte_offset} too large")))
    }

    fn bytes_at(&self, byte_offset: usize) -> Result<Vec<u8>> {
        let len = self.usize_at(byte_offset)?;
        if len > self.data.len() {
            return Err(BridgeError::malformed(format!("bytes length {len} too large")));
        }
        let start = byte_offset + WORD_SIZE;
        let end = start
            .checked_add(padded_len(len))
            .ok_or_else(|| BridgeError::malformed("bytes length overflow"))?;
        if end > self.data.len() {
            return Err(BridgeError::malformed(format!(
                "bytes at {byte_offset} run past end of payload"
            )));
        }
        Ok(self.data[start..start + len].to_vec())
    }

    /// Dynamic `bytes` whose offset sits in head word `index`.
    pub fn bytes(&self, index: usize) -> Result<Vec<u8>> {
        let offset = self.usize_at(index * WORD_SIZE)?;
        self.bytes_at(offset)
    }

    /// Dynamic `bytes[]` whose offset sits in head word `index`.
    pub fn bytes_array(&self, index: usize) -> Result<Vec<Vec<u8>>> {
        let offset = self.usize_at(index * WORD_SIZE)?;
        let count = self.usize_at(offset)?;
        let base = offset + WORD_SIZE;
        if count > self.data.len() / WORD_SIZE {
            return Err(BridgeError::malformed(format!("array length {count} too large")));
        }
        (0..count)
            .map(|i| {
                let relative = self.usize_at(base + i * WORD_SIZE)?;
                let item_offset = base
                    .checked_add(relative)
                    .ok_or_else(|| BridgeError::malformed("array offset overflow"))?;
                self.bytes_at(item_offset)
            })
            .collect()
    }
}

fn word_to_u64(word: &Word) -> Option<u64> {
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..]);
    Some(u64::from_be_bytes(bytes))
}
