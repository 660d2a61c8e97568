//! Keyed lookup over a decoded block sequence.
//!
//! Blocks are indexed under the 8-hex-digit uppercase rendering of their
//! 32-bit key.  A caller may look a block up three ways — by raw integer,
//! by a well-known symbolic key, or by an arbitrary name, which is hashed
//! with FNV-1a (32-bit) before lookup — and all three resolve identically
//! when they denote the same underlying key.
//!
//! Duplicate keys are legal on the wire; index construction resolves them
//! last-write-wins, matching the order the game itself applies blocks.

use std::collections::HashMap;

use thiserror::Error;

use crate::block::{Block, BlockError};
use crate::profile::KnownKey;
use crate::typecode::ScalarValue;

// ── FNV-1a ───────────────────────────────────────────────────────────────────

pub const FNV_OFFSET_BASIS_32: u32 = 0x811C_9DC5;
pub const FNV_PRIME_32:        u32 = 0x0100_0193;

pub const FNV_OFFSET_BASIS_64: u64 = 0xCBF2_9CE4_8422_2645;
pub const FNV_PRIME_64:        u64 = 0x0000_0100_0000_01B3;

/// FNV-1a 32-bit hash of a name's UTF-8 bytes.
pub fn fnv1a_32(name: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS_32;
    for &byte in name.as_bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME_32);
    }
    hash
}

/// FNV-1a 64-bit hash of a name's UTF-8 bytes.
pub fn fnv1a_64(name: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS_64;
    for &byte in name.as_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME_64);
    }
    hash
}

// ── Key rendering and lookup arguments ───────────────────────────────────────

/// Canonical index rendering of a block key: 8 uppercase hex digits.
pub fn render_key(key: u32) -> String {
    format!("{key:08X}")
}

/// How a caller names a block.  Every variant resolves to a 32-bit key.
#[derive(Debug, Clone, Copy)]
pub enum BlockKey<'a> {
    /// A raw 32-bit key.
    Raw(u32),
    /// A pre-defined well-known record key.
    Known(KnownKey),
    /// An arbitrary name, hashed with FNV-1a before lookup.
    Name(&'a str),
}

impl BlockKey<'_> {
    fn resolve(self) -> u32 {
        match self {
            BlockKey::Raw(key)    => key,
            BlockKey::Known(key)  => key.key(),
            BlockKey::Name(name)  => fnv1a_32(name),
        }
    }
}

impl From<u32> for BlockKey<'_> {
    fn from(key: u32) -> Self {
        BlockKey::Raw(key)
    }
}

impl From<KnownKey> for BlockKey<'_> {
    fn from(key: KnownKey) -> Self {
        BlockKey::Known(key)
    }
}

impl<'a> From<&'a str> for BlockKey<'a> {
    fn from(name: &'a str) -> Self {
        BlockKey::Name(name)
    }
}

// ── KeyedIndex ───────────────────────────────────────────────────────────────

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IndexError {
    #[error("no block under key {0}")]
    KeyNotFound(String),
    /// The lookup argument itself is malformed, distinct from a plain miss.
    #[error("malformed key {0:?}: expected 8 hex digits")]
    InvalidKey(String),
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Owning lookup structure over an ordered block sequence.
///
/// The sequence order is preserved (it is significant on the wire), so the
/// index can be handed back to [`crate::swish::encrypt`] unchanged.
pub struct KeyedIndex {
    blocks: Vec<Block>,
    by_key: HashMap<String, usize>,
}

impl KeyedIndex {
    /// Build the index.  Later blocks with a duplicate key shadow earlier
    /// ones; the blocks themselves are all retained for re-encoding.
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut by_key = HashMap::with_capacity(blocks.len());
        for (position, block) in blocks.iter().enumerate() {
            by_key.insert(render_key(block.key()), position);
        }
        Self { blocks, by_key }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The underlying sequence, in wire order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Give the sequence back, e.g. for re-encoding.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn contains<'k, K: Into<BlockKey<'k>>>(&self, key: K) -> bool {
        self.by_key.contains_key(&render_key(key.into().resolve()))
    }

    pub fn get<'k, K: Into<BlockKey<'k>>>(&self, key: K) -> Result<&Block, IndexError> {
        let rendered = render_key(key.into().resolve());
        let position = *self
            .by_key
            .get(&rendered)
            .ok_or(IndexError::KeyNotFound(rendered))?;
        Ok(&self.blocks[position])
    }

    pub fn get_mut<'k, K: Into<BlockKey<'k>>>(&mut self, key: K) -> Result<&mut Block, IndexError> {
        let rendered = render_key(key.into().resolve());
        let position = *self
            .by_key
            .get(&rendered)
            .ok_or(IndexError::KeyNotFound(rendered))?;
        Ok(&mut self.blocks[position])
    }

    /// Look up by an already-rendered key string.  Case-insensitive, but the
    /// argument must be exactly 8 hex digits.
    pub fn get_hex(&self, rendered: &str) -> Result<&Block, IndexError> {
        let key = parse_hex_key(rendered)?;
        self.get(key)
    }

    /// Overwrite a scalar block's value through the index.
    pub fn set_value<'k, K: Into<BlockKey<'k>>>(
        &mut self,
        key: K,
        value: ScalarValue,
    ) -> Result<(), IndexError> {
        self.get_mut(key)?.set_value(value).map_err(IndexError::from)
    }

    /// Replace a block's raw payload through the index (same length only).
    pub fn replace_payload<'k, K: Into<BlockKey<'k>>>(
        &mut self,
        key: K,
        payload: &[u8],
    ) -> Result<(), IndexError> {
        self.get_mut(key)?
            .replace_payload(payload)
            .map_err(IndexError::from)
    }
}

fn parse_hex_key(rendered: &str) -> Result<u32, IndexError> {
    if rendered.len() != 8 || !rendered.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IndexError::InvalidKey(rendered.to_owned()));
    }
    u32::from_str_radix(rendered, 16).map_err(|_| IndexError::InvalidKey(rendered.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BoolKind;

    #[test]
    fn fnv1a_32_reference_vectors() {
        assert_eq!(fnv1a_32(""), 0x811C_9DC5);
        assert_eq!(fnv1a_32("a"), 0xE40C_292C);
        assert_eq!(fnv1a_32("foobar"), 0xBF9C_F968);
    }

    #[test]
    fn fnv1a_64_reference_vectors() {
        assert_eq!(fnv1a_64(""), 0xCBF2_9CE4_8422_2645);
        assert_eq!(fnv1a_64("a"), 0xAF66_BC4C_8606_CF2C);
        assert_eq!(fnv1a_64("foobar"), 0x09D3_072C_DA4F_5808);
    }

    #[test]
    fn key_rendering_is_uppercase_zero_padded() {
        assert_eq!(render_key(0xAB), "000000AB");
        assert_eq!(render_key(0xDEADBEEF), "DEADBEEF");
    }

    #[test]
    fn duplicate_keys_resolve_last_write_wins() {
        let blocks = vec![
            Block::new_bool(0x11, BoolKind::False),
            Block::new_bool(0x11, BoolKind::True),
        ];
        let index = KeyedIndex::new(blocks);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(0x11u32).unwrap().type_code(), crate::TypeCode::Bool2);
    }

    #[test]
    fn malformed_hex_is_not_a_miss() {
        let index = KeyedIndex::new(vec![]);
        assert!(matches!(index.get_hex("xyz"), Err(IndexError::InvalidKey(_))));
        assert!(matches!(index.get_hex("1234"), Err(IndexError::InvalidKey(_))));
        assert!(matches!(index.get_hex("00000000"), Err(IndexError::KeyNotFound(_))));
    }

    #[test]
    fn hex_lookup_is_case_insensitive() {
        let index = KeyedIndex::new(vec![Block::new_bool(0xDEADBEEF, BoolKind::True)]);
        assert!(index.get_hex("deadbeef").is_ok());
        assert!(index.get_hex("DEADBEEF").is_ok());
    }
}
