//! Single-block codec — the variable-layout heart of the format.
//!
//! # Wire layout
//! Every block starts with its plaintext 32-bit key (LE).  Everything after
//! the key is XOR-scrambled against a keystream seeded with that key, in
//! strict read order:
//!
//! ```text
//! u32 key | type tag (1 B)
//!         | object:  length (4 B, word-XORed) | payload (byte-XORed)
//!         | array:   count (4 B, word-XORed) | element tag (1 B) | payload
//!         | scalar:  payload (fixed width, byte-XORed)
//!         | boolean: nothing — the value lives in the tag itself
//! ```
//!
//! Encoding replays the same keystream at the same positions, so encode is
//! the exact algebraic inverse of decode for an unmodified block.
//!
//! # Mutation rules
//! A decoded block is immutable except for two size-preserving edits:
//! replacing the payload with an equal-length buffer, and toggling between
//! the two concrete boolean tags.  Everything else is rejected.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::keystream::XorShift32;
use crate::typecode::{ScalarValue, TypeCode};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlockError {
    /// The buffer ended before the named field was fully readable.
    #[error("input truncated while reading {0}")]
    Truncated(&'static str),
    #[error("unknown type code 0x{0:02X}")]
    UnknownTypeCode(u8),
    #[error("payload size mismatch: block holds {have} bytes, got {got}")]
    SizeMismatch { have: usize, got: usize },
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}

/// Concrete state of a boolean block.  `False` and `True` are the two tags
/// a standalone block normally carries; `Either` is the tri-state element
/// tag, which also appears standalone in real saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolKind {
    False,
    True,
    Either,
}

impl BoolKind {
    fn type_code(self) -> TypeCode {
        match self {
            BoolKind::False  => TypeCode::Bool1,
            BoolKind::True   => TypeCode::Bool2,
            BoolKind::Either => TypeCode::Bool3,
        }
    }
}

/// Payload of a block, one case per tag group.  Illegal combinations
/// (a boxed value on an object, an unsized array element tag) are
/// unrepresentable by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Bool(BoolKind),
    Object(Vec<u8>),
    Array { element: TypeCode, data: Vec<u8> },
    Scalar { code: TypeCode, data: Vec<u8> },
}

/// One keyed, typed, length-determined unit of the container format.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    key:  u32,
    body: Body,
}

impl Block {
    // ── Construction ─────────────────────────────────────────────────────────

    pub fn new_bool(key: u32, kind: BoolKind) -> Self {
        Self { key, body: Body::Bool(kind) }
    }

    pub fn new_object(key: u32, data: Vec<u8>) -> Self {
        Self { key, body: Body::Object(data) }
    }

    /// Build an array block.  The element tag must have a fixed width and
    /// the data length must be an exact multiple of it.
    pub fn new_array(key: u32, element: TypeCode, data: Vec<u8>) -> Result<Self, BlockError> {
        let size = element
            .element_size()
            .ok_or(BlockError::InvalidOperation("array element tag has no fixed width"))?;
        if data.len() % size != 0 {
            return Err(BlockError::SizeMismatch {
                have: data.len() / size * size,
                got:  data.len(),
            });
        }
        Ok(Self { key, body: Body::Array { element, data } })
    }

    pub fn new_scalar(key: u32, value: ScalarValue) -> Self {
        let code = value.type_code();
        // element_size is Some for every scalar tag.
        let mut data = vec![0u8; code.element_size().unwrap_or(0)];
        value.write_to(&mut data);
        Self { key, body: Body::Scalar { code, data } }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn key(&self) -> u32 {
        self.key
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The wire tag this block encodes as.
    pub fn type_code(&self) -> TypeCode {
        match &self.body {
            Body::Bool(kind)          => kind.type_code(),
            Body::Object(_)           => TypeCode::Object,
            Body::Array { .. }        => TypeCode::Array,
            Body::Scalar { code, .. } => *code,
        }
    }

    /// Element tag, for array blocks only.
    pub fn sub_type(&self) -> Option<TypeCode> {
        match &self.body {
            Body::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Raw payload bytes.  Empty for boolean blocks.
    pub fn payload(&self) -> &[u8] {
        match &self.body {
            Body::Bool(_)             => &[],
            Body::Object(data)        => data,
            Body::Array { data, .. }  => data,
            Body::Scalar { data, .. } => data,
        }
    }

    // ── Value access (scalar blocks only) ────────────────────────────────────

    /// Boxed scalar value.  Errors for booleans, objects and arrays.
    pub fn value(&self) -> Result<ScalarValue, BlockError> {
        match &self.body {
            Body::Scalar { code, data } => code
                .read_value(data)
                .ok_or(BlockError::InvalidOperation("scalar payload shorter than its width")),
            _ => Err(BlockError::InvalidOperation("block does not hold a single scalar value")),
        }
    }

    /// Overwrite the scalar value.  The incoming variant must match the
    /// block's tag exactly; width or sign changes are rejected.
    pub fn set_value(&mut self, value: ScalarValue) -> Result<(), BlockError> {
        match &mut self.body {
            Body::Scalar { code, data } => {
                if value.type_code() != *code {
                    return Err(BlockError::InvalidOperation(
                        "value does not match the block's scalar tag",
                    ));
                }
                value.write_to(data);
                Ok(())
            }
            _ => Err(BlockError::InvalidOperation("block does not hold a single scalar value")),
        }
    }

    // ── Size-preserving mutation ─────────────────────────────────────────────

    /// Replace the payload with an equal-length buffer.
    pub fn replace_payload(&mut self, new: &[u8]) -> Result<(), BlockError> {
        let have = self.payload().len();
        if new.len() != have {
            return Err(BlockError::SizeMismatch { have, got: new.len() });
        }
        match &mut self.body {
            Body::Bool(_) => {} // zero-length payload; nothing to copy
            Body::Object(data)
            | Body::Array { data, .. }
            | Body::Scalar { data, .. } => data.copy_from_slice(new),
        }
        Ok(())
    }

    /// Toggle between the two concrete boolean tags.  The tri-state tag is
    /// never a legal source or target of this edit.
    pub fn set_boolean(&mut self, kind: BoolKind) -> Result<(), BlockError> {
        let Body::Bool(current) = &self.body else {
            return Err(BlockError::InvalidOperation("block is not a boolean"));
        };
        if *current == BoolKind::Either || kind == BoolKind::Either {
            return Err(BlockError::InvalidOperation("tri-state booleans cannot be retagged"));
        }
        self.body = Body::Bool(kind);
        Ok(())
    }
}

// ── Decode ───────────────────────────────────────────────────────────────────

/// Decode one block at `*offset`, advancing the offset past it.
pub fn read_block(data: &[u8], offset: &mut usize) -> Result<Block, BlockError> {
    let key = read_u32(data, offset, "block key")?;
    let mut ks = XorShift32::new(key);

    let tag_raw = read_u8(data, offset, "type tag")? ^ ks.next_byte();
    let tag = TypeCode::from_u8(tag_raw).ok_or(BlockError::UnknownTypeCode(tag_raw))?;

    match tag {
        TypeCode::Bool1 => Ok(Block::new_bool(key, BoolKind::False)),
        TypeCode::Bool2 => Ok(Block::new_bool(key, BoolKind::True)),
        TypeCode::Bool3 => Ok(Block::new_bool(key, BoolKind::Either)),

        TypeCode::Object => {
            let len = (read_u32(data, offset, "object length")? ^ ks.next_word()) as usize;
            let payload = read_payload(data, offset, len, &mut ks, "object payload")?;
            Ok(Block::new_object(key, payload))
        }

        TypeCode::Array => {
            let count = (read_u32(data, offset, "array entry count")? ^ ks.next_word()) as usize;
            let sub_raw = read_u8(data, offset, "array element tag")? ^ ks.next_byte();
            let element = TypeCode::from_u8(sub_raw).ok_or(BlockError::UnknownTypeCode(sub_raw))?;
            // Container tags and payload-free booleans have no element width;
            // without one the array's extent is undefined.  Hard failure.
            let size = element.element_size().ok_or(BlockError::UnknownTypeCode(sub_raw))?;
            let len = count
                .checked_mul(size)
                .ok_or(BlockError::Truncated("array payload"))?;
            let payload = read_payload(data, offset, len, &mut ks, "array payload")?;
            warn_on_strange_array(key, element, &payload);
            Block::new_array(key, element, payload)
        }

        scalar => {
            // All remaining tags are fixed-width scalars.
            let size = scalar.element_size().ok_or(BlockError::UnknownTypeCode(tag_raw))?;
            let data = read_payload(data, offset, size, &mut ks, "scalar payload")?;
            Ok(Block { key, body: Body::Scalar { code: scalar, data } })
        }
    }
}

/// Decoded tri-state element values outside {0, 1, 2} show up in some
/// real-world saves; tolerate them but leave a trace.
fn warn_on_strange_array(key: u32, element: TypeCode, payload: &[u8]) {
    if element == TypeCode::Bool3 {
        if let Some(v) = payload.iter().find(|&&b| b > 2) {
            tracing::warn!("block {key:08X}: tri-state array holds out-of-range value {v}");
        }
    }
}

fn read_u8(data: &[u8], offset: &mut usize, field: &'static str) -> Result<u8, BlockError> {
    let byte = *data.get(*offset).ok_or(BlockError::Truncated(field))?;
    *offset += 1;
    Ok(byte)
}

fn read_u32(data: &[u8], offset: &mut usize, field: &'static str) -> Result<u32, BlockError> {
    let end = offset.checked_add(4).ok_or(BlockError::Truncated(field))?;
    let bytes = data.get(*offset..end).ok_or(BlockError::Truncated(field))?;
    *offset = end;
    Ok(LittleEndian::read_u32(bytes))
}

fn read_payload(
    data: &[u8],
    offset: &mut usize,
    len: usize,
    ks: &mut XorShift32,
    field: &'static str,
) -> Result<Vec<u8>, BlockError> {
    let end = offset.checked_add(len).ok_or(BlockError::Truncated(field))?;
    let bytes = data.get(*offset..end).ok_or(BlockError::Truncated(field))?;
    *offset = end;
    Ok(bytes.iter().map(|b| b ^ ks.next_byte()).collect())
}

// ── Encode ───────────────────────────────────────────────────────────────────

/// Append the block's encoded bytes (key-prefixed) to `out`.
///
/// Produces exactly the byte sequence [`read_block`] would consume,
/// XOR-ing the same keystream at the same positions.
pub fn write_block(block: &Block, out: &mut Vec<u8>) {
    let mut ks = XorShift32::new(block.key);
    out.extend_from_slice(&block.key.to_le_bytes());
    out.push(block.type_code() as u8 ^ ks.next_byte());

    match &block.body {
        Body::Bool(_) => {}

        Body::Object(data) => {
            out.extend_from_slice(&((data.len() as u32) ^ ks.next_word()).to_le_bytes());
            out.extend(data.iter().map(|b| b ^ ks.next_byte()));
        }

        Body::Array { element, data } => {
            // Invariant from construction: the element tag is sized and the
            // data length is an exact multiple of its width.
            let size = element.element_size().unwrap_or(1);
            let count = (data.len() / size) as u32;
            out.extend_from_slice(&(count ^ ks.next_word()).to_le_bytes());
            out.push(*element as u8 ^ ks.next_byte());
            out.extend(data.iter().map(|b| b ^ ks.next_byte()));
        }

        Body::Scalar { data, .. } => {
            out.extend(data.iter().map(|b| b ^ ks.next_byte()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_retag_rules() {
        let mut b = Block::new_bool(7, BoolKind::False);
        b.set_boolean(BoolKind::True).unwrap();
        assert_eq!(b.type_code(), TypeCode::Bool2);
        assert_eq!(
            b.set_boolean(BoolKind::Either),
            Err(BlockError::InvalidOperation("tri-state booleans cannot be retagged")),
        );
        let mut tri = Block::new_bool(7, BoolKind::Either);
        assert!(tri.set_boolean(BoolKind::True).is_err());
        let mut obj = Block::new_object(7, vec![1, 2]);
        assert_eq!(
            obj.set_boolean(BoolKind::True),
            Err(BlockError::InvalidOperation("block is not a boolean")),
        );
    }

    #[test]
    fn array_constructor_rejects_unsized_elements() {
        assert!(Block::new_array(1, TypeCode::Object, vec![]).is_err());
        assert!(Block::new_array(1, TypeCode::Array, vec![]).is_err());
        assert!(Block::new_array(1, TypeCode::Bool1, vec![]).is_err());
        assert!(Block::new_array(1, TypeCode::Bool3, vec![0, 1, 2]).is_ok());
        assert!(Block::new_array(1, TypeCode::UInt32, vec![0; 6]).is_err());
    }

    #[test]
    fn single_block_round_trip() {
        let original = Block::new_object(0xCAFEBABE, b"opaque payload".to_vec());
        let mut wire = Vec::new();
        write_block(&original, &mut wire);

        let mut offset = 0;
        let decoded = read_block(&wire, &mut offset).unwrap();
        assert_eq!(offset, wire.len());
        assert_eq!(decoded, original);
    }
}
