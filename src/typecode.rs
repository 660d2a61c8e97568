//! Type table: the closed set of block type tags and their wire layouts.
//!
//! Tags 1–3 are booleans (false / true / tri-state) with no payload; the
//! tri-state variant is legal only as an array element tag.  Tag 4 is an
//! opaque length-prefixed object, tag 5 a counted homogeneous array.  Tags
//! 8–17 are fixed-size scalars stored little-endian (two's complement for
//! integers, IEEE-754 for floats).  Tag values 0, 6 and 7 are unassigned
//! and must be rejected on decode.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::fmt;

/// Wire tag of a block (or of an array element).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeCode {
    Bool1  = 1,
    Bool2  = 2,
    Bool3  = 3,
    Object = 4,
    Array  = 5,
    Byte   = 8,
    UInt16 = 9,
    UInt32 = 10,
    UInt64 = 11,
    SByte  = 12,
    Int16  = 13,
    Int32  = 14,
    Int64  = 15,
    Single = 16,
    Double = 17,
}

impl TypeCode {
    /// Resolve a decrypted tag byte.  Returns `None` for unassigned values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1  => Some(TypeCode::Bool1),
            2  => Some(TypeCode::Bool2),
            3  => Some(TypeCode::Bool3),
            4  => Some(TypeCode::Object),
            5  => Some(TypeCode::Array),
            8  => Some(TypeCode::Byte),
            9  => Some(TypeCode::UInt16),
            10 => Some(TypeCode::UInt32),
            11 => Some(TypeCode::UInt64),
            12 => Some(TypeCode::SByte),
            13 => Some(TypeCode::Int16),
            14 => Some(TypeCode::Int32),
            15 => Some(TypeCode::Int64),
            16 => Some(TypeCode::Single),
            17 => Some(TypeCode::Double),
            _  => None,
        }
    }

    /// Fixed byte width of a value of this tag, when it has one.
    ///
    /// The tri-state boolean occupies one byte, but only inside arrays.
    /// Standalone booleans, objects and arrays have no fixed element size.
    pub fn element_size(self) -> Option<usize> {
        match self {
            TypeCode::Bool3                                      => Some(1),
            TypeCode::Byte   | TypeCode::SByte                   => Some(1),
            TypeCode::UInt16 | TypeCode::Int16                   => Some(2),
            TypeCode::UInt32 | TypeCode::Int32 | TypeCode::Single => Some(4),
            TypeCode::UInt64 | TypeCode::Int64 | TypeCode::Double => Some(8),
            TypeCode::Bool1 | TypeCode::Bool2
            | TypeCode::Object | TypeCode::Array                 => None,
        }
    }

    /// True only for the ten numeric tags.  Booleans, objects and arrays do
    /// not expose a boxed value.
    pub fn is_scalar(self) -> bool {
        (self as u8) > (TypeCode::Array as u8)
    }

    /// True for any of the three boolean tags.
    pub fn is_boolean(self) -> bool {
        matches!(self, TypeCode::Bool1 | TypeCode::Bool2 | TypeCode::Bool3)
    }

    /// Human-readable name (for diagnostics only — never parsed back).
    pub fn name(self) -> &'static str {
        match self {
            TypeCode::Bool1  => "bool(false)",
            TypeCode::Bool2  => "bool(true)",
            TypeCode::Bool3  => "bool(tri)",
            TypeCode::Object => "object",
            TypeCode::Array  => "array",
            TypeCode::Byte   => "u8",
            TypeCode::UInt16 => "u16",
            TypeCode::UInt32 => "u32",
            TypeCode::UInt64 => "u64",
            TypeCode::SByte  => "i8",
            TypeCode::Int16  => "i16",
            TypeCode::Int32  => "i32",
            TypeCode::Int64  => "i64",
            TypeCode::Single => "f32",
            TypeCode::Double => "f64",
        }
    }

    /// Decode the scalar stored in `data`.  Returns `None` for non-scalar
    /// tags or when `data` is shorter than the tag's width.
    pub fn read_value(self, data: &[u8]) -> Option<ScalarValue> {
        if data.len() < self.element_size()? {
            return None;
        }
        let value = match self {
            TypeCode::Byte   => ScalarValue::Byte(data[0]),
            TypeCode::UInt16 => ScalarValue::UInt16(LittleEndian::read_u16(data)),
            TypeCode::UInt32 => ScalarValue::UInt32(LittleEndian::read_u32(data)),
            TypeCode::UInt64 => ScalarValue::UInt64(LittleEndian::read_u64(data)),
            TypeCode::SByte  => ScalarValue::SByte(data[0] as i8),
            TypeCode::Int16  => ScalarValue::Int16(LittleEndian::read_i16(data)),
            TypeCode::Int32  => ScalarValue::Int32(LittleEndian::read_i32(data)),
            TypeCode::Int64  => ScalarValue::Int64(LittleEndian::read_i64(data)),
            TypeCode::Single => ScalarValue::Single(LittleEndian::read_f32(data)),
            TypeCode::Double => ScalarValue::Double(LittleEndian::read_f64(data)),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boxed scalar value of a block.  The variant carries the width and
/// signedness, so a value can only be written back to a block of the
/// matching tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Byte(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
}

impl ScalarValue {
    /// The scalar tag this value encodes as.
    pub fn type_code(self) -> TypeCode {
        match self {
            ScalarValue::Byte(_)   => TypeCode::Byte,
            ScalarValue::UInt16(_) => TypeCode::UInt16,
            ScalarValue::UInt32(_) => TypeCode::UInt32,
            ScalarValue::UInt64(_) => TypeCode::UInt64,
            ScalarValue::SByte(_)  => TypeCode::SByte,
            ScalarValue::Int16(_)  => TypeCode::Int16,
            ScalarValue::Int32(_)  => TypeCode::Int32,
            ScalarValue::Int64(_)  => TypeCode::Int64,
            ScalarValue::Single(_) => TypeCode::Single,
            ScalarValue::Double(_) => TypeCode::Double,
        }
    }

    /// Serialize into `data`, which must be at least as wide as the value.
    pub fn write_to(self, data: &mut [u8]) {
        match self {
            ScalarValue::Byte(v)   => data[0] = v,
            ScalarValue::UInt16(v) => LittleEndian::write_u16(data, v),
            ScalarValue::UInt32(v) => LittleEndian::write_u32(data, v),
            ScalarValue::UInt64(v) => LittleEndian::write_u64(data, v),
            ScalarValue::SByte(v)  => data[0] = v as u8,
            ScalarValue::Int16(v)  => LittleEndian::write_i16(data, v),
            ScalarValue::Int32(v)  => LittleEndian::write_i32(data, v),
            ScalarValue::Int64(v)  => LittleEndian::write_i64(data, v),
            ScalarValue::Single(v) => LittleEndian::write_f32(data, v),
            ScalarValue::Double(v) => LittleEndian::write_f64(data, v),
        }
    }

    /// Parse a CLI string as a value of the given scalar tag.
    pub fn parse(code: TypeCode, s: &str) -> Option<Self> {
        let value = match code {
            TypeCode::Byte   => ScalarValue::Byte(s.parse().ok()?),
            TypeCode::UInt16 => ScalarValue::UInt16(s.parse().ok()?),
            TypeCode::UInt32 => ScalarValue::UInt32(s.parse().ok()?),
            TypeCode::UInt64 => ScalarValue::UInt64(s.parse().ok()?),
            TypeCode::SByte  => ScalarValue::SByte(s.parse().ok()?),
            TypeCode::Int16  => ScalarValue::Int16(s.parse().ok()?),
            TypeCode::Int32  => ScalarValue::Int32(s.parse().ok()?),
            TypeCode::Int64  => ScalarValue::Int64(s.parse().ok()?),
            TypeCode::Single => ScalarValue::Single(s.parse().ok()?),
            TypeCode::Double => ScalarValue::Double(s.parse().ok()?),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Byte(v)   => write!(f, "{v}"),
            ScalarValue::UInt16(v) => write!(f, "{v}"),
            ScalarValue::UInt32(v) => write!(f, "{v}"),
            ScalarValue::UInt64(v) => write!(f, "{v}"),
            ScalarValue::SByte(v)  => write!(f, "{v}"),
            ScalarValue::Int16(v)  => write!(f, "{v}"),
            ScalarValue::Int32(v)  => write!(f, "{v}"),
            ScalarValue::Int64(v)  => write!(f, "{v}"),
            ScalarValue::Single(v) => write!(f, "{v}"),
            ScalarValue::Double(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bytes_round_trip() {
        for raw in 0u8..=255 {
            match TypeCode::from_u8(raw) {
                Some(code) => assert_eq!(code as u8, raw),
                None => assert!(raw == 0 || raw == 6 || raw == 7 || raw > 17),
            }
        }
    }

    #[test]
    fn scalar_classification() {
        assert!(TypeCode::Byte.is_scalar());
        assert!(TypeCode::Double.is_scalar());
        assert!(!TypeCode::Bool1.is_scalar());
        assert!(!TypeCode::Bool3.is_scalar());
        assert!(!TypeCode::Object.is_scalar());
        assert!(!TypeCode::Array.is_scalar());
    }

    #[test]
    fn element_sizes() {
        assert_eq!(TypeCode::Bool3.element_size(), Some(1));
        assert_eq!(TypeCode::UInt16.element_size(), Some(2));
        assert_eq!(TypeCode::Single.element_size(), Some(4));
        assert_eq!(TypeCode::Double.element_size(), Some(8));
        assert_eq!(TypeCode::Bool1.element_size(), None);
        assert_eq!(TypeCode::Object.element_size(), None);
        assert_eq!(TypeCode::Array.element_size(), None);
    }

    #[test]
    fn value_round_trip_all_widths() {
        let cases = [
            ScalarValue::Byte(0xFF),
            ScalarValue::UInt16(u16::MAX),
            ScalarValue::UInt32(u32::MAX),
            ScalarValue::UInt64(u64::MAX),
            ScalarValue::SByte(i8::MIN),
            ScalarValue::Int16(i16::MIN),
            ScalarValue::Int32(i32::MIN),
            ScalarValue::Int64(i64::MIN),
            ScalarValue::Single(-1.5),
            ScalarValue::Double(f64::MAX),
        ];
        for value in cases {
            let size = value.type_code().element_size().unwrap();
            let mut buf = vec![0u8; size];
            value.write_to(&mut buf);
            assert_eq!(value.type_code().read_value(&buf), Some(value));
        }
    }

    #[test]
    fn signed_unsigned_reinterpretation_wraps_per_width() {
        // The same bytes read under the opposite signedness wrap exactly
        // once per width: 0xFF.. is MAX unsigned and -1 signed.
        let mut buf = [0u8; 2];
        ScalarValue::UInt16(u16::MAX).write_to(&mut buf);
        assert_eq!(TypeCode::Int16.read_value(&buf), Some(ScalarValue::Int16(-1)));
        let mut buf = [0u8; 1];
        ScalarValue::SByte(-128).write_to(&mut buf);
        assert_eq!(TypeCode::Byte.read_value(&buf), Some(ScalarValue::Byte(0x80)));
    }
}
