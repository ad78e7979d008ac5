//! Built-in types and constant values.

use std::fmt;

use crate::{file::io::read_le, metadata::signatures::ELEMENT_TYPE, Result};

/// The types that signatures encode with a dedicated element type.
///
/// These are represented intrinsically rather than by resolving `System.*` in the core
/// library, so a field of type `int32` reports [`PrimitiveKind::I4`] even when no core library
/// is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.Object - base class for all reference types
    Object,
    /// System.TypedReference
    TypedReference,
}

impl PrimitiveKind {
    /// Maps an element type byte to its primitive, `None` for constructed element types.
    #[must_use]
    pub fn from_element_type(type_byte: u8) -> Option<Self> {
        Some(match type_byte {
            ELEMENT_TYPE::VOID => PrimitiveKind::Void,
            ELEMENT_TYPE::BOOLEAN => PrimitiveKind::Boolean,
            ELEMENT_TYPE::CHAR => PrimitiveKind::Char,
            ELEMENT_TYPE::I1 => PrimitiveKind::I1,
            ELEMENT_TYPE::U1 => PrimitiveKind::U1,
            ELEMENT_TYPE::I2 => PrimitiveKind::I2,
            ELEMENT_TYPE::U2 => PrimitiveKind::U2,
            ELEMENT_TYPE::I4 => PrimitiveKind::I4,
            ELEMENT_TYPE::U4 => PrimitiveKind::U4,
            ELEMENT_TYPE::I8 => PrimitiveKind::I8,
            ELEMENT_TYPE::U8 => PrimitiveKind::U8,
            ELEMENT_TYPE::R4 => PrimitiveKind::R4,
            ELEMENT_TYPE::R8 => PrimitiveKind::R8,
            ELEMENT_TYPE::I => PrimitiveKind::I,
            ELEMENT_TYPE::U => PrimitiveKind::U,
            ELEMENT_TYPE::STRING => PrimitiveKind::String,
            ELEMENT_TYPE::OBJECT => PrimitiveKind::Object,
            ELEMENT_TYPE::TYPEDBYREF => PrimitiveKind::TypedReference,
            _ => return None,
        })
    }

    /// The `System` type name of this primitive.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "Void",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I1 => "SByte",
            PrimitiveKind::U1 => "Byte",
            PrimitiveKind::I2 => "Int16",
            PrimitiveKind::U2 => "UInt16",
            PrimitiveKind::I4 => "Int32",
            PrimitiveKind::U4 => "UInt32",
            PrimitiveKind::I8 => "Int64",
            PrimitiveKind::U8 => "UInt64",
            PrimitiveKind::R4 => "Single",
            PrimitiveKind::R8 => "Double",
            PrimitiveKind::I => "IntPtr",
            PrimitiveKind::U => "UIntPtr",
            PrimitiveKind::String => "String",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::TypedReference => "TypedReference",
        }
    }

    /// Size of a value in bytes, `None` for reference and native-sized types.
    #[must_use]
    pub fn size(&self) -> Option<u32> {
        match self {
            PrimitiveKind::Boolean | PrimitiveKind::I1 | PrimitiveKind::U1 => Some(1),
            PrimitiveKind::Char | PrimitiveKind::I2 | PrimitiveKind::U2 => Some(2),
            PrimitiveKind::I4 | PrimitiveKind::U4 | PrimitiveKind::R4 => Some(4),
            PrimitiveKind::I8 | PrimitiveKind::U8 | PrimitiveKind::R8 => Some(8),
            _ => None,
        }
    }

    /// `true` for value types.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            PrimitiveKind::String | PrimitiveKind::Object | PrimitiveKind::Void
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "System.{}", self.name())
    }
}

/// A default value from the `Constant` table.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// Boolean value
    Boolean(bool),
    /// UTF-16 code unit
    Char(u16),
    /// 8-bit signed integer
    I1(i8),
    /// 8-bit unsigned integer
    U1(u8),
    /// 16-bit signed integer
    I2(i16),
    /// 16-bit unsigned integer
    U2(u16),
    /// 32-bit signed integer
    I4(i32),
    /// 32-bit unsigned integer
    U4(u32),
    /// 64-bit signed integer
    I8(i64),
    /// 64-bit unsigned integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// String value
    String(String),
    /// Null reference (`ELEMENT_TYPE_CLASS` with a zero value)
    Null,
}

impl ConstantValue {
    /// Decodes a constant of element type `type_byte` from its value blob.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the blob is too short, or
    /// [`crate::Error::Malformed`] for an element type that cannot carry a constant.
    pub fn from_blob(type_byte: u8, data: &[u8]) -> Result<Self> {
        match type_byte {
            ELEMENT_TYPE::BOOLEAN => {
                if data.is_empty() {
                    Err(out_of_bounds_error!())
                } else {
                    Ok(ConstantValue::Boolean(data[0] != 0))
                }
            }
            ELEMENT_TYPE::CHAR => Ok(ConstantValue::Char(read_le::<u16>(data)?)),
            ELEMENT_TYPE::I1 => Ok(ConstantValue::I1(read_le::<i8>(data)?)),
            ELEMENT_TYPE::U1 => Ok(ConstantValue::U1(read_le::<u8>(data)?)),
            ELEMENT_TYPE::I2 => Ok(ConstantValue::I2(read_le::<i16>(data)?)),
            ELEMENT_TYPE::U2 => Ok(ConstantValue::U2(read_le::<u16>(data)?)),
            ELEMENT_TYPE::I4 => Ok(ConstantValue::I4(read_le::<i32>(data)?)),
            ELEMENT_TYPE::U4 => Ok(ConstantValue::U4(read_le::<u32>(data)?)),
            ELEMENT_TYPE::I8 => Ok(ConstantValue::I8(read_le::<i64>(data)?)),
            ELEMENT_TYPE::U8 => Ok(ConstantValue::U8(read_le::<u64>(data)?)),
            ELEMENT_TYPE::R4 => Ok(ConstantValue::R4(read_le::<f32>(data)?)),
            ELEMENT_TYPE::R8 => Ok(ConstantValue::R8(read_le::<f64>(data)?)),
            ELEMENT_TYPE::STRING => {
                if data.len() % 2 != 0 {
                    return Err(malformed_error!(
                        "Invalid UTF-16 string length: {} (must be even)",
                        data.len()
                    ));
                }

                let units: Vec<u16> = data
                    .chunks_exact(2)
                    .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
                    .collect();
                Ok(ConstantValue::String(String::from_utf16_lossy(&units)))
            }
            ELEMENT_TYPE::CLASS => Ok(ConstantValue::Null),
            _ => Err(malformed_error!(
                "Invalid constant element type - {:#x}",
                type_byte
            )),
        }
    }

    /// The value widened to `i64`, for integral constants.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstantValue::Boolean(v) => Some(i64::from(*v)),
            ConstantValue::Char(v) | ConstantValue::U2(v) => Some(i64::from(*v)),
            ConstantValue::I1(v) => Some(i64::from(*v)),
            ConstantValue::U1(v) => Some(i64::from(*v)),
            ConstantValue::I2(v) => Some(i64::from(*v)),
            ConstantValue::I4(v) => Some(i64::from(*v)),
            ConstantValue::U4(v) => Some(i64::from(*v)),
            ConstantValue::I8(v) => Some(*v),
            ConstantValue::U8(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The string value, for string constants.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(value) => Some(value),
            _ => None,
        }
    }
}
