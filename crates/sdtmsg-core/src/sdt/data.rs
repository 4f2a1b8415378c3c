use std::fmt;

use serde::{Deserialize, Serialize};

use super::{SdtMap, SdtStream};
use crate::error::{MessageError, Result};

/// Active tag of a `Data` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Bytes,
    String,
    Map,
    Stream,
    Unknown,
}

impl DataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Null => "null",
            DataKind::Bool => "bool",
            DataKind::I8 => "i8",
            DataKind::I16 => "i16",
            DataKind::I32 => "i32",
            DataKind::I64 => "i64",
            DataKind::U8 => "u8",
            DataKind::U16 => "u16",
            DataKind::U32 => "u32",
            DataKind::U64 => "u64",
            DataKind::F32 => "f32",
            DataKind::F64 => "f64",
            DataKind::Char => "char",
            DataKind::Bytes => "bytes",
            DataKind::String => "string",
            DataKind::Map => "map",
            DataKind::Stream => "stream",
            DataKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SDT value.
///
/// The tag is fixed at construction. Reading a value back out goes through
/// `TryFrom<&Data>`, which fails with `TypeMismatch` instead of widening
/// (`i64::try_from(&Data::I32(1))` is an error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Bytes(Vec<u8>),
    String(String),
    Map(SdtMap),
    Stream(SdtStream),
    /// Value of a type this client does not understand, kept opaque.
    Unknown { type_code: u8, raw: Vec<u8> },
}

impl Data {
    pub fn kind(&self) -> DataKind {
        match self {
            Data::Null => DataKind::Null,
            Data::Bool(_) => DataKind::Bool,
            Data::I8(_) => DataKind::I8,
            Data::I16(_) => DataKind::I16,
            Data::I32(_) => DataKind::I32,
            Data::I64(_) => DataKind::I64,
            Data::U8(_) => DataKind::U8,
            Data::U16(_) => DataKind::U16,
            Data::U32(_) => DataKind::U32,
            Data::U64(_) => DataKind::U64,
            Data::F32(_) => DataKind::F32,
            Data::F64(_) => DataKind::F64,
            Data::Char(_) => DataKind::Char,
            Data::Bytes(_) => DataKind::Bytes,
            Data::String(_) => DataKind::String,
            Data::Map(_) => DataKind::Map,
            Data::Stream(_) => DataKind::Stream,
            Data::Unknown { .. } => DataKind::Unknown,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// True if this value or any nested value is a NaN/infinite float.
    pub(crate) fn has_non_finite(&self) -> bool {
        match self {
            Data::F32(v) => !v.is_finite(),
            Data::F64(v) => !v.is_finite(),
            Data::Map(m) => m.values().any(Data::has_non_finite),
            Data::Stream(s) => s.iter().any(Data::has_non_finite),
            _ => false,
        }
    }
}

fn mismatch(expected: DataKind, found: &Data) -> MessageError {
    MessageError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

macro_rules! scalar_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Data {
                fn from(v: $ty) -> Self {
                    Data::$variant(v)
                }
            }

            impl TryFrom<&Data> for $ty {
                type Error = MessageError;

                fn try_from(d: &Data) -> Result<Self> {
                    match d {
                        Data::$variant(v) => Ok(*v),
                        other => Err(mismatch(DataKind::$variant, other)),
                    }
                }
            }

            impl TryFrom<Data> for $ty {
                type Error = MessageError;

                fn try_from(d: Data) -> Result<Self> {
                    <$ty>::try_from(&d)
                }
            }
        )*
    };
}

scalar_conversions!(
    Bool => bool,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    Char => char,
);

impl From<&str> for Data {
    fn from(v: &str) -> Self {
        Data::String(v.to_owned())
    }
}

impl From<String> for Data {
    fn from(v: String) -> Self {
        Data::String(v)
    }
}

impl From<&[u8]> for Data {
    fn from(v: &[u8]) -> Self {
        Data::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Data {
    fn from(v: Vec<u8>) -> Self {
        Data::Bytes(v)
    }
}

impl From<SdtMap> for Data {
    fn from(v: SdtMap) -> Self {
        Data::Map(v)
    }
}

impl From<SdtStream> for Data {
    fn from(v: SdtStream) -> Self {
        Data::Stream(v)
    }
}

/// `None` becomes `Data::Null`.
impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(v: Option<T>) -> Self {
        v.map_or(Data::Null, Into::into)
    }
}

impl<'a> TryFrom<&'a Data> for &'a str {
    type Error = MessageError;

    fn try_from(d: &'a Data) -> Result<Self> {
        match d {
            Data::String(s) => Ok(s.as_str()),
            other => Err(mismatch(DataKind::String, other)),
        }
    }
}

impl<'a> TryFrom<&'a Data> for &'a [u8] {
    type Error = MessageError;

    fn try_from(d: &'a Data) -> Result<Self> {
        match d {
            Data::Bytes(b) => Ok(b.as_slice()),
            other => Err(mismatch(DataKind::Bytes, other)),
        }
    }
}

impl<'a> TryFrom<&'a Data> for &'a SdtMap {
    type Error = MessageError;

    fn try_from(d: &'a Data) -> Result<Self> {
        match d {
            Data::Map(m) => Ok(m),
            other => Err(mismatch(DataKind::Map, other)),
        }
    }
}

impl<'a> TryFrom<&'a Data> for &'a SdtStream {
    type Error = MessageError;

    fn try_from(d: &'a Data) -> Result<Self> {
        match d {
            Data::Stream(s) => Ok(s),
            other => Err(mismatch(DataKind::Stream, other)),
        }
    }
}

impl TryFrom<Data> for String {
    type Error = MessageError;

    fn try_from(d: Data) -> Result<Self> {
        match d {
            Data::String(s) => Ok(s),
            other => Err(mismatch(DataKind::String, &other)),
        }
    }
}

impl TryFrom<Data> for Vec<u8> {
    type Error = MessageError;

    fn try_from(d: Data) -> Result<Self> {
        match d {
            Data::Bytes(b) => Ok(b),
            other => Err(mismatch(DataKind::Bytes, &other)),
        }
    }
}

impl TryFrom<Data> for SdtMap {
    type Error = MessageError;

    fn try_from(d: Data) -> Result<Self> {
        match d {
            Data::Map(m) => Ok(m),
            other => Err(mismatch(DataKind::Map, &other)),
        }
    }
}

impl TryFrom<Data> for SdtStream {
    type Error = MessageError;

    fn try_from(d: Data) -> Result<Self> {
        match d {
            Data::Stream(s) => Ok(s),
            other => Err(mismatch(DataKind::Stream, &other)),
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Null => f.write_str("null"),
            Data::Bool(v) => write!(f, "{v}"),
            Data::I8(v) => write!(f, "{v}"),
            Data::I16(v) => write!(f, "{v}"),
            Data::I32(v) => write!(f, "{v}"),
            Data::I64(v) => write!(f, "{v}"),
            Data::U8(v) => write!(f, "{v}"),
            Data::U16(v) => write!(f, "{v}"),
            Data::U32(v) => write!(f, "{v}"),
            Data::U64(v) => write!(f, "{v}"),
            Data::F32(v) => write!(f, "{v}"),
            Data::F64(v) => write!(f, "{v}"),
            Data::Char(v) => write!(f, "{v:?}"),
            Data::Bytes(b) => {
                write!(f, "bytes[{}]:", b.len())?;
                // byte-at-a-time so a bounded writer can cut off early
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Data::String(s) => write!(f, "{s:?}"),
            Data::Map(m) => fmt::Display::fmt(m, f),
            Data::Stream(s) => fmt::Display::fmt(s, f),
            Data::Unknown { type_code, raw } => {
                write!(f, "unknown(type=0x{type_code:02x}, {} bytes)", raw.len())
            }
        }
    }
}
