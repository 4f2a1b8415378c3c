use std::fmt;
use std::slice;

use serde::{Deserialize, Serialize};

use super::{Data, SdtMap};
use crate::error::Result;

/// Ordered, positionally indexed SDT container.
///
/// Elements may have different tags. `iter()` borrows the stream, so every
/// call starts a fresh pass from index 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdtStream {
    items: Vec<Data>,
}

impl SdtStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `None` when `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<&Data> {
        self.items.get(index)
    }

    pub fn push(&mut self, value: impl Into<Data>) {
        self.items.push(value.into());
    }

    pub fn iter(&self) -> slice::Iter<'_, Data> {
        self.items.iter()
    }

    /// Typed read. Out of bounds and wrong tag both yield `None`.
    pub fn get_as<'a, T>(&'a self, index: usize) -> Option<T>
    where
        T: TryFrom<&'a Data>,
    {
        self.items.get(index).and_then(|d| T::try_from(d).ok())
    }

    /// Typed read that tells out-of-bounds (`Ok(None)`) from a tag mismatch (`Err`).
    pub fn try_get_as<'a, T>(&'a self, index: usize) -> Result<Option<T>>
    where
        T: TryFrom<&'a Data, Error = crate::error::MessageError>,
    {
        self.items.get(index).map(T::try_from).transpose()
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get_as(index)
    }

    pub fn get_i32(&self, index: usize) -> Option<i32> {
        self.get_as(index)
    }

    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get_as(index)
    }

    pub fn get_u64(&self, index: usize) -> Option<u64> {
        self.get_as(index)
    }

    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get_as(index)
    }

    pub fn get_char(&self, index: usize) -> Option<char> {
        self.get_as(index)
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get_as(index)
    }

    pub fn get_bytes(&self, index: usize) -> Option<&[u8]> {
        self.get_as(index)
    }

    pub fn get_map(&self, index: usize) -> Option<&SdtMap> {
        self.get_as(index)
    }

    pub fn get_stream(&self, index: usize) -> Option<&SdtStream> {
        self.get_as(index)
    }
}

impl<T: Into<Data>> FromIterator<T> for SdtStream {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Into<Data>> Extend<T> for SdtStream {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for SdtStream {
    type Item = Data;
    type IntoIter = std::vec::IntoIter<Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a SdtStream {
    type Item = &'a Data;
    type IntoIter = slice::Iter<'a, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for SdtStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}
