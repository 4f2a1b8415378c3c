use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Data, SdtStream};
use crate::error::Result;

/// String-keyed SDT container.
///
/// Keys are unique. Iteration order is sorted by key, so it is stable for
/// the lifetime of the map, but callers should not attach meaning to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SdtMap {
    entries: BTreeMap<String, Data>,
}

impl SdtMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Data> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Data>) -> Option<Data> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove `key`; `Some` means it was present.
    pub fn remove(&mut self, key: &str) -> Option<Data> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Data> + '_ {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Data)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Typed read. Absent key and wrong tag both yield `None`.
    pub fn get_as<'a, T>(&'a self, key: &str) -> Option<T>
    where
        T: TryFrom<&'a Data>,
    {
        self.entries.get(key).and_then(|d| T::try_from(d).ok())
    }

    /// Typed read that tells absence (`Ok(None)`) from a tag mismatch (`Err`).
    pub fn try_get_as<'a, T>(&'a self, key: &str) -> Result<Option<T>>
    where
        T: TryFrom<&'a Data, Error = crate::error::MessageError>,
    {
        self.entries.get(key).map(T::try_from).transpose()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_as(key)
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        self.get_as(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_as(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get_as(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_as(key)
    }

    pub fn get_char(&self, key: &str) -> Option<char> {
        self.get_as(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_as(key)
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.get_as(key)
    }

    pub fn get_map(&self, key: &str) -> Option<&SdtMap> {
        self.get_as(key)
    }

    pub fn get_stream(&self, key: &str) -> Option<&SdtStream> {
        self.get_as(key)
    }
}

impl<K, V> FromIterator<(K, V)> for SdtMap
where
    K: Into<String>,
    V: Into<Data>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SdtMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for SdtMap
where
    K: Into<String>,
    V: Into<Data>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.entries.insert(k.into(), v.into());
        }
    }
}

impl IntoIterator for SdtMap {
    type Item = (String, Data);
    type IntoIter = btree_map::IntoIter<String, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SdtMap {
    type Item = (&'a String, &'a Data);
    type IntoIter = btree_map::Iter<'a, String, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for SdtMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}: {v}")?;
        }
        f.write_str("}")
    }
}
