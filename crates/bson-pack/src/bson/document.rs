//! Ordered BSON containers.

use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;

use super::decoder::BsonDecoder;
use super::encoder::BsonEncoder;
use super::error::BsonError;
use super::values::BsonValue;
use crate::ejson::{EjsonDecodeError, EjsonDecoder, EjsonEncoder};

/// An insertion-ordered map of string keys to [`BsonValue`]s.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// its original position. Equality is order-sensitive.
#[derive(Debug, Clone, Default)]
pub struct BsonDocument {
    entries: IndexMap<String, BsonValue>,
}

impl BsonDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Decodes a complete binary document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BsonError> {
        BsonDecoder::new().decode(bytes)
    }

    /// Encodes to the binary wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BsonError> {
        BsonEncoder::new().encode(self)
    }

    /// Parses Extended JSON text; the top level must be a plain object.
    pub fn from_ejson(text: &str) -> Result<Self, EjsonDecodeError> {
        EjsonDecoder::new().decode_document(text)
    }

    /// Canonical Extended JSON.
    pub fn to_ejson(&self) -> String {
        EjsonEncoder::canonical().encode_document(self)
    }

    /// Relaxed Extended JSON.
    pub fn to_relaxed_ejson(&self) -> String {
        EjsonEncoder::relaxed().encode_document(self)
    }

    /// Inserts or replaces; returns the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<BsonValue>) -> Option<BsonValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&BsonValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut BsonValue> {
        self.entries.get_mut(key)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<BsonValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, BsonValue> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, BsonValue> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, BsonValue> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, BsonValue> {
        self.entries.values()
    }

    /// Copies nested documents and arrays recursively; binary and
    /// code-with-scope leaves stay shared with `self`.
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }
}

impl PartialEq for BsonDocument {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Display for BsonDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ejson())
    }
}

impl<K: Into<String>, V: Into<BsonValue>> FromIterator<(K, V)> for BsonDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = BsonDocument::new();
        for (key, value) in iter {
            doc.insert(key, value);
        }
        doc
    }
}

impl IntoIterator for BsonDocument {
    type Item = (String, BsonValue);
    type IntoIter = indexmap::map::IntoIter<String, BsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a BsonDocument {
    type Item = (&'a String, &'a BsonValue);
    type IntoIter = indexmap::map::Iter<'a, String, BsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// An ordered, index-addressable sequence of [`BsonValue`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BsonArray {
    items: Vec<BsonValue>,
}

impl BsonArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: impl Into<BsonValue>) {
        self.items.push(value.into());
    }

    /// Same sharing rules as [`BsonDocument::deep_clone`].
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }

    pub fn into_vec(self) -> Vec<BsonValue> {
        self.items
    }
}

impl Deref for BsonArray {
    type Target = Vec<BsonValue>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl DerefMut for BsonArray {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl From<Vec<BsonValue>> for BsonArray {
    fn from(items: Vec<BsonValue>) -> Self {
        Self { items }
    }
}

impl<V: Into<BsonValue>> FromIterator<V> for BsonArray {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for BsonArray {
    type Item = BsonValue;
    type IntoIter = std::vec::IntoIter<BsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a BsonArray {
    type Item = &'a BsonValue;
    type IntoIter = std::slice::Iter<'a, BsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
