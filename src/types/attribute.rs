use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Well-known attribute names used by the loaders.
pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const TEXCOORD: &str = "uv";
pub const COLOR: &str = "color";

/// Interned per-vertex attribute name.
///
/// Clones share one allocation, so the bulk constructor can stamp the same
/// name onto every vertex without copying the string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeName(Arc<str>);

impl AttributeName {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AttributeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttributeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AttributeName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&AttributeName> for AttributeName {
    fn from(name: &AttributeName) -> Self {
        name.clone()
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Serialize for AttributeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AttributeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// A single vertex: attribute name -> numeric tuple.
///
/// Stored as a small vector sorted by name. Typical vertices carry four to
/// eight attributes, where a binary search over a flat vector beats hashing.
/// A name appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    attributes: Vec<(AttributeName, Vec<f32>)>,
}

impl Vertex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Vertex::set`].
    pub fn with(mut self, name: impl Into<AttributeName>, value: impl Into<Vec<f32>>) -> Self {
        self.set(name, value);
        self
    }

    /// Build from attributes already sorted by name with no duplicates.
    pub(crate) fn from_sorted(attributes: Vec<(AttributeName, Vec<f32>)>) -> Self {
        debug_assert!(attributes.windows(2).all(|w| w[0].0 < w[1].0));
        Self { attributes }
    }

    /// Set an attribute, returning the previous value.
    ///
    /// An empty tuple removes the attribute: a zero-sized attribute carries
    /// no data and would give the schema a meaningless size.
    pub fn set(&mut self, name: impl Into<AttributeName>, value: impl Into<Vec<f32>>) -> Option<Vec<f32>> {
        let name = name.into();
        let value = value.into();
        if value.is_empty() {
            return self.remove(name.as_str());
        }
        match self.find(name.as_str()) {
            Ok(i) => Some(std::mem::replace(&mut self.attributes[i].1, value)),
            Err(i) => {
                self.attributes.insert(i, (name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.find(name).ok().map(|i| self.attributes[i].1.as_slice())
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<f32>> {
        self.find(name).ok().map(|i| self.attributes.remove(i).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Number of attributes on this vertex.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn position(&self) -> Option<&[f32]> {
        self.get(POSITION)
    }

    /// Attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeName, &[f32])> {
        self.attributes.iter().map(|(n, v)| (n, v.as_slice()))
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Vec<(AttributeName, Vec<f32>)> {
        &mut self.attributes
    }

    fn find(&self, name: &str) -> std::result::Result<usize, usize> {
        self.attributes
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
    }
}
