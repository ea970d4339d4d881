//! Vertex schema computation.
//!
//! A vertex schema maps each attribute name to the largest tuple size seen
//! for it. A set of vertices is *homogeneous* under a schema when every
//! vertex carries every attribute of the schema at exactly that size.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::types::{AttributeName, Face, Vertex};

/// Attribute name -> tuple size.
///
/// Serializes as a plain JSON object, e.g. `{"position": 3, "uv": 2}`.
/// Sizes are always nonzero; deserializing a zero size fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<AttributeName, usize>",
    into = "BTreeMap<AttributeName, usize>"
)]
pub struct VertexSchema(BTreeMap<AttributeName, usize>);

impl VertexSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or overwrite an entry. A size of zero removes the entry.
    pub fn insert(&mut self, name: impl Into<AttributeName>, size: usize) -> Option<usize> {
        let name = name.into();
        if size == 0 {
            return self.0.remove(name.as_str());
        }
        self.0.insert(name, size)
    }

    pub fn remove(&mut self, name: &str) -> Option<usize> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeName, usize)> {
        self.0.iter().map(|(n, &s)| (n, s))
    }

    pub fn names(&self) -> impl Iterator<Item = &AttributeName> {
        self.0.keys()
    }

    /// Sum of all sizes: the float count of one packed vertex.
    pub fn stride(&self) -> usize {
        self.0.values().sum()
    }

    /// Copy of this schema without the given names.
    pub fn without<'a>(&self, excluded: impl IntoIterator<Item = &'a AttributeName>) -> Self {
        let mut out = self.clone();
        for name in excluded {
            out.0.remove(name.as_str());
        }
        out
    }

    /// Whether `vertex` has every attribute of this schema at exactly its size.
    /// Attributes outside the schema are ignored.
    pub fn is_satisfied_by(&self, vertex: &Vertex) -> bool {
        self.0
            .iter()
            .all(|(name, &size)| vertex.get(name.as_str()).is_some_and(|v| v.len() == size))
    }

    /// Grow the entry for `name` to at least `size`.
    fn observe(&mut self, name: &AttributeName, size: usize) {
        match self.0.get_mut(name.as_str()) {
            Some(current) => *current = (*current).max(size),
            None => {
                self.0.insert(name.clone(), size);
            }
        }
    }
}

impl<N: Into<AttributeName>> FromIterator<(N, usize)> for VertexSchema {
    fn from_iter<I: IntoIterator<Item = (N, usize)>>(iter: I) -> Self {
        let mut schema = Self::new();
        for (name, size) in iter {
            schema.insert(name, size);
        }
        schema
    }
}

impl TryFrom<BTreeMap<AttributeName, usize>> for VertexSchema {
    type Error = MeshError;

    fn try_from(map: BTreeMap<AttributeName, usize>) -> Result<Self, Self::Error> {
        if let Some((name, _)) = map.iter().find(|&(_, &size)| size == 0) {
            return Err(MeshError::invalid_geometry(format!(
                "attribute '{name}' has schema size 0"
            )));
        }
        Ok(Self(map))
    }
}

impl From<VertexSchema> for BTreeMap<AttributeName, usize> {
    fn from(schema: VertexSchema) -> Self {
        schema.0
    }
}

impl<'a> IntoIterator for &'a VertexSchema {
    type Item = (&'a AttributeName, &'a usize);
    type IntoIter = std::collections::btree_map::Iter<'a, AttributeName, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Compute the schema of a face list and whether it is homogeneous.
///
/// An empty face list yields an empty, homogeneous schema.
pub fn compute_schema(faces: &[Face]) -> (VertexSchema, bool) {
    let mut schema = VertexSchema::new();
    for vertex in faces.iter().flat_map(Face::vertices) {
        for (name, value) in vertex.iter() {
            schema.observe(name, value.len());
        }
    }

    let homogeneous = faces
        .iter()
        .flat_map(Face::vertices)
        .all(|v| schema.is_satisfied_by(v));

    (schema, homogeneous)
}

/// Union of two schemata: every name from either side, at the larger size
/// where both define it.
pub fn union_of_schemata(a: &VertexSchema, b: &VertexSchema) -> VertexSchema {
    let mut out = a.clone();
    for (name, size) in b.iter() {
        out.observe(name, size);
    }
    out
}

/// Intersection of two schemata: names present on both sides, at the
/// smaller size.
pub fn intersection_of_schemata(a: &VertexSchema, b: &VertexSchema) -> VertexSchema {
    a.iter()
        .filter_map(|(name, size)| b.get(name.as_str()).map(|other| (name.clone(), size.min(other))))
        .collect()
}

/// The largest schema every vertex in `faces` satisfies.
///
/// Restricting the faces to this schema always produces a homogeneous set.
pub fn common_schema(faces: &[Face]) -> VertexSchema {
    let mut vertices = faces.iter().flat_map(Face::vertices);
    let Some(first) = vertices.next() else {
        return VertexSchema::new();
    };

    let mut common: VertexSchema = first.iter().map(|(n, v)| (n.clone(), v.len())).collect();
    for vertex in vertices {
        common.0.retain(|name, size| match vertex.get(name.as_str()) {
            Some(value) => {
                *size = (*size).min(value.len());
                true
            }
            None => false,
        });
        if common.is_empty() {
            break;
        }
    }
    common
}

/// What a restriction threw away.
///
/// Restriction never fails; callers that care about lost data inspect this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestrictionReport {
    /// Attributes removed because the target schema lacks them.
    pub dropped: BTreeSet<AttributeName>,
    /// Attributes shortened to the target size.
    pub truncated: BTreeSet<AttributeName>,
}

impl RestrictionReport {
    /// True when no attribute data was lost.
    pub fn is_lossless(&self) -> bool {
        self.dropped.is_empty() && self.truncated.is_empty()
    }

    pub fn absorb(&mut self, other: RestrictionReport) {
        self.dropped.extend(other.dropped);
        self.truncated.extend(other.truncated);
    }
}

/// Restrict one vertex to `target`: drop attributes the target lacks and
/// truncate oversized ones. Undersized attributes are left alone. A zero
/// target size drops the attribute.
pub fn restrict_vertex(vertex: &mut Vertex, target: &VertexSchema, report: &mut RestrictionReport) {
    vertex.attributes_mut().retain_mut(|(name, value)| match target.get(name.as_str()) {
        None | Some(0) => {
            if !report.dropped.contains(name.as_str()) {
                report.dropped.insert(name.clone());
            }
            false
        }
        Some(size) => {
            if value.len() > size {
                value.truncate(size);
                if !report.truncated.contains(name.as_str()) {
                    report.truncated.insert(name.clone());
                }
            }
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(entries: &[(&str, usize)]) -> VertexSchema {
        entries.iter().map(|&(n, s)| (n, s)).collect()
    }

    fn tri(v: Vertex) -> Face {
        Face::triangle(v.clone(), v.clone(), v)
    }

    #[test]
    fn compute_schema_takes_max_size() {
        let a = Vertex::new().with("position", [0.0; 3]).with("uv", [0.0; 2]);
        let b = Vertex::new().with("position", [0.0; 3]).with("uv", [0.0; 3]);
        let faces = vec![Face::triangle(a.clone(), a, b)];

        let (s, homogeneous) = compute_schema(&faces);
        assert_eq!(s, schema(&[("position", 3), ("uv", 3)]));
        assert!(!homogeneous);
    }

    #[test]
    fn compute_schema_homogeneous() {
        let v = Vertex::new().with("position", [0.0; 3]).with("normal", [0.0, 0.0, 1.0]);
        let (s, homogeneous) = compute_schema(&[tri(v.clone()), tri(v)]);
        assert_eq!(s, schema(&[("normal", 3), ("position", 3)]));
        assert!(homogeneous);
    }

    #[test]
    fn compute_schema_missing_attribute() {
        let full = Vertex::new().with("position", [0.0; 3]).with("normal", [0.0; 3]);
        let bare = Vertex::new().with("position", [0.0; 3]);
        let (s, homogeneous) = compute_schema(&[tri(full.clone()), Face::triangle(full.clone(), full, bare)]);
        assert_eq!(s.get("normal"), Some(3));
        assert!(!homogeneous);
    }

    #[test]
    fn compute_schema_empty() {
        let (s, homogeneous) = compute_schema(&[]);
        assert!(s.is_empty());
        assert!(homogeneous);
    }

    #[test]
    fn union_carries_one_sided_entries() {
        let a = schema(&[("position", 3), ("uv", 2)]);
        let b = schema(&[("position", 4), ("normal", 3)]);
        assert_eq!(
            union_of_schemata(&a, &b),
            schema(&[("normal", 3), ("position", 4), ("uv", 2)])
        );
    }

    #[test]
    fn union_is_commutative_and_associative() {
        let a = schema(&[("position", 3), ("uv", 2)]);
        let b = schema(&[("position", 2), ("color", 4)]);
        let c = schema(&[("uv", 3), ("normal", 3)]);

        assert_eq!(union_of_schemata(&a, &b), union_of_schemata(&b, &a));
        assert_eq!(
            union_of_schemata(&union_of_schemata(&a, &b), &c),
            union_of_schemata(&a, &union_of_schemata(&b, &c))
        );
        assert_eq!(union_of_schemata(&a, &VertexSchema::new()), a);
    }

    #[test]
    fn intersection_takes_min_of_shared() {
        let a = schema(&[("position", 3), ("uv", 2)]);
        let b = schema(&[("position", 2), ("color", 4)]);
        assert_eq!(intersection_of_schemata(&a, &b), schema(&[("position", 2)]));
    }

    #[test]
    fn common_schema_is_satisfied_by_all() {
        let a = Vertex::new().with("position", [0.0; 3]).with("uv", [0.0; 2]);
        let b = Vertex::new().with("position", [0.0; 4]).with("normal", [0.0; 3]);
        let faces = vec![Face::triangle(a.clone(), b.clone(), a)];

        let common = common_schema(&faces);
        assert_eq!(common, schema(&[("position", 3)]));
        assert!(common_schema(&[]).is_empty());
    }

    #[test]
    fn restrict_vertex_drops_and_truncates() {
        let mut v = Vertex::new()
            .with("position", [1.0, 2.0, 3.0, 1.0])
            .with("uv", [0.5])
            .with("debug", [9.0]);
        let mut report = RestrictionReport::default();
        restrict_vertex(&mut v, &schema(&[("position", 3), ("uv", 2)]), &mut report);

        assert_eq!(v.position(), Some(&[1.0, 2.0, 3.0][..]));
        // Undersized attributes are never grown.
        assert_eq!(v.get("uv"), Some(&[0.5][..]));
        assert!(!v.contains("debug"));
        assert!(report.dropped.contains("debug"));
        assert!(report.truncated.contains("position"));
        assert!(!report.is_lossless());
    }

    #[test]
    fn zero_size_insert_removes() {
        let mut s = schema(&[("uv", 2)]);
        s.insert("uv", 0);
        assert!(s.is_empty());
    }

    #[test]
    fn schema_serializes_as_object() {
        let s = schema(&[("position", 3), ("uv", 2)]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"position":3,"uv":2}"#);
        let back: VertexSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(s.stride(), 5);
    }

    #[test]
    fn zero_size_schema_is_rejected_on_deserialize() {
        let err = serde_json::from_str::<VertexSchema>(r#"{"position":3,"uv":0}"#).unwrap_err();
        assert!(err.to_string().contains("uv"));

        let s: VertexSchema = serde_json::from_str(r#"{"position":3}"#).unwrap();
        let mut v = Vertex::new().with("position", [0.0; 3]).with("uv", [0.5; 2]);
        let mut report = RestrictionReport::default();
        restrict_vertex(&mut v, &s, &mut report);
        assert!(v.get("uv").is_none());
        assert!(report.dropped.contains("uv"));
        assert!(v.attributes_mut().iter().all(|(_, value)| !value.is_empty()));
    }

    #[test]
    fn without_filters_names() {
        let s = schema(&[("position", 3), ("debugColor", 4)]);
        let excluded = [AttributeName::new("debugColor")];
        assert_eq!(s.without(&excluded), schema(&[("position", 3)]));
    }
}
