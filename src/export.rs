//! Conversion of a homogeneous face group back to columnar arrays.
//!
//! This is the inverse of [`FaceGroup::from_attribute_arrays`] and the input
//! a render-mesh compiler packs into GPU buffers. Bitwise-identical vertices
//! are merged so shared corners are emitted once.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{MeshError, Result};
use crate::face_group::{AttributeArrays, FaceGroup};
use crate::schema::VertexSchema;
use crate::types::{Face, Vertex};

/// Deduplicated vertex data plus a triangle index list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedArrays {
    pub schema: VertexSchema,
    pub attributes: AttributeArrays,
    pub vertex_count: usize,
    pub indices: Vec<u32>,
}

impl IndexedArrays {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl FaceGroup {
    /// Export the persisted schema view (temporary attributes excluded) as
    /// columnar arrays.
    ///
    /// Faces with more than three vertices are fan-triangulated; faces with
    /// fewer are skipped. Fails with [`MeshError::NotHomogeneous`] unless
    /// every vertex fulfils the exported schema; temporary attributes are
    /// not checked.
    pub fn to_attribute_arrays(&mut self) -> Result<IndexedArrays> {
        let schema = self.vertex_schema_ignoring_temporary().clone();
        if !self
            .faces()
            .iter()
            .flat_map(Face::vertices)
            .all(|v| schema.is_satisfied_by(v))
        {
            return Err(MeshError::NotHomogeneous);
        }

        let mut attributes: AttributeArrays = schema
            .iter()
            .map(|(name, _)| (name.to_string(), Vec::new()))
            .collect();
        let mut seen: HashMap<Vec<u32>, u32> = HashMap::new();
        let mut indices = Vec::with_capacity(self.face_count() * 3);
        let mut skipped = 0usize;

        for face in self.faces() {
            if face.vertex_count() < 3 {
                skipped += 1;
                continue;
            }
            for corner in fan(face) {
                let vertex = &face.vertices()[corner];
                let key = vertex_key(vertex, &schema);
                let next = seen.len() as u32;
                let index = *seen.entry(key).or_insert_with(|| {
                    for (name, _) in schema.iter() {
                        if let (Some(column), Some(value)) =
                            (attributes.get_mut(name.as_str()), vertex.get(name.as_str()))
                        {
                            column.extend_from_slice(value);
                        }
                    }
                    next
                });
                indices.push(index);
            }
        }

        debug!(
            vertices = seen.len(),
            triangles = indices.len() / 3,
            skipped,
            "Exported face group to attribute arrays"
        );

        Ok(IndexedArrays {
            schema,
            attributes,
            vertex_count: seen.len(),
            indices,
        })
    }
}

/// Corner indices of a fan triangulation: (0, i, i + 1).
fn fan(face: &Face) -> impl Iterator<Item = usize> {
    (1..face.vertex_count() - 1).flat_map(|i| [0, i, i + 1])
}

/// Bit pattern of every schema attribute, in schema order.
fn vertex_key(vertex: &Vertex, schema: &VertexSchema) -> Vec<u32> {
    let mut key = Vec::with_capacity(schema.stride());
    for (name, _) in schema.iter() {
        if let Some(value) = vertex.get(name.as_str()) {
            key.extend(value.iter().map(|f| f.to_bits()));
        }
    }
    key
}
