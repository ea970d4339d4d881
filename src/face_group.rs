//! Face groups: faces drawn with one material.
//!
//! A face group caches its vertex schema, its persisted (non-temporary)
//! schema view and its bounding box. Every mutator clears the affected caches
//! and emits a [`ChangeFlags`] event; accessors recompute on demand, which is
//! why they take `&mut self`.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::{MeshError, Result};
use crate::notify::{ChangeFlags, ChangeSignal, ListenerId};
use crate::schema::{self, RestrictionReport, VertexSchema};
use crate::types::attribute::POSITION;
use crate::types::{AttributeName, BoundingBox, Face, MaterialRef, Vertex};

/// Columnar attribute data: attribute name -> flat float array.
pub type AttributeArrays = BTreeMap<String, Vec<f32>>;

#[derive(Debug, Clone)]
struct SchemaCache {
    schema: VertexSchema,
    homogeneous: bool,
}

/// An ordered list of faces sharing one material.
#[derive(Debug, Clone, Default)]
pub struct FaceGroup {
    name: Option<String>,
    faces: Vec<Face>,
    material: Option<MaterialRef>,
    temporary_attributes: BTreeSet<AttributeName>,
    schema: Option<SchemaCache>,
    persisted_schema: Option<VertexSchema>,
    bounding_box: Option<BoundingBox>,
    changed: ChangeSignal,
}

impl FaceGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a group of triangles from columnar attribute arrays.
    ///
    /// Each array's length must be a nonzero multiple of `vertex_count`; the
    /// quotient is that attribute's size. Every index must be below
    /// `vertex_count` and the index count must be a multiple of three. On any
    /// violation nothing is built.
    pub fn from_attribute_arrays(
        arrays: &AttributeArrays,
        vertex_count: usize,
        indices: &[u32],
    ) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::invalid_geometry(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if vertex_count == 0 {
            if arrays.values().any(|a| !a.is_empty()) || !indices.is_empty() {
                return Err(MeshError::invalid_geometry(
                    "vertex count is 0 but attribute or index data is present",
                ));
            }
            return Ok(Self::new());
        }

        let mut columns = Vec::with_capacity(arrays.len());
        for (name, data) in arrays {
            if data.is_empty() || data.len() % vertex_count != 0 {
                return Err(MeshError::invalid_geometry(format!(
                    "attribute '{name}' has {} values, not a nonzero multiple of vertex count {vertex_count}",
                    data.len()
                )));
            }
            columns.push((AttributeName::from(name.as_str()), data.as_slice(), data.len() / vertex_count));
        }

        if let Some((pos, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(MeshError::invalid_geometry(format!(
                "index {index} at position {pos} is out of range for vertex count {vertex_count}"
            )));
        }

        // `arrays` iterates in name order, so each gathered vertex is already
        // sorted.
        let gather = |index: u32| {
            let i = index as usize;
            Vertex::from_sorted(
                columns
                    .iter()
                    .map(|(name, data, size)| (name.clone(), data[i * size..(i + 1) * size].to_vec()))
                    .collect(),
            )
        };

        let faces: Vec<Face> = indices
            .chunks_exact(3)
            .map(|tri| Face::triangle(gather(tri[0]), gather(tri[1]), gather(tri[2])))
            .collect();

        debug!(
            faces = faces.len(),
            vertex_count,
            attributes = columns.len(),
            "Built face group from attribute arrays"
        );

        let schema = (!faces.is_empty()).then(|| SchemaCache {
            schema: columns
                .iter()
                .map(|(name, _, size)| (name.clone(), *size))
                .collect(),
            homogeneous: true,
        });

        Ok(Self {
            faces,
            schema,
            ..Self::default()
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_material(mut self, material: MaterialRef) -> Self {
        self.material = Some(material);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn material(&self) -> Option<&MaterialRef> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Option<MaterialRef>) {
        if self.material != material {
            self.material = material;
            self.changed.emit(ChangeFlags::MATERIAL);
        }
    }

    // ---------------------------------------------------------------------
    // Faces
    // ---------------------------------------------------------------------

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Face> {
        self.faces.iter()
    }

    pub fn face_at(&self, index: usize) -> Result<&Face> {
        self.faces.get(index).ok_or(MeshError::IndexOutOfRange {
            index,
            len: self.faces.len(),
        })
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
        self.faces_changed();
    }

    /// Insert at `index`; `index == face_count()` appends.
    pub fn insert_face(&mut self, face: Face, index: usize) -> Result<()> {
        if index > self.faces.len() {
            return Err(MeshError::IndexOutOfRange {
                index,
                len: self.faces.len(),
            });
        }
        self.faces.insert(index, face);
        self.faces_changed();
        Ok(())
    }

    pub fn remove_last_face(&mut self) -> Result<Face> {
        let face = self.faces.pop().ok_or(MeshError::Empty)?;
        self.faces_changed();
        Ok(face)
    }

    pub fn remove_face_at(&mut self, index: usize) -> Result<Face> {
        self.check_index(index)?;
        let face = self.faces.remove(index);
        self.faces_changed();
        Ok(face)
    }

    /// Replace the face at `index`, returning the old one.
    pub fn replace_face_at(&mut self, index: usize, face: Face) -> Result<Face> {
        self.check_index(index)?;
        let old = std::mem::replace(&mut self.faces[index], face);
        self.faces_changed();
        Ok(old)
    }

    /// Swap in a whole new face list with a single notification.
    pub fn replace_all_faces(&mut self, faces: Vec<Face>) -> Vec<Face> {
        let old = std::mem::replace(&mut self.faces, faces);
        self.faces_changed();
        old
    }

    // ---------------------------------------------------------------------
    // Temporary attributes
    // ---------------------------------------------------------------------

    pub fn is_attribute_temporary(&self, name: &str) -> bool {
        self.temporary_attributes.contains(name)
    }

    /// Flag or unflag an attribute as tool-only. Geometry is untouched.
    pub fn set_attribute_temporary(&mut self, name: impl Into<AttributeName>, temporary: bool) {
        let name = name.into();
        let changed = if temporary {
            self.temporary_attributes.insert(name)
        } else {
            self.temporary_attributes.remove(name.as_str())
        };
        if changed {
            self.persisted_schema = None;
            self.changed.emit(ChangeFlags::TEMPORARY_ATTRIBUTES);
        }
    }

    pub fn temporary_attributes(&self) -> impl Iterator<Item = &AttributeName> {
        self.temporary_attributes.iter()
    }

    // ---------------------------------------------------------------------
    // Schema
    // ---------------------------------------------------------------------

    /// Full vertex schema, temporary attributes included.
    pub fn vertex_schema(&mut self) -> &VertexSchema {
        &self.schema_cache().schema
    }

    /// Schema for persistence and export: temporary attributes removed.
    pub fn vertex_schema_ignoring_temporary(&mut self) -> &VertexSchema {
        let Self {
            faces,
            temporary_attributes,
            schema,
            persisted_schema,
            ..
        } = self;
        persisted_schema
            .get_or_insert_with(|| ensure_schema(schema, faces).schema.without(&*temporary_attributes))
    }

    pub fn is_homogeneous(&mut self) -> bool {
        self.schema_cache().homogeneous
    }

    /// Cached schema without recomputation, if currently valid.
    pub fn cached_vertex_schema(&self) -> Option<(&VertexSchema, bool)> {
        self.schema.as_ref().map(|c| (&c.schema, c.homogeneous))
    }

    /// Restrict every vertex to `target`, dropping attributes it lacks and
    /// truncating oversized ones. Attributes smaller than the target are not
    /// grown.
    ///
    /// Lossy restrictions are logged and reported, never rejected.
    pub fn restrict_to_schema(&mut self, target: &VertexSchema) -> RestrictionReport {
        let mut report = RestrictionReport::default();
        for face in &mut self.faces {
            for vertex in face.vertices_mut() {
                schema::restrict_vertex(vertex, target, &mut report);
            }
        }

        self.invalidate();
        if !report.is_lossless() {
            warn!(
                group = self.name.as_deref().unwrap_or("<unnamed>"),
                dropped = ?report.dropped,
                truncated = ?report.truncated,
                "Schema restriction discarded attribute data"
            );
            self.changed.emit(ChangeFlags::FACES);
        }
        report
    }

    // ---------------------------------------------------------------------
    // Bounds
    // ---------------------------------------------------------------------

    /// Bounds of the `position` attribute, or [`BoundingBox::empty`] if no
    /// vertex has one.
    pub fn bounding_box(&mut self) -> BoundingBox {
        *self
            .bounding_box
            .get_or_insert_with(|| compute_bounding_box(&self.faces))
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl Fn(&ChangeFlags) + Send + Sync + 'static) -> ListenerId {
        self.changed.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// Recompute all caches now.
    pub fn refresh_caches(&mut self) {
        self.vertex_schema_ignoring_temporary();
        self.bounding_box();
    }

    fn schema_cache(&mut self) -> &SchemaCache {
        ensure_schema(&mut self.schema, &self.faces)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.faces.len() {
            Ok(())
        } else {
            Err(MeshError::IndexOutOfRange {
                index,
                len: self.faces.len(),
            })
        }
    }

    fn invalidate(&mut self) {
        self.schema = None;
        self.persisted_schema = None;
        self.bounding_box = None;
    }

    fn faces_changed(&mut self) {
        self.invalidate();
        self.changed.emit(ChangeFlags::FACES);
    }
}

fn ensure_schema<'a>(slot: &'a mut Option<SchemaCache>, faces: &[Face]) -> &'a SchemaCache {
    slot.get_or_insert_with(|| {
        let (schema, homogeneous) = schema::compute_schema(faces);
        debug!(
            faces = faces.len(),
            attributes = schema.len(),
            homogeneous,
            "Recomputed vertex schema"
        );
        SchemaCache {
            schema,
            homogeneous,
        }
    })
}

impl<'a> IntoIterator for &'a FaceGroup {
    type Item = &'a Face;
    type IntoIter = std::slice::Iter<'a, Face>;

    fn into_iter(self) -> Self::IntoIter {
        self.faces.iter()
    }
}

/// Bounds of the `position` attribute over `faces`. Missing y/z components
/// count as zero.
pub fn compute_bounding_box(faces: &[Face]) -> BoundingBox {
    BoundingBox::from_points(
        faces
            .iter()
            .flat_map(Face::vertices)
            .filter_map(|v| v.get(POSITION))
            .map(|p| {
                let c = |i: usize| p.get(i).copied().unwrap_or(0.0) as f64;
                [c(0), c(1), c(2)]
            }),
    )
}
