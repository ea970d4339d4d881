//! A mesh is an ordered list of face groups.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::face_group::FaceGroup;
use crate::schema::{self, RestrictionReport, VertexSchema};
use crate::types::BoundingBox;

/// Ordered face groups; order is draw order across material changes.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    name: Option<String>,
    face_groups: Vec<FaceGroup>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn face_group_count(&self) -> usize {
        self.face_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face_groups.is_empty()
    }

    /// Total faces across all groups.
    pub fn face_count(&self) -> usize {
        self.face_groups.iter().map(FaceGroup::face_count).sum()
    }

    pub fn face_groups(&self) -> &[FaceGroup] {
        &self.face_groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FaceGroup> {
        self.face_groups.iter()
    }

    /// Groups manage their own cache invalidation, so handing out mutable
    /// access is safe.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FaceGroup> {
        self.face_groups.iter_mut()
    }

    pub fn face_group_at(&self, index: usize) -> Result<&FaceGroup> {
        let len = self.face_groups.len();
        self.face_groups
            .get(index)
            .ok_or(MeshError::IndexOutOfRange { index, len })
    }

    pub fn face_group_at_mut(&mut self, index: usize) -> Result<&mut FaceGroup> {
        let len = self.face_groups.len();
        self.face_groups
            .get_mut(index)
            .ok_or(MeshError::IndexOutOfRange { index, len })
    }

    pub fn add_face_group(&mut self, group: FaceGroup) {
        self.face_groups.push(group);
    }

    /// Insert at `index`; `index == face_group_count()` appends.
    pub fn insert_face_group(&mut self, group: FaceGroup, index: usize) -> Result<()> {
        let len = self.face_groups.len();
        if index > len {
            return Err(MeshError::IndexOutOfRange { index, len });
        }
        self.face_groups.insert(index, group);
        Ok(())
    }

    pub fn remove_last_face_group(&mut self) -> Result<FaceGroup> {
        self.face_groups.pop().ok_or(MeshError::Empty)
    }

    pub fn remove_face_group_at(&mut self, index: usize) -> Result<FaceGroup> {
        self.check_index(index)?;
        Ok(self.face_groups.remove(index))
    }

    /// Replace the group at `index`, returning the old one.
    pub fn replace_face_group_at(&mut self, index: usize, group: FaceGroup) -> Result<FaceGroup> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.face_groups[index], group))
    }

    /// Mesh-wide schema and homogeneity.
    ///
    /// The schema is the union of every group's schema. The mesh is
    /// homogeneous when every group is homogeneous under its own schema
    /// *and* that schema equals the mesh-wide one, so an empty group in a
    /// mesh with attributes makes it heterogeneous.
    pub fn get_vertex_schema(&mut self) -> (VertexSchema, bool) {
        let mut mesh_schema = VertexSchema::new();
        for group in &mut self.face_groups {
            mesh_schema = schema::union_of_schemata(&mesh_schema, group.vertex_schema());
        }

        let homogeneous = self
            .face_groups
            .iter_mut()
            .all(|g| g.is_homogeneous() && *g.vertex_schema() == mesh_schema);

        (mesh_schema, homogeneous)
    }

    pub fn vertex_schema(&mut self) -> VertexSchema {
        self.get_vertex_schema().0
    }

    pub fn is_homogeneous(&mut self) -> bool {
        self.get_vertex_schema().1
    }

    /// Largest schema every vertex of every group satisfies.
    pub fn common_schema(&self) -> VertexSchema {
        let mut groups = self.face_groups.iter().filter(|g| !g.is_empty());
        let Some(first) = groups.next() else {
            return VertexSchema::new();
        };
        groups.fold(schema::common_schema(first.faces()), |acc, g| {
            schema::intersection_of_schemata(&acc, &schema::common_schema(g.faces()))
        })
    }

    /// Restrict every group to [`Mesh::common_schema`], making every
    /// non-empty group share one schema.
    pub fn restrict_to_common_schema(&mut self) -> RestrictionReport {
        let target = self.common_schema();
        debug!(schema = ?target, "Restricting mesh to common schema");
        self.restrict_to_schema(&target)
    }

    /// Restrict every group to `target`.
    pub fn restrict_to_schema(&mut self, target: &VertexSchema) -> RestrictionReport {
        let mut report = RestrictionReport::default();
        for group in &mut self.face_groups {
            report.absorb(group.restrict_to_schema(target));
        }
        report
    }

    /// Append copies of `other`'s face groups, in order.
    ///
    /// Groups are deep-copied: `other` is unchanged and later edits to either
    /// mesh are not visible in the other. Copies start without listeners.
    /// Groups are neither deduplicated nor merged by material, and no schema
    /// unification happens.
    pub fn merge_mesh(&mut self, other: &Mesh) {
        self.face_groups.extend(other.face_groups.iter().cloned());
    }

    /// Union of all group bounding boxes.
    pub fn bounding_box(&mut self) -> BoundingBox {
        self.face_groups
            .iter_mut()
            .fold(BoundingBox::empty(), |acc, g| acc.merge(&g.bounding_box()))
    }

    /// Recompute every group's caches in parallel.
    pub fn refresh_caches(&mut self) {
        self.face_groups
            .par_iter_mut()
            .for_each(FaceGroup::refresh_caches);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.face_groups.len();
        if index < len {
            Ok(())
        } else {
            Err(MeshError::IndexOutOfRange { index, len })
        }
    }
}

impl<'a> IntoIterator for &'a Mesh {
    type Item = &'a FaceGroup;
    type IntoIter = std::slice::Iter<'a, FaceGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.face_groups.iter()
    }
}

impl FromIterator<FaceGroup> for Mesh {
    fn from_iter<I: IntoIterator<Item = FaceGroup>>(iter: I) -> Self {
        Self {
            name: None,
            face_groups: iter.into_iter().collect(),
        }
    }
}
