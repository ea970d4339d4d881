use std::fmt;

use serde::Serialize;

use crate::face_group::FaceGroup;
use crate::mesh::Mesh;
use crate::schema::VertexSchema;
use crate::types::BoundingBox;

/// Snapshot of one face group's derived state.
#[derive(Debug, Clone, Serialize)]
pub struct FaceGroupSummary {
    pub name: Option<String>,
    pub material: Option<String>,
    pub face_count: usize,
    pub vertex_schema: VertexSchema,
    pub persisted_schema: VertexSchema,
    pub homogeneous: bool,
    pub temporary_attributes: Vec<String>,
    /// `None` when the group has no positions.
    pub bounding_box: Option<BoundingBox>,
}

impl FaceGroupSummary {
    pub fn from_group(group: &mut FaceGroup) -> Self {
        let bounds = group.bounding_box();
        Self {
            name: group.name().map(str::to_owned),
            material: group.material().map(|m| m.name.clone()),
            face_count: group.face_count(),
            vertex_schema: group.vertex_schema().clone(),
            persisted_schema: group.vertex_schema_ignoring_temporary().clone(),
            homogeneous: group.is_homogeneous(),
            temporary_attributes: group.temporary_attributes().map(|n| n.to_string()).collect(),
            bounding_box: bounds.is_valid().then_some(bounds),
        }
    }
}

/// Snapshot of a mesh and all of its groups.
#[derive(Debug, Clone, Serialize)]
pub struct MeshSummary {
    pub name: Option<String>,
    pub face_group_count: usize,
    pub face_count: usize,
    pub vertex_schema: VertexSchema,
    pub homogeneous: bool,
    pub bounding_box: Option<BoundingBox>,
    pub groups: Vec<FaceGroupSummary>,
}

impl MeshSummary {
    pub fn from_mesh(mesh: &mut Mesh) -> Self {
        mesh.refresh_caches();
        let (vertex_schema, homogeneous) = mesh.get_vertex_schema();
        let bounds = mesh.bounding_box();
        Self {
            name: mesh.name().map(str::to_owned),
            face_group_count: mesh.face_group_count(),
            face_count: mesh.face_count(),
            vertex_schema,
            homogeneous,
            bounding_box: bounds.is_valid().then_some(bounds),
            groups: mesh.iter_mut().map(FaceGroupSummary::from_group).collect(),
        }
    }
}

fn write_schema(f: &mut fmt::Formatter<'_>, schema: &VertexSchema) -> fmt::Result {
    if schema.is_empty() {
        return write!(f, "(none)");
    }
    let parts: Vec<String> = schema.iter().map(|(n, s)| format!("{n}:{s}")).collect();
    write!(f, "{}", parts.join(", "))
}

fn write_bounds(f: &mut fmt::Formatter<'_>, bounds: &Option<BoundingBox>) -> fmt::Result {
    match bounds {
        Some(bb) => write!(
            f,
            "({:.3}, {:.3}, {:.3}) → ({:.3}, {:.3}, {:.3})",
            bb.min[0], bb.min[1], bb.min[2], bb.max[0], bb.max[1], bb.max[2]
        ),
        None => write!(f, "(empty)"),
    }
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Mesh {} ===", self.name.as_deref().unwrap_or("<unnamed>"))?;
        writeln!(f, "  Face groups: {}", self.face_group_count)?;
        writeln!(f, "  Faces:       {}", self.face_count)?;
        write!(f, "  Schema:      ")?;
        write_schema(f, &self.vertex_schema)?;
        writeln!(f)?;
        writeln!(f, "  Homogeneous: {}", if self.homogeneous { "yes" } else { "no" })?;
        write!(f, "  Bounds:      ")?;
        write_bounds(f, &self.bounding_box)?;
        writeln!(f)?;

        for (i, g) in self.groups.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "  [{i}] {}", g.name.as_deref().unwrap_or("<unnamed>"))?;
            writeln!(f, "    Material:  {}", g.material.as_deref().unwrap_or("(none)"))?;
            writeln!(f, "    Faces:     {}", g.face_count)?;
            write!(f, "    Schema:    ")?;
            write_schema(f, &g.vertex_schema)?;
            writeln!(f)?;
            if !g.temporary_attributes.is_empty() {
                writeln!(f, "    Temporary: {}", g.temporary_attributes.join(", "))?;
            }
            writeln!(f, "    Homogeneous: {}", if g.homogeneous { "yes" } else { "no" })?;
            write!(f, "    Bounds:    ")?;
            write_bounds(f, &g.bounding_box)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
