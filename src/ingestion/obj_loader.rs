use std::path::Path;

use tracing::{debug, warn};

use crate::error::{MeshError, Result};
use crate::face_group::{AttributeArrays, FaceGroup};
use crate::mesh::Mesh;
use crate::types::attribute::{COLOR, NORMAL, POSITION, TEXCOORD};
use crate::types::{MaterialRef, MaterialSpec};

/// Load an OBJ file (+ associated MTL) into a mesh, one face group per model.
///
/// Groups that share an MTL material share one [`MaterialRef`].
pub fn load_obj(path: &Path) -> Result<Mesh> {
    let (models, materials_result) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .map_err(|e| MeshError::Input(format!("Failed to load OBJ: {e}")))?;

    debug!(model_count = models.len(), "Loaded OBJ models");

    let tobj_materials = match materials_result {
        Ok(mats) => mats,
        Err(e) => {
            warn!("Failed to load MTL: {e}");
            Vec::new()
        }
    };
    let materials: Vec<MaterialRef> = tobj_materials.iter().map(convert_material).collect();

    let mut mesh = Mesh::new();
    mesh.set_name(super::mesh_name(path));

    for model in models {
        let mut group = convert_mesh(&model.mesh)
            .inspect_err(|e| warn!(model = %model.name, "Rejected OBJ model: {e}"))?;
        group.set_name(Some(model.name));
        if let Some(material) = model.mesh.material_id.and_then(|id| materials.get(id)) {
            group.set_material(Some(material.clone()));
        }
        mesh.add_face_group(group);
    }

    Ok(mesh)
}

/// Convert a `tobj::Mesh` into a face group via the bulk constructor.
fn convert_mesh(mesh: &tobj::Mesh) -> Result<FaceGroup> {
    let vertex_count = mesh.positions.len() / 3;

    let mut arrays = AttributeArrays::new();
    arrays.insert(POSITION.into(), mesh.positions.clone());
    for (name, data) in [
        (NORMAL, &mesh.normals),
        (TEXCOORD, &mesh.texcoords),
        (COLOR, &mesh.vertex_color),
    ] {
        if !data.is_empty() {
            arrays.insert(name.into(), data.clone());
        }
    }

    FaceGroup::from_attribute_arrays(&arrays, vertex_count, &mesh.indices)
}

/// Kd + d -> base color, map_Kd -> diffuse map.
fn convert_material(mat: &tobj::Material) -> MaterialRef {
    let mut spec = MaterialSpec {
        name: mat.name.clone(),
        diffuse_map: mat.diffuse_texture.clone(),
        ..Default::default()
    };
    if let Some(diffuse) = mat.diffuse {
        spec.base_color = [
            diffuse[0],
            diffuse[1],
            diffuse[2],
            mat.dissolve.unwrap_or(1.0),
        ];
    }
    MaterialRef::new(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_mesh_basic() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            texcoords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
            vertex_color: vec![],
            face_arities: vec![],
            texcoord_indices: vec![],
            normal_indices: vec![],
            material_id: Some(0),
        };

        let mut group = convert_mesh(&mesh).unwrap();
        assert_eq!(group.face_count(), 1);
        assert!(group.is_homogeneous());
        let schema = group.vertex_schema();
        assert_eq!(schema.get(POSITION), Some(3));
        assert_eq!(schema.get(NORMAL), Some(3));
        assert_eq!(schema.get(TEXCOORD), Some(2));
        assert!(!schema.contains(COLOR));
    }

    #[test]
    fn convert_mesh_rejects_dangling_index() {
        let mesh = tobj::Mesh {
            positions: vec![0.0; 9],
            indices: vec![0, 1, 5],
            ..Default::default()
        };
        assert!(matches!(
            convert_mesh(&mesh),
            Err(MeshError::InvalidGeometryData(_))
        ));
    }

    #[test]
    fn convert_material_colors() {
        let mat = tobj::Material {
            name: "paint".into(),
            diffuse: Some([0.5, 0.25, 1.0]),
            dissolve: Some(0.5),
            diffuse_texture: Some("paint.png".into()),
            ..Default::default()
        };
        let material = convert_material(&mat);
        assert_eq!(material.name, "paint");
        assert_eq!(material.base_color, [0.5, 0.25, 1.0, 0.5]);
        assert_eq!(material.diffuse_map.as_deref(), Some("paint.png"));
    }
}
