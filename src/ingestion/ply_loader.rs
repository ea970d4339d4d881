use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::face_group::{AttributeArrays, FaceGroup};
use crate::mesh::Mesh;
use crate::types::attribute::{COLOR, NORMAL, POSITION, TEXCOORD};

/// Load a PLY file into a single-group mesh.
pub fn load_ply(path: &Path) -> Result<Mesh> {
    let file = File::open(path)
        .map_err(|e| MeshError::Input(format!("Failed to open PLY: {e}")))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| MeshError::Input(format!("Failed to parse PLY: {e}")))?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::Input("PLY file missing 'vertex' element".into()))?;

    debug!(vertex_count = vertices.len(), "Parsing PLY vertices");

    let first = vertices.first();
    let has = |key: &str| first.is_some_and(|v| v.contains_key(key));
    let has_normals = has("nx");
    let has_colors = has("red") || has("r");
    let uv_keys = if has("u") {
        Some(("u", "v"))
    } else if has("s") {
        Some(("s", "t"))
    } else {
        None
    };

    let mut positions = Vec::with_capacity(vertices.len() * 3);
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut colors = Vec::new();

    for vertex in vertices {
        positions.push(get_float_property(vertex, "x")?);
        positions.push(get_float_property(vertex, "y")?);
        positions.push(get_float_property(vertex, "z")?);

        if has_normals {
            normals.push(get_float_property(vertex, "nx")?);
            normals.push(get_float_property(vertex, "ny")?);
            normals.push(get_float_property(vertex, "nz")?);
        }

        if let Some((u, v)) = uv_keys {
            uvs.push(get_float_property(vertex, u)?);
            uvs.push(get_float_property(vertex, v)?);
        }

        if has_colors {
            let (r, g, b) = get_color_property(vertex)?;
            colors.extend_from_slice(&[r, g, b, 1.0]);
        }
    }

    let mut indices = Vec::new();
    if let Some(faces) = ply.payload.get("face") {
        debug!(face_count = faces.len(), "Parsing PLY faces");
        for face in faces {
            let face_indices = get_index_list(face)?;
            // Fan-triangulate polygons with >3 vertices
            if face_indices.len() >= 3 {
                for i in 1..face_indices.len() - 1 {
                    indices.push(face_indices[0]);
                    indices.push(face_indices[i]);
                    indices.push(face_indices[i + 1]);
                }
            }
        }
    }

    let mut arrays = AttributeArrays::new();
    for (name, data) in [
        (POSITION, positions),
        (NORMAL, normals),
        (TEXCOORD, uvs),
        (COLOR, colors),
    ] {
        if !data.is_empty() {
            arrays.insert(name.into(), data);
        }
    }

    let group = FaceGroup::from_attribute_arrays(&arrays, vertices.len(), &indices)?;
    let mut mesh = Mesh::new();
    mesh.set_name(super::mesh_name(path));
    mesh.add_face_group(group);
    Ok(mesh)
}

/// Numeric value of a scalar property and whether it came from an integer
/// type.
fn scalar(prop: &Property) -> Option<(f32, bool)> {
    Some(match *prop {
        Property::Float(v) => (v, false),
        Property::Double(v) => (v as f32, false),
        Property::Char(v) => (v as f32, true),
        Property::UChar(v) => (v as f32, true),
        Property::Short(v) => (v as f32, true),
        Property::UShort(v) => (v as f32, true),
        Property::Int(v) => (v as f32, true),
        Property::UInt(v) => (v as f32, true),
        _ => return None,
    })
}

fn read_scalar(element: &DefaultElement, key: &str) -> Result<(f32, bool)> {
    let prop = element
        .get(key)
        .ok_or_else(|| MeshError::Input(format!("PLY vertex missing property '{key}'")))?;
    scalar(prop)
        .ok_or_else(|| MeshError::Input(format!("PLY property '{key}' is not a scalar")))
}

fn get_float_property(element: &DefaultElement, key: &str) -> Result<f32> {
    read_scalar(element, key).map(|(v, _)| v)
}

/// RGB in 0..1; integer channels are scaled from 0..255.
fn get_color_property(element: &DefaultElement) -> Result<(f32, f32, f32)> {
    let channel = |long: &str, short: &str| {
        let key = if element.contains_key(long) { long } else { short };
        read_scalar(element, key).map(|(v, integer)| if integer { v / 255.0 } else { v })
    };
    Ok((channel("red", "r")?, channel("green", "g")?, channel("blue", "b")?))
}

fn get_index_list(face: &DefaultElement) -> Result<Vec<u32>> {
    let prop = face
        .get("vertex_indices")
        .or_else(|| face.get("vertex_index"))
        .ok_or_else(|| MeshError::Input("PLY face missing vertex_indices property".into()))?;

    // Negative indices wrap out of range and are rejected by the bulk
    // constructor.
    match prop {
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListInt(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListShort(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        _ => Err(MeshError::Input(
            "PLY face vertex_indices is not an integer list".into(),
        )),
    }
}
