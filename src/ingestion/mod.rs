pub mod obj_loader;
pub mod ply_loader;

use std::path::Path;

use tracing::{debug, info};

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Obj,
    Ply,
}

impl InputFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Ok(InputFormat::Obj),
            "ply" => Ok(InputFormat::Ply),
            _ => Err(MeshError::Input(format!("Unsupported file format: .{ext}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Obj => "OBJ",
            InputFormat::Ply => "PLY",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load a mesh file, building each face group through the bulk constructor.
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    if !path.exists() {
        return Err(MeshError::Input(format!(
            "Input file not found: {}",
            path.display()
        )));
    }

    let format = InputFormat::from_path(path)?;
    info!(format = %format, path = %path.display(), "Detected input format");

    let mesh = match format {
        InputFormat::Obj => obj_loader::load_obj(path)?,
        InputFormat::Ply => ply_loader::load_ply(path)?,
    };

    debug!(
        groups = mesh.face_group_count(),
        faces = mesh.face_count(),
        "Loaded mesh"
    );
    Ok(mesh)
}

/// Mesh name derived from the file stem.
pub(crate) fn mesh_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
}
