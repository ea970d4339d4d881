use std::io;

/// All error types for the abstract mesh model.
#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    #[error("Index {index} out of range (count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Container is empty")]
    Empty,
    #[error("Invalid geometry data: {0}")]
    InvalidGeometryData(String),
    #[error("Vertex schema is not homogeneous")]
    NotHomogeneous,
    #[error("Input error: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MeshError {
    pub(crate) fn invalid_geometry(details: impl Into<String>) -> Self {
        Self::InvalidGeometryData(details.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MeshError>;
