pub mod config;
pub mod error;
pub mod export;
pub mod face_group;
pub mod ingestion;
pub mod inspect;
pub mod mesh;
pub mod notify;
pub mod report;
pub mod schema;
pub mod types;

pub use config::{InspectConfig, OutputFormat};
pub use error::{MeshError, Result};
pub use export::IndexedArrays;
pub use face_group::{AttributeArrays, FaceGroup};
pub use inspect::Inspector;
pub use mesh::Mesh;
pub use notify::{ChangeFlags, ListenerId};
pub use schema::{RestrictionReport, VertexSchema, union_of_schemata};
