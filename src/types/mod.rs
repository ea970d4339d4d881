pub mod attribute;
pub mod bounds;
pub mod face;
pub mod material;

pub use attribute::{AttributeName, Vertex};
pub use bounds::BoundingBox;
pub use face::Face;
pub use material::{MaterialRef, MaterialSpec};
