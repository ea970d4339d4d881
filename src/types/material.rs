use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Material description as handed over by a loader.
///
/// The mesh model never interprets these fields; they ride along so a
/// downstream render-mesh compiler can resolve the real material.
#[derive(Debug, Clone)]
pub struct MaterialSpec {
    pub name: String,
    /// Base color factor [r, g, b, a].
    pub base_color: [f32; 4],
    /// Diffuse texture path, relative to the source asset.
    pub diffuse_map: Option<String>,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            diffuse_map: None,
        }
    }
}

/// Shared, non-owning handle to a material.
///
/// Equality is identity: two handles are equal only when they point at the
/// same allocation, even if the specs compare equal field by field.
#[derive(Clone)]
pub struct MaterialRef(Arc<MaterialSpec>);

impl MaterialRef {
    pub fn new(spec: MaterialSpec) -> Self {
        Self(Arc::new(spec))
    }

    pub fn spec(&self) -> &MaterialSpec {
        &self.0
    }
}

impl PartialEq for MaterialRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MaterialRef {}

impl Deref for MaterialRef {
    type Target = MaterialSpec;

    fn deref(&self) -> &MaterialSpec {
        &self.0
    }
}

impl fmt::Debug for MaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaterialRef({:?})", self.0.name)
    }
}

impl From<MaterialSpec> for MaterialRef {
    fn from(spec: MaterialSpec) -> Self {
        Self::new(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_spec_defaults() {
        let mat = MaterialSpec::default();
        assert_eq!(mat.name, "");
        assert_eq!(mat.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(mat.diffuse_map, None);
    }

    #[test]
    fn material_ref_compares_by_identity() {
        let spec = MaterialSpec {
            name: "hull".into(),
            ..Default::default()
        };
        let a = MaterialRef::new(spec.clone());
        let b = a.clone();
        let c = MaterialRef::new(spec);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.name, "hull");
        assert_eq!(format!("{a:?}"), "MaterialRef(\"hull\")");
    }
}
