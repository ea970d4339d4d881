use serde::Serialize;

/// Axis-aligned bounding box in 3-D.
///
/// [`BoundingBox::empty`] is the sentinel for "nothing to bound": its min is
/// `+inf` and its max `-inf`, so it is the identity for [`BoundingBox::merge`]
/// and [`BoundingBox::include_point`], and [`BoundingBox::is_valid`] is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub const fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Smallest box containing every point, or the empty sentinel.
    pub fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.include_point(p);
        }
        bb
    }

    /// Whether the box encloses at least one point.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|i| self.min[i] <= self.max[i])
    }

    /// Grow the box to contain `p`.
    pub fn include_point(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Return the smallest box that contains both `self` and `other`.
    pub fn merge(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }
}
