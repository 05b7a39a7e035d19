use std::ops::Index;

use crate::Vec3;

/// Axis-aligned bounding box used by shapes and the BVH.
///
/// Stored as two corners with `min <= max` componentwise. The empty box has
/// `min = +inf` and `max = -inf`, so the union with any other box yields that
/// box unchanged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    /// Create bounds from two corners that are already ordered.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create bounds from any two opposite corners.
    ///
    /// Axes thinner than a small delta are padded so flat shapes (the plane
    /// patch) still enclose a volume.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut bounds = Self {
            min: a.min(b),
            max: a.max(b),
        };
        bounds.pad_to_minimums();
        bounds
    }

    /// Create bounds that surround two other bounds.
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        Bounds3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow to include a point.
    pub fn inflate(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True when min > max on some axis.
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Surface area; zero for empty bounds.
    pub fn area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn max_dim(&self) -> usize {
        let s = self.size();
        if s.x > s.y && s.x > s.z {
            0
        } else if s.y > s.z {
            1
        } else {
            2
        }
    }

    /// True if `p` lies inside or on the boundary.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// The eight corners, in x-fastest order.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Pad axes to avoid zero-width bounds (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < delta {
                self.min[axis] -= delta * 0.5;
                self.max[axis] += delta * 0.5;
            }
        }
    }

    pub const EMPTY: Bounds3 = Bounds3 {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// `bounds[0]` is the min corner, `bounds[1]` the max corner.
impl Index<usize> for Bounds3 {
    type Output = Vec3;

    fn index(&self, i: usize) -> &Vec3 {
        match i {
            0 => &self.min,
            _ => &self.max,
        }
    }
}
