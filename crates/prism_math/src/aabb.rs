use crate::{Interval, Ray, Vec3};

/// Smallest extent an axis is padded to, so flat geometry still produces a
/// slab with non-zero thickness.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-aligned bounding box used by the BVH.
///
/// An AABB is three intervals, one per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Box containing nothing; the identity for `add_point` and `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
        .padded()
    }

    /// Grow the box so it contains `p`.
    pub fn add_point(&mut self, p: Vec3) {
        self.x = self.x.include(p.x);
        self.y = self.y.include(p.y);
        self.z = self.z.include(p.z);
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// True until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    /// Copy of the box with every axis at least `MIN_EXTENT` wide.
    pub fn padded(&self) -> Aabb {
        let pad = |i: Interval| {
            if i.size() < MIN_EXTENT {
                i.expand(MIN_EXTENT)
            } else {
                i
            }
        };
        Aabb {
            x: pad(self.x),
            y: pad(self.y),
            z: pad(self.z),
        }
    }

    /// Slab test: does the ray pass through the box anywhere in `ray_t`?
    ///
    /// Only used for pruning, so no entry point is reported.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let orig = r.origin[axis];

            let mut t0 = (slab.min - orig) * adinv;
            let mut t1 = (slab.max - orig) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.center(), self.y.center(), self.z.center())
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
