use crate::Vec3;

/// A ray in 3D space: `origin + t * direction`.
///
/// The direction is not required to be unit length, but every ray the
/// tracer generates is normalized so that `t` measures distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Z);

        assert_eq!(ray.at(0.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(ray.at(-1.0), Vec3::new(1.0, 0.0, 1.0));
    }
}
