//! Prism math kernel.
//!
//! Vector types come from glam and are re-exported here so downstream
//! crates only depend on `prism_math`. On top of that this crate provides
//! rays, parameter intervals, axis-aligned boxes and the ray-primitive
//! intersection predicates used by the tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod intersect;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use intersect::{ray_sphere, ray_triangle, TriangleHit};
pub use ray::Ray;

/// Linear RGB radiance. Components are unclamped until the image sink.
pub type Color = Vec3;

/// Vector helpers not covered by glam.
pub trait Vec3Ext {
    /// Normalize in place and return the length the vector had before.
    ///
    /// A zero vector is left untouched and reports length 0.
    fn normalize_in_place(&mut self) -> f32;
}

impl Vec3Ext for Vec3 {
    fn normalize_in_place(&mut self) -> f32 {
        let len = self.length();
        if len > 0.0 {
            *self /= len;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_in_place_returns_prior_length() {
        let mut v = Vec3::new(3.0, 0.0, 4.0);
        let len = v.normalize_in_place();
        assert_eq!(len, 5.0);
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_normalize_in_place_zero_is_noop() {
        let mut v = Vec3::ZERO;
        assert_eq!(v.normalize_in_place(), 0.0);
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn test_color_is_componentwise() {
        let a = Color::new(0.5, 1.0, 2.0);
        let b = Color::new(2.0, 0.5, 0.25);
        assert_eq!(a * b, Color::new(1.0, 0.5, 0.5));
    }
}
