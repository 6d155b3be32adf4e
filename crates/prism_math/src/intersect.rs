//! Ray-primitive intersection predicates.
//!
//! Both predicates take the accepted parameter range as an [`Interval`]:
//! the lower bound rejects hits behind (or too close to) the origin, the
//! upper bound is the closest hit found so far.

use crate::{Interval, Ray, Vec3};

/// Determinant magnitude below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Squared direction length below which a ray is considered degenerate.
const DEGENERATE_DIRECTION: f32 = 1e-12;

/// Result of a ray-triangle test: distance and barycentric coordinates.
///
/// The hit point is `(1 - u - v) * v1 + u * v2 + v * v3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Intersect a ray with a sphere.
///
/// Returns the smallest root strictly inside `ray_t`, falling back to the
/// far root when the near one is rejected (origin inside the sphere).
pub fn ray_sphere(ray: &Ray, ray_t: Interval, center: Vec3, radius: f32) -> Option<f32> {
    let oc = center - ray.origin;
    let a = ray.direction.length_squared();
    if a < DEGENERATE_DIRECTION {
        return None;
    }
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    let near = (h - sqrtd) / a;
    if ray_t.surrounds(near) {
        return Some(near);
    }
    let far = (h + sqrtd) / a;
    ray_t.surrounds(far).then_some(far)
}

/// Möller-Trumbore ray-triangle intersection.
pub fn ray_triangle(ray: &Ray, ray_t: Interval, v1: Vec3, v2: Vec3, v3: Vec3) -> Option<TriangleHit> {
    let edge1 = v2 - v1;
    let edge2 = v3 - v1;

    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v1;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    ray_t.surrounds(t).then_some(TriangleHit { t, u, v })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: Interval = Interval {
        min: 1e-4,
        max: 5000.0,
    };

    #[test]
    fn test_sphere_hit_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray_sphere(&ray, RANGE, Vec3::ZERO, 1.0).unwrap();

        assert!((t - 4.0).abs() < 1e-5);
        let normal = ray.at(t).normalize();
        assert!((normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(ray_sphere(&ray, RANGE, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_from_inside_takes_far_root() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_sphere(&ray, RANGE, Vec3::ZERO, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(ray_sphere(&ray, RANGE, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_beyond_max_t() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray_sphere(&ray, RANGE.with_max(3.0), Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_sphere_degenerate_direction() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!(ray_sphere(&ray, RANGE, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_triangle_hit_barycentrics() {
        let (v1, v2, v3) = (
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        );
        let ray = Ray::new(Vec3::new(0.2, -0.3, 0.0), Vec3::NEG_Z);
        let hit = ray_triangle(&ray, RANGE, v1, v2, v3).unwrap();

        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!(hit.u >= 0.0 && hit.v >= 0.0 && hit.u + hit.v <= 1.0);

        let reconstructed = (1.0 - hit.u - hit.v) * v1 + hit.u * v2 + hit.v * v3;
        assert!((reconstructed - ray.at(hit.t)).length() < 1e-5);
    }

    #[test]
    fn test_triangle_hit_from_back_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -4.0), Vec3::Z);
        let hit = ray_triangle(
            &ray,
            RANGE,
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        );
        assert!((hit.unwrap().t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z);
        let hit = ray_triangle(
            &ray,
            RANGE,
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -2.0), Vec3::X);
        let hit = ray_triangle(
            &ray,
            RANGE,
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -2.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_triangle_random_hits_are_consistent() {
        use std::f32::consts::TAU;

        // Fan of rays through a fixed triangle, deterministic angles
        let (v1, v2, v3) = (
            Vec3::new(-2.0, -1.0, -3.0),
            Vec3::new(2.0, -1.5, -3.5),
            Vec3::new(0.5, 2.0, -2.5),
        );
        for k in 0..64 {
            let angle = k as f32 / 64.0 * TAU;
            let dir = Vec3::new(angle.cos() * 0.6, angle.sin() * 0.6, -1.0).normalize();
            let ray = Ray::new(Vec3::ZERO, dir);
            if let Some(hit) = ray_triangle(&ray, RANGE, v1, v2, v3) {
                assert!(hit.u >= 0.0 && hit.v >= 0.0 && hit.u + hit.v <= 1.0 + 1e-6);
                let p = (1.0 - hit.u - hit.v) * v1 + hit.u * v2 + hit.v * v3;
                assert!((p - ray.at(hit.t)).length() < 1e-4);
            }
        }
    }
}
