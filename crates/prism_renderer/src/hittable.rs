//! HitRecord for ray-surface intersection.

use prism_core::Material;
use prism_math::{Ray, Vec3};

/// Record of the closest ray-surface intersection.
#[derive(Clone, Copy, Debug)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit shading normal, always pointing against the ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Whether the surface encloses a volume (spheres); only closed
    /// surfaces refract
    pub closed: bool,
}

impl<'a> HitRecord<'a> {
    /// Orient the shading normal against the ray.
    ///
    /// `geometric` decides which side was hit; `shading` is the normal that
    /// gets stored (the same vector for flat surfaces).
    pub fn set_face_normal(&mut self, ray: &Ray, geometric: Vec3, shading: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction.dot(geometric) < 0.0;

        // Normal always points against the ray
        self.normal = if self.front_face { shading } else { -shading };
    }
}
