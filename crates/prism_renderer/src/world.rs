//! Scene intersection queries.
//!
//! `World` owns the scene and, when acceleration is enabled, a BVH over its
//! triangles. Spheres are always tested one by one.

use prism_core::{Scene, Sphere, Triangle};
use prism_math::{ray_sphere, ray_triangle, Interval, Ray, TriangleHit};

use crate::{Bvh, HitRecord};

/// Minimum accepted ray parameter; keeps secondary rays from hitting the
/// surface they start on.
pub const RAY_EPSILON: f32 = 1e-4;

/// Far limit for rays that are not bounded by a light distance.
pub const MAX_T: f32 = 5000.0;

/// A scene ready for rendering.
///
/// Immutable once built and shared by reference across render workers.
pub struct World {
    scene: Scene,
    bvh: Option<Bvh>,
}

impl World {
    /// Wrap a scene, building the triangle BVH if `scene.accelerate` is set.
    pub fn new(scene: Scene) -> Self {
        let bvh = if scene.accelerate {
            let bvh = Bvh::build(&scene.triangles);
            if let Some(bvh) = &bvh {
                log::info!(
                    "Built BVH: {} nodes over {} triangles",
                    bvh.nodes().len(),
                    scene.triangles.len()
                );
            }
            bvh
        } else {
            None
        };

        Self { scene, bvh }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Closest hit with `RAY_EPSILON < t < max_t`.
    pub fn hit(&self, ray: &Ray, max_t: f32) -> Option<HitRecord<'_>> {
        let mut range = Interval::new(RAY_EPSILON, max_t);
        let mut closest = None;

        let triangle_hit = match &self.bvh {
            Some(bvh) => bvh.hit(&self.scene.triangles, ray, range),
            None => self.hit_triangles(ray, range),
        };
        if let Some((index, hit)) = triangle_hit {
            range.max = hit.t;
            closest = Some(triangle_record(&self.scene.triangles[index], ray, hit));
        }

        for sphere in &self.scene.spheres {
            if let Some(t) = ray_sphere(ray, range, sphere.center, sphere.radius) {
                range.max = t;
                closest = Some(sphere_record(sphere, ray, t));
            }
        }

        closest
    }

    /// True if anything is hit with `RAY_EPSILON < t < max_t`.
    pub fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        let range = Interval::new(RAY_EPSILON, max_t);

        let blocked = match &self.bvh {
            Some(bvh) => bvh.occluded(&self.scene.triangles, ray, range),
            None => self.scene.triangles.iter().any(|tri| {
                let [v1, v2, v3] = tri.vertices;
                ray_triangle(ray, range, v1, v2, v3).is_some()
            }),
        };

        blocked
            || self
                .scene
                .spheres
                .iter()
                .any(|sphere| ray_sphere(ray, range, sphere.center, sphere.radius).is_some())
    }

    fn hit_triangles(&self, ray: &Ray, ray_t: Interval) -> Option<(usize, TriangleHit)> {
        let mut range = ray_t;
        let mut closest = None;
        for (index, tri) in self.scene.triangles.iter().enumerate() {
            let [v1, v2, v3] = tri.vertices;
            if let Some(hit) = ray_triangle(ray, range, v1, v2, v3) {
                range.max = hit.t;
                closest = Some((index, hit));
            }
        }
        closest
    }
}

fn triangle_record<'a>(tri: &'a Triangle, ray: &Ray, hit: TriangleHit) -> HitRecord<'a> {
    let mut rec = HitRecord {
        t: hit.t,
        p: ray.at(hit.t),
        normal: tri.plane.normal,
        material: &tri.material,
        front_face: true,
        closed: false,
    };
    rec.set_face_normal(ray, tri.plane.normal, tri.normal_at(hit.u, hit.v));
    rec
}

fn sphere_record<'a>(sphere: &'a Sphere, ray: &Ray, t: f32) -> HitRecord<'a> {
    let p = ray.at(t);
    let outward = sphere.normal_at(p);
    let mut rec = HitRecord {
        t,
        p,
        normal: outward,
        material: &sphere.material,
        front_face: true,
        closed: true,
    };
    rec.set_face_normal(ray, outward, outward);
    rec
}
