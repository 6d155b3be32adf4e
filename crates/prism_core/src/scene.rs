//! Scene types for the Whitted ray tracer.
//!
//! Everything here is plain data: a `Scene` is built once (usually by the
//! loader), then handed to the renderer and only ever read.

use std::path::PathBuf;

use prism_math::{Aabb, Color, Vec3, Vec3Ext};

/// Phong-style surface description with optional mirror and glass terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Reflectance for the scene's ambient light
    pub ambient: Color,
    /// Lambertian reflectance
    pub diffuse: Color,
    /// Phong highlight color, also weights mirror reflection
    pub specular: Color,
    /// Phong exponent
    pub shininess: f32,
    /// Weight of the refracted ray
    pub transmissive: Color,
    /// Index of refraction (1 = vacuum)
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::ZERO,
            diffuse: Color::ONE, // matte white
            specular: Color::ZERO,
            shininess: 5.0,
            transmissive: Color::ZERO,
            ior: 1.0,
        }
    }
}

impl Material {
    /// Create a matte material with the given diffuse color.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        (p - self.center) / self.radius
    }
}

/// Supporting plane `normal . x + dist = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    /// Signed distance from the plane to `p`.
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.dist
    }
}

/// A triangle with its plane precomputed at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub plane: Plane,
    pub area: f32,
    pub material: Material,
    /// Per-vertex normals for smooth shading
    pub normals: Option<[Vec3; 3]>,
}

impl Triangle {
    /// Create a flat-shaded triangle.
    ///
    /// A degenerate (zero area) triangle keeps a zero normal; it can never
    /// be hit because the intersection test rejects it as parallel.
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3, material: Material) -> Self {
        let mut normal = (v2 - v1).cross(v3 - v1);
        let twice_area = normal.normalize_in_place();

        Self {
            vertices: [v1, v2, v3],
            plane: Plane {
                normal,
                dist: -normal.dot(v1),
            },
            area: twice_area * 0.5,
            material,
            normals: None,
        }
    }

    /// Attach per-vertex normals, enabling interpolated shading normals.
    pub fn with_vertex_normals(mut self, n1: Vec3, n2: Vec3, n3: Vec3) -> Self {
        self.normals = Some([n1.normalize_or_zero(), n2.normalize_or_zero(), n3.normalize_or_zero()]);
        self
    }

    /// Shading normal at barycentric `(u, v)`, not yet oriented to a ray.
    pub fn normal_at(&self, u: f32, v: f32) -> Vec3 {
        match self.normals {
            Some([n1, n2, n3]) => {
                let n = (1.0 - u - v) * n1 + u * n2 + v * n3;
                let n = n.normalize_or_zero();
                if n == Vec3::ZERO {
                    self.plane.normal
                } else {
                    n
                }
            }
            None => self.plane.normal,
        }
    }

    /// Mean of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// Tight (unpadded) bounds of the three vertices.
    pub fn bounds(&self) -> Aabb {
        let mut bbox = Aabb::EMPTY;
        for v in self.vertices {
            bbox.add_point(v);
        }
        bbox
    }
}

/// Light arriving from infinitely far away along `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Unit direction the light travels in
    pub direction: Vec3,
    pub intensity: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
}

/// Point light restricted to a cone.
///
/// Full intensity inside `inner_angle`, nothing past `outer_angle`, with a
/// smooth falloff in between. Angles are half-angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    /// Unit axis of the cone, pointing away from the light
    pub direction: Vec3,
    pub intensity: Color,
    pub inner_angle: f32,
    pub outer_angle: f32,
}

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)` for
/// point and spot lights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 2.0,
            linear: 2.0,
            quadratic: 0.3,
        }
    }
}

impl Attenuation {
    /// Scale factor for a light at distance `d`.
    pub fn factor(&self, d: f32) -> f32 {
        1.0 / (self.constant + self.linear * d + self.quadratic * d * d)
    }
}

/// Pinhole camera with an orthonormal basis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Vertical half-angle field of view in degrees
    pub half_fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::NEG_X,
            half_fov: 45.0,
        }
    }
}

impl Camera {
    /// Build a camera from an eye point and rough forward/up hints.
    ///
    /// `right = up x forward` and `up` is then recomputed from `forward x
    /// right`, so `up` only needs to be roughly perpendicular. Returns
    /// `None` when `up` and `forward` are parallel or either is zero.
    pub fn new(eye: Vec3, forward: Vec3, up: Vec3, half_fov: f32) -> Option<Self> {
        let mut right = up.cross(forward);
        if right.normalize_in_place() <= f32::EPSILON {
            return None;
        }
        let mut up = forward.cross(right);
        up.normalize_in_place();
        let mut forward = forward;
        forward.normalize_in_place();

        Some(Self {
            eye,
            forward,
            up,
            right,
            half_fov,
        })
    }
}

/// Everything needed to render one image.
#[derive(Clone, Debug)]
pub struct Scene {
    pub camera: Camera,
    pub background: Color,
    pub ambient_light: Color,

    pub spheres: Vec<Sphere>,
    pub triangles: Vec<Triangle>,

    pub directional_lights: Vec<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub spot_lights: Vec<SpotLight>,
    pub attenuation: Attenuation,

    /// Deepest recursion level that still spawns secondary rays
    pub max_depth: u32,
    pub width: u32,
    pub height: u32,
    pub output_image: PathBuf,

    /// Intersect triangles through a BVH instead of brute force
    pub accelerate: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            background: Color::ZERO,
            ambient_light: Color::ZERO,
            spheres: Vec::new(),
            triangles: Vec::new(),
            directional_lights: Vec::new(),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            attenuation: Attenuation::default(),
            max_depth: 5,
            width: 640,
            height: 480,
            output_image: PathBuf::from("raytraced.bmp"),
            accelerate: false,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of lights of any kind (ambient excluded).
    pub fn light_count(&self) -> usize {
        self.directional_lights.len() + self.point_lights.len() + self.spot_lights.len()
    }

    /// Total number of spheres and triangles.
    pub fn primitive_count(&self) -> usize {
        self.spheres.len() + self.triangles.len()
    }

    /// Bounds of all geometry; `Aabb::EMPTY` for an empty scene.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for tri in &self.triangles {
            bounds = Aabb::surrounding(&bounds, &tri.bounds());
        }
        for sphere in &self.spheres {
            let r = Vec3::splat(sphere.radius);
            bounds.add_point(sphere.center - r);
            bounds.add_point(sphere.center + r);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_plane_and_area() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Material::default(),
        );

        assert!((tri.plane.normal - Vec3::Z).length() < 1e-6);
        assert_eq!(tri.area, 2.0);
        for v in tri.vertices {
            assert!(tri.plane.distance(v).abs() < 1e-6);
        }
        assert!((tri.plane.distance(Vec3::new(0.0, 0.0, 3.0)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle_interpolated_normal() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, Material::default())
            .with_vertex_normals(Vec3::Z, Vec3::X, Vec3::Y);

        // At a vertex the interpolated normal equals that vertex's normal
        assert!((tri.normal_at(0.0, 0.0) - Vec3::Z).length() < 1e-6);
        assert!((tri.normal_at(1.0, 0.0) - Vec3::X).length() < 1e-6);
        assert!((tri.normal_at(0.0, 1.0) - Vec3::Y).length() < 1e-6);

        let mid = tri.normal_at(1.0 / 3.0, 1.0 / 3.0);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        assert!((mid - Vec3::ONE.normalize()).length() < 1e-5);
    }

    #[test]
    fn test_flat_triangle_uses_plane_normal() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, Material::default());
        assert_eq!(tri.normal_at(0.25, 0.25), tri.plane.normal);
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Material::default());
        assert_eq!(tri.area, 0.0);
        assert_eq!(tri.plane.normal, Vec3::ZERO);
    }

    #[test]
    fn test_camera_basis_is_orthonormal() {
        let cam = Camera::new(
            Vec3::new(0.0, 1.0, 5.0),
            Vec3::new(0.0, -0.2, -1.0),
            Vec3::Y,
            30.0,
        )
        .unwrap();

        for v in [cam.forward, cam.up, cam.right] {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
        assert!(cam.forward.dot(cam.up).abs() < 1e-5);
        assert!(cam.forward.dot(cam.right).abs() < 1e-5);
        assert!(cam.up.dot(cam.right).abs() < 1e-5);
    }

    #[test]
    fn test_default_camera_matches_constructed() {
        let built = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 45.0).unwrap();
        let default = Camera::default();
        assert!((built.right - default.right).length() < 1e-6);
        assert!((built.up - default.up).length() < 1e-6);
    }

    #[test]
    fn test_camera_rejects_parallel_up() {
        assert!(Camera::new(Vec3::ZERO, Vec3::Y, Vec3::Y, 45.0).is_none());
    }

    #[test]
    fn test_scene_bounds() {
        let mut scene = Scene::new();
        assert!(scene.bounds().is_empty());

        scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default()));
        scene.triangles.push(Triangle::new(
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Material::default(),
        ));

        let bounds = scene.bounds();
        assert_eq!(bounds.x.min, -3.0);
        assert_eq!(bounds.y.max, 2.0);
        assert_eq!(bounds.z.min, -6.0);
        assert_eq!(bounds.z.max, 1.0);
        assert_eq!(scene.primitive_count(), 2);
    }

    #[test]
    fn test_attenuation_default_constants() {
        let att = Attenuation::default();
        assert_eq!(att.factor(0.0), 0.5);
        assert!((att.factor(1.0) - 1.0 / 4.3).abs() < 1e-6);
    }
}
