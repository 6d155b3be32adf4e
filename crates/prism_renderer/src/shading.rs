//! Whitted-style shading.
//!
//! Local illumination is ambient plus Lambert diffuse plus a Phong
//! highlight for every unshadowed light. Mirror reflection and refraction
//! are traced recursively, split by a Schlick Fresnel term, until the
//! scene's max depth is reached.

use prism_core::{Material, SpotLight};
use prism_math::{Color, Ray, Vec3, Vec3Ext};

use crate::world::{World, MAX_T};
use crate::HitRecord;

/// Colors with every component below this carry no visible energy.
const ENERGY_EPSILON: f32 = 1e-4;

/// Lights at or below this `N.L` are treated as behind the surface.
const FACING_EPSILON: f32 = 1e-4;

/// Trace a ray into the world and return the radiance it carries.
///
/// Primary rays start at depth 1. Rays deeper than the scene's
/// `max_depth` are still shaded locally but spawn no secondary rays.
pub fn trace_ray(world: &World, ray: &Ray, depth: u32) -> Color {
    match world.hit(ray, MAX_T) {
        Some(rec) => shade(world, ray, &rec, depth),
        None => world.scene().background,
    }
}

/// Shade a surface hit, recursing for reflection and refraction.
///
/// The result is clamped to `[0, 1]` per component.
pub fn shade(world: &World, ray: &Ray, rec: &HitRecord<'_>, depth: u32) -> Color {
    let scene = world.scene();
    let material = rec.material;
    let view = -ray.direction.normalize();
    let n = rec.normal;

    let mut color = scene.ambient_light * material.ambient;

    for light in &scene.directional_lights {
        let to_light = -light.direction;
        color += light.intensity * direct(world, rec, view, to_light, MAX_T);
    }

    for light in &scene.point_lights {
        let mut to_light = light.position - rec.p;
        let dist = to_light.normalize_in_place();
        let falloff = scene.attenuation.factor(dist);
        color += light.intensity * falloff * direct(world, rec, view, to_light, dist);
    }

    for light in &scene.spot_lights {
        let mut to_light = light.position - rec.p;
        let dist = to_light.normalize_in_place();
        let cone = spot_factor(light, -to_light);
        if cone > 0.0 {
            let falloff = scene.attenuation.factor(dist);
            color += light.intensity * (cone * falloff) * direct(world, rec, view, to_light, dist);
        }
    }

    if depth <= scene.max_depth {
        // The normal faces the viewer, so front_face tells which medium we are in
        let (n1, n2) = if rec.front_face {
            (1.0, material.ior)
        } else {
            (material.ior, 1.0)
        };
        let cos_i = n.dot(view).clamp(0.0, 1.0);
        let fresnel = schlick(cos_i, n1, n2);

        if has_energy(material.specular) && fresnel > 0.0 {
            let reflected = Ray::new(rec.p, reflect(-view, n));
            color += material.specular * fresnel * trace_ray(world, &reflected, depth + 1);
        }

        if rec.closed && has_energy(material.transmissive) && fresnel < 1.0 {
            if let Some(dir) = refract(-view, n, n1 / n2) {
                let refracted = Ray::new(rec.p, dir);
                color += material.transmissive * (1.0 - fresnel) * trace_ray(world, &refracted, depth + 1);
            }
        }
    }

    color.clamp(Color::ZERO, Color::ONE)
}

/// Diffuse plus specular response to a unit-intensity light in direction
/// `to_light`, or zero if the light is behind the surface or blocked.
fn direct(world: &World, rec: &HitRecord<'_>, view: Vec3, to_light: Vec3, light_dist: f32) -> Color {
    let n_dot_l = rec.normal.dot(to_light);
    if n_dot_l <= FACING_EPSILON {
        return Color::ZERO;
    }
    if world.occluded(&Ray::new(rec.p, to_light), light_dist) {
        return Color::ZERO;
    }
    phong(rec.material, rec.normal, view, to_light, n_dot_l)
}

fn phong(material: &Material, n: Vec3, view: Vec3, to_light: Vec3, n_dot_l: f32) -> Color {
    let mirrored = 2.0 * n_dot_l * n - to_light;
    let highlight = mirrored.dot(view).clamp(0.0, 1.0).powf(material.shininess);
    material.diffuse * n_dot_l.min(1.0) + material.specular * highlight
}

/// Cone attenuation for a spot light; `light_to_point` is unit length.
fn spot_factor(light: &SpotLight, light_to_point: Vec3) -> f32 {
    let cos_theta = light.direction.dot(light_to_point);
    let cos_outer = light.outer_angle.to_radians().cos();
    let cos_inner = light.inner_angle.to_radians().cos();

    if cos_theta < cos_outer {
        0.0
    } else if cos_inner <= cos_outer || cos_theta >= cos_inner {
        1.0
    } else {
        let x = (cos_theta - cos_outer) / (cos_inner - cos_outer);
        x * x * (3.0 - 2.0 * x)
    }
}

/// Schlick's approximation of the reflected fraction going from index
/// `n1` into `n2`. Total internal reflection returns 1.
pub fn schlick(cos_i: f32, n1: f32, n2: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    let mut cosine = cos_i;
    if n1 > n2 {
        let ratio = n1 / n2;
        let sin2_t = ratio * ratio * (1.0 - cos_i * cos_i);
        if sin2_t > 1.0 {
            return 1.0;
        }
        cosine = (1.0 - sin2_t).sqrt();
    }
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface whose normal faces against it.
///
/// `eta` is n1 / n2. Returns `None` on total internal reflection.
pub fn refract(uv: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = eta * (uv + cos_theta * n);
    let k = 1.0 - r_out_perp.length_squared();
    if k < 0.0 {
        return None;
    }
    Some((r_out_perp - k.sqrt() * n).normalize())
}

#[inline]
fn has_energy(c: Color) -> bool {
    c.max_element() > ENERGY_EPSILON
}
