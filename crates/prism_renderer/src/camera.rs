//! Primary ray generation.

use prism_core::Camera;
use prism_math::{Ray, Vec3};
use rand::Rng;

/// Pinhole projection of a scene camera onto a `width x height` film.
///
/// The image plane sits at distance `d = (height / 2) / tan(half_fov)`
/// along the forward axis, measured in pixels, so one pixel is one unit on
/// the plane. Pixel (0, 0) is the top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct PinholeCamera {
    eye: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
    half_width: f32,
    half_height: f32,
    plane_dist: f32,
}

impl PinholeCamera {
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let half_width = width as f32 / 2.0;
        let half_height = height as f32 / 2.0;
        let plane_dist = half_height / camera.half_fov.to_radians().tan();

        Self {
            eye: camera.eye,
            forward: camera.forward,
            up: camera.up,
            right: camera.right,
            half_width,
            half_height,
            plane_dist,
        }
    }

    /// Ray through pixel (i, j) at sub-pixel `offset` in `[0, 1)^2`.
    pub fn get_ray(&self, i: u32, j: u32, offset: (f32, f32)) -> Ray {
        let u = self.half_width - (i as f32 + offset.0);
        let v = self.half_height - (j as f32 + offset.1);
        let direction = self.plane_dist * self.forward + u * self.right + v * self.up;
        Ray::new(self.eye, direction.normalize())
    }

    /// Ray through the center of pixel (i, j).
    pub fn center_ray(&self, i: u32, j: u32) -> Ray {
        self.get_ray(i, j, (0.5, 0.5))
    }
}

/// Uniform random offset inside a pixel.
pub fn sample_square(rng: &mut impl Rng) -> (f32, f32) {
    (rng.gen::<f32>(), rng.gen::<f32>())
}
