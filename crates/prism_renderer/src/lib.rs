//! Prism Renderer - Whitted-style CPU ray tracing.
//!
//! Traces one primary ray per pixel sample from a pinhole camera, shades
//! hits with ambient, diffuse and Phong terms under shadow-tested lights,
//! and follows mirror reflection and refraction recursively. Triangles can
//! be accelerated with a flat-array BVH; the image is rendered in parallel
//! buckets.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod renderer;
mod shading;
mod world;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode};
pub use camera::{sample_square, PinholeCamera};
pub use hittable::HitRecord;
pub use renderer::{clamp_01, color_to_rgb, render, render_pixel, ImageBuffer, RenderConfig};
pub use shading::{reflect, refract, schlick, shade, trace_ray};
pub use world::{World, MAX_T, RAY_EPSILON};

/// Re-export common math types from prism_math
pub use prism_math::{Color, Ray, Vec3};
