//! Whole-image rendering.
//!
//! Primary rays are generated per pixel, traced through the shading
//! engine and averaged over the configured number of samples. Buckets are
//! distributed across the rayon thread pool.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use prism_math::Color;
use rand::Rng;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::camera::{sample_square, PinholeCamera};
use crate::shading::trace_ray;
use crate::World;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel; one sample uses the pixel center, more are
    /// jittered inside the pixel
    pub samples_per_pixel: u32,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Base seed for the per-bucket jitter RNGs
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

/// Render a single pixel.
pub fn render_pixel(
    camera: &PinholeCamera,
    world: &World,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut impl Rng,
) -> Color {
    if config.samples_per_pixel <= 1 {
        return trace_ray(world, &camera.center_ray(x, y), 1);
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let ray = camera.get_ray(x, y, sample_square(rng));
        pixel_color += trace_ray(world, &ray, 1);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        (255.0 * clamp_01(color.x)) as u8,
        (255.0 * clamp_01(color.y)) as u8,
        (255.0 * clamp_01(color.z)) as u8,
    ]
}

/// Row-major render output, row 0 at the top.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Row-major offset of pixel (x, y).
    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let b = &result.bucket;
        for (row, chunk) in result.pixels.chunks(b.width as usize).enumerate() {
            let start = self.index(b.x, b.y + row as u32);
            self.pixels[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }

    /// Convert to clamped, quantized RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb(c)).collect()
    }

    /// Write the image to disk. The format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.to_rgb8(),
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render the world's scene in parallel.
pub fn render(world: &World, config: &RenderConfig) -> ImageBuffer {
    let scene = world.scene();
    let (width, height) = (scene.width, scene.height);
    let camera = PinholeCamera::new(&scene.camera, width, height);
    let buckets = generate_buckets(width, height, config.bucket_size);

    log::info!(
        "Rendering {}x{}: {} spp, {} buckets on {} threads",
        width,
        height,
        config.samples_per_pixel.max(1),
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let total = buckets.len();
    let done = AtomicUsize::new(0);
    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(bucket, &camera, world, config);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n * 10 / total != (n - 1) * 10 / total {
                log::info!("{}% ({}/{} buckets)", n * 100 / total, n, total);
            }
            result
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
