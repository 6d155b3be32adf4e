//! Prism Core - scene description for the Whitted ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Camera`, `Material`, `Sphere`, `Triangle`
//!   and the three light kinds
//! - **Scene files**: a line-oriented text format, see [`loader`]
//!
//! # Example
//!
//! ```ignore
//! use prism_core::load_scene;
//!
//! let scene = load_scene("scenes/spheres.txt")?;
//! println!("{} spheres, {} triangles", scene.spheres.len(), scene.triangles.len());
//! ```

pub mod loader;
pub mod scene;

// Re-export commonly used types
pub use loader::{
    load_scene, parse_scene, LoadError, LoadResult, ParseError, ParseResult, MAX_FILM_PIXELS,
};
pub use scene::{
    Attenuation, Camera, DirectionalLight, Material, Plane, PointLight, Scene, Sphere, SpotLight,
    Triangle,
};
