//! Scene file loader.
//!
//! Scene files are plain text, one directive per line, arguments separated
//! by whitespace. Lines starting with `#` are comments.
//!
//! # Supported Directives
//!
//! - `camera_pos: x y z`, `camera_fwd: x y z`, `camera_up: x y z`
//! - `camera_fov_ha: degrees` (vertical half angle)
//! - `film_resolution: width height`
//! - `output_image: path`
//! - `max_vertices: n`, `max_normals: n` (capacity hints)
//! - `vertex: x y z`, `normal: x y z`
//! - `triangle: v0 v1 v2`, `normal_triangle: v0 v1 v2 n0 n1 n2`
//! - `sphere: x y z radius`
//! - `background: r g b`, `ambient_light: r g b`
//! - `material: ar ag ab dr dg db sr sg sb shininess tr tg tb ior`
//! - `directional_light: r g b dx dy dz`
//! - `point_light: r g b x y z`
//! - `spot_light: r g b px py pz dx dy dz inner outer`
//! - `max_depth: n`
//!
//! A `material:` line applies to every primitive declared after it.

use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};

use prism_math::{Color, Vec3, Vec3Ext};
use thiserror::Error;

use crate::scene::{
    Camera, DirectionalLight, Material, PointLight, Scene, Sphere, SpotLight, Triangle,
};

/// Largest accepted `film_resolution:` in total pixels.
pub const MAX_FILM_PIXELS: u64 = 1 << 28;

/// Errors in the contents of a scene file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: `{directive}` expects more arguments")]
    MissingArgument { line: usize, directive: String },

    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: {message}")]
    Invalid { line: usize, message: String },

    #[error("camera up vector is parallel to the forward vector")]
    DegenerateCamera,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while loading a scene file from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene file from disk.
pub fn load_scene(path: impl AsRef<Path>) -> LoadResult<Scene> {
    let path = path.as_ref();
    log::info!("Loading scene: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    Ok(parse_scene(&content)?)
}

/// Parse a scene from the contents of a scene file.
pub fn parse_scene(content: &str) -> ParseResult<Scene> {
    let mut parser = SceneParser::default();

    for (index, line) in content.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };
        if directive.starts_with('#') {
            continue;
        }

        let args = Args {
            line: index + 1,
            directive,
            tokens,
        };
        parser.directive(args)?;
    }

    let scene = parser.finish()?;
    log::info!(
        "Loaded scene: {} spheres, {} triangles, {} lights, {}x{}",
        scene.spheres.len(),
        scene.triangles.len(),
        scene.light_count(),
        scene.width,
        scene.height
    );
    Ok(scene)
}

/// The remaining arguments of one directive line.
struct Args<'a> {
    line: usize,
    directive: &'a str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn token(&mut self) -> ParseResult<&'a str> {
        self.tokens.next().ok_or_else(|| ParseError::MissingArgument {
            line: self.line,
            directive: self.directive.to_string(),
        })
    }

    fn number<T: FromStr>(&mut self) -> ParseResult<T> {
        let token = self.token()?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            line: self.line,
            token: token.to_string(),
        })
    }

    fn vec3(&mut self) -> ParseResult<Vec3> {
        Ok(Vec3::new(self.number()?, self.number()?, self.number()?))
    }

    fn color(&mut self) -> ParseResult<Color> {
        let color = self.vec3()?;
        if color.min_element() < 0.0 {
            return Err(self.invalid(format!("negative color {color}")));
        }
        Ok(color)
    }

    fn unit_vec3(&mut self) -> ParseResult<Vec3> {
        let mut v = self.vec3()?;
        if v.normalize_in_place() <= 0.0 {
            return Err(self.invalid("zero-length direction".to_string()));
        }
        Ok(v)
    }

    /// Index into a pool of `len` entries.
    fn index(&mut self, pool: &str, len: usize) -> ParseResult<usize> {
        let index: usize = self.number()?;
        if index >= len {
            return Err(self.invalid(format!("{pool} index {index} out of range ({len} defined)")));
        }
        Ok(index)
    }

    fn invalid(&self, message: String) -> ParseError {
        ParseError::Invalid {
            line: self.line,
            message,
        }
    }

    fn finish(mut self) {
        if self.tokens.next().is_some() {
            log::warn!("line {}: ignoring extra arguments to `{}`", self.line, self.directive);
        }
    }
}

/// Accumulates state while walking the file.
struct SceneParser {
    scene: Scene,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    material: Material,
    eye: Vec3,
    forward: Vec3,
    up: Vec3,
    half_fov: f32,
}

impl Default for SceneParser {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            scene: Scene::default(),
            vertices: Vec::new(),
            normals: Vec::new(),
            material: Material::default(),
            eye: camera.eye,
            forward: camera.forward,
            up: camera.up,
            half_fov: camera.half_fov,
        }
    }
}

impl SceneParser {
    fn directive(&mut self, mut args: Args<'_>) -> ParseResult<()> {
        let directive = args.directive;
        match directive {
            "camera_pos:" => self.eye = args.vec3()?,
            "camera_fwd:" => self.forward = args.vec3()?,
            "camera_up:" => self.up = args.vec3()?,
            "camera_fov_ha:" => {
                let half_fov: f32 = args.number()?;
                if !(half_fov > 0.0 && half_fov < 90.0) {
                    return Err(args.invalid(format!("field of view half angle {half_fov} not in (0, 90)")));
                }
                self.half_fov = half_fov;
            }
            "film_resolution:" => {
                let width: u32 = args.number()?;
                let height: u32 = args.number()?;
                if width == 0 || height == 0 {
                    return Err(args.invalid(format!("resolution {width}x{height} is empty")));
                }
                if u64::from(width) * u64::from(height) > MAX_FILM_PIXELS {
                    return Err(args.invalid(format!(
                        "resolution {width}x{height} exceeds {MAX_FILM_PIXELS} pixels"
                    )));
                }
                self.scene.width = width;
                self.scene.height = height;
            }
            "output_image:" => self.scene.output_image = PathBuf::from(args.token()?),
            "max_vertices:" => {
                let n: usize = args.number()?;
                log::debug!("Reserving {} vertices", n);
                self.vertices.reserve(n);
            }
            "max_normals:" => {
                let n: usize = args.number()?;
                log::debug!("Reserving {} normals", n);
                self.normals.reserve(n);
            }
            "vertex:" => {
                let v = args.vec3()?;
                self.vertices.push(v);
            }
            "normal:" => {
                let n = args.vec3()?;
                self.normals.push(n);
            }
            "triangle:" => {
                let [v1, v2, v3] = self.triangle_vertices(&mut args)?;
                self.scene.triangles.push(Triangle::new(v1, v2, v3, self.material));
            }
            "normal_triangle:" => {
                let [v1, v2, v3] = self.triangle_vertices(&mut args)?;
                let count = self.normals.len();
                let n1 = self.normals[args.index("normal", count)?];
                let n2 = self.normals[args.index("normal", count)?];
                let n3 = self.normals[args.index("normal", count)?];
                self.scene.triangles.push(
                    Triangle::new(v1, v2, v3, self.material).with_vertex_normals(n1, n2, n3),
                );
            }
            "sphere:" => {
                let center = args.vec3()?;
                let radius: f32 = args.number()?;
                if !(radius > 0.0) {
                    return Err(args.invalid(format!("sphere radius {radius} must be positive")));
                }
                self.scene.spheres.push(Sphere::new(center, radius, self.material));
            }
            "background:" => self.scene.background = args.color()?,
            "ambient_light:" => self.scene.ambient_light = args.color()?,
            "material:" => {
                let ambient = args.color()?;
                let diffuse = args.color()?;
                let specular = args.color()?;
                let shininess: f32 = args.number()?;
                let transmissive = args.color()?;
                let ior: f32 = args.number()?;
                if !(ior > 0.0) {
                    return Err(args.invalid(format!("index of refraction {ior} must be positive")));
                }
                self.material = Material {
                    ambient,
                    diffuse,
                    specular,
                    shininess,
                    transmissive,
                    ior,
                };
            }
            "directional_light:" => {
                let intensity = args.color()?;
                let direction = args.unit_vec3()?;
                self.scene
                    .directional_lights
                    .push(DirectionalLight { direction, intensity });
            }
            "point_light:" => {
                let intensity = args.color()?;
                let position = args.vec3()?;
                self.scene.point_lights.push(PointLight { position, intensity });
            }
            "spot_light:" => {
                let intensity = args.color()?;
                let position = args.vec3()?;
                let direction = args.unit_vec3()?;
                let inner_angle: f32 = args.number()?;
                let outer_angle: f32 = args.number()?;
                self.scene.spot_lights.push(SpotLight {
                    position,
                    direction,
                    intensity,
                    inner_angle,
                    outer_angle,
                });
            }
            "max_depth:" => self.scene.max_depth = args.number()?,
            other => {
                log::warn!("line {}: skipping unknown directive `{}`", args.line, other);
                return Ok(());
            }
        }

        args.finish();
        Ok(())
    }

    fn triangle_vertices(&self, args: &mut Args<'_>) -> ParseResult<[Vec3; 3]> {
        let count = self.vertices.len();
        Ok([
            self.vertices[args.index("vertex", count)?],
            self.vertices[args.index("vertex", count)?],
            self.vertices[args.index("vertex", count)?],
        ])
    }

    fn finish(mut self) -> ParseResult<Scene> {
        self.scene.camera = Camera::new(self.eye, self.forward, self.up, self.half_fov)
            .ok_or(ParseError::DegenerateCamera)?;
        Ok(self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let scene = parse_scene("").unwrap();

        assert_eq!(scene.width, 640);
        assert_eq!(scene.height, 480);
        assert_eq!(scene.max_depth, 5);
        assert_eq!(scene.output_image, PathBuf::from("raytraced.bmp"));
        assert_eq!(scene.background, Color::ZERO);
        assert_eq!(scene.ambient_light, Color::ZERO);
        assert_eq!(scene.camera, Camera::default());
        assert!(!scene.accelerate);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let scene = parse_scene(
            "# a comment\n\
             \n\
             #sphere: 0 0 0 1\n   \n\
             sphere: 0 0 -5 1\n",
        )
        .unwrap();
        assert_eq!(scene.spheres.len(), 1);
    }

    #[test]
    fn test_material_applies_to_later_primitives() {
        let scene = parse_scene(
            "sphere: 0 0 -5 1\n\
             material: 0.1 0.1 0.1 1 0 0 0.5 0.5 0.5 32 0 0 0 1.5\n\
             sphere: 2 0 -5 1\n",
        )
        .unwrap();

        assert_eq!(scene.spheres[0].material, Material::default());
        let mat = scene.spheres[1].material;
        assert_eq!(mat.ambient, Color::splat(0.1));
        assert_eq!(mat.diffuse, Color::new(1.0, 0.0, 0.0));
        assert_eq!(mat.specular, Color::splat(0.5));
        assert_eq!(mat.shininess, 32.0);
        assert_eq!(mat.transmissive, Color::ZERO);
        assert_eq!(mat.ior, 1.5);
    }

    #[test]
    fn test_vertex_pool_and_triangles() {
        let scene = parse_scene(
            "max_vertices: 3\n\
             max_normals: 3\n\
             vertex: 0 0 0\n\
             vertex: 1 0 0\n\
             vertex: 0 1 0\n\
             normal: 0 0 1\n\
             normal: 0 0 1\n\
             normal: 1 0 0\n\
             triangle: 0 1 2\n\
             normal_triangle: 0 1 2 0 1 2\n",
        )
        .unwrap();

        assert_eq!(scene.triangles.len(), 2);
        assert_eq!(scene.triangles[0].vertices[1], Vec3::X);
        assert!(scene.triangles[0].normals.is_none());
        assert_eq!(scene.triangles[1].normals.map(|n| n[2]), Some(Vec3::X));
    }

    #[test]
    fn test_camera_and_film() {
        let scene = parse_scene(
            "camera_pos: 0 2 10\n\
             camera_fwd: 0 0 -2\n\
             camera_up: 0 3 0\n\
             camera_fov_ha: 30\n\
             film_resolution: 320 200\n\
             output_image: out.png\n\
             max_depth: 3\n",
        )
        .unwrap();

        assert_eq!(scene.camera.eye, Vec3::new(0.0, 2.0, 10.0));
        assert_eq!(scene.camera.forward, Vec3::NEG_Z);
        assert_eq!(scene.camera.up, Vec3::Y);
        assert_eq!(scene.camera.half_fov, 30.0);
        assert_eq!((scene.width, scene.height), (320, 200));
        assert_eq!(scene.output_image, PathBuf::from("out.png"));
        assert_eq!(scene.max_depth, 3);
    }

    #[test]
    fn test_lights() {
        let scene = parse_scene(
            "ambient_light: 0.1 0.1 0.1\n\
             background: 0.2 0.3 0.4\n\
             directional_light: 1 1 1 0 -2 0\n\
             point_light: 2 2 2 0 5 -5\n\
             spot_light: 1 0 0 0 5 0 0 -1 0 15 30\n",
        )
        .unwrap();

        assert_eq!(scene.ambient_light, Color::splat(0.1));
        assert_eq!(scene.background, Color::new(0.2, 0.3, 0.4));
        assert_eq!(scene.directional_lights[0].direction, Vec3::NEG_Y);
        assert_eq!(scene.point_lights[0].position, Vec3::new(0.0, 5.0, -5.0));
        let spot = scene.spot_lights[0];
        assert_eq!(spot.direction, Vec3::NEG_Y);
        assert_eq!((spot.inner_angle, spot.outer_angle), (15.0, 30.0));
        assert_eq!(scene.light_count(), 3);
    }

    #[test]
    fn test_unknown_directive_is_skipped() {
        let scene = parse_scene("teapot: 1 2 3\nsphere: 0 0 0 1\n").unwrap();
        assert_eq!(scene.spheres.len(), 1);
    }

    #[test]
    fn test_missing_argument_reports_line() {
        let err = parse_scene("sphere: 0 0 -5 1\nsphere: 0 0\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingArgument { line: 2, .. }));
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_scene("point_light: 1 1 one 0 0 0\n").unwrap_err();
        match err {
            ParseError::InvalidNumber { line, token } => {
                assert_eq!(line, 1);
                assert_eq!(token, "one");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_vertex_index_out_of_range() {
        let err = parse_scene("vertex: 0 0 0\nvertex: 1 0 0\ntriangle: 0 1 2\n").unwrap_err();
        assert!(matches!(err, ParseError::Invalid { line: 3, .. }));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_scene("sphere: 0 0 0 0\n").is_err());
        assert!(parse_scene("material: 0 0 0 1 1 1 0 0 0 5 0 0 0 0\n").is_err());
        assert!(parse_scene("point_light: -1 1 1 0 0 0\n").is_err());
        assert!(parse_scene("film_resolution: 0 100\n").is_err());
        assert!(parse_scene("directional_light: 1 1 1 0 0 0\n").is_err());
    }

    #[test]
    fn test_rejects_nan_radius_and_ior() {
        assert!(parse_scene("sphere: 0 0 -5 nan\n").is_err());
        assert!(parse_scene("material: 0 0 0 1 1 1 0 0 0 5 0 0 0 NaN\n").is_err());
    }

    #[test]
    fn test_film_resolution_limit() {
        let err = parse_scene("film_resolution: 70000 70000\n").unwrap_err();
        assert!(matches!(err, ParseError::Invalid { line: 1, .. }));

        // Exactly at the limit is still accepted
        let scene = parse_scene("film_resolution: 16384 16384\n").unwrap();
        assert_eq!(u64::from(scene.width) * u64::from(scene.height), MAX_FILM_PIXELS);
    }

    #[test]
    fn test_degenerate_camera() {
        let err = parse_scene("camera_up: 0 0 -1\n").unwrap_err();
        assert!(matches!(err, ParseError::DegenerateCamera));
    }

    #[test]
    fn test_load_scene_missing_file() {
        let err = load_scene("/nonexistent/prism/scene.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
