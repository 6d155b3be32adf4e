//! Simple Whitted ray tracer example.
//!
//! Builds a scene in code (a glass sphere and a mirror sphere on a
//! triangle floor) and saves it as PNG.

use prism_core::{Material, PointLight, Scene, Sphere, SpotLight, Triangle};
use prism_renderer::{render, Color, RenderConfig, Vec3, World};

fn main() {
    println!("Prism - Simple Example");
    println!("======================");

    let start = std::time::Instant::now();
    let world = World::new(build_scene());
    println!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig {
        samples_per_pixel: 4,
        ..Default::default()
    };

    let scene = world.scene();
    println!(
        "Rendering {}x{} @ {} spp...",
        scene.width, scene.height, config.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render(&world, &config);
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.png";
    match image.save(filename) {
        Ok(()) => println!("Saved to {}", filename),
        Err(e) => eprintln!("Failed to save {}: {}", filename, e),
    }
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();
    scene.width = 800;
    scene.height = 450;
    scene.accelerate = true;
    scene.background = Color::new(0.05, 0.05, 0.1);
    scene.ambient_light = Color::splat(0.1);

    // Checkerboard floor made of triangle pairs
    let light_tile = Material {
        ambient: Color::splat(0.8),
        ..Material::diffuse(Color::splat(0.8))
    };
    let dark_tile = Material {
        ambient: Color::splat(0.2),
        ..Material::diffuse(Color::splat(0.2))
    };
    for i in -6..6 {
        for k in -12..0 {
            let material = if (i + k) % 2 == 0 { light_tile } else { dark_tile };
            let o = Vec3::new(i as f32, -1.0, k as f32);
            let (a, b, c, d) = (o, o + Vec3::X, o + Vec3::new(1.0, 0.0, 1.0), o + Vec3::Z);
            scene.triangles.push(Triangle::new(a, d, c, material));
            scene.triangles.push(Triangle::new(a, c, b, material));
        }
    }

    let glass = Material {
        diffuse: Color::ZERO,
        specular: Color::ONE,
        shininess: 64.0,
        transmissive: Color::splat(0.9),
        ior: 1.5,
        ..Default::default()
    };
    let mirror = Material {
        diffuse: Color::new(0.1, 0.1, 0.1),
        specular: Color::new(0.9, 0.8, 0.7),
        shininess: 128.0,
        ior: 20.0,
        ..Default::default()
    };
    let red = Material {
        ambient: Color::new(0.6, 0.1, 0.1),
        specular: Color::splat(0.3),
        shininess: 32.0,
        ..Material::diffuse(Color::new(0.8, 0.15, 0.1))
    };

    scene.spheres.push(Sphere::new(Vec3::new(-1.2, 0.0, -4.0), 1.0, glass));
    scene.spheres.push(Sphere::new(Vec3::new(1.3, 0.0, -6.0), 1.0, mirror));
    scene.spheres.push(Sphere::new(Vec3::new(0.0, -0.5, -8.0), 0.5, red));

    scene.point_lights.push(PointLight {
        position: Vec3::new(0.0, 4.0, -3.0),
        intensity: Color::splat(20.0),
    });
    scene.spot_lights.push(SpotLight {
        position: Vec3::new(3.0, 5.0, -6.0),
        direction: Vec3::new(-0.5, -1.0, 0.0).normalize(),
        intensity: Color::new(15.0, 12.0, 8.0),
        inner_angle: 15.0,
        outer_angle: 30.0,
    });

    scene
}
