//! Example: Load a scene file and print what it contains.
//!
//! Run with: cargo run -p prism_core --example inspect_scene -- scenes/spheres.txt

use std::env;

use prism_core::load_scene;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_scene <path-to-scene-file>");
        println!("\nExample:");
        println!("  cargo run -p prism_core --example inspect_scene -- scenes/spheres.txt");
        return;
    }

    let path = &args[1];
    println!("Loading scene file: {}", path);

    match load_scene(path) {
        Ok(scene) => {
            println!(
                "\n=== {}x{} -> {} ===",
                scene.width,
                scene.height,
                scene.output_image.display()
            );
            println!("Max depth: {}", scene.max_depth);
            println!("Spheres: {}", scene.spheres.len());
            println!("Triangles: {}", scene.triangles.len());
            println!(
                "Smooth triangles: {}",
                scene.triangles.iter().filter(|t| t.normals.is_some()).count()
            );

            let cam = &scene.camera;
            println!("\n--- Camera ---");
            println!("  Eye: ({:.2}, {:.2}, {:.2})", cam.eye.x, cam.eye.y, cam.eye.z);
            println!(
                "  Forward: ({:.2}, {:.2}, {:.2})",
                cam.forward.x, cam.forward.y, cam.forward.z
            );
            println!("  Half FOV: {:.2} deg", cam.half_fov);

            println!("\n--- Lights ({}) ---", scene.light_count());
            for light in &scene.directional_lights {
                let d = light.direction;
                println!("  Directional toward ({:.2}, {:.2}, {:.2})", d.x, d.y, d.z);
            }
            for light in &scene.point_lights {
                let p = light.position;
                println!("  Point at ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
            }
            for light in &scene.spot_lights {
                let p = light.position;
                println!(
                    "  Spot at ({:.2}, {:.2}, {:.2}), cone {:.1}/{:.1} deg",
                    p.x, p.y, p.z, light.inner_angle, light.outer_angle
                );
            }

            let bounds = scene.bounds();
            println!("\n--- World Bounds ---");
            if bounds.is_empty() {
                println!("  (no geometry)");
            } else {
                println!(
                    "  Min: ({:.2}, {:.2}, {:.2})",
                    bounds.x.min, bounds.y.min, bounds.z.min
                );
                println!(
                    "  Max: ({:.2}, {:.2}, {:.2})",
                    bounds.x.max, bounds.y.max, bounds.z.max
                );
            }
        }
        Err(e) => {
            eprintln!("Error loading scene file: {}", e);
        }
    }
}
