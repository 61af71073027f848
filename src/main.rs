extern crate lazy_static;

mod tuple;
mod color;
mod canvas;
mod matrix;
mod raytracer;

use raytracer::parser::{camera_from_spec, parse_file};
use raytracer::scene::Scene;

pub const EPSILON: f64 = 0.00001;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 4 {
        let width: usize = args[1].parse().expect("Failed to parse width");
        let height: usize = args[2].parse().expect("Failed to parse height");
        match parse_file(&args[3]) {
            Ok(parsed) => {
                let camera_spec = parsed.camera_spec.unwrap_or_default();
                let camera = camera_from_spec(&camera_spec, width, height);

                let mut scene = Scene::new();
                for light in parsed.lights {
                    scene.add_light(light);
                }
                scene.ids = parsed.objects;

                let image = camera.render(&scene);
                image.write_to_file(&args[4], 1);
            }
            Err(e) => log::error!("failed to parse scene file {}: {}", args[3], e),
        }
    } else {
        println!("Usage: cargo run -- <width> <height> <scene.pov> <output.png>");
    }
}
