use crate::color::Color;
use crate::matrix::Matrix;
use crate::raytracer::material::pattern::Pattern;
use crate::tuple::Tuple;
use crate::raytracer::object::db::get_object;
use crate::raytracer::object::world_to_object;

pub(crate) mod pattern;
mod noise;
pub(crate) mod texture;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub pattern: Pattern,
    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,
    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Material {
    pub fn default() -> Material {
        Material {
            pattern: Pattern::solid(Color::new(1.0, 1.0, 1.0), Matrix::identity(4)),
            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,
            reflective: 0.0,
            transparency: 0.0,
            refractive_index: 1.0,
        }
    }
}

pub fn pattern_at_object(shape: usize, world_point: &Tuple) -> Color {
    let object_point = world_to_object(shape, world_point);
    get_object(shape).get_material().pattern.pattern_at(&object_point, shape)
}
