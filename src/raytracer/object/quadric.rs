use crate::matrix::Matrix;
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::get_next_id;
use crate::raytracer::object::solver::find_roots_in_interval;
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

/// A general second-order implicit surface
/// `A x^2 + B y^2 + C z^2 + D xy + E xz + F yz + G x + H y + I z + J = 0`,
/// POV-Ray's `quadric { <A,B,C>, <D,E,F>, <G,H,I>, J }`. Substituting the ray
/// equation collapses this to a single quadratic in `t`, solved with the
/// same closed-form routine `sphere.rs`/`torus.rs` use rather than by hand
/// here, so a degenerate (linear or constant) coefficient set still resolves
/// correctly.
pub struct Quadric {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub transform: Matrix,
    pub material: Material,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
    pub h: f64,
    pub i: f64,
    pub j: f64,
}

impl Quadric {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, g: f64, h: f64, i: f64, j: f64) -> Quadric {
        Quadric {
            id: get_next_id(),
            parent_id: None,
            transform: Matrix::identity(4),
            material: Material::default(),
            a, b, c, d, e, f, g, h, i, j,
        }
    }

    fn value_at(&self, p: &Tuple) -> f64 {
        self.a * p.x * p.x + self.b * p.y * p.y + self.c * p.z * p.z
            + self.d * p.x * p.y + self.e * p.x * p.z + self.f * p.y * p.z
            + self.g * p.x + self.h * p.y + self.i * p.z + self.j
    }
}

impl Object for Quadric {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let o = &ray.origin;
        let d = &ray.direction;

        let a = self.a * d.x * d.x + self.b * d.y * d.y + self.c * d.z * d.z
            + self.d * d.x * d.y + self.e * d.x * d.z + self.f * d.y * d.z;
        let b = 2.0 * self.a * o.x * d.x + 2.0 * self.b * o.y * d.y + 2.0 * self.c * o.z * d.z
            + self.d * (o.x * d.y + o.y * d.x) + self.e * (o.x * d.z + o.z * d.x)
            + self.f * (o.y * d.z + o.z * d.y)
            + self.g * d.x + self.h * d.y + self.i * d.z;
        let c = self.value_at(o);

        find_roots_in_interval(&[c, b, a], -1.0e8, 1.0e8, 64)
            .into_iter()
            .map(|t| Intersection::new(t, self.id, 0.0, 0.0))
            .collect()
    }

    fn local_normal_at(&self, local_point: &Tuple, _hit: &Intersection) -> Tuple {
        Tuple::vector(
            2.0 * self.a * local_point.x + self.d * local_point.y + self.e * local_point.z + self.g,
            2.0 * self.b * local_point.y + self.d * local_point.x + self.f * local_point.z + self.h,
            2.0 * self.c * local_point.z + self.e * local_point.x + self.f * local_point.y + self.i,
        )
    }

    fn get_transform(&self) -> &Matrix {
        &self.transform
    }

    fn get_material(&self) -> &Material {
        &self.material
    }

    fn set_transform(&mut self, transform: Matrix) {
        self.transform = transform;
    }

    fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    fn debug_string(&self) -> String {
        format!("Quadric: transform: {:?}, coeffs: [{},{},{},{},{},{},{},{},{},{}]",
                self.transform, self.a, self.b, self.c, self.d, self.e, self.f, self.g, self.h, self.i, self.j)
    }

    fn get_id(&self) -> usize {
        self.id
    }

    fn get_parent_id(&self) -> Option<usize> {
        self.parent_id
    }

    fn set_parent_id(&mut self, id: usize) {
        self.parent_id = Some(id);
    }

    fn get_aabb(&self) -> AABB {
        let r = 1.0e6;
        AABB::new(Tuple::point(-r, -r, -r), Tuple::point(r, r, r))
    }

    fn includes(&self, object_id: usize) -> bool {
        self.id == object_id
    }
}
