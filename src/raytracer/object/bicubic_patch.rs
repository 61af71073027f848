//! Bicubic (Bezier) patch (spec §3): a 4x4 control-point grid, evaluated as
//! two nested cubic Bezier curves (one over the control net's rows, one
//! blending the four resulting points) - the same De Casteljau-style
//! evaluation `PRISM.C`'s `BEZIER_SPLINE` case uses for its own cubic
//! segments, generalized from one to two parametric dimensions - and
//! intersected by adaptive recursive subdivision down to a flatness
//! threshold, then a ray/triangle test (SPEC_FULL.md §2), the same
//! tessellate-and-test approach `mesh.rs`/`height_field.rs` use, rather than
//! a closed-form solve (a bicubic patch's implicit equation has no
//! tractable closed form).

use crate::matrix::Matrix;
use crate::raytracer::flags::{DEGENERATE, Flags};
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::get_next_id;
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

const DEFAULT_SUBDIVISION_DEPTH: u32 = 4;
const FLATNESS_EPSILON: f64 = 1e-3;

fn bezier3(p: &[Tuple; 4], t: f64) -> Tuple {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    Tuple::point(
        b0 * p[0].x + b1 * p[1].x + b2 * p[2].x + b3 * p[3].x,
        b0 * p[0].y + b1 * p[1].y + b2 * p[2].y + b3 * p[3].y,
        b0 * p[0].z + b1 * p[1].z + b2 * p[2].z + b3 * p[3].z,
    )
}

pub struct BicubicPatch {
    pub id: usize,
    pub parent_id: Option<usize>,
    /// Row-major 4x4 control points.
    pub control_points: [[Tuple; 4]; 4],
    pub subdivision_depth: u32,
    pub flatness: f64,
    pub transform: Matrix,
    pub material: Material,
    pub flags: Flags,
}

impl BicubicPatch {
    pub fn new(control_points: [[Tuple; 4]; 4]) -> BicubicPatch {
        BicubicPatch {
            id: get_next_id(),
            parent_id: None,
            control_points,
            subdivision_depth: DEFAULT_SUBDIVISION_DEPTH,
            flatness: FLATNESS_EPSILON,
            transform: Matrix::identity(4),
            material: Material::default(),
            flags: Flags::empty(),
        }
    }

    /// Evaluates the patch at parameter `(u, v)`, `u` along rows, `v` across
    /// the four row-curves.
    pub fn eval(&self, u: f64, v: f64) -> Tuple {
        let row_points: [Tuple; 4] = std::array::from_fn(|i| bezier3(&self.control_points[i], v));
        bezier3(&row_points, u)
    }

    fn corners(&self, u0: f64, u1: f64, v0: f64, v1: f64) -> [Tuple; 4] {
        [self.eval(u0, v0), self.eval(u1, v0), self.eval(u1, v1), self.eval(u0, v1)]
    }

    fn is_flat(&self, c: &[Tuple; 4]) -> bool {
        // A quad patch is flat enough once its diagonals' midpoint matches
        // the average of all four corners within tolerance.
        let mid_diag = Tuple::point(
            (c[0].x + c[2].x) / 2.0,
            (c[0].y + c[2].y) / 2.0,
            (c[0].z + c[2].z) / 2.0,
        );
        let avg = Tuple::point(
            (c[0].x + c[1].x + c[2].x + c[3].x) / 4.0,
            (c[0].y + c[1].y + c[2].y + c[3].y) / 4.0,
            (c[0].z + c[1].z + c[2].z + c[3].z) / 4.0,
        );
        mid_diag.subtract(&avg).magnitude() < self.flatness
    }

    fn triangle_hit(ray: &Ray, a: &Tuple, b: &Tuple, c: &Tuple) -> Option<(f64, f64, f64)> {
        let e1 = b.subtract(a);
        let e2 = c.subtract(a);
        let dir_cross_e2 = ray.direction.cross(&e2);
        let det = e1.dot(&dir_cross_e2);
        if det.abs() < crate::EPSILON {
            return None;
        }
        let f = 1.0 / det;
        let p_to_origin = ray.origin.subtract(a);
        let u = f * p_to_origin.dot(&dir_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let origin_cross_e1 = p_to_origin.cross(&e1);
        let v = f * ray.direction.dot(&origin_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * e2.dot(&origin_cross_e1);
        if t < crate::EPSILON {
            return None;
        }
        Some((t, u, v))
    }

    fn subdivide(&self, ray: &Ray, u0: f64, u1: f64, v0: f64, v1: f64, depth: u32, out: &mut Vec<Intersection>) {
        let c = self.corners(u0, u1, v0, v1);
        if depth == 0 || self.is_flat(&c) {
            // Two triangles covering the quad; u/v reported mid-patch since
            // per-triangle barycentrics aren't patch parameter coordinates.
            let um = (u0 + u1) / 2.0;
            let vm = (v0 + v1) / 2.0;
            if let Some((t, _, _)) = Self::triangle_hit(ray, &c[0], &c[1], &c[2]) {
                out.push(Intersection::new(t, self.id, um, vm));
            }
            if let Some((t, _, _)) = Self::triangle_hit(ray, &c[0], &c[2], &c[3]) {
                out.push(Intersection::new(t, self.id, um, vm));
            }
            return;
        }
        let um = (u0 + u1) / 2.0;
        let vm = (v0 + v1) / 2.0;
        self.subdivide(ray, u0, um, v0, vm, depth - 1, out);
        self.subdivide(ray, um, u1, v0, vm, depth - 1, out);
        self.subdivide(ray, u0, um, vm, v1, depth - 1, out);
        self.subdivide(ray, um, u1, vm, v1, depth - 1, out);
    }
}

impl Object for BicubicPatch {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let mut out = Vec::new();
        self.subdivide(ray, 0.0, 1.0, 0.0, 1.0, self.subdivision_depth, &mut out);
        out.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        out
    }

    fn local_normal_at(&self, local_point: &Tuple, _hit: &Intersection) -> Tuple {
        // Central-difference gradient in (u, v), found by nearest-sample
        // search since there's no closed-form inverse of `eval`.
        let mut best = (0.5, 0.5, f64::INFINITY);
        for i in 0..=8 {
            for j in 0..=8 {
                let u = i as f64 / 8.0;
                let v = j as f64 / 8.0;
                let d = self.eval(u, v).subtract(local_point).magnitude();
                if d < best.2 {
                    best = (u, v, d);
                }
            }
        }
        let (u, v, _) = best;
        let h = 1e-3;
        let du = self.eval((u + h).min(1.0), v).subtract(&self.eval((u - h).max(0.0), v));
        let dv = self.eval(u, (v + h).min(1.0)).subtract(&self.eval(u, (v - h).max(0.0)));
        let n = du.cross(&dv);
        let len = n.magnitude();
        if len < crate::EPSILON { Tuple::vector(0.0, 1.0, 0.0) } else { n.divide(len) }
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
        "BicubicPatch".to_string()
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
        let mut min = Tuple::point(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Tuple::point(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for row in self.control_points.iter() {
            for p in row.iter() {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                min.z = min.z.min(p.z);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
                max.z = max.z.max(p.z);
            }
        }
        if self.control_points.iter().flatten().count() == 0 {
            return AABB::new(Tuple::point(0.0, 0.0, 0.0), Tuple::point(0.0, 0.0, 0.0));
        }
        AABB::new(min, max)
    }
}
