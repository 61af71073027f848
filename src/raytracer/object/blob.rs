//! Metaball-style implicit surface (spec §3/§4.1): the zero level set of
//! `(sum of element field functions) - threshold`. Grounded on the POV-Ray
//! quadratic falloff `f(r) = strength * (1 - (r/radius)^2)^2` for `r <
//! radius` (SPEC_FULL.md §2), summed across whichever elements are
//! currently "active" (within radius of the ray) at a given `t`.
//!
//! Each element's squared radial distance along the ray is quadratic in
//! `t` (`u(t) = A t^2 + B t + C`) whether the element is a sphere (distance
//! to a point) or a cylinder (distance to an infinite axis line - this
//! crate does not bound cylindrical elements to a finite segment, see
//! DESIGN.md). That makes the per-element field `S * (1 - u(t)/R^2)^2` a
//! quartic in `t`, so the summed field over any interval where the active
//! set doesn't change is itself a quartic - solvable in closed form via
//! [`crate::raytracer::object::solver`].

use crate::matrix::Matrix;
use crate::raytracer::flags::{DEGENERATE, Flags};
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::get_next_id;
use crate::raytracer::object::solver::{DEPTH_TOLERANCE, find_roots_in_interval};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

#[derive(Debug, Clone)]
pub enum ElementKind {
    Sphere,
    /// Cylinder element; field is evaluated against the infinite line
    /// through `center` along `axis`, not a bounded segment.
    Cylinder { axis: Tuple },
}

#[derive(Debug, Clone)]
pub struct BlobElement {
    pub center: Tuple,
    pub radius: f64,
    pub strength: f64,
    pub kind: ElementKind,
    /// Per-element texture override for blob-internal multi-texturing
    /// (spec §4.1); `None` inherits the blob's own material.
    pub material: Option<Material>,
}

impl BlobElement {
    pub fn sphere(center: Tuple, radius: f64, strength: f64) -> BlobElement {
        BlobElement { center, radius, strength, kind: ElementKind::Sphere, material: None }
    }

    pub fn cylinder(center: Tuple, axis: Tuple, radius: f64, strength: f64) -> BlobElement {
        BlobElement { center, radius, strength, kind: ElementKind::Cylinder { axis: axis.normalize() }, material: None }
    }

    /// Ascending-power coefficients `[c0, c1, c2]` of `u(t)`, the squared
    /// radial distance from the ray to this element's surface at parameter
    /// `t`.
    fn squared_distance_coeffs(&self, ray: &Ray) -> [f64; 3] {
        let q = ray.origin.subtract(&self.center);
        match &self.kind {
            ElementKind::Sphere => {
                let a = ray.direction.dot(&ray.direction);
                let b = 2.0 * q.dot(&ray.direction);
                let c = q.dot(&q);
                [c, b, a]
            }
            ElementKind::Cylinder { axis } => {
                let qv = q.dot(axis);
                let dv = ray.direction.dot(axis);
                let a = ray.direction.dot(&ray.direction) - dv * dv;
                let b = 2.0 * (q.dot(&ray.direction) - qv * dv);
                let c = q.dot(&q) - qv * qv;
                [c, b, a]
            }
        }
    }

    /// Ascending `[h0, h1, h2]` for `h(t) = 1 - u(t)/radius^2`, positive
    /// while the ray is inside this element's radius of influence.
    fn h_coeffs(&self, ray: &Ray) -> [f64; 3] {
        let [c0, c1, c2] = self.squared_distance_coeffs(ray);
        let r2 = self.radius * self.radius;
        [1.0 - c0 / r2, -c1 / r2, -c2 / r2]
    }

    /// Ascending degree-4 field contribution `strength * h(t)^2`.
    fn field_coeffs(&self, ray: &Ray) -> [f64; 5] {
        let [h0, h1, h2] = self.h_coeffs(ray);
        let s = self.strength;
        [s * h0 * h0, s * 2.0 * h0 * h1, s * (2.0 * h0 * h2 + h1 * h1), s * 2.0 * h1 * h2, s * h2 * h2]
    }

    /// The two roots of `h(t) = 0` (entry/exit of the influence radius),
    /// i.e. activation events for this element.
    fn activation_events(&self, ray: &Ray) -> Vec<f64> {
        let [h0, h1, h2] = self.h_coeffs(ray);
        if h2.abs() < 1e-12 {
            if h1.abs() < 1e-12 {
                vec![]
            } else {
                vec![-h0 / h1]
            }
        } else {
            let disc = h1 * h1 - 4.0 * h2 * h0;
            if disc < 0.0 {
                vec![]
            } else {
                let sq = disc.sqrt();
                vec![(-h1 - sq) / (2.0 * h2), (-h1 + sq) / (2.0 * h2)]
            }
        }
    }

    fn is_active_at(&self, ray: &Ray, t: f64) -> bool {
        let [h0, h1, h2] = self.h_coeffs(ray);
        h2 * t * t + h1 * t + h0 > 0.0
    }

    fn field_at(&self, ray: &Ray, t: f64) -> f64 {
        let [h0, h1, h2] = self.h_coeffs(ray);
        let h = h2 * t * t + h1 * t + h0;
        if h > 0.0 { self.strength * h * h } else { 0.0 }
    }
}

const BIG_HUGE: f64 = 1.0e7;

pub struct Blob {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub elements: Vec<BlobElement>,
    pub threshold: f64,
    pub transform: Matrix,
    pub material: Material,
    pub flags: Flags,
}

impl Blob {
    pub fn new(elements: Vec<BlobElement>, threshold: f64) -> Blob {
        let mut flags = Flags::empty();
        if elements.is_empty() {
            flags.set(DEGENERATE);
        }
        Blob {
            id: get_next_id(),
            parent_id: None,
            elements,
            threshold,
            transform: Matrix::identity(4),
            material: Material::default(),
            flags,
        }
    }

    /// Sum of every element's field at ray-parameter `t`, minus threshold.
    pub fn density_at(&self, ray: &Ray, t: f64) -> f64 {
        self.elements.iter().map(|e| e.field_at(ray, t)).sum::<f64>() - self.threshold
    }
}

impl Object for Blob {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        if self.flags.contains(DEGENERATE) {
            return vec![];
        }

        let mut events: Vec<f64> = self.elements.iter().flat_map(|e| e.activation_events(ray)).collect();
        events.push(-BIG_HUGE);
        events.push(BIG_HUGE);
        events.sort_by(|a, b| a.partial_cmp(b).unwrap());
        events.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        let mut xs = Vec::new();
        for w in events.windows(2) {
            let (t_lo, t_hi) = (w[0], w[1]);
            if !(t_hi > DEPTH_TOLERANCE) {
                continue;
            }
            let t_lo = t_lo.max(DEPTH_TOLERANCE);
            let mid = 0.5 * (t_lo + t_hi);
            let mut active: Vec<usize> = Vec::new();
            let mut sum = [0.0f64; 5];
            for (idx, e) in self.elements.iter().enumerate() {
                if e.is_active_at(ray, mid) {
                    active.push(idx);
                    let c = e.field_coeffs(ray);
                    for k in 0..5 {
                        sum[k] += c[k];
                    }
                }
            }
            if active.is_empty() {
                continue;
            }
            sum[0] -= self.threshold;
            let roots = find_roots_in_interval(&sum, t_lo, t_hi, 64);
            for t in roots {
                if t > DEPTH_TOLERANCE {
                    // Tag i1 with the index of the strongest active element at
                    // the hit, for normal-at and per-element texturing.
                    let strongest = active.iter().copied()
                        .max_by(|&a, &b| self.elements[a].field_at(ray, t).abs()
                            .partial_cmp(&self.elements[b].field_at(ray, t).abs()).unwrap())
                        .unwrap_or(0);
                    xs.push(Intersection::new_tagged(t, self.id, strongest as i32, 0, 0.0));
                }
            }
        }
        xs.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        xs
    }

    fn local_normal_at(&self, local_point: &Tuple, hit: &Intersection) -> Tuple {
        // Gradient of the summed field, evaluated numerically - each
        // element's contribution is smooth, so a central-difference
        // estimate is stable and avoids hand-deriving every partial.
        let h = 1e-5;
        let density_at_point = |p: &Tuple| -> f64 {
            self.elements.iter().map(|e| {
                let r2 = e.radius * e.radius;
                let d2 = match &e.kind {
                    ElementKind::Sphere => p.subtract(&e.center).dot(&p.subtract(&e.center)),
                    ElementKind::Cylinder { axis } => {
                        let q = p.subtract(&e.center);
                        let qv = q.dot(axis);
                        q.dot(&q) - qv * qv
                    }
                };
                let hh = 1.0 - d2 / r2;
                if hh > 0.0 { e.strength * hh * hh } else { 0.0 }
            }).sum::<f64>()
        };
        let _ = hit;
        let dx = density_at_point(&local_point.add(&Tuple::vector(h, 0.0, 0.0)))
            - density_at_point(&local_point.add(&Tuple::vector(-h, 0.0, 0.0)));
        let dy = density_at_point(&local_point.add(&Tuple::vector(0.0, h, 0.0)))
            - density_at_point(&local_point.add(&Tuple::vector(0.0, -h, 0.0)));
        let dz = density_at_point(&local_point.add(&Tuple::vector(0.0, 0.0, h)))
            - density_at_point(&local_point.add(&Tuple::vector(0.0, 0.0, -h)));
        let n = Tuple::vector(dx, dy, dz);
        let len = n.magnitude();
        if len < crate::EPSILON { Tuple::vector(1.0, 0.0, 0.0) } else { n.divide(len) }
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
        format!("Blob: {} elements, threshold: {}", self.elements.len(), self.threshold)
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
        if self.elements.is_empty() {
            return AABB::new(Tuple::point(0.0, 0.0, 0.0), Tuple::point(0.0, 0.0, 0.0));
        }
        let mut aabb = AABB::new(
            Tuple::point(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Tuple::point(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for e in &self.elements {
            let r = e.radius;
            let elem_box = AABB::new(
                Tuple::point(e.center.x - r, e.center.y - r, e.center.z - r),
                Tuple::point(e.center.x + r, e.center.y + r, e.center.z + r),
            );
            aabb.adjust_aabb(&elem_box);
        }
        aabb
    }
}
