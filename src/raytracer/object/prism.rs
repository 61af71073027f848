//! Prism (spec §3: "2D spline (linear/quadratic/cubic/Bezier) x sweep
//! {linear,conic} x [h1,h2]"). The 2D cross-section curve is stored the way
//! `prism.h`/`PRISM.C` store it (SPEC_FULL.md §2): a precomputed table of
//! per-segment cubic coefficients in the curve parameter `w`, regardless of
//! which spline type built them - linear-spline segments simply have zero
//! quadratic/cubic coefficients. The table is reference-counted (`Arc`)
//! across `copy()`, per spec §4.1/§9's spline-sharing note.
//!
//! LINEAR_SWEEP intersection is exact: the ray's (x, z) projection is a
//! straight line in the cross-section plane, so eliminating the ray
//! parameter `t` against a segment's cubic `(x(w), z(w))` leaves a cubic in
//! `w` alone, solved in closed form. CONIC_SWEEP (taper to a point at `h2`)
//! is solved by bracket-and-bisect on an inside/outside test instead, the
//! same numerical-refinement idea the superellipsoid uses (SPEC_FULL.md
//! §2) - exact elimination against a height-dependent taper factor isn't
//! worth the algebra this kernel needs to stay maintainable.

use std::sync::Arc;
use crate::matrix::Matrix;
use crate::raytracer::flags::{CLOSED, DEGENERATE, Flags};
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::get_next_id;
use crate::raytracer::object::solver::{DEPTH_TOLERANCE, collapse_close_roots, find_roots_in_interval, find_roots_of_fn};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepType {
    Linear,
    Conic,
}

/// One segment's cubic `x(w) = x0 + x1 w + x2 w^2 + x3 w^3`, `w` in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct PrismSegment {
    pub x: [f64; 4],
    pub z: [f64; 4],
}

impl PrismSegment {
    pub fn linear(p0: (f64, f64), p1: (f64, f64)) -> PrismSegment {
        PrismSegment { x: [p0.0, p1.0 - p0.0, 0.0, 0.0], z: [p0.1, p1.1 - p0.1, 0.0, 0.0] }
    }

    fn point(&self, w: f64) -> (f64, f64) {
        let ev = |c: &[f64; 4]| c[0] + w * (c[1] + w * (c[2] + w * c[3]));
        (ev(&self.x), ev(&self.z))
    }
}

pub struct Prism {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub segments: Arc<Vec<PrismSegment>>,
    pub sweep: SweepType,
    pub h1: f64,
    pub h2: f64,
    pub transform: Matrix,
    pub material: Material,
    pub flags: Flags,
}

impl Prism {
    pub fn new(segments: Vec<PrismSegment>, sweep: SweepType, h1: f64, h2: f64, closed: bool) -> Prism {
        let mut flags = Flags::empty();
        if closed {
            flags.set(CLOSED);
        }
        if segments.len() < 3 {
            flags.set(DEGENERATE);
        }
        Prism {
            id: get_next_id(),
            parent_id: None,
            segments: Arc::new(segments),
            sweep,
            h1,
            h2,
            transform: Matrix::identity(4),
            material: Material::default(),
            flags,
        }
    }

    fn taper(&self, y: f64) -> f64 {
        match self.sweep {
            SweepType::Linear => 1.0,
            SweepType::Conic => ((self.h2 - y) / (self.h2 - self.h1)).max(0.0),
        }
    }

    /// Point-in-polygon test against the curve, sampled into a polyline.
    /// Used only to bracket CONIC_SWEEP hits (see module docs).
    fn inside_xz(&self, x: f64, z: f64) -> bool {
        let mut pts: Vec<(f64, f64)> = Vec::new();
        for seg in self.segments.iter() {
            for i in 0..8 {
                pts.push(seg.point(i as f64 / 8.0));
            }
        }
        let n = pts.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, zi) = pts[i];
            let (xj, zj) = pts[j];
            if ((zi > z) != (zj > z)) && (x < (xj - xi) * (z - zi) / (zj - zi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn linear_sweep_hits(&self, ray: &Ray) -> Vec<f64> {
        let (ox, oz, dx, dz) = (ray.origin.x, ray.origin.z, ray.direction.x, ray.direction.z);
        let mut ts = Vec::new();
        for seg in self.segments.iter() {
            // dx*(z(w)-oz) - dz*(x(w)-ox) = 0, ascending coeffs in w.
            let mut c = [0.0; 4];
            for k in 0..4 {
                c[k] = dx * seg.z[k] - dz * seg.x[k];
            }
            c[0] -= dx * oz - dz * ox;
            for w in find_roots_in_interval(&c, 0.0, 1.0, 200) {
                let (xw, _zw) = seg.point(w);
                let t = if dx.abs() > dz.abs() { (xw - ox) / dx } else { (seg.point(w).1 - oz) / dz };
                if ray.origin.y + t * ray.direction.y >= self.h1.min(self.h2)
                    && ray.origin.y + t * ray.direction.y <= self.h1.max(self.h2) {
                    ts.push(t);
                }
            }
        }
        ts
    }

    fn conic_sweep_hits(&self, ray: &Ray) -> Vec<f64> {
        if ray.direction.y.abs() < 1e-9 {
            return vec![];
        }
        let t_lo = (self.h1 - ray.origin.y) / ray.direction.y;
        let t_hi = (self.h2 - ray.origin.y) / ray.direction.y;
        let (t_lo, t_hi) = if t_lo < t_hi { (t_lo, t_hi) } else { (t_hi, t_lo) };
        let signed = |t: f64| -> f64 {
            let y = ray.origin.y + t * ray.direction.y;
            let s = self.taper(y);
            if s <= 1e-9 {
                return -1.0;
            }
            let x = (ray.origin.x + t * ray.direction.x) / s;
            let z = (ray.origin.z + t * ray.direction.z) / s;
            if self.inside_xz(x, z) { 1.0 } else { -1.0 }
        };
        find_roots_of_fn(signed, t_lo, t_hi, 128)
    }

    fn cap_hits(&self, ray: &Ray) -> Vec<f64> {
        let mut ts = Vec::new();
        if ray.direction.y.abs() < 1e-9 {
            return ts;
        }
        for &h in &[self.h1, self.h2] {
            let t = (h - ray.origin.y) / ray.direction.y;
            let s = self.taper(h);
            if s <= 1e-9 {
                continue;
            }
            let x = (ray.origin.x + t * ray.direction.x) / s;
            let z = (ray.origin.z + t * ray.direction.z) / s;
            if self.inside_xz(x, z) {
                ts.push(t);
            }
        }
        ts
    }
}

impl Object for Prism {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        if self.flags.contains(DEGENERATE) {
            return vec![];
        }
        let mut ts = match self.sweep {
            SweepType::Linear => self.linear_sweep_hits(ray),
            SweepType::Conic => self.conic_sweep_hits(ray),
        };
        if self.flags.contains(CLOSED) {
            ts.extend(self.cap_hits(ray));
        }
        collapse_close_roots(ts).into_iter()
            .filter(|&t| t > DEPTH_TOLERANCE)
            .map(|t| Intersection::new(t, self.id, 0.0, 0.0))
            .collect()
    }

    fn local_normal_at(&self, local_point: &Tuple, _hit: &Intersection) -> Tuple {
        if (local_point.y - self.h1).abs() < 1e-6 {
            return Tuple::vector(0.0, -1.0, 0.0);
        }
        if (local_point.y - self.h2).abs() < 1e-6 {
            return Tuple::vector(0.0, 1.0, 0.0);
        }
        // Numeric gradient of the signed inside/outside test in the (x, z)
        // plane, which is well-defined near the boundary even under taper.
        let h = 1e-4;
        let s = |x: f64, z: f64| if self.inside_xz(x, z) { 1.0 } else { -1.0 };
        let dx = s(local_point.x + h, local_point.z) - s(local_point.x - h, local_point.z);
        let dz = s(local_point.x, local_point.z + h) - s(local_point.x, local_point.z - h);
        let n = Tuple::vector(dx, 0.0, dz);
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
        format!("Prism: {} segments, h1: {}, h2: {}", self.segments.len(), self.h1, self.h2)
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
        let mut min = Tuple::point(f64::INFINITY, self.h1.min(self.h2), f64::INFINITY);
        let mut max = Tuple::point(f64::NEG_INFINITY, self.h1.max(self.h2), f64::NEG_INFINITY);
        for seg in self.segments.iter() {
            for i in 0..=8 {
                let (x, z) = seg.point(i as f64 / 8.0);
                min.x = min.x.min(x);
                min.z = min.z.min(z);
                max.x = max.x.max(x);
                max.z = max.z.max(z);
            }
        }
        AABB::new(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<PrismSegment> {
        let pts = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        (0..4).map(|i| PrismSegment::linear(pts[i], pts[(i + 1) % 4])).collect()
    }

    #[test]
    fn closed_square_prism_has_two_cap_hits_straight_down() {
        let p = Prism::new(square(), SweepType::Linear, 0.0, 1.0, true);
        let r = Ray::new(Tuple::point(0.0, 3.0, 0.0), Tuple::vector(0.0, -1.0, 0.0));
        assert_eq!(p.local_intersect(&r).len(), 2);
    }

    #[test]
    fn open_square_prism_has_no_cap_hits_straight_down() {
        let p = Prism::new(square(), SweepType::Linear, 0.0, 1.0, false);
        let r = Ray::new(Tuple::point(0.0, 3.0, 0.0), Tuple::vector(0.0, -1.0, 0.0));
        assert_eq!(p.local_intersect(&r).len(), 0);
    }

    #[test]
    fn sideways_ray_hits_two_walls() {
        let p = Prism::new(square(), SweepType::Linear, 0.0, 1.0, true);
        let r = Ray::new(Tuple::point(-3.0, 0.5, 0.0), Tuple::vector(1.0, 0.0, 0.0));
        assert_eq!(p.local_intersect(&r).len(), 2);
    }

    #[test]
    fn degenerate_prism_needs_at_least_three_segments() {
        let p = Prism::new(vec![PrismSegment::linear((0.0, 0.0), (1.0, 0.0))], SweepType::Linear, 0.0, 1.0, true);
        assert!(p.flags.contains(DEGENERATE));
    }
}
