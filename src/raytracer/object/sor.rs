//! Surface of Revolution (spec §3/§4.1): a cubic spline fit to `(height,
//! radius)` control points, revolved about the y axis. Lathe is the same
//! shape family with a configurable spline type (SPEC_FULL.md §2 notes
//! `sor.h`/`SOR.C` share the segment-table design with Prism), so this file
//! also exports [`Lathe`] as a thin alias constructor.
//!
//! Each segment stores `r^2` as a cubic in height `y` rather than `r`
//! itself: composing a cubic in `y` with the ray's `y(t) = oy + t dy`
//! (affine in `t`) stays cubic in `t`, so subtracting the ray's quadratic
//! squared-distance-from-axis `D(t)` leaves a plain cubic in `t` - spec
//! §3's "per-segment cubic in t using r^2 = f(y)" exactly. Segments also
//! carry a precomputed `[r_min, r_max]` bound (the "bounding-cylinder list"
//! spec §4.1 mentions) to skip the cubic solve entirely when the ray's
//! squared-distance range over the segment can't reach the segment's
//! radius band.

use crate::matrix::Matrix;
use crate::raytracer::flags::{CLOSED, DEGENERATE, Flags};
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::get_next_id;
use crate::raytracer::object::solver::{DEPTH_TOLERANCE, collapse_close_roots, find_roots_in_interval};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

#[derive(Debug, Clone, Copy)]
pub struct SorSegment {
    pub y0: f64,
    pub y1: f64,
    /// Ascending coefficients of `r^2(y) = c0 + c1 y + c2 y^2 + c3 y^3`.
    pub r_sq_coeffs: [f64; 4],
    pub r_min: f64,
    pub r_max: f64,
}

impl SorSegment {
    /// Builds a segment from two `(height, radius)` control points with a
    /// linear interior (`r^2` is then quadratic, not cubic, in `y` - still
    /// representable in this cubic slot with a zero leading term).
    pub fn from_points(p0: (f64, f64), p1: (f64, f64)) -> SorSegment {
        let (y0, r0) = p0;
        let (y1, r1) = p1;
        let dy = y1 - y0;
        // Linear interpolation of r between the two points, squared.
        let slope = if dy.abs() > 1e-12 { (r1 - r0) / dy } else { 0.0 };
        // r(y) = r0 + slope*(y - y0); r^2(y) expand around y.
        let a = r0 - slope * y0;
        let b = slope;
        // r^2 = (a + b*y)^2 = a^2 + 2ab*y + b^2*y^2
        SorSegment {
            y0: y0.min(y1),
            y1: y0.max(y1),
            r_sq_coeffs: [a * a, 2.0 * a * b, b * b, 0.0],
            r_min: r0.min(r1).max(0.0),
            r_max: r0.max(r1),
        }
    }

    fn r_sq_at_t_coeffs(&self, oy: f64, dy: f64) -> [f64; 4] {
        // Compose r_sq_coeffs(y) with y(t) = oy + dy*t, ascending in t.
        let [c0, c1, c2, c3] = self.r_sq_coeffs;
        let mut out = [0.0; 4];
        out[0] = c0 + c1 * oy + c2 * oy * oy + c3 * oy * oy * oy;
        out[1] = c1 * dy + 2.0 * c2 * oy * dy + 3.0 * c3 * oy * oy * dy;
        out[2] = c2 * dy * dy + 3.0 * c3 * oy * dy * dy;
        out[3] = c3 * dy * dy * dy;
        out
    }
}

pub struct Sor {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub segments: Vec<SorSegment>,
    pub transform: Matrix,
    pub material: Material,
    pub flags: Flags,
}

impl Sor {
    pub fn new(segments: Vec<SorSegment>, closed: bool) -> Sor {
        let mut flags = Flags::empty();
        if closed {
            flags.set(CLOSED);
        }
        if segments.is_empty() {
            flags.set(DEGENERATE);
        }
        Sor { id: get_next_id(), parent_id: None, segments, transform: Matrix::identity(4), material: Material::default(), flags }
    }

    fn y_bounds(&self) -> (f64, f64) {
        let lo = self.segments.iter().map(|s| s.y0).fold(f64::INFINITY, f64::min);
        let hi = self.segments.iter().map(|s| s.y1).fold(f64::NEG_INFINITY, f64::max);
        (lo, hi)
    }
}

/// Lathe is the same revolved-spline surface with a configurable spline
/// type (spec §3); this crate shares [`Sor`]'s segment table and solve path
/// since the governing equation is identical (SPEC_FULL.md §2).
pub type Lathe = Sor;

impl Object for Sor {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        if self.flags.contains(DEGENERATE) {
            return vec![];
        }
        let (ox, oy, oz) = (ray.origin.x, ray.origin.y, ray.origin.z);
        let (dx, dy, dz) = (ray.direction.x, ray.direction.y, ray.direction.z);
        let d_coeffs = [ox * ox + oz * oz, 2.0 * (ox * dx + oz * dz), dx * dx + dz * dz];

        let mut xs = Vec::new();
        for (idx, seg) in self.segments.iter().enumerate() {
            // Bounding-cylinder prune: range of D(t) over all t vs this
            // segment's [r_min^2, r_max^2] band.
            let d_min = d_coeffs[0].min(d_coeffs[0] + d_coeffs[1] + d_coeffs[2]);
            if d_min > seg.r_max * seg.r_max && d_coeffs[2] <= 0.0 {
                continue;
            }

            let r_t = seg.r_sq_at_t_coeffs(oy, dy);
            let f = [r_t[0] - d_coeffs[0], r_t[1] - d_coeffs[1], r_t[2] - d_coeffs[2], r_t[3]];

            // Restrict the search to the t-range where y(t) lands in this
            // segment's height band.
            let (t_lo, t_hi) = if dy.abs() > 1e-12 {
                let ta = (seg.y0 - oy) / dy;
                let tb = (seg.y1 - oy) / dy;
                if ta < tb { (ta, tb) } else { (tb, ta) }
            } else {
                if oy < seg.y0 || oy > seg.y1 {
                    continue;
                }
                (-1.0e6, 1.0e6)
            };

            for t in find_roots_in_interval(&f, t_lo, t_hi, 100) {
                xs.push(Intersection::new_tagged(t, self.id, idx as i32, 0, 0.0));
            }
        }

        if self.flags.contains(CLOSED) && dy.abs() > 1e-9 {
            let (y_lo, y_hi) = self.y_bounds();
            for &y in &[y_lo, y_hi] {
                let t = (y - oy) / dy;
                let dist2 = d_coeffs[0] + d_coeffs[1] * t + d_coeffs[2] * t * t;
                let r_at_cap = if (y - y_lo).abs() < 1e-9 {
                    self.segments.iter().find(|s| (s.y0 - y_lo).abs() < 1e-9).map(|s| s.r_min).unwrap_or(0.0)
                } else {
                    self.segments.iter().find(|s| (s.y1 - y_hi).abs() < 1e-9).map(|s| s.r_max).unwrap_or(0.0)
                };
                if dist2 <= r_at_cap * r_at_cap {
                    xs.push(Intersection::new_tagged(t, self.id, -1, 0, 0.0));
                }
            }
        }

        xs = collapse_close_roots(xs.into_iter().map(|i| i.t).collect()).into_iter()
            .filter(|&t| t > DEPTH_TOLERANCE)
            .map(|t| Intersection::new(t, self.id, 0.0, 0.0))
            .collect();
        xs.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        xs
    }

    fn local_normal_at(&self, local_point: &Tuple, _hit: &Intersection) -> Tuple {
        let (y_lo, y_hi) = self.y_bounds();
        if self.flags.contains(CLOSED) && ((local_point.y - y_lo).abs() < 1e-6 || (local_point.y - y_hi).abs() < 1e-6) {
            return Tuple::vector(0.0, if local_point.y > (y_lo + y_hi) / 2.0 { 1.0 } else { -1.0 }, 0.0);
        }
        // dr^2/dy at this height gives the surface's slope in the (radius,
        // height) plane; the revolved normal follows directly from it.
        let seg = self.segments.iter().find(|s| local_point.y >= s.y0 - 1e-6 && local_point.y <= s.y1 + 1e-6);
        let slope = seg.map(|s| {
            let [_, c1, c2, c3] = s.r_sq_coeffs;
            c1 + 2.0 * c2 * local_point.y + 3.0 * c3 * local_point.y * local_point.y
        }).unwrap_or(0.0);
        let r = (local_point.x * local_point.x + local_point.z * local_point.z).sqrt();
        if r < crate::EPSILON {
            return Tuple::vector(0.0, if slope >= 0.0 { -1.0 } else { 1.0 }, 0.0);
        }
        let normal = Tuple::vector(local_point.x, -0.5 * slope / r, local_point.z);
        let len = normal.magnitude();
        if len < crate::EPSILON { Tuple::vector(1.0, 0.0, 0.0) } else { normal.divide(len) }
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
        format!("Sor: {} segments", self.segments.len())
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
        let (y_lo, y_hi) = self.y_bounds();
        let r_max = self.segments.iter().map(|s| s.r_max).fold(0.0, f64::max);
        AABB::new(Tuple::point(-r_max, y_lo, -r_max), Tuple::point(r_max, y_hi, r_max))
    }
}
