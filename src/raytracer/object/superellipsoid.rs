use crate::matrix::Matrix;
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::get_next_id;
use crate::raytracer::object::solver::{collapse_close_roots, find_roots_of_fn};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

/// `SUPER.C`'s `planes[PLANECOUNT][4]` table (`examples/original_source/dos/
/// SOURCE/SUPER.C`): the 6 diagonal planes `x=\pm y`, `x=\pm z`, `y=\pm z`
/// plus the 3 coordinate planes `x=0`, `y=0`, `z=0`. Every one of these
/// planes passes through the origin, so each is just a normal `(a, b, c)`
/// with implicit offset 0. Splitting the ray's bounding-box bracket at every
/// crossing of these 9 planes (`find_ray_plane_points` in the same file)
/// guarantees each resulting sub-interval is monotone - the surface can
/// change sign along it at most once - which is what makes a single
/// bracket-and-bisect per sub-interval root-complete instead of a heuristic.
const SUBDIVIDING_PLANES: [(f64, f64, f64); 9] = [
    (1.0, 1.0, 0.0), (1.0, -1.0, 0.0),
    (1.0, 0.0, 1.0), (1.0, 0.0, -1.0),
    (0.0, 1.0, 1.0), (0.0, 1.0, -1.0),
    (1.0, 0.0, 0.0),
    (0.0, 1.0, 0.0),
    (0.0, 0.0, 1.0),
];

/// POV-Ray's `superellipsoid { <e, n> }`: the implicit surface
/// `(|x|^(2/e) + |y|^(2/e))^(e/n) + |z|^(2/n) = 1`, always bounded by the
/// unit box regardless of `e`/`n` (`super.h`'s box-bracket strategy). That
/// bound gives a tight ray interval to bisect over instead of searching an
/// unbounded range.
pub struct Superellipsoid {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub transform: Matrix,
    pub material: Material,
    pub e: f64,
    pub n: f64,
}

impl Superellipsoid {
    pub fn new(e: f64, n: f64) -> Superellipsoid {
        Superellipsoid {
            id: get_next_id(),
            parent_id: None,
            transform: Matrix::identity(4),
            material: Material::default(),
            e, n,
        }
    }

    fn value_at(&self, p: &Tuple) -> f64 {
        let u = p.x.abs().powf(2.0 / self.e) + p.y.abs().powf(2.0 / self.e);
        u.powf(self.e / self.n) + p.z.abs().powf(2.0 / self.n) - 1.0
    }

    /// Intersect the ray with the unit box `[-1,1]^3` to find the interval
    /// worth bisecting; every real root of the surface lies inside it.
    fn box_bracket(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for (o, d) in [(ray.origin.x, ray.direction.x), (ray.origin.y, ray.direction.y), (ray.origin.z, ray.direction.z)] {
            if d.abs() < 1e-12 {
                if o < -1.0 || o > 1.0 {
                    return None;
                }
                continue;
            }
            let mut t0 = (-1.0 - o) / d;
            let mut t1 = (1.0 - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
        }
        if t_min > t_max {
            None
        } else {
            Some((t_min, t_max))
        }
    }

    /// Breakpoints of the box bracket `[t_min, t_max]` against every
    /// [`SUBDIVIDING_PLANES`] crossing, sorted and deduplicated, per
    /// `find_ray_plane_points`. Consecutive pairs are the monotone
    /// sub-intervals `local_intersect` bisects independently.
    fn plane_breakpoints(ray: &Ray, t_min: f64, t_max: f64) -> Vec<f64> {
        let mut ts = vec![t_min, t_max];
        for (a, b, c) in SUBDIVIDING_PLANES {
            let denom = a * ray.direction.x + b * ray.direction.y + c * ray.direction.z;
            if denom.abs() < 1e-12 {
                continue;
            }
            let numer = a * ray.origin.x + b * ray.origin.y + c * ray.origin.z;
            let t = -numer / denom;
            if t > t_min && t < t_max {
                ts.push(t);
            }
        }
        ts.sort_by(|x, y| x.partial_cmp(y).unwrap());
        ts.dedup_by(|x, y| (*x - *y).abs() < 1e-12);
        ts
    }
}

impl Object for Superellipsoid {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        match self.box_bracket(ray) {
            None => vec![],
            Some((t_min, t_max)) => {
                let breakpoints = Self::plane_breakpoints(ray, t_min, t_max);
                let mut roots = Vec::new();
                for w in breakpoints.windows(2) {
                    let (a, b) = (w[0], w[1]);
                    if b - a < 1e-12 {
                        continue;
                    }
                    // One sub-interval, known monotone: a single bracket
                    // check (samples = 1) either finds its one possible
                    // root or confirms there is none.
                    roots.extend(find_roots_of_fn(|t| self.value_at(&ray.position(t)), a, b, 1));
                }
                collapse_close_roots(roots)
                    .into_iter()
                    .map(|t| Intersection::new(t, self.id, 0.0, 0.0))
                    .collect()
            }
        }
    }

    fn local_normal_at(&self, local_point: &Tuple, _hit: &Intersection) -> Tuple {
        let p = local_point;
        let u = p.x.abs().powf(2.0 / self.e) + p.y.abs().powf(2.0 / self.e);
        let outer = u.powf(self.e / self.n - 1.0);
        let dx = (2.0 / self.n) * outer * p.x.abs().powf(2.0 / self.e - 1.0) * p.x.signum();
        let dy = (2.0 / self.n) * outer * p.y.abs().powf(2.0 / self.e - 1.0) * p.y.signum();
        let dz = (2.0 / self.n) * p.z.abs().powf(2.0 / self.n - 1.0) * p.z.signum();
        Tuple::vector(dx, dy, dz)
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
        format!("Superellipsoid: transform: {:?}, e: {}, n: {}", self.transform, self.e, self.n)
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
        AABB::new(Tuple::point(-1.0, -1.0, -1.0), Tuple::point(1.0, 1.0, 1.0))
    }

    fn includes(&self, object_id: usize) -> bool {
        self.id == object_id
    }
}

#[cfg(test)]
mod tests {
    use crate::raytracer::object::Object;
    use crate::raytracer::ray::Ray;
    use crate::tuple::Tuple;
    use super::Superellipsoid;

    #[test]
    fn a_ray_through_the_center_hits_a_near_spherical_superellipsoid() {
        let s = Superellipsoid::new(1.0, 1.0);
        let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
        let xs = s.local_intersect(&r);
        assert_eq!(xs.len(), 2);
        assert!((xs[0].t - 4.0).abs() < 1e-4);
        assert!((xs[1].t - 6.0).abs() < 1e-4);
    }

    #[test]
    fn a_ray_outside_the_unit_box_misses() {
        let s = Superellipsoid::new(1.0, 1.0);
        let r = Ray::new(Tuple::point(5.0, 5.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
        assert_eq!(s.local_intersect(&r).len(), 0);
    }

    #[test]
    fn a_diagonal_ray_crosses_several_subdividing_planes() {
        // A ray through the origin along <1,1,1> crosses all six diagonal
        // planes and all three coordinate planes at t=0 simultaneously, but
        // an off-origin diagonal ray separates those crossings into several
        // distinct breakpoints within the box bracket.
        let r = Ray::new(Tuple::point(-2.0, -2.3, -2.0), Tuple::vector(1.0, 1.0, 1.0).normalize());
        let breaks = Superellipsoid::plane_breakpoints(&r, -1.0, 1.0);
        assert!(breaks.len() > 2, "expected interior plane crossings, got {:?}", breaks);
    }

    #[test]
    fn a_concave_superellipsoid_is_not_missed_between_plane_crossings() {
        // Small e/n pulls the surface in sharply along the axes (a concave,
        // star-like cross-section); an off-axis ray can cross it four times.
        let s = Superellipsoid::new(0.3, 0.3);
        let r = Ray::new(Tuple::point(0.6, 0.05, -5.0), Tuple::vector(0.0, 0.0, 1.0));
        let xs = s.local_intersect(&r);
        assert!(xs.len() >= 2 && xs.len() % 2 == 0, "expected a paired hit count, got {}", xs.len());
    }
}
