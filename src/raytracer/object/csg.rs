use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use crate::matrix::Matrix;
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::{add_object, get_next_id, get_object};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

/// The boolean set operation a CSG node combines its two children with.
///
/// `Merge` behaves like `Union` for point-membership (a hit survives unless
/// it falls inside the other branch) - the two differ only in how internal,
/// now-hidden surfaces are treated for transparent materials downstream,
/// which is shading's concern, not this layer's (see DESIGN.md).
#[derive(Debug, PartialEq)]
pub enum CsgOperation {
    Union,
    Intersection,
    Difference,
    Merge,
}

impl FromStr for CsgOperation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(CsgOperation::Union),
            "intersection" => Ok(CsgOperation::Intersection),
            "difference" => Ok(CsgOperation::Difference),
            "merge" => Ok(CsgOperation::Merge),
            _ => Err(()),
        }
    }
}

/// A Constructive Solid Geometry node combining exactly two child objects
/// (themselves possibly CSG nodes, groups, or primitives) under one boolean
/// operation.
pub struct Csg {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub transform: Matrix,
    pub operation: CsgOperation,
    pub left: usize,
    pub right: usize,
    /// Whether empty interior space should be treated as solid for inside
    /// tests on a containing object (POV-Ray's `hollow`/`hollow_set`). A CSG
    /// node's own hollow-ness does not override a hollow set on an ancestor
    /// unless explicitly given (spec §4.2 Open Question): children inherit
    /// the nearest ancestor's hollow flag only when they do not set their own.
    pub hollow: bool,
    aabb_cache: Arc<RwLock<Option<AABB>>>,
}

impl Csg {
    pub fn new(operation: CsgOperation) -> Csg {
        Csg {
            id: get_next_id(),
            parent_id: None,
            transform: Matrix::identity(4),
            operation,
            left: usize::MAX,
            right: usize::MAX,
            hollow: false,
            aabb_cache: Arc::new(RwLock::new(None)),
        }
    }

    fn get_aabb_cache(&self) -> RwLockReadGuard<Option<AABB>> {
        self.aabb_cache.read().unwrap()
    }

    fn set_aabb_cache(&self, aabb: AABB) {
        let mut cache = self.aabb_cache.write().unwrap();
        *cache = Some(aabb);
    }

    pub fn set_left(&mut self, mut object: Arc<dyn Object + Send>) -> usize {
        Arc::get_mut(&mut object).unwrap().set_parent_id(self.id);
        let child_id = object.get_id();
        add_object(object);
        self.left = child_id;
        child_id
    }

    pub fn set_right(&mut self, mut object: Arc<dyn Object + Send>) -> usize {
        Arc::get_mut(&mut object).unwrap().set_parent_id(self.id);
        let child_id = object.get_id();
        add_object(object);
        self.right = child_id;
        child_id
    }

    /// The intersection-stack truth table (spec §4.2): given whether the
    /// current hit is on the left branch, and whether we're presently inside
    /// the other branch, decide whether the hit is a surface of the combined
    /// solid.
    pub fn intersection_allowed(&self, lhit: bool, inl: bool, inr: bool) -> bool {
        match self.operation {
            CsgOperation::Union | CsgOperation::Merge => {
                (lhit && !inr) || (!lhit && !inl)
            }
            CsgOperation::Intersection => {
                (lhit && inr) || (!lhit && inl)
            }
            CsgOperation::Difference => {
                (lhit && !inr) || (!lhit && inl)
            }
        }
    }

    pub fn filter_intersections(&self, xs: &Vec<Intersection>) -> Vec<Intersection> {
        let mut inl = false;
        let mut inr = false;
        let mut result = Vec::new();

        let left = get_object(self.left);
        for i in xs {
            let lhit = left.includes(i.object);
            if self.intersection_allowed(lhit, inl, inr) {
                result.push(i.clone());
            }
            if lhit {
                inl = !inl;
            } else {
                inr = !inr;
            }
        }
        result
    }
}

impl Object for Csg {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let left = get_object(self.left);
        let right = get_object(self.right);
        let mut xs = left.intersect(ray);
        xs.append(&mut right.intersect(ray));
        xs.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        self.filter_intersections(&xs)
    }

    fn local_normal_at(&self, _local_point: &Tuple, _hit: &Intersection) -> Tuple {
        panic!("CSG nodes do not have normals")
    }

    fn get_transform(&self) -> &Matrix {
        &self.transform
    }

    fn get_material(&self) -> &Material {
        panic!("CSG nodes do not have materials")
    }

    fn set_transform(&mut self, transform: Matrix) {
        self.transform = transform;
    }

    fn set_material(&mut self, _material: Material) {
    }

    fn debug_string(&self) -> String {
        format!("CSG: transform: {:?}, op: {:?}", self.transform, self.operation)
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
        if let Some(cached_aabb) = *self.get_aabb_cache() {
            return cached_aabb;
        }

        let mut aabb = AABB::new(
            Tuple::point(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Tuple::point(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        );

        let left = get_object(self.left);
        aabb.adjust_aabb(&left.get_aabb().apply_transform(left.get_transform()));

        let right = get_object(self.right);
        aabb.adjust_aabb(&right.get_aabb().apply_transform(right.get_transform()));

        self.set_aabb_cache(aabb);
        aabb
    }

    fn includes(&self, object_id: usize) -> bool {
        if object_id == self.id {
            return true;
        }
        get_object(self.left).includes(object_id) || get_object(self.right).includes(object_id)
    }

    /// Spec §4.2: "`inside`: inherit the corresponding set-theoretic
    /// combination" - OR for Union/Merge, AND for Intersection, and AND
    /// with the right branch's sense flipped for Difference (same
    /// first-child rule `filter_intersections` uses).
    fn inside(&self, world_point: &Tuple) -> bool {
        let l = get_object(self.left).inside(world_point);
        let r = get_object(self.right).inside(world_point);
        match self.operation {
            CsgOperation::Union | CsgOperation::Merge => l || r,
            CsgOperation::Intersection => l && r,
            CsgOperation::Difference => l && !r,
        }
    }

    fn child_ids(&self) -> Vec<usize> {
        vec![self.left, self.right]
    }

    fn inner_kind(&self) -> &'static str {
        "csg"
    }

    fn is_union_csg(&self) -> bool {
        self.operation == CsgOperation::Union
    }
}

#[cfg(test)]
mod tests {
    use crate::raytracer::camera::Camera;
    use crate::raytracer::light::Light;
    use crate::raytracer::material::pattern::Pattern;
    use crate::raytracer::object::cube::Cube;
    use crate::raytracer::object::plane::Plane;
    use crate::raytracer::object::sphere::Sphere;
    use crate::raytracer::scene::Scene;
    use super::*;

    #[test]
    fn evaluating_the_rule_for_a_csg_operation() {
        let c = Csg::new(CsgOperation::Union);
        assert_eq!(c.intersection_allowed(true, true, true), false);
        assert_eq!(c.intersection_allowed(true, true, false), true);
        assert_eq!(c.intersection_allowed(true, false, true), false);
        assert_eq!(c.intersection_allowed(true, false, false), true);
        assert_eq!(c.intersection_allowed(false, true, true), false);
        assert_eq!(c.intersection_allowed(false, true, false), false);
        assert_eq!(c.intersection_allowed(false, false, true), true);
        assert_eq!(c.intersection_allowed(false, false, false), true);

        let c = Csg::new(CsgOperation::Intersection);
        assert_eq!(c.intersection_allowed(true, true, true), true);
        assert_eq!(c.intersection_allowed(true, true, false), false);
        assert_eq!(c.intersection_allowed(true, false, true), true);
        assert_eq!(c.intersection_allowed(true, false, false), false);
        assert_eq!(c.intersection_allowed(false, true, true), true);
        assert_eq!(c.intersection_allowed(false, true, false), true);
        assert_eq!(c.intersection_allowed(false, false, true), false);
        assert_eq!(c.intersection_allowed(false, false, false), false);

        let c = Csg::new(CsgOperation::Difference);
        assert_eq!(c.intersection_allowed(true, true, true), false);
        assert_eq!(c.intersection_allowed(true, true, false), true);
        assert_eq!(c.intersection_allowed(true, false, true), false);
        assert_eq!(c.intersection_allowed(true, false, false), true);
        assert_eq!(c.intersection_allowed(false, true, true), true);
        assert_eq!(c.intersection_allowed(false, true, false), true);
        assert_eq!(c.intersection_allowed(false, false, true), false);
        assert_eq!(c.intersection_allowed(false, false, false), false);

        let c = Csg::new(CsgOperation::Merge);
        assert_eq!(c.intersection_allowed(true, true, true), false);
        assert_eq!(c.intersection_allowed(true, true, false), true);
        assert_eq!(c.intersection_allowed(false, false, false), true);
    }

    #[test]
    fn filtering_a_list_of_intersections() {
        let mut c = Csg::new(CsgOperation::Union);
        let s1 = Sphere::new();
        let s2 = Sphere::new();
        let s1_id = c.set_left(Arc::new(s1));
        let s2_id = c.set_right(Arc::new(s2));
        let i0 = Intersection::new(1.0, s1_id, 0.0, 0.0);
        let i1 = Intersection::new(2.0, s2_id, 0.0, 0.0);
        let i2 = Intersection::new(3.0, s1_id, 0.0, 0.0);
        let i3 = Intersection::new(4.0, s2_id, 0.0, 0.0);
        let xs = vec![i0.clone(), i1.clone(), i2.clone(), i3.clone()];
        let result = c.filter_intersections(&xs);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], i0);
        assert_eq!(result[1], i3);
    }

    #[test]
    #[ignore]
    fn test_render_csg() {
        use crate::color::Color;

        let mut c = Camera::new(800, 400, std::f64::consts::PI / 3.0);
        let from = Tuple::point(0.0, 1.5, -5.0);
        let to = Tuple::point(0.0, 1.0, 0.0);
        let up = Tuple::vector(0.0, 1.0, 0.0);
        c.transform = Matrix::view_transform(from, to, up);

        let mut w = Scene::new();
        w.add_light(Light::new_point_light(Tuple::point(-10.0, 10.0, -10.0), Color::new(1.0, 1.0, 1.0)));

        let mut floor = Plane::new();
        floor.transform = Matrix::translate(0.0, 0.0, 0.0);
        floor.material.pattern = Pattern::stripe(Pattern::solid(Color::new(1.0, 0.5, 0.5), Matrix::identity(4)),
                                                 Pattern::solid(Color::new(0.5, 1.0, 0.5), Matrix::identity(4)),
                                                 Matrix::scale(0.1, 0.1, 0.1).multiply(&Matrix::rotate_y(std::f64::consts::PI / 4.0)));
        floor.material.specular = 0.0;
        w.add_object(Arc::new(floor));

        let mut csg = Csg::new(CsgOperation::Difference);

        let mut material = crate::raytracer::material::Material::default();
        material.pattern = Pattern::solid(Color::new(0.302, 0.71, 0.98), Matrix::identity(4));
        let mut sphere = Sphere::new();
        sphere.material = material.clone();
        sphere.transform = Matrix::identity(4)
            .multiply(&Matrix::scale(0.6, 0.6, 0.6))
            .multiply(&Matrix::translate(0.0, 1.0, 0.0));
        csg.set_right(Arc::new(sphere));

        let mut cube = Cube::new();
        cube.material = material.clone();
        cube.transform = Matrix::identity(4)
            .multiply(&Matrix::scale(0.5, 0.5, 0.5))
            .multiply(&Matrix::translate(0.0, 1.2, 0.0));
        csg.set_left(Arc::new(cube));

        w.add_object(Arc::new(csg));

        let image = c.render(&w);
        image.write_to_file("output.png", 1);
    }
}
