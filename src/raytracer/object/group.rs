use std::sync::Arc;
use crate::matrix::Matrix;
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::{add_object, get_next_id, get_object};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

/// A plain child-list container with no boolean semantics of its own. Used
/// by the parser for unnamed `object { ... }` grouping and by mesh/prism/SoR
/// primitives to hold their internal list of parts.
pub struct Group {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub transform: Matrix,
    pub child_ids: Vec<usize>,
}

impl Group {
    pub fn new() -> Group {
        Group {
            id: get_next_id(),
            parent_id: None,
            transform: Matrix::identity(4),
            child_ids: Vec::new(),
        }
    }

    pub fn add_child(&mut self, mut object: Arc<dyn Object + Send>) -> usize {
        Arc::get_mut(&mut object).unwrap().set_parent_id(self.id);
        let child_id = object.get_id();
        add_object(object);
        self.child_ids.push(child_id);
        child_id
    }
}

impl Object for Group {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let mut xs: Vec<Intersection> = Vec::new();
        for child_id in &self.child_ids {
            let child = get_object(*child_id);
            let mut child_xs = child.intersect(ray);
            xs.append(&mut child_xs);
        }
        xs.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        xs
    }

    fn local_normal_at(&self, _local_point: &Tuple, _hit: &Intersection) -> Tuple {
        panic!("Groups do not have normals")
    }

    fn get_transform(&self) -> &Matrix {
        &self.transform
    }

    fn get_material(&self) -> &Material {
        panic!("Groups do not have materials")
    }

    fn set_transform(&mut self, transform: Matrix) {
        self.transform = transform;
    }

    fn set_material(&mut self, _material: Material) {
        panic!("Groups do not have materials")
    }

    fn debug_string(&self) -> String {
        format!("Group: transform: {:?}, children: {}", self.transform, self.child_ids.len())
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
        let mut aabb = AABB::new(
            Tuple::point(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Tuple::point(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for child_id in &self.child_ids {
            let child = get_object(*child_id);
            let child_aabb = child.get_aabb().apply_transform(child.get_transform());
            aabb.adjust_aabb(&child_aabb);
        }
        aabb
    }

    fn includes(&self, object_id: usize) -> bool {
        if self.id == object_id {
            return true;
        }
        self.child_ids.iter().any(|id| get_object(*id).includes(object_id))
    }

    /// A plain list container is "inside" wherever any child is - there is
    /// no boolean operation to apply, unlike [`crate::raytracer::object::csg::Csg`].
    fn inside(&self, world_point: &Tuple) -> bool {
        self.child_ids.iter().any(|id| get_object(*id).inside(world_point))
    }

    fn child_ids(&self) -> Vec<usize> {
        self.child_ids.clone()
    }

    fn inner_kind(&self) -> &'static str {
        "group"
    }
}
