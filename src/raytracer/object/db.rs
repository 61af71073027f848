use std::sync::{Arc, Mutex};
use lazy_static::lazy_static;
use crate::matrix::Matrix;
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::Object;
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

lazy_static! {
    static ref GLOBAL_OBJECTS: Arc<Mutex<Vec<Arc<dyn Object + Send>>>> = Arc::new(Mutex::new(Vec::new()));
}

pub fn get_object(id: usize) -> Arc<dyn Object + Send> {
    let objects = GLOBAL_OBJECTS.lock().unwrap();
    if id < objects.len() {
        objects[id].clone()
    } else {
        panic!("Object not found: {}", id)
    }
}

/// Mutable access to a single registered object, used by the parser's
/// post-parse pass (spec §4.3) to apply flag propagation and BBox
/// recomputation in place. Only succeeds while `id`'s `Arc` has no other
/// live clone - true for every object between `add_object` and the first
/// `get_object` call elsewhere, which is exactly the window the post-parse
/// pass runs in (spec §5: "single-threaded during parse and post-process").
pub fn with_object_mut<T>(id: usize, f: impl FnOnce(&mut (dyn Object + Send)) -> T) -> Option<T> {
    let mut objects = GLOBAL_OBJECTS.lock().unwrap();
    Arc::get_mut(&mut objects[id]).map(f)
}

#[allow(dead_code)]
fn number_of_objects() -> usize {
    let objects = GLOBAL_OBJECTS.lock().unwrap();
    objects.len()
}

#[allow(dead_code)]
fn clear_global_objects() {
    let mut objects = GLOBAL_OBJECTS.lock().unwrap();
    objects.clear();
}

pub fn insert_sentinel() -> usize {
    let mut objects = GLOBAL_OBJECTS.lock().unwrap();
    let id = objects.len();
    let sentinel = Arc::new(Sentinel {id, parent_id: 0});
    objects.push(sentinel);
    id
}

pub fn replace_sentinel(id: usize, object: Arc<dyn Object + Send>) {
    let mut objects = GLOBAL_OBJECTS.lock().unwrap();
    objects[id] = object;
}

/// Reserves the next id in the registry behind a sentinel placeholder.
/// Every constructor calls this up front so an object's id is stable even
/// before it has a parent or is otherwise reachable from the scene.
pub fn get_next_id() -> usize {
    insert_sentinel()
}

/// Registers a fully-built object at the id it already carries (reserved via
/// `get_next_id`), replacing its sentinel. Returns that id for convenience.
pub fn add_object(object: Arc<dyn Object + Send>) -> usize {
    let id = object.get_id();
    replace_sentinel(id, object);
    id
}

struct Sentinel {
    id: usize,
    parent_id: usize
}

impl Object for Sentinel {
    fn local_intersect(&self, _ray: &Ray) -> Vec<Intersection> {
        vec![]
    }

    fn local_normal_at(&self, _point: &Tuple, _hit: &Intersection) -> Tuple {
        Tuple::vector(0.0, 0.0, 0.0)
    }

    fn get_transform(&self) -> &Matrix {
        panic!("Sentinel has no transform")
    }

    fn get_material(&self) -> &Material {
        panic!("Sentinel has no material")
    }

    fn set_transform(&mut self, _transform: Matrix) {
    }

    fn set_material(&mut self, _material: Material) {
    }

    fn debug_string(&self) -> String {
        format!("Sentinel")
    }

    fn get_id(&self) -> usize {
        self.id
    }

    fn get_parent_id(&self) -> Option<usize> {
        Some(self.parent_id)
    }

    fn set_parent_id(&mut self, _id: usize) {
        self.parent_id = _id;
    }
}