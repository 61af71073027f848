//! Spec §3's "Shape (abstract entity)" essential attributes - the flags
//! bitset, texture/interior references, and bound/clip lists every shape
//! (primitive, CSG node, or group alike) carries - live here as one
//! generic wrapper rather than duplicated fields on every one of the
//! kernel's twenty-odd primitive structs. The parser (spec §4.3's shared
//! "modifier loop") builds every top-level object through this wrapper:
//! `Shape::new(inner_id)` plus whatever modifiers were parsed. This is the
//! concrete Rust-idiomatic reading of spec §9's "represent shapes as a
//! tagged enum... children are owned sequences" note, generalized with
//! composition instead of inheritance.
//!
//! The wrapper's own transform is always identity: `translate`/`rotate`/
//! `scale`/`matrix` modifiers are folded directly into the wrapped
//! primitive's own `transform` field before it is handed to `Shape::new`,
//! matching how every primitive file already stores its transform. Only
//! the attributes a primitive has no field for - flags, bound, clip,
//! texture/interior identity - live on this wrapper.

use std::sync::Arc;
use crate::matrix::Matrix;
use crate::raytracer::flags::{Flags, INVERTED};
use crate::raytracer::intersection::Intersection;
use crate::raytracer::material::Material;
use crate::raytracer::object::db::{add_object, get_next_id, get_object};
use crate::raytracer::object::{AABB, Object};
use crate::raytracer::ray::Ray;
use crate::tuple::Tuple;

pub struct Shape {
    pub id: usize,
    pub parent_id: Option<usize>,
    pub inner: usize,
    pub flags: Flags,
    /// Intersection-test prefilter (spec §4.2): a hit must lie inside every
    /// shape in this list. Bound shapes never contribute color and (per
    /// spec) may only shrink this shape's AABB, never grow it.
    pub bound: Vec<usize>,
    /// Like `bound`, but additionally carves the surface: a candidate hit
    /// that fails any clip shape's `inside` test is dropped entirely, not
    /// just used to prune traversal.
    pub clip: Vec<usize>,
    /// `#declare`d texture/interior identifier this shape resolved to, kept
    /// for the post-parse promotion pass (spec §4.3) even though the core
    /// does not evaluate shading itself.
    pub texture_name: Option<String>,
    pub interior_name: Option<String>,
    /// Owned copy of the inner object's material, per every other `Object`
    /// impl's `&self.material` convention - `get_object(self.inner)` returns
    /// an owned `Arc`, so a delegated `get_material` would try to hand back
    /// a reference into a value that's dropped at the end of the call.
    material: Material,
    transform: Matrix,
}

impl Shape {
    pub fn new(inner: usize) -> Shape {
        Shape {
            id: get_next_id(),
            parent_id: None,
            inner,
            flags: Flags::empty(),
            bound: Vec::new(),
            clip: Vec::new(),
            texture_name: None,
            interior_name: None,
            material: Material::default(),
            transform: Matrix::identity(4),
        }
    }

    /// Builds a wrapper around a not-yet-registered object, first reserving
    /// the wrapper's id so the inner object's `parent_id` can point at it -
    /// required so `world_to_object`/`normal_to_world` walk through this
    /// (identity-transform) layer up to whatever contains it, exactly as
    /// [`crate::raytracer::object::group::Group::add_child`] does for plain
    /// containment.
    pub fn wrap(mut inner_object: Arc<dyn Object + Send>) -> Shape {
        let id = get_next_id();
        Arc::get_mut(&mut inner_object).unwrap().set_parent_id(id);
        let inner = inner_object.get_id();
        let material = inner_object.get_material().clone();
        add_object(inner_object);
        Shape {
            id,
            parent_id: None,
            inner,
            flags: Flags::empty(),
            bound: Vec::new(),
            clip: Vec::new(),
            material,
            texture_name: None,
            interior_name: None,
            transform: Matrix::identity(4),
        }
    }
}

impl Object for Shape {
    fn local_intersect(&self, ray: &Ray) -> Vec<Intersection> {
        let inner = get_object(self.inner);
        let mut xs = inner.intersect(ray);
        if !self.clip.is_empty() {
            xs.retain(|i| {
                let p = ray.position(i.t);
                self.clip.iter().all(|cid| get_object(*cid).inside(&p))
            });
        }
        xs
    }

    fn local_normal_at(&self, local_point: &Tuple, hit: &Intersection) -> Tuple {
        get_object(self.inner).local_normal_at(local_point, hit)
    }

    fn normal_at(&self, world_point: &Tuple, hit: &Intersection) -> Tuple {
        get_object(self.inner).normal_at(world_point, hit)
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
        format!("Shape: inner {}, flags {:?}", self.inner, self.flags)
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
        let inner = get_object(self.inner);
        let mut aabb = inner.get_aabb().apply_transform(inner.get_transform());
        for bid in &self.bound {
            let b = get_object(*bid);
            let baabb = b.get_aabb().apply_transform(b.get_transform());
            aabb.min.x = aabb.min.x.max(baabb.min.x);
            aabb.min.y = aabb.min.y.max(baabb.min.y);
            aabb.min.z = aabb.min.z.max(baabb.min.z);
            aabb.max.x = aabb.max.x.min(baabb.max.x);
            aabb.max.y = aabb.max.y.min(baabb.max.y);
            aabb.max.z = aabb.max.z.min(baabb.max.z);
        }
        aabb
    }

    fn includes(&self, object_id: usize) -> bool {
        self.id == object_id || get_object(self.inner).includes(object_id)
    }

    fn inside(&self, world_point: &Tuple) -> bool {
        let raw = get_object(self.inner).inside(world_point);
        raw ^ self.flags.contains(INVERTED)
    }

    fn child_ids(&self) -> Vec<usize> {
        vec![self.inner]
    }

    fn texture_name(&self) -> Option<String> {
        self.texture_name.clone()
    }

    fn set_texture_name_if_absent(&mut self, name: &str) {
        if self.texture_name.is_none() {
            self.texture_name = Some(name.to_string());
        }
    }

    fn interior_name(&self) -> Option<String> {
        self.interior_name.clone()
    }

    fn set_interior_name_if_absent(&mut self, name: &str) {
        if self.interior_name.is_none() {
            self.interior_name = Some(name.to_string());
        }
    }

    fn flags(&self) -> crate::raytracer::flags::Flags {
        self.flags
    }

    fn set_flags(&mut self, flags: crate::raytracer::flags::Flags) {
        self.flags = flags;
    }

    fn bound_ids(&self) -> Vec<usize> {
        self.bound.clone()
    }

    fn clip_ids(&self) -> Vec<usize> {
        self.clip.clone()
    }

    fn clear_bound(&mut self) {
        self.bound.clear();
    }

    fn add_bound(&mut self, ids: &[usize]) {
        self.bound.extend_from_slice(ids);
    }

    fn inner_kind(&self) -> &'static str {
        get_object(self.inner).inner_kind()
    }

    fn is_union_csg(&self) -> bool {
        get_object(self.inner).is_union_csg()
    }
}
