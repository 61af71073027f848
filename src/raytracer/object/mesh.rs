//! Mesh (spec §3): vertex/normal/texture-coordinate arrays plus an indexed
//! triangle list, built the way `load_obj.rs`'s OBJ loader already builds
//! one - convert each indexed face into a flat/smooth triangle and hand the
//! whole list to a [`Group`], which does the "internal BBox tree traversal"
//! spec §3 asks for via its own `get_aabb` child aggregation and linear
//! intersection scan (the same structure every other multi-part primitive
//! in this kernel, e.g. SoR/Prism's segment tables, already relies on).
//! `Mesh::build` is this module's single entry point; unlike `load_obj`'s
//! file-reading convenience wrapper, it takes already-decoded arrays so the
//! scene parser can feed it `mesh { triangle {...} smooth_triangle {...} }`
//! data directly instead of only OBJ-file contents.

use std::sync::Arc;
use crate::raytracer::material::Material;
use crate::raytracer::object::group::Group;
use crate::raytracer::object::smooth_triangle::SmoothTriangle;
use crate::raytracer::object::triangle::Triangle;
use crate::raytracer::object::Object;
use crate::tuple::Tuple;

/// One face: three indices into the mesh's vertex array, with optional
/// parallel indices into the normal array for smooth shading.
#[derive(Debug, Clone, Copy)]
pub struct MeshFace {
    pub v: [usize; 3],
    pub n: Option<[usize; 3]>,
}

pub struct Mesh;

impl Mesh {
    /// Builds a [`Group`] of (smooth) triangles from indexed arrays. Faces
    /// whose `n` is `Some` become [`SmoothTriangle`]s, interpolating
    /// per-vertex normals; the rest become flat [`Triangle`]s.
    pub fn build(vertices: &[Tuple], normals: &[Tuple], faces: &[MeshFace], material: Material) -> Group {
        let mut group = Group::new();
        for face in faces {
            let p1 = vertices[face.v[0]];
            let p2 = vertices[face.v[1]];
            let p3 = vertices[face.v[2]];
            match face.n {
                Some(n_idx) => {
                    let mut t = SmoothTriangle::new(
                        p1, p2, p3,
                        normals[n_idx[0]], normals[n_idx[1]], normals[n_idx[2]],
                    );
                    t.material = material.clone();
                    group.add_child(Arc::new(t));
                }
                None => {
                    let mut t = Triangle::new(p1, p2, p3);
                    t.material = material.clone();
                    group.add_child(Arc::new(t));
                }
            }
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracer::ray::Ray;

    #[test]
    fn build_makes_one_child_per_face() {
        let vertices = vec![
            Tuple::point(0.0, 1.0, 0.0),
            Tuple::point(-1.0, 0.0, 0.0),
            Tuple::point(1.0, 0.0, 0.0),
            Tuple::point(0.0, -1.0, 0.0),
        ];
        let faces = vec![
            MeshFace { v: [0, 1, 2], n: None },
            MeshFace { v: [1, 3, 2], n: None },
        ];
        let group = Mesh::build(&vertices, &[], &faces, Material::default());
        assert_eq!(group.child_ids.len(), 2);
    }

    #[test]
    fn ray_hits_one_of_two_faces() {
        let vertices = vec![
            Tuple::point(0.0, 1.0, 0.0),
            Tuple::point(-1.0, 0.0, 0.0),
            Tuple::point(1.0, 0.0, 0.0),
        ];
        let faces = vec![MeshFace { v: [0, 1, 2], n: None }];
        let group = Mesh::build(&vertices, &[], &faces, Material::default());
        let r = Ray::new(Tuple::point(0.0, 0.5, -2.0), Tuple::vector(0.0, 0.0, 1.0));
        assert_eq!(group.local_intersect(&r).len(), 1);
    }
}
