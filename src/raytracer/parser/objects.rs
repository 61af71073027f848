//! Primitive, CSG, and modifier-loop parsing (spec §3, §4.2, §4.3, §9). Each
//! `parse_<primitive>` consumes the leading `{`, its required parameter
//! list, then hands off to [`Parser::parse_modifiers`] - the shared
//! "`translate`/`rotate`/`scale`/`matrix`/`pigment`/`texture`/`bounded_by`/
//! `clipped_by`/flag-keyword loop" spec §9 describes as common to every
//! object statement - before wrapping the finished primitive in
//! [`crate::raytracer::object::shape::Shape`].
//!
//! Every `parse_*` function returns an *unregistered* `Arc<dyn Object +
//! Send>` via [`Parser::parse_object_value`] rather than registering it
//! immediately: CSG children need to stay unregistered (refcount 1) so
//! `Csg::set_left`/`set_right` can still reparent them with `Arc::get_mut`,
//! exactly like [`crate::raytracer::object::group::Group::add_child`]
//! already requires. Only [`Parser::parse_object_statement`] - used for
//! top-level scene statements - actually registers the result.

use std::sync::Arc;
use crate::color::Color;
use crate::matrix::Matrix;
use crate::raytracer::error::{RtError, Result as RtResult};
use crate::raytracer::flags::{self, Flags};
use crate::raytracer::object::blob::{Blob, BlobElement};
use crate::raytracer::object::bicubic_patch::BicubicPatch;
use crate::raytracer::object::cone::Cone;
use crate::raytracer::object::csg::{Csg, CsgOperation};
use crate::raytracer::object::cube::Cube;
use crate::raytracer::object::cylinder::Cylinder;
use crate::raytracer::object::db::add_object;
use crate::raytracer::object::disc::Disc;
use crate::raytracer::object::fractal::Fractal;
use crate::raytracer::object::height_field::HeightField;
use crate::raytracer::material::Material;
use crate::raytracer::object::mesh::{Mesh, MeshFace};
use crate::raytracer::object::plane::Plane;
use crate::raytracer::object::poly::{Poly, Term};
use crate::raytracer::object::prism::{Prism, PrismSegment, SweepType};
use crate::raytracer::object::quadric::Quadric;
use crate::raytracer::object::shape::Shape;
use crate::raytracer::object::smooth_triangle::SmoothTriangle;
use crate::raytracer::object::sor::{Sor, SorSegment};
use crate::raytracer::object::sphere::Sphere;
use crate::raytracer::object::superellipsoid::Superellipsoid;
use crate::raytracer::object::text;
use crate::raytracer::object::torus::Torus;
use crate::raytracer::object::triangle::Triangle;
use crate::raytracer::object::Object;
use crate::raytracer::parser::lexer::Token;
use crate::raytracer::parser::symbol::Value;
use crate::raytracer::parser::Parser;
use crate::tuple::Tuple;

/// Output of the shared modifier loop: everything spec §3's essential
/// attributes cover except the primitive's own shape parameters.
struct Modifiers {
    transform: Matrix,
    flags: Flags,
    bound: Vec<usize>,
    clip: Vec<usize>,
    texture_name: Option<String>,
    interior_name: Option<String>,
    base_color: Option<Color>,
}

impl Modifiers {
    fn identity() -> Modifiers {
        Modifiers {
            transform: Matrix::identity(4),
            flags: Flags::empty(),
            bound: Vec::new(),
            clip: Vec::new(),
            texture_name: None,
            interior_name: None,
            base_color: None,
        }
    }
}

impl Parser {
    /// Dispatches a single object statement (top-level or CSG/bound/clip
    /// child) and registers it, returning its registry id.
    pub fn parse_object_statement(&mut self, keyword: &str) -> RtResult<usize> {
        let (obj, color) = self.parse_object_value(keyword)?;
        let id = add_object(obj);
        self.object_colors.insert(id, color);
        Ok(id)
    }

    /// Like [`Self::parse_object_statement`] but leaves the result
    /// unregistered, for callers (CSG children) that must reparent it
    /// themselves before it enters the registry.
    fn parse_object_value(&mut self, keyword: &str) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        match keyword {
            "sphere" => self.parse_sphere(),
            "plane" => self.parse_plane(),
            "box" => self.parse_box(),
            "cylinder" => self.parse_cylinder(),
            "cone" => self.parse_cone(),
            "disc" => self.parse_disc(),
            "torus" => self.parse_torus(),
            "quadric" => self.parse_quadric(),
            "superellipsoid" => self.parse_superellipsoid(),
            "poly" => self.parse_poly(),
            "blob" => self.parse_blob(),
            "triangle" => self.parse_triangle(),
            "smooth_triangle" => self.parse_smooth_triangle(),
            "prism" => self.parse_prism(),
            "sor" | "lathe" => self.parse_sor(),
            "bicubic_patch" => self.parse_bicubic_patch(),
            "height_field" => self.parse_height_field(),
            "fractal" | "julia_fractal" => self.parse_fractal(),
            "text" => self.parse_text(),
            "mesh" | "mesh2" => self.parse_mesh(),
            "union" | "intersection" | "difference" | "merge" => self.parse_csg(keyword),
            "object" => self.parse_object_reference(),
            _ => {
                let loc = self.here();
                Err(RtError::UndeclaredIdentifier { loc, name: keyword.to_string() })
            }
        }
    }

    fn expect_open_brace(&mut self) -> RtResult<()> {
        self.expect_symbol('{')
    }

    /// The shared modifier loop (spec §9): repeatedly peeks the next token
    /// and consumes whichever modifier keyword it names, stopping at the
    /// closing `}`. Shading blocks this kernel does not evaluate (pigment/
    /// normal/finish/texture/interior/material/media, spec §1 Non-goals)
    /// are consumed whole via balanced-brace skip; `pigment`/`texture` are
    /// additionally mined for a best-effort `base_color`.
    fn parse_modifiers(&mut self) -> RtResult<Modifiers> {
        let mut m = Modifiers::identity();
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('}') => {
                    self.lexer.get_token();
                    break;
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                Token::Ident(name) => match name.as_str() {
                    "translate" => {
                        self.lexer.get_token();
                        let v = self.parse_vector3()?;
                        m.transform = Matrix::translate(v.x, v.y, v.z).multiply(&m.transform);
                    }
                    "scale" => {
                        self.lexer.get_token();
                        let v = self.parse_vector3()?;
                        m.transform = Matrix::scale(v.x, v.y, v.z).multiply(&m.transform);
                    }
                    "rotate" => {
                        self.lexer.get_token();
                        let v = self.parse_vector3()?;
                        let r = Matrix::rotate_x(v.x.to_radians())
                            .multiply(&Matrix::rotate_y(v.y.to_radians()))
                            .multiply(&Matrix::rotate_z(v.z.to_radians()));
                        m.transform = r.multiply(&m.transform);
                    }
                    "matrix" => {
                        self.lexer.get_token();
                        m.transform = self.parse_matrix_literal()?.multiply(&m.transform);
                    }
                    "inverse" => {
                        self.lexer.get_token();
                        m.flags.set(flags::INVERTED);
                    }
                    "hollow" => {
                        self.lexer.get_token();
                        let on = self.parse_optional_bool()?;
                        m.flags.set(flags::HOLLOW_SET);
                        if on {
                            m.flags.set(flags::HOLLOW);
                        } else {
                            m.flags.unset(flags::HOLLOW);
                        }
                    }
                    "no_shadow" => {
                        self.lexer.get_token();
                        m.flags.set(flags::NO_SHADOW);
                    }
                    "sturm" => {
                        self.lexer.get_token();
                        m.flags.set(flags::STURM);
                    }
                    "double_illuminate" => {
                        self.lexer.get_token();
                        m.flags.set(flags::DOUBLE_ILLUMINATE);
                    }
                    "bounded_by" => {
                        self.lexer.get_token();
                        self.expect_open_brace()?;
                        let kw = self.expect_ident()?;
                        let id = self.parse_object_statement(&kw)?;
                        self.expect_symbol('}')?;
                        m.bound.push(id);
                    }
                    "clipped_by" => {
                        self.lexer.get_token();
                        self.expect_open_brace()?;
                        let kw = self.expect_ident()?;
                        let id = self.parse_object_statement(&kw)?;
                        self.expect_symbol('}')?;
                        m.clip.push(id);
                    }
                    "texture" => {
                        self.lexer.get_token();
                        let block = self.skip_balanced_block()?;
                        if let Some(c) = extract_base_color(&block) {
                            m.base_color = Some(c);
                        }
                        m.texture_name = Some(format!("<anonymous:{}>", self.here().line));
                    }
                    "pigment" => {
                        self.lexer.get_token();
                        let block = self.skip_balanced_block()?;
                        if let Some(c) = extract_base_color(&block) {
                            m.base_color = Some(c);
                        }
                    }
                    "interior" | "finish" | "normal" | "material" | "media" => {
                        self.lexer.get_token();
                        self.skip_balanced_block()?;
                    }
                    _ => {
                        let loc = self.here();
                        return Err(RtError::Syntax(loc));
                    }
                },
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
        Ok(m)
    }

    pub(crate) fn parse_optional_bool(&mut self) -> RtResult<bool> {
        match self.lexer.peek_token() {
            Token::Ident(name) if matches!(name.as_str(), "on" | "yes" | "true" | "off" | "no" | "false") => {
                self.lexer.get_token();
                Ok(matches!(name.as_str(), "on" | "yes" | "true"))
            }
            _ => Ok(true),
        }
    }

    /// Consumes a `matrix <m00,m01,...,m23>` - POV-Ray's 4x3 row-major
    /// affine form (translation folded into the 4th column).
    fn parse_matrix_literal(&mut self) -> RtResult<Matrix> {
        self.expect_symbol('<')?;
        let mut v = [0.0; 12];
        for i in 0..12 {
            v[i] = self.parse_float()?;
            if i != 11 {
                self.expect_symbol(',')?;
            }
        }
        self.expect_symbol('>')?;
        let mut m = Matrix::identity(4);
        m.set(0, 0, v[0]); m.set(1, 0, v[1]); m.set(2, 0, v[2]);
        m.set(0, 1, v[3]); m.set(1, 1, v[4]); m.set(2, 1, v[5]);
        m.set(0, 2, v[6]); m.set(1, 2, v[7]); m.set(2, 2, v[8]);
        m.set(0, 3, v[9]); m.set(1, 3, v[10]); m.set(2, 3, v[11]);
        Ok(m)
    }

    /// Consumes tokens from `{` (already past) through its matching `}`,
    /// re-rendering them to text. Used for shading blocks this kernel does
    /// not evaluate (spec §1 Non-goals).
    pub(crate) fn skip_balanced_block(&mut self) -> RtResult<String> {
        self.expect_open_brace()?;
        let mut depth = 1;
        let mut out = String::new();
        loop {
            let t = self.lexer.get_token();
            match &t {
                Token::Symbol('{') => depth += 1,
                Token::Symbol('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                _ => {}
            }
            out.push_str(&t.to_string());
            out.push(' ');
        }
        Ok(out)
    }

    fn finish(&mut self, inner: Arc<dyn Object + Send>, m: Modifiers) -> (Arc<dyn Object + Send>, Option<Color>) {
        let mut shape = Shape::wrap(inner);
        shape.set_transform(m.transform);
        shape.flags = m.flags;
        shape.bound = m.bound;
        shape.clip = m.clip;
        shape.texture_name = m.texture_name;
        shape.interior_name = m.interior_name;
        (Arc::new(shape), m.base_color)
    }

    fn parse_sphere(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let center = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let radius = self.parse_float()?;
        let m = self.parse_modifiers()?;
        let mut s = Sphere::new();
        s.transform = Matrix::translate(center.x, center.y, center.z).multiply(&Matrix::scale(radius, radius, radius));
        Ok(self.finish(Arc::new(s), m))
    }

    fn parse_plane(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let normal = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let distance = self.parse_float()?;
        let m = self.parse_modifiers()?;
        let mut p = Plane::new();
        let up = Tuple::vector(0.0, 1.0, 0.0);
        let align = rotation_between(&up, &normal);
        p.transform = Matrix::translate(0.0, distance, 0.0).multiply(&align);
        Ok(self.finish(Arc::new(p), m))
    }

    fn parse_box(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let c1 = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let c2 = self.parse_vector3()?;
        let m = self.parse_modifiers()?;
        let center = c1.add(&c2).divide(2.0);
        let half = Tuple::vector((c2.x - c1.x).abs() / 2.0, (c2.y - c1.y).abs() / 2.0, (c2.z - c1.z).abs() / 2.0);
        let mut b = Cube::new();
        b.transform = Matrix::translate(center.x, center.y, center.z)
            .multiply(&Matrix::scale(half.x.max(1e-9), half.y.max(1e-9), half.z.max(1e-9)));
        Ok(self.finish(Arc::new(b), m))
    }

    fn parse_cylinder(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let base = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let cap = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let radius = self.parse_float()?;
        let m = self.parse_modifiers()?;
        let axis = cap.subtract(&base);
        let height = axis.magnitude().max(1e-9);
        let align = rotation_between(&Tuple::vector(0.0, 1.0, 0.0), &axis);
        let mut c = Cylinder::new(0.0, height, true);
        c.transform = Matrix::translate(base.x, base.y, base.z).multiply(&align).multiply(&Matrix::scale(radius, 1.0, radius));
        Ok(self.finish(Arc::new(c), m))
    }

    fn parse_cone(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let base = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let base_radius = self.parse_float()?;
        self.expect_symbol(',')?;
        let cap = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let cap_radius = self.parse_float()?;
        let m = self.parse_modifiers()?;
        let axis = cap.subtract(&base);
        let height = axis.magnitude().max(1e-9);
        let align = rotation_between(&Tuple::vector(0.0, 1.0, 0.0), &axis);
        let mut c = Cone::new(0.0, height, true);
        let radius_scale = base_radius.max(cap_radius).max(1e-9);
        c.transform = Matrix::translate(base.x, base.y, base.z)
            .multiply(&align)
            .multiply(&Matrix::scale(radius_scale, 1.0, radius_scale));
        Ok(self.finish(Arc::new(c), m))
    }

    fn parse_disc(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let center = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let normal = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let radius = self.parse_float()?;
        let hole_radius = if let Token::Symbol(',') = self.lexer.peek_token() {
            self.lexer.get_token();
            self.parse_float()?
        } else {
            0.0
        };
        let m = self.parse_modifiers()?;
        let align = rotation_between(&Tuple::vector(0.0, 1.0, 0.0), &normal);
        let mut d = Disc::new(radius, hole_radius);
        d.transform = Matrix::translate(center.x, center.y, center.z).multiply(&align);
        Ok(self.finish(Arc::new(d), m))
    }

    fn parse_torus(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let major = self.parse_float()?;
        self.expect_symbol(',')?;
        let minor = self.parse_float()?;
        let m = self.parse_modifiers()?;
        let o = Torus::new(major, minor);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_quadric(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        self.expect_symbol('<')?;
        let a = self.parse_float()?; self.expect_symbol(',')?;
        let b = self.parse_float()?; self.expect_symbol(',')?;
        let c = self.parse_float()?;
        self.expect_symbol('>')?; self.expect_symbol(',')?;
        self.expect_symbol('<')?;
        let d = self.parse_float()?; self.expect_symbol(',')?;
        let e = self.parse_float()?; self.expect_symbol(',')?;
        let f = self.parse_float()?;
        self.expect_symbol('>')?; self.expect_symbol(',')?;
        self.expect_symbol('<')?;
        let g = self.parse_float()?; self.expect_symbol(',')?;
        let h = self.parse_float()?; self.expect_symbol(',')?;
        let i = self.parse_float()?;
        self.expect_symbol('>')?; self.expect_symbol(',')?;
        let j = self.parse_float()?;
        let m = self.parse_modifiers()?;
        let o = Quadric::new(a, b, c, d, e, f, g, h, i, j);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_superellipsoid(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        self.expect_symbol('<')?;
        let e = self.parse_float()?;
        self.expect_symbol(',')?;
        let n = self.parse_float()?;
        self.expect_symbol('>')?;
        let m = self.parse_modifiers()?;
        let o = Superellipsoid::new(e, n);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_poly(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let order = self.parse_float()? as u32;
        self.expect_symbol(',')?;
        let coeffs = self.parse_float_list()?;
        let terms = term_layout(order)
            .into_iter()
            .zip(coeffs.into_iter())
            .map(|((px, py, pz), coeff)| Term { px, py, pz, coeff })
            .collect();
        let m = self.parse_modifiers()?;
        let mut o = Poly::new(order, terms);
        o.sturm = m.flags.contains(flags::STURM);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_blob(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let mut threshold = 1.0;
        let mut elements = Vec::new();
        loop {
            match self.lexer.peek_token() {
                Token::Ident(name) if name == "threshold" => {
                    self.lexer.get_token();
                    threshold = self.parse_float()?;
                }
                Token::Ident(name) if name == "sphere" => {
                    self.lexer.get_token();
                    self.expect_open_brace()?;
                    let c = self.parse_vector3()?;
                    self.expect_symbol(',')?;
                    let r = self.parse_float()?;
                    self.expect_symbol(',')?;
                    let s = self.parse_float()?;
                    let _ = self.parse_modifiers()?;
                    elements.push(BlobElement::sphere(c, r, s));
                }
                Token::Ident(name) if name == "cylinder" => {
                    self.lexer.get_token();
                    self.expect_open_brace()?;
                    let base = self.parse_vector3()?;
                    self.expect_symbol(',')?;
                    let cap = self.parse_vector3()?;
                    self.expect_symbol(',')?;
                    let r = self.parse_float()?;
                    self.expect_symbol(',')?;
                    let s = self.parse_float()?;
                    let _ = self.parse_modifiers()?;
                    elements.push(BlobElement::cylinder(base, cap.subtract(&base), r, s));
                }
                _ => break,
            }
        }
        let m = self.parse_modifiers()?;
        let o = Blob::new(elements, threshold);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_triangle(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let p1 = self.parse_vector3()?; self.expect_symbol(',')?;
        let p2 = self.parse_vector3()?; self.expect_symbol(',')?;
        let p3 = self.parse_vector3()?;
        let m = self.parse_modifiers()?;
        let o = Triangle::new(p1, p2, p3);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_smooth_triangle(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let p1 = self.parse_vector3()?; self.expect_symbol(',')?;
        let n1 = self.parse_vector3()?; self.expect_symbol(',')?;
        let p2 = self.parse_vector3()?; self.expect_symbol(',')?;
        let n2 = self.parse_vector3()?; self.expect_symbol(',')?;
        let p3 = self.parse_vector3()?; self.expect_symbol(',')?;
        let n3 = self.parse_vector3()?;
        let m = self.parse_modifiers()?;
        let o = SmoothTriangle::new(p1, p2, p3, n1, n2, n3);
        Ok(self.finish(Arc::new(o), m))
    }

    /// `mesh { triangle { p1,p2,p3 } smooth_triangle { p1,n1,p2,n2,p3,n3 } ... }`
    /// (spec §3 catalog: "vertex/normal/texture arrays, indexed triangle
    /// list"). Each inline statement contributes its own vertices (and, for
    /// `smooth_triangle`, normals) straight into the mesh's arrays rather
    /// than naming a separately registered object, matching [`Mesh::build`]'s
    /// already-indexed-array contract.
    fn parse_mesh(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let mut vertices: Vec<Tuple> = Vec::new();
        let mut normals: Vec<Tuple> = Vec::new();
        let mut faces: Vec<MeshFace> = Vec::new();
        loop {
            match self.lexer.peek_token() {
                Token::Ident(name) if name == "triangle" => {
                    self.lexer.get_token();
                    self.expect_open_brace()?;
                    let p1 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let p2 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let p3 = self.parse_vector3()?;
                    self.expect_symbol('}')?;
                    let base = vertices.len();
                    vertices.push(p1);
                    vertices.push(p2);
                    vertices.push(p3);
                    faces.push(MeshFace { v: [base, base + 1, base + 2], n: None });
                }
                Token::Ident(name) if name == "smooth_triangle" => {
                    self.lexer.get_token();
                    self.expect_open_brace()?;
                    let p1 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let n1 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let p2 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let n2 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let p3 = self.parse_vector3()?; self.expect_symbol(',')?;
                    let n3 = self.parse_vector3()?;
                    self.expect_symbol('}')?;
                    let vbase = vertices.len();
                    vertices.push(p1);
                    vertices.push(p2);
                    vertices.push(p3);
                    let nbase = normals.len();
                    normals.push(n1);
                    normals.push(n2);
                    normals.push(n3);
                    faces.push(MeshFace { v: [vbase, vbase + 1, vbase + 2], n: Some([nbase, nbase + 1, nbase + 2]) });
                }
                _ => break,
            }
        }
        let m = self.parse_modifiers()?;
        let group = Mesh::build(&vertices, &normals, &faces, Material::default());
        Ok(self.finish(Arc::new(group), m))
    }

    /// Supports only the LINEAR_SWEEP conic-sections-free form: a flat list
    /// of 2D `<x,z>` points describing a closed linear-spline cross-section.
    /// Quadratic/cubic/Bezier spline types and CONIC_SWEEP are grounded on
    /// the same file but not exposed at the grammar level (DESIGN.md).
    fn parse_prism(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let h1 = self.parse_float()?; self.expect_symbol(',')?;
        let h2 = self.parse_float()?; self.expect_symbol(',')?;
        let n = self.parse_float()? as usize;
        self.expect_symbol(',')?;
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            self.expect_symbol('<')?;
            let x = self.parse_float()?; self.expect_symbol(',')?;
            let z = self.parse_float()?;
            self.expect_symbol('>')?;
            points.push((x, z));
            if i + 1 < n {
                self.expect_symbol(',')?;
            }
        }
        let m = self.parse_modifiers()?;
        let mut segments = Vec::new();
        for w in points.windows(2) {
            segments.push(PrismSegment::linear(w[0], w[1]));
        }
        if points.len() > 1 {
            segments.push(PrismSegment::linear(points[points.len() - 1], points[0]));
        }
        let o = Prism::new(segments, SweepType::Linear, h1, h2, true);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_sor(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let n = self.parse_float()? as usize;
        self.expect_symbol(',')?;
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            self.expect_symbol('<')?;
            let y = self.parse_float()?; self.expect_symbol(',')?;
            let r = self.parse_float()?;
            self.expect_symbol('>')?;
            points.push((y, r));
            if i + 1 < n {
                self.expect_symbol(',')?;
            }
        }
        let m = self.parse_modifiers()?;
        let segments = points.windows(2).map(|w| SorSegment::from_points(w[0], w[1])).collect();
        let o = Sor::new(segments, true);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_bicubic_patch(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        loop {
            match self.lexer.peek_token() {
                Token::Ident(name) if matches!(name.as_str(), "type" | "u_steps" | "v_steps" | "flatness") => {
                    self.lexer.get_token();
                    self.parse_float()?;
                }
                _ => break,
            }
        }
        self.maybe_keyword("control_points");
        let mut flat = Vec::with_capacity(16);
        for i in 0..16 {
            let p = self.parse_vector3()?;
            flat.push(p);
            if i != 15 {
                self.expect_symbol(',')?;
            }
        }
        let m = self.parse_modifiers()?;
        let mut cp = [[Tuple::point(0.0, 0.0, 0.0); 4]; 4];
        for r in 0..4 {
            for c in 0..4 {
                let p = flat[r * 4 + c];
                cp[r][c] = Tuple::point(p.x, p.y, p.z);
            }
        }
        let o = BicubicPatch::new(cp);
        Ok(self.finish(Arc::new(o), m))
    }

    /// Only the inline `height_field { n, n, h, h, ... }` explicit-grid form
    /// is supported; image-file-backed height fields need the scene-loading
    /// layer's image decoder and are out of scope here (DESIGN.md).
    fn parse_height_field(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        if let Token::Str(_) = self.lexer.peek_token() {
            self.lexer.get_token();
            let m = self.parse_modifiers()?;
            let o = HeightField::new(vec![vec![0.0; 2]; 2]);
            return Ok(self.finish(Arc::new(o), m));
        }
        let rows = self.parse_float()? as usize;
        self.expect_symbol(',')?;
        let cols = self.parse_float()? as usize;
        self.expect_symbol(',')?;
        let values = self.parse_float_list()?;
        let m = self.parse_modifiers()?;
        let mut heights = vec![vec![0.0; cols]; rows];
        for r in 0..rows {
            for c in 0..cols {
                heights[r][c] = *values.get(r * cols + c).unwrap_or(&0.0);
            }
        }
        let o = HeightField::new(heights);
        Ok(self.finish(Arc::new(o), m))
    }

    fn parse_fractal(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        self.expect_symbol('<')?;
        let cx = self.parse_float()?; self.expect_symbol(',')?;
        let cy = self.parse_float()?; self.expect_symbol(',')?;
        let cz = self.parse_float()?; self.expect_symbol(',')?;
        let cw = self.parse_float()?;
        self.expect_symbol('>')?;
        let mut radius = 2.0;
        if let Token::Ident(name) = self.lexer.peek_token() {
            if name == "max_iteration" {
                self.lexer.get_token();
                radius = self.parse_float()?.max(1.0);
            }
        }
        let m = self.parse_modifiers()?;
        let o = Fractal::new((cx, cy, cz, cw), radius);
        Ok(self.finish(Arc::new(o), m))
    }

    /// `text { ttf "font-path", "string", depth, offset modifiers }` (spec
    /// §3 catalog: "TrueType text"). The font file is read once per
    /// statement; [`text::build_text`] does the per-glyph outline
    /// extraction and folds the result into a CSG union the same way
    /// [`Self::parse_csg`] folds an explicit `union { ... }`'s children.
    fn parse_text(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        self.maybe_keyword("ttf");
        let font_path = self.expect_str()?;
        self.expect_symbol(',')?;
        let text = self.expect_str()?;
        self.expect_symbol(',')?;
        let depth = self.parse_float()?;
        self.expect_symbol(',')?;
        let offset = self.parse_float()?;
        let m = self.parse_modifiers()?;

        let font_data = std::fs::read(&font_path).map_err(|e| RtError::Io { path: font_path.clone(), source: e })?;
        let o = text::build_text(&font_data, &text, depth, offset)
            .unwrap_or_else(|| Arc::new(Prism::new(Vec::new(), SweepType::Linear, 0.0, depth, true)) as Arc<dyn Object + Send>);
        Ok(self.finish(o, m))
    }

    pub(crate) fn expect_str(&mut self) -> RtResult<String> {
        match self.lexer.get_token() {
            Token::Str(s) => Ok(s),
            _ => {
                let loc = self.here();
                Err(RtError::TypeMismatch { loc, expected: "string".into(), found: "other".into() })
            }
        }
    }

    fn parse_csg(&mut self, keyword: &str) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let mut children = Vec::new();
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('}') => break,
                Token::Ident(name) if is_object_keyword(&name) => {
                    self.lexer.get_token();
                    children.push(self.parse_object_value(&name)?.0);
                }
                _ => break,
            }
        }
        let m = self.parse_modifiers()?;
        if children.len() < 2 {
            let loc = self.here();
            return Err(RtError::GeometryValidation { loc, reason: format!("{} needs at least two children", keyword) });
        }
        let mut iter = children.into_iter();
        let mut acc = {
            let op: CsgOperation = keyword.parse().unwrap();
            let mut csg = Csg::new(op);
            csg.set_left(iter.next().unwrap());
            csg.set_right(iter.next().unwrap());
            Arc::new(csg) as Arc<dyn Object + Send>
        };
        for extra in iter {
            let op: CsgOperation = keyword.parse().unwrap();
            let mut outer = Csg::new(op);
            outer.set_left(acc);
            outer.set_right(extra);
            acc = Arc::new(outer);
        }
        Ok(self.finish(acc, m))
    }

    /// `object { IDENT modifiers }`: re-wraps the declared object's id with
    /// an additional transform/flags layer. Material/texture overrides on
    /// the reference are not re-applied to the shared inner object
    /// (DESIGN.md: a scoped simplification of POV-Ray's per-reference
    /// material override).
    fn parse_object_reference(&mut self) -> RtResult<(Arc<dyn Object + Send>, Option<Color>)> {
        self.expect_open_brace()?;
        let name = self.expect_ident()?;
        let inner_id = match self.symbols.lookup(&name).cloned() {
            Some(Value::ObjectId(id)) => id,
            Some(_) => {
                let loc = self.here();
                return Err(RtError::TypeMismatch { loc, expected: "object".into(), found: "other".into() });
            }
            None => {
                let loc = self.here();
                return Err(RtError::UndeclaredIdentifier { loc, name });
            }
        };
        let m = self.parse_modifiers()?;
        let mut shape = Shape::new(inner_id);
        shape.set_transform(m.transform);
        shape.flags = m.flags;
        shape.bound = m.bound;
        shape.clip = m.clip;
        Ok((Arc::new(shape), m.base_color))
    }

    pub(crate) fn parse_float_list(&mut self) -> RtResult<Vec<f64>> {
        let mut out = vec![self.parse_float()?];
        while let Token::Symbol(',') = self.lexer.peek_token() {
            self.lexer.get_token();
            out.push(self.parse_float()?);
        }
        Ok(out)
    }

    pub(crate) fn maybe_keyword(&mut self, kw: &str) -> bool {
        if let Token::Ident(name) = self.lexer.peek_token() {
            if name == kw {
                self.lexer.get_token();
                return true;
            }
        }
        false
    }
}

/// Object-statement keywords the CSG child loop recognizes; kept separate
/// from [`Parser::parse_object_value`]'s own match so CSG parsing can stop
/// cleanly at the first non-object token (a modifier).
pub(crate) fn is_object_keyword(name: &str) -> bool {
    matches!(
        name,
        "sphere" | "plane" | "box" | "cylinder" | "cone" | "disc" | "torus" | "quadric" | "superellipsoid"
            | "poly" | "blob" | "triangle" | "smooth_triangle" | "prism" | "sor" | "lathe" | "bicubic_patch"
            | "height_field" | "fractal" | "julia_fractal" | "text" | "mesh" | "mesh2"
            | "union" | "intersection" | "difference" | "merge" | "object"
    )
}

/// Finds the rotation matrix taking `from` onto `to` (both unit-length
/// directions) by rotating about the axis perpendicular to both - used to
/// orient primitives (plane/cylinder/disc/cone) whose kernel shape is fixed
/// along the y axis onto an arbitrary POV-Ray direction argument.
fn rotation_between(from: &Tuple, to: &Tuple) -> Matrix {
    let from = from.normalize();
    let to = to.normalize();
    let cos_angle = from.dot(&to).clamp(-1.0, 1.0);
    if (cos_angle - 1.0).abs() < 1e-9 {
        return Matrix::identity(4);
    }
    if (cos_angle + 1.0).abs() < 1e-9 {
        let axis = if from.x.abs() < 0.9 {
            from.cross(&Tuple::vector(1.0, 0.0, 0.0))
        } else {
            from.cross(&Tuple::vector(0.0, 1.0, 0.0))
        };
        return axis_angle(&axis.normalize(), std::f64::consts::PI);
    }
    let axis = from.cross(&to).normalize();
    axis_angle(&axis, cos_angle.acos())
}

fn axis_angle(axis: &Tuple, angle: f64) -> Matrix {
    let (x, y, z) = (axis.x, axis.y, axis.z);
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let mut m = Matrix::identity(4);
    m.set(0, 0, t * x * x + c); m.set(0, 1, t * x * y - s * z); m.set(0, 2, t * x * z + s * y);
    m.set(1, 0, t * x * y + s * z); m.set(1, 1, t * y * y + c); m.set(1, 2, t * y * z - s * x);
    m.set(2, 0, t * x * z - s * y); m.set(2, 1, t * y * z + s * x); m.set(2, 2, t * z * z + c);
    m
}

/// POV-Ray's `POLY.C` term order: the monomials `x^px y^py z^pz` with
/// `px+py+pz <= n`, walked by the exact nested-descending loop `Evaluate_Poly`
/// and `Init_Poly` use (`POLY.C`, `for (i = Order; i >= 0; i--) for (j =
/// Order-i; j >= 0; j--) for (k = Order-(i+j); k >= 0; k--)`). This is NOT a
/// degree-grouped ordering - k ranges over its full `0..=Order-i-j` span for
/// every `(i,j)` pair, so terms of different total degree interleave.
fn term_layout(order: u32) -> Vec<(u32, u32, u32)> {
    let order = order as i64;
    let mut terms = Vec::new();
    let mut i = order;
    while i >= 0 {
        let mut j = order - i;
        while j >= 0 {
            let mut k = order - i - j;
            while k >= 0 {
                terms.push((i as u32, j as u32, k as u32));
                k -= 1;
            }
            j -= 1;
        }
        i -= 1;
    }
    terms
}

/// Mines a captured pigment/texture block's raw text for a trailing
/// `rgb <r,g,b>` literal. This is a textual best-effort scan, not a
/// re-parse - full pigment evaluation is out of scope (spec §1 Non-goals)
/// and this crate only needs *something* paintable for the example
/// renderer, not correct shading.
pub(crate) fn extract_base_color(raw: &str) -> Option<Color> {
    let idx = raw.find("rgb")?;
    let rest = &raw[idx..];
    let lt = rest.find('<')?;
    let gt = rest.find('>')?;
    let nums: Vec<f64> = rest[lt + 1..gt].split(',').filter_map(|s| s.trim().parse().ok()).collect();
    if nums.len() >= 3 {
        Some(Color::new(nums[0], nums[1], nums[2]))
    } else {
        None
    }
}
