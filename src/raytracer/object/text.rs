//! TrueType text (spec §3 catalog: "TrueType text | font path, string,
//! depth, offset; realized as CSG union of glyph prisms | union
//! passthrough"). Each glyph's outline comes from `ttf_parser` - already a
//! Cargo dependency, otherwise unused - and is flattened into the same
//! per-segment cubic table [`crate::raytracer::object::prism::Prism`]
//! already stores for the ordinary `prism`/`sor` primitives, rather than
//! teaching the kernel a second curve representation. Multiple contours of
//! one glyph (an "o"'s outer and inner ring) land in a single `Prism`:
//! `Prism::inside_xz`'s even-odd crossing test handles a hole correctly
//! however its edges are grouped, so nothing glyph-specific is needed for
//! counters.
//!
//! The glyph's native axes (x right, y up, in font design units) become
//! the Prism's own (x, z) cross-section, extruded along the Prism's y by
//! `depth`; a fixed `rotate_x(-FRAC_PI_2)` on each glyph then turns that
//! into the conventional reading orientation - glyph face in the world xy
//! plane, depth running along world z - before the per-character advance
//! translate is applied.

use std::sync::Arc;
use ttf_parser::{Face, OutlineBuilder};
use crate::matrix::Matrix;
use crate::raytracer::object::csg::{Csg, CsgOperation};
use crate::raytracer::object::prism::{Prism, PrismSegment, SweepType};
use crate::raytracer::object::Object;

/// Bezier-flattening resolution for `quad_to`/`curve_to` segments. POV's own
/// TTF rasterizer adapts to the glyph's size; a fixed step count is simpler
/// and plenty for the polygonal approximation a ray-traced prism needs.
const CURVE_STEPS: usize = 8;

struct GlyphOutline {
    segments: Vec<PrismSegment>,
    cursor: (f64, f64),
    start: (f64, f64),
    scale: f64,
}

impl GlyphOutline {
    fn new(scale: f64) -> GlyphOutline {
        GlyphOutline { segments: Vec::new(), cursor: (0.0, 0.0), start: (0.0, 0.0), scale }
    }

    fn push_line(&mut self, to: (f64, f64)) {
        if to != self.cursor {
            self.segments.push(PrismSegment::linear(self.cursor, to));
        }
        self.cursor = to;
    }

    fn scaled(&self, x: f32, y: f32) -> (f64, f64) {
        (x as f64 * self.scale, y as f64 * self.scale)
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.scaled(x, y);
        self.cursor = p;
        self.start = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.scaled(x, y);
        self.push_line(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let start = self.cursor;
        let c = self.scaled(x1, y1);
        let end = self.scaled(x, y);
        for i in 1..=CURVE_STEPS {
            let t = i as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            let px = mt * mt * start.0 + 2.0 * mt * t * c.0 + t * t * end.0;
            let pz = mt * mt * start.1 + 2.0 * mt * t * c.1 + t * t * end.1;
            self.push_line((px, pz));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let start = self.cursor;
        let c1 = self.scaled(x1, y1);
        let c2 = self.scaled(x2, y2);
        let end = self.scaled(x, y);
        for i in 1..=CURVE_STEPS {
            let t = i as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            let px = mt * mt * mt * start.0 + 3.0 * mt * mt * t * c1.0 + 3.0 * mt * t * t * c2.0 + t * t * t * end.0;
            let pz = mt * mt * mt * start.1 + 3.0 * mt * mt * t * c1.1 + 3.0 * mt * t * t * c2.1 + t * t * t * end.1;
            self.push_line((px, pz));
        }
    }

    fn close(&mut self) {
        self.push_line(self.start);
    }
}

/// Builds one closed, linear-swept `Prism` for a single glyph, or `None` for
/// a glyph with no outline (space, control characters).
fn glyph_prism(face: &Face, ch: char, depth: f64) -> Option<Prism> {
    let glyph_id = face.glyph_index(ch)?;
    let scale = 1.0 / face.units_per_em() as f64;
    let mut outline = GlyphOutline::new(scale);
    face.outline_glyph(glyph_id, &mut outline)?;
    if outline.segments.len() < 3 {
        return None;
    }
    Some(Prism::new(outline.segments, SweepType::Linear, 0.0, depth, true))
}

/// Horizontal advance for `ch`, in em units, falling back to `0.6` (a
/// reasonable average glyph width) for a glyph the font has no metric for.
fn glyph_advance(face: &Face, ch: char) -> f64 {
    face.glyph_index(ch)
        .and_then(|id| face.glyph_hor_advance(id))
        .map(|units| units as f64 / face.units_per_em() as f64)
        .unwrap_or(0.6)
}

/// Builds the `text { ttf "font" "string" depth offset ... }` geometry:
/// every non-blank glyph's Prism, folded into a CSG union left to right
/// exactly the way [`crate::raytracer::parser::objects::Parser::parse_csg`]
/// folds an explicit `union { ... }`'s children, with a trailing per-glyph
/// `translate` standing in for the pen advance.
///
/// Returns `None` if the string has no glyph with an outline (all
/// whitespace, or a font with no matching glyphs); the caller falls back to
/// a degenerate placeholder the way [`crate::raytracer::object::prism`]'s
/// own `Prism::new` does for a too-short segment list.
pub fn build_text(font_data: &[u8], text: &str, depth: f64, offset: f64) -> Option<Arc<dyn Object + Send>> {
    let face = Face::parse(font_data, 0).ok()?;
    let tilt = Matrix::rotate_x(-std::f64::consts::FRAC_PI_2);

    let mut pen = 0.0;
    let mut glyphs: Vec<Arc<dyn Object + Send>> = Vec::new();
    for ch in text.chars() {
        if let Some(mut prism) = glyph_prism(&face, ch, depth) {
            prism.transform = Matrix::translate(pen, 0.0, 0.0).multiply(&tilt);
            glyphs.push(Arc::new(prism));
        }
        pen += glyph_advance(&face, ch) + offset;
    }

    let mut iter = glyphs.into_iter();
    let mut acc = iter.next()?;
    for next in iter {
        let mut csg = Csg::new(CsgOperation::Union);
        csg.set_left(acc);
        csg.set_right(next);
        acc = Arc::new(csg);
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A minimal valid TrueType font (a single-glyph "notdef" box, no cmap)
    // is awkward to hand-construct as a byte literal, so these tests only
    // exercise the pure-geometry helpers that do not need a real `Face`.

    fn endpoint(seg: &PrismSegment) -> (f64, f64) {
        (seg.x[0] + seg.x[1] + seg.x[2] + seg.x[3], seg.z[0] + seg.z[1] + seg.z[2] + seg.z[3])
    }

    #[test]
    fn glyph_outline_flattens_a_quadratic_curve_into_line_segments_and_closes() {
        let mut outline = GlyphOutline::new(1.0);
        outline.move_to(0.0, 0.0);
        outline.quad_to(1.0, 1.0, 2.0, 0.0);
        outline.close();
        // CURVE_STEPS segments for the curve itself, plus one closing edge
        // back to the start point since it differs from the curve's end.
        assert_eq!(outline.segments.len(), CURVE_STEPS + 1);
        let (curve_end_x, curve_end_z) = endpoint(&outline.segments[CURVE_STEPS - 1]);
        assert!((curve_end_x - 2.0).abs() < 1e-9);
        assert!((curve_end_z - 0.0).abs() < 1e-9);
        let (close_x, close_z) = endpoint(outline.segments.last().unwrap());
        assert!((close_x - 0.0).abs() < 1e-9);
        assert!((close_z - 0.0).abs() < 1e-9);
    }

    #[test]
    fn glyph_outline_closes_back_to_the_start_point() {
        let mut outline = GlyphOutline::new(1.0);
        outline.move_to(0.0, 0.0);
        outline.line_to(1.0, 0.0);
        outline.line_to(1.0, 1.0);
        outline.close();
        let (x, z) = endpoint(outline.segments.last().unwrap());
        assert!((x - 0.0).abs() < 1e-9);
        assert!((z - 0.0).abs() < 1e-9);
    }
}
