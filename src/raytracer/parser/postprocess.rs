//! Post-parse pass (spec §4.3): one walk over the root object list after
//! the recursive-descent parse returns, applying every propagation rule
//! spec §4.2/§4.3 describe as happening "once the top-level parse returns."
//!
//! Grounded on the same walk shape the teacher's own scene-graph traversal
//! uses elsewhere in this crate (`object::world_to_object`'s parent-chain
//! walk, `Csg`/`Group`'s recursive `get_aabb`) - a plain recursive function
//! over `Object::child_ids`, reading through [`crate::raytracer::object::db::get_object`]
//! and mutating through [`crate::raytracer::object::db::with_object_mut`].
//!
//! Two invariants this module depends on, both true at the point the
//! parser calls it and nowhere else (spec §5: "single-threaded during
//! parse and post-process"):
//!   - every registered object's `Arc` has exactly one live clone (the one
//!     sitting in the registry), so `with_object_mut` always succeeds;
//!   - no mutation closure passed to `with_object_mut` may itself call
//!     `get_object` (or anything that does), since that would try to lock
//!     the same non-reentrant registry mutex the mutable borrow is already
//!     holding. Every closure below is a plain field setter for exactly
//!     this reason.

use log::warn;
use crate::raytracer::flags::{self, Flags};
use crate::raytracer::object::db::{get_object, with_object_mut};

/// POV-Ray's `BOUND_HUGE`: an AABB whose volume exceeds this is "may as
/// well be infinite" for traversal-pruning purposes (spec §4.3: "Sets
/// INFINITE for any shape whose AABB volume exceeds BOUND_HUGE"). Plane,
/// unclipped Quadric and Poly all report an unbounded AABB (spec §4.1) of
/// exactly this shape, so this also doubles as their catch-all.
const BOUND_HUGE_VOLUME: f64 = 1.0e15;

pub struct PostProcessOptions {
    /// Spec §4.3 "remove unnecessary bounding": drop a `bounded_by` that
    /// isn't also a clip on a primitive cheap enough not to need it.
    pub remove_unnecessary_bounding: bool,
    /// Spec §4.3 "split bounded unions": dissolve a bounded Union whose
    /// children are all finite, linking the children directly to the root.
    pub split_bounded_unions: bool,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        PostProcessOptions { remove_unnecessary_bounding: true, split_bounded_unions: true }
    }
}

/// Runs the full post-parse walk over the top-level root list, rewriting
/// it in place (split-bounded-unions can replace one root id with two).
pub fn run(roots: &mut Vec<usize>, options: &PostProcessOptions) {
    for &id in roots.iter() {
        propagate(id, None, None, None, false);
    }
    if options.remove_unnecessary_bounding {
        for &id in roots.iter() {
            remove_unnecessary_bounding(id);
        }
    }
    if options.split_bounded_unions {
        let mut rewritten = Vec::with_capacity(roots.len());
        for &id in roots.iter() {
            split_bounded_union(id, &mut rewritten);
        }
        *roots = rewritten;
    }
}

/// Depth-first walk applying texture/interior promotion, hollow
/// propagation (honoring `HOLLOW_SET`, spec §9 Open Question), `NO_SHADOW`
/// propagation, `INFINITE` flagging, and a best-effort `OPAQUE` flag.
fn propagate(
    id: usize,
    inherited_texture: Option<&str>,
    inherited_interior: Option<&str>,
    ancestor_hollow: Option<bool>,
    ancestor_no_shadow: bool,
) {
    // Texture/interior promotion (spec §4.3): a child with no texture/
    // interior of its own inherits the nearest ancestor's. The *effective*
    // value (own if present, else inherited) is what must keep flowing to
    // further descendants - a bare `Csg`/`Group` node has nowhere to store
    // it (only `shape::Shape` does, spec §9's wrapper-not-inheritance
    // reading), so re-reading `texture_name()` after the `if let` below
    // would silently drop the inherited value at every such node. Compute
    // it once here instead of trusting the node's own storage.
    let effective_texture = get_object(id).texture_name().or_else(|| inherited_texture.map(str::to_string));
    if let Some(t) = &effective_texture {
        let t = t.clone();
        with_object_mut(id, move |o| o.set_texture_name_if_absent(&t));
    }
    let effective_interior = get_object(id).interior_name().or_else(|| inherited_interior.map(str::to_string));
    if let Some(t) = &effective_interior {
        let t = t.clone();
        with_object_mut(id, move |o| o.set_interior_name_if_absent(&t));
    }
    // Default interior synthesis (spec §4.3): every non-light object that
    // still has no Interior after promotion gets a placeholder one. This
    // crate does not model an Interior's IOR/media as real fields (shading
    // is an explicit Non-goal, spec §1), so the synthesized value is a
    // marker string rather than a real IOR - see DESIGN.md.
    let effective_interior = effective_interior.or_else(|| Some("<default>".to_string()));
    with_object_mut(id, |o| o.set_interior_name_if_absent("<default>"));

    let my_flags = get_object(id).flags();
    let hollow_set = my_flags.contains(flags::HOLLOW_SET);
    let my_hollow = if hollow_set {
        my_flags.contains(flags::HOLLOW)
    } else if let Some(inherited) = ancestor_hollow {
        let mut f = my_flags;
        if inherited {
            f.set(flags::HOLLOW);
        } else {
            f.unset(flags::HOLLOW);
        }
        with_object_mut(id, move |o| o.set_flags(f));
        inherited
    } else {
        my_flags.contains(flags::HOLLOW)
    };

    // NO_SHADOW propagation (spec §4.2: "NO_SHADOW on a parent implies
    // NO_SHADOW on children").
    let no_shadow = ancestor_no_shadow || my_flags.contains(flags::NO_SHADOW);
    if no_shadow && !my_flags.contains(flags::NO_SHADOW) {
        let mut f = my_flags;
        f.set(flags::NO_SHADOW);
        with_object_mut(id, move |o| o.set_flags(f));
    }

    // INFINITE flagging (spec §4.3). `Shape::get_aabb` already reports its
    // own AABB in world space (inner object's AABB pushed through the
    // inner's transform, clamped by any bound), so no further transform
    // is applied here - the wrapper's own transform is always identity
    // (see `object::shape` module docs).
    let aabb = get_object(id).get_aabb();
    let volume = (aabb.max.x - aabb.min.x).max(0.0)
        * (aabb.max.y - aabb.min.y).max(0.0)
        * (aabb.max.z - aabb.min.z).max(0.0);
    if !volume.is_finite() || volume > BOUND_HUGE_VOLUME {
        let mut f = get_object(id).flags();
        f.set(flags::INFINITE);
        with_object_mut(id, move |o| o.set_flags(f));
    }

    // OPAQUE flagging (spec §4.3): evaluated against the texture this node
    // resolved to (its own, or the one just promoted down from an
    // ancestor). This crate's `Color` has no filter/transmit channel (spec
    // §1 Non-goal: full pigment evaluation is out of the core's scope), so
    // "a texture is present" is the only signal available; a node with no
    // texture at all is left non-opaque rather than asserted either way.
    if effective_texture.is_some() {
        let mut f = get_object(id).flags();
        f.set(flags::OPAQUE);
        with_object_mut(id, move |o| o.set_flags(f));
    }

    for child in get_object(id).child_ids() {
        propagate(child, effective_texture.as_deref(), effective_interior.as_deref(), Some(my_hollow), no_shadow);
    }
}

/// Spec §4.3 "remove unnecessary bounding": a `bounded_by` on a cheap
/// primitive (not CSG, not Poly, not TrueType text - which is itself a CSG
/// union, spec §3) that isn't also doing clip duty is redundant; the
/// primitive's own `all_intersections` is already cheap enough that a
/// prefilter buys nothing.
fn remove_unnecessary_bounding(id: usize) {
    let object = get_object(id);
    let bound = object.bound_ids();
    let clip = object.clip_ids();
    let kind = object.inner_kind();
    let children = object.child_ids();
    drop(object);

    if !bound.is_empty() && kind != "csg" && kind != "poly" && kind != "group" {
        let shared = bound.iter().any(|b| clip.contains(b));
        if !shared {
            warn!("removing unnecessary bounded_by on cheap primitive (object {})", id);
            with_object_mut(id, |o| o.clear_bound());
        }
    }
    for child in children {
        remove_unnecessary_bounding(child);
    }
}

/// Spec §4.3 "split bounded unions": a bounded Union of exactly two
/// already-finite Shape-wrapped children gains nothing from the bound
/// doing traversal-pruning work the children's own (finite) AABBs already
/// do, so it is dissolved - its children link straight to the root,
/// inheriting the dissolved Union's bound list.
///
/// Scoped to binary unions only (spec's n-ary `union { a b c }` lowers to
/// nested nodes in this crate's parser, and only the outermost carries a
/// Shape wrapper - see `parser::objects::parse_csg`); a nested intermediate
/// Csg has no bound/texture of its own to inherit into, so dissolving past
/// the first level would have nothing to preserve and is left alone
/// (DESIGN.md).
fn split_bounded_union(id: usize, out: &mut Vec<usize>) {
    let object = get_object(id);
    let bound = object.bound_ids();
    let is_union = object.is_union_csg();
    let kind = object.inner_kind();
    // `id` is normally a `Shape` wrapper (spec §9's "every top-level object
    // is Shape-wrapped"); its own `child_ids()` is just `[inner_csg_id]`, one
    // level shallower than the operands we need. Drill through the wrapper
    // to the actual Union's two operands before checking the arity this
    // optimization is scoped to.
    let wrapper_children = object.child_ids();
    drop(object);
    let csg_children = if kind == "csg" && wrapper_children.len() == 1 {
        get_object(wrapper_children[0]).child_ids()
    } else {
        wrapper_children
    };

    if is_union && !bound.is_empty() && csg_children.len() == 2 {
        let left = csg_children[0];
        let right = csg_children[1];
        let left_finite = get_object(left).child_ids().len() == 1
            && !get_object(left).flags().contains(flags::INFINITE);
        let right_finite = get_object(right).child_ids().len() == 1
            && !get_object(right).flags().contains(flags::INFINITE);
        if left_finite && right_finite {
            warn!("splitting bounded union {} - children linked directly to root", id);
            let bound_clone = bound.clone();
            with_object_mut(left, move |o| o.add_bound(&bound_clone));
            with_object_mut(right, move |o| o.add_bound(&bound));
            out.push(left);
            out.push(right);
            return;
        }
    }
    out.push(id);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::matrix::Matrix;
    use crate::raytracer::flags;
    use crate::raytracer::object::csg::{Csg, CsgOperation};
    use crate::raytracer::object::db::{add_object, get_object};
    use crate::raytracer::object::plane::Plane;
    use crate::raytracer::object::shape::Shape;
    use crate::raytracer::object::sphere::Sphere;
    use super::*;

    #[test]
    fn texture_and_interior_promote_from_a_csg_parent_to_its_children() {
        let mut left = Shape::wrap(Arc::new(Sphere::new()));
        left.texture_name = None;
        let mut right = Shape::wrap(Arc::new(Sphere::new()));
        right.texture_name = None;

        let mut csg = Csg::new(CsgOperation::Union);
        csg.set_left(Arc::new(left));
        csg.set_right(Arc::new(right));

        let mut top = Shape::wrap(Arc::new(csg));
        top.texture_name = Some("Wood".to_string());
        let top_id = add_object(Arc::new(top));

        let mut roots = vec![top_id];
        run(&mut roots, &PostProcessOptions { remove_unnecessary_bounding: false, split_bounded_unions: false });

        let inner_csg_id = get_object(top_id).child_ids()[0];
        let left_id = get_object(inner_csg_id).child_ids()[0];
        let right_id = get_object(inner_csg_id).child_ids()[1];
        assert_eq!(get_object(left_id).texture_name(), Some("Wood".to_string()));
        assert_eq!(get_object(right_id).texture_name(), Some("Wood".to_string()));
    }

    #[test]
    fn hollow_set_on_a_child_pins_it_against_parent_propagation() {
        let mut child = Shape::wrap(Arc::new(Sphere::new()));
        child.flags.set(flags::HOLLOW_SET);
        child.flags.unset(flags::HOLLOW);

        let mut parent = Shape::wrap(Arc::new(child));
        parent.flags.set(flags::HOLLOW_SET | flags::HOLLOW);
        let parent_id = add_object(Arc::new(parent));

        let mut roots = vec![parent_id];
        run(&mut roots, &PostProcessOptions { remove_unnecessary_bounding: false, split_bounded_unions: false });

        let child_id = get_object(parent_id).child_ids()[0];
        assert!(!get_object(child_id).flags().contains(flags::HOLLOW));
        assert!(get_object(parent_id).flags().contains(flags::HOLLOW));
    }

    #[test]
    fn unbounded_plane_is_flagged_infinite() {
        let shape = Shape::wrap(Arc::new(Plane::new()));
        let transform = Matrix::identity(4);
        let mut shape = shape;
        shape.set_transform(transform);
        let id = add_object(Arc::new(shape));

        let mut roots = vec![id];
        run(&mut roots, &PostProcessOptions::default());
        assert!(get_object(id).flags().contains(flags::INFINITE));
    }
}
