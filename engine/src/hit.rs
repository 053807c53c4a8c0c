//! Geometry queries against the document: hit-testing and world bounds.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::doc::{DocStore, ObjectId};

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }
}

/// Front-most object whose shape contains `world_pt`.
///
/// Objects are tested top to bottom in draw order. A point on the edge of
/// an object counts as inside. The root container is never hit.
#[must_use]
pub fn hit_test(world_pt: Point, doc: &DocStore) -> Option<ObjectId> {
    doc.render_order()
        .into_iter()
        .rev()
        .find(|id| contains_point(doc, *id, world_pt))
}

/// Whether the object's transformed box contains `world_pt`.
#[must_use]
pub fn contains_point(doc: &DocStore, id: ObjectId, world_pt: Point) -> bool {
    let Some(node) = doc.get(id) else {
        return false;
    };
    let Some(inverse) = doc.world_affine(id).and_then(|m| m.invert()) else {
        return false;
    };
    let (w, h) = node.kind.intrinsic_size();
    let local = inverse.apply(world_pt);
    local.x >= 0.0 && local.x <= w && local.y >= 0.0 && local.y <= h
}

/// Axis-aligned world bounds of the object's transformed box.
#[must_use]
pub fn world_bounds(doc: &DocStore, id: ObjectId) -> Option<Bounds> {
    let node = doc.get(id)?;
    let m = doc.world_affine(id)?;
    let (w, h) = node.kind.intrinsic_size();
    let corners = [
        m.apply(Point::new(0.0, 0.0)),
        m.apply(Point::new(w, 0.0)),
        m.apply(Point::new(0.0, h)),
        m.apply(Point::new(w, h)),
    ];
    let init = Bounds { min_x: f64::INFINITY, min_y: f64::INFINITY, max_x: f64::NEG_INFINITY, max_y: f64::NEG_INFINITY };
    Some(corners.iter().fold(init, |b, p| Bounds {
        min_x: b.min_x.min(p.x),
        min_y: b.min_y.min(p.y),
        max_x: b.max_x.max(p.x),
        max_y: b.max_y.max(p.y),
    }))
}
