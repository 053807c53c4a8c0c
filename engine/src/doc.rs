//! Document model: stage objects, their transforms, and the per-document store.
//!
//! A document is a tree. Its root is a bare container that only ever serves as
//! an upload parent; every other node is an editable object with a name, a
//! kind-specific payload, and a transform relative to its parent. The store
//! also owns the document's selection, so switching documents swaps the
//! selection along with the objects.
//!
//! Hosts never see this tree directly. [`DocStore::snapshot`] produces a
//! [`Stage`], an owned copy that later mutations cannot reach.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::GLYPH_ADVANCE_RATIO;

/// Engine-assigned identifier for a stage object or a document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

/// Identifier of an editable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placement of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation in document units.
    pub position: (f64, f64),
    /// Clockwise rotation in radians around the object's origin.
    pub rotation: f64,
    /// Per-axis scale factors.
    pub scale: (f64, f64),
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: (0.0, 0.0), rotation: 0.0, scale: (1.0, 1.0) }
    }
}

impl Transform {
    /// The affine map `translate * rotate * scale`.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let (sin, cos) = self.rotation.sin_cos();
        let (sx, sy) = self.scale;
        Affine {
            a: cos * sx,
            b: sin * sx,
            c: -sin * sy,
            d: cos * sy,
            e: self.position.0,
            f: self.position.1,
        }
    }
}

/// 2D affine map `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// `self ∘ inner`: apply `inner` first, then `self`.
    #[must_use]
    pub fn then_inner(&self, inner: &Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    /// Apply only the linear part (no translation).
    #[must_use]
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// Inverse map, or `None` when the map is degenerate.
    #[must_use]
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Affine { a, b, c, d, e: -(a * self.e + c * self.f), f: -(b * self.e + d * self.f) })
    }
}

/// What an object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    /// Decoded raster image.
    Image { width: u32, height: u32 },
    /// SVG markup, sized from its root element.
    Svg { width: f64, height: f64 },
    /// Plain text run.
    Text { text: String, font_family: String, font_size: f64, color: [u8; 3] },
}

impl ObjectKind {
    /// Untransformed size in document units.
    #[must_use]
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Self::Image { width, height } => (f64::from(*width), f64::from(*height)),
            Self::Svg { width, height } => (*width, *height),
            Self::Text { text, font_size, .. } => {
                #[allow(clippy::cast_precision_loss)]
                let glyphs = text.chars().count() as f64;
                (glyphs * font_size * GLYPH_ADVANCE_RATIO, *font_size)
            }
        }
    }
}

/// One editable object inside a [`DocStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    /// Owning container: another object or the document root.
    pub parent: ObjectId,
    /// Children in draw order, bottom first.
    pub children: Vec<ObjectId>,
}

/// A host-owned copy of one stage object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageObject {
    pub id: ObjectId,
    pub name: String,
    pub parent: ObjectId,
    pub children: Vec<ObjectId>,
    pub kind: ObjectKind,
    pub position: (f64, f64),
    /// Radians.
    pub rotation: f64,
    pub scale: (f64, f64),
    pub selected: bool,
}

/// A point-in-time copy of the active document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// The document this snapshot was taken from.
    pub document: DocumentId,
    /// The document's root container; valid as an upload parent only.
    pub root: ObjectId,
    /// Objects in draw order, bottom first.
    pub objects: Vec<StageObject>,
    /// Selected ids, ascending.
    pub selection: Vec<ObjectId>,
}

impl Stage {
    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&StageObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Whether a live object with this id is on the stage.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    /// Number of objects on the stage.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the stage holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// In-memory store for one document.
#[derive(Debug, Clone)]
pub struct DocStore {
    id: DocumentId,
    root: ObjectId,
    root_children: Vec<ObjectId>,
    nodes: HashMap<ObjectId, Node>,
    selection: BTreeSet<ObjectId>,
}

impl DocStore {
    /// Create an empty document whose root container is `root`.
    #[must_use]
    pub fn new(id: DocumentId, root: ObjectId) -> Self {
        Self { id, root, root_children: Vec::new(), nodes: HashMap::new(), selection: BTreeSet::new() }
    }

    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    #[must_use]
    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Whether `id` names a live editable object. The root is not one.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether `id` can own children: the root or any live object.
    #[must_use]
    pub fn is_container(&self, id: ObjectId) -> bool {
        id == self.root || self.contains(id)
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the document holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn children_mut(&mut self, container: ObjectId) -> Option<&mut Vec<ObjectId>> {
        if container == self.root {
            Some(&mut self.root_children)
        } else {
            self.nodes.get_mut(&container).map(|n| &mut n.children)
        }
    }

    /// Attach a new object on top of `parent`'s children. Returns false, and
    /// changes nothing, if `parent` is not a container or `id` is taken.
    pub fn insert(&mut self, id: ObjectId, parent: ObjectId, name: String, kind: ObjectKind) -> bool {
        if id == self.root || self.nodes.contains_key(&id) {
            return false;
        }
        let Some(siblings) = self.children_mut(parent) else {
            return false;
        };
        siblings.push(id);
        self.nodes.insert(id, Node { name, kind, transform: Transform::default(), parent, children: Vec::new() });
        true
    }

    /// Remove an object. Its children move to the root, on top, and keep
    /// their relative transforms.
    pub fn remove(&mut self, id: ObjectId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        if let Some(siblings) = self.children_mut(node.parent) {
            siblings.retain(|c| *c != id);
        }
        for child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = self.root;
            }
        }
        self.root_children.extend(node.children.iter().copied());
        self.selection.remove(&id);
        Some(node)
    }

    /// Returns false if the object doesn't exist.
    pub fn rename(&mut self, id: ObjectId, name: String) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.name = name;
        true
    }

    /// Returns false if the object doesn't exist.
    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.transform = transform;
        true
    }

    /// Move an object by a world-space delta, converted into its parent's frame.
    pub fn translate_world(&mut self, id: ObjectId, delta: Point) -> bool {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return false;
        };
        let local = self
            .world_affine(parent)
            .and_then(|m| m.invert())
            .map_or(delta, |inv| inv.apply_vector(delta));
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.transform.position.0 += local.x;
        node.transform.position.1 += local.y;
        true
    }

    /// Replace the selection. Callers validate every id first.
    pub fn set_selection(&mut self, ids: BTreeSet<ObjectId>) {
        self.selection = ids;
    }

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<ObjectId> {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Whether a strict ancestor of `id` is selected.
    #[must_use]
    pub fn has_selected_ancestor(&self, id: ObjectId) -> bool {
        let mut cursor = self.nodes.get(&id).map(|n| n.parent);
        while let Some(p) = cursor {
            if self.selection.contains(&p) {
                return true;
            }
            cursor = self.nodes.get(&p).map(|n| n.parent);
        }
        false
    }

    /// Map from `id`'s local space to document space. The root maps to identity.
    #[must_use]
    pub fn world_affine(&self, id: ObjectId) -> Option<Affine> {
        if id == self.root {
            return Some(Affine::IDENTITY);
        }
        let node = self.nodes.get(&id)?;
        let parent = self.world_affine(node.parent)?;
        Some(parent.then_inner(&node.transform.to_affine()))
    }

    /// Object ids depth-first from the root, bottom first.
    #[must_use]
    pub fn render_order(&self) -> Vec<ObjectId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ObjectId> = self.root_children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Owned copy of the document in draw order.
    #[must_use]
    pub fn snapshot(&self) -> Stage {
        let objects = self
            .render_order()
            .into_iter()
            .filter_map(|id| {
                let node = self.nodes.get(&id)?;
                Some(StageObject {
                    id,
                    name: node.name.clone(),
                    parent: node.parent,
                    children: node.children.clone(),
                    kind: node.kind.clone(),
                    position: node.transform.position,
                    rotation: node.transform.rotation,
                    scale: node.transform.scale,
                    selected: self.selection.contains(&id),
                })
            })
            .collect();
        Stage {
            document: self.id,
            root: self.root,
            objects,
            selection: self.selection.iter().copied().collect(),
        }
    }
}
