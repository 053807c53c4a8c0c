//! Mouse gesture state machine.
//!
//! `Idle -> Pressed -> Dragging -> Idle`. A press hit-tests the front-most
//! object and adjusts the selection; once the pointer has travelled more than
//! [`DRAG_THRESHOLD_PX`] screen pixels the press turns into a drag and every
//! selected object follows the pointer. Releasing a press that never became a
//! drag makes the pressed object the sole selection.
//!
//! Every handler returns whether the document changed, so the engine knows
//! whether to notify the host.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use tracing::debug;

use crate::camera::{Camera, Point};
use crate::consts::DRAG_THRESHOLD_PX;
use crate::doc::{DocStore, ObjectId};
use crate::hit::hit_test;

/// The active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MouseState {
    /// No button held.
    #[default]
    Idle,
    /// Button held, still under the drag threshold.
    Pressed {
        /// Screen position of the press.
        start: Point,
        /// World position of the press; drags measure from here.
        start_world: Point,
        /// Object under the pointer at press time.
        hit: Option<ObjectId>,
    },
    /// Button held and the selection follows the pointer.
    Dragging {
        /// World position at the previous move.
        last_world: Point,
    },
}

/// Pointer tracker owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    state: MouseState,
}

impl Pointer {
    #[must_use]
    pub fn state(&self) -> MouseState {
        self.state
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.state = MouseState::Idle;
    }

    /// Handle a button press at `screen`.
    pub fn down(&mut self, doc: &mut DocStore, camera: &Camera, screen: Point) -> bool {
        let world = camera.screen_to_world(screen);
        let hit = hit_test(world, doc);
        let changed = match hit {
            Some(id) if !doc.is_selected(id) => {
                doc.set_selection(BTreeSet::from([id]));
                true
            }
            None if !doc.selection().is_empty() => {
                doc.set_selection(BTreeSet::new());
                true
            }
            _ => false,
        };
        debug!(x = screen.x, y = screen.y, ?hit, changed, "mouse down");
        self.state = MouseState::Pressed { start: screen, start_world: world, hit };
        changed
    }

    /// Handle pointer movement to `screen`.
    pub fn moved(&mut self, doc: &mut DocStore, camera: &Camera, screen: Point) -> bool {
        let world = camera.screen_to_world(screen);
        let from = match self.state {
            MouseState::Idle => return false,
            MouseState::Pressed { start, start_world, .. } => {
                if screen.delta_from(start).length() <= DRAG_THRESHOLD_PX {
                    return false;
                }
                debug!(x = screen.x, y = screen.y, "drag started");
                start_world
            }
            MouseState::Dragging { last_world } => last_world,
        };
        self.state = MouseState::Dragging { last_world: world };
        translate_selection(doc, world.delta_from(from))
    }

    /// Handle a button release.
    pub fn up(&mut self, doc: &mut DocStore) -> bool {
        let state = std::mem::take(&mut self.state);
        let MouseState::Pressed { hit: Some(id), .. } = state else {
            return false;
        };
        if !doc.contains(id) {
            return false;
        }
        let sole = BTreeSet::from([id]);
        if *doc.selection() == sole {
            return false;
        }
        doc.set_selection(sole);
        true
    }
}

/// Move every selected object by a world delta. Objects whose ancestor is
/// also selected ride along with it and are skipped.
fn translate_selection(doc: &mut DocStore, delta: Point) -> bool {
    if delta.x == 0.0 && delta.y == 0.0 {
        return false;
    }
    let movers: Vec<ObjectId> =
        doc.selection().iter().copied().filter(|id| !doc.has_selected_ancestor(*id)).collect();
    let mut changed = false;
    for id in movers {
        changed |= doc.translate_world(id, delta);
    }
    changed
}
