//! Top-level engine: command dispatch, documents, and pixel outputs.
//!
//! [`Engine`] owns every document, the mouse tracker, and the byte arena.
//! Commands are applied one at a time to completion. A command either fails
//! without touching state, or succeeds and returns the notifications the host
//! should act on. Every successful mutation releases the arena's outputs, so
//! regions handed out before it are stale afterwards.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use crate::asset;
use crate::camera::{Camera, Point};
use crate::command::{Command, CommandAck, EngineError, Notification};
use crate::consts::{DEFAULT_STAGE_HEIGHT, DEFAULT_STAGE_WIDTH, MAX_STAGE_EDGE};
use crate::doc::{DocStore, DocumentId, ObjectId, ObjectKind, Stage, Transform};
use crate::input::{MouseState, Pointer};
use crate::memory::{Memory, PixelRegion, RegionKind};
use crate::render;

const MIB: usize = 1024 * 1024;

/// Startup parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Stage width in pixels; also the frame width.
    pub width: u32,
    /// Stage height in pixels; also the frame height.
    pub height: u32,
    /// Largest accepted upload payload in bytes.
    pub max_upload_bytes: usize,
    /// Arena size past which outputs compact to offset zero.
    pub memory_budget: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_STAGE_WIDTH,
            height: DEFAULT_STAGE_HEIGHT,
            max_upload_bytes: 16 * MIB,
            memory_budget: 16 * MIB,
        }
    }
}

impl EngineOptions {
    /// Check that the options describe a usable stage.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] for a zero or oversized stage
    /// edge, or a zero upload limit.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, edge) in [("width", self.width), ("height", self.height)] {
            if edge == 0 || edge > MAX_STAGE_EDGE {
                return Err(EngineError::InvalidOptions(format!(
                    "stage {name} {edge} outside 1..={MAX_STAGE_EDGE}"
                )));
            }
        }
        if self.max_upload_bytes == 0 {
            return Err(EngineError::InvalidOptions("max_upload_bytes must be positive".into()));
        }
        Ok(())
    }
}

/// Outcome of one successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    pub ack: CommandAck,
    /// Notifications in emission order.
    pub notifications: Vec<Notification>,
}

impl Applied {
    fn quiet() -> Self {
        Self::default()
    }

    fn changed(ack: CommandAck) -> Self {
        Self { ack, notifications: vec![Notification::StageChanged, Notification::Rerender] }
    }

    fn renamed() -> Self {
        Self { ack: CommandAck::default(), notifications: vec![Notification::StageChanged] }
    }
}

/// The stage editing engine.
#[derive(Debug)]
pub struct Engine {
    options: EngineOptions,
    active: DocStore,
    parked: HashMap<DocumentId, DocStore>,
    next_id: u32,
    camera: Camera,
    pointer: Pointer,
    memory: Memory,
}

impl Engine {
    /// Start an engine with one empty document, `DocumentId(1)`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] when `options` fail validation.
    pub fn boot(options: EngineOptions) -> Result<Self, EngineError> {
        options.validate()?;
        let root = ObjectId(1);
        info!(width = options.width, height = options.height, budget = options.memory_budget, "engine booted");
        Ok(Self {
            options,
            active: DocStore::new(DocumentId(1), root),
            parked: HashMap::new(),
            next_id: root.0 + 1,
            camera: Camera::default(),
            pointer: Pointer::default(),
            memory: Memory::new(options.memory_budget),
        })
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn mouse_state(&self) -> MouseState {
        self.pointer.state()
    }

    /// Id of the active document.
    #[must_use]
    pub fn active_document(&self) -> DocumentId {
        self.active.id()
    }

    /// Owned snapshot of the active document.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.active.snapshot()
    }

    /// The whole arena.
    #[must_use]
    pub fn memory(&self) -> &[u8] {
        self.memory.bytes()
    }

    /// Current arena epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.memory.epoch()
    }

    /// Bytes of a region, or `None` once the region has gone stale.
    #[must_use]
    pub fn pixels(&self, region: &PixelRegion) -> Option<&[u8]> {
        self.memory.slice(region)
    }

    /// Locate an output, producing it if this epoch has not yet.
    ///
    /// Pattern sizes are clamped to `1..=MAX_STAGE_EDGE` on each axis.
    pub fn region(&mut self, kind: RegionKind) -> PixelRegion {
        if let Some(region) = self.memory.lookup(&kind) {
            return region;
        }
        match kind {
            RegionKind::Frame => {
                let (w, h) = (self.options.width, self.options.height);
                let (region, out) = self.memory.allocate(kind, w, h);
                render::frame_into(&self.active, &self.camera, w, h, out);
                region
            }
            RegionKind::Pattern { seed, width, height } => {
                let w = width.clamp(1, MAX_STAGE_EDGE);
                let h = height.clamp(1, MAX_STAGE_EDGE);
                let (region, out) = self.memory.allocate(kind, w, h);
                render::pattern_into(seed, w, h, out);
                region
            }
        }
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownObject`] when a referenced id is not a live
    ///   object of the active document (or, for uploads, not a container).
    /// - [`EngineError::InvalidUpload`] when an upload payload is rejected.
    pub fn apply(&mut self, command: Command) -> Result<Applied, EngineError> {
        let label = command.name();
        let applied = match command {
            Command::MouseDown { x, y } => {
                let changed = self.pointer.down(&mut self.active, &self.camera, Point::new(x, y));
                Self::input_outcome(changed)
            }
            Command::MouseMove { x, y } => {
                let changed = self.pointer.moved(&mut self.active, &self.camera, Point::new(x, y));
                Self::input_outcome(changed)
            }
            Command::MouseUp => Self::input_outcome(self.pointer.up(&mut self.active)),
            Command::EditTransform { id, position, rotation, scale } => {
                if !self.active.set_transform(id, Transform { position, rotation, scale }) {
                    return Err(EngineError::UnknownObject(id));
                }
                Applied::changed(CommandAck::default())
            }
            Command::Rename { id, name } => {
                if !self.active.rename(id, name) {
                    return Err(EngineError::UnknownObject(id));
                }
                Applied::renamed()
            }
            Command::Select { ids } => {
                self.select(ids)?;
                Applied::changed(CommandAck::default())
            }
            Command::Delete { id } => {
                if self.active.remove(id).is_none() {
                    return Err(EngineError::UnknownObject(id));
                }
                Applied::changed(CommandAck::default())
            }
            Command::UploadImage { name, parent, bytes } => {
                self.check_upload(&name, parent, bytes.len())?;
                let kind = asset::decode_image(&bytes)?;
                self.attach(name, parent, kind)?
            }
            Command::UploadSvg { name, parent, svg } => {
                self.check_upload(&name, parent, svg.len())?;
                let kind = asset::parse_svg(&svg)?;
                self.attach(name, parent, kind)?
            }
            Command::UploadText { name, parent, text } => {
                self.check_upload(&name, parent, text.len())?;
                self.attach(name, parent, asset::text_kind(text))?
            }
            Command::SwitchDocument { id } => {
                self.switch_document(id)?;
                Applied::changed(CommandAck::default())
            }
        };
        if !applied.notifications.is_empty() {
            self.memory.release_all();
        }
        debug!(command = label, notifications = applied.notifications.len(), epoch = self.memory.epoch(), "applied");
        Ok(applied)
    }

    fn input_outcome(changed: bool) -> Applied {
        if changed { Applied::changed(CommandAck::default()) } else { Applied::quiet() }
    }

    fn alloc_id(&mut self) -> Result<ObjectId, EngineError> {
        let id = ObjectId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(EngineError::IdsExhausted)?;
        Ok(id)
    }

    fn select(&mut self, ids: BTreeSet<ObjectId>) -> Result<(), EngineError> {
        if let Some(unknown) = ids.iter().find(|id| !self.active.contains(**id)) {
            return Err(EngineError::UnknownObject(*unknown));
        }
        self.active.set_selection(ids);
        Ok(())
    }

    fn check_upload(&self, name: &str, parent: ObjectId, len: usize) -> Result<(), EngineError> {
        if !self.active.is_container(parent) {
            return Err(EngineError::UnknownObject(parent));
        }
        asset::check_name(name)?;
        asset::check_len(len, self.options.max_upload_bytes)
    }

    fn attach(&mut self, name: String, parent: ObjectId, kind: ObjectKind) -> Result<Applied, EngineError> {
        let id = self.alloc_id()?;
        self.active.insert(id, parent, name, kind);
        debug!(%id, %parent, "object created");
        Ok(Applied::changed(CommandAck::assigned(id)))
    }

    fn switch_document(&mut self, id: DocumentId) -> Result<(), EngineError> {
        if id == self.active.id() {
            self.pointer.reset();
            return Ok(());
        }
        let next = match self.parked.remove(&id) {
            Some(doc) => doc,
            None => {
                let root = self.alloc_id()?;
                info!(document = %id, %root, "document created");
                DocStore::new(id, root)
            }
        };
        self.pointer.reset();
        let previous = std::mem::replace(&mut self.active, next);
        self.parked.insert(previous.id(), previous);
        info!(document = %id, "document activated");
        Ok(())
    }
}
