//! The command/notification protocol between host and engine.
//!
//! Both directions are closed enums: the host sends exactly one [`Command`] per
//! interaction and the engine answers with a [`CommandAck`] or an
//! [`EngineError`], plus zero or more [`Notification`]s describing what the
//! host should refresh.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::doc::{DocumentId, ObjectId};

/// A single host-to-engine request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pointer pressed at raw host canvas coordinates.
    MouseDown { x: f64, y: f64 },
    /// Pointer released.
    MouseUp,
    /// Pointer moved to raw host canvas coordinates.
    MouseMove { x: f64, y: f64 },
    /// Replace an object's transform.
    EditTransform { id: ObjectId, position: (f64, f64), rotation: f64, scale: (f64, f64) },
    Rename { id: ObjectId, name: String },
    /// Replace the whole selection.
    Select { ids: BTreeSet<ObjectId> },
    Delete { id: ObjectId },
    UploadImage { name: String, parent: ObjectId, bytes: Vec<u8> },
    UploadSvg { name: String, parent: ObjectId, svg: String },
    UploadText { name: String, parent: ObjectId, text: String },
    /// Make another document active, creating it empty if unseen.
    SwitchDocument { id: DocumentId },
}

impl Command {
    /// Short stable name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MouseDown { .. } => "mouse_down",
            Self::MouseUp => "mouse_up",
            Self::MouseMove { .. } => "mouse_move",
            Self::EditTransform { .. } => "edit_transform",
            Self::Rename { .. } => "rename",
            Self::Select { .. } => "select",
            Self::Delete { .. } => "delete",
            Self::UploadImage { .. } => "upload_image",
            Self::UploadSvg { .. } => "upload_svg",
            Self::UploadText { .. } => "upload_text",
            Self::SwitchDocument { .. } => "switch_document",
        }
    }

    /// Whether this is a pointer event rather than an edit.
    #[must_use]
    pub fn is_input(&self) -> bool {
        matches!(self, Self::MouseDown { .. } | Self::MouseUp | Self::MouseMove { .. })
    }
}

/// Successful result of a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Id assigned to a newly created object, for uploads.
    pub assigned_id: Option<ObjectId>,
}

impl CommandAck {
    #[must_use]
    pub fn assigned(id: ObjectId) -> Self {
        Self { assigned_id: Some(id) }
    }
}

/// Engine-to-host advisory event. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Notification {
    /// Pixel outputs are out of date.
    Rerender,
    /// Objects or selection changed; re-read the stage.
    StageChanged,
}

impl Notification {
    pub const ALL: [Notification; 2] = [Notification::Rerender, Notification::StageChanged];

    /// Stable tag used by host bindings.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Rerender => "Rerender",
            Self::StageChanged => "StageChanged",
        }
    }

    /// Parse a host-supplied tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Rerender" => Some(Self::Rerender),
            "StageChanged" => Some(Self::StageChanged),
            _ => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Errors returned by the engine. A failed command changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The id does not name a live object in the active document.
    #[error("unknown object id: {0}")]
    UnknownObject(ObjectId),
    /// An upload payload could not be accepted.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    /// Startup options were rejected.
    #[error("invalid engine options: {0}")]
    InvalidOptions(String),
    /// The session has handed out every object id.
    #[error("object ids exhausted")]
    IdsExhausted,
}
