//! Stage editing engine driven by the `easel` bridge.
//!
//! The engine owns the editable document state, hit-testing, the mouse gesture
//! state machine, and a single linear byte arena that holds every pixel output
//! it produces. It is single-instanced and order-sensitive: every mutation
//! arrives as a [`command::Command`] and is applied to completion before the
//! next one. The host side never touches engine memory except through
//! [`engine::Engine::memory`] and the [`memory::PixelRegion`] descriptors the
//! engine hands out.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`]: command dispatch, documents, outputs |
//! | [`command`] | Command / notification protocol and engine errors |
//! | [`doc`] | Stage objects, transforms, and the per-document store |
//! | [`asset`] | Upload payload validation and decoding |
//! | [`camera`] | Screen/world coordinate conversion |
//! | [`input`] | Mouse gesture state machine |
//! | [`hit`] | Hit-testing against stage objects |
//! | [`memory`] | Linear byte arena, epochs, and pixel regions |
//! | [`render`] | Frame compositor and diagnostic pattern generator |
//! | [`consts`] | Shared numeric constants |

pub mod asset;
pub mod camera;
pub mod command;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod memory;
pub mod render;

pub use command::{Command, CommandAck, EngineError, Notification};
pub use doc::{DocumentId, ObjectId, ObjectKind, Stage, StageObject, Transform};
pub use engine::{Applied, Engine, EngineOptions};
pub use memory::{PixelRegion, RegionKind};
