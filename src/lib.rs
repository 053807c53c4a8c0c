//! Easel: the bridge between a host shell and the stage editing engine.
//!
//! The host never reaches into the engine directly. It initializes one engine
//! through the bridge, sends it one [`engine::Command`] per interaction, reads
//! pixels through an exclusive [`buffer::BufferView`], queries owned
//! [`engine::Stage`] snapshots, and listens for [`engine::Notification`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`bridge`] | [`Bridge`] facade tying the pieces together |
//! | [`lifecycle`] | Once-only, concurrency-safe engine startup |
//! | [`channel`] | Ordered, non-reentrant command channel |
//! | [`buffer`] | Exclusive view over engine pixel memory |
//! | [`snapshot`] | Last published stage, readable at any time |
//! | [`notify`] | Notification subscriptions and delivery |
//! | [`backend`] | `Backend` / `Launcher` seams and the in-process launcher |
//! | [`config`] | `EASEL_*` environment configuration |
//! | [`error`] | Bridge errors and their codes |
//! | [`logging`] | Tracing subscriber setup |
//! | `wasm` | `wasm-bindgen` exports (feature `wasm`) |

pub mod backend;
pub mod bridge;
pub mod buffer;
pub mod channel;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod notify;
pub mod snapshot;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use bridge::Bridge;
pub use buffer::{BufferView, RegionCopy};
pub use config::BridgeConfig;
pub use error::{BridgeError, ErrorCode};
pub use notify::SubscriptionId;

pub use engine::{
    Command, CommandAck, DocumentId, Notification, ObjectId, ObjectKind, PixelRegion, RegionKind, Stage, StageObject,
};
