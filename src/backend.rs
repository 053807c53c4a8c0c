//! Seams between the bridge and the engine it drives.
//!
//! [`Backend`] is the narrow command and memory interface of one running
//! engine. [`Launcher`] starts one asynchronously. The bridge only ever talks
//! to these traits, so tests can substitute counting, failing, or slow
//! launchers without touching the lifecycle code.

use async_trait::async_trait;
use engine::{Applied, Command, Engine, EngineError, EngineOptions, PixelRegion, RegionKind, Stage};
use tracing::info;

use crate::error::BridgeError;

/// A running engine instance.
pub trait Backend: Send {
    /// Apply one command to completion.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the command is rejected; state is unchanged.
    fn apply(&mut self, command: Command) -> Result<Applied, EngineError>;

    /// Owned copy of the active document.
    fn stage(&self) -> Stage;

    /// Locate (producing if needed) a named pixel output.
    fn region(&mut self, kind: RegionKind) -> PixelRegion;

    /// The engine's linear memory.
    fn memory(&self) -> &[u8];

    /// Counter that advances whenever earlier regions may be invalid.
    fn epoch(&self) -> u64;
}

impl Backend for Engine {
    fn apply(&mut self, command: Command) -> Result<Applied, EngineError> {
        Engine::apply(self, command)
    }

    fn stage(&self) -> Stage {
        Engine::stage(self)
    }

    fn region(&mut self, kind: RegionKind) -> PixelRegion {
        Engine::region(self, kind)
    }

    fn memory(&self) -> &[u8] {
        Engine::memory(self)
    }

    fn epoch(&self) -> u64 {
        Engine::epoch(self)
    }
}

/// Starts engine instances.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Start one engine.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EngineInit`] when the engine cannot start.
    async fn launch(&self, options: EngineOptions) -> Result<Box<dyn Backend>, BridgeError>;
}

/// Boots the in-process [`Engine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineLauncher;

#[async_trait]
impl Launcher for EngineLauncher {
    async fn launch(&self, options: EngineOptions) -> Result<Box<dyn Backend>, BridgeError> {
        let engine = Engine::boot(options).map_err(|e| BridgeError::EngineInit(e.to_string()))?;
        info!(width = options.width, height = options.height, "in-process engine launched");
        Ok(Box::new(engine))
    }
}
