//! The host-facing bridge: one engine, its command channel, buffer, stage,
//! and notifications behind a single owned handle.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use std::sync::Arc;

use engine::{Command, CommandAck, Notification, PixelRegion, RegionKind, Stage};

use crate::backend::{EngineLauncher, Launcher};
use crate::buffer::{BufferView, RegionCopy};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::lifecycle::Lifecycle;
use crate::notify::{NotificationBus, SubscriptionId};

#[derive(Debug)]
pub struct Bridge {
    lifecycle: Lifecycle,
    bus: NotificationBus,
}

impl Bridge {
    /// A bridge over the in-process engine. Nothing starts until [`Bridge::initialize`].
    #[must_use]
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_launcher(config, Arc::new(EngineLauncher))
    }

    #[must_use]
    pub fn with_launcher(config: &BridgeConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            lifecycle: Lifecycle::new(launcher, config.engine_options(), config.init_timeout),
            bus: NotificationBus::new(),
        }
    }

    // --- Lifecycle ---

    /// Start the engine once. Concurrent and repeated calls share one start.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EngineInit`] when startup fails; a later call retries.
    pub async fn initialize(&self) -> Result<(), BridgeError> {
        self.lifecycle.initialize().await
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    // --- Commands ---

    /// Apply one command and deliver its notifications before returning.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotInitialized`] before `initialize` succeeds.
    /// - [`BridgeError::ChannelBusy`] while another command or a buffer view is active.
    /// - [`BridgeError::UnknownObjectId`] / [`BridgeError::UploadValidation`] from the engine.
    pub fn send(&self, command: Command) -> Result<CommandAck, BridgeError> {
        self.lifecycle.handle()?.send(command, &self.bus)
    }

    // --- Queries ---

    /// Host-owned copy of the active document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotInitialized`] before `initialize` succeeds.
    pub fn get_stage(&self) -> Result<Stage, BridgeError> {
        Ok(self.lifecycle.handle()?.stage().as_ref().clone())
    }

    /// Exclusive read view of engine memory.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotInitialized`] or [`BridgeError::ChannelBusy`].
    pub fn get_buffer(&self) -> Result<BufferView<'_>, BridgeError> {
        self.lifecycle.handle()?.buffer()
    }

    /// Where a named output currently lives. Only valid until the next command.
    ///
    /// # Errors
    ///
    /// As for [`Bridge::get_buffer`].
    pub fn get_region(&self, kind: RegionKind) -> Result<PixelRegion, BridgeError> {
        Ok(self.get_buffer()?.region(kind))
    }

    /// Produce a named output and copy its pixels out in one step.
    ///
    /// # Errors
    ///
    /// As for [`Bridge::get_buffer`].
    pub fn read_region(&self, kind: RegionKind) -> Result<RegionCopy, BridgeError> {
        let mut view = self.get_buffer()?;
        let region = view.region(kind);
        view.copy(&region)
    }

    // --- Notifications ---

    pub fn subscribe<F>(&self, kind: Notification, callback: F) -> SubscriptionId
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationBus {
        &self.bus
    }
}
