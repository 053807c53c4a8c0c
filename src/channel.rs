//! Command channel: the one ordered path by which the host mutates the engine.
//!
//! DESIGN
//! ======
//! [`EngineHandle`] wraps one running [`Backend`]. `send` holds an in-flight
//! flag for the whole call, from taking the engine lock to the last
//! notification callback returning. A second `send` while the flag is set,
//! whether from another thread or from inside a callback, is rejected with
//! [`BridgeError::ChannelBusy`]; it is never queued. The engine lock is also
//! taken with `try_lock`, so a command issued while a [`BufferView`] is alive
//! is rejected the same way.
//!
//! The lock is released before notifications are delivered, so callbacks can
//! read the stage and the buffer.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use engine::{Command, CommandAck, Stage};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::buffer::BufferView;
use crate::error::{BridgeError, ErrorCode};
use crate::notify::NotificationBus;
use crate::snapshot::StageCache;

/// A live engine plus the state that serialises access to it.
pub struct EngineHandle {
    engine: Mutex<Box<dyn Backend>>,
    in_flight: AtomicBool,
    stage: StageCache,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").field("in_flight", &self.in_flight.load(Ordering::Relaxed)).finish_non_exhaustive()
    }
}

/// Clears the in-flight flag on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, BridgeError> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| Self(flag))
            .map_err(|_| BridgeError::ChannelBusy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EngineHandle {
    #[must_use]
    pub fn new(backend: Box<dyn Backend>) -> Self {
        let stage = StageCache::new(backend.stage());
        Self { engine: Mutex::new(backend), in_flight: AtomicBool::new(false), stage }
    }

    fn try_engine(&self) -> Result<MutexGuard<'_, Box<dyn Backend>>, BridgeError> {
        match self.engine.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(BridgeError::ChannelBusy),
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        }
    }

    /// Whether a command is currently being applied or delivered.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Apply one command, then deliver its notifications through `bus`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ChannelBusy`] if a command is in flight or a buffer view is alive.
    /// - [`BridgeError::UnknownObjectId`] / [`BridgeError::UploadValidation`] when
    ///   the engine rejects the command. Nothing changes and nothing is published.
    pub fn send(&self, command: Command, bus: &NotificationBus) -> Result<CommandAck, BridgeError> {
        let label = command.name();
        let _in_flight = InFlight::acquire(&self.in_flight).inspect_err(|_| {
            warn!(command = label, "command rejected: channel busy");
        })?;

        let applied = {
            let mut engine = self.try_engine().inspect_err(|_| {
                warn!(command = label, "command rejected: buffer view alive");
            })?;
            let applied = engine.apply(command).map_err(|e| {
                let err = BridgeError::from(e);
                warn!(command = label, code = err.error_code(), error = %err, "command rejected");
                err
            })?;
            if !applied.notifications.is_empty() {
                self.stage.store(engine.stage());
            }
            applied
        };

        debug!(command = label, assigned = ?applied.ack.assigned_id, "command applied");
        for kind in &applied.notifications {
            bus.publish(*kind);
        }
        Ok(applied.ack)
    }

    /// The stage as of the last completed command.
    #[must_use]
    pub fn stage(&self) -> Arc<Stage> {
        self.stage.load()
    }

    /// Borrow the engine's memory exclusively until the view is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ChannelBusy`] while a command holds the engine
    /// or another view is alive.
    pub fn buffer(&self) -> Result<BufferView<'_>, BridgeError> {
        Ok(BufferView::new(self.try_engine()?))
    }
}
