//! Engine lifecycle: start the single engine at most once.
//!
//! DESIGN
//! ======
//! `initialize` is idempotent and safe to call concurrently. The first caller
//! creates a startup future and parks a shared clone of it; every concurrent
//! caller awaits that same clone, so one launch resolves all of them with the
//! same result. On success the handle is published to a `OnceLock` and stays
//! for the life of the lifecycle. On failure the parked future is cleared so
//! a later `initialize` launches again.
//!
//! The optional startup timeout uses the tokio timer and therefore needs a
//! tokio runtime; without a timeout the future runs on any executor.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use engine::EngineOptions;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{info, warn};

use crate::backend::Launcher;
use crate::channel::EngineHandle;
use crate::error::{BridgeError, ErrorCode};

type Startup = Shared<BoxFuture<'static, Result<Arc<EngineHandle>, BridgeError>>>;

pub struct Lifecycle {
    launcher: Arc<dyn Launcher>,
    options: EngineOptions,
    timeout: Option<Duration>,
    ready: OnceLock<Arc<EngineHandle>>,
    pending: Mutex<Option<Startup>>,
    attempts: AtomicUsize,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .field("ready", &self.is_ready())
            .field("attempts", &self.attempts())
            .finish_non_exhaustive()
    }
}

impl Lifecycle {
    #[must_use]
    pub fn new(launcher: Arc<dyn Launcher>, options: EngineOptions, timeout: Option<Duration>) -> Self {
        Self {
            launcher,
            options,
            timeout,
            ready: OnceLock::new(),
            pending: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Non-blocking readiness check.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.get().is_some()
    }

    /// How many launches have been started so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    /// The running engine.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotInitialized`] until `initialize` has succeeded.
    pub fn handle(&self) -> Result<&Arc<EngineHandle>, BridgeError> {
        self.ready.get().ok_or(BridgeError::NotInitialized)
    }

    /// Start the engine, or join a startup already in progress.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EngineInit`] when the launch fails or times out.
    /// Every caller joined to that launch receives the same error.
    pub async fn initialize(&self) -> Result<(), BridgeError> {
        if self.is_ready() {
            return Ok(());
        }
        let startup = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if self.is_ready() {
                return Ok(());
            }
            match pending.as_ref() {
                Some(startup) => startup.clone(),
                None => {
                    let startup = self.launch().boxed().shared();
                    *pending = Some(startup.clone());
                    startup
                }
            }
        };

        let result = startup.clone().await;
        if let Ok(handle) = &result {
            if self.ready.set(Arc::clone(handle)).is_ok() {
                info!(attempt = self.attempts(), "engine ready");
            }
        }
        self.clear_pending(&startup);
        result.map(|_| ())
    }

    fn clear_pending(&self, startup: &Startup) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().is_some_and(|current| Shared::ptr_eq(current, startup)) {
            *pending = None;
        }
    }

    fn launch(&self) -> impl Future<Output = Result<Arc<EngineHandle>, BridgeError>> + Send + 'static {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let launcher = Arc::clone(&self.launcher);
        let options = self.options;
        let timeout = self.timeout;
        async move {
            info!(attempt, width = options.width, height = options.height, ?timeout, "engine starting");
            let launch = launcher.launch(options);
            let outcome = match timeout {
                Some(limit) => match tokio::time::timeout(limit, launch).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(BridgeError::EngineInit(format!("engine did not start within {limit:?}"))),
                },
                None => launch.await,
            };
            match outcome {
                Ok(backend) => Ok(Arc::new(EngineHandle::new(backend))),
                Err(e) => {
                    warn!(attempt, code = e.error_code(), error = %e, "engine failed to start");
                    Err(e)
                }
            }
        }
    }
}
