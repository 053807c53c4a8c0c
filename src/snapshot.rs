//! Last published stage, readable without touching the engine.
//!
//! The channel refreshes this after every command that changed the stage and
//! before any notification goes out, so a subscriber reading the stage always
//! sees the state its notification describes.

use std::sync::{Arc, PoisonError, RwLock};

use engine::Stage;

#[derive(Debug)]
pub struct StageCache {
    current: RwLock<Arc<Stage>>,
}

impl StageCache {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self { current: RwLock::new(Arc::new(stage)) }
    }

    /// The latest stage. Later commands never mutate the returned value.
    #[must_use]
    pub fn load(&self) -> Arc<Stage> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn store(&self, stage: Stage) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(stage);
    }
}
