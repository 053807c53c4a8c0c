//! Read-only view over the engine's pixel memory.
//!
//! A [`BufferView`] holds the engine exclusively for its lifetime, so no
//! command can move memory underneath it. Regions still carry the epoch they
//! were produced in: producing another output through the same view may
//! compact the arena, and a region from before that is refused with
//! [`BridgeError::StaleRegion`] rather than read as garbage.

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;

use std::sync::MutexGuard;

use engine::{PixelRegion, RegionKind};
use serde::Serialize;

use crate::backend::Backend;
use crate::error::BridgeError;

/// Pixels copied out of engine memory, safe to keep across commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCopy {
    pub region: PixelRegion,
    /// RGBA8 rows, top to bottom.
    pub bytes: Vec<u8>,
}

pub struct BufferView<'a> {
    engine: MutexGuard<'a, Box<dyn Backend>>,
}

impl std::fmt::Debug for BufferView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferView").field("len", &self.len()).field("epoch", &self.epoch()).finish()
    }
}

impl<'a> BufferView<'a> {
    pub(crate) fn new(engine: MutexGuard<'a, Box<dyn Backend>>) -> Self {
        Self { engine }
    }

    /// The whole engine memory.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.engine.memory()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Current memory epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.engine.epoch()
    }

    /// Locate a named output, asking the engine to produce it if needed.
    pub fn region(&mut self, kind: RegionKind) -> PixelRegion {
        self.engine.region(kind)
    }

    /// Bytes of `region`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StaleRegion`] if the region is from another
    /// epoch or does not fit in memory.
    pub fn pixels(&self, region: &PixelRegion) -> Result<&[u8], BridgeError> {
        let bytes = self.bytes();
        if region.epoch != self.epoch() || !region.fits(bytes.len()) {
            return Err(BridgeError::StaleRegion);
        }
        Ok(&bytes[region.offset..region.end()])
    }

    /// Copy `region` out of engine memory.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StaleRegion`] as for [`BufferView::pixels`].
    pub fn copy(&self, region: &PixelRegion) -> Result<RegionCopy, BridgeError> {
        Ok(RegionCopy { region: *region, bytes: self.pixels(region)?.to_vec() })
    }
}
