//! Linear memory: one growable byte arena holding every pixel output.
//!
//! Outputs are bump-allocated and described by [`PixelRegion`]s. The arena
//! never moves bytes under a live region; instead every event that could
//! invalidate a previously returned region advances the arena's epoch:
//!
//! - [`Memory::release_all`] after each mutating command, which forgets every
//!   live allocation (later allocations land at fresh, higher offsets);
//! - compaction, when the next allocation would cross the budget and the
//!   arena restarts at offset zero.
//!
//! A region is only meaningful while its `epoch` equals [`Memory::epoch`].

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{BYTES_PER_PIXEL, REGION_ALIGN};

/// A named pixel output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// The composited editor frame at stage size.
    Frame,
    /// Deterministic diagnostic tiles for a seed.
    Pattern { seed: u64, width: u32, height: u32 },
}

/// Location of RGBA8 pixels inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    /// Byte offset of the first pixel.
    pub offset: usize,
    pub width: u32,
    pub height: u32,
    /// Arena epoch the region belongs to.
    pub epoch: u64,
}

impl PixelRegion {
    /// Number of bytes covered: `width * height * 4`.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// One past the last byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.byte_len()
    }

    /// Whether the region lies inside a buffer of `buffer_len` bytes.
    #[must_use]
    pub fn fits(&self, buffer_len: usize) -> bool {
        self.offset.checked_add(self.byte_len()).is_some_and(|end| end <= buffer_len)
    }
}

/// The engine's byte arena.
#[derive(Debug)]
pub struct Memory {
    bytes: Vec<u8>,
    epoch: u64,
    budget: usize,
    live: HashMap<RegionKind, PixelRegion>,
}

impl Memory {
    /// Create an empty arena that compacts once it would grow past `budget` bytes.
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self { bytes: Vec::new(), epoch: 0, budget, live: HashMap::new() }
    }

    /// The whole arena.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The live allocation for `kind` in the current epoch, if any.
    #[must_use]
    pub fn lookup(&self, kind: &RegionKind) -> Option<PixelRegion> {
        self.live.get(kind).copied()
    }

    /// Bytes of a region from the current epoch.
    #[must_use]
    pub fn slice(&self, region: &PixelRegion) -> Option<&[u8]> {
        if region.epoch != self.epoch || !region.fits(self.bytes.len()) {
            return None;
        }
        Some(&self.bytes[region.offset..region.end()])
    }

    /// Allocate a zeroed region for `kind` and return it with its bytes.
    pub fn allocate(&mut self, kind: RegionKind, width: u32, height: u32) -> (PixelRegion, &mut [u8]) {
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        let mut offset = self.bytes.len().next_multiple_of(REGION_ALIGN);
        if offset > 0 && offset + len > self.budget {
            self.compact();
            offset = 0;
        }
        self.bytes.truncate(offset);
        self.bytes.resize(offset + len, 0);

        let region = PixelRegion { offset, width, height, epoch: self.epoch };
        self.live.insert(kind, region);
        debug!(?kind, offset, len, epoch = self.epoch, "region allocated");
        (region, &mut self.bytes[offset..offset + len])
    }

    /// Forget every live allocation. Earlier regions become stale.
    pub fn release_all(&mut self) {
        self.live.clear();
        self.epoch += 1;
    }

    fn compact(&mut self) {
        debug!(len = self.bytes.len(), budget = self.budget, "arena compacted");
        self.bytes.clear();
        self.live.clear();
        self.epoch += 1;
    }
}
