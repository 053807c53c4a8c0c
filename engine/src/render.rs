//! Pixel outputs: the composited frame and the diagnostic pattern.
//!
//! Both producers write RGBA8 rows, top to bottom, into a caller-provided
//! slice of exactly `width * height * 4` bytes. They read document state and
//! never mutate it.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::{Camera, Point};
use crate::consts::{BACKGROUND_RGBA, BYTES_PER_PIXEL, PATTERN_TILE_PX, SELECTION_RGBA};
use crate::doc::{DocStore, ObjectId};
use crate::hit::{self, Bounds};

/// Pixel rectangle `[x0, x1) x [y0, y1)`, already clipped to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl PixelRect {
    fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

// =============================================================
// Frame
// =============================================================

/// Composite the document into `out`.
///
/// The background is cleared first. Each object's world bounding box is then
/// filled bottom to top with its id colour, and selected objects get a
/// one-pixel outline. Objects with non-finite geometry are skipped.
pub fn frame_into(doc: &DocStore, camera: &Camera, width: u32, height: u32, out: &mut [u8]) {
    let (w, h) = (width as usize, height as usize);
    fill(out, w, PixelRect { x0: 0, y0: 0, x1: w, y1: h }, BACKGROUND_RGBA);

    for id in doc.render_order() {
        let Some(rect) = object_rect(doc, camera, id, w, h) else {
            continue;
        };
        fill(out, w, rect, object_rgba(id));
    }
    for id in doc.selection() {
        let Some(rect) = object_rect(doc, camera, *id, w, h) else {
            continue;
        };
        outline(out, w, rect, SELECTION_RGBA);
    }
}

/// Fill colour for an object, stable for its id.
#[must_use]
pub fn object_rgba(id: ObjectId) -> [u8; 4] {
    let h = id.0.wrapping_mul(0x9E37_79B9).rotate_left(7);
    let [r, g, b, _] = h.to_be_bytes();
    // Keep fills away from the near-black text range.
    [r | 0x40, g | 0x40, b | 0x40, 0xFF]
}

fn object_rect(doc: &DocStore, camera: &Camera, id: ObjectId, w: usize, h: usize) -> Option<PixelRect> {
    let world = hit::world_bounds(doc, id)?;
    let min = camera.world_to_screen(Point::new(world.min_x, world.min_y));
    let max = camera.world_to_screen(Point::new(world.max_x, world.max_y));
    let screen = Bounds { min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y };
    if !screen.is_finite() {
        return None;
    }
    let rect = PixelRect {
        x0: clamp_px(screen.min_x.floor(), w),
        y0: clamp_px(screen.min_y.floor(), h),
        x1: clamp_px(screen.max_x.ceil(), w),
        y1: clamp_px(screen.max_y.ceil(), h),
    };
    (!rect.is_empty()).then_some(rect)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn clamp_px(v: f64, limit: usize) -> usize {
    v.clamp(0.0, limit as f64) as usize
}

fn fill(out: &mut [u8], stride: usize, rect: PixelRect, rgba: [u8; 4]) {
    for y in rect.y0..rect.y1 {
        let row = (y * stride + rect.x0) * BYTES_PER_PIXEL;
        let end = (y * stride + rect.x1) * BYTES_PER_PIXEL;
        for px in out[row..end].chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }
}

fn outline(out: &mut [u8], stride: usize, rect: PixelRect, rgba: [u8; 4]) {
    let PixelRect { x0, y0, x1, y1 } = rect;
    fill(out, stride, PixelRect { x0, y0, x1, y1: y0 + 1 }, rgba);
    fill(out, stride, PixelRect { x0, y0: y1 - 1, x1, y1 }, rgba);
    fill(out, stride, PixelRect { x0, y0, x1: x0 + 1, y1 }, rgba);
    fill(out, stride, PixelRect { x0: x1 - 1, y0, x1, y1 }, rgba);
}

// =============================================================
// Pattern
// =============================================================

/// Seeded tile pattern as an owned buffer.
#[must_use]
pub fn pattern(seed: u64, width: u32, height: u32) -> Vec<u8> {
    let mut out = vec![0; width as usize * height as usize * BYTES_PER_PIXEL];
    pattern_into(seed, width, height, &mut out);
    out
}

/// Write the seeded tile pattern into `out`.
///
/// The output is split into square tiles of [`PATTERN_TILE_PX`] pixels, the
/// last row and column clipped. Tile colours are drawn row-major from a
/// `StdRng` seeded with `seed`, so equal inputs give identical bytes.
pub fn pattern_into(seed: u64, width: u32, height: u32, out: &mut [u8]) {
    let tiles_x = width.div_ceil(PATTERN_TILE_PX) as usize;
    let tiles_y = height.div_ceil(PATTERN_TILE_PX) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    let colours: Vec<[u8; 4]> =
        (0..tiles_x * tiles_y).map(|_| [rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>(), 0xFF]).collect();

    let w = width as usize;
    let tile = PATTERN_TILE_PX as usize;
    for (i, px) in out.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
        let (x, y) = (i % w, i / w);
        px.copy_from_slice(&colours[(y / tile) * tiles_x + x / tile]);
    }
}
