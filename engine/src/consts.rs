//! Shared numeric constants for the engine crate.

// ── Pixels ──────────────────────────────────────────────────────

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Edge length in pixels of one tile of the diagnostic pattern.
pub const PATTERN_TILE_PX: u32 = 20;

/// Frame background (RGBA).
pub const BACKGROUND_RGBA: [u8; 4] = [0xF4, 0xF1, 0xEA, 0xFF];

/// Selection outline (RGBA).
pub const SELECTION_RGBA: [u8; 4] = [0x1F, 0x6F, 0xEB, 0xFF];

/// Arena allocations are aligned to this many bytes.
pub const REGION_ALIGN: usize = 8;

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel in screen pixels before a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

// ── Stage defaults ──────────────────────────────────────────────

/// Default stage width in pixels.
pub const DEFAULT_STAGE_WIDTH: u32 = 800;

/// Default stage height in pixels.
pub const DEFAULT_STAGE_HEIGHT: u32 = 600;

/// Largest accepted stage edge in pixels.
pub const MAX_STAGE_EDGE: u32 = 8192;

/// Intrinsic size used for SVG markup with neither `width`/`height` nor a `viewBox`.
pub const DEFAULT_SVG_SIZE: f32 = 100.0;

/// Default font for uploaded text.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Default font size for uploaded text.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Approximate advance width of one glyph, as a fraction of the font size.
pub const GLYPH_ADVANCE_RATIO: f64 = 0.6;
