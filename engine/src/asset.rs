//! Upload payload validation.
//!
//! Every upload is checked here before the engine allocates an id for it. A
//! payload that fails any check is reported as
//! [`EngineError::InvalidUpload`] and leaves the document untouched.

#[cfg(test)]
#[path = "asset_test.rs"]
mod asset_test;

use std::borrow::Cow;

use image::GenericImageView;

use crate::command::EngineError;
use crate::consts::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_SVG_SIZE};
use crate::doc::ObjectKind;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Reject empty or whitespace-only names.
///
/// # Errors
///
/// Returns [`EngineError::InvalidUpload`] for a blank name.
pub fn check_name(name: &str) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::InvalidUpload("name must not be empty".into()));
    }
    Ok(())
}

/// Reject payloads larger than `max_bytes`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidUpload`] when the payload is too large.
pub fn check_len(len: usize, max_bytes: usize) -> Result<(), EngineError> {
    if len > max_bytes {
        return Err(EngineError::InvalidUpload(format!("payload is {len} bytes, limit is {max_bytes}")));
    }
    Ok(())
}

/// Decode raster bytes (PNG or JPEG) and return the image kind with its size.
///
/// # Errors
///
/// Returns [`EngineError::InvalidUpload`] when the bytes are empty or cannot be decoded.
pub fn decode_image(bytes: &[u8]) -> Result<ObjectKind, EngineError> {
    if bytes.is_empty() {
        return Err(EngineError::InvalidUpload("image payload is empty".into()));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| EngineError::InvalidUpload(format!("could not decode image: {e}")))?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidUpload("image has no pixels".into()));
    }
    Ok(ObjectKind::Image { width, height })
}

/// Parse `markup` as an SVG document and read its size.
///
/// The root element must be `<svg>`. Markup that omits the SVG namespace is
/// read as if it declared it. The size is resolved from `width`/`height`, then
/// the `viewBox`, then [`DEFAULT_SVG_SIZE`].
///
/// # Errors
///
/// Returns [`EngineError::InvalidUpload`] for malformed XML, a non-`<svg>` root,
/// or markup `usvg` cannot turn into a tree.
pub fn parse_svg(markup: &str) -> Result<ObjectKind, EngineError> {
    let markup = with_svg_namespace(markup)?;
    let tree = usvg::Tree::from_str(&markup, &svg_options())
        .map_err(|e| EngineError::InvalidUpload(format!("could not parse svg: {e}")))?;
    let size = tree.size();
    Ok(ObjectKind::Svg { width: f64::from(size.width()), height: f64::from(size.height()) })
}

/// Text objects always use the default font, size, and colour.
#[must_use]
pub fn text_kind(text: String) -> ObjectKind {
    ObjectKind::Text { text, font_family: DEFAULT_FONT_FAMILY.into(), font_size: DEFAULT_FONT_SIZE, color: [0, 0, 0] }
}

fn svg_options() -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    if let Some(size) = usvg::Size::from_wh(DEFAULT_SVG_SIZE, DEFAULT_SVG_SIZE) {
        options.default_size = size;
    }
    options
}

/// Check well-formedness and the root element, then declare the SVG
/// namespace on the root if it has none.
fn with_svg_namespace(markup: &str) -> Result<Cow<'_, str>, EngineError> {
    let doc = roxmltree::Document::parse(markup)
        .map_err(|e| EngineError::InvalidUpload(format!("malformed svg: {e}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(EngineError::InvalidUpload("root element is not <svg>".into()));
    }
    if root.tag_name().namespace().is_some() {
        return Ok(Cow::Borrowed(markup));
    }
    let at = root.range().start + "<svg".len();
    Ok(Cow::Owned(format!("{} xmlns=\"{SVG_NAMESPACE}\"{}", &markup[..at], &markup[at..])))
}
