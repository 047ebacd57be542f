//! Label rendering.
//!
//! Color validation is separate from text rasterization so callers can plug in their own
//! [`LabelPainter`](painter::LabelPainter).

pub(crate) mod annotate;
pub(crate) mod color;
pub(crate) mod painter;
pub(crate) mod svg_text;
