use crate::{
    foundation::{core::LabelAnchor, error::TrackovlResult},
    raster::frame::ImageFrame,
    render::color::Fill,
};

/// Draws short text labels onto frames.
///
/// `anchor` is the top-left corner of the label and may lie partly or fully off-frame; pixels
/// outside the frame are dropped. `fill` has already been validated against `frame`.
///
/// Implementations are shared across worker threads when batches run in parallel.
pub trait LabelPainter: Sync {
    /// Draw `text` onto `frame` at `anchor`.
    fn draw_label(
        &self,
        frame: &mut ImageFrame,
        anchor: LabelAnchor,
        text: &str,
        fill: Fill,
    ) -> TrackovlResult<()>;
}

impl<P: LabelPainter + ?Sized> LabelPainter for &P {
    fn draw_label(
        &self,
        frame: &mut ImageFrame,
        anchor: LabelAnchor,
        text: &str,
        fill: Fill,
    ) -> TrackovlResult<()> {
        (**self).draw_label(frame, anchor, text, fill)
    }
}
