use crate::{
    foundation::{
        core::{Position, Shift},
        error::{TrackovlError, TrackovlResult},
    },
    geometry::clamp::label_anchor,
    raster::frame::ImageFrame,
    render::{
        color::{DefaultColorPolicy, FillSpec, validate_fill},
        painter::LabelPainter,
    },
};

/// Labels bound to positions, ready to be drawn onto one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationJob {
    items: Vec<(Position, String)>,
    shift: Shift,
    fill: FillSpec,
}

impl AnnotationJob {
    /// Pair `positions` with `labels` by index; both must have the same length.
    pub fn new(
        positions: Vec<Position>,
        labels: Vec<String>,
        shift: Shift,
        fill: FillSpec,
    ) -> TrackovlResult<Self> {
        if positions.len() != labels.len() {
            return Err(TrackovlError::arity(format!(
                "{} positions but {} labels",
                positions.len(),
                labels.len()
            )));
        }
        Ok(Self {
            items: positions.into_iter().zip(labels).collect(),
            shift,
            fill,
        })
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Draw every label onto `frame` and return it.
    ///
    /// Palette and native frames are normalized first. The fill is checked before the first draw,
    /// so a bad color leaves nothing half-drawn.
    pub fn apply<P: LabelPainter + ?Sized>(
        &self,
        frame: ImageFrame,
        policy: DefaultColorPolicy,
        painter: &P,
    ) -> TrackovlResult<ImageFrame> {
        let mut frame = frame.normalize();
        let fill = validate_fill(frame.mode(), &self.fill, policy)?;
        for (pos, label) in &self.items {
            let anchor = label_anchor(*pos, self.shift);
            painter.draw_label(&mut frame, anchor, label, fill)?;
        }
        Ok(frame)
    }
}

/// Annotate a copy of `frame`; the input is left untouched.
#[tracing::instrument(skip_all, fields(labels = labels.len()))]
pub fn render<P: LabelPainter + ?Sized>(
    frame: &ImageFrame,
    positions: &[Position],
    labels: &[String],
    shift: Shift,
    fill: &FillSpec,
    policy: DefaultColorPolicy,
    painter: &P,
) -> TrackovlResult<ImageFrame> {
    let job = AnnotationJob::new(positions.to_vec(), labels.to_vec(), shift, fill.clone())?;
    job.apply(frame.clone(), policy, painter)
}

#[cfg(test)]
#[path = "../../tests/unit/render/annotate.rs"]
mod tests;
