use std::path::{Path, PathBuf};

use crate::{
    config::overlay::OverlayConfig,
    foundation::{
        core::{Position, TrackId},
        error::{TrackovlError, TrackovlResult},
    },
    frames::resolver::{FrameEntry, FrameResolver},
    pipeline::report::{BatchOpts, BatchReport, ensure_out_dir, run_frames},
    raster::frame::ImageFrame,
    render::{annotate::render, color::DefaultColorPolicy, painter::LabelPainter},
    table::track_table::{TimeSlice, TrackTable},
};

/// Prefix of annotated output file names.
pub const OVERLAY_PREFIX: &str = "ovl_";

/// Annotate every frame of `config.images_path()` with the ids of the tracks present at its
/// time, writing `ovl_<file name>` into `config.out_path()`.
///
/// Frames whose time is missing from `table`, and filtered tracks missing from a slice, are
/// reported in the returned [`BatchReport`] and skipped.
#[tracing::instrument(skip_all, fields(images = %config.images_path().display()))]
pub fn annotate_directory<P: LabelPainter + ?Sized>(
    config: &OverlayConfig,
    table: &TrackTable,
    resolver: &FrameResolver,
    painter: &P,
    opts: &BatchOpts,
) -> TrackovlResult<BatchReport> {
    config.font_color.check_shape()?;

    let frames = resolver.scan_dir(&config.images_path())?;
    let out_dir = config.out_path();
    ensure_out_dir(&out_dir)?;

    let report = run_frames(&frames, opts, |entry| {
        let slice = table.time_slice(&entry.time)?;
        let mut report = BatchReport::default();
        let (positions, labels) =
            select_tracks(slice, config.track_filter.as_deref(), entry, &mut report);

        match annotate_frame(entry, &positions, &labels, config, painter, &out_dir) {
            Ok(out) => report.written.push(out),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(file = %entry.file_name, error = %err, "skipping frame");
                report.skip(&entry.file_name, None, &err);
            }
            Err(err) => return Err(err),
        }
        Ok(report)
    })?;

    tracing::info!(
        frames = frames.len(),
        written = report.written.len(),
        skipped = report.skipped.len(),
        "overlay finished"
    );
    Ok(report)
}

fn annotate_frame<P: LabelPainter + ?Sized>(
    entry: &FrameEntry,
    positions: &[Position],
    labels: &[String],
    config: &OverlayConfig,
    painter: &P,
    out_dir: &Path,
) -> TrackovlResult<PathBuf> {
    let frame = ImageFrame::open(&entry.path)?;
    let annotated = render(
        &frame,
        positions,
        labels,
        config.shift,
        &config.font_color,
        DefaultColorPolicy::default(),
        painter,
    )?;

    let out = out_dir.join(format!("{OVERLAY_PREFIX}{}", entry.file_name));
    annotated.save(&out)?;
    tracing::debug!(file = %out.display(), labels = labels.len(), "wrote annotated frame");
    Ok(out)
}

fn select_tracks(
    slice: &TimeSlice,
    filter: Option<&[TrackId]>,
    entry: &FrameEntry,
    report: &mut BatchReport,
) -> (Vec<Position>, Vec<String>) {
    let Some(ids) = filter else {
        return slice
            .iter()
            .map(|(id, pos)| (*pos, id.to_string()))
            .unzip();
    };

    let mut picked = (Vec::new(), Vec::new());
    for id in ids {
        match slice.get(id) {
            Some(pos) => {
                picked.0.push(*pos);
                picked.1.push(id.to_string());
            }
            None => {
                let err = TrackovlError::lookup(format!(
                    "track {id} not found at time {}",
                    entry.time
                ));
                tracing::warn!(file = %entry.file_name, track = %id, "track not found, skipping");
                report.skip(&entry.file_name, Some(id), &err);
            }
        }
    }
    picked
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/overlay.rs"]
mod tests;
