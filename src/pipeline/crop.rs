use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        core::{CropRadii, Position, TrackId},
        error::{TrackovlError, TrackovlResult},
    },
    frames::resolver::{FrameEntry, FrameResolver},
    geometry::clamp::clamp_crop,
    pipeline::report::{BatchOpts, BatchReport, ensure_out_dir, run_frames, run_frames_with},
    raster::frame::ImageFrame,
    table::track_table::{TrackColumns, TrackTable},
};

/// Which crops to cut from each frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CropMode {
    /// Around each listed track, at every frame where it is present.
    Tracks(Vec<TrackId>),
    /// Around one pixel, in every frame.
    Fixed {
        /// Column.
        x: i64,
        /// Row.
        y: i64,
    },
}

impl CropMode {
    /// Pick the mode from the user's inputs.
    ///
    /// A fixed position wins over track ids when both are given; a warning is logged and the ids
    /// are ignored. Giving neither is a validation error.
    pub fn select(track_ids: Vec<TrackId>, fixed: Option<(i64, i64)>) -> TrackovlResult<Self> {
        match (fixed, track_ids.is_empty()) {
            (Some((x, y)), empty) => {
                if !empty {
                    tracing::warn!(
                        tracks = track_ids.len(),
                        "both a position and track ids were given; cropping around the position only"
                    );
                }
                Ok(Self::Fixed { x, y })
            }
            (None, false) => Ok(Self::Tracks(track_ids)),
            (None, true) => Err(TrackovlError::validation(
                "neither a crop position nor any track id was given",
            )),
        }
    }
}

/// Settings for cropping an image directory. Directories are relative to `work_dir` unless
/// absolute.
#[derive(Clone, Debug, PartialEq)]
pub struct CropOptions {
    /// Base directory.
    pub work_dir: PathBuf,
    /// Directory holding the `*_tracks.csv` table.
    pub tracks_dir: PathBuf,
    /// Directory holding the frames.
    pub images_dir: PathBuf,
    /// Directory receiving crops.
    pub out_dir: PathBuf,
    /// Track table column names.
    pub columns: TrackColumns,
    /// Extent kept on each side of the center.
    pub radii: CropRadii,
    /// Tracks to follow.
    pub track_ids: Vec<TrackId>,
    /// Fixed center; takes precedence over `track_ids`.
    pub fixed: Option<(i64, i64)>,
}

impl CropOptions {
    /// Whether cropping follows tracks, so a track table has to be loaded.
    pub fn wants_table(&self) -> bool {
        self.fixed.is_none() && !self.track_ids.is_empty()
    }

    /// Tracks directory joined onto the work directory.
    pub fn tracks_path(&self) -> PathBuf {
        self.work_dir.join(&self.tracks_dir)
    }

    /// Images directory joined onto the work directory.
    pub fn images_path(&self) -> PathBuf {
        self.work_dir.join(&self.images_dir)
    }

    /// Output directory joined onto the work directory.
    pub fn out_path(&self) -> PathBuf {
        self.work_dir.join(&self.out_dir)
    }
}

/// Output name of a track crop.
pub fn track_crop_name(track: &TrackId, file_name: &str) -> String {
    format!("{track}_{file_name}")
}

/// Output name of a fixed-position crop.
pub fn fixed_crop_name(x: i64, y: i64, file_name: &str) -> String {
    format!("x{x}_y{y}_{file_name}")
}

/// Crop every frame of `opts.images_path()` into `opts.out_path()`.
///
/// In track mode a track absent from a frame, or whose center lies outside it, is skipped and
/// reported. In fixed mode a center outside any frame ends the batch with
/// [`TrackovlError::OutOfBounds`].
#[tracing::instrument(skip_all, fields(images = %opts.images_path().display()))]
pub fn crop_directory(
    opts: &CropOptions,
    table: Option<&TrackTable>,
    resolver: &FrameResolver,
    batch: &BatchOpts,
) -> TrackovlResult<BatchReport> {
    let mode = CropMode::select(opts.track_ids.clone(), opts.fixed)?;
    let frames = resolver.scan_dir(&opts.images_path())?;
    let out_dir = opts.out_path();

    let report = match &mode {
        CropMode::Tracks(ids) => {
            let table = table.ok_or_else(|| {
                TrackovlError::validation("cropping by track id needs a track table")
            })?;
            ensure_out_dir(&out_dir)?;
            run_frames(&frames, batch, |entry| {
                crop_tracks(entry, ids, table, opts.radii, &out_dir)
            })?
        }
        CropMode::Fixed { x, y } => {
            check_fixed_center(&frames, *x, *y, opts.radii)?;
            ensure_out_dir(&out_dir)?;
            run_frames_with(
                &frames,
                batch,
                |e| e.is_recoverable() && !matches!(e, TrackovlError::OutOfBounds(_)),
                |entry| crop_fixed(entry, *x, *y, opts.radii, &out_dir),
            )?
        }
    };

    tracing::info!(
        frames = frames.len(),
        written = report.written.len(),
        skipped = report.skipped.len(),
        "crop finished"
    );
    Ok(report)
}

fn crop_tracks(
    entry: &FrameEntry,
    ids: &[TrackId],
    table: &TrackTable,
    radii: CropRadii,
    out_dir: &Path,
) -> TrackovlResult<BatchReport> {
    let slice = table.time_slice(&entry.time)?;
    let mut report = BatchReport::default();
    let mut frame: Option<ImageFrame> = None;

    for id in ids {
        let Some(pos) = slice.get(id) else {
            let err =
                TrackovlError::lookup(format!("track {id} not found at time {}", entry.time));
            tracing::warn!(file = %entry.file_name, track = %id, "track not found, skipping");
            report.skip(&entry.file_name, Some(id), &err);
            continue;
        };

        match crop_track(entry, id, *pos, &mut frame, radii, out_dir) {
            Ok(out) => report.written.push(out),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(
                    file = %entry.file_name,
                    track = %id,
                    error = %err,
                    "skipping crop"
                );
                report.skip(&entry.file_name, Some(id), &err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

// The frame is decoded on the first track present in it and reused for the rest.
fn crop_track(
    entry: &FrameEntry,
    id: &TrackId,
    center: Position,
    frame: &mut Option<ImageFrame>,
    radii: CropRadii,
    out_dir: &Path,
) -> TrackovlResult<PathBuf> {
    let img = match frame.take() {
        Some(img) => img,
        None => ImageFrame::open(&entry.path)?,
    };
    let img = frame.insert(img);

    let b = clamp_crop(center, radii, img.width(), img.height())?;
    let out = out_dir.join(track_crop_name(id, &entry.file_name));
    img.crop(b)?.save(&out)?;
    tracing::debug!(file = %out.display(), "wrote crop");
    Ok(out)
}

/// Fail before anything is written when the fixed center misses any frame.
///
/// Only image headers are read; frames that cannot be probed are left to the batch, which skips
/// them.
fn check_fixed_center(
    frames: &[FrameEntry],
    x: i64,
    y: i64,
    radii: CropRadii,
) -> TrackovlResult<()> {
    let center = Position::new(x as f64, y as f64);
    for entry in frames {
        let Ok((w, h)) = image::image_dimensions(&entry.path) else {
            continue;
        };
        clamp_crop(center, radii, w, h).map_err(|e| fixed_out_of_bounds(entry, x, y, w, h, &e))?;
    }
    Ok(())
}

fn fixed_out_of_bounds(
    entry: &FrameEntry,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    err: &TrackovlError,
) -> TrackovlError {
    TrackovlError::out_of_bounds(format!(
        "fixed crop position ({x}, {y}) does not fit {} ({w}x{h}): {err}",
        entry.file_name
    ))
}

fn crop_fixed(
    entry: &FrameEntry,
    x: i64,
    y: i64,
    radii: CropRadii,
    out_dir: &Path,
) -> TrackovlResult<BatchReport> {
    let img = ImageFrame::open(&entry.path)?;
    let (w, h) = (img.width(), img.height());
    let center = Position::new(x as f64, y as f64);
    let b = clamp_crop(center, radii, w, h)
        .map_err(|e| fixed_out_of_bounds(entry, x, y, w, h, &e))?;

    let out = out_dir.join(fixed_crop_name(x, y, &entry.file_name));
    img.crop(b)?.save(&out)?;
    tracing::debug!(file = %out.display(), "wrote crop");
    Ok(BatchReport {
        written: vec![out],
        skipped: Vec::new(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/crop.rs"]
mod tests;
