//! trackovl joins cell-tracking tables with microscopy image sequences.
//!
//! Given a `*_tracks.csv` table (time, track id, x, y per row) and a directory of frames whose
//! names end in `T<digits>.<ext>`, it can:
//!
//! - **overlay** each frame with the ids of the tracks present at its time ([`annotate_directory`])
//! - **crop** a fixed-size region around chosen tracks, or around one fixed pixel, in every frame
//!   ([`crop_directory`])
//!
//! # Pipeline overview
//!
//! 1. **Index**: CSV rows -> [`TrackTable`] (`time -> track -> position`)
//! 2. **Resolve**: frame file names -> [`TimeKey`]s via [`FrameResolver`]
//! 3. **Place**: positions -> label anchors ([`label_anchor`]) or clamped crop boxes
//!    ([`clamp_crop`])
//! 4. **Draw / cut**: [`render`] labels through a [`LabelPainter`], or [`ImageFrame::crop`]
//!
//! Batch entry points skip per-frame misses (absent time, absent track, unreadable frame) and
//! list them in a [`BatchReport`]; invalid input such as a bad color fails before any frame is
//! written.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod foundation;
mod frames;
mod geometry;
mod pipeline;
mod raster;
mod render;
mod table;

pub use config::overlay::{DEFAULT_SHIFT, OverlayConfig, PartialOverlayConfig, parse_shift};
pub use foundation::core::{CropBox, CropRadii, LabelAnchor, Position, Shift, TimeKey, TrackId};
pub use foundation::error::{TrackovlError, TrackovlResult};
pub use frames::resolver::{FrameEntry, FrameResolver};
pub use geometry::clamp::{clamp_crop, label_anchor};
pub use pipeline::crop::{CropMode, CropOptions, crop_directory, fixed_crop_name, track_crop_name};
pub use pipeline::overlay::{OVERLAY_PREFIX, annotate_directory};
pub use pipeline::report::{BatchOpts, BatchReport, SkipNote};
pub use raster::frame::{ColorMode, ImageFrame, Raster};
pub use render::annotate::{AnnotationJob, render};
pub use render::color::{DefaultColorPolicy, Fill, FillSpec, validate_fill};
pub use render::painter::LabelPainter;
pub use render::svg_text::{DEFAULT_FONT_SIZE_PX, SvgLabelPainter};
pub use table::track_table::{
    TRACKS_FILE_SUFFIX, TimeSlice, TrackColumns, TrackTable, find_tracks_file,
};
