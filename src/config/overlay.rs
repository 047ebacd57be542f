use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Shift, TrackId, parse_int_list},
        error::{TrackovlError, TrackovlResult},
    },
    render::color::FillSpec,
    table::track_table::TrackColumns,
};

/// Label offset used when none is configured.
pub const DEFAULT_SHIFT: Shift = Shift { dx: -4, dy: -5 };

/// Fully resolved settings for annotating an image directory.
///
/// `tracks_dir`, `images_dir` and `out_dir` are interpreted relative to `work_dir` unless
/// absolute; use the `*_path` accessors to get the joined paths.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Base directory for the three relative directories below.
    pub work_dir: PathBuf,
    /// Directory holding the `*_tracks.csv` table.
    pub tracks_dir: PathBuf,
    /// Directory holding the frames to annotate.
    pub images_dir: PathBuf,
    /// Directory receiving annotated frames.
    pub out_dir: PathBuf,
    /// Track table column names.
    pub columns: TrackColumns,
    /// Offset applied to every label anchor.
    pub shift: Shift,
    /// Label color.
    pub font_color: FillSpec,
    /// Annotate only these tracks; `None` means every track of each time slice.
    pub track_filter: Option<Vec<TrackId>>,
}

impl OverlayConfig {
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

/// Overlay settings from one source, every field optional.
///
/// Built from the command line or from a config file, combined with [`merge`](Self::merge) and
/// turned into an [`OverlayConfig`] with [`resolve`](Self::resolve).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialOverlayConfig {
    /// See [`OverlayConfig::work_dir`].
    pub work_dir: Option<PathBuf>,
    /// See [`OverlayConfig::tracks_dir`].
    pub tracks_dir: Option<PathBuf>,
    /// See [`OverlayConfig::images_dir`].
    pub images_dir: Option<PathBuf>,
    /// See [`OverlayConfig::out_dir`].
    pub out_dir: Option<PathBuf>,
    /// Time column name.
    pub time_column: Option<String>,
    /// Track id column name.
    pub id_column: Option<String>,
    /// X position column name.
    pub x_column: Option<String>,
    /// Y position column name.
    pub y_column: Option<String>,
    /// See [`OverlayConfig::shift`].
    pub shift: Option<Shift>,
    /// See [`OverlayConfig::font_color`].
    pub font_color: Option<FillSpec>,
    /// See [`OverlayConfig::track_filter`].
    pub track_filter: Option<Vec<TrackId>>,
}

impl PartialOverlayConfig {
    /// Read a `parameter,value` CSV config file.
    pub fn from_config_file(path: &Path) -> TrackovlResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open config file '{}'", path.display()))?;
        Self::from_config_reader(f)
    }

    /// Read `parameter,value` CSV rows.
    ///
    /// Recognized parameters are `path_wd`, `dir_lapout`, `dir_segmented`, `dir_overlay`,
    /// `column_frame`, `column_trackid`, `column_posx`, `column_posy`, `overlay_shift` and
    /// `overlay_color`. Others are ignored. Empty values count as unset.
    pub fn from_config_reader<R: Read>(reader: R) -> TrackovlResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let header = rdr.headers().context("read config header")?.clone();
        let col = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| {
                    TrackovlError::schema(format!(
                        "config file needs a '{name}' column; found: {}",
                        header.iter().collect::<Vec<_>>().join(", ")
                    ))
                })
        };
        let (pi, vi) = (col("parameter")?, col("value")?);

        let mut out = Self::default();
        for rec in rdr.records() {
            let rec = rec.context("read config row")?;
            let key = rec.get(pi).unwrap_or_default().trim();
            let value = rec.get(vi).unwrap_or_default().trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            out.set_param(key, value)?;
        }
        Ok(out)
    }

    fn set_param(&mut self, key: &str, value: &str) -> TrackovlResult<()> {
        match key {
            "path_wd" => self.work_dir = Some(PathBuf::from(value)),
            "dir_lapout" => self.tracks_dir = Some(PathBuf::from(value)),
            "dir_segmented" => self.images_dir = Some(PathBuf::from(value)),
            "dir_overlay" => self.out_dir = Some(PathBuf::from(value)),
            "column_frame" => self.time_column = Some(value.to_string()),
            "column_trackid" => self.id_column = Some(value.to_string()),
            "column_posx" => self.x_column = Some(value.to_string()),
            "column_posy" => self.y_column = Some(value.to_string()),
            "overlay_shift" => self.shift = Some(parse_shift(value)?),
            "overlay_color" => self.font_color = Some(FillSpec::parse(value)?),
            other => tracing::debug!(parameter = other, "ignoring config parameter"),
        }
        Ok(())
    }

    /// Combine two sources: fields set in `self` win over `fallback`.
    pub fn merge(self, fallback: Self) -> Self {
        Self {
            work_dir: self.work_dir.or(fallback.work_dir),
            tracks_dir: self.tracks_dir.or(fallback.tracks_dir),
            images_dir: self.images_dir.or(fallback.images_dir),
            out_dir: self.out_dir.or(fallback.out_dir),
            time_column: self.time_column.or(fallback.time_column),
            id_column: self.id_column.or(fallback.id_column),
            x_column: self.x_column.or(fallback.x_column),
            y_column: self.y_column.or(fallback.y_column),
            shift: self.shift.or(fallback.shift),
            font_color: self.font_color.or(fallback.font_color),
            track_filter: self.track_filter.or(fallback.track_filter),
        }
    }

    /// Fill defaults and check that every directory is known.
    pub fn resolve(self) -> TrackovlResult<OverlayConfig> {
        let defaults = TrackColumns::default();
        Ok(OverlayConfig {
            work_dir: required(self.work_dir, "-d/--work-dir", "path_wd")?,
            tracks_dir: required(self.tracks_dir, "-k/--tracks-dir", "dir_lapout")?,
            images_dir: required(self.images_dir, "-m/--images-dir", "dir_segmented")?,
            out_dir: required(self.out_dir, "-o/--out-dir", "dir_overlay")?,
            columns: TrackColumns {
                time: self.time_column.unwrap_or(defaults.time),
                track_id: self.id_column.unwrap_or(defaults.track_id),
                x: self.x_column.unwrap_or(defaults.x),
                y: self.y_column.unwrap_or(defaults.y),
            },
            shift: self.shift.unwrap_or(DEFAULT_SHIFT),
            font_color: self.font_color.unwrap_or_default(),
            track_filter: self.track_filter,
        })
    }
}

fn required(v: Option<PathBuf>, flag: &str, param: &str) -> TrackovlResult<PathBuf> {
    v.ok_or_else(|| {
        TrackovlError::validation(format!(
            "missing {param}: pass {flag} or set '{param}' in the config file"
        ))
    })
}

/// Parse a label shift written as `(dx,dy)`, `dx dy`, ...
pub fn parse_shift(raw: &str) -> TrackovlResult<Shift> {
    let v = parse_int_list(raw)?;
    let [dx, dy] = v.as_slice() else {
        return Err(TrackovlError::parse(format!(
            "shift '{raw}' must hold exactly 2 integers"
        )));
    };
    let to_i32 = |n: i64| {
        i32::try_from(n).map_err(|_| TrackovlError::parse(format!("shift value {n} is too large")))
    };
    Ok(Shift::new(to_i32(*dx)?, to_i32(*dy)?))
}

#[cfg(test)]
#[path = "../../tests/unit/config/overlay.rs"]
mod tests;
