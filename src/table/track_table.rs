use std::{
    collections::BTreeMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::foundation::{
    core::{Position, TimeKey, TrackId},
    error::{TrackovlError, TrackovlResult},
};

/// Suffix identifying the tracking output inside a tracks directory.
pub const TRACKS_FILE_SUFFIX: &str = "_tracks.csv";

/// Header names of the four columns a track table is built from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrackColumns {
    /// Time / frame index column.
    pub time: String,
    /// Track identifier column.
    pub track_id: String,
    /// X position column.
    pub x: String,
    /// Y position column.
    pub y: String,
}

impl Default for TrackColumns {
    fn default() -> Self {
        Self {
            time: "Image_Metadata_T".to_string(),
            track_id: "track_id".to_string(),
            x: "objNuclei_Location_Center_X".to_string(),
            y: "objNuclei_Location_Center_Y".to_string(),
        }
    }
}

impl TrackColumns {
    fn names(&self) -> [&str; 4] {
        [&self.time, &self.track_id, &self.x, &self.y]
    }
}

/// All track positions recorded at one time index.
pub type TimeSlice = BTreeMap<TrackId, Position>;

/// Immutable `time -> track -> position` index.
///
/// Within a slice a repeated track id keeps the last row read; precedence between duplicates is
/// otherwise unspecified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackTable {
    slices: BTreeMap<TimeKey, TimeSlice>,
}

#[derive(Clone, Copy, Debug)]
struct ColumnIndex {
    time: usize,
    track_id: usize,
    x: usize,
    y: usize,
}

impl ColumnIndex {
    fn locate<S: AsRef<str>>(header: &[S], columns: &TrackColumns) -> TrackovlResult<Self> {
        let found: Vec<&str> = header
            .iter()
            .map(|h| h.as_ref().trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |name: &str| found.iter().position(|h| *h == name);

        if let (Some(time), Some(track_id), Some(x), Some(y)) = (
            find(columns.time.as_str()),
            find(columns.track_id.as_str()),
            find(columns.x.as_str()),
            find(columns.y.as_str()),
        ) {
            return Ok(Self {
                time,
                track_id,
                x,
                y,
            });
        }

        let missing: Vec<&str> = columns
            .names()
            .into_iter()
            .filter(|name| find(*name).is_none())
            .collect();
        Err(TrackovlError::schema(format!(
            "missing column(s) {}; expected: {}; found: {}",
            missing.join(", "),
            columns.names().join(", "),
            found.join(", ")
        )))
    }
}

impl TrackTable {
    /// Build a table from a header and data rows.
    ///
    /// Fails with [`TrackovlError::Schema`] if any of the four named columns is absent from
    /// `header`, and with [`TrackovlError::Parse`] if a row is short or a position is not a finite
    /// floating-point number. Extra columns are ignored.
    pub fn build<S, R>(
        header: &[S],
        rows: impl IntoIterator<Item = R>,
        columns: &TrackColumns,
    ) -> TrackovlResult<Self>
    where
        S: AsRef<str>,
        R: AsRef<[S]>,
    {
        let idx = ColumnIndex::locate(header, columns)?;
        let mut slices = BTreeMap::new();
        for (i, row) in rows.into_iter().enumerate() {
            insert_row(&mut slices, idx, columns, i + 1, row.as_ref())?;
        }
        Ok(Self { slices })
    }

    /// Build a table from CSV text with a header line.
    ///
    /// Fields past the header's width are ignored; short rows are a parse error.
    pub fn from_reader<Rd: Read>(reader: Rd, columns: &TrackColumns) -> TrackovlResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let header: Vec<String> = rdr
            .headers()
            .context("read track table header")?
            .iter()
            .map(str::to_string)
            .collect();
        let idx = ColumnIndex::locate(&header, columns)?;

        let mut slices = BTreeMap::new();
        for (i, record) in rdr.records().enumerate() {
            let row_no = i + 1;
            let record = record.with_context(|| format!("read track table row {row_no}"))?;
            let fields: Vec<&str> = record.iter().collect();
            insert_row(&mut slices, idx, columns, row_no, &fields)?;
        }

        Ok(Self { slices })
    }

    /// Open and parse a CSV track table.
    #[tracing::instrument(skip(columns), fields(path = %path.display()))]
    pub fn from_path(path: &Path, columns: &TrackColumns) -> TrackovlResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open track table '{}'", path.display()))?;
        let table = Self::from_reader(std::io::BufReader::new(f), columns)?;
        tracing::debug!(
            times = table.len(),
            records = table.record_count(),
            "track table loaded"
        );
        Ok(table)
    }

    /// All track positions at `time`.
    pub fn time_slice(&self, time: &TimeKey) -> TrackovlResult<&TimeSlice> {
        self.slices
            .get(time)
            .ok_or_else(|| TrackovlError::lookup(format!("time {time} not in track table")))
    }

    /// Position of one track at one time.
    pub fn position(&self, time: &TimeKey, track: &TrackId) -> TrackovlResult<Position> {
        self.time_slice(time)?
            .get(track)
            .copied()
            .ok_or_else(|| TrackovlError::lookup(format!("track {track} not found at time {time}")))
    }

    /// Whether any row was recorded at `time`.
    pub fn contains_time(&self, time: &TimeKey) -> bool {
        self.slices.contains_key(time)
    }

    /// Time keys in ascending order.
    pub fn times(&self) -> impl Iterator<Item = &TimeKey> {
        self.slices.keys()
    }

    /// Number of time slices.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// `true` when no rows were read.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Number of stored `(time, track)` entries.
    pub fn record_count(&self) -> usize {
        self.slices.values().map(BTreeMap::len).sum()
    }
}

fn insert_row<S: AsRef<str>>(
    slices: &mut BTreeMap<TimeKey, TimeSlice>,
    idx: ColumnIndex,
    columns: &TrackColumns,
    row_no: usize,
    fields: &[S],
) -> TrackovlResult<()> {
    let time = TimeKey::parse(field(fields, idx.time, &columns.time, row_no)?);
    let track = TrackId::from(field(fields, idx.track_id, &columns.track_id, row_no)?);
    let pos = Position::new(
        coord(fields, idx.x, &columns.x, row_no)?,
        coord(fields, idx.y, &columns.y, row_no)?,
    );

    slices.entry(time).or_default().insert(track, pos);
    Ok(())
}

fn field<'a, S: AsRef<str>>(
    fields: &'a [S],
    i: usize,
    name: &str,
    row_no: usize,
) -> TrackovlResult<&'a str> {
    fields.get(i).map(|s| s.as_ref()).ok_or_else(|| {
        TrackovlError::parse(format!(
            "row {row_no}: missing value for column '{name}' ({} field(s))",
            fields.len()
        ))
    })
}

fn coord<S: AsRef<str>>(fields: &[S], i: usize, name: &str, row_no: usize) -> TrackovlResult<f64> {
    let raw = field(fields, i, name, row_no)?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TrackovlError::parse(format!(
            "row {row_no}: column '{name}' value '{raw}' is not a finite number"
        ))),
    }
}

/// Locate the tracking output (`*_tracks.csv`) inside `dir`.
///
/// Entries are examined in file name order so the choice is stable when several match.
pub fn find_tracks_file(dir: &Path) -> TrackovlResult<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("list tracks directory '{}'", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(TRACKS_FILE_SUFFIX) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    names.first().map(|n| dir.join(n)).ok_or_else(|| {
        TrackovlError::naming_convention(format!(
            "no file ending in '{TRACKS_FILE_SUFFIX}' in '{}'",
            dir.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/table/track_table.rs"]
mod tests;
