use std::fmt;

use crate::foundation::error::{TrackovlError, TrackovlResult};

/// Time index shared by track rows and frame file names.
///
/// Integer-looking keys are stored numerically so that `"5"`, `"05"` and the file name digit run
/// `"0005"` address the same time slice. Anything else is kept as a label.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(untagged)]
pub enum TimeKey {
    /// Non-negative integer frame index.
    Index(u64),
    /// Non-numeric time label, trimmed.
    Label(String),
}

impl TimeKey {
    /// Parse a raw table cell or file name fragment into a key.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<u64>() {
                return Self::Index(n);
            }
        }
        Self::Label(s.to_string())
    }
}

impl From<u64> for TimeKey {
    fn from(n: u64) -> Self {
        Self::Index(n)
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(n) => write!(f, "{n}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

/// Opaque track identifier, unique within one time slice.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracked object position in image pixel coordinates.
///
/// Kept as floating point; truncation happens where pixels are addressed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// Column coordinate.
    pub x: f64,
    /// Row coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Constant pixel offset applied to every label anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Shift {
    /// Horizontal offset.
    pub dx: i32,
    /// Vertical offset.
    pub dy: i32,
}

impl Shift {
    /// Create a shift.
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Requested crop extent on each side of a center point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRadii {
    /// Pixels kept left of the center.
    pub left: u32,
    /// Pixels kept right of the center.
    pub right: u32,
    /// Pixels kept above the center.
    pub top: u32,
    /// Pixels kept below the center.
    pub bottom: u32,
}

impl CropRadii {
    /// Same radius on all four sides.
    pub fn uniform(r: u32) -> Self {
        Self {
            left: r,
            right: r,
            top: r,
            bottom: r,
        }
    }
}

impl Default for CropRadii {
    fn default() -> Self {
        Self::uniform(25)
    }
}

/// Absolute crop rectangle, `left < right <= width` and `top < bottom <= height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CropBox {
    /// Inclusive left column.
    pub left: u32,
    /// Inclusive top row.
    pub top: u32,
    /// Exclusive right column.
    pub right: u32,
    /// Exclusive bottom row.
    pub bottom: u32,
}

impl CropBox {
    /// Width of the region in pixels.
    pub fn width(self) -> u32 {
        self.right - self.left
    }

    /// Height of the region in pixels.
    pub fn height(self) -> u32 {
        self.bottom - self.top
    }
}

/// Integer pixel where the top-left corner of a label is placed. May lie off-frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct LabelAnchor {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// Parse an integer tuple written as `(a,b)`, `[a, b]`, `a b`, `a,b` or a bare `a`.
///
/// Surrounding quotes and one trailing comma (`(-1,)`) are tolerated.
pub(crate) fn parse_int_list(raw: &str) -> TrackovlResult<Vec<i64>> {
    let s = raw.trim().trim_matches(|c: char| c == '\'' || c == '"').trim();
    let inner = s
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .or_else(|| s.strip_prefix('[').and_then(|r| r.strip_suffix(']')))
        .unwrap_or(s);

    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(TrackovlError::parse(format!("'{raw}' holds no integers")));
    }
    parts
        .into_iter()
        .map(|p| {
            p.parse::<i64>()
                .map_err(|_| TrackovlError::parse(format!("'{p}' in '{raw}' is not an integer")))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
