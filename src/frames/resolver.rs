use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Context as _;

use crate::foundation::{
    core::TimeKey,
    error::{TrackovlError, TrackovlResult},
};

/// One frame file whose name encodes a time key.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FrameEntry {
    /// Full path of the image.
    pub path: PathBuf,
    /// File name component, used to derive output names.
    pub file_name: String,
    /// Time key parsed from the name.
    pub time: TimeKey,
}

// Leftmost match puts the single captured character right before the full digit run.
static FRAME_NAME_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"(.)([0-9]+)\.([^.]+)$").expect("valid regex"));

/// Maps frame file names of the form `...<marker><digits>.<extension>` to time keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameResolver {
    marker: char,
    extension: String,
}

impl Default for FrameResolver {
    fn default() -> Self {
        Self {
            marker: 'T',
            extension: "png".to_string(),
        }
    }
}

impl FrameResolver {
    /// Resolver for a custom marker character and extension (without the dot).
    pub fn new(marker: char, extension: &str) -> TrackovlResult<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains('.') {
            return Err(TrackovlError::validation(
                "frame extension must be a single non-empty suffix",
            ));
        }
        if marker.is_ascii_digit() {
            return Err(TrackovlError::validation("frame time marker must not be a digit"));
        }
        Ok(Self {
            marker,
            extension: extension.to_string(),
        })
    }

    /// Marker character preceding the digit run.
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Extension (without the dot) frames must carry.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether `file_name` has the frame extension at all.
    pub fn is_candidate(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == self.extension)
    }

    /// Extract the time key encoded in `file_name`.
    pub fn time_key(&self, file_name: &str) -> TrackovlResult<TimeKey> {
        FRAME_NAME_RE
            .captures(file_name)
            .filter(|c| {
                c[1].chars().eq(std::iter::once(self.marker)) && &c[3] == self.extension
            })
            .map(|c| TimeKey::parse(&c[2]))
            .ok_or_else(|| {
                TrackovlError::naming_convention(format!(
                    "'{file_name}' does not end in '{}<digits>.{}'",
                    self.marker, self.extension
                ))
            })
    }

    /// Resolve one specifically requested frame; a missing file or a non-matching name fails.
    pub fn resolve_required(&self, path: &Path) -> TrackovlResult<FrameEntry> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TrackovlError::naming_convention(format!(
                    "'{}' has no usable file name",
                    path.display()
                ))
            })?
            .to_string();
        if !path.is_file() {
            return Err(TrackovlError::naming_convention(format!(
                "required frame '{}' does not exist",
                path.display()
            )));
        }
        let time = self.time_key(&file_name)?;
        Ok(FrameEntry {
            path: path.to_path_buf(),
            file_name,
            time,
        })
    }

    /// List frames in `dir`, sorted by file name.
    ///
    /// Entries that are not files, lack the frame extension, or do not encode a time key are
    /// skipped.
    pub fn scan_dir(&self, dir: &Path) -> TrackovlResult<Vec<FrameEntry>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("list image directory '{}'", dir.display()))?;

        let mut frames = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
            let path = entry.path();
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!(path = %path.display(), "skipping non-UTF-8 file name");
                continue;
            };
            if !self.is_candidate(&file_name) || !path.is_file() {
                continue;
            }
            match self.time_key(&file_name) {
                Ok(time) => frames.push(FrameEntry {
                    path,
                    file_name,
                    time,
                }),
                Err(err) => tracing::debug!(%file_name, %err, "skipping frame"),
            }
        }

        frames.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/resolver.rs"]
mod tests;
