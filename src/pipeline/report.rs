use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    foundation::{
        core::TrackId,
        error::{TrackovlError, TrackovlResult},
    },
    frames::resolver::FrameEntry,
};

/// How a batch walks its frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOpts {
    /// Process frames on a `rayon` pool instead of one after the other.
    pub parallel: bool,
    /// Pool size when `parallel`; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// One item a batch skipped instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SkipNote {
    /// Frame file name.
    pub file: String,
    /// Track the miss concerns, when it is track specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackId>,
    /// Display text of the error.
    pub error: String,
}

/// Outcome of a batch run, in frame file-name order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchReport {
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Items skipped with their reason.
    pub skipped: Vec<SkipNote>,
}

impl BatchReport {
    /// True when nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> TrackovlResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create report dir '{}'", parent.display()))?;
        }
        let f = std::fs::File::create(path)
            .with_context(|| format!("create report '{}'", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(f), self)
            .with_context(|| format!("write report '{}'", path.display()))?;
        Ok(())
    }

    pub(crate) fn skip(&mut self, file: &str, track: Option<&TrackId>, err: &TrackovlError) {
        self.skipped.push(SkipNote {
            file: file.to_string(),
            track: track.cloned(),
            error: err.to_string(),
        });
    }

    fn absorb(&mut self, other: Self) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
    }
}

/// Create the output directory of a batch if needed.
pub(crate) fn ensure_out_dir(dir: &Path) -> TrackovlResult<()> {
    if !dir.is_dir() {
        tracing::info!(dir = %dir.display(), "creating output directory");
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    Ok(())
}

/// Run `work` on every frame and fold the per-frame reports.
///
/// A recoverable error skips its frame; any other error ends the batch and is returned.
pub(crate) fn run_frames<F>(
    frames: &[FrameEntry],
    opts: &BatchOpts,
    work: F,
) -> TrackovlResult<BatchReport>
where
    F: Fn(&FrameEntry) -> TrackovlResult<BatchReport> + Sync,
{
    run_frames_with(frames, opts, TrackovlError::is_recoverable, work)
}

/// [`run_frames`] with a custom test for which errors merely skip a frame.
pub(crate) fn run_frames_with<F, K>(
    frames: &[FrameEntry],
    opts: &BatchOpts,
    skippable: K,
    work: F,
) -> TrackovlResult<BatchReport>
where
    F: Fn(&FrameEntry) -> TrackovlResult<BatchReport> + Sync,
    K: Fn(&TrackovlError) -> bool,
{
    let mut report = BatchReport::default();

    if !opts.parallel {
        for entry in frames {
            fold(&mut report, entry, work(entry), &skippable)?;
        }
        return Ok(report);
    }

    let pool = build_thread_pool(opts.threads)?;
    let results: Vec<TrackovlResult<BatchReport>> =
        pool.install(|| frames.par_iter().map(&work).collect());
    for (entry, res) in frames.iter().zip(results) {
        fold(&mut report, entry, res, &skippable)?;
    }
    Ok(report)
}

fn fold(
    report: &mut BatchReport,
    entry: &FrameEntry,
    res: TrackovlResult<BatchReport>,
    skippable: &impl Fn(&TrackovlError) -> bool,
) -> TrackovlResult<()> {
    match res {
        Ok(r) => report.absorb(r),
        Err(e) if skippable(&e) => {
            tracing::warn!(file = %entry.file_name, error = %e, "skipping frame");
            report.skip(&entry.file_name, None, &e);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> TrackovlResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TrackovlError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TrackovlError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/report.rs"]
mod tests;
