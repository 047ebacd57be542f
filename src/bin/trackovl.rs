use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use trackovl::{
    BatchOpts, BatchReport, CropOptions, CropRadii, FillSpec, FrameResolver, PartialOverlayConfig,
    Shift, SvgLabelPainter, TrackColumns, TrackId, TrackTable,
};

#[derive(Parser, Debug)]
#[command(name = "trackovl", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write every frame with the ids of the tracks present at its time.
    Overlay(OverlayArgs),
    /// Cut a region around tracks, or around a fixed position, out of every frame.
    Crop(CropArgs),
}

#[derive(Args, Debug)]
struct ColumnArgs {
    /// Name of the time column in the tracks table.
    #[arg(short = 't', long = "time-col")]
    time_col: Option<String>,

    /// Name of the track id column in the tracks table.
    #[arg(short = 'i', long = "id-col")]
    id_col: Option<String>,

    /// Name of the x position column in the tracks table.
    #[arg(short = 'x', long = "x-col")]
    x_col: Option<String>,

    /// Name of the y position column in the tracks table.
    #[arg(short = 'y', long = "y-col")]
    y_col: Option<String>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Process frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads used with --parallel.
    #[arg(long)]
    threads: Option<usize>,

    /// Write a JSON report of written and skipped files.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// `parameter,value` CSV config file; command line options take precedence.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Working directory holding the tracks, images and output directories.
    #[arg(short = 'd', long = "work-dir")]
    work_dir: Option<PathBuf>,

    /// Directory (relative to the working directory) holding one `*_tracks.csv` file.
    #[arg(short = 'k', long = "tracks-dir")]
    tracks_dir: Option<PathBuf>,

    /// Directory of frames named `...T<digits>.png`.
    #[arg(short = 'm', long = "images-dir")]
    images_dir: Option<PathBuf>,

    /// Directory receiving `ovl_` frames; created if missing.
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    columns: ColumnArgs,

    /// Label offset in pixels.
    #[arg(
        short = 's',
        long,
        num_args = 2,
        value_names = ["DX", "DY"],
        allow_negative_numbers = true
    )]
    shift: Option<Vec<i32>>,

    /// Label color: one value for grayscale frames, three for RGB; -1 selects white.
    #[arg(short = 'f', long = "font-color", num_args = 1..=3, allow_negative_numbers = true)]
    font_color: Option<Vec<i64>>,

    /// Only label these track ids.
    #[arg(long, num_args = 1..)]
    only: Option<Vec<String>>,

    /// TrueType/OpenType font file; system fonts are used otherwise.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Label font size in pixels.
    #[arg(long = "font-size", default_value_t = trackovl::DEFAULT_FONT_SIZE_PX)]
    font_size: f32,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Args, Debug)]
struct CropArgs {
    /// Working directory holding the tracks, images and output directories.
    work_dir: PathBuf,

    /// Directory (relative to the working directory) holding one `*_tracks.csv` file.
    tracks_dir: PathBuf,

    /// Directory of frames named `...T<digits>.png`.
    images_dir: PathBuf,

    /// Directory receiving crops; created if missing.
    out_dir: PathBuf,

    /// Track ids to crop around.
    track_ids: Vec<String>,

    /// Crop around this pixel in every frame instead of following tracks.
    #[arg(
        short = 'p',
        long = "pos",
        num_args = 2,
        value_names = ["X", "Y"],
        allow_negative_numbers = true
    )]
    pos: Option<Vec<i64>>,

    /// Pixels kept left, right, above and below the center.
    #[arg(short = 's', long, num_args = 4, value_names = ["L", "R", "T", "B"])]
    size: Option<Vec<u32>>,

    #[command(flatten)]
    columns: ColumnArgs,

    #[command(flatten)]
    batch: BatchArgs,
}

impl BatchArgs {
    fn opts(&self) -> BatchOpts {
        BatchOpts {
            parallel: self.parallel,
            threads: self.threads,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Overlay(args) => cmd_overlay(args),
        Command::Crop(args) => cmd_crop(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn cmd_overlay(args: OverlayArgs) -> anyhow::Result<()> {
    let shift = match args.shift.as_deref() {
        None => None,
        Some([dx, dy]) => Some(Shift::new(*dx, *dy)),
        Some(other) => anyhow::bail!("--shift takes 2 values, got {}", other.len()),
    };

    let from_cli = PartialOverlayConfig {
        work_dir: args.work_dir,
        tracks_dir: args.tracks_dir,
        images_dir: args.images_dir,
        out_dir: args.out_dir,
        time_column: args.columns.time_col,
        id_column: args.columns.id_col,
        x_column: args.columns.x_col,
        y_column: args.columns.y_col,
        shift,
        font_color: args.font_color.map(FillSpec::from_channels),
        track_filter: args
            .only
            .map(|ids| ids.into_iter().map(TrackId::from).collect()),
    };
    let merged = match &args.config {
        Some(path) => from_cli.merge(PartialOverlayConfig::from_config_file(path)?),
        None => from_cli,
    };
    let config = merged.resolve()?;
    tracing::info!(?config, "running overlay");

    let tracks_file = trackovl::find_tracks_file(&config.tracks_path())?;
    let table = TrackTable::from_path(&tracks_file, &config.columns)
        .with_context(|| format!("load tracks from '{}'", tracks_file.display()))?;

    let painter = match &args.font {
        Some(path) => SvgLabelPainter::from_font_file(path, args.font_size)?,
        None => SvgLabelPainter::with_system_fonts(args.font_size)?,
    };

    let report = trackovl::annotate_directory(
        &config,
        &table,
        &FrameResolver::default(),
        &painter,
        &args.batch.opts(),
    )?;
    finish(&report, args.batch.report.as_deref())
}

fn cmd_crop(args: CropArgs) -> anyhow::Result<()> {
    let radii = match args.size.as_deref() {
        None => CropRadii::default(),
        Some([left, right, top, bottom]) => CropRadii {
            left: *left,
            right: *right,
            top: *top,
            bottom: *bottom,
        },
        Some(other) => anyhow::bail!("--size takes 4 values, got {}", other.len()),
    };
    let fixed = match args.pos.as_deref() {
        None => None,
        Some([x, y]) => Some((*x, *y)),
        Some(other) => anyhow::bail!("--pos takes 2 values, got {}", other.len()),
    };

    let defaults = TrackColumns::default();
    let opts = CropOptions {
        work_dir: args.work_dir,
        tracks_dir: args.tracks_dir,
        images_dir: args.images_dir,
        out_dir: args.out_dir,
        columns: TrackColumns {
            time: args.columns.time_col.unwrap_or(defaults.time),
            track_id: args.columns.id_col.unwrap_or(defaults.track_id),
            x: args.columns.x_col.unwrap_or(defaults.x),
            y: args.columns.y_col.unwrap_or(defaults.y),
        },
        radii,
        track_ids: args.track_ids.into_iter().map(TrackId::from).collect(),
        fixed,
    };
    tracing::info!(?opts, "running crop");

    let table = if opts.wants_table() {
        let tracks_file = trackovl::find_tracks_file(&opts.tracks_path())?;
        let table = TrackTable::from_path(&tracks_file, &opts.columns)
            .with_context(|| format!("load tracks from '{}'", tracks_file.display()))?;
        Some(table)
    } else {
        None
    };

    let report = trackovl::crop_directory(
        &opts,
        table.as_ref(),
        &FrameResolver::default(),
        &args.batch.opts(),
    )?;
    finish(&report, args.batch.report.as_deref())
}

fn finish(report: &BatchReport, report_path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = report_path {
        report.write_json(path)?;
        tracing::info!(path = %path.display(), "wrote report");
    }
    if !report.is_clean() {
        tracing::warn!(skipped = report.skipped.len(), "some items were skipped");
    }
    Ok(())
}
