//! Minecraft skin head editor
//!
//! A command line tool that:
//! - Loads 64x64 skin textures from files, URLs, data URIs or texture payloads
//! - Turns the head up, down, left or right by re-mapping its faces
//! - Shifts, colorizes and selectively desaturates colors
//! - Matches the hue of a skin to a reference texture
//! - Renders head strip and histogram previews

mod config;
mod editor;
mod texture;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use config::{validate_adjustments, Config, DEFAULT_CONFIG_PATH};
use editor::preview::{self, ChartKind, CHART_HEIGHT, CHART_WIDTH};
use editor::{load_texture, EditSession};
use serde::Serialize;
use std::path::{Path, PathBuf};
use texture::{best_shift_between, Adjustments, Direction, Histogram, PixelBuffer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "skin-head-editor")]
#[command(about = "Rotate and recolor Minecraft skin heads")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply rotations and adjustments, then write the result
    Edit {
        #[command(flatten)]
        session: SessionArgs,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print color statistics for the edited texture
    Analyze {
        #[command(flatten)]
        session: SessionArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render head strips and histogram charts as PNGs
    Preview {
        #[command(flatten)]
        session: SessionArgs,

        /// Directory to write the images to
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Head strip scale factor (overrides config)
        #[arg(long)]
        scale: Option<u32>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write the configuration
        path: PathBuf,
    },
}

/// Texture and edits shared by every session command
#[derive(ClapArgs, Debug)]
struct SessionArgs {
    /// File path, URL, data URI or base64 texture
    input: String,

    /// Turn the head; repeat to chain turns
    #[arg(long = "turn", value_name = "DIR")]
    turns: Vec<Direction>,

    /// Remove the hat layer
    #[arg(long)]
    clear_outer: bool,

    /// Reference texture for hue matching and chart outlines
    #[arg(short, long)]
    reference: Option<String>,

    /// Set the hue shift that best matches the reference
    #[arg(long, requires = "reference")]
    match_hue: bool,

    /// Colorize towards the hue of this color (#rrggbb or r,g,b)
    #[arg(long)]
    colorize_color: Option<String>,

    #[command(flatten)]
    overrides: AdjustmentOverrides,
}

/// Adjustment values that override the configuration
#[derive(ClapArgs, Debug, Default)]
struct AdjustmentOverrides {
    /// Hue rotation in degrees
    #[arg(long, allow_negative_numbers = true)]
    hue_shift: Option<f64>,

    /// Saturation offset in percent
    #[arg(long, allow_negative_numbers = true)]
    saturation: Option<f64>,

    /// Lightness offset in percent
    #[arg(long, allow_negative_numbers = true)]
    lightness: Option<f64>,

    /// Contrast, -255 to 255
    #[arg(long, allow_negative_numbers = true)]
    contrast: Option<f64>,

    /// Colorize hue in degrees
    #[arg(long)]
    colorize_hue: Option<f64>,

    /// Colorize strength, 0 to 1
    #[arg(long)]
    colorize_amount: Option<f64>,

    /// Hue to desaturate around
    #[arg(long)]
    target_hue: Option<f64>,

    /// Width of the desaturation window in degrees
    #[arg(long)]
    hue_range: Option<f64>,

    /// Desaturation strength, 0 to 1
    #[arg(long)]
    grey_amount: Option<f64>,
}

impl AdjustmentOverrides {
    fn apply(&self, base: Adjustments) -> Adjustments {
        Adjustments {
            hue_shift: self.hue_shift.unwrap_or(base.hue_shift),
            saturation: self.saturation.unwrap_or(base.saturation),
            lightness: self.lightness.unwrap_or(base.lightness),
            contrast: self.contrast.unwrap_or(base.contrast),
            colorize_hue: self.colorize_hue.unwrap_or(base.colorize_hue),
            colorize_amount: self.colorize_amount.unwrap_or(base.colorize_amount),
            target_hue: self.target_hue.unwrap_or(base.target_hue),
            hue_range: self.hue_range.unwrap_or(base.hue_range),
            grey_amount: self.grey_amount.unwrap_or(base.grey_amount),
        }
    }
}

/// Output of the `analyze` command
#[derive(Serialize, Debug)]
struct AnalysisReport {
    adjustments: Adjustments,
    average_hue: f64,
    histogram: Histogram,
    gradient: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_shift: Option<i32>,
}

/// Using current_thread runtime; the only async work is texture downloads
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Config is read first so its verbose flag can take part in logging setup
    let config = load_config(args.config.as_deref());
    let verbose = args.verbose || config.as_ref().is_ok_and(|c| c.verbose);
    init_logging(verbose);
    let config = config?;

    match args.command {
        Command::Edit { session, output } => run_edit(&config, &session, &output).await,
        Command::Analyze { session, json } => run_analyze(&config, &session, json).await,
        Command::Preview {
            session,
            out_dir,
            scale,
        } => {
            let scale = scale.unwrap_or(config.preview_scale);
            run_preview(&config, &session, &out_dir, scale).await
        }
        Command::InitConfig { path } => {
            Config::default()
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

/// Initialize tracing/logging
///
/// Default level is "warn" so command output stays readable.
/// Use --verbose flag for "debug" level during troubleshooting.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("skin_head_editor={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Explicit config paths must load; the default path is optional
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

async fn load(config: &Config, input: &str) -> anyhow::Result<PixelBuffer> {
    load_texture(input, &config.download)
        .await
        .with_context(|| format!("Failed to load texture '{}'", short(input)))
}

/// Load the texture and apply every edit named on the command line
async fn open_session(config: &Config, args: &SessionArgs) -> anyhow::Result<EditSession> {
    let adjustments = args.overrides.apply(config.adjustments);
    validate_adjustments(&adjustments)?;

    let mut session = EditSession::new(load(config, &args.input).await?)?;
    session.set_adjustments(adjustments);

    if let Some(reference) = &args.reference {
        session.set_reference(load(config, reference).await?);
    }

    for direction in &args.turns {
        session.rotate(*direction)?;
    }

    if args.clear_outer {
        session.clear_outer_layer()?;
    }

    if let Some(color) = &args.colorize_color {
        let hue = session.set_colorize_from(color)?;
        tracing::info!("Colorize hue set to {} from '{}'", hue, color);
    }

    if args.match_hue {
        let shift = session.match_reference_hue()?;
        println!("Matched reference hue: shift {}", shift);
    }

    Ok(session)
}

async fn run_edit(config: &Config, args: &SessionArgs, output: &Path) -> anyhow::Result<()> {
    let session = open_session(config, args).await?;
    session
        .export_png(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn analysis_report(session: &EditSession) -> AnalysisReport {
    let (histogram, reference) = session.histograms();
    let average_hue = session.average_hue();
    let best_shift = reference
        .as_ref()
        .map(|r| best_shift_between(&Histogram::from_buffer(session.pristine()), r));

    AnalysisReport {
        adjustments: *session.adjustments(),
        average_hue,
        histogram,
        gradient: preview::hue_gradient_stops(average_hue),
        reference,
        best_shift,
    }
}

async fn run_analyze(config: &Config, args: &SessionArgs, json: bool) -> anyhow::Result<()> {
    let session = open_session(config, args).await?;
    let report = analysis_report(&session);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("Hue shift:    {}", report.adjustments.hue_shift);
    println!("Average hue:  {:.1}", report.average_hue);
    println!("Hued pixels:  {}", report.histogram.hue_total());
    println!("Lit pixels:   {}", report.histogram.brightness_total());

    println!("Hue buckets (10 degrees each):");
    for (i, count) in report.histogram.hue.iter().enumerate().filter(|(_, c)| **c > 0) {
        println!("  {:>3}-{:<3} {}", i * 10, i * 10 + 10, count);
    }

    let stops: Vec<String> = report.gradient.iter().map(|h| format!("{:.0}", h)).collect();
    println!("Slider gradient: {}", stops.join(" "));

    if let Some(shift) = report.best_shift {
        println!("Best hue shift to reference: {}", shift);
    }
}

async fn run_preview(
    config: &Config,
    args: &SessionArgs,
    out_dir: &Path,
    scale: u32,
) -> anyhow::Result<()> {
    let session = open_session(config, args).await?;
    write_previews(&session, out_dir, scale)?;
    println!("Wrote previews to {}", out_dir.display());
    Ok(())
}

/// Original and edited head strips, plus charts of the edited texture
fn write_previews(session: &EditSession, out_dir: &Path, scale: u32) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let strips = [
        ("head_strip_original.png", preview::head_strip(session.pristine(), scale)),
        ("head_strip.png", preview::head_strip(&session.render(), scale)),
    ];
    for (name, strip) in strips {
        let path = out_dir.join(name);
        strip
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let (histogram, reference) = session.histograms();
    for (kind, name) in [
        (ChartKind::Hue, "hue_histogram.png"),
        (ChartKind::Brightness, "brightness_histogram.png"),
    ] {
        let chart = preview::render_chart(
            kind,
            &histogram,
            reference.as_ref(),
            CHART_WIDTH,
            CHART_HEIGHT,
        );
        let path = out_dir.join(name);
        chart
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Keep long base64 inputs out of error messages
fn short(input: &str) -> String {
    const MAX: usize = 64;
    match input.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &input[..idx]),
        None => input.to_string(),
    }
}
