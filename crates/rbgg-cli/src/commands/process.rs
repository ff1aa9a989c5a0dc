//! Process command - flatten every input image.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rbgg_adapters::{FsImageSource, PngImageSink};
use rbgg_core::{
    FlattenParams, FlattenReport, Flattener, ImageSink, ImageSource, ProgressEvent, ProgressSink,
    ResultOutput,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::{is_percent, AppConfig};
use crate::output::{JsonOutput, ProgressBar};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Hardcoded default values.
mod defaults {
    pub const SIZE_PERCENT: f64 = 5.0;
    pub const PERCENTILE_PERCENT: f64 = 90.0;
    pub const TARGET: u8 = 240;
}

/// Parse and validate a percentage in (0, 100].
fn parse_percent(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if is_percent(value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in (0, 100]"))
    }
}

/// Arguments for flattening images.
#[derive(Args, Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProcessArgs {
    /// Files or directories to flatten
    pub paths: Vec<PathBuf>,

    /// Window size as a percentage of sqrt(width * height) [default: 5]
    #[arg(short, long, value_name = "PERCENT", value_parser = parse_percent)]
    pub size: Option<f64>,

    /// Local percentile taken as the background level [default: 90]
    #[arg(short, long, value_name = "PERCENT", value_parser = parse_percent)]
    pub percentile: Option<f64>,

    /// Brightness the background is scaled to, 0-255 [default: 240]
    #[arg(short, long, value_name = "LEVEL")]
    pub target: Option<u8>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Write outputs into this directory instead of next to each input
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Do not write the grayscale copy of each input
    #[arg(long)]
    pub no_gray: bool,

    /// Sweep columns on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl ProcessArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// Boolean flags can only be switched on by the CLI, so config applies
    /// whenever the flag was not passed.
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Window parameters: CLI > config (accessor provides fallback)
        args.size = args.size.or(config.flatten.size);
        args.percentile = args.percentile.or(config.flatten.percentile);
        args.target = args.target.or(config.flatten.target);
        if !args.sequential {
            args.sequential = config.flatten.parallel.is_some_and(|parallel| !parallel);
        }

        if args.out_dir.is_none() {
            args.out_dir.clone_from(&config.output.dir);
        }
        if !args.no_gray {
            args.no_gray = config.output.gray.is_some_and(|gray| !gray);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| OutputFormat::from_str(s, true).ok());
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Flattening parameters with fallback to hardcoded defaults.
    #[must_use]
    pub fn flatten_params(&self) -> FlattenParams {
        FlattenParams {
            window_size_fraction: self.size.unwrap_or(defaults::SIZE_PERCENT) / 100.0,
            percentile: self.percentile.unwrap_or(defaults::PERCENTILE_PERCENT) / 100.0,
            target_brightness: self.target.unwrap_or(defaults::TARGET),
            parallel: !self.sequential,
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Result of running the process command.
#[allow(dead_code)] // Counts exposed for programmatic use
pub struct ProcessSummary {
    /// Number of images flattened.
    pub processed: usize,
    /// Number of inputs skipped.
    pub skipped: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the process command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
///
/// # Errors
///
/// Fails on unusable parameters or when the report cannot be written.
/// Per-image failures are reported as skipped instead.
pub fn run(args: &ProcessArgs) -> Result<ProcessSummary> {
    info!("Running process command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let params = args.flatten_params();
    debug!(?params, "Resolved flattening parameters");
    let flattener = Flattener::new(params).context("Invalid flattening parameters")?;

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let sink = PngImageSink::new()
        .with_out_dir(args.out_dir.clone())
        .with_gray(!args.no_gray);

    let total = source.count_hint();
    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);
    let output = JsonOutput::stdout();

    process_images(&source, &flattener, &sink, &output, &progress, args)
}

/// Flatten every image from `source`, writing outputs and reports.
fn process_images(
    source: &dyn ImageSource,
    flattener: &Flattener,
    sink: &dyn ImageSink,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
    args: &ProcessArgs,
) -> Result<ProcessSummary> {
    let total = source.count_hint();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut all_reports: Vec<FlattenReport> = Vec::new();

    let mut images = source.images().enumerate();
    loop {
        let load_start = Instant::now();
        let Some((index, image_result)) = images.next() else {
            break;
        };
        let load_ms = load_start.elapsed().as_millis();

        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // Note: error message contains the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        let path = image.path.clone();
        progress.on_event(ProgressEvent::Started {
            path: path.clone(),
            index,
            total,
        });

        let flatten_start = Instant::now();
        let gray = image.to_luma8();
        let flattened = match flattener.flatten(&gray) {
            Ok(out) => out,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    path,
                    reason: e.to_string(),
                });
                skipped += 1;
                continue;
            }
        };
        let flatten_ms = flatten_start.elapsed().as_millis();

        let write_start = Instant::now();
        let outputs = match sink.save(&path, &gray, &flattened) {
            Ok(paths) => paths,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    path,
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };
        let write_ms = write_start.elapsed().as_millis();

        info!(
            path = %path,
            radius = flattened.geometry.radius(),
            load_ms,
            flatten_ms,
            write_ms,
            "Flattened image"
        );

        let report = FlattenReport {
            path,
            timestamp: iso_timestamp(),
            dimensions: image.dimensions(),
            radius: flattened.geometry.radius(),
            percentile: flattened.geometry.percentile(),
            target_brightness: flattener.params().target_brightness,
            field: flattened.field_stats,
            outputs,
            elapsed_ms: u64::try_from(flatten_ms + write_ms).unwrap_or(u64::MAX),
        };

        progress.on_event(ProgressEvent::Completed {
            report: report.clone(),
        });

        // Output based on format
        match args.format() {
            OutputFormat::Jsonl => {
                output.write(&report)?;
            }
            OutputFormat::Json => {
                all_reports.push(report);
            }
        }

        processed += 1;
    }

    // For JSON format, output all reports as one array
    if args.format() == OutputFormat::Json {
        output.write_array(&all_reports, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if skipped > 0 {
        ExitCode::PartialFailure
    } else {
        ExitCode::Success
    };

    Ok(ProcessSummary {
        processed,
        skipped,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
