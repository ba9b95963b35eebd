use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand, ValueEnum};
use gaze_calibration::{
    CoordinateSpace, DisplayArea, EyeSelection, GazeSample, MonitorGeometry, Pt2,
    ValidationPointResult, convert, estimate_report,
};
use log::info;
use serde::{Deserialize, Serialize};

/// Offline tools for gaze data-quality evaluation.
#[derive(Debug, Parser)]
#[command(author, version, about = "Gaze calibration and data-quality tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate accuracy, precision and data loss from a validation capture.
    Quality {
        /// Path to a JSON capture file.
        #[arg(long)]
        input: String,

        /// Eyes to report; excluded eyes are reported as null.
        #[arg(long, value_enum, default_value_t = EyesArg::Both)]
        eyes: EyesArg,

        /// Include per-target metrics alongside the aggregate report.
        #[arg(long)]
        per_point: bool,
    },
    /// Convert a JSON list of points between coordinate spaces.
    Convert {
        /// Path to a JSON array of `[x, y]` points.
        #[arg(long)]
        input: String,

        /// Source space (tracker_normalized, screen_normalized, pixel, visual_angle_degrees).
        #[arg(long)]
        from: CoordinateSpace,

        /// Target space.
        #[arg(long)]
        to: CoordinateSpace,

        /// Optional path to JSON MonitorGeometry. Defaults are used if omitted.
        #[arg(long)]
        monitor: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EyesArg {
    Both,
    Left,
    Right,
}

impl From<EyesArg> for EyeSelection {
    fn from(value: EyesArg) -> Self {
        match value {
            EyesArg::Both => EyeSelection::Both,
            EyesArg::Left => EyeSelection::Left,
            EyesArg::Right => EyeSelection::Right,
        }
    }
}

/// One validation target as recorded on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CapturedPoint {
    /// Target position, tracker-normalized.
    target: Pt2,
    samples: Vec<GazeSample>,
}

/// A validation pass recorded for offline evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CaptureFile {
    display_area: DisplayArea,
    points: Vec<CapturedPoint>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

fn run_quality_from_file(input_path: &str, eyes: EyeSelection, per_point: bool) -> Result<String> {
    let capture: CaptureFile = load_json_file(Path::new(input_path))?;
    capture.display_area.validate()?;
    ensure!(!capture.points.is_empty(), "capture contains no validation points");

    let points: Vec<ValidationPointResult> = capture
        .points
        .into_iter()
        .map(|p| ValidationPointResult {
            target_ucs: capture.display_area.to_ucs(&p.target),
            target_display: p.target,
            samples: p.samples,
        })
        .collect();
    info!(
        "evaluating {} targets ({} samples) for {} eye(s)",
        points.len(),
        points.iter().map(|p| p.samples.len()).sum::<usize>(),
        eyes.as_str()
    );

    let summary = estimate_report(&points, eyes);
    let json = if per_point {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string_pretty(&summary.report)?
    };
    Ok(json)
}

fn run_convert_from_files(
    input_path: &str,
    from: CoordinateSpace,
    to: CoordinateSpace,
    monitor_path: Option<&str>,
) -> Result<String> {
    let points: Vec<Pt2> = load_json_file(Path::new(input_path))?;
    let monitor = if let Some(path) = monitor_path {
        load_json_file::<MonitorGeometry>(Path::new(path))?
    } else {
        MonitorGeometry::default()
    };
    monitor.validate()?;

    info!("converting {} points from {from} to {to}", points.len());
    Ok(serde_json::to_string_pretty(&convert(&points, from, to, &monitor))?)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = match args.command {
        Command::Quality {
            input,
            eyes,
            per_point,
        } => run_quality_from_file(&input, eyes.into(), per_point)?,
        Command::Convert {
            input,
            from,
            to,
            monitor,
        } => run_convert_from_files(&input, from, to, monitor.as_deref())?,
    };
    println!("{}", json);
    Ok(())
}
