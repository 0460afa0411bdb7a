//! WCS Report CLI
//!
//! Tracking CSV → peak intensities, peak/event correlation, team summaries,
//! WCS trajectories and phase-labelled tracking.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing::{info, Level};
#[cfg(feature = "cli")]
use wcs_core::{CorrelateOptions, WcsConfig};
#[cfg(feature = "cli")]
use wcs_report::{ConfigOverrides, OutputFormat, ParseStats, ReportTable, RunMetadata};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "wcs_report")]
#[command(about = "Worst-case-scenario running intensity reports", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct EngineArgs {
    /// YAML engine config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tracking sample rate in Hz
    #[arg(long)]
    fps: Option<f64>,

    /// High-speed running threshold (m/s)
    #[arg(long)]
    hsr: Option<f64>,

    /// Sprint threshold (m/s)
    #[arg(long)]
    spr: Option<f64>,

    /// Velocity sanity limit (m/s)
    #[arg(long)]
    max_velocity: Option<f64>,

    /// Rolling window in seconds (repeatable)
    #[arg(long = "window")]
    windows: Vec<u32>,
}

#[cfg(feature = "cli")]
impl EngineArgs {
    fn load(&self) -> Result<WcsConfig> {
        let overrides = ConfigOverrides {
            fps: self.fps,
            hsr_mps: self.hsr,
            sprint_mps: self.spr,
            max_velocity_mps: self.max_velocity,
            windows_seconds: self.windows.clone(),
        };
        wcs_report::load_config(self.config.as_deref(), &overrides)
    }
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct OutputArgs {
    /// Output file path (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Write run metadata JSON to this path
    #[arg(long)]
    metadata: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Per-player distance bands and rolling-window peaks
    Peaks {
        /// Tracking CSV path
        #[arg(long)]
        tracking: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Join every peak with the player's nearest event
    Correlate {
        /// Tracking CSV path
        #[arg(long)]
        tracking: PathBuf,

        /// Dynamic events CSV path
        #[arg(long)]
        events: PathBuf,

        /// Window (seconds) whose peaks are correlated
        #[arg(long = "peak-window", default_value = "60")]
        peak_window: u32,

        /// Maximum frame distance for a match
        #[arg(long)]
        tolerance: Option<u64>,

        /// Event column holding the player id
        #[arg(long, default_value = "player_id")]
        player_col: String,

        /// Stamp this match id onto every event row
        #[arg(long)]
        match_id: Option<u64>,

        /// Also write the team event summary here
        #[arg(long)]
        summary_out: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Team mean (min – max) of every window's peak
    TeamSummary {
        /// Tracking CSV path
        #[arg(long)]
        tracking: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Movement sequence inside one player's peak window
    Trajectory {
        /// Tracking CSV path
        #[arg(long)]
        tracking: PathBuf,

        #[arg(long)]
        match_id: u64,

        #[arg(long)]
        player_id: u64,

        /// Window (seconds) whose peak is extracted
        #[arg(long = "peak-window", default_value = "60")]
        peak_window: u32,

        #[command(flatten)]
        engine: EngineArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Label every tracking sample with its phase of play
    Phases {
        /// Tracking CSV path
        #[arg(long)]
        tracking: PathBuf,

        /// Phases-of-play CSV path
        #[arg(long)]
        phases: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => std::env::var("RUST_LOG")
            .ok()
            .and_then(|v| v.parse::<Level>().ok())
            .unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;
    Ok(())
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Peaks {
            tracking,
            engine,
            output,
        } => {
            let config = engine.load()?;
            let (samples, stats) = wcs_report::load_tracking_csv(&tracking)?;
            let peaks = wcs_core::compute_peak_intensities(&samples, &config)?;
            let report = ReportTable::from_peaks(&peaks);
            finish(&report, &output, &config, &stats)?;
        }

        Commands::Correlate {
            tracking,
            events,
            peak_window,
            tolerance,
            player_col,
            match_id,
            summary_out,
            engine,
            output,
        } => {
            let mut config = engine.load()?;
            if !config.windows_seconds.contains(&peak_window) {
                config.windows_seconds.push(peak_window);
            }
            let (samples, stats) = wcs_report::load_tracking_csv(&tracking)?;
            let event_table = wcs_report::load_events_csv(&events, match_id)?;
            let peaks = wcs_core::compute_peak_intensities(&samples, &config)?;

            let mut options =
                CorrelateOptions::for_window(peak_window).with_player_column(&player_col);
            if let Some(tolerance) = tolerance {
                options = options.with_tolerance(tolerance);
            }
            let merged = wcs_core::merge_peaks_with_events(&peaks, &event_table, &options)?;
            info!(
                rows = merged.len(),
                matched = merged.matched_count(),
                "peaks correlated with events"
            );

            if let Some(summary_path) = summary_out {
                let summary = wcs_core::summarize_events_by_team(&merged);
                ReportTable::from_event_summary(&summary)
                    .write(Some(&summary_path), output.format)?;
                info!(path = %summary_path.display(), "team event summary written");
            }

            let report = ReportTable::from_merged(&merged);
            finish(&report, &output, &config, &stats)?;
        }

        Commands::TeamSummary {
            tracking,
            engine,
            output,
        } => {
            let config = engine.load()?;
            let (samples, stats) = wcs_report::load_tracking_csv(&tracking)?;
            let peaks = wcs_core::compute_peak_intensities(&samples, &config)?;
            let summary = wcs_core::summarize_team_peaks(&peaks);
            let report = ReportTable::from_team_summary(&summary, &peaks.windows_seconds);
            finish(&report, &output, &config, &stats)?;
        }

        Commands::Trajectory {
            tracking,
            match_id,
            player_id,
            peak_window,
            engine,
            output,
        } => {
            let mut config = engine.load()?;
            if !config.windows_seconds.contains(&peak_window) {
                config.windows_seconds.push(peak_window);
            }
            let (samples, stats) = wcs_report::load_tracking_csv(&tracking)?;
            let peaks = wcs_core::compute_peak_intensities(&samples, &config)?;
            let trajectory = wcs_core::extract_wcs_trajectory(
                &samples,
                &peaks,
                match_id,
                player_id,
                peak_window,
                &config,
            )?;
            info!(
                frame_start = trajectory.frame_start,
                frame_end = trajectory.frame_end,
                points = trajectory.points.len(),
                max_speed_mps = trajectory.max_speed_mps,
                "trajectory extracted"
            );
            let report = ReportTable::from_trajectory(&trajectory);
            finish(&report, &output, &config, &stats)?;
        }

        Commands::Phases {
            tracking,
            phases,
            output,
        } => {
            let (samples, stats) = wcs_report::load_tracking_csv(&tracking)?;
            let (intervals, _) = wcs_report::load_phases_csv(&phases)?;
            let labelled = wcs_core::assign_phases(&samples, &intervals);
            let report = ReportTable::from_tracking(&labelled);
            finish(&report, &output, &WcsConfig::default(), &stats)?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn finish(
    report: &ReportTable,
    output: &OutputArgs,
    config: &WcsConfig,
    stats: &ParseStats,
) -> Result<()> {
    report.write(output.out.as_deref(), output.format)?;
    if let Some(path) = &output.out {
        info!(path = %path.display(), rows = report.len(), "report written");
    }
    if let Some(metadata_path) = &output.metadata {
        save_metadata(metadata_path, &RunMetadata::new(config, stats, report.len()))?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn save_metadata(path: &Path, meta: &RunMetadata) -> Result<()> {
    meta.save(path)?;
    info!(path = %path.display(), "run metadata saved");
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("wcs_report CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
