//! ride-compare CLI - align GPX rides for side-by-side comparison
//!
//! Usage:
//!   ride-compare --filename a.gpx b.gpx [--startloc LAT LON] [--endloc LAT LON]
//!                [--speed 60] [--save [out.json]] [--absolute-elevation]
//!
//! Without `--save` a summary of every aligned track is printed. With it, the
//! full comparison dataset (rows, map and elevation projections, playback
//! timing) is written as JSON for a plotting front end.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};
use ride_compare::export::ComparisonDataset;
use ride_compare::gpx_io::load_and_align;
use ride_compare::{AlignConfig, BatchResult, ElevationMode, GpsPoint, Playback};

#[derive(Parser)]
#[command(name = "ride-compare")]
#[command(about = "Align GPX rides to common start/end landmarks", long_about = None)]
struct Cli {
    /// GPX files to compare
    #[arg(long, required = true, num_args = 1..)]
    filename: Vec<PathBuf>,

    /// Start landmark as latitude longitude
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    startloc: Option<Vec<f64>>,

    /// End landmark as latitude longitude
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    endloc: Option<Vec<f64>>,

    /// Playback speed multiplier
    #[arg(long, default_value = "60")]
    speed: f64,

    /// Write the comparison dataset as JSON instead of printing a summary
    #[arg(long, num_args = 0..=1, default_missing_value = "compare_ride.json")]
    save: Option<PathBuf>,

    /// Report elevation above sea level instead of relative to the start
    #[arg(long)]
    absolute_elevation: bool,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let config = AlignConfig {
        start_ref: cli.startloc.as_deref().and_then(to_point),
        end_ref: cli.endloc.as_deref().and_then(to_point),
        elevation: if cli.absolute_elevation {
            ElevationMode::Absolute
        } else {
            ElevationMode::Relative
        },
    };
    debug!("Alignment config: {:?}", config);

    let result = load_and_align(&cli.filename, &config);

    for failure in &result.failures {
        error!("{}: {}", failure.name, failure.error);
    }

    if result.tracks.is_empty() {
        error!("No track could be aligned");
        return ExitCode::FAILURE;
    }

    let outcome = match &cli.save {
        Some(path) => save(&result, cli.speed, path),
        None => display(&result, cli.speed),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn to_point(values: &[f64]) -> Option<GpsPoint> {
    match values {
        [lat, lon] => Some(GpsPoint::new(*lat, *lon)),
        _ => None,
    }
}

fn save(result: &BatchResult, speed: f64, path: &Path) -> ride_compare::Result<()> {
    let dataset = ComparisonDataset::new(result, speed)?;
    dataset.write_json(path)?;
    info!(
        "Wrote {} tracks ({} frames) to {}",
        dataset.tracks.len(),
        dataset.frame_count,
        path.display()
    );
    Ok(())
}

fn display(result: &BatchResult, speed: f64) -> ride_compare::Result<()> {
    let tracks = result.track_list();
    let playback = Playback::new(&tracks, speed)?;

    println!("\n{}", "=".repeat(60));
    println!("Aligned {} tracks", result.tracks.len());
    println!("{}", "=".repeat(60));

    for named in &result.tracks {
        let track = &named.track;
        let max_elevation = track
            .samples()
            .iter()
            .map(|s| s.elevation_m)
            .fold(f64::NEG_INFINITY, f64::max);
        println!(
            "  {} - {} samples [{}..{}), {:.2} km in {}s, max elevation {:.0} m",
            named.name,
            track.len(),
            track.start_index(),
            track.end_index(),
            track.distance_km(),
            track.duration().num_seconds(),
            max_elevation
        );
    }

    let total = match playback.total_duration() {
        Some(total) => format!("{:.1}s", total.as_secs_f64()),
        None => "too long to time".to_string(),
    };
    println!(
        "\nPlayback at {}x: {} frames, {:.1} ms per frame, {} total",
        speed,
        playback.frame_count(),
        playback.interval().as_secs_f64() * 1000.0,
        total
    );

    Ok(())
}
