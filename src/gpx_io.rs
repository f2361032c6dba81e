//! Reading recordings from GPX files.
//!
//! All track segments of all tracks in a file are concatenated in file order
//! into one point sequence. Waypoints and routes are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::batch::{align_tracks, BatchResult, TrackInput};
use crate::error::{Result, TrackError};
use crate::{AlignConfig, RawPoint};

/// Decode every track point of a GPX document.
///
/// Points without `<time>` are kept with `timestamp: None` so alignment can
/// report exactly which point is missing it.
pub fn read_gpx<R: Read>(reader: R) -> Result<Vec<RawPoint>> {
    let gpx = gpx::read(reader).map_err(|e| TrackError::GpxParse(e.to_string()))?;

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let timestamp = match &waypoint.time {
                    Some(time) => Some(to_utc(time)?),
                    None => None,
                };
                let position = waypoint.point();
                points.push(RawPoint {
                    timestamp,
                    latitude: position.y(),
                    longitude: position.x(),
                    elevation: waypoint.elevation,
                });
            }
        }
    }

    debug!(
        "Decoded {} points from {} tracks",
        points.len(),
        gpx.tracks.len()
    );
    Ok(points)
}

/// Read one GPX file into a [`TrackInput`] named after the path as given.
pub fn read_gpx_file(path: &Path) -> Result<TrackInput> {
    let file = File::open(path)?;
    let points = read_gpx(BufReader::new(file))?;
    Ok(TrackInput::new(path.display().to_string(), points))
}

/// Read and align several GPX files.
///
/// Files that cannot be read or parsed are reported as failures, listed
/// before the alignment failures; the remaining files are still aligned.
pub fn load_and_align<P: AsRef<Path>>(paths: &[P], config: &AlignConfig) -> BatchResult {
    let mut inputs = Vec::with_capacity(paths.len());
    let mut read_failures = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match read_gpx_file(path) {
            Ok(input) => inputs.push(input),
            Err(error) => {
                warn!("Failed to read {}: {}", path.display(), error);
                read_failures.push((path.display().to_string(), error));
            }
        }
    }

    let mut result = BatchResult::default();
    for (name, error) in read_failures {
        result.push_failure(name, error);
    }

    let aligned = align_tracks(&inputs, config);
    result.tracks = aligned.tracks;
    result.failures.extend(aligned.failures);
    result
}

fn to_utc(time: &gpx::Time) -> Result<DateTime<Utc>> {
    let iso = time
        .format()
        .map_err(|e| TrackError::GpxParse(e.to_string()))?;
    let parsed = DateTime::parse_from_rfc3339(&iso)
        .map_err(|e| TrackError::GpxParse(e.to_string()))?;
    Ok(parsed.with_timezone(&Utc))
}
