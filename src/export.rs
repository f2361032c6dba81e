//! Serializable comparison dataset.
//!
//! Flattens a [`BatchResult`] into plain records (numbers and strings only)
//! that a plotting front end can consume without this crate: sample rows,
//! the map and elevation projections, and playback timing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::{compute_playback_interval, BatchResult, NamedTrack, Playback, Sample};

/// One re-based row, with elapsed time in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub elapsed_s: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub elevation_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    pub name: String,
    /// Index of the start sample in the full recording
    pub start_index: usize,
    /// Exclusive end index in the full recording
    pub end_index: usize,
    /// Absolute values every row is relative to
    pub origin: Sample,
    /// Pause between frames at the dataset's playback speed
    pub interval_ms: f64,
    pub samples: Vec<SampleRecord>,
    /// `[longitude, latitude]` deltas
    pub path: Vec<[f64; 2]>,
    /// `[distance_km, elevation_m]`
    pub profile: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub name: String,
    pub kind: String,
    pub message: String,
}

/// Everything a renderer needs to draw and animate a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonDataset {
    pub speed: f64,
    /// Frame interval shared by the animation (taken from the first track)
    pub interval_ms: Option<f64>,
    /// Frames needed to play the longest track
    pub frame_count: usize,
    pub tracks: Vec<TrackRecord>,
    pub failures: Vec<FailureRecord>,
}

impl ComparisonDataset {
    /// Build the dataset for playback at `speed`x.
    pub fn new(batch: &BatchResult, speed: f64) -> Result<Self> {
        let tracks = batch
            .tracks
            .iter()
            .map(|named| TrackRecord::new(named, speed))
            .collect::<Result<Vec<_>>>()?;

        let track_list = batch.track_list();
        let (interval_ms, frame_count) = if track_list.is_empty() {
            (None, 0)
        } else {
            let playback = Playback::new(&track_list, speed)?;
            (
                Some(playback.interval().as_secs_f64() * 1000.0),
                playback.frame_count(),
            )
        };

        let failures = batch
            .failures
            .iter()
            .map(|f| FailureRecord {
                name: f.name.clone(),
                kind: f.error.kind().to_string(),
                message: f.error.to_string(),
            })
            .collect();

        Ok(Self {
            speed,
            interval_ms,
            frame_count,
            tracks,
            failures,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TrackError::Json(e.to_string()))
    }

    /// Write the dataset as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

impl TrackRecord {
    fn new(named: &NamedTrack, speed: f64) -> Result<Self> {
        let track = &named.track;
        let interval = compute_playback_interval(track, speed)?;

        let samples = track
            .samples()
            .iter()
            .map(|s| SampleRecord {
                elapsed_s: s.elapsed_seconds(),
                latitude: s.latitude,
                longitude: s.longitude,
                distance_km: s.distance_km,
                elevation_m: s.elevation_m,
            })
            .collect();

        Ok(Self {
            name: named.name.clone(),
            start_index: track.start_index(),
            end_index: track.end_index(),
            origin: *track.origin(),
            interval_ms: interval.as_secs_f64() * 1000.0,
            samples,
            path: track.path().coords().map(|c| [c.x, c.y]).collect(),
            profile: track.profile().coords().map(|c| [c.x, c.y]).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{align_tracks, AlignConfig, RawPoint, TrackInput};
    use chrono::{TimeDelta, TimeZone, Utc};

    fn batch() -> BatchResult {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let points: Vec<RawPoint> = (0..3)
            .map(|i| {
                RawPoint::new(t0 + TimeDelta::seconds(10 * i), 0.0, i as f64 * 0.001)
                    .with_elevation(i as f64 * 5.0)
            })
            .collect();
        align_tracks(
            &[
                TrackInput::new("ride.gpx", points),
                TrackInput::new("empty.gpx", vec![]),
            ],
            &AlignConfig::default(),
        )
    }

    #[test]
    fn test_dataset_carries_interval_and_projections() {
        let dataset = ComparisonDataset::new(&batch(), 2.0).unwrap();
        assert_eq!(dataset.interval_ms, Some(5000.0));
        assert_eq!(dataset.frame_count, 3);

        let track = &dataset.tracks[0];
        assert_eq!(track.name, "ride.gpx");
        assert_eq!(track.interval_ms, 5000.0);
        assert_eq!(track.samples[2].elapsed_s, 20.0);
        assert_eq!(track.path[1], [0.001, 0.0]);
        assert_eq!(track.profile[2][1], 10.0);

        assert_eq!(dataset.failures.len(), 1);
        assert_eq!(dataset.failures[0].kind, "empty_track");
    }

    #[test]
    fn test_dataset_json() {
        let dataset = ComparisonDataset::new(&batch(), 60.0).unwrap();
        let json = dataset.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tracks"][0]["name"], "ride.gpx");
        assert_eq!(value["tracks"][0]["origin"]["timestamp"], "2024-06-01T08:00:00Z");
        assert_eq!(value["failures"][0]["name"], "empty.gpx");
    }

    #[test]
    fn test_dataset_without_tracks() {
        let dataset = ComparisonDataset::new(&BatchResult::default(), 1.0).unwrap();
        assert_eq!(dataset.interval_ms, None);
        assert_eq!(dataset.frame_count, 0);
    }

    #[test]
    fn test_dataset_rejects_bad_speed() {
        assert!(matches!(
            ComparisonDataset::new(&batch(), 0.0),
            Err(TrackError::InvalidSpeed(_))
        ));
    }
}
