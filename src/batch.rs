//! Align several recordings at once.
//!
//! Each input is aligned independently; a failure is recorded next to the
//! input's name and never stops the others. With the `parallel` feature the
//! inputs are processed with rayon.

use log::{info, warn};

use crate::error::TrackError;
use crate::{build_track_with_config, AlignConfig, RawPoint, Track};

/// One recording to align, usually one input file.
#[derive(Debug, Clone)]
pub struct TrackInput {
    /// Display name, e.g. the file name
    pub name: String,
    pub points: Vec<RawPoint>,
}

impl TrackInput {
    pub fn new(name: impl Into<String>, points: Vec<RawPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// A successfully aligned recording.
#[derive(Debug, Clone)]
pub struct NamedTrack {
    pub name: String,
    pub track: Track,
}

/// A recording that could not be aligned.
#[derive(Debug)]
pub struct TrackFailure {
    pub name: String,
    pub error: TrackError,
}

/// Outcome of aligning a batch. Both lists keep input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub tracks: Vec<NamedTrack>,
    pub failures: Vec<TrackFailure>,
}

impl BatchResult {
    /// True when every input aligned.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record a failure that happened before alignment, e.g. while reading a file.
    pub fn push_failure(&mut self, name: impl Into<String>, error: TrackError) {
        self.failures.push(TrackFailure {
            name: name.into(),
            error,
        });
    }

    /// The aligned tracks without their names, in input order.
    pub fn track_list(&self) -> Vec<Track> {
        self.tracks.iter().map(|t| t.track.clone()).collect()
    }

    fn extend(&mut self, outcomes: Vec<(String, crate::Result<Track>)>) {
        for (name, outcome) in outcomes {
            match outcome {
                Ok(track) => self.tracks.push(NamedTrack { name, track }),
                Err(error) => {
                    warn!("Skipping {}: {}", name, error);
                    self.failures.push(TrackFailure { name, error });
                }
            }
        }
    }
}

/// Align every input with the same configuration.
///
/// # Example
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use ride_compare::{align_tracks, AlignConfig, RawPoint, TrackInput};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
/// let good: Vec<RawPoint> = (0..3)
///     .map(|i| RawPoint::new(t0 + TimeDelta::seconds(i), 0.0, i as f64 * 0.001))
///     .collect();
///
/// let inputs = vec![
///     TrackInput::new("good.gpx", good),
///     TrackInput::new("empty.gpx", vec![]),
/// ];
/// let result = align_tracks(&inputs, &AlignConfig::default());
/// assert_eq!(result.tracks.len(), 1);
/// assert_eq!(result.failures[0].name, "empty.gpx");
/// ```
pub fn align_tracks(inputs: &[TrackInput], config: &AlignConfig) -> BatchResult {
    let start = std::time::Instant::now();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<(String, crate::Result<Track>)> = {
        use rayon::prelude::*;
        inputs
            .par_iter()
            .map(|input| {
                (
                    input.name.clone(),
                    build_track_with_config(&input.points, config),
                )
            })
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<(String, crate::Result<Track>)> = inputs
        .iter()
        .map(|input| {
            (
                input.name.clone(),
                build_track_with_config(&input.points, config),
            )
        })
        .collect();

    let mut result = BatchResult::default();
    result.extend(outcomes);

    info!(
        "Aligned {} of {} tracks in {:?}",
        result.tracks.len(),
        inputs.len(),
        start.elapsed()
    );

    result
}
