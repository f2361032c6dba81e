//! Track alignment: accumulate, locate, slice, re-base.
//!
//! Turning a raw recording into a comparable [`Track`] is a three-step
//! pipeline:
//!
//! 1. [`accumulate`] walks the raw fixes in order and attaches the running
//!    great-circle distance to each one, producing an immutable
//!    [`TrackProfile`].
//! 2. [`nearest_sample_index`] resolves optional start/end landmarks to
//!    sample indices.
//! 3. [`TrackProfile::rebase`] keeps the samples in `[start, end)` and
//!    subtracts the start sample field by field, so the start reads as
//!    time 0, distance 0, position delta 0.
//!
//! [`build_track`] runs the whole pipeline.

use std::ops::Range;

use chrono::TimeDelta;
use geo::{BoundingRect, Coord, LineString, Rect};
use log::debug;

use crate::error::{Result, TrackError};
use crate::geo_utils::{great_circle_distance, planar_distance};
use crate::{AlignConfig, ElevationMode, GpsPoint, RawPoint, Sample};

/// Fewest samples a track may retain; playback needs one inter-sample interval.
pub const MIN_TRACK_SAMPLES: usize = 2;

// ============================================================================
// Accumulation
// ============================================================================

/// Accumulated, absolute sample table of one recording.
///
/// Produced once by [`accumulate`] and never modified; re-basing creates a
/// new [`Track`].
#[derive(Debug, Clone)]
pub struct TrackProfile {
    samples: Vec<Sample>,
}

/// Fold raw fixes into samples carrying cumulative great-circle distance.
///
/// The running total starts at 0 on the first fix; each later fix adds the
/// distance from its predecessor. Absent elevation is read as 0 m.
///
/// Fails on empty input, on a fix without timestamp, on a timestamp earlier
/// than the previous one, and on invalid coordinates.
pub fn accumulate(points: &[RawPoint]) -> Result<TrackProfile> {
    if points.is_empty() {
        return Err(TrackError::EmptyTrack);
    }

    let mut samples = Vec::with_capacity(points.len());
    let mut total_km = 0.0;
    let mut prev: Option<Sample> = None;

    for (index, point) in points.iter().enumerate() {
        let timestamp = point
            .timestamp
            .ok_or(TrackError::MissingTimestamp { index })?;

        if !point.position().is_valid() {
            return Err(TrackError::InvalidCoordinate {
                index,
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }

        if let Some(prev) = prev {
            if timestamp < prev.timestamp {
                return Err(TrackError::TimestampRegression { index });
            }
            total_km += great_circle_distance(&prev.position(), &point.position());
        }

        let sample = Sample {
            timestamp,
            latitude: point.latitude,
            longitude: point.longitude,
            distance_km: total_km,
            elevation_m: point.elevation.unwrap_or(0.0),
        };
        samples.push(sample);
        prev = Some(sample);
    }

    debug!(
        "accumulated {} samples, {:.3} km",
        samples.len(),
        total_km
    );

    Ok(TrackProfile { samples })
}

impl TrackProfile {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distance covered by the whole recording.
    pub fn total_distance_km(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.distance_km)
    }

    /// Index of the sample closest to `reference`. See [`nearest_sample_index`].
    pub fn nearest_index(&self, reference: &GpsPoint) -> Option<usize> {
        nearest_sample_index(&self.samples, reference)
    }

    /// Keep the samples in `range` and re-base them on the first one.
    ///
    /// `range.end` is clamped to the profile length. Ranges that retain fewer
    /// than [`MIN_TRACK_SAMPLES`] samples (including empty or inverted ones)
    /// fail with [`TrackError::InsufficientSamples`].
    pub fn rebase(&self, range: Range<usize>, elevation: ElevationMode) -> Result<Track> {
        let end = range.end.min(self.samples.len());
        let start = range.start;
        let retained = end.saturating_sub(start);

        if retained < MIN_TRACK_SAMPLES {
            return Err(TrackError::InsufficientSamples {
                retained,
                minimum: MIN_TRACK_SAMPLES,
            });
        }

        let origin = self.samples[start];
        let samples = self.samples[start..end]
            .iter()
            .map(|s| AlignedSample::relative_to(s, &origin, elevation))
            .collect();

        Ok(Track {
            samples,
            origin,
            start_index: start,
            end_index: end,
            elevation,
        })
    }
}

// ============================================================================
// Nearest-sample search
// ============================================================================

/// Index of the sample whose position is closest to `reference`.
///
/// Closeness is [`planar_distance`] over `(latitude, longitude)`, which is
/// adequate for ranking nearby candidates. Ties resolve to the lowest index.
/// Returns `None` only for an empty slice.
pub fn nearest_sample_index(samples: &[Sample], reference: &GpsPoint) -> Option<usize> {
    let target = reference.as_tuple();

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| (i, planar_distance(s.position().as_tuple(), target)))
        .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
            Some((_, best_d)) if d >= best_d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

// ============================================================================
// Aligned track
// ============================================================================

/// One row of a re-based track.
///
/// `elapsed`, `distance_km`, `latitude` and `longitude` are differences from
/// the start sample. `elevation_m` is relative or absolute depending on the
/// [`ElevationMode`] the track was built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedSample {
    pub elapsed: TimeDelta,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub elevation_m: f64,
}

impl AlignedSample {
    fn relative_to(sample: &Sample, origin: &Sample, elevation: ElevationMode) -> Self {
        let elevation_m = match elevation {
            ElevationMode::Relative => sample.elevation_m - origin.elevation_m,
            ElevationMode::Absolute => sample.elevation_m,
        };

        Self {
            elapsed: sample.timestamp - origin.timestamp,
            latitude: sample.latitude - origin.latitude,
            longitude: sample.longitude - origin.longitude,
            distance_km: sample.distance_km - origin.distance_km,
            elevation_m,
        }
    }

    /// Elapsed time in (fractional) seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_seconds_f64()
    }
}

/// A recording sliced to its start/end landmarks and re-based on the start.
///
/// Always holds at least [`MIN_TRACK_SAMPLES`] samples.
#[derive(Debug, Clone)]
pub struct Track {
    samples: Vec<AlignedSample>,
    origin: Sample,
    start_index: usize,
    end_index: usize,
    elevation: ElevationMode,
}

impl Track {
    pub fn samples(&self) -> &[AlignedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The absolute sample every row was re-based on.
    pub fn origin(&self) -> &Sample {
        &self.origin
    }

    /// Index of the origin in the accumulated profile.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Exclusive end index in the accumulated profile.
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn elevation_mode(&self) -> ElevationMode {
        self.elevation
    }

    /// Distance covered between the first and last retained sample.
    pub fn distance_km(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.distance_km)
    }

    /// Time between the first and last retained sample.
    pub fn duration(&self) -> TimeDelta {
        self.samples.last().map_or(TimeDelta::zero(), |s| s.elapsed)
    }

    /// Absolute position of row `index`, undoing the re-basing.
    pub fn absolute_position(&self, index: usize) -> Option<GpsPoint> {
        self.samples.get(index).map(|s| {
            GpsPoint::new(
                s.latitude + self.origin.latitude,
                s.longitude + self.origin.longitude,
            )
        })
    }

    /// Map projection: `x` = longitude delta, `y` = latitude delta.
    pub fn path(&self) -> LineString<f64> {
        self.samples
            .iter()
            .map(|s| Coord { x: s.longitude, y: s.latitude })
            .collect()
    }

    /// Elevation profile: `x` = distance in km, `y` = elevation in m.
    pub fn profile(&self) -> LineString<f64> {
        self.samples
            .iter()
            .map(|s| Coord { x: s.distance_km, y: s.elevation_m })
            .collect()
    }

    /// Extent of [`Track::path`], for sizing map axes.
    pub fn path_bounds(&self) -> Option<Rect<f64>> {
        self.path().bounding_rect()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Build an aligned track from raw fixes and optional reference coordinates.
///
/// Elevation is re-based along with the other fields; use
/// [`build_track_with_config`] to keep it absolute.
///
/// # Example
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use ride_compare::{build_track, RawPoint};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
/// let points: Vec<RawPoint> = (0..3)
///     .map(|i| RawPoint::new(t0 + TimeDelta::seconds(10 * i), 0.0, i as f64 * 0.001))
///     .collect();
///
/// let track = build_track(&points, None, None).unwrap();
/// assert_eq!(track.len(), 3);
/// assert!((track.distance_km() - 0.222).abs() < 0.001);
/// ```
pub fn build_track(
    points: &[RawPoint],
    start_ref: Option<GpsPoint>,
    end_ref: Option<GpsPoint>,
) -> Result<Track> {
    build_track_with_config(points, &AlignConfig::with_refs(start_ref, end_ref))
}

/// Build an aligned track using a full [`AlignConfig`].
pub fn build_track_with_config(points: &[RawPoint], config: &AlignConfig) -> Result<Track> {
    let profile = accumulate(points)?;

    let start_index = match config.start_ref {
        Some(ref reference) => resolve_reference(&profile, reference)?,
        None => 0,
    };

    // Searched over the whole recording, not only after the start.
    let end_index = match config.end_ref {
        Some(ref reference) => resolve_reference(&profile, reference)?,
        None => profile.len(),
    };

    debug!(
        "resolved slice [{}, {}) of {} samples",
        start_index,
        end_index,
        profile.len()
    );

    if end_index < start_index {
        // Both refs are present whenever end < start: a missing start means 0,
        // a missing end means len.
        return Err(TrackError::InvalidReferenceOrder {
            start_index,
            end_index,
            start_ref: config.start_ref.unwrap_or_else(|| profile.samples[0].position()),
            end_ref: config
                .end_ref
                .unwrap_or_else(|| profile.samples[profile.len() - 1].position()),
        });
    }

    profile.rebase(start_index..end_index, config.elevation)
}

fn resolve_reference(profile: &TrackProfile, reference: &GpsPoint) -> Result<usize> {
    if !reference.latitude.is_finite() || !reference.longitude.is_finite() {
        return Err(TrackError::InvalidReference {
            latitude: reference.latitude,
            longitude: reference.longitude,
        });
    }
    // accumulate() guarantees at least one sample.
    profile.nearest_index(reference).ok_or(TrackError::EmptyTrack)
}

// ============================================================================
// Tests
// ============================================================================
