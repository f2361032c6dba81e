//! # Ride Compare
//!
//! Align GPS ride recordings so several attempts at the same route can be
//! compared side by side.
//!
//! This library provides:
//! - Cumulative great-circle distance along a recorded track
//! - Nearest-sample lookup for user-chosen start/end landmarks
//! - Re-basing of each track so the chosen start reads as time 0, distance 0
//! - Playback timing for stepping through several tracks frame by frame
//!
//! ## Features
//!
//! - **`parallel`** - Align batches of tracks in parallel with rayon
//! - **`gpx`** - Read tracks from GPX files
//! - **`serde`** - Serializable comparison dataset (JSON export)
//! - **`cli`** - The `ride-compare` command-line tool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ride_compare::{build_track, compute_playback_interval, GpsPoint, RawPoint};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
//! let points: Vec<RawPoint> = (0..5)
//!     .map(|i| {
//!         RawPoint::new(
//!             t0 + chrono::TimeDelta::seconds(10 * i),
//!             51.5 + i as f64 * 0.001,
//!             -0.12,
//!         )
//!         .with_elevation(20.0 + i as f64)
//!     })
//!     .collect();
//!
//! // Start at the second fix, run to the end of the recording.
//! let track = build_track(&points, Some(GpsPoint::new(51.501, -0.12)), None).unwrap();
//! assert_eq!(track.len(), 4);
//! assert_eq!(track.samples()[0].distance_km, 0.0);
//!
//! let interval = compute_playback_interval(&track, 2.0).unwrap();
//! assert_eq!(interval.as_millis(), 5000);
//! ```

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackError};

// Distance engine
pub mod geo_utils;

// Accumulation, nearest-sample search and re-basing
pub mod align;
pub use align::{
    accumulate, build_track, build_track_with_config, nearest_sample_index, AlignedSample,
    Track, TrackProfile, MIN_TRACK_SAMPLES,
};

// Playback timing for animation consumers
pub mod playback;
pub use playback::{compute_playback_interval, Marker, Playback};

// Per-file batch alignment with collected failures
pub mod batch;
pub use batch::{align_tracks, BatchResult, NamedTrack, TrackFailure, TrackInput};

// GPX decoding
#[cfg(feature = "gpx")]
pub mod gpx_io;

// JSON comparison dataset
#[cfg(feature = "serde")]
pub mod export;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude, in degrees.
///
/// Used both for sample positions and for user-supplied reference
/// coordinates.
///
/// # Example
/// ```
/// use ride_compare::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// The point as a `(latitude, longitude)` pair.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// One recorded GPS fix as delivered by a track-file decoder.
///
/// `timestamp` is optional because some formats omit it; alignment rejects
/// points without one. A missing `elevation` is read as 0 m.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl RawPoint {
    /// Create a timestamped fix without elevation.
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            latitude,
            longitude,
            elevation: None,
        }
    }

    /// Set the elevation in metres.
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// One accumulated sample in absolute terms.
///
/// `distance_km` is the running sum of great-circle distances from the first
/// point of the recording.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub elevation_m: f64,
}

impl Sample {
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// How elevation is reported after re-basing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElevationMode {
    /// Elevation relative to the start sample (start reads 0 m).
    #[default]
    Relative,
    /// Elevation above sea level, as recorded.
    Absolute,
}

/// Configuration for aligning a track.
///
/// # Example
/// ```
/// use ride_compare::{AlignConfig, ElevationMode, GpsPoint};
///
/// let config = AlignConfig {
///     start_ref: Some(GpsPoint::new(51.50, -0.12)),
///     elevation: ElevationMode::Absolute,
///     ..AlignConfig::default()
/// };
/// assert!(config.end_ref.is_none());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlignConfig {
    /// Landmark whose nearest sample becomes the zero reference.
    /// Default: none (first sample)
    pub start_ref: Option<GpsPoint>,

    /// Landmark whose nearest sample ends the retained slice (exclusive).
    /// Default: none (keep through the last sample)
    pub end_ref: Option<GpsPoint>,

    /// Whether elevation is re-based along with the other fields.
    /// Default: [`ElevationMode::Relative`]
    pub elevation: ElevationMode,
}

impl AlignConfig {
    /// Configuration with the given reference coordinates and default elevation handling.
    pub fn with_refs(start_ref: Option<GpsPoint>, end_ref: Option<GpsPoint>) -> Self {
        Self {
            start_ref,
            end_ref,
            ..Self::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
