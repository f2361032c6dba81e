//! Error types for track alignment.
//!
//! Every error is scoped to a single track: the batch layer records it next to
//! the track name and keeps going with the remaining inputs.

use thiserror::Error;

use crate::GpsPoint;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Reasons a single track cannot be turned into an aligned [`Track`](crate::Track).
#[derive(Error, Debug)]
pub enum TrackError {
    /// The input contained no points at all.
    #[error("track has no points")]
    EmptyTrack,

    /// A point has no timestamp, so elapsed times are undefined.
    #[error("point {index} has no timestamp")]
    MissingTimestamp { index: usize },

    /// A point is timestamped before its predecessor.
    #[error("point {index} is timestamped before the point preceding it")]
    TimestampRegression { index: usize },

    /// A point has a non-finite or out-of-range coordinate.
    #[error("point {index} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// A reference coordinate is not a finite number.
    #[error("reference coordinate ({latitude}, {longitude}) is not finite")]
    InvalidReference { latitude: f64, longitude: f64 },

    /// The end reference resolved to a sample before the start reference.
    #[error(
        "end reference ({end_lat:.6}, {end_lng:.6}) resolved to sample {end_index}, before start reference ({start_lat:.6}, {start_lng:.6}) at sample {start_index}",
        end_lat = .end_ref.latitude,
        end_lng = .end_ref.longitude,
        start_lat = .start_ref.latitude,
        start_lng = .start_ref.longitude
    )]
    InvalidReferenceOrder {
        start_index: usize,
        end_index: usize,
        start_ref: GpsPoint,
        end_ref: GpsPoint,
    },

    /// Too few samples remain after slicing to derive a sampling interval.
    #[error("only {retained} samples retained after slicing, need at least {minimum}")]
    InsufficientSamples { retained: usize, minimum: usize },

    /// Playback speed must be a finite, strictly positive multiplier.
    #[error("invalid playback speed {0}, must be finite and > 0")]
    InvalidSpeed(f64),

    #[error("failed to parse GPX: {0}")]
    GpxParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize dataset: {0}")]
    Json(String),
}

impl TrackError {
    /// Short machine-friendly name of the error kind, used in exported failure lists.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackError::EmptyTrack => "empty_track",
            TrackError::MissingTimestamp { .. } => "missing_timestamp",
            TrackError::TimestampRegression { .. } => "timestamp_regression",
            TrackError::InvalidCoordinate { .. } => "invalid_coordinate",
            TrackError::InvalidReference { .. } => "invalid_reference",
            TrackError::InvalidReferenceOrder { .. } => "invalid_reference_order",
            TrackError::InsufficientSamples { .. } => "insufficient_samples",
            TrackError::InvalidSpeed(_) => "invalid_speed",
            TrackError::GpxParse(_) => "gpx_parse",
            TrackError::Io(_) => "io",
            TrackError::Json(_) => "json",
        }
    }
}
