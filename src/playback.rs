//! Playback timing for stepping through aligned tracks.
//!
//! A presentation layer animates several tracks together by advancing one
//! frame index per tick: frame `i` shows sample `i` of every track. This
//! module supplies the tick interval and the marker coordinates per frame so
//! renderers never recompute anything from the raw data.

use std::time::Duration;

use geo::Coord;

use crate::error::{Result, TrackError};
use crate::{Track, MIN_TRACK_SAMPLES};

/// Real-time pause between frames for `track` played at `speed`x.
///
/// The gap between the first two retained samples, divided by `speed`. This
/// is a pacing hint only: it assumes near-uniform sampling and nothing is
/// resampled.
///
/// # Example
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use ride_compare::{build_track, compute_playback_interval, RawPoint};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
/// let points: Vec<RawPoint> = (0..3)
///     .map(|i| RawPoint::new(t0 + TimeDelta::seconds(10 * i), 0.0, i as f64 * 0.001))
///     .collect();
/// let track = build_track(&points, None, None).unwrap();
///
/// let interval = compute_playback_interval(&track, 2.0).unwrap();
/// assert_eq!(interval.as_millis(), 5000);
/// ```
pub fn compute_playback_interval(track: &Track, speed: f64) -> Result<Duration> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(TrackError::InvalidSpeed(speed));
    }

    let [first, second, ..] = track.samples() else {
        return Err(TrackError::InsufficientSamples {
            retained: track.len(),
            minimum: MIN_TRACK_SAMPLES,
        });
    };

    // Timestamps are non-decreasing after accumulation, so this never clamps.
    let gap = (second.elapsed - first.elapsed).to_std().unwrap_or(Duration::ZERO);
    // Tiny speeds can push the interval past what `Duration` holds.
    Duration::try_from_secs_f64(gap.as_secs_f64() / speed)
        .map_err(|_| TrackError::InvalidSpeed(speed))
}

/// Position of one track's marker in a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Index of the track in the slice given to [`Playback::new`].
    pub track: usize,
    /// Sample shown; the last sample once the track has run out.
    pub sample: usize,
    /// Map coordinate: `x` = longitude delta, `y` = latitude delta.
    pub position: Coord<f64>,
    /// Profile coordinate: `x` = distance in km, `y` = elevation in m.
    pub profile: Coord<f64>,
    /// The frame index is past this track's last sample.
    pub finished: bool,
}

/// Frame-by-frame playback over a set of aligned tracks.
#[derive(Debug, Clone)]
pub struct Playback<'a> {
    tracks: &'a [Track],
    interval: Duration,
    frame_count: usize,
}

impl<'a> Playback<'a> {
    /// Set up playback at `speed`x.
    ///
    /// The interval is taken from the first track; the frame count is the
    /// length of the longest one. Fails with [`TrackError::EmptyTrack`] when
    /// `tracks` is empty.
    pub fn new(tracks: &'a [Track], speed: f64) -> Result<Self> {
        let first = tracks.first().ok_or(TrackError::EmptyTrack)?;
        let interval = compute_playback_interval(first, speed)?;
        let frame_count = tracks.iter().map(Track::len).max().unwrap_or(0);

        Ok(Self {
            tracks,
            interval,
            frame_count,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of frames needed to play the longest track to its end.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Wall-clock length of the whole animation, `None` if it overflows
    /// `Duration`.
    pub fn total_duration(&self) -> Option<Duration> {
        let frames = u32::try_from(self.frame_count).ok()?;
        self.interval.checked_mul(frames)
    }

    /// One marker per track for `frame`.
    ///
    /// Tracks shorter than `frame` hold their last sample and report
    /// `finished`.
    pub fn markers(&self, frame: usize) -> Vec<Marker> {
        self.tracks
            .iter()
            .enumerate()
            .filter_map(|(track_idx, track)| {
                let last = track.len().checked_sub(1)?;
                let sample_idx = frame.min(last);
                let s = &track.samples()[sample_idx];
                Some(Marker {
                    track: track_idx,
                    sample: sample_idx,
                    position: Coord { x: s.longitude, y: s.latitude },
                    profile: Coord { x: s.distance_km, y: s.elevation_m },
                    finished: frame > last,
                })
            })
            .collect()
    }

    /// Markers for every frame in order.
    pub fn frames(&self) -> impl Iterator<Item = Vec<Marker>> + '_ {
        (0..self.frame_count).map(move |frame| self.markers(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_track, RawPoint};
    use chrono::{TimeDelta, TimeZone, Utc};

    fn track_with(n: i64, step_secs: i64) -> Track {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let points: Vec<RawPoint> = (0..n)
            .map(|i| {
                RawPoint::new(t0 + TimeDelta::seconds(step_secs * i), 0.0, i as f64 * 0.001)
                    .with_elevation(i as f64 * 5.0)
            })
            .collect();
        build_track(&points, None, None).unwrap()
    }

    #[test]
    fn test_interval_divides_by_speed() {
        let track = track_with(3, 10);
        assert_eq!(
            compute_playback_interval(&track, 2.0).unwrap(),
            Duration::from_millis(5000)
        );
        assert_eq!(
            compute_playback_interval(&track, 1.0).unwrap(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_interval_rejects_bad_speed() {
        let track = track_with(3, 10);
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                compute_playback_interval(&track, speed),
                Err(TrackError::InvalidSpeed(_))
            ));
        }
    }

    #[test]
    fn test_interval_overflow_is_an_error() {
        let track = track_with(3, 10);
        assert!(matches!(
            compute_playback_interval(&track, 1e-20),
            Err(TrackError::InvalidSpeed(s)) if s == 1e-20
        ));
        assert!(matches!(
            Playback::new(std::slice::from_ref(&track), 1e-20),
            Err(TrackError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_total_duration_overflow() {
        // 10 s / 1e-18 = 1e19 s still fits; three frames of it do not.
        let tracks = vec![track_with(3, 10)];
        let playback = Playback::new(&tracks, 1e-18).unwrap();
        assert_eq!(playback.frame_count(), 3);
        assert_eq!(playback.total_duration(), None);
    }

    #[test]
    fn test_interval_zero_gap() {
        let track = track_with(3, 0);
        assert_eq!(compute_playback_interval(&track, 60.0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_playback_frame_count_is_longest_track() {
        let tracks = vec![track_with(3, 10), track_with(5, 1)];
        let playback = Playback::new(&tracks, 2.0).unwrap();
        assert_eq!(playback.frame_count(), 5);
        // Interval comes from the first track.
        assert_eq!(playback.interval(), Duration::from_secs(5));
        assert_eq!(playback.total_duration(), Some(Duration::from_secs(25)));
    }

    #[test]
    fn test_markers_hold_last_sample() {
        let tracks = vec![track_with(3, 10), track_with(5, 10)];
        let playback = Playback::new(&tracks, 1.0).unwrap();

        let markers = playback.markers(4);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].sample, 2);
        assert!(markers[0].finished);
        assert_eq!(markers[0].profile.y, 10.0);
        assert_eq!(markers[1].sample, 4);
        assert!(!markers[1].finished);
        assert_eq!(markers[1].profile.y, 20.0);
    }

    #[test]
    fn test_frames_iterates_every_frame() {
        let tracks = vec![track_with(4, 1)];
        let playback = Playback::new(&tracks, 1.0).unwrap();
        let frames: Vec<Vec<Marker>> = playback.frames().collect();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0][0].position, Coord { x: 0.0, y: 0.0 });
        assert_eq!(frames[3][0].sample, 3);
    }

    #[test]
    fn test_playback_needs_a_track() {
        let tracks: Vec<Track> = vec![];
        assert!(matches!(
            Playback::new(&tracks, 1.0),
            Err(TrackError::EmptyTrack)
        ));
    }
}
