//! End-to-end alignment scenarios

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ride_compare::geo_utils::great_circle_distance;
use ride_compare::{
    align_tracks, build_track, compute_playback_interval, AlignConfig, GpsPoint, Playback,
    RawPoint, TrackError, TrackInput,
};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

/// A ten-fix ride heading north-east with some wobble in longitude.
fn wobbly_ride() -> Vec<RawPoint> {
    (0..10)
        .map(|i| {
            let wobble = if i % 2 == 0 { 0.0002 } else { -0.0002 };
            RawPoint::new(
                t0() + TimeDelta::seconds(3 * i),
                45.0 + i as f64 * 0.0008,
                7.0 + i as f64 * 0.0005 + wobble,
            )
            .with_elevation(400.0 + (i * i) as f64)
        })
        .collect()
}

#[test]
fn test_distance_identity_and_symmetry() {
    let points = [
        GpsPoint::new(0.0, 0.0),
        GpsPoint::new(45.0, 7.0),
        GpsPoint::new(-33.9, 18.4),
        GpsPoint::new(89.9, -179.9),
    ];
    for a in &points {
        assert_eq!(great_circle_distance(a, a), 0.0);
        for b in &points {
            assert_eq!(great_circle_distance(a, b), great_circle_distance(b, a));
            assert!(great_circle_distance(a, b) >= 0.0);
        }
    }
}

#[test]
fn test_concrete_equator_scenario() {
    let points = vec![
        RawPoint::new(t0(), 0.0, 0.0).with_elevation(0.0),
        RawPoint::new(t0() + TimeDelta::seconds(10), 0.0, 0.001).with_elevation(5.0),
        RawPoint::new(t0() + TimeDelta::seconds(20), 0.0, 0.002).with_elevation(10.0),
    ];

    let step = great_circle_distance(&GpsPoint::new(0.0, 0.0), &GpsPoint::new(0.0, 0.001));
    assert!(approx_eq(step, 0.111, 0.001));

    let track = build_track(&points, None, None).unwrap();
    let distances: Vec<f64> = track.samples().iter().map(|s| s.distance_km).collect();
    assert_eq!(distances[0], 0.0);
    assert!(approx_eq(distances[1], 0.111, 0.001));
    assert!(approx_eq(distances[2], 0.222, 0.001));

    let interval = compute_playback_interval(&track, 2.0).unwrap();
    assert_eq!(interval.as_millis(), 5000);
}

#[test]
fn test_no_refs_yields_every_sample() {
    let points = wobbly_ride();
    let track = build_track(&points, None, None).unwrap();
    assert_eq!(track.len(), points.len());
    assert_eq!(track.samples()[0].distance_km, 0.0);
    for w in track.samples().windows(2) {
        assert!(w[1].distance_km >= w[0].distance_km);
        assert!(w[1].elapsed >= w[0].elapsed);
    }
}

#[test]
fn test_start_sample_is_zero_for_any_start_ref() {
    let points = wobbly_ride();
    for start in 0..points.len() - 1 {
        // Nudge the landmark off the exact fix to exercise the search.
        let landmark = GpsPoint::new(points[start].latitude + 0.00001, points[start].longitude);
        let track = build_track(&points, Some(landmark), None).unwrap();

        assert_eq!(track.start_index(), start);
        let first = track.samples()[0];
        assert_eq!(first.elapsed, TimeDelta::zero());
        assert_eq!(first.distance_km, 0.0);
        assert_eq!(first.latitude, 0.0);
        assert_eq!(first.longitude, 0.0);
        assert_eq!(first.elevation_m, 0.0);
    }
}

#[test]
fn test_exact_landmark_resolves_to_its_sample() {
    let points = wobbly_ride();
    let track = build_track(&points, Some(points[6].position()), None).unwrap();
    assert_eq!(track.start_index(), 6);
}

#[test]
fn test_end_before_start_is_rejected() {
    let points = wobbly_ride();
    let err = build_track(&points, Some(points[5].position()), Some(points[2].position()))
        .unwrap_err();
    assert!(matches!(
        err,
        TrackError::InvalidReferenceOrder {
            start_index: 5,
            end_index: 2,
            ..
        }
    ));
}

#[test]
fn test_distances_are_rebased_not_restarted() {
    let points = wobbly_ride();
    let full = build_track(&points, None, None).unwrap();
    let sliced = build_track(&points, Some(points[3].position()), Some(points[8].position()))
        .unwrap();

    for (i, s) in sliced.samples().iter().enumerate() {
        let expected = full.samples()[i + 3].distance_km - full.samples()[3].distance_km;
        assert!(approx_eq(s.distance_km, expected, 1e-12));
    }
}

#[test]
fn test_batch_with_untimed_file() {
    let mut untimed = wobbly_ride();
    for p in &mut untimed {
        p.timestamp = None;
    }
    let inputs = vec![
        TrackInput::new("morning.gpx", wobbly_ride()),
        TrackInput::new("untimed.gpx", untimed),
    ];
    let result = align_tracks(&inputs, &AlignConfig::default());

    assert_eq!(result.tracks.len(), 1);
    assert_eq!(result.tracks[0].name, "morning.gpx");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].name, "untimed.gpx");
    assert_eq!(result.failures[0].error.kind(), "missing_timestamp");
}

#[test]
fn test_two_rides_share_a_frame_of_reference() {
    // The second ride starts 2 fixes earlier on the same road.
    let first = wobbly_ride();
    let mut second: Vec<RawPoint> = (0..2)
        .map(|i| {
            RawPoint::new(
                t0() + TimeDelta::seconds(i),
                44.9984 + i as f64 * 0.0008,
                6.999,
            )
        })
        .collect();
    second.extend(wobbly_ride().into_iter().map(|mut p| {
        p.timestamp = p.timestamp.map(|t| t + TimeDelta::seconds(2));
        p
    }));

    let config = AlignConfig::with_refs(Some(first[1].position()), Some(first[9].position()));
    let result = align_tracks(
        &[TrackInput::new("a", first), TrackInput::new("b", second)],
        &config,
    );
    assert!(result.is_complete());

    let a = &result.tracks[0].track;
    let b = &result.tracks[1].track;
    assert_eq!(a.start_index(), 1);
    assert_eq!(b.start_index(), 3);
    assert_eq!(a.len(), b.len());
    assert!(approx_eq(a.distance_km(), b.distance_km(), 1e-9));

    let tracks = result.track_list();
    let playback = Playback::new(&tracks, 3.0).unwrap();
    assert_eq!(playback.frame_count(), 8);
    assert_eq!(playback.interval().as_millis(), 1000);
}
