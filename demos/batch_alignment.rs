//! Example of aligning many rides of the same route in parallel.
//!
//! Run with: cargo run --example batch_alignment --features parallel

use chrono::{TimeDelta, TimeZone, Utc};
use ride_compare::{align_tracks, AlignConfig, GpsPoint, Playback, RawPoint, TrackInput};
use std::time::Instant;

fn main() {
    println!("Batch Ride Alignment Example\n");

    let base_route: Vec<GpsPoint> = (0..200)
        .map(|i| GpsPoint::new(51.5074 + i as f64 * 0.0003, -0.1278 + (i as f64 * 0.05).sin() * 0.001))
        .collect();

    // Ten attempts with different pacing and small GPS offsets
    let mut inputs: Vec<TrackInput> = (0..10)
        .map(|attempt| {
            let t0 = Utc.with_ymd_and_hms(2024, 6, 1 + attempt, 7, 0, 0).unwrap();
            let step = 2 + (attempt % 3) as i64;
            let points = add_noise(&base_route, 0.00002 * attempt as f64)
                .into_iter()
                .enumerate()
                .map(|(i, p)| {
                    RawPoint::new(t0 + TimeDelta::seconds(step * i as i64), p.latitude, p.longitude)
                        .with_elevation(20.0 + i as f64 * 0.2)
                })
                .collect();
            TrackInput::new(format!("attempt-{}", attempt), points)
        })
        .collect();

    // One recording from a device that did not log time
    let untimed = base_route
        .iter()
        .map(|p| RawPoint {
            timestamp: None,
            latitude: p.latitude,
            longitude: p.longitude,
            elevation: None,
        })
        .collect();
    inputs.push(TrackInput::new("no-clock", untimed));

    let config = AlignConfig::with_refs(Some(base_route[20]), Some(base_route[180]));

    let start = Instant::now();
    let result = align_tracks(&inputs, &config);
    let elapsed = start.elapsed();

    println!("Aligned {} tracks in {:?}\n", result.tracks.len(), elapsed);

    for named in &result.tracks {
        println!(
            "  {:<12} {:>4} samples, {:.3} km in {:>4}s",
            named.name,
            named.track.len(),
            named.track.distance_km(),
            named.track.duration().num_seconds()
        );
    }

    for failure in &result.failures {
        println!("  {:<12} FAILED: {}", failure.name, failure.error);
    }

    let tracks = result.track_list();
    if let Ok(playback) = Playback::new(&tracks, 30.0) {
        println!(
            "\nPlayback: {} frames at {:?} per frame",
            playback.frame_count(),
            playback.interval()
        );
    }
}

/// Add small noise to route points to simulate GPS variation
fn add_noise(route: &[GpsPoint], noise: f64) -> Vec<GpsPoint> {
    route
        .iter()
        .enumerate()
        .map(|(i, p)| {
            GpsPoint::new(
                p.latitude + noise * (i as f64 % 2.0 - 0.5),
                p.longitude + noise * ((i + 1) as f64 % 2.0 - 0.5),
            )
        })
        .collect()
}
