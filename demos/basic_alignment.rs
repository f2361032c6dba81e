//! Basic example of aligning one ride to a start landmark.
//!
//! Run with: cargo run --example basic_alignment

use chrono::{TimeDelta, TimeZone, Utc};
use ride_compare::{build_track, compute_playback_interval, GpsPoint, RawPoint};

fn main() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 7, 30, 0).unwrap();

    // A short climb out of town, one fix every 5 seconds
    let ride: Vec<RawPoint> = (0..12)
        .map(|i| {
            RawPoint::new(
                t0 + TimeDelta::seconds(5 * i),
                46.5200 + i as f64 * 0.0004,
                6.6300 + i as f64 * 0.0003,
            )
            .with_elevation(380.0 + i as f64 * 2.5)
        })
        .collect();

    // Start of the timed segment, a little off the recorded line
    let segment_start = GpsPoint::new(46.52121, 6.63089);
    let segment_end = GpsPoint::new(46.52402, 6.63301);

    println!("Ride Alignment Example\n");

    match build_track(&ride, Some(segment_start), Some(segment_end)) {
        Ok(track) => {
            println!(
                "Segment covers samples {}..{} of {}",
                track.start_index(),
                track.end_index(),
                ride.len()
            );
            println!("  Distance: {:.3} km", track.distance_km());
            println!("  Duration: {}s", track.duration().num_seconds());
            println!(
                "  Climb:    {:.1} m",
                track.samples().last().map_or(0.0, |s| s.elevation_m)
            );

            println!("\n  {:>6} {:>10} {:>8}", "t (s)", "dist (km)", "ele (m)");
            for s in track.samples() {
                println!(
                    "  {:>6} {:>10.3} {:>8.1}",
                    s.elapsed.num_seconds(),
                    s.distance_km,
                    s.elevation_m
                );
            }

            if let Ok(interval) = compute_playback_interval(&track, 60.0) {
                println!("\nPlayback at 60x: {:?} per frame", interval);
            }
        }
        Err(e) => println!("Could not align ride: {}", e),
    }
}
