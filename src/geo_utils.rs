//! # Geographic Utilities
//!
//! The distance engine behind track alignment.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`great_circle_distance`] | Haversine surface distance between two GPS points, in km |
//! | [`planar_distance`] | Euclidean distance between two 2D coordinates |
//!
//! ## Example
//!
//! ```rust
//! use ride_compare::{GpsPoint, geo_utils};
//!
//! let a = GpsPoint::new(0.0, 0.0);
//! let b = GpsPoint::new(0.0, 0.001);
//!
//! let km = geo_utils::great_circle_distance(&a, &b);
//! assert!((km - 0.111).abs() < 0.001);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances use the haversine formula on a sphere of radius 6371 km. The
//! `atan2` form of the central angle keeps coincident and antipodal points
//! numerically stable.
//!
//! ### Planar distance
//!
//! [`planar_distance`] treats a `(latitude, longitude)` pair as a flat 2D
//! coordinate. It is only meaningful for ranking candidates that are close
//! to each other, never for reporting a distance.

use geo::{Distance, Euclidean, Point};

use crate::GpsPoint;

/// Sphere radius used for all great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two GPS points using the haversine formula.
///
/// Returns kilometres along the surface of a sphere of radius
/// [`EARTH_RADIUS_KM`]. Symmetric, non-negative, and exactly `0.0` for
/// identical inputs.
///
/// # Example
///
/// ```rust
/// use ride_compare::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::great_circle_distance(&london, &paris);
/// assert!((distance - 343.5).abs() < 1.0);
/// ```
#[inline]
pub fn great_circle_distance(origin: &GpsPoint, destination: &GpsPoint) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = destination.latitude.to_radians();
    let dlat = (destination.latitude - origin.latitude).to_radians();
    let dlng = (destination.longitude - origin.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Euclidean distance between two 2D coordinates given as `(x, y)` pairs.
///
/// Used with `(latitude, longitude)` pairs to rank candidate samples in
/// nearest-point search. Both axes contribute: `sqrt((x1-x0)^2 + (y1-y0)^2)`.
///
/// # Example
///
/// ```rust
/// use ride_compare::geo_utils::planar_distance;
///
/// assert_eq!(planar_distance((0.0, 0.0), (3.0, 4.0)), 5.0);
/// // Points sharing an x value are still distinguished by y.
/// assert!(planar_distance((1.0, 0.0), (1.0, 2.0)) > 0.0);
/// ```
#[inline]
pub fn planar_distance(p0: (f64, f64), p1: (f64, f64)) -> f64 {
    Euclidean::distance(Point::new(p0.0, p0.1), Point::new(p1.0, p1.1))
}

// =============================================================================
// Unit Tests
// =============================================================================
