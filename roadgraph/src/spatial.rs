//! Geographic types.

use geo::{haversine_distance::HaversineDistance, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[doc(hidden)]
pub use geo::Coordinate;

/// A road-network location in degrees.
///
/// Points are used as vertex keys, so equality and hashing work on the exact
/// bit pattern of both coordinates (with `-0.0` folded into `0.0`). Two points
/// parsed from the same text are always the same key.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct GeoPoint {
  pub lat: f64,
  pub lon: f64,
}

impl GeoPoint {
  pub fn new(lat: f64, lon: f64) -> Self {
    GeoPoint { lat, lon }
  }

  /// Both coordinates are finite numbers.
  pub fn is_valid(&self) -> bool {
    self.lat.is_finite() && self.lon.is_finite()
  }

  /// Great-circle distance to `other` in kilometres.
  pub fn distance(&self, other: &GeoPoint) -> f64 {
    haversine_distance(self, other)
  }

  fn key_bits(&self) -> (u64, u64) {
    (canonical_bits(self.lat), canonical_bits(self.lon))
  }
}

fn canonical_bits(value: f64) -> u64 {
  if value == 0.0 {
    0f64.to_bits()
  } else {
    value.to_bits()
  }
}

impl PartialEq for GeoPoint {
  fn eq(&self, other: &Self) -> bool {
    self.key_bits() == other.key_bits()
  }
}

impl Eq for GeoPoint {}

impl Hash for GeoPoint {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.key_bits().hash(state);
  }
}

impl fmt::Display for GeoPoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Lat: {}, Lon: {}", self.lat, self.lon)
  }
}

impl From<GeoPoint> for Coordinate<f64> {
  fn from(p: GeoPoint) -> Self {
    Coordinate { x: p.lon, y: p.lat }
  }
}

impl From<Coordinate<f64>> for GeoPoint {
  fn from(c: Coordinate<f64>) -> Self {
    GeoPoint::new(c.y, c.x)
  }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
  let from = Point::from(Coordinate::from(*from));
  let to = Point::from(Coordinate::from(*to));
  from.haversine_distance(&to) / 1000.0
}

/// Estimate of the remaining cost from a vertex to the goal, used by A*.
///
/// A* returns optimal routes only when the estimate is admissible (never
/// larger than the true remaining cost) and consistent with edge lengths.
/// Neither property is checked; it is up to the caller to pick a heuristic
/// which matches how edge lengths were computed.
pub trait Heuristic {
  fn estimate(&self, from: &GeoPoint, goal: &GeoPoint) -> f64;
}

/// Straight-line (great-circle) distance in km. Admissible whenever edge
/// lengths are road lengths in km.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreatCircle;

impl Heuristic for GreatCircle {
  fn estimate(&self, from: &GeoPoint, goal: &GeoPoint) -> f64 {
    from.distance(goal)
  }
}

/// Zero estimate. A* with this heuristic expands vertices exactly like Dijkstra.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHeuristic;

impl Heuristic for NoHeuristic {
  fn estimate(&self, _from: &GeoPoint, _goal: &GeoPoint) -> f64 {
    0.0
  }
}

impl<F: Fn(&GeoPoint, &GeoPoint) -> f64> Heuristic for F {
  fn estimate(&self, from: &GeoPoint, goal: &GeoPoint) -> f64 {
    self(from, goal)
  }
}
