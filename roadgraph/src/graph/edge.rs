use crate::spatial::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed road segment.
///
/// Edges are created by [`Graph::add_edge`](super::Graph::add_edge), which guarantees that both
/// endpoints are vertices of the graph and that `length > 0`. Once stored they are never modified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
  from: GeoPoint,
  to: GeoPoint,
  road_name: String,
  road_type: String,
  length: f64,
}

impl Edge {
  pub(crate) fn new(from: GeoPoint, to: GeoPoint, road_name: String, road_type: String, length: f64) -> Self {
    Edge {
      from,
      to,
      road_name,
      road_type,
      length,
    }
  }

  pub fn from(&self) -> GeoPoint {
    self.from
  }

  pub fn to(&self) -> GeoPoint {
    self.to
  }

  pub fn road_name(&self) -> &str {
    &self.road_name
  }

  pub fn road_type(&self) -> &str {
    &self.road_type
  }

  /// Length in km. Also the weight used by least-cost searches.
  pub fn length(&self) -> f64 {
    self.length
  }
}

impl fmt::Display for Edge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[From: {} To: {} RoadName: {} RoadType: {} Length: {}]",
      self.from, self.to, self.road_name, self.road_type, self.length
    )
  }
}
