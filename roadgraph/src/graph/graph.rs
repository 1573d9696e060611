use super::edge::Edge;
use crate::error::GraphError;
use crate::spatial::GeoPoint;
use rstar::RTree;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Directed multigraph of road intersections.
///
/// Each vertex key maps to the list of its outgoing edges, kept in insertion order so that
/// searches over the same graph expand vertices in the same order on every run. Parallel
/// edges between the same pair of vertices are allowed.
///
/// The graph is meant to be built once and then queried. It has no internal locking, so it must
/// not be mutated while a search over it is running.
pub struct Graph {
  adjacency: HashMap<GeoPoint, Vec<Edge>>,
  // Vertex keys in insertion order
  order: Vec<GeoPoint>,
  rtree: RTree<[f64; 2]>,
  num_edges: usize,
}

impl Graph {
  pub fn new() -> Self {
    Graph {
      adjacency: HashMap::new(),
      order: Vec::new(),
      rtree: RTree::new(),
      num_edges: 0,
    }
  }

  /// Adds an intersection at `location`.
  ///
  /// Returns `false` and leaves the graph untouched if the location is already a vertex or has a
  /// non-finite coordinate.
  pub fn add_vertex(&mut self, location: GeoPoint) -> bool {
    if !location.is_valid() {
      debug!("Rejected invalid vertex ({})", location);
      return false;
    }
    if self.adjacency.contains_key(&location) {
      return false;
    }
    self.adjacency.insert(location, Vec::new());
    self.order.push(location);
    self.rtree.insert(to_rtree_point(&location));
    true
  }

  /// Adds a directed road segment from `from` to `to`.
  ///
  /// Both endpoints must already be vertices. The length is in km and must be a finite positive
  /// number. No reverse edge is created.
  pub fn add_edge(
    &mut self,
    from: GeoPoint,
    to: GeoPoint,
    road_name: &str,
    road_type: &str,
    length: f64,
  ) -> Result<(), GraphError> {
    self.require_vertex(&from)?;
    self.require_vertex(&to)?;
    if !length.is_finite() || length <= 0.0 {
      debug!("Rejected edge ({}) -> ({}) with length {}", from, to, length);
      return Err(GraphError::InvalidArgument(format!(
        "edge length must be a positive number, got {}",
        length
      )));
    }
    let edges = self
      .adjacency
      .get_mut(&from)
      .ok_or(GraphError::UnknownVertex(from))?;
    edges.push(Edge::new(
      from,
      to,
      road_name.to_owned(),
      road_type.to_owned(),
      length,
    ));
    self.num_edges += 1;
    Ok(())
  }

  pub fn number_of_vertices(&self) -> usize {
    self.adjacency.len()
  }

  pub fn number_of_edges(&self) -> usize {
    self.num_edges
  }

  pub fn contains(&self, location: &GeoPoint) -> bool {
    self.adjacency.contains_key(location)
  }

  /// All vertex keys. The order is an implementation detail (currently insertion order).
  pub fn vertices(&self) -> impl Iterator<Item = GeoPoint> + '_ {
    self.order.iter().cloned()
  }

  /// Outgoing edges of `vertex`, in the order they were added.
  pub fn neighbors(&self, vertex: &GeoPoint) -> Result<&[Edge], GraphError> {
    self
      .adjacency
      .get(vertex)
      .map(|edges| edges.as_slice())
      .ok_or(GraphError::UnknownVertex(*vertex))
  }

  /// The vertex closest to an arbitrary location, or `None` for an empty graph.
  ///
  /// Distances are compared in plain lon/lat degrees. That is good enough to snap a query
  /// coordinate onto the network, but it is not a geodesic nearest-neighbour search.
  pub fn nearest_vertex(&self, location: &GeoPoint) -> Option<GeoPoint> {
    self
      .rtree
      .nearest_neighbor(&to_rtree_point(location))
      .map(|p| GeoPoint::new(p[1], p[0]))
  }

  pub(crate) fn require_vertex(&self, vertex: &GeoPoint) -> Result<(), GraphError> {
    if self.contains(vertex) {
      Ok(())
    } else {
      Err(GraphError::UnknownVertex(*vertex))
    }
  }
}

impl Default for Graph {
  fn default() -> Self {
    Graph::new()
  }
}

fn to_rtree_point(p: &GeoPoint) -> [f64; 2] {
  [p.lon, p.lat]
}

impl fmt::Display for Graph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Adjacency List")?;
    for vertex in &self.order {
      write!(f, "\n\t{}: ", vertex)?;
      for edge in &self.adjacency[vertex] {
        write!(f, "{}, ", edge)?;
      }
    }
    Ok(())
  }
}
