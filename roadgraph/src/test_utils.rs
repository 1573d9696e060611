use crate::graph::Graph;
use crate::spatial::GeoPoint;

pub fn point(lat: f64, lon: f64) -> GeoPoint {
  GeoPoint::new(lat, lon)
}

/// Builds a graph from `(lat, lon)` pairs and `(from_index, to_index, length)` edges.
pub fn graph_from_points_and_edges(points: Vec<(f64, f64)>, edges: Vec<(usize, usize, f64)>) -> Graph {
  let mut graph = Graph::new();
  for (lat, lon) in &points {
    graph.add_vertex(point(*lat, *lon));
  }
  for (from, to, length) in edges {
    let from = point(points[from].0, points[from].1);
    let to = point(points[to].0, points[to].1);
    graph.add_edge(from, to, "road", "residential", length).unwrap();
  }
  graph
}

/// Every consecutive pair of `path` is joined by at least one edge in the direction of travel.
pub fn is_connected_path(graph: &Graph, path: &[GeoPoint]) -> bool {
  path.windows(2).all(|pair| {
    graph
      .neighbors(&pair[0])
      .map(|edges| edges.iter().any(|e| e.to() == pair[1]))
      .unwrap_or(false)
  })
}
