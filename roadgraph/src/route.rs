//! Route finding algorithms.
//!
//! Three searches over a [`Graph`]:
//! - [`bfs`] finds a route with the fewest road segments and ignores lengths.
//! - [`dijkstra`] finds a route with the smallest total length.
//! - [`astar`] finds the same route as [`dijkstra`], guided by a [`Heuristic`].
//!
//! Each search has a `_with` variant taking a [`Visitor`], which is called once for every vertex
//! the search takes off its frontier. The visitor is the hook for UI highlighting, statistics and
//! cancellation (see [`Cancellable`]).
//!
//! A missing start or goal vertex is an error. A query between existing vertices always succeeds
//! with either [`PathResult::Found`] or [`PathResult::NotFound`].

use crate::error::GraphError;
use crate::graph::Graph;
use crate::search_space::*;
use crate::spatial::{GeoPoint, GreatCircle, Heuristic, NoHeuristic};

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Observer of the vertices a search expands.
pub trait Visitor {
  fn visit(&mut self, vertex: &GeoPoint);

  /// Checked between iterations; returning `true` abandons the search with
  /// [`PathResult::Cancelled`].
  fn should_stop(&self) -> bool {
    false
  }
}

impl<F: FnMut(&GeoPoint)> Visitor for F {
  fn visit(&mut self, vertex: &GeoPoint) {
    self(vertex)
  }
}

/// Wraps a visitor with an abort flag which can be raised from the visitor itself or from
/// another thread.
pub struct Cancellable<'a, V: Visitor> {
  visitor: V,
  abort: &'a AtomicBool,
}

impl<'a, V: Visitor> Cancellable<'a, V> {
  pub fn new(visitor: V, abort: &'a AtomicBool) -> Self {
    Cancellable { visitor, abort }
  }
}

impl<'a, V: Visitor> Visitor for Cancellable<'a, V> {
  fn visit(&mut self, vertex: &GeoPoint) {
    self.visitor.visit(vertex)
  }

  fn should_stop(&self) -> bool {
    self.abort.load(Ordering::Relaxed) || self.visitor.should_stop()
  }
}

fn no_visitor(_: &GeoPoint) {}

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
  /// Vertices from start to goal, both inclusive
  pub vertices: Vec<GeoPoint>,
  /// Total length in km of the edges the route was discovered through
  pub length: f64,
  /// Number of vertices taken off the frontier
  pub visited: usize,
}

/// Outcome of a route query.
#[derive(Clone, Debug, PartialEq)]
pub enum PathResult {
  Found(Route),
  /// The frontier ran out before reaching the goal.
  NotFound,
  /// The visitor asked to stop.
  Cancelled,
}

impl PathResult {
  pub fn is_found(&self) -> bool {
    matches!(self, PathResult::Found(_))
  }

  pub fn route(&self) -> Option<&Route> {
    match self {
      PathResult::Found(route) => Some(route),
      _ => None,
    }
  }

  pub fn into_route(self) -> Option<Route> {
    match self {
      PathResult::Found(route) => Some(route),
      _ => None,
    }
  }

  /// The vertex sequence of a found route.
  pub fn path(&self) -> Option<&[GeoPoint]> {
    self.route().map(|route| route.vertices.as_slice())
  }
}

/// Fewest-edges route from `start` to `goal`.
pub fn bfs(graph: &Graph, start: GeoPoint, goal: GeoPoint) -> Result<PathResult, GraphError> {
  bfs_with(graph, start, goal, no_visitor)
}

pub fn bfs_with<V: Visitor>(
  graph: &Graph,
  start: GeoPoint,
  goal: GeoPoint,
  mut visitor: V,
) -> Result<PathResult, GraphError> {
  graph.require_vertex(&start)?;
  graph.require_vertex(&goal)?;
  debug!(algorithm = "bfs", %start, %goal, "Route search started");

  let mut queue = VecDeque::new();
  let mut visited = HashSet::new();
  let mut parent = HashMap::new();
  // Length of the discovering route, for reporting only
  let mut length = HashMap::new();
  let mut num_visited = 0;

  queue.push_back(start);
  visited.insert(start);
  parent.insert(start, start);
  length.insert(start, 0.0);

  while let Some(current) = queue.pop_front() {
    if visitor.should_stop() {
      debug!(algorithm = "bfs", visited = num_visited, "Route search cancelled");
      return Ok(PathResult::Cancelled);
    }
    visitor.visit(&current);
    num_visited += 1;
    trace!(vertex = %current, "Visit");

    if current == goal {
      let route = Route {
        vertices: unwind(&parent, goal),
        length: length[&goal],
        visited: num_visited,
      };
      debug!(algorithm = "bfs", visited = num_visited, edges = route.vertices.len() - 1, "Route found");
      return Ok(PathResult::Found(route));
    }

    let current_length = length[&current];
    for edge in graph.neighbors(&current)? {
      let next = edge.to();
      if visited.insert(next) {
        parent.insert(next, current);
        length.insert(next, current_length + edge.length());
        queue.push_back(next);
      }
    }
  }

  debug!(algorithm = "bfs", visited = num_visited, "No route found");
  Ok(PathResult::NotFound)
}

/// Shortest route from `start` to `goal` by total edge length.
pub fn dijkstra(graph: &Graph, start: GeoPoint, goal: GeoPoint) -> Result<PathResult, GraphError> {
  dijkstra_with(graph, start, goal, no_visitor)
}

pub fn dijkstra_with<V: Visitor>(
  graph: &Graph,
  start: GeoPoint,
  goal: GeoPoint,
  visitor: V,
) -> Result<PathResult, GraphError> {
  least_cost(graph, start, goal, &NoHeuristic, visitor, "dijkstra")
}

/// Shortest route from `start` to `goal` by total edge length, guided by great-circle distance.
///
/// The result is optimal as long as edge lengths are never shorter than the straight-line
/// distance between their endpoints, which holds for graphs built from real road geometry.
pub fn astar(graph: &Graph, start: GeoPoint, goal: GeoPoint) -> Result<PathResult, GraphError> {
  astar_with(graph, start, goal, &GreatCircle, no_visitor)
}

/// A* search with a caller supplied heuristic.
///
/// The heuristic must be admissible and consistent for the returned route to be the shortest one;
/// this is not checked. With a zero heuristic the search behaves exactly like [`dijkstra`].
pub fn astar_with<H: Heuristic, V: Visitor>(
  graph: &Graph,
  start: GeoPoint,
  goal: GeoPoint,
  heuristic: &H,
  visitor: V,
) -> Result<PathResult, GraphError> {
  least_cost(graph, start, goal, heuristic, visitor, "astar")
}

fn least_cost<H: Heuristic, V: Visitor>(
  graph: &Graph,
  start: GeoPoint,
  goal: GeoPoint,
  heuristic: &H,
  mut visitor: V,
  algorithm: &'static str,
) -> Result<PathResult, GraphError> {
  graph.require_vertex(&start)?;
  graph.require_vertex(&goal)?;
  debug!(algorithm, %start, %goal, "Route search started");

  let mut search_space: SearchSpace<f64, GeoPoint> = SearchSpace::new();
  let mut num_visited = 0;

  search_space.init(start, heuristic.estimate(&start, &goal));

  loop {
    if visitor.should_stop() {
      debug!(algorithm, visited = num_visited, "Route search cancelled");
      return Ok(PathResult::Cancelled);
    }
    let current = match search_space.next() {
      Some(id) => id,
      None => break,
    };
    visitor.visit(&current);
    num_visited += 1;
    trace!(vertex = %current, "Visit");

    if current == goal {
      let route = Route {
        vertices: search_space.unwind(goal),
        length: search_space.distance(goal).unwrap_or_default(),
        visited: num_visited,
      };
      debug!(algorithm, visited = num_visited, length = route.length, "Route found");
      return Ok(PathResult::Found(route));
    }

    search_space.finalize(current);
    for edge in graph.neighbors(&current)? {
      let next = edge.to();
      if search_space.is_finalized(next) {
        continue;
      }
      let estimate = heuristic.estimate(&next, &goal);
      if search_space.relax(current, next, edge.length(), estimate) {
        trace!(from = %current, to = %next, cost = ?search_space.distance(next), "Relax");
      }
    }
  }

  debug!(algorithm, visited = num_visited, "No route found");
  Ok(PathResult::NotFound)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{graph_from_points_and_edges, is_connected_path, point};

  fn path_length(graph: &Graph, path: &[GeoPoint]) -> f64 {
    // cheapest parallel edge for every hop
    path
      .windows(2)
      .map(|pair| {
        graph
          .neighbors(&pair[0])
          .unwrap()
          .iter()
          .filter(|e| e.to() == pair[1])
          .map(|e| e.length())
          .fold(f64::INFINITY, f64::min)
      })
      .sum()
  }

  fn scenario_graph() -> (Graph, [GeoPoint; 4]) {
    let a = point(10.0, 10.0);
    let b = point(11.0, 10.0);
    let c = point(13.0, 17.0);
    let d = point(163.0, 19.0);
    let mut graph = Graph::new();
    for v in &[a, b, c, d] {
      graph.add_vertex(*v);
    }
    graph.add_edge(b, a, "a", "b", 7.0).unwrap();
    graph.add_edge(a, c, "a", "b", 7.0).unwrap();
    graph.add_edge(c, d, "a", "b", 7.0).unwrap();
    (graph, [a, b, c, d])
  }

  // Grid-ish network where every edge is at least as long as the great-circle distance
  // between its endpoints, so the great-circle heuristic is admissible.
  fn road_graph() -> (Graph, Vec<GeoPoint>) {
    let points = vec![
      point(32.860, -117.230),
      point(32.860, -117.220),
      point(32.860, -117.210),
      point(32.870, -117.230),
      point(32.870, -117.220),
      point(32.870, -117.210),
      point(32.880, -117.230),
      point(32.880, -117.220),
      point(32.880, -117.210),
    ];
    let links: Vec<(usize, usize, f64)> = vec![
      (0, 1, 1.0),
      (1, 2, 1.0),
      (3, 4, 1.6),
      (4, 5, 1.0),
      (6, 7, 1.0),
      (7, 8, 1.0),
      (0, 3, 1.0),
      (3, 6, 1.0),
      (1, 4, 1.3),
      (4, 7, 1.0),
      (2, 5, 2.5),
      (5, 8, 1.0),
    ];
    let mut graph = Graph::new();
    for p in &points {
      graph.add_vertex(*p);
    }
    for (from, to, detour) in links {
      // both directions, stretched by a detour factor >= 1
      let length = points[from].distance(&points[to]) * detour;
      graph.add_edge(points[from], points[to], "road", "residential", length).unwrap();
      graph.add_edge(points[to], points[from], "road", "residential", length).unwrap();
    }
    (graph, points)
  }

  #[test]
  fn test_bfs_scenario() {
    let (mut graph, [a, b, c, d]) = scenario_graph();

    let result = bfs(&graph, b, d).unwrap();
    assert_eq!(result.path(), Some(&[b, a, c, d][..]));
    assert_eq!(result.route().unwrap().length, 21.0);

    // The same graph without the A -> C segment
    graph = Graph::new();
    for v in &[a, b, c, d] {
      graph.add_vertex(*v);
    }
    graph.add_edge(b, a, "a", "b", 7.0).unwrap();
    graph.add_edge(c, d, "a", "b", 7.0).unwrap();
    assert_eq!(bfs(&graph, b, d).unwrap(), PathResult::NotFound);
  }

  #[test]
  fn test_bfs_fewest_edges() {
    // 0 -> 1 -> 2 -> 3 is short, 0 -> 4 -> 3 has fewer edges
    let graph = graph_from_points_and_edges(
      vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0), (1.0, 1.5)],
      vec![(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 4, 50.0), (4, 3, 50.0)],
    );

    let result = bfs(&graph, point(0.0, 0.0), point(0.0, 3.0)).unwrap();
    assert_eq!(
      result.path(),
      Some(&[point(0.0, 0.0), point(1.0, 1.5), point(0.0, 3.0)][..])
    );
    assert_eq!(result.route().unwrap().length, 100.0);
  }

  #[test]
  fn test_start_is_goal() {
    let (graph, [a, _, _, _]) = scenario_graph();

    let mut visits = Vec::new();
    let result = bfs_with(&graph, a, a, |v: &GeoPoint| visits.push(*v)).unwrap();
    assert_eq!(result.path(), Some(&[a][..]));
    assert_eq!(visits, vec![a]);

    let result = dijkstra(&graph, a, a).unwrap();
    assert_eq!(result.path(), Some(&[a][..]));
    assert_eq!(result.route().unwrap().length, 0.0);

    let mut visits = Vec::new();
    let result = astar_with(&graph, a, a, &GreatCircle, |v: &GeoPoint| visits.push(*v)).unwrap();
    assert_eq!(result.path(), Some(&[a][..]));
    assert_eq!(visits, vec![a]);
  }

  #[test]
  fn test_unknown_vertex() {
    let (graph, [a, _, _, _]) = scenario_graph();
    let nowhere = point(-45.0, 170.0);

    let mut visits = 0;
    let result = bfs_with(&graph, nowhere, a, |_: &GeoPoint| visits += 1);
    assert_eq!(result, Err(GraphError::UnknownVertex(nowhere)));
    assert_eq!(visits, 0);

    assert_eq!(dijkstra(&graph, a, nowhere), Err(GraphError::UnknownVertex(nowhere)));
    assert_eq!(astar(&graph, nowhere, a), Err(GraphError::UnknownVertex(nowhere)));
  }

  #[test]
  fn test_dijkstra_parallel_routes() {
    // S -> X -> G totals 3, S -> Y -> G totals 5
    let points = vec![(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (0.0, 1.0)];
    let cheap = vec![(0, 1, 1.0), (1, 3, 2.0)];
    let expensive = vec![(0, 2, 2.0), (2, 3, 3.0)];

    let orders = vec![
      [cheap.clone(), expensive.clone()].concat(),
      [expensive.clone(), cheap.clone()].concat(),
      vec![expensive[1], cheap[1], expensive[0], cheap[0]],
    ];
    for edges in orders {
      let graph = graph_from_points_and_edges(points.clone(), edges);
      let result = dijkstra(&graph, point(0.0, 0.0), point(0.0, 1.0)).unwrap();
      let route = result.route().unwrap();
      assert_eq!(route.vertices, vec![point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0)]);
      assert_eq!(route.length, 3.0);
    }
  }

  #[test]
  fn test_dijkstra_prefers_short_over_few() {
    let graph = graph_from_points_and_edges(
      vec![(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0), (1.0, 1.5)],
      vec![(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 4, 50.0), (4, 3, 50.0)],
    );

    let route = dijkstra(&graph, point(0.0, 0.0), point(0.0, 3.0))
      .unwrap()
      .into_route()
      .unwrap();
    assert_eq!(route.vertices.len(), 4);
    assert_eq!(route.length, 3.0);
  }

  #[test]
  fn test_dijkstra_parallel_edges() {
    let graph = graph_from_points_and_edges(
      vec![(0.0, 0.0), (0.0, 1.0)],
      vec![(0, 1, 9.0), (0, 1, 4.0), (0, 1, 6.0)],
    );

    let route = dijkstra(&graph, point(0.0, 0.0), point(0.0, 1.0))
      .unwrap()
      .into_route()
      .unwrap();
    assert_eq!(route.length, 4.0);
  }

  #[test]
  fn test_no_route() {
    let (graph, [a, b, _, d]) = scenario_graph();

    // edges are directed
    assert_eq!(dijkstra(&graph, d, b).unwrap(), PathResult::NotFound);
    assert_eq!(astar(&graph, a, b).unwrap(), PathResult::NotFound);
    assert_eq!(bfs(&graph, d, a).unwrap(), PathResult::NotFound);
  }

  #[test]
  fn test_visits_each_vertex_once() {
    let (graph, points) = road_graph();

    let mut visits = Vec::new();
    let result = dijkstra_with(&graph, points[0], point(32.880, -117.210), |v: &GeoPoint| visits.push(*v)).unwrap();
    assert!(result.is_found());
    assert_eq!(result.route().unwrap().visited, visits.len());

    let unique: HashSet<_> = visits.iter().cloned().collect();
    assert_eq!(unique.len(), visits.len());
    assert_eq!(visits.first(), Some(&points[0]));
    assert_eq!(visits.last(), Some(&points[8]));
  }

  #[test]
  fn test_routes_are_optimal_and_connected() {
    let (graph, points) = road_graph();

    for start in &points {
      for goal in &points {
        let by_edges = bfs(&graph, *start, *goal).unwrap().into_route().unwrap();
        let by_length = dijkstra(&graph, *start, *goal).unwrap().into_route().unwrap();
        let guided = astar(&graph, *start, *goal).unwrap().into_route().unwrap();
        let zero = astar_with(&graph, *start, *goal, &NoHeuristic, no_visitor)
          .unwrap()
          .into_route()
          .unwrap();

        for route in &[&by_edges, &by_length, &guided, &zero] {
          assert_eq!(route.vertices.first(), Some(start));
          assert_eq!(route.vertices.last(), Some(goal));
          assert!(is_connected_path(&graph, &route.vertices));
        }

        // grid distance in hops
        let hops = |p: &GeoPoint| {
          let i = points.iter().position(|q| q == p).unwrap();
          (i / 3, i % 3)
        };
        let (r0, c0) = hops(start);
        let (r1, c1) = hops(goal);
        let manhattan = (r0 as i64 - r1 as i64).abs() + (c0 as i64 - c1 as i64).abs();
        assert_eq!(by_edges.vertices.len() as i64 - 1, manhattan);

        assert!(by_length.length <= by_edges.length + 1e-9);
        assert!((by_length.length - path_length(&graph, &by_length.vertices)).abs() < 1e-9);
        assert!((guided.length - by_length.length).abs() < 1e-9);
        assert!((zero.length - by_length.length).abs() < 1e-9);
      }
    }
  }

  #[test]
  fn test_zero_heuristic_matches_dijkstra() {
    let (graph, points) = road_graph();

    let mut dijkstra_visits = Vec::new();
    let mut astar_visits = Vec::new();
    let expected = dijkstra_with(&graph, points[0], points[8], |v: &GeoPoint| dijkstra_visits.push(*v)).unwrap();
    let actual = astar_with(&graph, points[0], points[8], &|_: &GeoPoint, _: &GeoPoint| 0.0, |v: &GeoPoint| {
      astar_visits.push(*v)
    })
    .unwrap();

    assert_eq!(expected, actual);
    assert_eq!(dijkstra_visits, astar_visits);
  }

  #[test]
  fn test_astar_expands_less() {
    let (graph, points) = road_graph();

    let plain = dijkstra(&graph, points[0], points[2]).unwrap().into_route().unwrap();
    let guided = astar(&graph, points[0], points[2]).unwrap().into_route().unwrap();

    assert_eq!(plain.vertices, guided.vertices);
    assert!(guided.visited <= plain.visited);
  }

  #[test]
  fn test_cancellation() {
    let (graph, points) = road_graph();

    let abort = AtomicBool::new(false);
    let mut visits = 0;
    let result = dijkstra_with(
      &graph,
      points[0],
      points[8],
      Cancellable::new(
        |_: &GeoPoint| {
          visits += 1;
          if visits == 2 {
            abort.store(true, Ordering::Relaxed);
          }
        },
        &abort,
      ),
    )
    .unwrap();

    assert_eq!(result, PathResult::Cancelled);
    assert_eq!(visits, 2);

    // raised before the search starts
    let result = bfs_with(&graph, points[0], points[0], Cancellable::new(no_visitor, &abort)).unwrap();
    assert_eq!(result, PathResult::Cancelled);
  }
}
