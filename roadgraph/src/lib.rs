//! Directed road network keyed by geographic location, with shortest route searches.
//!
//! Build a [`graph::Graph`] once with [`add_vertex`](graph::Graph::add_vertex) and
//! [`add_edge`](graph::Graph::add_edge), then query it with [`route::bfs`], [`route::dijkstra`]
//! or [`route::astar`].

pub mod error;
pub mod graph;
pub mod route;
pub mod search_space;
pub mod spatial;

#[cfg(test)]
mod test_utils;

pub use error::GraphError;
pub use graph::{Edge, Graph};
pub use route::{PathResult, Route};
pub use spatial::GeoPoint;
