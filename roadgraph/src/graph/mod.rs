//! Directed road network keyed by geographic location.
//!
//! The module contains the [`Graph`] adjacency store and the [`Edge`] records it owns.
//! Vertices are plain [`GeoPoint`](crate::spatial::GeoPoint) keys: edges refer to their
//! endpoints by key only, so a graph never holds references between its own parts.
mod edge;
mod graph;

pub use edge::*;
pub use graph::*;
