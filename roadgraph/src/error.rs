use crate::spatial::GeoPoint;
use thiserror::Error;

/// Errors raised by graph mutation and route queries.
///
/// A query which simply has no route is not an error; see
/// [`PathResult::NotFound`](crate::route::PathResult::NotFound).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("unknown vertex: ({0})")]
  UnknownVertex(GeoPoint),
}
