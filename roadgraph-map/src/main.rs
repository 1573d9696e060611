use clap::{value_t_or_exit, App, Arg};
use polyline::encode_coordinates;
use roadgraph::route::{astar, bfs, dijkstra, PathResult};
use roadgraph::spatial::Coordinate;
use roadgraph::{GeoPoint, GraphError};
use roadgraph_map::{load_map, LoadError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] GraphError),

    #[error("the map has no vertices")]
    EmptyMap,

    #[error("failed to encode route geometry: {0}")]
    Geometry(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug)]
enum Algorithm {
    Bfs,
    Dijkstra,
    Astar,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bfs" => Ok(Algorithm::Bfs),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "astar" => Ok(Algorithm::Astar),
            _ => Err(format!("unknown algorithm {}", s)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::Astar => "astar",
        };
        write!(f, "{}", name)
    }
}

/// `lat,lon` pair given on the command line
struct Waypoint(GeoPoint);

impl FromStr for Waypoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coords: Vec<_> = s.split(',').map(|c| c.trim().parse::<f64>()).collect();
        match coords.as_slice() {
            [Ok(lat), Ok(lon)] => Ok(Waypoint(GeoPoint::new(*lat, *lon))),
            _ => Err(format!("expected `lat,lon`, got {}", s)),
        }
    }
}

#[derive(Serialize)]
struct RouteResponse {
    algorithm: String,
    from: GeoPoint,
    to: GeoPoint,
    found: bool,
    length_km: Option<f64>,
    visited: Option<usize>,
    vertices: Vec<GeoPoint>,
    geometry: Option<String>,
}

impl RouteResponse {
    fn new(algorithm: Algorithm, from: GeoPoint, to: GeoPoint, result: PathResult) -> Result<Self, CliError> {
        let mut response = RouteResponse {
            algorithm: algorithm.to_string(),
            from,
            to,
            found: false,
            length_km: None,
            visited: None,
            vertices: Vec::new(),
            geometry: None,
        };
        if let Some(route) = result.into_route() {
            let geometry = encode_coordinates(route.vertices.iter().map(|p| Coordinate::from(*p)), 5)
                .map_err(CliError::Geometry)?;
            response.found = true;
            response.length_km = Some(route.length);
            response.visited = Some(route.visited);
            response.geometry = Some(geometry);
            response.vertices = route.vertices;
        }
        Ok(response)
    }
}

fn run(map_path: &str, from: GeoPoint, to: GeoPoint, algorithm: Algorithm, print_graph: bool) -> Result<(), CliError> {
    let graph = load_map(map_path)?;
    if print_graph {
        println!("{}", graph);
    }

    // Query coordinates rarely hit a vertex exactly
    let start = graph.nearest_vertex(&from).ok_or(CliError::EmptyMap)?;
    let goal = graph.nearest_vertex(&to).ok_or(CliError::EmptyMap)?;
    info!("Snapped ({}) to ({}) and ({}) to ({})", from, start, to, goal);

    let route_timer = Instant::now();
    let result = match algorithm {
        Algorithm::Bfs => bfs(&graph, start, goal)?,
        Algorithm::Dijkstra => dijkstra(&graph, start, goal)?,
        Algorithm::Astar => astar(&graph, start, goal)?,
    };
    match result.route() {
        Some(route) => info!(
            "Route found in {:.3}s: length = {:.3} km, vertices = {}, visited = {}",
            route_timer.elapsed().as_secs_f32(),
            route.length,
            route.vertices.len(),
            route.visited
        ),
        None => info!("No route found"),
    }

    let response = RouteResponse::new(algorithm, start, goal, result)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("roadgraph-map")
        .about("Finds a route between two coordinates on a .map road network")
        .arg(Arg::with_name("map").required(true))
        .arg(
            Arg::with_name("from")
                .long("from")
                .takes_value(true)
                .required(true)
                .help("Origin as lat,lon"),
        )
        .arg(
            Arg::with_name("to")
                .long("to")
                .takes_value(true)
                .required(true)
                .help("Destination as lat,lon"),
        )
        .arg(
            Arg::with_name("algorithm")
                .long("algorithm")
                .takes_value(true)
                .possible_values(&["bfs", "dijkstra", "astar"])
                .default_value("astar"),
        )
        .arg(
            Arg::with_name("print-graph")
                .long("print-graph")
                .help("Prints the adjacency list of the loaded graph"),
        )
        .get_matches();

    let map_path = value_t_or_exit!(matches, "map", String);
    let from = value_t_or_exit!(matches, "from", Waypoint).0;
    let to = value_t_or_exit!(matches, "to", Waypoint).0;
    let algorithm = value_t_or_exit!(matches, "algorithm", Algorithm);

    if let Err(e) = run(&map_path, from, to, algorithm, matches.is_present("print-graph")) {
        error!("{}", e);
        std::process::exit(1);
    }
}
