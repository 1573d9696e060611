use lazy_static::lazy_static;
use regex::Regex;
use roadgraph::{GeoPoint, Graph, GraphError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One directed road segment as it appears in a `.map` file
#[derive(Debug, PartialEq)]
pub struct MapSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub road_name: String,
    pub road_type: String,
}

impl MapSegment {
    pub fn length(&self) -> f64 {
        self.from.distance(&self.to)
    }
}

/// Parses a single line of the form `lat1 lon1 lat2 lon2 "Road Name" roadType`.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<MapSegment>, String> {
    lazy_static! {
        static ref SEGMENT_RE: Regex = Regex::new(
            r#"^\s*(?P<lat1>\S+)\s+(?P<lon1>\S+)\s+(?P<lat2>\S+)\s+(?P<lon2>\S+)\s+"(?P<name>[^"]*)"\s+(?P<kind>\S+)\s*$"#
        )
        .unwrap();
    }

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let captures = SEGMENT_RE
        .captures(trimmed)
        .ok_or_else(|| String::from("expected `lat1 lon1 lat2 lon2 \"road name\" road_type`"))?;

    let coordinate = |name: &str| -> Result<f64, String> {
        let text = &captures[name];
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(format!("invalid coordinate {}: {}", name, text)),
        }
    };

    Ok(Some(MapSegment {
        from: GeoPoint::new(coordinate("lat1")?, coordinate("lon1")?),
        to: GeoPoint::new(coordinate("lat2")?, coordinate("lon2")?),
        road_name: captures["name"].to_owned(),
        road_type: captures["kind"].to_owned(),
    }))
}

/// Adds every segment of a `.map` source to `graph` and returns the number of edges added.
///
/// Each segment becomes a directed edge whose length is the great-circle distance between its
/// endpoints; two-way roads are listed once per direction in the file. Segments with identical
/// endpoints have no length and are skipped.
pub fn add_map_to_graph<R: BufRead>(reader: R, graph: &mut Graph) -> Result<usize, LoadError> {
    let mut added = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let segment = match parse_line(&line) {
            Ok(Some(segment)) => segment,
            Ok(None) => continue,
            Err(reason) => {
                return Err(LoadError::Parse {
                    line: index + 1,
                    reason,
                })
            }
        };

        let length = segment.length();
        if length <= 0.0 {
            warn!("Skipping zero length segment on line {}: {}", index + 1, line.trim());
            continue;
        }

        graph.add_vertex(segment.from);
        graph.add_vertex(segment.to);
        graph.add_edge(
            segment.from,
            segment.to,
            &segment.road_name,
            &segment.road_type,
            length,
        )?;
        added += 1;
    }
    Ok(added)
}

pub fn read_map<R: BufRead>(reader: R) -> Result<Graph, LoadError> {
    let mut graph = Graph::new();
    add_map_to_graph(reader, &mut graph)?;
    Ok(graph)
}

pub fn load_map(path: &str) -> Result<Graph, LoadError> {
    let load_timer = Instant::now();
    let file = BufReader::new(File::open(path)?);
    let graph = read_map(file)?;
    info!(
        "Loaded {} with {} vertices and {} edges in {:.2} seconds",
        path,
        graph.number_of_vertices(),
        graph.number_of_edges(),
        load_timer.elapsed().as_secs_f32()
    );
    Ok(graph)
}
