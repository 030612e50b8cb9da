//! Matrix Market (`.mtx`) coordinate loader.
//!
//! Accepts the coordinate layout: `%` comment lines, an optional
//! `%%MatrixMarket matrix coordinate <field> <symmetry>` banner, a
//! `rows cols entries` size line, then one `u v [w]` line per edge with
//! 1-based endpoints. `pattern` matrices carry no weights and load with
//! weight 1.0. The matrix must be square; its order is the vertex count.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::error::GraphError;
use crate::graph::Graph;

/// Failures while reading a graph from Matrix Market text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported banner on line {line}: {reason}")]
    Banner { line: usize, reason: String },
    #[error("missing `rows cols entries` size line")]
    MissingHeader,
    #[error("malformed size line {line}: `{text}`")]
    MalformedHeader { line: usize, text: String },
    #[error("matrix is {rows}x{cols}; an adjacency matrix must be square")]
    NotSquare { rows: u32, cols: u32 },
    #[error("malformed entry on line {line}: `{text}`")]
    MalformedEntry { line: usize, text: String },
    #[error("weight {weight} on line {line} must be finite and non-negative")]
    InvalidWeight { line: usize, weight: f64 },
    #[error("entry on line {line}: {source}")]
    Vertex {
        line: usize,
        #[source]
        source: GraphError,
    },
    #[error("size line declares {declared} entries but {found} were read")]
    EntryCountMismatch { declared: usize, found: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Weighted,
    Pattern,
}

/// Reads the graph stored at `path`.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open { path: path.to_path_buf(), source })?;
    let graph = parse_graph(BufReader::new(file))?;
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Parses Matrix Market text from any buffered reader.
pub fn parse_graph<R: BufRead>(reader: R) -> Result<Graph, LoadError> {
    let mut field = Field::Weighted;
    let mut graph: Option<Graph> = None;
    let mut declared = 0usize;
    let mut found = 0usize;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let text = line.trim();
        if let Some(banner) = text.strip_prefix("%%MatrixMarket") {
            if line_no == 1 {
                field = parse_banner(banner, line_no)?;
            }
            continue;
        }
        if text.is_empty() || text.starts_with('%') {
            continue;
        }
        if let Some(g) = graph.as_mut() {
            if found == declared {
                return Err(LoadError::EntryCountMismatch { declared, found: found + 1 });
            }
            let (u, v, w) = parse_entry(text, line_no, field)?;
            g.add_edge(u, v, w).map_err(|source| LoadError::Vertex { line: line_no, source })?;
            found += 1;
            continue;
        }
        let (rows, cols, entries) = parse_size_line(text, line_no)?;
        if rows != cols {
            return Err(LoadError::NotSquare { rows, cols });
        }
        debug!(vertices = rows, entries, ?field, "size line");
        declared = entries;
        graph = Some(Graph::new(rows));
    }

    let graph = graph.ok_or(LoadError::MissingHeader)?;
    if found != declared {
        return Err(LoadError::EntryCountMismatch { declared, found });
    }
    Ok(graph)
}

fn parse_banner(banner: &str, line: usize) -> Result<Field, LoadError> {
    let words: Vec<String> = banner.split_whitespace().map(str::to_ascii_lowercase).collect();
    let fail = |reason: &str| LoadError::Banner { line, reason: reason.to_owned() };
    match words.as_slice() {
        [object, format, ..] if object != "matrix" || format != "coordinate" => {
            Err(fail("only `matrix coordinate` is supported"))
        }
        [_, _, field, ..] => match field.as_str() {
            "pattern" => Ok(Field::Pattern),
            "real" | "integer" | "double" => Ok(Field::Weighted),
            _ => Err(fail("field must be real, integer, double or pattern")),
        },
        _ => Err(fail("expected `matrix coordinate <field> <symmetry>`")),
    }
}

fn parse_size_line(text: &str, line: usize) -> Result<(u32, u32, usize), LoadError> {
    let malformed = || LoadError::MalformedHeader { line, text: text.to_owned() };
    let mut parts = text.split_whitespace();
    let rows = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let cols = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let entries = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok((rows, cols, entries))
}

fn parse_entry(text: &str, line: usize, field: Field) -> Result<(u32, u32, f64), LoadError> {
    let malformed = || LoadError::MalformedEntry { line, text: text.to_owned() };
    let mut parts = text.split_whitespace();
    let u = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let v = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let w = match field {
        Field::Pattern => 1.0,
        Field::Weighted => parts.next().and_then(|s| s.parse::<f64>().ok()).ok_or_else(malformed)?,
    };
    if parts.next().is_some() {
        return Err(malformed());
    }
    if !w.is_finite() || w < 0.0 {
        return Err(LoadError::InvalidWeight { line, weight: w });
    }
    Ok((u, v, w))
}
