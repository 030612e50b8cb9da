//! Minimum weakness search: Dijkstra with decrease-key over [`Graph`].
//!
//! Every vertex is queued up front (source at 0, the rest at `+inf`). Each
//! extraction settles one vertex for good and relaxes its still-queued
//! neighbours through [`IndexedMinHeap::decrease_key`]. Predecessor links
//! left on the vertices are walked afterwards to rebuild paths.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{EngineError, GraphError};
use crate::graph::{Graph, VertexId};
use crate::heap::{HeapStats, IndexedMinHeap};

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    /// Vertices extracted from the heap; every vertex, exactly once.
    pub settled: usize,
    /// Settled vertices with finite weakness.
    pub reached: usize,
    /// Successful relaxations (decrease-key calls).
    pub relaxations: u64,
    pub heap: HeapStats,
}

/// Runs the relaxation loop over an exclusively borrowed graph.
pub struct ShortestPathEngine<'g> {
    graph: &'g mut Graph,
}

impl<'g> ShortestPathEngine<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        Self { graph }
    }

    /// Computes minimum weakness from `source` to every vertex.
    ///
    /// Vertex state left over from an earlier run is discarded first. Any heap
    /// error aborts the run; the vertex state is not usable afterwards.
    #[instrument(level = "debug", skip(self), fields(source = %source, vertices = self.graph.vertex_count()))]
    pub fn run(self, source: VertexId) -> Result<ShortestPaths<'g>, EngineError> {
        let graph = self.graph;
        let n = graph.vertex_count();
        if source.index() >= n {
            return Err(GraphError::VertexOutOfRange { vertex: source.get(), vertex_count: n }.into());
        }
        graph.reset_states();

        let (adjacency, states) = graph.parts_mut();
        states[source.index()].weakness = 0.0;
        let mut heap = IndexedMinHeap::with_capacity(n);
        for v in 0..n {
            heap.insert(states, VertexId::from_index(v))?;
        }

        let mut info = RunInfo::default();
        while let Some(u) = heap.extract_min(states) {
            info.settled += 1;
            let base = states[u.index()].weakness;
            if base.is_infinite() {
                // only unreachable vertices remain; draining still settles them
                continue;
            }
            info.reached += 1;
            for edge in &adjacency[u.index()] {
                let v = edge.target.index();
                if states[v].slot.position().is_none() {
                    continue;
                }
                let candidate = base + edge.weight;
                if candidate < states[v].weakness {
                    heap.decrease_key(states, edge.target, candidate)?;
                    states[v].predecessor = Some(u.index());
                    info.relaxations += 1;
                }
            }
        }
        info.heap = heap.stats();
        debug!(
            settled = info.settled,
            reached = info.reached,
            relaxations = info.relaxations,
            "search complete"
        );

        let graph: &'g Graph = graph;
        Ok(ShortestPaths { graph, source, info })
    }
}

/// Read-only view of a finished run.
#[derive(Clone, Copy, Debug)]
pub struct ShortestPaths<'g> {
    graph: &'g Graph,
    source: VertexId,
    info: RunInfo,
}

/// Outcome for a single vertex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VertexReport {
    pub vertex: VertexId,
    /// `None` when unreachable.
    pub weakness: Option<f64>,
    pub path: Option<Vec<VertexId>>,
}

/// Serialisable outcome of a run, for the output layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub source: VertexId,
    pub vertices: usize,
    pub edges: usize,
    pub info: RunInfo,
    pub results: Vec<VertexReport>,
}

impl<'g> ShortestPaths<'g> {
    #[inline]
    pub fn source(&self) -> VertexId {
        self.source
    }

    #[inline]
    pub fn info(&self) -> RunInfo {
        self.info
    }

    #[inline]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Final weakness of `v`; `+inf` when unreachable.
    #[inline]
    pub fn shortest_weakness(&self, v: VertexId) -> f64 {
        self.graph.weakness(v)
    }

    #[inline]
    pub fn is_reachable(&self, v: VertexId) -> bool {
        self.shortest_weakness(v).is_finite()
    }

    /// Vertices from the source to `v`, or `None` when there is no path.
    ///
    /// The source's own path is `[source]`.
    pub fn path_to(&self, v: VertexId) -> Option<Vec<VertexId>> {
        if !self.is_reachable(v) {
            return None;
        }
        let mut path = vec![v];
        let mut cur = v;
        while let Some(p) = self.graph.predecessor(cur) {
            // predecessor links form a tree rooted at the source
            if path.len() >= self.graph.vertex_count() {
                return None;
            }
            path.push(p);
            cur = p;
        }
        if cur != self.source {
            return None;
        }
        path.reverse();
        Some(path)
    }

    pub fn report(&self, v: VertexId) -> VertexReport {
        let weakness = self.shortest_weakness(v);
        VertexReport {
            vertex: v,
            weakness: weakness.is_finite().then_some(weakness),
            path: self.path_to(v),
        }
    }

    /// Reports for `targets`, or for every vertex when `targets` is empty.
    pub fn run_report(&self, targets: &[VertexId]) -> RunReport {
        let results = if targets.is_empty() {
            self.graph.vertices().map(|v| self.report(v)).collect()
        } else {
            targets.iter().map(|&v| self.report(v)).collect()
        };
        RunReport {
            source: self.source,
            vertices: self.graph.vertex_count(),
            edges: self.graph.edge_count(),
            info: self.info,
            results,
        }
    }
}
