//! Undirected adjacency-list graph with per-vertex search state.
//!
//! Vertex ids are 1-based at the API boundary and stored 0-based. Each vertex
//! owns its neighbour list and a [`VertexState`] record that only the engine
//! and the heap's decrease-key path ever write.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::GraphError;

/// 1-based external vertex identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VertexId(u32);

impl VertexId {
    /// Wraps a raw 1-based id; `0` is not a vertex.
    #[inline]
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Converts a storage index back to its external id.
    ///
    /// Graphs are sized by a `u32` vertex count, so every valid index fits.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// 0-based storage index.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a vertex stands relative to the heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeapSlot {
    /// Never inserted.
    #[default]
    Detached,
    /// Queued at the given heap index.
    Queued(usize),
    /// Extracted; weakness is final.
    Settled,
}

impl HeapSlot {
    #[inline]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Settled)
    }

    #[inline]
    pub const fn position(self) -> Option<usize> {
        match self {
            Self::Queued(index) => Some(index),
            Self::Detached | Self::Settled => None,
        }
    }
}

/// Mutable search state carried by every vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexState {
    pub(crate) weakness: f64,
    pub(crate) predecessor: Option<usize>,
    pub(crate) slot: HeapSlot,
}

impl VertexState {
    /// State of a vertex not yet reached: infinite weakness, detached.
    pub const fn unreached() -> Self {
        Self::with_weakness(f64::INFINITY)
    }

    /// Detached state keyed by `weakness`, for driving a heap directly.
    pub const fn with_weakness(weakness: f64) -> Self {
        Self { weakness, predecessor: None, slot: HeapSlot::Detached }
    }

    #[inline]
    pub const fn weakness(&self) -> f64 {
        self.weakness
    }

    #[inline]
    pub fn predecessor(&self) -> Option<VertexId> {
        self.predecessor.map(VertexId::from_index)
    }

    #[inline]
    pub const fn slot(&self) -> HeapSlot {
        self.slot
    }
}

impl Default for VertexState {
    fn default() -> Self {
        Self::unreached()
    }
}

/// One half of an undirected edge as seen from its owning vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub target: VertexId,
    pub weight: f64,
}

/// Undirected weighted graph stored as per-vertex adjacency lists.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
    states: Vec<VertexState>,
    edge_count: usize,
}

impl Graph {
    /// Allocates `vertex_count` empty adjacency lists, all vertices unreached.
    pub fn new(vertex_count: u32) -> Self {
        let n = vertex_count as usize;
        Self {
            adjacency: vec![Vec::new(); n],
            states: vec![VertexState::unreached(); n],
            edge_count: 0,
        }
    }

    /// Resolves a raw 1-based id against this graph.
    pub fn vertex(&self, raw: u32) -> Result<VertexId, GraphError> {
        match VertexId::new(raw) {
            Some(id) if id.index() < self.vertex_count() => Ok(id),
            _ => Err(GraphError::VertexOutOfRange { vertex: raw, vertex_count: self.vertex_count() }),
        }
    }

    /// Records the undirected edge `u`–`v` in both adjacency lists.
    ///
    /// `weight` must be finite and non-negative; relaxation order is only
    /// correct under that precondition and it is not checked in release builds.
    /// A self-loop is stored once.
    pub fn add_edge(&mut self, u: u32, v: u32, weight: f64) -> Result<(), GraphError> {
        debug_assert!(weight.is_finite() && weight >= 0.0, "edge weight {weight} is not a valid weakness");
        let from = self.vertex(u)?;
        let to = self.vertex(v)?;
        self.adjacency[from.index()].push(Edge { target: to, weight });
        if from != to {
            self.adjacency[to.index()].push(Edge { target: from, weight });
        }
        self.edge_count += 1;
        Ok(())
    }

    /// Neighbours of `v`; empty for ids this graph does not know.
    #[inline]
    pub fn neighbors(&self, v: VertexId) -> &[Edge] {
        self.adjacency.get(v.index()).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges added.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertex_count()).map(VertexId::from_index)
    }

    #[inline]
    pub fn state(&self, v: VertexId) -> Option<&VertexState> {
        self.states.get(v.index())
    }

    /// Best known weakness; `+inf` for unreached or unknown vertices.
    #[inline]
    pub fn weakness(&self, v: VertexId) -> f64 {
        self.state(v).map_or(f64::INFINITY, VertexState::weakness)
    }

    #[inline]
    pub fn predecessor(&self, v: VertexId) -> Option<VertexId> {
        self.state(v).and_then(VertexState::predecessor)
    }

    #[inline]
    pub fn slot(&self, v: VertexId) -> HeapSlot {
        self.state(v).map_or(HeapSlot::Detached, VertexState::slot)
    }

    /// Split borrow: read-only adjacency next to writable vertex state.
    pub(crate) fn parts_mut(&mut self) -> (&[Vec<Edge>], &mut [VertexState]) {
        (&self.adjacency, &mut self.states)
    }

    /// Puts every vertex back to the unreached, detached state.
    pub(crate) fn reset_states(&mut self) {
        for state in &mut self.states {
            *state = VertexState::unreached();
        }
    }

    /// Reproducible random graph with about `avg_degree` edges per vertex and
    /// weights drawn from `1.0..5.0`.
    pub fn random(vertex_count: u32, avg_degree: f32, seed: u64) -> Self {
        let mut graph = Self::new(vertex_count);
        if vertex_count < 2 {
            return graph;
        }
        let mut rng = SmallRng::seed_from_u64(seed);
        // each undirected edge adds degree to both ends
        let m_est = (vertex_count as f32 * avg_degree.max(0.0) / 2.0) as usize;
        for _ in 0..m_est {
            let u = rng.gen_range(1..=vertex_count);
            let v = rng.gen_range(1..=vertex_count);
            if u == v {
                continue;
            }
            let w: f64 = rng.gen_range(1.0..5.0);
            // endpoints come from 1..=vertex_count, never out of range
            let _ = graph.add_edge(u, v, w);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> VertexId {
        VertexId::new(raw).expect("non-zero id")
    }

    #[test]
    fn add_edge_is_symmetric() {
        let mut g = Graph::new(3);
        g.add_edge(1, 3, 2.5).expect("edge in range");
        assert_eq!(g.neighbors(id(1)), &[Edge { target: id(3), weight: 2.5 }]);
        assert_eq!(g.neighbors(id(3)), &[Edge { target: id(1), weight: 2.5 }]);
        assert!(g.neighbors(id(2)).is_empty());
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn self_loop_is_stored_once() {
        let mut g = Graph::new(2);
        g.add_edge(2, 2, 1.0).expect("edge in range");
        assert_eq!(g.neighbors(id(2)).len(), 1);
    }

    #[test]
    fn out_of_range_endpoints_are_rejected() {
        let mut g = Graph::new(2);
        assert_eq!(
            g.add_edge(1, 3, 1.0),
            Err(GraphError::VertexOutOfRange { vertex: 3, vertex_count: 2 })
        );
        assert!(g.add_edge(0, 1, 1.0).is_err());
        assert_eq!(g.edge_count(), 0);
        assert!(g.neighbors(id(1)).is_empty());
    }

    #[test]
    fn fresh_vertices_are_unreached() {
        let g = Graph::new(2);
        for v in g.vertices() {
            assert!(g.weakness(v).is_infinite());
            assert_eq!(g.predecessor(v), None);
            assert_eq!(g.slot(v), HeapSlot::Detached);
        }
        assert!(g.weakness(id(9)).is_infinite());
    }

    #[test]
    fn vertex_id_round_trips_storage_index() {
        assert_eq!(VertexId::new(0), None);
        assert_eq!(id(4).index(), 3);
        assert_eq!(VertexId::from_index(3), id(4));
        assert_eq!(id(4).to_string(), "4");
    }

    #[test]
    fn random_graph_is_reproducible_and_symmetric() {
        let a = Graph::random(50, 4.0, 7);
        let b = Graph::random(50, 4.0, 7);
        assert_eq!(a.edge_count(), b.edge_count());
        for v in a.vertices() {
            assert_eq!(a.neighbors(v), b.neighbors(v));
            for e in a.neighbors(v) {
                assert!((1.0..5.0).contains(&e.weight));
                assert!(a.neighbors(e.target).iter().any(|back| back.target == v && back.weight == e.weight));
            }
        }
    }
}
