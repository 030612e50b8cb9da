//! Error types for graph construction, the indexed heap and the engine.
//!
//! Every variant maps to a stable negative status code so the C ABI can
//! report failures the same way the solver entry points always have.

use thiserror::Error;

use crate::graph::VertexId;

/// Errors raised while building or addressing a [`crate::Graph`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// Vertex id outside `1..=vertex_count`.
    #[error("vertex {vertex} is outside 1..={vertex_count}")]
    VertexOutOfRange {
        /// Raw 1-based id supplied by the caller.
        vertex: u32,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },
}

/// Heap precondition and consistency failures.
///
/// None of these are recoverable: once raised, the heap or the vertex state
/// it indexes can no longer be trusted.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HeapError {
    /// Insert attempted on a full heap.
    #[error("heap is full (capacity {capacity})")]
    CapacityExceeded {
        /// Fixed capacity of the heap.
        capacity: usize,
    },
    /// A recorded heap position no longer addresses the live heap.
    #[error("heap index {index} is out of range for {len} queued vertices")]
    HeapIndexOutOfRange {
        /// Position recorded on the vertex.
        index: usize,
        /// Current number of queued vertices.
        len: usize,
    },
    /// `decrease_key` called with a key that does not strictly improve.
    #[error("key for vertex {vertex} must drop below {current} (got {proposed})")]
    NonImprovingKey {
        /// Vertex whose key was to be lowered.
        vertex: VertexId,
        /// Weakness currently recorded.
        current: f64,
        /// Rejected replacement.
        proposed: f64,
    },
    /// `decrease_key` addressed a vertex that is not queued.
    #[error("vertex {vertex} is not queued")]
    NotQueued {
        /// Offending vertex.
        vertex: VertexId,
    },
    /// `insert` addressed a vertex that is queued or already settled.
    #[error("vertex {vertex} has already been queued")]
    AlreadyQueued {
        /// Offending vertex.
        vertex: VertexId,
    },
    /// Vertex index beyond the state table.
    #[error("vertex index {index} is unknown to a table of {vertex_count} vertices")]
    UnknownVertex {
        /// 0-based index supplied.
        index: usize,
        /// Size of the vertex state table.
        vertex_count: usize,
    },
    /// A child is keyed below its parent.
    #[error("heap order violated between parent {parent} and child {child}")]
    OrderViolated {
        /// Parent heap index.
        parent: usize,
        /// Child heap index.
        child: usize,
    },
    /// A queued vertex does not record the position it occupies.
    #[error("vertex {vertex} sits at heap index {index} but records a different position")]
    PositionMismatch {
        /// Heap index inspected.
        index: usize,
        /// Vertex found there.
        vertex: VertexId,
    },
}

/// Failures that abort a shortest-path run.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    /// The graph rejected a vertex reference.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The heap detected a broken precondition or invariant.
    #[error(transparent)]
    Heap(#[from] HeapError),
}

impl GraphError {
    /// Stable status code used across the C ABI.
    pub const fn code(&self) -> i32 {
        match self {
            Self::VertexOutOfRange { .. } => -4,
        }
    }
}

impl HeapError {
    /// Stable status code used across the C ABI.
    pub const fn code(&self) -> i32 {
        match self {
            Self::CapacityExceeded { .. } => -5,
            Self::HeapIndexOutOfRange { .. } => -6,
            Self::NonImprovingKey { .. } => -7,
            Self::NotQueued { .. } => -8,
            Self::AlreadyQueued { .. } => -9,
            Self::UnknownVertex { .. } => -10,
            Self::OrderViolated { .. } | Self::PositionMismatch { .. } => -11,
        }
    }
}

impl EngineError {
    /// Stable status code used across the C ABI.
    pub const fn code(&self) -> i32 {
        match self {
            Self::Graph(err) => err.code(),
            Self::Heap(err) => err.code(),
        }
    }
}
