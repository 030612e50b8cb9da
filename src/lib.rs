//! Minimum weakness paths over undirected weighted graphs.
//!
//! Edge weights are "weakness" costs, summed along a path and minimised from a
//! single source with Dijkstra over an indexed binary heap:
//!  - [`Graph`]: adjacency lists plus per-vertex search state
//!  - [`IndexedMinHeap`]: min-heap with O(log V) decrease-key via a position index
//!  - [`ShortestPathEngine`]: relaxation loop and path reconstruction
//!
//! [`mtx`] loads graphs from Matrix Market text and [`ffi`] exposes the search
//! through a stable C ABI (`mwp_run`).
//!
//! ```
//! use min_weakness::{Graph, ShortestPathEngine, VertexId};
//!
//! let mut g = Graph::new(3);
//! g.add_edge(1, 2, 2.0).unwrap();
//! g.add_edge(2, 3, 1.0).unwrap();
//! let source = VertexId::new(1).unwrap();
//! let paths = ShortestPathEngine::new(&mut g).run(source).unwrap();
//! let target = VertexId::new(3).unwrap();
//! assert_eq!(paths.shortest_weakness(target), 3.0);
//! assert_eq!(paths.path_to(target).unwrap().len(), 3);
//! ```

pub mod engine;
pub mod error;
pub mod ffi;
pub mod graph;
pub mod heap;
pub mod mtx;

pub use engine::{RunInfo, RunReport, ShortestPathEngine, ShortestPaths, VertexReport};
pub use error::{EngineError, GraphError, HeapError};
pub use graph::{Edge, Graph, HeapSlot, VertexId, VertexState};
pub use heap::{HeapStats, IndexedMinHeap};
pub use mtx::{load_graph, parse_graph, LoadError};
