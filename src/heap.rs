//! Indexed binary min-heap over vertex ids with decrease-key.
//!
//! The heap stores only vertex indices. Keys are read from the caller's
//! [`VertexState`] table on every comparison and each vertex records its own
//! heap position in [`VertexState::slot`], so a decrease-key finds its
//! element in O(1) and restores order in O(log V).
//!
//! Every exchange of two heap slots goes through [`IndexedMinHeap::swap`],
//! which rewrites both positions together; nothing else moves elements.

use serde::Serialize;
use tracing::trace;

use crate::error::HeapError;
use crate::graph::{HeapSlot, VertexId, VertexState};

/// Operation counters, cumulative over the heap's lifetime.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeapStats {
    pub pushes: u64,
    pub pops: u64,
    pub decrease_keys: u64,
    pub max_size: u64,
}

#[derive(Clone, Debug)]
pub struct IndexedMinHeap {
    data: Vec<usize>,
    capacity: usize,
    stats: HeapStats,
}

#[inline]
const fn parent(i: usize) -> usize {
    (i - 1) / 2
}

#[inline]
const fn left(i: usize) -> usize {
    2 * i + 1
}

#[inline]
const fn right(i: usize) -> usize {
    2 * i + 2
}

impl IndexedMinHeap {
    /// Empty heap that will hold at most `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), capacity, stats: HeapStats::default() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    /// Root of the heap without removing it.
    #[inline]
    pub fn peek(&self) -> Option<VertexId> {
        self.data.first().copied().map(VertexId::from_index)
    }

    /// Queued vertices in heap-array order.
    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.data.iter().copied().map(VertexId::from_index)
    }

    /// Appends `vertex` and sifts it toward the root.
    ///
    /// Returns the heap index it comes to rest at.
    pub fn insert(&mut self, states: &mut [VertexState], vertex: VertexId) -> Result<usize, HeapError> {
        if self.data.len() >= self.capacity {
            return Err(HeapError::CapacityExceeded { capacity: self.capacity });
        }
        let v = vertex.index();
        let vertex_count = states.len();
        let state = states.get_mut(v).ok_or(HeapError::UnknownVertex { index: v, vertex_count })?;
        if state.slot != HeapSlot::Detached {
            return Err(HeapError::AlreadyQueued { vertex });
        }
        let idx = self.data.len();
        self.data.push(v);
        state.slot = HeapSlot::Queued(idx);
        self.stats.pushes += 1;
        self.stats.max_size = self.stats.max_size.max(self.data.len() as u64);
        Ok(self.sift_up(states, idx))
    }

    /// Removes the minimum-weakness vertex and marks it settled.
    pub fn extract_min(&mut self, states: &mut [VertexState]) -> Option<VertexId> {
        let last = self.data.len().checked_sub(1)?;
        self.swap(states, 0, last);
        let min = self.data.pop()?;
        states[min].slot = HeapSlot::Settled;
        self.stats.pops += 1;
        if !self.data.is_empty() {
            self.sift_down(states, 0);
        }
        Some(VertexId::from_index(min))
    }

    /// Lowers the weakness of a queued vertex and sifts it toward the root.
    ///
    /// The new key must be strictly below the current one; anything else is a
    /// relaxation bug and is reported rather than ignored.
    pub fn decrease_key(
        &mut self,
        states: &mut [VertexState],
        vertex: VertexId,
        weakness: f64,
    ) -> Result<usize, HeapError> {
        let v = vertex.index();
        let state = states
            .get(v)
            .ok_or(HeapError::UnknownVertex { index: v, vertex_count: states.len() })?;
        let HeapSlot::Queued(index) = state.slot else {
            return Err(HeapError::NotQueued { vertex });
        };
        if index >= self.data.len() {
            return Err(HeapError::HeapIndexOutOfRange { index, len: self.data.len() });
        }
        if self.data[index] != v {
            return Err(HeapError::PositionMismatch { index, vertex });
        }
        // negated so NaN is refused too
        if !(weakness < state.weakness) {
            return Err(HeapError::NonImprovingKey { vertex, current: state.weakness, proposed: weakness });
        }
        trace!(%vertex, from = state.weakness, to = weakness, "decrease key");
        states[v].weakness = weakness;
        self.stats.decrease_keys += 1;
        Ok(self.sift_up(states, index))
    }

    /// Checks heap order and the position index in both directions.
    pub fn validate(&self, states: &[VertexState]) -> Result<(), HeapError> {
        for (i, &v) in self.data.iter().enumerate() {
            let state = states
                .get(v)
                .ok_or(HeapError::UnknownVertex { index: v, vertex_count: states.len() })?;
            if state.slot != HeapSlot::Queued(i) {
                return Err(HeapError::PositionMismatch { index: i, vertex: VertexId::from_index(v) });
            }
            if i > 0 && state.weakness < states[self.data[parent(i)]].weakness {
                return Err(HeapError::OrderViolated { parent: parent(i), child: i });
            }
        }
        for (v, state) in states.iter().enumerate() {
            if let HeapSlot::Queued(index) = state.slot {
                match self.data.get(index) {
                    None => return Err(HeapError::HeapIndexOutOfRange { index, len: self.data.len() }),
                    Some(&occupant) if occupant != v => {
                        return Err(HeapError::PositionMismatch { index, vertex: VertexId::from_index(v) });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn key(&self, states: &[VertexState], i: usize) -> f64 {
        states[self.data[i]].weakness
    }

    /// Exchanges two heap slots and both back-references.
    #[inline]
    fn swap(&mut self, states: &mut [VertexState], i: usize, j: usize) {
        self.data.swap(i, j);
        states[self.data[i]].slot = HeapSlot::Queued(i);
        states[self.data[j]].slot = HeapSlot::Queued(j);
    }

    #[inline]
    fn sift_up(&mut self, states: &mut [VertexState], mut idx: usize) -> usize {
        while idx > 0 {
            let p = parent(idx);
            if self.key(states, idx) < self.key(states, p) {
                self.swap(states, idx, p);
                idx = p;
            } else {
                break;
            }
        }
        idx
    }

    // Equal children resolve to the left one.
    #[inline]
    fn sift_down(&mut self, states: &mut [VertexState], mut idx: usize) {
        let n = self.data.len();
        loop {
            let l = left(idx);
            if l >= n {
                break;
            }
            let r = right(idx);
            let mut best = l;
            if r < n && self.key(states, r) < self.key(states, l) {
                best = r;
            }
            if self.key(states, best) < self.key(states, idx) {
                self.swap(states, idx, best);
                idx = best;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use proptest::sample::Index;
    use rstest::rstest;

    fn states_from(keys: &[f64]) -> Vec<VertexState> {
        keys.iter().map(|&k| VertexState::with_weakness(k)).collect()
    }

    fn filled(keys: &[f64]) -> (IndexedMinHeap, Vec<VertexState>) {
        let mut states = states_from(keys);
        let mut heap = IndexedMinHeap::with_capacity(keys.len());
        for i in 0..keys.len() {
            heap.insert(&mut states, VertexId::from_index(i)).expect("capacity matches");
            heap.validate(&states).expect("invariants after insert");
        }
        (heap, states)
    }

    fn drain(heap: &mut IndexedMinHeap, states: &mut [VertexState]) -> Vec<f64> {
        let mut out = Vec::new();
        while let Some(v) = heap.extract_min(states) {
            heap.validate(states).expect("invariants after extract");
            out.push(states[v.index()].weakness);
        }
        out
    }

    #[rstest]
    #[case(&[5.0, 3.0, 8.0, 1.0, 9.0, 2.0])]
    #[case(&[1.0, 1.0, 1.0, 0.0])]
    #[case(&[f64::INFINITY, 0.0, f64::INFINITY])]
    #[case(&[4.0])]
    fn extraction_is_monotonic(#[case] keys: &[f64]) {
        let (mut heap, mut states) = filled(keys);
        let order = drain(&mut heap, &mut states);
        let mut sorted = keys.to_vec();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(order, sorted);
        assert!(states.iter().all(|s| s.slot.is_settled()));
    }

    #[test]
    fn insert_reports_resting_index() {
        let mut states = states_from(&[3.0, 1.0]);
        let mut heap = IndexedMinHeap::with_capacity(2);
        assert_eq!(heap.insert(&mut states, VertexId::from_index(0)), Ok(0));
        assert_eq!(heap.insert(&mut states, VertexId::from_index(1)), Ok(0));
        assert_eq!(states[0].slot, HeapSlot::Queued(1));
        assert_eq!(heap.peek(), Some(VertexId::from_index(1)));
    }

    #[test]
    fn full_heap_rejects_insert_without_corruption() {
        let mut states = states_from(&[2.0, 1.0, 0.0]);
        let mut heap = IndexedMinHeap::with_capacity(2);
        heap.insert(&mut states, VertexId::from_index(0)).expect("room");
        heap.insert(&mut states, VertexId::from_index(1)).expect("room");
        let err = heap.insert(&mut states, VertexId::from_index(2));
        assert_eq!(err, Err(HeapError::CapacityExceeded { capacity: 2 }));
        assert_eq!(heap.len(), 2);
        assert_eq!(states[2].slot, HeapSlot::Detached);
        heap.validate(&states).expect("heap untouched");
        assert_eq!(drain(&mut heap, &mut states), vec![1.0, 2.0]);
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut states = states_from(&[1.0, 2.0]);
        let mut heap = IndexedMinHeap::with_capacity(2);
        heap.insert(&mut states, VertexId::from_index(0)).expect("room");
        assert_eq!(
            heap.insert(&mut states, VertexId::from_index(0)),
            Err(HeapError::AlreadyQueued { vertex: VertexId::from_index(0) })
        );
        heap.extract_min(&mut states);
        assert!(heap.insert(&mut states, VertexId::from_index(0)).is_err());
    }

    #[test]
    fn unknown_vertex_is_rejected() {
        let mut states = states_from(&[1.0]);
        let mut heap = IndexedMinHeap::with_capacity(4);
        assert_eq!(
            heap.insert(&mut states, VertexId::from_index(3)),
            Err(HeapError::UnknownVertex { index: 3, vertex_count: 1 })
        );
    }

    #[test]
    fn decrease_key_moves_vertex_to_root() {
        let (mut heap, mut states) = filled(&[1.0, 4.0, 6.0, 9.0, 12.0]);
        let v = VertexId::from_index(4);
        assert_eq!(heap.decrease_key(&mut states, v, 0.5), Ok(0));
        heap.validate(&states).expect("invariants after decrease");
        assert_eq!(heap.peek(), Some(v));
        assert_eq!(states[4].weakness, 0.5);
        assert_eq!(heap.stats().decrease_keys, 1);
    }

    #[rstest]
    #[case(4.0)]
    #[case(7.5)]
    #[case(f64::NAN)]
    fn non_improving_keys_are_rejected(#[case] proposed: f64) {
        let (mut heap, mut states) = filled(&[1.0, 4.0]);
        let v = VertexId::from_index(1);
        let err = heap.decrease_key(&mut states, v, proposed).expect_err("must not improve");
        assert!(matches!(err, HeapError::NonImprovingKey { current, .. } if current == 4.0));
        assert_eq!(states[1].weakness, 4.0);
        heap.validate(&states).expect("heap untouched");
    }

    #[test]
    fn decrease_key_requires_queued_vertex() {
        let mut states = states_from(&[1.0, 4.0, 5.0]);
        let mut heap = IndexedMinHeap::with_capacity(3);
        heap.insert(&mut states, VertexId::from_index(0)).expect("room");
        heap.insert(&mut states, VertexId::from_index(1)).expect("room");
        let settled = heap.extract_min(&mut states).expect("non-empty");
        assert_eq!(
            heap.decrease_key(&mut states, settled, 0.0),
            Err(HeapError::NotQueued { vertex: settled })
        );
        let detached = VertexId::from_index(2);
        assert_eq!(
            heap.decrease_key(&mut states, detached, 0.0),
            Err(HeapError::NotQueued { vertex: detached })
        );
    }

    #[test]
    fn stale_position_is_detected() {
        let (mut heap, mut states) = filled(&[1.0, 2.0, 3.0]);
        states[2].slot = HeapSlot::Queued(17);
        assert_eq!(
            heap.decrease_key(&mut states, VertexId::from_index(2), 0.0),
            Err(HeapError::HeapIndexOutOfRange { index: 17, len: 3 })
        );
        assert!(heap.validate(&states).is_err());
    }

    #[test]
    fn empty_heap_extracts_nothing() {
        let mut states = Vec::new();
        let mut heap = IndexedMinHeap::with_capacity(0);
        assert_eq!(heap.extract_min(&mut states), None);
        assert!(heap.is_empty());
        assert_eq!(heap.stats(), HeapStats::default());
    }

    #[test]
    fn stats_track_operations() {
        let (mut heap, mut states) = filled(&[3.0, 2.0, 1.0]);
        heap.extract_min(&mut states);
        let stats = heap.stats();
        assert_eq!((stats.pushes, stats.pops, stats.max_size), (3, 1, 3));
    }

    proptest! {
        #[test]
        fn invariants_hold_under_mixed_operations(
            keys in prop::collection::vec(0.0f64..1000.0, 1..48),
            ops in prop::collection::vec((any::<bool>(), any::<Index>(), 0.0f64..1.0), 0..96),
        ) {
            let mut states = states_from(&keys);
            let mut heap = IndexedMinHeap::with_capacity(keys.len());
            for i in 0..keys.len() {
                prop_assert!(heap.insert(&mut states, VertexId::from_index(i)).is_ok());
            }
            let mut floor = 0.0f64;
            let mut extracted = Vec::new();
            for (extract, pick, frac) in ops {
                if heap.is_empty() {
                    break;
                }
                if extract {
                    let v = heap.extract_min(&mut states).expect("non-empty");
                    let w = states[v.index()].weakness;
                    prop_assert!(w >= floor);
                    floor = w;
                    extracted.push(v);
                } else {
                    let v = heap.iter().nth(pick.index(heap.len())).expect("index in range");
                    let current = states[v.index()].weakness;
                    let proposed = floor + frac * (current - floor);
                    if proposed < current {
                        prop_assert!(heap.decrease_key(&mut states, v, proposed).is_ok());
                        prop_assert_eq!(states[v.index()].weakness, proposed);
                    } else {
                        prop_assert!(heap.decrease_key(&mut states, v, proposed).is_err());
                        prop_assert_eq!(states[v.index()].weakness, current);
                    }
                }
                prop_assert_eq!(heap.validate(&states), Ok(()));
            }
            while let Some(v) = heap.extract_min(&mut states) {
                let w = states[v.index()].weakness;
                prop_assert!(w >= floor);
                floor = w;
                extracted.push(v);
            }
            extracted.sort();
            extracted.dedup();
            prop_assert_eq!(extracted.len(), keys.len());
        }
    }
}
