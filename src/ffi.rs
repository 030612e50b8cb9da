//! Stable C ABI over the minimum weakness search.
//!
//! Vertex ids are 1-based on both sides of the boundary. Status codes:
//!  -  0 success
//!  - -1 empty graph, -2 source out of range, -3 null pointer
//!  - -4 edge endpoint out of range, -12 negative or non-finite weight
//!  - -5 ..= -11 heap failures (see [`crate::HeapError::code`])

use core::slice;

use crate::engine::ShortestPathEngine;
use crate::graph::Graph;
use crate::heap::HeapStats;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct MwpRunInfo {
    pub settled: u32,
    pub reached: u32,
    pub relaxations: u64,
    pub heap: HeapStats,
    pub error_code: i32, // 0 == success
}

#[inline(always)]
unsafe fn as_slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 { &[] } else { slice::from_raw_parts(ptr, len) }
}
#[inline(always)]
unsafe fn as_mut_slice<'a, T>(ptr: *mut T, len: usize) -> &'a mut [T] {
    slice::from_raw_parts_mut(ptr, len)
}

unsafe fn write_info(info: *mut MwpRunInfo, value: MwpRunInfo) {
    if !info.is_null() {
        *info = value;
    }
}

unsafe fn fail(info: *mut MwpRunInfo, code: i32) -> i32 {
    write_info(info, MwpRunInfo { error_code: code, ..MwpRunInfo::default() });
    code
}

/// Minimum weakness from `source` over the undirected edge list
/// `(heads[i], tails[i], weights[i])` for `i < m`.
///
/// Writes `+inf` / `-1` into `out_weakness` / `out_pred` for unreachable
/// vertices. `info` may be null.
///
/// # Safety
/// `heads`, `tails` and `weights` must be valid for `m` reads (they may be
/// null when `m == 0`); `out_weakness` and `out_pred` must be valid for `n`
/// writes; `info` must be null or valid for one write.
#[no_mangle]
pub unsafe extern "C" fn mwp_run(
    n: u32,
    m: u32,
    heads: *const u32,
    tails: *const u32,
    weights: *const f64,
    source: u32,
    out_weakness: *mut f64,
    out_pred: *mut i32,
    info: *mut MwpRunInfo,
) -> i32 {
    if n == 0 { return fail(info, -1); }
    if source == 0 || source > n { return fail(info, -2); }
    if out_weakness.is_null() || out_pred.is_null() { return fail(info, -3); }
    if m > 0 && (heads.is_null() || tails.is_null() || weights.is_null()) { return fail(info, -3); }

    let m_usize = m as usize;
    let heads = as_slice(heads, m_usize);
    let tails = as_slice(tails, m_usize);
    let weights = as_slice(weights, m_usize);

    let mut graph = Graph::new(n);
    for ((&u, &v), &w) in heads.iter().zip(tails).zip(weights) {
        if !w.is_finite() || w < 0.0 { return fail(info, -12); }
        if let Err(err) = graph.add_edge(u, v, w) { return fail(info, err.code()); }
    }
    let source = match graph.vertex(source) {
        Ok(v) => v,
        Err(err) => return fail(info, err.code()),
    };
    let paths = match ShortestPathEngine::new(&mut graph).run(source) {
        Ok(paths) => paths,
        Err(err) => return fail(info, err.code()),
    };

    let dist = as_mut_slice(out_weakness, n as usize);
    let pred = as_mut_slice(out_pred, n as usize);
    for v in paths.graph().vertices() {
        dist[v.index()] = paths.shortest_weakness(v);
        pred[v.index()] = paths.graph().predecessor(v).map_or(-1, |p| p.get() as i32);
    }
    let run = paths.info();
    write_info(info, MwpRunInfo {
        settled: run.settled as u32,
        reached: run.reached as u32,
        relaxations: run.relaxations,
        heap: run.heap,
        error_code: 0,
    });
    0
}

#[no_mangle]
pub extern "C" fn mwp_version() -> u32 { 1 }

#[cfg(test)]
mod tests {
    use super::*;

    fn run(n: u32, edges: &[(u32, u32, f64)], source: u32) -> (i32, Vec<f64>, Vec<i32>, MwpRunInfo) {
        let heads: Vec<u32> = edges.iter().map(|e| e.0).collect();
        let tails: Vec<u32> = edges.iter().map(|e| e.1).collect();
        let weights: Vec<f64> = edges.iter().map(|e| e.2).collect();
        let mut dist = vec![0f64; n as usize];
        let mut pred = vec![0i32; n as usize];
        let mut info = MwpRunInfo::default();
        let rc = unsafe {
            mwp_run(
                n,
                edges.len() as u32,
                heads.as_ptr(),
                tails.as_ptr(),
                weights.as_ptr(),
                source,
                dist.as_mut_ptr(),
                pred.as_mut_ptr(),
                &mut info as *mut _,
            )
        };
        (rc, dist, pred, info)
    }

    #[test]
    fn diamond_smoke() {
        let edges = [(1, 2, 2.0), (1, 3, 5.0), (2, 3, 1.0), (3, 4, 2.0)];
        let (rc, dist, pred, info) = run(5, &edges, 1);
        assert_eq!(rc, 0);
        assert_eq!(&dist[..4], &[0.0, 2.0, 3.0, 5.0]);
        assert!(dist[4].is_infinite());
        assert_eq!(pred, vec![-1, 1, 2, 3, -1]);
        assert_eq!((info.settled, info.reached, info.error_code), (5, 4, 0));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(run(0, &[], 1).0, -1);
        assert_eq!(run(2, &[], 3).0, -2);
        assert_eq!(run(2, &[(1, 3, 1.0)], 1).0, -4);
        let (rc, _, _, info) = run(2, &[(1, 2, -1.0)], 1);
        assert_eq!((rc, info.error_code), (-12, -12));
        assert_eq!(run(2, &[(1, 2, f64::NAN)], 1).0, -12);
    }

    #[test]
    fn null_outputs_are_rejected() {
        let rc = unsafe {
            mwp_run(1, 0, core::ptr::null(), core::ptr::null(), core::ptr::null(), 1, core::ptr::null_mut(), core::ptr::null_mut(), core::ptr::null_mut())
        };
        assert_eq!(rc, -3);
    }

    #[test]
    fn edgeless_graph_accepts_null_edge_arrays() {
        let mut dist = [7.0f64];
        let mut pred = [7i32];
        let rc = unsafe {
            mwp_run(1, 0, core::ptr::null(), core::ptr::null(), core::ptr::null(), 1, dist.as_mut_ptr(), pred.as_mut_ptr(), core::ptr::null_mut())
        };
        assert_eq!(rc, 0);
        assert_eq!((dist[0], pred[0]), (0.0, -1));
        assert_eq!(mwp_version(), 1);
    }
}
