//! Times the indexed decrease-key search against a lazy-deletion binary heap
//! on random graphs and writes a JSON report.
//!
//! cargo run --release --example bench -- --sizes 10000,20000 --degrees 2,4,8 --out benchmarks/native.json

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use min_weakness::{Graph, ShortestPathEngine, VertexId};

#[derive(Debug, Parser)]
struct Args {
    #[arg(long, value_delimiter = ',', default_value = "10000,20000")]
    sizes: Vec<u32>,
    #[arg(long, value_delimiter = ',', default_value = "4")]
    degrees: Vec<f32>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = "benchmarks/native_sample.json")]
    out: PathBuf,
}

#[derive(Copy, Clone)]
struct HeapItem { node: usize, dist: f64 }
impl PartialEq for HeapItem { fn eq(&self, o: &Self) -> bool { self.cmp(o) == Ordering::Equal } }
impl Eq for HeapItem {}
// reversed for min-heap semantics on std's max-heap
impl Ord for HeapItem { fn cmp(&self, o: &Self) -> Ordering { o.dist.total_cmp(&self.dist) } }
impl PartialOrd for HeapItem { fn partial_cmp(&self, o: &Self) -> Option<Ordering> { Some(self.cmp(o)) } }

// Baseline: push duplicates, skip stale pops.
fn lazy_dijkstra(g: &Graph, source: VertexId) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; g.vertex_count()];
    dist[source.index()] = 0.0;
    let mut pq = BinaryHeap::new();
    pq.push(HeapItem { node: source.index(), dist: 0.0 });
    while let Some(HeapItem { node, dist: d }) = pq.pop() {
        if d > dist[node] { continue; }
        for e in g.neighbors(VertexId::from_index(node)) {
            let v = e.target.index();
            let nd = d + e.weight;
            if nd < dist[v] { dist[v] = nd; pq.push(HeapItem { node: v, dist: nd }); }
        }
    }
    dist
}

fn run_one(n: u32, avg_degree: f32, seed: u64) -> Result<serde_json::Value> {
    let mut g = Graph::random(n, avg_degree, seed);
    let source = g.vertex(1)?;
    let t0 = Instant::now();
    let baseline = lazy_dijkstra(&g, source);
    let dt_base = t0.elapsed().as_secs_f64() * 1000.0;

    let t1 = Instant::now();
    let paths = ShortestPathEngine::new(&mut g).run(source)?;
    let dt_indexed = t1.elapsed().as_secs_f64() * 1000.0;

    for v in paths.graph().vertices() {
        let (a, b) = (baseline[v.index()], paths.shortest_weakness(v));
        ensure!(a == b || (a - b).abs() <= 1e-9 * a.abs().max(1.0), "parity fail at vertex {v}: {a} vs {b}");
    }
    let info = paths.info();
    Ok(serde_json::json!({
        "n": n, "m": paths.graph().edge_count(), "avg_degree": avg_degree,
        "baseline_ms": dt_base, "indexed_ms": dt_indexed,
        "speedup": dt_base / dt_indexed.max(1e-9),
        "reached": info.reached,
        "relaxations": info.relaxations,
        "heap": info.heap,
    }))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut results = Vec::new();
    for &n in &args.sizes {
        for &deg in &args.degrees {
            results.push(run_one(n, deg, args.seed)?);
        }
    }
    let json = serde_json::Value::Array(results);
    if let Some(dir) = args.out.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let mut f = File::create(&args.out).with_context(|| format!("create {}", args.out.display()))?;
    f.write_all(serde_json::to_string_pretty(&json)?.as_bytes())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
