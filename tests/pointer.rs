// To debug or develop a test, try `eprintln!("{}", out.points_to)`

use std::collections::{BTreeMap, BTreeSet};

use rand::{rngs::StdRng, Rng, SeedableRng};

use andersen::{
    analysis::oracle,
    graph::file::GraphFile,
    pointer::{self, is_fixed_point, Options, Outcome, Solver, Termination},
    ConstraintGraph, Discipline, EdgeKind, EmptyQueue, Error, NodeId, PointsToStore, Worklist,
};

// ------------------------------------------------------------------
// Helpers

/// Drains nodes in a random order, and doesn't deduplicate
struct Shuffled {
    nodes: Vec<NodeId>,
    rng: StdRng,
}

impl Shuffled {
    fn new(seed: u64) -> Self {
        Shuffled {
            nodes: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Worklist for Shuffled {
    fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    fn pop(&mut self) -> Result<NodeId, EmptyQueue> {
        if self.nodes.is_empty() {
            return Err(EmptyQueue);
        }
        let i = self.rng.gen_range(0..self.nodes.len());
        Ok(self.nodes.swap_remove(i))
    }

    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(serde::Deserialize)]
struct Expectations {
    #[serde(default)]
    expect: BTreeMap<String, BTreeSet<String>>,
}

fn load(path: &str) -> (GraphFile, Expectations) {
    let path = format!("tests/pointer/{path}");
    let s = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{path}: {e}"));
    let file: GraphFile = serde_json::from_str(&s).unwrap();
    let expectations: Expectations = serde_json::from_str(&s).unwrap();
    (file, expectations)
}

fn solve(graph: &ConstraintGraph, worklist: Discipline) -> PointsToStore {
    let mut graph = graph.clone();
    let opts = Options {
        worklist,
        ..Options::default()
    };
    let out = pointer::analysis(&mut graph, &opts).unwrap();
    assert_eq!(Termination::FixedPoint, out.termination);
    assert!(is_fixed_point(&graph, &out.points_to));
    out.points_to
}

fn solve_shuffled(graph: &ConstraintGraph, seed: u64) -> PointsToStore {
    let mut graph = graph.clone();
    let mut pts = PointsToStore::new();
    let Outcome { termination, .. } = Solver::new(&mut graph, &mut pts, Shuffled::new(seed))
        .solve()
        .unwrap();
    assert!(termination.is_complete());
    pts
}

fn named(file: &GraphFile, pts: &PointsToStore) -> BTreeMap<String, BTreeSet<String>> {
    pts.iter()
        .map(|(n, s)| (file.name(n), s.iter().map(|o| file.name(*o)).collect()))
        .collect()
}

/// Every solver agrees with the reference and with the expected sets
fn check(path: &str) -> (ConstraintGraph, PointsToStore) {
    let (file, expectations) = load(path);
    let graph = file.graph().unwrap();
    let expected = oracle::analysis(&graph);
    assert_eq!(expectations.expect, named(&file, &expected), "{path}");

    let fifo = solve(&graph, Discipline::Fifo);
    assert_eq!(expected, fifo, "{path} (fifo)");
    let lifo = solve(&graph, Discipline::Lifo);
    assert_eq!(expected, lifo, "{path} (lifo)");
    for seed in 0..8 {
        assert_eq!(expected, solve_shuffled(&graph, seed), "{path} (seed {seed})");
    }

    let mut solved = graph.clone();
    let out = pointer::analysis(&mut solved, &Options::default()).unwrap();
    (solved, out.points_to)
}

fn pts(store: &PointsToStore, node: u32) -> Vec<u32> {
    store.get(NodeId(node)).iter().map(|o| o.0).collect()
}

/// A graph with `nodes` nodes and `edges` random edges of every kind
fn random_graph(rng: &mut StdRng, nodes: u32, edges: usize) -> ConstraintGraph {
    let mut g = ConstraintGraph::with_nodes(nodes);
    for _ in 0..edges {
        let src = NodeId(rng.gen_range(0..nodes));
        let dst = NodeId(rng.gen_range(0..nodes));
        let kind = match rng.gen_range(0..10) {
            0..=2 => EdgeKind::Addr,
            3..=4 => EdgeKind::Copy,
            5 => EdgeKind::Store,
            6 => EdgeKind::Load,
            7..=8 => EdgeKind::NormalGep(rng.gen_range(0..4)),
            _ => EdgeKind::VariantGep,
        };
        g.add_edge(src, dst, kind).unwrap();
    }
    g
}

// ------------------------------------------------------------------
// Scenarios

#[test]
fn address_copy() {
    let (_, out) = check("scenarios/address_copy.json");
    assert_eq!(vec![0], pts(&out, 1));
    assert_eq!(vec![0], pts(&out, 2));
}

#[test]
fn store_load() {
    let (g, out) = check("scenarios/store_load.json");
    // q -copy-> a, for the store through p
    assert!(g.has_edge(NodeId(3), NodeId(0), EdgeKind::Copy));
    // a -copy-> r, for the load through p
    assert!(g.has_edge(NodeId(0), NodeId(4), EdgeKind::Copy));
    assert_eq!(vec![0], pts(&out, 2));
    assert_eq!(vec![1], pts(&out, 0));
    assert_eq!(vec![1], pts(&out, 4));
}

#[test]
fn normal_gep() {
    let (_, out) = check("scenarios/normal_gep.json");
    assert_eq!(vec![12], pts(&out, 1));
}

#[test]
fn variant_gep() {
    let (_, out) = check("scenarios/variant_gep.json");
    assert_eq!(vec![10], pts(&out, 1));
}

#[test]
fn copy_cycle() {
    let (_, out) = check("scenarios/copy_cycle.json");
    assert_eq!(vec![0], pts(&out, 1));
    assert_eq!(pts(&out, 1), pts(&out, 2));
}

// ------------------------------------------------------------------
// Programs

#[test]
fn linked_list() {
    check("programs/linked_list.json");
}

#[test]
fn swap() {
    check("programs/swap.json");
}

#[test]
fn thread() {
    check("programs/thread.json");
}

// ------------------------------------------------------------------
// Properties

#[test]
fn order_independence() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let nodes = rng.gen_range(2..40);
        let edges = rng.gen_range(0..120);
        let graph = random_graph(&mut rng, nodes, edges);
        let expected = oracle::analysis(&graph);
        assert_eq!(expected, solve(&graph, Discipline::Fifo));
        assert_eq!(expected, solve(&graph, Discipline::Lifo));
        assert_eq!(expected, solve_shuffled(&graph, rng.gen()));
    }
}

#[test]
fn long_copy_chain() {
    let n = 10_000;
    let mut g = ConstraintGraph::with_nodes(n + 1);
    g.add_edge(NodeId(n), NodeId(0), EdgeKind::Addr).unwrap();
    for i in 0..n - 1 {
        g.add_edge(NodeId(i), NodeId(i + 1), EdgeKind::Copy).unwrap();
    }
    // Close the chain into one big cycle
    g.add_edge(NodeId(n - 1), NodeId(0), EdgeKind::Copy).unwrap();
    let out = pointer::analysis(&mut g, &Options::default()).unwrap();
    assert!(out.termination.is_complete());
    assert_eq!(vec![n], pts(&out.points_to, n - 1));
    assert_eq!(n as usize, out.metrics.pointing_nodes);
}

#[test]
fn malformed_file() {
    let file: GraphFile = serde_json::from_str(
        r#"{"nodes": 2, "edges": [{"kind": "load", "src": 0, "dst": 5}]}"#,
    )
    .unwrap();
    assert_eq!(
        Err(Error::MalformedGraph {
            src: NodeId(0),
            dst: NodeId(5),
            nodes: 2
        }),
        file.graph().map(|g| g.edge_count())
    );
}
