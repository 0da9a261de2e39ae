// SPDX-License-Identifier: BSD-3-Clause
//! Andersen-style inclusion-based pointer analysis.
//!
//! A worklist solver over a [`ConstraintGraph`]. Loads and stores are not
//! re-evaluated against every pair of points-to facts; instead, once the
//! solver learns that a pointer `p` may point to `o`, it materializes the
//! `Copy` edges that `*p = q` and `r = *p` imply for `o`, and leaves the
//! rest to ordinary copy propagation.

use tracing::{info, info_span, trace, trace_span};

use crate::{
    graph::{ConstraintGraph, EdgeClass, EdgeKind, NodeId},
    pts::{PointsToSet, PointsToStore},
    worklist::{Discipline, Fifo, Lifo, Worklist},
    Error,
};

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub worklist: Discipline,
    /// Give up after this many worklist pops
    pub max_steps: Option<usize>,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Termination {
    /// The worklist drained; points-to sets are the least fixed point.
    FixedPoint,
    /// The run hit [`Options::max_steps`] with `pending` nodes still dirty.
    ///
    /// The points-to sets are an under-approximation of the fixed point.
    /// They are unsound for clients that conclude two pointers can't alias.
    StepLimit { pending: usize },
}

impl Termination {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Termination::FixedPoint)
    }
}

/// Work done by one run of the solver.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Metrics {
    /// Nodes popped from the worklist
    pub steps: usize,
    /// `Copy` edges added for loads and stores
    pub derived_copy_edges: usize,
    /// `(node, object)` facts in the final store
    pub points_to_pairs: usize,
    /// Nodes that point to something
    pub pointing_nodes: usize,
    /// Edges in the final graph, derived ones included
    pub edges: usize,
}

#[derive(Clone, Debug)]
pub struct Outcome {
    pub termination: Termination,
    pub metrics: Metrics,
}

#[derive(Clone, Debug)]
pub struct Output {
    pub points_to: PointsToStore,
    pub termination: Termination,
    pub metrics: Metrics,
}

impl Output {
    #[inline]
    pub fn points_to(&self, node: NodeId) -> &PointsToSet {
        self.points_to.get(node)
    }
}

pub struct Solver<'a, W> {
    graph: &'a mut ConstraintGraph,
    pts: &'a mut PointsToStore,
    worklist: W,
    max_steps: Option<usize>,
    metrics: Metrics,
}

impl<'a, W: Worklist> Solver<'a, W> {
    pub fn new(graph: &'a mut ConstraintGraph, pts: &'a mut PointsToStore, worklist: W) -> Self {
        Solver {
            graph,
            pts,
            worklist,
            max_steps: None,
            metrics: Metrics::default(),
        }
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn solve(mut self) -> Result<Outcome, Error> {
        let span = info_span!("solve");
        let _span = span.enter();

        self.initialize()?;
        let termination = loop {
            if self.worklist.is_empty() {
                break Termination::FixedPoint;
            }
            if self.max_steps.is_some_and(|max| self.metrics.steps >= max) {
                break Termination::StepLimit {
                    pending: self.worklist.len(),
                };
            }
            let p = self.worklist.pop()?;
            self.metrics.steps += 1;
            self.process(p)?;
        };

        self.metrics.points_to_pairs = self.pts.pairs();
        self.metrics.pointing_nodes = self.pts.len();
        self.metrics.edges = self.graph.edge_count();
        info!(
            steps = self.metrics.steps,
            derived = self.metrics.derived_copy_edges,
            pairs = self.metrics.points_to_pairs,
            "{:?}",
            termination
        );
        debug_assert!(!termination.is_complete() || is_fixed_point(&*self.graph, &*self.pts));
        Ok(Outcome {
            termination,
            metrics: self.metrics,
        })
    }

    /// Seed points-to sets from `Addr` edges, and queue every node that
    /// points to something, including ones the caller filled in beforehand.
    fn initialize(&mut self) -> Result<(), Error> {
        let span = trace_span!("addr");
        let _span = span.enter();

        let seeded: Vec<NodeId> = self.pts.iter().map(|(n, _)| n).collect();
        for node in seeded {
            for &object in self.pts.get(node) {
                if !self.graph.contains(node) || !self.graph.contains(object) {
                    return Err(Error::MalformedGraph {
                        src: object,
                        dst: node,
                        nodes: self.graph.bound(),
                    });
                }
            }
            self.worklist.push(node);
        }

        for edge in self.graph.edges(EdgeClass::Addr) {
            if self.pts.insert(edge.dst, edge.src) {
                self.worklist.push(edge.dst);
            }
        }
        Ok(())
    }

    fn derive_copy(&mut self, src: NodeId, dst: NodeId) -> Result<bool, Error> {
        let added = self.graph.add_edge(src, dst, EdgeKind::Copy)?;
        if added {
            trace!("derived {src} -copy-> {dst}");
            self.metrics.derived_copy_edges += 1;
        }
        Ok(added)
    }

    fn process(&mut self, p: NodeId) -> Result<(), Error> {
        // Sets of other nodes (and possibly of `p` itself, through a
        // self-loop) grow below.
        let objects: Vec<NodeId> = self.pts.get(p).iter().copied().collect();
        if objects.is_empty() {
            return Ok(());
        }

        // *p = q
        {
            let span = trace_span!("store");
            let _span = span.enter();
            let values: Vec<NodeId> = self
                .graph
                .in_edges(p, EdgeClass::Store)
                .map(|e| e.src)
                .collect();
            for &o in &objects {
                for &q in &values {
                    if self.derive_copy(q, o)? {
                        self.worklist.push(q);
                    }
                }
            }
        }

        // r = *p
        {
            let span = trace_span!("load");
            let _span = span.enter();
            let results: Vec<NodeId> = self
                .graph
                .out_edges(p, EdgeClass::Load)
                .map(|e| e.dst)
                .collect();
            for &o in &objects {
                for &r in &results {
                    if self.derive_copy(o, r)? {
                        self.worklist.push(o);
                    }
                }
            }
        }

        // x = &p->f
        {
            let span = trace_span!("gep");
            let _span = span.enter();
            let graph = &*self.graph;
            for edge in graph.out_edges(p, EdgeClass::Gep) {
                let grew = match edge.kind {
                    EdgeKind::NormalGep(offset) => self.pts.insert_all(
                        edge.dst,
                        objects.iter().map(|o| graph.field_object(*o, offset)),
                    ),
                    EdgeKind::VariantGep => self.pts.insert_all(edge.dst, objects.iter().copied()),
                    EdgeKind::Addr | EdgeKind::Copy | EdgeKind::Store | EdgeKind::Load => {
                        unreachable!("Bug! {edge} in gep adjacency")
                    }
                };
                if grew {
                    self.worklist.push(edge.dst);
                }
            }
        }

        // x = p
        {
            let span = trace_span!("copy");
            let _span = span.enter();
            for edge in self.graph.out_edges(p, EdgeClass::Copy) {
                if self.pts.insert_all(edge.dst, objects.iter().copied()) {
                    self.worklist.push(edge.dst);
                }
            }
        }

        Ok(())
    }
}

/// Whether one more application of every rule would leave `pts` unchanged.
///
/// Checks the constraints themselves rather than the derived edges, so it
/// also applies to points-to sets computed by other means.
pub fn is_fixed_point(graph: &ConstraintGraph, pts: &PointsToStore) -> bool {
    let subset = |from: NodeId, to: NodeId| pts.get(from).is_subset(pts.get(to));
    for edge in graph.edges(EdgeClass::Addr) {
        if !pts.contains(edge.dst, edge.src) {
            return false;
        }
    }
    for p in graph.nodes() {
        let objects = pts.get(p);
        for edge in graph.out_edges(p, EdgeClass::Copy) {
            if !subset(p, edge.dst) {
                return false;
            }
        }
        for edge in graph.in_edges(p, EdgeClass::Store) {
            if !objects.iter().all(|o| subset(edge.src, *o)) {
                return false;
            }
        }
        for edge in graph.out_edges(p, EdgeClass::Load) {
            if !objects.iter().all(|o| subset(*o, edge.dst)) {
                return false;
            }
        }
        for edge in graph.out_edges(p, EdgeClass::Gep) {
            let closed = match edge.kind {
                EdgeKind::NormalGep(offset) => objects
                    .iter()
                    .all(|o| pts.contains(edge.dst, graph.field_object(*o, offset))),
                EdgeKind::VariantGep => subset(p, edge.dst),
                EdgeKind::Addr | EdgeKind::Copy | EdgeKind::Store | EdgeKind::Load => true,
            };
            if !closed {
                return false;
            }
        }
    }
    true
}

/// Solve into a caller-provided store.
pub fn run_pointer_analysis(
    graph: &mut ConstraintGraph,
    pts: &mut PointsToStore,
    opts: &Options,
) -> Result<Outcome, Error> {
    let span = info_span!("pointer_analysis", worklist = %opts.worklist);
    let _span = span.enter();
    match opts.worklist {
        Discipline::Fifo => Solver::new(graph, pts, Fifo::new())
            .with_max_steps(opts.max_steps)
            .solve(),
        Discipline::Lifo => Solver::new(graph, pts, Lifo::new())
            .with_max_steps(opts.max_steps)
            .solve(),
    }
}

/// Pointer analysis
///
/// Adds derived `Copy` edges to `graph`. These are consequences of the
/// existing constraints, so running the analysis again yields the same
/// result.
pub fn analysis(graph: &mut ConstraintGraph, opts: &Options) -> Result<Output, Error> {
    let mut points_to = PointsToStore::new();
    let Outcome {
        termination,
        metrics,
    } = run_pointer_analysis(graph, &mut points_to, opts)?;
    Ok(Output {
        points_to,
        termination,
        metrics,
    })
}
