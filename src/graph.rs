// SPDX-License-Identifier: BSD-3-Clause
//! The constraint graph consumed by the solver.
//!
//! Nodes are dense integer ids allocated up front; the graph stores, for
//! every node, its incoming and outgoing edges partitioned by [`EdgeClass`].
//! Nodes are never created or destroyed after construction, edges are only
//! ever added. The solver relies on the latter when it materializes derived
//! `Copy` edges for loads and stores.

use rustc_hash::FxHashSet;

use crate::Error;

mod edge;
pub use edge::*;
pub mod file;
mod node;
pub use node::*;

#[derive(Clone, Debug, Default)]
struct Adjacency {
    out: [Vec<Edge>; EdgeClass::COUNT],
    inc: [Vec<Edge>; EdgeClass::COUNT],
}

#[derive(Clone, Debug)]
pub struct ConstraintGraph {
    /// One slot per node, plus the trailing overflow object
    nodes: Vec<Adjacency>,
    index: FxHashSet<Edge>,
}

impl ConstraintGraph {
    /// A graph with nodes `0..nodes` and no edges.
    ///
    /// One more node, `nodes` itself, is reserved as the overflow object
    /// (see [`ConstraintGraph::field_object`]).
    pub fn with_nodes(nodes: u32) -> Self {
        ConstraintGraph {
            nodes: vec![Adjacency::default(); nodes as usize + 1],
            index: FxHashSet::default(),
        }
    }

    /// Number of nodes allocated by the caller, not counting the overflow
    /// object.
    #[inline]
    pub fn node_count(&self) -> u32 {
        (self.nodes.len() - 1) as u32
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.index.len()
    }

    /// The object standing for every field whose id can't be represented.
    ///
    /// Points-to facts about it are a conservative summary: anything that
    /// reaches a field past the end of the id space reaches this object.
    #[inline]
    pub fn overflow_object(&self) -> NodeId {
        NodeId(self.node_count())
    }

    /// Exclusive upper bound of valid node ids
    #[inline]
    pub(crate) fn bound(&self) -> u32 {
        self.node_count().saturating_add(1)
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    /// All nodes, including the overflow object, in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..=self.node_count()).map(NodeId)
    }

    /// Field `offset` of object `base` in the flat field model.
    ///
    /// Saturates to [`ConstraintGraph::overflow_object`] rather than wrapping
    /// around onto an unrelated object.
    pub fn field_object(&self, base: NodeId, offset: u32) -> NodeId {
        match base.0.checked_add(offset).map(NodeId) {
            Some(field) if field < self.overflow_object() => field,
            _ => {
                tracing::debug!("field {offset} of {base} saturated to the overflow object");
                self.overflow_object()
            }
        }
    }

    /// Add `src -kind-> dst`, returning whether the edge is new.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, kind: EdgeKind) -> Result<bool, Error> {
        if !self.contains(src) || !self.contains(dst) {
            return Err(Error::MalformedGraph {
                src,
                dst,
                nodes: self.bound(),
            });
        }
        let edge = Edge::new(src, dst, kind);
        if !self.index.insert(edge) {
            return Ok(false);
        }
        let slot = kind.class().slot();
        self.nodes[src.index()].out[slot].push(edge);
        self.nodes[dst.index()].inc[slot].push(edge);
        Ok(true)
    }

    #[inline]
    pub fn has_edge(&self, src: NodeId, dst: NodeId, kind: EdgeKind) -> bool {
        self.index.contains(&Edge::new(src, dst, kind))
    }

    /// Edges `node -> _` of the given class, in insertion order.
    pub fn out_edges(&self, node: NodeId, class: EdgeClass) -> impl Iterator<Item = Edge> + '_ {
        self.nodes
            .get(node.index())
            .map(|adj| adj.out[class.slot()].as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Edges `_ -> node` of the given class, in insertion order.
    pub fn in_edges(&self, node: NodeId, class: EdgeClass) -> impl Iterator<Item = Edge> + '_ {
        self.nodes
            .get(node.index())
            .map(|adj| adj.inc[class.slot()].as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Every edge of the given class, grouped by source node.
    pub fn edges(&self, class: EdgeClass) -> impl Iterator<Item = Edge> + '_ {
        self.nodes
            .iter()
            .flat_map(move |adj| adj.out[class.slot()].iter().copied())
    }
}
