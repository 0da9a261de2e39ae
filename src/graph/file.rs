// SPDX-License-Identifier: BSD-3-Clause
//! JSON serialization of constraint graphs.
//!
//! Besides the six edge kinds the solver understands, the format accepts
//! the copy-like statements a graph builder typically emits (parameter
//! passing, returns, thread fork/join, phi and select). They are lowered to
//! plain `Copy` edges on load.

use std::collections::BTreeMap;
use std::io::{self, Write};

use super::{ConstraintGraph, EdgeKind, NodeId};
use crate::{Error, PointsToStore};

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Statement {
    Addr { src: NodeId, dst: NodeId },
    Copy { src: NodeId, dst: NodeId },
    Store { src: NodeId, dst: NodeId },
    Load { src: NodeId, dst: NodeId },
    NormalGep { src: NodeId, dst: NodeId, offset: u32 },
    VariantGep { src: NodeId, dst: NodeId },
    Call { src: NodeId, dst: NodeId },
    Ret { src: NodeId, dst: NodeId },
    ThreadFork { src: NodeId, dst: NodeId },
    ThreadJoin { src: NodeId, dst: NodeId },
    Phi { operands: Vec<NodeId>, result: NodeId },
    Select { operands: Vec<NodeId>, result: NodeId },
}

impl Statement {
    /// The edges this statement stands for.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, EdgeKind)> {
        match self {
            Statement::Addr { src, dst } => vec![(*src, *dst, EdgeKind::Addr)],
            Statement::Copy { src, dst }
            | Statement::Call { src, dst }
            | Statement::Ret { src, dst }
            | Statement::ThreadFork { src, dst }
            | Statement::ThreadJoin { src, dst } => vec![(*src, *dst, EdgeKind::Copy)],
            Statement::Store { src, dst } => vec![(*src, *dst, EdgeKind::Store)],
            Statement::Load { src, dst } => vec![(*src, *dst, EdgeKind::Load)],
            Statement::NormalGep { src, dst, offset } => {
                vec![(*src, *dst, EdgeKind::NormalGep(*offset))]
            }
            Statement::VariantGep { src, dst } => vec![(*src, *dst, EdgeKind::VariantGep)],
            Statement::Phi { operands, result } | Statement::Select { operands, result } => {
                operands
                    .iter()
                    .map(|op| (*op, *result, EdgeKind::Copy))
                    .collect()
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GraphFile {
    /// Number of nodes; ids run from `0` to `nodes - 1`
    pub nodes: u32,
    /// Optional human-readable names, for printing
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub names: BTreeMap<u32, String>,
    #[serde(default)]
    pub edges: Vec<Statement>,
}

impl GraphFile {
    pub fn graph(&self) -> Result<ConstraintGraph, Error> {
        let mut graph = ConstraintGraph::with_nodes(self.nodes);
        for stmt in &self.edges {
            for (src, dst, kind) in stmt.edges() {
                if src.0 >= self.nodes || dst.0 >= self.nodes {
                    return Err(Error::MalformedGraph {
                        src,
                        dst,
                        nodes: self.nodes,
                    });
                }
                graph.add_edge(src, dst, kind)?;
            }
        }
        Ok(graph)
    }

    pub fn name(&self, node: NodeId) -> String {
        match self.names.get(&node.0) {
            Some(name) => name.clone(),
            None => node.to_string(),
        }
    }

    /// Non-empty points-to sets keyed and valued by node name
    pub fn named(&self, pts: &PointsToStore) -> BTreeMap<String, Vec<String>> {
        pts.to_map()
            .into_iter()
            .map(|(n, objects)| {
                (
                    self.name(n),
                    objects.into_iter().map(|o| self.name(o)).collect(),
                )
            })
            .collect()
    }

    /// One line per node of the file, empty sets included, in ascending
    /// node order. The overflow object follows when it points to something.
    pub fn dump<W: Write>(&self, pts: &PointsToStore, w: &mut W) -> io::Result<()> {
        let overflow = NodeId(self.nodes);
        let nodes = (0..self.nodes)
            .map(NodeId)
            .chain(Some(overflow).filter(|o| !pts.get(*o).is_empty()));
        for node in nodes {
            let objects: Vec<String> = pts.get(node).iter().map(|o| self.name(*o)).collect();
            writeln!(w, "{} --> {{{}}}", self.name(node), objects.join(", "))?;
        }
        Ok(())
    }
}
