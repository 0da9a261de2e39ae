// SPDX-License-Identifier: BSD-3-Clause
use crate::graph::NodeId;
use crate::worklist::EmptyQueue;

#[derive(Clone, Debug, Hash, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An edge or a points-to entry names a node the graph doesn't have.
    #[error("Malformed constraint graph: {src} -> {dst} leaves the {nodes} allocated nodes")]
    MalformedGraph { src: NodeId, dst: NodeId, nodes: u32 },

    #[error(transparent)]
    EmptyQueue(#[from] EmptyQueue),
}
