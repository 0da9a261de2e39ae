// SPDX-License-Identifier: BSD-3-Clause
//! Andersen-style inclusion-based points-to analysis.
//!
//! The input is a [`ConstraintGraph`] built elsewhere (see [`graph::file`]
//! for a serialized form); the output is a [`PointsToStore`] holding, for
//! every node, the objects it may point to.

pub mod analysis;
mod error;
pub mod graph;
pub mod layers;
pub mod pts;
pub mod worklist;

pub use analysis::pointer;
pub use error::Error;
pub use graph::{ConstraintGraph, Edge, EdgeClass, EdgeKind, NodeId};
pub use pts::{PointsToSet, PointsToStore};
pub use worklist::{Discipline, EmptyQueue, Fifo, Lifo, Worklist};
