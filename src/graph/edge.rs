// SPDX-License-Identifier: BSD-3-Clause
use std::fmt::Display;

use super::NodeId;

/// The constraint an edge encodes.
///
/// Edges are always read as `src -kind-> dst`:
///
/// - `Addr`: `dst = &src`, `src` is an object
/// - `Copy`: `dst = src`
/// - `Store`: `*dst = src`
/// - `Load`: `dst = *src`
/// - `NormalGep(k)`: `dst = &src->field_k`
/// - `VariantGep`: `dst = &src[i]` for a non-constant `i`
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeKind {
    Addr,
    Copy,
    Store,
    Load,
    NormalGep(u32),
    VariantGep,
}

impl EdgeKind {
    #[inline]
    pub fn class(self) -> EdgeClass {
        match self {
            EdgeKind::Addr => EdgeClass::Addr,
            EdgeKind::Copy => EdgeClass::Copy,
            EdgeKind::Store => EdgeClass::Store,
            EdgeKind::Load => EdgeClass::Load,
            EdgeKind::NormalGep(_) | EdgeKind::VariantGep => EdgeClass::Gep,
        }
    }
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Addr => write!(f, "addr"),
            EdgeKind::Copy => write!(f, "copy"),
            EdgeKind::Store => write!(f, "store"),
            EdgeKind::Load => write!(f, "load"),
            EdgeKind::NormalGep(offset) => write!(f, "gep+{offset}"),
            EdgeKind::VariantGep => write!(f, "gep+?"),
        }
    }
}

/// [`EdgeKind`] without its payload, used to select adjacency lists.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeClass {
    Addr,
    Copy,
    Store,
    Load,
    Gep,
}

impl EdgeClass {
    pub(crate) const COUNT: usize = 5;

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            EdgeClass::Addr => 0,
            EdgeClass::Copy => 1,
            EdgeClass::Store => 2,
            EdgeClass::Load => 3,
            EdgeClass::Gep => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    #[inline]
    pub fn new(src: NodeId, dst: NodeId, kind: EdgeKind) -> Self {
        Edge { src, dst, kind }
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -{}-> {}", self.src, self.kind, self.dst)
    }
}
