// SPDX-License-Identifier: BSD-3-Clause
use std::fmt::Display;

/// Identifier of a node in a [`super::ConstraintGraph`].
///
/// A node is either a pointer-valued program entity or a memory object
/// (allocation site, or a field of one). Points-to sets hold `NodeId`s of
/// objects.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
