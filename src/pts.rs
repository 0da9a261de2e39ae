// SPDX-License-Identifier: BSD-3-Clause
//! Points-to sets, keyed by node.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use rustc_hash::FxHashMap;

use crate::graph::NodeId;

pub type PointsToSet = BTreeSet<NodeId>;

static EMPTY: PointsToSet = BTreeSet::new();

/// Insert-only map from nodes to the objects they may point to.
#[derive(Clone, Debug, Default)]
pub struct PointsToStore {
    sets: FxHashMap<NodeId, PointsToSet>,
}

impl PointsToStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` to `pts(node)`, returning whether the set grew.
    #[inline]
    pub fn insert(&mut self, node: NodeId, object: NodeId) -> bool {
        self.sets.entry(node).or_default().insert(object)
    }

    /// Add every object to `pts(node)`, returning whether the set grew.
    pub fn insert_all<I>(&mut self, node: NodeId, objects: I) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        let set = self.sets.entry(node).or_default();
        let before = set.len();
        set.extend(objects);
        set.len() != before
    }

    /// The current points-to set of `node`, empty if nothing was inserted.
    #[inline]
    pub fn get(&self, node: NodeId) -> &PointsToSet {
        self.sets.get(&node).unwrap_or(&EMPTY)
    }

    #[inline]
    pub fn contains(&self, node: NodeId, object: NodeId) -> bool {
        self.get(node).contains(&object)
    }

    /// Number of nodes with a non-empty points-to set
    pub fn len(&self) -> usize {
        self.sets.values().filter(|s| !s.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of `(node, object)` facts
    pub fn pairs(&self) -> usize {
        self.sets.values().map(BTreeSet::len).sum()
    }

    /// Non-empty sets in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PointsToSet)> {
        let mut nodes: Vec<_> = self
            .sets
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(n, _)| *n)
            .collect();
        nodes.sort_unstable();
        nodes.into_iter().map(move |n| (n, self.get(n)))
    }

    pub fn to_map(&self) -> BTreeMap<NodeId, Vec<NodeId>> {
        self.iter()
            .map(|(n, s)| (n, s.iter().copied().collect()))
            .collect()
    }
}

/// Ignores nodes whose set is present but empty
impl PartialEq for PointsToStore {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for PointsToStore {}

impl FromIterator<(NodeId, NodeId)> for PointsToStore {
    fn from_iter<T: IntoIterator<Item = (NodeId, NodeId)>>(iter: T) -> Self {
        let mut store = PointsToStore::new();
        for (node, object) in iter {
            store.insert(node, object);
        }
        store
    }
}

/// One line per node with a non-empty set, in ascending node order:
/// `node --> {o1, o2}`. Nodes pointing to nothing are left out; see
/// [`crate::graph::file::GraphFile::dump`] for a dump of every node.
impl Display for PointsToStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (node, set) in self.iter() {
            write!(f, "{node} --> {{")?;
            for (i, o) in set.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{o}")?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PointsToStore;
    use crate::graph::NodeId;

    #[test]
    fn insert_is_idempotent() {
        let mut pts = PointsToStore::new();
        assert!(pts.insert(NodeId(1), NodeId(0)));
        assert!(!pts.insert(NodeId(1), NodeId(0)));
        assert_eq!(1, pts.pairs());
    }

    #[test]
    fn unknown_node_is_empty() {
        let pts = PointsToStore::new();
        assert!(pts.get(NodeId(7)).is_empty());
        assert!(pts.is_empty());
    }

    #[test]
    fn insert_all_reports_growth() {
        let mut pts = PointsToStore::new();
        assert!(pts.insert_all(NodeId(0), [NodeId(3), NodeId(4)]));
        assert!(!pts.insert_all(NodeId(0), [NodeId(4)]));
        assert!(!pts.insert_all(NodeId(1), []));
        assert!(pts.insert_all(NodeId(0), [NodeId(4), NodeId(5)]));
        assert_eq!(3, pts.get(NodeId(0)).len());
        assert_eq!(1, pts.len());
    }

    #[test]
    fn dump_is_sorted() {
        let pts: PointsToStore = [
            (NodeId(9), NodeId(2)),
            (NodeId(1), NodeId(5)),
            (NodeId(1), NodeId(0)),
        ]
        .into_iter()
        .collect();
        assert_eq!("1 --> {0, 5}\n9 --> {2}\n", pts.to_string());
    }

    #[test]
    fn to_map_skips_empty_sets() {
        let mut pts = PointsToStore::new();
        pts.insert_all(NodeId(4), []);
        pts.insert(NodeId(2), NodeId(7));
        pts.insert(NodeId(2), NodeId(1));
        let map = pts.to_map();
        assert_eq!(1, map.len());
        assert_eq!(Some(&vec![NodeId(1), NodeId(7)]), map.get(&NodeId(2)));
    }
}
