// SPDX-License-Identifier: BSD-3-Clause
//! Queues of nodes whose points-to sets changed since they were last
//! processed.
//!
//! The solver's fixed point doesn't depend on the order in which dirty nodes
//! are drained, so the discipline is purely a performance knob.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::graph::NodeId;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, thiserror::Error)]
#[error("Pop from an empty worklist")]
pub struct EmptyQueue;

pub trait Worklist {
    fn push(&mut self, node: NodeId);

    /// Callers check [`Worklist::is_empty`] first.
    fn pop(&mut self) -> Result<NodeId, EmptyQueue>;

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;
}

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Discipline {
    #[default]
    Fifo,
    Lifo,
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discipline::Fifo => write!(f, "fifo"),
            Discipline::Lifo => write!(f, "lifo"),
        }
    }
}

/// First in, first out. A node already waiting isn't queued twice.
#[derive(Clone, Debug, Default)]
pub struct Fifo {
    queue: VecDeque<NodeId>,
    pending: FxHashSet<NodeId>,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Worklist for Fifo {
    fn push(&mut self, node: NodeId) {
        if self.pending.insert(node) {
            self.queue.push_back(node);
        }
    }

    fn pop(&mut self) -> Result<NodeId, EmptyQueue> {
        let node = self.queue.pop_front().ok_or(EmptyQueue)?;
        self.pending.remove(&node);
        Ok(node)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Last in, first out. A node already waiting isn't queued twice.
#[derive(Clone, Debug, Default)]
pub struct Lifo {
    stack: Vec<NodeId>,
    pending: FxHashSet<NodeId>,
}

impl Lifo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Worklist for Lifo {
    fn push(&mut self, node: NodeId) {
        if self.pending.insert(node) {
            self.stack.push(node);
        }
    }

    fn pop(&mut self) -> Result<NodeId, EmptyQueue> {
        let node = self.stack.pop().ok_or(EmptyQueue)?;
        self.pending.remove(&node);
        Ok(node)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    fn len(&self) -> usize {
        self.stack.len()
    }
}
