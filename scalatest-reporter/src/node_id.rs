// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Allocation of node ids for the test tree.
//!
//! Every suite, scope and test that is opened gets a fresh id. TeamCity uses
//! `nodeId` and `parentNodeId` to rebuild the tree, so the stack of currently
//! open nodes is tracked here.

use crate::errors::NodeStackError;
use std::fmt;

/// The id of a node in the test tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new `NodeId`.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value of this id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The stack of open nodes, along with the id allocator.
///
/// The allocator is never rewound: [`reset`](Self::reset) roots the stack at
/// the most recently allocated id, so ids stay unique across several runs
/// reported through the same stack.
#[derive(Clone, Debug, Default)]
pub struct NodeIdStack {
    last_allocated: u64,
    open: Vec<NodeId>,
}

impl NodeIdStack {
    /// Creates a new, unstarted stack.
    ///
    /// [`reset`](Self::reset) must be called before any other operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the stack and pushes the root node.
    pub fn reset(&mut self) {
        self.open.clear();
        self.open.push(NodeId(self.last_allocated));
    }

    /// Returns true once [`reset`](Self::reset) has been called.
    pub fn is_started(&self) -> bool {
        !self.open.is_empty()
    }

    /// Returns the number of open nodes, including the root.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Returns the innermost open node.
    pub fn current(&self) -> Result<NodeId, NodeStackError> {
        self.open.last().copied().ok_or(NodeStackError::NotStarted)
    }

    /// Opens a new node below the current one.
    ///
    /// Returns the id of the parent, i.e. the node that was current before
    /// this call. The new node's id is available through
    /// [`current`](Self::current).
    pub fn descend(&mut self) -> Result<NodeId, NodeStackError> {
        let parent = self.current()?;
        self.last_allocated += 1;
        self.open.push(NodeId(self.last_allocated));
        Ok(parent)
    }

    /// Closes the current node and returns its id.
    pub fn ascend(&mut self) -> Result<NodeId, NodeStackError> {
        match self.open.len() {
            0 => Err(NodeStackError::NotStarted),
            1 => Err(NodeStackError::AscendPastRoot),
            _ => Ok(self
                .open
                .pop()
                .expect("stack has more than one element")),
        }
    }
}
