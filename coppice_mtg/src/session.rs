// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An explicit holder for the graphs a host application works on.
//!
//! Interactive front ends historically kept "the current MTG" in a global
//! slot. Here that state is an explicit value the host owns and threads
//! through its calls: a `Session` holds any number of graphs and marks one
//! of them active.

use alloc::vec::Vec;

use crate::graph::MtgGraph;

/// An owned collection of graphs with one active slot.
#[derive(Debug, Default)]
pub struct Session {
    graphs: Vec<MtgGraph>,
    active: usize,
}

impl Session {
    /// An empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of graphs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns `true` if the session holds no graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Adds a graph, makes it active, and returns its slot index.
    pub fn insert(&mut self, graph: MtgGraph) -> usize {
        self.graphs.push(graph);
        self.active = self.graphs.len() - 1;
        self.active
    }

    /// Makes slot `index` active. Returns `false` for an out-of-range slot.
    pub fn activate(&mut self, index: usize) -> bool {
        if index < self.graphs.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// The active slot index, if any graph is held.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        (!self.graphs.is_empty()).then_some(self.active)
    }

    /// The active graph, if any.
    #[must_use]
    pub fn active(&self) -> Option<&MtgGraph> {
        self.graphs.get(self.active)
    }

    /// The active graph mutably, if any.
    pub fn active_mut(&mut self) -> Option<&mut MtgGraph> {
        self.graphs.get_mut(self.active)
    }

    /// Removes and returns the graph in slot `index`.
    ///
    /// Later slots shift down; the active slot follows the graph it pointed
    /// at where possible.
    pub fn remove(&mut self, index: usize) -> Option<MtgGraph> {
        if index >= self.graphs.len() {
            return None;
        }
        let graph = self.graphs.remove(index);
        if self.active > index {
            self.active -= 1;
        } else if self.active >= self.graphs.len() && !self.graphs.is_empty() {
            self.active = self.graphs.len() - 1;
        }
        Some(graph)
    }

    /// Iterates over the held graphs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &MtgGraph> {
        self.graphs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VertexData;

    #[test]
    fn insert_activates_and_remove_reindexes() {
        let mut session = Session::new();
        assert!(session.active().is_none());

        let a = session.insert(MtgGraph::new());
        let mut second = MtgGraph::new();
        second
            .add_component(second.root(), VertexData::new())
            .unwrap();
        let b = session.insert(second);
        assert_eq!(session.active_index(), Some(b));
        assert_eq!(session.active().map(MtgGraph::len), Some(2));

        assert!(session.activate(a));
        assert!(!session.activate(7));
        assert_eq!(session.active_index(), Some(a));

        // Removing an earlier slot keeps the active graph stable.
        session.activate(b);
        session.remove(a);
        assert_eq!(session.active().map(MtgGraph::len), Some(2));
        assert_eq!(session.len(), 1);

        session.remove(0);
        assert!(session.is_empty());
        assert!(session.active().is_none());
    }
}
