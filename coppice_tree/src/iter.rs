// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain depth-first traversals over the bare tree structure.
//!
//! These iterators ignore edge kinds; the branch-before-successor orders
//! used by the multiscale layer live in `coppice_mtg`. All of them are
//! explicit-stack iterative so that long plant axes (thousands of vertices)
//! cannot overflow the call stack, and all of them borrow the tree, so the
//! borrow checker rejects mutation mid-walk.

use alloc::vec::Vec;

use crate::{Tree, VertexId};

impl Tree {
    /// Iterates over the subtree rooted at `vertex` in pre-order, children
    /// in insertion order.
    ///
    /// A stale `vertex` yields an empty iterator.
    #[must_use]
    pub fn descendants(&self, vertex: VertexId) -> Descendants<'_> {
        let mut stack = Vec::new();
        if self.contains(vertex) {
            stack.push(vertex);
        }
        Descendants { tree: self, stack }
    }

    /// Iterates over the subtree rooted at `vertex` in post-order, children
    /// in insertion order, each vertex after all of its descendants.
    ///
    /// A stale `vertex` yields an empty iterator.
    #[must_use]
    pub fn post_order(&self, vertex: VertexId) -> PostOrder<'_> {
        let mut stack = Vec::new();
        if self.contains(vertex) {
            stack.push((vertex, 0));
        }
        PostOrder { tree: self, stack }
    }

    /// Iterates from `vertex` to the root, following parent links.
    ///
    /// The sequence starts with `vertex` itself. A stale `vertex` yields an
    /// empty iterator.
    #[must_use]
    pub fn ancestors(&self, vertex: VertexId) -> Ancestors<'_> {
        let current = self.contains(vertex).then_some(vertex);
        Ancestors {
            tree: self,
            current,
        }
    }
}

/// Pre-order iterator returned by [`Tree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<VertexId>,
}

impl Iterator for Descendants<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let vertex = self.stack.pop()?;
        // Reversed so the first child is expanded first.
        for &child in self.tree.children(vertex).iter().rev() {
            self.stack.push(child);
        }
        Some(vertex)
    }
}

/// Post-order iterator returned by [`Tree::post_order`].
///
/// Each frame records how many children have been expanded so far.
#[derive(Debug)]
pub struct PostOrder<'a> {
    tree: &'a Tree,
    stack: Vec<(VertexId, usize)>,
}

impl Iterator for PostOrder<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        loop {
            let (vertex, visited) = *self.stack.last()?;
            let children = self.tree.children(vertex);
            if visited < children.len() {
                self.stack.last_mut().expect("stack is non-empty").1 += 1;
                self.stack.push((children[visited], 0));
            } else {
                self.stack.pop();
                return Some(vertex);
            }
        }
    }
}

/// Parent-chain iterator returned by [`Tree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a Tree,
    current: Option<VertexId>,
}

impl Iterator for Ancestors<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let vertex = self.current?;
        self.current = self.tree.parent(vertex);
        Some(vertex)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::{Tree, VertexId};

    fn sample() -> (Tree, [VertexId; 5]) {
        // root -> [a -> [c, d], b]
        let mut tree = Tree::new();
        let a = tree.add_child(tree.root()).unwrap();
        let b = tree.add_child(tree.root()).unwrap();
        let c = tree.add_child(a).unwrap();
        let d = tree.add_child(a).unwrap();
        let root = tree.root();
        (tree, [root, a, b, c, d])
    }

    #[test]
    fn pre_order_expands_each_child_fully() {
        let (tree, [root, a, b, c, d]) = sample();
        let order: Vec<_> = tree.descendants(root).collect();
        assert_eq!(order, [root, a, c, d, b]);
    }

    #[test]
    fn post_order_visits_children_first() {
        let (tree, [root, a, b, c, d]) = sample();
        let order: Vec<_> = tree.post_order(root).collect();
        assert_eq!(order, [c, d, a, b, root]);
    }

    #[test]
    fn ancestors_walks_to_the_root() {
        let (tree, [root, a, _, c, _]) = sample();
        let chain: Vec<_> = tree.ancestors(c).collect();
        assert_eq!(chain, [c, a, root]);
    }

    #[test]
    fn stale_start_yields_nothing() {
        let (mut tree, [_, _, b, _, _]) = sample();
        tree.remove_vertex(b).unwrap();
        assert_eq!(tree.descendants(b).count(), 0);
        assert_eq!(tree.post_order(b).count(), 0);
        assert_eq!(tree.ancestors(b).count(), 0);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        // A long axis: the iterators must not overflow the call stack.
        let mut tree = Tree::new();
        let mut tip = tree.root();
        for _ in 0..10_000 {
            tip = tree.add_child(tip).unwrap();
        }
        assert_eq!(tree.descendants(tree.root()).count(), 10_001);
        assert_eq!(tree.post_order(tree.root()).count(), 10_001);
        assert_eq!(tree.ancestors(tip).count(), 10_001);
    }
}
