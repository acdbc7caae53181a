// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Botanical traversal orders.
//!
//! The pre-order here is *branch-before-successor*: at every vertex, all
//! lateral branches are fully expanded before the axis continues through the
//! successor child. This matches how a plant is read (finish every side
//! branch of an axis before moving up the axis), and every downstream
//! consumer (serialization, ordering queries, statistics) depends on it.
//!
//! All traversals are explicit-stack iterative: plant axes routinely run to
//! hundreds or thousands of internodes, far past any safe recursion depth.
//! They borrow the graph immutably, so mutating mid-walk is a compile error.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use smallvec::SmallVec;

use coppice_tree::VertexId;

use crate::graph::MtgGraph;
use crate::types::EdgeKind;

impl MtgGraph {
    /// The same-scale children of `vertex` in visiting order: branches in
    /// list order first, the successor (if any) last.
    pub(crate) fn ordered_children(&self, vertex: VertexId) -> SmallVec<[VertexId; 4]> {
        let mut successor = None;
        let mut out: SmallVec<[VertexId; 4]> = SmallVec::new();
        for &c in self.children(vertex) {
            if successor.is_none() && self.edge_kind(c) == Some(EdgeKind::Successor) {
                successor = Some(c);
            } else {
                out.push(c);
            }
        }
        if let Some(s) = successor {
            out.push(s);
        }
        out
    }

    /// Iterates over the same-scale subtree of `vertex` in
    /// branch-before-successor pre-order.
    ///
    /// A stale `vertex` yields an empty iterator.
    ///
    /// ```rust
    /// use coppice_mtg::{EdgeKind, MtgGraph, VertexData};
    ///
    /// let mut g = MtgGraph::new();
    /// let axis = g.add_component(g.root(), VertexData::new()).unwrap();
    /// let succ = g
    ///     .add_child(axis, VertexData { edge: Some(EdgeKind::Successor), ..VertexData::new() })
    ///     .unwrap();
    /// let side = g
    ///     .add_child(axis, VertexData { edge: Some(EdgeKind::Branch), ..VertexData::new() })
    ///     .unwrap();
    ///
    /// // The branch is visited before the axis continues.
    /// let order: Vec<_> = g.pre_order(axis).collect();
    /// assert_eq!(order, [axis, side, succ]);
    /// ```
    #[must_use]
    pub fn pre_order(&self, vertex: VertexId) -> PreOrder<'_> {
        let mut stack = Vec::new();
        if self.contains(vertex) {
            stack.push(vertex);
        }
        PreOrder { graph: self, stack }
    }

    /// Like [`MtgGraph::pre_order`], but `predicate` is consulted before
    /// each vertex is yielded; returning `false` prunes its whole subtree
    /// (and thereby the finer-scale decomposition of that subtree for any
    /// consumer expanding components).
    #[must_use]
    pub fn pre_order_filtered<F>(&self, vertex: VertexId, predicate: F) -> PreOrderFiltered<'_, F>
    where
        F: FnMut(VertexId) -> bool,
    {
        let mut stack = Vec::new();
        if self.contains(vertex) {
            stack.push(vertex);
        }
        PreOrderFiltered {
            graph: self,
            stack,
            predicate,
        }
    }

    /// Iterates over the same-scale subtree of `vertex` in post-order:
    /// children in list order, each vertex after its descendants.
    ///
    /// Used for bottom-up aggregation; no branch/successor tie-break is
    /// involved.
    #[must_use]
    pub fn post_order(&self, vertex: VertexId) -> coppice_tree::PostOrder<'_> {
        self.tree.post_order(vertex)
    }

    /// Walks the same-scale subtree of `vertex` with paired callbacks.
    ///
    /// `pre` runs when a vertex is entered; returning `false` prunes its
    /// subtree. `post` runs once a subtree closes. Children are visited in
    /// branch-before-successor order. This is the driver used to build
    /// induced sub-graphs and quotient structures.
    pub fn traverse<Pre, Post>(&self, vertex: VertexId, mut pre: Pre, mut post: Post)
    where
        Pre: FnMut(VertexId) -> bool,
        Post: FnMut(VertexId),
    {
        if !self.contains(vertex) || !pre(vertex) {
            return;
        }
        let mut stack: Vec<(VertexId, SmallVec<[VertexId; 4]>, usize)> =
            alloc::vec![(vertex, self.ordered_children(vertex), 0)];
        while let Some(frame) = stack.last_mut() {
            let (v, children, cursor) = (frame.0, &frame.1, frame.2);
            if cursor < children.len() {
                let child = children[cursor];
                frame.2 += 1;
                if pre(child) {
                    stack.push((child, self.ordered_children(child), 0));
                }
            } else {
                post(v);
                stack.pop();
            }
        }
    }

    /// Iterates over **all scales** reachable from `vertex` in a single
    /// total order.
    ///
    /// The traversal runs in pre-order over the finest-scale forest under
    /// `vertex`; before each fine vertex is yielded, its not-yet-visited
    /// coarser complexes are yielded first (coarsest first). The net effect:
    /// a coarse vertex appears, then its fine-scale components fully
    /// interleaved in pre-order, before the coarse vertex's own same-scale
    /// successor appears. Every reachable vertex is yielded exactly once.
    ///
    /// This is the order the text serializer writes in.
    #[must_use]
    pub fn iter_cross_scale(&self, vertex: VertexId) -> CrossScale<'_> {
        let Some(root_scale) = self.scale(vertex) else {
            return CrossScale {
                graph: self,
                root: vertex,
                root_scale: 0,
                stack: Vec::new(),
                visited: hashbrown::HashSet::new(),
                pending: VecDeque::new(),
            };
        };
        // Seed with the entry points of the finest-scale forests inside the
        // decomposition of `vertex`: closure members at the deepest scale
        // whose parent lies outside the closure.
        let closure = self.decomposition_closure(vertex);
        let members: hashbrown::HashSet<VertexId> = closure.iter().copied().collect();
        let fine = closure
            .iter()
            .filter_map(|&v| self.scale(v))
            .max()
            .unwrap_or(root_scale);
        let mut stack: Vec<VertexId> = closure
            .iter()
            .copied()
            .filter(|&v| {
                self.scale(v) == Some(fine)
                    && match self.parent(v) {
                        None => true,
                        Some(p) => !members.contains(&p),
                    }
            })
            .collect();
        stack.reverse();
        CrossScale {
            graph: self,
            root: vertex,
            root_scale,
            stack,
            visited: hashbrown::HashSet::new(),
            pending: VecDeque::new(),
        }
    }
}

/// Branch-before-successor pre-order iterator.
///
/// Returned by [`MtgGraph::pre_order`].
#[derive(Debug)]
pub struct PreOrder<'a> {
    graph: &'a MtgGraph,
    stack: Vec<VertexId>,
}

impl Iterator for PreOrder<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let vertex = self.stack.pop()?;
        for &c in self.graph.ordered_children(vertex).iter().rev() {
            self.stack.push(c);
        }
        Some(vertex)
    }
}

/// Pruning pre-order iterator returned by [`MtgGraph::pre_order_filtered`].
pub struct PreOrderFiltered<'a, F> {
    graph: &'a MtgGraph,
    stack: Vec<VertexId>,
    predicate: F,
}

impl<F> core::fmt::Debug for PreOrderFiltered<'_, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PreOrderFiltered")
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

impl<F> Iterator for PreOrderFiltered<'_, F>
where
    F: FnMut(VertexId) -> bool,
{
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        loop {
            let vertex = self.stack.pop()?;
            if !(self.predicate)(vertex) {
                continue;
            }
            for &c in self.graph.ordered_children(vertex).iter().rev() {
                self.stack.push(c);
            }
            return Some(vertex);
        }
    }
}

/// Cross-scale total-order iterator returned by
/// [`MtgGraph::iter_cross_scale`].
#[derive(Debug)]
pub struct CrossScale<'a> {
    graph: &'a MtgGraph,
    root: VertexId,
    root_scale: u32,
    /// Pre-order stack over the finest scale.
    stack: Vec<VertexId>,
    visited: hashbrown::HashSet<VertexId>,
    /// Coarse-to-fine run waiting to be emitted.
    pending: VecDeque<VertexId>,
}

impl Iterator for CrossScale<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        loop {
            if let Some(v) = self.pending.pop_front() {
                return Some(v);
            }
            let vertex = self.stack.pop()?;

            // Climb the complex chain, collecting unvisited ancestors until
            // we either reach a visited one or hit the traversal root. A
            // chain that reaches the root's scale anywhere else has left the
            // decomposition: prune the branch.
            let mut chain: SmallVec<[VertexId; 4]> = SmallVec::new();
            let mut cursor = vertex;
            let in_bounds = loop {
                if self.visited.contains(&cursor) {
                    break true;
                }
                if self.graph.scale(cursor) == Some(self.root_scale) {
                    if cursor == self.root {
                        chain.push(cursor);
                        break true;
                    }
                    break false;
                }
                chain.push(cursor);
                match self.graph.complex(cursor) {
                    Some(c) => cursor = c,
                    None => break false,
                }
            };
            if !in_bounds {
                continue;
            }
            for &c in self.graph.ordered_children(vertex).iter().rev() {
                self.stack.push(c);
            }
            for &u in chain.iter().rev() {
                self.visited.insert(u);
                self.pending.push_back(u);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use coppice_tree::VertexId;

    use crate::graph::MtgGraph;
    use crate::types::{EdgeKind, VertexData};

    fn succ() -> VertexData {
        VertexData {
            edge: Some(EdgeKind::Successor),
            ..VertexData::new()
        }
    }

    fn branch() -> VertexData {
        VertexData {
            edge: Some(EdgeKind::Branch),
            ..VertexData::new()
        }
    }

    /// root / P1 / I1 < I2 (+I4 < I5) < I3; P2 follows P1 with I6.
    fn two_plants() -> (MtgGraph, Vec<VertexId>) {
        let mut g = MtgGraph::new();
        let p1 = g.add_component(g.root(), VertexData::new()).unwrap();
        let i1 = g.add_component(p1, VertexData::new()).unwrap();
        let i2 = g.add_child(i1, succ()).unwrap();
        let i4 = g.add_child(i2, branch()).unwrap();
        let i5 = g.add_child(i4, succ()).unwrap();
        let i3 = g.add_child(i2, succ()).unwrap();
        let (i6, p2) = g.add_child_and_complex(i3, succ(), succ()).unwrap();
        let root = g.root();
        (g, alloc::vec![root, p1, i1, i2, i3, i4, i5, p2, i6])
    }

    #[test]
    fn branches_complete_before_the_successor() {
        let (g, v) = two_plants();
        let (i1, i2, i3, i4, i5, i6) = (v[2], v[3], v[4], v[5], v[6], v[8]);
        let order: Vec<_> = g.pre_order(i1).collect();
        assert_eq!(order, [i1, i2, i4, i5, i3, i6]);

        // Everything under the branch axis precedes everything under the
        // successor, subtrees included.
        let pos = |x: VertexId| order.iter().position(|&v| v == x).unwrap();
        assert!(pos(i5) < pos(i3));
    }

    #[test]
    fn post_order_closes_children_first() {
        let (g, v) = two_plants();
        let (i1, i2, i3, i4, i5, i6) = (v[2], v[3], v[4], v[5], v[6], v[8]);
        let order: Vec<_> = g.post_order(i1).collect();
        assert_eq!(order, [i5, i4, i6, i3, i2, i1]);
    }

    #[test]
    fn filtered_pre_order_prunes_subtrees() {
        let (g, v) = two_plants();
        let (i1, i2, i3, i4, i6) = (v[2], v[3], v[4], v[5], v[8]);
        let order: Vec<_> = g.pre_order_filtered(i1, |x| x != i4).collect();
        assert_eq!(order, [i1, i2, i3, i6], "pruning i4 removes i5 as well");
    }

    #[test]
    fn traverse_fires_post_on_subtree_close() {
        let (g, v) = two_plants();
        let i1 = v[2];
        let mut pre = Vec::new();
        let mut post = Vec::new();
        g.traverse(
            i1,
            |x| {
                pre.push(x);
                true
            },
            |x| post.push(x),
        );
        assert_eq!(pre, g.pre_order(i1).collect::<Vec<_>>());
        // Post-closing respects the same child order.
        assert_eq!(post, [v[6], v[5], v[8], v[4], v[3], v[2]]);
    }

    #[test]
    fn cross_scale_interleaves_coarse_before_fine() {
        let (g, v) = two_plants();
        let (root, p1, i1, i2, i3, i4, i5, p2, i6) =
            (v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7], v[8]);
        let order: Vec<_> = g.iter_cross_scale(root).collect();
        assert_eq!(order, [root, p1, i1, i2, i4, i5, i3, p2, i6]);
    }

    #[test]
    fn cross_scale_visits_each_vertex_once() {
        let (g, _) = two_plants();
        let order: Vec<_> = g.iter_cross_scale(g.root()).collect();
        let mut dedup = order.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(order.len(), g.len());
        assert_eq!(dedup.len(), order.len());
    }

    #[test]
    fn cross_scale_from_a_sub_complex_stays_inside_it() {
        let (g, v) = two_plants();
        let (p1, i1, i2, i3, i4, i5) = (v[1], v[2], v[3], v[4], v[5], v[6]);
        let order: Vec<_> = g.iter_cross_scale(p1).collect();
        // P2's internode I6 is structurally adjacent (child of I3) but does
        // not decompose from P1.
        assert_eq!(order, [p1, i1, i2, i4, i5, i3]);
    }

    #[test]
    fn cross_scale_covers_disconnected_plants() {
        // Two plants with no same-scale edge between them: the fine scale is
        // a forest, as a freshly parsed multi-plant file produces.
        let mut g = MtgGraph::new();
        let p1 = g.add_component(g.root(), VertexData::new()).unwrap();
        let i1 = g.add_component(p1, VertexData::new()).unwrap();
        let i2 = g.add_child(i1, succ()).unwrap();
        let p2 = g.add_component(g.root(), VertexData::new()).unwrap();
        let j1 = g.add_component(p2, VertexData::new()).unwrap();

        let order: Vec<_> = g.iter_cross_scale(g.root()).collect();
        assert_eq!(order, [g.root(), p1, i1, i2, p2, j1]);
    }
}
