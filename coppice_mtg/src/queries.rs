// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topological queries: ancestor walks, branching order, rank, height, and
//! axis extraction.
//!
//! All of these read the graph through the parent chain. Parent links never
//! cross scales, so no query here needs an explicit scale guard: a walk from
//! an internode ends at its axis' first internode, not at the plant.

use alloc::vec::Vec;

use bitflags::bitflags;

use coppice_tree::{GraphError, VertexId};

use crate::graph::MtgGraph;
use crate::types::EdgeKind;

bitflags! {
    /// Which same-scale edge kinds an ancestor walk may cross.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EdgeMask: u8 {
        /// `<` edges may be crossed.
        const SUCCESSOR = 0b0000_0001;
        /// `+` edges may be crossed.
        const BRANCH = 0b0000_0010;
    }
}

impl Default for EdgeMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Scope restriction for an ancestor walk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Restriction {
    /// No restriction: walk to the scale root.
    #[default]
    None,
    /// Stay inside the origin's complex.
    SameComplex,
    /// Stay on the origin's axis (successor edges only).
    SameAxis,
}

/// Configuration of an ancestor walk.
///
/// Built with combinators, in the spirit of a query filter:
///
/// ```rust
/// use coppice_mtg::AncestorWalk;
///
/// let walk = AncestorWalk::new().same_complex();
/// # let _ = walk;
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct AncestorWalk {
    /// Edge kinds the walk may cross; defaults to all.
    pub edges: EdgeMask,
    /// Scope restriction; defaults to none.
    pub restriction: Restriction,
    /// Containment boundary: stop before leaving this vertex's
    /// decomposition.
    pub within: Option<VertexId>,
}

impl AncestorWalk {
    /// An unrestricted walk.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the walk to the crossable edge kinds in `mask`.
    #[must_use]
    pub fn edges(mut self, mask: EdgeMask) -> Self {
        self.edges = mask;
        self
    }

    /// Stops the walk at the origin's complex boundary.
    #[must_use]
    pub fn same_complex(mut self) -> Self {
        self.restriction = Restriction::SameComplex;
        self
    }

    /// Stops the walk at the first non-successor edge.
    #[must_use]
    pub fn same_axis(mut self) -> Self {
        self.restriction = Restriction::SameAxis;
        self
    }

    /// Stops the walk before it leaves `boundary`'s decomposition.
    #[must_use]
    pub fn within(mut self, boundary: VertexId) -> Self {
        self.within = Some(boundary);
        self
    }
}

impl MtgGraph {
    /// Iterates from `vertex` toward its scale root under `walk`'s rules.
    ///
    /// The sequence starts at `vertex` itself and follows parent links; it
    /// ends early when the next step would cross a masked-out edge kind,
    /// break the restriction, or leave the containment boundary. A stale
    /// `vertex` yields an empty iterator.
    #[must_use]
    pub fn ancestors_with(&self, vertex: VertexId, walk: AncestorWalk) -> MtgAncestors<'_> {
        MtgAncestors {
            graph: self,
            walk,
            origin_complex: self.complex(vertex),
            current: self.contains(vertex).then_some(vertex),
        }
    }

    /// Iterates from `vertex` to its scale root, unrestricted.
    #[must_use]
    pub fn ancestors(&self, vertex: VertexId) -> coppice_tree::Ancestors<'_> {
        self.tree.ancestors(vertex)
    }

    /// The vertices from `ancestor` down to `vertex`, both included.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if either vertex is not live,
    /// [`GraphError::NotAnAncestor`] if `ancestor` is not on `vertex`'s
    /// parent chain.
    pub fn path(
        &self,
        ancestor: VertexId,
        vertex: VertexId,
    ) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains(ancestor) {
            return Err(GraphError::InvalidVertex(ancestor));
        }
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let mut chain: Vec<VertexId> = Vec::new();
        for v in self.ancestors(vertex) {
            chain.push(v);
            if v == ancestor {
                chain.reverse();
                return Ok(chain);
            }
        }
        Err(GraphError::NotAnAncestor { ancestor, vertex })
    }

    /// The botanical branching order of `vertex`: how many `+` edges lie on
    /// the path from the scale root down to it. Trunk entities have order 0.
    #[must_use]
    pub fn order(&self, vertex: VertexId) -> Option<u32> {
        if !self.contains(vertex) {
            return None;
        }
        let mut count = 0;
        for v in self.ancestors(vertex) {
            if self.parent(v).is_some() && self.edge_kind(v) == Some(EdgeKind::Branch) {
                count += 1;
            }
        }
        Some(count)
    }

    /// The rank of `vertex`: how many consecutive `<` edges separate it from
    /// its nearest non-successor ancestor.
    #[must_use]
    pub fn rank(&self, vertex: VertexId) -> Option<u32> {
        if !self.contains(vertex) {
            return None;
        }
        let mut count = 0;
        let mut cursor = vertex;
        while self.edge_kind(cursor) == Some(EdgeKind::Successor) {
            let Some(parent) = self.parent(cursor) else {
                break;
            };
            count += 1;
            cursor = parent;
        }
        Some(count)
    }

    /// The height of `vertex`: the number of edges on the path from its
    /// scale root down to it.
    #[must_use]
    pub fn height(&self, vertex: VertexId) -> Option<u32> {
        if !self.contains(vertex) {
            return None;
        }
        let edges = self.ancestors(vertex).count() - 1;
        u32::try_from(edges).ok()
    }

    /// The maximal successor chain through `vertex`, start to tip.
    ///
    /// The chain is found by walking up while the incoming edge is `<`, then
    /// following the unique successor child down. A graph with two successor
    /// children under one vertex is corrupt; [`MtgGraph::validate`] reports
    /// it, and this walk follows the first.
    #[must_use]
    pub fn axis(&self, vertex: VertexId) -> Axis<'_> {
        self.axis_walk(vertex, false)
    }

    /// Like [`MtgGraph::axis`], but clipped to `vertex`'s complex.
    #[must_use]
    pub fn local_axis(&self, vertex: VertexId) -> Axis<'_> {
        self.axis_walk(vertex, true)
    }

    fn axis_walk(&self, vertex: VertexId, local: bool) -> Axis<'_> {
        if !self.contains(vertex) {
            return Axis {
                graph: self,
                current: None,
                complex: None,
            };
        }
        let complex = local.then(|| self.complex(vertex)).flatten();
        let mut cursor = vertex;
        while self.edge_kind(cursor) == Some(EdgeKind::Successor) {
            let Some(parent) = self.parent(cursor) else {
                break;
            };
            if local && self.complex(parent) != complex {
                break;
            }
            cursor = parent;
        }
        Axis {
            graph: self,
            current: Some(cursor),
            complex: if local { complex } else { None },
        }
    }

    /// The axis carrying `vertex`'s scale root: the trunk of its branch
    /// system.
    #[must_use]
    pub fn trunk(&self, vertex: VertexId) -> Axis<'_> {
        let top = self.ancestors(vertex).last();
        match top {
            Some(top) => self.axis(top),
            None => Axis {
                graph: self,
                current: None,
                complex: None,
            },
        }
    }
}

/// Restricted parent-chain iterator returned by
/// [`MtgGraph::ancestors_with`].
#[derive(Debug)]
pub struct MtgAncestors<'a> {
    graph: &'a MtgGraph,
    walk: AncestorWalk,
    origin_complex: Option<VertexId>,
    current: Option<VertexId>,
}

impl Iterator for MtgAncestors<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let vertex = self.current?;
        self.current = self.step(vertex);
        Some(vertex)
    }
}

impl MtgAncestors<'_> {
    /// The next ancestor the walk may move to, if any.
    fn step(&self, vertex: VertexId) -> Option<VertexId> {
        let parent = self.graph.parent(vertex)?;
        let kind = self.graph.edge_kind(vertex);
        let crossable = match kind {
            Some(EdgeKind::Successor) => self.walk.edges.contains(EdgeMask::SUCCESSOR),
            Some(EdgeKind::Branch) => self.walk.edges.contains(EdgeMask::BRANCH),
            _ => true,
        };
        if !crossable {
            return None;
        }
        match self.walk.restriction {
            Restriction::None => {}
            Restriction::SameComplex => {
                if self.graph.complex(parent) != self.origin_complex {
                    return None;
                }
            }
            Restriction::SameAxis => {
                if kind != Some(EdgeKind::Successor) {
                    return None;
                }
            }
        }
        if let Some(boundary) = self.walk.within {
            let scale = self.graph.scale(boundary)?;
            if self.graph.complex_at_scale(parent, scale) != Ok(boundary) {
                return None;
            }
        }
        Some(parent)
    }
}

/// Successor-chain iterator returned by [`MtgGraph::axis`],
/// [`MtgGraph::local_axis`], and [`MtgGraph::trunk`].
#[derive(Debug)]
pub struct Axis<'a> {
    graph: &'a MtgGraph,
    current: Option<VertexId>,
    /// When set, the chain is clipped to this complex.
    complex: Option<VertexId>,
}

impl Iterator for Axis<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let vertex = self.current?;
        let next = self.graph.successor_of(vertex).filter(|&s| {
            self.complex.is_none() || self.graph.complex(s) == self.complex
        });
        self.current = next;
        Some(vertex)
    }
}
