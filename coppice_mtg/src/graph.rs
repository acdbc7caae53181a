// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The multiscale graph: a rooted tree replicated at nested scales, linked
//! by complex/component relations.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use coppice_tree::{GraphError, PropertyStore, Tree, VertexId};

use crate::types::{EdgeKind, Inconsistency, VertexData};

/// A Multiscale Tree Graph.
///
/// An `MtgGraph` layers three relations over a [`Tree`]:
///
/// - `scale`: every vertex lives at one integer level of abstraction; the
///   root is the only scale-0 vertex, and increasing scales are finer
///   decompositions (plant → axis → internode → …).
/// - `complex`/`components`: each vertex decomposes from a coarser *complex*
///   and may decompose into finer *components*. Only component roots record
///   their complex explicitly; for every other vertex the complex is derived
///   by walking parent links to the nearest explicit entry.
/// - `edge`: same-scale parent edges carry an [`EdgeKind`] distinguishing
///   axis successors from lateral branches.
///
/// Parent links never cross scales. A freshly parsed graph is typically a
/// forest at every coarse scale; [`MtgGraph::complete_coarse_edges`] derives
/// the missing edges from the finer structure.
///
/// ## Example
///
/// ```rust
/// use coppice_mtg::{EdgeKind, MtgGraph, VertexData};
///
/// let mut g = MtgGraph::new();
/// // One plant, decomposed into two internodes along an axis.
/// let plant = g.add_component(g.root(), VertexData::new()).unwrap();
/// let i1 = g.add_component(plant, VertexData::new()).unwrap();
/// let i2 = g
///     .add_child(
///         i1,
///         VertexData {
///             edge: Some(EdgeKind::Successor),
///             ..VertexData::new()
///         },
///     )
///     .unwrap();
///
/// assert_eq!(g.scale(i2), Some(2));
/// assert_eq!(g.complex(i2), Some(plant));
/// let components: Vec<_> = g.components(plant).collect();
/// assert_eq!(components, [i1, i2]);
/// ```
#[derive(Clone, Debug)]
pub struct MtgGraph {
    pub(crate) tree: Tree,
    pub(crate) scale: BTreeMap<VertexId, u32>,
    /// Only vertices whose complex was set directly (component roots).
    pub(crate) explicit_complex: BTreeMap<VertexId, VertexId>,
    /// Per complex, the recorded roots of its finer-scale subtrees.
    pub(crate) components: BTreeMap<VertexId, SmallVec<[VertexId; 2]>>,
    pub(crate) edge: BTreeMap<VertexId, EdgeKind>,
    pub(crate) label: BTreeMap<VertexId, String>,
}

impl Default for MtgGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MtgGraph {
    /// Creates a graph holding only the scale-0 root.
    #[must_use]
    pub fn new() -> Self {
        let tree = Tree::new();
        let mut scale = BTreeMap::new();
        scale.insert(tree.root(), 0);
        Self {
            tree,
            scale,
            explicit_complex: BTreeMap::new(),
            components: BTreeMap::new(),
            edge: BTreeMap::new(),
            label: BTreeMap::new(),
        }
    }

    // --- plain structural accessors (delegated) ---

    /// The scale-0 root vertex.
    #[must_use]
    pub fn root(&self) -> VertexId {
        self.tree.root()
    }

    /// Number of live vertices across all scales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always `false`: the root is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `vertex` is live.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.tree.contains(vertex)
    }

    /// Same-scale parent of `vertex`, or `None` for scale roots.
    #[must_use]
    pub fn parent(&self, vertex: VertexId) -> Option<VertexId> {
        self.tree.parent(vertex)
    }

    /// Same-scale children of `vertex`, in insertion order.
    #[must_use]
    pub fn children(&self, vertex: VertexId) -> &[VertexId] {
        self.tree.children(vertex)
    }

    /// Number of same-scale children.
    #[must_use]
    pub fn nb_children(&self, vertex: VertexId) -> usize {
        self.tree.nb_children(vertex)
    }

    /// Returns `true` if `vertex` is live and has no same-scale children.
    #[must_use]
    pub fn is_leaf(&self, vertex: VertexId) -> bool {
        self.tree.is_leaf(vertex)
    }

    /// Iterates over the other children of `vertex`'s parent.
    pub fn siblings(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.tree.siblings(vertex)
    }

    /// Iterates over all live vertex ids in ascending id order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.tree.vertex_ids()
    }

    /// The underlying rooted tree, for plain (edge-kind-blind) traversals.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Shared access to the property store.
    #[must_use]
    pub fn properties(&self) -> &PropertyStore {
        self.tree.properties()
    }

    /// Mutable access to the property store.
    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        self.tree.properties_mut()
    }

    // --- labels and edge kinds ---

    /// The label of `vertex`, if one is set.
    #[must_use]
    pub fn label(&self, vertex: VertexId) -> Option<&str> {
        self.label.get(&vertex).map(String::as_str)
    }

    /// Sets the label of `vertex`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live.
    pub fn set_label(
        &mut self,
        vertex: VertexId,
        label: impl Into<String>,
    ) -> Result<(), GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        self.label.insert(vertex, label.into());
        Ok(())
    }

    /// The numeric index of `vertex`'s label (`"I12"` → `12`), if any.
    #[must_use]
    pub fn index(&self, vertex: VertexId) -> Option<u64> {
        let label = self.label(vertex)?;
        let digits = label.trim_start_matches(|c: char| !c.is_ascii_digit());
        digits.parse().ok()
    }

    /// The kind of the edge attaching `vertex` to its parent, if recorded.
    #[must_use]
    pub fn edge_kind(&self, vertex: VertexId) -> Option<EdgeKind> {
        self.edge.get(&vertex).copied()
    }

    /// Records the kind of the edge attaching `vertex` to its parent.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live, or
    /// [`GraphError::DuplicateSuccessor`] if making `vertex` a successor
    /// would give its parent two successor children.
    pub fn set_edge_kind(&mut self, vertex: VertexId, kind: EdgeKind) -> Result<(), GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        if kind == EdgeKind::Successor
            && let Some(parent) = self.parent(vertex)
            && let Some(existing) = self.successor_of(parent)
            && existing != vertex
        {
            return Err(GraphError::DuplicateSuccessor { parent, existing });
        }
        self.edge.insert(vertex, kind);
        Ok(())
    }

    /// The unique successor child of `vertex`, if any.
    #[must_use]
    pub fn successor_of(&self, vertex: VertexId) -> Option<VertexId> {
        self.children(vertex)
            .iter()
            .copied()
            .find(|&c| self.edge_kind(c) == Some(EdgeKind::Successor))
    }

    // --- scales ---

    /// The scale of `vertex`; the root is the only scale-0 vertex.
    #[must_use]
    pub fn scale(&self, vertex: VertexId) -> Option<u32> {
        self.scale.get(&vertex).copied()
    }

    /// The finest scale present in the graph.
    #[must_use]
    pub fn max_scale(&self) -> u32 {
        self.scale.values().copied().max().unwrap_or(0)
    }

    /// Iterates over the distinct scales present, coarsest first.
    pub fn scales(&self) -> impl Iterator<Item = u32> {
        let distinct: alloc::collections::BTreeSet<u32> = self.scale.values().copied().collect();
        distinct.into_iter()
    }

    /// Iterates over the vertices at `scale`, in ascending id order.
    pub fn vertices_at_scale(&self, scale: u32) -> impl Iterator<Item = VertexId> + '_ {
        self.scale
            .iter()
            .filter(move |&(_, &s)| s == scale)
            .map(|(&v, _)| v)
    }

    /// Iterates over the parentless vertices at `scale`.
    ///
    /// On a freshly parsed graph these are the forest roots the completion
    /// pass will connect; afterwards each populated scale keeps exactly one.
    pub fn roots_at_scale(&self, scale: u32) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices_at_scale(scale)
            .filter(|&v| self.parent(v).is_none())
    }

    // --- complexes and components ---

    /// The coarser vertex `vertex` decomposes from.
    ///
    /// Component roots record their complex explicitly; for every other
    /// vertex the relation is derived by walking parent links upward to the
    /// nearest explicit entry. Only the global root has no complex.
    #[must_use]
    pub fn complex(&self, vertex: VertexId) -> Option<VertexId> {
        let mut cursor = Some(vertex);
        while let Some(v) = cursor {
            if let Some(&complex) = self.explicit_complex.get(&v) {
                return Some(complex);
            }
            cursor = self.parent(v);
        }
        None
    }

    /// The ancestor complex of `vertex` at exactly `scale`.
    ///
    /// `scale` must satisfy `0 <= scale <= scale(vertex)`; out-of-range
    /// arguments are a hard error, never clamped.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live (or its complex
    /// chain is broken), [`GraphError::ScaleOutOfRange`] for a `scale`
    /// finer than the vertex's own.
    pub fn complex_at_scale(
        &self,
        vertex: VertexId,
        scale: u32,
    ) -> Result<VertexId, GraphError> {
        let own = self
            .scale(vertex)
            .ok_or(GraphError::InvalidVertex(vertex))?;
        if scale > own {
            return Err(GraphError::ScaleOutOfRange {
                vertex,
                scale: own,
                requested: scale,
            });
        }
        let mut cursor = vertex;
        for _ in 0..(own - scale) {
            cursor = self
                .complex(cursor)
                .ok_or(GraphError::InvalidVertex(cursor))?;
        }
        Ok(cursor)
    }

    /// Iterates over all components of `vertex`, one scale finer.
    ///
    /// Recorded component roots are expanded in pre-order
    /// (branch-before-successor); descendants whose own complex diverges
    /// from `vertex` are pruned, so two sibling decompositions stay separate
    /// even when their fine-scale trees touch.
    #[must_use]
    pub fn components(&self, vertex: VertexId) -> Components<'_> {
        let mut stack = Vec::new();
        if let Some(roots) = self.components.get(&vertex) {
            for &r in roots.iter().rev() {
                stack.push(r);
            }
        }
        Components {
            graph: self,
            complex: vertex,
            stack,
        }
    }

    /// Number of components of `vertex`.
    #[must_use]
    pub fn nb_components(&self, vertex: VertexId) -> usize {
        self.components(vertex).count()
    }

    /// Iterates over the recorded component roots of `vertex` whose parent
    /// (if any) belongs to a different complex.
    pub fn component_roots(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.components
            .get(&vertex)
            .into_iter()
            .flat_map(|roots| roots.iter().copied())
            .filter(move |&r| match self.parent(r) {
                None => true,
                Some(p) => self.complex(p) != Some(vertex),
            })
    }

    /// The components of `vertex` at exactly `scale`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live,
    /// [`GraphError::ScaleOutOfRange`] if `scale` is coarser than the
    /// vertex's own.
    pub fn components_at_scale(
        &self,
        vertex: VertexId,
        scale: u32,
    ) -> Result<Vec<VertexId>, GraphError> {
        let own = self
            .scale(vertex)
            .ok_or(GraphError::InvalidVertex(vertex))?;
        if scale < own {
            return Err(GraphError::ScaleOutOfRange {
                vertex,
                scale: own,
                requested: scale,
            });
        }
        let mut level = alloc::vec![vertex];
        for _ in own..scale {
            let mut next = Vec::new();
            for v in level {
                next.extend(self.components(v));
            }
            level = next;
        }
        Ok(level)
    }

    // --- construction ---

    /// Creates a component of `complex`, one scale finer.
    ///
    /// The first component of a complex becomes a recorded component root.
    /// The new vertex records `complex` explicitly, so its finer subtree
    /// resolves through it.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `complex` is not live, or
    /// [`GraphError::IdInUse`] for a taken explicit id.
    pub fn add_component(
        &mut self,
        complex: VertexId,
        data: VertexData,
    ) -> Result<VertexId, GraphError> {
        let complex_scale = self
            .scale(complex)
            .ok_or(GraphError::InvalidVertex(complex))?;
        let vertex = self.tree.add_detached(data.id)?;
        self.scale.insert(vertex, complex_scale + 1);
        self.explicit_complex.insert(vertex, complex);
        self.components.entry(complex).or_default().push(vertex);
        self.apply_data(vertex, data);
        Ok(vertex)
    }

    /// Creates a same-scale child of `parent`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `parent` is not live,
    /// [`GraphError::IdInUse`] for a taken explicit id, or
    /// [`GraphError::DuplicateSuccessor`] if a successor edge is requested
    /// and `parent` already has one.
    pub fn add_child(
        &mut self,
        parent: VertexId,
        data: VertexData,
    ) -> Result<VertexId, GraphError> {
        let parent_scale = self
            .scale(parent)
            .ok_or(GraphError::InvalidVertex(parent))?;
        if data.edge == Some(EdgeKind::Successor)
            && let Some(existing) = self.successor_of(parent)
        {
            return Err(GraphError::DuplicateSuccessor { parent, existing });
        }
        let child = match data.id {
            Some(id) => self.tree.add_child_with_id(parent, id)?,
            None => self.tree.add_child(parent)?,
        };
        self.scale.insert(child, parent_scale);
        self.apply_data(child, data);
        Ok(child)
    }

    /// Atomically creates a same-scale child of `parent` *and* a matching
    /// new complex as a same-scale child of `complex(parent)`, recording the
    /// child as the new complex's component root.
    ///
    /// Both halves commit together: every precondition is validated before
    /// any state changes, so a failure leaves the graph untouched and a
    /// partially-linked pair is never observable.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `parent` is not live or has no
    /// complex (the global root), [`GraphError::IdInUse`] for taken or
    /// colliding explicit ids, or [`GraphError::DuplicateSuccessor`] if a
    /// requested successor edge conflicts on either scale.
    pub fn add_child_and_complex(
        &mut self,
        parent: VertexId,
        child_data: VertexData,
        complex_data: VertexData,
    ) -> Result<(VertexId, VertexId), GraphError> {
        if !self.contains(parent) {
            return Err(GraphError::InvalidVertex(parent));
        }
        let parent_complex = self
            .complex(parent)
            .ok_or(GraphError::InvalidVertex(parent))?;

        // Validate everything up front: the two inserts below must not be
        // separable by an error in between.
        if let Some(id) = child_data.id {
            if self.contains(id) {
                return Err(GraphError::IdInUse(id));
            }
            if complex_data.id == Some(id) {
                return Err(GraphError::IdInUse(id));
            }
        }
        if let Some(id) = complex_data.id
            && self.contains(id)
        {
            return Err(GraphError::IdInUse(id));
        }
        if child_data.edge == Some(EdgeKind::Successor)
            && let Some(existing) = self.successor_of(parent)
        {
            return Err(GraphError::DuplicateSuccessor { parent, existing });
        }
        if complex_data.edge == Some(EdgeKind::Successor)
            && let Some(existing) = self.successor_of(parent_complex)
        {
            return Err(GraphError::DuplicateSuccessor {
                parent: parent_complex,
                existing,
            });
        }

        // Insert the half with an explicit id first, so the other half's
        // fresh allocation can never land on it mid-operation.
        let (child, complex) = if complex_data.id.is_some() {
            let complex = self
                .add_child(parent_complex, complex_data)
                .expect("preconditions were validated");
            let child = self
                .add_child(parent, child_data)
                .expect("preconditions were validated");
            (child, complex)
        } else {
            let child = self
                .add_child(parent, child_data)
                .expect("preconditions were validated");
            let complex = self
                .add_child(parent_complex, complex_data)
                .expect("preconditions were validated");
            (child, complex)
        };
        self.explicit_complex.insert(child, complex);
        self.components.entry(complex).or_default().push(child);
        Ok((child, complex))
    }

    /// Records an existing vertex as a component root of `complex`.
    ///
    /// This is the fine-first construction path: producers that lay down the
    /// finest scale eagerly (generative rewriting, for instance) attach an
    /// already-parented vertex to its complex afterwards, and leave the
    /// coarse edges to [`MtgGraph::complete_coarse_edges`]. Any previous
    /// explicit complex of `vertex` is unrecorded first.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if either vertex is not live, or
    /// [`GraphError::ScaleOutOfRange`] if `complex` is not exactly one scale
    /// coarser than `vertex`.
    pub fn set_complex(
        &mut self,
        vertex: VertexId,
        complex: VertexId,
    ) -> Result<(), GraphError> {
        let own = self
            .scale(vertex)
            .ok_or(GraphError::InvalidVertex(vertex))?;
        let coarse = self
            .scale(complex)
            .ok_or(GraphError::InvalidVertex(complex))?;
        if coarse + 1 != own {
            return Err(GraphError::ScaleOutOfRange {
                vertex,
                scale: own,
                requested: coarse,
            });
        }
        if let Some(previous) = self.explicit_complex.insert(vertex, complex)
            && let Some(roots) = self.components.get_mut(&previous)
        {
            roots.retain(|r| *r != vertex);
        }
        self.components.entry(complex).or_default().push(vertex);
        Ok(())
    }

    /// Applies the label and edge kind of freshly validated `data`.
    fn apply_data(&mut self, vertex: VertexId, data: VertexData) {
        if let Some(label) = data.label {
            self.label.insert(vertex, label);
        }
        if let Some(edge) = data.edge {
            self.edge.insert(vertex, edge);
        }
    }

    // --- destruction ---

    /// Removes a vertex that is both a leaf and componentless.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live,
    /// [`GraphError::RootVertex`] for the root,
    /// [`GraphError::HasChildren`] if it still has children, or
    /// [`GraphError::HasComponents`] if it still decomposes into components
    /// (use [`MtgGraph::remove_tree`] for whole subtrees).
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Result<(), GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        if self
            .components
            .get(&vertex)
            .is_some_and(|roots| !roots.is_empty())
        {
            return Err(GraphError::HasComponents(vertex));
        }
        self.tree.remove_vertex(vertex)?;
        self.forget(vertex);
        Ok(())
    }

    /// Removes the subtree rooted at `vertex`, cascading across scales:
    /// same-scale descendants and, recursively, all of their components.
    ///
    /// Returns the removed ids.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live, or
    /// [`GraphError::RootVertex`] for the root.
    pub fn remove_tree(&mut self, vertex: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        if vertex == self.root() {
            return Err(GraphError::RootVertex);
        }
        let doomed = self.decomposition_closure(vertex);
        let doomed_set: hashbrown::HashSet<VertexId> = doomed.iter().copied().collect();

        // Forest roots of the doomed set: vertices whose parent survives.
        let boundary: Vec<VertexId> = doomed
            .iter()
            .copied()
            .filter(|&v| match self.parent(v) {
                None => true,
                Some(p) => !doomed_set.contains(&p),
            })
            .collect();
        for b in boundary {
            self.tree.detach(b).expect("doomed vertex must be live");
            self.tree
                .remove_tree(b)
                .expect("detached forest root must be removable");
        }
        for &v in &doomed {
            self.forget(v);
        }
        Ok(doomed)
    }

    /// Drops the bookkeeping for a vertex the tree no longer holds.
    fn forget(&mut self, vertex: VertexId) {
        self.scale.remove(&vertex);
        self.edge.remove(&vertex);
        self.label.remove(&vertex);
        self.components.remove(&vertex);
        if let Some(complex) = self.explicit_complex.remove(&vertex)
            && let Some(roots) = self.components.get_mut(&complex)
        {
            roots.retain(|r| *r != vertex);
        }
    }

    /// The decomposition closure of `vertex`: its same-scale subtree plus,
    /// recursively, every component of every vertex in it.
    ///
    /// Discovery order is deterministic: children in list order, recorded
    /// component roots after same-scale children.
    pub(crate) fn decomposition_closure(&self, vertex: VertexId) -> Vec<VertexId> {
        let mut seen: hashbrown::HashSet<VertexId> = hashbrown::HashSet::new();
        let mut out = Vec::new();
        let mut stack = alloc::vec![vertex];
        while let Some(v) = stack.pop() {
            if !seen.insert(v) {
                continue;
            }
            out.push(v);
            let children = self.children(v);
            let roots = self
                .components
                .get(&v)
                .map(|r| r.as_slice())
                .unwrap_or(&[]);
            for &r in roots.iter().rev() {
                stack.push(r);
            }
            for &c in children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    // --- subgraph extraction ---

    /// Copies the multiscale subtree rooted at `vertex` into a fresh graph.
    ///
    /// The closure spans scales: same-scale descendants plus all their
    /// components. `vertex` becomes the new scale-0 root, scales are rebased
    /// by `-scale(vertex)`, ids are renumbered from 0 in ascending old-id
    /// order, and labels, edge kinds, and property values are copied. The
    /// new root keeps `vertex`'s label and property values but, being a
    /// root, carries no edge kind.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live.
    pub fn sub_mtg(&self, vertex: VertexId) -> Result<Self, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let mut out = Self::new();
        let root = out.root();
        out.copy_closure(self, vertex, root)?;
        if let Some(label) = self.label(vertex) {
            out.label.insert(root, String::from(label));
        }
        self.properties()
            .copy_vertex_into(vertex, out.tree.properties_mut(), root);
        Ok(out)
    }

    /// Destructively restricts the graph to the multiscale subtree rooted at
    /// `vertex`, which becomes the new root (keeping its id) at scale 0.
    ///
    /// Returns the removed ids.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live.
    pub fn prune_to(&mut self, vertex: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let base = self.scale(vertex).unwrap_or(0);
        let keep: hashbrown::HashSet<VertexId> =
            self.decomposition_closure(vertex).into_iter().collect();
        let removed = self.tree.retain_vertices(vertex, |v| keep.contains(&v))?;
        for &v in &removed {
            self.forget(v);
        }
        // The survivor set is rebased: the new root is scale 0 again.
        let rebased: BTreeMap<VertexId, u32> =
            self.scale.iter().map(|(&v, &s)| (v, s - base)).collect();
        self.scale = rebased;
        self.edge.remove(&vertex);
        self.explicit_complex.remove(&vertex);
        Ok(removed)
    }

    /// Copies `source`'s decomposition closure of `from` into `self`,
    /// identifying `from` with the existing vertex `onto`. Returns the
    /// old-to-new id map.
    pub(crate) fn copy_closure(
        &mut self,
        source: &Self,
        from: VertexId,
        onto: VertexId,
    ) -> Result<BTreeMap<VertexId, VertexId>, GraphError> {
        let onto_scale = self.scale(onto).ok_or(GraphError::InvalidVertex(onto))?;
        let from_scale = source
            .scale(from)
            .ok_or(GraphError::InvalidVertex(from))?;

        let mut closure = source.decomposition_closure(from);
        closure.sort_unstable();

        let mut remap: BTreeMap<VertexId, VertexId> = BTreeMap::new();
        remap.insert(from, onto);
        for &old in &closure {
            if old == from {
                continue;
            }
            let new = self
                .tree
                .add_detached(None)
                .expect("fresh allocation cannot collide");
            remap.insert(old, new);
        }
        for &old in &closure {
            let new = remap[&old];
            if old != from {
                let old_scale = source.scale(old).expect("closure member must have a scale");
                self.scale.insert(new, onto_scale + (old_scale - from_scale));
                if let Some(kind) = source.edge_kind(old) {
                    self.edge.insert(new, kind);
                }
                if let Some(label) = source.label(old) {
                    self.label.insert(new, String::from(label));
                }
                source
                    .properties()
                    .copy_vertex_into(old, self.tree.properties_mut(), new);
            }
            // Children in list order, so sibling order survives the copy.
            for &c in source.children(old) {
                if let Some(&mapped) = remap.get(&c) {
                    self.tree
                        .set_parent(mapped, new)
                        .expect("copied vertices are live and acyclic");
                }
            }
            if let Some(roots) = source.components.get(&old) {
                let mapped_roots: SmallVec<[VertexId; 2]> =
                    roots.iter().map(|r| remap[r]).collect();
                for &r in &mapped_roots {
                    self.explicit_complex.insert(r, new);
                }
                self.components.entry(new).or_default().extend(mapped_roots);
            }
        }
        Ok(remap)
    }

    // --- validation ---

    /// Checks the multiscale invariants and reports every violation.
    ///
    /// Verified properties: complex links cross exactly one scale, no vertex
    /// has two successor children, and the component records agree with the
    /// derived complex relation in both directions.
    #[must_use]
    pub fn validate(&self) -> Vec<Inconsistency> {
        let mut diags = Vec::new();

        for (&vertex, &complex) in &self.explicit_complex {
            let (Some(s), Some(cs)) = (self.scale(vertex), self.scale(complex)) else {
                continue;
            };
            if cs + 1 != s {
                diags.push(Inconsistency::ScaleMismatch {
                    vertex,
                    scale: s,
                    complex,
                    complex_scale: cs,
                });
            }
            let recorded = self
                .components
                .get(&complex)
                .is_some_and(|roots| roots.contains(&vertex));
            if !recorded {
                diags.push(Inconsistency::StrayComponent { vertex, complex });
            }
        }

        for (&complex, roots) in &self.components {
            for &r in roots {
                if self.explicit_complex.get(&r) != Some(&complex) {
                    diags.push(Inconsistency::StrayComponent {
                        vertex: r,
                        complex,
                    });
                }
            }
        }

        for v in self.vertex_ids() {
            let mut successors = self
                .children(v)
                .iter()
                .copied()
                .filter(|&c| self.edge_kind(c) == Some(EdgeKind::Successor));
            if let (Some(first), Some(second)) = (successors.next(), successors.next()) {
                diags.push(Inconsistency::DuplicateSuccessor {
                    parent: v,
                    first,
                    second,
                });
            }
        }

        diags
    }
}

/// Lazy iterator over the components of one complex.
///
/// Returned by [`MtgGraph::components`].
#[derive(Debug)]
pub struct Components<'a> {
    graph: &'a MtgGraph,
    complex: VertexId,
    stack: Vec<VertexId>,
}

impl Iterator for Components<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let vertex = self.stack.pop()?;
        // Expand in branch-before-successor order, pruning children that
        // resolve to a different complex.
        let mut successor = None;
        let mut branches: SmallVec<[VertexId; 4]> = SmallVec::new();
        for &c in self.graph.children(vertex) {
            if self.graph.complex(c) != Some(self.complex) {
                continue;
            }
            if successor.is_none() && self.graph.edge_kind(c) == Some(EdgeKind::Successor) {
                successor = Some(c);
            } else {
                branches.push(c);
            }
        }
        if let Some(s) = successor {
            self.stack.push(s);
        }
        for &b in branches.iter().rev() {
            self.stack.push(b);
        }
        Some(vertex)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn plant_with_two_axes() -> (MtgGraph, [VertexId; 7]) {
        // root / P1 / I1 < I2 < I3, with I2 + I4 < I5 as a lateral axis.
        let mut g = MtgGraph::new();
        let p1 = g
            .add_component(
                g.root(),
                VertexData {
                    label: Some("P1".into()),
                    edge: Some(EdgeKind::Decomposition),
                    ..VertexData::new()
                },
            )
            .unwrap();
        let i1 = g
            .add_component(
                p1,
                VertexData {
                    label: Some("I1".into()),
                    edge: Some(EdgeKind::Decomposition),
                    ..VertexData::new()
                },
            )
            .unwrap();
        let succ = |label: &str| VertexData {
            label: Some(label.into()),
            edge: Some(EdgeKind::Successor),
            ..VertexData::new()
        };
        let branch = |label: &str| VertexData {
            label: Some(label.into()),
            edge: Some(EdgeKind::Branch),
            ..VertexData::new()
        };
        let i2 = g.add_child(i1, succ("I2")).unwrap();
        let i3 = g.add_child(i2, succ("I3")).unwrap();
        let i4 = g.add_child(i2, branch("I4")).unwrap();
        let i5 = g.add_child(i4, succ("I5")).unwrap();
        let root = g.root();
        (g, [root, p1, i1, i2, i3, i4, i5])
    }

    #[test]
    fn scales_and_complexes_line_up() {
        let (g, [root, p1, i1, i2, i3, i4, i5]) = plant_with_two_axes();
        assert_eq!(g.scale(root), Some(0));
        assert_eq!(g.scale(p1), Some(1));
        for v in [i1, i2, i3, i4, i5] {
            assert_eq!(g.scale(v), Some(2));
            assert_eq!(g.complex(v), Some(p1), "complex must derive through parents");
            // The defining multiscale invariant.
            assert_eq!(g.scale(g.complex(v).unwrap()), Some(g.scale(v).unwrap() - 1));
        }
        assert_eq!(g.complex(p1), Some(root));
        assert_eq!(g.complex(root), None);
        assert_eq!(g.max_scale(), 2);
        assert_eq!(g.scales().collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn complex_at_scale_rejects_out_of_range() {
        let (g, [root, p1, _, i2, ..]) = plant_with_two_axes();
        assert_eq!(g.complex_at_scale(i2, 2), Ok(i2));
        assert_eq!(g.complex_at_scale(i2, 1), Ok(p1));
        assert_eq!(g.complex_at_scale(i2, 0), Ok(root));
        // Finer than the vertex itself: a hard error, never clamped.
        assert_eq!(
            g.complex_at_scale(p1, 2),
            Err(GraphError::ScaleOutOfRange {
                vertex: p1,
                scale: 1,
                requested: 2,
            })
        );
    }

    #[test]
    fn components_follow_branch_before_successor() {
        let (g, [_, p1, i1, i2, i3, i4, i5]) = plant_with_two_axes();
        let components: Vec<_> = g.components(p1).collect();
        // Branch axis (I4, I5) is exhausted before the successor I3.
        assert_eq!(components, [i1, i2, i4, i5, i3]);
        assert_eq!(g.nb_components(p1), 5);
        assert_eq!(g.component_roots(p1).collect::<Vec<_>>(), [i1]);
    }

    #[test]
    fn components_stop_at_sibling_boundaries() {
        let (mut g, [_, p1, _, _, i3, ..]) = plant_with_two_axes();
        // A second plant decomposing from the end of the first one's axis:
        // its internodes are structurally adjacent to P1's.
        let (i6, p2) = g
            .add_child_and_complex(
                i3,
                VertexData {
                    label: Some("I6".into()),
                    edge: Some(EdgeKind::Successor),
                    ..VertexData::new()
                },
                VertexData {
                    label: Some("P2".into()),
                    edge: Some(EdgeKind::Successor),
                    ..VertexData::new()
                },
            )
            .unwrap();
        assert_eq!(g.parent(p2), Some(p1));

        let p1_components: Vec<_> = g.components(p1).collect();
        assert!(
            !p1_components.contains(&i6),
            "traversal must stop where the complex diverges"
        );
        assert_eq!(g.components(p2).collect::<Vec<_>>(), [i6]);
        assert_eq!(
            g.component_roots(p2).collect::<Vec<_>>(),
            [i6],
            "a root whose parent resolves elsewhere is still a root"
        );
        assert!(g.validate().is_empty());
    }

    #[test]
    fn add_child_and_complex_is_atomic() {
        let (mut g, [_, p1, _, _, i3, ..]) = plant_with_two_axes();
        let (i6, p2) = g
            .add_child_and_complex(
                i3,
                VertexData {
                    label: Some("I6".into()),
                    edge: Some(EdgeKind::Branch),
                    ..VertexData::new()
                },
                VertexData {
                    label: Some("P2".into()),
                    edge: Some(EdgeKind::Branch),
                    ..VertexData::new()
                },
            )
            .unwrap();

        assert_eq!(g.parent(i6), Some(i3));
        assert_eq!(g.parent(p2), Some(p1));
        assert_eq!(g.complex(i6), Some(p2));
        assert_eq!(g.components(p2).collect::<Vec<_>>(), [i6]);
        assert!(g.validate().is_empty());

        // A failing call must leave no trace of either half.
        let before = g.len();
        let err = g.add_child_and_complex(
            g.root(),
            VertexData::new(),
            VertexData::new(),
        );
        assert_eq!(err, Err(GraphError::InvalidVertex(g.root())));
        assert_eq!(g.len(), before);
    }

    #[test]
    fn duplicate_successor_is_rejected() {
        let (mut g, [_, _, _, i2, ..]) = plant_with_two_axes();
        // I2 already continues into I3.
        let err = g.add_child(
            i2,
            VertexData {
                edge: Some(EdgeKind::Successor),
                ..VertexData::new()
            },
        );
        assert!(matches!(err, Err(GraphError::DuplicateSuccessor { .. })));
    }

    #[test]
    fn remove_vertex_requires_componentless_leaf() {
        let (mut g, [_, p1, _, _, i3, _, i5]) = plant_with_two_axes();
        assert_eq!(g.remove_vertex(p1), Err(GraphError::HasComponents(p1)));
        g.remove_vertex(i5).unwrap();
        assert!(!g.contains(i5));
        assert_eq!(g.edge_kind(i5), None);
        g.remove_vertex(i3).unwrap();
        assert!(g.validate().is_empty());
    }

    #[test]
    fn remove_tree_cascades_across_scales() {
        let (mut g, [root, p1, ..]) = plant_with_two_axes();
        let removed = g.remove_tree(p1).unwrap();
        assert_eq!(removed.len(), 6, "plant and all five internodes");
        assert_eq!(g.len(), 1);
        assert_eq!(g.components(root).count(), 0);
        assert!(g.validate().is_empty());
    }

    #[test]
    fn sub_mtg_rebases_scales_and_ids() {
        let (g, [_, p1, ..]) = plant_with_two_axes();
        let sub = g.sub_mtg(p1).unwrap();
        assert_eq!(sub.len(), 6);
        assert_eq!(sub.scale(sub.root()), Some(0));
        assert_eq!(sub.max_scale(), 1);
        assert_eq!(sub.components(sub.root()).count(), 5);
        assert!(sub.validate().is_empty());
        // The original graph is untouched.
        assert_eq!(g.len(), 7);
    }

    #[test]
    fn prune_to_keeps_ids() {
        let (mut g, [_, p1, i1, ..]) = plant_with_two_axes();
        let removed = g.prune_to(p1).unwrap();
        assert_eq!(removed.len(), 1, "only the old root goes away");
        assert_eq!(g.root(), p1);
        assert_eq!(g.scale(p1), Some(0));
        assert_eq!(g.scale(i1), Some(1));
        assert_eq!(g.complex(i1), Some(p1));
        assert!(g.validate().is_empty());
    }
}
