// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, edits, accessors.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::property::PropertyStore;
use crate::{GraphError, VertexId};

/// Per-vertex structural links.
///
/// Children are kept in insertion order; plant vertices rarely carry more
/// than a few, hence the inline capacity.
#[derive(Clone, Debug, Default)]
struct Links {
    parent: Option<VertexId>,
    children: SmallVec<[VertexId; 4]>,
}

/// A rooted tree with ordered children and a per-vertex property store.
///
/// The tree has exactly one primary root, created by [`Tree::new`]. It can
/// additionally hold *floating* vertices (parentless non-root vertices
/// created with [`Tree::add_detached`]), which staged construction relies
/// on: a file reader materializes coarse-scale forests first and a
/// completion pass derives their missing parent edges later via
/// [`Tree::set_parent`].
///
/// Every vertex is owned by the tree: parent and child links are plain
/// [`VertexId`] handles resolved through the tree's own maps, never
/// references, so structural edits are O(1) map updates with no dangling
/// pointers to manage.
///
/// Structural mutations validate their arguments first and return a
/// [`GraphError`] without touching state when a precondition fails.
///
/// ## Example
///
/// ```rust
/// use coppice_tree::{GraphError, Tree};
///
/// let mut tree = Tree::new();
/// let a = tree.add_child(tree.root()).unwrap();
/// let b = tree.add_child(a).unwrap();
///
/// // A vertex with children cannot be removed in place...
/// assert_eq!(tree.remove_vertex(a), Err(GraphError::HasChildren(a)));
/// // ...but the whole subtree can.
/// let removed = tree.remove_tree(a).unwrap();
/// assert_eq!(removed, vec![b, a]);
/// ```
#[derive(Clone, Debug)]
pub struct Tree {
    root: VertexId,
    next: u64,
    links: BTreeMap<VertexId, Links>,
    properties: PropertyStore,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree containing only its root vertex, with id `0`.
    #[must_use]
    pub fn new() -> Self {
        let root = VertexId::new(0);
        let mut links = BTreeMap::new();
        links.insert(root, Links::default());
        Self {
            root,
            next: 1,
            links,
            properties: PropertyStore::new(),
        }
    }

    /// The root vertex.
    #[must_use]
    pub fn root(&self) -> VertexId {
        self.root
    }

    /// Number of live vertices, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always `false`: a tree never drops below one vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `vertex` is live in this tree.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.links.contains_key(&vertex)
    }

    /// Returns the parent of `vertex`, or `None` for the root or a stale id.
    #[must_use]
    pub fn parent(&self, vertex: VertexId) -> Option<VertexId> {
        self.links.get(&vertex).and_then(|l| l.parent)
    }

    /// Returns the children of `vertex` in insertion order.
    ///
    /// Stale ids yield an empty slice.
    #[must_use]
    pub fn children(&self, vertex: VertexId) -> &[VertexId] {
        self.links
            .get(&vertex)
            .map(|l| l.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of children of `vertex`.
    #[must_use]
    pub fn nb_children(&self, vertex: VertexId) -> usize {
        self.children(vertex).len()
    }

    /// Returns `true` if `vertex` is live and has no children.
    #[must_use]
    pub fn is_leaf(&self, vertex: VertexId) -> bool {
        self.links
            .get(&vertex)
            .is_some_and(|l| l.children.is_empty())
    }

    /// Iterates over the other children of `vertex`'s parent, in order.
    pub fn siblings(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        let siblings = match self.parent(vertex) {
            Some(p) => self.children(p),
            None => &[],
        };
        siblings.iter().copied().filter(move |&s| s != vertex)
    }

    /// Iterates over all live vertex ids in ascending id order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.links.keys().copied()
    }

    /// Shared access to the property store.
    #[must_use]
    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Mutable access to the property store.
    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    // --- structural edits ---

    /// Appends a new child to `parent` and returns its id.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `parent` is not live.
    pub fn add_child(&mut self, parent: VertexId) -> Result<VertexId, GraphError> {
        self.insert_child_at(parent, None, usize::MAX)
    }

    /// Appends a new child with an explicitly chosen id.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `parent` is not live, or
    /// [`GraphError::IdInUse`] if `id` already names a live vertex.
    pub fn add_child_with_id(
        &mut self,
        parent: VertexId,
        id: VertexId,
    ) -> Result<VertexId, GraphError> {
        self.insert_child_at(parent, Some(id), usize::MAX)
    }

    /// Creates a floating vertex: live, parentless, and not the root.
    ///
    /// Floating vertices are the staging ground for coarse-scale forests
    /// whose parent edges are derived later with [`Tree::set_parent`].
    ///
    /// # Errors
    ///
    /// [`GraphError::IdInUse`] if the explicit `id` already names a live
    /// vertex.
    pub fn add_detached(&mut self, id: Option<VertexId>) -> Result<VertexId, GraphError> {
        let vertex = self.alloc(id)?;
        self.links.insert(vertex, Links::default());
        Ok(vertex)
    }

    /// Detaches `vertex` from its parent, turning it into a floating vertex.
    ///
    /// Detaching the root or an already-floating vertex is a no-op.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live.
    pub fn detach(&mut self, vertex: VertexId) -> Result<(), GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        self.unlink(vertex);
        self.links
            .get_mut(&vertex)
            .expect("vertex link must be live")
            .parent = None;
        Ok(())
    }

    /// Attaches `child` beneath `parent`, appended to its children list.
    ///
    /// Any previous parent link of `child` is dropped first.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if either vertex is not live, or if
    /// `parent` lies inside `child`'s own subtree (which would close a
    /// cycle); [`GraphError::RootVertex`] if `child` is the root.
    pub fn set_parent(&mut self, child: VertexId, parent: VertexId) -> Result<(), GraphError> {
        if !self.contains(child) {
            return Err(GraphError::InvalidVertex(child));
        }
        if !self.contains(parent) {
            return Err(GraphError::InvalidVertex(parent));
        }
        if child == self.root {
            return Err(GraphError::RootVertex);
        }
        // Attaching below the child's own subtree would close a cycle.
        let mut cursor = Some(parent);
        while let Some(v) = cursor {
            if v == child {
                return Err(GraphError::InvalidVertex(parent));
            }
            cursor = self.parent(v);
        }
        self.unlink(child);
        self.links
            .get_mut(&child)
            .expect("child link must be live")
            .parent = Some(parent);
        self.links
            .get_mut(&parent)
            .expect("parent link must be live")
            .children
            .push(child);
        Ok(())
    }

    /// Inserts a new vertex immediately before `vertex` in its parent's
    /// children list and returns its id.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live,
    /// [`GraphError::RootVertex`] if `vertex` is the root (the root has no
    /// siblings), or [`GraphError::IdInUse`] for a taken explicit id.
    pub fn insert_sibling(
        &mut self,
        vertex: VertexId,
        id: Option<VertexId>,
    ) -> Result<VertexId, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let parent = self.parent(vertex).ok_or(GraphError::RootVertex)?;
        let position = self
            .children(parent)
            .iter()
            .position(|&c| c == vertex)
            .unwrap_or(usize::MAX);
        self.insert_child_at(parent, id, position)
    }

    /// Splices a new vertex between `vertex` and its old parent.
    ///
    /// The new vertex inherits `vertex`'s position among its old siblings
    /// and adopts `vertex` as its only child. When `vertex` is the root, the
    /// new vertex becomes the root instead.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live, or
    /// [`GraphError::IdInUse`] for a taken explicit id.
    pub fn insert_parent(
        &mut self,
        vertex: VertexId,
        id: Option<VertexId>,
    ) -> Result<VertexId, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let new = self.alloc(id)?;
        let old_parent = self.parent(vertex);
        match old_parent {
            Some(p) => {
                let parent_links = self.links.get_mut(&p).expect("parent link must be live");
                let position = parent_links
                    .children
                    .iter()
                    .position(|&c| c == vertex)
                    .expect("child must appear in its parent's list");
                parent_links.children[position] = new;
            }
            None => self.root = new,
        }
        let mut links = Links {
            parent: old_parent,
            children: SmallVec::new(),
        };
        links.children.push(vertex);
        self.links.insert(new, links);
        self.links
            .get_mut(&vertex)
            .expect("vertex link must be live")
            .parent = Some(new);
        Ok(new)
    }

    /// Removes a leaf vertex.
    ///
    /// The vertex is unlinked from its parent and purged from every
    /// property map.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live,
    /// [`GraphError::RootVertex`] for the root, or
    /// [`GraphError::HasChildren`] if the vertex still has children (use
    /// [`Tree::remove_tree`] for whole subtrees).
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Result<(), GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        if vertex == self.root {
            return Err(GraphError::RootVertex);
        }
        if !self.children(vertex).is_empty() {
            return Err(GraphError::HasChildren(vertex));
        }
        self.unlink(vertex);
        self.links.remove(&vertex);
        self.properties.purge(vertex);
        Ok(())
    }

    /// Removes the whole subtree rooted at `vertex`.
    ///
    /// Returns the removed ids, children before parents, so callers layering
    /// extra per-vertex state on top of the tree can purge it.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live, or
    /// [`GraphError::RootVertex`] for the root.
    pub fn remove_tree(&mut self, vertex: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        if vertex == self.root {
            return Err(GraphError::RootVertex);
        }
        let removed: Vec<VertexId> = self.post_order(vertex).collect();
        self.unlink(vertex);
        for &v in &removed {
            self.links.remove(&v);
            self.properties.purge(v);
        }
        Ok(removed)
    }

    /// Copies the subtree rooted at `vertex` into a fresh tree.
    ///
    /// Vertices are renumbered from `0` (`vertex` becomes the new root) in
    /// pre-order; property values are copied. The returned map translates
    /// old ids to new ones so callers can carry over their own per-vertex
    /// state.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live.
    pub fn extract(
        &self,
        vertex: VertexId,
    ) -> Result<(Self, BTreeMap<VertexId, VertexId>), GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let mut out = Self::new();
        let mut remap = BTreeMap::new();
        for old in self.descendants(vertex) {
            let new = if old == vertex {
                out.root()
            } else {
                let parent = self.parent(old).expect("descendant must have a parent");
                let mapped = remap[&parent];
                out.add_child(mapped).expect("mapped parent must be live")
            };
            remap.insert(old, new);
            self.properties.copy_vertex_into(old, &mut out.properties, new);
        }
        Ok((out, remap))
    }

    /// Destructively restricts the tree to the subtree rooted at `vertex`.
    ///
    /// Every vertex outside the subtree (floating forests included) is
    /// deleted and purged from the property maps, and `vertex` becomes the
    /// root, keeping its id. Returns the removed ids.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `vertex` is not live.
    pub fn retain_subtree(&mut self, vertex: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains(vertex) {
            return Err(GraphError::InvalidVertex(vertex));
        }
        let keep: hashbrown::HashSet<VertexId> = self.descendants(vertex).collect();
        self.retain_vertices(vertex, |v| keep.contains(&v))
    }

    /// Destructively keeps only the vertices accepted by `keep`, re-rooting
    /// the tree at `new_root` (which is always kept).
    ///
    /// Surviving vertices whose parent is deleted become floating; deleted
    /// ids are purged from the property maps and returned. This is the
    /// general form behind [`Tree::retain_subtree`]; multiscale layers use
    /// it with closures that span decomposition boundaries.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `new_root` is not live.
    pub fn retain_vertices(
        &mut self,
        new_root: VertexId,
        keep: impl Fn(VertexId) -> bool,
    ) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains(new_root) {
            return Err(GraphError::InvalidVertex(new_root));
        }
        let removed: Vec<VertexId> = self
            .links
            .keys()
            .copied()
            .filter(|&v| v != new_root && !keep(v))
            .collect();
        let removed_set: hashbrown::HashSet<VertexId> = removed.iter().copied().collect();
        for &v in &removed {
            self.links.remove(&v);
            self.properties.purge(v);
        }
        // Survivors may reference deleted vertices; sever those links.
        for links in self.links.values_mut() {
            if links.parent.is_some_and(|p| removed_set.contains(&p)) {
                links.parent = None;
            }
            links.children.retain(|c| !removed_set.contains(c));
        }
        self.unlink(new_root);
        self.links
            .get_mut(&new_root)
            .expect("new root must be live")
            .parent = None;
        self.root = new_root;
        Ok(removed)
    }

    // --- internals ---

    /// Reserves an id: the supplied one if free, else the next monotonic id.
    fn alloc(&mut self, id: Option<VertexId>) -> Result<VertexId, GraphError> {
        match id {
            Some(id) => {
                if self.contains(id) {
                    return Err(GraphError::IdInUse(id));
                }
                // Keep the monotonic counter ahead of explicit ids.
                self.next = self.next.max(id.raw() + 1);
                Ok(id)
            }
            None => {
                let id = VertexId::new(self.next);
                self.next += 1;
                Ok(id)
            }
        }
    }

    /// Creates a vertex under `parent` at `position` (clamped to the end).
    fn insert_child_at(
        &mut self,
        parent: VertexId,
        id: Option<VertexId>,
        position: usize,
    ) -> Result<VertexId, GraphError> {
        if !self.contains(parent) {
            return Err(GraphError::InvalidVertex(parent));
        }
        let child = self.alloc(id)?;
        self.links.insert(
            child,
            Links {
                parent: Some(parent),
                children: SmallVec::new(),
            },
        );
        let children = &mut self
            .links
            .get_mut(&parent)
            .expect("parent link must be live")
            .children;
        let position = position.min(children.len());
        children.insert(position, child);
        Ok(child)
    }

    /// Detaches `vertex` from its parent's children list.
    fn unlink(&mut self, vertex: VertexId) {
        if let Some(parent) = self.parent(vertex) {
            let parent_links = self.links.get_mut(&parent).expect("parent link must be live");
            parent_links.children.retain(|&mut c| c != vertex);
        }
    }
}
