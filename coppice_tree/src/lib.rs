// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coppice Tree: a rooted tree store with ordered children and per-vertex
//! property maps.
//!
//! Coppice Tree is the structural foundation of the Coppice crates. It owns
//! vertex identity, the parent/children relation, and a generic property
//! store, and exposes the structural edits and plain depth-first traversals
//! that higher layers (such as the multiscale graph in `coppice_mtg`) build
//! on.
//!
//! - Vertices are addressed by [`VertexId`], an opaque integer handle that is
//!   allocated monotonically and never reused while live. Callers may also
//!   supply explicit unused identifiers, which file readers use to preserve
//!   numbering.
//! - Children are kept in insertion order. The order is significant: higher
//!   layers use it as the tie-break pool when distinguishing plant branches
//!   from axis successors.
//! - Properties are sparse: one map per declared name, and a vertex need not
//!   appear in every map. Values use the closed [`Value`] variant type.
//!
//! Structural mutations validate their arguments and fail fast with a
//! [`GraphError`] before touching any state, so a failed call never leaves
//! the tree half-edited.
//!
//! ## Example
//!
//! ```rust
//! use coppice_tree::Tree;
//!
//! let mut tree = Tree::new();
//! let a = tree.add_child(tree.root()).unwrap();
//! let b = tree.add_child(a).unwrap();
//! let c = tree.add_child(a).unwrap();
//!
//! assert_eq!(tree.children(a), [b, c]);
//! assert_eq!(tree.parent(b), Some(a));
//!
//! // Plain pre-order over the whole tree.
//! let order: Vec<_> = tree.descendants(tree.root()).collect();
//! assert_eq!(order, [tree.root(), a, b, c]);
//! ```
//!
//! Traversals are lazy iterators borrowing the tree, so the borrow checker
//! statically rules out mutating the tree mid-walk.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod iter;
mod property;
mod tree;
mod types;

pub use error::GraphError;
pub use iter::{Ancestors, Descendants, PostOrder};
pub use property::{Date, PropertyMap, PropertyStore, Value};
pub use tree::Tree;
pub use types::VertexId;
