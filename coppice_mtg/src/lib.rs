// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coppice MTG: a Multiscale Tree Graph engine.
//!
//! A Multiscale Tree Graph (MTG) represents a plant's topology at several
//! nested levels of abstraction at once (plant, axis, internode, and so on)
//! as one rooted tree replicated per scale and stitched together by
//! complex/component relations. This crate provides the graph itself plus
//! the algorithms that build, query, and repair it:
//!
//! - [`MtgGraph`]: scales, complexes, components, labels, and typed edges
//!   ([`EdgeKind`]) over the rooted tree of `coppice_tree`.
//! - Traversals ordered the way a botanist reads a plant:
//!   branch-before-successor [`MtgGraph::pre_order`], bottom-up
//!   [`MtgGraph::post_order`], pruning/filtered variants, and the
//!   cross-scale interleaving [`MtgGraph::iter_cross_scale`] that the text
//!   serializer writes in.
//! - [`MtgGraph::complete_coarse_edges`]: derives the coarse-scale edges a
//!   fine-first producer (file reader, generative rewriter) leaves missing.
//! - Topological queries: restricted ancestor walks ([`AncestorWalk`]),
//!   [`MtgGraph::order`], [`MtgGraph::rank`], [`MtgGraph::height`],
//!   [`MtgGraph::axis`], [`MtgGraph::trunk`], [`MtgGraph::path`], and
//!   structural union via [`MtgGraph::merge`].
//! - [`Session`]: an explicit owner for the graphs a host works on,
//!   replacing any notion of a process-wide "current graph".
//!
//! ## Example
//!
//! ```rust
//! use coppice_mtg::{EdgeKind, MtgGraph, VertexData};
//!
//! // root / P1 / I1 < I2 < I3, with a lateral I4 on I2.
//! let mut g = MtgGraph::new();
//! let p1 = g.add_component(g.root(), VertexData::new()).unwrap();
//! let i1 = g.add_component(p1, VertexData::new()).unwrap();
//! let succ = || VertexData { edge: Some(EdgeKind::Successor), ..VertexData::new() };
//! let i2 = g.add_child(i1, succ()).unwrap();
//! let i3 = g.add_child(i2, succ()).unwrap();
//! let i4 = g
//!     .add_child(i2, VertexData { edge: Some(EdgeKind::Branch), ..VertexData::new() })
//!     .unwrap();
//!
//! // The lateral axis is finished before the main axis continues.
//! let visit: Vec<_> = g.pre_order(i1).collect();
//! assert_eq!(visit, [i1, i2, i4, i3]);
//!
//! // Branching order and rank read the edge kinds.
//! assert_eq!(g.order(i4), Some(1));
//! assert_eq!(g.rank(i3), Some(2));
//! ```
//!
//! ## Consistency model
//!
//! Structural mutations are fail-fast: every precondition is checked before
//! any state changes, and compound operations
//! ([`MtgGraph::add_child_and_complex`]) commit entirely or not at all.
//! Diagnostics that are not errors (ambiguous inputs the completion pass
//! cannot repair, duplicate successors found by [`MtgGraph::validate`]) are
//! returned as [`Inconsistency`] values and never printed.
//!
//! Traversal iterators borrow the graph immutably for their whole lifetime,
//! so mutating the graph mid-walk is rejected at compile time.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod graph;
mod merge;
mod queries;
mod repair;
mod session;
mod traversal;
mod types;

pub use coppice_tree::{Date, GraphError, PropertyMap, PropertyStore, Value, VertexId};

pub use graph::{Components, MtgGraph};
pub use queries::{AncestorWalk, Axis, EdgeMask, MtgAncestors, Restriction};
pub use session::Session;
pub use traversal::{CrossScale, PreOrder, PreOrderFiltered};
pub use types::{EdgeKind, Inconsistency, VertexData};
