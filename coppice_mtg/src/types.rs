// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types shared across the multiscale graph: edge kinds, new-vertex
//! parameters, and structural diagnostics.

use alloc::string::String;

use thiserror::Error;

use coppice_tree::VertexId;

/// Kind of the edge linking a vertex to its parent.
///
/// Plant topology distinguishes the continuation of an axis from a side
/// branch, and both from the scale-crossing decomposition relation:
///
/// - [`EdgeKind::Successor`] (`<`): the next entity along the same axis. At
///   most one child of any vertex may carry this kind.
/// - [`EdgeKind::Branch`] (`+`): a lateral branch starting a new axis.
/// - [`EdgeKind::Decomposition`] (`/`): the first component of a
///   decomposition; carried by component roots rather than same-scale
///   children.
///
/// A vertex without a recorded kind has an undefined edge type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `<`: continues the parent's axis.
    Successor,
    /// `+`: starts a lateral axis.
    Branch,
    /// `/`: opens a finer-scale decomposition.
    Decomposition,
}

impl EdgeKind {
    /// The character the text format uses for this kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Successor => '<',
            Self::Branch => '+',
            Self::Decomposition => '/',
        }
    }

    /// Parses a text-format relation character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Successor),
            '+' => Some(Self::Branch),
            '/' => Some(Self::Decomposition),
            _ => None,
        }
    }
}

impl core::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Parameters for a vertex about to be created.
///
/// All fields default to "unset", so call sites only spell out what they
/// need:
///
/// ```rust
/// use coppice_mtg::{EdgeKind, VertexData};
///
/// let data = VertexData {
///     label: Some("I1".into()),
///     edge: Some(EdgeKind::Successor),
///     ..VertexData::default()
/// };
/// # let _ = data;
/// ```
#[derive(Clone, Debug, Default)]
pub struct VertexData {
    /// Explicit identifier to use instead of a fresh allocation.
    pub id: Option<VertexId>,
    /// Label, conventionally a class symbol followed by an index (`I12`).
    pub label: Option<String>,
    /// Kind of the edge attaching the new vertex.
    pub edge: Option<EdgeKind>,
}

impl VertexData {
    /// Parameters with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A structural defect found in (or left unresolved by) a graph.
///
/// These are diagnostics, not errors: the completion pass and
/// [`MtgGraph::validate`](crate::MtgGraph::validate) report them as values
/// and leave the caller to decide what is fatal. Nothing is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Inconsistency {
    /// A coarse-scale root has no components, so no parent can be derived.
    #[error("vertex {vertex} has no components to derive a parent from")]
    MissingComponents {
        /// The parentless coarse vertex.
        vertex: VertexId,
    },
    /// A coarse-scale root's component chain dead-ends before a parent can
    /// be derived.
    #[error("no coarse parent is derivable for vertex {vertex}")]
    UnderivableParent {
        /// The parentless coarse vertex.
        vertex: VertexId,
    },
    /// A vertex has more than one successor child.
    #[error("vertex {parent} has successor children {first} and {second}")]
    DuplicateSuccessor {
        /// The over-connected parent.
        parent: VertexId,
        /// Its first successor child.
        first: VertexId,
        /// The conflicting second successor child.
        second: VertexId,
    },
    /// A complex link crosses more than one scale.
    #[error("vertex {vertex} at scale {scale} has complex {complex} at scale {complex_scale}")]
    ScaleMismatch {
        /// The finer vertex.
        vertex: VertexId,
        /// Its scale.
        scale: u32,
        /// Its recorded complex.
        complex: VertexId,
        /// The complex's scale.
        complex_scale: u32,
    },
    /// A recorded component root no longer resolves to its complex.
    #[error("vertex {vertex} is recorded as a component of {complex} but resolves elsewhere")]
    StrayComponent {
        /// The recorded component root.
        vertex: VertexId,
        /// The complex it is recorded under.
        complex: VertexId,
    },
}
