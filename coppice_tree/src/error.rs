// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural error type shared by the Coppice crates.

use thiserror::Error;

use crate::VertexId;

/// Error returned by structural mutations and scale-indexed queries.
///
/// Mutations validate every precondition before touching state, so a
/// returned error guarantees the graph is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The referenced vertex is not part of the graph.
    #[error("vertex {0} is not in the graph")]
    InvalidVertex(VertexId),
    /// An explicitly supplied identifier is already in use.
    #[error("vertex id {0} is already in use")]
    IdInUse(VertexId),
    /// The vertex still has children; remove the subtree instead.
    #[error("vertex {0} still has children")]
    HasChildren(VertexId),
    /// The vertex still has finer-scale components.
    #[error("vertex {0} still has components")]
    HasComponents(VertexId),
    /// The operation would remove or displace the root vertex.
    #[error("operation is not valid for the root vertex")]
    RootVertex,
    /// The parent already has a successor child.
    #[error("vertex {parent} already has successor {existing}")]
    DuplicateSuccessor {
        /// Vertex that would end up with two successor children.
        parent: VertexId,
        /// Its existing successor child.
        existing: VertexId,
    },
    /// A scale argument fell outside the valid `0..=scale(vertex)` range.
    #[error("scale {requested} is out of range for vertex {vertex} at scale {scale}")]
    ScaleOutOfRange {
        /// Vertex the query was issued for.
        vertex: VertexId,
        /// The vertex's own scale.
        scale: u32,
        /// The requested target scale.
        requested: u32,
    },
    /// The claimed ancestor is not on the vertex's parent chain.
    #[error("vertex {ancestor} is not an ancestor of {vertex}")]
    NotAnAncestor {
        /// The vertex claimed to be an ancestor.
        ancestor: VertexId,
        /// The vertex whose parent chain was walked.
        vertex: VertexId,
    },
}
