// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertex identifiers.

/// Identifier for a vertex in a [`Tree`](crate::Tree).
///
/// Identifiers are opaque integer handles. A tree allocates them
/// monotonically and never reuses one while it is live, so a stale
/// `VertexId` can be detected with [`Tree::contains`](crate::Tree::contains)
/// rather than silently aliasing a newer vertex.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexId(u64);

impl VertexId {
    /// Creates an identifier from its raw integer value.
    ///
    /// This is mainly useful for callers that manage their own numbering,
    /// such as file readers passing explicit ids to
    /// [`Tree::add_child_with_id`](crate::Tree::add_child_with_id).
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value of this identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for VertexId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
