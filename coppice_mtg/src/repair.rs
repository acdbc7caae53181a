// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coarse-edge completion.
//!
//! Parsed files and generated structures often spell out only the finest
//! scale plus component membership, leaving every coarser scale a
//! disconnected forest in which exactly one edge per forest root is missing.
//! The completion pass derives those edges from the finer structure: if a
//! parentless coarse vertex's first component has a parent, the coarse
//! vertex's parent must be that parent's complex.

use alloc::vec::Vec;

use coppice_tree::VertexId;

use crate::graph::MtgGraph;
use crate::types::Inconsistency;

impl MtgGraph {
    /// Derives the missing coarse-scale edges from finer-scale structure.
    ///
    /// Scales are processed strictly coarsening, from `max_scale − 1` down
    /// to 1; the finest scale is always fully explicit and serves as the
    /// base case. For each parentless vertex `r` at the current scale with
    /// first recorded component root `c`:
    ///
    /// - if `c` has a parent `p`, then `parent(r) := complex(p)` and `r`
    ///   inherits `c`'s edge kind;
    /// - if `c` is itself parentless, `r` is a genuine root at its scale and
    ///   is left alone;
    /// - if `r` has no components, or the derivation dead-ends, the input is
    ///   genuinely ambiguous and a diagnostic is reported instead.
    ///
    /// Running the pass on an already-complete graph derives nothing, so it
    /// is idempotent. Diagnostics are returned, never printed.
    pub fn complete_coarse_edges(&mut self) -> Vec<Inconsistency> {
        let mut diags = Vec::new();
        let max = self.max_scale();
        if max < 2 {
            return diags;
        }
        for scale in (1..max).rev() {
            let roots: Vec<VertexId> = self.roots_at_scale(scale).collect();
            for r in roots {
                let Some(&c) = self.components.get(&r).and_then(|roots| roots.first()) else {
                    diags.push(Inconsistency::MissingComponents { vertex: r });
                    continue;
                };
                let Some(p) = self.parent(c) else {
                    // `c` starts its own fine forest: `r` really is a root.
                    continue;
                };
                match self.complex(p) {
                    Some(cx) if cx != r && self.scale(cx) == Some(scale) => {
                        if self.tree.set_parent(r, cx).is_err() {
                            diags.push(Inconsistency::UnderivableParent { vertex: r });
                            continue;
                        }
                        if let Some(kind) = self.edge_kind(c)
                            && self.set_edge_kind(r, kind).is_err()
                        {
                            diags.push(Inconsistency::UnderivableParent { vertex: r });
                        }
                    }
                    _ => diags.push(Inconsistency::UnderivableParent { vertex: r }),
                }
            }
        }
        diags
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
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

    /// Fine scale fully coded, coarse scale left as a forest: three axes
    /// (A1: I1<I2, A2 branching at I1: I3<I4, A3 branching at I4: I5),
    /// every A parentless.
    fn sparse_axes() -> (MtgGraph, [VertexId; 3], [VertexId; 5]) {
        let mut g = MtgGraph::new();
        let plant = g.add_component(g.root(), VertexData::new()).unwrap();
        let a1 = g.add_component(plant, VertexData::new()).unwrap();
        let a2 = g.add_component(plant, VertexData::new()).unwrap();
        let a3 = g.add_component(plant, VertexData::new()).unwrap();

        let i1 = g.add_component(a1, VertexData::new()).unwrap();
        let i2 = g.add_child(i1, succ()).unwrap();

        // A2's first internode branches off I1, A3's off I4; the axes
        // themselves stay unconnected, as a fine-first producer leaves them.
        let i3 = g.add_child(i1, branch()).unwrap();
        g.set_complex(i3, a2).unwrap();
        let i4 = g.add_child(i3, succ()).unwrap();

        let i5 = g.add_child(i4, branch()).unwrap();
        g.set_complex(i5, a3).unwrap();

        (g, [a1, a2, a3], [i1, i2, i3, i4, i5])
    }

    #[test]
    fn derives_missing_axis_edges() {
        let (mut g, [a1, a2, a3], _) = sparse_axes();
        assert_eq!(g.roots_at_scale(2).count(), 3, "axes start disconnected");

        let diags = g.complete_coarse_edges();
        assert!(diags.is_empty(), "nothing ambiguous here: {diags:?}");

        assert_eq!(g.parent(a1), None, "the first axis is the scale root");
        assert_eq!(g.parent(a2), Some(a1));
        assert_eq!(g.edge_kind(a2), Some(EdgeKind::Branch));
        assert_eq!(g.parent(a3), Some(a2));
        assert_eq!(g.edge_kind(a3), Some(EdgeKind::Branch));
        assert!(g.validate().is_empty());
    }

    #[test]
    fn completion_is_idempotent() {
        let (mut g, _, _) = sparse_axes();
        g.complete_coarse_edges();
        let edges: BTreeSet<(VertexId, VertexId)> = g
            .vertex_ids()
            .filter_map(|v| g.parent(v).map(|p| (p, v)))
            .collect();

        let diags = g.complete_coarse_edges();
        assert!(diags.is_empty());
        let again: BTreeSet<(VertexId, VertexId)> = g
            .vertex_ids()
            .filter_map(|v| g.parent(v).map(|p| (p, v)))
            .collect();
        assert_eq!(edges, again, "a second run must derive nothing");
    }

    #[test]
    fn componentless_roots_are_reported_not_repaired() {
        let (mut g, _, _) = sparse_axes();
        // An axis nothing decomposes into: no parent can be derived for it.
        let plant = g.components(g.root()).next().unwrap();
        let orphan = g.add_component(plant, VertexData::new()).unwrap();

        let diags = g.complete_coarse_edges();
        let affected: Vec<VertexId> = diags
            .iter()
            .filter_map(|d| match d {
                crate::types::Inconsistency::MissingComponents { vertex } => Some(*vertex),
                _ => None,
            })
            .collect();
        assert_eq!(affected, [orphan]);
        assert_eq!(g.parent(orphan), None, "ambiguous input is left alone");
    }
}
