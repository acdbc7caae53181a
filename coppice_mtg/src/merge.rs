// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural merging of two graphs.

use alloc::collections::BTreeMap;

use coppice_tree::{GraphError, VertexId};

use crate::graph::MtgGraph;
use crate::types::EdgeKind;

impl MtgGraph {
    /// Copies `other`'s multiscale subtree rooted at `from` into this graph,
    /// identifying `from` with the existing vertex `at`.
    ///
    /// Every other vertex of the closure is remapped onto a fresh id;
    /// relative scales, complex/component structure, sibling order, labels,
    /// edge kinds, and property values are preserved. `from` itself is *not*
    /// copied: its children and components are grafted onto `at`, so merging
    /// a graph with a copy of itself shares exactly the one anchor vertex.
    ///
    /// Copied children of `from` that carried no edge kind receive `edge`,
    /// when given. A kind that would give `at` a second successor is left
    /// unset instead; [`MtgGraph::validate`] reports such conflicts.
    ///
    /// Returns the old-to-new id map.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidVertex`] if `at` is not live in this graph or
    /// `from` is not live in `other`.
    pub fn merge(
        &mut self,
        other: &Self,
        at: VertexId,
        from: VertexId,
        edge: Option<EdgeKind>,
    ) -> Result<BTreeMap<VertexId, VertexId>, GraphError> {
        if !self.contains(at) {
            return Err(GraphError::InvalidVertex(at));
        }
        if !other.contains(from) {
            return Err(GraphError::InvalidVertex(from));
        }
        let remap = self.copy_closure(other, from, at)?;
        if let Some(kind) = edge {
            for &c in other.children(from) {
                let Some(&mapped) = remap.get(&c) else {
                    continue;
                };
                if self.edge_kind(mapped).is_none() {
                    // A conflicting successor stays unset; validate() will
                    // surface it.
                    let _ = self.set_edge_kind(mapped, kind);
                }
            }
        }
        Ok(remap)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::graph::MtgGraph;
    use crate::types::{EdgeKind, VertexData};

    fn sample() -> MtgGraph {
        let mut g = MtgGraph::new();
        let p = g
            .add_component(
                g.root(),
                VertexData {
                    label: Some("P1".into()),
                    ..VertexData::new()
                },
            )
            .unwrap();
        let i1 = g.add_component(p, VertexData::new()).unwrap();
        let i2 = g
            .add_child(
                i1,
                VertexData {
                    edge: Some(EdgeKind::Successor),
                    ..VertexData::new()
                },
            )
            .unwrap();
        g.properties_mut()
            .set("length", i2, coppice_tree::Value::Real(3.5));
        g
    }

    #[test]
    fn union_with_own_copy_shares_the_root() {
        let g = sample();
        let copy = g.sub_mtg(g.root()).unwrap();
        let mut merged = g.clone();
        merged
            .merge(&copy, merged.root(), copy.root(), None)
            .unwrap();
        assert_eq!(merged.len(), 2 * g.len() - 1);
        assert!(merged.validate().is_empty());
        // Two plants now decompose from the shared root.
        assert_eq!(merged.component_roots(merged.root()).count(), 2);
    }

    #[test]
    fn merge_preserves_structure_and_properties() {
        let g = sample();
        let mut target = MtgGraph::new();
        let anchor = target
            .add_component(target.root(), VertexData::new())
            .unwrap();
        let remap = target
            .merge(&g, anchor, g.root(), None)
            .unwrap();

        // Scales shifted relative to the anchor.
        let plant_old = g.components(g.root()).next().unwrap();
        let plant_new = remap[&plant_old];
        assert_eq!(target.scale(plant_new), Some(2));
        assert_eq!(target.complex(plant_new), Some(anchor));
        assert_eq!(target.label(plant_new), Some("P1"));

        // Edge kinds and property values travel along.
        let internodes: Vec<_> = target.components(plant_new).collect();
        assert_eq!(internodes.len(), 2);
        let tip = internodes[1];
        assert_eq!(target.edge_kind(tip), Some(EdgeKind::Successor));
        assert_eq!(
            target.properties().value("length", tip),
            Some(&coppice_tree::Value::Real(3.5))
        );
        assert!(target.validate().is_empty());
    }

    #[test]
    fn merge_rejects_stale_anchors() {
        let g = sample();
        let mut target = MtgGraph::new();
        let ghost = coppice_tree::VertexId::new(99);
        assert!(target.merge(&g, ghost, g.root(), None).is_err());
        assert!(target
            .merge(&g, target.root(), ghost, None)
            .is_err());
    }
}
