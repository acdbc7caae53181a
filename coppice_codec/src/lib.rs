// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coppice Codec: reader and writer for the MTG plant-architecture text
//! format.
//!
//! An MTG file is a header (`CODE:`, a `CLASSES:` symbol/scale table, a
//! `DESCRIPTION:` table of allowed relations, and typed `FEATURES:`
//! columns) followed by a tab-indented body in which each line's leading
//! tab count is its nesting depth and the inline tokens `/`, `\`, `[`, `]`,
//! `<`, `+` drive a cursor machine over scales and branches:
//!
//! ```text
//! CODE:	FORM-A
//!
//! CLASSES:
//! SYMBOL	SCALE	DECOMPOSITION	INDEXATION	DEFINITION
//! $	0	FREE	FREE	IMPLICIT
//! P	1	FREE	FREE	EXPLICIT
//! I	2	NONE	FREE	EXPLICIT
//!
//! DESCRIPTION:
//! LEFT	RIGHT	RELTYPE	MAX
//! I	I	<	1
//! I	I	+	?
//!
//! FEATURES:
//! NAME	TYPE
//! diameter	REAL
//!
//! MTG:
//! ENTITY-CODE	diameter
//! /P1/I1<I2	2.5
//! 	+I3<I4
//! ```
//!
//! [`read_mtg`] parses tolerantly, accumulating [`ParseWarning`]s instead of
//! aborting, and finishes with the coarse-edge completion pass so a
//! fine-scale-only file comes back fully connected. [`write_mtg`] is its
//! inverse, walking the cross-scale order and choosing indentation columns
//! with the same greedy level-stack heuristic the reader maintains, which
//! keeps `read ∘ write` stable.
//!
//! The core never prints: callers inspect the warning list themselves.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod header;
mod reader;
mod writer;

use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

pub use header::{ClassDef, DateFormat, Feature, FeatureType, Header, RelationRule};
pub use reader::read_mtg;
pub use writer::write_mtg;

use coppice_mtg::MtgGraph;

/// A problem found while parsing, tied to its 1-based source line.
///
/// Line 0 marks graph-level diagnostics appended after the body, such as
/// ambiguities the completion pass could not repair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseWarning {
    /// 1-based source line, or 0 for post-parse diagnostics.
    pub line: usize,
    /// Human-readable description of the problem.
    pub message: String,
}

/// The result of parsing an MTG text: the graph, the header it declared,
/// and every warning encountered on the way.
#[derive(Debug)]
pub struct MtgFile {
    /// The parsed (and completion-repaired) graph.
    pub graph: MtgGraph,
    /// The parsed header: classes, relation rules, feature columns.
    pub header: Header,
    /// Accumulated warnings; empty for a clean file.
    pub warnings: Vec<ParseWarning>,
}

impl MtgFile {
    /// Serializes the graph back to text, using the declared features.
    #[must_use]
    pub fn to_text(&self) -> String {
        write_mtg(&self.graph, &self.header.features)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use coppice_mtg::MtgGraph;

    use super::{read_mtg, write_mtg};

    /// Structural equality up to vertex renumbering: walk both graphs in
    /// cross-scale order and compare labels, scales, edges, and the declared
    /// feature values.
    fn assert_same_shape(a: &MtgGraph, b: &MtgGraph, features: &[super::Feature]) {
        assert_eq!(a.len(), b.len(), "vertex counts differ");
        let walk_a: Vec<_> = a.iter_cross_scale(a.root()).collect();
        let walk_b: Vec<_> = b.iter_cross_scale(b.root()).collect();
        assert_eq!(walk_a.len(), walk_b.len(), "cross-scale orders differ");
        for (&va, &vb) in walk_a.iter().zip(&walk_b) {
            assert_eq!(a.label(va), b.label(vb));
            assert_eq!(a.scale(va), b.scale(vb));
            assert_eq!(a.edge_kind(va), b.edge_kind(vb));
            assert_eq!(
                a.parent(va).map(|p| a.label(p).map(alloc::string::String::from)),
                b.parent(vb).map(|p| b.label(p).map(alloc::string::String::from)),
            );
            assert_eq!(
                a.complex(va).and_then(|c| a.label(c)),
                b.complex(vb).and_then(|c| b.label(c)),
            );
            for f in features {
                assert_eq!(
                    a.properties().value(&f.name, va),
                    b.properties().value(&f.name, vb),
                    "feature `{}` differs at {:?}",
                    f.name,
                    a.label(va),
                );
            }
        }
    }

    const ORCHARD: &str = "\
CODE:\tFORM-A

CLASSES:
SYMBOL\tSCALE\tDECOMPOSITION\tINDEXATION\tDEFINITION
$\t0\tFREE\tFREE\tIMPLICIT
P\t1\tFREE\tFREE\tEXPLICIT
A\t2\tFREE\tFREE\tEXPLICIT
I\t3\tNONE\tFREE\tEXPLICIT

DESCRIPTION:
LEFT\tRIGHT\tRELTYPE\tMAX
A\tA\t+\t?
I\tI\t<\t1
I\tI\t+\t?
P\tP\t<\t1

FEATURES:
NAME\tTYPE
diameter\tREAL
nleaf\tINT
observed\tDD/MM/YY

MTG:
ENTITY-CODE\tdiameter\tnleaf\tobserved
/P1/A1/I1<I2\t2.1\t4\t12/06/98
\t+A2/I3<I4\t1.2
\t\t+A3/I5\t0.8\t2
^<P2/A4/I6<I7\t\t3
";

    #[test]
    fn round_trip_is_stable() {
        let first = read_mtg(ORCHARD);
        assert!(
            first.warnings.is_empty(),
            "clean input must parse clean: {:?}",
            first.warnings
        );

        let text = first.to_text();
        let second = read_mtg(&text);
        assert!(
            second.warnings.is_empty(),
            "written output must reparse clean: {:?}\n{text}",
            second.warnings
        );
        assert_same_shape(&first.graph, &second.graph, &first.header.features);

        // A second round trip reproduces the text byte for byte.
        assert_eq!(text, second.to_text());
    }

    #[test]
    fn compound_lines_connect_both_scales() {
        // `+A2/I4` coded at an internode keeps the axis scale and the
        // internode scale consistent in one step.
        let text = "\
CLASSES:
SYMBOL\tSCALE
P\t1
A\t2
I\t3

MTG:
/P1/A1/I1<I2<I3
\t+A2/I4<I5
";
        let parsed = read_mtg(text);
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        let g = &parsed.graph;
        let by_label = |l: &str| g.vertex_ids().find(|&v| g.label(v) == Some(l)).unwrap();
        assert_eq!(g.parent(by_label("A2")), Some(by_label("A1")));

        let rewritten = read_mtg(&parsed.to_text());
        assert_same_shape(g, &rewritten.graph, &[]);
    }

    #[test]
    fn features_and_dates_survive_the_trip() {
        let first = read_mtg(ORCHARD);
        let g = &first.graph;
        let by_label = |l: &str| g.vertex_ids().find(|&v| g.label(v) == Some(l)).unwrap();

        let i2 = by_label("I2");
        assert_eq!(
            g.properties().value("observed", i2),
            Some(&coppice_tree::Value::Date(coppice_tree::Date {
                year: 1998,
                month: 6,
                day: 12
            }))
        );
        assert_eq!(
            g.properties().value("nleaf", by_label("I7")),
            Some(&coppice_tree::Value::Int(3))
        );
        // An empty cell leaves the sparse map empty.
        assert_eq!(g.properties().value("diameter", by_label("I7")), None);

        let again = read_mtg(&first.to_text());
        assert_same_shape(g, &again.graph, &first.header.features);
    }

    #[test]
    fn write_then_read_from_a_programmatic_graph() {
        use coppice_mtg::{EdgeKind, VertexData};

        let mut g = MtgGraph::new();
        let plant = g
            .add_component(
                g.root(),
                VertexData {
                    label: Some("P1".into()),
                    edge: Some(EdgeKind::Decomposition),
                    ..VertexData::new()
                },
            )
            .unwrap();
        let mut prev = g
            .add_component(
                plant,
                VertexData {
                    label: Some("U1".into()),
                    edge: Some(EdgeKind::Decomposition),
                    ..VertexData::new()
                },
            )
            .unwrap();
        for index in 2..=40 {
            prev = g
                .add_child(
                    prev,
                    VertexData {
                        label: Some(alloc::format!("U{index}")),
                        edge: Some(EdgeKind::Successor),
                        ..VertexData::new()
                    },
                )
                .unwrap();
        }

        let text = write_mtg(&g, &[]);
        let parsed = read_mtg(&text);
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert_same_shape(&g, &parsed.graph, &[]);
    }
}
