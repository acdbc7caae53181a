// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The MTG text writer.
//!
//! Serialization walks [`MtgGraph::iter_cross_scale`] and rebuilds a header
//! from the graph itself (classes from labels and scales, relation rules
//! from the edges actually present) plus the caller's feature declarations.
//!
//! The body writer keeps the same level stack the reader keeps: `levels[d]`
//! is the last entity written by the most recent line at depth `d − 1`, and
//! a new line's depth is chosen by scanning that stack right to left for
//! the entity the line must continue from. The choice is a deterministic
//! greedy heuristic, not a globally minimal layout, and the reader maintains
//! the stack identically, which is what makes `read ∘ write` stable.
//!
//! Axis continuations and single-use decompositions extend the current line;
//! lateral branches always open an indented line; a vertex that both
//! continues the fine scale and opens a new coarse entity is written in the
//! compound form (`<P2/I7`) the reader turns back into an atomic
//! child-and-complex insertion. A line is cut after any entity carrying
//! feature values, because a line's cells belong to its last entity.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use coppice_mtg::{EdgeKind, MtgGraph, VertexId};
use coppice_tree::Value;

use crate::header::{DateFormat, Feature, FeatureType};

/// Serializes `graph` to MTG text, with `features` as the declared columns.
#[must_use]
pub fn write_mtg(graph: &MtgGraph, features: &[Feature]) -> String {
    let mut writer = Writer {
        graph,
        features,
        out: String::new(),
        levels: alloc::vec![graph.root()],
        line: None,
    };
    writer.run();
    writer.out
}

/// An open body line not yet committed to the output.
#[derive(Debug)]
struct Line {
    depth: usize,
    code: String,
    tip: VertexId,
}

#[derive(Debug)]
struct Writer<'a> {
    graph: &'a MtgGraph,
    features: &'a [Feature],
    out: String,
    /// Mirror of the reader's level stack.
    levels: Vec<VertexId>,
    line: Option<Line>,
}

impl Writer<'_> {
    fn run(&mut self) {
        self.write_header();
        self.out.push_str("MTG:\nENTITY-CODE");
        for f in self.features {
            self.out.push('\t');
            self.out.push_str(&f.name);
        }
        self.out.push('\n');

        let graph = self.graph;
        let root = graph.root();
        let mut chain: Vec<VertexId> = Vec::new();
        for v in graph.iter_cross_scale(root) {
            if v == root {
                continue;
            }
            if self.graph.components(v).next().is_some() {
                // A coarse entity: held until the fine vertex that opens its
                // decomposition arrives.
                chain.push(v);
            } else {
                self.emit(core::mem::take(&mut chain), v);
            }
        }
        self.flush();
    }

    // --- header ---

    fn write_header(&mut self) {
        self.out.push_str("CODE:\tFORM-A\n\nCLASSES:\n");
        self.out
            .push_str("SYMBOL\tSCALE\tDECOMPOSITION\tINDEXATION\tDEFINITION\n");
        self.out.push_str("$\t0\tFREE\tFREE\tIMPLICIT\n");
        let mut classes: BTreeSet<(u32, char)> = BTreeSet::new();
        let mut seen: BTreeSet<char> = BTreeSet::new();
        for v in self.graph.vertex_ids() {
            if v == self.graph.root() {
                continue;
            }
            let symbol = self.symbol(v);
            let Some(scale) = self.graph.scale(v) else {
                continue;
            };
            if seen.insert(symbol) {
                classes.insert((scale, symbol));
            }
        }
        for (scale, symbol) in classes {
            self.out
                .push_str(&format!("{symbol}\t{scale}\tFREE\tFREE\tEXPLICIT\n"));
        }

        self.out.push_str("\nDESCRIPTION:\nLEFT\tRIGHT\tRELTYPE\tMAX\n");
        let mut rules: BTreeMap<(char, char), BTreeSet<char>> = BTreeMap::new();
        for v in self.graph.vertex_ids() {
            let (Some(parent), Some(kind)) = (self.graph.parent(v), self.graph.edge_kind(v))
            else {
                continue;
            };
            if kind == EdgeKind::Decomposition {
                continue;
            }
            rules
                .entry((self.symbol(parent), kind.as_char()))
                .or_default()
                .insert(self.symbol(v));
        }
        for ((left, relation), rights) in rules {
            let list: Vec<String> = rights.iter().map(|c| format!("{c}")).collect();
            self.out
                .push_str(&format!("{left}\t{}\t{relation}\t?\n", list.join(",")));
        }

        self.out.push_str("\nFEATURES:\nNAME\tTYPE\n");
        for f in self.features {
            self.out
                .push_str(&format!("{}\t{}\n", f.name, f.ty.as_str()));
        }
        self.out.push('\n');
    }

    // --- body ---

    /// Writes one fine vertex, preceded by the coarse chain it opens.
    fn emit(&mut self, chain: Vec<VertexId>, v: VertexId) {
        if chain.is_empty() {
            self.emit_plain(v);
            return;
        }
        self.flush();
        let first = chain[0];
        let mut code = String::new();
        let depth = match self.graph.parent(v) {
            Some(fine_parent) => {
                // Compound form, anchored at the fine cursor: the reader
                // re-creates coarse and fine edges in one atomic step.
                code.push(self.edge_char(v));
                code.push_str(&self.label(first));
                self.find_column(fine_parent)
            }
            None => {
                // A pure decomposition chain: anchor the first coarse entity
                // at its own parent (or complex) and descend from there.
                match self.graph.parent(first) {
                    Some(p) => {
                        code.push(self.edge_char(first));
                        code.push_str(&self.label(first));
                        self.find_column(p)
                    }
                    None => {
                        let anchor = self.graph.complex(first).unwrap_or(self.graph.root());
                        code.push('/');
                        code.push_str(&self.label(first));
                        self.find_column(anchor)
                    }
                }
            }
        };
        for &c in &chain[1..] {
            code.push('/');
            code.push_str(&self.label(c));
        }
        code.push('/');
        code.push_str(&self.label(v));
        self.line = Some(Line {
            depth,
            code,
            tip: v,
        });
        if self.has_features(v) {
            self.flush();
        }
    }

    fn emit_plain(&mut self, v: VertexId) {
        let (anchor, edge) = match self.graph.parent(v) {
            Some(p) => (p, self.edge_char(v)),
            None => match self.graph.complex(v) {
                Some(c) => (c, '/'),
                None => return,
            },
        };
        let inline = match &self.line {
            Some(line) if line.tip == anchor => match edge {
                '<' => true,
                // A decomposition may stay inline only while its complex is
                // never needed as a column again.
                '/' => {
                    self.graph.children(anchor).is_empty()
                        && self.graph.component_roots(anchor).nth(1).is_none()
                }
                _ => false,
            },
            _ => false,
        };
        if inline {
            let label = self.label(v);
            let line = self.line.as_mut().expect("inline requires an open line");
            line.code.push(edge);
            line.code.push_str(&label);
            line.tip = v;
        } else {
            self.flush();
            let depth = self.find_column(anchor);
            let mut code = String::new();
            code.push(edge);
            code.push_str(&self.label(v));
            self.line = Some(Line {
                depth,
                code,
                tip: v,
            });
        }
        if self.has_features(v) {
            self.flush();
        }
    }

    /// Commits the open line, with the feature cells of its last entity.
    fn flush(&mut self) {
        let Some(line) = self.line.take() else {
            return;
        };
        for _ in 0..line.depth {
            self.out.push('\t');
        }
        self.out.push_str(&line.code);

        let cells: Vec<String> = self
            .features
            .iter()
            .map(|f| {
                self.graph
                    .properties()
                    .value(&f.name, line.tip)
                    .map(|v| format_value(v, f.ty))
                    .unwrap_or_default()
            })
            .collect();
        let last = cells.iter().rposition(|c| !c.is_empty());
        if let Some(last) = last {
            for cell in &cells[..=last] {
                self.out.push('\t');
                self.out.push_str(cell);
            }
        }
        self.out.push('\n');

        self.levels.truncate(line.depth + 1);
        self.levels.push(line.tip);
    }

    /// The depth of the line that must continue from `anchor`.
    fn find_column(&self, anchor: VertexId) -> usize {
        match self.levels.iter().rposition(|&v| v == anchor) {
            Some(depth) => depth,
            None => {
                debug_assert!(false, "anchor is not on the level stack");
                self.levels.len() - 1
            }
        }
    }

    fn label(&self, v: VertexId) -> String {
        match self.graph.label(v) {
            Some(l) => String::from(l),
            None => format!("V{}", v.raw()),
        }
    }

    /// The class symbol a vertex's label starts with.
    fn symbol(&self, v: VertexId) -> char {
        self.graph
            .label(v)
            .and_then(|l| l.chars().next())
            .filter(|c| c.is_alphabetic())
            .unwrap_or('V')
    }

    fn edge_char(&self, v: VertexId) -> char {
        match self.graph.edge_kind(v) {
            Some(EdgeKind::Successor) => '<',
            _ => '+',
        }
    }

    fn has_features(&self, v: VertexId) -> bool {
        self.features
            .iter()
            .any(|f| self.graph.properties().value(&f.name, v).is_some())
    }
}

fn format_value(value: &Value, ty: FeatureType) -> String {
    match (value, ty) {
        (Value::Date(d), FeatureType::Date(DateFormat::DayMonthYear2)) => {
            format!("{:02}/{:02}/{:02}", d.day, d.month, d.year % 100)
        }
        (Value::Date(d), FeatureType::Date(DateFormat::DayMonthYear4)) => {
            format!("{:02}/{:02}/{:04}", d.day, d.month, d.year)
        }
        (Value::Date(d), FeatureType::Date(DateFormat::MonthYear2)) => {
            format!("{:02}/{:02}", d.month, d.year % 100)
        }
        (value, _) => format!("{value}"),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use coppice_mtg::{EdgeKind, MtgGraph, VertexData};

    use super::write_mtg;

    fn labelled(label: &str, edge: Option<EdgeKind>) -> VertexData {
        VertexData {
            label: Some(String::from(label)),
            edge,
            ..VertexData::new()
        }
    }

    #[test]
    fn single_axis_collapses_to_one_line() {
        let mut g = MtgGraph::new();
        let p1 = g
            .add_component(g.root(), labelled("P1", Some(EdgeKind::Decomposition)))
            .unwrap();
        let i1 = g
            .add_component(p1, labelled("I1", Some(EdgeKind::Decomposition)))
            .unwrap();
        let i2 = g
            .add_child(i1, labelled("I2", Some(EdgeKind::Successor)))
            .unwrap();
        let _ = g
            .add_child(i2, labelled("I3", Some(EdgeKind::Successor)))
            .unwrap();

        let text = write_mtg(&g, &[]);
        let body: alloc::vec::Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "MTG:")
            .skip(2)
            .collect();
        assert_eq!(body, ["/P1/I1<I2<I3"]);
    }

    #[test]
    fn branches_are_indented_under_their_carrier() {
        let mut g = MtgGraph::new();
        let p1 = g
            .add_component(g.root(), labelled("A1", Some(EdgeKind::Decomposition)))
            .unwrap();
        let i1 = g
            .add_component(p1, labelled("I1", Some(EdgeKind::Decomposition)))
            .unwrap();
        let i2 = g
            .add_child(i1, labelled("I2", Some(EdgeKind::Successor)))
            .unwrap();
        let b1 = g
            .add_child(i2, labelled("B1", Some(EdgeKind::Branch)))
            .unwrap();
        let _b2 = g
            .add_child(b1, labelled("B2", Some(EdgeKind::Successor)))
            .unwrap();
        let _i3 = g
            .add_child(i2, labelled("I3", Some(EdgeKind::Successor)))
            .unwrap();

        let text = write_mtg(&g, &[]);
        let body: alloc::vec::Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "MTG:")
            .skip(2)
            .collect();
        // The branch axis is fully written before the carrier's successor,
        // both indented one level under the carrying line.
        assert_eq!(body, ["/A1/I1<I2", "\t+B1<B2", "\t<I3"]);
    }
}
