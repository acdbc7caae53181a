// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The MTG text reader.
//!
//! Parsing is deliberately tolerant: malformed header rows, unknown class
//! symbols, disallowed relations, bad feature cells, and indentation jumps
//! are collected as [`ParseWarning`]s while the parse carries on, so a batch
//! of files can be processed and inspected afterwards. Only the structure
//! that cannot be built at all is dropped.
//!
//! ## Body grammar
//!
//! Each body line's leading tab count is its nesting depth. A line at depth
//! `d` continues from the last entity of the most recent line at depth
//! `d − 1`; a depth increase implicitly opens a branch and a decrease closes
//! as many as the delta. Within a line, two cursors advance over the tokens:
//! the *axis* (attachment point for `<` and `+`) and the *tip* (the last
//! entity created, attachment point for `/` and `\`):
//!
//! - `<L` appends a successor to the axis and advances it;
//! - `+L` as the first entity of a line or bracket opens the branch the
//!   rest of the segment codes, advancing the axis into it; later in a
//!   segment it hangs a one-off lateral without advancing, so in
//!   `I4+I5<I6` both `I5` and `I6` are children of `I4`;
//! - `/L` descends one scale from the tip and re-bases the axis;
//! - `\` ascends to the tip's complex;
//! - `[` and `]` save and restore both cursors;
//! - a leading `^` continues from the previous line's last entity instead
//!   of the indentation column.
//!
//! When a `CLASSES:` table is present, a label whose class is declared at a
//! *coarser* scale than the cursor opens a pending chain: `<P2/I7` coded at
//! an internode attaches `P2` under the enclosing plant and `I7` under the
//! internode in one atomic step, keeping both scales consistent. After the
//! body, the coarse-edge completion pass runs and its diagnostics are
//! appended to the warnings (with line number 0).

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use coppice_mtg::{EdgeKind, GraphError, MtgGraph, VertexData, VertexId};
use coppice_tree::{Date, Value};

use crate::header::{ClassDef, Feature, FeatureType, Header, RelationRule};
use crate::{DateFormat, MtgFile, ParseWarning};

/// Parses an MTG text into a graph, tolerantly.
///
/// Never fails: problems become [`ParseWarning`]s on the returned
/// [`MtgFile`], and input without any header sections is treated as bare
/// body lines.
#[must_use]
pub fn read_mtg(text: &str) -> MtgFile {
    Parser::default().run(text)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Section {
    Code,
    Classes,
    Description,
    Features,
    Body,
}

/// A coarse chain opened by an edge token whose class is declared coarser
/// than the cursor, waiting for the component that closes it.
#[derive(Debug)]
struct Pending {
    kind: EdgeKind,
    labels: Vec<String>,
    anchor: VertexId,
    fine_parent: VertexId,
    next_scale: u32,
}

/// Cursor state while scanning one body line.
#[derive(Debug)]
struct LineState {
    axis: VertexId,
    tip: VertexId,
    brackets: Vec<(VertexId, VertexId)>,
    pending: Option<Pending>,
    /// True at the start of a line or bracket segment; a `+` here opens the
    /// axis the segment codes rather than a one-off lateral.
    first_entity: bool,
}

#[derive(Debug)]
struct Parser {
    graph: MtgGraph,
    header: Header,
    warnings: Vec<ParseWarning>,
    /// `levels[d]` is the entity lines at depth `d` continue from.
    levels: Vec<VertexId>,
    section: Section,
    body_header_seen: bool,
}

impl Default for Parser {
    fn default() -> Self {
        let graph = MtgGraph::new();
        let root = graph.root();
        Self {
            graph,
            header: Header::default(),
            warnings: Vec::new(),
            levels: alloc::vec![root],
            section: Section::Body,
            body_header_seen: false,
        }
    }
}

impl Parser {
    fn warn(&mut self, line: usize, message: impl Into<String>) {
        self.warnings.push(ParseWarning {
            line,
            message: message.into(),
        });
    }

    fn run(mut self, text: &str) -> MtgFile {
        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix("CODE:") {
                self.header.code = String::from(rest.trim());
                self.section = Section::Code;
                continue;
            }
            match trimmed {
                "CLASSES:" => {
                    self.section = Section::Classes;
                    continue;
                }
                "DESCRIPTION:" => {
                    self.section = Section::Description;
                    continue;
                }
                "FEATURES:" => {
                    self.section = Section::Features;
                    continue;
                }
                "MTG:" => {
                    self.section = Section::Body;
                    continue;
                }
                _ => {}
            }
            match self.section {
                Section::Code => {
                    if self.header.code.is_empty() {
                        self.header.code = String::from(trimmed);
                    } else {
                        self.warn(line_no, "unexpected line in CODE section");
                    }
                }
                Section::Classes => self.parse_class_row(trimmed, line_no),
                Section::Description => self.parse_rule_row(trimmed, line_no),
                Section::Features => self.parse_feature_row(trimmed, line_no),
                Section::Body => {
                    if !self.body_header_seen && trimmed.starts_with("ENTITY-CODE") {
                        self.body_header_seen = true;
                        continue;
                    }
                    self.parse_body_line(line, line_no);
                }
            }
        }
        let diagnostics = self.graph.complete_coarse_edges();
        for d in diagnostics {
            self.warn(0, format!("{d}"));
        }
        MtgFile {
            graph: self.graph,
            header: self.header,
            warnings: self.warnings,
        }
    }

    // --- header sections ---

    fn parse_class_row(&mut self, row: &str, line: usize) {
        let cells: Vec<&str> = row.split_whitespace().collect();
        if cells.first() == Some(&"SYMBOL") {
            return;
        }
        let Some(symbol) = cells.first().and_then(|c| c.chars().next()) else {
            return;
        };
        if cells[0].chars().count() > 1 {
            self.warn(line, format!("class symbol `{}` is not a single character", cells[0]));
        }
        let Some(scale) = cells.get(1).and_then(|c| c.parse().ok()) else {
            self.warn(line, "malformed CLASSES row: missing or bad SCALE");
            return;
        };
        let column = |i: usize, default: &str| {
            String::from(cells.get(i).copied().unwrap_or(default))
        };
        self.header.classes.push(ClassDef {
            symbol,
            scale,
            decomposition: column(2, "FREE"),
            indexation: column(3, "FREE"),
            definition: column(4, "EXPLICIT"),
        });
    }

    fn parse_rule_row(&mut self, row: &str, line: usize) {
        let cells: Vec<&str> = row.split_whitespace().collect();
        if cells.first() == Some(&"LEFT") {
            return;
        }
        let (Some(left), Some(right), Some(rel)) = (
            cells.first().and_then(|c| c.chars().next()),
            cells.get(1),
            cells
                .get(2)
                .and_then(|c| c.chars().next())
                .and_then(EdgeKind::from_char),
        ) else {
            self.warn(line, "malformed DESCRIPTION row");
            return;
        };
        let right: Vec<char> = right
            .split(',')
            .filter_map(|s| s.trim().chars().next())
            .collect();
        let max = match cells.get(3) {
            None | Some(&"?") => None,
            Some(n) => match n.parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    self.warn(line, "malformed DESCRIPTION row: bad MAX");
                    None
                }
            },
        };
        self.header.rules.push(RelationRule {
            left,
            right,
            relation: rel,
            max,
        });
    }

    fn parse_feature_row(&mut self, row: &str, line: usize) {
        let cells: Vec<&str> = row.split_whitespace().collect();
        if cells.first() == Some(&"NAME") {
            return;
        }
        let (Some(name), Some(ty)) = (cells.first(), cells.get(1)) else {
            self.warn(line, "malformed FEATURES row");
            return;
        };
        let Some(ty) = FeatureType::parse(ty) else {
            self.warn(line, format!("unknown feature type `{}`", cells[1]));
            return;
        };
        self.graph.properties_mut().declare(name);
        self.header.features.push(Feature {
            name: String::from(*name),
            ty,
        });
    }

    // --- body ---

    fn parse_body_line(&mut self, line: &str, line_no: usize) {
        let cells: Vec<&str> = line.split('\t').collect();
        let cell_index = cells.iter().take_while(|c| c.is_empty()).count();
        if cell_index >= cells.len() {
            return;
        }
        let mut depth = cell_index;
        if depth >= self.levels.len() {
            self.warn(line_no, "indentation jumps more than one level");
            depth = self.levels.len() - 1;
        }
        let mut code = cells[cell_index];
        if let Some(rest) = code.strip_prefix('^') {
            // Continuation marker: pick up at the previous line's tip.
            code = rest;
            depth = self.levels.len() - 1;
        }
        let start = self.levels[depth];
        let mut state = LineState {
            axis: start,
            tip: start,
            brackets: Vec::new(),
            pending: None,
            first_entity: true,
        };

        self.scan_code(code, line_no, &mut state);
        self.resolve_pending(line_no, &mut state);
        if !state.brackets.is_empty() {
            self.warn(line_no, "unclosed `[` at end of line");
        }

        self.attach_features(&cells[cell_index + 1..], state.tip, line_no);
        self.levels.truncate(depth + 1);
        self.levels.push(state.tip);
    }

    fn scan_code(&mut self, code: &str, line: usize, state: &mut LineState) {
        let mut chars = code.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '[' => {
                    self.resolve_pending(line, state);
                    state.brackets.push((state.axis, state.tip));
                    state.first_entity = true;
                }
                ']' => {
                    self.resolve_pending(line, state);
                    match state.brackets.pop() {
                        Some((axis, tip)) => {
                            state.axis = axis;
                            state.tip = tip;
                        }
                        None => self.warn(line, "`]` without matching `[`"),
                    }
                    state.first_entity = false;
                }
                '\\' => {
                    self.resolve_pending(line, state);
                    match self.graph.complex(state.tip) {
                        Some(complex) => {
                            state.tip = complex;
                            state.axis = complex;
                        }
                        None => self.warn(line, "cannot ascend above the root"),
                    }
                }
                '/' | '<' | '+' => {
                    let mut label = String::new();
                    while let Some(&n) = chars.peek() {
                        if n.is_alphanumeric() || n == '_' {
                            label.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if label.is_empty() {
                        self.warn(line, format!("`{c}` without a label"));
                        continue;
                    }
                    match c {
                        '/' => self.entity_component(label, line, state),
                        '<' => self.entity_child(EdgeKind::Successor, label, line, state),
                        _ => self.entity_child(EdgeKind::Branch, label, line, state),
                    }
                }
                _ => self.warn(line, format!("unexpected character `{c}` in entity code")),
            }
        }
    }

    /// Declared scale for a label's class, with an unknown-symbol warning.
    fn declared_scale(&mut self, label: &str, line: usize) -> Option<u32> {
        let symbol = label.chars().next()?;
        let scale = self.header.scale_of(symbol);
        if scale.is_none() && !self.header.classes.is_empty() {
            self.warn(line, format!("unknown class symbol `{symbol}`"));
        }
        scale
    }

    /// Creates a same-scale child, downgrading a second successor to a
    /// branch with a warning.
    fn add_child_tolerant(
        &mut self,
        parent: VertexId,
        label: String,
        kind: EdgeKind,
        line: usize,
    ) -> Option<VertexId> {
        self.check_rule(parent, &label, kind, line);
        let data = |edge| VertexData {
            label: Some(label.clone()),
            edge: Some(edge),
            ..VertexData::new()
        };
        match self.graph.add_child(parent, data(kind)) {
            Ok(v) => Some(v),
            Err(GraphError::DuplicateSuccessor { .. }) => {
                self.warn(line, format!("second successor `{label}`; read as a branch"));
                self.graph.add_child(parent, data(EdgeKind::Branch)).ok()
            }
            Err(e) => {
                self.warn(line, format!("cannot attach `{label}`: {e}"));
                None
            }
        }
    }

    fn check_rule(&mut self, parent: VertexId, label: &str, kind: EdgeKind, line: usize) {
        let (Some(left), Some(right)) = (
            self.graph.label(parent).and_then(|l| l.chars().next()),
            label.chars().next(),
        ) else {
            return;
        };
        if !self.header.allows(left, right, kind) {
            self.warn(
                line,
                format!("relation `{left} {} {right}` is not declared", kind.as_char()),
            );
        }
    }

    fn entity_child(&mut self, kind: EdgeKind, label: String, line: usize, state: &mut LineState) {
        self.resolve_pending(line, state);
        let declared = self.declared_scale(&label, line);
        let axis_scale = self.graph.scale(state.axis).unwrap_or(0);
        if let Some(scale) = declared {
            if scale < axis_scale {
                // The label lives at a coarser scale: open a chain that the
                // next decomposition closes.
                match self.graph.complex_at_scale(state.tip, scale) {
                    Ok(anchor) => {
                        state.pending = Some(Pending {
                            kind,
                            labels: alloc::vec![label],
                            anchor,
                            fine_parent: state.tip,
                            next_scale: scale + 1,
                        });
                        state.first_entity = false;
                        return;
                    }
                    Err(_) => {
                        self.warn(
                            line,
                            format!("no scale-{scale} ancestor to attach `{label}` to"),
                        );
                    }
                }
            } else if scale > axis_scale {
                self.warn(
                    line,
                    format!("`{label}` is declared finer than its attachment point"),
                );
            }
        }
        let opens_segment = state.first_entity;
        if let Some(v) = self.add_child_tolerant(state.axis, label, kind, line) {
            state.tip = v;
            // A successor always carries the axis forward; a branch does so
            // only when it opens the line's (or bracket's) own segment.
            if kind == EdgeKind::Successor || opens_segment {
                state.axis = v;
            }
        }
        state.first_entity = false;
    }

    fn entity_component(&mut self, label: String, line: usize, state: &mut LineState) {
        state.first_entity = false;
        let declared = self.declared_scale(&label, line);
        if let Some(pending) = state.pending.take() {
            self.extend_chain(pending, label, declared, line, state);
            return;
        }
        let tip_scale = self.graph.scale(state.tip).unwrap_or(0);
        let anchor = match declared {
            None => Some(state.tip),
            Some(s) if s == tip_scale + 1 => Some(state.tip),
            Some(0) => {
                self.warn(line, format!("`{label}` cannot decompose at scale 0"));
                None
            }
            Some(s) if s <= tip_scale => {
                // A new decomposition starting at a coarser scale: re-anchor
                // on the enclosing complex at the scale above the label's.
                match self.graph.complex_at_scale(state.tip, s - 1) {
                    Ok(anchor) => Some(anchor),
                    Err(_) => {
                        self.warn(
                            line,
                            format!("no scale-{} ancestor to decompose `{label}` from", s - 1),
                        );
                        None
                    }
                }
            }
            Some(_) => {
                self.warn(line, format!("decomposition `{label}` skips a scale"));
                Some(state.tip)
            }
        };
        let Some(anchor) = anchor else {
            return;
        };
        match self.graph.add_component(
            anchor,
            VertexData {
                label: Some(label.clone()),
                edge: Some(EdgeKind::Decomposition),
                ..VertexData::new()
            },
        ) {
            Ok(v) => {
                state.axis = v;
                state.tip = v;
            }
            Err(e) => self.warn(line, format!("cannot decompose `{label}`: {e}")),
        }
    }

    /// Continues or closes a pending coarse chain with the component `label`.
    fn extend_chain(
        &mut self,
        mut pending: Pending,
        label: String,
        declared: Option<u32>,
        line: usize,
        state: &mut LineState,
    ) {
        let scale = declared.unwrap_or(pending.next_scale);
        if scale != pending.next_scale {
            self.warn(line, format!("`{label}` does not continue the scale chain"));
            self.apply_pending(pending, line, state);
            self.entity_component(label, line, state);
            return;
        }
        let fine_scale = self.graph.scale(pending.fine_parent).unwrap_or(0);
        if scale < fine_scale {
            pending.labels.push(label);
            pending.next_scale += 1;
            state.pending = Some(pending);
            return;
        }

        // The chain has come back down to the cursor's own scale: commit the
        // coarse entities and the fine child together.
        let kind = pending.kind;
        if let [complex_label] = pending.labels.as_slice() {
            let data = |l: &str, edge| VertexData {
                label: Some(String::from(l)),
                edge: Some(edge),
                ..VertexData::new()
            };
            match self.graph.add_child_and_complex(
                pending.fine_parent,
                data(&label, kind),
                data(complex_label, kind),
            ) {
                Ok((child, _)) => {
                    state.axis = child;
                    state.tip = child;
                    return;
                }
                Err(GraphError::DuplicateSuccessor { .. }) => {
                    self.warn(line, format!("second successor `{label}`; read as a branch"));
                    if let Ok((child, _)) = self.graph.add_child_and_complex(
                        pending.fine_parent,
                        data(&label, EdgeKind::Branch),
                        data(complex_label, EdgeKind::Branch),
                    ) {
                        state.axis = child;
                        state.tip = child;
                    }
                    return;
                }
                Err(e) => {
                    self.warn(line, format!("cannot attach `{label}`: {e}"));
                    return;
                }
            }
        }

        // Longer chains: the intermediate complexes stay parentless and the
        // completion pass derives their edges afterwards.
        let mut labels = pending.labels.into_iter();
        let first = labels.next().expect("a pending chain is never empty");
        let Some(mut upper) = self.add_child_tolerant(pending.anchor, first, kind, line) else {
            return;
        };
        for l in labels {
            match self.graph.add_component(
                upper,
                VertexData {
                    label: Some(l.clone()),
                    edge: Some(EdgeKind::Decomposition),
                    ..VertexData::new()
                },
            ) {
                Ok(v) => upper = v,
                Err(e) => {
                    self.warn(line, format!("cannot decompose `{l}`: {e}"));
                    return;
                }
            }
        }
        let Some(child) = self.add_child_tolerant(pending.fine_parent, label, kind, line) else {
            return;
        };
        if let Err(e) = self.graph.set_complex(child, upper) {
            self.warn(line, format!("cannot record decomposition: {e}"));
        }
        state.axis = child;
        state.tip = child;
    }

    /// A chain that never came back down attaches its coarse entities alone.
    fn resolve_pending(&mut self, line: usize, state: &mut LineState) {
        if let Some(pending) = state.pending.take() {
            self.apply_pending(pending, line, state);
        }
    }

    fn apply_pending(&mut self, pending: Pending, line: usize, state: &mut LineState) {
        let kind = pending.kind;
        let mut labels = pending.labels.into_iter();
        let first = labels.next().expect("a pending chain is never empty");
        let Some(mut upper) = self.add_child_tolerant(pending.anchor, first, kind, line) else {
            return;
        };
        for l in labels {
            match self.graph.add_component(
                upper,
                VertexData {
                    label: Some(l.clone()),
                    edge: Some(EdgeKind::Decomposition),
                    ..VertexData::new()
                },
            ) {
                Ok(v) => upper = v,
                Err(e) => {
                    self.warn(line, format!("cannot decompose `{l}`: {e}"));
                    return;
                }
            }
        }
        state.axis = upper;
        state.tip = upper;
    }

    // --- feature columns ---

    fn attach_features(&mut self, cells: &[&str], tip: VertexId, line: usize) {
        for (index, cell) in cells.iter().enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let Some(feature) = self.header.features.get(index).cloned() else {
                self.warn(line, "more feature cells than declared columns");
                return;
            };
            if tip == self.graph.root() {
                self.warn(line, "feature values on a line that created no entity");
                return;
            }
            if let Some(value) = self.parse_value(cell, feature.ty, line) {
                self.graph.properties_mut().set(&feature.name, tip, value);
            }
        }
    }

    fn parse_value(&mut self, cell: &str, ty: FeatureType, line: usize) -> Option<Value> {
        let bad = |parser: &mut Self| {
            parser.warn(line, format!("cannot read `{cell}` as {}", ty.as_str()));
            None
        };
        match ty {
            FeatureType::Int => match cell.parse() {
                Ok(v) => Some(Value::Int(v)),
                Err(_) => bad(self),
            },
            FeatureType::Real => match cell.parse() {
                Ok(v) => Some(Value::Real(v)),
                Err(_) => bad(self),
            },
            FeatureType::Alpha => Some(Value::Text(String::from(cell))),
            FeatureType::Date(format) => match parse_date(cell, format) {
                Some(date) => Some(Value::Date(date)),
                None => bad(self),
            },
        }
    }
}

fn parse_date(cell: &str, format: DateFormat) -> Option<Date> {
    let mut parts = cell.split('/');
    let (day, month, year) = match format {
        DateFormat::DayMonthYear2 | DateFormat::DayMonthYear4 => {
            let day: u8 = parts.next()?.parse().ok()?;
            let month: u8 = parts.next()?.parse().ok()?;
            let year: u16 = parts.next()?.parse().ok()?;
            (day, month, year)
        }
        DateFormat::MonthYear2 => {
            let month: u8 = parts.next()?.parse().ok()?;
            let year: u16 = parts.next()?.parse().ok()?;
            (1, month, year)
        }
    };
    if parts.next().is_some() || month == 0 || month > 12 || day == 0 || day > 31 {
        return None;
    }
    // Two-digit years are counted from 1900.
    let year = if year < 100 { 1900 + year } else { year };
    Some(Date { year, month, day })
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use coppice_mtg::EdgeKind;

    use super::read_mtg;

    #[test]
    fn bare_code_string_parses_without_a_header() {
        let parsed = read_mtg("/I1<I2<I3<I4+I5<I6");
        let g = &parsed.graph;
        assert_eq!(g.len(), 7, "root plus six entities");
        assert_eq!(g.vertices_at_scale(1).count(), 6);

        let i4 = g
            .vertex_ids()
            .find(|&v| g.label(v) == Some("I4"))
            .unwrap();
        let children: Vec<_> = g.children(i4).to_vec();
        assert_eq!(children.len(), 2, "the lateral and the axis continuation");
        assert_eq!(g.edge_kind(children[0]), Some(EdgeKind::Branch));
        assert_eq!(g.label(children[0]), Some("I5"));
        assert_eq!(g.edge_kind(children[1]), Some(EdgeKind::Successor));
        assert_eq!(g.label(children[1]), Some("I6"));
    }

    #[test]
    fn indentation_opens_and_closes_branches() {
        let text = "/A1<A2<A3\n\t+B1<B2\n\t<A4";
        let parsed = read_mtg(text);
        let g = &parsed.graph;
        let by_label = |l: &str| g.vertex_ids().find(|&v| g.label(v) == Some(l)).unwrap();

        // Both indented lines continue from A3, the tip of the first line.
        let a3 = by_label("A3");
        let b1 = by_label("B1");
        let a4 = by_label("A4");
        assert_eq!(g.parent(b1), Some(a3));
        assert_eq!(g.edge_kind(b1), Some(EdgeKind::Branch));
        assert_eq!(g.parent(a4), Some(a3));
        assert_eq!(g.edge_kind(a4), Some(EdgeKind::Successor));
        assert_eq!(g.parent(by_label("B2")), Some(b1));
    }

    #[test]
    fn class_scales_drive_multiscale_attachment() {
        let text = "\
CODE:\tFORM-A

CLASSES:
SYMBOL\tSCALE\tDECOMPOSITION\tINDEXATION\tDEFINITION
$\t0\tFREE\tFREE\tIMPLICIT
P\t1\tFREE\tFREE\tEXPLICIT
I\t2\tNONE\tFREE\tEXPLICIT

DESCRIPTION:
LEFT\tRIGHT\tRELTYPE\tMAX
I\tI\t<\t1
I\tI\t+\t?
P\tP\t<\t1

FEATURES:
NAME\tTYPE
diameter\tREAL

MTG:
ENTITY-CODE\tdiameter
/P1/I1<I2\t2.5
^<P2/I3<I4
";
        let parsed = read_mtg(text);
        assert!(
            parsed.warnings.is_empty(),
            "unexpected warnings: {:?}",
            parsed.warnings
        );
        let g = &parsed.graph;
        let by_label = |l: &str| g.vertex_ids().find(|&v| g.label(v) == Some(l)).unwrap();

        let (p1, p2) = (by_label("P1"), by_label("P2"));
        let (i1, i2, i3) = (by_label("I1"), by_label("I2"), by_label("I3"));

        // `<P2/I3` coded at I2: the plant chain and the internode chain both
        // continue, and I3 decomposes the new plant.
        assert_eq!(g.parent(p2), Some(p1));
        assert_eq!(g.edge_kind(p2), Some(EdgeKind::Successor));
        assert_eq!(g.parent(i3), Some(i2));
        assert_eq!(g.complex(i3), Some(p2));
        assert_eq!(g.complex(i2), Some(p1));

        // The feature cell landed on the last entity of its line.
        assert_eq!(
            g.properties().value("diameter", i2),
            Some(&coppice_tree::Value::Real(2.5))
        );
        assert_eq!(g.properties().value("diameter", i1), None);
        assert_eq!(g.scale(by_label("I4")), Some(2));
        assert!(g.validate().is_empty());
    }

    #[test]
    fn problems_become_warnings_not_failures() {
        let text = "\
CLASSES:
SYMBOL\tSCALE
I\t1

MTG:
/I1<I2<X3\n\t\t\t+I4\n/I5<I5a?";
        let parsed = read_mtg(text);
        let g = &parsed.graph;

        // Unknown class, indentation jump, stray character: three warnings,
        // but the readable structure is all there.
        assert!(parsed.warnings.len() >= 3, "got {:?}", parsed.warnings);
        assert!(g.len() >= 6);
        assert!(
            parsed
                .warnings
                .iter()
                .any(|w| w.message.contains("unknown class")),
        );
        assert!(
            parsed
                .warnings
                .iter()
                .any(|w| w.message.contains("indentation")),
        );
    }

    #[test]
    fn duplicate_successors_are_downgraded() {
        let parsed = read_mtg("/A1<A2\n^<A3");
        let g = &parsed.graph;
        // The continuation line picks up at A2: no conflict.
        assert!(parsed.warnings.is_empty());
        assert!(g.validate().is_empty());

        let conflicted = read_mtg("/A1[<A2]<A3");
        let g = &conflicted.graph;
        assert!(
            conflicted
                .warnings
                .iter()
                .any(|w| w.message.contains("second successor")),
            "got {:?}",
            conflicted.warnings
        );
        assert!(g.validate().is_empty(), "the downgrade keeps the graph sane");
    }

    #[test]
    fn completion_runs_after_the_body() {
        let text = "\
CLASSES:
SYMBOL\tSCALE
P\t1
A\t2
I\t3

MTG:
/P1/A1/I1<I2
\t+A2/I3
";
        let parsed = read_mtg(text);
        let g = &parsed.graph;
        let by_label = |l: &str| g.vertex_ids().find(|&v| g.label(v) == Some(l)).unwrap();

        let (a1, a2) = (by_label("A1"), by_label("A2"));
        let (i2, i3) = (by_label("I2"), by_label("I3"));

        // `+A2/I3` coded at tip I2: I3 branches off I2 and decomposes A2,
        // and the plant chain stays consistent at the axis scale too.
        assert_eq!(g.parent(i3), Some(i2));
        assert_eq!(g.complex(i3), Some(a2));
        assert_eq!(g.parent(a2), Some(a1));
        assert_eq!(g.edge_kind(a2), Some(EdgeKind::Branch));
        assert!(g.validate().is_empty());
    }
}
