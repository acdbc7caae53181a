// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Header model: the `CODE:`, `CLASSES:`, `DESCRIPTION:`, and `FEATURES:`
//! sections preceding the body of an MTG file.

use alloc::string::String;
use alloc::vec::Vec;

use coppice_mtg::EdgeKind;

/// How a date-typed feature column is rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DateFormat {
    /// `DD/MM/YY`, two-digit year counted from 1900.
    DayMonthYear2,
    /// `DD/MM/YYYY`.
    DayMonthYear4,
    /// `MM/YY`, day implied as 1, two-digit year counted from 1900.
    MonthYear2,
}

impl DateFormat {
    /// The column-type keyword for this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DayMonthYear2 => "DD/MM/YY",
            Self::DayMonthYear4 => "DD/MM/YYYY",
            Self::MonthYear2 => "MM/YY",
        }
    }
}

/// The type of a feature column, as declared in `FEATURES:`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeatureType {
    /// `INT`: integer values.
    Int,
    /// `REAL`: floating-point values.
    Real,
    /// `ALPHA`: free text.
    Alpha,
    /// One of the date formats.
    Date(DateFormat),
}

impl FeatureType {
    /// Parses a column-type keyword.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "INT" => Some(Self::Int),
            "REAL" => Some(Self::Real),
            "ALPHA" => Some(Self::Alpha),
            "DD/MM/YY" => Some(Self::Date(DateFormat::DayMonthYear2)),
            "DD/MM/YYYY" => Some(Self::Date(DateFormat::DayMonthYear4)),
            "MM/YY" => Some(Self::Date(DateFormat::MonthYear2)),
            _ => None,
        }
    }

    /// The keyword this type is written as.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Real => "REAL",
            Self::Alpha => "ALPHA",
            Self::Date(fmt) => fmt.as_str(),
        }
    }
}

/// A declared feature column: property name and value type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    /// Property name the column feeds.
    pub name: String,
    /// Declared value type.
    pub ty: FeatureType,
}

/// A row of the `CLASSES:` table.
///
/// Only `symbol` and `scale` carry semantics here; the remaining columns are
/// kept verbatim for round-tripping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// One-character class symbol (`P`, `I`, …; `$` is the implicit root).
    pub symbol: char,
    /// The scale entities of this class live at.
    pub scale: u32,
    /// `DECOMPOSITION` column, kept verbatim.
    pub decomposition: String,
    /// `INDEXATION` column, kept verbatim.
    pub indexation: String,
    /// `DEFINITION` column, kept verbatim.
    pub definition: String,
}

/// A row of the `DESCRIPTION:` table: which relations are allowed between
/// which classes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationRule {
    /// Left-hand class symbol.
    pub left: char,
    /// Allowed right-hand class symbols.
    pub right: Vec<char>,
    /// The relation this row constrains.
    pub relation: EdgeKind,
    /// Maximum multiplicity; `None` renders as `?`.
    pub max: Option<u32>,
}

/// The parsed header of an MTG file.
#[derive(Clone, Debug, Default)]
pub struct Header {
    /// `CODE:` value, typically `FORM-A`.
    pub code: String,
    /// `CLASSES:` rows.
    pub classes: Vec<ClassDef>,
    /// `DESCRIPTION:` rows.
    pub rules: Vec<RelationRule>,
    /// `FEATURES:` rows, in column order.
    pub features: Vec<Feature>,
}

impl Header {
    /// Looks up the class declared for `symbol`.
    #[must_use]
    pub fn class(&self, symbol: char) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.symbol == symbol)
    }

    /// The declared scale for `symbol`, if the class is known.
    #[must_use]
    pub fn scale_of(&self, symbol: char) -> Option<u32> {
        self.class(symbol).map(|c| c.scale)
    }

    /// Whether `left -relation-> right` is allowed.
    ///
    /// With no `DESCRIPTION:` rows at all the format is unconstrained and
    /// everything is allowed; once rows exist, a relation must be covered by
    /// one of them.
    #[must_use]
    pub fn allows(&self, left: char, right: char, relation: EdgeKind) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        self.rules
            .iter()
            .any(|r| r.relation == relation && r.left == left && r.right.contains(&right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_types_round_trip_their_keywords() {
        for keyword in ["INT", "REAL", "ALPHA", "DD/MM/YY", "DD/MM/YYYY", "MM/YY"] {
            let ty = FeatureType::parse(keyword).unwrap();
            assert_eq!(ty.as_str(), keyword);
        }
        assert_eq!(FeatureType::parse("STRING"), None);
    }

    #[test]
    fn rules_default_to_permissive() {
        let mut header = Header::default();
        assert!(header.allows('I', 'I', EdgeKind::Successor));

        header.rules.push(RelationRule {
            left: 'I',
            right: alloc::vec!['I', 'U'],
            relation: EdgeKind::Successor,
            max: Some(1),
        });
        assert!(header.allows('I', 'U', EdgeKind::Successor));
        assert!(!header.allows('I', 'I', EdgeKind::Branch));
        assert!(!header.allows('U', 'I', EdgeKind::Successor));
    }
}
