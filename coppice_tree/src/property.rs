// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generic per-vertex property storage.
//!
//! A [`PropertyStore`] holds one sparse [`PropertyMap`] per declared property
//! name. Vertices need not appear in every map, and values use the closed
//! [`Value`] variant type matching the column types the MTG file format can
//! declare (`INT`, `REAL`, `ALPHA`, and date formats).

use alloc::collections::BTreeMap;
use alloc::string::String;

use hashbrown::HashMap;

use crate::VertexId;

/// A calendar date, as carried by date-typed property columns.
///
/// The file format declares how dates are rendered (for example `DD/MM/YY`);
/// the in-memory value is format-independent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    /// Full year, e.g. `1998`.
    pub year: u16,
    /// Month in `1..=12`.
    pub month: u8,
    /// Day of month in `1..=31`.
    pub day: u8,
}

impl core::fmt::Display for Date {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A property value.
///
/// This is a closed variant type: every value a property map can hold comes
/// from one of the four column types the text format can declare.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An integer column value (`INT`).
    Int(i64),
    /// A floating-point column value (`REAL`).
    Real(f64),
    /// A free-text column value (`ALPHA`).
    Text(String),
    /// A date column value (any of the declared date formats).
    Date(Date),
}

impl Value {
    /// Returns the integer payload, if this is an [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the floating-point payload, if this is a [`Value::Real`].
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if this is a [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the date payload, if this is a [`Value::Date`].
    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{v}"),
        }
    }
}

/// A sparse mapping from vertices to values for a single property name.
///
/// Iteration order is unspecified; callers that need a deterministic order
/// should drive iteration from a tree traversal instead.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    values: HashMap<VertexId, Value>,
}

impl PropertyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value recorded for `vertex`, if any.
    #[must_use]
    pub fn get(&self, vertex: VertexId) -> Option<&Value> {
        self.values.get(&vertex)
    }

    /// Records `value` for `vertex`, returning any previous value.
    pub fn insert(&mut self, vertex: VertexId, value: Value) -> Option<Value> {
        self.values.insert(vertex, value)
    }

    /// Removes and returns the value recorded for `vertex`, if any.
    pub fn remove(&mut self, vertex: VertexId) -> Option<Value> {
        self.values.remove(&vertex)
    }

    /// Returns `true` if a value is recorded for `vertex`.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.values.contains_key(&vertex)
    }

    /// Number of vertices with a recorded value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no vertex has a recorded value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(vertex, value)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Value)> {
        self.values.iter().map(|(v, value)| (*v, value))
    }
}

/// The set of property maps owned by a tree, keyed by property name.
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    maps: BTreeMap<String, PropertyMap>,
}

impl PropertyStore {
    /// Creates an empty store with no declared properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`, creating an empty map if it is new, and returns it.
    pub fn declare(&mut self, name: &str) -> &mut PropertyMap {
        self.maps.entry(String::from(name)).or_default()
    }

    /// Iterates over the declared property names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    /// Returns the map for `name`, if declared.
    #[must_use]
    pub fn map(&self, name: &str) -> Option<&PropertyMap> {
        self.maps.get(name)
    }

    /// Returns the map for `name` mutably, if declared.
    pub fn map_mut(&mut self, name: &str) -> Option<&mut PropertyMap> {
        self.maps.get_mut(name)
    }

    /// Records `value` for `vertex` under `name`, declaring `name` if needed.
    pub fn set(&mut self, name: &str, vertex: VertexId, value: Value) -> Option<Value> {
        self.declare(name).insert(vertex, value)
    }

    /// Returns the value recorded for `vertex` under `name`, if any.
    #[must_use]
    pub fn value(&self, name: &str, vertex: VertexId) -> Option<&Value> {
        self.maps.get(name).and_then(|m| m.get(vertex))
    }

    /// Removes the value recorded for `vertex` under `name`, if any.
    pub fn remove(&mut self, name: &str, vertex: VertexId) -> Option<Value> {
        self.maps.get_mut(name).and_then(|m| m.remove(vertex))
    }

    /// Removes `vertex` from every declared map.
    ///
    /// Called by the tree when a vertex is destroyed; declared names stay
    /// declared even when their maps become empty.
    pub fn purge(&mut self, vertex: VertexId) {
        for map in self.maps.values_mut() {
            map.remove(vertex);
        }
    }

    /// Copies every value recorded for `from` into `target` under `to`.
    ///
    /// Used by subtree extraction and graph merging, which renumber vertices
    /// while preserving their property values.
    pub fn copy_vertex_into(&self, from: VertexId, target: &mut Self, to: VertexId) {
        for (name, map) in &self.maps {
            if let Some(value) = map.get(from) {
                target.set(name, to, value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn sparse_per_name_maps() {
        let mut store = PropertyStore::new();
        let a = VertexId::new(1);
        let b = VertexId::new(2);

        store.set("diameter", a, Value::Real(2.5));
        store.set("nleaf", b, Value::Int(3));

        assert_eq!(store.value("diameter", a), Some(&Value::Real(2.5)));
        assert_eq!(store.value("diameter", b), None);
        assert_eq!(store.value("nleaf", b), Some(&Value::Int(3)));

        let names: Vec<_> = store.names().collect();
        assert_eq!(names, ["diameter", "nleaf"]);
    }

    #[test]
    fn purge_removes_across_maps() {
        let mut store = PropertyStore::new();
        let a = VertexId::new(1);
        store.set("diameter", a, Value::Real(2.5));
        store.set("nleaf", a, Value::Int(3));

        store.purge(a);
        assert_eq!(store.value("diameter", a), None);
        assert_eq!(store.value("nleaf", a), None);
        // Declared names survive a purge.
        assert_eq!(store.names().count(), 2);
    }

    #[test]
    fn copy_vertex_preserves_values() {
        let mut store = PropertyStore::new();
        let a = VertexId::new(1);
        store.set("label", a, Value::Text("I1".into()));
        store.set(
            "date",
            a,
            Value::Date(Date {
                year: 1998,
                month: 6,
                day: 12,
            }),
        );

        let mut target = PropertyStore::new();
        let b = VertexId::new(7);
        store.copy_vertex_into(a, &mut target, b);

        assert_eq!(target.value("label", b), Some(&Value::Text("I1".into())));
        assert_eq!(
            target.value("date", b).and_then(|v| v.as_date()),
            Some(Date {
                year: 1998,
                month: 6,
                day: 12
            })
        );
    }
}
