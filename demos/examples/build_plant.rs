// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builds a small plant programmatically, queries it, and serializes it.
//!
//! Run with: `cargo run -p coppice_demos --example build_plant`

use coppice_codec::write_mtg;
use coppice_mtg::{EdgeKind, MtgGraph, VertexData};

fn entity(label: String, edge: Option<EdgeKind>) -> VertexData {
    VertexData {
        label: Some(label),
        edge,
        ..VertexData::new()
    }
}

fn main() {
    let mut g = MtgGraph::new();
    let plant = g
        .add_component(g.root(), entity("P1".into(), Some(EdgeKind::Decomposition)))
        .unwrap();

    // A ten-internode trunk with a lateral shoot halfway up.
    let mut tip = g
        .add_component(plant, entity("I1".into(), Some(EdgeKind::Decomposition)))
        .unwrap();
    let first = tip;
    let mut halfway = tip;
    for index in 2..=10 {
        tip = g
            .add_child(tip, entity(format!("I{index}"), Some(EdgeKind::Successor)))
            .unwrap();
        if index == 5 {
            halfway = tip;
        }
    }
    let mut side = g
        .add_child(halfway, entity("J1".into(), Some(EdgeKind::Branch)))
        .unwrap();
    for index in 2..=3 {
        side = g
            .add_child(side, entity(format!("J{index}"), Some(EdgeKind::Successor)))
            .unwrap();
    }

    println!("trunk height: {:?}", g.height(tip));
    println!("lateral order: {:?}", g.order(side));
    println!("lateral rank:  {:?}", g.rank(side));

    let trunk: Vec<_> = g
        .axis(first)
        .filter_map(|v| g.label(v).map(String::from))
        .collect();
    println!("trunk axis: {}", trunk.join(" < "));

    println!("--- serialized ---");
    print!("{}", write_mtg(&g, &[]));
}
