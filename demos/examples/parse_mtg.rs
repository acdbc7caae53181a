// Copyright 2026 the Coppice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parses an embedded MTG file and reports what was read.
//!
//! Run with: `cargo run -p coppice_demos --example parse_mtg`

use coppice_codec::read_mtg;

const SAMPLE: &str = "\
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

FEATURES:
NAME\tTYPE
diameter\tREAL
nleaf\tINT

MTG:
ENTITY-CODE\tdiameter\tnleaf
/P1/A1/I1<I2\t2.1\t4
\t+A2/I3<I4\t1.2
\t\t+A3/I5\t0.8\t2
";

fn main() {
    let parsed = read_mtg(SAMPLE);
    let g = &parsed.graph;

    println!("parsed {} vertices over scales 0..={}", g.len(), g.max_scale());
    for scale in g.scales() {
        let count = g.vertices_at_scale(scale).count();
        let roots = g.roots_at_scale(scale).count();
        println!("  scale {scale}: {count} vertices, {roots} root(s)");
    }

    for warning in &parsed.warnings {
        println!("warning: {warning}");
    }

    // Walk every scale in the order the file was written in.
    print!("cross-scale order:");
    for v in g.iter_cross_scale(g.root()) {
        if let Some(label) = g.label(v) {
            print!(" {label}");
        }
    }
    println!();

    // Diameter of each internode, read back from the property store.
    if let Some(map) = g.properties().map("diameter") {
        let mut labelled: Vec<_> = map
            .iter()
            .filter_map(|(v, value)| g.label(v).map(|l| (l, value)))
            .collect();
        labelled.sort_by_key(|&(label, _)| label);
        for (label, value) in labelled {
            println!("diameter({label}) = {value}");
        }
    }
}
