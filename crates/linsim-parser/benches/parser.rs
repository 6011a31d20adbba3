//! Benchmarks for netlist parsing and flattening.

use std::fmt::Write;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use linsim_parser::parse;

/// A ladder of `stages` RC sections built from a two-level hierarchy.
fn ladder(stages: usize) -> String {
    let mut text = String::from(
        "* ladder\n\
         .subckt rc a b\nR1 a b 1k\nC1 b 0 1u\n.ends rc\n\
         .subckt pair p q\nX1 p m rc\nX2 m q rc\n.ends pair\n",
    );
    for i in 0..stages {
        let _ = writeln!(text, "X{i} n{i} n{} pair", i + 1);
    }
    text.push_str(".ic V(n0)=10\n.tran 0 1m\n.end\n");
    text
}

fn bench_parse(c: &mut Criterion) {
    let text = ladder(500);
    c.bench_function("parse_ladder_500", |b| {
        b.iter(|| parse("ladder", black_box(&text)).unwrap());
    });
}

fn bench_flatten(c: &mut Criterion) {
    let netlist = parse("ladder", &ladder(500)).unwrap();
    c.bench_function("flatten_ladder_500", |b| {
        b.iter(|| {
            let mut flat = netlist.clone();
            flat.flatten().unwrap();
            flat
        });
    });
}

criterion_group!(benches, bench_parse, bench_flatten);
criterion_main!(benches);
