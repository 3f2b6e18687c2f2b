//! Benchmarks for single-snippet analysis.
//!
//! Measures the full pipeline (parse, inference, detectors, summary) on
//! snippets of increasing size, and the front end on its own.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snippetscope::frontend::parse_snippet;
use snippetscope::{analyze, Dialect};
use std::hint::black_box;

const BLOCK: &str = r#"
var total = 0;
const items = [1, 2, 3];
for (let i = 0; i <= items.length; i++) {
  total += items[i];
}
const settings = { theme: { dark: false } };
const copy = { ...settings };
copy.theme.dark = true;
items.forEach(async item => {
  await fetch('/api/' + item).then(r => r.json());
});
try { JSON.parse(data); } catch (e) {}
"#;

const COMPONENT: &str = r#"
import React, { useState, useEffect } from 'react';
function TodoList({ items }) {
  const [count, setCount] = useState(0);
  useEffect(() => { document.title = `${count}`; });
  return <ul>{items.map((item, i) => <li key={i}>{item}</li>)}{count && <b />}</ul>;
}
"#;

fn snippet_of(blocks: usize) -> String {
    BLOCK.repeat(blocks)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    for blocks in [1, 10, 50] {
        let code = snippet_of(blocks);
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &code, |b, code| {
            b.iter(|| analyze(black_box(code), None))
        });
    }
    group.finish();

    c.bench_function("analyze_component", |b| {
        b.iter(|| analyze(black_box(COMPONENT), Some(Dialect::Jsx)))
    });
}

fn bench_front_end(c: &mut Criterion) {
    let code = snippet_of(10);
    c.bench_function("parse_snippet_no_hint", |b| {
        b.iter(|| parse_snippet(black_box(&code), None))
    });
    c.bench_function("parse_snippet_hinted", |b| {
        b.iter(|| parse_snippet(black_box(&code), Some(Dialect::JavaScript)))
    });
}

criterion_group!(benches, bench_analyze, bench_front_end);
criterion_main!(benches);
