//! Performance benchmarks for the GDScript parser.
//!
//! This benchmark suite measures parsing performance across different workloads:
//! - Real-world: the scripts under `test_scripts/`
//! - Size-based: one script repeated until it reaches a few thousand lines
//! - Entry points: whole files vs single expressions
//! - Printing: turning a parsed tree back into text

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gdscript::{ClassMembers, Parser, SyntaxNode};
use std::hint::black_box;

const PLAYER: &str = include_str!("../test_scripts/player.gd");
const CONTROL_FLOW: &str = include_str!("../test_scripts/control_flow.gd");
const LEGACY: &str = include_str!("../test_scripts/legacy.gd");

/// Benchmark parsing of the bundled scripts
fn real_world_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/real_world");
    let parser = Parser::new();

    for (name, source) in [
        ("player", PLAYER),
        ("control_flow", CONTROL_FLOW),
        ("legacy", LEGACY),
    ] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let class = parser.parse(black_box(source)).unwrap();
                black_box(class.members().count())
            });
        });
    }

    group.finish();
}

/// Benchmark parsing performance as files grow
fn size_based_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/file_sizes");
    let parser = Parser::new();

    // Repeating the body of a script keeps every copy a valid sibling member.
    for copies in [1usize, 10, 50] {
        let source = CONTROL_FLOW.repeat(copies);
        let lines = source.lines().count();
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(format!("{lines}_lines"), |b| {
            b.iter(|| {
                let class = parser.parse(black_box(&source)).unwrap();
                black_box(class.methods().count())
            });
        });
    }

    group.finish();
}

/// Benchmark the expression entry point on operator-heavy input
fn expression_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/expressions");
    let parser = Parser::new();

    let chain = "a + b * c - d / e % f ** g and not h or i in j";
    group.bench_function("operator_chain", |b| {
        b.iter(|| black_box(parser.parse_expression(black_box(chain)).unwrap()));
    });

    let nested = "[{\"a\": [1, 2, {\"b\": (3 + 4) * 5}]}, $Node/Path, %Unique, f(g(h(i)))]";
    group.bench_function("nested_literals", |b| {
        b.iter(|| black_box(parser.parse_expression(black_box(nested)).unwrap()));
    });

    group.finish();
}

/// Benchmark printing a tree back to source
fn print_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/print");
    let class = Parser::new().parse(PLAYER).unwrap();

    group.throughput(Throughput::Bytes(PLAYER.len() as u64));
    group.bench_function("player", |b| {
        b.iter(|| black_box(class.to_source()));
    });

    group.finish();
}

criterion_group!(
    benches,
    real_world_benchmarks,
    size_based_benchmarks,
    expression_benchmarks,
    print_benchmarks
);

criterion_main!(benches);
