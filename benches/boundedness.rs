//! Benchmarks for the boundedness search
//!
//! Nets are generated with a size parameter so the cost of the search can be followed as the
//! reachability graph grows, plus the sample nets shipped in `nets/`.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pnbound::{BoundednessAnalysis, Net, analyse_all, read_file};
use std::path::Path;

/// Sample net files available for benchmarking
const NET_FILES: &[(&str, &str)] = &[
    ("buffer", "nets/buffer.pn"),
    ("counter", "nets/counter.pn"),
    ("mutex", "nets/mutex.pn"),
    ("pump", "nets/pump.pn"),
];

/// `tokens` tokens circulating on a ring of `size` places, bounded.
fn token_ring(size: usize, tokens: usize) -> Net {
    let mut net = Net::new();
    for i in 0..size {
        net.add_place(&format!("r{}", i)).unwrap();
        net.add_transition(&format!("t{}", i)).unwrap();
    }
    for i in 0..size {
        net.add_arc(&format!("in{}", i), &format!("r{}", i), &format!("t{}", i))
            .unwrap();
        net.add_arc(
            &format!("out{}", i),
            &format!("t{}", i),
            &format!("r{}", (i + 1) % size),
        )
        .unwrap();
    }
    net.set_tokens("r0", tokens).unwrap();
    net
}

/// A single token walking a chain of `length` places; the last step also drops a token in
/// `sink`, so the net is unbounded with a witness path of `length` firings.
fn leaky_chain(length: usize) -> Net {
    let mut net = Net::new();
    net.add_place("sink").unwrap();
    for i in 0..length {
        net.add_place(&format!("c{}", i)).unwrap();
        net.add_transition(&format!("t{}", i)).unwrap();
    }
    for i in 0..length {
        net.add_arc(&format!("in{}", i), &format!("c{}", i), &format!("t{}", i))
            .unwrap();
        net.add_arc(
            &format!("out{}", i),
            &format!("t{}", i),
            &format!("c{}", (i + 1) % length),
        )
        .unwrap();
    }
    net.add_arc("leak", &format!("t{}", length - 1), "sink")
        .unwrap();
    net.set_tokens("c0", 1).unwrap();
    net
}

/// Benchmark the search on bounded rings of growing size
fn bench_bounded(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_ring");

    for &(size, tokens) in &[(4, 2), (6, 3), (8, 3), (8, 4)] {
        let net = token_ring(size, tokens);
        let markings = BoundednessAnalysis::run(&net).graph().node_count();
        group.throughput(Throughput::Elements(markings as u64));

        group.bench_with_input(
            BenchmarkId::new("ring", format!("{}x{}", size, tokens)),
            &net,
            |b, net| b.iter(|| black_box(BoundednessAnalysis::run(black_box(net)))),
        );
    }

    group.finish();
}

/// Benchmark the search on unbounded chains whose witness is found late
fn bench_unbounded(c: &mut Criterion) {
    let mut group = c.benchmark_group("unbounded_chain");

    for &length in &[4, 16, 64] {
        let net = leaky_chain(length);
        group.bench_with_input(BenchmarkId::new("chain", length), &net, |b, net| {
            b.iter(|| black_box(BoundednessAnalysis::run(black_box(net))))
        });
    }

    group.finish();
}

/// Benchmark the sample nets, one by one and as a parallel batch
fn bench_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("samples");
    let mut nets = Vec::new();

    for &(name, file_path) in NET_FILES {
        let net = match read_file(Path::new(file_path)) {
            Ok(net) => net,
            Err(e) => {
                eprintln!(
                    "Warning: Could not load {}: {}. Skipping benchmark.",
                    file_path, e
                );
                continue;
            }
        };

        group.bench_with_input(BenchmarkId::new("analyse", name), &net, |b, net| {
            b.iter(|| black_box(BoundednessAnalysis::run(black_box(net))))
        });
        nets.push(net);
    }

    group.bench_function("batch", |b| b.iter(|| black_box(analyse_all(black_box(&nets)))));

    group.finish();
}

criterion_group!(benches, bench_bounded, bench_unbounded, bench_samples);
criterion_main!(benches);
