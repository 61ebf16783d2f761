//! Performance benchmarks for the pure parts of a probe session
//!
//! Classification, statistics, suggestion building and formatting run once
//! per attempt or once per session; none of them should be visible next to
//! a network round trip.

use clap::Parser;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use netprobe_doctor::{
    classify,
    cli::Cli,
    diagnostics::build_suggestions,
    stats::analyze,
    types::ErrorKind,
    Config, Fault, FaultCode, OutputFormatter, OutputFormatterFactory, ProbeResult, ProbeTarget,
};
use std::hint::black_box;
use std::io;
use std::time::Duration;

/// Mixed session: mostly successes with a spread of failure kinds
fn create_sample_results(count: usize) -> Vec<ProbeResult> {
    (0..count)
        .map(|i| match i % 10 {
            0 => ProbeResult::failure("bench.example", ErrorKind::Timeout, "connect timeout after 5000ms"),
            5 => ProbeResult::failure("bench.example", ErrorKind::HostNotFound, "host lookup failed"),
            _ => ProbeResult::success("bench.example", Duration::from_millis(10 + (i as u64 % 90))),
        })
        .collect()
}

fn sample_faults() -> Vec<Fault> {
    vec![
        Fault::new(Some(FaultCode::Os(111)), "Connection refused (os error 111)"),
        Fault::new(Some(FaultCode::Io(io::ErrorKind::TimedOut)), "timed out"),
        Fault::elapsed("connect", Duration::from_secs(5)),
        Fault::resolution("no-such-host.invalid", "failed to lookup address information"),
        Fault::from_message("Network is unreachable"),
        Fault::from_message("something nobody has seen before"),
    ]
}

fn benchmark_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    let faults = sample_faults();

    group.bench_function("classify_mixed_faults", |b| {
        b.iter(|| {
            for fault in &faults {
                black_box(classify(black_box(fault)));
            }
        });
    });

    // Message-only faults take the slowest path
    let message_only = Fault::from_message("Operation not permitted while sending probe");
    group.bench_function("classify_message_only", |b| {
        b.iter(|| black_box(classify(black_box(&message_only))));
    });

    group.finish();
}

fn benchmark_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [10, 100, 1000].iter() {
        let results = create_sample_results(*size);
        group.bench_with_input(BenchmarkId::new("analyze", size), size, |b, _| {
            b.iter(|| black_box(analyze(black_box(&results))));
        });
    }

    group.finish();
}

fn benchmark_diagnosis(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnosis");

    group.bench_function("build_suggestions", |b| {
        b.iter(|| {
            for kind in [ErrorKind::Timeout, ErrorKind::HostNotFound, ErrorKind::PermissionDenied] {
                black_box(build_suggestions(kind, false, true, false));
            }
        });
    });

    group.finish();
}

fn benchmark_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");
    let formatter = OutputFormatterFactory::create_plain_formatter();
    let results = create_sample_results(100);
    let stats = analyze(&results);
    let target = ProbeTarget::new("bench.example");

    group.bench_function("format_attempts", |b| {
        b.iter(|| {
            for (i, result) in results.iter().enumerate() {
                black_box(formatter.format_attempt(i as u32 + 1, result).ok());
            }
        });
    });

    group.bench_function("format_statistics", |b| {
        b.iter(|| black_box(formatter.format_statistics(&target, black_box(&stats)).ok()));
    });

    group.finish();
}

fn benchmark_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");
    let args = ["netdiag", "example.com", "-c", "10", "-t", "3", "--mode", "tcp"];

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| black_box(Cli::try_parse_from(black_box(args)).ok()));
    });

    let config = Config {
        target: "example.com".to_string(),
        ..Default::default()
    };
    group.bench_function("validate_config", |b| {
        b.iter(|| black_box(config.validate().is_ok()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_classification,
    benchmark_statistics,
    benchmark_diagnosis,
    benchmark_output,
    benchmark_config
);
criterion_main!(benches);
