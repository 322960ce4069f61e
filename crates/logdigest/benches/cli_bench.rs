// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

use std::path::Path;

use clap::Parser;
use criterion::{Criterion, criterion_group, criterion_main};
use logdigest::app;
use logdigest::config::Config;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../logdigest-core/tests/fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("Failed to read fixture")
}

fn run_benchmarks(c: &mut Criterion) {
    let log = fixture("msbuild.log");
    let xml = fixture("nunit-failures.xml");

    let mut group = c.benchmark_group("run");

    for (label, args) in [
        ("text", vec!["logdigest"]),
        ("json", vec!["logdigest", "--json"]),
        ("assistant", vec!["logdigest", "--preset", "assistant"]),
    ] {
        let config = Config::try_parse_from(args).expect("parse should succeed");
        group.bench_function(format!("build_log_{label}"), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                app::run(&config, log.as_bytes(), &mut out).expect("run failed");
                out
            })
        });
        group.bench_function(format!("test_results_{label}"), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                app::run(&config, xml.as_bytes(), &mut out).expect("run failed");
                out
            })
        });
    }

    group.finish();
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
