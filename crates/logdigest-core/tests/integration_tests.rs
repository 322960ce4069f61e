// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! Integration tests for logdigest-core
//!
//! These tests run the full detect/extract/render pipeline over realistic
//! MSBuild logs and NUnit 3 result files.

use std::path::{Path, PathBuf};

use logdigest_core::{
    CountsSource, Extraction, FilterOptions, InputKind, OutputFormat, Preset, Summary, digest,
    extract_build_log, extract_test_results,
};
use similar_asserts::assert_eq;

/// Get the fixtures directory for test data
fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {name}: {e}"))
}

// ============================================================================
// Build logs
// ============================================================================

#[test]
fn test_msbuild_log_counts_match_msbuild_totals() {
    let log = fixture("msbuild.log");
    let result = extract_build_log(&log, &FilterOptions::default());

    // MSBuild's own footer reports 7 errors and 3 warnings.
    assert_eq!(result.error_count, 7);
    assert_eq!(result.warning_count, 3);
    assert_eq!(result.errors.len(), 7);
    assert_eq!(
        result.files.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Exporter.cs", "Mesh.cpp", "Mesh.h", "Renderer.cpp"]
    );
}

#[test]
fn test_msbuild_log_footer_and_progress_lines_are_noise() {
    let log = fixture("msbuild.log");
    let digest = digest(&log, &FilterOptions::default());
    let text = &digest.report.text;

    assert!(!text.contains("Build FAILED."));
    assert!(!text.contains("7 Error(s)"));
    assert!(!text.contains("-- FAILED."));
    assert!(text.contains("error C2065: 'frameIndex': undeclared identifier"));
    assert!(text.contains("error LNK2019: unresolved external symbol"));
}

#[test]
fn test_msbuild_log_file_filter() {
    let log = fixture("msbuild.log");
    let opts = FilterOptions::default().with_file_filters(["Mesh"]);
    let result = extract_build_log(&log, &opts);

    assert_eq!(result.error_count, 2);
    assert_eq!(result.warning_count, 1);
    for record in result.errors.iter().chain(&result.warnings) {
        let file = record.file.as_deref().expect("filtered records carry a file");
        assert!(file.contains("Mesh"), "{file}");
    }
    // The candidate list is unaffected by the filter.
    assert_eq!(result.files.len(), 4);
}

#[test]
fn test_msbuild_log_assistant_preset_context() {
    let log = fixture("msbuild.log");
    let opts = FilterOptions::from_preset(Preset::Assistant, InputKind::BuildLog);
    let result = extract_build_log(&log, &opts);

    let first = &result.errors[0];
    assert_eq!(first.line_number, 9);
    assert_eq!(first.context.len(), 8);
    assert_eq!(first.context.last().map(String::as_str), Some("  Renderer.cpp"));

    let last = result.errors.last().expect("has errors");
    assert_eq!(last.context.len(), 10);
}

#[test]
fn test_msbuild_log_minimal_report() {
    let log = fixture("msbuild.log");
    let opts = FilterOptions::default().with_format(OutputFormat::Minimal);
    let report = digest(&log, &opts).report;

    let lines: Vec<&str> = report.text.lines().collect();
    assert_eq!(lines[0], "=== ERRORS ===");
    assert_eq!(lines[8], "=== WARNINGS ===");
    assert_eq!(lines.len(), 12);
    assert!(!report.text.contains("```"));
}

// ============================================================================
// Test results
// ============================================================================

#[test]
fn test_nunit_failures_fixture() {
    let xml = fixture("nunit-failures.xml");
    let digest = digest(&xml, &FilterOptions::default());
    assert_eq!(digest.kind(), InputKind::TestResults);

    let Extraction::TestResults(result) = &digest.extraction else {
        panic!("expected test results");
    };
    let names: Vec<&str> = result.failed_tests.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Divides", "Rounds"]);

    let divides = &result.failed_tests[0];
    assert_eq!(
        divides.message,
        "System.DivideByZeroException : Attempted to divide by zero."
    );
    assert!(divides.stack_trace.starts_with("   at Engine.Math.Calc.Divide"));
    assert!(divides.stack_trace.ends_with("MathTests.cs:line 44"));
    assert_eq!(divides.console_output, "dividing 10 by 0");

    // Multi-line CDATA message, assertion duplicate ignored
    assert_eq!(
        result.failed_tests[1].message,
        "  Expected: 3\n  But was:  2\n  at index 4"
    );

    assert_eq!(
        digest.files().iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Calc.cs", "MathTests.cs"]
    );
}

#[test]
fn test_nunit_failures_summary() {
    let xml = fixture("nunit-failures.xml");
    let report = digest(&xml, &FilterOptions::default()).report;

    let Summary::TestResults(summary) = &report.summary else {
        panic!("expected test results summary");
    };
    assert_eq!(summary.total_tests, 5);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.declared_failed, Some(2));
    assert_eq!(summary.counts_source, CountsSource::Declared);
    assert!(
        report
            .text
            .contains("**Total:** 5 | **Passed:** 2 | **Failed:** 2 | **Skipped:** 1")
    );
    assert!(!report.text.contains("Disabled on CI"));
}

#[test]
fn test_nunit_noise_suppression_discrepancy() {
    let xml = fixture("nunit-noise.xml");
    let result = extract_test_results(&xml, &FilterOptions::default());

    assert!(result.failed_tests.is_empty());
    assert_eq!(result.suppressed_count, 1);
    assert_eq!(result.declared.map(|c| c.failed), Some(1));

    let report = digest(&xml, &FilterOptions::default()).report;
    assert!(report.text.contains("All tests passed."));
    let Summary::TestResults(summary) = &report.summary else {
        panic!("expected test results summary");
    };
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.declared_failed, Some(1));
}

#[test]
fn test_nunit_truncated_document() {
    let xml = fixture("nunit-truncated.xml");
    let result = extract_test_results(&xml, &FilterOptions::default());

    assert_eq!(result.failed_tests.len(), 1);
    let test = &result.failed_tests[0];
    assert_eq!(test.message, "Stream closed early");
    assert_eq!(test.stack_trace.lines().count(), 2);
    assert_eq!(
        result.files.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Stream.cs", "StreamTests.cs"]
    );
}

#[test]
fn test_nunit_file_filter_and_hidden_sections() {
    let xml = fixture("nunit-failures.xml");
    let opts = FilterOptions {
        show_stack_traces: false,
        show_output: false,
        ..FilterOptions::default().with_file_filters(["Calc.cs"])
    };
    let report = digest(&xml, &opts).report;

    assert!(report.text.contains("### 1. Divides"));
    assert!(!report.text.contains("Rounds"));
    assert!(!report.text.contains("**Stack trace:**"));
    assert!(!report.text.contains("dividing 10 by 0"));
}

// ============================================================================
// Minimal end-to-end inputs
// ============================================================================

#[test]
fn test_scenario_build_log() {
    let log = "ok\nerror C2065: 'x': undeclared identifier\nwarning C4101: 'y': unreferenced\n";
    let report = digest(log, &FilterOptions::default()).report;

    let Summary::BuildLog(summary) = &report.summary else {
        panic!("expected build log summary");
    };
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.warning_count, 1);
    assert!(report.text.contains("error C2065: 'x': undeclared identifier"));
    assert!(report.text.contains("warning C4101: 'y': unreferenced"));
    assert!(!report.text.lines().any(|l| l.trim() == "ok" || l.ends_with(" ok")));
}

#[test]
fn test_scenario_test_results() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<test-run id="1" testcasecount="1" total="1" passed="0" failed="1" skipped="0">
  <test-case id="1" name="ReturnsOne" fullname="Demo.ReturnsOne" result="Failed">
    <failure>
      <message><![CDATA[Expected 1 but was 0]]></message>
    </failure>
  </test-case>
</test-run>"#;
    let report = digest(xml, &FilterOptions::default()).report;

    let Summary::TestResults(summary) = &report.summary else {
        panic!("expected test results summary");
    };
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures_shown, 1);
    assert!(report.text.contains("ReturnsOne"));
    assert!(report.text.contains("```text\nExpected 1 but was 0\n```"));
}
