// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! CLI tests for option parsing
//!
//! These tests verify flag parsing and how flags combine with presets into
//! engine options.

use clap::Parser;
use logdigest::config::{Config, FormatArg, KindArg, PresetArg};
use logdigest_core::{InputKind, OutputFormat};
use tracing::Level;

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["logdigest"];
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).expect("parse should succeed")
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_positional_input() {
    let config = parse(&["build.log"]);
    assert_eq!(
        config.input_path().map(|p| p.to_string_lossy().into_owned()),
        Some("build.log".to_string())
    );
}

#[test]
fn test_dash_input_reads_stdin() {
    let config = parse(&["-"]);
    assert!(config.input_path().is_none());
}

#[test]
fn test_two_inputs_rejected() {
    let result = Config::try_parse_from(["logdigest", "a.log", "b.log"]);
    assert!(result.is_err());
}

// ============================================================================
// --kind / --format / --preset
// ============================================================================

#[test]
fn test_kind_values() {
    assert_eq!(parse(&[]).kind, KindArg::Auto);
    assert_eq!(parse(&["--kind", "build-log"]).kind, KindArg::BuildLog);
    assert_eq!(
        parse(&["--kind", "test-results"]).forced_kind(),
        Some(InputKind::TestResults)
    );
}

#[test]
fn test_invalid_kind_rejected() {
    let result = Config::try_parse_from(["logdigest", "--kind", "junit"]);
    assert!(result.is_err());
}

#[test]
fn test_format_minimal() {
    let config = parse(&["--format", "minimal"]);
    assert_eq!(config.format, FormatArg::Minimal);
    assert_eq!(
        config.filter_options(InputKind::BuildLog).format,
        OutputFormat::Minimal
    );
}

#[test]
fn test_preset_assistant() {
    let config = parse(&["--preset", "assistant"]);
    assert_eq!(config.preset, PresetArg::Assistant);
    let options = config.filter_options(InputKind::TestResults);
    assert_eq!(options.context_lines, 10);
    assert_eq!(options.max_errors, 20);
}

// ============================================================================
// Caps, context and filters
// ============================================================================

#[test]
fn test_explicit_caps_override_preset() {
    let config = parse(&["--preset", "assistant", "--max-errors", "5", "--context", "2"]);
    let options = config.filter_options(InputKind::BuildLog);
    assert_eq!(options.max_errors, 5);
    assert_eq!(options.context_lines, 2);
    assert_eq!(options.max_warnings, 20);
}

#[test]
fn test_negative_cap_rejected() {
    let result = Config::try_parse_from(["logdigest", "--max-errors", "-1"]);
    assert!(result.is_err());
}

#[test]
fn test_repeatable_file_filter() {
    let config = parse(&["--file", "Widget.cpp", "--file", "Gadget"]);
    assert_eq!(config.files, vec!["Widget.cpp", "Gadget"]);
    let options = config.filter_options(InputKind::BuildLog);
    assert!(options.file_filters.matches("Gadget.h"));
    assert!(!options.file_filters.matches("Other.cs"));
}

#[test]
fn test_section_toggles() {
    let config = parse(&["--no-warnings", "--no-stack-traces", "--no-output"]);
    let options = config.filter_options(InputKind::TestResults);
    assert!(!options.show_warnings);
    assert!(!options.show_stack_traces);
    assert!(!options.show_output);
}

// ============================================================================
// Output mode and logging
// ============================================================================

#[test]
fn test_json_conflicts_with_list_files() {
    let result = Config::try_parse_from(["logdigest", "--json", "--list-files"]);
    assert!(result.is_err());
}

#[test]
fn test_verbose_and_quiet() {
    assert_eq!(parse(&["-v"]).log_level(), Level::DEBUG);
    assert_eq!(parse(&["--quiet"]).log_level(), Level::WARN);
    // Verbose wins when both are given
    assert_eq!(parse(&["-v", "-q"]).log_level(), Level::DEBUG);
}
