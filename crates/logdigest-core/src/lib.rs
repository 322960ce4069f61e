// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! logdigest-core: condensing engine for build logs and NUnit test results
//!
//! This library crate reduces free-form compiler/linker output and NUnit-style
//! test-result XML to a compact summary holding only errors, warnings, and
//! failed test details, rendered as markdown for an AI assistant.
//!
//! # Example
//!
//! ```
//! use logdigest_core::{FilterOptions, InputKind, classify_input_kind, digest};
//!
//! let log = "ok\nerror C2065: 'x': undeclared identifier\n";
//! assert_eq!(classify_input_kind(log), InputKind::BuildLog);
//!
//! let digest = digest(log, &FilterOptions::default());
//! assert!(digest.report().text.contains("error C2065"));
//! ```

pub mod build_log;
pub mod detect;
pub mod digest;
pub mod error;
pub mod filter;
pub mod options;
pub mod patterns;
pub mod render;
pub mod test_results;

pub use build_log::{
    BuildLogResult, Diagnostic, ErrorRecord, Severity, WarningRecord, extract_build_log,
};
pub use detect::{InputKind, classify_input_kind};
pub use digest::{Digest, Extraction, digest, digest_as, digest_reader, extract};
pub use error::DigestError;
pub use filter::FileFilter;
pub use options::{FilterOptions, OutputFormat, Preset};
pub use render::{
    BuildLogSummary, Report, Summary, TestResultsSummary, render_build_log, render_report,
    render_test_results,
};
pub use test_results::{
    CountsSource, FailedTest, TestCounts, TestResultsResult, extract_test_results,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::detect::{InputKind, classify_input_kind};
    pub use crate::digest::{Digest, digest};
    pub use crate::error::DigestError;
    pub use crate::options::{FilterOptions, OutputFormat};
    pub use crate::render::Report;
}
