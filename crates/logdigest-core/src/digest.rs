// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! Single entry point: detect, extract, render
//!
//! Every call owns its own scan state; nothing is shared between calls, so
//! digests can run concurrently from any number of threads.

use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::build_log::{BuildLogResult, extract_build_log};
use crate::detect::{InputKind, classify_input_kind};
use crate::error::DigestError;
use crate::options::FilterOptions;
use crate::render::{Report, render_report};
use crate::test_results::{TestResultsResult, extract_test_results};

/// Structured output of either pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Errors and warnings from a build log
    BuildLog(BuildLogResult),
    /// Failed tests from a test-result document
    TestResults(TestResultsResult),
}

impl Extraction {
    /// Which pipeline produced this
    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self {
            Self::BuildLog(_) => InputKind::BuildLog,
            Self::TestResults(_) => InputKind::TestResults,
        }
    }

    /// Unfiltered file names discovered during extraction
    #[must_use]
    pub fn files(&self) -> &BTreeSet<String> {
        match self {
            Self::BuildLog(result) => &result.files,
            Self::TestResults(result) => &result.files,
        }
    }
}

/// Extraction result together with its rendered report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// Structured result
    #[serde(flatten)]
    pub extraction: Extraction,
    /// Rendered report and summary
    pub report: Report,
}

impl Digest {
    /// Which pipeline produced this digest
    #[must_use]
    pub fn kind(&self) -> InputKind {
        self.extraction.kind()
    }

    /// The rendered report
    #[must_use]
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Unfiltered file names discovered during extraction
    #[must_use]
    pub fn files(&self) -> &BTreeSet<String> {
        self.extraction.files()
    }
}

/// Run the pipeline for a known kind, without rendering
#[must_use]
pub fn extract(text: &str, kind: InputKind, options: &FilterOptions) -> Extraction {
    match kind {
        InputKind::BuildLog => Extraction::BuildLog(extract_build_log(text, options)),
        InputKind::TestResults => Extraction::TestResults(extract_test_results(text, options)),
    }
}

/// Detect the input kind, extract and render
#[must_use]
pub fn digest(text: &str, options: &FilterOptions) -> Digest {
    digest_as(text, classify_input_kind(text), options)
}

/// Extract and render with the input kind forced
#[must_use]
pub fn digest_as(text: &str, kind: InputKind, options: &FilterOptions) -> Digest {
    debug!(kind = kind.label(), format = ?options.format, "digesting input");
    let extraction = extract(text, kind, options);
    let report = render_report(&extraction, options);
    Digest { extraction, report }
}

/// Read all of `reader`, then [`digest`] it
///
/// # Errors
///
/// Returns `DigestError::Io` if reading fails and `DigestError::InvalidUtf8`
/// if the bytes are not UTF-8.
pub fn digest_reader<R: Read>(
    mut reader: R,
    options: &FilterOptions,
) -> Result<Digest, DigestError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = String::from_utf8(bytes)?;
    Ok(digest(&text, options))
}
