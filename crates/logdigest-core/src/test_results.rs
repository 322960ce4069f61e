// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! NUnit test-result extraction
//!
//! A best-effort lexical scanner over NUnit-style XML. It does not build a
//! document tree and tolerates malformed or truncated input: the scan is a
//! line-by-line state machine that only tracks whether it is inside a failed
//! test case and which payload section (message, stack trace, console
//! output) is being captured.
//!
//! ```text
//! Idle ──<test-case result="Failed">──▶ InFailedCase ──</test-case>──▶ Idle
//!                                         │    ▲
//!                     <message> / <stack-trace> / <output>
//!                                         ▼    │
//!                                      capturing (last opened wins)
//! ```
//!
//! Any number of test cases may open and close on one line, and a
//! `<test-case` tag may wrap across lines. A failed case is kept only when
//! it carries a message or a stack trace.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::filter::FileFilter;
use crate::options::FilterOptions;
use crate::patterns::stack_trace_files;

const TEST_CASE: &str = "test-case";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const FAILED: &str = "Failed";

/// Root element counts; all four attributes must appear in this order
static ROOT_COUNTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<test-run\b[^>]*?\btotal="(\d+)"[^>]*?\bpassed="(\d+)"[^>]*?\bfailed="(\d+)"[^>]*?\bskipped="(\d+)""#,
    )
    .expect("valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*"([^"]*)""#).expect("valid regex")
});

// ============================================================================
// Result Types
// ============================================================================

/// A failed test case with its diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTest {
    /// Value of the `name` attribute
    pub name: String,
    /// Value of the `fullname` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Failure message, empty if absent
    pub message: String,
    /// Stack trace, empty if absent
    pub stack_trace: String,
    /// Captured console output, empty if absent
    pub console_output: String,
}

impl FailedTest {
    /// Whether the record carries anything worth reporting
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.message.is_empty() || !self.stack_trace.is_empty()
    }

    fn field_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Message => &mut self.message,
            Section::StackTrace => &mut self.stack_trace,
            Section::Output => &mut self.console_output,
        }
    }
}

/// Test totals for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCounts {
    /// Total test cases
    pub total: usize,
    /// Passed test cases
    pub passed: usize,
    /// Failed test cases
    pub failed: usize,
    /// Skipped or ignored test cases
    pub skipped: usize,
}

/// Where the summary counts came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountsSource {
    /// The root `<test-run>` element's own attributes
    Declared,
    /// Tallied from the `<test-case>` elements seen during the scan
    Observed,
    /// Neither was available
    #[default]
    None,
}

/// Everything extracted from one test-result document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultsResult {
    /// Retained failed tests, at most `max_errors`
    pub failed_tests: Vec<FailedTest>,
    /// Unique `.cs` file names from every stack trace, ignoring filters
    pub files: BTreeSet<String>,
    /// Counts from the root element, if the combined pattern matched
    pub declared: Option<TestCounts>,
    /// Counts tallied from the test cases seen
    pub observed: TestCounts,
    /// Failed tests with diagnostics that passed the file filter, including
    /// those past the cap
    pub failed_count: usize,
    /// Failed tests dropped for carrying no message or stack trace
    pub suppressed_count: usize,
}

impl TestResultsResult {
    /// Counts for the summary header and their source
    ///
    /// Prefers the declared root counts, falling back to the observed ones
    /// when the root element is missing or its attributes are out of order.
    #[must_use]
    pub fn counts(&self) -> (TestCounts, CountsSource) {
        match self.declared {
            Some(declared) => (declared, CountsSource::Declared),
            None if self.observed.total > 0 => (self.observed, CountsSource::Observed),
            None => (TestCounts::default(), CountsSource::None),
        }
    }

    /// Whether more failed tests matched than were retained
    #[must_use]
    pub fn failures_truncated(&self) -> bool {
        self.failed_count > self.failed_tests.len()
    }
}

// ============================================================================
// Scanner State
// ============================================================================

/// Payload sections of a failed test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Message,
    StackTrace,
    Output,
}

impl Section {
    const ALL: [Section; 3] = [Section::Message, Section::StackTrace, Section::Output];

    fn tag(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::StackTrace => "stack-trace",
            Self::Output => "output",
        }
    }

    /// Section whose opening tag starts `markup`
    fn opened_by(markup: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| opens_element(markup, section.tag()))
    }
}

/// An active capture inside a failed case
#[derive(Debug)]
struct Capture {
    /// Element that opened the capture; `None` for a stray CDATA section
    element: Option<Section>,
    /// Whether captured text is stored; false for repeated sections
    keep: bool,
    /// Inside `<![CDATA[ ... ]]>`
    in_cdata: bool,
    /// Capture has already consumed at least one earlier line
    continued: bool,
    /// Current stack-trace line, kept or not, for file discovery
    frame: String,
}

impl Capture {
    fn new(element: Option<Section>, keep: bool, in_cdata: bool) -> Self {
        Self {
            element,
            keep,
            in_cdata,
            continued: false,
            frame: String::new(),
        }
    }
}

#[derive(Debug)]
enum ScanState {
    Idle,
    /// A `<test-case` open tag that has not reached its `>` yet
    InCaseTag(Box<PendingTag>),
    InFailedCase(Box<CaseScan>),
}

#[derive(Debug)]
struct PendingTag {
    indent: usize,
    tag: String,
}

/// What a line did to the current failed case
///
/// Offsets are byte positions in the text handed to the case, where idle
/// scanning resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseStep {
    Continue,
    /// The case closed; the rest of the text starts at the offset
    Close(usize),
    /// A new test case opens at the offset
    Reopen(usize),
}

/// Outcome of reading a complete `<test-case ...>` tag
enum Entry {
    /// A failed case is still open at the end of the text
    Open(Box<CaseScan>),
    /// Nothing left open; idle scanning resumes this many bytes in
    Resume(usize),
}

/// In-progress failed test case
#[derive(Debug)]
struct CaseScan {
    indent: usize,
    test: FailedTest,
    files: BTreeSet<String>,
    capture: Option<Capture>,
    /// Elements opened inside the case and not yet closed
    open_elements: Vec<String>,
}

impl CaseScan {
    fn new(indent: usize, test: FailedTest) -> Self {
        Self {
            indent,
            test,
            files: BTreeSet::new(),
            capture: None,
            open_elements: Vec::new(),
        }
    }

    fn in_cdata(&self) -> bool {
        self.capture.as_ref().is_some_and(|c| c.in_cdata)
    }

    /// Feed one raw line
    fn feed_line(&mut self, line: &str) -> CaseStep {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if !self.in_cdata() {
            if opens_element(trimmed, TEST_CASE) {
                return CaseStep::Reopen(indent);
            }
            // An out-dented closing tag for anything the case did not open
            // ends the case even without </test-case>.
            if let Some(closing) = trimmed.strip_prefix("</") {
                let name = element_name(closing);
                if indent <= self.indent && !self.open_elements.iter().any(|e| e == name) {
                    return CaseStep::Close(0);
                }
            }
        }

        if self.capture.as_ref().is_some_and(|c| c.continued) {
            self.append("\n");
        }
        let step = self.scan(line);
        if let Some(capture) = self.capture.as_mut() {
            capture.continued = true;
        }
        step
    }

    /// Walk the markup and text of (part of) a line
    fn scan(&mut self, text: &str) -> CaseStep {
        let mut rest = text;
        loop {
            if self.in_cdata() {
                match rest.find(CDATA_CLOSE) {
                    Some(end) => {
                        self.append(&rest[..end]);
                        self.end_cdata();
                        rest = &rest[end + CDATA_CLOSE.len()..];
                        continue;
                    }
                    None => {
                        self.append(rest);
                        return CaseStep::Continue;
                    }
                }
            }

            let Some(lt) = rest.find('<') else {
                self.append_text(rest);
                return CaseStep::Continue;
            };
            self.append_text(&rest[..lt]);
            let markup = &rest[lt..];

            if let Some(after) = markup.strip_prefix(CDATA_OPEN) {
                self.begin_cdata();
                rest = after;
                continue;
            }
            if opens_element(markup, TEST_CASE) {
                return CaseStep::Reopen(text.len() - markup.len());
            }

            let Some(end) = find_tag_end(markup) else {
                // Tag continues on the next line.
                self.push_element(markup);
                if let Some(section) = Section::opened_by(markup) {
                    self.open(section);
                }
                return CaseStep::Continue;
            };
            let tag = &markup[..=end];
            rest = &markup[end + 1..];

            if let Some(name) = tag.strip_prefix("</") {
                let name = element_name(name);
                if name == TEST_CASE {
                    return CaseStep::Close(text.len() - rest.len());
                }
                if let Some(pos) = self.open_elements.iter().rposition(|e| e == name) {
                    self.open_elements.truncate(pos);
                }
                if self
                    .capture
                    .as_ref()
                    .and_then(|c| c.element)
                    .is_some_and(|section| section.tag() == name)
                {
                    trace!(section = name, "capture closed");
                    self.capture = None;
                }
                continue;
            }

            let self_closing = tag.ends_with("/>");
            if !self_closing {
                self.push_element(tag);
            }
            if let Some(section) = Section::opened_by(tag) {
                if self_closing {
                    self.capture = None;
                } else {
                    self.open(section);
                }
            }
        }
    }

    fn push_element(&mut self, markup: &str) {
        let Some(inner) = markup.strip_prefix('<') else {
            return;
        };
        if inner.starts_with(['?', '!']) {
            return;
        }
        let name = element_name(inner);
        if !name.is_empty() {
            self.open_elements.push(name.to_string());
        }
    }

    /// Start capturing a section; any other capture ends
    fn open(&mut self, section: Section) {
        let keep = self.test.field_mut(section).is_empty();
        trace!(section = section.tag(), keep, "capture opened");
        self.capture = Some(Capture::new(Some(section), keep, false));
    }

    fn begin_cdata(&mut self) {
        match self.capture.as_mut() {
            Some(capture) => capture.in_cdata = true,
            None => self.capture = Some(Capture::new(None, false, true)),
        }
    }

    fn end_cdata(&mut self) {
        let stray = match self.capture.as_mut() {
            Some(capture) => {
                capture.in_cdata = false;
                capture.element.is_none()
            }
            None => false,
        };
        if stray {
            self.capture = None;
        }
    }

    /// Append raw text to the section being captured
    ///
    /// Stack-trace text is searched for file names even when a repeated
    /// section is not stored.
    fn append(&mut self, chunk: &str) {
        let Some(capture) = self.capture.as_mut() else {
            return;
        };
        let Some(section) = capture.element else {
            return;
        };

        if section == Section::StackTrace {
            capture.frame.push_str(chunk);
            for file in stack_trace_files(&capture.frame) {
                if self.files.insert(file.to_string()) {
                    trace!(file, "stack trace file discovered");
                }
            }
            if let Some(pos) = capture.frame.rfind('\n') {
                capture.frame.replace_range(..=pos, "");
            }
        }
        if capture.keep {
            self.test.field_mut(section).push_str(chunk);
        }
    }

    /// Append element text outside CDATA, entity-decoded
    fn append_text(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.append(&decode_entities(text));
        }
    }

    fn into_parts(self) -> (FailedTest, BTreeSet<String>) {
        let mut test = self.test;
        for section in Section::ALL {
            let field = test.field_mut(section);
            let tidy = field.trim_start_matches(['\r', '\n']).trim_end();
            if tidy.len() != field.len() {
                *field = tidy.to_string();
            }
        }
        (test, self.files)
    }
}

// ============================================================================
// Scanner
// ============================================================================

struct Scanner<'o> {
    options: &'o FilterOptions,
    state: ScanState,
    result: TestResultsResult,
}

impl<'o> Scanner<'o> {
    fn new(options: &'o FilterOptions, declared: Option<TestCounts>) -> Self {
        Self {
            options,
            state: ScanState::Idle,
            result: TestResultsResult {
                declared,
                ..Default::default()
            },
        }
    }

    fn feed_line(&mut self, line: &str) {
        self.state = match std::mem::replace(&mut self.state, ScanState::Idle) {
            ScanState::Idle => self.scan_idle(line, 0),
            ScanState::InCaseTag(pending) => self.resume_tag(*pending, line),
            ScanState::InFailedCase(mut case) => match case.feed_line(line) {
                CaseStep::Continue => ScanState::InFailedCase(case),
                CaseStep::Close(at) | CaseStep::Reopen(at) => {
                    self.finalize(*case);
                    self.scan_idle(line, at)
                }
            },
        };
    }

    /// Look for test cases in `line` from byte `from` on
    ///
    /// Any number of cases may start and end on one line.
    fn scan_idle(&mut self, line: &str, mut from: usize) -> ScanState {
        let indent = line.len() - line.trim_start().len();
        loop {
            let Some(found) = find_element(&line[from..], TEST_CASE) else {
                return ScanState::Idle;
            };
            let start = from + found;
            let markup = &line[start..];
            let Some(end) = find_tag_end(markup) else {
                trace!("test case tag continues on the next line");
                return ScanState::InCaseTag(Box::new(PendingTag {
                    indent,
                    tag: markup.to_string(),
                }));
            };
            let after_tag = start + end + 1;
            match self.enter_case(&markup[..=end], indent, &line[after_tag..]) {
                Entry::Open(case) => return ScanState::InFailedCase(case),
                Entry::Resume(consumed) => from = after_tag + consumed,
            }
        }
    }

    /// Extend a wrapped `<test-case` tag with the next line
    fn resume_tag(&mut self, mut pending: PendingTag, line: &str) -> ScanState {
        pending.tag.push('\n');
        let base = pending.tag.len();
        pending.tag.push_str(line);
        // Everything before `base` was already searched without a match.
        let Some(end) = find_tag_end(&pending.tag) else {
            return ScanState::InCaseTag(Box::new(pending));
        };
        let from = end + 1 - base;
        match self.enter_case(&pending.tag[..=end], pending.indent, &line[from..]) {
            Entry::Open(case) => ScanState::InFailedCase(case),
            Entry::Resume(consumed) => self.scan_idle(line, from + consumed),
        }
    }

    /// Observe a complete `<test-case ...>` tag and scan the text after it
    /// if the case failed
    fn enter_case(&mut self, tag: &str, indent: usize, rest: &str) -> Entry {
        let attrs = parse_attributes(tag);
        let result = attribute(&attrs, "result");
        self.observe(result);
        if result != Some(FAILED) {
            return Entry::Resume(0);
        }

        let name = attribute(&attrs, "name")
            .or_else(|| attribute(&attrs, "fullname"))
            .unwrap_or("(unnamed test)")
            .to_string();
        let full_name = attribute(&attrs, "fullname").map(str::to_string);
        trace!(name = %name, indent, "failed test case opened");

        let mut case = CaseScan::new(
            indent,
            FailedTest {
                name,
                full_name,
                ..Default::default()
            },
        );
        if tag.ends_with("/>") {
            self.finalize(case);
            return Entry::Resume(0);
        }
        match case.scan(rest) {
            CaseStep::Close(at) | CaseStep::Reopen(at) => {
                self.finalize(case);
                Entry::Resume(at)
            }
            CaseStep::Continue => {
                if let Some(capture) = case.capture.as_mut() {
                    capture.continued = true;
                }
                Entry::Open(Box::new(case))
            }
        }
    }

    fn observe(&mut self, result: Option<&str>) {
        let observed = &mut self.result.observed;
        observed.total += 1;
        match result {
            Some("Passed") => observed.passed += 1,
            Some(FAILED) => observed.failed += 1,
            Some("Skipped" | "Ignored") => observed.skipped += 1,
            _ => {}
        }
    }

    fn finalize(&mut self, case: CaseScan) {
        let (test, files) = case.into_parts();
        let retained_by_filter = filter_retains_any(&self.options.file_filters, &files);
        self.result.files.extend(files);

        if !test.has_diagnostics() {
            trace!(name = %test.name, "failed test without diagnostics dropped");
            self.result.suppressed_count += 1;
            return;
        }
        if !retained_by_filter {
            trace!(name = %test.name, "failed test filtered out");
            return;
        }
        self.result.failed_count += 1;
        if self.result.failed_tests.len() < self.options.max_errors {
            self.result.failed_tests.push(test);
        }
    }

    fn finish(mut self) -> TestResultsResult {
        // End of text closes whatever is still open.
        match std::mem::replace(&mut self.state, ScanState::Idle) {
            ScanState::Idle => {}
            ScanState::InCaseTag(pending) => {
                debug!("input ended inside a test case tag");
                if let Entry::Open(case) = self.enter_case(&pending.tag, pending.indent, "") {
                    self.finalize(*case);
                }
            }
            ScanState::InFailedCase(case) => {
                debug!("input ended inside a failed test case");
                self.finalize(*case);
            }
        }
        self.result
    }
}

/// Extract failed tests and stack-trace files from NUnit-style XML
///
/// Total over any input. Caps limit the retained list only; the scan always
/// runs to the end so `failed_count` and the observed counts are complete.
#[must_use]
pub fn extract_test_results(text: &str, options: &FilterOptions) -> TestResultsResult {
    let declared = declared_counts(text);
    let mut scanner = Scanner::new(options, declared);
    for line in text.lines() {
        scanner.feed_line(line);
    }
    let result = scanner.finish();

    debug!(
        declared = result.declared.is_some(),
        observed_total = result.observed.total,
        failed = result.failed_count,
        retained = result.failed_tests.len(),
        suppressed = result.suppressed_count,
        files = result.files.len(),
        "extracted test results"
    );
    result
}

// ============================================================================
// Lexical Helpers
// ============================================================================

/// Read the four counts from the root `<test-run>` element
fn declared_counts(text: &str) -> Option<TestCounts> {
    let caps = ROOT_COUNTS_RE.captures(text)?;
    let count = |i: usize| caps.get(i).and_then(|m| m.as_str().parse().ok());
    Some(TestCounts {
        total: count(1)?,
        passed: count(2)?,
        failed: count(3)?,
        skipped: count(4)?,
    })
}

fn filter_retains_any(filter: &FileFilter, files: &BTreeSet<String>) -> bool {
    !filter.is_active() || files.iter().any(|f| filter.matches(f))
}

/// Whether `markup` starts with the opening tag of `element`
fn opens_element(markup: &str, element: &str) -> bool {
    markup
        .strip_prefix('<')
        .and_then(|m| m.strip_prefix(element))
        .is_some_and(|after| {
            after
                .chars()
                .next()
                .is_none_or(|c| c == '>' || c == '/' || c.is_whitespace())
        })
}

/// Element name at the start of `markup` (after `<` or `</`)
fn element_name(markup: &str) -> &str {
    let end = markup
        .find(|c: char| c == '>' || c == '/' || c.is_whitespace())
        .unwrap_or(markup.len());
    &markup[..end]
}

/// Byte offset of the first opening tag of `element` in `line`
fn find_element(line: &str, element: &str) -> Option<usize> {
    line.match_indices('<')
        .map(|(idx, _)| idx)
        .find(|&idx| opens_element(&line[idx..], element))
}

/// Byte offset of the `>` ending the tag at the start of `markup`,
/// skipping quoted attribute values
fn find_tag_end(markup: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in markup.char_indices().skip(1) {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(idx),
            _ => {}
        }
    }
    None
}

fn parse_attributes(tag: &str) -> Vec<(&str, Cow<'_, str>)> {
    ATTR_RE
        .captures_iter(tag)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            Some((key, decode_entities(value)))
        })
        .collect()
}

fn attribute<'a>(attrs: &'a [(&str, Cow<'_, str>)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_ref())
}

/// Decode the five predefined XML entities
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
