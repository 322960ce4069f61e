//! Pattern library for diagnostic lines
//!
//! Error and warning recognition is purely lexical: any toolchain that emits
//! matching substrings is supported. Error and warning patterns are
//! case-insensitive; every pattern is compiled once per process.
//!
//! File discovery is intentionally narrow. Only `cpp`, `h`, `hpp` and `cs`
//! extensions are recognized in build logs, and only `.cs` frames in stack
//! traces.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

/// Error patterns, in the order they are documented
const ERROR_PATTERNS: &[&str] = &[
    // cl.exe / csc.exe: "error C2065:", "error CS0103:"
    r"(?i)\berror\s+[a-z]*\d+\s*:",
    // MSBuild: "error MSB3073"
    r"(?i)\berror\s+MSB\d+",
    // link.exe: "error LNK2019"
    r"(?i)\berror\s+LNK\d+",
    r"(?i)\bfatal\s+error\b",
    r"(?i)\bERROR:",
    // header/IDL generators: "foo.idl(12): error : ..." / "): error MIDL2025"
    r"(?i)\):\s*error\s*:",
    r"(?i)\):\s*error\s+\w+",
    r"(?i)SetEnv\s+task\s+failed",
    r"(?i)failed\s+unexpectedly",
    r"(?i)cannot\s+open\s+include\s+file",
    r"(?i)unresolved\s+external\s+symbol",
];

const WARNING_PATTERN: &str = r"(?i)\bwarning\s+[a-z]*\d+\s*:";

static ERROR_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(ERROR_PATTERNS).expect("valid regex"));

static WARNING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(WARNING_PATTERN).expect("valid regex"));

/// `Widget.cpp(42)` / `Widget.cpp(42,7)` / bare `Widget.h`
///
/// Extensions are matched lowercase only so `Microsoft.Cpp.targets` is not a
/// source file.
static FILE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z0-9_]+\.(?:cpp|hpp|cs|h))\b(?:\((\d+)(?:,\d+)*\))?")
        .expect("valid regex")
});

/// `CalcTests.cs:line 42` / `CalcTests.cs:42`
static STACK_FRAME_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z0-9_]+\.cs):(?:line\s*)?\d+").expect("valid regex")
});

/// Severity of a classified build-log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Line matched at least one error pattern
    Error,
    /// Line matched the warning pattern and no error pattern
    Warning,
}

/// Classify a single build-log line
///
/// Errors take precedence: a line matching any error pattern is never a
/// warning, whatever the warning pattern says.
#[must_use]
pub fn classify_line(line: &str) -> Option<Severity> {
    if ERROR_SET.is_match(line) {
        Some(Severity::Error)
    } else if WARNING_RE.is_match(line) {
        Some(Severity::Warning)
    } else {
        None
    }
}

/// A source file reference found in a build-log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// File basename, e.g. `Widget.cpp`
    pub name: String,
    /// Line number in parentheses after the name, if present
    pub line: Option<u32>,
}

/// Extract the first file reference from a build-log line
#[must_use]
pub fn find_file_ref(line: &str) -> Option<FileRef> {
    let caps = FILE_REF_RE.captures(line)?;
    let name = caps.get(1)?.as_str().to_string();
    let line = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some(FileRef { name, line })
}

/// Iterate over `.cs` files named in stack-trace text
pub fn stack_trace_files(text: &str) -> impl Iterator<Item = &str> {
    STACK_FRAME_FILE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}
