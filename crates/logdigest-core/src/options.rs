//! Filter configuration for both pipelines
//!
//! Keys deserialize in camelCase (`showWarnings`, `contextLines`, ...) so a
//! host can accept a request body as-is; absent keys take the
//! [`Preset::Interactive`] defaults.

use serde::{Deserialize, Serialize};

use crate::detect::InputKind;
use crate::filter::FileFilter;

/// Report layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown headers, context blocks and fenced code
    #[default]
    Full,
    /// Bare matched lines under `=== SECTION ===` markers
    Minimal,
}

/// Entry-point defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Paste-and-read use: no context, effectively unlimited caps
    #[default]
    Interactive,
    /// Tool calls from an AI assistant: context on, tight caps
    Assistant,
}

impl Preset {
    /// Context lines attached to each error
    #[must_use]
    pub fn context_lines(self) -> usize {
        match self {
            Self::Interactive => 0,
            Self::Assistant => 10,
        }
    }

    /// Cap on errors (build logs) or failed tests (test results)
    #[must_use]
    pub fn max_errors(self, kind: InputKind) -> usize {
        match (self, kind) {
            (Self::Interactive, _) => 9999,
            (Self::Assistant, InputKind::BuildLog) => 100,
            (Self::Assistant, InputKind::TestResults) => 20,
        }
    }

    /// Cap on warnings
    #[must_use]
    pub fn max_warnings(self) -> usize {
        match self {
            Self::Interactive => 9999,
            Self::Assistant => 20,
        }
    }
}

/// Options controlling extraction and rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// Include warnings in the output
    pub show_warnings: bool,
    /// Preceding raw lines attached to each error; 0 disables context
    pub context_lines: usize,
    /// Cap on retained errors or failed tests
    pub max_errors: usize,
    /// Cap on retained warnings
    pub max_warnings: usize,
    /// Allow-list of file names
    pub file_filters: FileFilter,
    /// Report layout
    pub format: OutputFormat,
    /// Include stack traces (test results only)
    pub show_stack_traces: bool,
    /// Include console output (test results only)
    pub show_output: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::from_preset(Preset::Interactive, InputKind::BuildLog)
    }
}

impl FilterOptions {
    /// Options for a given entry point and input kind
    #[must_use]
    pub fn from_preset(preset: Preset, kind: InputKind) -> Self {
        Self {
            show_warnings: true,
            context_lines: preset.context_lines(),
            max_errors: preset.max_errors(kind),
            max_warnings: preset.max_warnings(),
            file_filters: FileFilter::default(),
            format: OutputFormat::Full,
            show_stack_traces: true,
            show_output: true,
        }
    }

    /// Set the report format
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the number of context lines
    #[must_use]
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// Set both retention caps
    #[must_use]
    pub fn with_limits(mut self, max_errors: usize, max_warnings: usize) -> Self {
        self.max_errors = max_errors;
        self.max_warnings = max_warnings;
        self
    }

    /// Restrict output to the given file names
    #[must_use]
    pub fn with_file_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_filters = FileFilter::new(filters);
        self
    }

    /// Drop the warnings section
    #[must_use]
    pub fn without_warnings(mut self) -> Self {
        self.show_warnings = false;
        self
    }
}
