//! Configuration for the logdigest command line
//!
//! This module maps command-line flags and `LOGDIGEST_*` environment
//! variables onto the engine's [`FilterOptions`], along with input selection
//! and logging options.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use logdigest_core::{FilterOptions, InputKind, OutputFormat, Preset};

/// Condense build logs and NUnit test results into AI-ready summaries
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "logdigest")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Input file to digest
    ///
    /// Reads standard input when absent or `-`.
    #[arg(env = "LOGDIGEST_INPUT")]
    pub input: Option<PathBuf>,

    /// Input kind; `auto` detects NUnit XML by content
    #[arg(long, value_enum, default_value_t = KindArg::Auto, env = "LOGDIGEST_KIND")]
    pub kind: KindArg,

    /// Report layout
    #[arg(long, value_enum, default_value_t = FormatArg::Full, env = "LOGDIGEST_FORMAT")]
    pub format: FormatArg,

    /// Defaults for context lines and caps
    ///
    /// `interactive` shows everything without context; `assistant` attaches
    /// ten lines of context and caps output for tool calls.
    #[arg(long, value_enum, default_value_t = PresetArg::Interactive, env = "LOGDIGEST_PRESET")]
    pub preset: PresetArg,

    /// Raw lines shown before each error (overrides the preset)
    #[arg(long, value_name = "N")]
    pub context: Option<usize>,

    /// Maximum errors or failed tests to show (overrides the preset)
    #[arg(long, value_name = "N")]
    pub max_errors: Option<usize>,

    /// Maximum warnings to show (overrides the preset)
    #[arg(long, value_name = "N")]
    pub max_warnings: Option<usize>,

    /// Omit warnings from the report
    #[arg(long, default_value = "false")]
    pub no_warnings: bool,

    /// Only show diagnostics for files whose name matches (repeatable)
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,

    /// Omit stack traces of failed tests
    #[arg(long, default_value = "false")]
    pub no_stack_traces: bool,

    /// Omit console output of failed tests
    #[arg(long, default_value = "false")]
    pub no_output: bool,

    /// Print the structured result and summary as JSON
    #[arg(long, default_value = "false", conflicts_with = "list_files")]
    pub json: bool,

    /// Print the file names found in the input, one per line
    ///
    /// The list ignores `--file` so it can be used to pick filters.
    #[arg(long, default_value = "false")]
    pub list_files: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so stdout carries only the report.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - only warnings and errors are logged
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// `--kind` values
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindArg {
    /// Detect from content
    #[default]
    Auto,
    /// Compiler/linker output
    BuildLog,
    /// NUnit test-result XML
    TestResults,
}

/// `--format` values
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatArg {
    #[default]
    Full,
    Minimal,
}

/// `--preset` values
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresetArg {
    #[default]
    Interactive,
    Assistant,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Full => Self::Full,
            FormatArg::Minimal => Self::Minimal,
        }
    }
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Interactive => Self::Interactive,
            PresetArg::Assistant => Self::Assistant,
        }
    }
}

impl Config {
    /// The input file, or `None` for stdin
    #[must_use]
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }

    /// The forced input kind, or `None` when detection should decide
    #[must_use]
    pub fn forced_kind(&self) -> Option<InputKind> {
        match self.kind {
            KindArg::Auto => None,
            KindArg::BuildLog => Some(InputKind::BuildLog),
            KindArg::TestResults => Some(InputKind::TestResults),
        }
    }

    /// Engine options for `kind`
    ///
    /// Starts from the preset defaults for that kind, then applies any
    /// explicit flags.
    #[must_use]
    pub fn filter_options(&self, kind: InputKind) -> FilterOptions {
        let mut options = FilterOptions::from_preset(self.preset.into(), kind)
            .with_format(self.format.into())
            .with_file_filters(self.files.iter().cloned());
        if let Some(context) = self.context {
            options = options.with_context_lines(context);
        }
        options.max_errors = self.max_errors.unwrap_or(options.max_errors);
        options.max_warnings = self.max_warnings.unwrap_or(options.max_warnings);
        if self.no_warnings {
            options = options.without_warnings();
        }
        options.show_stack_traces = !self.no_stack_traces;
        options.show_output = !self.no_output;
        options
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an input path is given but doesn't exist or is
    /// not a regular file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(input) = self.input_path() {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is a directory or special file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),
}
