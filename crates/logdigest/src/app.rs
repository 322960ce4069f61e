// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! Command execution: read input, digest, write the report
//!
//! [`run`] takes its stdin and stdout as parameters so tests can drive it
//! with in-memory buffers.

use std::io::{Read, Write};

use logdigest_core::{Digest, DigestError, classify_input_kind, digest_as};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};

/// Errors that can occur while running a digest
#[derive(Debug, Error)]
pub enum AppError {
    /// Input was empty or whitespace only
    #[error("Input is empty; paste a build log or NUnit XML result file")]
    EmptyInput,

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine error
    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Read the whole input named by `config`, falling back to `stdin`
///
/// # Errors
///
/// Returns an error if the input cannot be read, is not UTF-8, or contains
/// only whitespace.
pub fn read_input<R: Read>(config: &Config, mut stdin: R) -> Result<String, AppError> {
    let bytes = match config.input_path() {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            std::fs::read(path)?
        }
        None => {
            debug!("reading input from stdin");
            let mut bytes = Vec::new();
            stdin.read_to_end(&mut bytes)?;
            bytes
        }
    };
    let text = String::from_utf8(bytes).map_err(DigestError::from)?;
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(text)
}

/// Digest `text` with the kind and options selected by `config`
#[must_use]
pub fn digest_text(config: &Config, text: &str) -> Digest {
    let kind = config
        .forced_kind()
        .unwrap_or_else(|| classify_input_kind(text));
    let options = config.filter_options(kind);
    digest_as(text, kind, &options)
}

/// Write `digest` in the output mode selected by `config`
///
/// # Errors
///
/// Returns an error if writing or JSON serialization fails.
pub fn write_digest<W: Write>(
    config: &Config,
    digest: &Digest,
    mut out: W,
) -> Result<(), AppError> {
    if config.list_files {
        for file in digest.files() {
            writeln!(out, "{file}")?;
        }
    } else if config.json {
        serde_json::to_writer_pretty(&mut out, digest)?;
        writeln!(out)?;
    } else {
        out.write_all(digest.report.text.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Run one invocation end to end
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the input cannot be
/// read or is empty, or the output cannot be written.
pub fn run<R: Read, W: Write>(config: &Config, stdin: R, out: W) -> Result<(), AppError> {
    config.validate()?;
    let text = read_input(config, stdin)?;
    let digest = digest_text(config, &text);
    info!(
        kind = digest.kind().label(),
        files = digest.files().len(),
        report_bytes = digest.report.text.len(),
        "digest complete"
    );
    write_digest(config, &digest, out)
}
