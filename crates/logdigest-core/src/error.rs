// Copyright (c) 2026 - present logdigest contributors
// SPDX-License-Identifier: MIT

//! Error types for logdigest-core

use thiserror::Error;

/// Errors that can occur while reading input for the engine
///
/// The extractors themselves are total over any string and never fail; only
/// the reader-based entry points can produce these.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Error reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input bytes were not valid UTF-8
    #[error("Input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
