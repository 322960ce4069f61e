//! logdigest library
//!
//! This module exports the command-line configuration and runner for use in
//! integration tests and benchmarks.

pub mod app;
pub mod config;
