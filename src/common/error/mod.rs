//! Unified error types for docxtpl.
//!
//! This module provides a unified error type that encompasses package-level
//! failures, presenting a consistent API to users. Content-level anomalies
//! (missing keys, wrong types, malformed table rows) are never errors; they
//! are reported as warnings alongside the rendered output.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
