//! Output of processed results.
//!
//! # Submodules
//!
//! - [`console`]: Human-readable rendering printed to stdout
//! - [`json`]: Persisted JSON array of every outcome, written atomically

pub mod console;
pub mod json;
