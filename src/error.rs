//! Error types for host-facing entry points.
//!
//! Internal rewrite code treats sort violations as programmer errors
//! (`debug_assert!`); the public entry points validate their inputs and
//! report misuse through [`Error`] instead of panicking.

use thiserror::Error;

/// Errors surfaced by the rewriter's public API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A term had an unexpected sort.
    #[error("sort mismatch: expected {expected}, found {found}")]
    SortMismatch {
        /// Description of the expected sort.
        expected: &'static str,
        /// Description of the sort that was found.
        found: String,
    },

    /// The rewriter was handed a term it cannot dispatch on.
    #[error("not a rewritable application: {0}")]
    NotAnApplication(String),
}

/// Result alias used by the public API.
pub type Result<T> = std::result::Result<T, Error>;
