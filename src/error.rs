// SPDX-License-Identifier: MPL-2.0

//! Handling solver errors.

use thiserror::Error;

use crate::trace::DeadlockReport;

/// Errors that may occur while solving dependencies.
#[derive(Error, Debug)]
pub enum SolveError {
    /// No mutually-consistent set of versions exists for this root; the
    /// report carries both sides of the version collision.
    #[error("{0}")]
    Deadlock(DeadlockReport),

    /// Something unexpected happened.
    #[error("{0}")]
    Failure(String),
}
