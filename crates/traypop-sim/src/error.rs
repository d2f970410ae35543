//! Error handling for the traypop-sim crate.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for simulator operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a scenario.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Errors surfaced by the popup controller.
    #[error("Controller error: {0}")]
    Controller(#[from] traypop::Error),
    /// A step needed the status icon before the controller created it.
    #[error("Step {step}: no status icon yet")]
    NoIcon {
        /// One-based index of the failing step.
        step: usize,
    },
    /// A step targeted the popup window but none has been created.
    #[error("Step {step}: no popup window to act on")]
    NoWindow {
        /// One-based index of the failing step.
        step: usize,
    },
}
