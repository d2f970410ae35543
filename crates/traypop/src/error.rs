//! Error types for the popup controller.

use std::{error::Error as StdError, io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the traypop crate.
pub type Result<T> = StdResult<T, Error>;

/// Boxed error produced by a window-system backend.
pub type BackendError = Box<dyn StdError + Send + Sync>;

/// Unified error type for the popup controller.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value failed construction-time validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A placement policy name did not match any known policy.
    #[error("unknown placement policy: {0:?}")]
    UnknownPlacement(String),

    /// An option name passed to `set_option`/`get_option` is not recognised.
    #[error("unknown option: {0:?}")]
    UnknownOption(String),

    /// A dynamically set option value has the wrong type for its option.
    #[error("option {option} expects {expected}")]
    OptionType {
        /// Option that was being set.
        option: &'static str,
        /// Human-readable description of the accepted type.
        expected: &'static str,
    },

    /// An anchored placement was resolved without an anchor rectangle.
    #[error("placement {0} requires an anchor rectangle")]
    MissingAnchor(&'static str),

    /// `show_window`/`hide_window` called before the host signalled readiness.
    #[error("controller is not ready")]
    NotReady,

    /// The controller's event queue has been dropped.
    #[error("controller channel closed")]
    ChannelClosed,

    /// The requested capability is not available on this platform.
    #[error("unsupported on this platform")]
    Unsupported,

    /// Options file could not be parsed.
    #[error("options parse error in {}: {message}", path.as_ref().map_or_else(|| "<string>".to_string(), |p| p.display().to_string()))]
    Ron {
        /// File the options came from, if any.
        path: Option<PathBuf>,
        /// Parser diagnostic.
        message: String,
    },

    /// I/O failure while reading an options file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure raised by the icon or window primitive. Passed through unchanged.
    #[error(transparent)]
    Backend(BackendError),
}

impl Error {
    /// Helper to build an invalid-configuration error from a message.
    pub fn invalid<M: Into<String>>(msg: M) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wrap an arbitrary backend failure.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BackendError>,
    {
        Self::Backend(err.into())
    }
}
