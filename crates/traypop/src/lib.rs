//! traypop
//!
//! Lifecycle controller for a tray-anchored popup window: a status icon that
//! toggles one auxiliary window, positioned relative to the icon.
//!
//! The crate owns only the show/hide/position state machine. The desktop
//! toolkit is reached through the collaborator traits in [`host`]:
//! - [`HostRuntime`]: readiness signalling and app paths
//! - [`WindowSystem`]: builds the [`IconHandle`] and [`PopupWindow`]
//! - [`PlacementResolver`]: maps a [`Placement`] and anchor to coordinates
//!   ([`Positioner`] is a ready-made one)
//!
//! Construct a [`Controller`] with [`Controller::initialize`], subscribe to
//! [`Notification`]s, then drain its event queue with
//! [`Controller::process_pending`] or [`Controller::run`].
mod controller;
mod error;
mod events;
mod geom;
pub mod host;
mod options;
mod placement;
mod platform;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use controller::{Collaborators, Controller, ControllerHandle};
pub use error::{BackendError, Error, Result};
pub use events::{ControllerEvent, Notification, Notifier, WindowId};
pub use geom::{Point, Rect, Size};
pub use host::{
    Activation, HighlightMode, HostRuntime, IconEvent, IconHandle, Modifiers, PopupWindow,
    WindowSystem,
};
pub use options::{
    BUNDLED_ICON, ClickTrigger, DEFAULT_SIZE, FixedPosition, ICON_FILE_NAME, INDEX_FILE_NAME,
    IconSource, OptionName, OptionValue, Options, RawOptions, WindowParams,
};
pub use placement::{Placement, PlacementKind, PlacementResolver, Positioner};
pub use platform::{OsFamily, PlatformPolicy};
