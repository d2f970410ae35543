//! Collaborator contracts: the host runtime, the status icon, the popup window,
//! and the factory that builds the latter two.
//!
//! These traits are the seams between the controller and a concrete desktop
//! toolkit. Event handlers registered on them may be invoked from any thread;
//! the controller forwards them onto its own queue, so implementations need
//! not serialise anything themselves.

use std::path::PathBuf;

use crate::{
    Error, Result,
    geom::{Point, Rect},
    options::{IconSource, WindowParams},
};

/// Callback fired once when the host runtime becomes ready.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Callback fired on an icon activation.
pub type ActivationHandler = Box<dyn Fn(Activation) + Send + Sync>;

/// Callback fired on a window lifecycle event (blur, close).
pub type WindowHandler = Box<dyn Fn() + Send + Sync>;

/// Keyboard modifiers held during an icon activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Alt / Option.
    pub alt: bool,
    /// Shift.
    pub shift: bool,
    /// Control.
    pub ctrl: bool,
    /// Command / Super.
    pub meta: bool,
}

impl Modifiers {
    /// True if any modifier key is held.
    pub const fn any(self) -> bool {
        self.alt || self.shift || self.ctrl || self.meta
    }
}

/// Data carried by an icon click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation {
    /// Modifier keys held during the click.
    pub modifiers: Modifiers,
    /// Icon bounds at click time; some activation paths report none.
    pub bounds: Option<Rect>,
}

impl Activation {
    /// Plain click with the given icon bounds.
    pub const fn at(bounds: Rect) -> Self {
        Self {
            modifiers: Modifiers {
                alt: false,
                shift: false,
                ctrl: false,
                meta: false,
            },
            bounds: Some(bounds),
        }
    }
}

/// Icon events the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconEvent {
    /// Primary (usually left) click.
    Click,
    /// Secondary (usually right) click.
    RightClick,
    /// Double activation.
    DoubleClick,
}

/// Icon highlight state, where the platform supports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightMode {
    /// Never draw the highlight.
    Never,
    /// Always draw the highlight.
    Always,
    /// Highlight only while the icon is pressed.
    Selection,
}

/// The host application runtime.
pub trait HostRuntime: Send + Sync {
    /// True once the runtime has finished launching.
    fn is_ready(&self) -> bool;

    /// Register a one-shot readiness callback.
    fn on_ready(&self, callback: ReadyCallback);

    /// Root directory of the embedding application.
    fn app_root(&self) -> PathBuf;

    /// Hide the persistent app-switcher entry (the macOS dock icon).
    fn hide_app_switcher_presence(&self) -> Result<()> {
        Err(Error::Unsupported)
    }
}

/// A clickable status icon.
pub trait IconHandle: Send {
    /// Subscribe `handler` to `event`. Handlers for one event fire in registration order.
    fn on(&mut self, event: IconEvent, handler: ActivationHandler);

    /// Set the hover tooltip.
    fn set_tooltip(&mut self, text: &str) -> Result<()>;

    /// Whether this icon can draw a highlight state at all.
    fn supports_highlight(&self) -> bool {
        true
    }

    /// Change the highlight state. Returns `Error::Unsupported` where unavailable.
    fn set_highlight_mode(&mut self, mode: HighlightMode) -> Result<()>;

    /// Current on-screen bounds, if the platform can report them.
    fn bounds(&self) -> Option<Rect> {
        None
    }
}

/// The popup window surface.
pub trait PopupWindow: Send {
    /// Subscribe to focus loss.
    fn on_blur(&mut self, handler: WindowHandler);

    /// Subscribe to the window being closed by any means.
    fn on_close(&mut self, handler: WindowHandler);

    /// Show the window on every workspace/space.
    fn set_visible_on_all_workspaces(&mut self, visible: bool) -> Result<()>;

    /// Begin loading `uri`. Must not block on completion.
    fn load_content(&mut self, uri: &str) -> Result<()>;

    /// Move the window's top-left corner.
    fn set_position(&mut self, pos: Point) -> Result<()>;

    /// Make the window visible.
    fn show(&mut self) -> Result<()>;

    /// Unrender the window without destroying it.
    fn hide(&mut self) -> Result<()>;

    /// Whether the window is currently visible.
    fn is_visible(&self) -> bool;
}

/// Factory for native icons and windows.
pub trait WindowSystem: Send + Sync {
    /// Create a status icon showing `source`.
    fn create_icon(&self, source: &IconSource) -> Result<Box<dyn IconHandle>>;

    /// Create a popup window from construction parameters.
    fn create_window(&self, params: &WindowParams) -> Result<Box<dyn PopupWindow>>;
}
