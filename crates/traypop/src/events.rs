//! Controller notifications and the internal event queue vocabulary.

use std::{collections::HashMap, fmt};

use tracing::debug;

use crate::{geom::Rect, host::Activation};

/// Notifications emitted by the controller, in the order documented on each
/// controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// Readiness transition finished; show/hide are now available.
    Ready,
    /// A show is starting (window exists, not yet positioned).
    Show,
    /// The window was positioned and made visible.
    AfterShow,
    /// A hide is starting.
    Hide,
    /// The window was hidden.
    AfterHide,
    /// A window is about to be created.
    CreateWindow,
    /// A window was created and its content load requested.
    AfterCreateWindow,
    /// The window closed and the slot was cleared.
    AfterClose,
    /// The window lost focus while `keep_on_top` is set.
    FocusLost,
}

impl Notification {
    /// Every channel, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Ready,
        Self::Show,
        Self::AfterShow,
        Self::Hide,
        Self::AfterHide,
        Self::CreateWindow,
        Self::AfterCreateWindow,
        Self::AfterClose,
        Self::FocusLost,
    ];

    /// Channel name as exposed to embedders.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Show => "show",
            Self::AfterShow => "after-show",
            Self::Hide => "hide",
            Self::AfterHide => "after-hide",
            Self::CreateWindow => "create-window",
            Self::AfterCreateWindow => "after-create-window",
            Self::AfterClose => "after-close",
            Self::FocusLost => "focus-lost",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subscriber callback for one channel.
pub type Subscriber = Box<dyn FnMut() + Send>;

/// Subscriber callback receiving every notification.
pub type AnySubscriber = Box<dyn FnMut(Notification) + Send>;

/// Per-channel subscriber lists. Subscribers fire in registration order;
/// channel subscribers run before catch-all ones.
#[derive(Default)]
pub struct Notifier {
    channels: HashMap<Notification, Vec<Subscriber>>,
    any: Vec<AnySubscriber>,
}

impl Notifier {
    /// Notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a single channel.
    pub fn on(&mut self, n: Notification, f: Subscriber) {
        self.channels.entry(n).or_default().push(f);
    }

    /// Subscribe to every channel.
    pub fn on_any(&mut self, f: AnySubscriber) {
        self.any.push(f);
    }

    /// Number of subscribers registered on `n`, excluding catch-all ones.
    pub fn count(&self, n: Notification) -> usize {
        self.channels.get(&n).map_or(0, Vec::len)
    }

    /// Fire `n` on its channel, then on every catch-all subscriber.
    pub fn emit(&mut self, n: Notification) {
        debug!(event = %n, "notify");
        if let Some(subs) = self.channels.get_mut(&n) {
            for f in subs.iter_mut() {
                f();
            }
        }
        for f in &mut self.any {
            f(n);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("channels", &self.channels.len())
            .field("any", &self.any.len())
            .finish()
    }
}

/// Monotonic identity of a created popup window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Messages queued to the controller. Collaborator callbacks and
/// [`crate::ControllerHandle`] only ever enqueue; the controller applies them
/// one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The host runtime became ready.
    Ready,
    /// The status icon was clicked.
    IconActivated(Activation),
    /// A window lost focus.
    WindowBlurred(WindowId),
    /// A window was closed.
    WindowClosed(WindowId),
    /// Programmatic show request.
    Show(Option<Rect>),
    /// Programmatic hide request.
    Hide,
    /// Stop the async driver.
    Shutdown,
}
