//! The popup controller: readiness, icon wiring, and window show/hide.
//!
//! Collaborator callbacks never touch controller state directly. They post
//! [`ControllerEvent`]s onto a queue that [`Controller::process_pending`] or
//! [`Controller::run`] drains on the owning thread.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, trace, warn};

use crate::{
    Error, Result,
    events::{ControllerEvent, Notification, Notifier, WindowId},
    geom::{Point, Rect},
    host::{
        Activation, ActivationHandler, HighlightMode, HostRuntime, IconEvent, IconHandle,
        PopupWindow, WindowHandler, WindowSystem,
    },
    options::{OptionValue, Options, RawOptions},
    placement::{Placement, PlacementResolver},
    platform::{OsFamily, PlatformPolicy},
};

/// External services the controller drives.
pub struct Collaborators {
    /// Host application runtime.
    pub host: Arc<dyn HostRuntime>,
    /// Factory for the icon and popup window.
    pub windows: Arc<dyn WindowSystem>,
    /// Placement calculator.
    pub resolver: Arc<dyn PlacementResolver>,
    /// Pre-built icon to use instead of asking `windows` for one.
    pub icon: Option<Box<dyn IconHandle>>,
    /// OS family whose policy table applies.
    pub os: OsFamily,
}

impl Collaborators {
    /// Bundle collaborators for the current OS, without an injected icon.
    pub fn new(
        host: Arc<dyn HostRuntime>,
        windows: Arc<dyn WindowSystem>,
        resolver: Arc<dyn PlacementResolver>,
    ) -> Self {
        Self {
            host,
            windows,
            resolver,
            icon: None,
            os: OsFamily::current(),
        }
    }

    /// Use a pre-built icon.
    pub fn with_icon(mut self, icon: Box<dyn IconHandle>) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Apply another OS family's policy table.
    pub fn with_os(mut self, os: OsFamily) -> Self {
        self.os = os;
        self
    }
}

/// Readiness progress. The transition runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting,
    Starting,
    Ready,
}

/// The live popup window and its identity.
struct WindowSlot {
    id: WindowId,
    window: Box<dyn PopupWindow>,
}

/// Owns the status icon and at most one popup window, and reconciles icon
/// clicks, window lifecycle events and programmatic show/hide requests.
///
/// All state lives here and is mutated only through `&mut self`. Collaborator
/// callbacks enqueue [`ControllerEvent`]s; drain them with
/// [`Controller::process_pending`] or drive them with [`Controller::run`].
pub struct Controller {
    options: Options,
    policy: &'static PlatformPolicy,
    host: Arc<dyn HostRuntime>,
    windows: Arc<dyn WindowSystem>,
    resolver: Arc<dyn PlacementResolver>,
    /// Injected icon waiting for the readiness transition.
    injected_icon: Option<Box<dyn IconHandle>>,
    icon: Option<Box<dyn IconHandle>>,
    highlight_supported: bool,
    phase: Phase,
    window: Option<WindowSlot>,
    next_window_id: u64,
    cached_anchor: Option<Rect>,
    notifier: Notifier,
    tx: UnboundedSender<ControllerEvent>,
    rx: UnboundedReceiver<ControllerEvent>,
}

impl Controller {
    /// Validate `raw` and set up a controller. Nothing native is created
    /// until the host signals readiness and the event queue is processed.
    pub fn initialize(raw: RawOptions, deps: Collaborators) -> Result<Self> {
        let options = Options::resolve(raw, &deps.host.app_root(), deps.os)?;
        Self::with_options(options, deps)
    }

    /// Set up a controller from already-resolved options.
    pub fn with_options(options: Options, deps: Collaborators) -> Result<Self> {
        if options.width == 0 || options.height == 0 {
            return Err(Error::invalid("width and height must be positive"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let Collaborators {
            host,
            windows,
            resolver,
            icon,
            os,
        } = deps;

        if host.is_ready() {
            debug!("host already ready; queueing readiness");
            forward(&tx, ControllerEvent::Ready);
        } else {
            let ready_tx = tx.clone();
            host.on_ready(Box::new(move || forward(&ready_tx, ControllerEvent::Ready)));
        }

        Ok(Self {
            options,
            policy: os.policy(),
            host,
            windows,
            resolver,
            injected_icon: icon,
            icon: None,
            highlight_supported: false,
            phase: Phase::Waiting,
            window: None,
            next_window_id: 1,
            cached_anchor: None,
            notifier: Notifier::new(),
            tx,
            rx,
        })
    }

    // ---- option surface ----

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable options. Changes apply from the next operation that reads them.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Set an option by name. Only the value's type is checked.
    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        self.options.set(name.parse()?, value.into())
    }

    /// Read an option by name.
    pub fn get_option(&self, name: &str) -> Result<OptionValue> {
        Ok(self.options.get(name.parse()?))
    }

    // ---- subscription surface ----

    /// Subscribe to one notification channel.
    pub fn on<F>(&mut self, n: Notification, f: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.notifier.on(n, Box::new(f));
    }

    /// Subscribe to every notification.
    pub fn on_any<F>(&mut self, f: F)
    where
        F: FnMut(Notification) + Send + 'static,
    {
        self.notifier.on_any(Box::new(f));
    }

    /// A cloneable sender for requests from other tasks or threads.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.tx.clone(),
        }
    }

    // ---- inspection ----

    /// True once the readiness transition has completed.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// The status icon, once created.
    pub fn icon(&self) -> Option<&dyn IconHandle> {
        self.icon.as_deref()
    }

    /// The live popup window, if any.
    pub fn window(&self) -> Option<&dyn PopupWindow> {
        self.window.as_ref().map(|s| s.window.as_ref())
    }

    /// Identity of the live popup window, if any.
    pub fn window_id(&self) -> Option<WindowId> {
        self.window.as_ref().map(|s| s.id)
    }

    /// True when a window exists and is visible.
    pub fn is_visible(&self) -> bool {
        self.window.as_ref().is_some_and(|s| s.window.is_visible())
    }

    /// Last known icon rectangle.
    pub fn cached_anchor(&self) -> Option<Rect> {
        self.cached_anchor
    }

    /// Whether the icon accepted a highlight mode at readiness.
    pub fn highlight_supported(&self) -> bool {
        self.highlight_supported
    }

    // ---- event pump ----

    /// Apply every queued event. Returns how many were applied.
    ///
    /// Stops at the first error, leaving later events queued.
    pub fn process_pending(&mut self) -> Result<usize> {
        let mut n = 0;
        loop {
            match self.rx.try_recv() {
                Ok(ev) => {
                    self.dispatch(ev)?;
                    n += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(n),
            }
        }
    }

    /// Apply queued events as they arrive until a `Shutdown` is received.
    pub async fn run(&mut self) -> Result<()> {
        while let Some(ev) = self.rx.recv().await {
            if !self.dispatch(ev)? {
                break;
            }
        }
        Ok(())
    }

    /// Apply a single event. Returns `false` for `Shutdown`.
    pub fn dispatch(&mut self, ev: ControllerEvent) -> Result<bool> {
        trace!(event = ?ev, "dispatch");
        match ev {
            ControllerEvent::Ready => self.on_ready()?,
            ControllerEvent::Shutdown => return Ok(false),
            ev if !self.is_ready() => warn!(event = ?ev, "event before ready; ignored"),
            ControllerEvent::IconActivated(a) => self.on_icon_activated(a)?,
            ControllerEvent::WindowBlurred(id) => self.on_window_blurred(id)?,
            ControllerEvent::WindowClosed(id) => self.on_window_closed(id),
            ControllerEvent::Show(anchor) => self.show_window(anchor)?,
            ControllerEvent::Hide => self.hide_window()?,
        }
        Ok(true)
    }

    // ---- readiness ----

    fn on_ready(&mut self) -> Result<()> {
        if self.phase != Phase::Waiting {
            trace!("readiness already handled");
            return Ok(());
        }
        self.phase = Phase::Starting;

        if self.policy.has_dock_presence && !self.options.show_dock {
            match self.host.hide_app_switcher_presence() {
                Ok(()) => debug!("dock presence hidden"),
                Err(Error::Unsupported) => debug!("dock presence not supported"),
                Err(e) => return Err(e),
            }
        }

        let mut icon = match self.injected_icon.take() {
            Some(icon) => icon,
            None => {
                let source = self.options.icon_source();
                debug!(?source, "creating icon");
                self.windows.create_icon(&source)?
            }
        };
        icon.on(self.options.click_trigger.event(), self.activation_handler());
        icon.on(IconEvent::DoubleClick, self.activation_handler());
        icon.set_tooltip(&self.options.tooltip)?;

        self.highlight_supported = icon.supports_highlight()
            && match icon.set_highlight_mode(HighlightMode::Never) {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "highlight mode unavailable");
                    false
                }
            };
        self.icon = Some(icon);

        if self.options.preload_window {
            self.create_window()?;
        }

        self.phase = Phase::Ready;
        info!(
            highlight = self.highlight_supported,
            placement = %self.options.placement,
            "popup controller ready"
        );
        self.notifier.emit(Notification::Ready);
        Ok(())
    }

    fn require_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    // ---- state machine ----

    /// Handle an icon click: modifier-click always hides, a click on a
    /// visible window hides it, anything else shows the window at the click's
    /// bounds (or the cached ones).
    pub fn on_icon_activated(&mut self, a: Activation) -> Result<()> {
        self.require_ready()?;
        if a.modifiers.any() {
            debug!("modifier click; hiding");
            return self.hide_window();
        }
        if self.is_visible() {
            return self.hide_window();
        }
        let bounds = a.bounds.filter(|b| !b.is_degenerate());
        if bounds.is_some() {
            self.cached_anchor = bounds;
        }
        self.show_window(bounds.or(self.cached_anchor))
    }

    /// Create the popup window unless one already exists.
    pub fn ensure_window(&mut self) -> Result<()> {
        self.require_ready()?;
        self.create_window()
    }

    fn create_window(&mut self) -> Result<()> {
        if self.window.is_some() {
            return Ok(());
        }
        self.notifier.emit(Notification::CreateWindow);

        let window = self.windows.create_window(&self.options.window_params())?;
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        let on_blur = self.window_handler(ControllerEvent::WindowBlurred(id));
        let on_close = self.window_handler(ControllerEvent::WindowClosed(id));

        // Stored before setup so a failing step cannot orphan the native window.
        let slot = self.window.insert(WindowSlot { id, window });
        slot.window.on_blur(on_blur);
        if self.options.show_on_all_workspaces {
            slot.window.set_visible_on_all_workspaces(true)?;
        }
        slot.window.on_close(on_close);
        slot.window.load_content(&self.options.content)?;
        debug!(window = %id, content = %self.options.content, "window created");

        self.notifier.emit(Notification::AfterCreateWindow);
        Ok(())
    }

    /// Show the popup, creating it if needed, positioned against `anchor`, the
    /// cached anchor, or the icon's current bounds, in that order.
    pub fn show_window(&mut self, anchor: Option<Rect>) -> Result<()> {
        self.require_ready()?;
        self.set_highlight(HighlightMode::Always);
        self.create_window()?;
        self.notifier.emit(Notification::Show);

        let pos = self.target_position(anchor)?;
        if let Some(slot) = self.window.as_mut() {
            slot.window.set_position(pos)?;
            slot.window.show()?;
            debug!(window = %slot.id, x = pos.x, y = pos.y, "window shown");
        }
        self.notifier.emit(Notification::AfterShow);
        Ok(())
    }

    /// Hide the popup without destroying it. A no-op when no window exists.
    pub fn hide_window(&mut self) -> Result<()> {
        self.require_ready()?;
        self.set_highlight(HighlightMode::Never);
        let Some(slot) = self.window.as_mut() else {
            trace!("hide with no window");
            return Ok(());
        };
        self.notifier.emit(Notification::Hide);
        slot.window.hide()?;
        debug!(window = %slot.id, "window hidden");
        self.notifier.emit(Notification::AfterHide);
        Ok(())
    }

    fn on_window_blurred(&mut self, id: WindowId) -> Result<()> {
        if self.window_id() != Some(id) {
            warn!(window = %id, "blur from stale window ignored");
            return Ok(());
        }
        if self.options.keep_on_top {
            self.notifier.emit(Notification::FocusLost);
            Ok(())
        } else {
            self.hide_window()
        }
    }

    fn on_window_closed(&mut self, id: WindowId) {
        if self.window_id() != Some(id) {
            warn!(window = %id, "close from stale window ignored");
            return;
        }
        self.window = None;
        debug!(window = %id, "window closed");
        self.notifier.emit(Notification::AfterClose);
    }

    // ---- positioning ----

    /// Pick the anchor for a show: a usable explicit rectangle (cached for
    /// later), else the cache, else whatever the icon reports now.
    fn resolve_anchor(&mut self, explicit: Option<Rect>) -> Option<Rect> {
        if let Some(r) = explicit.filter(|r| !r.is_degenerate()) {
            self.cached_anchor = Some(r);
            return Some(r);
        }
        if self.cached_anchor.is_some() {
            return self.cached_anchor;
        }
        let queried = self.icon.as_ref().and_then(|i| i.bounds());
        if let Some(r) = queried.filter(|r| !r.is_degenerate()) {
            self.cached_anchor = Some(r);
        }
        queried
    }

    /// The configured placement, or the platform's screen corner when an
    /// anchored placement has no usable anchor.
    fn effective_placement(&self, anchor: Option<Rect>) -> Placement {
        let configured = self.options.placement;
        if configured.is_anchored() && anchor.is_none_or(|a| a.is_degenerate()) {
            debug!(
                configured = %configured,
                fallback = %self.policy.fallback_corner,
                "no usable anchor; using screen corner"
            );
            self.policy.fallback_corner
        } else {
            configured
        }
    }

    fn target_position(&mut self, explicit: Option<Rect>) -> Result<Point> {
        let anchor = self.resolve_anchor(explicit);
        let placement = self.effective_placement(anchor);
        let resolved = self
            .resolver
            .calculate(placement, anchor, self.options.size())?;
        Ok(self.options.position.apply(resolved))
    }

    // ---- helpers ----

    fn set_highlight(&mut self, mode: HighlightMode) {
        if !self.highlight_supported {
            return;
        }
        if let Some(icon) = self.icon.as_mut()
            && let Err(e) = icon.set_highlight_mode(mode)
        {
            debug!(error = %e, ?mode, "set highlight failed");
        }
    }

    fn activation_handler(&self) -> ActivationHandler {
        let tx = self.tx.clone();
        Box::new(move |a| forward(&tx, ControllerEvent::IconActivated(a)))
    }

    fn window_handler(&self, ev: ControllerEvent) -> WindowHandler {
        let tx = self.tx.clone();
        Box::new(move || forward(&tx, ev.clone()))
    }
}

fn forward(tx: &UnboundedSender<ControllerEvent>, ev: ControllerEvent) {
    if tx.send(ev).is_err() {
        trace!("controller dropped; event discarded");
    }
}

/// Cloneable sender for driving a [`Controller`] from elsewhere.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    /// Request a show at `anchor` (or the cached anchor).
    pub fn show(&self, anchor: Option<Rect>) -> Result<()> {
        self.send(ControllerEvent::Show(anchor))
    }

    /// Request a hide.
    pub fn hide(&self) -> Result<()> {
        self.send(ControllerEvent::Hide)
    }

    /// Stop [`Controller::run`].
    pub fn shutdown(&self) -> Result<()> {
        self.send(ControllerEvent::Shutdown)
    }

    /// Enqueue an arbitrary event.
    pub fn send(&self, ev: ControllerEvent) -> Result<()> {
        self.tx.send(ev).map_err(|_| Error::ChannelClosed)
    }
}
