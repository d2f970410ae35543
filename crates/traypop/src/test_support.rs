//! Recording test doubles for every collaborator.
//! These helpers are public so integration tests can use them; they are
//! intended for the test suite only.
//!
//! Each double is a cheap clone over shared state: hand one clone to the
//! controller and keep another to fire events and inspect calls.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{
    Controller, Error, Result,
    controller::Collaborators,
    geom::{Point, Rect, Size},
    host::{
        Activation, ActivationHandler, HighlightMode, HostRuntime, IconEvent, IconHandle,
        Modifiers, PopupWindow, ReadyCallback, WindowHandler, WindowSystem,
    },
    options::{IconSource, RawOptions, WindowParams},
    placement::{Placement, PlacementResolver, Positioner},
    platform::OsFamily,
};

/// Work area used by [`MockResolver::new`]: a 1920x1080 display with a 25px menu bar.
pub const TEST_WORK_AREA: Rect = Rect::new(0, 25, 1920, 1055);

/// Shared, ordered call log.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    /// Append one call.
    pub fn note(&self, s: impl Into<String>) {
        self.0.lock().push(s.into());
    }
    /// Every call so far, oldest first.
    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }
    /// True if `s` was recorded at least once.
    pub fn contains(&self, s: &str) -> bool {
        self.0.lock().iter().any(|x| x == s)
    }
    /// How many times `s` was recorded.
    pub fn count(&self, s: &str) -> usize {
        self.0.lock().iter().filter(|x| *x == s).count()
    }
    /// Forget every call.
    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

// ---- host ----

/// Host runtime whose readiness is fired by the test.
#[derive(Clone)]
pub struct MockHost {
    ready: Arc<AtomicBool>,
    callbacks: Arc<Mutex<Vec<ReadyCallback>>>,
    root: PathBuf,
    dock_supported: Arc<AtomicBool>,
    /// Shared call log.
    pub calls: Calls,
}

impl MockHost {
    /// Host that is not ready yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            callbacks: Arc::new(Mutex::new(Vec::new())),
            root: root.into(),
            dock_supported: Arc::new(AtomicBool::new(true)),
            calls: Calls::default(),
        }
    }

    /// A host that reports ready from the start.
    pub fn ready(root: impl Into<PathBuf>) -> Self {
        let h = Self::new(root);
        h.ready.store(true, Ordering::SeqCst);
        h
    }

    /// Mark ready and run registered callbacks once.
    pub fn fire_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        let cbs: Vec<_> = self.callbacks.lock().drain(..).collect();
        for cb in cbs {
            cb();
        }
    }

    /// Readiness callbacks registered and not yet fired.
    pub fn pending_callbacks(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Make dock hiding fail when `v` is false.
    pub fn set_dock_supported(&self, v: bool) {
        self.dock_supported.store(v, Ordering::SeqCst);
    }
}

impl HostRuntime for MockHost {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
    fn on_ready(&self, callback: ReadyCallback) {
        self.calls.note("on_ready");
        self.callbacks.lock().push(callback);
    }
    fn app_root(&self) -> PathBuf {
        self.root.clone()
    }
    fn hide_app_switcher_presence(&self) -> Result<()> {
        self.calls.note("hide_dock");
        if self.dock_supported.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Unsupported)
        }
    }
}

// ---- icon ----

struct IconState {
    source: Option<IconSource>,
    handlers: Mutex<HashMap<IconEvent, Vec<ActivationHandler>>>,
    tooltip: Mutex<Option<String>>,
    highlight_supported: AtomicBool,
    highlights: Mutex<Vec<HighlightMode>>,
    bounds: Mutex<Option<Rect>>,
}

/// Status icon double.
#[derive(Clone)]
pub struct MockIcon {
    state: Arc<IconState>,
    /// Shared call log.
    pub calls: Calls,
}

impl MockIcon {
    /// Icon built from `source`, recording into `calls`.
    pub fn new(source: Option<IconSource>, calls: Calls) -> Self {
        Self {
            state: Arc::new(IconState {
                source,
                handlers: Mutex::new(HashMap::new()),
                tooltip: Mutex::new(None),
                highlight_supported: AtomicBool::new(true),
                highlights: Mutex::new(Vec::new()),
                bounds: Mutex::new(None),
            }),
            calls,
        }
    }

    /// Image the icon was created from; `None` for injected icons.
    pub fn source(&self) -> Option<IconSource> {
        self.state.source.clone()
    }

    /// Fire `event` to every subscribed handler.
    pub fn fire(&self, event: IconEvent, a: Activation) {
        if let Some(hs) = self.state.handlers.lock().get(&event) {
            for h in hs {
                h(a);
            }
        }
    }

    /// Plain primary click at `bounds`.
    pub fn click(&self, bounds: Option<Rect>) {
        self.fire(
            IconEvent::Click,
            Activation {
                modifiers: Modifiers::default(),
                bounds,
            },
        );
    }

    /// Primary click with modifiers held.
    pub fn click_with(&self, modifiers: Modifiers, bounds: Option<Rect>) {
        self.fire(IconEvent::Click, Activation { modifiers, bounds });
    }

    /// Handlers bound for `event`.
    pub fn handler_count(&self, event: IconEvent) -> usize {
        self.state.handlers.lock().get(&event).map_or(0, Vec::len)
    }

    /// Last tooltip set.
    pub fn tooltip(&self) -> Option<String> {
        self.state.tooltip.lock().clone()
    }

    /// Make `set_highlight_mode` fail when `v` is false.
    pub fn set_highlight_supported(&self, v: bool) {
        self.state.highlight_supported.store(v, Ordering::SeqCst);
    }

    /// Accepted highlight modes, in order.
    pub fn highlights(&self) -> Vec<HighlightMode> {
        self.state.highlights.lock().clone()
    }

    /// Bounds reported by `bounds()`.
    pub fn set_bounds(&self, r: Option<Rect>) {
        *self.state.bounds.lock() = r;
    }
}

impl IconHandle for MockIcon {
    fn on(&mut self, event: IconEvent, handler: ActivationHandler) {
        self.calls.note(format!("icon.on:{event:?}"));
        self.state
            .handlers
            .lock()
            .entry(event)
            .or_default()
            .push(handler);
    }
    fn set_tooltip(&mut self, text: &str) -> Result<()> {
        *self.state.tooltip.lock() = Some(text.to_string());
        Ok(())
    }
    fn set_highlight_mode(&mut self, mode: HighlightMode) -> Result<()> {
        if !self.state.highlight_supported.load(Ordering::SeqCst) {
            return Err(Error::Unsupported);
        }
        self.state.highlights.lock().push(mode);
        Ok(())
    }
    fn bounds(&self) -> Option<Rect> {
        *self.state.bounds.lock()
    }
}

// ---- window ----

struct WindowState {
    params: WindowParams,
    visible: AtomicBool,
    all_workspaces: AtomicBool,
    position: Mutex<Option<Point>>,
    content: Mutex<Option<String>>,
    fail_load: AtomicBool,
    blur: Mutex<Vec<WindowHandler>>,
    close: Mutex<Vec<WindowHandler>>,
}

/// Popup window double.
#[derive(Clone)]
pub struct MockWindow {
    state: Arc<WindowState>,
    /// Shared call log.
    pub calls: Calls,
}

impl MockWindow {
    /// Window created with `params`.
    pub fn new(params: WindowParams, calls: Calls) -> Self {
        Self {
            state: Arc::new(WindowState {
                params,
                visible: AtomicBool::new(params.visible),
                all_workspaces: AtomicBool::new(false),
                position: Mutex::new(None),
                content: Mutex::new(None),
                fail_load: AtomicBool::new(false),
                blur: Mutex::new(Vec::new()),
                close: Mutex::new(Vec::new()),
            }),
            calls,
        }
    }

    /// Creation parameters.
    pub fn params(&self) -> WindowParams {
        self.state.params
    }
    /// Current visibility.
    pub fn visible(&self) -> bool {
        self.state.visible.load(Ordering::SeqCst)
    }
    /// Last position set.
    pub fn position(&self) -> Option<Point> {
        *self.state.position.lock()
    }
    /// Last URI loaded.
    pub fn content(&self) -> Option<String> {
        self.state.content.lock().clone()
    }
    /// Whether the window was pinned to every workspace.
    pub fn on_all_workspaces(&self) -> bool {
        self.state.all_workspaces.load(Ordering::SeqCst)
    }

    /// Make `load_content` fail.
    pub fn set_fail_load(&self, v: bool) {
        self.state.fail_load.store(v, Ordering::SeqCst);
    }

    /// Simulate focus loss.
    pub fn blur(&self) {
        for h in self.state.blur.lock().iter() {
            h();
        }
    }

    /// Simulate the window being closed by the user or the OS.
    pub fn close(&self) {
        self.state.visible.store(false, Ordering::SeqCst);
        for h in self.state.close.lock().iter() {
            h();
        }
    }
}

impl PopupWindow for MockWindow {
    fn on_blur(&mut self, handler: WindowHandler) {
        self.state.blur.lock().push(handler);
    }
    fn on_close(&mut self, handler: WindowHandler) {
        self.state.close.lock().push(handler);
    }
    fn set_visible_on_all_workspaces(&mut self, visible: bool) -> Result<()> {
        self.state.all_workspaces.store(visible, Ordering::SeqCst);
        Ok(())
    }
    fn load_content(&mut self, uri: &str) -> Result<()> {
        self.calls.note("window.load");
        if self.state.fail_load.load(Ordering::SeqCst) {
            return Err(Error::backend("content refused"));
        }
        *self.state.content.lock() = Some(uri.to_string());
        Ok(())
    }
    fn set_position(&mut self, pos: Point) -> Result<()> {
        *self.state.position.lock() = Some(pos);
        Ok(())
    }
    fn show(&mut self) -> Result<()> {
        self.calls.note("window.show");
        self.state.visible.store(true, Ordering::SeqCst);
        Ok(())
    }
    fn hide(&mut self) -> Result<()> {
        self.calls.note("window.hide");
        self.state.visible.store(false, Ordering::SeqCst);
        Ok(())
    }
    fn is_visible(&self) -> bool {
        self.visible()
    }
}

// ---- factory ----

/// Window system double; remembers everything it created.
#[derive(Clone, Default)]
pub struct MockWindowSystem {
    icons: Arc<Mutex<Vec<MockIcon>>>,
    windows: Arc<Mutex<Vec<MockWindow>>>,
    fail_create_window: Arc<AtomicBool>,
    fail_load_content: Arc<AtomicBool>,
    icon_highlight_supported: Arc<Mutex<Option<bool>>>,
    icon_bounds: Arc<Mutex<Option<Rect>>>,
    /// Shared call log.
    pub calls: Calls,
}

impl MockWindowSystem {
    /// Empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Icons created so far.
    pub fn icons(&self) -> Vec<MockIcon> {
        self.icons.lock().clone()
    }

    /// The most recently created icon.
    pub fn icon(&self) -> Option<MockIcon> {
        self.icons.lock().last().cloned()
    }

    /// Windows created so far, oldest first.
    pub fn windows(&self) -> Vec<MockWindow> {
        self.windows.lock().clone()
    }

    /// The most recently created window.
    pub fn window(&self) -> Option<MockWindow> {
        self.windows.lock().last().cloned()
    }

    /// Windows created so far, including closed ones.
    pub fn window_count(&self) -> usize {
        self.windows.lock().len()
    }

    /// Make `create_window` fail while `v` is true.
    pub fn set_fail_create_window(&self, v: bool) {
        self.fail_create_window.store(v, Ordering::SeqCst);
    }

    /// Make `load_content` fail on windows created from now on.
    pub fn set_fail_load_content(&self, v: bool) {
        self.fail_load_content.store(v, Ordering::SeqCst);
    }

    /// Configure highlight support on icons created from now on.
    pub fn set_icon_highlight_supported(&self, v: bool) {
        *self.icon_highlight_supported.lock() = Some(v);
    }

    /// Configure reported bounds on icons created from now on.
    pub fn set_icon_bounds(&self, r: Option<Rect>) {
        *self.icon_bounds.lock() = r;
    }
}

impl WindowSystem for MockWindowSystem {
    fn create_icon(&self, source: &IconSource) -> Result<Box<dyn IconHandle>> {
        self.calls.note("create_icon");
        let icon = MockIcon::new(Some(source.clone()), self.calls.clone());
        if let Some(v) = *self.icon_highlight_supported.lock() {
            icon.set_highlight_supported(v);
        }
        icon.set_bounds(*self.icon_bounds.lock());
        self.icons.lock().push(icon.clone());
        Ok(Box::new(icon))
    }

    fn create_window(&self, params: &WindowParams) -> Result<Box<dyn PopupWindow>> {
        self.calls.note("create_window");
        if self.fail_create_window.load(Ordering::SeqCst) {
            return Err(Error::backend("window creation refused"));
        }
        let w = MockWindow::new(*params, self.calls.clone());
        w.set_fail_load(self.fail_load_content.load(Ordering::SeqCst));
        self.windows.lock().push(w.clone());
        Ok(Box::new(w))
    }
}

// ---- resolver ----

/// One recorded placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementCall {
    /// Requested placement.
    pub placement: Placement,
    /// Anchor passed along, if any.
    pub anchor: Option<Rect>,
    /// Window size.
    pub size: Size,
}

/// Resolver that records requests and delegates to a [`Positioner`].
#[derive(Clone)]
pub struct MockResolver {
    inner: Positioner,
    calls: Arc<Mutex<Vec<PlacementCall>>>,
}

impl MockResolver {
    /// Resolver over [`TEST_WORK_AREA`].
    pub fn new() -> Self {
        Self::with_work_area(TEST_WORK_AREA)
    }

    /// Resolver over the given work area.
    pub fn with_work_area(wa: Rect) -> Self {
        Self {
            inner: Positioner::new(wa),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every resolution request, oldest first.
    pub fn calls(&self) -> Vec<PlacementCall> {
        self.calls.lock().clone()
    }

    /// Most recent resolution request.
    pub fn last(&self) -> Option<PlacementCall> {
        self.calls.lock().last().copied()
    }

    /// What the wrapped positioner returns for a request.
    pub fn expected(&self, placement: Placement, anchor: Option<Rect>, size: Size) -> Point {
        self.inner
            .calculate(placement, anchor, size)
            .unwrap_or_default()
    }
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementResolver for MockResolver {
    fn calculate(&self, placement: Placement, anchor: Option<Rect>, size: Size) -> Result<Point> {
        self.calls.lock().push(PlacementCall {
            placement,
            anchor,
            size,
        });
        self.inner.calculate(placement, anchor, size)
    }
}

// ---- harness ----

/// All doubles wired together.
#[derive(Clone)]
pub struct Harness {
    /// Host double.
    pub host: MockHost,
    /// Window system double.
    pub system: MockWindowSystem,
    /// Placement double.
    pub resolver: MockResolver,
    /// Platform reported to the controller.
    pub os: OsFamily,
}

impl Harness {
    /// Host not yet ready, rooted at `/app-root`, Linux policy.
    pub fn new() -> Self {
        Self::with_host(MockHost::new("/app-root"))
    }

    /// Host already ready.
    pub fn ready() -> Self {
        Self::with_host(MockHost::ready("/app-root"))
    }

    /// Harness around a preconfigured host.
    pub fn with_host(host: MockHost) -> Self {
        Self {
            host,
            system: MockWindowSystem::new(),
            resolver: MockResolver::new(),
            os: OsFamily::Linux,
        }
    }

    /// Override the reported platform.
    pub fn os(mut self, os: OsFamily) -> Self {
        self.os = os;
        self
    }

    /// Boxed collaborators sharing this harness's state.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Arc::new(self.host.clone()),
            Arc::new(self.system.clone()),
            Arc::new(self.resolver.clone()),
        )
        .with_os(self.os)
    }

    /// Initialise a controller over these doubles.
    pub fn controller(&self, raw: RawOptions) -> Result<Controller> {
        Controller::initialize(raw, self.collaborators())
    }

    /// Initialise, fire readiness and process it.
    pub fn ready_controller(&self, raw: RawOptions) -> Result<Controller> {
        let mut c = self.controller(raw)?;
        self.host.fire_ready();
        c.process_pending()?;
        Ok(c)
    }

    /// The icon the controller created. Panics if none was.
    pub fn icon(&self) -> MockIcon {
        self.system.icon().expect("controller created an icon")
    }

    /// The live window. Panics if none was created.
    pub fn window(&self) -> MockWindow {
        self.system.window().expect("controller created a window")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Record every notification the controller emits.
pub fn record_notifications(c: &mut Controller) -> Arc<Mutex<Vec<crate::Notification>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = log.clone();
    c.on_any(move |n| l.lock().push(n));
    log
}
