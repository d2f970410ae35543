//! In-process desktop for the simulator.
//!
//! Implements the controller's collaborator traits without any toolkit:
//! native operations are logged, and the scenario fires icon and window
//! events through [`SimDesktop`].

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use tracing::{debug, info};
use traypop::{
    Activation, HighlightMode, HostRuntime, IconEvent, IconHandle, IconSource, Modifiers, Point,
    PopupWindow, Rect, Result, WindowParams, WindowSystem,
    host::{ActivationHandler, ReadyCallback, WindowHandler},
};

/// Host runtime that is ready from the start.
pub struct SimHost {
    /// Directory reported as the application root.
    root: PathBuf,
}

impl SimHost {
    /// Host rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl HostRuntime for SimHost {
    fn is_ready(&self) -> bool {
        true
    }

    fn on_ready(&self, callback: ReadyCallback) {
        callback();
    }

    fn app_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn hide_app_switcher_presence(&self) -> Result<()> {
        info!("dock icon hidden");
        Ok(())
    }
}

/// Shared icon state; handlers are fired by the scenario.
struct IconState {
    /// Reported on-screen rectangle.
    bounds: Rect,
    /// Subscribed handlers per event kind.
    handlers: Mutex<HashMap<IconEvent, Vec<ActivationHandler>>>,
}

struct SimIcon(Arc<IconState>);

impl IconHandle for SimIcon {
    fn on(&mut self, event: IconEvent, handler: ActivationHandler) {
        debug!(?event, "icon handler bound");
        self.0
            .handlers
            .lock()
            .entry(event)
            .or_default()
            .push(handler);
    }

    fn set_tooltip(&mut self, text: &str) -> Result<()> {
        info!(tooltip = text, "icon tooltip set");
        Ok(())
    }

    fn set_highlight_mode(&mut self, mode: HighlightMode) -> Result<()> {
        debug!(?mode, "icon highlight");
        Ok(())
    }

    fn bounds(&self) -> Option<Rect> {
        Some(self.0.bounds)
    }
}

/// Shared popup window state.
struct WindowState {
    /// Creation order, starting at 1.
    serial: usize,
    visible: AtomicBool,
    blur: Mutex<Vec<WindowHandler>>,
    close: Mutex<Vec<WindowHandler>>,
}

struct SimWindow(Arc<WindowState>);

impl PopupWindow for SimWindow {
    fn on_blur(&mut self, handler: WindowHandler) {
        self.0.blur.lock().push(handler);
    }

    fn on_close(&mut self, handler: WindowHandler) {
        self.0.close.lock().push(handler);
    }

    fn set_visible_on_all_workspaces(&mut self, visible: bool) -> Result<()> {
        debug!(serial = self.0.serial, visible, "all workspaces");
        Ok(())
    }

    fn load_content(&mut self, uri: &str) -> Result<()> {
        info!(serial = self.0.serial, uri, "content loaded");
        Ok(())
    }

    fn set_position(&mut self, pos: Point) -> Result<()> {
        info!(serial = self.0.serial, x = pos.x, y = pos.y, "window moved");
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.0.visible.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.0.visible.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.0.visible.load(Ordering::SeqCst)
    }
}

/// A single display with a status icon on its bar.
#[derive(Clone)]
pub struct SimDesktop {
    work_area: Rect,
    icon_bounds: Rect,
    icon: Arc<Mutex<Option<Arc<IconState>>>>,
    windows: Arc<Mutex<Vec<Arc<WindowState>>>>,
}

impl SimDesktop {
    /// A `width`x`height` screen losing `bar` pixels to a top bar, with a
    /// 22px icon at `icon_x` inside that bar.
    pub fn new(width: u32, height: u32, bar: u32, icon_x: i32) -> Self {
        let bar_px = i32::try_from(bar).unwrap_or(0);
        Self {
            work_area: Rect::new(0, bar_px, width, height.saturating_sub(bar)),
            icon_bounds: Rect::new(icon_x, 0, 22, bar.max(22)),
            icon: Arc::new(Mutex::new(None)),
            windows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Usable area for placement.
    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    /// Fire an icon event with the icon's current bounds. Returns `false` if
    /// no icon exists yet.
    pub fn fire_icon(&self, event: IconEvent, modifiers: Modifiers) -> bool {
        let Some(icon) = self.icon.lock().clone() else {
            return false;
        };
        let a = Activation {
            modifiers,
            bounds: Some(icon.bounds),
        };
        if let Some(hs) = icon.handlers.lock().get(&event) {
            for h in hs {
                h(a);
            }
        }
        true
    }

    /// Blur the newest window. Returns `false` if there is none.
    pub fn blur(&self) -> bool {
        self.with_newest(|w| {
            for h in w.blur.lock().iter() {
                h();
            }
        })
    }

    /// Close the newest window. Returns `false` if there is none.
    pub fn close(&self) -> bool {
        self.with_newest(|w| {
            w.visible.store(false, Ordering::SeqCst);
            info!(serial = w.serial, "window closed");
            for h in w.close.lock().iter() {
                h();
            }
        })
    }

    /// Number of windows created so far.
    pub fn window_count(&self) -> usize {
        self.windows.lock().len()
    }

    fn with_newest(&self, f: impl FnOnce(&WindowState)) -> bool {
        let newest = self.windows.lock().last().cloned();
        match newest {
            Some(w) => {
                f(&w);
                true
            }
            None => false,
        }
    }
}

impl WindowSystem for SimDesktop {
    fn create_icon(&self, source: &IconSource) -> Result<Box<dyn IconHandle>> {
        match source {
            IconSource::File(p) => info!(path = %p.display(), "icon created"),
            IconSource::Bundled(bytes) => info!(bytes = bytes.len(), "icon created from bundle"),
        }
        let state = Arc::new(IconState {
            bounds: self.icon_bounds,
            handlers: Mutex::new(HashMap::new()),
        });
        *self.icon.lock() = Some(state.clone());
        Ok(Box::new(SimIcon(state)))
    }

    fn create_window(&self, params: &WindowParams) -> Result<Box<dyn PopupWindow>> {
        let mut windows = self.windows.lock();
        let state = Arc::new(WindowState {
            serial: windows.len() + 1,
            visible: AtomicBool::new(params.visible),
            blur: Mutex::new(Vec::new()),
            close: Mutex::new(Vec::new()),
        });
        info!(
            serial = state.serial,
            width = params.size.width,
            height = params.size.height,
            on_top = params.always_on_top,
            "window created"
        );
        windows.push(state.clone());
        Ok(Box::new(SimWindow(state)))
    }
}
