//! Controller configuration.
//!
//! [`RawOptions`] is what the embedder writes (every field optional, RON or
//! struct literal). [`Options::resolve`] normalises it once, failing fast on
//! invalid values. After that, options can be read and mutated freely through
//! [`Options::get`]/[`Options::set`] without re-validation.

use std::{
    fmt, fs,
    path::{self, Path, PathBuf},
    str::FromStr,
};

use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    geom::{Point, Size},
    host::IconEvent,
    placement::Placement,
    platform::OsFamily,
};

/// Default popup width and height in pixels.
pub const DEFAULT_SIZE: u32 = 400;

/// Conventional icon filename looked up in the base directory.
pub const ICON_FILE_NAME: &str = "IconTemplate.png";

/// Content file looked up in the base directory when no content source is given.
pub const INDEX_FILE_NAME: &str = "index.html";

/// Icon shipped with the crate; the last-resort fallback.
pub static BUNDLED_ICON: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/IconTemplate.png"
));

/// Which icon event opens the popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickTrigger {
    /// Primary (left) click.
    #[default]
    #[serde(alias = "click")]
    Primary,
    /// Secondary (right) click.
    #[serde(alias = "right-click")]
    Secondary,
}

impl ClickTrigger {
    /// The icon event this trigger listens to.
    pub const fn event(self) -> IconEvent {
        match self {
            Self::Primary => IconEvent::Click,
            Self::Secondary => IconEvent::RightClick,
        }
    }
}

/// Explicit coordinates overriding computed placement, per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPosition {
    /// Fixed left edge, if any.
    pub x: Option<i32>,
    /// Fixed top edge, if any.
    pub y: Option<i32>,
}

impl FixedPosition {
    /// Replace the axes of `resolved` that this position pins.
    pub fn apply(self, resolved: Point) -> Point {
        Point::new(self.x.unwrap_or(resolved.x), self.y.unwrap_or(resolved.y))
    }

    /// True when neither axis is pinned.
    pub const fn is_unset(self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// Where the icon image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// An image file on disk.
    File(PathBuf),
    /// The PNG embedded in this crate.
    Bundled(&'static [u8]),
}

/// Unvalidated options as supplied by the embedder.
///
/// Field aliases accept the camelCase names used by older menubar configs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawOptions {
    /// Base directory for default asset lookup.
    #[serde(alias = "dir")]
    pub base_dir: Option<PathBuf>,
    /// URI loaded into the popup.
    #[serde(alias = "index")]
    pub content: Option<String>,
    /// Placement policy name.
    #[serde(alias = "windowPosition")]
    pub placement: Option<String>,
    /// Keep the dock/app-switcher presence visible.
    #[serde(alias = "showDockIcon")]
    pub show_dock: Option<bool>,
    /// Popup width.
    pub width: Option<u32>,
    /// Popup height.
    pub height: Option<u32>,
    /// Icon tooltip.
    pub tooltip: Option<String>,
    /// Create the popup at readiness rather than on first show.
    #[serde(alias = "preloadWindow")]
    pub preload_window: Option<bool>,
    /// Icon event that toggles the popup.
    #[serde(alias = "clickTrigger")]
    pub click_trigger: Option<ClickTrigger>,
    /// Emit `focus-lost` on blur instead of hiding.
    #[serde(alias = "alwaysOnTop")]
    pub keep_on_top: Option<bool>,
    /// Show the popup on every workspace.
    #[serde(alias = "showOnAllWorkspaces")]
    pub show_on_all_workspaces: Option<bool>,
    /// Explicit icon image path.
    pub icon: Option<PathBuf>,
    /// Fixed x coordinate.
    pub x: Option<i32>,
    /// Fixed y coordinate.
    pub y: Option<i32>,
}

impl RawOptions {
    /// Options with only the base directory set.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Parse options from RON text. `Option` fields may be written bare.
    pub fn from_ron(text: &str) -> Result<Self> {
        Self::parse(text, None)
    }

    /// Read and parse a RON options file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, Some(path))
    }

    fn parse(text: &str, path: Option<&Path>) -> Result<Self> {
        ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
            .map_err(|e| Error::Ron {
                path: path.map(Path::to_path_buf),
                message: e.to_string(),
            })
    }
}

impl From<PathBuf> for RawOptions {
    fn from(dir: PathBuf) -> Self {
        Self::in_dir(dir)
    }
}

impl From<&Path> for RawOptions {
    fn from(dir: &Path) -> Self {
        Self::in_dir(dir)
    }
}

/// Validated controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Absolute base directory.
    pub base_dir: PathBuf,
    /// URI loaded into the popup.
    pub content: String,
    /// Placement policy.
    pub placement: Placement,
    /// Keep the dock/app-switcher presence visible.
    pub show_dock: bool,
    /// Popup width, positive.
    pub width: u32,
    /// Popup height, positive.
    pub height: u32,
    /// Icon tooltip.
    pub tooltip: String,
    /// Create the popup at readiness.
    pub preload_window: bool,
    /// Icon event that toggles the popup.
    pub click_trigger: ClickTrigger,
    /// Emit `focus-lost` on blur instead of hiding.
    pub keep_on_top: bool,
    /// Show the popup on every workspace.
    pub show_on_all_workspaces: bool,
    /// Explicit icon image path.
    pub icon: Option<PathBuf>,
    /// Fixed position override.
    pub position: FixedPosition,
}

impl Options {
    /// Normalise `raw`, filling defaults and validating eagerly.
    ///
    /// `app_root` stands in for a missing base directory; `os` picks the
    /// default placement.
    pub fn resolve(raw: RawOptions, app_root: &Path, os: OsFamily) -> Result<Self> {
        let base_dir = absolutize(raw.base_dir.as_deref().unwrap_or(app_root))?;
        let content = raw
            .content
            .unwrap_or_else(|| file_url(&base_dir.join(INDEX_FILE_NAME)));
        let placement = match raw.placement {
            Some(name) => name.parse()?,
            None => os.policy().default_placement,
        };
        let width = positive("width", raw.width)?;
        let height = positive("height", raw.height)?;

        Ok(Self {
            base_dir,
            content,
            placement,
            show_dock: raw.show_dock.unwrap_or(false),
            width,
            height,
            tooltip: raw.tooltip.unwrap_or_default(),
            preload_window: raw.preload_window.unwrap_or(false),
            click_trigger: raw.click_trigger.unwrap_or_default(),
            keep_on_top: raw.keep_on_top.unwrap_or(false),
            show_on_all_workspaces: raw.show_on_all_workspaces.unwrap_or(true),
            icon: raw.icon,
            position: FixedPosition { x: raw.x, y: raw.y },
        })
    }

    /// Popup size.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pick the icon image: explicit path, then the conventional file in the
    /// base directory, then the bundled image. Missing files fall through.
    pub fn icon_source(&self) -> IconSource {
        let conventional = self.base_dir.join(ICON_FILE_NAME);
        self.icon
            .iter()
            .chain([&conventional])
            .find(|p| p.exists())
            .map_or(IconSource::Bundled(BUNDLED_ICON), |p| {
                IconSource::File(p.clone())
            })
    }

    /// Construction parameters handed to the window factory.
    pub fn window_params(&self) -> WindowParams {
        WindowParams {
            size: self.size(),
            visible: false,
            frame: false,
            always_on_top: self.keep_on_top,
            position: self.position,
        }
    }

    /// Read one option by name.
    pub fn get(&self, name: OptionName) -> OptionValue {
        match name {
            OptionName::BaseDir => OptionValue::Path(self.base_dir.clone()),
            OptionName::Content => OptionValue::Text(self.content.clone()),
            OptionName::Placement => OptionValue::Placement(self.placement),
            OptionName::ShowDock => OptionValue::Bool(self.show_dock),
            OptionName::Width => OptionValue::Size(self.width),
            OptionName::Height => OptionValue::Size(self.height),
            OptionName::Tooltip => OptionValue::Text(self.tooltip.clone()),
            OptionName::PreloadWindow => OptionValue::Bool(self.preload_window),
            OptionName::ClickTrigger => OptionValue::Trigger(self.click_trigger),
            OptionName::KeepOnTop => OptionValue::Bool(self.keep_on_top),
            OptionName::ShowOnAllWorkspaces => OptionValue::Bool(self.show_on_all_workspaces),
            OptionName::Icon => self
                .icon
                .clone()
                .map_or(OptionValue::Unset, OptionValue::Path),
            OptionName::X => self.position.x.map_or(OptionValue::Unset, OptionValue::Coord),
            OptionName::Y => self.position.y.map_or(OptionValue::Unset, OptionValue::Coord),
        }
    }

    /// Overwrite one option. Only the value's type is checked; integers are
    /// accepted for sizes and coordinates alike when they fit.
    pub fn set(&mut self, name: OptionName, value: OptionValue) -> Result<()> {
        let mismatch = || Error::OptionType {
            option: name.as_str(),
            expected: name.expected(),
        };
        match (name, value) {
            (OptionName::BaseDir, OptionValue::Path(p)) => self.base_dir = p,
            (OptionName::BaseDir, OptionValue::Text(s)) => self.base_dir = PathBuf::from(s),
            (OptionName::Content, OptionValue::Text(s)) => self.content = s,
            (OptionName::Placement, OptionValue::Placement(p)) => self.placement = p,
            (OptionName::Placement, OptionValue::Text(s)) => self.placement = s.parse()?,
            (OptionName::ShowDock, OptionValue::Bool(b)) => self.show_dock = b,
            (OptionName::Width, OptionValue::Size(v)) => self.width = v,
            (OptionName::Width, OptionValue::Coord(v)) => {
                self.width = u32::try_from(v).map_err(|_| mismatch())?;
            }
            (OptionName::Height, OptionValue::Size(v)) => self.height = v,
            (OptionName::Height, OptionValue::Coord(v)) => {
                self.height = u32::try_from(v).map_err(|_| mismatch())?;
            }
            (OptionName::Tooltip, OptionValue::Text(s)) => self.tooltip = s,
            (OptionName::PreloadWindow, OptionValue::Bool(b)) => self.preload_window = b,
            (OptionName::ClickTrigger, OptionValue::Trigger(t)) => self.click_trigger = t,
            (OptionName::KeepOnTop, OptionValue::Bool(b)) => self.keep_on_top = b,
            (OptionName::ShowOnAllWorkspaces, OptionValue::Bool(b)) => {
                self.show_on_all_workspaces = b;
            }
            (OptionName::Icon, OptionValue::Path(p)) => self.icon = Some(p),
            (OptionName::Icon, OptionValue::Text(s)) => self.icon = Some(PathBuf::from(s)),
            (OptionName::Icon, OptionValue::Unset) => self.icon = None,
            (OptionName::X, OptionValue::Coord(v)) => self.position.x = Some(v),
            (OptionName::X, OptionValue::Size(v)) => {
                self.position.x = Some(i32::try_from(v).map_err(|_| mismatch())?);
            }
            (OptionName::X, OptionValue::Unset) => self.position.x = None,
            (OptionName::Y, OptionValue::Coord(v)) => self.position.y = Some(v),
            (OptionName::Y, OptionValue::Size(v)) => {
                self.position.y = Some(i32::try_from(v).map_err(|_| mismatch())?);
            }
            (OptionName::Y, OptionValue::Unset) => self.position.y = None,
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

/// Window construction parameters, a narrow selection of [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    /// Initial size.
    pub size: Size,
    /// Whether the window is shown at creation. Always false.
    pub visible: bool,
    /// Whether native chrome is drawn. Always false.
    pub frame: bool,
    /// Keep the window above others.
    pub always_on_top: bool,
    /// Initial position override, if any.
    pub position: FixedPosition,
}

/// Names accepted by the dynamic option surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    /// `base-dir`
    BaseDir,
    /// `content`
    Content,
    /// `placement`
    Placement,
    /// `show-dock`
    ShowDock,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `tooltip`
    Tooltip,
    /// `preload-window`
    PreloadWindow,
    /// `click-trigger`
    ClickTrigger,
    /// `keep-on-top`
    KeepOnTop,
    /// `show-on-all-workspaces`
    ShowOnAllWorkspaces,
    /// `icon`
    Icon,
    /// `x`
    X,
    /// `y`
    Y,
}

/// (name, canonical, legacy, expected type)
const OPTION_NAMES: [(OptionName, &str, &str, &str); 14] = [
    (OptionName::BaseDir, "base-dir", "dir", "a path"),
    (OptionName::Content, "content", "index", "text"),
    (OptionName::Placement, "placement", "windowPosition", "a placement"),
    (OptionName::ShowDock, "show-dock", "showDockIcon", "a bool"),
    (OptionName::Width, "width", "width", "a size"),
    (OptionName::Height, "height", "height", "a size"),
    (OptionName::Tooltip, "tooltip", "tooltip", "text"),
    (OptionName::PreloadWindow, "preload-window", "preloadWindow", "a bool"),
    (OptionName::ClickTrigger, "click-trigger", "clickTrigger", "a click trigger"),
    (OptionName::KeepOnTop, "keep-on-top", "alwaysOnTop", "a bool"),
    (OptionName::ShowOnAllWorkspaces, "show-on-all-workspaces", "showOnAllWorkspaces", "a bool"),
    (OptionName::Icon, "icon", "icon", "a path or unset"),
    (OptionName::X, "x", "x", "a coordinate or unset"),
    (OptionName::Y, "y", "y", "a coordinate or unset"),
];

impl OptionName {
    /// Canonical kebab-case name.
    pub fn as_str(self) -> &'static str {
        OPTION_NAMES
            .iter()
            .find(|(n, ..)| *n == self)
            .map_or("", |(_, s, ..)| s)
    }

    fn expected(self) -> &'static str {
        OPTION_NAMES
            .iter()
            .find(|(n, ..)| *n == self)
            .map_or("", |(.., e)| e)
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OPTION_NAMES
            .iter()
            .find(|(_, name, legacy, _)| *name == s || *legacy == s)
            .map(|(n, ..)| *n)
            .ok_or_else(|| Error::UnknownOption(s.to_string()))
    }
}

/// A dynamically typed option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Flag value.
    Bool(bool),
    /// Width or height in pixels.
    Size(u32),
    /// Screen coordinate.
    Coord(i32),
    /// Free text; parsed where a placement is expected.
    Text(String),
    /// Filesystem path.
    Path(PathBuf),
    /// Already-parsed placement.
    Placement(Placement),
    /// Already-parsed click trigger.
    Trigger(ClickTrigger),
    /// Clears an optional option.
    Unset,
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        Self::Size(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Coord(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(v: PathBuf) -> Self {
        Self::Path(v)
    }
}

impl From<Placement> for OptionValue {
    fn from(v: Placement) -> Self {
        Self::Placement(v)
    }
}

impl From<ClickTrigger> for OptionValue {
    fn from(v: ClickTrigger) -> Self {
        Self::Trigger(v)
    }
}

fn positive(field: &str, v: Option<u32>) -> Result<u32> {
    match v {
        None => Ok(DEFAULT_SIZE),
        Some(0) => Err(Error::invalid(format!("{field} must be positive"))),
        Some(n) => Ok(n),
    }
}

fn absolutize(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        Ok(p.to_path_buf())
    } else {
        Ok(path::absolute(p)?)
    }
}

fn file_url(p: &Path) -> String {
    format!("file://{}", p.display())
}
