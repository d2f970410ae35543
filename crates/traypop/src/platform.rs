//! Per-OS policy table.
//!
//! Everything that differs between operating systems is looked up here, so the
//! controller itself never branches on the OS directly.

use std::fmt;

use crate::placement::Placement;

/// Operating system family the controller runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// macOS: menu bar at the top, persistent dock presence.
    MacOs,
    /// Windows: taskbar notification area, usually at the bottom.
    Windows,
    /// Linux and other Unix desktops.
    Linux,
}

/// Platform-dependent defaults consulted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformPolicy {
    /// Placement used when the options do not name one.
    pub default_placement: Placement,
    /// Screen corner substituted for an anchored placement when no anchor is known.
    pub fallback_corner: Placement,
    /// Whether the OS shows a persistent app-switcher entry (the macOS dock).
    pub has_dock_presence: bool,
}

const MACOS: PlatformPolicy = PlatformPolicy {
    default_placement: Placement::AnchorCenter,
    fallback_corner: Placement::TopRight,
    has_dock_presence: true,
};

const WINDOWS: PlatformPolicy = PlatformPolicy {
    default_placement: Placement::AnchorBottomCenter,
    fallback_corner: Placement::BottomRight,
    has_dock_presence: false,
};

const LINUX: PlatformPolicy = PlatformPolicy {
    default_placement: Placement::AnchorCenter,
    fallback_corner: Placement::TopRight,
    has_dock_presence: false,
};

impl OsFamily {
    /// The family this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Policy table entry for this family.
    pub const fn policy(self) -> &'static PlatformPolicy {
        match self {
            Self::MacOs => &MACOS,
            Self::Windows => &WINDOWS,
            Self::Linux => &LINUX,
        }
    }
}

impl Default for OsFamily {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Linux => "linux",
        })
    }
}
