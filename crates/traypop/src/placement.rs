//! Named placement policies and the resolver that turns them into coordinates.

use std::{fmt, str::FromStr};

use crate::{
    Error, Result,
    geom::{Point, Rect, Size, clamp_axis, extent},
};

/// Where the popup goes, relative to the icon (anchored) or to the screen.
///
/// Names are parsed through [`FromStr`]; see [`Placement::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Left edges aligned with the icon, top of the work area.
    AnchorLeft,
    /// Left edges aligned with the icon, bottom of the work area.
    AnchorBottomLeft,
    /// Right edges aligned with the icon, top of the work area.
    AnchorRight,
    /// Right edges aligned with the icon, bottom of the work area.
    AnchorBottomRight,
    /// Horizontally centered on the icon, top of the work area.
    AnchorCenter,
    /// Horizontally centered on the icon, bottom of the work area.
    AnchorBottomCenter,
    /// Top-left corner of the work area.
    TopLeft,
    /// Top-right corner of the work area.
    TopRight,
    /// Middle of the top edge.
    TopCenter,
    /// Bottom-left corner of the work area.
    BottomLeft,
    /// Bottom-right corner of the work area.
    BottomRight,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Middle of the left edge.
    LeftCenter,
    /// Middle of the right edge.
    RightCenter,
    /// Center of the work area.
    Center,
}

/// Whether a placement needs an anchor rectangle to be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    /// Positioned against the icon's bounds.
    Anchored,
    /// Positioned against the screen work area only.
    Screen,
}

/// (policy, canonical name, legacy name)
const NAMES: [(Placement, &str, &str); 15] = [
    (Placement::AnchorLeft, "anchor-left", "trayLeft"),
    (Placement::AnchorBottomLeft, "anchor-bottom-left", "trayBottomLeft"),
    (Placement::AnchorRight, "anchor-right", "trayRight"),
    (Placement::AnchorBottomRight, "anchor-bottom-right", "trayBottomRight"),
    (Placement::AnchorCenter, "anchor-center", "trayCenter"),
    (Placement::AnchorBottomCenter, "anchor-bottom-center", "trayBottomCenter"),
    (Placement::TopLeft, "top-left", "topLeft"),
    (Placement::TopRight, "top-right", "topRight"),
    (Placement::TopCenter, "top-center", "topCenter"),
    (Placement::BottomLeft, "bottom-left", "bottomLeft"),
    (Placement::BottomRight, "bottom-right", "bottomRight"),
    (Placement::BottomCenter, "bottom-center", "bottomCenter"),
    (Placement::LeftCenter, "left-center", "leftCenter"),
    (Placement::RightCenter, "right-center", "rightCenter"),
    (Placement::Center, "center", "center"),
];

impl Placement {
    /// Every supported policy, anchored ones first.
    pub fn all() -> impl Iterator<Item = Self> {
        NAMES.iter().map(|(p, _, _)| *p)
    }

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(p, _, _)| *p == self)
            .map_or("center", |(_, n, _)| n)
    }

    /// Kind tag for this policy.
    pub const fn kind(self) -> PlacementKind {
        match self {
            Self::AnchorLeft
            | Self::AnchorBottomLeft
            | Self::AnchorRight
            | Self::AnchorBottomRight
            | Self::AnchorCenter
            | Self::AnchorBottomCenter => PlacementKind::Anchored,
            _ => PlacementKind::Screen,
        }
    }

    /// True when this policy positions against the icon.
    pub const fn is_anchored(self) -> bool {
        matches!(self.kind(), PlacementKind::Anchored)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        NAMES
            .iter()
            .find(|(_, name, legacy)| *name == s || *legacy == s)
            .map(|(p, _, _)| *p)
            .ok_or_else(|| Error::UnknownPlacement(s.to_string()))
    }
}

/// Maps a placement policy plus an optional anchor to absolute coordinates.
pub trait PlacementResolver: Send + Sync {
    /// Compute the top-left position for a window of `size`.
    ///
    /// Anchored placements require `anchor`; screen placements ignore it.
    fn calculate(&self, placement: Placement, anchor: Option<Rect>, size: Size) -> Result<Point>;
}

/// Resolver over a single display work area (the screen minus menu bar/taskbar).
///
/// Results are clamped so the window stays inside the work area; a window larger
/// than the work area is pinned to its top-left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positioner {
    work_area: Rect,
}

impl Positioner {
    /// Create a resolver for the given work area.
    pub const fn new(work_area: Rect) -> Self {
        Self { work_area }
    }

    /// Work area this resolver positions against.
    pub const fn work_area(&self) -> Rect {
        self.work_area
    }

    /// Unclamped target for `placement`.
    fn raw_target(&self, placement: Placement, anchor: Option<Rect>, size: Size) -> Result<Point> {
        let wa = self.work_area;
        let w = extent(size.width);
        let h = extent(size.height);
        let top = wa.top();
        let bottom = wa.bottom() - h;
        let left = wa.left();
        let right = wa.right() - w;
        let hmid = wa.left() + extent(wa.w) / 2 - w / 2;
        let vmid = wa.top() + extent(wa.h) / 2 - h / 2;

        if placement.is_anchored() {
            let a = anchor.ok_or(Error::MissingAnchor(placement.name()))?;
            let centered = a.left() + extent(a.w) / 2 - w / 2;
            let pos = match placement {
                Placement::AnchorLeft => Point::new(a.left(), top),
                Placement::AnchorBottomLeft => Point::new(a.left(), bottom),
                Placement::AnchorRight => Point::new(a.right() - w, top),
                Placement::AnchorBottomRight => Point::new(a.right() - w, bottom),
                Placement::AnchorCenter => Point::new(centered, top),
                _ => Point::new(centered, bottom),
            };
            return Ok(pos);
        }

        Ok(match placement {
            Placement::TopLeft => Point::new(left, top),
            Placement::TopRight => Point::new(right, top),
            Placement::TopCenter => Point::new(hmid, top),
            Placement::BottomLeft => Point::new(left, bottom),
            Placement::BottomRight => Point::new(right, bottom),
            Placement::BottomCenter => Point::new(hmid, bottom),
            Placement::LeftCenter => Point::new(left, vmid),
            Placement::RightCenter => Point::new(right, vmid),
            _ => Point::new(hmid, vmid),
        })
    }
}

impl PlacementResolver for Positioner {
    fn calculate(&self, placement: Placement, anchor: Option<Rect>, size: Size) -> Result<Point> {
        let target = self.raw_target(placement, anchor, size)?;
        let wa = self.work_area;
        Ok(Point::new(
            clamp_axis(target.x, wa.left(), wa.right() - extent(size.width)),
            clamp_axis(target.y, wa.top(), wa.bottom() - extent(size.height)),
        ))
    }
}
