//! Viewport geometry: rectangles, root margins and intersection ratios.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never negative.
    pub width: f64,
    /// Height, never negative.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle; negative extents collapse to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Same rectangle moved by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Overlap of two rectangles, if their edges touch or overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the viewport's extent on that axis.
    Percent(f64),
}

impl Length {
    fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

impl FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |num: &str| {
            num.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid margin length `{s}`"))
        };
        if let Some(num) = s.strip_suffix("px") {
            return parse(num).map(Self::Px);
        }
        if let Some(num) = s.strip_suffix('%') {
            return parse(num).map(Self::Percent);
        }
        // Unitless values are only valid for zero.
        match parse(s)? {
            v if v == 0.0 => Ok(Self::Px(0.0)),
            _ => Err(format!("margin length `{s}` needs a px or % unit")),
        }
    }
}

/// Expansion (or contraction, when negative) of the viewport before
/// intersecting, written CSS-style: `"200px"`, `"10px 0px"`,
/// `"0px 5% 10px"`, `"1px 2px 3px 4px"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    /// Top side.
    pub top: Length,
    /// Right side.
    pub right: Length,
    /// Bottom side.
    pub bottom: Length,
    /// Left side.
    pub left: Length,
}

impl RootMargin {
    /// No expansion.
    pub const ZERO: Self = Self::uniform(Length::Px(0.0));

    /// Same length on every side.
    pub const fn uniform(len: Length) -> Self {
        Self {
            top: len,
            right: len,
            bottom: len,
            left: len,
        }
    }

    /// Apply the margin to `viewport`.
    pub fn expand(&self, viewport: &Rect) -> Rect {
        let top = self.top.resolve(viewport.height);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        let right = self.right.resolve(viewport.width);
        Rect::new(
            viewport.x - left,
            viewport.y - top,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(str::parse::<Length>)
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [] => Ok(Self::ZERO),
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(format!("root margin `{s}` has more than four values")),
        }
    }
}

impl TryFrom<String> for RootMargin {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(value: RootMargin) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Intersection of `target` with the margin-expanded `viewport`.
///
/// Returns `(is_intersecting, ratio)` where `ratio` is the visible fraction
/// of the target's area. A zero-area target that touches the viewport counts
/// as fully visible.
pub fn intersect(target: &Rect, viewport: &Rect, margin: &RootMargin) -> (bool, f64) {
    let root = margin.expand(viewport);
    match target.intersection(&root) {
        None => (false, 0.0),
        Some(_) if target.area() == 0.0 => (true, 1.0),
        Some(overlap) => (true, (overlap.area() / target.area()).clamp(0.0, 1.0)),
    }
}
