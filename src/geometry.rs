//! Virtual-screen geometry: points, capture regions and the bounds they are
//! checked against. Everything here is in OS-global pixel coordinates, where
//! a monitor placed left of or above the primary has negative origin.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseRegionError, RegionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Capture rectangle as `(left, top, width, height)`.
///
/// A usable region has positive width and height; that is checked by
/// [`validate`], not by construction, so a degenerate pick can still be
/// reported back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlap with `other`, or `None` when they do not share any pixel.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left as i64 || bottom <= top as i64 {
            return None;
        }
        Some(Region::new(
            left,
            top,
            (right - left as i64) as i32,
            (bottom - top as i64) as i32,
        ))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.width, self.height
        )
    }
}

/// Accepts `100,200,800,900` as well as `(100, 200, 800, 900)` so the line
/// printed by `pick` can be pasted back verbatim.
impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let values = inner
            .split(',')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ParseRegionError(format!("{s:?} ({e})")))?;

        match values[..] {
            [left, top, width, height] => Ok(Region::new(left, top, width, height)),
            _ => Err(ParseRegionError(format!(
                "{s:?} has {} values",
                values.len()
            ))),
        }
    }
}

/// Bounding rectangle of every connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualScreen {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl VirtualScreen {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Union bounding box of the given displays. `None` for an empty set.
    pub fn bounding<I>(displays: I) -> Option<Self>
    where
        I: IntoIterator<Item = DisplayRect>,
    {
        let mut iter = displays.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y) = (first.left as i64, first.top as i64);
        let (mut max_x, mut max_y) = (first.right(), first.bottom());

        for d in iter {
            min_x = min_x.min(d.left as i64);
            min_y = min_y.min(d.top as i64);
            max_x = max_x.max(d.right());
            max_y = max_y.max(d.bottom());
        }

        Some(Self::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x) as i32,
            (max_y - min_y) as i32,
        ))
    }
}

impl fmt::Display for VirtualScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.width, self.height
        )
    }
}

/// One physical display in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
    pub is_primary: bool,
}

impl DisplayRect {
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn as_region(&self) -> Region {
        Region::new(self.left, self.top, self.width as i32, self.height as i32)
    }
}

/// Normalizes two clicked points into a region. Click order does not matter;
/// points sharing an x or y give a zero-sized region, which [`validate`]
/// rejects.
pub fn to_region(p1: Point, p2: Point) -> Region {
    Region {
        left: p1.x.min(p2.x),
        top: p1.y.min(p2.y),
        width: saturating_i32(p1.x.abs_diff(p2.x)),
        height: saturating_i32(p1.y.abs_diff(p2.y)),
    }
}

fn saturating_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Checks that `region` is non-empty and lies fully inside `screen`.
pub fn validate(region: Region, screen: VirtualScreen) -> Result<(), RegionError> {
    if region.is_empty() {
        return Err(RegionError::Empty { region });
    }

    if region.left < screen.left
        || region.top < screen.top
        || region.right() > screen.right()
        || region.bottom() > screen.bottom()
    {
        return Err(RegionError::OutOfBounds { region, screen });
    }

    Ok(())
}
