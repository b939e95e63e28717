use std::fmt;

use crate::geometry::{to_region, Point, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

/// A button transition from the system-wide pointer hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub pressed: bool,
}

impl PointerEvent {
    fn is_primary_press(&self) -> bool {
        self.pressed && self.button == PointerButton::Primary
    }
}

/// Label shown to the operator. Cosmetic only: [`to_region`] normalizes
/// whichever corner is clicked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLabel {
    TopLeft,
    BottomRight,
}

impl fmt::Display for PointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointLabel::TopLeft => f.write_str("top-left"),
            PointLabel::BottomRight => f.write_str("bottom-right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedPoint {
    /// 1-based.
    pub index: usize,
    pub label: PointLabel,
    pub point: Point,
}

impl fmt::Display for RecordedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/2 {}: {}", self.index, self.label, self.point)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked {
        first: Point,
        second: Point,
        region: Region,
    },
    /// The event stream ended before two points were recorded.
    Incomplete { points: Vec<Point> },
}

impl PickOutcome {
    pub fn region(&self) -> Option<Region> {
        match self {
            PickOutcome::Picked { region, .. } => Some(*region),
            PickOutcome::Incomplete { .. } => None,
        }
    }
}

/// Records the first two primary-button presses from `events` and normalizes
/// them into a region. Releases and other buttons are skipped. Consumption
/// stops right after the second point, so a blocking source is not read
/// further than needed.
///
/// `on_point` is called as each point is recorded.
pub fn pick_region<I, F>(events: I, mut on_point: F) -> PickOutcome
where
    I: IntoIterator<Item = PointerEvent>,
    F: FnMut(&RecordedPoint),
{
    let mut points: Vec<Point> = Vec::with_capacity(2);

    for event in events {
        if !event.is_primary_press() {
            continue;
        }

        points.push(event.position);
        let recorded = RecordedPoint {
            index: points.len(),
            label: if points.len() == 1 {
                PointLabel::TopLeft
            } else {
                PointLabel::BottomRight
            },
            point: event.position,
        };
        on_point(&recorded);

        if points.len() == 2 {
            break;
        }
    }

    if let [first, second] = points[..] {
        return PickOutcome::Picked {
            first,
            second,
            region: to_region(first, second),
        };
    }
    PickOutcome::Incomplete { points }
}
