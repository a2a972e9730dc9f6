use crate::index::Step;
use crate::settings::TouchMode;
use strum::Display as StrumDisplay;

pub const BOUNCE_OUT_MS: u64 = 200;
pub const BOUNCE_BACK_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub axis: Axis,
    /// `None` when the pointer did not move along the dominant axis.
    pub direction: Option<SwipeDirection>,
    pub crossed_threshold: bool,
    pub dx: f64,
    pub dy: f64,
}

/// Classifies a press/release pair. Screen coordinates: `y` grows downwards.
pub fn classify(start: Point, end: Point, threshold_px: f64) -> Gesture {
    let (dx, dy) = (end.x - start.x, end.y - start.y);

    let axis = if dx.abs() > dy.abs() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };

    let direction = match axis {
        Axis::Horizontal if dx < 0.0 => Some(SwipeDirection::Left),
        Axis::Horizontal if dx > 0.0 => Some(SwipeDirection::Right),
        Axis::Vertical if dy < 0.0 => Some(SwipeDirection::Up),
        Axis::Vertical if dy > 0.0 => Some(SwipeDirection::Down),
        _ => None,
    };

    Gesture {
        axis,
        direction,
        crossed_threshold: dx.abs() > threshold_px,
        dx,
        dy,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Edge {
    First,
    Last,
}

/// Overshoot-and-return played instead of navigating past an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    pub edge: Edge,
    pub overshoot_px: f64,
    pub out_ms: u64,
    pub back_ms: u64,
}

impl Bounce {
    pub fn new(edge: Edge, overshoot_px: f64) -> Self {
        Self {
            edge,
            overshoot_px,
            out_ms: BOUNCE_OUT_MS,
            back_ms: BOUNCE_BACK_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Ignored,
    Navigate(Step),
    Bounce(Edge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripPosition {
    pub current: usize,
    pub total: usize,
}

impl Gesture {
    /// The step a horizontal swipe asks for. Vertical or short gestures ask
    /// for nothing so page scrolling is never hijacked.
    pub fn intent(&self, mode: TouchMode) -> Option<Step> {
        if self.axis != Axis::Horizontal || !self.crossed_threshold {
            return None;
        }
        match (self.direction?, mode) {
            (SwipeDirection::Left, TouchMode::Swipe) | (SwipeDirection::Right, TouchMode::Drag) => {
                Some(Step::Prev)
            }
            (SwipeDirection::Right, TouchMode::Swipe) | (SwipeDirection::Left, TouchMode::Drag) => {
                Some(Step::Next)
            }
            _ => None,
        }
    }

    pub fn outcome(&self, mode: TouchMode, position: StripPosition) -> SwipeOutcome {
        let Some(step) = self.intent(mode) else {
            return SwipeOutcome::Ignored;
        };
        match step {
            Step::Prev if position.current == 0 => SwipeOutcome::Bounce(Edge::First),
            Step::Next if position.current + 1 >= position.total => {
                SwipeOutcome::Bounce(Edge::Last)
            }
            step => SwipeOutcome::Navigate(step),
        }
    }
}
