//! Scroll-trigger geometry
//!
//! An [`Edge`] names a point on the trigger element and a point on the
//! viewport; the trigger boundary is the scroll offset at which the two line
//! up. Edges parse from the strings the site was authored with:
//!
//! ```
//! use vitrine_animation::Edge;
//! use vitrine_core::Rect;
//!
//! let edge: Edge = "top 80%".parse().unwrap();
//! let section = Rect::new(0.0, 2000.0, 1200.0, 600.0);
//!
//! // The section's top reaches 80% down a 1000px viewport at scroll 1200
//! assert_eq!(edge.scroll_offset(section, 1000.0), 1200.0);
//! ```
//!
//! Boundaries are recomputed from the element's current rect on every call,
//! so a trigger that resizes is tracked without any cache to invalidate.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use vitrine_core::{Rect, Viewport};

use crate::error::{AnimationError, Result};

// ============================================================================
// Edges
// ============================================================================

/// A position along an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Offset {
    /// Fraction of the extent, 0 = top, 1 = bottom
    Fraction(f32),
    /// Absolute pixels from the top
    Pixels(f32),
}

impl Offset {
    pub fn resolve(&self, extent: f32) -> f32 {
        match self {
            Offset::Fraction(f) => f * extent,
            Offset::Pixels(px) => *px,
        }
    }

    fn parse(token: &str) -> Option<Offset> {
        match token {
            "top" => return Some(Offset::Fraction(0.0)),
            "center" => return Some(Offset::Fraction(0.5)),
            "bottom" => return Some(Offset::Fraction(1.0)),
            _ => {}
        }
        if let Some(pct) = token.strip_suffix('%') {
            return pct.parse::<f32>().ok().map(|p| Offset::Fraction(p / 100.0));
        }
        token
            .strip_suffix("px")
            .unwrap_or(token)
            .parse::<f32>()
            .ok()
            .map(Offset::Pixels)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Fraction(v) if *v == 0.0 => write!(f, "top"),
            Offset::Fraction(v) if *v == 0.5 => write!(f, "center"),
            Offset::Fraction(v) if *v == 1.0 => write!(f, "bottom"),
            Offset::Fraction(v) => write!(f, "{}%", v * 100.0),
            Offset::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// Alignment of a point on the element with a point on the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub element: Offset,
    pub viewport: Offset,
}

impl Edge {
    /// Element top at viewport top
    pub const TOP_TOP: Edge = Edge::fractions(0.0, 0.0);
    /// Element top at viewport bottom (first pixel scrolls into view)
    pub const TOP_BOTTOM: Edge = Edge::fractions(0.0, 1.0);
    /// Element bottom at viewport top (last pixel scrolls out of view)
    pub const BOTTOM_TOP: Edge = Edge::fractions(1.0, 0.0);

    pub const fn fractions(element: f32, viewport: f32) -> Self {
        Self {
            element: Offset::Fraction(element),
            viewport: Offset::Fraction(viewport),
        }
    }

    /// Element top at `percent` down the viewport (`"top 80%"`)
    pub fn top_at(percent: f32) -> Self {
        Self::fractions(0.0, percent / 100.0)
    }

    /// Scroll offset at which this edge is reached
    pub fn scroll_offset(&self, rect: Rect, viewport_height: f32) -> f32 {
        rect.y + self.element.resolve(rect.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for Edge {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(AnimationError::InvalidEdge(s.to_string()));
        };
        match (Offset::parse(element), Offset::parse(viewport)) {
            (Some(element), Some(viewport)) => Ok(Edge { element, viewport }),
            _ => Err(AnimationError::InvalidEdge(s.to_string())),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// Resolved pixel boundaries of a scroll range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    /// Progress through the span, clamped to [0, 1]
    ///
    /// A degenerate span (end at or before start) acts as a step at `start`.
    pub fn progress(&self, scroll_y: f32) -> f32 {
        if self.end <= self.start {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }
}

/// Start and end edges of a scroll-linked range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRange {
    pub start: Edge,
    pub end: Edge,
}

impl ScrollRange {
    pub fn new(start: Edge, end: Edge) -> Self {
        Self { start, end }
    }

    /// From `start` until the element's bottom leaves through the viewport top
    pub fn from_start(start: Edge) -> Self {
        Self::new(start, Edge::BOTTOM_TOP)
    }

    /// Parse both edges, e.g. `ScrollRange::parse("top top", "bottom top")`
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    pub fn resolve(&self, rect: Rect, viewport_height: f32) -> Span {
        Span {
            start: self.start.scroll_offset(rect, viewport_height),
            end: self.end.scroll_offset(rect, viewport_height),
        }
    }

    pub fn progress(&self, rect: Rect, viewport: &Viewport) -> f32 {
        self.resolve(rect, viewport.height).progress(viewport.scroll_y)
    }
}

// ============================================================================
// Toggle actions
// ============================================================================

/// Boundary crossings reported by a [`ScrollTrigger`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Scrolling down past the start
    Enter,
    /// Scrolling down past the end
    Leave,
    /// Scrolling up past the end
    EnterBack,
    /// Scrolling up past the start
    LeaveBack,
}

/// What an animation does when its trigger reports an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleAction {
    #[default]
    None,
    Play,
    Reverse,
    Restart,
    Complete,
}

impl FromStr for ToggleAction {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(ToggleAction::None),
            "play" => Ok(ToggleAction::Play),
            "reverse" => Ok(ToggleAction::Reverse),
            "restart" => Ok(ToggleAction::Restart),
            "complete" => Ok(ToggleAction::Complete),
            other => Err(AnimationError::InvalidToggleActions(other.to_string())),
        }
    }
}

/// Actions for enter, leave, enter-back, and leave-back, in that order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    /// `"play none none none"`: play once, never undo
    pub const PLAY_ONCE: ToggleActions = ToggleActions {
        on_enter: ToggleAction::Play,
        on_leave: ToggleAction::None,
        on_enter_back: ToggleAction::None,
        on_leave_back: ToggleAction::None,
    };

    /// `"play none none reverse"`: undo when scrolled back above the start
    pub const PLAY_REVERSE: ToggleActions = ToggleActions {
        on_enter: ToggleAction::Play,
        on_leave: ToggleAction::None,
        on_enter_back: ToggleAction::None,
        on_leave_back: ToggleAction::Reverse,
    };

    pub fn action_for(&self, event: TriggerEvent) -> ToggleAction {
        match event {
            TriggerEvent::Enter => self.on_enter,
            TriggerEvent::Leave => self.on_leave,
            TriggerEvent::EnterBack => self.on_enter_back,
            TriggerEvent::LeaveBack => self.on_leave_back,
        }
    }
}

impl Default for ToggleActions {
    fn default() -> Self {
        Self::PLAY_ONCE
    }
}

impl FromStr for ToggleActions {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let actions = s
            .split_whitespace()
            .map(str::parse::<ToggleAction>)
            .collect::<Result<SmallVec<[ToggleAction; 4]>>>()
            .map_err(|_| AnimationError::InvalidToggleActions(s.to_string()))?;
        match actions.as_slice() {
            &[on_enter, on_leave, on_enter_back, on_leave_back] => Ok(ToggleActions {
                on_enter,
                on_leave,
                on_enter_back,
                on_leave_back,
            }),
            _ => Err(AnimationError::InvalidToggleActions(s.to_string())),
        }
    }
}

// ============================================================================
// Triggers
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Before,
    Inside,
    After,
}

/// Tracks which side of a scroll range the viewport is on
///
/// Call [`ScrollTrigger::update`] on every scroll and resize; it reports the
/// boundary crossings since the previous call.
#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    range: ScrollRange,
    region: Option<Region>,
}

impl ScrollTrigger {
    pub fn new(range: ScrollRange) -> Self {
        Self {
            range,
            region: None,
        }
    }

    pub fn range(&self) -> ScrollRange {
        self.range
    }

    /// Whether the viewport is currently between start and end
    pub fn is_active(&self) -> bool {
        self.region == Some(Region::Inside)
    }

    /// Forget the last region so the next update reports from scratch
    pub fn reset(&mut self) {
        self.region = None;
    }

    pub fn update(&mut self, rect: Rect, viewport: &Viewport) -> SmallVec<[TriggerEvent; 2]> {
        let span = self.range.resolve(rect, viewport.height);
        let scroll = viewport.scroll_y;
        let region = if scroll < span.start {
            Region::Before
        } else if scroll <= span.end {
            Region::Inside
        } else {
            Region::After
        };

        let mut events = SmallVec::new();
        let previous = self.region.replace(region);
        match (previous, region) {
            (None, Region::Inside) | (Some(Region::Before), Region::Inside) => {
                events.push(TriggerEvent::Enter)
            }
            (None, Region::After) | (Some(Region::Before), Region::After) => {
                events.push(TriggerEvent::Enter);
                events.push(TriggerEvent::Leave);
            }
            (Some(Region::Inside), Region::After) => events.push(TriggerEvent::Leave),
            (Some(Region::Inside), Region::Before) => events.push(TriggerEvent::LeaveBack),
            (Some(Region::After), Region::Inside) => events.push(TriggerEvent::EnterBack),
            (Some(Region::After), Region::Before) => {
                events.push(TriggerEvent::EnterBack);
                events.push(TriggerEvent::LeaveBack);
            }
            _ => {}
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(scroll_y: f32) -> Viewport {
        let mut vp = Viewport::new(1440.0, 1000.0);
        vp.scroll_y = scroll_y;
        vp
    }

    #[test]
    fn test_parse_edges() {
        assert_eq!("top top".parse::<Edge>().unwrap(), Edge::TOP_TOP);
        assert_eq!("bottom top".parse::<Edge>().unwrap(), Edge::BOTTOM_TOP);
        assert_eq!("top 85%".parse::<Edge>().unwrap(), Edge::top_at(85.0));
        assert_eq!(
            "center 100px".parse::<Edge>().unwrap(),
            Edge {
                element: Offset::Fraction(0.5),
                viewport: Offset::Pixels(100.0),
            }
        );
        assert!("top".parse::<Edge>().is_err());
        assert!("top middle".parse::<Edge>().is_err());
        assert!("top top top".parse::<Edge>().is_err());
    }

    #[test]
    fn test_edge_display() {
        assert_eq!(Edge::BOTTOM_TOP.to_string(), "bottom top");
        assert_eq!(Edge::top_at(80.0).to_string(), "top 80%");
    }

    #[test]
    fn test_progress_clamps_and_is_monotonic() {
        let rect = Rect::new(0.0, 1000.0, 1000.0, 800.0);
        let range = ScrollRange::parse("top top", "bottom top").unwrap();
        let span = range.resolve(rect, 1000.0);
        assert_eq!(span, Span { start: 1000.0, end: 1800.0 });

        assert_eq!(range.progress(rect, &viewport(0.0)), 0.0);
        assert_eq!(range.progress(rect, &viewport(1000.0)), 0.0);
        assert_eq!(range.progress(rect, &viewport(1400.0)), 0.5);
        assert_eq!(range.progress(rect, &viewport(1800.0)), 1.0);
        assert_eq!(range.progress(rect, &viewport(5000.0)), 1.0);

        let mut last = 0.0;
        for y in (900..1900).step_by(7) {
            let p = span.progress(y as f32);
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn test_resized_element_moves_boundaries() {
        let range = ScrollRange::from_start(Edge::TOP_TOP);
        let before = range.resolve(Rect::new(0.0, 0.0, 100.0, 900.0), 800.0);
        let after = range.resolve(Rect::new(0.0, 0.0, 100.0, 600.0), 800.0);
        assert_eq!(before.end, 900.0);
        assert_eq!(after.end, 600.0);
    }

    #[test]
    fn test_degenerate_span_steps() {
        let span = Span { start: 500.0, end: 500.0 };
        assert_eq!(span.progress(499.0), 0.0);
        assert_eq!(span.progress(500.0), 1.0);
    }

    #[test]
    fn test_toggle_actions_parse() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions, ToggleActions::PLAY_REVERSE);
        assert_eq!(actions.action_for(TriggerEvent::LeaveBack), ToggleAction::Reverse);
        assert!("play none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
    }

    #[test]
    fn test_trigger_events() {
        let rect = Rect::new(0.0, 2000.0, 1000.0, 500.0);
        // start 1200, end 2500
        let mut trigger = ScrollTrigger::new(ScrollRange::from_start(Edge::top_at(80.0)));

        assert!(trigger.update(rect, &viewport(0.0)).is_empty());
        assert_eq!(trigger.update(rect, &viewport(1300.0)).as_slice(), &[TriggerEvent::Enter]);
        assert!(trigger.is_active());
        assert!(trigger.update(rect, &viewport(1400.0)).is_empty());
        assert_eq!(trigger.update(rect, &viewport(3000.0)).as_slice(), &[TriggerEvent::Leave]);
        assert_eq!(
            trigger.update(rect, &viewport(2000.0)).as_slice(),
            &[TriggerEvent::EnterBack]
        );
        assert_eq!(
            trigger.update(rect, &viewport(0.0)).as_slice(),
            &[TriggerEvent::LeaveBack]
        );
    }

    #[test]
    fn test_first_update_past_range() {
        let rect = Rect::new(0.0, 0.0, 1000.0, 500.0);
        let mut trigger = ScrollTrigger::new(ScrollRange::from_start(Edge::top_at(80.0)));
        assert_eq!(
            trigger.update(rect, &viewport(2000.0)).as_slice(),
            &[TriggerEvent::Enter, TriggerEvent::Leave]
        );
    }
}
