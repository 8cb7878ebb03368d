//! Input event types for pointer, touch, scroll and resize

use crate::geometry::Point;

/// Input events delivered by the host
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer event (mouse or pen)
    Pointer(PointerEvent),
    /// Touch event (mobile/touchscreen)
    Touch(TouchEvent),
    /// The document scrolled to a new vertical offset
    Scroll {
        /// Absolute scroll offset in pixels
        y: f32,
    },
    /// The window was resized
    Resize {
        /// New width in logical pixels
        width: f32,
        /// New height in logical pixels
        height: f32,
    },
}

// ============================================================================
// Pointer Events
// ============================================================================

/// Pointer events
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to position
    Moved {
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// Pointer left the window
    Left,
}

impl PointerEvent {
    /// Window-space position (None when the pointer left)
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Moved { x, y } => Some(Point::new(*x, *y)),
            PointerEvent::Left => None,
        }
    }
}

// ============================================================================
// Touch Events
// ============================================================================

/// Touch events for touchscreens
#[derive(Clone, Debug, PartialEq)]
pub enum TouchEvent {
    /// A touch started
    Started {
        /// Unique identifier for this touch
        id: u64,
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// A touch moved
    Moved {
        /// Unique identifier for this touch
        id: u64,
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// A touch ended
    Ended {
        /// Unique identifier for this touch
        id: u64,
    },
    /// A touch was cancelled (e.g., by system gesture)
    Cancelled {
        /// Unique identifier for this touch
        id: u64,
    },
}

impl TouchEvent {
    /// Get the touch ID
    pub fn id(&self) -> u64 {
        match self {
            TouchEvent::Started { id, .. } => *id,
            TouchEvent::Moved { id, .. } => *id,
            TouchEvent::Ended { id } => *id,
            TouchEvent::Cancelled { id } => *id,
        }
    }

    /// Get the position (None for Ended and Cancelled)
    pub fn position(&self) -> Option<Point> {
        match self {
            TouchEvent::Started { x, y, .. } => Some(Point::new(*x, *y)),
            TouchEvent::Moved { x, y, .. } => Some(Point::new(*x, *y)),
            TouchEvent::Ended { .. } | TouchEvent::Cancelled { .. } => None,
        }
    }

    /// Whether this is a start or move (the events that count as activity)
    pub fn is_contact(&self) -> bool {
        matches!(self, TouchEvent::Started { .. } | TouchEvent::Moved { .. })
    }
}

// ============================================================================
// Device Capabilities
// ============================================================================

/// What the input hardware can do
///
/// Kept separate from viewport width: a narrow desktop window still has a
/// hover-capable pointer, and a wide tablet still has none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Primary input is touch (no hover)
    pub touch_primary: bool,
}

impl Capabilities {
    pub fn desktop() -> Self {
        Self {
            touch_primary: false,
        }
    }

    pub fn touch() -> Self {
        Self {
            touch_primary: true,
        }
    }

    /// Whether hover effects mean anything on this device
    pub fn supports_hover(&self) -> bool {
        !self.touch_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_accessors() {
        let start = TouchEvent::Started {
            id: 7,
            x: 1.0,
            y: 2.0,
        };
        assert_eq!(start.id(), 7);
        assert_eq!(start.position(), Some(Point::new(1.0, 2.0)));
        assert!(start.is_contact());

        let end = TouchEvent::Ended { id: 7 };
        assert_eq!(end.position(), None);
        assert!(!end.is_contact());
    }

    #[test]
    fn test_capabilities() {
        assert!(Capabilities::desktop().supports_hover());
        assert!(!Capabilities::touch().supports_hover());
    }
}
