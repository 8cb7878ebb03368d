//! Points, rects and the viewport

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move a fraction `t` of the way toward `target`
    pub fn approach(self, target: Point, t: f32) -> Point {
        Point {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Browser-like viewport: window size plus vertical scroll offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_y: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    /// Whether the viewport is at least `breakpoint` pixels wide
    pub fn is_at_least(&self, breakpoint: f32) -> bool {
        self.width >= breakpoint
    }

    /// Convert a window-space point to document space
    pub fn to_document(&self, client: Point) -> Point {
        Point::new(client.x, client.y + self.scroll_y)
    }

    /// Normalize a window-space point to [0, 1] on both axes
    pub fn normalize(&self, client: Point) -> Point {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Point::new((client.x / w).clamp(0.0, 1.0), (client.y / h).clamp(0.0, 1.0))
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0.0, 100.0, 200.0, 50.0);
        assert!(r.contains(Point::new(0.0, 100.0)));
        assert!(r.contains(Point::new(199.0, 149.0)));
        assert!(!r.contains(Point::new(200.0, 120.0)));
        assert!(!r.contains(Point::new(10.0, 150.0)));
    }

    #[test]
    fn test_viewport_normalize_clamps() {
        let vp = Viewport::new(1000.0, 500.0);
        assert_eq!(vp.normalize(Point::new(500.0, 250.0)), Point::new(0.5, 0.5));
        assert_eq!(vp.normalize(Point::new(-20.0, 900.0)), Point::new(0.0, 1.0));
    }

    #[test]
    fn test_point_approach() {
        let p = Point::new(0.0, 0.0).approach(Point::new(1.0, 2.0), 0.5);
        assert_eq!(p, Point::new(0.5, 1.0));
    }
}
