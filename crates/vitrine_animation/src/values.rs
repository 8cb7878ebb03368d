//! Animatable values
//!
//! Every animated element carries a [`VisualState`]: the handful of style
//! channels the site animates. Tweens address individual channels through
//! [`Prop`] and describe endpoints as a [`PropSet`].

use smallvec::SmallVec;
use vitrine_core::{Color, Point};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// Scalar and vector implementations
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Point {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self.approach(*other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

// ============================================================================
// Visual state
// ============================================================================

/// A single animatable channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prop {
    /// Horizontal translation in pixels
    X,
    /// Vertical translation in pixels
    Y,
    Opacity,
    Scale,
    /// Rotation about the horizontal axis, in degrees
    RotateX,
    /// Fraction of the element clipped from the top, 0 (none) to 1 (hidden)
    ClipTop,
    /// Alpha of the element's border color
    BorderAlpha,
    /// Free numeric value (animated counters, uniforms)
    Value,
}

/// Current style of an animated element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub scale: f32,
    pub rotate_x: f32,
    pub clip_top: f32,
    pub border_alpha: f32,
    pub value: f32,
}

impl VisualState {
    /// The untransformed, fully visible state
    pub const RESTING: VisualState = VisualState {
        x: 0.0,
        y: 0.0,
        opacity: 1.0,
        scale: 1.0,
        rotate_x: 0.0,
        clip_top: 0.0,
        border_alpha: 1.0,
        value: 0.0,
    };

    pub fn get(&self, prop: Prop) -> f32 {
        match prop {
            Prop::X => self.x,
            Prop::Y => self.y,
            Prop::Opacity => self.opacity,
            Prop::Scale => self.scale,
            Prop::RotateX => self.rotate_x,
            Prop::ClipTop => self.clip_top,
            Prop::BorderAlpha => self.border_alpha,
            Prop::Value => self.value,
        }
    }

    pub fn set(&mut self, prop: Prop, value: f32) {
        let slot = match prop {
            Prop::X => &mut self.x,
            Prop::Y => &mut self.y,
            Prop::Opacity => &mut self.opacity,
            Prop::Scale => &mut self.scale,
            Prop::RotateX => &mut self.rotate_x,
            Prop::ClipTop => &mut self.clip_top,
            Prop::BorderAlpha => &mut self.border_alpha,
            Prop::Value => &mut self.value,
        };
        *slot = value;
    }

    /// Translation as a point
    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether the element would be painted at all
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && self.scale > 0.0 && self.clip_top < 1.0
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::RESTING
    }
}

// ============================================================================
// Property sets
// ============================================================================

/// A sparse set of channel values, used as a tween endpoint
///
/// ```
/// use vitrine_animation::{Prop, PropSet};
///
/// let hidden = PropSet::new().y(60.0).opacity(0.0);
/// assert_eq!(hidden.get(Prop::Y), Some(60.0));
/// assert_eq!(hidden.get(Prop::Scale), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropSet {
    values: SmallVec<[(Prop, f32); 4]>,
}

impl PropSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a channel, replacing any earlier value for it
    pub fn with(mut self, prop: Prop, value: f32) -> Self {
        self.insert(prop, value);
        self
    }

    pub fn insert(&mut self, prop: Prop, value: f32) {
        match self.values.iter_mut().find(|(p, _)| *p == prop) {
            Some(slot) => slot.1 = value,
            None => self.values.push((prop, value)),
        }
    }

    pub fn x(self, v: f32) -> Self {
        self.with(Prop::X, v)
    }

    pub fn y(self, v: f32) -> Self {
        self.with(Prop::Y, v)
    }

    pub fn opacity(self, v: f32) -> Self {
        self.with(Prop::Opacity, v)
    }

    pub fn scale(self, v: f32) -> Self {
        self.with(Prop::Scale, v)
    }

    pub fn rotate_x(self, v: f32) -> Self {
        self.with(Prop::RotateX, v)
    }

    pub fn clip_top(self, v: f32) -> Self {
        self.with(Prop::ClipTop, v)
    }

    pub fn border_alpha(self, v: f32) -> Self {
        self.with(Prop::BorderAlpha, v)
    }

    pub fn value(self, v: f32) -> Self {
        self.with(Prop::Value, v)
    }

    pub fn get(&self, prop: Prop) -> Option<f32> {
        self.values.iter().find(|(p, _)| *p == prop).map(|(_, v)| *v)
    }

    pub fn contains(&self, prop: Prop) -> bool {
        self.get(prop).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prop, f32)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write every channel in the set onto `state`
    pub fn apply_to(&self, state: &mut VisualState) {
        for (prop, value) in self.iter() {
            state.set(prop, value);
        }
    }

    /// The same channels as `self`, at their resting values
    pub fn resting(&self) -> PropSet {
        let mut out = PropSet::new();
        for (prop, _) in self.iter() {
            out.insert(prop, VisualState::RESTING.get(prop));
        }
        out
    }
}

impl FromIterator<(Prop, f32)> for PropSet {
    fn from_iter<I: IntoIterator<Item = (Prop, f32)>>(iter: I) -> Self {
        let mut set = PropSet::new();
        for (prop, value) in iter {
            set.insert(prop, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let set = PropSet::new().y(10.0).opacity(0.0).y(20.0);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(Prop::Y), Some(20.0));
    }

    #[test]
    fn test_apply_to_leaves_other_channels() {
        let mut state = VisualState::default();
        PropSet::new().y(-80.0).opacity(0.0).apply_to(&mut state);

        assert_eq!(state.y, -80.0);
        assert_eq!(state.opacity, 0.0);
        assert_eq!(state.scale, 1.0);
        assert!(!state.is_visible());
    }

    #[test]
    fn test_resting_mirrors_channels() {
        let hidden = PropSet::new().y(60.0).opacity(0.0).clip_top(1.0);
        let rest = hidden.resting();
        assert_eq!(rest.get(Prop::Y), Some(0.0));
        assert_eq!(rest.get(Prop::Opacity), Some(1.0));
        assert_eq!(rest.get(Prop::ClipTop), Some(0.0));
        assert_eq!(rest.get(Prop::Scale), None);
    }

    #[test]
    fn test_lerp_scalars_points_and_colors() {
        assert!(40.0f32.lerp(&0.0, 0.25).approx_eq(&30.0, 1e-6));

        let p = Point::new(0.5, 0.5).lerp(&Point::new(1.0, 0.0), 0.5);
        assert!(p.approx_eq(&Point::new(0.75, 0.25), 1e-6));

        // Colors clamp t
        let c = Color::BLACK.lerp(&Color::WHITE, 2.0);
        assert!(c.approx_eq(&Color::WHITE, 1e-6));
    }
}
