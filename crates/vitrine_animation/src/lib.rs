//! Vitrine Animation System
//!
//! Tweens, easing, and scroll-trigger geometry for the site's orchestration
//! controllers.
//!
//! # Features
//!
//! - **Tweens**: from/to property sets with delay, easing, snapping, repeat and yoyo
//! - **Supersession**: at most one tween per (element, purpose); starting a new
//!   one kills the previous one before it can write another frame
//! - **Scoped ownership**: [`AnimatedTween`] kills its tween when dropped
//! - **Timelines**: position offsets and staggers for entrance sequences
//! - **Scroll triggers**: GSAP-style `"top 80%"` edges, clamped progress, and
//!   enter/leave events mapped through toggle actions

pub mod easing;
pub mod error;
pub mod scheduler;
pub mod scroll;
pub mod timeline;
pub mod tween;
pub mod values;

pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use scheduler::{
    AnimatedTween, AnimationScheduler, Purpose, SchedulerHandle, TargetKey, TweenId,
};
pub use scroll::{
    Edge, Offset, ScrollRange, ScrollTrigger, Span, ToggleAction, ToggleActions, TriggerEvent,
};
pub use timeline::{Stagger, StaggerDirection, Timeline};
pub use tween::{Phase, Tween};
pub use values::{Interpolate, Prop, PropSet, VisualState};
