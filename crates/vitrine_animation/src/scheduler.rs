//! Animation Scheduler
//!
//! Owns every running tween and the visual state of every animated element.
//! Tweens are keyed by [`TargetKey`]: an element plus the purpose the tween
//! serves. Registering a tween for a key that already has one kills the old
//! tween first, so two tweens never fight over the same element for the same
//! reason.
//!
//! Components hold a weak [`SchedulerHandle`] and usually wrap their tweens
//! in [`AnimatedTween`], which kills the tween when dropped:
//!
//! ```
//! use vitrine_animation::{AnimationScheduler, Purpose, PropSet, TargetKey, Tween};
//! use vitrine_core::Layout;
//! use vitrine_core::Rect;
//!
//! let layout = Layout::new();
//! let title = layout.insert("title", Rect::new(0.0, 0.0, 100.0, 40.0));
//!
//! let scheduler = AnimationScheduler::new();
//! let handle = scheduler.handle();
//!
//! let fade = handle.animate(
//!     TargetKey::new(title, Purpose::Entrance),
//!     Tween::from_to(PropSet::new().opacity(0.0), PropSet::new().opacity(1.0), 300.0),
//! );
//! assert!(fade.is_playing());
//!
//! scheduler.tick(300.0);
//! assert_eq!(scheduler.state_of(title).opacity, 1.0);
//!
//! drop(fade);
//! assert_eq!(scheduler.tween_count(), 0);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use vitrine_core::ElementId;

use crate::tween::Tween;
use crate::values::{PropSet, VisualState};

new_key_type! {
    /// Handle to a registered tween
    pub struct TweenId;
}

/// Why a tween is driving an element
///
/// One element may carry tweens for several purposes at once (an entrance and
/// a hover, say), but only one tween per purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// One-shot entrance sequence
    Entrance,
    /// Idle show/hide
    Visibility,
    /// Scroll-scrubbed motion
    Scrub,
    /// Pointer following
    Follow,
    /// Hover feedback
    Hover,
    /// Scroll-triggered reveal
    Reveal,
    /// Endless ambient loop
    Loop,
    /// Animated counter
    Counter,
    /// Shader reveal progress
    ShaderReveal,
}

/// The (element, purpose) pair a tween is registered under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub element: ElementId,
    pub purpose: Purpose,
}

impl TargetKey {
    pub fn new(element: ElementId, purpose: Purpose) -> Self {
        Self { element, purpose }
    }
}

struct Entry {
    key: TargetKey,
    tween: Tween,
}

struct SchedulerInner {
    tweens: SlotMap<TweenId, Entry>,
    by_key: FxHashMap<TargetKey, TweenId>,
    states: FxHashMap<ElementId, VisualState>,
}

impl SchedulerInner {
    fn insert(&mut self, key: TargetKey, mut tween: Tween) -> TweenId {
        if let Some(previous) = self.by_key.remove(&key) {
            self.tweens.remove(previous);
            tracing::trace!(?key, "superseded running tween");
        }
        let state = self.states.entry(key.element).or_default();
        tween.begin(state);
        let id = self.tweens.insert(Entry { key, tween });
        self.by_key.insert(key, id);
        id
    }

    fn remove(&mut self, id: TweenId) -> bool {
        match self.tweens.remove(id) {
            Some(entry) => {
                if self.by_key.get(&entry.key) == Some(&id) {
                    self.by_key.remove(&entry.key);
                }
                true
            }
            None => false,
        }
    }

    fn with_tween<R>(
        &mut self,
        id: TweenId,
        f: impl FnOnce(&mut Tween, &mut VisualState) -> R,
    ) -> Option<R> {
        let SchedulerInner { tweens, states, .. } = self;
        let entry = tweens.get_mut(id)?;
        let state = states.entry(entry.key.element).or_default();
        Some(f(&mut entry.tween, state))
    }
}

/// The animation scheduler
///
/// Cloning yields another strong reference to the same scheduler.
#[derive(Clone)]
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                tweens: SlotMap::with_key(),
                by_key: FxHashMap::default(),
                states: FxHashMap::default(),
            })),
        }
    }

    /// Get a weak handle for components to register tweens through
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance every tween by `dt_ms`
    ///
    /// Returns `true` if any tween is still playing afterwards.
    pub fn tick(&self, dt_ms: f32) -> bool {
        let mut inner = self.inner.borrow_mut();
        let SchedulerInner { tweens, states, .. } = &mut *inner;

        let mut playing = false;
        for entry in tweens.values_mut() {
            if !entry.tween.is_playing() {
                continue;
            }
            let state = states.entry(entry.key.element).or_default();
            entry.tween.tick(dt_ms, state);
            playing |= entry.tween.is_playing();
        }
        playing
    }

    /// Number of registered tweens, finished ones included
    pub fn tween_count(&self) -> usize {
        self.inner.borrow().tweens.len()
    }

    /// Number of tweens that will still produce frames on their own
    pub fn running_count(&self) -> usize {
        self.inner
            .borrow()
            .tweens
            .values()
            .filter(|e| e.tween.is_playing())
            .count()
    }

    /// Registered tweens driving `element`, any purpose
    pub fn tweens_for(&self, element: ElementId) -> Vec<TweenId> {
        self.inner
            .borrow()
            .tweens
            .iter()
            .filter(|(_, e)| e.key.element == element)
            .map(|(id, _)| id)
            .collect()
    }

    /// The tween currently registered under `key`
    pub fn tween_for(&self, key: TargetKey) -> Option<TweenId> {
        self.inner.borrow().by_key.get(&key).copied()
    }

    /// Register a tween, killing any tween already registered under `key`
    pub fn add(&self, key: TargetKey, tween: Tween) -> TweenId {
        self.inner.borrow_mut().insert(key, tween)
    }

    /// Remove a tween; removing an unknown or already removed id is a no-op
    pub fn kill(&self, id: TweenId) -> bool {
        self.inner.borrow_mut().remove(id)
    }

    /// Current visual state of `element`; resting if it was never animated
    pub fn state_of(&self, element: ElementId) -> VisualState {
        self.inner
            .borrow()
            .states
            .get(&element)
            .copied()
            .unwrap_or_default()
    }

    /// Write `props` onto `element` without animating
    pub fn apply(&self, element: ElementId, props: &PropSet) {
        let mut inner = self.inner.borrow_mut();
        props.apply_to(inner.states.entry(element).or_default());
    }

    /// Forget an element's state and kill every tween driving it
    pub fn forget(&self, element: ElementId) {
        let mut inner = self.inner.borrow_mut();
        let ids: Vec<TweenId> = inner
            .tweens
            .iter()
            .filter(|(_, e)| e.key.element == element)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            inner.remove(id);
        }
        inner.states.remove(&element);
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// Every operation is a no-op (or returns `None`) once the scheduler is gone.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a tween and return its ID
    pub fn register(&self, key: TargetKey, tween: Tween) -> Option<TweenId> {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().insert(key, tween))
    }

    /// Register a tween owned by the returned wrapper
    pub fn animate(&self, key: TargetKey, tween: Tween) -> AnimatedTween {
        AnimatedTween {
            handle: self.clone(),
            id: self.register(key, tween),
        }
    }

    /// Remove a tween
    pub fn kill(&self, id: TweenId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().remove(id))
            .unwrap_or(false)
    }

    /// Kill whatever tween is registered under `key`
    pub fn kill_target(&self, key: TargetKey) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut inner = inner.borrow_mut();
        match inner.by_key.get(&key).copied() {
            Some(id) => inner.remove(id),
            None => false,
        }
    }

    // =========================================================================
    // Playback control
    // =========================================================================

    pub fn reverse(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(entry) = inner.borrow_mut().tweens.get_mut(id) {
                entry.tween.reverse();
            }
        }
    }

    pub fn play(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            if let Some(entry) = inner.borrow_mut().tweens.get_mut(id) {
                entry.tween.play();
            }
        }
    }

    pub fn restart(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .borrow_mut()
                .with_tween(id, |tween, state| tween.restart(state));
        }
    }

    pub fn complete(&self, id: TweenId) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .borrow_mut()
                .with_tween(id, |tween, state| tween.complete(state));
        }
    }

    /// Move a tween's playhead and write the result immediately
    pub fn seek(&self, id: TweenId, progress: f32) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .borrow_mut()
                .with_tween(id, |tween, state| tween.seek(progress, state));
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check if a tween exists and is still producing frames
    pub fn is_playing(&self, id: TweenId) -> bool {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow().tweens.get(id).map(|e| e.tween.is_playing()))
            .unwrap_or(false)
    }

    pub fn is_registered(&self, id: TweenId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tweens.contains_key(id))
            .unwrap_or(false)
    }

    pub fn progress(&self, id: TweenId) -> Option<f32> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow().tweens.get(id).map(|e| e.tween.progress()))
    }

    pub fn state_of(&self, element: ElementId) -> Option<VisualState> {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().states.get(&element).copied().unwrap_or_default())
    }

    /// Write `props` onto `element` without animating
    pub fn apply(&self, element: ElementId, props: &PropSet) {
        if let Some(inner) = self.inner.upgrade() {
            props.apply_to(inner.borrow_mut().states.entry(element).or_default());
        }
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Scoped tween
// ============================================================================

/// A tween that is killed when this wrapper is dropped
///
/// ```ignore
/// let hide = handle.animate(key, Tween::to(PropSet::new().opacity(0.0), 1200.0));
/// // ... later, a show supersedes it or the owner drops it
/// ```
pub struct AnimatedTween {
    handle: SchedulerHandle,
    id: Option<TweenId>,
}

impl AnimatedTween {
    pub fn id(&self) -> Option<TweenId> {
        self.id
    }

    pub fn is_playing(&self) -> bool {
        self.id.is_some_and(|id| self.handle.is_playing(id))
    }

    /// Whether the tween is still registered (it may have been superseded)
    pub fn is_registered(&self) -> bool {
        self.id.is_some_and(|id| self.handle.is_registered(id))
    }

    pub fn progress(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.progress(id))
            .unwrap_or(0.0)
    }

    pub fn reverse(&self) {
        if let Some(id) = self.id {
            self.handle.reverse(id);
        }
    }

    pub fn play(&self) {
        if let Some(id) = self.id {
            self.handle.play(id);
        }
    }

    pub fn restart(&self) {
        if let Some(id) = self.id {
            self.handle.restart(id);
        }
    }

    pub fn complete(&self) {
        if let Some(id) = self.id {
            self.handle.complete(id);
        }
    }

    pub fn seek(&self, progress: f32) {
        if let Some(id) = self.id {
            self.handle.seek(id, progress);
        }
    }

    /// Kill the tween now; dropping afterwards does nothing
    pub fn kill(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.kill(id);
        }
    }
}

impl Drop for AnimatedTween {
    fn drop(&mut self) {
        self.kill();
    }
}

impl std::fmt::Debug for AnimatedTween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedTween").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use vitrine_core::{Layout, Rect};

    fn element() -> ElementId {
        Layout::new().insert("el", Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_scheduler_tick() {
        let scheduler = AnimationScheduler::new();
        let el = element();
        scheduler.add(
            TargetKey::new(el, Purpose::Entrance),
            Tween::to(PropSet::new().x(100.0), 100.0).easing(Easing::Linear),
        );

        assert!(scheduler.tick(50.0));
        assert!((scheduler.state_of(el).x - 50.0).abs() < 1e-4);
        assert!(!scheduler.tick(50.0));
        assert_eq!(scheduler.state_of(el).x, 100.0);

        // Finished tweens stay registered until killed
        assert_eq!(scheduler.tween_count(), 1);
        assert_eq!(scheduler.running_count(), 0);
    }

    #[test]
    fn test_supersession_kills_previous() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let el = element();
        let key = TargetKey::new(el, Purpose::Visibility);

        let hide = handle.animate(key, Tween::to(PropSet::new().opacity(0.0), 1200.0));
        scheduler.tick(300.0);
        let show = handle.animate(key, Tween::to(PropSet::new().opacity(1.0), 800.0));

        assert!(!hide.is_registered());
        assert!(show.is_playing());
        assert_eq!(scheduler.tweens_for(el).len(), 1);
        assert_eq!(scheduler.tween_for(key), show.id());

        // Dropping the superseded wrapper must not touch the new tween
        drop(hide);
        assert!(show.is_playing());
    }

    #[test]
    fn test_purposes_coexist() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let el = element();

        let _a = handle.animate(
            TargetKey::new(el, Purpose::Entrance),
            Tween::to(PropSet::new().opacity(1.0), 100.0),
        );
        let _b = handle.animate(
            TargetKey::new(el, Purpose::Hover),
            Tween::to(PropSet::new().scale(1.5), 100.0),
        );
        assert_eq!(scheduler.tweens_for(el).len(), 2);
    }

    #[test]
    fn test_animated_tween_drop_kills() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let el = element();

        {
            let _tween = handle.animate(
                TargetKey::new(el, Purpose::Loop),
                Tween::to(PropSet::new().y(10.0), 100.0).repeat(-1).yoyo(true),
            );
            assert_eq!(scheduler.tween_count(), 1);
        }
        assert_eq!(scheduler.tween_count(), 0);
    }

    #[test]
    fn test_kill_is_idempotent() {
        let scheduler = AnimationScheduler::new();
        let el = element();
        let id = scheduler.add(
            TargetKey::new(el, Purpose::Reveal),
            Tween::to(PropSet::new().opacity(1.0), 100.0),
        );

        assert!(scheduler.kill(id));
        assert!(!scheduler.kill(id));
        assert!(!scheduler.handle().kill(id));
    }

    #[test]
    fn test_seek_through_handle() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let el = element();
        let scrub = handle.animate(
            TargetKey::new(el, Purpose::Scrub),
            Tween::to(PropSet::new().y(150.0), 1000.0)
                .easing(Easing::Linear)
                .paused(),
        );

        scrub.seek(0.4);
        assert!((scheduler.state_of(el).y - 60.0).abs() < 1e-3);
        assert!((scrub.progress() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_forget_element() {
        let scheduler = AnimationScheduler::new();
        let el = element();
        scheduler.apply(el, &PropSet::new().opacity(0.0));
        scheduler.add(
            TargetKey::new(el, Purpose::Reveal),
            Tween::to(PropSet::new().opacity(1.0), 100.0),
        );

        scheduler.forget(el);
        assert_eq!(scheduler.tween_count(), 0);
        assert_eq!(scheduler.state_of(el), VisualState::default());
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());
        let el = element();
        let tween = handle.animate(
            TargetKey::new(el, Purpose::Entrance),
            Tween::to(PropSet::new().opacity(1.0), 100.0),
        );
        assert!(tween.id().is_none());
        assert!(handle.state_of(el).is_none());
    }
}
