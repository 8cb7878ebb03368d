//! Scroll-linked animation
//!
//! A [`ScrollLinkedAnimator`] ties the playhead of one paused tween to the
//! scroll position between two trigger edges. Progress is recomputed from the
//! trigger's current rect on every scroll, resize, and frame, so a trigger that
//! changes size moves its boundaries with it.
//!
//! With `smoothing_ms > 0` the applied playhead chases the raw scroll progress
//! exponentially on each frame instead of jumping to it (GSAP's `scrub: 1`).

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use vitrine_animation::{
    AnimatedTween, Easing, Interpolate, PropSet, Purpose, ScrollRange, TargetKey, Tween,
};
use vitrine_core::{ElementId, Subscription};

use crate::host::HostContext;

/// Number of time constants in one smoothing window
const SETTLE_TIME_CONSTANTS: f32 = 4.0;

/// Playhead distance below which smoothing snaps to the target
const SETTLE_EPSILON: f32 = 1e-4;

/// Nominal duration of a scrubbed tween; only its progress matters
const SCRUB_DURATION_MS: f32 = 1000.0;

/// What to scrub and between which boundaries
#[derive(Clone, Debug)]
pub struct ScrubSpec {
    /// Element whose visual state is driven
    pub target: ElementId,
    /// Element whose rect defines the boundaries
    pub trigger: ElementId,
    pub range: ScrollRange,
    /// Start values; the target's current state when `None`
    pub from: Option<PropSet>,
    pub to: PropSet,
    /// Catch-up time for the applied playhead; 0 follows scroll exactly
    pub smoothing_ms: f32,
}

impl ScrubSpec {
    pub fn new(target: ElementId, trigger: ElementId, range: ScrollRange, to: PropSet) -> Self {
        Self {
            target,
            trigger,
            range,
            from: None,
            to,
            smoothing_ms: 0.0,
        }
    }

    pub fn from(mut self, from: PropSet) -> Self {
        self.from = Some(from);
        self
    }

    pub fn smoothing(mut self, ms: f32) -> Self {
        self.smoothing_ms = ms.max(0.0);
        self
    }
}

struct ScrubInner {
    ctx: HostContext,
    spec: ScrubSpec,
    tween: AnimatedTween,
    raw: f32,
    applied: f32,
}

impl ScrubInner {
    fn sample(&mut self) {
        let Some(rect) = self.ctx.layout().rect(self.spec.trigger) else {
            return;
        };
        self.raw = self.spec.range.progress(rect, &self.ctx.viewport());
        if self.spec.smoothing_ms <= 0.0 {
            self.set_applied(self.raw);
        }
    }

    fn frame(&mut self, dt_ms: f32) {
        self.sample();
        if self.spec.smoothing_ms <= 0.0 {
            return;
        }
        let tau = self.spec.smoothing_ms / SETTLE_TIME_CONSTANTS;
        let k = 1.0 - (-dt_ms / tau).exp();
        let mut next = self.applied.lerp(&self.raw, k);
        if next.approx_eq(&self.raw, SETTLE_EPSILON) {
            next = self.raw;
        }
        self.set_applied(next);
    }

    fn set_applied(&mut self, progress: f32) {
        self.applied = progress;
        self.tween.seek(progress);
    }
}

/// Scroll-scrubbed animation bound to one target
pub struct ScrollLinkedAnimator {
    inner: Rc<RefCell<ScrubInner>>,
    subscriptions: SmallVec<[Subscription; 3]>,
}

impl ScrollLinkedAnimator {
    pub fn mount(ctx: &HostContext, spec: ScrubSpec) -> Self {
        let tween = match &spec.from {
            Some(from) => Tween::from_to(from.clone(), spec.to.clone(), SCRUB_DURATION_MS),
            None => Tween::to(spec.to.clone(), SCRUB_DURATION_MS),
        }
        .easing(Easing::Linear)
        .paused();
        let tween = ctx
            .animations()
            .animate(TargetKey::new(spec.target, Purpose::Scrub), tween);

        let inner = Rc::new(RefCell::new(ScrubInner {
            ctx: ctx.clone(),
            spec,
            tween,
            raw: 0.0,
            applied: 0.0,
        }));
        {
            let mut inner = inner.borrow_mut();
            inner.sample();
            let raw = inner.raw;
            inner.set_applied(raw);
        }

        let mut subscriptions = SmallVec::new();
        let weak = Rc::downgrade(&inner);
        subscriptions.push(ctx.scroll().subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().sample();
            }
        }));
        let weak = Rc::downgrade(&inner);
        subscriptions.push(ctx.resize().subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().sample();
            }
        }));
        let weak = Rc::downgrade(&inner);
        subscriptions.push(ctx.frames().subscribe(move |tick| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().frame(tick.dt_ms);
            }
        }));

        Self {
            inner,
            subscriptions,
        }
    }

    /// Raw scroll progress through the range, clamped to [0, 1]
    pub fn progress(&self) -> f32 {
        self.inner.borrow().raw
    }

    /// Progress currently written to the target (lags `progress` when smoothed)
    pub fn applied_progress(&self) -> f32 {
        self.inner.borrow().applied
    }

    pub fn target(&self) -> ElementId {
        self.inner.borrow().spec.target
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Release listeners and the scrubbed tween; safe to call repeatedly
    pub fn unmount(&mut self) {
        self.subscriptions.clear();
        self.inner.borrow_mut().tween.kill();
    }
}

impl Drop for ScrollLinkedAnimator {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use vitrine_animation::Edge;
    use vitrine_core::Rect;

    fn setup(smoothing_ms: f32) -> (Host, ElementId, ScrollLinkedAnimator) {
        let host = Host::desktop();
        let section = host.layout().insert("hero", Rect::new(0.0, 0.0, 1440.0, 900.0));
        let spec = ScrubSpec::new(
            section,
            section,
            ScrollRange::new(Edge::TOP_TOP, Edge::BOTTOM_TOP),
            PropSet::new().y(150.0).opacity(0.0),
        )
        .smoothing(smoothing_ms);
        let animator = ScrollLinkedAnimator::mount(&host.context(), spec);
        (host, section, animator)
    }

    #[test]
    fn test_exact_scrub_follows_scroll() {
        let (host, section, animator) = setup(0.0);
        assert_eq!(animator.progress(), 0.0);

        host.scroll_to(450.0);
        assert!((animator.progress() - 0.5).abs() < 1e-6);
        let state = host.scheduler().state_of(section);
        assert!((state.y - 75.0).abs() < 1e-3);
        assert!((state.opacity - 0.5).abs() < 1e-4);

        host.scroll_to(5000.0);
        assert_eq!(animator.progress(), 1.0);
        assert_eq!(host.scheduler().state_of(section).y, 150.0);
    }

    #[test]
    fn test_smoothed_scrub_lags_then_settles() {
        let (host, section, animator) = setup(1000.0);

        host.scroll_to(900.0);
        assert_eq!(animator.progress(), 1.0);
        assert_eq!(animator.applied_progress(), 0.0);

        host.advance(100.0);
        let partial = animator.applied_progress();
        assert!(partial > 0.0 && partial < 1.0);

        host.run_for(3000.0, 16.0);
        assert_eq!(animator.applied_progress(), 1.0);
        assert_eq!(host.scheduler().state_of(section).y, 150.0);
    }

    #[test]
    fn test_trigger_resize_recomputes_boundaries() {
        let (host, section, animator) = setup(0.0);
        host.scroll_to(300.0);
        assert!((animator.progress() - 300.0 / 900.0).abs() < 1e-5);

        host.layout()
            .set_rect(section, Rect::new(0.0, 0.0, 1440.0, 600.0));
        host.resize(1440.0, 600.0);
        assert!((animator.progress() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let (host, _section, mut animator) = setup(1000.0);
        assert!(host.counts().listeners > 0);

        animator.unmount();
        animator.unmount();
        assert!(!animator.is_mounted());
        assert!(host.counts().is_idle());
    }
}
