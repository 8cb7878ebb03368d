//! Hero section and its idle/activity cycle
//!
//! The hero plays an entrance sequence on mount, then hides its content after
//! a stretch without input and shows it again on the next pointer move, touch,
//! or scroll. Pointer and touch input only count inside the hero; scrolling
//! counts anywhere on the page.
//!
//! Show and hide tweens share [`Purpose::Visibility`] on each target, so
//! starting one always kills whatever the other left running.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::debug;
use vitrine_animation::{
    AnimatedTween, Easing, Edge, PropSet, Purpose, ScrollRange, Stagger, TargetKey, Timeline,
    Tween,
};
use vitrine_core::{
    ElementId, ElementKind, Layout, Point, PointerEvent, Rect, Subscription, TimerId,
};

use crate::host::HostContext;
use crate::scrub::{ScrollLinkedAnimator, ScrubSpec};

/// Hero visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeroState {
    Visible,
    Hidden,
}

/// Most recent input and the resulting visibility
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivityState {
    pub last_input_ms: f64,
    pub visible: bool,
}

/// Elements making up the hero
#[derive(Clone, Debug)]
pub struct HeroElements {
    pub section: ElementId,
    /// Wrapper moved by the scroll parallax
    pub parallax: ElementId,
    /// Content block moved by show/hide
    pub content: ElementId,
    pub video: ElementId,
    pub overlay: ElementId,
    pub title: ElementId,
    pub subtitle: ElementId,
    pub description: ElementId,
    pub cta: SmallVec<[ElementId; 4]>,
    pub social: SmallVec<[ElementId; 4]>,
    pub scroll_indicator: ElementId,
    /// Inner cue inside the indicator, bounced forever
    pub scroll_cue: ElementId,
}

impl HeroElements {
    /// Lay out a full-bleed hero at the top of the document
    pub fn create(layout: &Layout, width: f32, height: f32) -> Self {
        let section = Rect::new(0.0, 0.0, width, height);
        let inner = Rect::new(width * 0.1, height * 0.25, width * 0.8, height * 0.5);
        let line = |y: f32, h: f32| Rect::new(inner.x, inner.y + y, inner.width, h);

        let cta = (0..2)
            .map(|i| {
                layout.insert_kind(
                    format!("hero.cta.{i}"),
                    ElementKind::Button,
                    Rect::new(inner.x + i as f32 * 220.0, inner.y + 300.0, 200.0, 56.0),
                )
            })
            .collect();
        let social = (0..3)
            .map(|i| {
                layout.insert_kind(
                    format!("hero.social.{i}"),
                    ElementKind::Link,
                    Rect::new(inner.x + i as f32 * 48.0, inner.y + 380.0, 40.0, 40.0),
                )
            })
            .collect();
        let indicator = Rect::new(width / 2.0 - 20.0, height - 100.0, 40.0, 64.0);

        Self {
            section: layout.insert("hero", section),
            parallax: layout.insert("hero.parallax", inner),
            content: layout.insert("hero.content", inner),
            video: layout.insert("hero.video", section),
            overlay: layout.insert("hero.overlay", section),
            title: layout.insert("hero.title", line(0.0, 160.0)),
            subtitle: layout.insert("hero.subtitle", line(170.0, 40.0)),
            description: layout.insert("hero.description", line(220.0, 60.0)),
            cta,
            social,
            scroll_indicator: layout.insert_kind(
                "hero.scroll_indicator",
                ElementKind::Button,
                indicator,
            ),
            scroll_cue: layout.insert("hero.scroll_cue", indicator),
        }
    }
}

fn visibility(element: ElementId) -> TargetKey {
    TargetKey::new(element, Purpose::Visibility)
}

struct IdleInner {
    ctx: HostContext,
    elements: HeroElements,
    this: Weak<RefCell<IdleInner>>,
    activity: ActivityState,
    timer: Option<TimerId>,
    /// Content, indicator, overlay
    visibility: SmallVec<[AnimatedTween; 3]>,
    entrance: Vec<AnimatedTween>,
    bounce: Option<AnimatedTween>,
    cycles: u32,
}

impl IdleInner {
    fn arm(&mut self, delay_ms: f64) {
        if let Some(id) = self.timer.take() {
            self.ctx.timers().clear(id);
        }
        let weak = self.this.clone();
        self.timer = Some(self.ctx.timers().set_timeout(delay_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_idle();
            }
        }));
    }

    fn on_input(&mut self) {
        self.activity.last_input_ms = self.ctx.now();
        if !self.activity.visible {
            self.show();
        }
        let timeout = self.ctx.config().idle_timeout_ms;
        self.arm(timeout);
    }

    fn on_idle(&mut self) {
        self.timer = None;
        if self.activity.visible {
            self.hide();
        }
    }

    fn hide(&mut self) {
        let handle = self.ctx.animations();
        let e = &self.elements;
        self.visibility = SmallVec::from_iter([
            handle.animate(
                visibility(e.content),
                Tween::to(PropSet::new().y(-80.0).opacity(0.0), 1200.0)
                    .easing(Easing::Power3InOut),
            ),
            handle.animate(
                visibility(e.scroll_indicator),
                Tween::to(PropSet::new().y(30.0).opacity(0.0), 1000.0)
                    .easing(Easing::Power3InOut),
            ),
            handle.animate(
                visibility(e.overlay),
                Tween::to(PropSet::new().opacity(0.3), 1500.0).easing(Easing::Power2InOut),
            ),
        ]);
        self.activity.visible = false;
        self.cycles += 1;
        debug!(now_ms = self.ctx.now(), cycles = self.cycles, "hero content hidden");
    }

    fn show(&mut self) {
        let handle = self.ctx.animations();
        let e = &self.elements;
        self.visibility = SmallVec::from_iter([
            handle.animate(
                visibility(e.content),
                Tween::to(PropSet::new().y(0.0).opacity(1.0), 800.0).easing(Easing::Power3Out),
            ),
            handle.animate(
                visibility(e.scroll_indicator),
                Tween::to(PropSet::new().y(0.0).opacity(1.0), 600.0).easing(Easing::Power3Out),
            ),
            handle.animate(
                visibility(e.overlay),
                Tween::to(PropSet::new().opacity(1.0), 800.0).easing(Easing::Power2Out),
            ),
        ]);
        self.activity.visible = true;
        debug!(now_ms = self.ctx.now(), "hero content shown");
    }

    /// Entrance timeline: title, then overlapping subtitle, description,
    /// calls to action, social links, scroll indicator
    fn play_entrance(&mut self) {
        let handle = self.ctx.animations().clone();
        let e = self.elements.clone();
        let mut tl = Timeline::with_delay(500.0);
        let entrance = |el: ElementId, from: PropSet, ms: f32, at: f32, easing: Easing| {
            let to = from.resting();
            handle.animate(
                TargetKey::new(el, Purpose::Entrance),
                Tween::from_to(from, to, ms).delay(at).easing(easing),
            )
        };

        let at = tl.push(1200.0, 0.0);
        self.entrance.push(entrance(
            e.title,
            PropSet::new().y(100.0).opacity(0.0).clip_top(1.0),
            1200.0,
            at,
            Easing::Power4Out,
        ));
        let at = tl.push(800.0, -600.0);
        self.entrance.push(entrance(
            e.subtitle,
            PropSet::new().y(50.0).opacity(0.0),
            800.0,
            at,
            Easing::Power3Out,
        ));
        let at = tl.push(800.0, -400.0);
        self.entrance.push(entrance(
            e.description,
            PropSet::new().y(30.0).opacity(0.0),
            800.0,
            at,
            Easing::Power3Out,
        ));
        for group in [&e.cta, &e.social] {
            let starts = tl.push_staggered(group.len(), 600.0, Stagger::new(150.0), -300.0);
            for (&el, at) in group.iter().zip(starts) {
                self.entrance.push(entrance(
                    el,
                    PropSet::new().y(30.0).opacity(0.0),
                    600.0,
                    at,
                    Easing::Power2Out,
                ));
            }
        }

        // The indicator's entrance shares the visibility key so an early
        // hide or show supersedes it
        let at = tl.push(600.0, -200.0);
        self.visibility.push(handle.animate(
            visibility(e.scroll_indicator),
            Tween::from_to(
                PropSet::new().y(-20.0).opacity(0.0),
                PropSet::new().y(0.0).opacity(1.0),
                600.0,
            )
            .delay(at)
            .easing(Easing::Power2Out),
        ));

        self.bounce = Some(handle.animate(
            TargetKey::new(e.scroll_cue, Purpose::Loop),
            Tween::to(PropSet::new().y(10.0), 1500.0)
                .repeat(-1)
                .yoyo(true)
                .easing(Easing::Power1InOut),
        ));
        debug!(end_ms = tl.end_ms(), "hero entrance scheduled");
    }

    fn teardown(&mut self) {
        if let Some(id) = self.timer.take() {
            self.ctx.timers().clear(id);
        }
        self.visibility.clear();
        self.entrance.clear();
        self.bounce = None;
    }
}

/// Idle/activity controller for one hero section
pub struct IdleController {
    inner: Rc<RefCell<IdleInner>>,
    subscriptions: SmallVec<[Subscription; 3]>,
    parallax: SmallVec<[ScrollLinkedAnimator; 2]>,
}

impl IdleController {
    /// Play the entrance, arm the first (extended) idle timer, and start
    /// listening for activity
    pub fn mount(ctx: &HostContext, elements: HeroElements) -> Self {
        let section = elements.section;
        let parallax = elements.parallax;
        let video = elements.video;

        let inner = Rc::new_cyclic(|this| {
            RefCell::new(IdleInner {
                ctx: ctx.clone(),
                elements,
                this: this.clone(),
                activity: ActivityState {
                    last_input_ms: ctx.now(),
                    visible: true,
                },
                timer: None,
                visibility: SmallVec::new(),
                entrance: Vec::new(),
                bounce: None,
                cycles: 0,
            })
        });
        {
            let mut inner = inner.borrow_mut();
            inner.play_entrance();
            let first = ctx.config().first_idle_deadline_ms();
            inner.arm(first);
        }

        let mut subscriptions = SmallVec::new();
        let weak = Rc::downgrade(&inner);
        let layout = ctx.layout().clone();
        let pointer_ctx = ctx.clone();
        subscriptions.push(ctx.pointer().subscribe(move |event| {
            let PointerEvent::Moved { x, y } = *event else {
                return;
            };
            let point = pointer_ctx.viewport().to_document(Point::new(x, y));
            if !layout.hit(section, point) {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_input();
            }
        }));

        let weak = Rc::downgrade(&inner);
        let layout = ctx.layout().clone();
        let touch_ctx = ctx.clone();
        subscriptions.push(ctx.touch().subscribe(move |event| {
            if !event.is_contact() {
                return;
            }
            let Some(client) = event.position() else {
                return;
            };
            if !layout.hit(section, touch_ctx.viewport().to_document(client)) {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_input();
            }
        }));

        let weak = Rc::downgrade(&inner);
        subscriptions.push(ctx.scroll().subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_input();
            }
        }));

        let range = ScrollRange::new(Edge::TOP_TOP, Edge::BOTTOM_TOP);
        let parallax = SmallVec::from_iter([
            ScrollLinkedAnimator::mount(
                ctx,
                ScrubSpec::new(parallax, section, range, PropSet::new().y(150.0).opacity(0.0))
                    .smoothing(1000.0),
            ),
            ScrollLinkedAnimator::mount(
                ctx,
                ScrubSpec::new(video, section, range, PropSet::new().y(100.0)).smoothing(1000.0),
            ),
        ]);

        debug!("hero mounted");
        Self {
            inner,
            subscriptions,
            parallax,
        }
    }

    pub fn state(&self) -> HeroState {
        if self.inner.borrow().activity.visible {
            HeroState::Visible
        } else {
            HeroState::Hidden
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state() == HeroState::Visible
    }

    pub fn activity(&self) -> ActivityState {
        self.inner.borrow().activity
    }

    pub fn last_input_ms(&self) -> f64 {
        self.inner.borrow().activity.last_input_ms
    }

    /// Number of completed hide transitions
    pub fn hide_count(&self) -> u32 {
        self.inner.borrow().cycles
    }

    pub fn elements(&self) -> HeroElements {
        self.inner.borrow().elements.clone()
    }

    /// Whether the idle timer is armed
    pub fn has_pending_timer(&self) -> bool {
        let inner = self.inner.borrow();
        inner
            .timer
            .is_some_and(|id| inner.ctx.timers().is_pending(id))
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Cancel the idle timer, every tween, and every listener
    pub fn unmount(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.subscriptions.clear();
        self.parallax.clear();
        self.inner.borrow_mut().teardown();
        debug!("hero unmounted");
    }
}

impl Drop for IdleController {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use vitrine_core::{InputEvent, TouchEvent};

    fn mounted() -> (Host, IdleController) {
        let host = Host::desktop();
        let elements = HeroElements::create(host.layout(), 1440.0, 900.0);
        let hero = IdleController::mount(&host.context(), elements);
        (host, hero)
    }

    #[test]
    fn test_first_hide_waits_for_grace() {
        let (host, hero) = mounted();
        host.run_for(4900.0, 20.0);
        assert!(hero.is_visible());
        host.run_for(200.0, 20.0);
        assert_eq!(hero.state(), HeroState::Hidden);
    }

    #[test]
    fn test_input_resets_window() {
        let (host, hero) = mounted();
        host.run_for(4000.0, 20.0);
        host.pointer_move(700.0, 400.0);
        host.run_for(2900.0, 20.0);
        assert!(hero.is_visible());
        host.run_for(200.0, 20.0);
        assert!(!hero.is_visible());
    }

    #[test]
    fn test_pointer_outside_hero_is_ignored() {
        let (host, hero) = mounted();
        host.run_for(5100.0, 20.0);
        assert!(!hero.is_visible());

        // Below the hero in document space
        host.pointer_move(700.0, 950.0);
        assert!(!hero.is_visible());

        host.dispatch(InputEvent::Touch(TouchEvent::Started {
            id: 1,
            x: 10.0,
            y: 10.0,
        }));
        assert!(hero.is_visible());
    }

    #[test]
    fn test_scroll_anywhere_counts() {
        let (host, hero) = mounted();
        host.run_for(5100.0, 20.0);
        assert!(!hero.is_visible());
        host.scroll_to(3000.0);
        assert!(hero.is_visible());
        assert_eq!(hero.last_input_ms(), host.now());
    }

    #[test]
    fn test_hide_then_show_supersedes() {
        let (host, hero) = mounted();
        let content = hero.elements().content;
        host.run_for(5100.0, 20.0);
        host.pointer_move(700.0, 400.0);

        // The show superseded the half-finished hide
        assert_eq!(host.scheduler().tweens_for(content).len(), 1);
        assert!(hero.is_visible());

        host.run_for(1000.0, 20.0);
        let state = host.scheduler().state_of(content);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn test_entrance_settles_to_resting() {
        let (host, hero) = mounted();
        let e = hero.elements();
        assert_eq!(host.scheduler().state_of(e.title).opacity, 0.0);
        assert_eq!(host.scheduler().state_of(e.title).clip_top, 1.0);

        host.run_for(4500.0, 16.0);
        for el in [e.title, e.subtitle, e.description, e.cta[1], e.social[2]] {
            let state = host.scheduler().state_of(el);
            assert_eq!(state.y, 0.0);
            assert_eq!(state.opacity, 1.0);
        }
        assert_eq!(host.scheduler().state_of(e.title).clip_top, 0.0);
    }

    #[test]
    fn test_unmount_leaves_nothing_behind() {
        let (host, mut hero) = mounted();
        assert!(hero.has_pending_timer());
        hero.unmount();
        assert!(host.counts().is_idle(), "{:?}", host.counts());
    }
}
