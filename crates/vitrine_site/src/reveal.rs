//! Section reveals
//!
//! The [`RevealCoordinator`] owns every "animate in when scrolled into view"
//! registration on a page. Each registration's targets are put into their
//! start state as soon as it is registered and wait, paused, until their
//! trigger's start edge is crossed. Toggle actions decide what later
//! crossings do; the default plays once per mount.
//!
//! Counters are registrations with [`RevealSpec::counter`] set: the target's
//! `value` channel runs from 0 to N snapped to whole numbers.
//!
//! # Example
//!
//! ```rust
//! use vitrine_site::host::Host;
//! use vitrine_site::reveal::{presets, RevealCoordinator};
//! use vitrine_core::Rect;
//!
//! let host = Host::desktop();
//! let section = host.layout().insert("about", Rect::new(0.0, 1800.0, 1440.0, 900.0));
//! let title = host.layout().insert("about.title", Rect::new(0.0, 1900.0, 800.0, 80.0));
//!
//! let mut reveals = RevealCoordinator::mount(&host.context());
//! let id = reveals.register(presets::section_title(title, section));
//! assert_eq!(host.scheduler().state_of(title).opacity, 0.0);
//!
//! host.scroll_to(1200.0);
//! host.run_for(1000.0, 16.0);
//! assert!(reveals.is_played(id));
//! assert_eq!(host.scheduler().state_of(title).opacity, 1.0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};
use vitrine_animation::{
    AnimatedTween, Easing, Edge, PropSet, Purpose, ScrollRange, ScrollTrigger, Stagger,
    TargetKey, ToggleAction, ToggleActions, TriggerEvent, Tween,
};
use vitrine_core::{ElementId, Subscription, Viewport};

use crate::host::HostContext;

new_key_type! {
    /// Handle to one reveal registration
    pub struct RevealId;
}

/// What starts a reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealTrigger {
    /// All targets start together when this element crosses the start edge
    Element(ElementId),
    /// Every target is its own trigger
    EachTarget,
    /// Play as soon as registered, no scroll involvement
    Immediate,
}

/// One reveal registration
#[derive(Clone, Debug)]
pub struct RevealSpec {
    pub targets: SmallVec<[ElementId; 8]>,
    pub trigger: RevealTrigger,
    pub start: Edge,
    pub from: PropSet,
    /// End values; the resting values of `from`'s properties when `None`
    pub to: Option<PropSet>,
    pub duration_ms: f32,
    pub delay_ms: f32,
    pub stagger: Stagger,
    pub easing: Easing,
    /// Count the target's value up to this number instead of moving it
    pub counter: Option<u32>,
    pub toggle: ToggleActions,
}

impl RevealSpec {
    pub fn new(targets: impl IntoIterator<Item = ElementId>, trigger: RevealTrigger) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            trigger,
            start: Edge::top_at(80.0),
            from: PropSet::new(),
            to: None,
            duration_ms: 500.0,
            delay_ms: 0.0,
            stagger: Stagger::none(),
            easing: Easing::default(),
            counter: None,
            toggle: ToggleActions::PLAY_ONCE,
        }
    }

    pub fn start(mut self, edge: Edge) -> Self {
        self.start = edge;
        self
    }

    pub fn from(mut self, from: PropSet) -> Self {
        self.from = from;
        self
    }

    pub fn to(mut self, to: PropSet) -> Self {
        self.to = Some(to);
        self
    }

    pub fn duration(mut self, ms: f32) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn delay(mut self, ms: f32) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn counter(mut self, target: u32) -> Self {
        self.counter = Some(target);
        self
    }

    pub fn toggle(mut self, toggle: ToggleActions) -> Self {
        self.toggle = toggle;
        self
    }

    fn purpose(&self) -> Purpose {
        if self.counter.is_some() {
            Purpose::Counter
        } else {
            Purpose::Reveal
        }
    }

    fn tween_for(&self, index: usize) -> Tween {
        let total = self.targets.len();
        let delay = self.delay_ms + self.stagger.delay_for_index(index, total);
        let tween = match self.counter {
            Some(n) => Tween::from_to(
                PropSet::new().value(0.0),
                PropSet::new().value(n as f32),
                self.duration_ms,
            )
            .snap(1.0),
            None => {
                let to = self.to.clone().unwrap_or_else(|| self.from.resting());
                Tween::from_to(self.from.clone(), to, self.duration_ms)
            }
        };
        let tween = tween.delay(delay).easing(self.easing);
        if self.trigger == RevealTrigger::Immediate {
            tween
        } else {
            tween.paused()
        }
    }
}

/// A trigger and the target indices it drives
struct Group {
    element: ElementId,
    trigger: ScrollTrigger,
    members: SmallVec<[usize; 8]>,
    entered: bool,
}

struct Registration {
    spec: RevealSpec,
    groups: SmallVec<[Group; 1]>,
    tweens: Vec<AnimatedTween>,
}

impl Registration {
    fn build(ctx: &HostContext, spec: RevealSpec) -> Self {
        let purpose = spec.purpose();
        let tweens = spec
            .targets
            .iter()
            .enumerate()
            .map(|(i, &target)| {
                ctx.animations()
                    .animate(TargetKey::new(target, purpose), spec.tween_for(i))
            })
            .collect();

        let range = ScrollRange::from_start(spec.start);
        let groups = match spec.trigger {
            RevealTrigger::Element(element) => SmallVec::from_buf([Group {
                element,
                trigger: ScrollTrigger::new(range),
                members: (0..spec.targets.len()).collect(),
                entered: false,
            }]),
            RevealTrigger::EachTarget => spec
                .targets
                .iter()
                .enumerate()
                .map(|(i, &element)| Group {
                    element,
                    trigger: ScrollTrigger::new(range),
                    members: SmallVec::from_elem(i, 1),
                    entered: false,
                })
                .collect(),
            RevealTrigger::Immediate => SmallVec::new(),
        };

        Self {
            spec,
            groups,
            tweens,
        }
    }

    fn evaluate(&mut self, ctx: &HostContext, viewport: &Viewport) {
        let layout = ctx.layout();
        for group in &mut self.groups {
            let Some(rect) = layout.rect(group.element) else {
                continue;
            };
            for event in group.trigger.update(rect, viewport) {
                if event == TriggerEvent::Enter {
                    group.entered = true;
                }
                let action = self.spec.toggle.action_for(event);
                if action == ToggleAction::None {
                    continue;
                }
                trace!(?event, ?action, members = group.members.len(), "reveal trigger");
                for &i in &group.members {
                    let Some(tween) = self.tweens.get(i) else {
                        continue;
                    };
                    match action {
                        ToggleAction::Play => tween.play(),
                        ToggleAction::Reverse => tween.reverse(),
                        ToggleAction::Restart => tween.restart(),
                        ToggleAction::Complete => tween.complete(),
                        ToggleAction::None => {}
                    }
                }
            }
        }
    }

    fn is_played(&self) -> bool {
        self.groups.iter().all(|g| g.entered)
    }
}

struct RevealInner {
    ctx: HostContext,
    registrations: SlotMap<RevealId, Registration>,
}

impl RevealInner {
    fn evaluate_all(&mut self, viewport: &Viewport) {
        let ctx = &self.ctx;
        for registration in self.registrations.values_mut() {
            registration.evaluate(ctx, viewport);
        }
    }
}

/// Scroll-triggered entrance animations for one page
pub struct RevealCoordinator {
    inner: Rc<RefCell<RevealInner>>,
    subscriptions: SmallVec<[Subscription; 2]>,
}

impl RevealCoordinator {
    pub fn mount(ctx: &HostContext) -> Self {
        let inner = Rc::new(RefCell::new(RevealInner {
            ctx: ctx.clone(),
            registrations: SlotMap::with_key(),
        }));

        let mut subscriptions = SmallVec::new();
        let weak = Rc::downgrade(&inner);
        subscriptions.push(ctx.scroll().subscribe(move |viewport| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().evaluate_all(viewport);
            }
        }));
        let weak = Rc::downgrade(&inner);
        subscriptions.push(ctx.resize().subscribe(move |viewport| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().evaluate_all(viewport);
            }
        }));

        Self {
            inner,
            subscriptions,
        }
    }

    /// Register a reveal; its targets take their start values immediately
    pub fn register(&mut self, spec: RevealSpec) -> RevealId {
        let mut inner = self.inner.borrow_mut();
        let ctx = inner.ctx.clone();
        let viewport = ctx.viewport();
        debug!(targets = spec.targets.len(), trigger = ?spec.trigger, "reveal registered");

        let mut registration = Registration::build(&ctx, spec);
        registration.evaluate(&ctx, &viewport);
        inner.registrations.insert(registration)
    }

    /// Swap a registration's target set and run its entrance for the new set
    ///
    /// Removed targets keep whatever state they were last given.
    pub fn replace_targets(
        &mut self,
        id: RevealId,
        targets: impl IntoIterator<Item = ElementId>,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let ctx = inner.ctx.clone();
        let Some(slot) = inner.registrations.get_mut(id) else {
            return false;
        };

        let mut spec = slot.spec.clone();
        spec.targets = targets.into_iter().collect();
        debug!(targets = spec.targets.len(), "reveal targets replaced");

        // Old tweens die before the new set registers
        slot.tweens.clear();
        let mut registration = Registration::build(&ctx, spec);
        registration.evaluate(&ctx, &ctx.viewport());
        *slot = registration;
        true
    }

    /// Whether every trigger of the registration has been entered
    ///
    /// Immediate registrations count as played.
    pub fn is_played(&self, id: RevealId) -> bool {
        self.inner
            .borrow()
            .registrations
            .get(id)
            .is_some_and(Registration::is_played)
    }

    pub fn targets(&self, id: RevealId) -> SmallVec<[ElementId; 8]> {
        self.inner
            .borrow()
            .registrations
            .get(id)
            .map(|r| r.spec.targets.clone())
            .unwrap_or_default()
    }

    /// Displayed value of a counter element
    pub fn counter_value(&self, element: ElementId) -> u32 {
        self.inner
            .borrow()
            .ctx
            .animations()
            .state_of(element)
            .map(|state| state.value.max(0.0).round() as u32)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn unmount(&mut self) {
        self.subscriptions.clear();
        self.inner.borrow_mut().registrations.clear();
    }
}

impl Drop for RevealCoordinator {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Reveal settings used across the site's sections
pub mod presets {
    use super::*;

    /// Section heading, triggered by its section
    pub fn section_title(title: ElementId, section: ElementId) -> RevealSpec {
        RevealSpec::new([title], RevealTrigger::Element(section))
            .from(PropSet::new().y(60.0).opacity(0.0))
            .duration(800.0)
    }

    pub fn about_image(image: ElementId) -> RevealSpec {
        RevealSpec::new([image], RevealTrigger::Element(image))
            .start(Edge::top_at(85.0))
            .from(PropSet::new().y(100.0).scale(0.95).opacity(0.0))
            .duration(1000.0)
    }

    pub fn about_features(
        features: impl IntoIterator<Item = ElementId>,
        list: ElementId,
    ) -> RevealSpec {
        RevealSpec::new(features, RevealTrigger::Element(list))
            .from(PropSet::new().y(50.0).opacity(0.0))
            .duration(600.0)
            .stagger(Stagger::new(150.0))
    }

    pub fn stats(items: impl IntoIterator<Item = ElementId>, row: ElementId) -> RevealSpec {
        RevealSpec::new(items, RevealTrigger::Element(row))
            .start(Edge::top_at(85.0))
            .from(PropSet::new().y(40.0).opacity(0.0))
            .duration(600.0)
            .stagger(Stagger::new(100.0))
    }

    /// Count `element` up from 0 to `value`
    pub fn counter(element: ElementId, value: u32) -> RevealSpec {
        RevealSpec::new([element], RevealTrigger::EachTarget)
            .start(Edge::top_at(85.0))
            .duration(2000.0)
            .easing(Easing::Power2Out)
            .counter(value)
    }

    /// Each card triggers itself; later cards wait 80 ms more per index
    pub fn service_cards(cards: impl IntoIterator<Item = ElementId>) -> RevealSpec {
        RevealSpec::new(cards, RevealTrigger::EachTarget)
            .start(Edge::top_at(90.0))
            .from(PropSet::new().y(80.0).opacity(0.0).rotate_x(10.0))
            .duration(600.0)
            .stagger(Stagger::new(80.0))
    }

    pub fn contact_cards(
        cards: impl IntoIterator<Item = ElementId>,
        container: ElementId,
    ) -> RevealSpec {
        RevealSpec::new(cards, RevealTrigger::Element(container))
            .start(Edge::top_at(85.0))
            .from(PropSet::new().y(50.0).opacity(0.0))
            .duration(600.0)
            .stagger(Stagger::new(150.0))
    }

    pub fn contact_form(form: ElementId) -> RevealSpec {
        RevealSpec::new([form], RevealTrigger::Element(form))
            .start(Edge::top_at(85.0))
            .from(PropSet::new().y(60.0).opacity(0.0))
            .duration(800.0)
    }

    /// Form fields slide in from the left
    pub fn form_fields(fields: impl IntoIterator<Item = ElementId>, form: ElementId) -> RevealSpec {
        RevealSpec::new(fields, RevealTrigger::Element(form))
            .from(PropSet::new().x(-30.0).opacity(0.0))
            .duration(500.0)
            .stagger(Stagger::new(100.0))
    }

    pub fn filter_buttons(
        buttons: impl IntoIterator<Item = ElementId>,
        container: ElementId,
    ) -> RevealSpec {
        RevealSpec::new(buttons, RevealTrigger::Element(container))
            .start(Edge::top_at(85.0))
            .from(PropSet::new().y(30.0).opacity(0.0))
            .duration(500.0)
            .stagger(Stagger::new(100.0))
    }

    /// Project grid; replays whenever the visible cards change
    pub fn project_cards(cards: impl IntoIterator<Item = ElementId>) -> RevealSpec {
        RevealSpec::new(cards, RevealTrigger::Immediate)
            .from(PropSet::new().y(40.0).opacity(0.0).scale(0.95))
            .duration(500.0)
            .stagger(Stagger::new(80.0))
            .easing(Easing::Power2Out)
    }

    /// Gallery page heading
    pub fn detail_header(header: ElementId) -> RevealSpec {
        RevealSpec::new([header], RevealTrigger::Immediate)
            .from(PropSet::new().y(60.0).opacity(0.0))
            .duration(800.0)
            .delay(200.0)
            .easing(Easing::Power3Out)
    }

    pub fn detail_images(images: impl IntoIterator<Item = ElementId>) -> RevealSpec {
        RevealSpec::new(images, RevealTrigger::Immediate)
            .from(PropSet::new().y(60.0).opacity(0.0).scale(0.95))
            .duration(600.0)
            .delay(400.0)
            .stagger(Stagger::new(100.0))
            .easing(Easing::Power3Out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use vitrine_core::Rect;

    fn stacked(host: &Host, prefix: &str, count: usize, top: f32) -> Vec<ElementId> {
        (0..count)
            .map(|i| {
                host.layout().insert(
                    format!("{prefix}.{i}"),
                    Rect::new(0.0, top + i as f32 * 100.0, 400.0, 80.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_targets_hidden_until_trigger() {
        let host = Host::desktop();
        let list = host.layout().insert("features", Rect::new(0.0, 2000.0, 800.0, 600.0));
        let items = stacked(&host, "feature", 3, 2000.0);
        let mut reveals = RevealCoordinator::mount(&host.context());
        let id = reveals.register(presets::about_features(items.clone(), list));

        host.run_for(2000.0, 16.0);
        for &item in &items {
            let state = host.scheduler().state_of(item);
            assert_eq!(state.opacity, 0.0);
            assert_eq!(state.y, 50.0);
        }
        assert!(!reveals.is_played(id));

        // top 80% of 900: 2000 - 720
        host.scroll_to(1280.0);
        assert!(reveals.is_played(id));
        host.run_for(1000.0, 16.0);
        for &item in &items {
            assert_eq!(host.scheduler().state_of(item).opacity, 1.0);
            assert_eq!(host.scheduler().state_of(item).y, 0.0);
        }
    }

    #[test]
    fn test_stagger_orders_targets() {
        let host = Host::desktop();
        let list = host.layout().insert("features", Rect::new(0.0, 0.0, 800.0, 600.0));
        let items = stacked(&host, "feature", 3, 0.0);
        let mut reveals = RevealCoordinator::mount(&host.context());
        reveals.register(presets::about_features(items.clone(), list));

        host.advance(200.0);
        let first = host.scheduler().state_of(items[0]).opacity;
        let second = host.scheduler().state_of(items[1]).opacity;
        let third = host.scheduler().state_of(items[2]).opacity;
        assert!(first > second);
        assert!(second > 0.0);
        assert_eq!(third, 0.0);
    }

    #[test]
    fn test_plays_once_per_mount() {
        let host = Host::desktop();
        let section = host.layout().insert("about", Rect::new(0.0, 2000.0, 1440.0, 900.0));
        let title = host.layout().insert("title", Rect::new(0.0, 2050.0, 800.0, 80.0));
        let mut reveals = RevealCoordinator::mount(&host.context());
        reveals.register(presets::section_title(title, section));

        host.scroll_to(1500.0);
        host.run_for(1000.0, 16.0);
        host.scroll_to(0.0);
        host.run_for(1000.0, 16.0);
        assert_eq!(host.scheduler().state_of(title).opacity, 1.0);

        host.scroll_to(1500.0);
        host.advance(16.0);
        assert_eq!(host.scheduler().state_of(title).opacity, 1.0);
        assert_eq!(host.counts().running_tweens, 0);
    }

    #[test]
    fn test_counter_snaps_to_integers() {
        let host = Host::desktop();
        let stat = host.layout().insert("stat", Rect::new(0.0, 100.0, 200.0, 60.0));
        let mut reveals = RevealCoordinator::mount(&host.context());
        reveals.register(presets::counter(stat, 150));

        let mut last = 0;
        for _ in 0..150 {
            host.advance(16.0);
            let raw = host.scheduler().state_of(stat).value;
            assert_eq!(raw.fract(), 0.0, "fractional counter value {raw}");
            let shown = reveals.counter_value(stat);
            assert!(shown >= last);
            last = shown;
        }
        assert_eq!(reveals.counter_value(stat), 150);
    }

    #[test]
    fn test_each_target_triggers_independently() {
        let host = Host::desktop();
        let near = host.layout().insert("card.0", Rect::new(0.0, 500.0, 400.0, 300.0));
        let far = host.layout().insert("card.1", Rect::new(0.0, 3000.0, 400.0, 300.0));
        let mut reveals = RevealCoordinator::mount(&host.context());
        let id = reveals.register(presets::service_cards([near, far]));

        host.run_for(1000.0, 16.0);
        assert_eq!(host.scheduler().state_of(near).opacity, 1.0);
        assert_eq!(host.scheduler().state_of(far).opacity, 0.0);
        assert_eq!(host.scheduler().state_of(far).rotate_x, 10.0);
        assert!(!reveals.is_played(id));
    }

    #[test]
    fn test_replace_targets_reanimates_new_set() {
        let host = Host::desktop();
        let first = stacked(&host, "card", 4, 0.0);
        let second = stacked(&host, "other", 2, 0.0);
        let mut reveals = RevealCoordinator::mount(&host.context());
        let id = reveals.register(presets::project_cards(first.clone()));
        host.run_for(1000.0, 16.0);
        assert_eq!(host.scheduler().state_of(first[3]).opacity, 1.0);

        assert!(reveals.replace_targets(id, second.clone()));
        assert_eq!(reveals.targets(id).as_slice(), second.as_slice());
        assert_eq!(host.scheduler().state_of(second[0]).opacity, 0.0);
        assert_eq!(host.scheduler().tween_count(), 2);

        host.run_for(1000.0, 16.0);
        assert_eq!(host.scheduler().state_of(second[1]).opacity, 1.0);
        assert_eq!(host.scheduler().state_of(second[1]).scale, 1.0);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let host = Host::desktop();
        let section = host.layout().insert("about", Rect::new(0.0, 2000.0, 1440.0, 900.0));
        let title = host.layout().insert("title", Rect::new(0.0, 2050.0, 800.0, 80.0));
        let mut reveals = RevealCoordinator::mount(&host.context());
        reveals.register(presets::section_title(title, section));
        assert_eq!(reveals.len(), 1);

        reveals.unmount();
        reveals.unmount();
        assert!(reveals.is_empty());
        assert!(host.counts().is_idle(), "{:?}", host.counts());
    }
}
