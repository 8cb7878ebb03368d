//! Fixed navigation bar
//!
//! The bar slides down on load, then the logo and the section links follow.
//! Past [`SCROLLED_AFTER_PX`] of scroll the bar switches to its compact,
//! shadowed style. Links scroll smoothly to their section and close the
//! mobile menu on the way.
//!
//! Smooth scrolling runs a tween on the `value` channel of a proxy element
//! and copies it into the document scroll once per frame. The frame
//! subscription only exists while a scroll is in flight.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::{debug, trace};
use vitrine_animation::{AnimatedTween, Easing, PropSet, Purpose, Stagger, TargetKey, Tween};
use vitrine_core::{ElementId, ElementKind, Layout, Rect, Subscription, Viewport};

use crate::host::HostContext;

/// Scroll offset the bar must exceed to switch to its compact style
pub const SCROLLED_AFTER_PX: f32 = 50.0;

/// Link labels and the section anchors they point at
pub const LINKS: [(&str, &str); 5] = [
    ("Home", "home"),
    ("About", "about"),
    ("Services", "services"),
    ("Projects", "projects"),
    ("Contact", "contact"),
];

const BAR_HEIGHT: f32 = 88.0;
const STYLE_MS: f32 = 500.0;
const MENU_MS: f32 = 500.0;
const MENU_HIDDEN_Y: f32 = -16.0;
const SMOOTH_SCROLL_MS: f32 = 800.0;

#[derive(Clone, Debug)]
pub struct NavbarElements {
    pub bar: ElementId,
    pub logo: ElementId,
    pub links: SmallVec<[ElementId; 5]>,
    pub menu_button: ElementId,
    pub mobile_menu: ElementId,
    /// Carries the smooth-scroll position in its `value` channel
    pub scroll_proxy: ElementId,
}

impl NavbarElements {
    pub fn create(layout: &Layout, width: f32) -> Self {
        let links_left = (width - 720.0).max(240.0);
        Self {
            bar: layout.insert("nav", Rect::new(0.0, 0.0, width, BAR_HEIGHT)),
            logo: layout.insert_kind("nav.logo", ElementKind::Link, Rect::new(48.0, 16.0, 180.0, 56.0)),
            links: LINKS
                .iter()
                .enumerate()
                .map(|(i, (_, anchor))| {
                    layout.insert_kind(
                        format!("nav.link.{anchor}"),
                        ElementKind::Link,
                        Rect::new(links_left + i as f32 * 110.0, 30.0, 96.0, 28.0),
                    )
                })
                .collect(),
            menu_button: layout.insert_kind(
                "nav.menu_button",
                ElementKind::Button,
                Rect::new(width - 64.0, 24.0, 40.0, 40.0),
            ),
            mobile_menu: layout.insert("nav.mobile_menu", Rect::new(0.0, BAR_HEIGHT, width, 420.0)),
            scroll_proxy: layout.insert("nav.scroll", Rect::default()),
        }
    }
}

struct SmoothScroll {
    target: f32,
    tween: AnimatedTween,
    _frames: Subscription,
}

struct NavInner {
    ctx: HostContext,
    elements: NavbarElements,
    anchors: SmallVec<[(String, ElementId); 5]>,
    this: Weak<RefCell<NavInner>>,
    scrolled: bool,
    menu_open: bool,
    entrance: Vec<AnimatedTween>,
    style: Option<AnimatedTween>,
    menu: Option<AnimatedTween>,
    smooth: Option<SmoothScroll>,
}

impl NavInner {
    fn play_entrance(&mut self) {
        let handle = self.ctx.animations().clone();
        let entrance = |el: ElementId, from: PropSet, ms: f32, delay: f32, easing: Easing| {
            let to = from.resting();
            handle.animate(
                TargetKey::new(el, Purpose::Entrance),
                Tween::from_to(from, to, ms).delay(delay).easing(easing),
            )
        };

        let e = &self.elements;
        self.entrance.push(entrance(
            e.bar,
            PropSet::new().y(-100.0).opacity(0.0),
            1000.0,
            500.0,
            Easing::Power3Out,
        ));
        self.entrance.push(entrance(
            e.logo,
            PropSet::new().x(-30.0).opacity(0.0),
            800.0,
            800.0,
            Easing::Power2Out,
        ));
        let stagger = Stagger::new(100.0);
        for (i, &link) in e.links.iter().enumerate() {
            self.entrance.push(entrance(
                link,
                PropSet::new().y(-20.0).opacity(0.0),
                500.0,
                1000.0 + stagger.delay_for_index(i, e.links.len()),
                Easing::Power2Out,
            ));
        }
    }

    fn on_scroll(&mut self, viewport: &Viewport) {
        let scrolled = viewport.scroll_y > SCROLLED_AFTER_PX;
        if scrolled == self.scrolled {
            return;
        }
        self.scrolled = scrolled;
        trace!(scrolled, scroll_y = viewport.scroll_y, "navbar style changed");
        let shadow = if scrolled { 1.0 } else { 0.0 };
        self.style = Some(self.ctx.animations().animate(
            TargetKey::new(self.elements.bar, Purpose::Visibility),
            Tween::to(PropSet::new().border_alpha(shadow), STYLE_MS).easing(Easing::Power2Out),
        ));
    }

    fn set_menu(&mut self, open: bool) {
        if open == self.menu_open {
            return;
        }
        self.menu_open = open;
        let to = if open {
            PropSet::new().opacity(1.0).y(0.0)
        } else {
            PropSet::new().opacity(0.0).y(MENU_HIDDEN_Y)
        };
        self.menu = Some(self.ctx.animations().animate(
            TargetKey::new(self.elements.mobile_menu, Purpose::Visibility),
            Tween::to(to, MENU_MS).easing(Easing::Power2Out),
        ));
        debug!(open, "mobile menu toggled");
    }

    fn scroll_to_anchor(&mut self, anchor: &str) -> Option<f32> {
        let anchor = anchor.trim_start_matches('#');
        let element = self
            .anchors
            .iter()
            .find(|(name, _)| name == anchor)
            .map(|&(_, element)| element)?;
        let target = self.ctx.layout().rect(element)?.y.max(0.0);

        // The old scroll dies before the new one registers
        self.smooth = None;
        let from = self.ctx.viewport().scroll_y;
        let tween = self.ctx.animations().animate(
            TargetKey::new(self.elements.scroll_proxy, Purpose::Scrub),
            Tween::from_to(
                PropSet::new().value(from),
                PropSet::new().value(target),
                SMOOTH_SCROLL_MS,
            )
            .easing(Easing::Power2InOut),
        );

        let weak = self.this.clone();
        let ctx = self.ctx.clone();
        let frames = self.ctx.frames().subscribe(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let next = inner.borrow_mut().step_scroll();
            if let Some(y) = next {
                ctx.scroll_to(y);
            }
        });
        self.smooth = Some(SmoothScroll {
            target,
            tween,
            _frames: frames,
        });
        self.set_menu(false);
        debug!(anchor, from, target, "smooth scroll started");
        Some(target)
    }

    /// Next scroll position; ends the scroll once its tween is done
    fn step_scroll(&mut self) -> Option<f32> {
        let smooth = self.smooth.as_ref()?;
        if !smooth.tween.is_playing() {
            let target = smooth.target;
            self.smooth = None;
            return Some(target);
        }
        self.ctx
            .animations()
            .state_of(self.elements.scroll_proxy)
            .map(|state| state.value)
    }

    fn teardown(&mut self) {
        self.entrance.clear();
        self.style = None;
        self.menu = None;
        self.smooth = None;
    }
}

/// Navigation bar controller
pub struct Navbar {
    inner: Rc<RefCell<NavInner>>,
    subscriptions: SmallVec<[Subscription; 1]>,
}

impl Navbar {
    /// Play the entrance and start tracking scroll
    ///
    /// `anchors` maps link targets (without `#`) to the elements they scroll
    /// to.
    pub fn mount<'a>(
        ctx: &HostContext,
        elements: NavbarElements,
        anchors: impl IntoIterator<Item = (&'a str, ElementId)>,
    ) -> Self {
        ctx.animations().apply(
            elements.mobile_menu,
            &PropSet::new().opacity(0.0).y(MENU_HIDDEN_Y),
        );
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(NavInner {
                ctx: ctx.clone(),
                elements,
                anchors: anchors
                    .into_iter()
                    .map(|(name, element)| (name.to_string(), element))
                    .collect(),
                this: this.clone(),
                scrolled: false,
                menu_open: false,
                entrance: Vec::new(),
                style: None,
                menu: None,
                smooth: None,
            })
        });
        {
            let mut inner = inner.borrow_mut();
            inner.play_entrance();
            inner.on_scroll(&ctx.viewport());
        }

        let weak = Rc::downgrade(&inner);
        let mut subscriptions = SmallVec::new();
        subscriptions.push(ctx.scroll().subscribe(move |viewport| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_scroll(viewport);
            }
        }));
        Self {
            inner,
            subscriptions,
        }
    }

    pub fn elements(&self) -> NavbarElements {
        self.inner.borrow().elements.clone()
    }

    /// Whether the page is scrolled past the compact threshold
    pub fn is_scrolled(&self) -> bool {
        self.inner.borrow().scrolled
    }

    pub fn is_menu_open(&self) -> bool {
        self.inner.borrow().menu_open
    }

    /// Open or close the mobile menu; returns the new state
    pub fn toggle_menu(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        let open = !inner.menu_open;
        inner.set_menu(open);
        open
    }

    pub fn close_menu(&self) {
        self.inner.borrow_mut().set_menu(false);
    }

    /// Follow a link: smooth-scroll to its section and close the menu
    ///
    /// Returns the scroll offset being approached, or `None` for an unknown
    /// anchor, in which case nothing changes.
    pub fn scroll_to_anchor(&self, anchor: &str) -> Option<f32> {
        self.inner.borrow_mut().scroll_to_anchor(anchor)
    }

    pub fn is_scrolling(&self) -> bool {
        self.inner.borrow().smooth.is_some()
    }

    pub fn unmount(&mut self) {
        self.subscriptions.clear();
        self.inner.borrow_mut().teardown();
    }
}

impl Drop for Navbar {
    fn drop(&mut self) {
        self.unmount();
    }
}
