//! Custom cursor
//!
//! A ring that trails the pointer and a dot that tracks it closely. The ring
//! grows and brightens its border while the pointer is over an interactive
//! element.
//!
//! The set of interactive elements is captured once at mount. Elements added
//! to the layout afterwards get no hover effect until the follower is
//! remounted; this matches how the site has always behaved.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::debug;
use vitrine_animation::{AnimatedTween, Easing, PropSet, Purpose, TargetKey, Tween};
use vitrine_core::{ElementId, Point, PointerEvent, Rect, Subscription};

use crate::host::HostContext;

const RING_FOLLOW_MS: f32 = 500.0;
const DOT_FOLLOW_MS: f32 = 100.0;
const HOVER_MS: f32 = 300.0;

const HOVER_SCALE: f32 = 1.5;
const HOVER_BORDER_ALPHA: f32 = 0.8;
const REST_BORDER_ALPHA: f32 = 0.5;

/// The two cursor elements
#[derive(Clone, Copy, Debug)]
pub struct CursorElements {
    pub ring: ElementId,
    pub dot: ElementId,
}

impl CursorElements {
    pub fn create(layout: &vitrine_core::Layout) -> Self {
        Self {
            ring: layout.insert("cursor.ring", Rect::new(0.0, 0.0, 40.0, 40.0)),
            dot: layout.insert("cursor.dot", Rect::new(0.0, 0.0, 8.0, 8.0)),
        }
    }
}

struct CursorInner {
    ctx: HostContext,
    elements: CursorElements,
    interactive: Vec<ElementId>,
    hovered: Option<ElementId>,
    ring_follow: Option<AnimatedTween>,
    dot_follow: Option<AnimatedTween>,
    hover: Option<AnimatedTween>,
}

impl CursorInner {
    fn on_pointer(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Moved { x, y } => {
                self.follow(x, y);
                let document = self.ctx.viewport().to_document(Point::new(x, y));
                let hit = self.hit_test(document);
                self.set_hovered(hit);
            }
            PointerEvent::Left => self.set_hovered(None),
        }
    }

    fn follow(&mut self, x: f32, y: f32) {
        let handle = self.ctx.animations();
        let target = PropSet::new().x(x).y(y);
        self.ring_follow = Some(handle.animate(
            TargetKey::new(self.elements.ring, Purpose::Follow),
            Tween::to(target.clone(), RING_FOLLOW_MS).easing(Easing::Power2Out),
        ));
        self.dot_follow = Some(handle.animate(
            TargetKey::new(self.elements.dot, Purpose::Follow),
            Tween::to(target, DOT_FOLLOW_MS),
        ));
    }

    fn hit_test(&self, point: Point) -> Option<ElementId> {
        let layout = self.ctx.layout();
        self.interactive
            .iter()
            .rev()
            .copied()
            .find(|&id| layout.hit(id, point))
    }

    fn set_hovered(&mut self, hit: Option<ElementId>) {
        if hit.is_some() == self.hovered.is_some() {
            self.hovered = hit;
            return;
        }
        self.hovered = hit;
        let (scale, alpha) = if hit.is_some() {
            (HOVER_SCALE, HOVER_BORDER_ALPHA)
        } else {
            (1.0, REST_BORDER_ALPHA)
        };
        self.hover = Some(self.ctx.animations().animate(
            TargetKey::new(self.elements.ring, Purpose::Hover),
            Tween::to(PropSet::new().scale(scale).border_alpha(alpha), HOVER_MS),
        ));
    }
}

/// Trailing ring plus tracking dot
pub struct CursorFollower {
    inner: Rc<RefCell<CursorInner>>,
    subscription: Option<Subscription>,
}

impl CursorFollower {
    /// Mount the follower, or return `None` on devices without hover
    ///
    /// Nothing is registered when `None` is returned.
    pub fn mount(ctx: &HostContext, elements: CursorElements) -> Option<Self> {
        if !ctx.capabilities().supports_hover() {
            debug!("touch-primary device, custom cursor disabled");
            return None;
        }

        let interactive = ctx.layout().interactive_elements();
        debug!(count = interactive.len(), "cursor hover targets captured");
        ctx.animations()
            .apply(elements.ring, &PropSet::new().border_alpha(REST_BORDER_ALPHA));

        let inner = Rc::new(RefCell::new(CursorInner {
            ctx: ctx.clone(),
            elements,
            interactive,
            hovered: None,
            ring_follow: None,
            dot_follow: None,
            hover: None,
        }));

        let weak = Rc::downgrade(&inner);
        let subscription = ctx.pointer().subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_pointer(event);
            }
        });

        Some(Self {
            inner,
            subscription: Some(subscription),
        })
    }

    pub fn elements(&self) -> CursorElements {
        self.inner.borrow().elements
    }

    /// Interactive element under the pointer, if any
    pub fn hovered(&self) -> Option<ElementId> {
        self.inner.borrow().hovered
    }

    /// Elements captured as hover targets at mount
    pub fn hover_targets(&self) -> SmallVec<[ElementId; 16]> {
        self.inner.borrow().interactive.iter().copied().collect()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn unmount(&mut self) {
        if self.subscription.take().is_none() {
            return;
        }
        let mut inner = self.inner.borrow_mut();
        inner.ring_follow = None;
        inner.dot_follow = None;
        inner.hover = None;
        inner.hovered = None;
    }
}

impl Drop for CursorFollower {
    fn drop(&mut self) {
        self.unmount();
    }
}
