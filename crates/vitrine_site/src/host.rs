//! Page host
//!
//! The host stands in for the browser: it owns the virtual clock, the timer
//! queue, the animation scheduler, the element layout, and one broadcast
//! channel per global event source. Controllers mount against a
//! [`HostContext`], a cheap clonable view of all of that, and never hold the
//! host itself.
//!
//! A frame is [`Host::advance`]: due timers fire first, then the scheduler
//! steps every tween, then one [`FrameTick`] is published.

use std::cell::Cell;
use std::rc::Rc;

use vitrine_animation::{AnimationScheduler, SchedulerHandle};
use vitrine_core::{
    Broadcast, Capabilities, InputEvent, Layout, PointerEvent, TimerQueue, TouchEvent, Viewport,
};

use crate::config::SiteConfig;

/// Published once per animation frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub now_ms: f64,
    pub dt_ms: f32,
}

/// Everything a controller needs from the page
#[derive(Clone)]
pub struct HostContext {
    timers: TimerQueue,
    animations: SchedulerHandle,
    layout: Layout,
    viewport: Rc<Cell<Viewport>>,
    capabilities: Capabilities,
    config: Rc<SiteConfig>,
    pointer: Broadcast<PointerEvent>,
    touch: Broadcast<TouchEvent>,
    scroll: Broadcast<Viewport>,
    resize: Broadcast<Viewport>,
    frames: Broadcast<FrameTick>,
}

impl HostContext {
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn animations(&self) -> &SchedulerHandle {
        &self.animations
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Current viewport, including scroll offset
    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.timers.now()
    }

    /// Pointer moves in window coordinates
    pub fn pointer(&self) -> &Broadcast<PointerEvent> {
        &self.pointer
    }

    pub fn touch(&self) -> &Broadcast<TouchEvent> {
        &self.touch
    }

    /// Viewport after each scroll
    pub fn scroll(&self) -> &Broadcast<Viewport> {
        &self.scroll
    }

    /// Viewport after each resize
    pub fn resize(&self) -> &Broadcast<Viewport> {
        &self.resize
    }

    pub fn frames(&self) -> &Broadcast<FrameTick> {
        &self.frames
    }

    /// Scroll the document from page code, as `window.scrollTo` does
    pub fn scroll_to(&self, y: f32) {
        let mut vp = self.viewport.get();
        vp.scroll_y = y.max(0.0);
        self.viewport.set(vp);
        self.scroll.publish(&vp);
    }
}

/// Snapshot of live resources, for teardown checks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub pending_timers: usize,
    pub listeners: usize,
    pub frame_callbacks: usize,
    pub tweens: usize,
    pub running_tweens: usize,
}

impl ResourceCounts {
    pub fn is_idle(&self) -> bool {
        *self == ResourceCounts::default()
    }
}

/// Headless page host
pub struct Host {
    ctx: HostContext,
    scheduler: AnimationScheduler,
}

impl Host {
    pub fn new(config: SiteConfig, viewport: Viewport, capabilities: Capabilities) -> Self {
        let scheduler = AnimationScheduler::new();
        let ctx = HostContext {
            timers: TimerQueue::new(),
            animations: scheduler.handle(),
            layout: Layout::new(),
            viewport: Rc::new(Cell::new(viewport)),
            capabilities,
            config: Rc::new(config),
            pointer: Broadcast::new(),
            touch: Broadcast::new(),
            scroll: Broadcast::new(),
            resize: Broadcast::new(),
            frames: Broadcast::new(),
        };
        Self { ctx, scheduler }
    }

    /// Default config, 1440x900 viewport, desktop pointer
    pub fn desktop() -> Self {
        Self::new(
            SiteConfig::default(),
            Viewport::default(),
            Capabilities::desktop(),
        )
    }

    pub fn context(&self) -> HostContext {
        self.ctx.clone()
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn layout(&self) -> &Layout {
        &self.ctx.layout
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.ctx.timers
    }

    pub fn viewport(&self) -> Viewport {
        self.ctx.viewport()
    }

    pub fn now(&self) -> f64 {
        self.ctx.now()
    }

    /// Update shared state for an input event and fan it out
    pub fn dispatch(&self, event: InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => self.ctx.pointer.publish(&pointer),
            InputEvent::Touch(touch) => self.ctx.touch.publish(&touch),
            InputEvent::Scroll { y } => self.ctx.scroll_to(y),
            InputEvent::Resize { width, height } => {
                let mut vp = self.ctx.viewport.get();
                vp.width = width;
                vp.height = height;
                self.ctx.viewport.set(vp);
                tracing::debug!(width, height, "viewport resized");
                self.ctx.resize.publish(&vp);
            }
        }
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        self.dispatch(InputEvent::Pointer(PointerEvent::Moved { x, y }));
    }

    pub fn scroll_to(&self, y: f32) {
        self.dispatch(InputEvent::Scroll { y });
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.dispatch(InputEvent::Resize { width, height });
    }

    /// Run one frame of `dt_ms`
    pub fn advance(&self, dt_ms: f64) {
        let dt_ms = dt_ms.max(0.0);
        let now_ms = self.ctx.timers.now() + dt_ms;
        self.ctx.timers.advance_to(now_ms);
        self.scheduler.tick(dt_ms as f32);
        self.ctx.frames.publish(&FrameTick {
            now_ms,
            dt_ms: dt_ms as f32,
        });
    }

    /// Run frames of `step_ms` until `total_ms` has elapsed
    pub fn run_for(&self, total_ms: f64, step_ms: f64) {
        let step_ms = step_ms.max(1.0);
        let mut elapsed = 0.0;
        while elapsed < total_ms {
            let dt = step_ms.min(total_ms - elapsed);
            self.advance(dt);
            elapsed += dt;
        }
    }

    pub fn counts(&self) -> ResourceCounts {
        let ctx = &self.ctx;
        ResourceCounts {
            pending_timers: ctx.timers.pending(),
            listeners: ctx.pointer.listener_count()
                + ctx.touch.listener_count()
                + ctx.scroll.listener_count()
                + ctx.resize.listener_count(),
            frame_callbacks: ctx.frames.listener_count(),
            tweens: self.scheduler.tween_count(),
            running_tweens: self.scheduler.running_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_updates_viewport() {
        let host = Host::desktop();
        let seen = Rc::new(Cell::new(0.0));
        let seen_in = seen.clone();
        let _sub = host.context().scroll().subscribe(move |vp| seen_in.set(vp.scroll_y));

        host.scroll_to(420.0);
        assert_eq!(seen.get(), 420.0);
        assert_eq!(host.viewport().scroll_y, 420.0);

        host.resize(800.0, 600.0);
        assert_eq!(host.viewport().width, 800.0);
        assert_eq!(host.viewport().scroll_y, 420.0);
    }

    #[test]
    fn test_advance_fires_timers_then_frames() {
        let host = Host::desktop();
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));

        let o = order.clone();
        host.timers().set_timeout(10.0, move || o.borrow_mut().push("timer"));
        let o = order.clone();
        let _frames = host.context().frames().subscribe(move |_| o.borrow_mut().push("frame"));

        host.advance(16.0);
        assert_eq!(*order.borrow(), vec!["timer", "frame"]);
        assert_eq!(host.now(), 16.0);
    }

    #[test]
    fn test_run_for_covers_total() {
        let host = Host::desktop();
        host.run_for(1000.0, 16.0);
        assert_eq!(host.now(), 1000.0);
        assert!(host.counts().is_idle());
    }
}
