//! Shader background
//!
//! A full-bleed gold gradient rendered behind one section on desktop-width
//! viewports. The scene (surface, quad, material, and the per-frame, pointer,
//! and scroll listeners) exists only while the viewport is at least
//! `desktop_breakpoint_px` wide; crossing the breakpoint builds or disposes it.
//!
//! Each frame the smoothed pointer approaches the latest raw sample by
//! `pointer_smoothing`, the reveal progress is read from the scheduler, and
//! one frame is drawn. Reveal progress plays 0 to 1 when the section enters
//! and reverses when it scrolls back out above the start.
//!
//! If the backend refuses to build the scene, the background degrades to
//! nothing for the rest of the mount.

mod backend;
mod gradient;

pub use backend::{
    BackendCounts, FailPoint, GeometryId, HeadlessBackend, MaterialId, RenderBackend, SurfaceId,
};
pub use gradient::{GradientShader, GradientUniforms};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::{debug, warn};
use vitrine_animation::{
    AnimatedTween, Easing, Edge, Interpolate, PropSet, Purpose, ScrollRange, ScrollTrigger,
    TargetKey, ToggleAction, ToggleActions, Tween,
};
use vitrine_core::{Color, ElementId, Point, PointerEvent, Subscription, Viewport};

use crate::error::{Result, SiteError};
use crate::host::HostContext;

/// Reveal starts when the section top passes this far down the viewport
const REVEAL_START_PERCENT: f32 = 80.0;

struct Scene {
    surface: SurfaceId,
    geometry: GeometryId,
    material: MaterialId,
    uniforms: GradientUniforms,
    raw_mouse: Point,
    trigger: ScrollTrigger,
    reveal: AnimatedTween,
    subscriptions: SmallVec<[Subscription; 3]>,
}

struct ShaderInner {
    this: Weak<RefCell<ShaderInner>>,
    ctx: HostContext,
    section: ElementId,
    backend: Rc<RefCell<dyn RenderBackend>>,
    shader: GradientShader,
    scene: Option<Scene>,
    degraded: bool,
}

impl ShaderInner {
    fn on_resize(&mut self, viewport: Viewport) {
        let wanted = viewport.is_at_least(self.ctx.config().desktop_breakpoint_px);
        match (wanted, self.scene.is_some()) {
            (true, false) if !self.degraded => self.build(viewport),
            (true, true) => {
                if let Err(err) = self.resize_scene(viewport) {
                    self.degrade(err);
                    return;
                }
                self.update_trigger(viewport);
            }
            (false, true) => {
                debug!(width = viewport.width, "below desktop breakpoint, disposing shader scene");
                self.dispose();
            }
            _ => {}
        }
    }

    fn build(&mut self, viewport: Viewport) {
        match self.create_scene(viewport) {
            Ok(scene) => {
                debug!(width = viewport.width, height = viewport.height, "shader scene built");
                self.scene = Some(scene);
                self.update_trigger(viewport);
            }
            Err(err) => {
                warn!(error = %err, "shader background unavailable, continuing without it");
                self.degraded = true;
            }
        }
    }

    fn create_scene(&self, viewport: Viewport) -> Result<Scene> {
        let size = viewport.size();
        let uniforms = GradientUniforms::new(size);

        let (surface, geometry, material) = {
            let mut backend = self.backend.borrow_mut();
            let surface = backend.create_surface(size)?;
            let geometry = match backend.create_geometry() {
                Ok(geometry) => geometry,
                Err(err) => {
                    backend.release_surface(surface);
                    return Err(err);
                }
            };
            let material = match backend.create_material(&uniforms) {
                Ok(material) => material,
                Err(err) => {
                    backend.release_geometry(geometry);
                    backend.release_surface(surface);
                    return Err(err);
                }
            };
            (surface, geometry, material)
        };

        let reveal = self.ctx.animations().animate(
            TargetKey::new(self.section, Purpose::ShaderReveal),
            Tween::from_to(
                PropSet::new().value(0.0),
                PropSet::new().value(1.0),
                self.ctx.config().reveal_duration_ms,
            )
            .easing(Easing::Power2Out)
            .paused(),
        );

        let mut subscriptions = SmallVec::new();
        let weak = self.this.clone();
        subscriptions.push(self.ctx.frames().subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().render();
            }
        }));
        let weak = self.this.clone();
        subscriptions.push(self.ctx.pointer().subscribe(move |event| {
            if let (Some(inner), PointerEvent::Moved { x, y }) = (weak.upgrade(), event) {
                inner.borrow_mut().on_pointer(Point::new(*x, *y));
            }
        }));
        let weak = self.this.clone();
        subscriptions.push(self.ctx.scroll().subscribe(move |viewport| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().update_trigger(*viewport);
            }
        }));

        Ok(Scene {
            surface,
            geometry,
            material,
            uniforms,
            raw_mouse: uniforms.mouse,
            trigger: ScrollTrigger::new(ScrollRange::from_start(Edge::top_at(
                REVEAL_START_PERCENT,
            ))),
            reveal,
            subscriptions,
        })
    }

    /// Resize the surface and the resolution uniform together
    fn resize_scene(&mut self, viewport: Viewport) -> Result<()> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };
        let size = viewport.size();
        if scene.uniforms.resolution == size {
            return Ok(());
        }
        self.backend.borrow_mut().resize(scene.surface, size)?;
        scene.uniforms.resolution = size;
        Ok(())
    }

    fn on_pointer(&mut self, client: Point) {
        let viewport = self.ctx.viewport();
        if let Some(scene) = self.scene.as_mut() {
            let n = viewport.normalize(client);
            scene.raw_mouse = Point::new(n.x, 1.0 - n.y);
        }
    }

    fn update_trigger(&mut self, viewport: Viewport) {
        let Some(rect) = self.ctx.layout().rect(self.section) else {
            return;
        };
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        for event in scene.trigger.update(rect, &viewport) {
            match ToggleActions::PLAY_REVERSE.action_for(event) {
                ToggleAction::Play => scene.reveal.play(),
                ToggleAction::Reverse => scene.reveal.reverse(),
                ToggleAction::Restart => scene.reveal.restart(),
                ToggleAction::Complete => scene.reveal.complete(),
                ToggleAction::None => {}
            }
        }
    }

    fn render(&mut self) {
        let smoothing = self.ctx.config().pointer_smoothing;
        let progress = self
            .ctx
            .animations()
            .state_of(self.section)
            .map(|state| state.value)
            .unwrap_or(0.0);
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        scene.uniforms.mouse = scene.uniforms.mouse.lerp(&scene.raw_mouse, smoothing);
        scene.uniforms.progress = progress;

        let drawn = self.backend.borrow_mut().draw(
            scene.surface,
            scene.geometry,
            scene.material,
            &scene.uniforms,
        );
        if let Err(err) = drawn {
            self.degrade(err);
        }
    }

    fn degrade(&mut self, err: SiteError) {
        warn!(error = %err, "shader background failed, disposing");
        self.dispose();
        self.degraded = true;
    }

    fn dispose(&mut self) {
        let Some(scene) = self.scene.take() else {
            return;
        };
        let Scene {
            surface,
            geometry,
            material,
            reveal,
            subscriptions,
            ..
        } = scene;
        drop(subscriptions);
        drop(reveal);

        let mut backend = self.backend.borrow_mut();
        backend.release_material(material);
        backend.release_geometry(geometry);
        backend.release_surface(surface);
    }
}

/// Breakpoint-gated gradient background for one section
pub struct ShaderBackground {
    inner: Rc<RefCell<ShaderInner>>,
    resize: Option<Subscription>,
}

impl ShaderBackground {
    pub fn mount(
        ctx: &HostContext,
        section: ElementId,
        backend: Rc<RefCell<dyn RenderBackend>>,
    ) -> Self {
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(ShaderInner {
                this: this.clone(),
                ctx: ctx.clone(),
                section,
                backend,
                shader: GradientShader::default(),
                scene: None,
                degraded: false,
            })
        });
        inner.borrow_mut().on_resize(ctx.viewport());

        let weak = Rc::downgrade(&inner);
        let resize = ctx.resize().subscribe(move |viewport| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_resize(*viewport);
            }
        });

        Self {
            inner,
            resize: Some(resize),
        }
    }

    /// Whether the scene currently exists
    pub fn is_active(&self) -> bool {
        self.inner.borrow().scene.is_some()
    }

    /// Whether construction or drawing failed during this mount
    pub fn is_degraded(&self) -> bool {
        self.inner.borrow().degraded
    }

    /// Uniforms of the last rendered frame
    pub fn uniforms(&self) -> Option<GradientUniforms> {
        self.inner.borrow().scene.as_ref().map(|scene| scene.uniforms)
    }

    pub fn shader(&self) -> GradientShader {
        self.inner.borrow().shader
    }

    /// Shade one fragment with the current uniforms
    pub fn sample(&self, uv: Point) -> Option<Color> {
        let inner = self.inner.borrow();
        let scene = inner.scene.as_ref()?;
        Some(inner.shader.shade(uv, &scene.uniforms))
    }

    pub fn is_mounted(&self) -> bool {
        self.resize.is_some()
    }

    pub fn unmount(&mut self) {
        if self.resize.take().is_none() {
            return;
        }
        self.inner.borrow_mut().dispose();
    }
}

impl Drop for ShaderBackground {
    fn drop(&mut self) {
        self.unmount();
    }
}
