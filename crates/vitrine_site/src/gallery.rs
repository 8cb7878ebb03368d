//! Image lightbox for the gallery pages
//!
//! Opening fades the overlay in and scales the frame up; each image change
//! pops the new image in; closing fades the overlay out and only then reports
//! the lightbox as closed. Navigation wraps in both directions.

use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;

use smallvec::SmallVec;
use tracing::debug;
use vitrine_animation::{AnimatedTween, Easing, PropSet, Purpose, TargetKey, Tween};
use vitrine_core::{ElementId, Layout, Rect, TimerId};

use crate::error::SiteError;
use crate::host::HostContext;

const OVERLAY_IN_MS: f32 = 300.0;
const FRAME_IN_MS: f32 = 400.0;
const FRAME_IN_DELAY_MS: f32 = 100.0;
const IMAGE_SWAP_MS: f32 = 300.0;
const OVERLAY_OUT_MS: f32 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    Next,
    Previous,
}

impl FromStr for GalleryKey {
    type Err = SiteError;

    /// DOM key names: `Escape`, `ArrowRight`, `ArrowLeft`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Escape" | "Esc" => Ok(GalleryKey::Escape),
            "ArrowRight" | "Right" => Ok(GalleryKey::Next),
            "ArrowLeft" | "Left" => Ok(GalleryKey::Previous),
            other => Err(SiteError::UnknownKey(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryPhase {
    Closed,
    Open,
    /// Overlay fading out
    Closing,
}

#[derive(Clone, Copy, Debug)]
pub struct GalleryElements {
    pub overlay: ElementId,
    pub frame: ElementId,
    pub image: ElementId,
}

impl GalleryElements {
    pub fn create(layout: &Layout, width: f32, height: f32) -> Self {
        Self {
            overlay: layout.insert("gallery.overlay", Rect::new(0.0, 0.0, width, height)),
            frame: layout.insert("gallery.frame", Rect::new(0.0, 0.0, width, height)),
            image: layout.insert("gallery.image", Rect::new(0.0, 0.0, width, height)),
        }
    }
}

/// Lightbox over `len` images
pub struct Gallery {
    ctx: HostContext,
    elements: GalleryElements,
    len: usize,
    index: usize,
    phase: Rc<Cell<GalleryPhase>>,
    close_timer: Option<TimerId>,
    tweens: SmallVec<[AnimatedTween; 3]>,
}

impl Gallery {
    pub fn new(ctx: &HostContext, elements: GalleryElements, len: usize) -> Self {
        Self {
            ctx: ctx.clone(),
            elements,
            len,
            index: 0,
            phase: Rc::new(Cell::new(GalleryPhase::Closed)),
            close_timer: None,
            tweens: SmallVec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> GalleryPhase {
        self.phase.get()
    }

    pub fn is_open(&self) -> bool {
        self.phase.get() == GalleryPhase::Open
    }

    /// Open on image `index`; false when there is nothing to show
    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.cancel_close();
        self.index = index;
        self.phase.set(GalleryPhase::Open);
        debug!(index, len = self.len, "gallery opened");

        let handle = self.ctx.animations();
        self.tweens.clear();
        self.tweens.push(handle.animate(
            TargetKey::new(self.elements.overlay, Purpose::Visibility),
            Tween::from_to(
                PropSet::new().opacity(0.0),
                PropSet::new().opacity(1.0),
                OVERLAY_IN_MS,
            )
            .easing(Easing::Power2Out),
        ));
        self.tweens.push(handle.animate(
            TargetKey::new(self.elements.frame, Purpose::Entrance),
            Tween::from_to(
                PropSet::new().scale(0.9).opacity(0.0),
                PropSet::new().scale(1.0).opacity(1.0),
                FRAME_IN_MS,
            )
            .delay(FRAME_IN_DELAY_MS)
            .easing(Easing::Power3Out),
        ));
        self.swap_image();
        true
    }

    /// Fade out; the phase becomes `Closed` when the fade ends
    pub fn close(&mut self) {
        if self.phase.get() != GalleryPhase::Open {
            return;
        }
        self.phase.set(GalleryPhase::Closing);
        let overlay = self.ctx.animations().animate(
            TargetKey::new(self.elements.overlay, Purpose::Visibility),
            Tween::to(PropSet::new().opacity(0.0), OVERLAY_OUT_MS).easing(Easing::Power2In),
        );
        if let Some(slot) = self.tweens.first_mut() {
            *slot = overlay;
        } else {
            self.tweens.push(overlay);
        }

        let phase = self.phase.clone();
        self.close_timer = Some(self.ctx.timers().set_timeout(OVERLAY_OUT_MS as f64, move || {
            phase.set(GalleryPhase::Closed);
        }));
    }

    pub fn next(&mut self) {
        if self.is_open() && self.len > 0 {
            self.go_to((self.index + 1) % self.len);
        }
    }

    pub fn previous(&mut self) {
        if self.is_open() && self.len > 0 {
            self.go_to((self.index + self.len - 1) % self.len);
        }
    }

    /// Jump to a thumbnail
    pub fn go_to(&mut self, index: usize) {
        if !self.is_open() || index >= self.len || index == self.index {
            return;
        }
        self.index = index;
        self.swap_image();
    }

    /// Keyboard handling while open; returns whether the key was used
    pub fn handle_key(&mut self, key: GalleryKey) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            GalleryKey::Escape => self.close(),
            GalleryKey::Next => self.next(),
            GalleryKey::Previous => self.previous(),
        }
        true
    }

    fn swap_image(&mut self) {
        let tween = self.ctx.animations().animate(
            TargetKey::new(self.elements.image, Purpose::Reveal),
            Tween::from_to(
                PropSet::new().opacity(0.0).scale(0.95),
                PropSet::new().opacity(1.0).scale(1.0),
                IMAGE_SWAP_MS,
            )
            .easing(Easing::Power2Out),
        );
        if self.tweens.len() > 2 {
            self.tweens[2] = tween;
        } else {
            self.tweens.push(tween);
        }
    }

    fn cancel_close(&mut self) {
        if let Some(id) = self.close_timer.take() {
            self.ctx.timers().clear(id);
        }
    }

    pub fn unmount(&mut self) {
        self.cancel_close();
        self.tweens.clear();
        self.phase.set(GalleryPhase::Closed);
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;

    fn gallery(host: &Host, len: usize) -> Gallery {
        let elements = GalleryElements::create(host.layout(), 1440.0, 900.0);
        Gallery::new(&host.context(), elements, len)
    }

    #[test]
    fn test_navigation_wraps() {
        let host = Host::desktop();
        let mut g = gallery(&host, 3);
        assert!(g.open(2));
        g.next();
        assert_eq!(g.index(), 0);
        g.previous();
        assert_eq!(g.index(), 2);
        g.go_to(1);
        assert_eq!(g.index(), 1);
    }

    #[test]
    fn test_keys_only_apply_while_open() {
        let host = Host::desktop();
        let mut g = gallery(&host, 4);
        assert!(!g.handle_key(GalleryKey::Next));

        g.open(0);
        assert!(g.handle_key("ArrowLeft".parse().unwrap()));
        assert_eq!(g.index(), 3);
        assert!(g.handle_key(GalleryKey::Escape));
        assert_eq!(g.phase(), GalleryPhase::Closing);
        assert!(!g.handle_key(GalleryKey::Next));
        assert_eq!(g.index(), 3);
        assert!("Enter".parse::<GalleryKey>().is_err());
    }

    #[test]
    fn test_close_waits_for_fade() {
        let host = Host::desktop();
        let mut g = gallery(&host, 2);
        g.open(0);
        host.run_for(500.0, 16.0);
        let overlay = g.elements.overlay;
        assert_eq!(host.scheduler().state_of(overlay).opacity, 1.0);

        g.close();
        host.advance(100.0);
        assert_eq!(g.phase(), GalleryPhase::Closing);
        host.advance(100.0);
        assert_eq!(g.phase(), GalleryPhase::Closed);
        assert_eq!(host.scheduler().state_of(overlay).opacity, 0.0);
    }

    #[test]
    fn test_empty_gallery_never_opens() {
        let host = Host::desktop();
        let mut g = gallery(&host, 0);
        assert!(!g.open(0));
        g.next();
        assert_eq!(g.phase(), GalleryPhase::Closed);
    }

    #[test]
    fn test_unmount_while_closing_releases_timer() {
        let host = Host::desktop();
        let mut g = gallery(&host, 2);
        g.open(1);
        g.close();
        g.unmount();
        assert!(host.counts().is_idle(), "{:?}", host.counts());
    }
}
