//! Decorative background orbs
//!
//! Three blurred color fields behind the page drift forever: each one eases
//! toward its own offset and scale and back again, on periods of 8, 10 and
//! 12 seconds so the motion never visibly repeats as a whole.

use smallvec::SmallVec;
use tracing::debug;
use vitrine_animation::{AnimatedTween, Easing, PropSet, Purpose, TargetKey, Tween};
use vitrine_core::{ElementId, Layout, Rect};

use crate::host::HostContext;

/// Where one orb drifts to, and how long a one-way trip takes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drift {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub period_ms: f32,
}

impl Drift {
    fn tween(&self) -> Tween {
        Tween::to(
            PropSet::new().x(self.x).y(self.y).scale(self.scale),
            self.period_ms,
        )
        .repeat(-1)
        .yoyo(true)
        .easing(Easing::SineInOut)
    }
}

/// Gold (top right), blue (bottom left), copper (center)
pub const DRIFTS: [Drift; 3] = [
    Drift {
        x: 50.0,
        y: -30.0,
        scale: 1.1,
        period_ms: 8000.0,
    },
    Drift {
        x: -40.0,
        y: 40.0,
        scale: 0.9,
        period_ms: 10000.0,
    },
    Drift {
        x: 30.0,
        y: 50.0,
        scale: 1.05,
        period_ms: 12000.0,
    },
];

#[derive(Clone, Copy, Debug)]
pub struct OrbElements {
    pub gold: ElementId,
    pub blue: ElementId,
    pub copper: ElementId,
}

impl OrbElements {
    /// Fixed to the viewport, partly off-screen at the corners
    pub fn create(layout: &Layout, width: f32, height: f32) -> Self {
        Self {
            gold: layout.insert("orbs.gold", Rect::new(width - 440.0, -160.0, 600.0, 600.0)),
            blue: layout.insert("orbs.blue", Rect::new(-160.0, height - 340.0, 500.0, 500.0)),
            copper: layout.insert(
                "orbs.copper",
                Rect::new(width / 2.0 - 200.0, height / 2.0 - 200.0, 400.0, 400.0),
            ),
        }
    }

    pub fn all(&self) -> [ElementId; 3] {
        [self.gold, self.blue, self.copper]
    }
}

/// Endless ambient drift of the three orbs
pub struct BackgroundOrbs {
    elements: OrbElements,
    loops: SmallVec<[AnimatedTween; 3]>,
}

impl BackgroundOrbs {
    pub fn mount(ctx: &HostContext, elements: OrbElements) -> Self {
        let handle = ctx.animations();
        let loops = elements
            .all()
            .into_iter()
            .zip(DRIFTS)
            .map(|(orb, drift)| handle.animate(TargetKey::new(orb, Purpose::Loop), drift.tween()))
            .collect();
        debug!("background orbs drifting");
        Self { elements, loops }
    }

    pub fn elements(&self) -> &OrbElements {
        &self.elements
    }

    /// Whether every orb is still drifting
    pub fn is_looping(&self) -> bool {
        !self.loops.is_empty() && self.loops.iter().all(AnimatedTween::is_playing)
    }

    pub fn unmount(&mut self) {
        self.loops.clear();
    }
}

impl Drop for BackgroundOrbs {
    fn drop(&mut self) {
        self.unmount();
    }
}
