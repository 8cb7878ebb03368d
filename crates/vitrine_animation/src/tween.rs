//! Property tweens
//!
//! A [`Tween`] drives a set of channels on one [`VisualState`] from start
//! values to end values over a fixed duration. Start values come from the
//! tween's `from` set when it has one, otherwise from the element's state at
//! the moment the tween leaves its delay.

use smallvec::SmallVec;

use crate::easing::Easing;
use crate::values::{Interpolate, Prop, PropSet, VisualState};

/// Playback phase of a tween
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting out the start delay
    Delayed,
    Running,
    /// Reached an end; stays registered until killed
    Finished,
}

#[derive(Clone, Copy, Debug)]
struct Track {
    prop: Prop,
    start: f32,
    end: f32,
}

/// A from/to animation over a property set
#[derive(Clone, Debug)]
pub struct Tween {
    from: Option<PropSet>,
    to: PropSet,
    duration_ms: f32,
    delay_ms: f32,
    easing: Easing,
    snap: Option<f32>,
    repeat: i32,
    yoyo: bool,

    tracks: SmallVec<[Track; 4]>,
    resolved: bool,
    phase: Phase,
    delay_left: f32,
    time_ms: f32,
    iteration: i32,
    reversed: bool,
    paused: bool,
}

impl Tween {
    /// Animate from the element's current state to `to`
    pub fn to(to: PropSet, duration_ms: f32) -> Self {
        Self {
            from: None,
            to,
            duration_ms: duration_ms.max(0.0),
            delay_ms: 0.0,
            easing: Easing::default(),
            snap: None,
            repeat: 0,
            yoyo: false,
            tracks: SmallVec::new(),
            resolved: false,
            phase: Phase::Delayed,
            delay_left: 0.0,
            time_ms: 0.0,
            iteration: 0,
            reversed: false,
            paused: false,
        }
    }

    /// Animate from `from` to `to`
    ///
    /// `from` is written to the element as soon as the tween is started, even
    /// while it is still delayed, so staggered items do not flash in their
    /// resting state first.
    pub fn from_to(from: PropSet, to: PropSet, duration_ms: f32) -> Self {
        let mut tween = Self::to(to, duration_ms);
        tween.from = Some(from);
        tween
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self.delay_left = self.delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Round every sampled value to a multiple of `step`
    pub fn snap(mut self, step: f32) -> Self {
        if step > 0.0 {
            self.snap = Some(step);
        }
        self
    }

    /// Number of extra iterations; negative repeats forever
    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count;
        self
    }

    /// Alternate direction on every repeat
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Start paused; the playhead only moves through [`Tween::seek`]
    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    pub fn delay_ms(&self) -> f32 {
        self.delay_ms
    }

    pub fn target(&self) -> &PropSet {
        &self.to
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Whether the tween still has frames to produce on its own
    pub fn is_playing(&self) -> bool {
        !self.paused && self.phase != Phase::Finished
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Linear playhead position within the current iteration, 0 to 1
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.phase == Phase::Finished && !self.reversed {
                1.0
            } else {
                0.0
            };
        }
        (self.time_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Delay plus every iteration; infinite for endless repeats
    pub fn total_duration_ms(&self) -> f32 {
        if self.repeat < 0 {
            return f32::INFINITY;
        }
        self.delay_ms + self.duration_ms * (self.repeat + 1) as f32
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Called once when the tween is attached to an element
    pub(crate) fn begin(&mut self, state: &mut VisualState) {
        if let Some(from) = &self.from {
            from.apply_to(state);
            self.resolve(state);
        }
        if self.delay_left <= 0.0 {
            self.phase = Phase::Running;
            if !self.resolved {
                self.resolve(state);
            }
            if self.duration_ms <= 0.0 {
                self.advance(0.0);
                self.write(state);
            }
        }
    }

    fn resolve(&mut self, state: &VisualState) {
        self.tracks.clear();
        for (prop, end) in self.to.iter() {
            let start = self
                .from
                .as_ref()
                .and_then(|f| f.get(prop))
                .unwrap_or_else(|| state.get(prop));
            self.tracks.push(Track { prop, start, end });
        }
        self.resolved = true;
    }

    /// Advance by `dt_ms` and write the sampled values to `state`
    pub fn tick(&mut self, dt_ms: f32, state: &mut VisualState) {
        if self.paused || self.phase == Phase::Finished {
            return;
        }
        let mut dt = dt_ms.max(0.0);

        if self.phase == Phase::Delayed {
            if dt < self.delay_left {
                self.delay_left -= dt;
                return;
            }
            dt -= self.delay_left;
            self.delay_left = 0.0;
            self.phase = Phase::Running;
        }
        // A tween reversed out of its delay reaches here unresolved
        if !self.resolved {
            self.resolve(state);
        }

        self.advance(dt);
        self.write(state);
    }

    fn advance(&mut self, dt: f32) {
        if self.duration_ms <= 0.0 {
            self.time_ms = 0.0;
            self.phase = Phase::Finished;
            return;
        }

        if self.reversed {
            self.time_ms -= dt;
            if self.time_ms <= 0.0 {
                self.time_ms = 0.0;
                self.phase = Phase::Finished;
            }
            return;
        }

        self.time_ms += dt;
        while self.time_ms >= self.duration_ms {
            if self.repeat < 0 || self.iteration < self.repeat {
                self.time_ms -= self.duration_ms;
                self.iteration += 1;
            } else {
                self.time_ms = self.duration_ms;
                self.phase = Phase::Finished;
                break;
            }
        }
    }

    fn sample(&self) -> f32 {
        let mut t = if self.duration_ms <= 0.0 {
            if self.reversed {
                0.0
            } else {
                1.0
            }
        } else {
            self.time_ms / self.duration_ms
        };
        if self.yoyo && self.iteration % 2 == 1 {
            t = 1.0 - t;
        }
        self.easing.apply(t)
    }

    fn write(&self, state: &mut VisualState) {
        if !self.resolved {
            return;
        }
        let eased = self.sample();
        for track in &self.tracks {
            let mut value = if eased == 1.0 {
                track.end
            } else {
                track.start.lerp(&track.end, eased)
            };
            if let Some(step) = self.snap {
                value = (value / step).round() * step;
            }
            state.set(track.prop, value);
        }
    }

    /// Move the playhead to `progress` (0 to 1) and write the result
    ///
    /// Used by scroll scrubbing. Resolves start values on first use.
    pub fn seek(&mut self, progress: f32, state: &mut VisualState) {
        if !self.resolved {
            self.resolve(state);
        }
        self.delay_left = 0.0;
        self.time_ms = progress.clamp(0.0, 1.0) * self.duration_ms;
        self.phase = if progress >= 1.0 && !self.reversed {
            Phase::Finished
        } else {
            Phase::Running
        };
        self.write(state);
    }

    /// Play back toward the start values
    ///
    /// A tween still in its delay skips straight to its start; start values of
    /// a `to` tween are read once it is played again.
    pub fn reverse(&mut self) {
        self.reversed = true;
        self.paused = false;
        match self.phase {
            Phase::Delayed => self.phase = Phase::Finished,
            Phase::Finished if self.time_ms > 0.0 => self.phase = Phase::Running,
            _ => {}
        }
    }

    /// Play forward toward the end values
    pub fn play(&mut self) {
        self.reversed = false;
        self.paused = false;
        if self.phase == Phase::Finished && self.time_ms < self.duration_ms {
            self.phase = Phase::Running;
        }
    }

    /// Rewind to the start values and play forward again
    pub fn restart(&mut self, state: &mut VisualState) {
        self.reversed = false;
        self.paused = false;
        self.iteration = 0;
        self.time_ms = 0.0;
        self.delay_left = self.delay_ms;
        self.phase = Phase::Delayed;
        if self.resolved {
            self.write(state);
        }
        self.begin(state);
    }

    /// Jump to the end values
    pub fn complete(&mut self, state: &mut VisualState) {
        if !self.resolved {
            self.resolve(state);
        }
        self.reversed = false;
        self.delay_left = 0.0;
        self.time_ms = self.duration_ms;
        self.phase = Phase::Finished;
        self.write(state);
    }
}
