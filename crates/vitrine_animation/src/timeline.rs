//! Staggers and sequenced timelines
//!
//! A [`Timeline`] does not own tweens. It only computes start offsets so a
//! caller can register each step as an ordinary delayed tween; the scheduler
//! then plays them like any other.

/// Direction for stagger ordering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaggerDirection {
    /// Animate first to last
    #[default]
    Forward,
    /// Animate last to first
    Reverse,
    /// Animate from center outward
    FromCenter,
}

/// Per-item delay for a group of targets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    /// Delay between each item's start (ms)
    pub each_ms: f32,
    pub direction: StaggerDirection,
    /// Optional: limit stagger to first N items
    pub limit: Option<usize>,
}

impl Stagger {
    pub fn new(each_ms: f32) -> Self {
        Self {
            each_ms,
            direction: StaggerDirection::Forward,
            limit: None,
        }
    }

    /// No delay between items
    pub fn none() -> Self {
        Self::new(0.0)
    }

    /// Stagger from last to first
    pub fn reverse(mut self) -> Self {
        self.direction = StaggerDirection::Reverse;
        self
    }

    /// Stagger from center outward
    pub fn from_center(mut self) -> Self {
        self.direction = StaggerDirection::FromCenter;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Delay for the item at `index` in a group of `total`
    pub fn delay_for_index(&self, index: usize, total: usize) -> f32 {
        let effective = match self.direction {
            StaggerDirection::Forward => index,
            StaggerDirection::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerDirection::FromCenter => {
                let center = total / 2;
                center.abs_diff(index)
            }
        };
        let capped = match self.limit {
            Some(limit) => effective.min(limit),
            None => effective,
        };
        self.each_ms * capped as f32
    }

    /// Time from the first item's start to the last item's end
    pub fn span_ms(&self, total: usize, duration_ms: f32) -> f32 {
        let last = (0..total)
            .map(|i| self.delay_for_index(i, total))
            .fold(0.0_f32, f32::max);
        last + duration_ms
    }
}

impl Default for Stagger {
    fn default() -> Self {
        Self::none()
    }
}

/// Sequential layout of timeline steps
///
/// Each step is positioned relative to the current end of the timeline, so an
/// offset of `-600.0` starts a step 600 ms before the previous steps finish
/// (GSAP's `"-=0.6"`).
///
/// ```
/// use vitrine_animation::Timeline;
///
/// let mut tl = Timeline::with_delay(500.0);
/// assert_eq!(tl.push(1200.0, 0.0), 500.0);
/// assert_eq!(tl.push(1000.0, -600.0), 1100.0);
/// assert_eq!(tl.end_ms(), 2100.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    delay_ms: f32,
    end_ms: f32,
    steps: usize,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timeline whose first step starts after `delay_ms`
    pub fn with_delay(delay_ms: f32) -> Self {
        Self {
            delay_ms,
            end_ms: delay_ms,
            steps: 0,
        }
    }

    /// Place a step of `duration_ms` at `offset_ms` from the current end
    ///
    /// Returns the step's start time. Steps never start before the timeline's
    /// own delay.
    pub fn push(&mut self, duration_ms: f32, offset_ms: f32) -> f32 {
        let start = (self.end_ms + offset_ms).max(self.delay_ms);
        self.end_ms = self.end_ms.max(start + duration_ms);
        self.steps += 1;
        start
    }

    /// Place a staggered group; returns each item's start time
    pub fn push_staggered(
        &mut self,
        count: usize,
        duration_ms: f32,
        stagger: Stagger,
        offset_ms: f32,
    ) -> Vec<f32> {
        let start = (self.end_ms + offset_ms).max(self.delay_ms);
        let starts: Vec<f32> = (0..count)
            .map(|i| start + stagger.delay_for_index(i, count))
            .collect();
        if count > 0 {
            self.end_ms = self.end_ms.max(start + stagger.span_ms(count, duration_ms));
        }
        self.steps += 1;
        starts
    }

    pub fn end_ms(&self) -> f32 {
        self.end_ms
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stagger_directions() {
        let forward = Stagger::new(100.0);
        assert_eq!(forward.delay_for_index(0, 5), 0.0);
        assert_eq!(forward.delay_for_index(4, 5), 400.0);

        let reverse = Stagger::new(100.0).reverse();
        assert_eq!(reverse.delay_for_index(0, 5), 400.0);
        assert_eq!(reverse.delay_for_index(4, 5), 0.0);

        let center = Stagger::new(100.0).from_center();
        assert_eq!(center.delay_for_index(2, 5), 0.0);
        assert_eq!(center.delay_for_index(0, 5), 200.0);
        assert_eq!(center.delay_for_index(4, 5), 200.0);
    }

    #[test]
    fn test_stagger_limit() {
        let s = Stagger::new(50.0).limit(2);
        assert_eq!(s.delay_for_index(10, 20), 100.0);
    }

    #[test]
    fn test_overlapping_steps() {
        let mut tl = Timeline::with_delay(500.0);
        let title = tl.push(1200.0, 0.0);
        let subtitle = tl.push(1000.0, -600.0);
        let description = tl.push(1000.0, -400.0);

        assert_eq!(title, 500.0);
        assert_eq!(subtitle, 1100.0);
        assert_eq!(description, 1700.0);
        assert_eq!(tl.end_ms(), 2700.0);
        assert_eq!(tl.steps(), 3);
    }

    #[test]
    fn test_staggered_group_extends_end() {
        let mut tl = Timeline::new();
        tl.push(1000.0, 0.0);
        let starts = tl.push_staggered(3, 800.0, Stagger::new(150.0), -300.0);

        assert_eq!(starts, vec![700.0, 850.0, 1000.0]);
        assert_eq!(tl.end_ms(), 1800.0);
    }

    #[test]
    fn test_offset_never_precedes_delay() {
        let mut tl = Timeline::with_delay(200.0);
        assert_eq!(tl.push(100.0, -1000.0), 200.0);
    }
}
