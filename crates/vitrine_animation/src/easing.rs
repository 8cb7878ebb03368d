//! Easing curves
//!
//! Named after the GSAP eases the site was designed with: `powerN` is a
//! polynomial of degree N + 1.

use std::f32::consts::PI;

/// Easing function applied to linear progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    Linear,
    /// Quadratic in-out (`power1.inOut`)
    Power1InOut,
    /// Quadratic out (`power1.out`, GSAP's default ease)
    #[default]
    Power1Out,
    /// Cubic out (`power2.out`)
    Power2Out,
    /// Cubic in (`power2.in`)
    Power2In,
    /// Cubic in-out (`power2.inOut`)
    Power2InOut,
    /// Quartic out (`power3.out`)
    Power3Out,
    /// Quartic in-out (`power3.inOut`)
    Power3InOut,
    /// Quintic out (`power4.out`)
    Power4Out,
    /// Overshooting out (`back.out(s)`)
    BackOut(f32),
    /// Sinusoidal in-out (`sine.inOut`)
    SineInOut,
}

impl Easing {
    /// `back.out(1.7)`
    pub const BACK_OUT: Easing = Easing::BackOut(1.7);

    /// Map linear progress `t` in [0, 1] to eased progress
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Easing::Linear => t,
            Easing::Power1InOut => in_out(t, 2),
            Easing::Power1Out => out(t, 2),
            Easing::Power2Out => out(t, 3),
            Easing::Power2In => t.powi(3),
            Easing::Power2InOut => in_out(t, 3),
            Easing::Power3Out => out(t, 4),
            Easing::Power3InOut => in_out(t, 4),
            Easing::Power4Out => out(t, 5),
            Easing::BackOut(s) => {
                let u = t - 1.0;
                1.0 + (s + 1.0) * u.powi(3) + s * u.powi(2)
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

fn out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

fn in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        (2.0 * t).powi(exp) / 2.0
    } else {
        1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 11] = [
        Easing::Linear,
        Easing::Power1InOut,
        Easing::Power1Out,
        Easing::Power2Out,
        Easing::Power2In,
        Easing::Power2InOut,
        Easing::Power3Out,
        Easing::Power3InOut,
        Easing::Power4Out,
        Easing::BACK_OUT,
        Easing::SineInOut,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_out_curves_decelerate() {
        // An out curve is ahead of linear at the midpoint
        assert!(Easing::Power2Out.apply(0.5) > 0.5);
        assert!(Easing::Power4Out.apply(0.5) > Easing::Power2Out.apply(0.5));
        assert!(Easing::Power2In.apply(0.5) < 0.5);
    }

    #[test]
    fn test_in_out_symmetry() {
        let e = Easing::Power3InOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::BACK_OUT.apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }
}
