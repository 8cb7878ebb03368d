//! Gold radial gradient
//!
//! [`GradientShader::shade`] is the CPU reference of the fragment stage. The
//! focal point starts at the viewport center and drifts toward the smoothed
//! pointer as the reveal progresses; a radial falloff whose radius grows with
//! the reveal blends two golds over a near-black base and drives alpha.

use vitrine_animation::Interpolate;
use vitrine_core::math::{clamp01, smoothstep};
use vitrine_core::{Color, Point, Size};

/// Uniform block shared with the material
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientUniforms {
    /// Smoothed pointer, normalized with y pointing up
    pub mouse: Point,
    /// Surface size in pixels
    pub resolution: Size,
    /// Reveal progress in [0, 1]
    pub progress: f32,
}

impl GradientUniforms {
    pub fn new(resolution: Size) -> Self {
        Self {
            mouse: Point::new(0.5, 0.5),
            resolution,
            progress: 0.0,
        }
    }

    fn aspect(&self) -> f32 {
        if self.resolution.height > 0.0 {
            self.resolution.width / self.resolution.height
        } else {
            1.0
        }
    }
}

/// Fragment-stage reference for the background gradient
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientShader {
    pub base: Color,
    pub bright: Color,
    pub deep: Color,
    /// Falloff radius at full reveal, in aspect-corrected uv units
    pub max_radius: f32,
    /// Fraction of the radius that stays fully lit
    pub core: f32,
}

impl Default for GradientShader {
    fn default() -> Self {
        Self {
            base: Color::from_hex(0x0a0a0a),
            bright: Color::from_hex(0xe8c547),
            deep: Color::from_hex(0xb8860b),
            max_radius: 0.9,
            core: 0.25,
        }
    }
}

impl GradientShader {
    /// Focal point for the given uniforms
    pub fn focal(&self, uniforms: &GradientUniforms) -> Point {
        Point::new(0.5, 0.5).lerp(&uniforms.mouse, clamp01(uniforms.progress))
    }

    /// Shade the fragment at `uv` (0..1, origin bottom-left)
    pub fn shade(&self, uv: Point, uniforms: &GradientUniforms) -> Color {
        let progress = clamp01(uniforms.progress);
        let radius = progress * self.max_radius;
        if radius <= 0.0 {
            return self.base.with_alpha(0.0);
        }

        let focal = self.focal(uniforms);
        let aspect = uniforms.aspect();
        let dx = (uv.x - focal.x) * aspect;
        let dy = uv.y - focal.y;
        let d = (dx * dx + dy * dy).sqrt();

        let falloff = 1.0 - smoothstep(radius * self.core, radius, d);
        let gold = Interpolate::lerp(&self.bright, &self.deep, clamp01(d / radius));
        Interpolate::lerp(&self.base, &gold, falloff).with_alpha(falloff * progress)
    }
}
