//! Scalar helpers shared by the animation and shading code

pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Hermite smooth step between `edge0` and `edge1` (GLSL semantics)
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = clamp01((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.2, 0.8, 0.1), 0.0);
        assert_eq!(smoothstep(0.2, 0.8, 0.9), 1.0);
        assert!((smoothstep(0.2, 0.8, 0.5) - 0.5).abs() < 1e-6);
    }
}
