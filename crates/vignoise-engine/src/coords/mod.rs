//! Vector and color types shared by the CPU shader, the sampler and the renderers.
//!
//! UV space:
//! - Origin top-left of the texture
//! - +U right, +V down
//! - `[0, 1]` nominally covers the texture; values outside are resolved by the sampler

mod color;
mod vec2;
mod vec4;

pub use color::ColorRgba;
pub use vec2::Vec2;
pub use vec4::Vec4;

/// Largest `f32` strictly below `1.0`.
const ONE_BELOW: f32 = 1.0 - f32::EPSILON / 2.0;

/// Shader-style fractional part: `x - floor(x)`.
///
/// Unlike [`f32::fract`], negative inputs wrap into `[0, 1)` instead of keeping
/// their sign. For tiny negative `x` the subtraction rounds to `1.0`; that case is
/// pulled down to the largest value below one so the result stays in `[0, 1)`
/// for every finite input. Non-finite input yields NaN.
#[inline]
pub fn fract(x: f32) -> f32 {
    let f = x - x.floor();
    if f >= 1.0 { ONE_BELOW } else { f }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fract_positive() {
        assert_eq!(fract(2.25), 0.25);
        assert_eq!(fract(0.0), 0.0);
        assert_eq!(fract(3.0), 0.0);
    }

    #[test]
    fn fract_negative_wraps_up() {
        assert_eq!(fract(-0.25), 0.75);
        assert_eq!(fract(-2.0), 0.0);
    }

    #[test]
    fn fract_tiny_negative_stays_below_one() {
        let f = fract(-1.0e-9);
        assert!(f < 1.0);
        assert!(f > 0.99);
    }

    #[test]
    fn fract_non_finite_is_nan() {
        assert!(fract(f32::INFINITY).is_nan());
        assert!(fract(f32::NAN).is_nan());
    }

    #[test]
    fn vec2_length_of_3_4_is_5() {
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
    }
}
