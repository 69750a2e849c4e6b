//! CPU rendition of the noise overlay fragment shader.
//!
//! Every function here is pure and mirrors one step of `fs_main` in
//! `render/shaders/noise_overlay.wgsl`. The math is carried out in `f32`
//! with the same operation order as the WGSL source.

use crate::bindings::{ResourceBindings, VertexOutput};
use crate::coords::{fract, ColorRgba, Vec2};

/// Dot-product weights of the sine hash.
pub const HASH_WEIGHTS: Vec2 = Vec2::new(12.9898, 78.233);
/// Amplitude the sine is stretched by before taking the fractional part.
pub const HASH_SCALE: f32 = 43758.5453;
/// UV-space center the falloff is measured from.
pub const CENTER: Vec2 = Vec2::splat(0.5);
/// Blue channel gets this fraction of the red/green multiplier.
pub const BLUE_SCALE: f32 = 0.5;

/// Sine hash: `fract(sin(dot(co, (12.9898, 78.233))) * 43758.5453)`.
///
/// Cheap, non-cryptographic, unseeded. Output is in `[0, 1)` for finite `co`.
#[inline]
pub fn rand(co: Vec2) -> f32 {
    fract(co.dot(HASH_WEIGHTS).sin() * HASH_SCALE)
}

/// `1 - fract(|uv - 0.5|)`.
///
/// Inside the unit circle around the center this decays from 1 towards 0;
/// past distance 1 it starts over, producing rings.
#[inline]
pub fn radial_falloff(uv: Vec2) -> f32 {
    1.0 - fract((uv - CENTER).length())
}

/// `(1 - rand / 2) * dist²`.
#[inline]
pub fn noise_factor(rand: f32, dist: f32) -> f32 {
    (1.0 - rand / 2.0) * dist * dist
}

/// Per-channel multiplier applied to the sampled color. Alpha passes through.
#[inline]
pub fn channel_mask(noise_factor: f32) -> ColorRgba {
    ColorRgba::new(noise_factor, noise_factor, noise_factor * BLUE_SCALE, 1.0)
}

/// Applies the overlay to an already sampled `base` color at `uv`.
#[inline]
pub fn shade(uv: Vec2, base: ColorRgba) -> ColorRgba {
    let factor = noise_factor(rand(uv), radial_falloff(uv));
    base * channel_mask(factor)
}

/// Fragment entry point: samples the bound texture at the interpolated UV
/// and applies the overlay.
///
/// `uv` is not validated; out-of-range values are resolved by the sampler.
/// The filter follows `bindings.texels_per_pixel`, as on a GPU.
#[inline]
pub fn fs_main(input: &VertexOutput, bindings: &ResourceBindings<'_>) -> ColorRgba {
    shade(input.uv, bindings.sample(input.uv))
}
