use core::ops::{Add, Mul};

/// Linear RGBA color, straight (not premultiplied) alpha.
///
/// Sampled texels and shader outputs both use this type; the overlay scales
/// channels independently, so alpha is never folded into rgb here.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Creates a color from 8-bit channels (`0`–`255` maps to `0.0`–`1.0`).
    #[inline]
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::new(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
            rgba[3] as f32 / 255.0,
        )
    }

    /// Quantizes to 8-bit channels. Channels are clamped to `[0, 1]`; NaN maps to 0.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        #[inline]
        fn q(v: f32) -> u8 {
            // `as` saturates and maps NaN to 0.
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: ColorRgba, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

/// Component-wise product, like `vec4 * vec4` in a shader.
impl Mul for ColorRgba {
    type Output = ColorRgba;
    #[inline]
    fn mul(self, rhs: ColorRgba) -> ColorRgba {
        ColorRgba::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

impl Mul<f32> for ColorRgba {
    type Output = ColorRgba;
    #[inline]
    fn mul(self, rhs: f32) -> ColorRgba {
        ColorRgba::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl Add for ColorRgba {
    type Output = ColorRgba;
    #[inline]
    fn add(self, rhs: ColorRgba) -> ColorRgba {
        ColorRgba::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl From<[f32; 4]> for ColorRgba {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        ColorRgba::new(v[0], v[1], v[2], v[3])
    }
}

impl From<ColorRgba> for [f32; 4] {
    #[inline]
    fn from(c: ColorRgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}
