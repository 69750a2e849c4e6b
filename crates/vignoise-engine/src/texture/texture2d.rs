use crate::coords::ColorRgba;

use super::TextureError;

/// Owned 2D RGBA float image, row-major, top row first.
///
/// This is the CPU stand-in for a bound `texture_2d<f32>`: read-only once
/// built, shared by reference across every shading invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture2D {
    width: u32,
    height: u32,
    texels: Vec<ColorRgba>,
}

impl Texture2D {
    /// Builds a texture from row-major texels.
    pub fn new(width: u32, height: u32, texels: Vec<ColorRgba>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(TextureError::TexelCountMismatch { expected, actual: texels.len() });
        }
        Ok(Self { width, height, texels })
    }

    /// Texture with every texel set to `color`.
    pub fn filled(width: u32, height: u32, color: ColorRgba) -> Result<Self, TextureError> {
        Self::new(width, height, vec![color; width as usize * height as usize])
    }

    /// Texture whose texel at `(x, y)` is `f(x, y)`.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> ColorRgba,
    ) -> Result<Self, TextureError> {
        let mut texels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self::new(width, height, texels)
    }

    /// Converts an 8-bit RGBA image. Channel bytes map linearly to `[0, 1]`,
    /// the same as an `Rgba8Unorm` GPU texture.
    pub fn from_rgba8(img: &image::RgbaImage) -> Result<Self, TextureError> {
        let texels = img.pixels().map(|p| ColorRgba::from_rgba8(p.0)).collect();
        Self::new(img.width(), img.height(), texels)
    }

    pub fn from_image(img: &image::DynamicImage) -> Result<Self, TextureError> {
        Self::from_rgba8(&img.to_rgba8())
    }

    /// Quantizes back to an 8-bit image (channels clamped to `[0, 1]`).
    pub fn to_rgba8(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.texel(x, y).to_rgba8())
        })
    }

    /// Tightly packed RGBA8 bytes, row-major. Matches an `Rgba8Unorm` upload.
    pub fn to_rgba8_bytes(&self) -> Vec<u8> {
        self.texels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    /// A texture of the same size as `self` holding `texels`.
    pub(crate) fn with_texels(&self, texels: Vec<ColorRgba>) -> Self {
        assert_eq!(texels.len(), self.texels.len(), "texel count must match source size");
        Self { width: self.width, height: self.height, texels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel at integer coordinates. Panics if out of bounds; use a
    /// [`Sampler`](super::Sampler) for addressed lookups.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> ColorRgba {
        assert!(x < self.width && y < self.height, "texel ({x}, {y}) out of bounds");
        self.texels[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn texels(&self) -> &[ColorRgba] {
        &self.texels
    }
}
