//! Software rasterizer for the noise overlay.
//!
//! Runs the CPU fragment function once per output pixel center, with rows
//! processed in parallel. Because the shader is pure and the bound resources
//! are read-only, the result is identical to a sequential loop.

use rayon::prelude::*;

use crate::bindings::{ResourceBindings, VertexOutput};
use crate::coords::ColorRgba;
use crate::shader;
use crate::texture::{Sampler, Texture2D, TextureError};

/// Which pixels receive the overlay.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OverlayMask {
    /// Every pixel.
    #[default]
    Full,
    /// Alternating horizontal bands of `band_height` rows, starting with an
    /// overlaid band at the top. Rows outside those bands get the plain
    /// sampled color. `band_height == 0` behaves like `Full`.
    ///
    /// The vignette is still computed from the whole-target UV, so bands show
    /// slices of one image-wide vignette. Rendering each band as its own draw
    /// with 0..1 UVs (a vignette per band) is not what this mask does.
    AlternateBands { band_height: u32 },
}

impl OverlayMask {
    #[inline]
    pub fn covers_row(self, y: u32) -> bool {
        match self {
            OverlayMask::Full => true,
            OverlayMask::AlternateBands { band_height: 0 } => true,
            OverlayMask::AlternateBands { band_height } => (y / band_height) % 2 == 0,
        }
    }
}

/// Output size and mask of a software overlay pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
    pub mask: OverlayMask,
}

impl RasterConfig {
    /// Target the same size as `texture`, overlay everywhere.
    pub fn for_texture(texture: &Texture2D) -> Self {
        Self {
            width: texture.width(),
            height: texture.height(),
            mask: OverlayMask::Full,
        }
    }

    pub fn with_mask(mut self, mask: OverlayMask) -> Self {
        self.mask = mask;
        self
    }
}

/// Renders the overlay into a new `config.width × config.height` texture.
///
/// Fails only if the target size is zero.
pub fn render_overlay(
    bindings: &ResourceBindings<'_>,
    config: &RasterConfig,
) -> Result<Texture2D, TextureError> {
    let (width, height) = (config.width, config.height);
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroSize { width, height });
    }
    Texture2D::new(width, height, rasterize(bindings, config))
}

/// Overlay at the source resolution.
pub fn apply_overlay(texture: &Texture2D, sampler: &Sampler) -> Texture2D {
    let bindings = ResourceBindings::new(texture, sampler);
    texture.with_texels(rasterize(&bindings, &RasterConfig::for_texture(texture)))
}

fn rasterize(bindings: &ResourceBindings<'_>, config: &RasterConfig) -> Vec<ColorRgba> {
    let (width, height) = (config.width, config.height);
    let bindings = bindings.for_target(width, height);

    log::debug!(
        "software overlay {}x{} -> {width}x{height} ({:?}, {} texels/pixel)",
        bindings.texture.width(),
        bindings.texture.height(),
        config.mask,
        bindings.texels_per_pixel
    );

    let mut texels = vec![ColorRgba::transparent(); width as usize * height as usize];
    texels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let overlaid = config.mask.covers_row(y);
            for (x, out) in row.iter_mut().enumerate() {
                let input = VertexOutput::for_pixel(x as u32, y, width, height);
                *out = if overlaid {
                    shader::fs_main(&input, &bindings)
                } else {
                    bindings.sample(input.uv)
                };
            }
        });
    texels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::shader::{channel_mask, noise_factor, radial_falloff, rand};
    use crate::texture::FilterMode;

    fn checker(w: u32, h: u32) -> Texture2D {
        Texture2D::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                ColorRgba::new(0.9, 0.8, 0.7, 1.0)
            } else {
                ColorRgba::new(0.2, 0.3, 0.4, 0.5)
            }
        })
        .unwrap()
    }

    fn sequential(texture: &Texture2D, sampler: &Sampler) -> Vec<ColorRgba> {
        let bindings = ResourceBindings::new(texture, sampler);
        let (w, h) = (texture.width(), texture.height());
        let mut out = Vec::new();
        for y in 0..h {
            for x in 0..w {
                out.push(shader::fs_main(&VertexOutput::for_pixel(x, y, w, h), &bindings));
            }
        }
        out
    }

    #[test]
    fn parallel_matches_sequential() {
        let texture = checker(37, 23);
        let sampler = Sampler::nearest_clamp();
        let out = apply_overlay(&texture, &sampler);
        assert_eq!(out.texels(), sequential(&texture, &sampler).as_slice());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let texture = checker(16, 16);
        let sampler = Sampler::linear_clamp();
        assert_eq!(apply_overlay(&texture, &sampler), apply_overlay(&texture, &sampler));
    }

    #[test]
    fn alpha_channel_is_untouched() {
        let texture = checker(9, 9);
        let out = apply_overlay(&texture, &Sampler::nearest_clamp());
        for (src, dst) in texture.texels().iter().zip(out.texels()) {
            assert_eq!(src.a, dst.a);
        }
    }

    #[test]
    fn center_pixel_keeps_at_least_half_brightness() {
        let texture = Texture2D::filled(3, 3, ColorRgba::white()).unwrap();
        let out = apply_overlay(&texture, &Sampler::nearest_clamp());
        let c = out.texel(1, 1);
        assert!((0.5..=1.0).contains(&c.r));
        assert_eq!(c.r, c.g);
        assert_eq!(c.b, c.r * 0.5);
    }

    #[test]
    fn alternate_bands_leave_odd_bands_plain() {
        let texture = checker(4, 6);
        let sampler = Sampler::nearest_clamp();
        let bindings = ResourceBindings::new(&texture, &sampler);
        let config = RasterConfig::for_texture(&texture)
            .with_mask(OverlayMask::AlternateBands { band_height: 2 });
        let out = render_overlay(&bindings, &config).unwrap();

        for y in 0..6 {
            for x in 0..4 {
                let base = texture.texel(x, y);
                let uv = VertexOutput::for_pixel(x, y, 4, 6).uv;
                let expected = if (y / 2) % 2 == 0 {
                    base * channel_mask(noise_factor(rand(uv), radial_falloff(uv)))
                } else {
                    base
                };
                assert_eq!(out.texel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn zero_band_height_is_full_coverage() {
        let mask = OverlayMask::AlternateBands { band_height: 0 };
        assert!((0..10).all(|y| mask.covers_row(y)));
    }

    #[test]
    fn resized_target_samples_whole_texture() {
        let texture = Texture2D::filled(8, 8, ColorRgba::new(1.0, 1.0, 1.0, 0.25)).unwrap();
        let sampler = Sampler::nearest_clamp();
        let bindings = ResourceBindings::new(&texture, &sampler);
        let config = RasterConfig { width: 3, height: 5, mask: OverlayMask::Full };
        let out = render_overlay(&bindings, &config).unwrap();
        assert_eq!((out.width(), out.height()), (3, 5));
        assert!(out.texels().iter().all(|c| c.a == 0.25));
        let uv = Vec2::new(0.5, 0.5);
        assert_eq!(out.texel(1, 2), shader::shade(uv, ColorRgba::new(1.0, 1.0, 1.0, 0.25)));
    }

    #[test]
    fn minified_target_matches_fs_main_with_min_filter() {
        let texture = Texture2D::from_fn(8, 8, |x, y| {
            ColorRgba::new(x as f32 / 8.0, y as f32 / 8.0, 0.5, 1.0)
        })
        .unwrap();
        let sampler = Sampler { min_filter: FilterMode::Nearest, ..Sampler::linear_clamp() };
        let bindings = ResourceBindings::new(&texture, &sampler);
        let config = RasterConfig { width: 4, height: 4, mask: OverlayMask::Full };
        let out = render_overlay(&bindings, &config).unwrap();

        let scaled = bindings.for_target(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let input = VertexOutput::for_pixel(x, y, 4, 4);
                assert_eq!(out.texel(x, y), shader::fs_main(&input, &scaled), "pixel ({x}, {y})");
                let nearest = sampler.with_filter(FilterMode::Nearest).sample(&texture, input.uv);
                assert_eq!(out.texel(x, y), shader::shade(input.uv, nearest));
            }
        }
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let texture = checker(2, 2);
        let sampler = Sampler::default();
        let bindings = ResourceBindings::new(&texture, &sampler);
        let config = RasterConfig { width: 0, height: 4, mask: OverlayMask::Full };
        assert_eq!(
            render_overlay(&bindings, &config),
            Err(TextureError::ZeroSize { width: 0, height: 4 })
        );
    }
}
