use crate::coords::{fract, ColorRgba, Vec2};

use super::Texture2D;

/// How texel coordinates outside `[0, size)` are resolved.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

impl AddressMode {
    /// Maps an integer texel coordinate into `[0, len)`.
    #[inline]
    fn resolve(self, i: i64, len: u32) -> u32 {
        let n = len as i64;
        let r = match self {
            AddressMode::ClampToEdge => i.clamp(0, n - 1),
            AddressMode::Repeat => i.rem_euclid(n),
            AddressMode::MirrorRepeat => {
                let m = i.rem_euclid(2 * n);
                if m < n { m } else { 2 * n - 1 - m }
            }
        };
        r as u32
    }

    pub fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

impl FilterMode {
    pub fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// CPU sampler with the same addressing and filtering rules as a wgpu sampler
/// on a single-mip texture.
///
/// The default is linear filtering with clamp-to-edge addressing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sampler {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
}

impl Sampler {
    /// Nearest filtering, clamp-to-edge. Keeps pixel art sharp.
    pub const fn nearest_clamp() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
        }
    }

    pub const fn linear_clamp() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
        }
    }

    pub const fn linear_repeat() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
        }
    }

    /// Same address mode on both axes.
    pub const fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode_u = mode;
        self.address_mode_v = mode;
        self
    }

    /// Same filter for magnification and minification.
    pub const fn with_filter(mut self, filter: FilterMode) -> Self {
        self.mag_filter = filter;
        self.min_filter = filter;
        self
    }

    /// Equivalent wgpu sampler descriptor.
    pub fn to_wgpu(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("vignoise overlay sampler"),
            address_mode_u: self.address_mode_u.to_wgpu(),
            address_mode_v: self.address_mode_v.to_wgpu(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter.to_wgpu(),
            min_filter: self.min_filter.to_wgpu(),
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }
    }

    /// Samples `texture` at `uv` with the magnification filter.
    #[inline]
    pub fn sample(&self, texture: &Texture2D, uv: Vec2) -> ColorRgba {
        self.sample_filtered(texture, uv, self.mag_filter)
    }

    /// Samples with the filter a GPU would pick for the given footprint:
    /// `texels_per_pixel > 1` is minification.
    #[inline]
    pub fn sample_scaled(&self, texture: &Texture2D, uv: Vec2, texels_per_pixel: f32) -> ColorRgba {
        let filter = if texels_per_pixel > 1.0 { self.min_filter } else { self.mag_filter };
        self.sample_filtered(texture, uv, filter)
    }

    fn sample_filtered(&self, texture: &Texture2D, uv: Vec2, filter: FilterMode) -> ColorRgba {
        let (w, h) = (texture.width(), texture.height());
        let tu = uv.x * w as f32;
        let tv = uv.y * h as f32;

        match filter {
            FilterMode::Nearest => {
                // Float-to-int casts saturate and map NaN to 0.
                let x = self.address_mode_u.resolve(tu.floor() as i64, w);
                let y = self.address_mode_v.resolve(tv.floor() as i64, h);
                texture.texel(x, y)
            }
            FilterMode::Linear => {
                let (tu, tv) = (tu - 0.5, tv - 0.5);
                let (x0, y0) = (tu.floor() as i64, tv.floor() as i64);
                let (fx, fy) = (fract(tu), fract(tv));
                // NaN weights would poison every channel; fall back to the base texel.
                let (fx, fy) = (
                    if fx.is_finite() { fx } else { 0.0 },
                    if fy.is_finite() { fy } else { 0.0 },
                );

                let xa = self.address_mode_u.resolve(x0, w);
                let xb = self.address_mode_u.resolve(x0.saturating_add(1), w);
                let ya = self.address_mode_v.resolve(y0, h);
                let yb = self.address_mode_v.resolve(y0.saturating_add(1), h);

                let top = texture.texel(xa, ya).lerp(texture.texel(xb, ya), fx);
                let bottom = texture.texel(xa, yb).lerp(texture.texel(xb, yb), fx);
                top.lerp(bottom, fy)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_4x1() -> Texture2D {
        Texture2D::from_fn(4, 1, |x, _| ColorRgba::new(x as f32, 0.0, 0.0, 1.0)).unwrap()
    }

    // ── addressing ────────────────────────────────────────────────────────

    #[test]
    fn clamp_pins_to_edges() {
        assert_eq!(AddressMode::ClampToEdge.resolve(-3, 4), 0);
        assert_eq!(AddressMode::ClampToEdge.resolve(9, 4), 3);
    }

    #[test]
    fn repeat_wraps_both_directions() {
        assert_eq!(AddressMode::Repeat.resolve(5, 4), 1);
        assert_eq!(AddressMode::Repeat.resolve(-1, 4), 3);
    }

    #[test]
    fn mirror_reflects_every_period() {
        let got: Vec<u32> = (-4..8).map(|i| AddressMode::MirrorRepeat.resolve(i, 4)).collect();
        assert_eq!(got, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
    }

    #[test]
    fn extreme_coordinates_do_not_panic() {
        for mode in [AddressMode::ClampToEdge, AddressMode::Repeat, AddressMode::MirrorRepeat] {
            assert!(mode.resolve(i64::MIN, 7) < 7);
            assert!(mode.resolve(i64::MAX, 7) < 7);
        }
    }

    // ── filtering ─────────────────────────────────────────────────────────

    #[test]
    fn nearest_picks_covering_texel() {
        let t = gradient_4x1();
        let s = Sampler::nearest_clamp();
        assert_eq!(s.sample(&t, Vec2::new(0.0, 0.5)).r, 0.0);
        assert_eq!(s.sample(&t, Vec2::new(0.3, 0.5)).r, 1.0);
        assert_eq!(s.sample(&t, Vec2::new(0.99, 0.5)).r, 3.0);
    }

    #[test]
    fn linear_hits_texel_centers_exactly() {
        let t = gradient_4x1();
        let s = Sampler::linear_clamp();
        // Center of texel 1 is u = 1.5 / 4.
        assert_eq!(s.sample(&t, Vec2::new(0.375, 0.5)).r, 1.0);
    }

    #[test]
    fn linear_blends_between_centers() {
        let t = gradient_4x1();
        let s = Sampler::linear_clamp();
        // Halfway between the centers of texels 1 and 2.
        assert_eq!(s.sample(&t, Vec2::new(0.5, 0.5)).r, 1.5);
    }

    #[test]
    fn out_of_range_uv_follows_address_mode() {
        let t = gradient_4x1();
        let clamp = Sampler::nearest_clamp();
        let repeat = Sampler::nearest_clamp().with_address_mode(AddressMode::Repeat);
        assert_eq!(clamp.sample(&t, Vec2::new(1.3, 0.5)).r, 3.0);
        assert_eq!(repeat.sample(&t, Vec2::new(1.3, 0.5)).r, 1.0);
    }

    #[test]
    fn nan_uv_still_samples() {
        let t = gradient_4x1();
        for s in [Sampler::nearest_clamp(), Sampler::linear_clamp()] {
            assert!(s.sample(&t, Vec2::new(f32::NAN, f32::NAN)).is_finite());
        }
    }

    #[test]
    fn minification_uses_min_filter() {
        let t = gradient_4x1();
        let s = Sampler {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Nearest,
            ..Sampler::default()
        };
        let uv = Vec2::new(0.5, 0.5);
        assert_eq!(s.sample_scaled(&t, uv, 2.0).r, 2.0);
        assert_eq!(s.sample_scaled(&t, uv, 0.5).r, 1.5);
    }
}
