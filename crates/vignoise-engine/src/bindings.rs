//! Resource binding contract between the overlay shader and its host.
//!
//! The constants here must agree with `render/shaders/noise_overlay.wgsl`;
//! `render::overlay` tests check that against the parsed module.

use crate::coords::{ColorRgba, Vec2, Vec4};
use crate::texture::{Sampler, Texture2D};

/// Bind group holding the overlay's texture and sampler.
pub const RESOURCE_GROUP: u32 = 1;
pub const TEXTURE_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;

/// Inter-stage locations of the vertex output record.
pub const UV_LOCATION: u32 = 0;
pub const COLOR_LOCATION: u32 = 1;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Read-only resources bound for one draw.
#[derive(Debug, Copy, Clone)]
pub struct ResourceBindings<'a> {
    pub texture: &'a Texture2D,
    pub sampler: &'a Sampler,
    /// Source texels covered by one target pixel. Above 1 the sampler's
    /// `min_filter` applies, otherwise `mag_filter`.
    pub texels_per_pixel: f32,
}

impl<'a> ResourceBindings<'a> {
    /// Bindings for a 1:1 draw (magnification filter).
    #[inline]
    pub fn new(texture: &'a Texture2D, sampler: &'a Sampler) -> Self {
        Self { texture, sampler, texels_per_pixel: 1.0 }
    }

    /// Footprint of a draw of the bound texture into a `width × height` target.
    pub fn for_target(mut self, width: u32, height: u32) -> Self {
        self.texels_per_pixel = (self.texture.width() as f32 / width.max(1) as f32)
            .max(self.texture.height() as f32 / height.max(1) as f32);
        self
    }

    /// `textureSample(texture, sampler, uv)`.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> ColorRgba {
        self.sampler.sample_scaled(self.texture, uv, self.texels_per_pixel)
    }
}

/// Vertex-stage output consumed by the fragment entry point.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct VertexOutput {
    /// Clip-space position (`@builtin(position)`).
    pub position: Vec4,
    /// `@location(0)`
    pub uv: Vec2,
    /// `@location(1)`
    pub color: Vec4,
}

impl VertexOutput {
    /// Record a full-target quad interpolates to at the center of pixel `(x, y)`
    /// on a `width × height` target.
    pub fn for_pixel(x: u32, y: u32, width: u32, height: u32) -> Self {
        let uv = Vec2::new(
            (x as f32 + 0.5) / width.max(1) as f32,
            (y as f32 + 0.5) / height.max(1) as f32,
        );
        Self {
            // NDC has +Y up; UV has +V down.
            position: Vec4::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0),
            uv,
            color: Vec4::splat(1.0),
        }
    }
}
