//! GPU rendering of the noise overlay.
//!
//! The renderer owns its GPU resources (pipeline, layouts, quad buffers) and
//! draws one full-target quad per call. The source texture and sampler are
//! bound at group 1 as the shader expects; blend state and what happens to
//! the target afterwards belong to the host.

mod common;
mod ctx;
mod overlay;

pub use ctx::{RenderCtx, RenderTarget};
pub use overlay::{validate_wgsl, NoiseOverlayRenderer, NOISE_OVERLAY_WGSL};
