//! CPU textures and samplers.
//!
//! These mirror the two resources the overlay shader reads: a 2D float texture
//! and a sampler. Both are immutable after construction and `Sync`, so a single
//! instance can back every invocation of a parallel draw.

mod error;
mod sampler;
mod texture2d;

pub use error::TextureError;
pub use sampler::{AddressMode, FilterMode, Sampler};
pub use texture2d::Texture2D;
