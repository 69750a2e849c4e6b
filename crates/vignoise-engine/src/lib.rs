//! Vignoise engine crate.
//!
//! A radial sawtooth falloff with sine-hash grain, applied per pixel to a
//! sampled texture. The same fragment function exists twice:
//! - as WGSL (`render`), drawn by wgpu on a device from `device`
//! - as plain Rust (`shader`), driven by the parallel software rasterizer in `raster`
//!
//! Both read their inputs through the binding contract in `bindings`.

pub mod bindings;
pub mod coords;
pub mod device;
pub mod logging;
pub mod offscreen;
pub mod raster;
pub mod render;
pub mod shader;
pub mod texture;
