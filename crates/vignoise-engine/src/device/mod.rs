//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - exposing them to renderers and offscreen passes

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;
