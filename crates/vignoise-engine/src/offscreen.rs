//! Headless GPU pass: upload a texture, run the overlay, read the result back.

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use crate::coords::ColorRgba;
use crate::device::Gpu;
use crate::render::{NoiseOverlayRenderer, RenderCtx, RenderTarget};
use crate::texture::{Sampler, Texture2D};

/// Source and target format. Unorm (not sRGB) so bytes match the CPU path.
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BYTES_PER_PIXEL: u32 = 4;

/// Renders the overlay of `texture` into a `width × height` target on the GPU.
///
/// The GPU evaluates `sin` with its own precision, so the grain differs from
/// the CPU rasterizer pixel by pixel; the falloff, channel split and alpha match.
pub fn render_offscreen(
    gpu: &Gpu,
    texture: &Texture2D,
    sampler: &Sampler,
    width: u32,
    height: u32,
) -> Result<Texture2D> {
    anyhow::ensure!(width > 0 && height > 0, "target size {width}x{height} has no pixels");

    let device = gpu.device();
    let queue = gpu.queue();

    let max_dim = device.limits().max_texture_dimension_2d;
    anyhow::ensure!(
        texture.width() <= max_dim && texture.height() <= max_dim,
        "source size {}x{} exceeds the GPU texture limit of {max_dim}",
        texture.width(),
        texture.height()
    );
    anyhow::ensure!(
        width <= max_dim && height <= max_dim,
        "target size {width}x{height} exceeds the GPU texture limit of {max_dim}"
    );

    // Rows in a texture-to-buffer copy must be 256-byte aligned.
    let unpadded_row = width
        .checked_mul(BYTES_PER_PIXEL)
        .context("target row size overflows u32")?;
    let padded_row = unpadded_row
        .div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        .checked_mul(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        .context("padded target row size overflows u32")?;
    let readback_size = padded_row as u64 * height as u64;
    anyhow::ensure!(
        readback_size <= device.limits().max_buffer_size,
        "readback buffer of {readback_size} bytes exceeds the GPU buffer limit"
    );

    let source = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("vignoise offscreen source"),
            size: extent(texture.width(), texture.height()),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texture.to_rgba8_bytes(),
    );
    let source_view = source.create_view(&wgpu::TextureViewDescriptor::default());

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("vignoise offscreen target"),
        size: extent(width, height),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("vignoise offscreen readback"),
        size: readback_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let ctx = RenderCtx::for_gpu(gpu, FORMAT);
    let mut renderer = NoiseOverlayRenderer::new();
    renderer.set_source(&ctx, &source_view, sampler);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vignoise offscreen encoder"),
    });
    renderer.render(&ctx, &mut RenderTarget::new(&mut encoder, &target_view));

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        extent(width, height),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        // Send fails only if the receiver is already gone.
        let _ = tx.send(res);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("failed waiting for the GPU")?;
    rx.recv()
        .context("readback map callback never ran")?
        .context("failed to map readback buffer")?;

    let texels = {
        let data = slice.get_mapped_range();
        data.chunks_exact(padded_row as usize)
            .flat_map(|row| row[..unpadded_row as usize].chunks_exact(BYTES_PER_PIXEL as usize))
            .map(|px| ColorRgba::from_rgba8([px[0], px[1], px[2], px[3]]))
            .collect()
    };
    readback.unmap();

    log::debug!("GPU overlay {}x{} -> {width}x{height}", texture.width(), texture.height());
    Ok(Texture2D::new(width, height, texels)?)
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d { width, height, depth_or_array_layers: 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::GpuInit;

    /// `None` on machines without any usable adapter; GPU tests skip there.
    fn gpu() -> Option<Gpu> {
        match Gpu::blocking(GpuInit::default()) {
            Ok(gpu) => Some(gpu),
            Err(e) => {
                eprintln!("skipping GPU test: {e:#}");
                None
            }
        }
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        let Some(gpu) = gpu() else { return };
        let texture = Texture2D::filled(2, 2, ColorRgba::white()).unwrap();
        assert!(render_offscreen(&gpu, &texture, &Sampler::default(), 0, 3).is_err());
    }

    #[test]
    fn target_past_texture_limit_is_an_error() {
        let Some(gpu) = gpu() else { return };
        let texture = Texture2D::filled(2, 2, ColorRgba::white()).unwrap();
        let max_dim = gpu.device().limits().max_texture_dimension_2d;

        let wide = render_offscreen(&gpu, &texture, &Sampler::default(), max_dim + 1, 2);
        assert!(wide.is_err());
        let tall = render_offscreen(&gpu, &texture, &Sampler::default(), 2, max_dim + 1);
        assert!(tall.is_err());
    }

    #[test]
    fn u32_max_width_is_an_error() {
        let Some(gpu) = gpu() else { return };
        let texture = Texture2D::filled(2, 2, ColorRgba::white()).unwrap();
        assert!(render_offscreen(&gpu, &texture, &Sampler::default(), u32::MAX, 1).is_err());
    }

    #[test]
    fn gpu_output_preserves_alpha_and_halves_blue() {
        let Some(gpu) = gpu() else { return };
        let gray = ColorRgba::from_rgba8([200, 200, 200, 128]);
        let texture = Texture2D::filled(16, 16, gray).unwrap();

        // Width 70 forces row padding in the readback buffer.
        let out = render_offscreen(&gpu, &texture, &Sampler::nearest_clamp(), 70, 9).unwrap();
        assert_eq!((out.width(), out.height()), (70, 9));

        for c in out.texels() {
            let [r, g, b, a] = c.to_rgba8();
            assert_eq!(a, 128);
            assert_eq!(r, g);
            // Half the multiplier, up to one step of 8-bit rounding.
            assert!(b as i32 <= (r as i32 + 1) / 2 + 1, "r={r} b={b}");
        }
    }

    #[test]
    fn gpu_center_stays_bright() {
        let Some(gpu) = gpu() else { return };
        let texture = Texture2D::filled(4, 4, ColorRgba::white()).unwrap();
        let out = render_offscreen(&gpu, &texture, &Sampler::nearest_clamp(), 3, 3).unwrap();
        let [r, ..] = out.texel(1, 1).to_rgba8();
        // noise_factor at the center is in [0.5, 1].
        assert!(r >= 127, "center red = {r}");
    }
}
