use anyhow::{anyhow, Result};
use wgpu::naga;
use wgpu::util::DeviceExt;

use crate::bindings::{FRAGMENT_ENTRY, RESOURCE_GROUP, SAMPLER_BINDING, TEXTURE_BINDING, VERTEX_ENTRY};
use crate::render::{RenderCtx, RenderTarget};
use crate::texture::Sampler;

use super::common::{QuadVertex, QUAD_INDICES, QUAD_VERTICES};

/// WGSL source of the overlay (`vs_main` + `fs_main`).
pub const NOISE_OVERLAY_WGSL: &str = include_str!("shaders/noise_overlay.wgsl");

/// Parses and validates [`NOISE_OVERLAY_WGSL`] without a device.
///
/// Errors carry naga's annotated diagnostics.
pub fn validate_wgsl() -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(NOISE_OVERLAY_WGSL).map_err(|e| {
        anyhow!("noise overlay WGSL failed to parse:\n{}", e.emit_to_string(NOISE_OVERLAY_WGSL))
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| {
        anyhow!("noise overlay WGSL failed validation:\n{}", e.emit_to_string(NOISE_OVERLAY_WGSL))
    })?;

    Ok(module)
}

/// Draws the noise overlay of a bound source texture over a whole target.
///
/// Pipeline creation is lazy and keyed on the target format. The source is
/// bound with [`set_source`](Self::set_source); until then `render` draws
/// nothing (one-time warning).
///
/// Fragment output is written as-is (no blending), so the target ends up
/// holding exactly what `fs_main` returns.
#[derive(Default)]
pub struct NoiseOverlayRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    // group 0 is reserved for host draw parameters and stays empty here
    host_bgl: Option<wgpu::BindGroupLayout>,
    host_bind_group: Option<wgpu::BindGroup>,
    resource_bgl: Option<wgpu::BindGroupLayout>,
    resource_bind_group: Option<wgpu::BindGroup>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    warned_unbound: bool,
}

impl NoiseOverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `source` and a sampler built from `sampler` at group 1.
    ///
    /// The view must be a filterable float 2D texture (e.g. `Rgba8Unorm`).
    pub fn set_source(&mut self, ctx: &RenderCtx<'_>, source: &wgpu::TextureView, sampler: &Sampler) {
        self.ensure_layouts(ctx);
        let Some(bgl) = self.resource_bgl.as_ref() else { return };

        let gpu_sampler = ctx.device.create_sampler(&sampler.to_wgpu());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vignoise overlay resources"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&gpu_sampler),
                },
            ],
        });

        log::debug!("overlay source bound ({sampler:?})");
        self.resource_bind_group = Some(bind_group);
        self.warned_unbound = false;
    }

    /// Clears `target` and draws the overlay over all of it.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.ensure_layouts(ctx);
        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);

        if self.resource_bind_group.is_none() {
            if !self.warned_unbound {
                log::warn!("NoiseOverlayRenderer: no source bound; skipping draw");
                self.warned_unbound = true;
            }
            return;
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(host_bind_group) = self.host_bind_group.as_ref() else { return };
        let Some(resource_bind_group) = self.resource_bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vignoise overlay pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, host_bind_group, &[]);
        rpass.set_bind_group(RESOURCE_GROUP, resource_bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.host_bgl.is_some() && self.resource_bgl.is_some() {
            return;
        }

        let host_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vignoise host bgl"),
            entries: &[],
        });
        let host_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vignoise host bind group"),
            layout: &host_bgl,
            entries: &[],
        });

        let resource_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vignoise overlay resource bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        self.host_bgl = Some(host_bgl);
        self.host_bind_group = Some(host_bind_group);
        self.resource_bgl = Some(resource_bgl);

        // Layouts changed; anything derived from them is stale.
        self.pipeline = None;
        self.pipeline_format = None;
        self.resource_bind_group = None;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format) && self.pipeline.is_some() {
            return;
        }
        let Some(host_bgl) = self.host_bgl.as_ref() else { return };
        let Some(resource_bgl) = self.resource_bgl.as_ref() else { return };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vignoise overlay shader"),
            source: wgpu::ShaderSource::Wgsl(NOISE_OVERLAY_WGSL.into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vignoise overlay pipeline layout"),
            bind_group_layouts: &[host_bgl, resource_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vignoise overlay pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("overlay pipeline built for {:?}", ctx.target_format);
        self.pipeline_format = Some(ctx.target_format);
        self.pipeline = Some(pipeline);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }
        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vignoise overlay quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vignoise overlay quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}
