//! wgpu Shadow Target
//!
//! A ready-made [`ShadowTarget`] for wgpu backends. It owns the transient
//! atlas depth textures and a dynamic-offset uniform buffer holding one
//! view-projection matrix per tile, and encodes one render pass per atlas
//! with a viewport per tile. Actual caster rasterization is delegated to the
//! host through [`CasterRenderer`], since pipelines and geometry live there.
//!
//! Atlas textures exist only between `prepare_atlases` and `release`; when
//! no light was reserved the directional atlas shrinks to a 1×1 placeholder
//! and the other atlas aliases it, so the shading stage's bindings are
//! always valid.

use log::trace;

use super::target::{AtlasKind, DepthConvention, ShadowDrawCall, ShadowTarget};

/// Depth format of the shadow atlases.
pub const SHADOW_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Host hook that records draw commands for one tile's shadow casters.
pub trait CasterRenderer {
    /// Bind group 0 already holds the tile's view-projection matrix at the
    /// supplied dynamic offset. The pipeline the host sets must apply
    /// `call.slope_scale_bias` as its depth-bias state and reset it for
    /// subsequent non-shadow work.
    fn draw_casters(&mut self, pass: &mut wgpu::RenderPass<'_>, call: &ShadowDrawCall);
}

struct AtlasTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: u32,
}

fn create_atlas_texture(device: &wgpu::Device, label: &str, size: u32) -> AtlasTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SHADOW_MAP_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    AtlasTexture {
        _texture: texture,
        view,
        size,
    }
}

/// [`ShadowTarget`] implementation over a wgpu device.
pub struct WgpuShadowTarget<R: CasterRenderer> {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: R,
    depth_convention: DepthConvention,

    tile_uniform_buffer: wgpu::Buffer,
    tile_uniform_capacity: u32,
    tile_uniform_stride: u32,
    tile_bind_group_layout: wgpu::BindGroupLayout,
    tile_bind_group: wgpu::BindGroup,

    directional: Option<AtlasTexture>,
    other: Option<AtlasTexture>,
    calls: Vec<ShadowDrawCall>,
}

impl<R: CasterRenderer> WgpuShadowTarget<R> {
    const MATRIX_SIZE: u64 = std::mem::size_of::<glam::Mat4>() as u64;

    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderer: R,
        depth_convention: DepthConvention,
    ) -> Self {
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(Self::MATRIX_SIZE as u32, min_alignment);

        let tile_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Tile BindGroup Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(Self::MATRIX_SIZE),
                    },
                    count: None,
                }],
            });

        let tile_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Tile Uniform Buffer"),
            size: u64::from(stride),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let tile_bind_group = Self::create_tile_bind_group(
            device,
            &tile_bind_group_layout,
            &tile_uniform_buffer,
        );

        Self {
            device: device.clone(),
            queue: queue.clone(),
            renderer,
            depth_convention,
            tile_uniform_buffer,
            tile_uniform_capacity: 1,
            tile_uniform_stride: stride,
            tile_bind_group_layout,
            tile_bind_group,
            directional: None,
            other: None,
            calls: Vec::new(),
        }
    }

    /// The uniform bind group layout, for host pipeline-layout creation.
    #[must_use]
    pub fn tile_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.tile_bind_group_layout
    }

    /// View of the directional atlas, present between prepare and release.
    #[must_use]
    pub fn directional_atlas_view(&self) -> Option<&wgpu::TextureView> {
        self.directional.as_ref().map(|atlas| &atlas.view)
    }

    /// View of the other-light atlas; aliases the directional atlas when no
    /// other light was reserved.
    #[must_use]
    pub fn other_atlas_view(&self) -> Option<&wgpu::TextureView> {
        self.other
            .as_ref()
            .or(self.directional.as_ref())
            .map(|atlas| &atlas.view)
    }

    fn create_tile_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Tile BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(Self::MATRIX_SIZE),
                }),
            }],
        })
    }

    fn ensure_tile_uniform_capacity(&mut self, required_count: u32) {
        if required_count <= self.tile_uniform_capacity {
            return;
        }

        let mut capacity = self.tile_uniform_capacity.max(1);
        while capacity < required_count {
            capacity = capacity.saturating_mul(2);
        }

        self.tile_uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Tile Uniform Buffer"),
            size: u64::from(self.tile_uniform_stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.tile_bind_group = Self::create_tile_bind_group(
            &self.device,
            &self.tile_bind_group_layout,
            &self.tile_uniform_buffer,
        );
        self.tile_uniform_capacity = capacity;
    }

    fn upload_tile_matrices(&mut self) {
        let count = self.calls.len() as u32;
        if count == 0 {
            return;
        }
        self.ensure_tile_uniform_capacity(count);

        let stride = self.tile_uniform_stride as usize;
        let mut matrices = vec![0u8; stride * count as usize];
        for (tile, call) in self.calls.iter().enumerate() {
            let view_projection = call.projection * call.view;
            let bytes = bytemuck::bytes_of(&view_projection);
            let offset = tile * stride;
            matrices[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        self.queue
            .write_buffer(&self.tile_uniform_buffer, 0, &matrices);
    }
}

impl<R: CasterRenderer> ShadowTarget for WgpuShadowTarget<R> {
    fn prepare_atlases(&mut self, directional: Option<u32>, other: Option<u32>) {
        self.calls.clear();

        // The directional binding must always be valid; shrink to a 1×1
        // placeholder instead of unbinding.
        let directional_size = directional.unwrap_or(1);
        self.directional = Some(create_atlas_texture(
            &self.device,
            "Directional Shadow Atlas",
            directional_size,
        ));
        self.other =
            other.map(|size| create_atlas_texture(&self.device, "Other Shadow Atlas", size));

        trace!(
            "shadow atlases prepared: directional {directional_size}, other {:?}",
            other
        );
    }

    fn draw(&mut self, call: &ShadowDrawCall) {
        self.calls.push(call.clone());
    }

    fn finish(&mut self) {
        self.upload_tile_matrices();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Shadow Atlas Encoder"),
            });

        for kind in [AtlasKind::Directional, AtlasKind::Other] {
            let atlas = match kind {
                AtlasKind::Directional => self.directional.as_ref(),
                AtlasKind::Other => self.other.as_ref(),
            };
            let Some(atlas) = atlas else {
                continue;
            };

            let pass_desc = wgpu::RenderPassDescriptor {
                label: Some(match kind {
                    AtlasKind::Directional => "Directional Shadow Pass",
                    AtlasKind::Other => "Other Shadow Pass",
                }),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &atlas.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.depth_convention.clear_value()),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            };

            let mut pass = encoder.begin_render_pass(&pass_desc);
            for (tile, call) in self
                .calls
                .iter()
                .enumerate()
                .filter(|(_, call)| call.atlas == kind)
            {
                let viewport = call.viewport;
                debug_assert!(viewport.x + viewport.size <= atlas.size);
                debug_assert!(viewport.y + viewport.size <= atlas.size);
                pass.set_viewport(
                    viewport.x as f32,
                    viewport.y as f32,
                    viewport.size as f32,
                    viewport.size as f32,
                    0.0,
                    1.0,
                );
                let dynamic_offset = tile as u32 * self.tile_uniform_stride;
                pass.set_bind_group(0, &self.tile_bind_group, &[dynamic_offset]);
                self.renderer.draw_casters(&mut pass, call);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn release(&mut self) {
        self.directional = None;
        self.other = None;
        self.calls.clear();
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}
