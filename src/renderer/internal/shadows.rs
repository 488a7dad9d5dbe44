use std::mem;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::renderer::internal::buffers::create_buffer;
use crate::renderer::internal::{draw_mesh, DynamicObjectsBuffer, PerFormat, PreparedDraw};
use crate::renderer::pipeline_builder::PipelineBuilder;

pub(crate) const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Hardware bias applied while rendering casters, on top of the bias the
/// lighting shader folds into the texture matrix.
const CASTER_DEPTH_BIAS: i32 = 2;
const CASTER_SLOPE_BIAS: f32 = 2.0;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LightViewUniform {
    view_proj: [[f32; 4]; 4],
}

/// Square depth map plus the comparison sampler the lighting pass reads it
/// with.
struct ShadowMap {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    size: u32,
}

impl ShadowMap {
    fn new(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("DirectionalShadowMap"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShadowCompareSampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            _texture: texture,
            sampler,
            size,
        }
    }

    fn sample_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let depth_texture = wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        };
        let compare_sampler = wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison);

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ShadowSampleLayout"),
            entries: &[depth_texture, compare_sampler]
                .into_iter()
                .enumerate()
                .map(|(binding, ty)| wgpu::BindGroupLayoutEntry {
                    binding: binding as u32,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty,
                    count: None,
                })
                .collect::<Vec<_>>(),
        })
    }

    fn sample_bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ShadowSampleBindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn clear_and_begin<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ShadowPass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

/// The single directional shadow map and the depth-only pipelines that fill
/// it, one per vertex format.
pub(crate) struct ShadowResources {
    map: ShadowMap,
    light_view_buffer: wgpu::Buffer,
    light_view_bind_group: wgpu::BindGroup,
    pipelines: PerFormat<wgpu::RenderPipeline>,
    /// Shadow map and comparison sampler as seen by the lighting pass.
    pub(crate) sample_layout: wgpu::BindGroupLayout,
    pub(crate) sample_bind_group: wgpu::BindGroup,
}

impl ShadowResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        objects: &DynamicObjectsBuffer,
        shadow_map_size: u32,
    ) -> Self {
        let map = ShadowMap::new(device, shadow_map_size);
        let sample_layout = ShadowMap::sample_layout(device);
        let sample_bind_group = map.sample_bind_group(device, &sample_layout);

        let light_view_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("LightViewLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<LightViewUniform>() as u64),
                },
                count: None,
            }],
        });
        let light_view_buffer = create_buffer(
            device,
            "LightViewBuffer",
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            bytemuck::bytes_of(&LightViewUniform::zeroed()),
        );
        let light_view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightViewBindGroup"),
            layout: &light_view_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_view_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ShadowPipelineLayout"),
            bind_group_layouts: &[&light_view_layout, &objects.bind_layout],
            push_constant_ranges: &[],
        });
        let pipelines = PerFormat::new(|format| {
            PipelineBuilder::new(device, &pipeline_layout, shader)
                .with_label("ShadowCasterPipeline")
                .depth_only()
                .with_vertex_buffer(format.position_layout())
                .with_depth(SHADOW_FORMAT, wgpu::CompareFunction::LessEqual)
                .with_depth_bias(CASTER_DEPTH_BIAS, CASTER_SLOPE_BIAS)
                .build()
        });

        log::info!("Shadow map: {0}x{0}", shadow_map_size);

        Self {
            map,
            light_view_buffer,
            light_view_bind_group,
            pipelines,
            sample_layout,
            sample_bind_group,
        }
    }

    pub(crate) fn size(&self) -> u32 {
        self.map.size
    }

    /// Renders every draw's depth as seen by the light. Without a caster the
    /// map is only cleared, so every lookup passes.
    pub(crate) fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        objects: &DynamicObjectsBuffer,
        view_proj: Option<Mat4>,
        draws: &[PreparedDraw<'_>],
    ) {
        let mut pass = self.map.clear_and_begin(encoder);
        let Some(view_proj) = view_proj else {
            return;
        };

        let uniform = LightViewUniform {
            view_proj: view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.light_view_buffer, 0, bytemuck::bytes_of(&uniform));

        pass.set_bind_group(0, &self.light_view_bind_group, &[]);
        pass.set_bind_group(1, &objects.bind_group, &[]);
        for draw in draws {
            pass.set_pipeline(self.pipelines.get(draw.mesh.vertex_format()));
            draw_mesh(&mut pass, draw.mesh, draw.instance);
        }
    }
}
