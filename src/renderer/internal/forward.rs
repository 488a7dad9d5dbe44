use std::mem;
use std::num::NonZeroU64;

use bytemuck::Zeroable;

use crate::renderer::internal::buffers::create_buffer;
use crate::renderer::internal::gbuffer::{DEPTH_FORMAT, HDR_FORMAT};
use crate::renderer::internal::{
    draw_mesh, CameraBuffer, DynamicObjectsBuffer, GBuffer, HdrTarget, MaterialBinder, PerFormat,
    PreparedDraw,
};
use crate::renderer::lights::Light;
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::uniforms::ForwardLightsUniform;
use crate::renderer::VertexFormat;

/// Single-pass alternative to the deferred path: every draw is lit by the
/// whole (capped) light list straight into the HDR target.
pub(crate) struct ForwardPass {
    pipelines: PerFormat<wgpu::RenderPipeline>,
    lights_buffer: wgpu::Buffer,
    lights_bind_group: wgpu::BindGroup,
}

impl ForwardPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        camera: &CameraBuffer,
        objects: &DynamicObjectsBuffer,
        materials: &MaterialBinder,
    ) -> Self {
        let lights_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ForwardLightsLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<ForwardLightsUniform>() as u64),
                },
                count: None,
            }],
        });

        let lights_buffer = create_buffer(
            device,
            "ForwardLightsBuffer",
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            bytemuck::bytes_of(&ForwardLightsUniform::zeroed()),
        );

        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ForwardLightsBindGroup"),
            layout: &lights_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ForwardPipelineLayout"),
            bind_group_layouts: &[
                &camera.bind_layout,
                &objects.bind_layout,
                &materials.bind_layout,
                &lights_layout,
            ],
            push_constant_ranges: &[],
        });

        let pipelines = PerFormat::new(|format| {
            let (vertex_entry, fragment_entry) = match format {
                VertexFormat::PosTex => ("vs_pos_tex", "fs_pos_tex"),
                VertexFormat::PosNormTex | VertexFormat::PosNormTanBitanTex => ("vs_main", "fs_main"),
            };
            PipelineBuilder::new(device, &layout, shader)
                .with_label("ForwardPipeline")
                .with_entry_points(vertex_entry, fragment_entry)
                .with_vertex_buffer(format.layout())
                .with_targets(&[HDR_FORMAT])
                .with_depth(DEPTH_FORMAT, wgpu::CompareFunction::Less)
                .build()
        });

        Self {
            pipelines,
            lights_buffer,
            lights_bind_group,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        hdr: &HdrTarget,
        gbuffer: &GBuffer,
        camera: &CameraBuffer,
        objects: &DynamicObjectsBuffer,
        materials: &MaterialBinder,
        draws: &[PreparedDraw<'_>],
        lights: &[Light],
    ) {
        let uniform = ForwardLightsUniform::new(lights);
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(&uniform));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ForwardPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: hdr.view(),
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &camera.bind_group, &[]);
        pass.set_bind_group(1, &objects.bind_group, &[]);
        pass.set_bind_group(3, &self.lights_bind_group, &[]);

        for draw in draws {
            let Some(material) = materials.get(&draw.material) else {
                continue;
            };
            pass.set_pipeline(self.pipelines.get(draw.mesh.vertex_format()));
            pass.set_bind_group(2, material, &[]);
            draw_mesh(&mut pass, draw.mesh, draw.instance);
        }
    }
}
