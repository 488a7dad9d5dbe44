use bytemuck::{Pod, Zeroable};

use crate::asset::Mesh;
use crate::renderer::internal::buffers::create_buffer;
use crate::renderer::internal::gbuffer::unfiltered_texture_entry;
use crate::renderer::internal::{draw_mesh, GBuffer, HdrTarget};
use crate::renderer::pipeline_builder::{Culling, PipelineBuilder};
use crate::renderer::VertexFormat;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq, Eq)]
struct PresentParams {
    /// x debug view, y apply gamma in the shader
    flags: [u32; 4],
}

/// Tone-maps the HDR target into the output, or shows the G-buffer in four
/// quadrants when debug graphics are on.
pub(crate) struct PresentPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    encode_gamma: bool,
}

impl PresentPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        output_format: wgpu::TextureFormat,
        hdr: &HdrTarget,
        gbuffer: &GBuffer,
    ) -> Self {
        let visibility = wgpu::ShaderStages::FRAGMENT;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("PresentBindLayout"),
            entries: &[
                unfiltered_texture_entry(0, visibility),
                unfiltered_texture_entry(1, visibility),
                unfiltered_texture_entry(2, visibility),
                unfiltered_texture_entry(3, visibility),
                unfiltered_texture_entry(4, visibility),
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let params_buffer = create_buffer(
            device,
            "PresentParamsBuffer",
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            bytemuck::bytes_of(&PresentParams::zeroed()),
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("PresentPipelineLayout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = PipelineBuilder::new(device, &pipeline_layout, shader)
            .with_label("PresentPipeline")
            .with_vertex_buffer(VertexFormat::PosTex.layout())
            .with_targets(&[output_format])
            .with_culling(Culling::None)
            .build();

        let bind_group = Self::create_bind_group(device, &layout, &params_buffer, hdr, gbuffer);

        Self {
            pipeline,
            layout,
            bind_group,
            params_buffer,
            encode_gamma: !output_format.is_srgb(),
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        params: &wgpu::Buffer,
        hdr: &HdrTarget,
        gbuffer: &GBuffer,
    ) -> wgpu::BindGroup {
        let views = [
            hdr.view(),
            &gbuffer.albedo.view,
            &gbuffer.normal.view,
            &gbuffer.specular.view,
            &gbuffer.linear_depth.view,
        ];
        let mut entries: Vec<wgpu::BindGroupEntry<'_>> = views
            .into_iter()
            .enumerate()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: 5,
            resource: params.as_entire_binding(),
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("PresentBindGroup"),
            layout,
            entries: &entries,
        })
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, hdr: &HdrTarget, gbuffer: &GBuffer) {
        self.bind_group =
            Self::create_bind_group(device, &self.layout, &self.params_buffer, hdr, gbuffer);
    }

    pub(crate) fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
        fullscreen: &Mesh,
        debug_view: bool,
    ) {
        let params = PresentParams {
            flags: [debug_view as u32, self.encode_gamma as u32, 0, 0],
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("PresentPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        draw_mesh(&mut pass, fullscreen, 0);
    }
}
