use glam::Vec3;

use crate::asset::Mesh;
use crate::renderer::internal::gbuffer::HDR_FORMAT;
use crate::renderer::internal::{
    draw_mesh, CameraBuffer, GBuffer, HdrTarget, LightUniformBuffer, ShadowResources,
};
use crate::renderer::lights::{cull_face_for, Light};
use crate::renderer::pipeline_builder::{Culling, PipelineBuilder};
use crate::renderer::uniforms::LightUniform;
use crate::renderer::VertexFormat;

/// Accumulates one additive draw per light into the HDR target, reading
/// surface data back out of the G-buffer.
pub(crate) struct LightingPass {
    directional: wgpu::RenderPipeline,
    volume_outside: wgpu::RenderPipeline,
    volume_inside: wgpu::RenderPipeline,
    gbuffer_layout: wgpu::BindGroupLayout,
    gbuffer_bind_group: wgpu::BindGroup,
    lights: LightUniformBuffer,
    scratch: Vec<LightUniform>,
}

impl LightingPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        camera: &CameraBuffer,
        shadows: &ShadowResources,
        gbuffer: &GBuffer,
    ) -> Self {
        let gbuffer_layout = GBuffer::read_layout(device, wgpu::ShaderStages::FRAGMENT);
        let gbuffer_bind_group = gbuffer.read_bind_group(device, &gbuffer_layout);
        let lights = LightUniformBuffer::new(device, 16);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("LightingPipelineLayout"),
            bind_group_layouts: &[
                &camera.bind_layout,
                &gbuffer_layout,
                &lights.bind_layout,
                &shadows.sample_layout,
            ],
            push_constant_ranges: &[],
        });

        let directional = PipelineBuilder::new(device, &layout, shader)
            .with_label("DirectionalLightPipeline")
            .with_vertex_entry("vs_fullscreen")
            .with_vertex_buffer(VertexFormat::PosTex.position_layout())
            .with_additive_target(HDR_FORMAT)
            .with_culling(Culling::None)
            .build();

        let volume = |label: &'static str, cull: wgpu::Face| {
            PipelineBuilder::new(device, &layout, shader)
                .with_label(label)
                .with_vertex_entry("vs_volume")
                .with_vertex_buffer(VertexFormat::PosNormTex.position_layout())
                .with_additive_target(HDR_FORMAT)
                .with_culling(Culling::InsideOut(cull))
                .build()
        };

        Self {
            directional,
            volume_outside: volume("LightVolumeOutsidePipeline", wgpu::Face::Front),
            volume_inside: volume("LightVolumeInsidePipeline", wgpu::Face::Back),
            gbuffer_layout,
            gbuffer_bind_group,
            lights,
            scratch: Vec::new(),
        }
    }

    /// Rebinds the G-buffer after its targets were reallocated.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, gbuffer: &GBuffer) {
        self.gbuffer_bind_group = gbuffer.read_bind_group(device, &self.gbuffer_layout);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        hdr: &HdrTarget,
        camera: &CameraBuffer,
        shadows: &ShadowResources,
        meshes: LightMeshes<'_>,
        lights: &[Light],
        shadow_matrix: Option<glam::Mat4>,
        eye: Vec3,
    ) {
        self.scratch.clear();
        self.scratch.extend(lights.iter().enumerate().map(|(index, light)| {
            let casts = if index == 0 { shadow_matrix } else { None };
            LightUniform::new(light, casts)
        }));
        self.lights.update(device, queue, &self.scratch);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("LightingPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: hdr.view(),
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

        pass.set_bind_group(0, &camera.bind_group, &[]);
        pass.set_bind_group(1, &self.gbuffer_bind_group, &[]);
        pass.set_bind_group(3, &shadows.sample_bind_group, &[]);

        for (index, light) in lights.iter().enumerate() {
            pass.set_bind_group(2, &self.lights.bind_group, &[LightUniformBuffer::offset(index)]);
            match cull_face_for(light, eye) {
                None => {
                    pass.set_pipeline(&self.directional);
                    draw_mesh(&mut pass, meshes.fullscreen, 0);
                }
                Some(face) => {
                    let pipeline = match face {
                        wgpu::Face::Back => &self.volume_inside,
                        wgpu::Face::Front => &self.volume_outside,
                    };
                    pass.set_pipeline(pipeline);
                    draw_mesh(&mut pass, meshes.volume, 0);
                }
            }
        }

        log::debug!("Lighting pass: {} lights", lights.len());
    }
}

/// Geometry drawn by the lighting pass itself.
#[derive(Clone, Copy)]
pub(crate) struct LightMeshes<'a> {
    pub(crate) fullscreen: &'a Mesh,
    pub(crate) volume: &'a Mesh,
}
