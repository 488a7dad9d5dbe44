use crate::renderer::internal::gbuffer::{DEPTH_FORMAT, GBUFFER_FORMATS};
use crate::renderer::internal::{
    draw_mesh, CameraBuffer, DynamicObjectsBuffer, GBuffer, MaterialBinder, PerFormat, PreparedDraw,
};
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::VertexFormat;

fn entry_points(format: VertexFormat) -> (&'static str, &'static str) {
    match format {
        VertexFormat::PosNormTex => ("vs_main", "fs_main"),
        VertexFormat::PosTex => ("vs_pos_tex", "fs_pos_tex"),
        VertexFormat::PosNormTanBitanTex => ("vs_tangent", "fs_normal_mapped"),
    }
}

fn clear_target(view: &wgpu::TextureView) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        depth_slice: None,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        },
    })
}

/// Fills the G-buffer. One pipeline per vertex format.
pub(crate) struct GeometryPass {
    pipelines: PerFormat<wgpu::RenderPipeline>,
}

impl GeometryPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        camera: &CameraBuffer,
        objects: &DynamicObjectsBuffer,
        materials: &MaterialBinder,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GeometryPipelineLayout"),
            bind_group_layouts: &[
                &camera.bind_layout,
                &objects.bind_layout,
                &materials.bind_layout,
            ],
            push_constant_ranges: &[],
        });

        let pipelines = PerFormat::new(|format| {
            let (vertex_entry, fragment_entry) = entry_points(format);
            PipelineBuilder::new(device, &layout, shader)
                .with_label("GeometryPipeline")
                .with_entry_points(vertex_entry, fragment_entry)
                .with_vertex_buffer(format.layout())
                .with_targets(&GBUFFER_FORMATS)
                .with_depth(DEPTH_FORMAT, wgpu::CompareFunction::Less)
                .build()
        });

        Self { pipelines }
    }

    pub(crate) fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        gbuffer: &GBuffer,
        camera: &CameraBuffer,
        objects: &DynamicObjectsBuffer,
        materials: &MaterialBinder,
        draws: &[PreparedDraw<'_>],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GeometryPass"),
            color_attachments: &[
                clear_target(&gbuffer.albedo.view),
                clear_target(&gbuffer.normal.view),
                clear_target(&gbuffer.specular.view),
                clear_target(&gbuffer.linear_depth.view),
            ],
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

        for draw in draws {
            let Some(material) = materials.get(&draw.material) else {
                log::warn!("Material bind group missing for draw {}", draw.instance);
                continue;
            };
            pass.set_pipeline(self.pipelines.get(draw.mesh.vertex_format()));
            pass.set_bind_group(2, material, &[]);
            draw_mesh(&mut pass, draw.mesh, draw.instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangent_meshes_use_the_normal_mapped_program() {
        assert_eq!(
            entry_points(VertexFormat::PosNormTanBitanTex),
            ("vs_tangent", "fs_normal_mapped")
        );
        assert_eq!(entry_points(VertexFormat::PosTex).0, "vs_pos_tex");
    }
}
