pub mod buffers;
pub mod context;
pub mod forward;
pub mod gbuffer;
pub mod geometry;
pub mod lighting;
pub mod materials;
pub mod present;
pub mod shadows;

pub(crate) use buffers::{CameraBuffer, DynamicObjectsBuffer, LightUniformBuffer};
pub(crate) use context::RenderContext;
pub(crate) use forward::ForwardPass;
pub(crate) use gbuffer::{GBuffer, HdrTarget};
pub(crate) use geometry::GeometryPass;
pub(crate) use lighting::LightingPass;
pub(crate) use materials::MaterialBinder;
pub(crate) use present::PresentPass;
pub(crate) use shadows::ShadowResources;

use crate::asset::Mesh;
use crate::renderer::VertexFormat;

/// One value per vertex format, for pipelines that must match a mesh's
/// vertex layout.
pub(crate) struct PerFormat<T> {
    pos_norm_tex: T,
    pos_tex: T,
    tangent: T,
}

impl<T> PerFormat<T> {
    pub(crate) fn new(mut make: impl FnMut(VertexFormat) -> T) -> Self {
        Self {
            pos_norm_tex: make(VertexFormat::PosNormTex),
            pos_tex: make(VertexFormat::PosTex),
            tangent: make(VertexFormat::PosNormTanBitanTex),
        }
    }

    pub(crate) fn get(&self, format: VertexFormat) -> &T {
        match format {
            VertexFormat::PosNormTex => &self.pos_norm_tex,
            VertexFormat::PosTex => &self.pos_tex,
            VertexFormat::PosNormTanBitanTex => &self.tangent,
        }
    }
}

/// A draw that survived handle validation, with its slot in the objects
/// storage buffer.
#[derive(Clone, Copy)]
pub(crate) struct PreparedDraw<'a> {
    pub(crate) mesh: &'a Mesh,
    pub(crate) material: crate::renderer::material::TextureKey,
    pub(crate) instance: u32,
}

pub(crate) fn draw_mesh(pass: &mut wgpu::RenderPass<'_>, mesh: &Mesh, instance: u32) {
    pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
    pass.set_index_buffer(mesh.index_buffer().slice(..), mesh.index_format());
    pass.draw_indexed(0..mesh.index_count(), 0, instance..instance + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_format_builds_one_value_per_layout() {
        let strides = PerFormat::new(|format| format.stride());
        for format in VertexFormat::ALL {
            assert_eq!(*strides.get(format), format.stride());
        }
    }
}
