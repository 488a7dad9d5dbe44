pub mod commands;
pub(crate) mod internal;
pub mod lights;
pub mod material;
pub mod pipeline_builder;
pub mod primitives;
pub mod readback;
pub mod renderer_core;
pub mod shader;
pub mod tangents;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use commands::{FrameCommands, RenderCommand};
pub use internal::gbuffer::TargetStatus;
pub use lights::Light;
pub use material::Material;
pub use readback::{RenderTarget, TargetImage};
pub use renderer_core::{FramePhase, PipelineMode, RenderFlags, Renderer, RendererStats};
pub use texture::Texture;
pub use vertex::{TangentVertex, TexturedVertex, Vertex, VertexFormat};
