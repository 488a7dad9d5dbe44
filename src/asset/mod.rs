pub mod cache;
pub mod dds;
pub mod handle;
pub mod loader;
pub mod mesh;
pub mod mesh_file;
pub mod obj;

pub use cache::AssetCache;
pub use handle::Handle;
pub use loader::{AssetErrorPrompt, LogAndCancel, PromptResponse};
pub use mesh::{Mesh, MeshInfo};

use crate::error::{RenderError, RenderResult};
use crate::renderer::Texture;

/// GPU resources owned by the renderer and addressed by generational handles.
#[derive(Default)]
pub struct Assets {
    pub meshes: AssetCache<Mesh>,
    pub textures: AssetCache<Texture>,
}

impl Assets {
    pub fn remove_mesh(&mut self, mesh: Handle<Mesh>) -> RenderResult<Mesh> {
        self.meshes.remove(mesh).ok_or(RenderError::StaleHandle("mesh"))
    }

    pub fn remove_texture(&mut self, texture: Handle<Texture>) -> RenderResult<Texture> {
        self.textures
            .remove(texture)
            .ok_or(RenderError::StaleHandle("texture"))
    }

    /// Live `(meshes, textures)`.
    pub fn live_counts(&self) -> (usize, usize) {
        (self.meshes.len(), self.textures.len())
    }
}
