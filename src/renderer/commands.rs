use glam::Mat4;

use crate::asset::{Handle, Mesh};
use crate::renderer::lights::Light;
use crate::renderer::material::Material;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCommand {
    pub mesh: Handle<Mesh>,
    pub material: Material,
    pub transform: Mat4,
}

/// Draws and lights submitted for the frame being built. The renderer clears
/// it after every `render`, so callers resubmit each frame.
#[derive(Debug, Default)]
pub struct FrameCommands {
    draws: Vec<RenderCommand>,
    lights: Vec<Light>,
}

impl FrameCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_draw(&mut self, command: RenderCommand) {
        self.draws.push(command);
    }

    pub fn push_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn draws(&self) -> &[RenderCommand] {
        &self.draws
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty() && self.lights.is_empty()
    }

    /// Empties both queues but keeps their allocations.
    pub fn clear(&mut self) {
        self.draws.clear();
        self.lights.clear();
    }
}
