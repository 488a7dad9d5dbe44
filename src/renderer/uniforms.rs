// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::lights::Light;
use crate::renderer::material::Material;

pub const MAX_FORWARD_LIGHTS: usize = 16;

/// Dynamic uniform offsets must be multiples of the device's
/// `min_uniform_buffer_offset_alignment`, which is at most 256.
pub const LIGHT_UNIFORM_STRIDE: u64 = 256;

pub const LIGHT_KIND_DIRECTIONAL: u32 = 0;
pub const LIGHT_KIND_POINT: u32 = 1;
pub const LIGHT_KIND_SPOT: u32 = 2;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    /// width, height, 1/width, 1/height
    pub viewport: [f32; 4],
}

impl CameraUniform {
    pub fn new(view: Mat4, proj: Mat4, width: u32, height: u32) -> Self {
        let inv_view = view.inverse();
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            view_proj: (proj * view).to_cols_array_2d(),
            inv_view: inv_view.to_cols_array_2d(),
            inv_proj: proj.inverse().to_cols_array_2d(),
            position: inv_view.transform_point3(Vec3::ZERO).extend(1.0).to_array(),
            viewport: [width, height, 1.0 / width, 1.0 / height],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, 1, 1)
    }
}

/// Per-draw data, stored in a storage buffer and indexed by instance.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ObjectData {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// specular colour rgb, specular exponent
    pub specular: [f32; 4],
    /// x: specular coefficient
    pub params: [f32; 4],
}

impl ObjectData {
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            specular: material
                .specular_color
                .extend(material.specular_exponent)
                .to_array(),
            params: [material.specular_coefficient, 0.0, 0.0, 0.0],
        }
    }
}

/// One light draw of the lighting pass.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct LightUniform {
    pub model: [[f32; 4]; 4],
    pub shadow_matrix: [[f32; 4]; 4],
    /// xyz position, w radius
    pub position_radius: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// x inner cone cosine, y outer cone cosine
    pub cone: [f32; 4],
    /// x kind, y casts shadow
    pub flags: [u32; 4],
}

impl LightUniform {
    pub fn new(light: &Light, shadow_matrix: Option<Mat4>) -> Self {
        let mut raw = Self::zeroed();
        raw.model = light.volume_transform().to_cols_array_2d();
        raw.shadow_matrix = shadow_matrix.unwrap_or(Mat4::IDENTITY).to_cols_array_2d();
        raw.color = light.color().extend(1.0).to_array();
        raw.flags[1] = shadow_matrix.is_some() as u32;

        match *light {
            Light::Directional { direction, .. } => {
                raw.direction = direction.extend(0.0).to_array();
                raw.flags[0] = LIGHT_KIND_DIRECTIONAL;
            }
            Light::Point {
                position, radius, ..
            } => {
                raw.position_radius = position.extend(radius).to_array();
                raw.flags[0] = LIGHT_KIND_POINT;
            }
            Light::Spot {
                position,
                direction,
                radius,
                inner_cos,
                outer_cos,
                ..
            } => {
                raw.position_radius = position.extend(radius).to_array();
                raw.direction = direction.extend(0.0).to_array();
                raw.cone = [inner_cos, outer_cos, 0.0, 0.0];
                raw.flags[0] = LIGHT_KIND_SPOT;
            }
        }

        raw
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ForwardLight {
    pub position_radius: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub cone: [f32; 4],
    pub kind: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ForwardLightsUniform {
    pub count: [u32; 4],
    pub lights: [ForwardLight; MAX_FORWARD_LIGHTS],
}

impl ForwardLightsUniform {
    pub fn new(lights: &[Light]) -> Self {
        if lights.len() > MAX_FORWARD_LIGHTS {
            log::debug!(
                "Forward path takes {} of {} lights",
                MAX_FORWARD_LIGHTS,
                lights.len()
            );
        }

        let mut raw = Self::zeroed();
        for (slot, light) in raw.lights.iter_mut().zip(lights) {
            let full = LightUniform::new(light, None);
            *slot = ForwardLight {
                position_radius: full.position_radius,
                direction: full.direction,
                color: full.color,
                cone: full.cone,
                kind: [full.flags[0], 0, 0, 0],
            };
        }
        raw.count[0] = lights.len().min(MAX_FORWARD_LIGHTS) as u32;
        raw
    }
}
