use glam::Vec3;

use crate::asset::Handle;
use crate::renderer::Texture;

/// Surface description for one draw. Texture slots that are `None` fall back
/// to the renderer's built-in 1x1 textures (white albedo, flat normal, white
/// specular).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub albedo: Option<Handle<Texture>>,
    pub normal: Option<Handle<Texture>>,
    pub specular: Option<Handle<Texture>>,
    pub specular_color: Vec3,
    pub specular_exponent: f32,
    pub specular_coefficient: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: None,
            normal: None,
            specular: None,
            specular_color: Vec3::ONE,
            specular_exponent: 32.0,
            specular_coefficient: 0.5,
        }
    }
}

impl Material {
    pub fn textured(albedo: Handle<Texture>) -> Self {
        Self {
            albedo: Some(albedo),
            ..Self::default()
        }
    }

    pub fn with_normal(mut self, normal: Handle<Texture>) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_specular_map(mut self, specular: Handle<Texture>) -> Self {
        self.specular = Some(specular);
        self
    }

    pub fn with_specular(mut self, color: Vec3, exponent: f32, coefficient: f32) -> Self {
        self.specular_color = color;
        self.specular_exponent = exponent;
        self.specular_coefficient = coefficient;
        self
    }

    /// The texture triple that selects a material bind group.
    pub(crate) fn texture_key(&self) -> TextureKey {
        TextureKey {
            albedo: self.albedo,
            normal: self.normal,
            specular: self.specular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TextureKey {
    pub albedo: Option<Handle<Texture>>,
    pub normal: Option<Handle<Texture>>,
    pub specular: Option<Handle<Texture>>,
}

impl TextureKey {
    pub(crate) fn references(&self, texture: Handle<Texture>) -> bool {
        [self.albedo, self.normal, self.specular].contains(&Some(texture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_has_no_textures() {
        let material = Material::default();
        assert!(material.albedo.is_none());
        assert!(material.normal.is_none());
        assert!(material.specular.is_none());
        assert_eq!(material.specular_color, Vec3::ONE);
    }

    #[test]
    fn builders_fill_slots() {
        let albedo = Handle::new(0, 0);
        let normal = Handle::new(1, 0);
        let material = Material::textured(albedo)
            .with_normal(normal)
            .with_specular(Vec3::new(1.0, 0.5, 0.0), 64.0, 0.8);

        assert_eq!(material.albedo, Some(albedo));
        assert_eq!(material.normal, Some(normal));
        assert_eq!(material.specular_exponent, 64.0);
        assert_eq!(material.specular_coefficient, 0.8);
    }

    #[test]
    fn texture_key_ignores_scalar_parameters() {
        let albedo = Handle::new(3, 1);
        let a = Material::textured(albedo);
        let b = a.with_specular(Vec3::ZERO, 2.0, 0.1);
        assert_eq!(a.texture_key(), b.texture_key());
        assert!(a.texture_key().references(albedo));
        assert!(!a.texture_key().references(Handle::new(3, 2)));
    }
}
