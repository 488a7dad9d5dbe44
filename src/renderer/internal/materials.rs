use std::collections::HashMap;

use crate::asset::{AssetCache, Handle};
use crate::renderer::material::TextureKey;
use crate::renderer::Texture;

/// Fallbacks bound for texture slots a material leaves empty.
struct FallbackTextures {
    white: Texture,
    flat_normal: Texture,
}

/// Caches one bind group per distinct (albedo, normal, specular) triple.
/// Layout: albedo 0, normal 1, specular 2, sampler 3.
pub(crate) struct MaterialBinder {
    pub(crate) bind_layout: wgpu::BindGroupLayout,
    fallback: FallbackTextures,
    bind_groups: HashMap<TextureKey, wgpu::BindGroup>,
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

impl MaterialBinder {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MaterialBindLayout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            bind_layout,
            fallback: FallbackTextures {
                white: Texture::white(device, queue),
                flat_normal: Texture::default_normal(device, queue),
            },
            bind_groups: HashMap::new(),
        }
    }

    /// Creates bind groups for any keys not seen before.
    pub(crate) fn prepare(
        &mut self,
        device: &wgpu::Device,
        textures: &AssetCache<Texture>,
        keys: impl IntoIterator<Item = TextureKey>,
    ) {
        for key in keys {
            if self.bind_groups.contains_key(&key) {
                continue;
            }
            let bind_group = self.create_bind_group(device, textures, key);
            self.bind_groups.insert(key, bind_group);
        }
    }

    pub(crate) fn get(&self, key: &TextureKey) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(key)
    }

    /// Drops every cached bind group that references `texture`.
    pub(crate) fn forget_texture(&mut self, texture: Handle<Texture>) {
        self.bind_groups.retain(|key, _| !key.references(texture));
    }

    fn resolve<'a>(
        textures: &'a AssetCache<Texture>,
        handle: Option<Handle<Texture>>,
        fallback: &'a Texture,
        slot: &str,
    ) -> &'a Texture {
        match handle {
            None => fallback,
            Some(handle) => textures.get(handle).unwrap_or_else(|| {
                log::warn!("Stale {} texture handle {:?}; using fallback", slot, handle);
                fallback
            }),
        }
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        textures: &AssetCache<Texture>,
        key: TextureKey,
    ) -> wgpu::BindGroup {
        let albedo = Self::resolve(textures, key.albedo, &self.fallback.white, "albedo");
        let normal = Self::resolve(textures, key.normal, &self.fallback.flat_normal, "normal");
        let specular = Self::resolve(textures, key.specular, &self.fallback.white, "specular");

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MaterialBindGroup"),
            layout: &self.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal.linear_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&albedo.sampler),
                },
            ],
        })
    }
}
