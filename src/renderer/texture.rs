// renderer/texture.rs
use std::path::Path;

use crate::asset::dds::DdsImage;
use crate::error::LoadError;
use crate::renderer::pipeline_builder::{Culling, PipelineBuilder};

/// How 8-bit texel data should be interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour data. Sampled through an sRGB view so shaders see linear values.
    Srgb,
    /// Raw data such as normal maps.
    Linear,
}

impl ColorSpace {
    /// Storage format plus the view format the default view reads through.
    /// Storage stays linear so mip generation can render into it.
    fn formats(self) -> (wgpu::TextureFormat, wgpu::TextureFormat) {
        match self {
            ColorSpace::Srgb => (
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureFormat::Rgba8UnormSrgb,
            ),
            ColorSpace::Linear => (wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Rgba8Unorm),
        }
    }
}

/// A sampled 2D texture. `view` reads colour data in sRGB where the texture
/// has an sRGB form; `linear_view` reads the raw stored values, which is what
/// normal maps need.
#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub linear_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Decode any format the `image` crate understands and upload it with a
    /// full mip chain.
    pub fn from_image_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        path: &Path,
    ) -> Result<Self, LoadError> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|source| LoadError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self::from_rgba8(
            device,
            queue,
            &rgba,
            (width, height),
            ColorSpace::Srgb,
            path.to_str(),
        ))
    }

    /// Upload pre-compressed DXT levels as BC1/BC2/BC3.
    pub fn from_dds(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DdsImage<'_>,
        label: Option<&str>,
    ) -> Result<Self, LoadError> {
        if !device
            .features()
            .contains(wgpu::Features::TEXTURE_COMPRESSION_BC)
        {
            return Err(LoadError::UnsupportedCompression);
        }

        let format = image.header.format.texture_format();
        let linear_format = format.remove_srgb_suffix();
        let block_size = image.header.format.block_size();
        let (width, height) = image.header.block_extent();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: image.levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[linear_format],
        });

        for (mip, level) in image.levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.level_data(level),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.blocks_per_row() * block_size),
                    rows_per_image: Some(level.block_rows()),
                },
                // Copies are sized in whole blocks, even for the 2x2 and 1x1 tails
                wgpu::Extent3d {
                    width: level.blocks_per_row() * 4,
                    height: level.block_rows() * 4,
                    depth_or_array_layers: 1,
                },
            );
        }

        Ok(Self::with_views(device, texture, format, linear_format))
    }

    /// sRGB RGBA8 pixels, tightly packed.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        width: u32,
        height: u32,
        label: Option<&str>,
    ) -> Self {
        Self::from_rgba8(device, queue, bytes, (width, height), ColorSpace::Srgb, label)
    }

    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        Self::from_rgba8(device, queue, &color, (1, 1), ColorSpace::Srgb, label)
    }

    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: u32,
        checker_size: u32,
        color1: [u8; 4],
        color2: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        let pixels = checkerboard_pixels(size, checker_size, color1, color2);
        Self::from_bytes(device, queue, &pixels, size, size, label)
    }

    /// 1x1 white, the fallback for albedo and specular slots.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_color(device, queue, [255, 255, 255, 255], Some("White"))
    }

    /// 1x1 tangent-space normal pointing straight out of the surface.
    pub fn default_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(
            device,
            queue,
            &[128, 128, 255, 255],
            (1, 1),
            ColorSpace::Linear,
            Some("DefaultNormal"),
        )
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        (width, height): (u32, u32),
        color_space: ColorSpace,
        label: Option<&str>,
    ) -> Self {
        let (storage_format, view_format) = color_space.formats();
        let mip_level_count = mip_levels(width, height);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: storage_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[view_format],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        if mip_level_count > 1 {
            MipChain::new(device, storage_format).generate(device, queue, &texture);
        }

        Self::with_views(device, texture, view_format, storage_format)
    }

    fn with_views(
        device: &wgpu::Device,
        texture: wgpu::Texture,
        view_format: wgpu::TextureFormat,
        linear_format: wgpu::TextureFormat,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(view_format),
            ..Default::default()
        });
        let linear_view = texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(linear_format),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("TextureSampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            linear_view,
            sampler,
        }
    }
}

/// Number of levels in a full mip chain down to 1x1.
fn mip_levels(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

/// Fills mip levels 1.. by repeatedly blitting the level above with a linear
/// filter.
struct MipChain {
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    format: wgpu::TextureFormat,
}

impl MipChain {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("MipBlitShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MipBlitLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("MipBlitPipelineLayout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = PipelineBuilder::new(device, &layout, &shader)
            .with_label("MipBlitPipeline")
            .with_targets(&[format])
            .with_culling(Culling::None)
            .build();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MipBlitSampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipeline,
            bind_layout,
            sampler,
            format,
        }
    }

    fn level_view(&self, texture: &wgpu::Texture, level: u32) -> wgpu::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("MipLevel"),
            format: Some(self.format),
            base_mip_level: level,
            mip_level_count: Some(1),
            ..Default::default()
        })
    }

    fn generate(&self, device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("MipBlitEncoder"),
        });

        for level in 1..texture.mip_level_count() {
            let source = self.level_view(texture, level - 1);
            let target = self.level_view(texture, level);

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("MipBlitBindGroup"),
                layout: &self.bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("MipBlitPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(Some(encoder.finish()));
    }
}

fn checkerboard_pixels(size: u32, checker_size: u32, color1: [u8; 4], color2: [u8; 4]) -> Vec<u8> {
    let checker_size = checker_size.max(1);
    (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            if (x / checker_size + y / checker_size) % 2 == 0 {
                color1
            } else {
                color2
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_runs_to_one_texel() {
        assert_eq!(mip_levels(1, 1), 1);
        assert_eq!(mip_levels(2, 2), 2);
        assert_eq!(mip_levels(256, 256), 9);
        assert_eq!(mip_levels(2048, 2048), 12);
        assert_eq!(mip_levels(256, 128), 9);
        assert_eq!(mip_levels(128, 256), 9);
        assert_eq!(mip_levels(100, 100), 7);
        assert_eq!(mip_levels(1920, 1080), 11);
    }

    #[test]
    fn zero_size_still_has_one_level() {
        assert_eq!(mip_levels(0, 0), 1);
    }

    #[test]
    fn colour_textures_read_through_srgb_view() {
        assert_eq!(
            ColorSpace::Srgb.formats(),
            (wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(
            ColorSpace::Linear.formats(),
            (wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Rgba8Unorm)
        );
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let a = [255, 0, 0, 255];
        let b = [0, 0, 255, 255];
        let pixels = checkerboard_pixels(4, 2, a, b);
        assert_eq!(pixels.len(), 4 * 4 * 4);

        assert_eq!(&pixels[0..4], &a);
        assert_eq!(&pixels[(2 * 4)..(2 * 4 + 4)], &b);
        let row2 = (2 * 4) * 4;
        assert_eq!(&pixels[row2..row2 + 4], &b);
        assert_eq!(&pixels[row2 + 8..row2 + 12], &a);
    }
}
