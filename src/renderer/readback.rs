// renderer/readback.rs
use half::f16;

use crate::error::{RenderError, RenderResult};

/// Screen-sized targets that can be copied back to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Albedo,
    Normal,
    Specular,
    Depth,
    Hdr,
    Output,
}

impl RenderTarget {
    pub(crate) fn label(self) -> &'static str {
        match self {
            RenderTarget::Albedo => "albedo",
            RenderTarget::Normal => "normal",
            RenderTarget::Specular => "specular",
            RenderTarget::Depth => "linear depth",
            RenderTarget::Hdr => "hdr",
            RenderTarget::Output => "output",
        }
    }
}

/// A target's texels decoded to RGBA floats. Single-channel targets fill only
/// the red component. Unorm channels are in 0..=1.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl TargetImage {
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn center(&self) -> [f32; 4] {
        self.pixel(self.width / 2, self.height / 2)
    }
}

fn bytes_per_texel(format: wgpu::TextureFormat) -> Option<u32> {
    match format {
        wgpu::TextureFormat::Rgba8Unorm
        | wgpu::TextureFormat::Rgba8UnormSrgb
        | wgpu::TextureFormat::Bgra8Unorm
        | wgpu::TextureFormat::Bgra8UnormSrgb
        | wgpu::TextureFormat::R32Float => Some(4),
        wgpu::TextureFormat::Rgba16Float => Some(8),
        _ => None,
    }
}

fn decode_texel(format: wgpu::TextureFormat, bytes: &[u8]) -> [f32; 4] {
    let unorm = |b: u8| b as f32 / 255.0;
    match format {
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
            [unorm(bytes[0]), unorm(bytes[1]), unorm(bytes[2]), unorm(bytes[3])]
        }
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
            [unorm(bytes[2]), unorm(bytes[1]), unorm(bytes[0]), unorm(bytes[3])]
        }
        wgpu::TextureFormat::R32Float => {
            let value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            [value, 0.0, 0.0, 0.0]
        }
        wgpu::TextureFormat::Rgba16Float => {
            let channel = |i: usize| f16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]).to_f32();
            [channel(0), channel(1), channel(2), channel(3)]
        }
        _ => [0.0; 4],
    }
}

/// Copies a whole 2D texture into a mappable buffer and decodes it.
/// Blocks until the GPU has finished.
pub(crate) fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    label: &'static str,
) -> RenderResult<TargetImage> {
    let format = texture.format();
    let texel_size = bytes_per_texel(format).ok_or_else(|| RenderError::Readback {
        label,
        reason: format!("unsupported format {format:?}"),
    })?;

    let width = texture.width();
    let height = texture.height();
    let unpadded_row = width * texel_size;
    let padded_row = unpadded_row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("ReadbackBuffer"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("ReadbackEncoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|err| RenderError::Readback {
            label,
            reason: err.to_string(),
        })?;

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            return Err(RenderError::Readback {
                label,
                reason: err.to_string(),
            })
        }
        Err(_) => {
            return Err(RenderError::Readback {
                label,
                reason: "map callback never ran".to_string(),
            })
        }
    }

    let pixels = {
        let data = slice.get_mapped_range();
        data.chunks(padded_row as usize)
            .flat_map(|row| {
                row[..unpadded_row as usize]
                    .chunks(texel_size as usize)
                    .map(|texel| decode_texel(format, texel))
            })
            .collect()
    };
    buffer.unmap();

    Ok(TargetImage {
        width,
        height,
        pixels,
    })
}
