use wgpu::util::DeviceExt;

use crate::error::LoadError;
use crate::renderer::VertexFormat;

/// Immutable GPU geometry. The vertex format and index width are recorded so
/// passes can pick a matching pipeline and index type.
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
    index_format: wgpu::IndexFormat,
    vertex_format: VertexFormat,
}

impl Mesh {
    /// Uploads already validated vertex and index bytes.
    pub(crate) fn from_bytes(
        device: &wgpu::Device,
        label: &str,
        vertex_format: VertexFormat,
        vertex_bytes: &[u8],
        index_format: wgpu::IndexFormat,
        index_bytes: &[u8],
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}VertexBuffer")),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Index buffers must be 4-byte aligned in size; u16 meshes with an
        // odd index count get one padding element.
        let mut padded;
        let mut contents = index_bytes;
        if contents.len() % wgpu::COPY_BUFFER_ALIGNMENT as usize != 0 {
            padded = contents.to_vec();
            padded.resize(
                contents.len().next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize),
                0,
            );
            contents = &padded;
        }

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}IndexBuffer")),
            contents,
            usage: wgpu::BufferUsages::INDEX,
        });

        let index_size = index_element_size(index_format) as usize;

        Self {
            vertex_buffer,
            index_buffer,
            vertex_count: (vertex_bytes.len() / vertex_format.stride() as usize) as u32,
            index_count: (index_bytes.len() / index_size) as u32,
            index_format,
            vertex_format,
        }
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_format
    }

    pub fn vertex_format(&self) -> VertexFormat {
        self.vertex_format
    }
}

/// Summary of a mesh that callers can inspect without touching GPU buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshInfo {
    pub vertex_count: u32,
    pub index_count: u32,
    pub index_size: u32,
    pub vertex_format: VertexFormat,
}

impl From<&Mesh> for MeshInfo {
    fn from(mesh: &Mesh) -> Self {
        Self {
            vertex_count: mesh.vertex_count,
            index_count: mesh.index_count,
            index_size: index_element_size(mesh.index_format),
            vertex_format: mesh.vertex_format,
        }
    }
}

/// Zero-sized GPU buffers can't be bound, so a mesh needs at least one
/// vertex and one index before it is uploaded.
pub(crate) fn ensure_drawable(vertices: usize, indices: usize) -> Result<(), LoadError> {
    if vertices == 0 || indices == 0 {
        return Err(LoadError::EmptyMesh { vertices, indices });
    }
    Ok(())
}

pub fn index_format_for_size(size: u32) -> Option<wgpu::IndexFormat> {
    match size {
        2 => Some(wgpu::IndexFormat::Uint16),
        4 => Some(wgpu::IndexFormat::Uint32),
        _ => None,
    }
}

pub fn index_element_size(format: wgpu::IndexFormat) -> u32 {
    match format {
        wgpu::IndexFormat::Uint16 => 2,
        wgpu::IndexFormat::Uint32 => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_sizes_map_to_wgpu_formats() {
        assert_eq!(index_format_for_size(2), Some(wgpu::IndexFormat::Uint16));
        assert_eq!(index_format_for_size(4), Some(wgpu::IndexFormat::Uint32));
        assert_eq!(index_format_for_size(1), None);
        assert_eq!(index_format_for_size(8), None);
    }

    #[test]
    fn meshes_without_vertices_or_indices_are_not_drawable() {
        assert!(matches!(
            ensure_drawable(0, 0),
            Err(LoadError::EmptyMesh { vertices: 0, indices: 0 })
        ));
        assert!(ensure_drawable(3, 0).is_err());
        assert!(ensure_drawable(0, 3).is_err());
        assert!(ensure_drawable(3, 3).is_ok());
    }

    #[test]
    fn element_size_round_trips() {
        for size in [2, 4] {
            let format = index_format_for_size(size).unwrap();
            assert_eq!(index_element_size(format), size);
        }
    }
}
