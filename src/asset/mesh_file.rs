//! Custom binary mesh format.
//!
//! ```text
//! u32 vertex_stride
//! u32 vertex_count
//! u32 index_size      bytes, or bits when greater than 8
//! u32 index_count
//! [u8; vertex_stride * vertex_count]
//! [u8; index_size * index_count]
//! ```
//!
//! All integers are little-endian. Vertices are stored as position, normal,
//! texcoord.

use crate::asset::mesh::ensure_drawable;
use crate::error::LoadError;
use crate::renderer::tangents::widen_indices;
use crate::renderer::{Vertex, VertexFormat};

const HEADER_LEN: usize = 16;

#[derive(Debug)]
pub struct MeshFile {
    pub vertices: Vec<Vertex>,
    pub index_size: u32,
    pub index_count: u32,
    pub index_bytes: Vec<u8>,
}

impl MeshFile {
    /// Indices widened to `u32`, whatever their stored width.
    pub fn indices(&self) -> Vec<u32> {
        widen_indices(&self.index_bytes, self.index_size)
    }
}

pub fn parse(bytes: &[u8]) -> Result<MeshFile, LoadError> {
    if bytes.len() < HEADER_LEN {
        return Err(LoadError::MeshFileTruncated {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }

    let field = |i: usize| {
        u32::from_le_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]])
    };
    let stride = field(0);
    let vertex_count = field(1);
    let mut index_size = field(2);
    if index_size > 8 {
        index_size /= 8;
    }
    let index_count = field(3);

    let expected_stride = VertexFormat::PosNormTex.stride();
    if stride != expected_stride {
        return Err(LoadError::MeshFileStride {
            stride,
            expected: VertexFormat::PosNormTex,
        });
    }
    if index_size != 2 && index_size != 4 {
        return Err(LoadError::IndexSize(index_size));
    }
    ensure_drawable(vertex_count as usize, index_count as usize)?;

    let vertex_len = stride as usize * vertex_count as usize;
    let index_len = index_size as usize * index_count as usize;
    let expected = HEADER_LEN + vertex_len + index_len;
    if bytes.len() < expected {
        return Err(LoadError::MeshFileTruncated {
            expected,
            found: bytes.len(),
        });
    }

    let vertex_bytes = &bytes[HEADER_LEN..HEADER_LEN + vertex_len];
    let index_bytes = &bytes[HEADER_LEN + vertex_len..expected];

    Ok(MeshFile {
        vertices: bytemuck::pod_collect_to_vec(vertex_bytes),
        index_size,
        index_count,
        index_bytes: index_bytes.to_vec(),
    })
}
