use std::path::PathBuf;

use thiserror::Error;

use crate::renderer::VertexFormat;

/// Errors produced while reading or decoding an asset from disk or memory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("DDS data is truncated: {0}")]
    DdsTruncated(&'static str),
    #[error("DDS magic number missing")]
    DdsMagic,
    #[error("unsupported DDS fourCC {0:?}")]
    UnsupportedFourCc([u8; 4]),
    #[error("block-compressed textures are not supported by this adapter")]
    UnsupportedCompression,
    #[error("can't load this OBJ: face on line {line} has {corners} corners")]
    ObjFace { line: usize, corners: usize },
    #[error("malformed OBJ {what} on line {line}")]
    ObjSyntax { line: usize, what: &'static str },
    #[error("OBJ face on line {line} references missing {what} index {index}")]
    ObjIndex {
        line: usize,
        what: &'static str,
        index: i64,
    },
    #[error("mesh file is truncated: expected {expected} bytes, found {found}")]
    MeshFileTruncated { expected: usize, found: usize },
    #[error("mesh file vertex stride {stride} does not match {expected:?}")]
    MeshFileStride { stride: u32, expected: VertexFormat },
    #[error("{what} data is {found} bytes, expected {expected}")]
    DataSize {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("mesh has {vertices} vertices and {indices} indices; both must be non-zero")]
    EmptyMesh { vertices: usize, indices: usize },
    #[error("index element size must be 2 or 4 bytes, got {0}")]
    IndexSize(u32),
    #[error("load cancelled for {0:?}")]
    Cancelled(PathBuf),
}

/// Errors raised by the renderer itself.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("adapter {adapter} can't run the renderer: {missing}")]
    UnsupportedAdapter { adapter: String, missing: String },
    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
    #[error("shader {label} failed to compile: {message}")]
    Shader { label: String, message: String },
    #[error("render target {label} is incomplete: {reason}")]
    IncompleteTarget { label: &'static str, reason: String },
    #[error("failed to read back {label}: {reason}")]
    Readback { label: &'static str, reason: String },
    #[error("stale or foreign {0} handle")]
    StaleHandle(&'static str),
    #[error("renderer has been shut down")]
    ShutDown,
    #[error(transparent)]
    Load(#[from] LoadError),
}

pub type RenderResult<T> = Result<T, RenderError>;
