use bytemuck::{Pod, Zeroable};
use std::mem;

/// Position, normal, texcoord.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Position, texcoord.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TexturedVertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}

/// Position, normal, tangent, bitangent, texcoord.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct TangentVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub uv: [f32; 2],
}

#[inline]
pub fn v(pos: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { pos, normal, uv }
}

pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TANGENT_LOCATION: u32 = 2;
pub const BITANGENT_LOCATION: u32 = 3;
pub const TEXCOORD_LOCATION: u32 = 4;

/// One entry of a vertex layout: shader location, float component count and
/// byte offset inside the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    pub location: u32,
    pub components: u32,
    pub offset: u32,
}

const fn element(location: u32, components: u32, offset: u32) -> VertexElement {
    VertexElement {
        location,
        components,
        offset,
    }
}

const POS_NORM_TEX_ELEMENTS: [VertexElement; 3] = [
    element(POSITION_LOCATION, 3, 0),
    element(NORMAL_LOCATION, 3, 12),
    element(TEXCOORD_LOCATION, 2, 24),
];

const POS_TEX_ELEMENTS: [VertexElement; 2] = [
    element(POSITION_LOCATION, 3, 0),
    element(TEXCOORD_LOCATION, 2, 12),
];

const TANGENT_ELEMENTS: [VertexElement; 5] = [
    element(POSITION_LOCATION, 3, 0),
    element(NORMAL_LOCATION, 3, 12),
    element(TANGENT_LOCATION, 3, 24),
    element(BITANGENT_LOCATION, 3, 36),
    element(TEXCOORD_LOCATION, 2, 48),
];

const fn attribute(element: VertexElement) -> wgpu::VertexAttribute {
    let format = match element.components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    };
    wgpu::VertexAttribute {
        format,
        offset: element.offset as wgpu::BufferAddress,
        shader_location: element.location,
    }
}

const POS_NORM_TEX_ATTRS: [wgpu::VertexAttribute; 3] = [
    attribute(POS_NORM_TEX_ELEMENTS[0]),
    attribute(POS_NORM_TEX_ELEMENTS[1]),
    attribute(POS_NORM_TEX_ELEMENTS[2]),
];

const POS_TEX_ATTRS: [wgpu::VertexAttribute; 2] = [
    attribute(POS_TEX_ELEMENTS[0]),
    attribute(POS_TEX_ELEMENTS[1]),
];

const TANGENT_ATTRS: [wgpu::VertexAttribute; 5] = [
    attribute(TANGENT_ELEMENTS[0]),
    attribute(TANGENT_ELEMENTS[1]),
    attribute(TANGENT_ELEMENTS[2]),
    attribute(TANGENT_ELEMENTS[3]),
    attribute(TANGENT_ELEMENTS[4]),
];

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = [attribute(POS_TEX_ELEMENTS[0])];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    PosNormTex,
    PosTex,
    PosNormTanBitanTex,
}

impl VertexFormat {
    pub const ALL: [VertexFormat; 3] = [
        VertexFormat::PosNormTex,
        VertexFormat::PosTex,
        VertexFormat::PosNormTanBitanTex,
    ];

    pub const fn elements(self) -> &'static [VertexElement] {
        match self {
            VertexFormat::PosNormTex => &POS_NORM_TEX_ELEMENTS,
            VertexFormat::PosTex => &POS_TEX_ELEMENTS,
            VertexFormat::PosNormTanBitanTex => &TANGENT_ELEMENTS,
        }
    }

    pub const fn stride(self) -> u32 {
        let elements = self.elements();
        let last = elements[elements.len() - 1];
        last.offset + last.components * mem::size_of::<f32>() as u32
    }

    pub fn has_normals(self) -> bool {
        !matches!(self, VertexFormat::PosTex)
    }

    pub fn has_tangents(self) -> bool {
        matches!(self, VertexFormat::PosNormTanBitanTex)
    }

    pub fn layout(self) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = match self {
            VertexFormat::PosNormTex => &POS_NORM_TEX_ATTRS,
            VertexFormat::PosTex => &POS_TEX_ATTRS,
            VertexFormat::PosNormTanBitanTex => &TANGENT_ATTRS,
        };
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    /// Binds only the position of this format, for depth-only and light
    /// volume passes.
    pub fn position_layout(self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        }
    }
}
