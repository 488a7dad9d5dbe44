use super::vertex::{v, TexturedVertex, Vertex};
use std::f32::consts::PI;

/// Unit sphere, counter-clockwise when seen from outside.
pub fn sphere_mesh(segments: u32, rings: u32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();

            let u = segment as f32 / segments as f32;
            let tex_v = ring as f32 / rings as f32;

            // Position doubles as the normal on a unit sphere
            vertices.push(v([x, y, z], [x, y, z], [u, tex_v]));
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(current + 1);
            indices.push(next);

            indices.push(current + 1);
            indices.push(next + 1);
            indices.push(next);
        }
    }

    (vertices, indices)
}

pub fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let verts = vec![
        // Top (+Y)
        v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
        v([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
        v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
        v([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
        // Bottom (-Y)
        v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
        v([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
        v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
        v([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
        // Left (-X)
        v([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        v([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        // Right (+X)
        v([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
        v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
        v([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
        v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
        // Front (-Z)
        v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
        v([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
        v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
        v([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
        // Back (+Z)
        v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
        v([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
        v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
        v([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
    ];

    let idx = vec![
        3, 1, 0, 2, 1, 3, //
        6, 4, 5, 7, 4, 6, //
        11, 9, 8, 10, 9, 11, //
        14, 12, 13, 15, 12, 14, //
        19, 17, 16, 18, 17, 19, //
        22, 20, 21, 23, 20, 22,
    ];

    (verts, idx)
}

/// Unit quad in the XY plane facing -Z.
pub fn quad_mesh() -> (Vec<TexturedVertex>, Vec<u16>) {
    let verts = vec![
        TexturedVertex {
            pos: [-0.5, -0.5, 0.0],
            uv: [0.0, 1.0],
        },
        TexturedVertex {
            pos: [0.5, -0.5, 0.0],
            uv: [1.0, 1.0],
        },
        TexturedVertex {
            pos: [0.5, 0.5, 0.0],
            uv: [1.0, 0.0],
        },
        TexturedVertex {
            pos: [-0.5, 0.5, 0.0],
            uv: [0.0, 0.0],
        },
    ];
    (verts, QUAD_INDICES.to_vec())
}

/// Quad covering clip space, with texcoords running top-left to
/// bottom-right.
pub fn fullscreen_quad_mesh() -> (Vec<TexturedVertex>, Vec<u16>) {
    let (mut verts, indices) = quad_mesh();
    for vertex in &mut verts {
        vertex.pos[0] *= 2.0;
        vertex.pos[1] *= 2.0;
    }
    (verts, indices)
}

const QUAD_INDICES: [u16; 6] = [3, 1, 0, 2, 1, 3];
