use glam::{Vec2, Vec3};

use super::vertex::{TangentVertex, Vertex};

/// Builds per-vertex tangent frames from triangle UV gradients.
///
/// Each triangle writes its tangent and bitangent to all three of its
/// vertices, so a vertex shared between triangles keeps whichever triangle
/// came last. Triangles with degenerate UVs produce non-finite vectors.
pub fn synthesize_tangents(vertices: &[Vertex], indices: &[u32]) -> Vec<TangentVertex> {
    let mut out: Vec<TangentVertex> = vertices
        .iter()
        .map(|v| TangentVertex {
            pos: v.pos,
            normal: v.normal,
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
            uv: v.uv,
        })
        .collect();

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if i0.max(i1).max(i2) >= out.len() {
            log::warn!(
                "Skipping triangle ({i0}, {i1}, {i2}) outside of {} vertices",
                out.len()
            );
            continue;
        }

        let p0 = Vec3::from(out[i0].pos);
        let p1 = Vec3::from(out[i1].pos);
        let p2 = Vec3::from(out[i2].pos);
        let uv0 = Vec2::from(out[i0].uv);
        let uv1 = Vec2::from(out[i1].uv);
        let uv2 = Vec2::from(out[i2].uv);

        let (tangent, bitangent) = triangle_frame([p0, p1, p2], [uv0, uv1, uv2]);

        for index in [i0, i1, i2] {
            out[index].tangent = tangent.to_array();
            out[index].bitangent = bitangent.to_array();
        }
    }

    out
}

pub fn triangle_frame(positions: [Vec3; 3], uvs: [Vec2; 3]) -> (Vec3, Vec3) {
    let delta_pos1 = positions[1] - positions[0];
    let delta_pos2 = positions[2] - positions[0];
    let delta_uv1 = uvs[1] - uvs[0];
    let delta_uv2 = uvs[2] - uvs[0];

    let r = 1.0 / (delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x);
    let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
    let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r;
    (tangent, bitangent)
}

/// Widens little-endian 16- or 32-bit index data to `u32`.
pub fn widen_indices(index_bytes: &[u8], index_size: u32) -> Vec<u32> {
    if index_size == 2 {
        index_bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as u32)
            .collect()
    } else {
        index_bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::v;

    const EPSILON: f32 = 1e-6;

    fn unit_quad() -> (Vec<Vertex>, Vec<u32>) {
        let n = [0.0, 0.0, 1.0];
        (
            vec![
                v([0.0, 0.0, 0.0], n, [0.0, 0.0]),
                v([1.0, 0.0, 0.0], n, [1.0, 0.0]),
                v([1.0, 1.0, 0.0], n, [1.0, 1.0]),
                v([0.0, 1.0, 0.0], n, [0.0, 1.0]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn axis_aligned_quad_tangent_follows_u_and_bitangent_follows_v() {
        let (vertices, indices) = unit_quad();
        let out = synthesize_tangents(&vertices, &indices);

        for vertex in &out {
            let t = Vec3::from(vertex.tangent);
            let b = Vec3::from(vertex.bitangent);
            assert!(t.abs_diff_eq(Vec3::X, EPSILON), "tangent {t:?}");
            assert!(b.abs_diff_eq(Vec3::Y, EPSILON), "bitangent {b:?}");
        }
    }

    #[test]
    fn attributes_are_copied_through() {
        let (vertices, indices) = unit_quad();
        let out = synthesize_tangents(&vertices, &indices);

        for (src, dst) in vertices.iter().zip(&out) {
            assert_eq!(src.pos, dst.pos);
            assert_eq!(src.normal, dst.normal);
            assert_eq!(src.uv, dst.uv);
        }
    }

    #[test]
    fn degenerate_uvs_produce_non_finite_tangents() {
        let n = [0.0, 0.0, 1.0];
        let vertices = vec![
            v([0.0, 0.0, 0.0], n, [0.5, 0.5]),
            v([1.0, 0.0, 0.0], n, [0.5, 0.5]),
            v([0.0, 1.0, 0.0], n, [0.5, 0.5]),
        ];
        let out = synthesize_tangents(&vertices, &[0, 1, 2]);

        assert!(!Vec3::from(out[0].tangent).is_finite());
        assert!(!Vec3::from(out[0].bitangent).is_finite());
    }

    #[test]
    fn later_triangles_overwrite_shared_vertices() {
        let n = [0.0, 0.0, 1.0];
        // Second triangle maps U along +Y instead of +X.
        let vertices = vec![
            v([0.0, 0.0, 0.0], n, [0.0, 0.0]),
            v([1.0, 0.0, 0.0], n, [1.0, 0.0]),
            v([0.0, 1.0, 0.0], n, [0.0, 1.0]),
            v([0.0, 1.0, 0.0], n, [1.0, 0.0]),
            v([1.0, 0.0, 0.0], n, [0.0, 1.0]),
        ];
        let first = [0, 1, 2];
        let second = [0, 3, 4];
        let out = synthesize_tangents(&vertices, &[first, second].concat());

        assert!(Vec3::from(out[1].tangent).abs_diff_eq(Vec3::X, EPSILON));
        assert!(Vec3::from(out[0].tangent).abs_diff_eq(Vec3::Y, EPSILON));
        assert!(Vec3::from(out[0].bitangent).abs_diff_eq(Vec3::X, EPSILON));
    }

    #[test]
    fn untouched_vertices_keep_zero_frame() {
        let (mut vertices, indices) = unit_quad();
        vertices.push(v([5.0, 5.0, 5.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let out = synthesize_tangents(&vertices, &indices);

        assert_eq!(out[4].tangent, [0.0; 3]);
        assert_eq!(out[4].bitangent, [0.0; 3]);
    }

    #[test]
    fn out_of_range_triangles_are_skipped() {
        let (vertices, _) = unit_quad();
        let out = synthesize_tangents(&vertices, &[0, 1, 9]);
        assert!(out.iter().all(|v| v.tangent == [0.0; 3]));
    }

    #[test]
    fn widen_indices_reads_both_widths() {
        let short: Vec<u8> = [1u16, 2, 65535].iter().flat_map(|i| i.to_le_bytes()).collect();
        let long: Vec<u8> = [7u32, 70000].iter().flat_map(|i| i.to_le_bytes()).collect();

        assert_eq!(widen_indices(&short, 2), vec![1, 2, 65535]);
        assert_eq!(widen_indices(&long, 4), vec![7, 70000]);
    }
}
