//! Minimal Wavefront OBJ reader.
//!
//! Only `v`, `vt`, `vn` and `f` records are understood. Faces must use full
//! `p/t/n` corners and have three or four of them; quads are split into
//! `(0, 1, 2)` and `(0, 2, 3)`. Every face corner becomes its own vertex, so
//! the index buffer is simply `0..n`.

use glam::{Vec2, Vec3};

use crate::asset::mesh::ensure_drawable;
use crate::error::LoadError;
use crate::renderer::Vertex;

#[derive(Debug, Default)]
pub struct ObjMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[derive(Clone, Copy)]
struct Corner {
    position: usize,
    texcoord: usize,
    normal: usize,
}

pub fn parse(source: &str) -> Result<ObjMesh, LoadError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut corners: Vec<(usize, Corner)> = Vec::new();

    for (line_index, line) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => positions.push(parse_vec3(&mut tokens, line_number, "position")?),
            "vt" => texcoords.push(parse_vec2(&mut tokens, line_number)?),
            "vn" => normals.push(parse_vec3(&mut tokens, line_number, "normal")?),
            "f" => {
                let face = tokens
                    .map(|token| parse_corner(token, line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                match face.len() {
                    3 => corners.extend(face.iter().map(|c| (line_number, *c))),
                    4 => {
                        for i in [0, 1, 2, 0, 2, 3] {
                            corners.push((line_number, face[i]));
                        }
                    }
                    count => {
                        log::warn!("Can't load this OBJ: line {line_number} has a {count}-corner face");
                        return Err(LoadError::ObjFace {
                            line: line_number,
                            corners: count,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    let mut vertices = Vec::with_capacity(corners.len());
    for (line, corner) in &corners {
        let pos = lookup(&positions, corner.position, *line, "position")?;
        let uv = lookup(&texcoords, corner.texcoord, *line, "texcoord")?;
        let normal = lookup(&normals, corner.normal, *line, "normal")?;
        vertices.push(Vertex {
            pos: pos.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        });
    }

    let indices: Vec<u32> = (0..vertices.len() as u32).collect();
    ensure_drawable(vertices.len(), indices.len())?;
    Ok(ObjMesh { vertices, indices })
}

fn lookup<T: Copy>(
    items: &[T],
    one_based: usize,
    line: usize,
    what: &'static str,
) -> Result<T, LoadError> {
    one_based
        .checked_sub(1)
        .and_then(|index| items.get(index))
        .copied()
        .ok_or(LoadError::ObjIndex {
            line,
            what,
            index: one_based as i64,
        })
}

fn parse_corner(token: &str, line: usize) -> Result<Corner, LoadError> {
    let mut parts = token.split('/');
    let mut next = || -> Result<usize, LoadError> {
        parts
            .next()
            .and_then(|part| part.parse::<usize>().ok())
            .ok_or(LoadError::ObjSyntax {
                line,
                what: "face corner",
            })
    };
    Ok(Corner {
        position: next()?,
        texcoord: next()?,
        normal: next()?,
    })
}

fn parse_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &'static str,
) -> Result<[f32; N], LoadError> {
    let mut out = [0.0; N];
    for value in &mut out {
        *value = tokens
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or(LoadError::ObjSyntax { line, what })?;
    }
    Ok(out)
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &'static str,
) -> Result<Vec3, LoadError> {
    parse_floats::<3>(tokens, line, what).map(Vec3::from_array)
}

fn parse_vec2<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec2, LoadError> {
    parse_floats::<2>(tokens, line, "texcoord").map(Vec2::from_array)
}
