use crate::pipeline::VertexRecord;
use crate::render::MeshData;

use super::{BlockType, Face};

#[derive(Copy, Clone)]
enum Edge {
    Min,
    Max,
}

use Edge::{Max, Min};

type Corner = ([f32; 3], Edge, Edge);

/// Unit-cube corners per face, counter-clockwise seen from outside, with the
/// atlas edge each corner samples (u, v).
const FACE_CORNERS: [(Face, [Corner; 4]); 6] = [
    (Face::Top, [
        ([0.0, 0.0, 1.0], Min, Min),
        ([1.0, 0.0, 1.0], Max, Min),
        ([1.0, 1.0, 1.0], Max, Max),
        ([0.0, 1.0, 1.0], Min, Max),
    ]),
    (Face::Bottom, [
        ([0.0, 1.0, 0.0], Max, Min),
        ([1.0, 1.0, 0.0], Min, Min),
        ([1.0, 0.0, 0.0], Min, Max),
        ([0.0, 0.0, 0.0], Max, Max),
    ]),
    (Face::Right, [
        ([1.0, 0.0, 0.0], Min, Min),
        ([1.0, 1.0, 0.0], Max, Min),
        ([1.0, 1.0, 1.0], Max, Max),
        ([1.0, 0.0, 1.0], Min, Max),
    ]),
    (Face::Left, [
        ([0.0, 0.0, 1.0], Min, Max),
        ([0.0, 1.0, 1.0], Max, Max),
        ([0.0, 1.0, 0.0], Max, Min),
        ([0.0, 0.0, 0.0], Min, Min),
    ]),
    (Face::Front, [
        ([1.0, 1.0, 0.0], Max, Min),
        ([0.0, 1.0, 0.0], Min, Min),
        ([0.0, 1.0, 1.0], Min, Max),
        ([1.0, 1.0, 1.0], Max, Max),
    ]),
    (Face::Back, [
        ([1.0, 0.0, 1.0], Max, Max),
        ([0.0, 0.0, 1.0], Min, Max),
        ([0.0, 0.0, 0.0], Min, Min),
        ([1.0, 0.0, 0.0], Max, Min),
    ]),
];

/// Two triangles per face, four vertices per face.
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 2, 3, 0, // top
    4, 5, 6, 6, 7, 4, // bottom
    8, 9, 10, 10, 11, 8, // right
    12, 13, 14, 14, 15, 12, // left
    16, 17, 18, 18, 19, 16, // front
    20, 21, 22, 22, 23, 20, // back
];

/// 24 vertices of a textured unit cube for `block_type`.
pub fn cube_vertices(block_type: BlockType) -> Vec<VertexRecord> {
    let mut vertices = Vec::with_capacity(24);
    for (face, corners) in &FACE_CORNERS {
        let rect = block_type.face_quad(*face).atlas_rect();
        for (position, u, v) in corners {
            let u = match u {
                Min => rect.u_min,
                Max => rect.u_max,
            };
            let v = match v {
                Min => rect.v_min,
                Max => rect.v_max,
            };
            // Atlas rows are stored top-down.
            vertices.push(VertexRecord::new(*position, [u, 1.0 - v]));
        }
    }
    vertices
}

pub fn cube_mesh(block_type: BlockType) -> MeshData {
    MeshData::new(cube_vertices(block_type), CUBE_INDICES.to_vec())
}
