/// Material of a voxel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BlockType {
    Grass,
    Dirt,
    Stone,
}

impl BlockType {
    pub const ALL: [BlockType; 3] = [BlockType::Grass, BlockType::Dirt, BlockType::Stone];

    /// Atlas tile used on `face` of a block of this type.
    ///
    /// Grass is the only type with distinct faces: grass on top, dirt below,
    /// grass-edged dirt on the sides.
    pub fn face_quad(self, face: Face) -> QuadType {
        match (self, face) {
            (BlockType::Grass, Face::Top) => QuadType::GrassTop,
            (BlockType::Grass, Face::Bottom) => QuadType::Dirt,
            (BlockType::Grass, _) => QuadType::GrassSide,
            (BlockType::Dirt, _) => QuadType::Dirt,
            (BlockType::Stone, _) => QuadType::Stone,
        }
    }
}

/// A placed voxel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Block {
    pub block_type: BlockType,
}

impl Block {
    #[inline]
    pub const fn new(block_type: BlockType) -> Self {
        Self { block_type }
    }
}

/// Cube face, named for a Z-up world.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Face {
    /// +Z
    Top,
    /// -Z
    Bottom,
    /// +X
    Right,
    /// -X
    Left,
    /// +Y
    Front,
    /// -Y
    Back,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Right,
        Face::Left,
        Face::Front,
        Face::Back,
    ];

    pub const fn normal(self) -> [i32; 3] {
        match self {
            Face::Top => [0, 0, 1],
            Face::Bottom => [0, 0, -1],
            Face::Right => [1, 0, 0],
            Face::Left => [-1, 0, 0],
            Face::Front => [0, 1, 0],
            Face::Back => [0, -1, 0],
        }
    }
}

/// Tile in the block texture atlas.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum QuadType {
    GrassTop,
    GrassSide,
    Dirt,
    Stone,
}

/// Normalized atlas rectangle. `v` is measured bottom-up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AtlasRect {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl QuadType {
    pub const fn atlas_rect(self) -> AtlasRect {
        match self {
            QuadType::GrassTop => AtlasRect { u_min: 0.125, u_max: 0.1875, v_min: 0.375, v_max: 0.4375 },
            QuadType::GrassSide => AtlasRect { u_min: 0.1875, u_max: 0.25, v_min: 0.9375, v_max: 1.0 },
            QuadType::Dirt => AtlasRect { u_min: 0.125, u_max: 0.1875, v_min: 0.9375, v_max: 1.0 },
            QuadType::Stone => AtlasRect { u_min: 0.0, u_max: 0.0625, v_min: 0.875, v_max: 0.9375 },
        }
    }
}
