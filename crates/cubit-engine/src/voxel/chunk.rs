use std::collections::BTreeMap;

use glam::{IVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::pipeline::InstanceTransform;

use super::{Block, BlockType};

/// Cells per chunk edge.
pub const CHUNK_SIZE: u8 = 16;

/// Default share of cells `Chunk::generate` fills.
pub const DEFAULT_FILL: f32 = 0.8;

/// A 16³ block of voxels keyed by local cell.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    blocks: BTreeMap<[u8; 3], Block>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic random fill.
    ///
    /// Cells are visited in x, y, z order and each one is occupied when its
    /// draw from a `seed`-seeded generator is below `fill`. The top layer is
    /// grass, the three under it dirt, everything deeper stone.
    pub fn generate(seed: u64, fill: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut chunk = Self::new();
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    if rng.random::<f32>() < fill {
                        chunk.set([x, y, z], Block::new(layer_type(z)));
                    }
                }
            }
        }
        chunk
    }

    /// Stores `block` at `cell`; out-of-range cells are ignored.
    pub fn set(&mut self, cell: [u8; 3], block: Block) {
        if cell.iter().all(|&c| c < CHUNK_SIZE) {
            self.blocks.insert(cell, block);
        }
    }

    pub fn get(&self, cell: [u8; 3]) -> Option<&Block> {
        self.blocks.get(&cell)
    }

    pub fn remove(&mut self, cell: [u8; 3]) -> Option<Block> {
        self.blocks.remove(&cell)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ([u8; 3], &Block)> {
        self.blocks.iter().map(|(k, v)| (*k, v))
    }
}

fn layer_type(z: u8) -> BlockType {
    match CHUNK_SIZE - 1 - z {
        0 => BlockType::Grass,
        1..=3 => BlockType::Dirt,
        _ => BlockType::Stone,
    }
}

/// All loaded chunks, keyed by chunk coordinate.
#[derive(Debug, Clone, Default)]
pub struct World {
    chunks: BTreeMap<[i32; 3], Chunk>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_chunk(&mut self, key: [i32; 3], chunk: Chunk) {
        self.chunks.insert(key, chunk);
    }

    pub fn chunk(&self, key: [i32; 3]) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Block at an absolute cell.
    pub fn block_at(&self, cell: IVec3) -> Option<&Block> {
        let (key, local) = split_cell(cell);
        self.chunks.get(&key)?.get(local)
    }

    pub fn remove_block(&mut self, cell: IVec3) -> Option<Block> {
        let (key, local) = split_cell(cell);
        self.chunks.get_mut(&key)?.remove(local)
    }

    /// One translation per block of `block_type`, placing the unit cube at its
    /// absolute cell.
    pub fn instances(&self, block_type: BlockType) -> Vec<InstanceTransform> {
        let size = i32::from(CHUNK_SIZE);
        self.chunks
            .iter()
            .flat_map(|(key, chunk)| {
                let origin = IVec3::from_array(*key) * size;
                chunk
                    .iter()
                    .filter(move |(_, b)| b.block_type == block_type)
                    .map(move |(cell, _)| {
                        let local = IVec3::new(cell[0].into(), cell[1].into(), cell[2].into());
                        InstanceTransform::from_translation((origin + local).as_vec3())
                    })
            })
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.chunks.values().map(Chunk::len).sum()
    }

    /// Center of the loaded volume, for placing a first camera.
    pub fn center(&self) -> Vec3 {
        if self.chunks.is_empty() {
            return Vec3::ZERO;
        }
        let size = f32::from(CHUNK_SIZE);
        let sum: Vec3 = self
            .chunks
            .keys()
            .map(|k| (IVec3::from_array(*k).as_vec3() + 0.5) * size)
            .sum();
        sum / self.chunks.len() as f32
    }
}

fn split_cell(cell: IVec3) -> ([i32; 3], [u8; 3]) {
    let size = i32::from(CHUNK_SIZE);
    let key = cell.div_euclid(IVec3::splat(size));
    let local = cell.rem_euclid(IVec3::splat(size));
    (key.to_array(), [local.x as u8, local.y as u8, local.z as u8])
}
