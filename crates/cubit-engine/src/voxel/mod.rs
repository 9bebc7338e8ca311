//! Voxel content drawn by the instanced pipeline.
//!
//! Every block type shares one cube mesh; each placed block becomes one
//! instance translation. The world is Z-up.

mod block;
mod chunk;
mod cube;

pub use block::{AtlasRect, Block, BlockType, Face, QuadType};
pub use chunk::{Chunk, World, CHUNK_SIZE, DEFAULT_FILL};
pub use cube::{cube_mesh, cube_vertices, CUBE_INDICES};
