//! Cursor picking against the voxel grid.

mod ray;
mod voxel_hit;

pub use ray::Ray;
pub use voxel_hit::PickHit;
