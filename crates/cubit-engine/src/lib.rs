//! Cubit engine crate.
//!
//! Instanced voxel rendering on wgpu: the vertex-transform stage contract,
//! the camera uniform binding, chunk/world storage with ray picking, and the
//! window + GPU runtime that drives it all.

pub mod camera;
pub mod core;
pub mod device;
pub mod pipeline;
pub mod time;
pub mod window;

pub mod logging;
pub mod picking;
pub mod render;
pub mod voxel;
