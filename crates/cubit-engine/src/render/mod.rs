//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers) and record into a
//! `RenderTarget` supplied by the frame loop. The frame loop clears color and
//! depth; renderers load both.

mod ctx;
mod depth;
mod instanced;
mod mesh;

pub use ctx::{RenderCtx, RenderTarget};
pub use depth::{DepthTexture, DEPTH_FORMAT};
pub use instanced::{InstancedRenderer, MeshBatch, MATERIAL_GROUP};
pub use mesh::{DrawMesh, GpuMesh, InstanceBuffer, MeshData};
