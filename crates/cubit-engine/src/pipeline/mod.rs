//! Host side of the instanced transform stage.
//!
//! Inputs:
//! - slot 0: mesh vertices (`VertexRecord`), locations 0-1, per vertex
//! - slot 1: instance model matrices (`InstanceRecord`), locations 5-8, per instance
//! - group 1 / binding 0: `CameraUniform`
//!
//! Output per invocation: clip position + passthrough texture coordinates.
//! All checks happen when a draw is bound; invocations cannot fail.

mod error;
mod layout;
mod stage;

pub use error::BindingError;
pub use layout::{
    pack_instances, validate_vertex_layouts, InstanceRecord, InstanceTransform, VertexRecord,
    MODEL_MATRIX_LOCATIONS, POSITION_LOCATION, TEX_COORDS_LOCATION,
};
pub use stage::{transform, validate_indices, DrawBinding, DrawCounts, TransformOutput};
