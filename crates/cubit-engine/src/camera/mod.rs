//! Camera block: host layout, view/projection math and the GPU binding.
//!
//! The block is written by the frame loop between draws and is read-only for
//! every transform-stage invocation. Stage code receives it as an explicit
//! `&CameraUniform`, never through globals.

mod binding;
mod uniform;
mod view;

pub use binding::{CameraBinding, CAMERA_BINDING, CAMERA_GROUP};
pub use uniform::{CameraUniform, UniformLayout};
pub use view::{Camera, Projection};
