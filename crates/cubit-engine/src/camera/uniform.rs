use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::pipeline::BindingError;

use super::{Camera, Projection};

/// Host mirror of the shader's camera block (group 1, binding 0).
///
/// WGSL aligns the `vec3` to 16 bytes, so `view_proj` starts at offset 16 and
/// the block is 80 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 3],
    pub _pad: f32, // vec3 -> 16-byte alignment
    /// Column-major combined view-projection.
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_position: Vec3, view_proj: Mat4) -> Self {
        Self {
            view_position: view_position.to_array(),
            _pad: 0.0,
            view_proj: view_proj.to_cols_array_2d(),
        }
    }

    pub fn from_camera(camera: &Camera, projection: &Projection) -> Self {
        Self::new(camera.position, projection.matrix() * camera.view_matrix())
    }

    /// Replaces the whole block. There is no per-field update.
    pub fn update(&mut self, view_position: Vec3, view_proj: Mat4) {
        *self = Self::new(view_position, view_proj);
    }

    #[inline]
    pub fn view_proj_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    #[inline]
    pub fn view_position(&self) -> Vec3 {
        Vec3::from_array(self.view_position)
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Mat4::IDENTITY)
    }
}

// ── layout contract ───────────────────────────────────────────────────────

/// Byte layout of a camera block as seen by one side of the binding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLayout {
    pub size: u64,
    pub view_position_offset: u64,
    pub view_proj_offset: u64,
}

impl UniformLayout {
    /// What the WGSL `CameraUniform` struct occupies.
    pub const SHADER: Self = Self {
        size: 80,
        view_position_offset: 0,
        view_proj_offset: 16,
    };

    /// What [`CameraUniform`] occupies on the host.
    pub const fn host() -> Self {
        Self {
            size: std::mem::size_of::<CameraUniform>() as u64,
            view_position_offset: std::mem::offset_of!(CameraUniform, view_position) as u64,
            view_proj_offset: std::mem::offset_of!(CameraUniform, view_proj) as u64,
        }
    }

    /// Compares against [`Self::SHADER`].
    pub fn validate(&self) -> Result<(), BindingError> {
        let expected = Self::SHADER;
        if self.size != expected.size {
            return Err(BindingError::UniformSizeMismatch {
                expected: expected.size,
                actual: self.size,
            });
        }
        if self.view_position_offset != expected.view_position_offset {
            return Err(BindingError::UniformOffsetMismatch {
                field: "view_position",
                expected: expected.view_position_offset,
                actual: self.view_position_offset,
            });
        }
        if self.view_proj_offset != expected.view_proj_offset {
            return Err(BindingError::UniformOffsetMismatch {
                field: "view_proj",
                expected: expected.view_proj_offset,
                actual: self.view_proj_offset,
            });
        }
        Ok(())
    }
}
