//! Vertex and instance buffer layouts for the transform stage.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use super::BindingError;

// ── shader locations ──────────────────────────────────────────────────────

pub const POSITION_LOCATION: u32 = 0;
pub const TEX_COORDS_LOCATION: u32 = 1;

/// Four consecutive `Float32x4` lanes carrying the model matrix columns.
pub const MODEL_MATRIX_LOCATIONS: [u32; 4] = [5, 6, 7, 8];

// ── vertex stream ─────────────────────────────────────────────────────────

/// One mesh vertex: object-space position and texture coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexRecord {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl VertexRecord {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // tex_coords
    ];

    #[inline]
    pub const fn new(position: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self { position, tex_coords }
    }

    /// Buffer layout for slot 0, advancing once per vertex.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexRecord>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── instance stream ───────────────────────────────────────────────────────

/// GPU-side per-instance record: the model matrix split into four columns.
///
/// Vertex formats top out at four components, so the matrix cannot be passed
/// as one attribute. Code outside this module should go through
/// [`InstanceTransform`] instead of touching the lanes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    columns: [[f32; 4]; 4],
}

impl InstanceRecord {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4
    ];

    /// Buffer layout for slot 1, advancing once per instance.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRecord>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// Raw lane `i` (matrix column `i`), `None` past the fourth lane.
    #[inline]
    pub fn lane(&self, i: usize) -> Option<[f32; 4]> {
        self.columns.get(i).copied()
    }
}

/// Object-to-world transform of one drawable instance.
///
/// Packs into an [`InstanceRecord`] at upload time and reassembles from one
/// when the stage reads it back.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InstanceTransform(Mat4);

impl InstanceTransform {
    pub const IDENTITY: Self = Self(Mat4::IDENTITY);

    #[inline]
    pub const fn from_matrix(matrix: Mat4) -> Self {
        Self(matrix)
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self(Mat4::from_translation(translation))
    }

    #[inline]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self(Mat4::from_rotation_translation(rotation, position))
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.0
    }

    /// Column-major split into the four attribute lanes.
    #[inline]
    pub fn to_record(&self) -> InstanceRecord {
        InstanceRecord {
            columns: self.0.to_cols_array_2d(),
        }
    }

    #[inline]
    pub fn from_record(record: &InstanceRecord) -> Self {
        Self(Mat4::from_cols_array_2d(&record.columns))
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for InstanceTransform {
    fn from(matrix: Mat4) -> Self {
        Self(matrix)
    }
}

impl From<InstanceTransform> for InstanceRecord {
    fn from(transform: InstanceTransform) -> Self {
        transform.to_record()
    }
}

/// Packs a slice of transforms for upload.
pub fn pack_instances(transforms: &[InstanceTransform]) -> Vec<InstanceRecord> {
    transforms.iter().map(InstanceTransform::to_record).collect()
}

// ── validation ────────────────────────────────────────────────────────────

struct ExpectedAttribute {
    location: u32,
    format: wgpu::VertexFormat,
    offset: u64,
    step_mode: wgpu::VertexStepMode,
}

const EXPECTED_ATTRIBUTES: [ExpectedAttribute; 6] = [
    ExpectedAttribute {
        location: POSITION_LOCATION,
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        step_mode: wgpu::VertexStepMode::Vertex,
    },
    ExpectedAttribute {
        location: TEX_COORDS_LOCATION,
        format: wgpu::VertexFormat::Float32x2,
        offset: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
    },
    ExpectedAttribute {
        location: MODEL_MATRIX_LOCATIONS[0],
        format: wgpu::VertexFormat::Float32x4,
        offset: 0,
        step_mode: wgpu::VertexStepMode::Instance,
    },
    ExpectedAttribute {
        location: MODEL_MATRIX_LOCATIONS[1],
        format: wgpu::VertexFormat::Float32x4,
        offset: 16,
        step_mode: wgpu::VertexStepMode::Instance,
    },
    ExpectedAttribute {
        location: MODEL_MATRIX_LOCATIONS[2],
        format: wgpu::VertexFormat::Float32x4,
        offset: 32,
        step_mode: wgpu::VertexStepMode::Instance,
    },
    ExpectedAttribute {
        location: MODEL_MATRIX_LOCATIONS[3],
        format: wgpu::VertexFormat::Float32x4,
        offset: 48,
        step_mode: wgpu::VertexStepMode::Instance,
    },
];

const fn expected_stride(step_mode: wgpu::VertexStepMode) -> u64 {
    match step_mode {
        wgpu::VertexStepMode::Vertex => std::mem::size_of::<VertexRecord>() as u64,
        wgpu::VertexStepMode::Instance => std::mem::size_of::<InstanceRecord>() as u64,
    }
}

/// Checks a set of buffer layouts against the stage's input contract.
///
/// Every expected location must be present with the right format, offset and
/// step mode, and every buffer carrying one must have the record stride for its
/// step mode. Extra locations are tolerated.
pub fn validate_vertex_layouts(
    layouts: &[wgpu::VertexBufferLayout<'_>],
) -> Result<(), BindingError> {
    for expected in &EXPECTED_ATTRIBUTES {
        let found = layouts.iter().enumerate().find_map(|(buffer, layout)| {
            layout
                .attributes
                .iter()
                .find(|a| a.shader_location == expected.location)
                .map(|a| (buffer, layout, a))
        });

        let Some((buffer, layout, attr)) = found else {
            return Err(BindingError::MissingAttribute {
                location: expected.location,
            });
        };

        if attr.format != expected.format {
            return Err(BindingError::AttributeFormatMismatch {
                location: expected.location,
                expected: expected.format,
                actual: attr.format,
            });
        }
        if attr.offset != expected.offset {
            return Err(BindingError::AttributeOffsetMismatch {
                location: expected.location,
                expected: expected.offset,
                actual: attr.offset,
            });
        }
        if layout.step_mode != expected.step_mode {
            return Err(BindingError::StepModeMismatch {
                location: expected.location,
                expected: expected.step_mode,
                actual: layout.step_mode,
            });
        }

        let stride = expected_stride(expected.step_mode);
        if layout.array_stride != stride {
            return Err(BindingError::StrideMismatch {
                buffer,
                expected: stride,
                actual: layout.array_stride,
            });
        }
    }
    Ok(())
}
