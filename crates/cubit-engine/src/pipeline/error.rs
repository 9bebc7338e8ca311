use std::fmt;

/// A setup-time violation of the transform-stage binding contract.
///
/// Every variant is fatal for the draw call being assembled: the pipeline
/// builder must refuse to issue it. Nothing in the stage itself can fail once
/// a draw has been bound.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingError {
    /// The host uniform block does not have the size the shader expects.
    UniformSizeMismatch { expected: u64, actual: u64 },
    /// A uniform field lives at the wrong byte offset.
    UniformOffsetMismatch {
        field: &'static str,
        expected: u64,
        actual: u64,
    },
    /// No buffer layout declares the given shader location.
    MissingAttribute { location: u32 },
    AttributeFormatMismatch {
        location: u32,
        expected: wgpu::VertexFormat,
        actual: wgpu::VertexFormat,
    },
    AttributeOffsetMismatch {
        location: u32,
        expected: u64,
        actual: u64,
    },
    /// The attribute advances at the wrong rate (per vertex vs per instance).
    StepModeMismatch {
        location: u32,
        expected: wgpu::VertexStepMode,
        actual: wgpu::VertexStepMode,
    },
    StrideMismatch {
        buffer: usize,
        expected: u64,
        actual: u64,
    },
    /// Declared vertex count differs from the vertex records supplied.
    VertexCountMismatch { declared: u32, actual: usize },
    /// Declared instance count differs from the instance records supplied.
    InstanceCountMismatch { declared: u32, actual: usize },
    /// An index references a vertex past the end of the mesh.
    IndexOutOfRange { index: u32, vertex_count: u32 },
    /// A draw with zero vertices or zero instances.
    EmptyDraw,
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniformSizeMismatch { expected, actual } => {
                write!(f, "uniform block is {actual} bytes, expected {expected}")
            }
            Self::UniformOffsetMismatch { field, expected, actual } => write!(
                f,
                "uniform field `{field}` at offset {actual}, expected {expected}"
            ),
            Self::MissingAttribute { location } => {
                write!(f, "no vertex buffer provides attribute location {location}")
            }
            Self::AttributeFormatMismatch { location, expected, actual } => write!(
                f,
                "attribute location {location} has format {actual:?}, expected {expected:?}"
            ),
            Self::AttributeOffsetMismatch { location, expected, actual } => write!(
                f,
                "attribute location {location} at offset {actual}, expected {expected}"
            ),
            Self::StepModeMismatch { location, expected, actual } => write!(
                f,
                "attribute location {location} steps per {actual:?}, expected {expected:?}"
            ),
            Self::StrideMismatch { buffer, expected, actual } => write!(
                f,
                "vertex buffer {buffer} has stride {actual}, expected {expected}"
            ),
            Self::VertexCountMismatch { declared, actual } => write!(
                f,
                "draw declares {declared} vertices but {actual} were bound"
            ),
            Self::InstanceCountMismatch { declared, actual } => write!(
                f,
                "draw declares {declared} instances but {actual} were bound"
            ),
            Self::IndexOutOfRange { index, vertex_count } => write!(
                f,
                "index {index} is out of range for a mesh of {vertex_count} vertices"
            ),
            Self::EmptyDraw => write!(f, "draw call has no vertices or no instances"),
        }
    }
}

impl std::error::Error for BindingError {}
