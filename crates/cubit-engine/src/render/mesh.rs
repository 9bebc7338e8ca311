use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::camera::CAMERA_GROUP;
use crate::pipeline::{validate_indices, BindingError, InstanceRecord, VertexRecord};

/// CPU-side indexed mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<VertexRecord>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn new(vertices: Vec<VertexRecord>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }
}

/// Immutable vertex + index buffers of one mesh.
pub struct GpuMesh {
    pub name: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: u32,
    num_elements: u32,
}

impl GpuMesh {
    /// Uploads `data`. Indices are checked against the vertex count first.
    pub fn upload(device: &wgpu::Device, name: &str, data: &MeshData) -> Result<Self, BindingError> {
        if data.vertices.is_empty() || data.indices.is_empty() {
            return Err(BindingError::EmptyDraw);
        }
        let vertex_count = data.vertices.len() as u32;
        validate_indices(&data.indices, vertex_count)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} vbo")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} ibo")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            vertex_count,
            num_elements: data.indices.len() as u32,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn num_elements(&self) -> u32 {
        self.num_elements
    }
}

impl std::fmt::Debug for GpuMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuMesh")
            .field("name", &self.name)
            .field("vertex_count", &self.vertex_count)
            .field("num_elements", &self.num_elements)
            .finish()
    }
}

/// Growable per-instance vertex buffer.
pub struct InstanceBuffer {
    label: String,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    len: usize,
}

impl InstanceBuffer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            buffer: None,
            capacity: 0,
            len: 0,
        }
    }

    /// Replaces the contents, growing to the next power of two (at least 64).
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, records: &[InstanceRecord]) {
        self.ensure_capacity(device, records.len());
        self.len = records.len();
        if records.is_empty() {
            return;
        }
        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(records));
        }
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.capacity && self.buffer.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<InstanceRecord>()) as u64;
        log::debug!("{}: growing instance buffer to {new_cap} records", self.label);

        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&self.label),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
    }

    /// Records written by the last `write`.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slice covering the live records, `None` before the first write.
    pub fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        let bytes = (self.len * std::mem::size_of::<InstanceRecord>()) as u64;
        self.buffer.as_ref().map(|b| b.slice(..bytes))
    }
}

/// Draw helper on a render pass whose pipeline and instance buffer (slot 1)
/// are already set.
pub trait DrawMesh {
    fn draw_mesh_instanced(&mut self, mesh: &GpuMesh, instances: Range<u32>, camera: &wgpu::BindGroup);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(&mut self, mesh: &GpuMesh, instances: Range<u32>, camera: &wgpu::BindGroup) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        self.set_bind_group(CAMERA_GROUP, camera, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}
