use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::pipeline::BindingError;

use super::{Camera, CameraUniform, Projection, UniformLayout};

/// Bind group index of the camera block.
pub const CAMERA_GROUP: u32 = 1;
/// Binding slot of the camera block inside [`CAMERA_GROUP`].
pub const CAMERA_BINDING: u32 = 0;

/// GPU copy of the camera block plus its bind group.
///
/// `update` goes through `Queue::write_buffer`, which is ordered against
/// submissions: draws already submitted keep reading the previous block, draws
/// submitted afterwards see the whole new one.
pub struct CameraBinding {
    uniform: CameraUniform,
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl CameraBinding {
    /// Validates the host block layout, then creates buffer, layout and group.
    pub fn new(device: &wgpu::Device, initial: CameraUniform) -> Result<Self, BindingError> {
        if let Err(e) = UniformLayout::host().validate() {
            log::error!("camera uniform layout rejected: {e}");
            return Err(e);
        }

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cubit camera bgl"),
            entries: &[Self::layout_entry()],
        });

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cubit camera ubo"),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cubit camera bind group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: CAMERA_BINDING,
                resource: buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            uniform: initial,
            buffer,
            layout,
            bind_group,
        })
    }

    /// Layout entry for the camera block: vertex-visible, fixed size.
    pub fn layout_entry() -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: CAMERA_BINDING,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(camera_ubo_min_binding_size()),
            },
            count: None,
        }
    }

    /// Replaces the block contents with a single write.
    pub fn update(&mut self, queue: &wgpu::Queue, view_position: Vec3, view_proj: Mat4) {
        self.uniform.update(view_position, view_proj);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.uniform));
    }

    pub fn update_from(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        let next = CameraUniform::from_camera(camera, projection);
        self.update(queue, next.view_position(), next.view_proj_matrix());
    }

    /// Last block written from the host.
    pub fn uniform(&self) -> &CameraUniform {
        &self.uniform
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// `CameraUniform` is 80 bytes, so the size is non-zero by construction.
fn camera_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<CameraUniform>() as u64)
        .expect("CameraUniform has non-zero size by construction")
}
