use crate::camera::CameraBinding;
use crate::pipeline::{validate_vertex_layouts, BindingError, DrawCounts, InstanceRecord, VertexRecord};
use crate::render::{RenderCtx, RenderTarget};

use super::mesh::{DrawMesh, GpuMesh, InstanceBuffer};

/// Bind group index reserved for material resources.
pub const MATERIAL_GROUP: u32 = 0;

/// One mesh drawn once per instance record.
///
/// `counts` is what the draw declares; it must agree with the mesh and the
/// records or the whole render call is refused.
#[derive(Debug, Copy, Clone)]
pub struct MeshBatch<'a> {
    pub mesh: &'a GpuMesh,
    pub instances: &'a [InstanceRecord],
    pub counts: DrawCounts,
}

impl<'a> MeshBatch<'a> {
    /// Declares the mesh's vertex count and one instance per record.
    pub fn new(mesh: &'a GpuMesh, instances: &'a [InstanceRecord]) -> Result<Self, BindingError> {
        let instance_count = instance_count(instances.len())?;
        Ok(Self {
            mesh,
            instances,
            counts: DrawCounts::new(mesh.vertex_count(), instance_count),
        })
    }
}

/// Record count as a draw count; more than `u32::MAX` records cannot be declared.
fn instance_count(records: usize) -> Result<u32, BindingError> {
    u32::try_from(records).map_err(|_| BindingError::InstanceCountMismatch {
        declared: u32::MAX,
        actual: records,
    })
}

/// Instances to draw for a batch, `None` when it declares and supplies none.
fn checked_instances(
    counts: DrawCounts,
    mesh_vertices: u32,
    records: usize,
) -> Result<Option<u32>, BindingError> {
    if counts.instance_count == 0 && records == 0 {
        return Ok(None);
    }
    counts.validate(mesh_vertices as usize, records)?;
    Ok(Some(counts.instance_count))
}

/// Draws instanced meshes through the transform stage.
///
/// The pipeline is built lazily per (surface, depth) format pair. Batches that
/// declare no instances and carry none are skipped; any other contract
/// violation aborts the whole render call before anything is uploaded or
/// recorded.
#[derive(Default)]
pub struct InstancedRenderer {
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,

    material_bgl: Option<wgpu::BindGroupLayout>,
    material_bind_group: Option<wgpu::BindGroup>,

    instance_buffers: Vec<InstanceBuffer>,
}

impl InstancedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex buffer layouts in slot order.
    pub fn buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        [VertexRecord::layout(), InstanceRecord::layout()]
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &CameraBinding,
        batches: &[MeshBatch<'_>],
    ) -> Result<(), BindingError> {
        let mut live: Vec<(&MeshBatch<'_>, u32)> = Vec::with_capacity(batches.len());
        for batch in batches {
            match checked_instances(batch.counts, batch.mesh.vertex_count(), batch.instances.len()) {
                Ok(Some(count)) => live.push((batch, count)),
                Ok(None) => {}
                Err(e) => {
                    log::error!("{}: {e}", batch.mesh.name);
                    return Err(e);
                }
            }
        }

        self.ensure_pipeline(ctx, camera)?;
        self.ensure_bindings(ctx);
        if live.is_empty() {
            return Ok(());
        }

        // Uploads need `&mut self`; do them all before borrowing for the pass.
        while self.instance_buffers.len() < live.len() {
            let label = format!("cubit instance vbo {}", self.instance_buffers.len());
            self.instance_buffers.push(InstanceBuffer::new(label));
        }
        for ((batch, _), buffer) in live.iter().zip(self.instance_buffers.iter_mut()) {
            buffer.write(ctx.device, ctx.queue, batch.instances);
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(material) = self.material_bind_group.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cubit instanced pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(MATERIAL_GROUP, material, &[]);

        for ((batch, count), buffer) in live.iter().zip(self.instance_buffers.iter()) {
            let Some(slice) = buffer.slice() else { continue };
            rpass.set_vertex_buffer(1, slice);
            rpass.draw_mesh_instanced(batch.mesh, 0..*count, camera.bind_group());
        }

        Ok(())
    }

    fn ensure_pipeline(
        &mut self,
        ctx: &RenderCtx<'_>,
        camera: &CameraBinding,
    ) -> Result<(), BindingError> {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && self.pipeline.is_some() {
            return Ok(());
        }

        let buffers = Self::buffer_layouts();
        if let Err(e) = validate_vertex_layouts(&buffers) {
            log::error!("instanced pipeline rejected: {e}");
            return Err(e);
        }
        log::debug!("building instanced pipeline for {formats:?}");

        let shader_src = include_str!("shaders/instanced.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cubit instanced shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let material_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("cubit material bgl"),
                entries: &[],
            });

        // Index in this list is the group number: MATERIAL_GROUP, CAMERA_GROUP.
        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("cubit instanced pipeline layout"),
                bind_group_layouts: &[&material_bgl, camera.layout()],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cubit instanced pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_formats = Some(formats);
        self.pipeline = Some(pipeline);
        self.material_bgl = Some(material_bgl);
        self.material_bind_group = None;
        Ok(())
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.material_bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.material_bgl.as_ref() else { return };

        self.material_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cubit material bind group"),
            layout: bgl,
            entries: &[],
        }));
    }
}
