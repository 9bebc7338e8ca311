use glam::{Mat4, Vec3, Vec4};

use cubit_engine::camera::{Camera, CameraBinding, CameraUniform, Projection};
use cubit_engine::device::{GpuInit, HeadlessGpu};
use cubit_engine::logging::{init_logging, LoggingConfig};
use cubit_engine::pipeline::{
    pack_instances, BindingError, DrawBinding, DrawCounts, InstanceRecord, InstanceTransform,
    VertexRecord,
};
use cubit_engine::render::{GpuMesh, InstancedRenderer, MeshBatch, RenderCtx, RenderTarget};
use cubit_engine::voxel::{cube_mesh, BlockType, Chunk, World, CUBE_INDICES};

// ── CPU reference path ───────────────────────────────────────────────────────

#[test]
fn world_instances_drive_the_transform_stage() {
    let mut world = World::new();
    world.insert_chunk([0, 0, 0], Chunk::generate(42, 1.0));
    let grass = pack_instances(&world.instances(BlockType::Grass));
    assert_eq!(grass.len(), 16 * 16);

    let mesh = cube_mesh(BlockType::Grass);
    let counts = DrawCounts::new(mesh.vertices.len() as u32, grass.len() as u32);
    let draw = DrawBinding::bind_indexed(&mesh.vertices, &mesh.indices, &grass, counts)
        .expect("cube draw binds");

    let camera = CameraUniform::default();
    let outputs = draw.run(&camera);
    assert_eq!(outputs.len(), CUBE_INDICES.len() * grass.len());

    // Identity view_proj: clip position is the world position.
    for (i, chunk) in outputs.chunks(CUBE_INDICES.len()).enumerate() {
        let origin = draw.instance_transform(i as u32).unwrap().matrix().w_axis;
        for out in chunk {
            let local = out.clip_position - origin;
            assert!(local.x >= -1e-5 && local.x <= 1.0 + 1e-5);
            assert!(local.z >= -1e-5 && local.z <= 1.0 + 1e-5);
            assert_eq!(out.clip_position.w, 1.0);
        }
    }
}

#[test]
fn camera_uniform_projects_world_origin_to_screen_center() {
    let camera = Camera::new(Vec3::new(-10.0, 0.0, 0.5), 0.0, 0.0);
    let projection = Projection::new(800, 600, 45f32.to_radians(), 0.1, 100.0);
    let uniform = CameraUniform::from_camera(&camera, &projection);

    let mesh = cube_mesh(BlockType::Stone);
    let instances = pack_instances(&[InstanceTransform::from_translation(Vec3::new(
        -0.5, -0.5, 0.0,
    ))]);
    let draw = DrawBinding::bind(&mesh.vertices, &instances, DrawCounts::new(24, 1)).unwrap();

    // Any top-face corner lands inside the view volume.
    let out = draw.invoke(&uniform, 0, 0).unwrap();
    let ndc = out.clip_position / out.clip_position.w;
    assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn mismatched_draws_are_rejected_before_any_invocation() {
    let mesh = cube_mesh(BlockType::Dirt);
    let instances = pack_instances(&[InstanceTransform::IDENTITY]);

    let err = DrawBinding::bind(&mesh.vertices, &instances, DrawCounts::new(24, 2)).unwrap_err();
    assert_eq!(err, BindingError::InstanceCountMismatch { declared: 2, actual: 1 });

    let err = DrawBinding::bind(&mesh.vertices, &[], DrawCounts::new(24, 0)).unwrap_err();
    assert_eq!(err, BindingError::EmptyDraw);
}

#[test]
fn translated_instance_scenario() {
    let vertices = [VertexRecord::new([1.0, 0.0, 0.0], [0.25, 0.75])];
    let instances = pack_instances(&[InstanceTransform::from_translation(Vec3::new(
        2.0, 0.0, 0.0,
    ))]);
    let draw = DrawBinding::bind(&vertices, &instances, DrawCounts::new(1, 1)).unwrap();
    let camera = CameraUniform::new(Vec3::ZERO, Mat4::IDENTITY);

    let out = draw.run(&camera);
    assert_eq!(out[0].clip_position, Vec4::new(3.0, 0.0, 0.0, 1.0));
    assert_eq!(out[0].tex_coords.to_array(), [0.25, 0.75]);
}

// ── GPU path ─────────────────────────────────────────────────────────────────

const TARGET: u32 = 64;

fn headless() -> Option<HeadlessGpu> {
    init_logging(LoggingConfig::default());
    match pollster::block_on(HeadlessGpu::new(&GpuInit::default(), TARGET, TARGET)) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            log::warn!("skipping GPU test, no adapter: {e:#}");
            None
        }
    }
}

/// Clears color to transparent black and depth to 1.0.
fn clear_target(gpu: &HeadlessGpu, encoder: &mut wgpu::CommandEncoder) {
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("test clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: gpu.color_view(),
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: gpu.depth_view(),
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

fn draw(
    gpu: &HeadlessGpu,
    binding: &CameraBinding,
    batches: &[MeshBatch<'_>],
) -> Result<(), BindingError> {
    let mut renderer = InstancedRenderer::new();
    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    clear_target(gpu, &mut encoder);
    let result = {
        let rctx = RenderCtx::new(
            gpu.device(),
            gpu.queue(),
            HeadlessGpu::COLOR_FORMAT,
            gpu.depth_format(),
            gpu.size(),
        );
        let mut target = RenderTarget::new(&mut encoder, gpu.color_view(), gpu.depth_view());
        renderer.render(&rctx, &mut target, binding, batches)
    };
    gpu.queue().submit(std::iter::once(encoder.finish()));
    result
}

/// Signed area test; positive inside a CCW triangle, in NDC.
fn edge(a: Vec4, b: Vec4, p: (f32, f32)) -> f32 {
    (b.x - a.x) * (p.1 - a.y) - (b.y - a.y) * (p.0 - a.x)
}

/// Inside / outside for a pixel centre, `None` when it sits too close to an
/// edge to call.
fn covers(tri: &[Vec4], p: (f32, f32)) -> Option<bool> {
    let e = [edge(tri[0], tri[1], p), edge(tri[1], tri[2], p), edge(tri[2], tri[0], p)];
    if e.iter().any(|v| v.abs() < 0.05) {
        return None;
    }
    Some(e.iter().all(|v| *v > 0.0))
}

#[test]
fn gpu_pixels_match_cpu_transform() {
    let Some(gpu) = headless() else { return };

    // One CCW triangle in the lower-left of clip space, drawn twice: as is and
    // shifted right by one NDC unit.
    let uv = [0.25, 0.75];
    let mesh_data = cubit_engine::render::MeshData::new(
        vec![
            VertexRecord::new([-1.0, -1.0, 0.5], uv),
            VertexRecord::new([0.0, -1.0, 0.5], uv),
            VertexRecord::new([-1.0, 1.0, 0.5], uv),
        ],
        vec![0, 1, 2],
    );
    let instances: Vec<InstanceRecord> = pack_instances(&[
        InstanceTransform::IDENTITY,
        InstanceTransform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
    ]);
    let camera = CameraUniform::new(Vec3::ZERO, Mat4::IDENTITY);

    let binding = CameraBinding::new(gpu.device(), camera).expect("camera binding");
    let mesh = GpuMesh::upload(gpu.device(), "triangle", &mesh_data).expect("mesh upload");
    let batch = MeshBatch::new(&mesh, &instances).expect("batch");
    draw(&gpu, &binding, &[batch]).expect("instanced render");
    let pixels = gpu.read_color().expect("readback");

    let cpu = DrawBinding::bind_indexed(
        &mesh_data.vertices,
        &mesh_data.indices,
        &instances,
        DrawCounts::new(3, 2),
    )
    .unwrap()
    .run(&camera);
    let triangles: Vec<Vec<Vec4>> = cpu
        .chunks(3)
        .map(|t| t.iter().map(|o| o.clip_position / o.clip_position.w).collect())
        .collect();
    let expected_rgb = [
        (cpu[0].tex_coords.x * 255.0).round() as i32,
        (cpu[0].tex_coords.y * 255.0).round() as i32,
        128,
    ];

    let (mut inside, mut outside) = (0, 0);
    for py in (2..TARGET).step_by(4) {
        for px in (2..TARGET).step_by(4) {
            let ndc = (
                (px as f32 + 0.5) / TARGET as f32 * 2.0 - 1.0,
                1.0 - (py as f32 + 0.5) / TARGET as f32 * 2.0,
            );
            let verdicts: Vec<Option<bool>> = triangles.iter().map(|t| covers(t, ndc)).collect();
            if verdicts.iter().any(Option::is_none) {
                continue;
            }
            let covered = verdicts.iter().any(|v| *v == Some(true));

            let i = ((py * TARGET + px) * 4) as usize;
            let got = &pixels[i..i + 4];
            if covered {
                inside += 1;
                for (c, want) in got[..3].iter().zip(expected_rgb) {
                    assert!((i32::from(*c) - want).abs() <= 1, "pixel {px},{py}: {got:?}");
                }
                assert_eq!(got[3], 255, "pixel {px},{py}");
            } else {
                outside += 1;
                assert_eq!(got, [0, 0, 0, 0], "pixel {px},{py} should be clear");
            }
        }
    }
    assert!(inside > 20 && outside > 20, "inside {inside}, outside {outside}");
}

#[test]
fn gpu_render_refuses_wrong_declared_instance_count() {
    let Some(gpu) = headless() else { return };

    let binding = CameraBinding::new(gpu.device(), CameraUniform::default()).unwrap();
    let mesh = GpuMesh::upload(gpu.device(), "stone", &cube_mesh(BlockType::Stone)).unwrap();
    let instances = pack_instances(&[InstanceTransform::IDENTITY]);
    let batch = MeshBatch {
        mesh: &mesh,
        instances: &instances,
        counts: DrawCounts::new(24, 2),
    };

    assert_eq!(
        draw(&gpu, &binding, &[batch]),
        Err(BindingError::InstanceCountMismatch { declared: 2, actual: 1 })
    );
}

#[test]
fn camera_binding_drives_world_draw() {
    let Some(gpu) = headless() else { return };

    let camera = Camera::new(Vec3::new(-4.0, 0.5, 0.5), 0.0, 0.0);
    let projection = Projection::new(TARGET, TARGET, 1.0, 0.1, 50.0);
    let mut binding = CameraBinding::new(
        gpu.device(),
        CameraUniform::from_camera(&camera, &projection),
    )
    .expect("camera binding");
    binding.update_from(gpu.queue(), &camera, &projection);

    let mesh = GpuMesh::upload(gpu.device(), "stone", &cube_mesh(BlockType::Stone)).unwrap();
    let instances = pack_instances(&[InstanceTransform::IDENTITY]);
    let empty: [InstanceRecord; 0] = [];
    let batches = [
        MeshBatch::new(&mesh, &instances).unwrap(),
        MeshBatch::new(&mesh, &empty).unwrap(),
    ];
    draw(&gpu, &binding, &batches).expect("instanced render");

    // The cube sits dead ahead, so the centre pixel is no longer clear.
    let pixels = gpu.read_color().expect("readback");
    let centre = (((TARGET / 2) * TARGET + TARGET / 2) * 4) as usize;
    assert_ne!(&pixels[centre..centre + 4], &[0, 0, 0, 0]);
}
