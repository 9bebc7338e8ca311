use anyhow::Result;
use glam::Vec2;
use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use cubit_engine::camera::{Camera, CameraBinding, CameraUniform, Projection};
use cubit_engine::core::{App, AppControl, FrameCtx};
use cubit_engine::picking::Ray;
use cubit_engine::pipeline::{pack_instances, InstanceRecord};
use cubit_engine::render::{GpuMesh, InstancedRenderer, MeshBatch};
use cubit_engine::voxel::{cube_mesh, BlockType, Chunk, World};

use crate::config::ViewerConfig;
use crate::controller::CameraController;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.2,
    b: 0.3,
    a: 1.0,
};

/// GPU resources created on the first frame.
struct Scene {
    meshes: Vec<(BlockType, GpuMesh)>,
    camera: CameraBinding,
    renderer: InstancedRenderer,
}

impl Scene {
    fn new(device: &wgpu::Device, uniform: CameraUniform) -> Result<Self> {
        let meshes = BlockType::ALL
            .iter()
            .map(|&ty| Ok((ty, GpuMesh::upload(device, &format!("{ty:?} cube"), &cube_mesh(ty))?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            meshes,
            camera: CameraBinding::new(device, uniform)?,
            renderer: InstancedRenderer::new(),
        })
    }
}

pub struct Viewer {
    config: ViewerConfig,
    world: World,
    /// Packed instances per block type, rebuilt when the world changes.
    instances: Vec<(BlockType, Vec<InstanceRecord>)>,

    camera: Camera,
    projection: Projection,
    controller: CameraController,

    cursor: Option<Vec2>,
    looking: bool,
    pending_pick: Option<Vec2>,

    scene: Option<Scene>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let mut world = World::new();
        for x in 0..config.chunks {
            for y in 0..config.chunks {
                let seed = config.seed ^ ((x as u64) << 32 | y as u64);
                world.insert_chunk([x, y, 0], Chunk::generate(seed, config.fill));
            }
        }
        log::info!(
            "generated {} blocks in {} chunks (seed {:#x}, fill {})",
            world.block_count(),
            config.chunks * config.chunks,
            config.seed,
            config.fill
        );

        let center = world.center();
        let camera = Camera::new(
            center + glam::Vec3::new(-24.0, -24.0, 20.0),
            std::f32::consts::FRAC_PI_4,
            -0.5,
        );
        let projection = Projection::new(1, 1, config.fov_degrees.to_radians(), 0.1, 500.0);
        let controller = CameraController::new(config.speed, config.sensitivity);

        let mut viewer = Self {
            config,
            world,
            instances: Vec::new(),
            camera,
            projection,
            controller,
            cursor: None,
            looking: false,
            pending_pick: None,
            scene: None,
        };
        viewer.rebuild_instances();
        viewer
    }

    fn rebuild_instances(&mut self) {
        self.instances = BlockType::ALL
            .iter()
            .map(|&ty| (ty, pack_instances(&self.world.instances(ty))))
            .collect();
    }

    fn pick(&mut self, cursor: Vec2, viewport: (u32, u32)) {
        let Some(ray) = Ray::from_cursor(cursor, viewport, &self.camera, &self.projection) else {
            return;
        };
        let Some(hit) = self.world.pick(&ray, self.config.pick_distance) else {
            log::debug!("pick at {cursor} hit nothing");
            return;
        };
        log::info!(
            "removed {:?} at {} ({:.1} away)",
            hit.block_type,
            hit.cell,
            hit.distance
        );
        self.world.remove_block(hit.cell);
        self.rebuild_instances();
    }
}

impl App for Viewer {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape && event.state == ElementState::Pressed {
                        return AppControl::Exit;
                    }
                    self.controller.process_keyboard(code, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Right => self.looking = *state == ElementState::Pressed,
                MouseButton::Left if *state == ElementState::Pressed => {
                    self.pending_pick = self.cursor;
                }
                _ => {}
            },
            WindowEvent::MouseWheel { delta, .. } => self.controller.process_scroll(delta),
            _ => {}
        }
        AppControl::Continue
    }

    fn on_device_event(&mut self, event: &DeviceEvent) -> AppControl {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.looking {
                self.controller.process_mouse(delta.0, delta.1);
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.window.size();
        self.projection.resize(size.0, size.1);
        self.controller.update_camera(&mut self.camera, ctx.time.dt);

        if let Some(cursor) = self.pending_pick.take() {
            self.pick(cursor, size);
        }

        if self.scene.is_none() {
            let uniform = CameraUniform::from_camera(&self.camera, &self.projection);
            match Scene::new(ctx.gpu.device(), uniform) {
                Ok(scene) => self.scene = Some(scene),
                Err(e) => {
                    log::error!("failed to set up scene: {e:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        scene
            .camera
            .update_from(ctx.gpu.queue(), &self.camera, &self.projection);

        let instances = &self.instances;
        ctx.render(CLEAR, |rctx, target| {
            let batches = scene
                .meshes
                .iter()
                .filter_map(|(ty, mesh)| {
                    let (_, records) = instances.iter().find(|(t, _)| t == ty)?;
                    Some(MeshBatch::new(mesh, records))
                })
                .collect::<Result<Vec<_>, _>>()?;
            scene.renderer.render(rctx, target, &scene.camera, &batches)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ViewerConfig {
        ViewerConfig {
            chunks: 1,
            fill: 1.0,
            ..ViewerConfig::default()
        }
    }

    #[test]
    fn instances_cover_every_block() {
        let viewer = Viewer::new(small_config());
        let total: usize = viewer.instances.iter().map(|(_, r)| r.len()).sum();
        assert_eq!(total, viewer.world.block_count());
        assert_eq!(total, 16 * 16 * 16);
    }

    #[test]
    fn picking_removes_block_under_cursor() {
        let mut viewer = Viewer::new(small_config());
        viewer.camera = Camera::new(glam::Vec3::new(8.5, 8.5, 30.0), 0.0, -std::f32::consts::FRAC_PI_2 + 0.0001);
        viewer.projection.resize(800, 600);
        let before = viewer.world.block_count();

        viewer.pick(Vec2::new(400.0, 300.0), (800, 600));

        assert_eq!(viewer.world.block_count(), before - 1);
        assert!(viewer.world.block_at(glam::IVec3::new(8, 8, 15)).is_none());
        let grass = viewer
            .instances
            .iter()
            .find(|(t, _)| *t == BlockType::Grass)
            .map(|(_, r)| r.len());
        assert_eq!(grass, Some(16 * 16 - 1));
    }
}
