use std::f32::consts::FRAC_PI_2;

use cubit_engine::camera::Camera;
use glam::Vec3;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::KeyCode;

const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Accumulates input between frames and applies it to a [`Camera`].
#[derive(Debug, Clone)]
pub struct CameraController {
    forward: f32,
    backward: f32,
    left: f32,
    right: f32,
    up: f32,
    down: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            forward: 0.0,
            backward: 0.0,
            left: 0.0,
            right: 0.0,
            up: 0.0,
            down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Returns `true` when the key moves the camera.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let amount = if state == ElementState::Pressed { 1.0 } else { 0.0 };
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.forward = amount,
            KeyCode::KeyS | KeyCode::ArrowDown => self.backward = amount,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = amount,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = amount,
            KeyCode::Space => self.up = amount,
            KeyCode::ShiftLeft => self.down = amount,
            _ => return false,
        }
        true
    }

    pub fn process_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 20.0,
        };
    }

    /// Applies held keys scaled by `dt`, then consumes mouse and scroll input.
    pub fn update_camera(&mut self, camera: &mut Camera, dt: f32) {
        let (sin_yaw, cos_yaw) = camera.yaw.sin_cos();
        let flat_forward = Vec3::new(cos_yaw, sin_yaw, 0.0);
        let flat_right = Vec3::new(sin_yaw, -cos_yaw, 0.0);

        let step = self.speed * dt;
        camera.position += flat_forward * (self.forward - self.backward) * step;
        camera.position += flat_right * (self.right - self.left) * step;
        camera.position.z += (self.up - self.down) * step;

        // Scroll zooms along the full view direction.
        camera.position += camera.forward() * self.scroll * self.speed * 0.1;
        self.scroll = 0.0;

        camera.yaw -= self.rotate_horizontal * self.sensitivity;
        camera.pitch -= self.rotate_vertical * self.sensitivity;
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;

        camera.pitch = camera.pitch.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
    }
}
