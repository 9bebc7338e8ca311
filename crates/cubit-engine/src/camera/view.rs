use glam::{Mat4, Vec3};

/// Fly camera in a Z-up world.
///
/// `yaw` rotates around +Z starting from +X, `pitch` lifts towards +Z.
/// Both are radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self { position, yaw, pitch }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Z)
    }
}

/// Perspective projection into wgpu clip space (depth in `[0, 1]`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    /// Vertical field of view, radians.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: f32, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            aspect: 1.0,
            fovy,
            znear,
            zfar,
        };
        projection.resize(width, height);
        projection
    }

    /// Zero-sized surfaces (minimized windows) keep the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn forward_follows_yaw_around_z() {
        let c = Camera::new(Vec3::ZERO, FRAC_PI_2, 0.0);
        assert!(c.forward().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn view_matrix_puts_target_on_negative_z() {
        let c = Camera::new(Vec3::new(-5.0, 0.0, 0.0), 0.0, 0.0);
        let p = c.view_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
    }

    #[test]
    fn resize_ignores_zero_sizes() {
        let mut p = Projection::new(800, 400, 0.8, 0.1, 100.0);
        assert_eq!(p.aspect, 2.0);
        p.resize(0, 300);
        assert_eq!(p.aspect, 2.0);
    }

    #[test]
    fn near_and_far_planes_map_to_unit_depth() {
        let p = Projection::new(1, 1, 1.0, 0.5, 50.0).matrix();
        let near = p.project_point3(Vec3::new(0.0, 0.0, -0.5));
        let far = p.project_point3(Vec3::new(0.0, 0.0, -50.0));
        assert!((near.z - 0.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }
}
