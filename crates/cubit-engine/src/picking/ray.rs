use glam::{Vec2, Vec3, Vec4};

use crate::camera::{Camera, Projection};

/// World-space ray with a unit direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Ray through a cursor position.
    ///
    /// `cursor` is in physical pixels with a top-left origin. Returns `None`
    /// for an empty viewport or a view-projection that cannot be inverted.
    pub fn from_cursor(
        cursor: Vec2,
        viewport: (u32, u32),
        camera: &Camera,
        projection: &Projection,
    ) -> Option<Self> {
        let (width, height) = viewport;
        if width == 0 || height == 0 {
            return None;
        }

        let ndc = Vec2::new(
            2.0 * cursor.x / width as f32 - 1.0,
            1.0 - 2.0 * cursor.y / height as f32,
        );

        let view_proj = projection.matrix() * camera.view_matrix();
        if view_proj.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let inverse = view_proj.inverse();

        let unproject = |depth: f32| {
            let p = inverse * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);

        let direction = (far - near).try_normalize()?;
        Some(Self {
            origin: camera.position,
            direction,
        })
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Camera, Projection) {
        (
            Camera::new(Vec3::new(0.0, 0.0, 2.0), 0.0, 0.0),
            Projection::new(800, 600, 1.0, 0.1, 100.0),
        )
    }

    #[test]
    fn center_of_screen_looks_forward() {
        let (camera, projection) = setup();
        let ray = Ray::from_cursor(Vec2::new(400.0, 300.0), (800, 600), &camera, &projection)
            .unwrap();
        assert!(ray.direction.abs_diff_eq(camera.forward(), 1e-4));
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn top_of_screen_tilts_up() {
        let (camera, projection) = setup();
        let ray = Ray::from_cursor(Vec2::new(400.0, 0.0), (800, 600), &camera, &projection)
            .unwrap();
        assert!(ray.direction.z > 0.0);
        // Half the vertical field of view.
        assert!((ray.direction.z.asin() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn left_of_screen_turns_left() {
        let (camera, projection) = setup();
        let ray = Ray::from_cursor(Vec2::new(0.0, 300.0), (800, 600), &camera, &projection)
            .unwrap();
        // Facing +X in a Z-up world, left is +Y.
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn empty_viewport_has_no_ray() {
        let (camera, projection) = setup();
        assert!(Ray::from_cursor(Vec2::ZERO, (0, 600), &camera, &projection).is_none());
    }
}
