use glam::IVec3;

use crate::voxel::{BlockType, World};

use super::Ray;

/// First occupied cell along a ray.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub cell: IVec3,
    /// Outward normal of the face the ray entered through; zero when the ray
    /// starts inside the block.
    pub normal: IVec3,
    pub distance: f32,
    pub block_type: BlockType,
}

impl World {
    /// Walks the grid cell by cell (Amanatides-Woo) up to `max_distance`.
    pub fn pick(&self, ray: &Ray, max_distance: f32) -> Option<PickHit> {
        if !max_distance.is_finite() || ray.direction.length_squared() == 0.0 {
            return None;
        }

        let dir = ray.direction;
        let mut cell = ray.origin.floor().as_ivec3();
        let step = IVec3::new(axis_step(dir.x), axis_step(dir.y), axis_step(dir.z));

        let t_delta = dir.recip().abs();
        let mut t_max = glam::Vec3::new(
            first_crossing(ray.origin.x, cell.x, dir.x),
            first_crossing(ray.origin.y, cell.y, dir.y),
            first_crossing(ray.origin.z, cell.z, dir.z),
        );

        let mut normal = IVec3::ZERO;
        let mut t = 0.0;
        loop {
            if let Some(block) = self.block_at(cell) {
                return Some(PickHit {
                    cell,
                    normal,
                    distance: t,
                    block_type: block.block_type,
                });
            }

            if t_max.x < t_max.y && t_max.x < t_max.z {
                cell.x += step.x;
                t = t_max.x;
                t_max.x += t_delta.x;
                normal = IVec3::new(-step.x, 0, 0);
            } else if t_max.y < t_max.z {
                cell.y += step.y;
                t = t_max.y;
                t_max.y += t_delta.y;
                normal = IVec3::new(0, -step.y, 0);
            } else {
                cell.z += step.z;
                t = t_max.z;
                t_max.z += t_delta.z;
                normal = IVec3::new(0, 0, -step.z);
            }

            if t > max_distance {
                return None;
            }
        }
    }
}

fn axis_step(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// Ray parameter at which the origin leaves its cell along one axis.
fn first_crossing(origin: f32, cell: i32, d: f32) -> f32 {
    if d > 0.0 {
        (cell as f32 + 1.0 - origin) / d
    } else if d < 0.0 {
        (origin - cell as f32) / -d
    } else {
        f32::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{Block, Chunk};
    use glam::Vec3;

    fn single_block_world(cell: [u8; 3]) -> World {
        let mut chunk = Chunk::new();
        chunk.set(cell, Block::new(BlockType::Stone));
        let mut world = World::new();
        world.insert_chunk([0, 0, 0], chunk);
        world
    }

    #[test]
    fn straight_down_hits_top_face() {
        let world = single_block_world([0, 0, 0]);
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 5.5),
            direction: Vec3::NEG_Z,
        };
        let hit = world.pick(&ray, 32.0).unwrap();
        assert_eq!(hit.cell, IVec3::ZERO);
        assert_eq!(hit.normal, IVec3::Z);
        assert!((hit.distance - 4.5).abs() < 1e-6);
        assert_eq!(hit.block_type, BlockType::Stone);
    }

    #[test]
    fn diagonal_ray_enters_through_side() {
        let world = single_block_world([3, 0, 0]);
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 0.5),
            direction: Vec3::new(1.0, 0.0, 0.0),
        };
        let hit = world.pick(&ray, 32.0).unwrap();
        assert_eq!(hit.cell, IVec3::new(3, 0, 0));
        assert_eq!(hit.normal, IVec3::NEG_X);
        assert!((hit.distance - 2.5).abs() < 1e-6);
    }

    #[test]
    fn distance_limit_stops_walk() {
        let world = single_block_world([0, 0, 0]);
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 10.5),
            direction: Vec3::NEG_Z,
        };
        assert!(world.pick(&ray, 5.0).is_none());
    }

    #[test]
    fn ray_starting_inside_block_hits_immediately() {
        let world = single_block_world([2, 2, 2]);
        let ray = Ray {
            origin: Vec3::new(2.5, 2.5, 2.5),
            direction: Vec3::X,
        };
        let hit = world.pick(&ray, 1.0).unwrap();
        assert_eq!(hit.normal, IVec3::ZERO);
        assert_eq!(hit.distance, 0.0);
    }
}
