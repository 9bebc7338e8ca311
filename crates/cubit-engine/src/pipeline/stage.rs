//! CPU reference of the vertex stage and the draw binding that feeds it.
//!
//! `shaders/instanced.wgsl` runs the same arithmetic on the GPU. The binding
//! checks here are the ones the renderer performs before issuing a draw.

use glam::{Vec2, Vec3, Vec4};

use crate::camera::CameraUniform;

use super::{BindingError, InstanceRecord, InstanceTransform, VertexRecord};

/// What one invocation hands to the rasterizer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformOutput {
    /// Homogeneous clip-space position, before perspective division.
    pub clip_position: Vec4,
    /// Copied from the vertex record unchanged.
    pub tex_coords: Vec2,
}

/// Runs the stage for one (vertex, instance) pair.
///
/// `view_proj * model * (position, 1)`; the model matrix is applied first.
/// Pure: no state, no failure path.
#[inline]
pub fn transform(
    camera: &CameraUniform,
    vertex: &VertexRecord,
    instance: &InstanceRecord,
) -> TransformOutput {
    let model = InstanceTransform::from_record(instance).matrix();
    let position = Vec3::from_array(vertex.position).extend(1.0);
    TransformOutput {
        clip_position: camera.view_proj_matrix() * model * position,
        tex_coords: Vec2::from_array(vertex.tex_coords),
    }
}

// ── draw counts ───────────────────────────────────────────────────────────

/// Counts a draw call declares up front.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCounts {
    pub vertex_count: u32,
    pub instance_count: u32,
}

impl DrawCounts {
    #[inline]
    pub const fn new(vertex_count: u32, instance_count: u32) -> Self {
        Self {
            vertex_count,
            instance_count,
        }
    }

    /// Checks the declaration against the record counts actually bound.
    pub fn validate(&self, vertices: usize, instances: usize) -> Result<(), BindingError> {
        if self.vertex_count == 0 || self.instance_count == 0 {
            return Err(BindingError::EmptyDraw);
        }
        if self.vertex_count as usize != vertices {
            return Err(BindingError::VertexCountMismatch {
                declared: self.vertex_count,
                actual: vertices,
            });
        }
        if self.instance_count as usize != instances {
            return Err(BindingError::InstanceCountMismatch {
                declared: self.instance_count,
                actual: instances,
            });
        }
        Ok(())
    }
}

/// Fails on the first index that does not address a mesh vertex.
pub fn validate_indices(indices: &[u16], vertex_count: u32) -> Result<(), BindingError> {
    match indices.iter().find(|&&i| u32::from(i) >= vertex_count) {
        Some(&index) => Err(BindingError::IndexOutOfRange {
            index: u32::from(index),
            vertex_count,
        }),
        None => Ok(()),
    }
}

// ── draw binding ──────────────────────────────────────────────────────────

/// A validated pairing of one mesh's vertex stream with an instance stream.
///
/// The vertex stream advances per vertex, the instance stream per instance;
/// every vertex of instance `i` sees the same instance record. Both slices stay
/// owned by the mesh and instance managers.
#[derive(Debug, Copy, Clone)]
pub struct DrawBinding<'a> {
    vertices: &'a [VertexRecord],
    instances: &'a [InstanceRecord],
    indices: Option<&'a [u16]>,
}

impl<'a> DrawBinding<'a> {
    /// Associates both streams with a draw declaring `counts`.
    pub fn bind(
        mesh_vertices: &'a [VertexRecord],
        instance_transforms: &'a [InstanceRecord],
        counts: DrawCounts,
    ) -> Result<Self, BindingError> {
        if let Err(e) = counts.validate(mesh_vertices.len(), instance_transforms.len()) {
            log::warn!("refusing draw: {e}");
            return Err(e);
        }
        Ok(Self {
            vertices: mesh_vertices,
            instances: instance_transforms,
            indices: None,
        })
    }

    /// Like [`bind`](Self::bind) for an indexed draw: invocations follow the
    /// index order instead of vertex order.
    pub fn bind_indexed(
        mesh_vertices: &'a [VertexRecord],
        indices: &'a [u16],
        instance_transforms: &'a [InstanceRecord],
        counts: DrawCounts,
    ) -> Result<Self, BindingError> {
        let mut binding = Self::bind(mesh_vertices, instance_transforms, counts)?;
        if indices.is_empty() {
            log::warn!("refusing draw: no indices");
            return Err(BindingError::EmptyDraw);
        }
        if let Err(e) = validate_indices(indices, counts.vertex_count) {
            log::warn!("refusing draw: {e}");
            return Err(e);
        }
        binding.indices = Some(indices);
        Ok(binding)
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Invocations per instance: index count for indexed draws.
    #[inline]
    pub fn invocations_per_instance(&self) -> u32 {
        match self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertex_count(),
        }
    }

    /// Reassembled model matrix of instance `i`.
    pub fn instance_transform(&self, i: u32) -> Option<InstanceTransform> {
        self.instances
            .get(i as usize)
            .map(InstanceTransform::from_record)
    }

    /// One invocation. `invocation` counts within the instance, through the
    /// index buffer if there is one.
    pub fn invoke(
        &self,
        camera: &CameraUniform,
        instance: u32,
        invocation: u32,
    ) -> Option<TransformOutput> {
        let instance = self.instances.get(instance as usize)?;
        let vertex = match self.indices {
            Some(indices) => usize::from(*indices.get(invocation as usize)?),
            None => invocation as usize,
        };
        let vertex = self.vertices.get(vertex)?;
        Some(transform(camera, vertex, instance))
    }

    /// Outputs of every invocation of instance `i`, in vertex order.
    pub fn instance_outputs<'c>(
        &self,
        camera: &'c CameraUniform,
        instance: u32,
    ) -> impl Iterator<Item = TransformOutput> + use<'a, 'c> {
        let binding = *self;
        (0..binding.invocations_per_instance())
            .filter_map(move |v| binding.invoke(camera, instance, v))
    }

    /// Outputs of the whole draw, instance-major.
    ///
    /// Invocations are independent; the order is only for the caller's
    /// convenience.
    pub fn run(&self, camera: &CameraUniform) -> Vec<TransformOutput> {
        let per_instance = self.invocations_per_instance() as usize;
        let mut out = Vec::with_capacity(per_instance * self.instances.len());
        for i in 0..self.instance_count() {
            out.extend(self.instance_outputs(camera, i));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Quat};

    fn identity_camera() -> CameraUniform {
        CameraUniform::default()
    }

    fn record(m: Mat4) -> InstanceRecord {
        InstanceTransform::from_matrix(m).to_record()
    }

    // ── transform ─────────────────────────────────────────────────────────

    #[test]
    fn identity_matrices_lift_position_to_w_one() {
        let v = VertexRecord::new([0.25, -3.0, 7.5], [0.1, 0.9]);
        let out = transform(&identity_camera(), &v, &record(Mat4::IDENTITY));
        assert_eq!(out.clip_position, Vec4::new(0.25, -3.0, 7.5, 1.0));
    }

    #[test]
    fn translated_instance_under_identity_camera() {
        let v = VertexRecord::new([1.0, 0.0, 0.0], [0.0, 0.0]);
        let inst = record(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        let out = transform(&identity_camera(), &v, &inst);
        assert_eq!(out.clip_position, Vec4::new(3.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn model_is_applied_before_view_proj() {
        let view_proj = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let model = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let camera = CameraUniform::new(Vec3::ZERO, view_proj);
        let v = VertexRecord::new([0.0, 0.0, 0.0], [0.0, 0.0]);

        let out = transform(&camera, &v, &record(model));
        // scale(translate(p)) = (2, 0, 0); translate(scale(p)) would be (1, 0, 0).
        assert_eq!(out.clip_position, Vec4::new(2.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn combined_matrix_equals_sequential_application() {
        let a = Mat4::perspective_rh(0.9, 1.6, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(3.0, -4.0, 2.0), Vec3::ZERO, Vec3::Z);
        let b = Mat4::from_scale_rotation_translation(
            Vec3::new(1.5, 0.5, 2.0),
            Quat::from_rotation_y(0.4),
            Vec3::new(-1.0, 2.0, 0.5),
        );
        let camera = CameraUniform::new(Vec3::ZERO, a);
        for p in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-2.5, 0.3, 4.0]] {
            let v = VertexRecord::new(p, [0.0, 0.0]);
            let out = transform(&camera, &v, &record(b));
            let sequential = a * (b * Vec3::from_array(p).extend(1.0));
            assert!(out.clip_position.abs_diff_eq(sequential, 1e-5));
        }
    }

    #[test]
    fn tex_coords_pass_through_untouched() {
        let camera = CameraUniform::new(Vec3::ONE, Mat4::from_rotation_x(1.1));
        let v = VertexRecord::new([9.0, 9.0, 9.0], [0.1875, 0.0625]);
        let inst = record(Mat4::from_scale(Vec3::splat(0.0)));
        assert_eq!(transform(&camera, &v, &inst).tex_coords, Vec2::new(0.1875, 0.0625));
    }

    #[test]
    fn degenerate_view_proj_degrades_without_failing() {
        let camera = CameraUniform::new(Vec3::ZERO, Mat4::ZERO);
        let v = VertexRecord::new([1.0, 2.0, 3.0], [0.5, 0.5]);
        let out = transform(&camera, &v, &record(Mat4::IDENTITY));
        assert_eq!(out.clip_position, Vec4::ZERO);
    }

    // ── counts ────────────────────────────────────────────────────────────

    #[test]
    fn mismatched_instance_count_is_fatal() {
        let verts = [VertexRecord::new([0.0; 3], [0.0; 2]); 3];
        let insts = [record(Mat4::IDENTITY); 2];
        let err = DrawBinding::bind(&verts, &insts, DrawCounts::new(3, 4)).unwrap_err();
        assert_eq!(err, BindingError::InstanceCountMismatch { declared: 4, actual: 2 });
    }

    #[test]
    fn mismatched_vertex_count_is_fatal() {
        let verts = [VertexRecord::new([0.0; 3], [0.0; 2]); 3];
        let insts = [record(Mat4::IDENTITY)];
        let err = DrawBinding::bind(&verts, &insts, DrawCounts::new(4, 1)).unwrap_err();
        assert_eq!(err, BindingError::VertexCountMismatch { declared: 4, actual: 3 });
    }

    #[test]
    fn zero_instance_draw_is_rejected() {
        let verts = [VertexRecord::new([0.0; 3], [0.0; 2])];
        let err = DrawBinding::bind(&verts, &[], DrawCounts::new(1, 0)).unwrap_err();
        assert_eq!(err, BindingError::EmptyDraw);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let verts = [VertexRecord::new([0.0; 3], [0.0; 2]); 3];
        let insts = [record(Mat4::IDENTITY)];
        let err = DrawBinding::bind_indexed(&verts, &[0, 1, 3], &insts, DrawCounts::new(3, 1))
            .unwrap_err();
        assert_eq!(err, BindingError::IndexOutOfRange { index: 3, vertex_count: 3 });
    }

    #[test]
    fn indexed_draw_without_indices_is_rejected() {
        let verts = [VertexRecord::new([0.0; 3], [0.0; 2]); 3];
        let insts = [record(Mat4::IDENTITY)];
        let err = DrawBinding::bind_indexed(&verts, &[], &insts, DrawCounts::new(3, 1)).unwrap_err();
        assert_eq!(err, BindingError::EmptyDraw);
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn two_instances_share_one_vertex() {
        let verts = [VertexRecord::new([0.0, 0.0, 0.0], [0.3, 0.7])];
        let insts = [
            record(Mat4::IDENTITY),
            record(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))),
        ];
        let binding = DrawBinding::bind(&verts, &insts, DrawCounts::new(1, 2)).unwrap();
        let out = binding.run(&identity_camera());

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].clip_position, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(out[1].clip_position, Vec4::new(5.0, 0.0, 0.0, 1.0));
        assert_eq!(out[0].tex_coords, out[1].tex_coords);
    }

    #[test]
    fn each_instance_matches_a_single_instance_draw() {
        let verts = [
            VertexRecord::new([0.0, 0.0, 0.0], [0.0, 0.0]),
            VertexRecord::new([1.0, 0.0, 0.0], [1.0, 0.0]),
            VertexRecord::new([0.0, 1.0, 1.0], [0.0, 1.0]),
        ];
        let insts = [
            record(Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0))),
            record(Mat4::from_rotation_z(0.5)),
            record(Mat4::from_scale(Vec3::new(2.0, 1.0, 0.5))),
        ];
        let camera = CameraUniform::new(Vec3::ZERO, Mat4::perspective_rh(1.0, 1.0, 0.1, 10.0));
        let batched = DrawBinding::bind(&verts, &insts, DrawCounts::new(3, 3)).unwrap();

        for (i, inst) in insts.iter().enumerate() {
            let single_slice = std::slice::from_ref(inst);
            let single = DrawBinding::bind(&verts, single_slice, DrawCounts::new(3, 1)).unwrap();
            let expected: Vec<_> = single.instance_outputs(&camera, 0).collect();
            let actual: Vec<_> = batched.instance_outputs(&camera, i as u32).collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn indexed_draw_follows_index_order() {
        let verts = [
            VertexRecord::new([0.0, 0.0, 0.0], [0.0, 0.0]),
            VertexRecord::new([1.0, 0.0, 0.0], [1.0, 0.0]),
        ];
        let insts = [record(Mat4::IDENTITY)];
        let binding =
            DrawBinding::bind_indexed(&verts, &[1, 0, 1], &insts, DrawCounts::new(2, 1)).unwrap();
        let out = binding.run(&identity_camera());
        let xs: Vec<f32> = out.iter().map(|o| o.clip_position.x).collect();
        assert_eq!(xs, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn instance_accessor_reassembles_matrix() {
        let m = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        let verts = [VertexRecord::new([0.0; 3], [0.0; 2])];
        let insts = [record(m)];
        let binding = DrawBinding::bind(&verts, &insts, DrawCounts::new(1, 1)).unwrap();
        assert_eq!(binding.instance_transform(0).map(|t| t.matrix()), Some(m));
        assert_eq!(binding.instance_transform(1), None);
    }
}
