
use cgmath::{InnerSpace, Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::gfx::geometry::{BoundingExtent, GeometryData};

use super::{transform::Transform, vertex::Vertex3D};

/// Triangle mesh with lazily created GPU buffers
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    pub index_count: u32,
    pub vertex_count: u32,
}

impl Mesh {
    pub fn new(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        indices: Vec<u32>,
        color: [f32; 4],
    ) -> Self {
        let vertices: Vec<Vertex3D> = positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                color,
            })
            .collect();

        Self {
            index_count: indices.len() as u32,
            vertex_count: vertices.len() as u32,
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn from_geometry(geometry: &GeometryData, color: [f32; 4]) -> Self {
        Self::new(
            &geometry.vertices,
            &geometry.normals,
            geometry.indices.clone(),
            color,
        )
    }

    /// Extent of the raw vertex positions, ignoring any object transform
    pub fn extent(&self) -> BoundingExtent {
        BoundingExtent::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Smooth per-vertex normals for meshes that ship without any.
    ///
    /// Face normals are accumulated unnormalized, so larger triangles weigh
    /// more, then each vertex normal is normalized.
    pub fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                continue;
            }

            let v0 = Vector3::from(positions[i0]);
            let v1 = Vector3::from(positions[i1]);
            let v2 = Vector3::from(positions[i2]);
            let face_normal = (v1 - v0).cross(v2 - v0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        normals
            .into_iter()
            .map(|n| {
                if n.magnitude2() > 0.0 {
                    n.normalize().into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect()
    }

    fn init_gpu_buffers(&mut self, device: &wgpu::Device, label: &str) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Per-object uniform uploaded to bind group 1
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
}

// GPU resources struct to hold the per-object uniform buffer and bind group
pub struct ObjectGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A drawable object: meshes plus a local transform
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Transform,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    /// Create a new Object with identity transformation
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
            transform: Transform::identity(),
            gpu_resources: None,
        }
    }

    /// Extent of all meshes in the object's own geometry space
    pub fn geometry_extent(&self) -> BoundingExtent {
        self.meshes
            .iter()
            .fold(BoundingExtent::empty(), |acc, mesh| acc.union(&mesh.extent()))
    }

    /// Extent after the object's local transform, i.e. as seen by a parent
    /// node. This never includes any parent scaling.
    pub fn local_extent(&self) -> BoundingExtent {
        self.geometry_extent().transformed(&self.transform.matrix())
    }

    /// Moves the object so the center of its local extent sits on the
    /// origin. The center is subtracted as a whole vector, so calling this
    /// again on an already centered object changes nothing.
    ///
    /// Returns the offset that was removed.
    pub fn center_on_origin(&mut self) -> Vector3<f32> {
        let center = self.local_extent().center();
        self.transform.position -= center;
        center
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.index_count / 3).sum()
    }

    pub fn vertex_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.vertex_count).sum()
    }

    pub fn has_gpu_resources(&self) -> bool {
        self.gpu_resources.is_some()
    }

    /// Uploads mesh buffers and creates the transform uniform.
    ///
    /// `layout` must be the per-object layout the render pipeline was
    /// built with.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_buffers(device, &self.name);
        }

        let uniform = ObjectUniform {
            model: self.transform.matrix().into(),
        };

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Transform Uniform", self.name)),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Transform Bind Group", self.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }

    /// Writes a world matrix into the transform uniform, if uploaded
    pub fn write_world_matrix(&self, queue: &wgpu::Queue, world: Matrix4<f32>) {
        if let Some(gpu_resources) = &self.gpu_resources {
            let uniform = ObjectUniform {
                model: world.into(),
            };
            queue.write_buffer(
                &gpu_resources.transform_buffer,
                0,
                bytemuck::bytes_of(&uniform),
            );
        }
    }

    /// Get the transform bind group for rendering
    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawObject {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_object(&mut self, object: &Object);
}

impl DrawObject for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_object(&mut self, object: &Object) {
        let Some(bind_group) = object.get_transform_bind_group() else {
            return;
        };
        self.set_bind_group(1, bind_group, &[]);
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    fn box_mesh(min: [f32; 3], max: [f32; 3]) -> Mesh {
        let positions = [
            min,
            [max[0], min[1], min[2]],
            [max[0], max[1], min[2]],
            [min[0], max[1], max[2]],
            max,
        ];
        let indices: Vec<u32> = vec![0, 1, 2, 2, 3, 4];
        let normals = Mesh::calculate_vertex_normals(&positions, &indices);
        Mesh::new(&positions, &normals, indices, [1.0; 4])
    }

    #[test]
    fn test_geometry_extent_spans_all_meshes() {
        let object = Object::new(
            "pair",
            vec![
                box_mesh([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
                box_mesh([2.0, -1.0, 0.0], [3.0, 0.5, 4.0]),
            ],
        );
        let extent = object.geometry_extent();
        assert_eq!(extent.min, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(extent.max, Vector3::new(3.0, 1.0, 4.0));
    }

    #[test]
    fn test_center_on_origin_uses_vector_subtraction() {
        let mut object = Object::new("jersey", vec![box_mesh([1.0, 1.0, 1.0], [3.0, 4.0, 2.0])]);
        let removed = object.center_on_origin();

        assert_eq!(removed, Vector3::new(2.0, 2.5, 1.5));
        assert_eq!(object.transform.position, Vector3::new(-2.0, -2.5, -1.5));
        let center = object.local_extent().center();
        assert!(center.x.abs() < 1e-6 && center.y.abs() < 1e-6 && center.z.abs() < 1e-6);
    }

    #[test]
    fn test_center_on_origin_does_not_drift() {
        let mut object = Object::new("jersey", vec![box_mesh([1.0, 1.0, 1.0], [3.0, 4.0, 2.0])]);
        object.center_on_origin();
        let first = object.transform.position;
        for _ in 0..5 {
            object.center_on_origin();
        }
        assert!((object.transform.position - first).magnitude() < 1e-6);
    }

    #[test]
    fn test_vertex_normals_point_out_of_triangle() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = Mesh::calculate_vertex_normals(&positions, &[0, 1, 2]);
        for normal in normals {
            assert_eq!(normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_vertex_normals_skip_bad_indices() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let normals = Mesh::calculate_vertex_normals(&positions, &[0, 1, 7]);
        assert_eq!(normals, vec![[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_counts() {
        let object = Object::new("cube", vec![Mesh::from_geometry(&generate_cube(1.0), [1.0; 4])]);
        assert_eq!(object.triangle_count(), 12);
        assert_eq!(object.vertex_count(), 24);
        assert!(!object.has_gpu_resources());
    }
}
