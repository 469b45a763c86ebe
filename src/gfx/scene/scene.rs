use cgmath::Matrix4;
use wgpu::Device;

use crate::gfx::lighting::LightRig;

use super::{object::Object, transform::Transform};

/// Parent node that owns the loaded model.
///
/// The model is centered on its own origin once, when it is attached.
/// Placement, scale and rotation are then only ever applied to the pivot, so
/// the model always turns around its visual center.
pub struct Pivot {
    pub transform: Transform,
    pub model: Object,
}

impl Pivot {
    pub fn new(model: Object) -> Self {
        Self {
            transform: Transform::identity(),
            model,
        }
    }

    /// World matrix of the model: pivot placement followed by the model's
    /// centering offset
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.transform.matrix() * self.model.transform.matrix()
    }
}

/// Everything drawn in the viewport: the placeholder until a model arrives,
/// then the pivot holding the model, lit by the light rig
pub struct Scene {
    placeholder: Option<Object>,
    pivot: Option<Pivot>,
    pub lights: LightRig,
}

impl Scene {
    /// Creates a scene showing only the placeholder
    pub fn new(placeholder: Object, lights: LightRig) -> Self {
        Self {
            placeholder: Some(placeholder),
            pivot: None,
            lights,
        }
    }

    pub fn placeholder(&self) -> Option<&Object> {
        self.placeholder.as_ref()
    }

    pub fn placeholder_mut(&mut self) -> Option<&mut Object> {
        self.placeholder.as_mut()
    }

    pub fn pivot(&self) -> Option<&Pivot> {
        self.pivot.as_ref()
    }

    pub fn pivot_mut(&mut self) -> Option<&mut Pivot> {
        self.pivot.as_mut()
    }

    pub fn has_model(&self) -> bool {
        self.pivot.is_some()
    }

    /// Swaps the placeholder out for the pivot. The placeholder is dropped,
    /// so exactly one of the two is ever visible.
    pub fn attach_pivot(&mut self, pivot: Pivot) {
        self.placeholder = None;
        self.pivot = Some(pivot);
    }

    /// The single visible object and its world matrix
    pub fn visible(&self) -> Option<(&Object, Matrix4<f32>)> {
        match (&self.pivot, &self.placeholder) {
            (Some(pivot), _) => Some((&pivot.model, pivot.world_matrix())),
            (None, Some(placeholder)) => Some((placeholder, placeholder.transform.matrix())),
            (None, None) => None,
        }
    }

    /// Initializes GPU resources for any visible object that doesn't have
    /// them yet. Cheap to call every frame.
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        if let Some(pivot) = self.pivot.as_mut() {
            if !pivot.model.has_gpu_resources() {
                pivot.model.init_gpu_resources(device, layout);
            }
        } else if let Some(placeholder) = self.placeholder.as_mut() {
            if !placeholder.has_gpu_resources() {
                placeholder.init_gpu_resources(device, layout);
            }
        }
    }

    /// Syncs the visible object's world matrix to the GPU
    pub fn update_transforms(&self, queue: &wgpu::Queue) {
        if let Some((object, world)) = self.visible() {
            object.write_world_matrix(queue, world);
        }
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let (total_triangles, total_vertices) = self
            .visible()
            .map(|(object, _)| (object.triangle_count(), object.vertex_count()))
            .unwrap_or((0, 0));

        SceneStatistics {
            has_model: self.has_model(),
            mesh_count: self.visible().map_or(0, |(object, _)| object.meshes.len()),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub has_model: bool,
    pub mesh_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        geometry::generate_cube,
        scene::object::Mesh,
    };
    use cgmath::{SquareMatrix, Vector3, Vector4};

    fn cube(name: &str, size: f32) -> Object {
        Object::new(name, vec![Mesh::from_geometry(&generate_cube(size), [1.0; 4])])
    }

    #[test]
    fn test_new_scene_shows_placeholder_only() {
        let scene = Scene::new(cube("placeholder", 0.2), LightRig::default());
        assert!(!scene.has_model());
        let (object, world) = scene.visible().unwrap();
        assert_eq!(object.name, "placeholder");
        assert_eq!(world, Matrix4::identity());
    }

    #[test]
    fn test_attach_pivot_replaces_placeholder() {
        let mut scene = Scene::new(cube("placeholder", 0.2), LightRig::default());
        scene.attach_pivot(Pivot::new(cube("jersey", 1.0)));

        assert!(scene.placeholder().is_none());
        assert!(scene.has_model());
        assert_eq!(scene.visible().unwrap().0.name, "jersey");

        let stats = scene.get_statistics();
        assert!(stats.has_model);
        assert_eq!(stats.mesh_count, 1);
        assert_eq!(stats.total_triangles, 12);
    }

    #[test]
    fn test_pivot_scales_around_model_center() {
        let mut geometry = generate_cube(2.0);
        for vertex in geometry.vertices.iter_mut() {
            vertex[0] += 5.0;
        }
        let mut model = Object::new("jersey", vec![Mesh::from_geometry(&geometry, [1.0; 4])]);
        assert_eq!(model.center_on_origin(), Vector3::new(5.0, 0.0, 0.0));

        let mut pivot = Pivot::new(model);
        pivot.transform.set_uniform_scale(0.5);
        pivot.transform.rotation.y = 1.2;

        // The model's original center (5, 0, 0) lands on the pivot origin.
        let center = pivot.world_matrix() * Vector4::new(5.0, 0.0, 0.0, 1.0);
        assert!(center.x.abs() < 1e-5);
        assert!(center.y.abs() < 1e-5);
        assert!(center.z.abs() < 1e-5);
    }
}
