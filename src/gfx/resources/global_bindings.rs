//! Global uniform bindings for camera and lighting data
//!
//! Everything that is the same for every object in a frame lives in one
//! uniform buffer bound to slot 0 of the viewer pipeline.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, lighting::LightsUniform},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content.
///
/// MUST match the `Globals` struct in `viewer.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    view_position: [f32; 4],  // Camera position (homogeneous coordinates)
    view_proj: [[f32; 4]; 4], // Camera view-projection matrix
    lights: LightsUniform,
}
// Total: 16 + 64 + 8 * 16 = 208 bytes

impl GlobalUniform {
    pub fn new(camera: CameraUniform, lights: LightsUniform) -> Self {
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            lights,
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Writes this frame's camera and light data. Unchanged data is not
/// re-uploaded.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    lights: LightsUniform,
) {
    ubo.update_content(queue, GlobalUniform::new(camera, lights));
}

/// Bind group layout and bind group for the global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // Global uniforms (camera + lights)
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    /// Layout for pipelines that read the global uniforms
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::lighting::LightRig;

    #[test]
    fn test_global_uniform_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 208);
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }

    #[test]
    fn test_global_uniform_copies_camera_and_lights() {
        let camera = CameraUniform {
            view_position: [0.0, 0.0, 5.0, 1.0],
            ..CameraUniform::default()
        };
        let lights = LightRig::default().uniform();
        let uniform = GlobalUniform::new(camera, lights);
        assert_eq!(uniform.view_position, [0.0, 0.0, 5.0, 1.0]);
        assert_eq!(uniform.lights, lights);
    }
}
