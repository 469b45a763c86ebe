//! WGPU-based rendering engine for the viewport
//!
//! Owns the surface, device and the single forward pipeline, and draws the
//! scene's visible object followed by an optional UI overlay. The scene is
//! drawn with 4x MSAA when the surface format allows it; the overlay is
//! drawn on the resolved image.

use std::sync::Arc;

use anyhow::Context;
use log::{error, info, warn};
use wgpu::TextureFormat;

use crate::gfx::{
    camera::camera_utils::CameraUniform,
    lighting::LightRig,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        texture_resource::TextureResource,
    },
    scene::{object::DrawObject, scene::Scene},
};
use crate::wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

use super::pipeline::{create_pipeline, sample_count_for, PipelineConfig};

/// Transparent where the compositor allows it, black otherwise
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    /// Only present when `sample_count > 1`
    msaa_target: Option<TextureResource>,
    sample_count: u32,
    format: TextureFormat,
    pipeline: wgpu::RenderPipeline,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
}

impl RenderEngine {
    /// Creates a render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo, // Once per display refresh
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = sample_count_for(adapter.get_texture_format_features(format).flags);
        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, sample_count, "depth_texture");
        let msaa_target = Self::create_msaa_target(&device, &config, sample_count);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        // Per-object model matrix at slot 1
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(&device, "Transform Bind Group Layout");

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();

        // No culling: jersey shells are single-sided
        let pipeline_config = PipelineConfig::default()
            .with_label("VIEWER")
            .with_depth_format(TextureResource::DEPTH_FORMAT)
            .with_cull_mode(None)
            .with_sample_count(sample_count)
            .with_bind_group_layouts(vec![
                global_bindings.bind_group_layout().clone(),
                object_layout.layout.clone(),
            ])
            .with_color_target(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            });
        let pipeline = create_pipeline(&device_handle, include_str!("viewer.wgsl"), &pipeline_config);
        info!(
            "Created viewer pipeline, {}x MSAA, surface {:?} {}x{}",
            sample_count, format, config.width, config.height
        );

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            msaa_target,
            sample_count,
            pipeline,
            global_bindings,
            global_ubo,
            object_layout,
        })
    }

    fn create_msaa_target(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<TextureResource> {
        (sample_count > 1).then(|| {
            TextureResource::create_msaa_target(device, config, sample_count, "msaa_color")
        })
    }

    /// Uploads GPU resources for whatever the scene shows now and syncs its
    /// world matrix. Call once per frame before rendering.
    pub fn prepare_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.object_layout.layout);
        scene.update_transforms(&self.queue);
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => return,
            Err(e) => {
                error!("Failed to get surface texture: {e}");
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // With MSAA the scene is drawn into the multisampled buffer and
        // resolved into the surface texture
        let (color_view, resolve_target, color_store) = match &self.msaa_target {
            Some(msaa) => (&msaa.view, Some(&surface_texture_view), wgpu::StoreOp::Discard),
            None => (&surface_texture_view, None, wgpu::StoreOp::Store),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: color_store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            render_pass.set_pipeline(&self.pipeline);
            if let Some((object, _)) = scene.visible() {
                render_pass.draw_object(object);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Updates the camera and light uniforms
    pub fn update(&mut self, camera_uniform: CameraUniform, lights: &LightRig) {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera_uniform,
            lights.uniform(),
        );
    }

    /// Resizes the surface and recreates the depth buffer.
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = TextureResource::create_depth_texture(
            &self.device,
            &self.config,
            self.sample_count,
            "depth_texture",
        );
        self.msaa_target = Self::create_msaa_target(&self.device, &self.config, self.sample_count);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
