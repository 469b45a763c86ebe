use std::sync::Arc;

use anyhow::Context;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::controller::ViewportController;
use crate::gfx::RenderEngine;
use crate::ui::{draw_overlay, OverlayState, UiManager};
use crate::viewport::Viewport;

/// The jersey viewer: one window hosting one viewport controller
pub struct JerseyViewer {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    controller: Option<ViewportController>,
    startup_error: Option<anyhow::Error>,
}

impl JerseyViewer {
    /// Creates the viewer. The window and the GPU surface are only created
    /// once the event loop resumes.
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                controller: None,
                startup_error: None,
            },
        })
    }

    /// Runs the event loop until the window is closed
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("Event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")?;

        match self.app_state.startup_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    /// Creates the window, injects a rendering surface into it and starts
    /// the model load
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let container = &self.config.container;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(container.title.clone())
                    .with_inner_size(LogicalSize::new(container.width, container.height))
                    .with_transparent(true),
            )
            .context("Failed to create window")?;
        let window_handle = Arc::new(window);

        let PhysicalSize { width, height } = window_handle.inner_size();
        let viewport =
            Viewport::from_physical(window_handle.inner_size(), window_handle.scale_factor());

        let window_clone = window_handle.clone();
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height).await
        })?;

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );
        ui_manager.update_display_size(width, height);

        let mut controller = ViewportController::initialize(viewport, self.config.clone());
        if let Err(e) = controller.request_configured_model() {
            warn!("Model request rejected: {e}");
        }
        info!("Loading {}", self.config.asset.path);

        self.controller = Some(controller);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window_handle);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(render_engine), Some(controller)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.controller.as_mut(),
        ) else {
            return;
        };

        controller.frame();
        render_engine.prepare_scene(controller.scene_mut());
        render_engine.update(controller.camera().uniform, &controller.scene().lights);

        let overlay = OverlayState::capture(controller);
        let ui_pass = self.ui_manager.as_mut().map(|ui_manager| {
            move |device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  color_attachment: &wgpu::TextureView| {
                ui_manager.draw(device, queue, encoder, window, color_attachment, |ui| {
                    draw_overlay(ui, &overlay)
                });
            }
        });
        render_engine.render_frame(controller.scene(), ui_pass);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            error!("Failed to start the viewer: {e:#}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // A release always ends an orbit drag, even over the overlay
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        } = event
        {
            if let Some(controller) = self.controller.as_mut() {
                controller.on_pointer_button(false);
            }
        }

        // The overlay gets pointer and keyboard input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: Event<()> = Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(size.width, size.height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(size.width, size.height);
                }
                if let Some(controller) = self.controller.as_mut() {
                    controller.on_resize(Viewport::from_physical(size, window.scale_factor()));
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(controller) = self.controller.as_mut() {
                    let viewport = Viewport::from_physical(window.inner_size(), scale_factor);
                    controller.on_resize(viewport);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.on_pointer_button(true);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.on_scroll(&delta);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        // Orbit input is suppressed while the pointer is over the overlay
        if self
            .ui_manager
            .as_ref()
            .is_some_and(|ui_manager| ui_manager.wants_input())
        {
            return;
        }

        if let Some(controller) = self.controller.as_mut() {
            controller.process_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
