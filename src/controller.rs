//! # Model Viewport Controller
//!
//! Owns everything the viewport shows: camera, light rig, placeholder and,
//! once loaded, the pivot holding the model. The host (the winit app or a
//! test) forwards resize and input events and calls [`ViewportController::frame`]
//! once per display refresh.
//!
//! ## Lifecycle
//!
//! 1. [`ViewportController::initialize`] builds the scene with only the
//!    placeholder. Frames can be rendered right away.
//! 2. [`ViewportController::request_model`] starts a background load.
//! 3. Each frame polls the load. On success the model is centered on its own
//!    origin, wrapped in a pivot and laid out for the current viewport. On
//!    failure a [`Diagnostic`] is set and the placeholder keeps spinning.

use std::path::Path;
use std::sync::Arc;

use cgmath::{Deg, Rad, Vector3, Zero};
use log::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::error::{AssetLoadError, Diagnostic, RequestError};
use crate::gfx::camera::OrbitCamera;
use crate::gfx::geometry::{fit_scale, generate_cube};
use crate::gfx::lighting::rgb;
use crate::gfx::scene::{Mesh, Object, Pivot, Scene};
use crate::loader::{AssetFetcher, AssetLocation, LoadProgress, ModelData, ModelLoader, PendingLoad};
use crate::rotation::RotationDriver;
use crate::viewport::{LayoutClass, Viewport};

enum LoadState {
    Idle,
    Loading(PendingLoad),
    Loaded,
    Failed,
}

pub struct ViewportController {
    config: ViewerConfig,
    viewport: Viewport,
    camera: OrbitCamera,
    scene: Scene,
    rotation: RotationDriver,
    loader: ModelLoader,
    state: LoadState,
    diagnostic: Option<Diagnostic>,
    layout_class: Option<LayoutClass>,
}

impl ViewportController {
    /// Builds camera, light rig and placeholder for a container of the given size
    pub fn initialize(viewport: Viewport, config: ViewerConfig) -> Self {
        let mut camera = OrbitCamera::new(
            config.camera.distance,
            0.0,
            0.0,
            Vector3::zero(),
            viewport.aspect().unwrap_or(1.0),
        );
        camera.fovy = Rad::from(Deg(config.camera.fov_degrees));
        camera.znear = config.camera.near;
        camera.zfar = config.camera.far;

        let rotation = RotationDriver::from_policy(&config.rotation, &mut camera);
        camera.update_view_proj();

        let [r, g, b] = rgb(config.placeholder.color);
        let placeholder = Object::new(
            "placeholder",
            vec![Mesh::from_geometry(
                &generate_cube(config.placeholder.size),
                [r, g, b, 1.0],
            )],
        );
        let scene = Scene::new(placeholder, config.lights);

        info!(
            "Viewport initialized at {}x{} ({} layout, {} rotation)",
            viewport.width,
            viewport.height,
            viewport.classify(config.layout.breakpoint),
            rotation.mode_name()
        );

        Self {
            config,
            viewport,
            camera,
            scene,
            rotation,
            loader: ModelLoader::default(),
            state: LoadState::Idle,
            diagnostic: None,
            layout_class: None,
        }
    }

    /// Replaces the default file/HTTP fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.loader = ModelLoader::new(fetcher);
        self
    }

    /// Starts loading the model at `path`, resolved against the configured
    /// asset base.
    ///
    /// Only one model is ever shown per session: requests while a load is
    /// running or after a model was attached are rejected. A request after
    /// a failed load retries.
    pub fn request_model(&mut self, path: &str) -> Result<(), RequestError> {
        match self.state {
            LoadState::Loading(_) => return Err(RequestError::LoadInFlight),
            LoadState::Loaded => return Err(RequestError::AlreadyLoaded),
            LoadState::Idle | LoadState::Failed => {}
        }

        let location = AssetLocation::resolve(&self.config.asset.base, path);
        self.state = LoadState::Loading(self.loader.spawn(location));
        Ok(())
    }

    /// Requests the model named in the config
    pub fn request_configured_model(&mut self) -> Result<(), RequestError> {
        let path = self.config.asset.path.clone();
        self.request_model(&path)
    }

    /// Checks the running load without blocking. Returns true when it
    /// finished during this call.
    pub fn poll_load(&mut self) -> bool {
        let LoadState::Loading(pending) = &mut self.state else {
            return false;
        };
        match pending.try_complete() {
            Some(result) => {
                let name = model_name(pending.location().as_str());
                self.finish_load(name, result);
                true
            }
            None => false,
        }
    }

    /// Blocks until the running load finishes. Returns whether a model is
    /// shown afterwards.
    pub fn wait_for_model(&mut self) -> bool {
        match std::mem::replace(&mut self.state, LoadState::Idle) {
            LoadState::Loading(pending) => {
                let name = model_name(pending.location().as_str());
                let result = pollster::block_on(pending);
                self.finish_load(name, result);
            }
            other => self.state = other,
        }
        self.has_model()
    }

    fn finish_load(&mut self, name: String, result: Result<ModelData, AssetLoadError>) {
        match result {
            Ok(model) => {
                let mut object = model.into_object(name);
                let offset = object.center_on_origin();
                debug!("Centered model, removed offset {offset:?}");

                self.scene.attach_pivot(Pivot::new(object));
                self.state = LoadState::Loaded;
                self.diagnostic = None;
                self.apply_responsive_layout();

                let stats = self.scene.get_statistics();
                let scale = self
                    .scene
                    .pivot()
                    .and_then(|pivot| pivot.transform.uniform_scale())
                    .unwrap_or(1.0);
                info!(
                    "Model loaded: {} meshes, {} triangles, scale factor {scale:.4}",
                    stats.mesh_count, stats.total_triangles
                );
            }
            Err(error) => {
                warn!("{error}");
                self.diagnostic = Some(Diagnostic::from_failure(&error));
                self.state = LoadState::Failed;
            }
        }
    }

    /// Scales and places the pivot for the current layout class.
    ///
    /// The extent is always taken from the unscaled model, so repeated calls
    /// give the same result. Does nothing before a model is loaded.
    pub fn apply_responsive_layout(&mut self) -> Option<LayoutClass> {
        let pivot = self.scene.pivot_mut()?;

        let class = self.viewport.classify(self.config.layout.breakpoint);
        let params = *self.config.layout.params(class);

        let max_dimension = pivot.model.local_extent().max_dimension();
        if !(max_dimension.is_finite() && max_dimension > 0.0) {
            warn!("Model has a degenerate extent ({max_dimension}), keeping scale 1");
        }
        let scale = fit_scale(params.target, max_dimension);

        pivot.transform.set_uniform_scale(scale);
        pivot.transform.position = Vector3::new(params.offset_x, params.offset_y, 0.0);

        if self.layout_class != Some(class) {
            info!("Layout class is now {class} (scale {scale:.4})");
            self.layout_class = Some(class);
        }
        Some(class)
    }

    /// Matches camera and layout to a new container size.
    /// Zero-sized containers are ignored.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            debug!("Ignoring resize to {}x{}", viewport.width, viewport.height);
            return;
        }
        debug!("Resized to {}x{}", viewport.width, viewport.height);

        self.viewport = viewport;
        self.camera.resize_projection(viewport.width, viewport.height);
        self.apply_responsive_layout();
    }

    pub fn on_scroll(&mut self, delta: &winit::event::MouseScrollDelta) -> bool {
        self.rotation.on_scroll(delta)
    }

    /// Primary pointer button pressed or released over the viewport
    pub fn on_pointer_button(&mut self, pressed: bool) -> bool {
        self.rotation.set_pointer_down(pressed)
    }

    pub fn process_device_event(&mut self, event: &winit::event::DeviceEvent) -> bool {
        self.rotation.process_device_event(event, &mut self.camera)
    }

    /// One render-loop iteration: finishes a completed load, then advances
    /// either the placeholder spin or the active rotation policy
    pub fn frame(&mut self) {
        self.poll_load();

        match self.scene.pivot_mut() {
            Some(pivot) => self.rotation.advance(&mut pivot.transform, &mut self.camera),
            None => {
                let spin = self.config.placeholder.spin;
                if let Some(placeholder) = self.scene.placeholder_mut() {
                    placeholder.transform.rotation.x += spin;
                    placeholder.transform.rotation.y += spin;
                }
            }
        }

        self.camera.update_view_proj();
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn rotation(&self) -> &RotationDriver {
        &self.rotation
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.scene.has_model()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading(_))
    }

    /// Progress of the running load, if any
    pub fn load_progress(&self) -> Option<LoadProgress> {
        match &self.state {
            LoadState::Loading(pending) => Some(pending.progress()),
            _ => None,
        }
    }

    pub fn layout_class(&self) -> Option<LayoutClass> {
        self.layout_class
    }
}

/// Name shown for a model, taken from its file name
pub fn model_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}
