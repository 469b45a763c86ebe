//! # Graphics Module
//!
//! Everything the viewer needs to put a lit, spinning model on screen:
//! camera, geometry helpers, the light rig, the scene graph and the wgpu
//! renderer.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera plus damped orbit controls
//! - **Geometry** ([`geometry`]) - Bounding extents and the placeholder cube
//! - **Lighting** ([`lighting`]) - Ambient, hemisphere, key and rim lights
//! - **Rendering Pipeline** ([`rendering`]) - Single forward pass with depth
//! - **Scene Management** ([`scene`]) - Placeholder, pivot and model
//! - **Resource Management** ([`resources`]) - Depth buffer and global uniforms
//!
//! ## Usage
//!
//! The graphics system is driven by the viewport controller, which owns the
//! camera and the scene; the app hands both to the [`RenderEngine`] each frame:
//!
//! ```no_run
//! use jersey3d::gfx::{lighting::LightRig, OrbitCamera};
//!
//! let camera = OrbitCamera::new(5.0, 0.0, 0.0, cgmath::Vector3::new(0.0, 0.0, 0.0), 16.0 / 9.0);
//! let lights = LightRig::default().uniform();
//! // render_engine.update(camera.uniform, &LightRig::default());
//! # let _ = (camera, lights);
//! ```

pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
