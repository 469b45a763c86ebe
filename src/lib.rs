// src/lib.rs
//! Jersey 3D viewer
//!
//! Shows one 3D model (a jersey) in a window: a spinning placeholder while
//! the asset loads, then the model centered, scaled to fit the current
//! layout class, lit by a fixed light rig and rotated by exactly one
//! rotation policy. Failed loads are reported in an overlay panel.

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod rotation;
pub mod ui;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::JerseyViewer;
pub use config::ViewerConfig;
pub use controller::ViewportController;
pub use error::{AssetLoadError, ConfigError, Diagnostic, RequestError};
pub use viewport::{LayoutClass, Viewport};

/// Opens the viewer window and blocks until it is closed
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    JerseyViewer::new(config)?.run()
}
