//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the viewport. It carries no controls:
//! the only things it shows are the load diagnostic and load progress.
//!
//! - [`UiManager`] - imgui context, winit platform glue and wgpu renderer
//! - [`overlay`] - the diagnostic panel and the progress line

pub mod manager;
pub mod overlay;

// Re-export main types
pub use manager::UiManager;
pub use overlay::{draw_overlay, OverlayState};
