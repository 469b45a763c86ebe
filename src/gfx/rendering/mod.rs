// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles the render pipeline, GPU resource management, and frame rendering.

pub mod pipeline;
pub mod render_engine;

// Re-export main types
pub use pipeline::{PipelineConfig, MSAA_SAMPLES};
pub use render_engine::RenderEngine;
