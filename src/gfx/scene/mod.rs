//! # Scene Management Module
//!
//! The viewer's scene graph is intentionally tiny: a placeholder object, a
//! pivot node that owns the loaded model, and the light rig.
//!
//! ## Key Components
//!
//! - [`Scene`] - Holds whichever of placeholder or model is visible
//! - [`Pivot`] - Parent transform the model is scaled, placed and rotated by
//! - [`Object`] - Meshes plus a local transform
//! - [`Transform`] - Position, Euler rotation and scale of a node
//! - [`Vertex3D`] - GPU vertex with position, normal and color

pub mod object;
pub mod scene;
pub mod transform;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, Object};
pub use scene::{Pivot, Scene, SceneStatistics};
pub use transform::Transform;
pub use vertex::Vertex3D;
