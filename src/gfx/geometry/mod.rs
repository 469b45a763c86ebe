//! # Geometry
//!
//! CPU-side geometry helpers: the procedural placeholder shape and the
//! bounding extents used to center and fit loaded models.
//!
//! ## Usage
//!
//! ```rust
//! use jersey3d::gfx::geometry::{generate_cube, BoundingExtent};
//!
//! let cube = generate_cube(0.5);
//! let extent = BoundingExtent::from_points(cube.vertices.iter().copied());
//! assert!((extent.max_dimension() - 0.5).abs() < 1e-6);
//! ```

pub mod bounds;
pub mod primitives;

pub use bounds::{fit_scale, BoundingExtent};
pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounding extent of the raw vertex positions
    pub fn extent(&self) -> BoundingExtent {
        BoundingExtent::from_points(self.vertices.iter().copied())
    }
}
