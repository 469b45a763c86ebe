//! # Bounding Extents
//!
//! Axis-aligned bounding boxes used to center and fit loaded models.
//! Extents are always derived from geometry on demand and never cached on
//! an object, so they can't go stale after a transform change.

use cgmath::{ElementWise, Matrix4, Vector3, Vector4, Zero};

/// Axis-aligned box described by its minimum and maximum corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingExtent {
    /// Minimum corner of the box
    pub min: Vector3<f32>,
    /// Maximum corner of the box
    pub max: Vector3<f32>,
}

impl BoundingExtent {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// An extent that contains nothing. Expanding it by any point yields
    /// a zero-sized box at that point.
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Builds the tightest box around a set of points
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = [f32; 3]>,
    {
        let mut extent = Self::empty();
        for point in points {
            extent.expand_by_point(Vector3::from(point));
        }
        extent
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_by_point(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Smallest box containing both extents
    pub fn union(&self, other: &BoundingExtent) -> BoundingExtent {
        let mut result = *self;
        if !other.is_empty() {
            result.expand_by_point(other.min);
            result.expand_by_point(other.max);
        }
        result
    }

    /// Box enclosing this extent after it is moved by `matrix`.
    ///
    /// All eight corners are transformed, so the result stays axis-aligned
    /// in the target space even when `matrix` rotates.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> BoundingExtent {
        if self.is_empty() {
            return *self;
        }

        let mut result = BoundingExtent::empty();
        for i in 0..8 {
            let corner = Vector4::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0,
            );
            let moved = *matrix * corner;
            result.expand_by_point(moved.truncate());
        }
        result
    }

    /// Center of the box, or the origin for an empty extent
    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        (self.min + self.max).mul_element_wise(0.5)
    }

    /// Edge lengths of the box, zero for an empty extent
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.max - self.min
    }

    /// Longest edge of the box
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

impl Default for BoundingExtent {
    fn default() -> Self {
        Self::empty()
    }
}

/// Uniform scale that makes an object with the given longest edge
/// `target` units long.
///
/// Falls back to `1.0` whenever the ratio is not a finite positive number
/// (zero-sized, empty or non-finite geometry), so a bad model can never push
/// NaN into a transform.
pub fn fit_scale(target: f32, max_dimension: f32) -> f32 {
    let scale = target / max_dimension;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
