//! Container size and the layout class derived from it.

use serde::{Deserialize, Serialize};
use winit::dpi::PhysicalSize;

/// The two viewport-size buckets that drive layout policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutClass {
    Compact,
    Wide,
}

impl std::fmt::Display for LayoutClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutClass::Compact => write!(f, "compact"),
            LayoutClass::Wide => write!(f, "wide"),
        }
    }
}

/// Current container dimensions in physical pixels.
///
/// The breakpoint is compared against the logical width so a phone with a
/// 3x display is still classified as compact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
        self
    }

    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self::new(size.width, size.height).with_scale_factor(scale_factor)
    }

    /// A container with no area (minimized window, collapsed element)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `width / height`, or `None` for an empty container
    pub fn aspect(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width as f32 / self.height as f32)
    }

    pub fn logical_width(&self) -> f64 {
        self.width as f64 / self.scale_factor
    }

    /// Compact when the logical width is strictly below the breakpoint
    pub fn classify(&self, breakpoint: f64) -> LayoutClass {
        if self.logical_width() < breakpoint {
            LayoutClass::Compact
        } else {
            LayoutClass::Wide
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_around_breakpoint() {
        assert_eq!(Viewport::new(375, 600).classify(768.0), LayoutClass::Compact);
        assert_eq!(Viewport::new(767, 600).classify(768.0), LayoutClass::Compact);
        assert_eq!(Viewport::new(768, 600).classify(768.0), LayoutClass::Wide);
        assert_eq!(Viewport::new(1440, 900).classify(768.0), LayoutClass::Wide);
    }

    #[test]
    fn test_high_dpi_uses_logical_width() {
        let phone = Viewport::new(1125, 2436).with_scale_factor(3.0);
        assert_eq!(phone.logical_width(), 375.0);
        assert_eq!(phone.classify(768.0), LayoutClass::Compact);
    }

    #[test]
    fn test_aspect() {
        assert_eq!(Viewport::new(1440, 900).aspect(), Some(1.6));
        assert_eq!(Viewport::new(0, 900).aspect(), None);
        assert_eq!(Viewport::new(10, 0).aspect(), None);
    }

    #[test]
    fn test_invalid_scale_factor_is_ignored() {
        assert_eq!(Viewport::new(100, 100).with_scale_factor(0.0).scale_factor, 1.0);
        assert_eq!(Viewport::new(100, 100).with_scale_factor(f64::NAN).scale_factor, 1.0);
    }
}
