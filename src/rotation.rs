//! Rotation policies.
//!
//! Exactly one [`RotationDriver`] is active per session, chosen by the
//! configured [`RotationPolicy`]. Input that belongs to another policy is
//! ignored, so idle spin and scroll rotation can never fight over the same
//! angle.

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, MouseScrollDelta},
};

use crate::config::{OrbitSettings, RotationPolicy};
use crate::gfx::camera::{CameraController, OrbitCamera};
use crate::gfx::scene::Transform;

/// Pixels scrolled per wheel notch when the platform reports lines
pub const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone)]
pub enum RotationDriver {
    /// Pivot yaw grows by `speed` every frame
    IdleSpin { speed: f32 },
    /// Pivot yaw is `offset * factor`, `offset` being the accumulated
    /// scroll distance in pixels
    Scroll { factor: f32, offset: f32 },
    /// The camera orbits the model; the pivot is left alone
    Orbit(CameraController),
}

impl RotationDriver {
    /// Builds the driver for a policy. Orbit distance limits are applied to
    /// the camera here.
    pub fn from_policy(policy: &RotationPolicy, camera: &mut OrbitCamera) -> Self {
        match *policy {
            RotationPolicy::Idle { speed } => RotationDriver::IdleSpin { speed },
            RotationPolicy::Scroll { factor } => RotationDriver::Scroll {
                factor,
                offset: 0.0,
            },
            RotationPolicy::Orbit(settings) => {
                Self::configure_orbit_camera(&settings, camera);
                RotationDriver::Orbit(
                    CameraController::new(settings.rotate_speed, settings.zoom_speed)
                        .with_damping(settings.damping_factor)
                        .with_auto_rotate(settings.auto_rotate, settings.auto_rotate_speed),
                )
            }
        }
    }

    fn configure_orbit_camera(settings: &OrbitSettings, camera: &mut OrbitCamera) {
        camera.bounds.min_distance = Some(settings.min_distance);
        camera.bounds.max_distance = Some(settings.max_distance);
        camera.set_distance(camera.distance);
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            RotationDriver::IdleSpin { .. } => "idle",
            RotationDriver::Scroll { .. } => "scroll",
            RotationDriver::Orbit(_) => "orbit",
        }
    }

    /// Feeds a window scroll event. Only the scroll policy uses it.
    pub fn on_scroll(&mut self, delta: &MouseScrollDelta) -> bool {
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -lines * PIXELS_PER_LINE,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -*y as f32,
        };
        self.scroll_by(pixels)
    }

    /// Moves the scroll offset by `pixels`, never above the top of the page
    pub fn scroll_by(&mut self, pixels: f32) -> bool {
        match self {
            RotationDriver::Scroll { offset, .. } => {
                *offset = (*offset + pixels).max(0.0);
                true
            }
            _ => false,
        }
    }

    /// Feeds the primary pointer button. Only the orbit policy uses it.
    pub fn set_pointer_down(&mut self, pressed: bool) -> bool {
        match self {
            RotationDriver::Orbit(controls) => {
                controls.set_pointer_down(pressed);
                true
            }
            _ => false,
        }
    }

    /// Feeds a raw device event. Only the orbit policy uses it.
    pub fn process_device_event(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match self {
            RotationDriver::Orbit(controls) => controls.process_events(event, camera),
            _ => false,
        }
    }

    /// Advances one frame
    pub fn advance(&mut self, pivot: &mut Transform, camera: &mut OrbitCamera) {
        match self {
            RotationDriver::IdleSpin { speed } => pivot.rotation.y += *speed,
            RotationDriver::Scroll { factor, offset } => pivot.rotation.y = *offset * *factor,
            RotationDriver::Orbit(controls) => controls.update(camera),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0)
    }

    #[test]
    fn test_idle_spin_accumulates() {
        let mut camera = camera();
        let mut driver = RotationDriver::from_policy(&RotationPolicy::Idle { speed: 0.003 }, &mut camera);
        let mut pivot = Transform::identity();
        for _ in 0..10 {
            driver.advance(&mut pivot, &mut camera);
        }
        assert!((pivot.rotation.y - 0.03).abs() < 1e-6);
        assert_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn test_scroll_sets_absolute_yaw() {
        let mut camera = camera();
        let mut driver =
            RotationDriver::from_policy(&RotationPolicy::Scroll { factor: 0.002 }, &mut camera);
        let mut pivot = Transform::identity();

        assert!(driver.on_scroll(&MouseScrollDelta::LineDelta(0.0, -5.0)));
        driver.advance(&mut pivot, &mut camera);
        driver.advance(&mut pivot, &mut camera);
        assert!((pivot.rotation.y - 200.0 * 0.002).abs() < 1e-6);

        driver.scroll_by(-1000.0);
        driver.advance(&mut pivot, &mut camera);
        assert_eq!(pivot.rotation.y, 0.0);
    }

    #[test]
    fn test_inactive_policies_ignore_foreign_input() {
        let mut camera = camera();
        let mut idle = RotationDriver::from_policy(&RotationPolicy::Idle { speed: 0.01 }, &mut camera);
        assert!(!idle.scroll_by(100.0));
        assert!(!idle.set_pointer_down(true));
        assert!(!idle.process_device_event(
            &DeviceEvent::MouseMotion { delta: (5.0, 5.0) },
            &mut camera
        ));

        let mut orbit = RotationDriver::from_policy(
            &RotationPolicy::Orbit(OrbitSettings::default()),
            &mut camera,
        );
        assert!(!orbit.on_scroll(&MouseScrollDelta::LineDelta(0.0, -1.0)));
        assert!(orbit.set_pointer_down(true));
        assert!(orbit.process_device_event(
            &DeviceEvent::MouseMotion { delta: (5.0, 0.0) },
            &mut camera
        ));
        assert_eq!(orbit.mode_name(), "orbit");
    }

    #[test]
    fn test_orbit_moves_camera_not_pivot() {
        let mut camera = camera();
        let settings = OrbitSettings {
            auto_rotate: true,
            damping_factor: 1.0,
            ..OrbitSettings::default()
        };
        let mut driver = RotationDriver::from_policy(&RotationPolicy::Orbit(settings), &mut camera);
        let mut pivot = Transform::identity();

        driver.advance(&mut pivot, &mut camera);
        assert_eq!(pivot, Transform::identity());
        assert!(camera.yaw > 0.0);
    }

    #[test]
    fn test_orbit_applies_distance_limits() {
        let mut camera = OrbitCamera::new(30.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let settings = OrbitSettings {
            min_distance: 2.0,
            max_distance: 10.0,
            ..OrbitSettings::default()
        };
        RotationDriver::from_policy(&RotationPolicy::Orbit(settings), &mut camera);
        assert_eq!(camera.distance, 10.0);
    }
}
