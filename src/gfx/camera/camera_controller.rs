use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Orbit-style input handling with inertial damping and auto-rotation.
///
/// Drag deltas are not applied to the camera directly. They accumulate into
/// a pending yaw/pitch delta and each call to [`CameraController::update`]
/// applies `delta * damping_factor` of it and keeps the rest, so the camera
/// glides to a stop after the pointer is released.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 is one revolution every 30 seconds at 60 fps
    pub auto_rotate_speed: f32,
    is_mouse_pressed: bool,
    yaw_delta: f32,
    pitch_delta: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            is_mouse_pressed: false,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
        }
    }

    /// Sets the damping factor, clamped to `(0, 1]`. NaN turns damping off.
    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = if damping_factor.is_nan() {
            1.0
        } else {
            damping_factor.clamp(f32::EPSILON, 1.0)
        };
        self
    }

    pub fn with_auto_rotate(mut self, enabled: bool, speed: f32) -> Self {
        self.auto_rotate = enabled;
        self.auto_rotate_speed = speed;
        self
    }

    /// Feeds a raw device event. Returns true when the event was used.
    ///
    /// Raw button ids differ between platforms, so the drag button is fed
    /// separately through [`CameraController::set_pointer_down`].
    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.zoom(scroll_amount, camera);
                true
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.drag(delta.0 as f32, delta.1 as f32);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn set_pointer_down(&mut self, pressed: bool) {
        self.is_mouse_pressed = pressed;
    }

    /// Queues a drag of `dx`/`dy` pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.yaw_delta -= dx * self.rotate_speed;
        self.pitch_delta += dy * self.rotate_speed;
    }

    pub fn zoom(&mut self, amount: f32, camera: &mut OrbitCamera) {
        camera.add_distance(amount * self.zoom_speed);
    }

    /// Angle added per frame while auto-rotating
    pub fn auto_rotation_angle(&self) -> f32 {
        2.0 * std::f32::consts::PI / 60.0 / 60.0 * self.auto_rotate_speed
    }

    /// Advances the controls by one frame
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if self.auto_rotate && !self.is_mouse_pressed {
            self.yaw_delta += self.auto_rotation_angle();
        }

        camera.add_yaw(self.yaw_delta * self.damping_factor);
        camera.add_pitch(self.pitch_delta * self.damping_factor);

        let retained = 1.0 - self.damping_factor;
        self.yaw_delta *= retained;
        self.pitch_delta *= retained;
    }

    /// Pending yaw and pitch that have not been applied yet
    pub fn pending_delta(&self) -> (f32, f32) {
        (self.yaw_delta, self.pitch_delta)
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
    fn test_drag_is_applied_with_damping() {
        let mut camera = camera();
        let mut controls = CameraController::new(0.01, 1.0).with_damping(0.05);
        controls.set_pointer_down(true);
        controls.drag(-100.0, 0.0);

        controls.update(&mut camera);
        assert!((camera.yaw - 0.05).abs() < 1e-6);
        assert!((controls.pending_delta().0 - 0.95).abs() < 1e-6);

        controls.update(&mut camera);
        assert!((camera.yaw - (0.05 + 0.95 * 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_motion_decays_after_release() {
        let mut camera = camera();
        let mut controls = CameraController::new(0.01, 1.0).with_damping(0.25);
        controls.set_pointer_down(true);
        controls.drag(50.0, 0.0);
        controls.set_pointer_down(false);

        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!(controls.pending_delta().0.abs() < 1e-6);
        assert!((camera.yaw + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_auto_rotate_only_when_idle() {
        let mut camera = camera();
        let mut controls = CameraController::new(0.01, 1.0)
            .with_damping(1.0)
            .with_auto_rotate(true, 2.0);

        controls.update(&mut camera);
        let step = controls.auto_rotation_angle();
        assert!((camera.yaw - step).abs() < 1e-6);

        controls.set_pointer_down(true);
        controls.update(&mut camera);
        assert!((camera.yaw - step).abs() < 1e-6);
    }

    #[test]
    fn test_damping_is_clamped() {
        assert_eq!(CameraController::new(0.01, 1.0).with_damping(f32::NAN).damping_factor, 1.0);
        assert_eq!(CameraController::new(0.01, 1.0).with_damping(3.0).damping_factor, 1.0);
        assert_eq!(CameraController::new(0.01, 1.0).with_damping(-1.0).damping_factor, f32::EPSILON);
    }

    #[test]
    fn test_raw_button_events_do_not_start_drag() {
        let mut camera = camera();
        let mut controls = CameraController::new(0.01, 1.0);
        for button in [0, 1] {
            let press = DeviceEvent::Button {
                button,
                state: winit::event::ElementState::Pressed,
            };
            assert!(!controls.process_events(&press, &mut camera));
        }
        assert!(!controls.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, &mut camera));

        controls.set_pointer_down(true);
        assert!(controls.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, &mut camera));
        assert!((controls.pending_delta().0 + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_motion_without_button_is_ignored() {
        let mut camera = camera();
        let mut controls = CameraController::new(0.01, 1.0);
        let used = controls.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, &mut camera);
        assert!(!used);
        assert_eq!(controls.pending_delta(), (0.0, 0.0));
    }
}
