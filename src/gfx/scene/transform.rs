use cgmath::{Matrix4, Rad, Vector3, Zero};

/// Position, Euler rotation and scale of a scene node.
///
/// The matrix is composed as `T * R * S` with the rotation applied in
/// X, Y, Z order (`R = Rx * Ry * Rz`), so scaling and rotating always happen
/// around the node's own origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles in radians
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Returns the scale if all three axes agree
    pub fn uniform_scale(&self) -> Option<f32> {
        (self.scale.x == self.scale.y && self.scale.y == self.scale.z).then_some(self.scale.x)
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
