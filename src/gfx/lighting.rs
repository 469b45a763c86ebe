//! # Light Rig
//!
//! The fixed four-light setup the jersey is shown under: a flat ambient
//! fill, a sky/ground hemisphere light, a white key light and a purple rim
//! light behind the model. Intensities are configurable because they were
//! retuned many times; the shape of the rig is not.

use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Deserializer, Serialize};

/// Converts a `0xRRGGBB` color into linear-ish RGB floats
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemisphereLight {
    pub sky_color: u32,
    pub ground_color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self {
            sky_color: 0xffffff,
            ground_color: 0x444444,
            intensity: 3.0,
            position: [0.0, 20.0, 0.0],
        }
    }
}

/// A light with a color, an intensity and a position. For the directional
/// key light the position only defines the direction towards the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionedLight {
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

const KEY_LIGHT: PositionedLight = PositionedLight {
    color: 0xffffff,
    intensity: 4.0,
    position: [2.0, 2.0, 5.0],
};

const RIM_LIGHT: PositionedLight = PositionedLight {
    color: 0xaa00ff,
    intensity: 5.0,
    position: [-5.0, 0.0, -5.0],
};

/// A `[lights.key]`/`[lights.rim]` table; missing keys keep the rig's value
#[derive(Deserialize)]
struct PositionedLightTable {
    color: Option<u32>,
    intensity: Option<f32>,
    position: Option<[f32; 3]>,
}

impl PositionedLightTable {
    fn over(self, base: PositionedLight) -> PositionedLight {
        PositionedLight {
            color: self.color.unwrap_or(base.color),
            intensity: self.intensity.unwrap_or(base.intensity),
            position: self.position.unwrap_or(base.position),
        }
    }
}

fn key_light<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PositionedLight, D::Error> {
    Ok(PositionedLightTable::deserialize(deserializer)?.over(KEY_LIGHT))
}

fn rim_light<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PositionedLight, D::Error> {
    Ok(PositionedLightTable::deserialize(deserializer)?.over(RIM_LIGHT))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub hemisphere: HemisphereLight,
    #[serde(deserialize_with = "key_light")]
    pub key: PositionedLight,
    #[serde(deserialize_with = "rim_light")]
    pub rim: PositionedLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight::default(),
            hemisphere: HemisphereLight::default(),
            key: KEY_LIGHT,
            rim: RIM_LIGHT,
        }
    }
}

impl LightRig {
    /// Intensities by name, for validation
    pub fn intensities(&self) -> [(&'static str, f32); 4] {
        [
            ("ambient", self.ambient.intensity),
            ("hemisphere", self.hemisphere.intensity),
            ("key", self.key.intensity),
            ("rim", self.rim.intensity),
        ]
    }
}

/// Light data in the layout the shader expects.
///
/// Every entry is a `vec4`; the `w` component carries the intensity where
/// one is needed. MUST match the light fields of `Globals` in `viewer.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub hemi_direction: [f32; 4],
    pub key_direction: [f32; 4],
    pub key_color: [f32; 4],
    pub rim_position: [f32; 4],
    pub rim_color: [f32; 4],
}

fn with_w(xyz: [f32; 3], w: f32) -> [f32; 4] {
    [xyz[0], xyz[1], xyz[2], w]
}

fn direction_to(position: [f32; 3]) -> [f32; 3] {
    let v = Vector3::from(position);
    if v.magnitude2() > 0.0 {
        v.normalize().into()
    } else {
        [0.0, 1.0, 0.0]
    }
}

impl LightRig {
    pub fn uniform(&self) -> LightsUniform {
        LightsUniform {
            ambient: with_w(rgb(self.ambient.color), self.ambient.intensity),
            hemi_sky: with_w(rgb(self.hemisphere.sky_color), self.hemisphere.intensity),
            hemi_ground: with_w(rgb(self.hemisphere.ground_color), self.hemisphere.intensity),
            hemi_direction: with_w(direction_to(self.hemisphere.position), 0.0),
            key_direction: with_w(direction_to(self.key.position), 0.0),
            key_color: with_w(rgb(self.key.color), self.key.intensity),
            rim_position: with_w(self.rim.position, 1.0),
            rim_color: with_w(rgb(self.rim.color), self.rim.intensity),
        }
    }
}
