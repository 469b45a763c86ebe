//! Viewer configuration, read once at startup from a TOML file.
//!
//! Every field has a default so an empty or partial file is valid. The layout
//! table and the rotation policy are the parts that get tuned most often.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::gfx::lighting::LightRig;
use crate::viewport::LayoutClass;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub asset: AssetConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub lights: LightRig,
    #[serde(default)]
    pub rotation: RotationPolicy,
    #[serde(default)]
    pub placeholder: PlaceholderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory or `http(s)://` URL the path is resolved against
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default = "default_asset_path")]
    pub path: String,
}

/// Target size and offset for one layout class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutParams {
    /// Length of the model's longest edge after scaling, in world units
    pub target: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// A `[layout.<class>]` table; missing keys keep that class's default
#[derive(Deserialize)]
struct LayoutTable {
    target: Option<f32>,
    offset_x: Option<f32>,
    offset_y: Option<f32>,
}

impl LayoutTable {
    fn over(self, base: LayoutParams) -> LayoutParams {
        LayoutParams {
            target: self.target.unwrap_or(base.target),
            offset_x: self.offset_x.unwrap_or(base.offset_x),
            offset_y: self.offset_y.unwrap_or(base.offset_y),
        }
    }
}

fn compact_params<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LayoutParams, D::Error> {
    Ok(LayoutTable::deserialize(deserializer)?.over(default_compact()))
}

fn wide_params<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LayoutParams, D::Error> {
    Ok(LayoutTable::deserialize(deserializer)?.over(default_wide()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Logical width below which the container counts as compact
    #[serde(default = "default_breakpoint")]
    pub breakpoint: f64,
    #[serde(default = "default_compact", deserialize_with = "compact_params")]
    pub compact: LayoutParams,
    #[serde(default = "default_wide", deserialize_with = "wide_params")]
    pub wide: LayoutParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_distance")]
    pub distance: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

/// The single policy that drives the model's orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Constant yaw increment per frame
    Idle {
        #[serde(default = "default_idle_speed")]
        speed: f32,
    },
    /// Yaw follows the accumulated scroll offset
    Scroll {
        #[serde(default = "default_scroll_factor")]
        factor: f32,
    },
    /// Camera orbits under user control
    Orbit(OrbitSettings),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    #[serde(default = "default_placeholder_size")]
    pub size: f32,
    #[serde(default = "default_placeholder_color")]
    pub color: u32,
    /// Radians per frame around x and y
    #[serde(default = "default_placeholder_spin")]
    pub spin: f32,
}

fn default_title() -> String { "Jersey 3D".to_string() }
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_base() -> String { ".".to_string() }
fn default_asset_path() -> String { "assets/3d/bk.glb".to_string() }
fn default_breakpoint() -> f64 { 768.0 }
fn default_compact() -> LayoutParams { LayoutParams { target: 2.5, offset_x: 0.0, offset_y: -0.2 } }
fn default_wide() -> LayoutParams { LayoutParams { target: 3.5, offset_x: 0.0, offset_y: -0.3 } }
fn default_fov() -> f32 { 45.0 }
fn default_distance() -> f32 { 5.0 }
fn default_near() -> f32 { 0.1 }
fn default_far() -> f32 { 1000.0 }
fn default_idle_speed() -> f32 { 0.003 }
fn default_scroll_factor() -> f32 { 0.002 }
fn default_placeholder_size() -> f32 { 0.2 }
fn default_placeholder_color() -> u32 { 0x00ff00 }
fn default_placeholder_spin() -> f32 { 0.05 }

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            path: default_asset_path(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            breakpoint: default_breakpoint(),
            compact: default_compact(),
            wide: default_wide(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            distance: default_distance(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        RotationPolicy::Idle {
            speed: default_idle_speed(),
        }
    }
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 1.0,
            damping_factor: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            min_distance: 2.0,
            max_distance: 16.0,
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            size: default_placeholder_size(),
            color: default_placeholder_color(),
            spin: default_placeholder_spin(),
        }
    }
}

impl LayoutConfig {
    /// Looks up the entry for a layout class
    pub fn params(&self, class: LayoutClass) -> &LayoutParams {
        match class {
            LayoutClass::Compact => &self.compact,
            LayoutClass::Wide => &self.wide,
        }
    }
}

impl ViewerConfig {
    /// Reads and validates a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Uses the file when one is given, the built-in defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let finite = |name: &str, value: f32| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")))
            }
        };

        if !(self.layout.breakpoint.is_finite() && self.layout.breakpoint > 0.0) {
            return invalid(format!("layout.breakpoint must be > 0, got {}", self.layout.breakpoint));
        }
        for (name, params) in [("compact", &self.layout.compact), ("wide", &self.layout.wide)] {
            if !(params.target.is_finite() && params.target > 0.0) {
                return invalid(format!("layout.{name}.target must be > 0, got {}", params.target));
            }
            if !(params.offset_x.is_finite() && params.offset_y.is_finite()) {
                return invalid(format!("layout.{name} offsets must be finite"));
            }
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return invalid(format!("camera.fov_degrees must be in (0, 180), got {}", camera.fov_degrees));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return invalid("camera.near must be > 0 and camera.far > camera.near".to_string());
        }
        if !(camera.distance.is_finite() && camera.distance > 0.0) {
            return invalid(format!("camera.distance must be > 0, got {}", camera.distance));
        }

        match &self.rotation {
            RotationPolicy::Idle { speed } => finite("rotation.speed", *speed)?,
            RotationPolicy::Scroll { factor } => finite("rotation.factor", *factor)?,
            RotationPolicy::Orbit(orbit) => {
                finite("rotation.rotate_speed", orbit.rotate_speed)?;
                finite("rotation.zoom_speed", orbit.zoom_speed)?;
                finite("rotation.auto_rotate_speed", orbit.auto_rotate_speed)?;
            }
        }
        if let RotationPolicy::Orbit(orbit) = &self.rotation {
            if !(orbit.damping_factor > 0.0 && orbit.damping_factor <= 1.0) {
                return invalid(format!(
                    "rotation.damping_factor must be in (0, 1], got {}",
                    orbit.damping_factor
                ));
            }
            if !(orbit.min_distance > 0.0 && orbit.max_distance >= orbit.min_distance) {
                return invalid("rotation.min_distance must be > 0 and <= max_distance".to_string());
            }
        }

        finite("placeholder.spin", self.placeholder.spin)?;
        if !(self.placeholder.size.is_finite() && self.placeholder.size > 0.0) {
            return invalid(format!("placeholder.size must be > 0, got {}", self.placeholder.size));
        }
        for (name, intensity) in self.lights.intensities() {
            finite(&format!("lights.{name}.intensity"), intensity)?;
        }

        if self.container.width == 0 || self.container.height == 0 {
            return invalid("container.width and container.height must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = ViewerConfig::default();
        assert_eq!(config.asset.path, "assets/3d/bk.glb");
        assert_eq!(config.layout.breakpoint, 768.0);
        assert_eq!(config.layout.compact.target, 2.5);
        assert_eq!(config.layout.wide.offset_y, -0.3);
        assert_eq!(config.camera.distance, 5.0);
        assert_eq!(config.rotation, RotationPolicy::Idle { speed: 0.003 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layout_params_lookup() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.params(LayoutClass::Compact).target, 2.5);
        assert_eq!(layout.params(LayoutClass::Wide).target, 3.5);
    }

    // =============================================================
    // TOML parsing tests
    // =============================================================

    #[test]
    fn test_config_deserialize_empty() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial_layout() {
        let toml_str = r#"
[layout]
breakpoint = 600

[layout.wide]
target = 4.0
"#;
        let config = ViewerConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.layout.breakpoint, 600.0);
        assert_eq!(config.layout.wide.target, 4.0);
        assert_eq!(config.layout.wide.offset_y, -0.3);
        assert_eq!(config.layout.compact, default_compact()); // default
    }

    #[test]
    fn test_partial_layout_entry_keeps_class_defaults() {
        let config = ViewerConfig::from_toml_str("[layout.compact]\noffset_y = -0.1\n").unwrap();
        assert_eq!(config.layout.compact.target, 2.5);
        assert_eq!(config.layout.compact.offset_y, -0.1);

        let config = ViewerConfig::from_toml_str("[layout.wide]\noffset_x = 0.5\n").unwrap();
        assert_eq!(config.layout.wide.target, 3.5);
        assert_eq!(config.layout.wide.offset_y, -0.3);
        assert_eq!(config.layout.wide.offset_x, 0.5);
    }

    #[test]
    fn test_rotation_modes() {
        let scroll = ViewerConfig::from_toml_str("[rotation]\nmode = \"scroll\"\n").unwrap();
        assert_eq!(scroll.rotation, RotationPolicy::Scroll { factor: 0.002 });

        let orbit = ViewerConfig::from_toml_str(
            "[rotation]\nmode = \"orbit\"\ndamping_factor = 0.1\nauto_rotate = false\n",
        )
        .unwrap();
        match orbit.rotation {
            RotationPolicy::Orbit(settings) => {
                assert_eq!(settings.damping_factor, 0.1);
                assert!(!settings.auto_rotate);
                assert_eq!(settings.auto_rotate_speed, 2.0);
            }
            other => panic!("expected orbit policy, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_rotation_mode_is_rejected() {
        let result = ViewerConfig::from_toml_str("[rotation]\nmode = \"wobble\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_lights_partial_override() {
        let toml_str = r#"
[lights.rim]
color = 0xff0000
intensity = 2.0
position = [-4.0, 1.0, -4.0]
"#;
        let config = ViewerConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.lights.rim.color, 0xff0000);
        assert_eq!(config.lights.key, LightRig::default().key);
    }

    #[test]
    fn test_single_key_light_override() {
        let config = ViewerConfig::from_toml_str("[lights.key]\nintensity = 6.0\n").unwrap();
        let defaults = LightRig::default();
        assert_eq!(config.lights.key.intensity, 6.0);
        assert_eq!(config.lights.key.color, defaults.key.color);
        assert_eq!(config.lights.key.position, defaults.key.position);
        assert_eq!(config.lights.rim, defaults.rim);
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let mut config = ViewerConfig::default();
        config.rotation = RotationPolicy::Orbit(OrbitSettings::default());
        config.layout.compact.target = 1.75;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed = ViewerConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    // =============================================================
    // Validation tests
    // =============================================================

    #[test]
    fn test_invalid_targets_are_rejected() {
        for target in ["0.0", "-1.0", "nan", "inf"] {
            let toml_str = format!("[layout.compact]\ntarget = {target}\n");
            let result = ViewerConfig::from_toml_str(&toml_str);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "target {target}");
        }
    }

    #[test]
    fn test_invalid_damping_is_rejected() {
        let result =
            ViewerConfig::from_toml_str("[rotation]\nmode = \"orbit\"\ndamping_factor = 0.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        let result =
            ViewerConfig::from_toml_str("[rotation]\nmode = \"orbit\"\ndamping_factor = 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_non_finite_values_are_rejected() {
        let cases = [
            "[rotation]\nmode = \"idle\"\nspeed = nan\n",
            "[rotation]\nmode = \"scroll\"\nfactor = inf\n",
            "[rotation]\nmode = \"orbit\"\nrotate_speed = nan\n",
            "[rotation]\nmode = \"orbit\"\nzoom_speed = -inf\n",
            "[rotation]\nmode = \"orbit\"\nauto_rotate_speed = nan\n",
            "[rotation]\nmode = \"orbit\"\ndamping_factor = nan\n",
            "[placeholder]\nspin = nan\n",
            "[placeholder]\nsize = inf\n",
            "[lights.key]\nintensity = nan\n",
            "[lights.ambient]\nintensity = inf\n",
        ];
        for toml_str in cases {
            let result = ViewerConfig::from_toml_str(toml_str);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{toml_str}");
        }
    }

    #[test]
    fn test_invalid_breakpoint_is_rejected() {
        let result = ViewerConfig::from_toml_str("[layout]\nbreakpoint = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    // =============================================================
    // File loading tests
    // =============================================================

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[asset]\nbase = \"http://localhost:8000\"").unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.asset.base, "http://localhost:8000");
        assert_eq!(config.asset.path, "assets/3d/bk.glb");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ViewerConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(ViewerConfig::load_or_default(None).unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let sample = ViewerConfig::from_toml_str(include_str!("../config/viewer.toml")).unwrap();
        assert_eq!(sample, ViewerConfig::default());
    }
}
