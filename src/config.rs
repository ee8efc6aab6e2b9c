use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    #[serde(default = "ThumbnailConfig::default_capture_size")]
    pub capture_size: u32,
    #[serde(default = "ThumbnailConfig::default_display_width")]
    pub display_width: u32,
    #[serde(default = "ThumbnailConfig::default_highlight_border")]
    pub highlight_border: String,
    #[serde(default = "ThumbnailConfig::default_highlight_ms")]
    pub highlight_ms: u64,
    #[serde(default = "ThumbnailConfig::default_list_id")]
    pub list_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationConfig {
    #[serde(default = "IsolationConfig::default_lower_radius_limit")]
    pub lower_radius_limit: f32,
    #[serde(default = "IsolationConfig::default_upper_radius_factor")]
    pub upper_radius_factor: f32,
    #[serde(default = "IsolationConfig::default_precision_numerator")]
    pub precision_numerator: f32,
    #[serde(default = "IsolationConfig::default_radius_scale")]
    pub radius_scale: f32,
    #[serde(default = "IsolationConfig::default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "IsolationConfig::default_alpha_degrees")]
    pub alpha_degrees: f32,
    #[serde(default = "IsolationConfig::default_beta_degrees")]
    pub beta_degrees: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainCameraConfig {
    #[serde(default = "MainCameraConfig::default_alpha_degrees")]
    pub alpha_degrees: f32,
    #[serde(default = "MainCameraConfig::default_beta_degrees")]
    pub beta_degrees: f32,
    #[serde(default = "MainCameraConfig::default_radius")]
    pub radius: f32,
    #[serde(default = "MainCameraConfig::default_fov_degrees")]
    pub fov_degrees: f32,
    #[serde(default = "MainCameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "MainCameraConfig::default_far")]
    pub far: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(default = "LightConfig::default_direction")]
    pub direction: [f32; 3],
    #[serde(default = "LightConfig::default_intensity")]
    pub intensity: f32,
    #[serde(default = "LightConfig::default_ground_color")]
    pub ground_color: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstPersonConfig {
    #[serde(default = "FirstPersonConfig::default_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "FirstPersonConfig::default_ellipsoid")]
    pub ellipsoid: [f32; 3],
    #[serde(default = "FirstPersonConfig::default_speed")]
    pub speed: f32,
    #[serde(default = "FirstPersonConfig::default_gravity")]
    pub gravity: f32,
    #[serde(default = "FirstPersonConfig::default_min_z")]
    pub min_z: f32,
    #[serde(default = "FirstPersonConfig::default_keys_up")]
    pub keys_up: Vec<u32>,
    #[serde(default = "FirstPersonConfig::default_keys_down")]
    pub keys_down: Vec<u32>,
    #[serde(default = "FirstPersonConfig::default_keys_left")]
    pub keys_left: Vec<u32>,
    #[serde(default = "FirstPersonConfig::default_keys_right")]
    pub keys_right: Vec<u32>,
    #[serde(default = "FirstPersonConfig::default_keys_upward")]
    pub keys_upward: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default)]
    pub clear_color: [u8; 4],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
    #[serde(default)]
    pub isolation: IsolationConfig,
    #[serde(default)]
    pub main_camera: MainCameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub first_person: FirstPersonConfig,
    #[serde(default)]
    pub screenshot: ScreenshotConfig,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryConfigOverrides {
    pub capture_size: Option<u32>,
    pub display_width: Option<u32>,
    pub highlight_ms: Option<u64>,
}

impl ThumbnailConfig {
    const fn default_capture_size() -> u32 {
        400
    }

    const fn default_display_width() -> u32 {
        100
    }

    fn default_highlight_border() -> String {
        "2px solid #ffcc00".to_string()
    }

    const fn default_highlight_ms() -> u64 {
        1_000
    }

    fn default_list_id() -> String {
        "imagelist".to_string()
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            capture_size: Self::default_capture_size(),
            display_width: Self::default_display_width(),
            highlight_border: Self::default_highlight_border(),
            highlight_ms: Self::default_highlight_ms(),
            list_id: Self::default_list_id(),
        }
    }
}

impl IsolationConfig {
    const fn default_lower_radius_limit() -> f32 {
        1.0
    }

    const fn default_upper_radius_factor() -> f32 {
        5.0
    }

    const fn default_precision_numerator() -> f32 {
        200.0
    }

    const fn default_radius_scale() -> f32 {
        1.0
    }

    const fn default_fov_degrees() -> f32 {
        45.0
    }

    const fn default_alpha_degrees() -> f32 {
        90.0
    }

    const fn default_beta_degrees() -> f32 {
        70.0
    }
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            lower_radius_limit: Self::default_lower_radius_limit(),
            upper_radius_factor: Self::default_upper_radius_factor(),
            precision_numerator: Self::default_precision_numerator(),
            radius_scale: Self::default_radius_scale(),
            fov_degrees: Self::default_fov_degrees(),
            alpha_degrees: Self::default_alpha_degrees(),
            beta_degrees: Self::default_beta_degrees(),
        }
    }
}

impl MainCameraConfig {
    const fn default_alpha_degrees() -> f32 {
        90.0
    }

    const fn default_beta_degrees() -> f32 {
        80.0
    }

    const fn default_radius() -> f32 {
        20.0
    }

    const fn default_fov_degrees() -> f32 {
        45.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        1000.0
    }
}

impl Default for MainCameraConfig {
    fn default() -> Self {
        Self {
            alpha_degrees: Self::default_alpha_degrees(),
            beta_degrees: Self::default_beta_degrees(),
            radius: Self::default_radius(),
            fov_degrees: Self::default_fov_degrees(),
            near: Self::default_near(),
            far: Self::default_far(),
        }
    }
}

impl LightConfig {
    const fn default_direction() -> [f32; 3] {
        [0.0, 1.0, 0.0]
    }

    const fn default_intensity() -> f32 {
        0.7
    }

    const fn default_ground_color() -> [f32; 3] {
        [0.0, 0.0, 0.0]
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: Self::default_direction(),
            intensity: Self::default_intensity(),
            ground_color: Self::default_ground_color(),
        }
    }
}

impl FirstPersonConfig {
    const fn default_position() -> [f32; 3] {
        [-4.0, 2.0, 0.0]
    }

    const fn default_ellipsoid() -> [f32; 3] {
        [0.75, 1.0, 0.75]
    }

    const fn default_speed() -> f32 {
        0.2
    }

    const fn default_gravity() -> f32 {
        -0.08
    }

    const fn default_min_z() -> f32 {
        0.1
    }

    fn default_keys_up() -> Vec<u32> {
        vec![87]
    }

    fn default_keys_down() -> Vec<u32> {
        vec![83]
    }

    fn default_keys_left() -> Vec<u32> {
        vec![65]
    }

    fn default_keys_right() -> Vec<u32> {
        vec![68]
    }

    fn default_keys_upward() -> Vec<u32> {
        vec![32]
    }
}

impl Default for FirstPersonConfig {
    fn default() -> Self {
        Self {
            position: Self::default_position(),
            target: [0.0, 0.0, 0.0],
            ellipsoid: Self::default_ellipsoid(),
            speed: Self::default_speed(),
            gravity: Self::default_gravity(),
            min_z: Self::default_min_z(),
            keys_up: Self::default_keys_up(),
            keys_down: Self::default_keys_down(),
            keys_left: Self::default_keys_left(),
            keys_right: Self::default_keys_right(),
            keys_upward: Self::default_keys_upward(),
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self { clear_color: [0, 0, 0, 0] }
    }
}

impl GalleryConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &GalleryConfigOverrides) {
        if let Some(size) = overrides.capture_size {
            self.thumbnail.capture_size = size;
        }
        if let Some(width) = overrides.display_width {
            self.thumbnail.display_width = width;
        }
        if let Some(ms) = overrides.highlight_ms {
            self.thumbnail.highlight_ms = ms;
        }
    }
}

impl GalleryConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.capture_size.is_none() && self.display_width.is_none() && self.highlight_ms.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.capture_size.is_some() {
            fields.push("capture_size");
        }
        if self.display_width.is_some() {
            fields.push("display_width");
        }
        if self.highlight_ms.is_some() {
            fields.push("highlight_ms");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_playground_defaults() {
        let cfg: GalleryConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg.thumbnail.capture_size, 400);
        assert_eq!(cfg.thumbnail.list_id, "imagelist");
        assert_eq!(cfg.thumbnail.highlight_ms, 1_000);
        assert!((cfg.isolation.upper_radius_factor - 5.0).abs() < f32::EPSILON);
        assert!((cfg.isolation.precision_numerator - 200.0).abs() < f32::EPSILON);
        assert!((cfg.main_camera.radius - 20.0).abs() < f32::EPSILON);
        assert!((cfg.light.intensity - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.first_person.keys_upward, vec![32]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: GalleryConfig =
            serde_json::from_str(r#"{ "thumbnail": { "capture_size": 128 } }"#).expect("parse");
        assert_eq!(cfg.thumbnail.capture_size, 128);
        assert_eq!(cfg.thumbnail.display_width, 100);
    }

    #[test]
    fn overrides_replace_only_present_fields() {
        let mut cfg = GalleryConfig::default();
        let overrides = GalleryConfigOverrides { capture_size: Some(64), ..Default::default() };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.thumbnail.capture_size, 64);
        assert_eq!(cfg.thumbnail.display_width, 100);
        assert_eq!(overrides.applied_fields(), vec!["capture_size"]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = GalleryConfig::load_or_default("does/not/exist.json");
        assert_eq!(cfg.thumbnail.capture_size, 400);
    }
}
