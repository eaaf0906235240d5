//! Scene configuration.
//!
//! The hosting page may hand over a partial JSON object; every missing key
//! falls back to the defaults in [`crate::constants`].

use crate::constants::*;
use crate::error::{Result, SceneError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureKind {
    #[default]
    Image,
    Video,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TextureEntry {
    pub url: String,
    #[serde(default)]
    pub kind: TextureKind,
}

impl TextureEntry {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: TextureKind::Image,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub rotation_speed: f32,
    pub drag_threshold_px: f32,
    pub drag_hold_ms: f64,
    pub drag_sound_probability: f32,
    pub hover_sound_probability: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            rotation_speed: ROTATION_SPEED,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            drag_hold_ms: DRAG_HOLD_MS,
            drag_sound_probability: DRAG_SOUND_PROBABILITY,
            hover_sound_probability: HOVER_SOUND_PROBABILITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    pub damping: f32,
    pub focus_kick: f32,
    pub auto_rotation_rate: f64,
    pub sphere_scale: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            damping: ROTATION_DAMPING,
            focus_kick: FOCUS_KICK,
            auto_rotation_rate: AUTO_ROTATION_RATE,
            sphere_scale: SPHERE_SCALE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MorphConfig {
    pub delay_ms: f64,
    pub base_speed: f32,
    pub progress_scale: f32,
    pub scroll_speed_cap: f32,
    pub scroll_distance_px: f32,
    pub focus_cooldown_ms: f64,
    pub video_lead_ms: f64,
    pub initial_factor: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            delay_ms: MORPH_DELAY_MS,
            base_speed: BASE_MORPH_SPEED,
            progress_scale: MORPH_PROGRESS_SCALE,
            scroll_speed_cap: SCROLL_SPEED_CAP,
            scroll_distance_px: SCROLL_SPEED_DISTANCE_PX,
            focus_cooldown_ms: FOCUS_MORPH_COOLDOWN_MS,
            video_lead_ms: VIDEO_MORPH_LEAD_MS,
            initial_factor: INITIAL_MORPH_FACTOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldConfig {
    pub radius: f32,
    pub hit_radius: f32,
    pub batch_size: usize,
    pub particles_per_marker: usize,
    pub hover_step: f32,
    pub destruction_step: f32,
    pub destruction_max: f32,
    pub breathing_amplitude: f32,
    pub breathing_rate: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            radius: MARKER_RADIUS,
            hit_radius: HIT_SPHERE_RADIUS,
            batch_size: FIELD_BATCH_SIZE,
            particles_per_marker: PARTICLES_PER_MARKER,
            hover_step: HOVER_STEP,
            destruction_step: DESTRUCTION_STEP,
            destruction_max: DESTRUCTION_MAX,
            breathing_amplitude: BREATHING_AMPLITUDE,
            breathing_rate: BREATHING_RATE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub z: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: CAMERA_FOV_DEG,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            z: CAMERA_Z,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    pub smoothing: f32,
    pub noise_gate: f32,
    pub master_volume: f32,
    pub fft_size: u32,
    pub analyser_smoothing: f32,
    /// Initial effect parameters, applied in order once the effects device is up.
    pub params: Vec<(String, f32)>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            smoothing: AUDIO_SMOOTHING,
            noise_gate: NOISE_GATE,
            master_volume: MASTER_VOLUME,
            fft_size: ANALYSER_FFT_SIZE,
            analyser_smoothing: ANALYSER_SMOOTHING,
            params: DEFAULT_AUDIO_PARAMS
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub interaction: InteractionConfig,
    pub motion: MotionConfig,
    pub morph: MorphConfig,
    pub field: FieldConfig,
    pub camera: CameraConfig,
    pub audio: AudioConfig,
    /// Base path prepended to relative texture urls.
    pub base_path: String,
    pub textures: Vec<TextureEntry>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            interaction: InteractionConfig::default(),
            motion: MotionConfig::default(),
            morph: MorphConfig::default(),
            field: FieldConfig::default(),
            camera: CameraConfig::default(),
            audio: AudioConfig::default(),
            base_path: String::new(),
            textures: DEFAULT_TEXTURE_URLS
                .iter()
                .map(|url| TextureEntry::image(*url))
                .collect(),
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: SceneConfig =
            serde_json::from_str(json).map_err(|e| SceneError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SceneError::InvalidConfig(msg.to_string()));
        if self.field.batch_size == 0 {
            return invalid("field.batch_size must be at least 1");
        }
        if !(self.motion.damping > 0.0 && self.motion.damping < 1.0) {
            return invalid("motion.damping must lie strictly between 0 and 1");
        }
        if self.textures.is_empty() {
            return invalid("at least one texture is required");
        }
        if self.field.radius <= 0.0 || self.field.hit_radius <= 0.0 {
            return invalid("field radii must be positive");
        }
        if self.motion.sphere_scale <= 0.0 {
            return invalid("motion.sphere_scale must be positive");
        }
        Ok(())
    }

    /// Resolve a texture url against `base_path` unless it is already absolute.
    pub fn texture_url(&self, index: usize) -> Option<String> {
        let entry = self.textures.get(index)?;
        let url = &entry.url;
        if self.base_path.is_empty() || url.starts_with('/') || url.contains("://") {
            return Some(url.clone());
        }
        Some(format!("{}/{}", self.base_path.trim_end_matches('/'), url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SceneConfig::from_json(r#"{ "morph": { "delay_ms": 2500 } }"#).unwrap();
        assert_eq!(cfg.morph.delay_ms, 2500.0);
        assert_eq!(cfg.morph.base_speed, BASE_MORPH_SPEED);
        assert_eq!(cfg.textures.len(), DEFAULT_TEXTURE_URLS.len());
        assert_eq!(cfg.audio.params[0], ("window".to_string(), 100.0));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = SceneConfig::from_json(r#"{ "field": { "batch_size": 0 } }"#).unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_damping_outside_unit_interval() {
        let mut cfg = SceneConfig::default();
        cfg.motion.damping = 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn video_entries_parse() {
        let cfg = SceneConfig::from_json(
            r#"{ "textures": [ { "url": "a.webp" }, { "url": "clip.mp4", "kind": "video" } ] }"#,
        )
        .unwrap();
        assert_eq!(cfg.textures[0].kind, TextureKind::Image);
        assert_eq!(cfg.textures[1].kind, TextureKind::Video);
    }

    #[test]
    fn texture_urls_join_base_path() {
        let mut cfg = SceneConfig::default();
        cfg.base_path = "/portfolio/".into();
        assert_eq!(cfg.texture_url(0).as_deref(), Some("/portfolio/my-photo.webp"));
        cfg.textures[1].url = "https://cdn.example.com/x.webp".into();
        assert_eq!(
            cfg.texture_url(1).as_deref(),
            Some("https://cdn.example.com/x.webp")
        );
        assert_eq!(cfg.texture_url(99), None);
    }
}
