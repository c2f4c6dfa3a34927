//! Scene configuration
//!
//! The video manifest (`videos.json`) is consumed positionally, one entry per
//! screen slot. `SceneSettings` holds the values a host page may override
//! when mounting the scene.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while configuring or building the scene
#[derive(Debug)]
pub enum SceneError {
    /// Manifest has fewer entries than there are screen slots
    NotEnoughVideos { required: usize, found: usize },
    /// Manifest JSON could not be parsed
    Manifest(serde_json::Error),
    /// Settings JSON could not be parsed
    Settings(serde_json::Error),
    /// A model could not be decoded
    Model { url: String, reason: String },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::NotEnoughVideos { required, found } => write!(
                f,
                "video manifest lists {found} entries but the screen wall needs {required}"
            ),
            SceneError::Manifest(e) => write!(f, "invalid video manifest: {e}"),
            SceneError::Settings(e) => write!(f, "invalid scene settings: {e}"),
            SceneError::Model { url, reason } => write!(f, "failed to load model {url}: {reason}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Manifest(e) | SceneError::Settings(e) => Some(e),
            _ => None,
        }
    }
}

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub src: String,
    #[serde(default)]
    pub title: String,
}

/// Ordered list of videos, validated against the screen count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCatalog {
    entries: Vec<VideoEntry>,
}

impl VideoCatalog {
    /// Parse a manifest and check it covers `required` screen slots
    pub fn from_json(json: &str, required: usize) -> Result<Self, SceneError> {
        let entries: Vec<VideoEntry> = serde_json::from_str(json).map_err(SceneError::Manifest)?;
        Self::new(entries, required)
    }

    pub fn new(entries: Vec<VideoEntry>, required: usize) -> Result<Self, SceneError> {
        if entries.len() < required {
            return Err(SceneError::NotEnoughVideos {
                required,
                found: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    /// Entry for the given screen slot
    pub fn get(&self, index: usize) -> Option<&VideoEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Physics tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: [f32; 3],
    pub ground_restitution: f32,
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub ball_restitution: f32,
    pub ball_start: [f32; 3],
    pub ball_start_spin: [f32; 3],
    pub ball_linear_damping: f32,
    pub ball_angular_damping: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY.to_array(),
            ground_restitution: GROUND_RESTITUTION,
            ball_radius: BALL_RADIUS,
            ball_mass: BALL_MASS,
            ball_restitution: BALL_RESTITUTION,
            ball_start: BALL_START.to_array(),
            ball_start_spin: BALL_START_SPIN.to_array(),
            ball_linear_damping: BALL_LINEAR_DAMPING,
            ball_angular_damping: BALL_ANGULAR_DAMPING,
        }
    }
}

/// Host-overridable scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// DOM id of the render canvas
    pub canvas_id: String,
    /// URL of the video manifest
    pub videos_url: String,
    pub stadium_url: String,
    pub football_url: String,
    /// Steps during which a re-strike of the same screen is ignored (0 = never)
    pub toggle_cooldown_steps: u32,
    pub physics: PhysicsSettings,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            canvas_id: "myCanvas".to_string(),
            videos_url: "videos.json".to_string(),
            stadium_url: "stadium/scene.gltf".to_string(),
            football_url: "football/scene.gltf".to_string(),
            toggle_cooldown_steps: 0,
            physics: PhysicsSettings::default(),
        }
    }
}

impl SceneSettings {
    /// Parse settings; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        serde_json::from_str(json).map_err(SceneError::Settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(n: usize) -> String {
        let entries: Vec<VideoEntry> = (0..n)
            .map(|i| VideoEntry {
                src: format!("videos/{i}.mp4"),
                title: format!("Clip {i}"),
            })
            .collect();
        serde_json::to_string(&entries).unwrap()
    }

    #[test]
    fn test_catalog_accepts_full_manifest() {
        let catalog = VideoCatalog::from_json(&manifest(12), SCREEN_COUNT).unwrap();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.get(3).unwrap().src, "videos/3.mp4");
        assert_eq!(catalog.get(11).unwrap().title, "Clip 11");
    }

    #[test]
    fn test_catalog_allows_extra_entries() {
        let catalog = VideoCatalog::from_json(&manifest(15), SCREEN_COUNT).unwrap();
        assert_eq!(catalog.len(), 15);
    }

    #[test]
    fn test_short_manifest_fails_fast() {
        let err = VideoCatalog::from_json(&manifest(5), SCREEN_COUNT).unwrap_err();
        assert!(matches!(
            err,
            SceneError::NotEnoughVideos {
                required: 12,
                found: 5
            }
        ));
        assert!(err.to_string().contains("5 entries"));
    }

    #[test]
    fn test_malformed_manifest() {
        let err = VideoCatalog::from_json("{\"src\": 1}", SCREEN_COUNT).unwrap_err();
        assert!(matches!(err, SceneError::Manifest(_)));
    }

    #[test]
    fn test_title_is_optional() {
        let catalog = VideoCatalog::from_json(r#"[{"src": "a.mp4"}]"#, 1).unwrap();
        assert_eq!(catalog.get(0).unwrap().title, "");
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings =
            SceneSettings::from_json(r#"{"canvas_id": "stage", "toggle_cooldown_steps": 6}"#)
                .unwrap();
        assert_eq!(settings.canvas_id, "stage");
        assert_eq!(settings.toggle_cooldown_steps, 6);
        assert_eq!(settings.videos_url, "videos.json");
        assert_eq!(settings.physics, PhysicsSettings::default());
    }

    #[test]
    fn test_default_physics_matches_constants() {
        let physics = PhysicsSettings::default();
        assert_eq!(physics.gravity, [0.0, -9.82, 0.0]);
        assert_eq!(physics.ground_restitution, 0.8);
        assert_eq!(physics.ball_restitution, 0.5);
        assert_eq!(physics.ball_radius, 0.13);
    }
}
