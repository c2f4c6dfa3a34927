//! Stadium Screens - a kickable football and a wall of video screens
//!
//! Core modules:
//! - `sim`: Deterministic scene logic (physics world, screen wall, drag input, camera)
//! - `config`: Video manifest, overridable settings, and error types
//! - `assets`: glTF model decoding and load cancellation
//! - `renderer`: WebGPU rendering pipeline
//! - `web`: Browser bootstrap, listeners, and the animation loop (wasm32 only)

pub mod assets;
pub mod config;
pub mod renderer;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{SceneError, SceneSettings, VideoCatalog, VideoEntry};

use glam::Vec3;

/// Scene configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep, applied once per animation frame
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Gravity (m/s²)
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);
    pub const GROUND_RESTITUTION: f32 = 0.8;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.13;
    pub const BALL_MASS: f32 = 1.0;
    pub const BALL_RESTITUTION: f32 = 0.5;
    pub const BALL_START: Vec3 = Vec3::new(0.0, 5.0, 2.0);
    pub const BALL_START_SPIN: Vec3 = Vec3::new(10.0, 0.0, 0.0);
    pub const BALL_LINEAR_DAMPING: f32 = 0.2;
    pub const BALL_ANGULAR_DAMPING: f32 = 0.5;

    /// Pixels of drag to velocity (m/s)
    pub const DRAG_SCALE: f32 = 0.01;

    /// Screen wall layout
    pub const SCREEN_COUNT: usize = 12;
    pub const SCREENS_PER_ROW: usize = 4;
    /// Collider half extents; the visible box is twice this size
    pub const SCREEN_HALF_WIDTH: f32 = 1.778;
    pub const SCREEN_HALF_HEIGHT: f32 = 1.0;
    pub const SCREEN_HALF_THICKNESS: f32 = 0.05;
    pub const SCREEN_SPACING: f32 = 0.15;
    pub const SCREEN_BASE: Vec3 = Vec3::new(-6.0, SCREEN_HALF_HEIGHT + 0.1, -3.0);
    /// Border overlay grows the screen face by this much
    pub const BORDER_MARGIN: f32 = 0.1;
    pub const BORDER_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
    pub const HIGHLIGHT_OPACITY: f32 = 0.5;

    /// Camera
    pub const CAMERA_FOV_Y_DEG: f32 = 50.0;
    pub const CAMERA_NEAR: f32 = 0.01;
    pub const CAMERA_FAR: f32 = 1000.0;
    pub const CAMERA_START: Vec3 = Vec3::new(5.0, 5.0, 10.0);
    pub const CAMERA_FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 2.0);

    /// Lights
    pub const AMBIENT_INTENSITY: f32 = 1.0;
    pub const SUN_INTENSITY: f32 = 1.0;
    pub const SUN_POSITION: Vec3 = Vec3::new(0.0, 10.0, 0.0);

    /// Model placement
    pub const STADIUM_SCALE: f32 = 2.0;
    pub const STADIUM_POSITION: Vec3 = Vec3::new(23.5, -1.1, 45.0);
    pub const STADIUM_YAW: f32 = std::f32::consts::FRAC_PI_2;
    pub const FOOTBALL_SCALE: f32 = 0.003;
}

/// Full visible size of one screen face (width, height)
#[inline]
pub fn screen_face_size() -> (f32, f32) {
    (consts::SCREEN_HALF_WIDTH * 2.0, consts::SCREEN_HALF_HEIGHT * 2.0)
}

/// Convert a rapier vector to glam
#[inline]
pub fn to_glam(v: &rapier3d::prelude::Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert a glam vector to rapier
#[inline]
pub fn to_rapier(v: Vec3) -> rapier3d::prelude::Vector<f32> {
    rapier3d::prelude::Vector::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_conversion_keeps_components() {
        let v = Vec3::new(0.5, -3.25, 12.0);
        let r = to_rapier(v);
        assert_eq!((r.x, r.y, r.z), (0.5, -3.25, 12.0));
        assert_eq!(to_glam(&r), v);
    }

    #[test]
    fn test_screen_face_matches_half_extents() {
        let (w, h) = screen_face_size();
        assert_eq!(w, consts::SCREEN_HALF_WIDTH * 2.0);
        assert_eq!(h, consts::SCREEN_HALF_HEIGHT * 2.0);
    }
}
