//! Perspective camera and viewport sizing

use glam::{Mat4, Vec3};

use crate::consts::*;

/// Canvas size in CSS pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Backing-store size in physical pixels (never zero)
    pub fn surface_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

/// Camera looking down -Z from `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub aspect: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub follow_offset: Vec3,
}

impl CameraRig {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: CAMERA_START,
            aspect,
            fov_y: CAMERA_FOV_Y_DEG.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            follow_offset: CAMERA_FOLLOW_OFFSET,
        }
    }

    /// Place the camera at `target` plus the follow offset
    pub fn follow(&mut self, target: Vec3) {
        self.position = target + self.follow_offset;
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_overview() {
        let camera = CameraRig::new(16.0 / 9.0);
        assert_eq!(camera.position, Vec3::new(5.0, 5.0, 10.0));
        assert!((camera.fov_y - 50f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_follow_uses_offset() {
        let mut camera = CameraRig::new(1.0);
        camera.follow(Vec3::new(1.0, 0.13, -2.0));
        assert!(camera.position.abs_diff_eq(Vec3::new(1.0, 0.63, 0.0), 1e-6));
    }

    #[test]
    fn test_resize_updates_aspect_and_surface() {
        let mut camera = CameraRig::new(1.0);
        let viewport = Viewport::new(1280.0, 720.0, 1.0);
        camera.set_viewport(&viewport);
        assert_eq!(camera.aspect, 1280.0 / 720.0);
        assert_eq!(viewport.surface_size(), (1280, 720));

        let retina = Viewport::new(800.0, 600.0, 2.0);
        camera.set_viewport(&retina);
        assert_eq!(camera.aspect, 800.0 / 600.0);
        assert_eq!(retina.surface_size(), (1600, 1200));
    }

    #[test]
    fn test_zero_height_viewport() {
        let viewport = Viewport::new(300.0, 0.0, 1.0);
        assert_eq!(viewport.aspect(), 1.0);
        assert_eq!(viewport.surface_size(), (300, 1));
    }

    #[test]
    fn test_point_ahead_is_in_clip_space() {
        let camera = CameraRig::new(1.0);
        let ahead = camera.position - Vec3::Z * 5.0;
        let clip = camera.view_projection() * ahead.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
