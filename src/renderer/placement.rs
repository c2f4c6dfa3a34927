//! Model-to-world transforms for the loaded assets

use glam::{Mat4, Quat, Vec3};

use crate::consts::*;

/// Stadium root transform
pub fn stadium() -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(STADIUM_SCALE),
        Quat::from_rotation_y(STADIUM_YAW),
        STADIUM_POSITION,
    )
}

/// Ball visual at the physics body's pose
pub fn ball(position: Vec3, rotation: Quat, scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stadium_origin_lands_at_offset() {
        let origin = stadium().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(23.5, -1.1, 45.0), 1e-5));
    }

    #[test]
    fn test_stadium_is_turned_a_quarter() {
        // +X in model space ends up along -Z after a +90° yaw, scaled by 2
        let x = stadium().transform_vector3(Vec3::X);
        assert!(x.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn test_ball_follows_body() {
        let m = ball(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, FOOTBALL_SCALE);
        let p = m.transform_point3(Vec3::new(100.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(1.3, 2.0, 3.0), 1e-5));
    }
}
