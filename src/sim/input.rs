//! Drag-to-kick input
//!
//! A pointer press records where the drag started; the release turns the
//! drag vector into the ball's new velocity.

use glam::{Vec2, Vec3};

use crate::consts::DRAG_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { start: Vec2 },
}

#[derive(Debug, Clone, Default)]
pub struct DragInput {
    state: DragState,
}

impl DragInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Pointer pressed at client coordinates (x, y)
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.state = DragState::Dragging {
            start: Vec2::new(x, y),
        };
    }

    /// Pointer released; returns the kick velocity if a drag was in progress
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<Vec3> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { start } => Some(kick_velocity(Vec2::new(x, y) - start)),
            DragState::Idle => None,
        }
    }
}

/// Velocity for a drag of `delta` pixels
///
/// Screen-space x maps to world x and screen-space y to world z; the upward
/// component equals the horizontal speed.
pub fn kick_velocity(delta: Vec2) -> Vec3 {
    let d = delta * DRAG_SCALE;
    let magnitude = (d.x * d.x + d.y * d.y).sqrt();
    Vec3::new(d.x, magnitude, d.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_horizontal_drag() {
        let mut input = DragInput::new();
        input.pointer_down(10.0, 20.0);
        let v = input.pointer_up(110.0, 20.0).unwrap();
        assert_eq!(v, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(input.state(), DragState::Idle);
    }

    #[test]
    fn test_zero_drag() {
        let mut input = DragInput::new();
        input.pointer_down(50.0, 50.0);
        assert_eq!(input.pointer_up(50.0, 50.0), Some(Vec3::ZERO));
    }

    #[test]
    fn test_release_without_press() {
        let mut input = DragInput::new();
        assert_eq!(input.pointer_up(10.0, 10.0), None);
    }

    #[test]
    fn test_second_release_is_ignored() {
        let mut input = DragInput::new();
        input.pointer_down(0.0, 0.0);
        assert!(input.pointer_up(30.0, 40.0).is_some());
        assert_eq!(input.pointer_up(30.0, 40.0), None);
    }

    #[test]
    fn test_pythagorean_lift() {
        let v = kick_velocity(Vec2::new(300.0, -400.0));
        assert!((v.x - 3.0).abs() < 1e-6);
        assert!((v.y - 5.0).abs() < 1e-6);
        assert!((v.z + 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_new_press_restarts_drag() {
        let mut input = DragInput::new();
        input.pointer_down(0.0, 0.0);
        input.pointer_down(100.0, 0.0);
        assert_eq!(input.pointer_up(100.0, 0.0), Some(Vec3::ZERO));
    }

    proptest! {
        #[test]
        fn lift_equals_horizontal_speed(dx in -2000.0f32..2000.0, dy in -2000.0f32..2000.0) {
            let v = kick_velocity(Vec2::new(dx, dy));
            let (sx, sy) = (dx * DRAG_SCALE, dy * DRAG_SCALE);
            prop_assert_eq!(v.x, sx);
            prop_assert_eq!(v.z, sy);
            prop_assert_eq!(v.y, (sx * sx + sy * sy).sqrt());
            prop_assert!(v.y >= 0.0);
        }
    }
}
