//! Scene controller
//!
//! Owns every piece of mutable scene state. The platform layer holds one of
//! these and calls `pointer_*`, `tick` and `resize` from its callbacks.

use glam::{Quat, Vec3};

use super::camera::{CameraRig, Viewport};
use super::grid::GridLayout;
use super::input::DragInput;
use super::physics::PhysicsWorld;
use super::screens::{ScreenEvent, ScreenWall};
use crate::config::SceneSettings;
use crate::consts::*;

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub screen_events: Vec<ScreenEvent>,
    /// Ball transform after the step
    pub ball_position: Vec3,
    pub ball_rotation: Quat,
}

pub struct SceneState {
    pub physics: PhysicsWorld,
    pub wall: ScreenWall,
    pub input: DragInput,
    pub camera: CameraRig,
    pub viewport: Viewport,
    /// Camera tracks the ball once a ball model is available
    pub follow_ball: bool,
    step_count: u64,
}

impl SceneState {
    pub fn new(settings: &SceneSettings, viewport: Viewport) -> Self {
        let mut physics = PhysicsWorld::new(&settings.physics);
        let wall = ScreenWall::build(
            &mut physics,
            &GridLayout::default(),
            SCREEN_COUNT,
            settings.toggle_cooldown_steps,
        );
        Self {
            physics,
            wall,
            input: DragInput::new(),
            camera: CameraRig::new(viewport.aspect()),
            viewport,
            follow_ball: false,
            step_count: 0,
        }
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.input.pointer_down(x, y);
    }

    /// Finish a drag; the ball's velocity is replaced by the kick
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<Vec3> {
        let velocity = self.input.pointer_up(x, y)?;
        self.physics.set_ball_velocity(velocity);
        log::debug!("Kick: {velocity:?}");
        Some(velocity)
    }

    /// Advance one frame by the fixed timestep
    pub fn tick(&mut self) -> FrameOutput {
        let contacts = self.physics.step(SIM_DT);
        self.step_count += 1;

        let mut screen_events = Vec::new();
        for contact in contacts {
            screen_events.extend(self.wall.on_contact(contact.other, self.step_count));
        }

        let ball_position = self.physics.ball_position();
        if self.follow_ball {
            self.camera.follow(ball_position);
        }

        FrameOutput {
            screen_events,
            ball_position,
            ball_rotation: self.physics.ball_rotation(),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_viewport(&viewport);
    }
}
