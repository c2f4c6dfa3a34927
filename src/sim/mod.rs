//! Deterministic scene logic
//!
//! Everything that decides what happens lives here. This module must stay
//! free of rendering and browser dependencies:
//! - Fixed timestep only
//! - Stable iteration order (screens by index)
//! - Side effects reported as events, applied by the platform layer

pub mod camera;
pub mod grid;
pub mod input;
pub mod physics;
pub mod screens;
pub mod state;

pub use camera::{CameraRig, Viewport};
pub use grid::{GridLayout, ScreenSlot, border_size, screen_half_extents};
pub use input::{DragInput, DragState, kick_velocity};
pub use physics::{Contact, PhysicsWorld};
pub use screens::{Screen, ScreenEvent, ScreenWall};
pub use state::{FrameOutput, SceneState};
