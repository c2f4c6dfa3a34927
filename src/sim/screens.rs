//! Screen wall state and the strike dispatcher
//!
//! The wall never touches media directly. Each strike yields an ordered list
//! of `ScreenEvent`s; the platform layer plays/pauses the matching video
//! elements and the renderer reads highlight opacity back from the wall.

use glam::Vec3;
use rapier3d::prelude::ColliderHandle;

use super::grid::{GridLayout, screen_half_extents};
use super::physics::PhysicsWorld;
use crate::consts::HIGHLIGHT_OPACITY;

/// Side effects of a strike, in the order they must be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenEvent {
    Play(usize),
    Pause(usize),
    Highlight { index: usize, opacity: f32 },
}

/// One screen on the wall
#[derive(Debug, Clone)]
pub struct Screen {
    pub index: usize,
    pub collider: ColliderHandle,
    pub position: Vec3,
    pub opacity: f32,
    pub playing: bool,
    /// Step of the last accepted strike
    last_strike: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenWall {
    screens: Vec<Screen>,
    active: Option<usize>,
    cooldown_steps: u32,
}

impl ScreenWall {
    /// Lay out `count` screens and register a static collider for each
    pub fn build(
        world: &mut PhysicsWorld,
        layout: &GridLayout,
        count: usize,
        cooldown_steps: u32,
    ) -> Self {
        let half_extents = screen_half_extents();
        let screens = layout
            .slots(count)
            .map(|slot| Screen {
                index: slot.index,
                collider: world.add_screen_collider(slot.position, half_extents),
                position: slot.position,
                opacity: 0.0,
                playing: false,
                last_strike: None,
            })
            .collect();
        log::debug!("Built screen wall with {count} screens");
        Self {
            screens,
            active: None,
            cooldown_steps,
        }
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Index of the currently active screen
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn screen_for(&self, collider: ColliderHandle) -> Option<usize> {
        self.screens.iter().position(|s| s.collider == collider)
    }

    /// Handle the ball touching `collider` at simulation step `step`
    ///
    /// Colliders that are not screens produce no events.
    pub fn on_contact(&mut self, collider: ColliderHandle, step: u64) -> Vec<ScreenEvent> {
        match self.screen_for(collider) {
            Some(index) => self.strike(index, step),
            None => Vec::new(),
        }
    }

    /// Apply a strike on screen `index`
    pub fn strike(&mut self, index: usize, step: u64) -> Vec<ScreenEvent> {
        if index >= self.screens.len() {
            return Vec::new();
        }

        if self.cooldown_steps > 0 {
            if let Some(last) = self.screens[index].last_strike {
                if step.saturating_sub(last) < self.cooldown_steps as u64 {
                    return Vec::new();
                }
            }
        }
        self.screens[index].last_strike = Some(step);

        let mut events = Vec::with_capacity(4);

        if self.active == Some(index) {
            let screen = &mut self.screens[index];
            screen.playing = !screen.playing;
            events.push(if screen.playing {
                ScreenEvent::Play(index)
            } else {
                ScreenEvent::Pause(index)
            });
            return events;
        }

        if let Some(previous) = self.active.take() {
            let screen = &mut self.screens[previous];
            screen.playing = false;
            screen.opacity = 0.0;
            events.push(ScreenEvent::Pause(previous));
            events.push(ScreenEvent::Highlight {
                index: previous,
                opacity: 0.0,
            });
        }

        self.active = Some(index);
        let screen = &mut self.screens[index];
        screen.playing = true;
        screen.opacity = HIGHLIGHT_OPACITY;
        events.push(ScreenEvent::Play(index));
        events.push(ScreenEvent::Highlight {
            index,
            opacity: HIGHLIGHT_OPACITY,
        });
        log::debug!("Screen {index} active");
        events
    }

    /// The video behind screen `index` reached its end
    pub fn media_ended(&mut self, index: usize) {
        if let Some(screen) = self.screens.get_mut(index) {
            screen.playing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsSettings;
    use crate::consts::SCREEN_COUNT;

    fn wall(cooldown: u32) -> (PhysicsWorld, ScreenWall) {
        let mut world = PhysicsWorld::new(&PhysicsSettings::default());
        let wall = ScreenWall::build(&mut world, &GridLayout::default(), SCREEN_COUNT, cooldown);
        (world, wall)
    }

    fn active_count(wall: &ScreenWall) -> usize {
        wall.screens().iter().filter(|s| s.opacity > 0.0).count()
    }

    #[test]
    fn test_build_registers_colliders_at_slots() {
        let (world, wall) = wall(0);
        assert_eq!(wall.len(), 12);
        let layout = GridLayout::default();
        for screen in wall.screens() {
            assert_eq!(
                world.collider_position(screen.collider),
                Some(layout.slot(screen.index).position)
            );
            assert_eq!(wall.screen_for(screen.collider), Some(screen.index));
        }
    }

    #[test]
    fn test_first_strike_activates() {
        let (_, mut wall) = wall(0);
        let events = wall.strike(2, 0);
        assert_eq!(
            events,
            vec![
                ScreenEvent::Play(2),
                ScreenEvent::Highlight {
                    index: 2,
                    opacity: 0.5
                }
            ]
        );
        assert_eq!(wall.active(), Some(2));
        assert!(wall.screens()[2].playing);
    }

    #[test]
    fn test_switch_deactivates_previous_first() {
        let (_, mut wall) = wall(0);
        wall.strike(0, 0);
        let events = wall.strike(7, 1);
        assert_eq!(
            events,
            vec![
                ScreenEvent::Pause(0),
                ScreenEvent::Highlight {
                    index: 0,
                    opacity: 0.0
                },
                ScreenEvent::Play(7),
                ScreenEvent::Highlight {
                    index: 7,
                    opacity: 0.5
                },
            ]
        );
        assert_eq!(wall.active(), Some(7));
        assert_eq!(wall.screens()[0].opacity, 0.0);
        assert!(!wall.screens()[0].playing);
        assert_eq!(active_count(&wall), 1);
    }

    #[test]
    fn test_restrike_toggles_only_playback() {
        let (_, mut wall) = wall(0);
        wall.strike(4, 0);

        assert_eq!(wall.strike(4, 1), vec![ScreenEvent::Pause(4)]);
        assert_eq!(wall.active(), Some(4));
        assert_eq!(wall.screens()[4].opacity, 0.5);
        assert!(!wall.screens()[4].playing);

        assert_eq!(wall.strike(4, 2), vec![ScreenEvent::Play(4)]);
        assert_eq!(wall.active(), Some(4));
        assert_eq!(wall.screens()[4].opacity, 0.5);
    }

    #[test]
    fn test_at_most_one_active() {
        let (_, mut wall) = wall(0);
        for (step, index) in [3usize, 3, 9, 1, 1, 11, 0, 9].into_iter().enumerate() {
            wall.strike(index, step as u64);
            assert!(active_count(&wall) <= 1);
            assert!(wall.screens().iter().filter(|s| s.playing).count() <= 1);
        }
    }

    #[test]
    fn test_non_screen_contact_ignored() {
        let (world, mut wall) = wall(0);
        let events = wall.on_contact(world.ground_collider(), 0);
        assert!(events.is_empty());
        assert_eq!(wall.active(), None);
    }

    #[test]
    fn test_contact_maps_collider_to_screen() {
        let (_, mut wall) = wall(0);
        let collider = wall.screens()[6].collider;
        wall.on_contact(collider, 0);
        assert_eq!(wall.active(), Some(6));
    }

    #[test]
    fn test_cooldown_suppresses_rapid_restrike() {
        let (_, mut wall) = wall(10);
        wall.strike(1, 100);
        assert!(wall.strike(1, 105).is_empty());
        assert!(wall.screens()[1].playing);
        assert_eq!(wall.strike(1, 110), vec![ScreenEvent::Pause(1)]);
    }

    #[test]
    fn test_no_cooldown_by_default() {
        let (_, mut wall) = wall(0);
        wall.strike(1, 5);
        assert_eq!(wall.strike(1, 5), vec![ScreenEvent::Pause(1)]);
    }

    #[test]
    fn test_ended_media_restarts_on_strike() {
        let (_, mut wall) = wall(0);
        wall.strike(5, 0);
        wall.media_ended(5);
        assert_eq!(wall.strike(5, 1), vec![ScreenEvent::Play(5)]);
    }

    #[test]
    fn test_out_of_range_strike() {
        let (_, mut wall) = wall(0);
        assert!(wall.strike(12, 0).is_empty());
        assert_eq!(wall.active(), None);
    }
}
