//! Screen wall layout
//!
//! Slot `i` sits at row `i % 4`, column `i / 4`. Rows advance along +X and
//! columns stack along +Y, all in the plane z = base.z.

use glam::Vec3;

use crate::consts::*;
use crate::screen_face_size;

/// Placement of one screen on the wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSlot {
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub position: Vec3,
}

/// Grid geometry; the default matches the stadium wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub base: Vec3,
    pub per_row: usize,
    /// Full face size (width, height)
    pub face: (f32, f32),
    pub spacing: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            base: SCREEN_BASE,
            per_row: SCREENS_PER_ROW,
            face: screen_face_size(),
            spacing: SCREEN_SPACING,
        }
    }
}

impl GridLayout {
    /// Slot for screen `index`
    pub fn slot(&self, index: usize) -> ScreenSlot {
        let row = index % self.per_row;
        let column = index / self.per_row;
        let step_x = self.face.0 + self.spacing;
        let step_y = self.face.1 + self.spacing;
        ScreenSlot {
            index,
            row,
            column,
            position: self.base + Vec3::new(step_x * row as f32, step_y * column as f32, 0.0),
        }
    }

    /// First `count` slots in creation order
    pub fn slots(&self, count: usize) -> impl Iterator<Item = ScreenSlot> + '_ {
        (0..count).map(|i| self.slot(i))
    }
}

/// Collider half extents of a screen
pub fn screen_half_extents() -> Vec3 {
    Vec3::new(SCREEN_HALF_WIDTH, SCREEN_HALF_HEIGHT, SCREEN_HALF_THICKNESS)
}

/// Full size of the highlight border box
pub fn border_size() -> Vec3 {
    let (w, h) = screen_face_size();
    Vec3::new(w + BORDER_MARGIN, h + BORDER_MARGIN, SCREEN_HALF_THICKNESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_slot_is_base() {
        let slot = GridLayout::default().slot(0);
        assert_eq!(slot.row, 0);
        assert_eq!(slot.column, 0);
        assert_eq!(slot.position, Vec3::new(-6.0, 1.1, -3.0));
    }

    #[test]
    fn test_row_wraps_after_four() {
        let layout = GridLayout::default();
        let slot = layout.slot(5);
        assert_eq!((slot.row, slot.column), (1, 1));
        let last = layout.slot(11);
        assert_eq!((last.row, last.column), (3, 2));
        assert_eq!(last.position.z, -3.0);
    }

    #[test]
    fn test_slots_are_distinct() {
        let slots: Vec<_> = GridLayout::default().slots(SCREEN_COUNT).collect();
        assert_eq!(slots.len(), 12);
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                assert_ne!(a.position, b.position);
            }
        }
    }

    #[test]
    fn test_border_is_larger_than_face() {
        let border = border_size();
        let (w, h) = screen_face_size();
        assert!(border.x > w && border.y > h);
        assert_eq!(screen_half_extents() * 2.0, Vec3::new(w, h, 0.1));
    }

    proptest! {
        #[test]
        fn slot_position_matches_formula(i in 0usize..SCREEN_COUNT) {
            let layout = GridLayout::default();
            let (w, h) = screen_face_size();
            let expected = SCREEN_BASE
                + Vec3::new(
                    (i % 4) as f32 * (w + SCREEN_SPACING),
                    (i / 4) as f32 * (h + SCREEN_SPACING),
                    0.0,
                );
            prop_assert_eq!(layout.slot(i).position, expected);
        }
    }
}
