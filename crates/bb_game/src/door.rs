//! Doors are invisible interaction triggers: a rectangle, the name of the
//! enemy behind it, and two flags. They have no update logic and no visual
//! output of their own (the room background art draws the doors).

use crate::rect::Rect;

#[derive(Debug, Clone)]
pub struct Door {
    pub rect: Rect,
    pub enemy_name: String,
    /// Always true in current content; reserved for future gating.
    pub is_unlocked: bool,
    /// Set once the door's enemy is defeated; reset only on full restart.
    pub is_cleared: bool,
}

impl Door {
    pub fn new(x: i32, y: i32, w: i32, h: i32, enemy_name: &str) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            enemy_name: enemy_name.to_string(),
            is_unlocked: true,
            is_cleared: false,
        }
    }

    pub fn is_player_in_front(&self, player_rect: &Rect) -> bool {
        self.rect.overlaps(player_rect)
    }
}
