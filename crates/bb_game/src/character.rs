//! The shared character model and its two specializations.
//!
//! `Body` carries everything physical (rect, hp, speed, strength, jump state)
//! and the primitive operations on it; `Player` and `Enemy` compose a `Body`
//! rather than subclassing it. The operation set is small and closed, so there
//! is no trait seam here -- the game loop calls the concrete types directly.

use bb_core::input::{InputState, Key};

use crate::constants::{
    CHARACTER_HEIGHT, CHARACTER_WIDTH, ENEMY_MAX_HP, ENEMY_SPEED, ENEMY_STRENGTH, GRAVITY,
    GROUND_HEIGHT, JUMP_STRENGTH, PLAYER_MAX_HP, PLAYER_SPEED, PLAYER_START_X, PLAYER_STRENGTH,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::rect::Rect;

#[derive(Debug, Clone)]
pub struct Body {
    pub rect: Rect,
    pub max_hp: i32,
    pub hp: i32,
    pub speed: i32,
    pub strength: i32,
    pub is_jumping: bool,
    pub vertical_speed: i32,
    /// Resting y for this body; fixed at creation from screen and body height.
    pub ground_y: i32,
}

impl Body {
    pub fn new(x: i32, width: i32, height: i32, hp: i32, speed: i32, strength: i32) -> Self {
        let ground_y = SCREEN_HEIGHT - GROUND_HEIGHT - height;
        Self {
            rect: Rect::new(x, ground_y, width, height),
            max_hp: hp,
            hp,
            speed,
            strength,
            is_jumping: false,
            vertical_speed: 0,
            ground_y,
        }
    }

    /// Horizontal movement with screen wrap-around: once the body is fully off
    /// one side it reappears at the other. No vertical effect.
    pub fn move_by(&mut self, dx: i32) {
        self.rect.x += dx;
        if self.rect.right() < 0 {
            self.rect.x = SCREEN_WIDTH;
        } else if self.rect.left() > SCREEN_WIDTH {
            self.rect.x = -self.rect.w;
        }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Runs every tick for every live character, in every state.
    pub fn apply_gravity(&mut self) {
        if self.is_jumping || self.rect.y < self.ground_y {
            self.vertical_speed += GRAVITY;
        }

        self.rect.y += self.vertical_speed;

        // Landing check
        if self.rect.y >= self.ground_y {
            self.rect.y = self.ground_y;
            self.is_jumping = false;
            self.vertical_speed = 0;
        }
    }

    pub fn update(&mut self) {
        self.apply_gravity();
    }

    /// Instantaneous horizontal shove, clamped to the screen. `direction` is a
    /// signed unit multiplier; `amount` is the displacement in pixels.
    pub fn apply_knockback(&mut self, direction: i32, amount: i32) {
        self.rect.x += direction * amount;
        self.rect.x = self.rect.x.clamp(0, SCREEN_WIDTH - self.rect.w);
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
}

impl Player {
    pub fn new() -> Self {
        Self {
            body: Body::new(
                PLAYER_START_X,
                CHARACTER_WIDTH,
                CHARACTER_HEIGHT,
                PLAYER_MAX_HP,
                PLAYER_SPEED,
                PLAYER_STRENGTH,
            ),
        }
    }

    /// Level-triggered movement; right wins when both directions are held
    /// because it is checked second. Jump launches only from the ground.
    pub fn handle_input(&mut self, input: &InputState) {
        let mut dx = 0;
        if input.is_held(Key::Left) {
            dx = -self.body.speed;
        }
        if input.is_held(Key::Right) {
            dx = self.body.speed;
        }

        if input.is_held(Key::Up) && !self.body.is_jumping {
            self.body.is_jumping = true;
            self.body.vertical_speed = -JUMP_STRENGTH;
        }

        self.body.move_by(dx);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: Body,
    /// Lookup key for sprite, background and music; never combat logic.
    pub name: String,
}

impl Enemy {
    pub fn new(x: i32, name: &str) -> Self {
        Self {
            body: Body::new(
                x,
                CHARACTER_WIDTH,
                CHARACTER_HEIGHT,
                ENEMY_MAX_HP,
                ENEMY_SPEED,
                ENEMY_STRENGTH,
            ),
            name: name.to_string(),
        }
    }

    /// Pure horizontal chase toward the player's center. Equal centers mean
    /// no movement; there is no jump and no cooldown on movement.
    pub fn update_ai(&mut self, player_center_x: i32) {
        if player_center_x < self.body.rect.center_x() {
            self.body.move_by(-self.body.speed);
        } else if player_center_x > self.body.rect.center_x() {
            self.body.move_by(self.body.speed);
        }
    }
}
