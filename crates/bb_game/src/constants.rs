//! Fixed tuning values. All content is hardcoded by design; nothing here is
//! loaded from configuration.

pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 600;
pub const GROUND_HEIGHT: i32 = 40;

pub const GRAVITY: i32 = 1;
pub const JUMP_STRENGTH: i32 = 15;

/// Nominal knockback shove distance. Combat currently tunes every hit with a
/// small literal amount (1-3 px) instead of this default; kept so the standard
/// distance has a single home if a call site ever wants it.
#[allow(dead_code)]
pub const KNOCKBACK_STEP: i32 = 20;

pub const CHARACTER_WIDTH: i32 = 80;
pub const CHARACTER_HEIGHT: i32 = 120;

pub const PLAYER_MAX_HP: i32 = 120;
pub const PLAYER_SPEED: i32 = 6;
pub const PLAYER_STRENGTH: i32 = 20;
pub const PLAYER_START_X: i32 = 100;

pub const ENEMY_MAX_HP: i32 = 100;
pub const ENEMY_SPEED: i32 = 3;
pub const ENEMY_STRENGTH: i32 = 10;
pub const ENEMY_SPAWN_X: i32 = 600;

/// Ticks between player attacks.
pub const PLAYER_ATTACK_COOLDOWN: u32 = 20;
/// Ticks between enemy attacks.
pub const ENEMY_ATTACK_COOLDOWN: u32 = 30;

/// Pre-fight freeze after entering a battle; player and enemy are both inert.
pub const ENEMY_MOVE_DELAY_MS: u64 = 1000;
/// How long the "FIGHT!" banner stays up (same window as the freeze).
pub const FIGHT_BANNER_MS: u64 = 1000;
/// How long the post-victory info message stays up in the room.
pub const INFO_MESSAGE_MS: u64 = 2000;
/// Grace period after leaving a battle before a door can trigger again.
pub const DOOR_REENTRY_COOLDOWN_MS: u64 = 400;
