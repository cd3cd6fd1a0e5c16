//! The finite-state game loop: menu -> room -> battle -> game over.
//!
//! `Game` owns all mutable gameplay state and is stepped once per fixed tick
//! with the current input snapshot and a wall-clock reading. Each state has
//! one handler; transitions are explicit assignments to `self.state`.
//!
//! Two timing mechanisms coexist and stay distinct on purpose:
//!  - attack cooldowns are **tick-counted** integers decremented once per step
//!  - the battle-start freeze, info message and door re-entry grace are
//!    **wall-clock** timestamps compared against `now_ms`
//!
//! The handlers never touch the GPU or the audio device. Sound is requested by
//! pushing `AudioCue`s onto a queue the presentation layer drains each frame;
//! drawing is a separate read-only pass in `view.rs`.

use bb_core::input::{InputState, Key};

use crate::character::{Enemy, Player};
use crate::constants::{
    DOOR_REENTRY_COOLDOWN_MS, ENEMY_ATTACK_COOLDOWN, ENEMY_MOVE_DELAY_MS, ENEMY_SPAWN_X,
    FIGHT_BANNER_MS, INFO_MESSAGE_MS, PLAYER_ATTACK_COOLDOWN, PLAYER_START_X,
};
use crate::door::Door;

pub const MUSIC_ROOM: &str = "room";

pub const DEFEAT_TEXT: &str = "Game Over - Press R to Restart";
pub const VICTORY_TEXT: &str = "You won the game! Press R to Restart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Room,
    Battle,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Attack swing, played on every attack attempt (hit or miss).
    Punch,
    /// Battle-start sting played when a door is entered.
    FightStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCue {
    /// Start looping the named track. Only emitted when the track changes.
    Music(String),
    /// Fire-and-forget one-shot.
    Effect(SoundEffect),
}

pub struct Game {
    pub state: GameState,
    pub player: Player,
    pub doors: Vec<Door>,
    pub current_enemy: Option<Enemy>,
    /// Index into `doors` of the door that spawned the current enemy.
    pub current_door: Option<usize>,

    /// Tick-counted attack gates.
    pub player_attack_cooldown: u32,
    pub enemy_attack_cooldown: u32,

    /// Wall-clock timestamps (milliseconds).
    pub battle_start_ms: u64,
    pub fight_banner_until_ms: u64,
    pub info_message: String,
    pub info_message_until_ms: u64,
    pub door_cooldown_until_ms: u64,

    pub game_over_text: String,
    current_music: Option<String>,
    audio_cues: Vec<AudioCue>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            state: GameState::Menu,
            player: Player::new(),
            doors: vec![
                Door::new(130, 200, 140, 350, "Naruto"),
                Door::new(530, 200, 140, 350, "Luffy"),
            ],
            current_enemy: None,
            current_door: None,
            player_attack_cooldown: 0,
            enemy_attack_cooldown: 0,
            battle_start_ms: 0,
            fight_banner_until_ms: 0,
            info_message: String::new(),
            info_message_until_ms: 0,
            door_cooldown_until_ms: 0,
            game_over_text: DEFEAT_TEXT.to_string(),
            current_music: None,
            audio_cues: Vec::new(),
        }
    }

    /// One fixed simulation tick in the current state.
    pub fn step(&mut self, input: &InputState, now_ms: u64) {
        match self.state {
            GameState::Menu => self.update_menu(input),
            GameState::Room => self.update_room(input, now_ms),
            GameState::Battle => self.update_battle(input, now_ms),
            GameState::GameOver => self.update_game_over(input),
        }
    }

    /// Drains the audio requests accumulated by the last steps.
    pub fn take_audio_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.audio_cues)
    }

    /// Request a looping track; a no-op when that track is already playing.
    fn queue_music(&mut self, track: &str) {
        if self.current_music.as_deref() == Some(track) {
            return;
        }
        self.current_music = Some(track.to_string());
        self.audio_cues.push(AudioCue::Music(track.to_string()));
    }

    fn update_menu(&mut self, input: &InputState) {
        self.queue_music(MUSIC_ROOM);
        if input.is_held(Key::Enter) {
            self.state = GameState::Room;
        }
    }

    fn update_room(&mut self, input: &InputState, now_ms: u64) {
        self.queue_music(MUSIC_ROOM);

        if !self.info_message.is_empty() && now_ms >= self.info_message_until_ms {
            self.info_message.clear();
        }

        self.player.handle_input(input);
        self.player.body.update();

        let want_enter = input.is_held(Key::Space) && now_ms >= self.door_cooldown_until_ms;
        let entered = self.doors.iter().position(|door| {
            door.is_unlocked
                && !door.is_cleared
                && door.is_player_in_front(&self.player.body.rect)
        });
        if let (Some(door_index), true) = (entered, want_enter) {
            self.start_battle(door_index, now_ms);
        }
    }

    fn start_battle(&mut self, door_index: usize, now_ms: u64) {
        let enemy_name = self.doors[door_index].enemy_name.clone();
        log::info!("Entering battle against {enemy_name}");

        self.current_door = Some(door_index);
        let enemy = Enemy::new(ENEMY_SPAWN_X, &enemy_name);

        // Both sides start every battle at full health.
        self.player.body.hp = self.player.body.max_hp;

        self.queue_music(&enemy_name);
        self.audio_cues.push(AudioCue::Effect(SoundEffect::FightStart));

        self.player_attack_cooldown = 0;
        self.enemy_attack_cooldown = 0;

        self.player.body.rect.x = PLAYER_START_X;
        self.player.body.rect.y = self.player.body.ground_y;

        self.battle_start_ms = now_ms;
        self.fight_banner_until_ms = now_ms + FIGHT_BANNER_MS;

        self.current_enemy = Some(enemy);
        self.state = GameState::Battle;
    }

    fn update_battle(&mut self, input: &InputState, now_ms: u64) {
        if self.player_attack_cooldown > 0 {
            self.player_attack_cooldown -= 1;
        }
        if self.enemy_attack_cooldown > 0 {
            self.enemy_attack_cooldown -= 1;
        }

        // Pre-fight freeze: input, AI and both attack paths wait it out.
        let can_act = now_ms.saturating_sub(self.battle_start_ms) > ENEMY_MOVE_DELAY_MS;

        if can_act {
            self.player.handle_input(input);
        }
        // Gravity never pauses, even during the freeze.
        self.player.body.update();

        let Some(enemy) = self.current_enemy.as_mut() else {
            log::error!("Battle state with no active enemy; returning to room");
            self.state = GameState::Room;
            return;
        };

        if can_act && enemy.body.is_alive() {
            enemy.update_ai(self.player.body.rect.center_x());
            enemy.body.update();
        }

        // Player attack: the swing happens (and the cooldown is spent) on
        // every attempt; damage only lands on overlap.
        if can_act && input.is_held(Key::Space) && self.player_attack_cooldown == 0 {
            self.audio_cues.push(AudioCue::Effect(SoundEffect::Punch));
            if self.player.body.rect.overlaps(&enemy.body.rect) {
                enemy.body.take_damage(self.player.body.strength);
                if self.player.body.rect.center_x() < enemy.body.rect.center_x() {
                    enemy.body.apply_knockback(1, 3);
                } else {
                    enemy.body.apply_knockback(-1, 3);
                }
            }
            self.player_attack_cooldown = PLAYER_ATTACK_COOLDOWN;
        }

        // Enemy attack: contact damage on its own independent cooldown. Both
        // attacks may land in the same tick.
        if can_act
            && self.enemy_attack_cooldown == 0
            && enemy.body.rect.overlaps(&self.player.body.rect)
        {
            self.player.body.take_damage(enemy.body.strength);
            if enemy.body.rect.center_x() < self.player.body.rect.center_x() {
                self.player.body.apply_knockback(1, 1);
            } else {
                self.player.body.apply_knockback(-1, 1);
            }
            self.enemy_attack_cooldown = ENEMY_ATTACK_COOLDOWN;
        }

        // Defeat is checked first: when both sides hit zero in the same tick
        // the player loses and the victory branch is never evaluated.
        if !self.player.body.is_alive() {
            self.game_over_text = DEFEAT_TEXT.to_string();
            self.current_enemy = None;
            self.state = GameState::GameOver;
            return;
        }

        if !enemy.body.is_alive() {
            let defeated = enemy.name.clone();
            self.current_enemy = None;

            if let Some(door_index) = self.current_door {
                self.doors[door_index].is_cleared = true;
            }

            if self.doors.iter().all(|d| d.is_cleared) {
                log::info!("All doors cleared");
                self.game_over_text = VICTORY_TEXT.to_string();
                self.state = GameState::GameOver;
            } else {
                self.info_message = format!("You defeated {defeated}!");
                self.info_message_until_ms = now_ms + INFO_MESSAGE_MS;
                self.state = GameState::Room;
                self.return_player_to_room(now_ms);
            }
            return;
        }

        // Retreat: back to the room regardless of combat outcome.
        if can_act && input.is_held(Key::Escape) {
            self.current_enemy = None;
            self.state = GameState::Room;
            self.return_player_to_room(now_ms);
        }
    }

    fn return_player_to_room(&mut self, now_ms: u64) {
        self.player.body.rect.x = PLAYER_START_X;
        self.player.body.rect.y = self.player.body.ground_y;
        self.door_cooldown_until_ms = now_ms + DOOR_REENTRY_COOLDOWN_MS;
    }

    fn update_game_over(&mut self, input: &InputState) {
        if input.is_held(Key::R) {
            log::info!("Restarting game");
            self.player = Player::new();
            for door in &mut self.doors {
                door.is_cleared = false;
            }
            self.current_enemy = None;
            self.current_door = None;
            self.info_message.clear();
            self.state = GameState::Menu;
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ENEMY_STRENGTH, PLAYER_MAX_HP, PLAYER_STRENGTH};

    fn held(keys: &[Key]) -> InputState {
        let mut input = InputState::new();
        for &key in keys {
            input.key_down(key);
        }
        input
    }

    /// Puts the game into a battle by walking the player into the first door.
    fn game_in_battle(now_ms: u64) -> Game {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), now_ms);
        assert_eq!(game.state, GameState::Room);
        game.player.body.rect.x = game.doors[0].rect.x;
        game.step(&held(&[Key::Space]), now_ms);
        assert_eq!(game.state, GameState::Battle);
        game
    }

    /// A tick timestamp safely past the pre-fight freeze.
    fn after_freeze(game: &Game) -> u64 {
        game.battle_start_ms + ENEMY_MOVE_DELAY_MS + 1
    }

    /// Stacks the enemy directly on the player so centers are equal and the
    /// chase AI holds still.
    fn align_combatants(game: &mut Game) {
        let rect = game.player.body.rect;
        let enemy = game.current_enemy.as_mut().expect("enemy in battle");
        enemy.body.rect.x = rect.x;
        enemy.body.rect.y = rect.y;
    }

    #[test]
    fn menu_confirm_enters_room() {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), 0);
        assert_eq!(game.state, GameState::Room);
    }

    #[test]
    fn menu_without_confirm_stays_in_menu() {
        let mut game = Game::new();
        game.step(&held(&[Key::Space, Key::R]), 0);
        assert_eq!(game.state, GameState::Menu);
    }

    #[test]
    fn menu_queues_room_music_exactly_once() {
        let mut game = Game::new();
        game.step(&held(&[]), 0);
        game.step(&held(&[]), 16);
        let music: Vec<_> = game
            .take_audio_cues()
            .into_iter()
            .filter(|c| matches!(c, AudioCue::Music(_)))
            .collect();
        assert_eq!(music, vec![AudioCue::Music(MUSIC_ROOM.to_string())]);
    }

    #[test]
    fn entering_door_starts_fresh_battle() {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), 0);
        game.player.body.hp = 5; // battered from... somewhere; resets on entry
        game.player.body.rect.x = game.doors[0].rect.x;
        game.step(&held(&[Key::Space]), 100);

        assert_eq!(game.state, GameState::Battle);
        let enemy = game.current_enemy.as_ref().expect("enemy spawned");
        assert_eq!(enemy.body.hp, enemy.body.max_hp);
        assert_eq!(enemy.name, "Naruto");
        assert_eq!(enemy.body.rect.x, ENEMY_SPAWN_X);
        assert_eq!(game.player.body.hp, PLAYER_MAX_HP);
        assert_eq!(game.player.body.rect.x, PLAYER_START_X);
        assert_eq!(game.current_door, Some(0));
        assert_eq!(game.battle_start_ms, 100);
        assert_eq!(game.fight_banner_until_ms, 100 + FIGHT_BANNER_MS);
        assert_eq!(game.player_attack_cooldown, 0);
        assert_eq!(game.enemy_attack_cooldown, 0);
    }

    #[test]
    fn battle_start_emits_enemy_music_and_fight_sting() {
        let mut game = game_in_battle(0);
        let cues = game.take_audio_cues();
        assert!(cues.contains(&AudioCue::Music("Naruto".to_string())));
        assert!(cues.contains(&AudioCue::Effect(SoundEffect::FightStart)));
    }

    #[test]
    fn door_is_inert_during_reentry_cooldown() {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), 0);
        game.door_cooldown_until_ms = 500;
        game.player.body.rect.x = game.doors[0].rect.x;

        game.step(&held(&[Key::Space]), 499);
        assert_eq!(game.state, GameState::Room);

        game.step(&held(&[Key::Space]), 500);
        assert_eq!(game.state, GameState::Battle);
    }

    #[test]
    fn cleared_door_does_not_retrigger() {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), 0);
        game.doors[0].is_cleared = true;
        game.player.body.rect.x = game.doors[0].rect.x;
        game.step(&held(&[Key::Space]), 100);
        assert_eq!(game.state, GameState::Room);
    }

    #[test]
    fn locked_door_does_not_trigger() {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), 0);
        game.doors[0].is_unlocked = false;
        game.player.body.rect.x = game.doors[0].rect.x;
        game.step(&held(&[Key::Space]), 100);
        assert_eq!(game.state, GameState::Room);
    }

    #[test]
    fn attacks_are_frozen_before_the_delay_elapses() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        let enemy_hp = game.current_enemy.as_ref().unwrap().body.hp;

        // Still inside the freeze window (equal elapsed is not enough).
        game.step(&held(&[Key::Space]), ENEMY_MOVE_DELAY_MS);

        assert_eq!(game.player_attack_cooldown, 0, "no cooldown consumed");
        assert_eq!(game.current_enemy.as_ref().unwrap().body.hp, enemy_hp);
        assert_eq!(game.player.body.hp, PLAYER_MAX_HP);
    }

    #[test]
    fn gravity_still_applies_during_the_freeze() {
        let mut game = game_in_battle(0);
        let player_ground = game.player.body.ground_y;
        game.player.body.rect.y = player_ground - 40;
        game.step(&held(&[]), 10);
        assert!(game.player.body.rect.y > player_ground - 40);
    }

    #[test]
    fn player_attack_damages_and_knocks_back_enemy() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        let now = after_freeze(&game);
        let enemy_x = game.current_enemy.as_ref().unwrap().body.rect.x;

        game.step(&held(&[Key::Space]), now);

        let enemy = game.current_enemy.as_ref().expect("enemy alive");
        assert_eq!(enemy.body.hp, enemy.body.max_hp - PLAYER_STRENGTH);
        assert_eq!(game.player_attack_cooldown, PLAYER_ATTACK_COOLDOWN);
        // Equal centers fall through to the "push left" branch.
        assert_eq!(enemy.body.rect.x, enemy_x - 3);
    }

    #[test]
    fn enemy_contact_damages_player_on_its_own_cooldown() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        let now = after_freeze(&game);

        game.step(&held(&[]), now);

        assert_eq!(game.player.body.hp, PLAYER_MAX_HP - ENEMY_STRENGTH);
        assert_eq!(game.enemy_attack_cooldown, ENEMY_ATTACK_COOLDOWN);
    }

    #[test]
    fn both_attacks_can_land_in_the_same_tick() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        let now = after_freeze(&game);

        game.step(&held(&[Key::Space]), now);

        let enemy = game.current_enemy.as_ref().expect("enemy alive");
        assert_eq!(enemy.body.hp, enemy.body.max_hp - PLAYER_STRENGTH);
        assert_eq!(game.player.body.hp, PLAYER_MAX_HP - ENEMY_STRENGTH);
    }

    #[test]
    fn swing_without_overlap_spends_cooldown_but_deals_nothing() {
        let mut game = game_in_battle(0);
        let now = after_freeze(&game);
        // Enemy still at its spawn far from the player; no overlap.
        game.step(&held(&[Key::Space]), now);

        let enemy = game.current_enemy.as_ref().expect("enemy alive");
        assert_eq!(enemy.body.hp, enemy.body.max_hp);
        assert_eq!(game.player_attack_cooldown, PLAYER_ATTACK_COOLDOWN);
        let cues = game.take_audio_cues();
        assert!(cues.contains(&AudioCue::Effect(SoundEffect::Punch)));
    }

    #[test]
    fn cooldown_blocks_consecutive_swings() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        let now = after_freeze(&game);

        game.step(&held(&[Key::Space]), now);
        let hp_after_first = game.current_enemy.as_ref().unwrap().body.hp;
        game.step(&held(&[Key::Space]), now + 16);

        assert_eq!(game.current_enemy.as_ref().unwrap().body.hp, hp_after_first);
        assert_eq!(game.player_attack_cooldown, PLAYER_ATTACK_COOLDOWN - 1);
    }

    #[test]
    fn defeat_wins_over_victory_in_the_same_tick() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        game.player.body.hp = ENEMY_STRENGTH; // dies to one contact hit
        game.current_enemy.as_mut().unwrap().body.hp = PLAYER_STRENGTH; // dies to one swing

        game.step(&held(&[Key::Space]), after_freeze(&game));

        assert_eq!(game.state, GameState::GameOver);
        assert_eq!(game.game_over_text, DEFEAT_TEXT);
        assert!(game.current_enemy.is_none());
        // The victory branch never ran: the door stays uncleared.
        assert!(!game.doors[0].is_cleared);
    }

    #[test]
    fn first_victory_clears_door_and_returns_to_room() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        game.current_enemy.as_mut().unwrap().body.hp = PLAYER_STRENGTH;
        let now = after_freeze(&game);

        game.step(&held(&[Key::Space]), now);

        assert_eq!(game.state, GameState::Room);
        assert!(game.doors[0].is_cleared);
        assert!(!game.doors[1].is_cleared);
        assert!(game.current_enemy.is_none());
        assert_eq!(game.info_message, "You defeated Naruto!");
        assert_eq!(game.info_message_until_ms, now + INFO_MESSAGE_MS);
        assert_eq!(game.player.body.rect.x, PLAYER_START_X);
        assert_eq!(game.door_cooldown_until_ms, now + DOOR_REENTRY_COOLDOWN_MS);
    }

    #[test]
    fn final_victory_ends_the_game() {
        let mut game = game_in_battle(0);
        game.doors[1].is_cleared = true;
        align_combatants(&mut game);
        game.current_enemy.as_mut().unwrap().body.hp = PLAYER_STRENGTH;

        game.step(&held(&[Key::Space]), after_freeze(&game));

        assert_eq!(game.state, GameState::GameOver);
        assert_eq!(game.game_over_text, VICTORY_TEXT);
        assert!(game.doors.iter().all(|d| d.is_cleared));
    }

    #[test]
    fn retreat_returns_to_room_with_cooldown() {
        let mut game = game_in_battle(0);
        let now = after_freeze(&game);

        game.step(&held(&[Key::Escape]), now);

        assert_eq!(game.state, GameState::Room);
        assert!(game.current_enemy.is_none());
        assert_eq!(game.player.body.rect.x, PLAYER_START_X);
        assert_eq!(game.door_cooldown_until_ms, now + DOOR_REENTRY_COOLDOWN_MS);
    }

    #[test]
    fn retreat_is_ignored_during_the_freeze() {
        let mut game = game_in_battle(0);
        game.step(&held(&[Key::Escape]), 10);
        assert_eq!(game.state, GameState::Battle);
    }

    #[test]
    fn info_message_expires_in_room() {
        let mut game = Game::new();
        game.step(&held(&[Key::Enter]), 0);
        game.info_message = "You defeated Naruto!".to_string();
        game.info_message_until_ms = 2000;

        game.step(&held(&[]), 1999);
        assert!(!game.info_message.is_empty());

        game.step(&held(&[]), 2000);
        assert!(game.info_message.is_empty());
    }

    #[test]
    fn restart_resets_world_and_goes_to_menu() {
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        game.player.body.hp = 1;
        game.step(&held(&[]), after_freeze(&game));
        assert_eq!(game.state, GameState::GameOver);

        game.doors[1].is_cleared = true;
        game.info_message = "stale".to_string();
        game.step(&held(&[Key::R]), 5000);

        assert_eq!(game.state, GameState::Menu);
        assert_eq!(game.player.body.hp, PLAYER_MAX_HP);
        assert_eq!(game.player.body.rect.x, PLAYER_START_X);
        assert!(game.doors.iter().all(|d| !d.is_cleared));
        assert!(game.current_enemy.is_none());
        assert!(game.current_door.is_none());
        assert!(game.info_message.is_empty());
    }

    #[test]
    fn door_retriggers_after_restart() {
        // Clear the first door, lose later, restart: the same door must spawn
        // a battle again because restart resets the cleared flags.
        let mut game = game_in_battle(0);
        align_combatants(&mut game);
        game.current_enemy.as_mut().unwrap().body.hp = 1;
        game.step(&held(&[Key::Space]), after_freeze(&game));
        assert!(game.doors[0].is_cleared);

        game.state = GameState::GameOver;
        game.step(&held(&[Key::R]), 10_000);
        assert!(!game.doors[0].is_cleared);

        game.step(&held(&[Key::Enter]), 11_000);
        game.player.body.rect.x = game.doors[0].rect.x;
        game.step(&held(&[Key::Space]), 11_100);
        assert_eq!(game.state, GameState::Battle);
    }
}
