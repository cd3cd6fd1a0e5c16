//! Builds the per-frame presentation from game state.
//!
//! Pure functions over `&Game`: `build_draw_list` emits an ordered list of
//! draw commands (back to front) and `build_hud` fills the text overlay
//! model. Neither touches the GPU, so both are unit-testable headless; the
//! main loop translates commands into quads and textures.

use bb_ui::HudModel;

use crate::constants::{
    ENEMY_MAX_HP, GROUND_HEIGHT, PLAYER_MAX_HP, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::game::{Game, GameState};
use crate::rect::Rect;

pub const HP_BAR_WIDTH: i32 = 300;
pub const HP_BAR_HEIGHT: i32 = 20;
pub const PLAYER_HP_BAR_X: i32 = 40;
pub const ENEMY_HP_BAR_X: i32 = 460;
pub const HP_BAR_Y: i32 = 40;

/// Logical texture identity; the main loop resolves these to GPU textures
/// (with solid-color fallbacks for missing art).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Player,
    Enemy(String),
    RoomBackground,
    BattleBackground(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Solid fill, rgba in 0..=1.
    Rect { rect: Rect, color: [f32; 4] },
    /// 2px border drawn as four thin fills.
    RectOutline { rect: Rect, color: [f32; 4] },
    /// Textured quad stretched to `rect`.
    Sprite { rect: Rect, key: SpriteKey },
}

fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        1.0,
    ]
}

fn ground_rect() -> Rect {
    Rect::new(0, SCREEN_HEIGHT - GROUND_HEIGHT, SCREEN_WIDTH, GROUND_HEIGHT)
}

fn full_screen() -> Rect {
    Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT)
}

/// Fill width proportional to remaining hp, in integer pixels.
fn hp_fill_width(hp: i32, max_hp: i32) -> i32 {
    if max_hp <= 0 {
        return 0;
    }
    (HP_BAR_WIDTH * hp.max(0)) / max_hp
}

fn push_hp_bar(cmds: &mut Vec<DrawCmd>, x: i32, hp: i32, max_hp: i32, fill: [f32; 4]) {
    let frame = Rect::new(x, HP_BAR_Y, HP_BAR_WIDTH, HP_BAR_HEIGHT);
    cmds.push(DrawCmd::RectOutline {
        rect: frame,
        color: rgb(255, 255, 255),
    });
    let width = hp_fill_width(hp, max_hp);
    if width > 0 {
        cmds.push(DrawCmd::Rect {
            rect: Rect::new(x, HP_BAR_Y, width, HP_BAR_HEIGHT),
            color: fill,
        });
    }
}

pub fn build_draw_list(game: &Game) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    match game.state {
        GameState::Menu | GameState::GameOver => {
            // Text-only states; the HUD overlay carries everything.
        }
        GameState::Room => {
            cmds.push(DrawCmd::Sprite {
                rect: full_screen(),
                key: SpriteKey::RoomBackground,
            });
            cmds.push(DrawCmd::Rect {
                rect: ground_rect(),
                color: rgb(120, 70, 20),
            });
            cmds.push(DrawCmd::Sprite {
                rect: game.player.body.rect,
                key: SpriteKey::Player,
            });
        }
        GameState::Battle => {
            let Some(enemy) = game.current_enemy.as_ref() else {
                return cmds;
            };
            cmds.push(DrawCmd::Sprite {
                rect: full_screen(),
                key: SpriteKey::BattleBackground(enemy.name.clone()),
            });
            // Darken the arena so the combatants and HUD read clearly.
            cmds.push(DrawCmd::Rect {
                rect: full_screen(),
                color: [0.0, 0.0, 0.0, 150.0 / 255.0],
            });
            cmds.push(DrawCmd::Rect {
                rect: ground_rect(),
                color: rgb(20, 100, 20),
            });
            cmds.push(DrawCmd::Sprite {
                rect: game.player.body.rect,
                key: SpriteKey::Player,
            });
            cmds.push(DrawCmd::Sprite {
                rect: enemy.body.rect,
                key: SpriteKey::Enemy(enemy.name.clone()),
            });
            push_hp_bar(
                &mut cmds,
                PLAYER_HP_BAR_X,
                game.player.body.hp,
                PLAYER_MAX_HP,
                rgb(0, 200, 255),
            );
            push_hp_bar(
                &mut cmds,
                ENEMY_HP_BAR_X,
                enemy.body.hp,
                ENEMY_MAX_HP,
                rgb(255, 150, 150),
            );
        }
    }
    cmds
}

pub fn build_hud(game: &Game, now_ms: u64) -> HudModel {
    let mut model = HudModel::default();
    match game.state {
        GameState::Menu => {
            model.center = Some("Anime Battle - Press ENTER to Start".to_string());
        }
        GameState::Room => {
            model.heading = Some("Choose a Door".to_string());
            if !game.info_message.is_empty() {
                model.info = Some(game.info_message.clone());
            }
            let at_door = game.doors.iter().any(|door| {
                door.is_unlocked
                    && !door.is_cleared
                    && door.is_player_in_front(&game.player.body.rect)
            });
            if at_door {
                model.prompt = Some("Press SPACE to enter battle".to_string());
            }
        }
        GameState::Battle => {
            model.footer = Some("SPACE to attack | ESC to back".to_string());
            if now_ms < game.fight_banner_until_ms {
                model.banner = Some("FIGHT!".to_string());
            }
        }
        GameState::GameOver => {
            model.center = Some(game.game_over_text.clone());
            model.center_sub = Some("Press R to restart".to_string());
        }
    }
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_core::input::{InputState, Key};
    use crate::game::DEFEAT_TEXT;

    fn game_in_room() -> Game {
        let mut game = Game::new();
        let mut input = InputState::new();
        input.key_down(Key::Enter);
        game.step(&input, 0);
        game
    }

    fn game_in_battle() -> Game {
        let mut game = game_in_room();
        game.player.body.rect.x = game.doors[0].rect.x;
        let mut input = InputState::new();
        input.key_down(Key::Space);
        game.step(&input, 0);
        assert_eq!(game.state, GameState::Battle);
        game
    }

    #[test]
    fn menu_draws_nothing_and_shows_title() {
        let game = Game::new();
        assert!(build_draw_list(&game).is_empty());
        let hud = build_hud(&game, 0);
        assert_eq!(
            hud.center.as_deref(),
            Some("Anime Battle - Press ENTER to Start")
        );
    }

    #[test]
    fn room_layers_background_ground_player() {
        let game = game_in_room();
        let cmds = build_draw_list(&game);
        assert!(matches!(
            cmds[0],
            DrawCmd::Sprite { key: SpriteKey::RoomBackground, .. }
        ));
        assert!(matches!(cmds[1], DrawCmd::Rect { .. }));
        assert!(matches!(
            cmds[2],
            DrawCmd::Sprite { key: SpriteKey::Player, .. }
        ));
    }

    #[test]
    fn room_prompt_appears_only_at_live_doors() {
        let mut game = game_in_room();
        assert!(build_hud(&game, 0).prompt.is_none());

        game.player.body.rect.x = game.doors[0].rect.x;
        assert_eq!(
            build_hud(&game, 0).prompt.as_deref(),
            Some("Press SPACE to enter battle")
        );

        game.doors[0].is_cleared = true;
        assert!(build_hud(&game, 0).prompt.is_none());
    }

    #[test]
    fn battle_draws_combatants_and_hp_bars() {
        let game = game_in_battle();
        let cmds = build_draw_list(&game);
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCmd::Sprite { key: SpriteKey::BattleBackground(name), .. } if name == "Naruto"
        )));
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCmd::Sprite { key: SpriteKey::Enemy(name), .. } if name == "Naruto"
        )));
        let outlines = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::RectOutline { .. }))
            .count();
        assert_eq!(outlines, 2);
    }

    #[test]
    fn hp_fill_scales_linearly_and_hits_zero() {
        assert_eq!(hp_fill_width(PLAYER_MAX_HP, PLAYER_MAX_HP), HP_BAR_WIDTH);
        assert_eq!(hp_fill_width(60, 120), HP_BAR_WIDTH / 2);
        assert_eq!(hp_fill_width(0, 120), 0);
        assert_eq!(hp_fill_width(-5, 120), 0);
    }

    #[test]
    fn empty_hp_bar_draws_outline_but_no_fill() {
        let mut game = game_in_battle();
        game.player.body.hp = 0;
        let cmds = build_draw_list(&game);
        let fills_at_player_bar = cmds
            .iter()
            .filter(|c| matches!(
                c,
                DrawCmd::Rect { rect, .. }
                    if rect.x == PLAYER_HP_BAR_X && rect.y == HP_BAR_Y
            ))
            .count();
        assert_eq!(fills_at_player_bar, 0);
    }

    #[test]
    fn fight_banner_tracks_wall_clock() {
        let game = game_in_battle();
        assert_eq!(build_hud(&game, 500).banner.as_deref(), Some("FIGHT!"));
        assert_eq!(build_hud(&game, game.fight_banner_until_ms).banner, None);
    }

    #[test]
    fn game_over_shows_outcome_text() {
        let mut game = Game::new();
        game.state = GameState::GameOver;
        game.game_over_text = DEFEAT_TEXT.to_string();
        let hud = build_hud(&game, 0);
        assert_eq!(hud.center.as_deref(), Some(DEFEAT_TEXT));
        assert_eq!(hud.center_sub.as_deref(), Some("Press R to restart"));
    }
}
