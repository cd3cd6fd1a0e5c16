//! Asset manifest loading.
//!
//! The manifest is a JSON file mapping logical asset roles to file paths:
//! the player sprite, the room art and music, a sound-effect table, and one
//! entry per enemy name (sprite + battle background + battle theme). Gameplay
//! never reads paths directly; it refers to enemies by name and the
//! presentation layer resolves through the manifest.
//!
//! A missing manifest file is not fatal: `AssetManifest::built_in()` supplies
//! the stock paths so the game still boots (textures and sounds then fall back
//! individually if their files are absent too).

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Enemy names every manifest must cover; the two doors reference them.
pub const REQUIRED_ENEMIES: [&str; 2] = ["Naruto", "Luffy"];

#[derive(Debug, Deserialize, Clone)]
pub struct AssetManifest {
    pub player_sprite: String,
    pub room_background: String,
    pub room_music: String,
    /// Effect name -> sound file. "punch" and "fight" are required.
    pub effects: HashMap<String, String>,
    /// Enemy name -> per-enemy assets.
    pub enemies: HashMap<String, EnemyAssets>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnemyAssets {
    pub sprite: String,
    pub background: String,
    pub music: String,
}

impl AssetManifest {
    /// The stock asset paths, used when no manifest file is present.
    pub fn built_in() -> Self {
        let mut effects = HashMap::new();
        effects.insert("punch".to_string(), "assets/sound/punch.wav".to_string());
        effects.insert("fight".to_string(), "assets/sound/fight.wav".to_string());

        let mut enemies = HashMap::new();
        enemies.insert(
            "Naruto".to_string(),
            EnemyAssets {
                sprite: "assets/img/naruto.png".to_string(),
                background: "assets/img/bg_naruto.jpg".to_string(),
                music: "assets/sound/naruto.mp3".to_string(),
            },
        );
        enemies.insert(
            "Luffy".to_string(),
            EnemyAssets {
                sprite: "assets/img/luffy.png".to_string(),
                background: "assets/img/bg_luffy.jpg".to_string(),
                music: "assets/sound/luffy.mp3".to_string(),
            },
        );

        Self {
            player_sprite: "assets/img/player.png".to_string(),
            room_background: "assets/img/room_bg.png".to_string(),
            room_music: "assets/sound/room.mp3".to_string(),
            effects,
            enemies,
        }
    }

    pub fn enemy(&self, name: &str) -> Option<&EnemyAssets> {
        self.enemies.get(name)
    }

    pub fn effect(&self, name: &str) -> Option<&str> {
        self.effects.get(name).map(String::as_str)
    }
}

pub fn load_manifest_from_path(path: &Path) -> Result<AssetManifest, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read asset manifest {}: {e}", path.display()))?;
    let manifest: AssetManifest = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse asset manifest {}: {e}", path.display()))?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &AssetManifest) -> Result<(), String> {
    if manifest.player_sprite.is_empty() {
        return Err("Manifest validation failed: player_sprite is empty".to_string());
    }
    for name in REQUIRED_ENEMIES {
        let Some(enemy) = manifest.enemies.get(name) else {
            return Err(format!(
                "Manifest validation failed: missing enemy entry '{name}'"
            ));
        };
        if enemy.sprite.is_empty() || enemy.background.is_empty() || enemy.music.is_empty() {
            return Err(format!(
                "Manifest validation failed: enemy '{name}' has an empty path"
            ));
        }
    }
    for effect in ["punch", "fight"] {
        if !manifest.effects.contains_key(effect) {
            return Err(format!(
                "Manifest validation failed: missing effect entry '{effect}'"
            ));
        }
    }
    Ok(())
}
