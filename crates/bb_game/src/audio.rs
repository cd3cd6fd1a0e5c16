//! BGM and sound-effect playback over rodio.
//!
//! All sound files are read into memory up front; playback clones the decoded
//! bytes into a cursor so the manager never touches the filesystem after
//! startup. Music plays on one persistent looping sink that is stopped and
//! refilled on track changes; effects run on detached fire-and-forget sinks.
//!
//! Audio is best-effort throughout: a missing device makes `AudioManager::new`
//! return `None` (the caller then drops every cue), and a missing or
//! undecodable file just logs a warning and mutes that one cue.

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;

use crate::assets::AssetManifest;
use crate::game::{SoundEffect, MUSIC_ROOM};

pub struct AudioManager {
    _stream: OutputStream,
    bgm_sink: Sink,
    /// Track name -> encoded file contents.
    music: HashMap<String, Vec<u8>>,
    punch: Option<Vec<u8>>,
    fight: Option<Vec<u8>>,
}

impl AudioManager {
    /// Opens the default output device and preloads every sound the manifest
    /// names. `None` means no audio device; the game runs silent.
    pub fn new(manifest: &AssetManifest) -> Option<Self> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| log::warn!("No audio device, running silent: {e}"))
            .ok()?;
        let bgm_sink = Sink::connect_new(&stream.mixer());

        let mut music = HashMap::new();
        if let Some(bytes) = read_sound(&manifest.room_music) {
            music.insert(MUSIC_ROOM.to_string(), bytes);
        }
        for (name, enemy) in &manifest.enemies {
            if let Some(bytes) = read_sound(&enemy.music) {
                music.insert(name.clone(), bytes);
            }
        }

        let punch = manifest.effect("punch").and_then(read_sound);
        let fight = manifest.effect("fight").and_then(read_sound);

        Some(Self {
            _stream: stream,
            bgm_sink,
            music,
            punch,
            fight,
        })
    }

    /// Replaces whatever is looping with the named track. Unknown tracks just
    /// stop the music.
    pub fn play_music(&self, track: &str) {
        self.bgm_sink.stop();
        let Some(bytes) = self.music.get(track) else {
            log::warn!("No music loaded for track '{track}'");
            return;
        };
        match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(source) => self.bgm_sink.append(source.repeat_infinite()),
            Err(e) => log::warn!("Failed to decode music track '{track}': {e}"),
        }
    }

    pub fn play_effect(&self, effect: SoundEffect) {
        let bytes = match effect {
            SoundEffect::Punch => &self.punch,
            SoundEffect::FightStart => &self.fight,
        };
        let Some(bytes) = bytes else {
            return;
        };
        match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(source) => {
                let sink = Sink::connect_new(&self._stream.mixer());
                sink.append(source);
                sink.detach();
            }
            Err(e) => log::warn!("Failed to decode sound effect {effect:?}: {e}"),
        }
    }
}

fn read_sound(path: &str) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Failed to read sound file {path}: {e}");
            None
        }
    }
}
