//! Audio system for background music and sound effects
//!
//! Sounds are plain WAV files in a `sounds` directory, either in the working
//! directory or next to the executable. A missing device or file just means
//! silence.

use crate::game::GameEvent;
use crate::settings::AudioSettings;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

const SOUNDS_DIR: &str = "sounds";
const MUSIC_FILE: &str = "background_sound_01.wav";

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    SoftDrop,
    HardDrop,
    Lock,
    LineClear,
    Tetris,
    LevelUp,
    GameOver,
}

impl Sfx {
    fn filename(&self) -> &'static str {
        match self {
            Sfx::SoftDrop => "soft_drop_2.wav",
            Sfx::HardDrop => "hard_drop.wav",
            Sfx::Lock => "lock_piece.wav",
            Sfx::LineClear => "line_clear.wav",
            Sfx::Tetris => "4lines_clear.wav",
            Sfx::LevelUp => "level_up.wav",
            Sfx::GameOver => "game_over.wav",
        }
    }

    /// How long to wait before the effect starts. The level-up jingle waits
    /// for the line clear to finish.
    pub fn delay(&self) -> Duration {
        match self {
            Sfx::LevelUp => Duration::from_millis(1000),
            _ => Duration::ZERO,
        }
    }

    /// The cue for a game event, if it has one
    pub fn for_event(event: GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::SoftDrop => Some(Sfx::SoftDrop),
            GameEvent::HardDrop => Some(Sfx::HardDrop),
            GameEvent::Lock => Some(Sfx::Lock),
            GameEvent::LineClear(_) => Some(Sfx::LineClear),
            GameEvent::Tetris => Some(Sfx::Tetris),
            GameEvent::LevelUp(_) => Some(Sfx::LevelUp),
            // Game over plays once the final animation is done
            GameEvent::ToppedOut | GameEvent::Quit => None,
        }
    }
}

/// Audio manager handles all sound playback
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    music_sink: Option<Sink>,
    sounds_path: PathBuf,
    music_volume: f32,
    sfx_volume: f32,
}

impl AudioManager {
    /// Open the default output device. `None` when audio is switched off,
    /// there is no device, or there are no sound files.
    pub fn new(settings: &AudioSettings) -> Option<Self> {
        if !settings.enabled {
            return None;
        }

        let (stream, stream_handle) = OutputStream::try_default().ok()?;
        let sounds_path = Self::find_sounds_path()?;

        Some(Self {
            _stream: stream,
            stream_handle,
            music_sink: None,
            sounds_path,
            music_volume: settings.music_gain(),
            sfx_volume: settings.sfx_gain(),
        })
    }

    fn find_sounds_path() -> Option<PathBuf> {
        let paths = [
            PathBuf::from(SOUNDS_DIR),
            std::env::current_exe().ok()?.parent()?.join(SOUNDS_DIR),
        ];

        paths.into_iter().find(|p| p.is_dir())
    }

    fn open(&self, filename: &str) -> Option<Decoder<BufReader<File>>> {
        let path = self.sounds_path.join(filename);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("Missing sound {}: {}", path.display(), e);
                return None;
            }
        };
        Decoder::new(BufReader::new(file)).ok()
    }

    /// Start the background loop from the beginning
    pub fn start_music(&mut self) {
        self.stop_music();

        if self.music_volume <= 0.0 {
            return;
        }
        let Some(decoder) = self.open(MUSIC_FILE) else { return };
        let Ok(sink) = Sink::try_new(&self.stream_handle) else { return };

        sink.set_volume(self.music_volume);
        sink.append(decoder.repeat_infinite());
        self.music_sink = Some(sink);
    }

    /// Stop background music
    pub fn stop_music(&mut self) {
        if let Some(sink) = self.music_sink.take() {
            sink.stop();
        }
    }

    pub fn pause_music(&mut self) {
        if let Some(sink) = &self.music_sink {
            sink.pause();
        }
    }

    pub fn resume_music(&mut self) {
        if let Some(sink) = &self.music_sink {
            sink.play();
        }
    }

    /// Play a sound effect without waiting for it
    pub fn play_sfx(&mut self, sfx: Sfx) {
        if self.sfx_volume <= 0.0 {
            return;
        }

        let Some(decoder) = self.open(sfx.filename()) else { return };
        if let Ok(sink) = Sink::try_new(&self.stream_handle) {
            sink.set_volume(self.sfx_volume);
            sink.append(decoder.delay(sfx.delay()));
            sink.detach(); // Let it play and clean up automatically
        }
    }

    /// Play the cues for a batch of game events
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for sfx in events.iter().copied().filter_map(Sfx::for_event) {
            self.play_sfx(sfx);
        }
    }
}
