//! Settings read from TOML
//!
//! Looks for ~/.config/blockfall/settings.toml (or platform equivalent). The
//! file is optional and only ever read; without it every field is a default.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Audio settings
    pub audio: AudioSettings,
    /// High score ledger location
    pub scores: ScoreSettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub ghost: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a key name or array of key names")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [key] = keys.as_slice() {
        serializer.serialize_str(key)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility when a game starts
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master switch; when off no output device is opened
    pub enabled: bool,
    /// Background music volume (0-100)
    pub music_volume: u32,
    /// SFX volume (0-100)
    pub sfx_volume: u32,
}

/// Where the high score ledger lives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSettings {
    /// Ledger file; the platform data directory is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["a".to_string(), "Left".to_string()],
            move_right: vec!["d".to_string(), "Right".to_string()],
            rotate: vec!["w".to_string(), "Up".to_string()],
            soft_drop: vec!["s".to_string(), "Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            pause: vec!["p".to_string()],
            ghost: vec!["g".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            music_volume: 25,
            sfx_volume: 50,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Parse settings text. Malformed files give defaults.
    pub fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed settings: {}", e);
            Self::default()
        })
    }
}

impl VisualSettings {
    /// Get the block characters based on style: (block, ghost)
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

impl AudioSettings {
    /// Music volume as a rodio gain
    pub fn music_gain(&self) -> f32 {
        percent_to_gain(self.music_volume)
    }

    /// Effect volume as a rodio gain
    pub fn sfx_gain(&self) -> f32 {
        percent_to_gain(self.sfx_volume)
    }
}

fn percent_to_gain(percent: u32) -> f32 {
    percent.min(100) as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Settings::parse(""), Settings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        assert_eq!(Settings::parse("[keys\nquit = "), Settings::default());
    }

    #[test]
    fn test_single_key_or_list() {
        let settings = Settings::parse(
            r#"
            [keys]
            quit = "Esc"
            rotate = ["x", "Up"]
            "#,
        );
        assert_eq!(settings.keys.quit, vec!["Esc"]);
        assert_eq!(settings.keys.rotate, vec!["x", "Up"]);
        // Untouched bindings keep their defaults
        assert_eq!(settings.keys.hard_drop, vec!["Space"]);
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::parse(
            r#"
            [visual]
            show_ghost = false

            [audio]
            enabled = false

            [scores]
            path = "/tmp/scores.txt"
            "#,
        );
        assert!(!settings.visual.show_ghost);
        assert_eq!(settings.visual.block_style, "solid");
        assert!(!settings.audio.enabled);
        assert_eq!(settings.audio.music_volume, 25);
        assert_eq!(settings.scores.path, Some(PathBuf::from("/tmp/scores.txt")));
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(text.contains("hard_drop = \"Space\""));
        assert!(!text.contains("path"));
        assert_eq!(Settings::parse(&text), Settings::default());
    }

    #[test]
    fn test_load_never_creates_the_file() {
        let path = Settings::settings_path();
        let existed = path.as_ref().map(|p| p.exists());

        let _ = Settings::load();

        assert_eq!(path.as_ref().map(|p| p.exists()), existed);
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars(), ("██", "░░"));
        visual.block_style = "bracket".to_string();
        assert_eq!(visual.block_chars(), ("[]", ".."));
        visual.block_style = "nonsense".to_string();
        assert_eq!(visual.block_chars().0, "██");
    }

    #[test]
    fn test_volume_gain_is_clamped() {
        let audio = AudioSettings {
            enabled: true,
            music_volume: 250,
            sfx_volume: 50,
        };
        assert_eq!(audio.music_gain(), 1.0);
        assert_eq!(audio.sfx_gain(), 0.5);
    }
}
