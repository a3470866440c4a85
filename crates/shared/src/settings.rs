//! App settings, loaded once at startup and injected into the API client.
//!
//! The key is never read from the environment at call time; `load_or_default`
//! applies the `OPENAI_API_KEY` override exactly once.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub openai_api_key: String,
    pub chat_model: String,
    pub transcribe_model: String,
    pub transcribe_language: String,
    pub api_base_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            chat_model: "gpt-4o".to_string(),
            transcribe_model: "whisper-1".to_string(),
            transcribe_language: "en".to_string(),
            api_base_url: "https://api.openai.com".to_string(),
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        let proj = directories::ProjectDirs::from("com.local", "Askpad", "Askpad")?;
        let _ = std::fs::create_dir_all(proj.config_dir());
        Some(proj.config_dir().join("settings.json"))
    }

    /// Settings from the platform config dir, with the env-var key override.
    pub fn load_or_default() -> Self {
        let mut settings = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_default(),
            Some(path) => {
                let fresh = Self::default();
                fresh.save_to(&path);
                fresh
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                settings.openai_api_key = key;
            }
        }

        settings
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = std::fs::write(path, content) {
                    tracing::warn!("failed to save settings: {}", e);
                }
            }
            Err(e) => tracing::warn!("failed to serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.chat_model, "gpt-4o");
        assert_eq!(s.transcribe_model, "whisper-1");
        assert_eq!(s.transcribe_language, "en");
        assert_eq!(s.api_base_url, "https://api.openai.com");
        assert!(s.openai_api_key.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut s = AppSettings::default();
        s.openai_api_key = "sk-test".to_string();
        s.chat_model = "gpt-4.1".to_string();
        s.save_to(&path);

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.openai_api_key, "sk-test");
        assert_eq!(loaded.chat_model, "gpt-4.1");
    }

    #[test]
    fn test_load_from_garbage_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(AppSettings::load_from(&path).is_none());
    }
}
