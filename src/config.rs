use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Falls back to the GEMINI_API_KEY environment variable when empty.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Lighter model used for random concepts and field inspirations.
    #[serde(default = "default_prompt_model")]
    pub prompt_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    #[serde(default = "default_voice")]
    pub voice: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            text_model: default_text_model(),
            prompt_model: default_prompt_model(),
            image_model: default_image_model(),
            tts_model: default_tts_model(),
            voice: default_voice(),
        }
    }
}

fn default_output() -> String {
    "output".to_string()
}
fn default_text_model() -> String {
    "gemini-2.5-pro".to_string()
}
fn default_prompt_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}
fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}
fn default_voice() -> String {
    // A deep, serious prebuilt voice.
    "Fenrir".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config: Config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Config {
                output_folder: default_output(),
                gemini: GeminiConfig::default(),
            }
        };

        if config.gemini.api_key.is_empty() {
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                config.gemini.api_key = key;
            }
        }

        Ok(config)
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = serde_yaml_ng::from_str("gemini:\n  api_key: abc\n").unwrap();
        assert_eq!(config.gemini.api_key, "abc");
        assert_eq!(config.gemini.text_model, "gemini-2.5-pro");
        assert_eq!(config.gemini.voice, "Fenrir");
        assert_eq!(config.output_folder, "output");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "output_folder: forged\ngemini:\n  api_key: xyz\n  voice: Kore"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.output_folder, "forged");
        assert_eq!(config.gemini.api_key, "xyz");
        assert_eq!(config.gemini.voice, "Kore");
        // Untouched fields keep their defaults.
        assert_eq!(config.gemini.image_model, "imagen-4.0-generate-001");
    }
}
