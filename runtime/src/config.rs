use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";

/// Hard cap on documents accepted with one question.
pub const MAX_DOCUMENTS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default = "default_language")]
    pub default_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_files: MAX_DOCUMENTS,
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

impl UploadsConfig {
    pub fn effective_max_files(&self) -> usize {
        self.max_files.min(MAX_DOCUMENTS)
    }

    /// Largest request body the upload route has to accept.
    pub fn body_limit(&self) -> usize {
        self.effective_max_files() * self.max_file_bytes + 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub gate_model: String,
    pub gate_temperature: f32,
    pub gate_max_tokens: u32,
    pub answer_model: String,
    pub answer_temperature: f32,
    pub answer_max_tokens: Option<u32>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            gate_model: "gpt-3.5-turbo".to_string(),
            gate_temperature: 0.1,
            gate_max_tokens: 5,
            answer_model: "gpt-4o".to_string(),
            answer_temperature: 0.7,
            answer_max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub binary: String,
    pub languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            languages: "eng+hin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub extraction_secs: u64,
    pub model_call_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            extraction_secs: 120,
            model_call_secs: 60,
        }
    }
}

impl TimeoutsConfig {
    pub fn extraction(&self) -> Duration {
        Duration::from_secs(self.extraction_secs)
    }

    pub fn model_call(&self) -> Duration {
        Duration::from_secs(self.model_call_secs)
    }
}

fn default_language() -> String {
    "en".to_string()
}

pub async fn load_config() -> Result<AppConfig> {
    load_config_from(config_path()).await
}

pub async fn load_config_from(path: PathBuf) -> Result<AppConfig> {
    let contents = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: AppConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    info!(path = %path.display(), "Configuration loaded from disk");
    Ok(config)
}

fn config_path() -> PathBuf {
    env::var("APP_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
