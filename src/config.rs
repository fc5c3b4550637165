use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::tutor::Level;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub exercise: ExerciseConfig,
    pub tutor: TutorConfig,
    pub network: NetworkConfig,
    pub storage: StorageConfig,
}

/// Parameters for random dataset generation.
#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Number of samples. Zero or negative yields an empty dataset.
    pub count: i64,
    pub min: f64,
    pub max: f64,
    pub allow_decimals: bool,
    pub decimals: u32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            count: 12,
            min: 10.0,
            max: 70.0,
            allow_decimals: false,
            decimals: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExerciseConfig {
    /// Key under which the completed result is stored.
    pub id: String,
    pub next_exercise: String,
    pub interval_count: usize,
    pub tolerance: f64,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            id: "intervals".to_string(),
            next_exercise: "frequencies".to_string(),
            interval_count: 5,
            tolerance: 0.01,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TutorConfig {
    pub base_url: String,
    pub api_version: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
    pub level: Level,
    pub history_limit: usize,
    /// Key injected at deploy time; installed into local storage on startup.
    pub api_key: Option<String>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 1000,
            top_p: 0.9,
            top_k: 40,
            level: Level::Medium,
            history_limit: 10,
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Durable store for the credential and language preference.
    pub local_path: PathBuf,
    /// Store for the working dataset and exercise results.
    pub session_path: PathBuf,
    pub recency_window_secs: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            local_path: data_dir.join("local.json"),
            session_path: data_dir.join("session.json"),
            recency_window_secs: 3600,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("la-matriu")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // .env is optional; deployments pass the key through the environment
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("la-matriu");
        let storage = StorageConfig::default();

        let builder = Config::builder()
            // 1. Defaults
            // Dataset
            .set_default("dataset.count", 12)?
            .set_default("dataset.min", 10.0)?
            .set_default("dataset.max", 70.0)?
            .set_default("dataset.allow_decimals", false)?
            .set_default("dataset.decimals", 1)?
            // Exercise
            .set_default("exercise.id", "intervals")?
            .set_default("exercise.next_exercise", "frequencies")?
            .set_default("exercise.interval_count", 5)?
            .set_default("exercise.tolerance", 0.01)?
            // Tutor
            .set_default("tutor.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("tutor.api_version", "v1beta")?
            .set_default("tutor.model", "gemini-2.5-flash")?
            .set_default("tutor.temperature", 0.7)?
            .set_default("tutor.max_output_tokens", 1000)?
            .set_default("tutor.top_p", 0.9)?
            .set_default("tutor.top_k", 40)?
            .set_default("tutor.level", "medium")?
            .set_default("tutor.history_limit", 10)?
            .set_default("tutor.api_key", None::<String>)?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Storage
            .set_default(
                "storage.local_path",
                storage.local_path.to_string_lossy().to_string(),
            )?
            .set_default(
                "storage.session_path",
                storage.session_path.to_string_lossy().to_string(),
            )?
            .set_default("storage.recency_window_secs", 3600)?
            // 2. Local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))
            // 3. User config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))
            // 4. Environment variables (MATRIU__TUTOR__MODEL=...)
            .add_source(Environment::with_prefix("MATRIU").separator("__"));

        let s = builder.build().context("Failed to assemble configuration")?;
        s.try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
