mod api;
mod defaults;
mod validation;

use crate::cli::Args;
use crate::error::{NexoraError, Result as NexoraResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub use api::{normalize_endpoint, ApiConfig};
pub use defaults::*;
pub use validation::{expand_with, validate};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub primary_model: Option<String>,
    #[serde(default)]
    pub backup_model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub context_window: Option<usize>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub steps: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub dir: Option<String>,
}

/// Contents of a `.nexora.yaml` / `.nexora.json` file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSettings {
    pub client_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Required for completions and images only; local commands run without it
    pub api_key: Option<String>,
    /// The configured key when it still references an unset variable
    pub unresolved_api_key: Option<String>,
    pub api_endpoint: String,
    pub image_endpoint: String,
    pub primary_model: String,
    pub backup_model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub context_window: usize,
    pub request_timeout: u64,
    pub system_prompt: String,
    pub image: ImageSettings,
    /// `None` when no speech API key is configured; the feature is hidden then
    pub speech: Option<SpeechSettings>,
    /// `None` when no OAuth client is configured
    pub auth: Option<AuthSettings>,
    pub storage_dir: Option<PathBuf>,
    pub verbose: bool,
}

pub fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> NexoraResult<Self> {
        // Load file configuration first
        let json_config =
            JsonConfig::load().map_err(|e| NexoraError::ConfigError(format!("{:#}", e)))?;

        let config = Self::resolve(args, json_config, env_lookup);
        validate(&config)?;
        Ok(config)
    }

    /// The API key, or a configuration error naming where to set it
    pub fn api_key(&self) -> NexoraResult<&str> {
        if let Some(key) = self.api_key.as_deref() {
            return Ok(key);
        }
        Err(match &self.unresolved_api_key {
            Some(raw) => NexoraError::ConfigError(format!(
                "API key references an unset variable: {}",
                raw
            )),
            None => {
                NexoraError::ConfigError("NEXORA_API_KEY environment variable not set".to_string())
            }
        })
    }

    /// Merge CLI args > environment (through `lookup`) > file config > defaults.
    pub fn resolve(
        args: &Args,
        json_config: JsonConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let expand = |value: String| expand_with(&value, &lookup);

        let raw_api_key = lookup("NEXORA_API_KEY")
            .or(json_config.api.api_key.clone().map(&expand))
            .filter(|key| !key.trim().is_empty());
        let (api_key, unresolved_api_key) = match raw_api_key {
            Some(key) if key.contains("${") => (None, Some(key)),
            key => (key, None),
        };

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| lookup("NEXORA_API_ENDPOINT"))
            .or(json_config.api.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint, "chat/completions"))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let image_endpoint = lookup("NEXORA_IMAGE_ENDPOINT")
            .or(json_config.api.image_endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint, "images/generations"))
            .unwrap_or_else(|| DEFAULT_IMAGE_ENDPOINT.to_string());

        let primary_model = args
            .model
            .clone()
            .or_else(|| lookup("NEXORA_PRIMARY_MODEL"))
            .or(json_config.model.primary_model.clone())
            .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string());

        let backup_model = lookup("NEXORA_BACKUP_MODEL")
            .or(json_config.model.backup_model.clone())
            .unwrap_or_else(|| DEFAULT_BACKUP_MODEL.to_string());

        let context_window = lookup("NEXORA_CONTEXT_WINDOW")
            .and_then(|s| s.parse::<usize>().ok())
            .or(json_config.model.context_window)
            .unwrap_or_else(default_context_window);

        let request_timeout = lookup("NEXORA_REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(json_config.api.request_timeout)
            .unwrap_or_else(default_request_timeout);

        let system_prompt = lookup("NEXORA_SYSTEM_PROMPT")
            .or(json_config.model.system_prompt.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let system_prompt = format!(
            "{}\n\nCurrent date: {}",
            system_prompt,
            Self::get_current_date()
        );

        let verbose = args.verbose
            || lookup("NEXORA_VERBOSE")
                .map(|v| parse_bool(&v))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        let image = ImageSettings {
            model: json_config
                .image
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            width: json_config.image.width.unwrap_or_else(default_image_width),
            height: json_config.image.height.unwrap_or_else(default_image_height),
            steps: json_config.image.steps.unwrap_or_else(default_image_steps),
        };

        let speech = lookup("ELEVENLABS_API_KEY")
            .or(json_config.speech.api_key.clone().map(&expand))
            .filter(|key| !key.trim().is_empty() && !key.contains("${"))
            .map(|api_key| SpeechSettings {
                api_key,
                voice_id: json_config
                    .speech
                    .voice_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
                model_id: json_config
                    .speech
                    .model_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            });

        let auth = lookup("GOOGLE_CLIENT_ID")
            .or(json_config.auth.client_id.clone().map(&expand))
            .filter(|id| !id.trim().is_empty())
            .map(|client_id| AuthSettings {
                client_id,
                client_secret: lookup("GOOGLE_CLIENT_SECRET")
                    .or(json_config.auth.client_secret.clone().map(&expand)),
            });

        let storage_dir = lookup("NEXORA_STORAGE_DIR")
            .or(json_config.storage.dir.clone().map(&expand))
            .map(PathBuf::from);

        Config {
            api_key,
            unresolved_api_key,
            api_endpoint,
            image_endpoint,
            primary_model,
            backup_model,
            temperature: json_config.model.temperature.unwrap_or_else(default_temperature),
            top_p: json_config.model.top_p.unwrap_or_else(default_top_p),
            max_tokens: json_config.model.max_tokens.unwrap_or_else(default_max_tokens),
            context_window,
            request_timeout,
            system_prompt,
            image,
            speech,
            auth,
            storage_dir,
            verbose,
        }
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%a %b %d %Y").to_string()
    }
}

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse YAML config file: {}", path.display())
            })?
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse JSON config file: {}", path.display())
            })?
        };
        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (highest priority - local override)
        paths.push(PathBuf::from(".nexora.yaml"));
        paths.push(PathBuf::from(".nexora.yml"));
        paths.push(PathBuf::from(".nexora.json"));

        // 2. User's config directory (global config)
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("nexora");
            paths.push(config_dir.join("nexora.yaml"));
            paths.push(config_dir.join("nexora.yml"));
            paths.push(config_dir.join("nexora.json"));
        }

        paths
    }
}
