use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Hugging Face hub repo id, or a local directory holding the same files.
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_revision")]
    pub revision: String,
    /// Repo whose `tokenizer.json` is used when the model repo only ships a
    /// sentencepiece vocabulary.
    #[serde(default = "default_tokenizer_fallback_repo")]
    pub tokenizer_fallback_repo: String,
    #[serde(default)]
    pub device: DeviceKind,
    #[serde(default = "default_max_tokens")]
    pub max_input_tokens: usize,
    #[serde(default = "default_max_tokens")]
    pub max_output_tokens: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    Cpu,
    Cuda,
    Auto,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            revision: default_revision(),
            tokenizer_fallback_repo: default_tokenizer_fallback_repo(),
            device: DeviceKind::default(),
            max_input_tokens: default_max_tokens(),
            max_output_tokens: default_max_tokens(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_path() -> String {
    "ArtemKalchenko/t5-small_for_sql_generation".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_tokenizer_fallback_repo() -> String {
    "t5-small".to_string()
}

fn default_max_tokens() -> usize {
    256
}
