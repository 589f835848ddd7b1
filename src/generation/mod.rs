pub mod bundle;
mod t5;

pub use bundle::{ModelArtifacts, WeightsFile};
pub use t5::T5SqlGenerator;

use crate::{Result, config::ModelConfig};

/// Turns a natural-language prompt into SQL text.
///
/// Implementations are shared across request handlers and called from
/// blocking worker threads.
pub trait SqlGenerator: Send + Sync {
    fn generate_sql(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    /// Cap on encoded prompt length, special tokens included.
    pub max_input_tokens: usize,
    /// Cap on the decoder sequence, decoder start token included.
    pub max_output_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_input_tokens: 256,
            max_output_tokens: 256,
        }
    }
}

impl From<&ModelConfig> for GenerationParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_input_tokens: config.max_input_tokens,
            max_output_tokens: config.max_output_tokens,
        }
    }
}
