use super::{GenerationParams, SqlGenerator, bundle};
use crate::{Error, Result, config::ModelConfig};
use candle_core::{D, Device, Tensor};
use candle_transformers::models::t5::{Config as T5Config, T5ForConditionalGeneration};
use std::sync::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Greedy T5 text-to-SQL generator.
///
/// The model keeps a decoder key/value cache and needs `&mut` access for
/// every forward pass, so calls are serialized on `model`. The tokenizer is
/// read-only and shared freely.
pub struct T5SqlGenerator {
    model: Mutex<T5ForConditionalGeneration>,
    tokenizer: Tokenizer,
    device: Device,
    decoder_start_token_id: u32,
    eos_token_id: u32,
    use_cache: bool,
    params: GenerationParams,
}

impl T5SqlGenerator {
    /// Resolves, downloads if needed, and loads the model bundle.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let device = bundle::select_device(config.device)?;
        let artifacts = bundle::ModelArtifacts::resolve(config)?;

        let t5_config = bundle::load_t5_config(&artifacts.config)?;
        let params = GenerationParams::from(config);
        let tokenizer =
            bundle::load_tokenizer(&artifacts.tokenizer, &params, t5_config.pad_token_id as u32)?;

        let vb = artifacts.weights.var_builder(&device)?;
        let model = T5ForConditionalGeneration::load(vb, &t5_config)?;

        info!(
            "Loaded model {} on {:?} (vocab {}, {} encoder layers)",
            config.model_path, device, t5_config.vocab_size, t5_config.num_layers
        );

        Ok(Self::from_parts(model, tokenizer, &t5_config, device, params))
    }

    pub fn from_parts(
        model: T5ForConditionalGeneration,
        tokenizer: Tokenizer,
        t5_config: &T5Config,
        device: Device,
        params: GenerationParams,
    ) -> Self {
        let decoder_start_token_id = t5_config
            .decoder_start_token_id
            .unwrap_or(t5_config.pad_token_id) as u32;

        Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            decoder_start_token_id,
            eos_token_id: t5_config.eos_token_id as u32,
            use_cache: t5_config.use_cache,
            params,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Token ids fed to the encoder for `prompt`, after truncation.
    pub fn encode(&self, prompt: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(prompt, true)?;
        let mut ids = encoding.get_ids().to_vec();
        // The encoder cannot run on an empty sequence.
        if ids.is_empty() {
            ids.push(self.eos_token_id);
        }
        Ok(ids)
    }

    /// Greedy decoding. Returns the generated ids without the decoder start
    /// token; stops at EOS or when the decoder sequence reaches
    /// `max_output_tokens`.
    pub fn generate_ids(&self, input_ids: &[u32]) -> Result<Vec<u32>> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::internal("model lock poisoned"))?;
        model.clear_kv_cache();

        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let encoder_output = model.encode(&input)?;

        let mut sequence = vec![self.decoder_start_token_id];
        while sequence.len() < self.params.max_output_tokens {
            let decoder_input = match sequence.last() {
                Some(&last) if self.use_cache && sequence.len() > 1 => {
                    Tensor::new(&[last], &self.device)?.unsqueeze(0)?
                }
                _ => Tensor::new(sequence.as_slice(), &self.device)?.unsqueeze(0)?,
            };

            let logits = model.decode(&decoder_input, &encoder_output)?.squeeze(0)?;
            let next_token = logits.argmax(D::Minus1)?.to_scalar::<u32>()?;
            if next_token == self.eos_token_id {
                break;
            }
            sequence.push(next_token);
        }

        Ok(sequence.split_off(1))
    }
}

impl SqlGenerator for T5SqlGenerator {
    fn generate_sql(&self, prompt: &str) -> Result<String> {
        let input_ids = self.encode(prompt)?;
        let output_ids = self.generate_ids(&input_ids)?;
        let sql = self.tokenizer.decode(&output_ids, true)?;

        debug!(
            "Generated {} tokens from {} prompt tokens",
            output_ids.len(),
            input_ids.len()
        );

        Ok(sql)
    }
}
