use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::t5;
use sqlgen_rust::config::ModelConfig;
use std::fs;
use tempfile::TempDir;

pub const EOS_TOKEN_ID: u32 = 1;

/// One encoder and one decoder layer, small enough to initialise randomly.
pub const TINY_T5_CONFIG: &str = r#"{
  "vocab_size": 32,
  "d_model": 16,
  "d_kv": 4,
  "d_ff": 32,
  "num_layers": 1,
  "num_decoder_layers": 1,
  "num_heads": 4,
  "relative_attention_num_buckets": 8,
  "relative_attention_max_distance": 16,
  "dropout_rate": 0.0,
  "layer_norm_epsilon": 1e-6,
  "initializer_factor": 1.0,
  "feed_forward_proj": "relu",
  "tie_word_embeddings": true,
  "is_decoder": false,
  "is_encoder_decoder": true,
  "use_cache": true,
  "pad_token_id": 0,
  "eos_token_id": 1,
  "decoder_start_token_id": 0
}"#;

/// Word-level tokenizer with T5's special tokens and `</s>` post-processing.
pub const TINY_TOKENIZER: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [
    {"id": 0, "content": "<pad>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 1, "content": "</s>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 2, "content": "<unk>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
  ],
  "normalizer": {"type": "Lowercase"},
  "pre_tokenizer": {"type": "Whitespace"},
  "post_processor": {
    "type": "TemplateProcessing",
    "single": [
      {"Sequence": {"id": "A", "type_id": 0}},
      {"SpecialToken": {"id": "</s>", "type_id": 0}}
    ],
    "pair": [
      {"Sequence": {"id": "A", "type_id": 0}},
      {"SpecialToken": {"id": "</s>", "type_id": 0}},
      {"Sequence": {"id": "B", "type_id": 0}},
      {"SpecialToken": {"id": "</s>", "type_id": 0}}
    ],
    "special_tokens": {
      "</s>": {"id": "</s>", "ids": [1], "tokens": ["</s>"]}
    }
  },
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": {
      "<pad>": 0, "</s>": 1, "<unk>": 2,
      "select": 3, "from": 4, "where": 5, "count": 6, "(": 7,
      ")": 8, "*": 9, "users": 10, "orders": 11, "name": 12, "id": 13,
      "=": 14, ">": 15, "<": 16, "and": 17, "or": 18, "group": 19,
      "by": 20, "order": 21, "limit": 22, "how": 23, "many": 24, "are": 25,
      "there": 26, "show": 27, "all": 28, "x": 29, "age": 30, ",": 31
    },
    "unk_token": "<unk>"
  }
}"#;

pub const SPECIAL_MARKERS: [&str; 3] = ["<pad>", "</s>", "<unk>"];

/// Writes `config.json`, `tokenizer.json` and randomly initialised
/// `model.safetensors` into a fresh directory.
pub fn tiny_model_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let device = Device::Cpu;

    let config: t5::Config = serde_json::from_str(TINY_T5_CONFIG).unwrap();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let _model = t5::T5ForConditionalGeneration::load(vb, &config).unwrap();

    for var in varmap.all_vars() {
        let values = Tensor::randn(0f32, 0.5f32, var.dims(), &device).unwrap();
        var.set(&values).unwrap();
    }

    varmap.save(dir.path().join("model.safetensors")).unwrap();
    fs::write(dir.path().join("config.json"), TINY_T5_CONFIG).unwrap();
    fs::write(dir.path().join("tokenizer.json"), TINY_TOKENIZER).unwrap();

    dir
}

pub fn tiny_model_config(dir: &TempDir) -> ModelConfig {
    ModelConfig {
        model_path: dir.path().to_string_lossy().to_string(),
        ..Default::default()
    }
}
