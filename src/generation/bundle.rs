use super::GenerationParams;
use crate::{
    Error, Result,
    config::{DeviceKind, ModelConfig},
};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::t5;
use hf_hub::{
    Repo, RepoType,
    api::sync::{Api, ApiRepo},
};
use std::path::{Path, PathBuf};
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsFile {
    Safetensors(Vec<PathBuf>),
    Pytorch(PathBuf),
}

impl WeightsFile {
    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let vb = match self {
            // SAFETY: the weight files are not modified while the process runs.
            Self::Safetensors(paths) => unsafe {
                VarBuilder::from_mmaped_safetensors(paths, DType::F32, device)?
            },
            Self::Pytorch(path) => VarBuilder::from_pth(path, DType::F32, device)?,
        };
        Ok(vb)
    }
}

/// Local paths of everything needed to build the model bundle.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: WeightsFile,
}

enum ArtifactSource {
    Local(PathBuf),
    Hub { repo_id: String, repo: ApiRepo },
}

impl ArtifactSource {
    fn get(&self, filename: &str) -> Result<PathBuf> {
        match self {
            Self::Local(dir) => {
                let path = dir.join(filename);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(Error::model(format!(
                        "{} not found in {}",
                        filename,
                        dir.display()
                    )))
                }
            }
            Self::Hub { repo_id, repo } => repo.get(filename).map_err(|e| {
                Error::model(format!("failed to fetch {} from {}: {}", filename, repo_id, e))
            }),
        }
    }
}

impl ModelArtifacts {
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        let local_dir = Path::new(&config.model_path);
        let source = if local_dir.is_dir() {
            info!("Loading model from local directory: {}", local_dir.display());
            ArtifactSource::Local(local_dir.to_path_buf())
        } else {
            info!(
                "Loading model from hub: {} (revision {})",
                config.model_path, config.revision
            );
            let api = Api::new()?;
            let repo = api.repo(Repo::with_revision(
                config.model_path.clone(),
                RepoType::Model,
                config.revision.clone(),
            ));
            ArtifactSource::Hub {
                repo_id: config.model_path.clone(),
                repo,
            }
        };

        let model_config = source.get(CONFIG_FILE)?;
        let weights = Self::resolve_weights(&source)?;
        let tokenizer = match source.get(TOKENIZER_FILE) {
            Ok(path) => path,
            Err(e) => {
                warn!(
                    "Model has no {} ({}), using the one from {}",
                    TOKENIZER_FILE, e, config.tokenizer_fallback_repo
                );
                let api = Api::new()?;
                api.model(config.tokenizer_fallback_repo.clone())
                    .get(TOKENIZER_FILE)?
            }
        };

        debug!(
            "Resolved artifacts: config={}, tokenizer={}, weights={:?}",
            model_config.display(),
            tokenizer.display(),
            weights
        );

        Ok(Self {
            config: model_config,
            tokenizer,
            weights,
        })
    }

    fn resolve_weights(source: &ArtifactSource) -> Result<WeightsFile> {
        match source.get(SAFETENSORS_FILE) {
            Ok(path) => Ok(WeightsFile::Safetensors(vec![path])),
            Err(safetensors_err) => {
                debug!("No safetensors weights ({}), trying {}", safetensors_err, PYTORCH_FILE);
                source.get(PYTORCH_FILE).map(WeightsFile::Pytorch).map_err(|e| {
                    Error::model(format!(
                        "no usable weights: {}; {}",
                        safetensors_err, e
                    ))
                })
            }
        }
    }
}

pub fn load_t5_config(path: &Path) -> Result<t5::Config> {
    let raw = std::fs::read_to_string(path)?;
    let config: t5::Config = serde_json::from_str(&raw)?;
    Ok(config)
}

pub fn load_tokenizer(path: &Path, params: &GenerationParams, pad_token_id: u32) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)?;
    configure_tokenizer(&mut tokenizer, params, pad_token_id)?;
    Ok(tokenizer)
}

/// Pads with the model's pad token and truncates to `max_input_tokens`,
/// counting the special tokens the post-processor appends.
pub fn configure_tokenizer(
    tokenizer: &mut Tokenizer,
    params: &GenerationParams,
    pad_token_id: u32,
) -> Result<()> {
    let pad_token = tokenizer
        .id_to_token(pad_token_id)
        .unwrap_or_else(|| "<pad>".to_string());

    tokenizer.with_padding(Some(PaddingParams {
        pad_id: pad_token_id,
        pad_token,
        ..Default::default()
    }));
    tokenizer.with_truncation(Some(TruncationParams {
        max_length: params.max_input_tokens,
        ..Default::default()
    }))?;

    Ok(())
}

pub fn select_device(kind: DeviceKind) -> Result<Device> {
    let device = match kind {
        DeviceKind::Cpu => Device::Cpu,
        DeviceKind::Cuda => Device::new_cuda(0)?,
        DeviceKind::Auto => Device::cuda_if_available(0)?,
    };
    Ok(device)
}
