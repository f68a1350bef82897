// ============================================================
// Layer 2 — Pipeline Configuration
// ============================================================
// The YAML file every command starts from:
//
//   data_module:       split paths, columns, loader options
//   transformation:    tokenizer location and limits
//   infrastructure:
//     mlflow:          tracking store, experiment, run ids
//
// generate-config fills in the run_id / experiment_id /
// artifact_uri fields and writes the result back out.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::module::DataModuleConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_module:    DataModuleConfig,
    #[serde(default)]
    pub transformation: TransformationConfig,
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    pub tokenizer_dir:       String,
    pub max_sequence_length: usize,
    pub vocab_size:          usize,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            tokenizer_dir:       "tokenizer".to_string(),
            max_sequence_length: 200,
            vocab_size:          30522,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    #[serde(default)]
    pub mlflow: MlflowConfig,
}

/// Tracking settings. The id fields are empty until a run is
/// activated for this config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlflowConfig {
    pub tracking_dir:    String,
    pub experiment_name: String,
    pub run_name:        Option<String>,
    pub run_id:          Option<String>,
    pub experiment_id:   Option<String>,
    pub artifact_uri:    Option<String>,
}

impl Default for MlflowConfig {
    fn default() -> Self {
        Self {
            tracking_dir:    "mlruns".to_string(),
            experiment_name: "Default".to_string(),
            run_name:        None,
            run_id:          None,
            experiment_id:   None,
            artifact_uri:    None,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid config '{}'", path.display()))
    }

    /// Write as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Cannot write config '{}'", path.display()))?;
        tracing::info!("Config saved to '{}'", path.display());
        Ok(())
    }
}
