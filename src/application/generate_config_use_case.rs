// ============================================================
// Layer 2 — GenerateConfigUseCase
// ============================================================
// Produces the final config a training job runs with:
//
//   Step 1: Load the pipeline config              (Layer 2)
//   Step 2: Activate a tracking run               (Layer 5 - infra)
//   Step 3: Write run_id / experiment_id /
//           artifact_uri into the config
//   Step 4: Save it as <output_dir>/config.yaml
//   Step 5: Log the saved file as a run artifact  (Layer 5 - infra)
//
// Every node that later reads this config logs into the same
// run. If any step fails the run is closed as Failed.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::config::PipelineConfig;
use crate::infra::tracking::FileTrackingStore;

pub const GENERATED_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct GenerateConfigRequest {
    pub config_path: PathBuf,
    pub output_dir:  PathBuf,
}

/// What was written, for the CLI to report.
#[derive(Debug, Clone)]
pub struct GeneratedConfig {
    pub path:   PathBuf,
    pub config: PipelineConfig,
}

pub struct GenerateConfigUseCase {
    request: GenerateConfigRequest,
}

impl GenerateConfigUseCase {
    pub fn new(request: GenerateConfigRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<GeneratedConfig> {
        // ── Step 1 ────────────────────────────────────────────────────────────
        let mut config = PipelineConfig::load(&self.request.config_path)?;
        let mlflow     = &config.infrastructure.mlflow;

        // ── Step 2 ────────────────────────────────────────────────────────────
        let store   = FileTrackingStore::new(&mlflow.tracking_dir);
        let mut run = store
            .activate(
                &mlflow.experiment_name,
                mlflow.run_id.as_deref(),
                mlflow.run_name.as_deref(),
            )
            .with_context(|| format!("Cannot activate run in '{}'", mlflow.experiment_name))?;

        // ── Step 3 ────────────────────────────────────────────────────────────
        let mlflow = &mut config.infrastructure.mlflow;
        mlflow.run_id        = Some(run.run_id().to_string());
        mlflow.experiment_id = Some(run.experiment_id().to_string());
        mlflow.artifact_uri  = Some(run.artifact_uri());

        // ── Step 4 ────────────────────────────────────────────────────────────
        let path = self.request.output_dir.join(GENERATED_CONFIG_FILE);
        config.save(&path)?;

        // ── Step 5 ────────────────────────────────────────────────────────────
        run.log_artifact(&path)
            .with_context(|| format!("Cannot log '{}' as an artifact", path.display()))?;
        run.finish().context("Cannot close tracking run")?;

        Ok(GeneratedConfig { path, config })
    }
}
