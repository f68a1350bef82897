// ============================================================
// Layer 2 — PreviewUseCase
// ============================================================
// Shows what a loader will hand to the model:
//
//   Step 1: Load one split                       (Layer 4 - data)
//   Step 2: Take the first batch with the default
//           collator → raw texts and labels
//   Step 3: If a tokenizer is saved, run the same
//           split through the data module and
//           report the token tensor shape         (Layer 4 + 6)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use burn::backend::NdArray;
use burn::data::dataset::Dataset;

use crate::application::config::PipelineConfig;
use crate::data::batcher::TokenizationBatcher;
use crate::data::loader::{DataLoader, LoaderConfig};
use crate::domain::sample::{TextColumns, TextSample};
use crate::domain::split::Split;
use crate::infra::tokenization::HuggingFaceTokenization;
use crate::infra::tokenizer_store::TokenizerStore;

type PreviewBackend = NdArray;

#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub config_path: PathBuf,
    pub split:       Split,
    pub batch_size:  usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub split:        Split,
    pub dataset_len:  usize,
    pub texts:        Vec<String>,
    pub labels:       Vec<i64>,
    /// [batch_size, seq_len] of the tokenised first batch
    pub token_shape:  Option<[usize; 2]>,
}

pub struct PreviewUseCase {
    request: PreviewRequest,
}

impl PreviewUseCase {
    pub fn new(request: PreviewRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<Preview> {
        let config = PipelineConfig::load(&self.request.config_path)?;
        let split  = self.request.split;

        // ── Step 1 ────────────────────────────────────────────────────────────
        let dataset = config
            .data_module
            .load_split(split)
            .with_context(|| format!("Cannot load {split} split"))?;
        let dataset_len = dataset.len();
        let dataset: Arc<dyn Dataset<TextSample>> = Arc::new(dataset);

        // ── Step 2 ────────────────────────────────────────────────────────────
        let loader: DataLoader<TextColumns> = LoaderConfig::new(self.request.batch_size)
            .build(Arc::clone(&dataset), split.mode())?;
        let TextColumns { texts, labels } = match loader.iter().next() {
            Some(batch) => batch?,
            None        => TextColumns::default(),
        };

        // ── Step 3 ────────────────────────────────────────────────────────────
        let store = TokenizerStore::new(&config.transformation.tokenizer_dir);
        let token_shape = if store.exists() {
            self.token_shape(&config, dataset, &store.tokenizer_path())?
        } else {
            tracing::debug!("No tokenizer at '{}'", store.tokenizer_path().display());
            None
        };

        Ok(Preview {
            split,
            dataset_len,
            texts,
            labels,
            token_shape,
        })
    }

    fn token_shape(
        &self,
        config:         &PipelineConfig,
        dataset:        Arc<dyn Dataset<TextSample>>,
        tokenizer_path: &Path,
    ) -> Result<Option<[usize; 2]>> {
        let transformation = HuggingFaceTokenization::from_file(
            tokenizer_path,
            config.transformation.max_sequence_length,
        )?;
        let batcher = TokenizationBatcher::<PreviewBackend, _>::new(Arc::new(transformation), Default::default());

        let mut data_module = config.data_module.clone();
        data_module.batch_size = self.request.batch_size;

        let loader = data_module
            .loader_config()
            .with_collate_fn(batcher)
            .build(dataset, self.request.split.mode())?;
        let shape = match loader.iter().next() {
            Some(batch) => Some(batch?.input_ids.dims()),
            None        => None,
        };
        Ok(shape)
    }
}
