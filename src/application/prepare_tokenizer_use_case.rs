// ============================================================
// Layer 2 — PrepareTokenizerUseCase
// ============================================================
//   Step 1: Load the train split           (Layer 4 - data)
//   Step 2: Build or reuse tokenizer.json  (Layer 5 - infra)
//
// An existing tokenizer is never overwritten, so dev/test runs
// keep the vocabulary training used.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::config::PipelineConfig;
use crate::domain::split::Split;
use crate::infra::tokenizer_store::TokenizerStore;

#[derive(Debug, Clone)]
pub struct PrepareTokenizerRequest {
    pub config_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PreparedTokenizer {
    pub path:       PathBuf,
    pub vocab_size: usize,
}

pub struct PrepareTokenizerUseCase {
    request: PrepareTokenizerRequest,
}

impl PrepareTokenizerUseCase {
    pub fn new(request: PrepareTokenizerRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<PreparedTokenizer> {
        let config = PipelineConfig::load(&self.request.config_path)?;
        let store  = TokenizerStore::new(&config.transformation.tokenizer_dir);

        let tokenizer = if store.exists() {
            store.load()?
        } else {
            let train = config
                .data_module
                .load_split(Split::Train)
                .context("Cannot load train split for the tokenizer vocabulary")?;
            store.load_or_build(train.texts(), config.transformation.vocab_size)?
        };

        Ok(PreparedTokenizer {
            path:       store.tokenizer_path(),
            vocab_size: tokenizer.get_vocab_size(false),
        })
    }
}
