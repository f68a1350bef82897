// ============================================================
// textcls-pipeline
// ============================================================
// Parquet-backed text-classification datasets, a tokenizing
// batcher, and per-split loaders, plus the CLI commands that
// prepare configs and tokenizers around them.
//
//   Layer 1 — cli/          argument parsing, printing
//   Layer 2 — application/  use cases and the YAML config
//   Layer 3 — domain/       samples, splits, traits
//   Layer 4 — data/         dataset, samplers, loader, batcher
//   Layer 5 — infra/        tokenizers and tracking store

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;

#[cfg(test)]
mod test_util;

pub use data::batcher::{TextClassificationBatch, TokenizationBatcher};
pub use data::dataset::TextClassificationDataset;
pub use data::loader::{DataLoader, LoaderConfig};
pub use data::module::{DataModuleConfig, TextClassificationDataModule};
pub use domain::split::{LoaderMode, Split, Stage};
pub use error::DataError;
