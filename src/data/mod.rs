// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from a Parquet split file to tensor batches.
//
// The pipeline flows in this order:
//
//   split .parquet file
//       │
//       ▼
//   TextClassificationDataset   → eager, indexed (text, label) rows
//       │
//       ▼
//   Sampler                     → burn transform dataset choosing
//       │                         which rows an epoch visits
//       ▼
//   DataLoader                  → burn BatchDataLoader (single or
//       │                         multi-threaded), BatchStrategy
//       ▼                         from the BatchSampler
//   TokenizationBatcher         → burn Batcher: tokenises and
//                                 stacks into tensors
//
// TextClassificationDataModule wires the three splits to their
// loaders: train in Train mode, dev and test in Eval mode.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Implements Burn's Dataset trait over a Parquet table
pub mod dataset;

/// Collates samples into tokenised tensor batches
pub mod batcher;

/// Row selection and batch strategies
pub mod sampler;

/// Loader options, LoaderConfig builder and the DataLoader itself
pub mod loader;

/// Train/dev/test setup and per-split loaders
pub mod module;
