// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// Cross-cutting pieces that talk to the outside world:
//
//   tokenizer_store.rs — Tokenizer persistence
//                        Loads tokenizer.json if present, or
//                        builds a word-level vocabulary from the
//                        training texts and saves it.
//
//   tokenization.rs    — HuggingFace tokenizer as a
//                        Transformation (padding + truncation).
//
//   tracking.rs        — File-backed experiment tracking:
//                        experiments, runs, params, artifacts.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Batch tokenisation with a HuggingFace tokenizer
pub mod tokenization;

/// Experiment runs and their artifacts on local disk
pub mod tracking;
