// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case loads the pipeline config and coordinates the
// data and infrastructure layers to do one job.
//
// Rules for this layer:
//   - No tensor math here
//   - No printing here (that's Layer 1)
//   - Errors are anyhow::Error with context attached
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The YAML pipeline config every use case starts from
pub mod config;

// Tracking run + final config.yaml
pub mod generate_config_use_case;

// First batch of a split, raw and tokenised
pub mod preview_use_case;

// Word-level tokenizer from the train split
pub mod prepare_tokenizer_use_case;
