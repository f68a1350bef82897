// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits describing what the pipeline
// works with: samples, encoded text, splits, and the seams
// (transformation, collation) other layers plug into.
//
// Rules for this layer:
//   - NO Burn tensor types
//   - NO file I/O
//   - Only plain Rust data and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One (text, label) row and its column-wise form
pub mod sample;

// Token ids + attention mask produced by a tokenizer
pub mod encoding;

// Train/dev/test splits, setup stages and loader modes
pub mod split;

// Transformation and DefaultCollate abstractions
pub mod traits;
