// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the data pipeline that know nothing of burn:
//
//   Transformation — turns an ordered batch of raw texts into
//                    token ids + attention masks in ONE call.
//                    Implemented by HuggingFaceTokenization
//                    (infra layer); tests plug in fakes.
//
//   DefaultCollate — how a sample type is transposed into
//                    columns when no collate function is
//                    configured.
//
// Transformation must be Send + Sync: every loader worker
// holds the same one behind an Arc.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::encoding::EncodedText;
use crate::domain::sample::{TextColumns, TextSample};
use crate::error::Result;

// ─── Transformation ───────────────────────────────────────────────────────────
/// A batch tokenizer.
///
/// The returned `EncodedText` must have exactly `texts.len()` rows,
/// in the same order as `texts`.
pub trait Transformation: Send + Sync {
    fn transform(&self, texts: &[String]) -> Result<EncodedText>;
}

impl<T: Transformation + ?Sized> Transformation for std::sync::Arc<T> {
    fn transform(&self, texts: &[String]) -> Result<EncodedText> {
        (**self).transform(texts)
    }
}

// ─── DefaultCollate ───────────────────────────────────────────────────────────
/// Sample types that know their default column-wise aggregation.
pub trait DefaultCollate: Sized {
    type Collated;

    fn default_collate(items: Vec<Self>) -> Self::Collated;
}

impl DefaultCollate for TextSample {
    type Collated = TextColumns;

    fn default_collate(items: Vec<Self>) -> TextColumns {
        items.into_iter().collect()
    }
}
