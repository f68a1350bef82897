// ============================================================
// Layer 5 — HuggingFace Tokenization Transformation
// ============================================================
// Wraps a `tokenizers::Tokenizer` as a Transformation:
//   - pads every batch to its longest row ([PAD] id, right side)
//   - truncates rows to max_sequence_length
//   - encodes the whole batch with a single encode_batch call

use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::domain::encoding::EncodedText;
use crate::domain::traits::Transformation;
use crate::error::{DataError, Result};

const PAD_TOKEN: &str = "[PAD]";

pub struct HuggingFaceTokenization {
    tokenizer:           Tokenizer,
    max_sequence_length: usize,
}

impl HuggingFaceTokenization {
    pub fn new(mut tokenizer: Tokenizer, max_sequence_length: usize) -> Result<Self> {
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);

        tokenizer.with_padding(Some(PaddingParams {
            strategy:  PaddingStrategy::BatchLongest,
            pad_id,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| DataError::Tokenization(e.to_string()))?;

        Ok(Self {
            tokenizer,
            max_sequence_length,
        })
    }

    pub fn from_file(path: &Path, max_sequence_length: usize) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            DataError::Tokenization(format!("cannot load tokenizer '{}': {e}", path.display()))
        })?;
        Self::new(tokenizer, max_sequence_length)
    }

    pub fn max_sequence_length(&self) -> usize {
        self.max_sequence_length
    }
}

impl Transformation for HuggingFaceTokenization {
    fn transform(&self, texts: &[String]) -> Result<EncodedText> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| DataError::Tokenization(e.to_string()))?;

        let mut encoded = EncodedText::default();
        for encoding in &encodings {
            encoded.input_ids.push(encoding.get_ids().to_vec());
            encoded.attention_mask.push(encoding.get_attention_mask().to_vec());
        }
        Ok(encoded)
    }
}
