// ============================================================
// Layer 4 — Tokenization Batcher
// ============================================================
// The collate step for text classification, as a burn Batcher.
// Given the samples the loader fetched for one batch, produce
// model-ready tensors. The batcher's output is a Result, so a
// failed batch is yielded by the loader like any other batch.
//
// How batching works here:
//   Input:  Vec of N TextSamples (in the order the loader fetched them)
//
//   1. Transpose rows into parallel columns
//        texts  = [t0, t1, ..., tN-1]
//        labels = [l0, l1, ..., lN-1]
//   2. Stack labels into a 1D Int tensor          → [N]
//   3. Tokenise ALL texts with one call to the
//      Transformation, then stack ids and masks  → [N, S]
//
//   Row i of every tensor belongs to sample i.
//
// Tokenizer errors are returned as-is and abort only this batch.
// The tokenizer is expected to pad the batch to a common
// length; ragged output is reported as a tokenization error.
//
// DefaultCollator is the batcher a loader uses when no collate
// function is configured: step 1 only.
//
// Reference: Burn Book §4 (Batcher)

use std::fmt;
use std::sync::Arc;

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;

use crate::domain::encoding::EncodedText;
use crate::domain::sample::{TextColumns, TextSample};
use crate::domain::traits::{DefaultCollate, Transformation};
use crate::error::{DataError, Result};

// ─── TextClassificationBatch ──────────────────────────────────────────────────
/// A batch ready for a classification model's forward pass.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct TextClassificationBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Category ids — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

impl<B: Backend> TextClassificationBatch<B> {
    pub fn batch_size(&self) -> usize {
        self.labels.dims()[0]
    }
}

// ─── TokenizationBatcher ──────────────────────────────────────────────────────
/// Holds the shared transformation and the device tensors are created on.
pub struct TokenizationBatcher<B: Backend, T> {
    transformation: Arc<T>,
    device:         B::Device,
}

impl<B: Backend, T> TokenizationBatcher<B, T> {
    pub fn new(transformation: Arc<T>, device: B::Device) -> Self {
        Self {
            transformation,
            device,
        }
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }
}

impl<B: Backend, T> Clone for TokenizationBatcher<B, T> {
    fn clone(&self) -> Self {
        Self {
            transformation: Arc::clone(&self.transformation),
            device:         self.device.clone(),
        }
    }
}

impl<B: Backend, T> fmt::Debug for TokenizationBatcher<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizationBatcher")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl<B, T> Batcher<TextSample, Result<TextClassificationBatch<B>>> for TokenizationBatcher<B, T>
where
    B: Backend,
    T: Transformation,
{
    fn batch(&self, items: Vec<TextSample>) -> Result<TextClassificationBatch<B>> {
        // ── Step 1: rows → columns ────────────────────────────────────────────
        let TextColumns { texts, labels } = TextSample::default_collate(items);
        let batch_size = texts.len();

        // ── Step 2: stack labels ──────────────────────────────────────────────
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        // ── Step 3: one tokenizer call for the whole batch ────────────────────
        let encoded = self.transformation.transform(&texts)?;
        check_shape(&encoded, batch_size)?;
        let seq_len = encoded.seq_len();

        let ids_flat: Vec<i32> = encoded
            .input_ids
            .iter()
            .flat_map(|row| row.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = encoded
            .attention_mask
            .iter()
            .flat_map(|row| row.iter().map(|&x| x as i32))
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        Ok(TextClassificationBatch {
            input_ids,
            attention_mask,
            labels,
        })
    }
}

// ─── DefaultCollator ──────────────────────────────────────────────────────────
/// Applies the sample type's `default_collate`; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCollator;

impl<I: DefaultCollate> Batcher<I, Result<I::Collated>> for DefaultCollator {
    fn batch(&self, items: Vec<I>) -> Result<I::Collated> {
        Ok(I::default_collate(items))
    }
}

fn check_shape(encoded: &EncodedText, batch_size: usize) -> Result<()> {
    if encoded.len() != batch_size {
        return Err(DataError::Tokenization(format!(
            "transformation returned {} rows for {} texts",
            encoded.len(),
            batch_size
        )));
    }
    if !encoded.is_rectangular() {
        return Err(DataError::Tokenization(
            "encoded rows differ in length; enable padding on the tokenizer".to_string(),
        ));
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::WordLengths;

    type TestBackend = burn::backend::NdArray;

    struct Broken;

    impl Transformation for Broken {
        fn transform(&self, _texts: &[String]) -> Result<EncodedText> {
            Err(DataError::Tokenization("invalid input".to_string()))
        }
    }

    struct Ragged;

    impl Transformation for Ragged {
        fn transform(&self, texts: &[String]) -> Result<EncodedText> {
            Ok(EncodedText {
                input_ids:      texts.iter().enumerate().map(|(i, _)| vec![1; i + 1]).collect(),
                attention_mask: texts.iter().enumerate().map(|(i, _)| vec![1; i + 1]).collect(),
            })
        }
    }

    fn batcher<T>(t: T) -> TokenizationBatcher<TestBackend, T> {
        TokenizationBatcher::new(Arc::new(t), Default::default())
    }

    #[test]
    fn test_rows_stay_aligned_with_labels() {
        let items = vec![
            TextSample::new("a bb", 7),
            TextSample::new("ccc", 3),
            TextSample::new("dddd e ff", 5),
        ];

        let batch = batcher(WordLengths).batch(items).unwrap();

        assert_eq!(batch.batch_size(), 3);
        assert_eq!(batch.input_ids.dims(), [3, 3]);
        assert_eq!(batch.attention_mask.dims(), [3, 3]);

        let labels: Vec<i64> = batch.labels.into_data().iter::<i64>().collect();
        assert_eq!(labels, vec![7, 3, 5]);

        let ids: Vec<i64> = batch.input_ids.into_data().iter::<i64>().collect();
        assert_eq!(ids, vec![1, 2, 0, 3, 0, 0, 4, 1, 2]);

        let mask: Vec<i64> = batch.attention_mask.into_data().iter::<i64>().collect();
        assert_eq!(mask, vec![1, 1, 0, 1, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_single_sample_batch() {
        let batch = batcher(WordLengths)
            .batch(vec![TextSample::new("one two", 1)])
            .unwrap();
        assert_eq!(batch.input_ids.dims(), [1, 2]);
        assert_eq!(batch.labels.dims(), [1]);
    }

    #[test]
    fn test_tokenization_error_propagates() {
        let err = batcher(Broken)
            .batch(vec![TextSample::new("x", 0)])
            .unwrap_err();
        assert!(matches!(err, DataError::Tokenization(msg) if msg == "invalid input"));
    }

    #[test]
    fn test_default_collator_yields_columns() {
        let cols: Result<TextColumns> =
            DefaultCollator.batch(vec![TextSample::new("x", 0), TextSample::new("y", 1)]);
        let cols = cols.unwrap();
        assert_eq!(cols.texts,  vec!["x", "y"]);
        assert_eq!(cols.labels, vec![0, 1]);
    }

    #[test]
    fn test_ragged_encoding_rejected() {
        let err = batcher(Ragged)
            .batch(vec![TextSample::new("x", 0), TextSample::new("y", 1)])
            .unwrap_err();
        assert!(matches!(err, DataError::Tokenization(_)));
    }
}
