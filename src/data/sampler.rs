// ============================================================
// Layer 4 — Samplers and Batch Strategies
// ============================================================
// Burn's loader walks a Dataset front to back and hands every
// item to a BatchStrategy, which decides where batches end.
// Both knobs are expressed in those terms here:
//
//   Sampler       → wraps the dataset in one of burn's
//                   transform datasets before the loader sees it
//
//     Range              PartialDataset    rows start..end, in order
//     ShuffledRange      PartialDataset +  rows start..end, permuted
//                        ShuffledDataset   once from `seed`
//     WithReplacement    SamplerDataset    num_samples uniform draws
//     WithoutReplacement SamplerDataset    num_samples draws, cycling
//                                          through fresh permutations
//
//   BatchSampler  → the BatchStrategy the loader batches with
//
//     Fixed   batch_size rows per batch; the short tail batch is
//             kept unless drop_last (DropLastBatchStrategy)
//     Sizes   consecutive batches of the listed sizes; rows past
//             the last size are not batched
//
// Example with 10 rows, batch_size=4:
//   drop_last=false → [0,1,2,3] [4,5,6,7] [8,9]
//   drop_last=true  → [0,1,2,3] [4,5,6,7]
//
// With worker threads every worker runs its own copy of the
// strategy over its own slice of the rows.
//
// Reference: burn::data::dataset::transform

use std::sync::Arc;

use burn::data::dataloader::{BatchStrategy, FixBatchStrategy};
use burn::data::dataset::transform::{PartialDataset, SamplerDataset, ShuffledDataset};
use burn::data::dataset::Dataset;

use crate::error::{DataError, Result};

// ─── Sampler ──────────────────────────────────────────────────────────────────
/// Which rows a loader visits, and how often.
///
/// The random variants draw from entropy; only `ShuffledRange` is
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sampler {
    Range { start: usize, end: usize },
    ShuffledRange { start: usize, end: usize, seed: u64 },
    WithReplacement { num_samples: usize },
    WithoutReplacement { num_samples: usize },
}

impl Sampler {
    /// Rows the sampled dataset will report.
    pub fn len(&self) -> usize {
        match *self {
            Sampler::Range { start, end } | Sampler::ShuffledRange { start, end, .. } => {
                end.saturating_sub(start)
            }
            Sampler::WithReplacement { num_samples } | Sampler::WithoutReplacement { num_samples } => {
                num_samples
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap `dataset` so that iterating it follows this sampler.
    /// Ranges must lie inside the dataset; random draws need at
    /// least one row to draw from.
    pub fn apply<I>(&self, dataset: Arc<dyn Dataset<I>>) -> Result<Arc<dyn Dataset<I>>>
    where
        I: Clone + Send + Sync + 'static,
    {
        let len = dataset.len();
        match *self {
            Sampler::Range { start, end } => {
                check_range(start, end, len)?;
                Ok(Arc::new(PartialDataset::new(dataset, start, end)))
            }
            Sampler::ShuffledRange { start, end, seed } => {
                check_range(start, end, len)?;
                let range = PartialDataset::new(dataset, start, end);
                Ok(Arc::new(ShuffledDataset::with_seed(range, seed)))
            }
            Sampler::WithReplacement { num_samples } => {
                check_not_empty(len)?;
                Ok(Arc::new(SamplerDataset::with_replacement(dataset, num_samples)))
            }
            Sampler::WithoutReplacement { num_samples } => {
                check_not_empty(len)?;
                Ok(Arc::new(SamplerDataset::without_replacement(dataset, num_samples)))
            }
        }
    }
}

fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
    if start > end || end > len {
        return Err(DataError::InvalidOptions(format!(
            "sampler range {start}..{end} does not fit a dataset of {len} rows"
        )));
    }
    Ok(())
}

fn check_not_empty(len: usize) -> Result<()> {
    if len == 0 {
        return Err(DataError::InvalidOptions(
            "cannot draw samples from an empty dataset".to_string(),
        ));
    }
    Ok(())
}

// ─── BatchSampler ─────────────────────────────────────────────────────────────
/// How consecutive rows are grouped into batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSampler {
    Fixed { batch_size: usize, drop_last: bool },
    Sizes(Vec<usize>),
}

impl BatchSampler {
    pub(crate) fn validate(&self) -> Result<()> {
        let ok = match self {
            BatchSampler::Fixed { batch_size, .. } => *batch_size > 0,
            BatchSampler::Sizes(sizes) => !sizes.is_empty() && sizes.iter().all(|&size| size > 0),
        };
        if !ok {
            return Err(DataError::InvalidOptions(format!(
                "batch sizes must be at least 1: {self:?}"
            )));
        }
        Ok(())
    }

    pub(crate) fn strategy<I: Send + 'static>(&self) -> Box<dyn BatchStrategy<I>> {
        match self {
            BatchSampler::Fixed { batch_size, drop_last: false } => {
                Box::new(FixBatchStrategy::new(*batch_size))
            }
            BatchSampler::Fixed { batch_size, drop_last: true } => {
                Box::new(DropLastBatchStrategy::new(*batch_size))
            }
            BatchSampler::Sizes(sizes) => Box::new(SizedBatchStrategy::new(sizes.clone().into())),
        }
    }
}

// ─── DropLastBatchStrategy ────────────────────────────────────────────────────
/// Like burn's FixBatchStrategy, but never emits a short final batch.
pub struct DropLastBatchStrategy<I> {
    items:      Vec<I>,
    batch_size: usize,
}

impl<I> DropLastBatchStrategy<I> {
    pub fn new(batch_size: usize) -> Self {
        Self {
            items: Vec::with_capacity(batch_size),
            batch_size,
        }
    }
}

impl<I: Send + 'static> BatchStrategy<I> for DropLastBatchStrategy<I> {
    fn add(&mut self, item: I) {
        self.items.push(item);
    }

    fn batch(&mut self, force: bool) -> Option<Vec<I>> {
        if self.items.len() < self.batch_size {
            if force {
                self.items.clear();
            }
            return None;
        }
        Some(std::mem::replace(&mut self.items, Vec::with_capacity(self.batch_size)))
    }

    fn clone_dyn(&self) -> Box<dyn BatchStrategy<I>> {
        Box::new(Self::new(self.batch_size))
    }
}

// ─── SizedBatchStrategy ───────────────────────────────────────────────────────
/// Emits batches of `sizes[0]`, `sizes[1]`, ... rows. A short final
/// batch is kept; once the sizes run out, further rows are dropped.
pub struct SizedBatchStrategy<I> {
    items: Vec<I>,
    sizes: Arc<[usize]>,
    next:  usize,
}

impl<I> SizedBatchStrategy<I> {
    pub fn new(sizes: Arc<[usize]>) -> Self {
        Self {
            items: Vec::new(),
            sizes,
            next:  0,
        }
    }
}

impl<I: Send + 'static> BatchStrategy<I> for SizedBatchStrategy<I> {
    fn add(&mut self, item: I) {
        if self.next < self.sizes.len() {
            self.items.push(item);
        }
    }

    fn batch(&mut self, force: bool) -> Option<Vec<I>> {
        let target = *self.sizes.get(self.next)?;
        if self.items.is_empty() || (self.items.len() < target && !force) {
            return None;
        }
        self.next += 1;
        Some(std::mem::take(&mut self.items))
    }

    fn clone_dyn(&self) -> Box<dyn BatchStrategy<I>> {
        Box::new(Self::new(Arc::clone(&self.sizes)))
    }
}
