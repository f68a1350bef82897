// ============================================================
// Layer 4 — Loader Configuration and DataLoader
// ============================================================
// LoaderConfig holds every loader option once; the same config
// builds the train, dev and test loaders. build() forwards the
// options unchanged except for one rule:
//
//     effective shuffle = configured shuffle AND mode == Train
//
// so dev/test loaders never shuffle, whatever the config says.
//
// Batching itself is burn's BatchDataLoader:
//   sampler        → transform dataset wrapped around the rows
//   batch_sampler  → BatchStrategy (FixBatchStrategy, or
//                    DropLastBatchStrategy when drop_last)
//   shuffle        → StdRng handed to burn; every iter() draws
//                    a new permutation from it, so a seeded
//                    loader gives different but reproducible
//                    epochs
//   num_workers    → BatchDataLoader::multi_thread: each worker
//                    owns a contiguous slice of the rows and
//                    batches arrive in completion order
//   collate_fn     → the burn Batcher; its Result output is
//                    yielded per batch, so a failed batch does
//                    not end the epoch
//
// Option conflicts are rejected by DataLoader::new, not by
// LoaderConfig::build:
//   - batch_size == 0
//   - sampler together with shuffle
//   - batch_sampler together with batch_size != 1, shuffle,
//     sampler or drop_last
//   - persistent_workers with num_workers == 0
//
// BatchDataLoader is what burn's DataLoaderBuilder builds; it is
// constructed directly because the builder takes neither a batch
// strategy nor an unseeded shuffle.
//
// Reference: burn::data::dataloader (BatchDataLoader, BatchStrategy)

use std::any::Any;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use burn::data::dataloader::batcher::{Batcher, DynBatcher};
use burn::data::dataloader::{BatchDataLoader, DataLoader as BurnDataLoader, DataLoaderIterator};
use burn::data::dataset::Dataset;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::batcher::DefaultCollator;
use crate::data::sampler::{BatchSampler, Sampler};
use crate::domain::split::LoaderMode;
use crate::error::{DataError, Result};

// ─── LoaderOptions ────────────────────────────────────────────────────────────
/// Every loader option except the collate function.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    pub batch_size:         usize,
    pub shuffle:            bool,
    pub sampler:            Option<Sampler>,
    pub batch_sampler:      Option<BatchSampler>,
    pub num_workers:        usize,
    /// Hint for accelerator backends; host backends ignore it
    pub pin_memory:         bool,
    pub drop_last:          bool,
    /// Checked for consistency only: burn starts worker threads per epoch
    pub persistent_workers: bool,
    /// Seed for shuffling; None seeds from entropy
    pub seed:               Option<u64>,
}

impl LoaderOptions {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            shuffle:            false,
            sampler:            None,
            batch_sampler:      None,
            num_workers:        0,
            pin_memory:         false,
            drop_last:          false,
            persistent_workers: false,
            seed:               None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DataError::InvalidOptions("batch_size must be at least 1".to_string()));
        }
        if self.sampler.is_some() && self.shuffle {
            return Err(DataError::InvalidOptions(
                "sampler option is mutually exclusive with shuffle".to_string(),
            ));
        }
        if let Some(batch_sampler) = &self.batch_sampler {
            if self.batch_size != 1 || self.shuffle || self.sampler.is_some() || self.drop_last {
                return Err(DataError::InvalidOptions(
                    "batch_sampler option is mutually exclusive with batch_size, shuffle, sampler, and drop_last"
                        .to_string(),
                ));
            }
            batch_sampler.validate()?;
        }
        if self.persistent_workers && self.num_workers == 0 {
            return Err(DataError::InvalidOptions(
                "persistent_workers requires num_workers > 0".to_string(),
            ));
        }
        Ok(())
    }

    fn batch_sampler(&self) -> BatchSampler {
        self.batch_sampler.clone().unwrap_or(BatchSampler::Fixed {
            batch_size: self.batch_size,
            drop_last:  self.drop_last,
        })
    }

    fn rng(&self) -> Option<StdRng> {
        self.shuffle.then(|| match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        })
    }
}

// ─── LoaderConfig ─────────────────────────────────────────────────────────────
/// Loader options plus the batcher applied to each batch.
/// `C` defaults to `DefaultCollator` when no collate function is set.
#[derive(Debug, Clone)]
pub struct LoaderConfig<C = DefaultCollator> {
    pub options:    LoaderOptions,
    pub collate_fn: C,
}

impl LoaderConfig<DefaultCollator> {
    pub fn new(batch_size: usize) -> Self {
        Self {
            options:    LoaderOptions::new(batch_size),
            collate_fn: DefaultCollator,
        }
    }
}

impl<C> LoaderConfig<C> {
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.options.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.options.sampler = Some(sampler);
        self
    }

    #[must_use]
    pub fn with_batch_sampler(mut self, batch_sampler: BatchSampler) -> Self {
        self.options.batch_sampler = Some(batch_sampler);
        self
    }

    #[must_use]
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.options.num_workers = num_workers;
        self
    }

    #[must_use]
    pub fn with_pin_memory(mut self, pin_memory: bool) -> Self {
        self.options.pin_memory = pin_memory;
        self
    }

    #[must_use]
    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.options.drop_last = drop_last;
        self
    }

    #[must_use]
    pub fn with_persistent_workers(mut self, persistent_workers: bool) -> Self {
        self.options.persistent_workers = persistent_workers;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.options.seed = seed;
        self
    }

    /// Replace the collate function, keeping every other option.
    pub fn with_collate_fn<C2>(self, collate_fn: C2) -> LoaderConfig<C2> {
        LoaderConfig {
            options: self.options,
            collate_fn,
        }
    }

    /// Shuffle setting a loader built in `mode` will use.
    pub fn effective_shuffle(&self, mode: LoaderMode) -> bool {
        self.options.shuffle && mode == LoaderMode::Train
    }

    /// Build a loader over `dataset`.
    pub fn build<I, O>(&self, dataset: Arc<dyn Dataset<I>>, mode: LoaderMode) -> Result<DataLoader<O>>
    where
        C: Batcher<I, Result<O>> + Clone + 'static,
        I: Clone + Send + Sync + 'static,
        O: Clone + Debug + Send + 'static,
    {
        let mut options = self.options.clone();
        options.shuffle = self.effective_shuffle(mode);
        DataLoader::new(dataset, self.collate_fn.clone(), options)
    }
}

// ─── DataLoader ───────────────────────────────────────────────────────────────
/// A burn data loader plus the options it was built from.
pub struct DataLoader<O> {
    inner:   Arc<dyn BurnDataLoader<Result<O>>>,
    options: LoaderOptions,
}

impl<O> DataLoader<O>
where
    O: Clone + Debug + Send + 'static,
{
    pub fn new<I, C>(dataset: Arc<dyn Dataset<I>>, collate_fn: C, options: LoaderOptions) -> Result<Self>
    where
        C: Batcher<I, Result<O>> + Clone + 'static,
        I: Clone + Send + Sync + 'static,
    {
        options.validate()?;

        let dataset = match &options.sampler {
            Some(sampler) => sampler.apply(dataset)?,
            None          => dataset,
        };
        let strategy = options.batch_sampler().strategy::<I>();
        let batcher: Box<dyn DynBatcher<I, Result<O>>> = Box::new(CatchPanics::new(collate_fn));

        tracing::debug!(
            "DataLoader: {} rows, batch_size={}, shuffle={}, num_workers={}, drop_last={}, pin_memory={}",
            dataset.len(),
            options.batch_size,
            options.shuffle,
            options.num_workers,
            options.drop_last,
            options.pin_memory,
        );

        let inner: Arc<dyn BurnDataLoader<Result<O>>> = if options.num_workers == 0 {
            Arc::new(BatchDataLoader::new(strategy, dataset, batcher, options.rng()))
        } else {
            Arc::new(BatchDataLoader::multi_thread(
                strategy,
                dataset,
                batcher,
                options.num_workers,
                options.rng(),
            ))
        };

        Ok(Self { inner, options })
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn shuffle(&self) -> bool {
        self.options.shuffle
    }

    pub fn batch_size(&self) -> usize {
        self.options.batch_size
    }

    /// Rows one epoch visits, after the sampler
    pub fn num_items(&self) -> usize {
        self.inner.num_items()
    }

    /// Start a new epoch. A shuffling loader reshuffles on every call.
    pub fn iter(&self) -> Box<dyn DataLoaderIterator<Result<O>> + '_> {
        self.inner.iter()
    }
}

// ─── CatchPanics ──────────────────────────────────────────────────────────────
/// Turns a panic inside the wrapped batcher into `DataError::Worker`
/// for that batch. An unwinding worker thread would otherwise take
/// the consuming thread down with it.
#[derive(Clone)]
struct CatchPanics<C> {
    inner: C,
}

impl<C> CatchPanics<C> {
    fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C, I, O> Batcher<I, Result<O>> for CatchPanics<C>
where
    C: Batcher<I, Result<O>>,
{
    fn batch(&self, items: Vec<I>) -> Result<O> {
        let rows = items.len();
        panic::catch_unwind(AssertUnwindSafe(|| self.inner.batch(items))).unwrap_or_else(|payload| {
            Err(DataError::Worker(format!(
                "collating a batch of {rows} rows panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message;
    }
    match payload.downcast_ref::<String>() {
        Some(message) => message.as_str(),
        None          => "unknown panic",
    }
}
