// ============================================================
// Layer 4 — Text Classification Data Module
// ============================================================
// Owns the three splits and hands out one loader per split.
//
//   setup(None | Fit) → train + dev datasets
//   setup(Test)       → test dataset
//
//   train_loader() → Train mode (configured shuffle)
//   dev_loader()   → Eval mode  (never shuffled)
//   test_loader()  → Eval mode  (never shuffled)
//
// A loader requested before its split was set up is a
// NotInitialized error. Setting up a split twice keeps the
// dataset that is already loaded.

use std::sync::Arc;

use burn::data::dataset::Dataset;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::batcher::{TextClassificationBatch, TokenizationBatcher};
use crate::data::dataset::TextClassificationDataset;
use crate::data::loader::{DataLoader, LoaderConfig};
use crate::data::sampler::{BatchSampler, Sampler};
use crate::domain::sample::TextSample;
use crate::domain::split::{Split, Stage};
use crate::domain::traits::Transformation;
use crate::error::{DataError, Result};

pub type TextClassificationLoader<B> = DataLoader<TextClassificationBatch<B>>;

// ─── DataModuleConfig ─────────────────────────────────────────────────────────
/// Split paths, column names and loader options, as read from the
/// `data_module` section of the pipeline config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModuleConfig {
    pub train_df_path:      String,
    pub dev_df_path:        String,
    pub test_df_path:       String,
    pub text_column_name:   String,
    pub label_column_name:  String,
    pub batch_size:         usize,
    #[serde(default)]
    pub shuffle:            bool,
    #[serde(default)]
    pub num_workers:        usize,
    #[serde(default)]
    pub pin_memory:         bool,
    #[serde(default)]
    pub drop_last:          bool,
    #[serde(default)]
    pub persistent_workers: bool,
    #[serde(default)]
    pub seed:               Option<u64>,
}

impl DataModuleConfig {
    pub fn path(&self, split: Split) -> &str {
        match split {
            Split::Train => &self.train_df_path,
            Split::Dev   => &self.dev_df_path,
            Split::Test  => &self.test_df_path,
        }
    }

    /// Loader options from this config, with the default collator.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::new(self.batch_size)
            .with_shuffle(self.shuffle)
            .with_num_workers(self.num_workers)
            .with_pin_memory(self.pin_memory)
            .with_drop_last(self.drop_last)
            .with_persistent_workers(self.persistent_workers)
            .with_seed(self.seed)
    }

    pub fn load_split(&self, split: Split) -> Result<TextClassificationDataset> {
        TextClassificationDataset::from_parquet(
            self.path(split),
            &self.text_column_name,
            &self.label_column_name,
        )
    }
}

// ─── TextClassificationDataModule ─────────────────────────────────────────────
pub struct TextClassificationDataModule<B: Backend, T> {
    config: DataModuleConfig,
    loader: LoaderConfig<TokenizationBatcher<B, T>>,
    train:  Option<Arc<TextClassificationDataset>>,
    dev:    Option<Arc<TextClassificationDataset>>,
    test:   Option<Arc<TextClassificationDataset>>,
}

impl<B, T> TextClassificationDataModule<B, T>
where
    B: Backend,
    T: Transformation + 'static,
{
    pub fn new(config: DataModuleConfig, transformation: Arc<T>, device: B::Device) -> Self {
        let loader = config
            .loader_config()
            .with_collate_fn(TokenizationBatcher::new(transformation, device));
        Self {
            config,
            loader,
            train: None,
            dev:   None,
            test:  None,
        }
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.loader = self.loader.with_sampler(sampler);
        self
    }

    #[must_use]
    pub fn with_batch_sampler(mut self, batch_sampler: BatchSampler) -> Self {
        self.loader = self.loader.with_batch_sampler(batch_sampler);
        self
    }

    pub fn config(&self) -> &DataModuleConfig {
        &self.config
    }

    pub fn loader_config(&self) -> &LoaderConfig<TokenizationBatcher<B, T>> {
        &self.loader
    }

    /// Load the datasets `stage` needs. `None` behaves like `Fit`.
    pub fn setup(&mut self, stage: Option<Stage>) -> Result<()> {
        let stage = stage.unwrap_or(Stage::Fit);
        for &split in stage.splits() {
            if self.slot(split).is_some() {
                tracing::debug!("{} split already set up", split);
                continue;
            }
            let dataset = self.config.load_split(split)?;
            tracing::info!("{} split ready: {} rows", split, dataset.len());
            *self.slot_mut(split) = Some(Arc::new(dataset));
        }
        Ok(())
    }

    pub fn is_ready(&self, split: Split) -> bool {
        self.slot(split).is_some()
    }

    pub fn dataset(&self, split: Split) -> Result<Arc<TextClassificationDataset>> {
        self.slot(split)
            .map(Arc::clone)
            .ok_or(DataError::NotInitialized { split })
    }

    pub fn train_loader(&self) -> Result<TextClassificationLoader<B>> {
        self.loader(Split::Train)
    }

    pub fn dev_loader(&self) -> Result<TextClassificationLoader<B>> {
        self.loader(Split::Dev)
    }

    pub fn test_loader(&self) -> Result<TextClassificationLoader<B>> {
        self.loader(Split::Test)
    }

    /// Loader for `split` in the mode that split is served in.
    pub fn loader(&self, split: Split) -> Result<TextClassificationLoader<B>> {
        let dataset: Arc<dyn Dataset<TextSample>> = self.dataset(split)?;
        self.loader.build(dataset, split.mode())
    }

    fn slot(&self, split: Split) -> Option<&Arc<TextClassificationDataset>> {
        match split {
            Split::Train => self.train.as_ref(),
            Split::Dev   => self.dev.as_ref(),
            Split::Test  => self.test.as_ref(),
        }
    }

    fn slot_mut(&mut self, split: Split) -> &mut Option<Arc<TextClassificationDataset>> {
        match split {
            Split::Train => &mut self.train,
            Split::Dev   => &mut self.dev,
            Split::Test  => &mut self.test,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::test_util::{write_text_table, WordLengths, LABEL_COLUMN, TEXT_COLUMN};

    type TestBackend = burn::backend::NdArray;
    type TestModule  = TextClassificationDataModule<TestBackend, WordLengths>;

    fn config(dir: &Path, batch_size: usize) -> DataModuleConfig {
        let rows: Vec<(String, i64)> = (0..10).map(|i| (format!("row {i}"), i)).collect();
        let rows: Vec<(&str, i64)>   = rows.iter().map(|(t, l)| (t.as_str(), *l)).collect();

        let train = write_text_table(dir, "train.parquet", &rows);
        let dev   = write_text_table(dir, "dev.parquet", &[("dev a", 1), ("dev b", 0)]);
        let test  = write_text_table(dir, "test.parquet", &[("test only", 2)]);

        DataModuleConfig {
            train_df_path:      train.display().to_string(),
            dev_df_path:        dev.display().to_string(),
            test_df_path:       test.display().to_string(),
            text_column_name:   TEXT_COLUMN.to_string(),
            label_column_name:  LABEL_COLUMN.to_string(),
            batch_size,
            shuffle:            false,
            num_workers:        0,
            pin_memory:         false,
            drop_last:          false,
            persistent_workers: false,
            seed:               None,
        }
    }

    fn module(config: DataModuleConfig) -> TestModule {
        TextClassificationDataModule::new(config, Arc::new(WordLengths), Default::default())
    }

    fn labels(batch: TextClassificationBatch<TestBackend>) -> Vec<i64> {
        batch.labels.into_data().iter::<i64>().collect()
    }

    #[test]
    fn test_fit_builds_train_and_dev_only() {
        let dir   = tempfile::tempdir().unwrap();
        let mut m = module(config(dir.path(), 4));

        m.setup(Some(Stage::Fit)).unwrap();

        assert!(m.train_loader().is_ok());
        assert!(m.dev_loader().is_ok());
        let err = m.test_loader().err().unwrap();
        assert!(matches!(err, DataError::NotInitialized { split: Split::Test }));
    }

    #[test]
    fn test_test_stage_builds_test_only() {
        let dir   = tempfile::tempdir().unwrap();
        let mut m = module(config(dir.path(), 4));

        m.setup(Some(Stage::Test)).unwrap();

        assert!(m.test_loader().is_ok());
        assert!(matches!(
            m.train_loader().err().unwrap(),
            DataError::NotInitialized { split: Split::Train }
        ));
        assert!(matches!(
            m.dev_loader().err().unwrap(),
            DataError::NotInitialized { split: Split::Dev }
        ));
    }

    #[test]
    fn test_no_stage_means_fit() {
        let dir   = tempfile::tempdir().unwrap();
        let mut m = module(config(dir.path(), 4));

        m.setup(None).unwrap();

        assert!(m.is_ready(Split::Train));
        assert!(m.is_ready(Split::Dev));
        assert!(!m.is_ready(Split::Test));
    }

    #[test]
    fn test_setup_is_idempotent() {
        let dir   = tempfile::tempdir().unwrap();
        let mut m = module(config(dir.path(), 4));

        m.setup(Some(Stage::Fit)).unwrap();
        let first = m.dataset(Split::Train).unwrap();
        m.setup(Some(Stage::Fit)).unwrap();
        let second = m.dataset(Split::Train).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_split_file_is_load_error() {
        let dir        = tempfile::tempdir().unwrap();
        let mut cfg    = config(dir.path(), 4);
        cfg.test_df_path = dir.path().join("absent.parquet").display().to_string();
        let mut m      = module(cfg);

        let err = m.setup(Some(Stage::Test)).unwrap_err();
        assert!(matches!(err, DataError::Load { .. }));
        assert!(!m.is_ready(Split::Test));
    }

    #[test]
    fn test_train_batches_follow_row_order() {
        let dir   = tempfile::tempdir().unwrap();
        let mut m = module(config(dir.path(), 4));
        m.setup(Some(Stage::Fit)).unwrap();

        let loader  = m.train_loader().unwrap();
        let batches: Vec<Vec<i64>> = loader.iter().map(|b| labels(b.unwrap())).collect();

        assert_eq!(batches, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_drop_last_discards_partial_batch() {
        let dir     = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 4);
        cfg.drop_last = true;
        let mut m   = module(cfg);
        m.setup(Some(Stage::Fit)).unwrap();

        let loader  = m.train_loader().unwrap();
        let batches: Vec<Vec<i64>> = loader.iter().map(|b| labels(b.unwrap())).collect();

        assert_eq!(batches, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn test_only_train_loader_shuffles() {
        let dir     = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 4);
        cfg.shuffle = true;
        cfg.seed    = Some(7);
        let mut m   = module(cfg);
        m.setup(None).unwrap();
        m.setup(Some(Stage::Test)).unwrap();

        assert!(m.train_loader().unwrap().shuffle());
        assert!(!m.dev_loader().unwrap().shuffle());
        assert!(!m.test_loader().unwrap().shuffle());
    }

    #[test]
    fn test_sampler_conflicts_with_train_shuffle_only() {
        let dir     = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 2);
        cfg.shuffle = true;
        let mut m   = module(cfg).with_sampler(Sampler::Range { start: 0, end: 2 });
        m.setup(None).unwrap();

        assert!(matches!(
            m.train_loader().err().unwrap(),
            DataError::InvalidOptions(_)
        ));
        assert!(m.dev_loader().is_ok());
    }

    #[test]
    fn test_worker_loader_batches_each_worker_slice() {
        let dir     = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 3);
        cfg.num_workers = 2;
        let mut m   = module(cfg);
        m.setup(None).unwrap();

        let loader = m.train_loader().unwrap();
        let mut batches: Vec<Vec<i64>> = loader.iter().map(|b| labels(b.unwrap())).collect();
        batches.sort();

        // Worker slices are rows 0..5 and 5..10; arrival order varies
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_config_roundtrips_through_yaml_with_defaults() {
        let yaml = "
train_df_path: a.parquet
dev_df_path: b.parquet
test_df_path: c.parquet
text_column_name: cleaned_text
label_column_name: label
batch_size: 16
";
        let cfg: DataModuleConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.batch_size, 16);
        assert!(!cfg.shuffle);
        assert_eq!(cfg.num_workers, 0);
        assert_eq!(cfg.path(Split::Dev), "b.parquet");
        assert_eq!(cfg.seed, None);
    }
}
