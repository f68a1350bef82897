// ============================================================
// Layer 4 — Text Classification Dataset
// ============================================================
// Reads a Parquet table of (text, label) rows into memory and
// serves random-access reads by index.
//
// How a row is read:
//   Parquet file
//       │  ParquetRecordBatchReader (arrow RecordBatches)
//       ▼
//   text column  (Utf8 / LargeUtf8)   → String
//   label column (any integer type)   → i64
//       │
//       ▼
//   Vec<TextSample>, fixed for the lifetime of the dataset
//
// The whole table is loaded eagerly at construction time.
// Malformed rows (null text, null label) and wrongly-typed
// columns fail the load immediately rather than surfacing
// later in the middle of an epoch.
//
// Only local paths (optionally file://) are supported.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            arrow / parquet crate documentation

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, GenericStringArray, Int64Array, OffsetSizeTrait};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use burn::data::dataset::Dataset;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::domain::sample::TextSample;
use crate::error::{DataError, Result};

/// An in-memory text-classification table loaded from one split file.
#[derive(Debug, Clone)]
pub struct TextClassificationDataset {
    path:              String,
    text_column_name:  String,
    label_column_name: String,
    samples:           Vec<TextSample>,
}

impl TextClassificationDataset {
    /// Load every row of `path`, reading `text_column_name` as the text
    /// and `label_column_name` as the integer label.
    pub fn from_parquet(
        path:              impl AsRef<Path>,
        text_column_name:  &str,
        label_column_name: &str,
    ) -> Result<Self> {
        let shown = path.as_ref().display().to_string();
        let local = resolve_local_path(path.as_ref(), &shown)?;

        let file = File::open(local).map_err(|e| DataError::load(&shown, e))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| DataError::load(&shown, e))?;

        let schema = builder.schema().clone();
        let column_index = |name: &str| {
            schema.index_of(name).map_err(|_| {
                let found: Vec<&str> = schema
                    .fields()
                    .iter()
                    .map(|f| f.name().as_str())
                    .collect();
                DataError::load(&shown, format!("column '{name}' not found (found: {found:?})"))
            })
        };
        let text_idx  = column_index(text_column_name)?;
        let label_idx = column_index(label_column_name)?;

        let reader = builder.build().map_err(|e| DataError::load(&shown, e))?;

        let mut samples = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| DataError::load(&shown, e))?;
            append_rows(
                &batch,
                (text_idx, text_column_name),
                (label_idx, label_column_name),
                &shown,
                &mut samples,
            )?;
        }

        tracing::info!(
            "Loaded {} rows from '{}' (text='{}', label='{}')",
            samples.len(),
            shown,
            text_column_name,
            label_column_name,
        );

        Ok(Self {
            path:              shown,
            text_column_name:  text_column_name.to_string(),
            label_column_name: label_column_name.to_string(),
            samples,
        })
    }

    /// Build a dataset from rows already in memory.
    pub fn from_samples(path: impl Into<String>, samples: Vec<TextSample>) -> Self {
        Self {
            path:              path.into(),
            text_column_name:  "text".to_string(),
            label_column_name: "label".to_string(),
            samples,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text_column_name(&self) -> &str {
        &self.text_column_name
    }

    pub fn label_column_name(&self) -> &str {
        &self.label_column_name
    }

    /// Checked access by signed index.
    /// Negative indices and indices ≥ len are `OutOfRange`.
    pub fn sample(&self, index: i64) -> Result<TextSample> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.samples.get(i))
            .cloned()
            .ok_or(DataError::OutOfRange {
                index,
                len: self.samples.len(),
            })
    }

    /// All texts in row order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.text.as_str())
    }
}

impl Dataset<TextSample> for TextClassificationDataset {
    fn get(&self, index: usize) -> Option<TextSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── Path handling ────────────────────────────────────────────────────────────
/// Strip `file://`; reject other URI schemes. A path that is not
/// valid UTF-8 cannot carry a scheme and is opened as given.
fn resolve_local_path<'a>(path: &'a Path, shown: &str) -> Result<&'a Path> {
    let Some(text) = path.to_str() else {
        return Ok(path);
    };
    if let Some(local) = text.strip_prefix("file://") {
        return Ok(Path::new(local));
    }
    if let Some((scheme, _)) = text.split_once("://") {
        return Err(DataError::load(
            shown,
            format!("'{scheme}://' URIs are not supported; copy the file locally first"),
        ));
    }
    Ok(path)
}

// ─── Column decoding ──────────────────────────────────────────────────────────
fn append_rows(
    batch:   &RecordBatch,
    text:    (usize, &str),
    label:   (usize, &str),
    path:    &str,
    samples: &mut Vec<TextSample>,
) -> Result<()> {
    let offset = samples.len();
    let texts  = text_values(batch.column(text.0), text.1, path, offset)?;
    let labels = label_values(batch.column(label.0), label.1, path, offset)?;

    samples.extend(
        texts
            .into_iter()
            .zip(labels)
            .map(|(text, label)| TextSample { text, label }),
    );
    Ok(())
}

fn text_values(array: &ArrayRef, column: &str, path: &str, offset: usize) -> Result<Vec<String>> {
    match array.data_type() {
        DataType::Utf8      => collect_strings::<i32>(array, column, path, offset),
        DataType::LargeUtf8 => collect_strings::<i64>(array, column, path, offset),
        other => Err(DataError::load(
            path,
            format!("text column '{column}' has type {other:?}, expected Utf8 or LargeUtf8"),
        )),
    }
}

fn collect_strings<O: OffsetSizeTrait>(
    array:  &ArrayRef,
    column: &str,
    path:   &str,
    offset: usize,
) -> Result<Vec<String>> {
    let strings = array
        .as_any()
        .downcast_ref::<GenericStringArray<O>>()
        .ok_or_else(|| DataError::load(path, format!("cannot read text column '{column}'")))?;

    (0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                Err(DataError::load(
                    path,
                    format!("row {}: null value in text column '{column}'", offset + i),
                ))
            } else {
                Ok(strings.value(i).to_string())
            }
        })
        .collect()
}

fn label_values(array: &ArrayRef, column: &str, path: &str, offset: usize) -> Result<Vec<i64>> {
    if !array.data_type().is_integer() {
        return Err(DataError::load(
            path,
            format!(
                "label column '{column}' has type {:?}, expected an integer type",
                array.data_type()
            ),
        ));
    }

    // Values that do not fit in i64 (large UInt64) become nulls here
    // and are rejected below with the other nulls.
    let widened = cast(array, &DataType::Int64).map_err(|e| DataError::load(path, e))?;
    let ints = widened
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| DataError::load(path, format!("cannot read label column '{column}'")))?;

    (0..ints.len())
        .map(|i| {
            if ints.is_null(i) {
                Err(DataError::load(
                    path,
                    format!("row {}: missing or out-of-range label in column '{column}'", offset + i),
                ))
            } else {
                Ok(ints.value(i))
            }
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, LargeStringArray, StringArray, UInt8Array};

    use super::*;
    use crate::test_util::{write_table, write_text_table};

    #[test]
    fn test_loads_rows_in_order() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_text_table(dir.path(), "dev.parquet", &[("hello", 0), ("world", 1), ("again", 2)]);

        let ds = TextClassificationDataset::from_parquet(&path, "cleaned_text", "label").unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.sample(0).unwrap(), TextSample::new("hello", 0));
        assert_eq!(ds.sample(2).unwrap(), TextSample::new("again", 2));
        assert_eq!(ds.text_column_name(), "cleaned_text");
        assert_eq!(ds.label_column_name(), "label");
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_text_table(dir.path(), "train.parquet", &[("a", 1), ("b", 0)]);
        let ds   = TextClassificationDataset::from_parquet(&path, "cleaned_text", "label").unwrap();

        for i in 0..ds.len() as i64 {
            assert_eq!(ds.sample(i).unwrap(), ds.sample(i).unwrap());
            assert_eq!(Some(ds.sample(i).unwrap()), ds.get(i as usize));
        }
    }

    #[test]
    fn test_out_of_range_indices() {
        let ds = TextClassificationDataset::from_samples(
            "mem",
            vec![TextSample::new("a", 0), TextSample::new("b", 1)],
        );

        assert!(matches!(ds.sample(2),  Err(DataError::OutOfRange { index: 2,  len: 2 })));
        assert!(matches!(ds.sample(-1), Err(DataError::OutOfRange { index: -1, len: 2 })));
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextClassificationDataset::from_parquet(dir.path().join("nope.parquet"), "text", "label")
            .unwrap_err();
        assert!(matches!(err, DataError::Load { .. }));
    }

    #[test]
    fn test_missing_column_is_load_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_text_table(dir.path(), "dev.parquet", &[("x", 0)]);

        let err = TextClassificationDataset::from_parquet(&path, "cleaned_text", "category").unwrap_err();
        match err {
            DataError::Load { reason, .. } => assert!(reason.contains("category")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_uri_rejected() {
        let err = TextClassificationDataset::from_parquet("gs://bucket/dev.parquet", "text", "label")
            .unwrap_err();
        assert!(matches!(err, DataError::Load { .. }));
    }

    #[test]
    fn test_file_uri_opens_local_path() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_text_table(dir.path(), "dev.parquet", &[("x", 0)]);

        let ds = TextClassificationDataset::from_parquet(format!("file://{}", path.display()), "cleaned_text", "label")
            .unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_path_opened_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"split-\xff"));
        std::fs::create_dir(&odd).unwrap();
        let path = write_text_table(&odd, "dev.parquet", &[("kept", 3)]);

        let ds = TextClassificationDataset::from_parquet(&path, "cleaned_text", "label").unwrap();
        assert_eq!(ds.sample(0).unwrap(), TextSample::new("kept", 3));
        assert!(ds.path().contains('\u{FFFD}'));
    }

    #[test]
    fn test_large_utf8_and_narrow_int_labels() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.parquet");
        write_table(
            &path,
            vec![
                ("text",  Arc::new(LargeStringArray::from(vec!["p", "q"])) as ArrayRef),
                ("label", Arc::new(UInt8Array::from(vec![4u8, 7])) as ArrayRef),
            ],
        );

        let ds = TextClassificationDataset::from_parquet(&path, "text", "label").unwrap();
        assert_eq!(ds.sample(1).unwrap(), TextSample::new("q", 7));
    }

    #[test]
    fn test_float_labels_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.parquet");
        write_table(
            &path,
            vec![
                ("text",  Arc::new(StringArray::from(vec!["p"])) as ArrayRef),
                ("label", Arc::new(Float64Array::from(vec![0.5])) as ArrayRef),
            ],
        );

        let err = TextClassificationDataset::from_parquet(&path, "text", "label").unwrap_err();
        assert!(matches!(err, DataError::Load { .. }));
    }

    #[test]
    fn test_null_text_rejected_at_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nulls.parquet");
        write_table(
            &path,
            vec![
                ("text",  Arc::new(StringArray::from(vec![Some("ok"), None])) as ArrayRef),
                ("label", Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef),
            ],
        );

        match TextClassificationDataset::from_parquet(&path, "text", "label").unwrap_err() {
            DataError::Load { reason, .. } => assert!(reason.contains("row 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
