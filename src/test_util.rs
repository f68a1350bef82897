// Fixtures shared by unit tests: Parquet tables and a small
// word-level tokenizer written into temp directories.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::domain::encoding::EncodedText;
use crate::domain::sample::TextSample;
use crate::domain::traits::Transformation;
use crate::error::Result;

pub const TEXT_COLUMN: &str = "cleaned_text";
pub const LABEL_COLUMN: &str = "label";

/// Write the given named columns as a single-row-group Parquet file.
pub fn write_table(path: &Path, columns: Vec<(&str, ArrayRef)>) {
    let batch = RecordBatch::try_from_iter(columns).unwrap();
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Write (text, label) rows using the default column names.
pub fn write_text_table(dir: &Path, name: &str, rows: &[(&str, i64)]) -> PathBuf {
    let path = dir.join(name);
    let texts: Vec<&str> = rows.iter().map(|(t, _)| *t).collect();
    let labels: Vec<i64> = rows.iter().map(|(_, l)| *l).collect();
    write_table(
        &path,
        vec![
            (TEXT_COLUMN, Arc::new(StringArray::from(texts)) as ArrayRef),
            (LABEL_COLUMN, Arc::new(Int64Array::from(labels)) as ArrayRef),
        ],
    );
    path
}

/// `n` samples "text 0" .. "text n-1" with label == row index.
pub fn numbered_samples(n: usize) -> Vec<TextSample> {
    (0..n)
        .map(|i| TextSample::new(format!("text {i}"), i as i64))
        .collect()
}

/// Encodes each text as its word lengths, right-padded with 0.
pub struct WordLengths;

impl Transformation for WordLengths {
    fn transform(&self, texts: &[String]) -> Result<EncodedText> {
        let rows: Vec<Vec<u32>> = texts
            .iter()
            .map(|t| t.split_whitespace().map(|w| w.len() as u32).collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut encoded = EncodedText::default();
        for row in rows {
            let mut mask = vec![1u32; row.len()];
            let mut ids = row;
            ids.resize(width, 0);
            mask.resize(width, 0);
            encoded.input_ids.push(ids);
            encoded.attention_mask.push(mask);
        }
        Ok(encoded)
    }
}
